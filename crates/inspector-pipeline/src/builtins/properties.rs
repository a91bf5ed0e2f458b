//! Property attributes: they replace the default value primitive.

use crate::drawers::ValueDrawer;
use crate::error::DrawerError;
use crate::model::{Attribute, Category, TypeClass, Value};
use crate::pipeline::DrawContext;
use crate::render::{Canvas, WidgetHint};

/// Slider over an inclusive numeric range. Edits are clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    /// Creates a range. Bounds are swapped if given in reverse.
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Clamps a numeric value into the range. Other values pass through.
    pub fn clamp(&self, value: Value) -> Value {
        if !(self.min <= self.max) {
            return value;
        }
        match value {
            Value::Float(v) => Value::Float(v.clamp(self.min, self.max)),
            Value::Int(v) => {
                let (lo, hi) = (self.min.ceil() as i64, self.max.floor() as i64);
                if lo <= hi {
                    Value::Int(v.clamp(lo, hi))
                } else {
                    Value::Int(v)
                }
            }
            other => other,
        }
    }
}

impl Attribute for Range {
    fn name(&self) -> &'static str {
        "Range"
    }

    fn category(&self) -> Category {
        Category::Property
    }
}

/// Multi-line text area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Multiline {
    pub lines: u8,
}

impl Multiline {
    pub fn new(lines: u8) -> Self {
        Self { lines }
    }
}

impl Attribute for Multiline {
    fn name(&self) -> &'static str {
        "Multiline"
    }

    fn category(&self) -> Category {
        Category::Property
    }
}

/// Unit label after the value, e.g. `"m/s"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suffix {
    pub text: String,
}

impl Suffix {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Attribute for Suffix {
    fn name(&self) -> &'static str {
        "Suffix"
    }

    fn category(&self) -> Category {
        Category::Property
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RangeDrawer;

impl ValueDrawer<Range> for RangeDrawer {
    fn render(
        &self,
        range: &Range,
        cx: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        let class = cx.runtime_class();
        if !class.is_numeric() {
            return Err(DrawerError::TypeMismatch {
                expected: TypeClass::Float,
                found: class,
            });
        }
        let view = cx.view(WidgetHint::Range {
            min: range.min,
            max: range.max,
        });
        if let Some(edited) = canvas.value_field(&view) {
            cx.apply(range.clamp(edited));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MultilineDrawer;

impl ValueDrawer<Multiline> for MultilineDrawer {
    fn render(
        &self,
        multiline: &Multiline,
        cx: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        let class = cx.runtime_class();
        if class != TypeClass::Text {
            return Err(DrawerError::TypeMismatch {
                expected: TypeClass::Text,
                found: class,
            });
        }
        cx.value_field(canvas, WidgetHint::Multiline {
            lines: multiline.lines,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixDrawer;

impl ValueDrawer<Suffix> for SuffixDrawer {
    fn render(
        &self,
        suffix: &Suffix,
        cx: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        cx.value_field(canvas, WidgetHint::Suffix(suffix.text.clone()))
    }
}
