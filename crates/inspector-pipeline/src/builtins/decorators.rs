//! Decorator attributes and their drawers.

use crate::drawers::ScopeDrawer;
use crate::error::DrawerError;
use crate::model::{Attribute, Category, Edge};
use crate::pipeline::DrawContext;
use crate::render::{Canvas, LabelStyle, MessageKind, Scope};

/// Vertical space before and after the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Space {
    pub before: f32,
    pub after: f32,
}

impl Space {
    pub fn new(before: f32, after: f32) -> Self {
        Self { before, after }
    }
}

impl Attribute for Space {
    fn name(&self) -> &'static str {
        "Space"
    }

    fn category(&self) -> Category {
        Category::Decorator
    }
}

/// A text label above the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub style: LabelStyle,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: LabelStyle::Normal,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: LabelStyle::Bold,
        }
    }
}

impl Attribute for Label {
    fn name(&self) -> &'static str {
        "Label"
    }

    fn category(&self) -> Category {
        Category::Decorator
    }
}

/// A horizontal separator above the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub thickness: f32,
    pub padding: f32,
}

impl Line {
    pub fn new(thickness: f32, padding: f32) -> Self {
        Self { thickness, padding }
    }
}

impl Default for Line {
    fn default() -> Self {
        Self::new(1.0, 4.0)
    }
}

impl Attribute for Line {
    fn name(&self) -> &'static str {
        "Line"
    }

    fn category(&self) -> Category {
        Category::Decorator
    }
}

/// Where a help box goes relative to the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HelpPosition {
    #[default]
    Above,
    Below,
}

/// A message box attached to the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Help {
    pub text: String,
    pub kind: MessageKind,
    pub position: HelpPosition,
}

impl Help {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::Info,
            position: HelpPosition::Above,
        }
    }

    pub fn kind(mut self, kind: MessageKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn below(mut self) -> Self {
        self.position = HelpPosition::Below;
        self
    }
}

impl Attribute for Help {
    fn name(&self) -> &'static str {
        "Help"
    }

    fn category(&self) -> Category {
        Category::Decorator
    }
}

/// Indents everything inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indent {
    pub levels: u8,
}

impl Indent {
    pub fn new(levels: u8) -> Self {
        Self { levels }
    }
}

impl Attribute for Indent {
    fn name(&self) -> &'static str {
        "Indent"
    }

    fn category(&self) -> Category {
        Category::Decorator
    }
}

/// Tints the background of everything inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub color: [u8; 4],
}

impl Highlight {
    pub fn new(color: [u8; 4]) -> Self {
        Self { color }
    }
}

impl Attribute for Highlight {
    fn name(&self) -> &'static str {
        "Highlight"
    }

    fn category(&self) -> Category {
        Category::Decorator
    }
}

/// Closes the decorator with pair tag `tag` (its type name, e.g. `"Indent"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndDecorator {
    pub tag: &'static str,
}

impl EndDecorator {
    pub fn new(tag: &'static str) -> Self {
        Self { tag }
    }
}

impl Attribute for EndDecorator {
    fn name(&self) -> &'static str {
        "EndDecorator"
    }

    fn category(&self) -> Category {
        Category::Decorator
    }

    fn edge(&self) -> Edge {
        Edge::End
    }

    fn pair_tag(&self) -> &'static str {
        self.tag
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpaceDrawer;

impl ScopeDrawer<Space> for SpaceDrawer {
    fn begin(
        &self,
        space: &Space,
        _: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        if space.before > 0.0 {
            canvas.space(space.before);
        }
        Ok(())
    }

    fn end(
        &self,
        space: &Space,
        _: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        if space.after > 0.0 {
            canvas.space(space.after);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LabelDrawer;

impl ScopeDrawer<Label> for LabelDrawer {
    fn begin(
        &self,
        label: &Label,
        _: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        canvas.label(&label.text, label.style);
        Ok(())
    }

    fn end(
        &self,
        _: &Label,
        _: &mut DrawContext<'_>,
        _: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LineDrawer;

impl ScopeDrawer<Line> for LineDrawer {
    fn begin(
        &self,
        line: &Line,
        _: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        canvas.separator(line.thickness, line.padding);
        Ok(())
    }

    fn end(
        &self,
        _: &Line,
        _: &mut DrawContext<'_>,
        _: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HelpDrawer;

impl ScopeDrawer<Help> for HelpDrawer {
    fn begin(
        &self,
        help: &Help,
        _: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        if help.position == HelpPosition::Above {
            canvas.help_box(&help.text, help.kind);
        }
        Ok(())
    }

    fn end(
        &self,
        help: &Help,
        _: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        if help.position == HelpPosition::Below {
            canvas.help_box(&help.text, help.kind);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IndentDrawer;

impl ScopeDrawer<Indent> for IndentDrawer {
    fn begin(
        &self,
        indent: &Indent,
        _: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        canvas.begin_scope(&Scope::Indent(indent.levels));
        Ok(())
    }

    fn end(
        &self,
        indent: &Indent,
        _: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        canvas.end_scope(&Scope::Indent(indent.levels));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HighlightDrawer;

impl ScopeDrawer<Highlight> for HighlightDrawer {
    fn begin(
        &self,
        highlight: &Highlight,
        _: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        canvas.begin_scope(&Scope::Highlight(highlight.color));
        Ok(())
    }

    fn end(
        &self,
        highlight: &Highlight,
        _: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        canvas.end_scope(&Scope::Highlight(highlight.color));
        Ok(())
    }
}
