//! Rendering primitives.
//!
//! The pipeline never draws anything itself. It calls a host-supplied
//! [`Canvas`], which owns layout, styling, and input. [`RecordingCanvas`]
//! records every call and is what the tests render into.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::model::{TypeClass, Value};

/// A begin/end scope opened by an area, a decorator, or the pipeline itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Scope {
    /// Titled group box.
    Group { title: Option<String> },
    /// Horizontal layout.
    Horizontal,
    /// Scrollable region with a fixed height.
    Scroll { height: f32 },
    /// Indentation by a number of levels.
    Indent(u8),
    /// Background tint, RGBA.
    Highlight([u8; 4]),
    /// Non-interactive region.
    Disabled,
    /// Inline editor for a referenced object.
    Nested { type_name: String },
}

impl Scope {
    /// Short name used in traces.
    pub fn name(&self) -> &'static str {
        match self {
            Scope::Group { .. } => "group",
            Scope::Horizontal => "horizontal",
            Scope::Scroll { .. } => "scroll",
            Scope::Indent(_) => "indent",
            Scope::Highlight(_) => "highlight",
            Scope::Disabled => "disabled",
            Scope::Nested { .. } => "nested",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Group { title: Some(t) } => write!(f, "group({t})"),
            Scope::Indent(n) => write!(f, "indent({n})"),
            Scope::Nested { type_name } => write!(f, "nested({type_name})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Text style for labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelStyle {
    #[default]
    Normal,
    Bold,
    Mini,
}

/// Severity of a help box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    #[default]
    Info,
    Warning,
    Error,
}

/// How a value field should be edited.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WidgetHint {
    #[default]
    Default,
    /// Slider over an inclusive numeric range.
    Range { min: f64, max: f64 },
    /// Multi-line text area.
    Multiline { lines: u8 },
    /// Value followed by a unit label.
    Suffix(String),
}

/// Everything a value primitive needs to draw one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub label: String,
    /// Shared value, or `None` when nothing resolved.
    pub value: Option<Value>,
    /// Declared type class of the field.
    pub value_type: TypeClass,
    /// True when targets disagree. `value` then holds the first target's value.
    pub mixed: bool,
    /// Text to display instead of the value when mixed.
    pub mixed_label: String,
    pub interactive: bool,
    pub hint: WidgetHint,
}

impl FieldView {
    /// Text to display for the value.
    pub fn display_value(&self) -> String {
        if self.mixed {
            return self.mixed_label.clone();
        }
        match &self.value {
            Some(value) => value.to_string(),
            None => String::new(),
        }
    }

    pub fn with_hint(mut self, hint: WidgetHint) -> Self {
        self.hint = hint;
        self
    }
}

/// Presentation of a list widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListStyle {
    #[default]
    Default,
    Boxed,
    Compact,
}

/// Per-field state of a list widget, kept across redraws.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListState {
    pub style: ListStyle,
    pub draggable: bool,
    pub header: Option<String>,
    pub expanded: bool,
    pub selected: Option<usize>,
}

impl ListState {
    pub fn new(style: ListStyle) -> Self {
        Self {
            style,
            expanded: true,
            ..Self::default()
        }
    }
}

/// Host-supplied rendering primitives.
///
/// Every `begin_scope` the pipeline issues is matched by an `end_scope`
/// with the same scope, in reverse order.
pub trait Canvas {
    fn begin_scope(&mut self, scope: &Scope);

    fn end_scope(&mut self, scope: &Scope);

    fn space(&mut self, amount: f32);

    fn label(&mut self, text: &str, style: LabelStyle);

    fn separator(&mut self, thickness: f32, padding: f32);

    fn help_box(&mut self, text: &str, kind: MessageKind);

    /// Draws the default editor for a field. Returns the new value if the
    /// user edited it.
    fn value_field(&mut self, view: &FieldView) -> Option<Value>;

    /// Draws the default sequence editor. Returns the new list if edited.
    fn list_field(&mut self, view: &FieldView, state: &mut ListState) -> Option<Value>;

    /// Reports the scroll offset of the innermost scroll scope.
    ///
    /// Receives the stored offset and returns the offset after input.
    fn scroll(&mut self, offset: f32) -> f32 {
        offset
    }

    /// Placeholder for a field whose drawer failed.
    fn invalid_drawer(&mut self, label: &str, message: &str);
}

/// One recorded canvas call.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    Begin(Scope),
    End(Scope),
    Space(f32),
    Label {
        text: String,
        style: LabelStyle,
    },
    Separator {
        thickness: f32,
        padding: f32,
    },
    HelpBox {
        text: String,
        kind: MessageKind,
    },
    ValueField(FieldView),
    ListField {
        view: FieldView,
        state: ListState,
    },
    Scroll(f32),
    InvalidDrawer {
        label: String,
        message: String,
    },
}

impl CanvasOp {
    /// Compact single-line form, e.g. `begin group(Stats)` or `value health=3`.
    pub fn summary(&self) -> String {
        match self {
            CanvasOp::Begin(scope) => format!("begin {scope}"),
            CanvasOp::End(scope) => format!("end {scope}"),
            CanvasOp::Space(amount) => format!("space {amount}"),
            CanvasOp::Label { text, .. } => format!("label {text}"),
            CanvasOp::Separator { .. } => "separator".to_string(),
            CanvasOp::HelpBox { text, .. } => format!("help {text}"),
            CanvasOp::ValueField(view) => format!("value {}={}", view.label, view.display_value()),
            CanvasOp::ListField { view, .. } => format!("list {}", view.label),
            CanvasOp::Scroll(offset) => format!("scroll {offset}"),
            CanvasOp::InvalidDrawer { label, .. } => format!("invalid {label}"),
        }
    }
}

/// A canvas that records calls and replays scripted user input.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    ops: Vec<CanvasOp>,
    edits: FxHashMap<String, Value>,
    scroll_input: Option<f32>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next value or list field with this label returns `value` as an edit.
    pub fn script_edit(&mut self, label: impl Into<String>, value: impl Into<Value>) {
        self.edits.insert(label.into(), value.into());
    }

    /// The next scroll query returns `offset`.
    pub fn script_scroll(&mut self, offset: f32) {
        self.scroll_input = Some(offset);
    }

    pub fn ops(&self) -> &[CanvasOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<CanvasOp> {
        std::mem::take(&mut self.ops)
    }

    /// Returns [`CanvasOp::summary`] for every recorded op.
    pub fn summaries(&self) -> Vec<String> {
        self.ops.iter().map(CanvasOp::summary).collect()
    }

    /// Returns the begin/end ops only.
    pub fn scope_trace(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter(|op| matches!(op, CanvasOp::Begin(_) | CanvasOp::End(_)))
            .map(CanvasOp::summary)
            .collect()
    }

    /// Returns true if every end matches the most recent open begin.
    pub fn is_balanced(&self) -> bool {
        let mut open = Vec::new();
        for op in &self.ops {
            match op {
                CanvasOp::Begin(scope) => open.push(scope),
                CanvasOp::End(scope) => {
                    if open.pop() != Some(scope) {
                        return false;
                    }
                }
                _ => {}
            }
        }
        open.is_empty()
    }

    /// Returns the recorded value fields.
    pub fn value_fields(&self) -> Vec<&FieldView> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                CanvasOp::ValueField(view) => Some(view),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn begin_scope(&mut self, scope: &Scope) {
        self.ops.push(CanvasOp::Begin(scope.clone()));
    }

    fn end_scope(&mut self, scope: &Scope) {
        self.ops.push(CanvasOp::End(scope.clone()));
    }

    fn space(&mut self, amount: f32) {
        self.ops.push(CanvasOp::Space(amount));
    }

    fn label(&mut self, text: &str, style: LabelStyle) {
        self.ops.push(CanvasOp::Label {
            text: text.to_string(),
            style,
        });
    }

    fn separator(&mut self, thickness: f32, padding: f32) {
        self.ops.push(CanvasOp::Separator { thickness, padding });
    }

    fn help_box(&mut self, text: &str, kind: MessageKind) {
        self.ops.push(CanvasOp::HelpBox {
            text: text.to_string(),
            kind,
        });
    }

    fn value_field(&mut self, view: &FieldView) -> Option<Value> {
        self.ops.push(CanvasOp::ValueField(view.clone()));
        if !view.interactive {
            return None;
        }
        self.edits.remove(&view.label)
    }

    fn list_field(&mut self, view: &FieldView, state: &mut ListState) -> Option<Value> {
        self.ops.push(CanvasOp::ListField {
            view: view.clone(),
            state: state.clone(),
        });
        if !view.interactive {
            return None;
        }
        self.edits.remove(&view.label)
    }

    fn scroll(&mut self, offset: f32) -> f32 {
        let offset = self.scroll_input.take().unwrap_or(offset);
        self.ops.push(CanvasOp::Scroll(offset));
        offset
    }

    fn invalid_drawer(&mut self, label: &str, message: &str) {
        self.ops.push(CanvasOp::InvalidDrawer {
            label: label.to_string(),
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(label: &str, value: Value) -> FieldView {
        FieldView {
            label: label.to_string(),
            value_type: value.type_class(),
            value: Some(value),
            mixed: false,
            mixed_label: "-".to_string(),
            interactive: true,
            hint: WidgetHint::Default,
        }
    }

    #[test]
    fn test_balanced_detection() {
        let mut canvas = RecordingCanvas::new();
        canvas.begin_scope(&Scope::Horizontal);
        canvas.begin_scope(&Scope::Indent(1));
        canvas.end_scope(&Scope::Indent(1));
        canvas.end_scope(&Scope::Horizontal);
        assert!(canvas.is_balanced());

        canvas.begin_scope(&Scope::Horizontal);
        assert!(!canvas.is_balanced());
    }

    #[test]
    fn test_crossed_scopes_unbalanced() {
        let mut canvas = RecordingCanvas::new();
        canvas.begin_scope(&Scope::Horizontal);
        canvas.begin_scope(&Scope::Disabled);
        canvas.end_scope(&Scope::Horizontal);
        canvas.end_scope(&Scope::Disabled);
        assert!(!canvas.is_balanced());
    }

    #[test]
    fn test_scripted_edit_consumed_once() {
        let mut canvas = RecordingCanvas::new();
        canvas.script_edit("health", 5);
        let v = view("health", Value::Int(3));
        assert_eq!(canvas.value_field(&v), Some(Value::Int(5)));
        assert_eq!(canvas.value_field(&v), None);
    }

    #[test]
    fn test_non_interactive_field_ignores_edits() {
        let mut canvas = RecordingCanvas::new();
        canvas.script_edit("health", 5);
        let mut v = view("health", Value::Int(3));
        v.interactive = false;
        assert_eq!(canvas.value_field(&v), None);
    }

    #[test]
    fn test_mixed_display() {
        let mut v = view("health", Value::Int(3));
        assert_eq!(v.display_value(), "3");
        v.mixed = true;
        assert_eq!(v.display_value(), "-");
    }

    #[test]
    fn test_summaries() {
        let mut canvas = RecordingCanvas::new();
        canvas.begin_scope(&Scope::Group {
            title: Some("Stats".into()),
        });
        canvas.value_field(&view("health", Value::Int(3)));
        canvas.end_scope(&Scope::Group {
            title: Some("Stats".into()),
        });
        assert_eq!(
            canvas.summaries(),
            vec!["begin group(Stats)", "value health=3", "end group(Stats)"]
        );
    }
}
