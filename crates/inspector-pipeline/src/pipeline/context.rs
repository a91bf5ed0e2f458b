//! Per-field draw context.

use crate::compare::ComparisonOperator;
use crate::error::{Diagnostic, DrawerError, MemberError};
use crate::extract::ExtractionResult;
use crate::host::{DrawReport, InspectorHost};
use crate::model::{EditingSession, FieldDescriptor, FieldIdentity, TypeClass, Value};
use crate::options::InspectorOptions;
use crate::render::{Canvas, FieldView, ListState, WidgetHint};

/// Attribute name used for diagnostics raised while applying edits.
const EDIT: &str = "edit";

/// Everything a drawer can see and do while one field is drawn.
pub struct DrawContext<'a> {
    host: &'a InspectorHost,
    session: &'a EditingSession,
    field: &'a FieldDescriptor,
    field_name: String,
    path: String,
    value: ExtractionResult,
    interactive: bool,
    depth: usize,
}

impl<'a> DrawContext<'a> {
    pub(crate) fn new(
        host: &'a InspectorHost,
        session: &'a EditingSession,
        field: &'a FieldDescriptor,
        path: String,
        depth: usize,
        value: ExtractionResult,
    ) -> Self {
        Self {
            host,
            session,
            field,
            field_name: field.qualified_name(),
            path,
            value,
            interactive: true,
            depth,
        }
    }

    pub fn field(&self) -> &FieldDescriptor {
        self.field
    }

    /// `Type.field`, as used in diagnostics.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn label(&self) -> &str {
        &self.field.label
    }

    /// Dotted path of the field from the inspected root.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn session(&self) -> &EditingSession {
        self.session
    }

    /// Nesting depth; top-level fields are at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn options(&self) -> &InspectorOptions {
        self.host.options()
    }

    /// The field's value across all targets.
    pub fn value(&self) -> &ExtractionResult {
        &self.value
    }

    pub fn has_mixed_values(&self) -> bool {
        self.value.has_mixed_values
    }

    /// Type class of the value being drawn.
    ///
    /// This is the value's own class when every target agrees on a non-null
    /// value, otherwise the declared class.
    pub fn runtime_class(&self) -> TypeClass {
        match &self.value.value {
            Some(value) if !self.value.has_mixed_values && *value != Value::Null => {
                value.type_class()
            }
            _ => self.field.value_type,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub(crate) fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Cache key shared by every instance of this field kind.
    pub fn persistent_identity(&self) -> FieldIdentity {
        self.field.persistent_identity(&self.path)
    }

    /// Cache key scoped to the current editing session.
    pub fn volatile_identity(&self) -> FieldIdentity {
        self.field.volatile_identity(self.session.id(), &self.path)
    }

    /// Builds the view handed to value primitives.
    pub fn view(&self, hint: WidgetHint) -> FieldView {
        FieldView {
            label: self.field.label.clone(),
            value: self.value.value.clone(),
            value_type: self.field.value_type,
            mixed: self.value.has_mixed_values,
            mixed_label: self.options().mixed_value_label.clone(),
            interactive: self.interactive,
            hint,
        }
    }

    /// Resolves another member of the targets, e.g. a condition's operand.
    pub fn extract(&self, member: &str) -> ExtractionResult {
        self.host
            .extraction()
            .try_get_value_across_targets(member, self.session.targets())
    }

    /// Compares two values. `None` means no comparer accepts them.
    pub fn compare(
        &self,
        source: &Value,
        target: &Value,
        operator: ComparisonOperator,
    ) -> Option<bool> {
        self.host.comparison().compare(source, target, operator)
    }

    /// Sends a diagnostic to the host's sink.
    pub fn report(&self, diagnostic: Diagnostic) {
        self.host.diagnostics().report(diagnostic);
    }

    /// Reports that `member`, used by `attribute`, resolved on no target.
    ///
    /// A fault in the host's member access is a `W006`, anything else a `W001`.
    pub fn report_unresolved(
        &self,
        attribute: &'static str,
        member: &str,
        result: &ExtractionResult,
    ) {
        match &result.error {
            Some(error @ MemberError::Faulted(_)) => self.report(Diagnostic::DrawerFailed {
                field: self.field_name.clone(),
                attribute,
                message: format!("`{member}`: {error}"),
            }),
            _ => self.report(Diagnostic::MemberNotFound {
                field: self.field_name.clone(),
                attribute,
                member: member.to_string(),
                owner: self.session.type_name().unwrap_or_default().to_string(),
            }),
        }
    }

    /// Writes `value` to the field of every target.
    ///
    /// Returns true if every target accepted it. Failures are reported as
    /// diagnostics. The cached value is refreshed afterwards.
    pub fn apply(&mut self, value: Value) -> bool {
        if !self.interactive {
            return false;
        }
        if let Some(reason) = value.validate() {
            self.report(Diagnostic::DrawerFailed {
                field: self.field_name.clone(),
                attribute: EDIT,
                message: reason.to_string(),
            });
            return false;
        }

        let mut applied = 0;
        for target in self.session.targets() {
            match target.get().set_field(&self.field.name, value.clone()) {
                Ok(()) => applied += 1,
                Err(e) => self.report(self.edit_diagnostic(target.type_name(), e)),
            }
        }
        tracing::trace!(field = %self.field_name, applied, "edit applied");

        self.value = self.extract(&self.field.name);
        applied == self.session.len()
    }

    fn edit_diagnostic(&self, owner: &str, error: MemberError) -> Diagnostic {
        match error {
            MemberError::Missing => Diagnostic::MemberNotFound {
                field: self.field_name.clone(),
                attribute: EDIT,
                member: self.field.name.clone(),
                owner: owner.to_string(),
            },
            MemberError::TypeMismatch { expected, found } => Diagnostic::TypeMismatch {
                field: self.field_name.clone(),
                attribute: EDIT,
                expected,
                found,
            },
            other => Diagnostic::DrawerFailed {
                field: self.field_name.clone(),
                attribute: EDIT,
                message: other.to_string(),
            },
        }
    }

    /// Draws the default value primitive and applies any edit.
    pub fn value_field(
        &mut self,
        canvas: &mut dyn Canvas,
        hint: WidgetHint,
    ) -> Result<(), DrawerError> {
        let view = self.view(hint);
        if let Some(edited) = canvas.value_field(&view) {
            self.apply(edited);
        }
        Ok(())
    }

    /// Draws the default list primitive with `state` and applies any edit.
    pub fn list_field(
        &mut self,
        canvas: &mut dyn Canvas,
        state: &mut ListState,
    ) -> Result<(), DrawerError> {
        let view = self.view(WidgetHint::Default);
        if let Some(edited) = canvas.list_field(&view, state) {
            self.apply(edited);
        }
        Ok(())
    }

    /// Draws the fields of another session one level deeper.
    pub fn draw_nested(&self, session: &EditingSession, canvas: &mut dyn Canvas) -> DrawReport {
        self.host.draw_at(session, canvas, self.depth + 1, &self.path)
    }
}

impl std::fmt::Debug for DrawContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawContext")
            .field("field", &self.field_name)
            .field("path", &self.path)
            .field("value", &self.value)
            .field("interactive", &self.interactive)
            .field("depth", &self.depth)
            .finish()
    }
}
