//! Per-field composition engine.
//!
//! A [`PropertyPipeline`] is built once per field from its classified
//! entries and resolved drawers. Each draw runs four phases:
//!
//! 1. **Gate**: evaluate conditions. `NonValid` stops here; `Disabled`
//!    opens a non-interactive scope around everything that follows.
//! 2. **Open**: run `begin` for areas, then decorators, in priority order.
//!    Each successful begin pushes one end obligation.
//! 3. **Render**: run exactly one value drawer: the list drawer for
//!    sequences, else the first target-type drawer matching the value's
//!    class, else the property drawer, else the default primitive.
//! 4. **Close**: pop obligations and run `end` in reverse.
//!
//! A drawer that fails or panics is reported and replaced. Scopes it left
//! open on the canvas are closed, so the canvas always sees balanced
//! begin/end pairs.

mod condition;
mod context;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

pub use condition::{ConditionMode, PropertyCondition};
pub use context::DrawContext;

use crate::classify::AttributeRegistry;
use crate::drawers::{DrawerBinding, DrawerResolver};
use crate::error::{ConfigurationError, Diagnostic, DrawerError};
use crate::extract::ExtractionResult;
use crate::host::InspectorHost;
use crate::model::{EditingSession, FieldDescriptor, FieldMetadataEntry, Value};
use crate::render::{Canvas, FieldView, LabelStyle, ListState, MessageKind, Scope};

/// Attribute name reported for faults in the default primitives.
const DEFAULT_DRAWER: &str = "default";

/// Attribute name used for diagnostics raised while reading a field's value.
pub const EXTRACT: &str = "extract";

/// Role of a step within a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepRole {
    Condition,
    Area,
    Decorator,
    TargetType,
    Property,
    List,
}

/// One metadata entry bound to its drawer.
#[derive(Debug, Clone)]
pub struct PipelineStep {
    entry: FieldMetadataEntry,
    role: StepRole,
    binding: DrawerBinding,
}

impl PipelineStep {
    pub fn entry(&self) -> &FieldMetadataEntry {
        &self.entry
    }

    pub fn role(&self) -> StepRole {
        self.role
    }

    pub fn name(&self) -> &'static str {
        self.entry.name()
    }

    fn evaluate(&self, cx: &mut DrawContext<'_>) -> PropertyCondition {
        match &self.binding {
            DrawerBinding::Condition(drawer) => drawer.evaluate(self.entry.attribute(), cx),
            _ => PropertyCondition::Valid,
        }
    }

    fn mode(&self) -> ConditionMode {
        match &self.binding {
            DrawerBinding::Condition(drawer) => drawer.mode(self.entry.attribute()),
            _ => ConditionMode::And,
        }
    }

    fn begin(&self, cx: &mut DrawContext<'_>, canvas: &mut dyn Canvas) -> Result<(), DrawerError> {
        match &self.binding {
            DrawerBinding::Scope(drawer) => drawer.begin(self.entry.attribute(), cx, canvas),
            _ => Ok(()),
        }
    }

    fn end(&self, cx: &mut DrawContext<'_>, canvas: &mut dyn Canvas) -> Result<(), DrawerError> {
        match &self.binding {
            DrawerBinding::Scope(drawer) => drawer.end(self.entry.attribute(), cx, canvas),
            _ => Ok(()),
        }
    }

    fn render(&self, cx: &mut DrawContext<'_>, canvas: &mut dyn Canvas) -> Result<(), DrawerError> {
        match &self.binding {
            DrawerBinding::Value(drawer) => drawer.render(self.entry.attribute(), cx, canvas),
            _ => Ok(()),
        }
    }
}

/// Result of drawing one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOutcome {
    /// Combined verdict of the field's conditions.
    pub condition: PropertyCondition,
    /// True if any drawer failed or panicked.
    pub faulted: bool,
    /// Number of area and decorator scopes that began.
    pub scopes_opened: usize,
}

impl DrawOutcome {
    pub fn is_hidden(&self) -> bool {
        self.condition == PropertyCondition::NonValid
    }

    pub fn is_disabled(&self) -> bool {
        self.condition == PropertyCondition::Disabled
    }
}

/// Why a drawer did not complete.
enum Fault {
    Error(DrawerError),
    Panic(String),
}

impl Fault {
    fn message(&self) -> String {
        match self {
            Fault::Error(e) => e.to_string(),
            Fault::Panic(message) => message.clone(),
        }
    }

    fn into_diagnostic(self, field: &str, attribute: &'static str) -> Diagnostic {
        match self {
            Fault::Error(DrawerError::TypeMismatch { expected, found }) => Diagnostic::TypeMismatch {
                field: field.to_string(),
                attribute,
                expected,
                found,
            },
            other => Diagnostic::DrawerFailed {
                field: field.to_string(),
                attribute,
                message: other.message(),
            },
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

/// Runs a drawer call, converting panics when `catch` is set.
fn guarded<R>(catch: bool, f: impl FnOnce() -> R) -> Result<R, Fault> {
    if !catch {
        return Ok(f());
    }
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| Fault::Panic(panic_message(&*payload)))
}

fn guarded_draw(
    catch: bool,
    f: impl FnOnce() -> Result<(), DrawerError>,
) -> Result<(), Fault> {
    guarded(catch, f)?.map_err(Fault::Error)
}

/// Reads a field's own value across the session's targets.
///
/// Host member access runs under the same panic guard as drawer calls. A
/// panic becomes a `W006` attributed to [`EXTRACT`].
pub(crate) fn extract_field(
    host: &InspectorHost,
    session: &EditingSession,
    field: &FieldDescriptor,
) -> Result<ExtractionResult, Diagnostic> {
    guarded(host.options().catch_panics, || {
        host.extraction()
            .try_get_value_across_targets(&field.name, session.targets())
    })
    .map_err(|fault| fault.into_diagnostic(&field.qualified_name(), EXTRACT))
}

/// Canvas wrapper that tracks open scopes.
///
/// Ends that do not match the innermost open scope are dropped, and
/// [`unwind_to`](Self::unwind_to) closes whatever a faulted drawer left
/// open.
struct ScopeTracker<'c> {
    inner: &'c mut dyn Canvas,
    open: Vec<Scope>,
}

impl<'c> ScopeTracker<'c> {
    fn new(inner: &'c mut dyn Canvas) -> Self {
        Self {
            inner,
            open: Vec::new(),
        }
    }

    fn depth(&self) -> usize {
        self.open.len()
    }

    /// Closes scopes down to `depth`. Returns how many were closed.
    fn unwind_to(&mut self, depth: usize) -> usize {
        let mut closed = 0;
        while self.open.len() > depth {
            if let Some(scope) = self.open.pop() {
                self.inner.end_scope(&scope);
                closed += 1;
            }
        }
        closed
    }
}

impl Canvas for ScopeTracker<'_> {
    fn begin_scope(&mut self, scope: &Scope) {
        self.open.push(scope.clone());
        self.inner.begin_scope(scope);
    }

    fn end_scope(&mut self, scope: &Scope) {
        if self.open.last() == Some(scope) {
            self.open.pop();
            self.inner.end_scope(scope);
        } else {
            tracing::debug!(%scope, "dropped end without matching begin");
        }
    }

    fn space(&mut self, amount: f32) {
        self.inner.space(amount);
    }

    fn label(&mut self, text: &str, style: LabelStyle) {
        self.inner.label(text, style);
    }

    fn separator(&mut self, thickness: f32, padding: f32) {
        self.inner.separator(thickness, padding);
    }

    fn help_box(&mut self, text: &str, kind: MessageKind) {
        self.inner.help_box(text, kind);
    }

    fn value_field(&mut self, view: &FieldView) -> Option<Value> {
        self.inner.value_field(view)
    }

    fn list_field(&mut self, view: &FieldView, state: &mut ListState) -> Option<Value> {
        self.inner.list_field(view, state)
    }

    fn scroll(&mut self, offset: f32) -> f32 {
        self.inner.scroll(offset)
    }

    fn invalid_drawer(&mut self, label: &str, message: &str) {
        self.inner.invalid_drawer(label, message);
    }
}

/// The resolved, ordered drawers of one field.
#[derive(Debug, Clone)]
pub struct PropertyPipeline {
    field_name: String,
    is_sequence: bool,
    conditions: Vec<PipelineStep>,
    /// Areas, then decorators.
    scopes: Vec<PipelineStep>,
    target_types: Vec<PipelineStep>,
    property: Option<PipelineStep>,
    list: Option<PipelineStep>,
    issues: Vec<Diagnostic>,
}

impl PropertyPipeline {
    /// Classifies `field`'s entries and binds each to its drawer.
    ///
    /// Entries that cannot be bound are left out and recorded in
    /// [`issues`](Self::issues).
    pub fn build(
        field: &FieldDescriptor,
        registry: &AttributeRegistry,
        resolver: &DrawerResolver,
    ) -> Self {
        let classified = registry.classify(field);
        let mut pipeline = Self {
            field_name: field.qualified_name(),
            is_sequence: field.is_sequence,
            conditions: Vec::new(),
            scopes: Vec::new(),
            target_types: Vec::new(),
            property: None,
            list: None,
            issues: classified.issues,
        };

        pipeline.conditions = pipeline.bind_all(resolver, classified.conditions, StepRole::Condition);
        pipeline.scopes = pipeline.bind_all(resolver, classified.areas, StepRole::Area);
        let decorators = pipeline.bind_all(resolver, classified.decorators, StepRole::Decorator);
        pipeline.scopes.extend(decorators);
        pipeline.target_types =
            pipeline.bind_all(resolver, classified.target_types, StepRole::TargetType);
        pipeline.property = classified
            .property
            .and_then(|entry| pipeline.bind(resolver, entry, StepRole::Property));
        pipeline.list = classified
            .list
            .and_then(|entry| pipeline.bind(resolver, entry, StepRole::List));

        tracing::trace!(
            field = %pipeline.field_name,
            steps = pipeline.len(),
            issues = pipeline.issues.len(),
            "pipeline built"
        );
        pipeline
    }

    fn bind_all(
        &mut self,
        resolver: &DrawerResolver,
        entries: Vec<FieldMetadataEntry>,
        role: StepRole,
    ) -> Vec<PipelineStep> {
        entries
            .into_iter()
            .filter_map(|entry| self.bind(resolver, entry, role))
            .collect()
    }

    fn bind(
        &mut self,
        resolver: &DrawerResolver,
        entry: FieldMetadataEntry,
        role: StepRole,
    ) -> Option<PipelineStep> {
        match resolver.resolve(&entry) {
            Ok(binding) => Some(PipelineStep {
                entry,
                role,
                binding,
            }),
            Err(ConfigurationError::UnmappedAttribute { attribute }) => {
                self.issues.push(Diagnostic::UnmappedAttribute {
                    field: self.field_name.clone(),
                    attribute,
                });
                None
            }
            Err(e) => {
                self.issues.push(Diagnostic::AttributeUsageInvalid {
                    field: self.field_name.clone(),
                    attribute: entry.name(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    /// `Type.field` of the field this pipeline draws.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Problems found while building.
    pub fn issues(&self) -> &[Diagnostic] {
        &self.issues
    }

    /// Every step in execution order: conditions, scopes, then value drawers.
    pub fn steps(&self) -> Vec<&PipelineStep> {
        self.conditions
            .iter()
            .chain(&self.scopes)
            .chain(&self.target_types)
            .chain(&self.property)
            .chain(&self.list)
            .collect()
    }

    /// `(attribute, role)` for every step, in execution order.
    pub fn step_names(&self) -> Vec<(&'static str, StepRole)> {
        self.steps().iter().map(|s| (s.name(), s.role())).collect()
    }

    pub fn len(&self) -> usize {
        self.steps().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evaluates the conditions: the AND group first, then the OR group.
    pub fn evaluate_conditions(&self, cx: &mut DrawContext<'_>) -> PropertyCondition {
        let catch = cx.options().catch_panics;
        let (and, or): (Vec<&PipelineStep>, Vec<&PipelineStep>) = self
            .conditions
            .iter()
            .partition(|step| step.mode() == ConditionMode::And);

        let all = PropertyCondition::all(and.iter().map(|step| self.evaluate_step(step, cx, catch)));
        if !all.is_valid() {
            return all;
        }
        PropertyCondition::any(or.iter().map(|step| self.evaluate_step(step, cx, catch)))
    }

    fn evaluate_step(
        &self,
        step: &PipelineStep,
        cx: &mut DrawContext<'_>,
        catch: bool,
    ) -> PropertyCondition {
        match guarded(catch, || step.evaluate(cx)) {
            Ok(condition) => condition,
            Err(fault) => {
                cx.report(fault.into_diagnostic(&self.field_name, step.name()));
                PropertyCondition::Valid
            }
        }
    }

    /// Draws the field.
    pub fn draw(&self, cx: &mut DrawContext<'_>, canvas: &mut dyn Canvas) -> DrawOutcome {
        let catch = cx.options().catch_panics;
        let condition = self.evaluate_conditions(cx);
        let mut outcome = DrawOutcome {
            condition,
            faulted: false,
            scopes_opened: 0,
        };
        if outcome.is_hidden() {
            tracing::trace!(field = %self.field_name, "hidden");
            return outcome;
        }

        let mut canvas = ScopeTracker::new(canvas);
        // (step, canvas depth before its begin). `None` is the disabled scope.
        let mut obligations: Vec<(Option<&PipelineStep>, usize)> = Vec::new();

        if outcome.is_disabled() {
            obligations.push((None, canvas.depth()));
            canvas.begin_scope(&Scope::Disabled);
            cx.set_interactive(false);
        }

        for step in &self.scopes {
            let depth = canvas.depth();
            match guarded_draw(catch, || step.begin(cx, &mut canvas)) {
                Ok(()) => {
                    obligations.push((Some(step), depth));
                    outcome.scopes_opened += 1;
                }
                Err(fault) => {
                    outcome.faulted = true;
                    canvas.unwind_to(depth);
                    cx.report(fault.into_diagnostic(&self.field_name, step.name()));
                }
            }
        }

        let depth = canvas.depth();
        if let Err((attribute, fault)) = self.render(cx, &mut canvas, catch) {
            outcome.faulted = true;
            canvas.unwind_to(depth);
            let message = fault.message();
            cx.report(fault.into_diagnostic(&self.field_name, attribute));
            canvas.invalid_drawer(cx.label(), &message);
        }

        while let Some((step, depth)) = obligations.pop() {
            let Some(step) = step else {
                canvas.unwind_to(depth);
                continue;
            };
            if let Err(fault) = guarded_draw(catch, || step.end(cx, &mut canvas)) {
                outcome.faulted = true;
                cx.report(fault.into_diagnostic(&self.field_name, step.name()));
                canvas.unwind_to(depth);
            } else if canvas.unwind_to(depth) > 0 {
                cx.report(Diagnostic::UnbalancedScope {
                    field: self.field_name.clone(),
                    attribute: step.name(),
                });
            }
        }

        outcome
    }

    fn render(
        &self,
        cx: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
        catch: bool,
    ) -> Result<(), (&'static str, Fault)> {
        let step = if self.is_sequence {
            self.list.as_ref()
        } else {
            let runtime = cx.runtime_class();
            self.target_types
                .iter()
                .find(|step| step.entry.attribute().target_type() == Some(runtime))
                .or(self.property.as_ref())
        };

        match step {
            Some(step) => {
                tracing::trace!(field = %self.field_name, drawer = step.name(), "render");
                guarded_draw(catch, || step.render(cx, canvas)).map_err(|f| (step.name(), f))
            }
            None if self.is_sequence => {
                let mut state = ListState::new(cx.options().default_list_style);
                guarded_draw(catch, || cx.list_field(canvas, &mut state))
                    .map_err(|f| (DEFAULT_DRAWER, f))
            }
            None => guarded_draw(catch, || cx.value_field(canvas, Default::default()))
                .map_err(|f| (DEFAULT_DRAWER, f)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let payload = panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(&*payload), "panicked: boom");

        let payload = panic::catch_unwind(|| panic!("{}", 7)).unwrap_err();
        assert_eq!(panic_message(&*payload), "panicked: 7");
    }

    #[test]
    fn test_guarded_passthrough() {
        assert!(matches!(guarded(false, || 3), Ok(3)));
        assert!(matches!(guarded(true, || 3), Ok(3)));
        assert!(matches!(
            guarded_draw(true, || Err(DrawerError::Failed("x".into()))),
            Err(Fault::Error(_))
        ));
    }

    #[test]
    fn test_tracker_unwinds() {
        use crate::render::RecordingCanvas;

        let mut recording = RecordingCanvas::new();
        {
            let mut tracker = ScopeTracker::new(&mut recording);
            tracker.begin_scope(&Scope::Horizontal);
            tracker.begin_scope(&Scope::Indent(1));
            // Wrong scope: dropped.
            tracker.end_scope(&Scope::Horizontal);
            assert_eq!(tracker.depth(), 2);
            assert_eq!(tracker.unwind_to(0), 2);
        }
        assert!(recording.is_balanced());
        assert_eq!(
            recording.scope_trace(),
            vec!["begin horizontal", "begin indent(1)", "end indent(1)", "end horizontal"]
        );
    }
}
