//! The inspector host.
//!
//! [`InspectorHost`] owns every collaborator of the pipeline and drives one
//! redraw: it looks up the schema of the edited type, fetches (or builds)
//! each field's [`PropertyPipeline`], and draws the fields in declaration
//! order. Host events are forwarded to the store registry.
//!
//! # Example
//!
//! ```rust
//! use inspector_pipeline::builtins::{Group, ShowIf};
//! use inspector_pipeline::model::{EditingSession, MapObject, SchemaBuilder, SchemaRegistry, TypeClass};
//! use inspector_pipeline::render::RecordingCanvas;
//! use inspector_pipeline::InspectorHost;
//!
//! let schema = SchemaBuilder::new("Enemy")
//!     .field("alive", TypeClass::Bool, |f| f)
//!     .field("health", TypeClass::Int, |f| f
//!         .attribute(Group::titled("Stats"))
//!         .attribute(ShowIf::new("alive", true)))
//!     .build();
//! let host = InspectorHost::new(SchemaRegistry::new().with(schema));
//!
//! let enemy = MapObject::new("Enemy")
//!     .with_field("alive", true)
//!     .with_field("health", 10)
//!     .into_ref();
//! let mut canvas = RecordingCanvas::new();
//! let report = host.draw(&EditingSession::single(enemy), &mut canvas);
//!
//! assert_eq!(report.drawn, 2);
//! assert!(canvas.is_balanced());
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::cache::StoreRegistry;
use crate::classify::AttributeRegistry;
use crate::compare::ComparisonEngine;
use crate::diagnostics::{DiagnosticSink, Diagnostics, TracingSink};
use crate::drawers::DrawerResolver;
use crate::error::{ConfigurationError, Diagnostic};
use crate::extract::ExtractionService;
use crate::model::{EditingSession, FieldDescriptor, FieldIdentity, MetadataProvider};
use crate::options::InspectorOptions;
use crate::pipeline::{extract_field, DrawContext, DrawOutcome, PropertyPipeline};
use crate::render::{Canvas, MessageKind};

/// Attribute name used for session-level diagnostics.
const SESSION: &str = "EditingSession";

/// Counters for one [`InspectorHost::draw`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawReport {
    /// Fields that were drawn, including disabled ones.
    pub drawn: usize,
    pub hidden: usize,
    pub disabled: usize,
    /// Fields where at least one drawer failed.
    pub faulted: usize,
    /// Sessions not drawn because the nesting limit was reached.
    pub truncated: usize,
}

impl DrawReport {
    fn record(&mut self, outcome: &DrawOutcome) {
        if outcome.is_hidden() {
            self.hidden += 1;
            return;
        }
        self.drawn += 1;
        if outcome.is_disabled() {
            self.disabled += 1;
        }
        if outcome.faulted {
            self.faulted += 1;
        }
    }
}

/// Builder for an [`InspectorHost`].
pub struct InspectorHostBuilder {
    metadata: Box<dyn MetadataProvider>,
    options: InspectorOptions,
    sink: Box<dyn DiagnosticSink>,
    comparison: ComparisonEngine,
    extraction: ExtractionService,
}

impl InspectorHostBuilder {
    pub fn options(mut self, options: InspectorOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the default [`TracingSink`].
    pub fn sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn comparison(mut self, comparison: ComparisonEngine) -> Self {
        self.comparison = comparison;
        self
    }

    pub fn extraction(mut self, extraction: ExtractionService) -> Self {
        self.extraction = extraction;
        self
    }

    pub fn build(self) -> InspectorHost {
        let mut stores = StoreRegistry::new();
        let resolver = DrawerResolver::with_builtins(&mut stores);
        InspectorHost {
            metadata: self.metadata,
            registry: AttributeRegistry::new(self.options.max_archetype_depth),
            resolver,
            comparison: self.comparison,
            extraction: self.extraction,
            stores,
            diagnostics: Diagnostics::new(self.sink, self.options.report_once),
            options: self.options,
            pipelines: RefCell::new(FxHashMap::default()),
        }
    }
}

/// Drives the pipeline for every field of an editing session.
pub struct InspectorHost {
    metadata: Box<dyn MetadataProvider>,
    registry: AttributeRegistry,
    resolver: DrawerResolver,
    comparison: ComparisonEngine,
    extraction: ExtractionService,
    stores: StoreRegistry,
    diagnostics: Diagnostics,
    options: InspectorOptions,
    pipelines: RefCell<FxHashMap<FieldIdentity, Rc<PropertyPipeline>>>,
}

impl InspectorHost {
    /// Creates a host with built-in drawers and default options.
    pub fn new(metadata: impl MetadataProvider + 'static) -> Self {
        Self::builder(metadata).build()
    }

    pub fn builder(metadata: impl MetadataProvider + 'static) -> InspectorHostBuilder {
        InspectorHostBuilder {
            metadata: Box::new(metadata),
            options: InspectorOptions::default(),
            sink: Box::new(TracingSink),
            comparison: ComparisonEngine::new(),
            extraction: ExtractionService::new(),
        }
    }

    pub fn options(&self) -> &InspectorOptions {
        &self.options
    }

    pub fn comparison(&self) -> &ComparisonEngine {
        &self.comparison
    }

    pub fn extraction(&self) -> &ExtractionService {
        &self.extraction
    }

    pub fn stores(&self) -> &StoreRegistry {
        &self.stores
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn resolver(&self) -> &DrawerResolver {
        &self.resolver
    }

    /// Registers additional drawers and their stores.
    ///
    /// Cached pipelines are dropped so the new drawers take effect.
    pub fn register_drawers<F>(&mut self, register: F) -> Result<(), ConfigurationError>
    where
        F: FnOnce(&mut DrawerResolver, &mut StoreRegistry) -> Result<(), ConfigurationError>,
    {
        let result = register(&mut self.resolver, &mut self.stores);
        self.pipelines.get_mut().clear();
        result
    }

    /// Number of cached pipelines.
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.borrow().len()
    }

    /// Returns the pipeline for `field` at `path`, building it on first use.
    pub fn pipeline(&self, field: &FieldDescriptor, path: &str) -> Rc<PropertyPipeline> {
        let key = field.persistent_identity(path);
        if let Some(pipeline) = self.pipelines.borrow().get(&key) {
            return Rc::clone(pipeline);
        }

        let pipeline = Rc::new(PropertyPipeline::build(field, &self.registry, &self.resolver));
        for issue in pipeline.issues() {
            self.diagnostics.report(issue.clone());
        }
        if let Ok(mut pipelines) = self.pipelines.try_borrow_mut() {
            pipelines.insert(key, Rc::clone(&pipeline));
        }
        pipeline
    }

    /// Draws every field of the session's type.
    ///
    /// Store clears deferred by an earlier event run first.
    pub fn draw(&self, session: &EditingSession, canvas: &mut dyn Canvas) -> DrawReport {
        self.stores.flush_deferred();
        self.draw_at(session, canvas, 0, "")
    }

    pub(crate) fn draw_at(
        &self,
        session: &EditingSession,
        canvas: &mut dyn Canvas,
        depth: usize,
        parent_path: &str,
    ) -> DrawReport {
        let mut report = DrawReport::default();
        let Some(type_name) = session.type_name() else {
            return report;
        };

        if depth > self.options.max_depth {
            tracing::debug!(type_name, depth, "nesting limit reached");
            canvas.help_box(
                &format!("{type_name}: nesting limit of {} reached", self.options.max_depth),
                MessageKind::Warning,
            );
            report.truncated += 1;
            return report;
        }

        if let Some(foreign) = session.first_foreign_type() {
            self.diagnostics.report(Diagnostic::AttributeUsageInvalid {
                field: type_name.to_string(),
                attribute: SESSION,
                reason: format!("targets mix {type_name} and {foreign}"),
            });
            canvas.help_box("Cannot edit objects of different types", MessageKind::Error);
            return report;
        }

        let Some(schema) = self.metadata.schema(type_name) else {
            canvas.help_box(&format!("No inspector for {type_name}"), MessageKind::Info);
            return report;
        };

        for field in &schema.fields {
            let path = field.path_in(parent_path);
            let value = match extract_field(self, session, field) {
                Ok(value) => value,
                Err(diagnostic) => {
                    self.diagnostics.report(diagnostic);
                    canvas.invalid_drawer(&field.label, "value could not be read");
                    report.drawn += 1;
                    report.faulted += 1;
                    continue;
                }
            };
            let pipeline = self.pipeline(field, &path);
            let mut cx = DrawContext::new(self, session, field, path, depth, value);
            let outcome = pipeline.draw(&mut cx, canvas);
            report.record(&outcome);
        }
        report
    }

    /// Handles a reload: clears every store and every cached pipeline.
    ///
    /// Returns the number of cache entries removed.
    pub fn reload(&self) -> usize {
        let removed = self.stores.reload();
        match self.pipelines.try_borrow_mut() {
            Ok(mut pipelines) => pipelines.clear(),
            Err(_) => tracing::warn!("pipeline cache busy during reload"),
        }
        tracing::debug!(removed, "inspector reloaded");
        removed
    }

    /// Handles a selection change: clears volatile-keyed stores.
    ///
    /// Returns the number of cache entries removed.
    pub fn selection_changed(&self) -> usize {
        self.stores.selection_changed()
    }
}

impl std::fmt::Debug for InspectorHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InspectorHost")
            .field("options", &self.options)
            .field("resolver", &self.resolver)
            .field("stores", &self.stores)
            .field("pipelines", &self.pipeline_count())
            .finish()
    }
}
