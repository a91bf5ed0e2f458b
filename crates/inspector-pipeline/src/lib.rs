//! Inspector pipeline: attribute resolution and drawer composition for
//! generic property inspectors.
//!
//! Fields of an inspected type carry declarative attributes (conditions,
//! decorators, areas, property and list drawers, archetypes). This crate
//! turns each field's attributes into an ordered [`PropertyPipeline`],
//! evaluates its visibility conditions against live object values, and
//! draws it through a backend-neutral [`render::Canvas`].
//!
//! # Overview
//!
//! - **Attribute classification**: archetypes expand, entries sort by
//!   priority, misuse is reported instead of drawn
//! - **Drawer composition**: areas wrap decorators wrap the value, scopes
//!   always close in reverse order, even when a drawer fails
//! - **Multi-target editing**: every value is read from all targets, and
//!   disagreement is shown as a mixed value
//! - **State caches**: per-field drawer state keyed by persistent or
//!   volatile identity, cleared on reload and selection change
//!
//! # Quick Start
//!
//! ```rust
//! use inspector_pipeline::builtins::{HideIf, Range, Title};
//! use inspector_pipeline::model::{EditingSession, MapObject, SchemaBuilder, SchemaRegistry, TypeClass};
//! use inspector_pipeline::render::RecordingCanvas;
//! use inspector_pipeline::InspectorHost;
//!
//! let schema = SchemaBuilder::new("Light")
//!     .field("enabled", TypeClass::Bool, |f| f)
//!     .field("intensity", TypeClass::Float, |f| f
//!         .attribute(Title::new("Output"))
//!         .attribute(Range::new(0.0, 8.0))
//!         .attribute(HideIf::new("enabled", false)))
//!     .build();
//! let host = InspectorHost::new(SchemaRegistry::new().with(schema));
//!
//! let light = MapObject::new("Light")
//!     .with_field("enabled", true)
//!     .with_field("intensity", 1.5)
//!     .into_ref();
//! let mut canvas = RecordingCanvas::new();
//! host.draw(&EditingSession::single(light), &mut canvas);
//!
//! assert_eq!(
//!     canvas.summaries(),
//!     vec!["value enabled=true", "label Output", "separator", "value intensity=1.5"]
//! );
//! ```
//!
//! # Modules
//!
//! - [`model`]: values, inspectable objects, sessions, field schemas, attributes
//! - [`classify`]: attribute classification into pipeline roles
//! - [`drawers`]: drawer capability traits and the drawer registry
//! - [`pipeline`]: per-field pipelines, conditions, and the draw context
//! - [`compare`]: the pluggable comparison engine
//! - [`extract`]: member extraction across targets
//! - [`cache`]: identity-keyed drawer state stores
//! - [`builtins`]: the standard attribute library
//! - [`render`]: the canvas abstraction and a recording canvas
//! - [`error`]: configuration errors and diagnostics

pub mod builtins;
pub mod cache;
pub mod classify;
pub mod compare;
pub mod diagnostics;
pub mod drawers;
pub mod error;
pub mod extract;
pub mod host;
pub mod model;
pub mod options;
pub mod pipeline;
pub mod render;

// Re-export commonly used types at crate root
pub use cache::{CacheStore, StoreRegistry};
pub use classify::AttributeRegistry;
pub use compare::{ComparisonEngine, ComparisonOperator, ValueComparer};
pub use diagnostics::{CollectingSink, DiagnosticSink, Diagnostics, TracingSink};
pub use drawers::{ConditionDrawer, DrawerResolver, ScopeDrawer, ValueDrawer};
pub use error::{ConfigurationError, Diagnostic, DiagnosticCode, DrawerError, MemberError};
pub use extract::{ExtractionResult, ExtractionService, ValueExtractor};
pub use host::{DrawReport, InspectorHost, InspectorHostBuilder};
pub use model::{
    Attribute, Category, EditingSession, FieldDescriptor, FieldIdentity, MapObject, ObjectRef,
    SchemaBuilder, SchemaRegistry, TypeClass, Value,
};
pub use options::InspectorOptions;
pub use pipeline::{DrawContext, PropertyCondition, PropertyPipeline};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
