//! Data model types.
//!
//! This module contains the types the engine operates on:
//! - Values and type classes
//! - Field identities (cache keys)
//! - Attributes and metadata entries
//! - Host objects and editing sessions
//! - Field descriptors, schemas, and builders

pub mod attribute;
pub mod builder;
pub mod field;
pub mod id;
pub mod object;
pub mod value;

pub use attribute::{AsAny, Attribute, Category, Edge, FieldMetadataEntry};
pub use builder::{FieldBuilder, SchemaBuilder};
pub use field::{FieldDescriptor, MetadataProvider, SchemaRegistry, TypeSchema};
pub use id::{derived_id, format_id, FieldIdentity, Id, KeyKind, SessionId, NIL_ID};
pub use object::{EditingSession, Inspectable, MapObject};
pub use value::{ObjectRef, TypeClass, Value};
