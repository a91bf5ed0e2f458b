//! Field descriptors and the metadata provider.
//!
//! A [`TypeSchema`] lists the inspectable fields of one host type together
//! with their declared attributes. Hosts expose schemas through
//! [`MetadataProvider`]; [`SchemaRegistry`] is the map-backed default.

use rustc_hash::FxHashMap;

use crate::model::{FieldIdentity, FieldMetadataEntry, SessionId, TypeClass};

/// One inspectable field of a host type.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name, used for member access.
    pub name: String,
    /// Display label. Defaults to the name.
    pub label: String,
    /// Host type that declares the field.
    pub declaring_type: String,
    /// Declared type class of the value.
    pub value_type: TypeClass,
    /// True for sequence fields (rendered by list drawers).
    pub is_sequence: bool,
    /// Declared attributes, in declaration order.
    pub entries: Vec<FieldMetadataEntry>,
}

impl FieldDescriptor {
    /// Creates a descriptor with no attributes.
    pub fn new(
        declaring_type: impl Into<String>,
        name: impl Into<String>,
        value_type: TypeClass,
    ) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            declaring_type: declaring_type.into(),
            value_type,
            is_sequence: value_type == TypeClass::List,
            entries: Vec::new(),
        }
    }

    /// `Type.field`, used to identify the field in diagnostics.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_type, self.name)
    }

    /// Joins this field's name onto a parent path.
    pub fn path_in(&self, parent: &str) -> String {
        if parent.is_empty() {
            self.name.clone()
        } else {
            format!("{parent}.{}", self.name)
        }
    }

    /// Persistent identity of this field at `path`.
    pub fn persistent_identity(&self, path: &str) -> FieldIdentity {
        FieldIdentity::persistent(&self.declaring_type, path)
    }

    /// Volatile identity of this field at `path` within `session`.
    pub fn volatile_identity(&self, session: SessionId, path: &str) -> FieldIdentity {
        FieldIdentity::volatile(session, path)
    }
}

/// The ordered fields of one host type.
#[derive(Debug, Clone)]
pub struct TypeSchema {
    /// Host type name.
    pub type_name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

impl TypeSchema {
    /// Creates an empty schema.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Supplies the declared fields and attributes for host types.
///
/// The result for a given type must be stable for the duration of a pass.
pub trait MetadataProvider {
    fn schema(&self, type_name: &str) -> Option<&TypeSchema>;
}

/// Map-backed [`MetadataProvider`].
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: FxHashMap<String, TypeSchema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema, replacing any previous schema for the same type.
    pub fn insert(&mut self, schema: TypeSchema) -> Option<TypeSchema> {
        self.schemas.insert(schema.type_name.clone(), schema)
    }

    /// Registers a schema (builder style).
    pub fn with(mut self, schema: TypeSchema) -> Self {
        self.insert(schema);
        self
    }

    /// Returns the number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true if no schemas are registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl MetadataProvider for SchemaRegistry {
    fn schema(&self, type_name: &str) -> Option<&TypeSchema> {
        self.schemas.get(type_name)
    }
}
