//! Builder API for declaring type schemas.
//!
//! Provides a fluent interface for declaring fields and their attributes.
//!
//! # Example
//!
//! ```rust
//! use inspector_pipeline::model::{SchemaBuilder, TypeClass};
//! use inspector_pipeline::builtins::{ShowIf, Space, Title};
//!
//! let schema = SchemaBuilder::new("Enemy")
//!     .field("alive", TypeClass::Bool, |f| f)
//!     .field("health", TypeClass::Int, |f| f
//!         .attribute(Title::new("Stats"))
//!         .attribute_at(1, Space::new(4.0, 0.0))
//!         .attribute(ShowIf::new("alive", true))
//!     )
//!     .build();
//!
//! assert_eq!(schema.fields.len(), 2);
//! assert_eq!(schema.fields[1].entries.len(), 3);
//! ```

use std::rc::Rc;

use crate::model::{Attribute, FieldDescriptor, FieldMetadataEntry, TypeClass, TypeSchema};

/// Builder for a [`TypeSchema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    type_name: String,
    fields: Vec<FieldDescriptor>,
}

impl SchemaBuilder {
    /// Creates a builder for the given host type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field declared with a builder function.
    pub fn field<F>(mut self, name: impl Into<String>, value_type: TypeClass, f: F) -> Self
    where
        F: FnOnce(FieldBuilder) -> FieldBuilder,
    {
        let descriptor = FieldDescriptor::new(self.type_name.clone(), name, value_type);
        self.fields.push(f(FieldBuilder::new(descriptor)).build());
        self
    }

    /// Adds a sequence field whose elements have the given type class.
    pub fn sequence<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(FieldBuilder) -> FieldBuilder,
    {
        let mut descriptor = FieldDescriptor::new(self.type_name.clone(), name, TypeClass::List);
        descriptor.is_sequence = true;
        self.fields.push(f(FieldBuilder::new(descriptor)).build());
        self
    }

    /// Returns the number of fields added so far.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Builds the final schema.
    pub fn build(self) -> TypeSchema {
        TypeSchema {
            type_name: self.type_name,
            fields: self.fields,
        }
    }
}

/// Builder for one field's label and attributes.
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    descriptor: FieldDescriptor,
}

impl FieldBuilder {
    fn new(descriptor: FieldDescriptor) -> Self {
        Self { descriptor }
    }

    /// Sets the display label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.descriptor.label = label.into();
        self
    }

    /// Declares an attribute at priority 0.
    pub fn attribute<A: Attribute + 'static>(self, attribute: A) -> Self {
        self.attribute_at(0, attribute)
    }

    /// Declares an attribute at the given priority.
    pub fn attribute_at<A: Attribute + 'static>(self, priority: i32, attribute: A) -> Self {
        self.shared_at(priority, Rc::new(attribute))
    }

    /// Declares an already-shared attribute at the given priority.
    pub fn shared_at(mut self, priority: i32, attribute: Rc<dyn Attribute>) -> Self {
        let order = self.descriptor.entries.len();
        self.descriptor
            .entries
            .push(FieldMetadataEntry::new(attribute, priority, order));
        self
    }

    fn build(self) -> FieldDescriptor {
        self.descriptor
    }
}
