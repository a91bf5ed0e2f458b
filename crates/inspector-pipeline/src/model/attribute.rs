//! Declarative field metadata.
//!
//! An [`Attribute`] is a typed piece of metadata declared on a field. Each
//! concrete attribute type belongs to one [`Category`]; the category decides
//! where in the pipeline it runs, and the attribute's runtime type decides
//! which drawer runs it.

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;

use crate::model::TypeClass;

/// Pipeline category of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Yields a visibility/enablement verdict.
    Condition,
    /// Begin/end wrapper inside areas.
    Decorator,
    /// Begin/end wrapper outside decorators.
    Area,
    /// Attribute-driven value drawer.
    Property,
    /// Drawer for sequence fields.
    ListProperty,
    /// Value drawer bound to the field's runtime type.
    TargetType,
    /// Expands into other attributes before classification.
    Archetype,
}

impl Category {
    /// Returns a display name for this category.
    pub fn name(self) -> &'static str {
        match self {
            Category::Condition => "condition",
            Category::Decorator => "decorator",
            Category::Area => "area",
            Category::Property => "property",
            Category::ListProperty => "list",
            Category::TargetType => "target-type",
            Category::Archetype => "archetype",
        }
    }

    /// Returns true for categories whose entries open and close a scope.
    pub fn is_scoped(self) -> bool {
        matches!(self, Category::Decorator | Category::Area)
    }
}

/// Which side of a begin/end pair a scoped attribute declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Begin,
    End,
}

/// Access to `dyn Any` for attribute downcasting.
///
/// Implemented for every `'static` type; call it through `&dyn Attribute`,
/// never through a smart pointer, or the pointer itself is returned.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A metadata declaration attached to a field.
pub trait Attribute: AsAny + fmt::Debug {
    /// Stable display name, used in diagnostics.
    fn name(&self) -> &'static str;

    /// Pipeline category.
    fn category(&self) -> Category;

    /// Side of a begin/end pair. Only meaningful for scoped categories.
    fn edge(&self) -> Edge {
        Edge::Begin
    }

    /// Tag used to pair End entries with their Begin.
    fn pair_tag(&self) -> &'static str {
        self.name()
    }

    /// Runtime type class a `TargetType` attribute applies to.
    fn target_type(&self) -> Option<TypeClass> {
        None
    }

    /// Expansion of an `Archetype` attribute, in declaration order.
    fn expand(&self) -> Vec<Rc<dyn Attribute>> {
        Vec::new()
    }
}

/// One declared attribute instance on a field.
#[derive(Debug, Clone)]
pub struct FieldMetadataEntry {
    attribute: Rc<dyn Attribute>,
    priority: i32,
    order: usize,
}

impl FieldMetadataEntry {
    /// Creates an entry.
    ///
    /// `order` is the declaration index; it breaks priority ties.
    pub fn new(attribute: Rc<dyn Attribute>, priority: i32, order: usize) -> Self {
        Self {
            attribute,
            priority,
            order,
        }
    }

    /// Returns the attribute.
    pub fn attribute(&self) -> &dyn Attribute {
        &*self.attribute
    }

    /// Returns a shared handle to the attribute.
    pub fn attribute_rc(&self) -> &Rc<dyn Attribute> {
        &self.attribute
    }

    /// Returns the attribute's runtime type.
    pub fn attribute_type(&self) -> TypeId {
        self.attribute().as_any().type_id()
    }

    /// Downcasts the attribute to a concrete type.
    pub fn downcast<A: Attribute + 'static>(&self) -> Option<&A> {
        self.attribute().as_any().downcast_ref::<A>()
    }

    /// Returns the attribute name.
    pub fn name(&self) -> &'static str {
        self.attribute.name()
    }

    /// Returns the attribute category.
    pub fn category(&self) -> Category {
        self.attribute.category()
    }

    /// Returns the declared priority.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Returns the declaration index.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Sort key: ascending priority, then declaration order.
    pub fn sort_key(&self) -> (i32, usize) {
        (self.priority, self.order)
    }
}
