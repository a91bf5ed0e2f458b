//! Drawer capabilities and the attribute-to-drawer resolver.
//!
//! A drawer implements exactly one capability for exactly one attribute
//! type:
//!
//! | Capability          | Categories                           |
//! |---------------------|--------------------------------------|
//! | [`ConditionDrawer`] | condition                            |
//! | [`ScopeDrawer`]     | area, decorator                      |
//! | [`ValueDrawer`]     | property, list, target-type          |
//!
//! [`DrawerResolver`] maps an attribute's `TypeId` to its drawer. The
//! mapping is one-to-one and is consulted once per field when its pipeline
//! is built.

use std::any::TypeId;
use std::marker::PhantomData;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::builtins;
use crate::cache::StoreRegistry;
use crate::error::{ConfigurationError, DrawerError};
use crate::model::{Attribute, Category, FieldMetadataEntry};
use crate::pipeline::{ConditionMode, DrawContext, PropertyCondition};
use crate::render::Canvas;

/// Evaluates a condition attribute.
pub trait ConditionDrawer<A>: 'static {
    fn evaluate(&self, attribute: &A, cx: &mut DrawContext<'_>) -> PropertyCondition;

    /// How this condition combines with the others on the field.
    fn mode(&self, attribute: &A) -> ConditionMode {
        let _ = attribute;
        ConditionMode::And
    }
}

/// Wraps a field's value region with begin/end behavior.
///
/// Every scope opened on the canvas in `begin` must be closed in `end`.
pub trait ScopeDrawer<A>: 'static {
    fn begin(
        &self,
        attribute: &A,
        cx: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError>;

    fn end(
        &self,
        attribute: &A,
        cx: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError>;
}

/// Renders a field's value.
pub trait ValueDrawer<A>: 'static {
    fn render(
        &self,
        attribute: &A,
        cx: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError>;
}

pub(crate) trait ErasedCondition {
    fn evaluate(&self, attribute: &dyn Attribute, cx: &mut DrawContext<'_>) -> PropertyCondition;

    fn mode(&self, attribute: &dyn Attribute) -> ConditionMode;
}

pub(crate) trait ErasedScope {
    fn begin(
        &self,
        attribute: &dyn Attribute,
        cx: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError>;

    fn end(
        &self,
        attribute: &dyn Attribute,
        cx: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError>;
}

pub(crate) trait ErasedValue {
    fn render(
        &self,
        attribute: &dyn Attribute,
        cx: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError>;
}

/// A drawer bound to its attribute type.
struct Typed<A, D> {
    drawer: D,
    _attribute: PhantomData<fn(&A)>,
}

impl<A, D> Typed<A, D> {
    fn new(drawer: D) -> Self {
        Self {
            drawer,
            _attribute: PhantomData,
        }
    }
}

fn downcast<A: Attribute + 'static>(attribute: &dyn Attribute) -> Result<&A, DrawerError> {
    attribute.as_any().downcast_ref::<A>().ok_or_else(|| {
        DrawerError::Failed(format!(
            "drawer for {} received {}",
            short_type_name::<A>(),
            attribute.name()
        ))
    })
}

impl<A: Attribute + 'static, D: ConditionDrawer<A>> ErasedCondition for Typed<A, D> {
    fn evaluate(&self, attribute: &dyn Attribute, cx: &mut DrawContext<'_>) -> PropertyCondition {
        match attribute.as_any().downcast_ref::<A>() {
            Some(attribute) => self.drawer.evaluate(attribute, cx),
            None => PropertyCondition::Valid,
        }
    }

    fn mode(&self, attribute: &dyn Attribute) -> ConditionMode {
        match attribute.as_any().downcast_ref::<A>() {
            Some(attribute) => self.drawer.mode(attribute),
            None => ConditionMode::And,
        }
    }
}

impl<A: Attribute + 'static, D: ScopeDrawer<A>> ErasedScope for Typed<A, D> {
    fn begin(
        &self,
        attribute: &dyn Attribute,
        cx: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        self.drawer.begin(downcast::<A>(attribute)?, cx, canvas)
    }

    fn end(
        &self,
        attribute: &dyn Attribute,
        cx: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        self.drawer.end(downcast::<A>(attribute)?, cx, canvas)
    }
}

impl<A: Attribute + 'static, D: ValueDrawer<A>> ErasedValue for Typed<A, D> {
    fn render(
        &self,
        attribute: &dyn Attribute,
        cx: &mut DrawContext<'_>,
        canvas: &mut dyn Canvas,
    ) -> Result<(), DrawerError> {
        self.drawer.render(downcast::<A>(attribute)?, cx, canvas)
    }
}

/// A resolved drawer, tagged by capability.
#[derive(Clone)]
pub(crate) enum DrawerBinding {
    Condition(Rc<dyn ErasedCondition>),
    Scope(Rc<dyn ErasedScope>),
    Value(Rc<dyn ErasedValue>),
}

impl DrawerBinding {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            DrawerBinding::Condition(_) => "conditions",
            DrawerBinding::Scope(_) => "scopes",
            DrawerBinding::Value(_) => "values",
        }
    }

    fn serves(&self, category: Category) -> bool {
        match self {
            DrawerBinding::Condition(_) => category == Category::Condition,
            DrawerBinding::Scope(_) => category.is_scoped(),
            DrawerBinding::Value(_) => matches!(
                category,
                Category::Property | Category::ListProperty | Category::TargetType
            ),
        }
    }
}

impl std::fmt::Debug for DrawerBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DrawerBinding({})", self.kind())
    }
}

struct Registration {
    attribute: &'static str,
    binding: DrawerBinding,
}

/// Last path segment of a type name, e.g. `ShowIf`.
pub(crate) fn short_type_name<A>() -> &'static str {
    let full = std::any::type_name::<A>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Maps attribute types to drawers.
#[derive(Default)]
pub struct DrawerResolver {
    drawers: FxHashMap<TypeId, Registration>,
}

impl DrawerResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver with every built-in drawer registered.
    ///
    /// Stateful built-ins register their stores with `stores`.
    pub fn with_builtins(stores: &mut StoreRegistry) -> Self {
        let mut resolver = Self::new();
        if let Err(e) = builtins::install(&mut resolver, stores) {
            tracing::error!(error = %e, "built-in drawer registration failed");
        }
        resolver
    }

    /// Registers the condition drawer for attribute type `A`.
    pub fn register_condition<A, D>(&mut self, drawer: D) -> Result<(), ConfigurationError>
    where
        A: Attribute + 'static,
        D: ConditionDrawer<A>,
    {
        let binding = DrawerBinding::Condition(Rc::new(Typed::<A, D>::new(drawer)));
        self.insert::<A>(binding)
    }

    /// Registers the scope drawer for area or decorator type `A`.
    pub fn register_scope<A, D>(&mut self, drawer: D) -> Result<(), ConfigurationError>
    where
        A: Attribute + 'static,
        D: ScopeDrawer<A>,
    {
        let binding = DrawerBinding::Scope(Rc::new(Typed::<A, D>::new(drawer)));
        self.insert::<A>(binding)
    }

    /// Registers the value drawer for property, list, or target-type `A`.
    pub fn register_value<A, D>(&mut self, drawer: D) -> Result<(), ConfigurationError>
    where
        A: Attribute + 'static,
        D: ValueDrawer<A>,
    {
        let binding = DrawerBinding::Value(Rc::new(Typed::<A, D>::new(drawer)));
        self.insert::<A>(binding)
    }

    fn insert<A: Attribute + 'static>(
        &mut self,
        binding: DrawerBinding,
    ) -> Result<(), ConfigurationError> {
        let attribute = short_type_name::<A>();
        let id = TypeId::of::<A>();
        if self.drawers.contains_key(&id) {
            return Err(ConfigurationError::DuplicateDrawer { attribute });
        }
        self.drawers.insert(id, Registration { attribute, binding });
        Ok(())
    }

    /// Returns true if a drawer is registered for `A`.
    pub fn is_registered<A: Attribute + 'static>(&self) -> bool {
        self.drawers.contains_key(&TypeId::of::<A>())
    }

    /// Returns the names of every registered attribute type, sorted.
    pub fn registered(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.drawers.values().map(|r| r.attribute).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.drawers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawers.is_empty()
    }

    /// Finds the drawer for an entry and checks it serves the entry's category.
    pub(crate) fn resolve(
        &self,
        entry: &FieldMetadataEntry,
    ) -> Result<DrawerBinding, ConfigurationError> {
        let Some(registration) = self.drawers.get(&entry.attribute_type()) else {
            return Err(ConfigurationError::UnmappedAttribute {
                attribute: entry.name(),
            });
        };
        if !registration.binding.serves(entry.category()) {
            return Err(ConfigurationError::CapabilityMismatch {
                attribute: entry.name(),
                category: entry.category().name(),
                drawer: registration.binding.kind(),
            });
        }
        Ok(registration.binding.clone())
    }
}

impl std::fmt::Debug for DrawerResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawerResolver")
            .field("registered", &self.registered())
            .finish()
    }
}
