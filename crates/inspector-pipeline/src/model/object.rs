//! Host object model.
//!
//! The engine never reflects over Rust types. Hosts expose their objects
//! through [`Inspectable`], which resolves members by name, and group the
//! objects being edited together into an [`EditingSession`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::MemberError;
use crate::model::{ObjectRef, SessionId, TypeClass, Value};

/// Generic member access over a host object.
///
/// Each method backs one extraction strategy. The defaults report
/// [`MemberError::Missing`], so a host only implements the strategies its
/// object model supports.
pub trait Inspectable {
    /// Host type name, used for schema lookup and diagnostics.
    fn type_name(&self) -> &str;

    /// Reads a stored field.
    fn field(&self, name: &str) -> Result<Value, MemberError> {
        let _ = name;
        Err(MemberError::Missing)
    }

    /// Reads a computed accessor.
    fn accessor(&self, name: &str) -> Result<Value, MemberError> {
        let _ = name;
        Err(MemberError::Missing)
    }

    /// Invokes a zero-argument method.
    fn invoke(&self, name: &str) -> Result<Value, MemberError> {
        let _ = name;
        Err(MemberError::Missing)
    }

    /// Writes a stored field.
    fn set_field(&self, name: &str, value: Value) -> Result<(), MemberError> {
        let _ = (name, value);
        Err(MemberError::ReadOnly)
    }
}

type Computed = Box<dyn Fn(&MapObject) -> Result<Value, MemberError>>;

/// A map-backed [`Inspectable`] for hosts without their own object model.
///
/// Fields are kept in declaration order. Writes must keep a field's type
/// class; a `Null` field accepts any value.
pub struct MapObject {
    type_name: String,
    fields: RefCell<Vec<(String, Value)>>,
    accessors: FxHashMap<String, Computed>,
    methods: FxHashMap<String, Computed>,
}

impl MapObject {
    /// Creates an empty object of the given host type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: RefCell::new(Vec::new()),
            accessors: FxHashMap::default(),
            methods: FxHashMap::default(),
        }
    }

    /// Adds a stored field.
    pub fn with_field(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.borrow_mut().push((name.into(), value.into()));
        self
    }

    /// Adds a computed accessor.
    pub fn with_accessor<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&MapObject) -> Value + 'static,
    {
        self.accessors
            .insert(name.into(), Box::new(move |obj| Ok(f(obj))));
        self
    }

    /// Adds a zero-argument method. Methods may fail.
    pub fn with_method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&MapObject) -> Result<Value, MemberError> + 'static,
    {
        self.methods.insert(name.into(), Box::new(f));
        self
    }

    /// Returns a stored field's current value.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.fields
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    /// Returns the names of stored fields in declaration order.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.borrow().iter().map(|(n, _)| n.clone()).collect()
    }

    /// Wraps the object in a shared handle.
    pub fn into_ref(self) -> ObjectRef {
        ObjectRef::new(Rc::new(self))
    }
}

impl Inspectable for MapObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn field(&self, name: &str) -> Result<Value, MemberError> {
        self.get(name).ok_or(MemberError::Missing)
    }

    fn accessor(&self, name: &str) -> Result<Value, MemberError> {
        match self.accessors.get(name) {
            Some(f) => f(self),
            None => Err(MemberError::Missing),
        }
    }

    fn invoke(&self, name: &str) -> Result<Value, MemberError> {
        match self.methods.get(name) {
            Some(f) => f(self),
            None => Err(MemberError::Missing),
        }
    }

    fn set_field(&self, name: &str, value: Value) -> Result<(), MemberError> {
        let mut fields = self.fields.borrow_mut();
        let slot = fields
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .ok_or(MemberError::Missing)?;

        let expected = slot.type_class();
        let found = value.type_class();
        if expected != TypeClass::Null && expected != found {
            return Err(MemberError::TypeMismatch { expected, found });
        }
        *slot = value;
        Ok(())
    }
}

impl fmt::Debug for MapObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapObject")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields.borrow())
            .field("accessors", &self.accessors.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

/// The set of objects edited together by one inspector.
#[derive(Debug, Clone)]
pub struct EditingSession {
    id: SessionId,
    targets: Vec<ObjectRef>,
}

impl EditingSession {
    /// Opens a session over the given targets with a fresh id.
    pub fn new(targets: impl IntoIterator<Item = ObjectRef>) -> Self {
        Self {
            id: SessionId::new(),
            targets: targets.into_iter().collect(),
        }
    }

    /// Opens a session over a single target.
    pub fn single(target: ObjectRef) -> Self {
        Self::new([target])
    }

    /// Returns the session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the targets in declaration order.
    pub fn targets(&self) -> &[ObjectRef] {
        &self.targets
    }

    /// Returns the number of targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns true if there are no targets.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Returns the type name of the first target.
    pub fn type_name(&self) -> Option<&str> {
        self.targets.first().map(ObjectRef::type_name)
    }

    /// Returns the first target whose type differs from the first one.
    pub fn first_foreign_type(&self) -> Option<&str> {
        let first = self.type_name()?;
        self.targets
            .iter()
            .map(ObjectRef::type_name)
            .find(|name| *name != first)
    }

    /// Returns true if this session edits exactly `targets`, in order.
    pub fn has_targets(&self, targets: &[ObjectRef]) -> bool {
        self.targets.len() == targets.len()
            && self.targets.iter().zip(targets).all(|(a, b)| a.ptr_eq(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy() -> MapObject {
        MapObject::new("Enemy")
            .with_field("health", 10)
            .with_field("target", Value::Object(None))
            .with_accessor("alive", |o| {
                Value::Bool(o.get("health").and_then(|v| v.as_i64()).unwrap_or(0) > 0)
            })
            .with_method("fail", |_| Err(MemberError::Faulted("boom".to_string())))
    }

    #[test]
    fn test_member_access() {
        let obj = enemy();
        assert_eq!(obj.field("health"), Ok(Value::Int(10)));
        assert_eq!(obj.accessor("alive"), Ok(Value::Bool(true)));
        assert_eq!(obj.field("alive"), Err(MemberError::Missing));
        assert!(matches!(obj.invoke("fail"), Err(MemberError::Faulted(_))));
        assert_eq!(obj.invoke("missing"), Err(MemberError::Missing));
    }

    #[test]
    fn test_set_field_keeps_type_class() {
        let obj = enemy();
        assert!(obj.set_field("health", Value::Int(0)).is_ok());
        assert_eq!(obj.accessor("alive"), Ok(Value::Bool(false)));

        let err = obj.set_field("health", Value::from("x")).unwrap_err();
        assert_eq!(
            err,
            MemberError::TypeMismatch {
                expected: TypeClass::Int,
                found: TypeClass::Text
            }
        );
        assert_eq!(obj.set_field("nope", Value::Null), Err(MemberError::Missing));
    }

    #[test]
    fn test_session_targets() {
        let a = enemy().into_ref();
        let b = enemy().into_ref();
        let c = MapObject::new("Player").into_ref();

        let session = EditingSession::new([a.clone(), b.clone()]);
        assert_eq!(session.len(), 2);
        assert_eq!(session.type_name(), Some("Enemy"));
        assert_eq!(session.first_foreign_type(), None);
        assert!(session.has_targets(&[a.clone(), b.clone()]));
        assert!(!session.has_targets(&[b, a.clone()]));

        let mixed = EditingSession::new([a, c]);
        assert_eq!(mixed.first_foreign_type(), Some("Player"));
    }
}
