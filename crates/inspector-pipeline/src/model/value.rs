//! Runtime values read from inspected objects.
//!
//! Values are what member access yields and what comparers and drawers
//! consume. Each variant belongs to exactly one [`TypeClass`].

use std::fmt;
use std::rc::Rc;

use crate::model::Inspectable;

/// Runtime type classes for values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeClass {
    Null = 0,
    Bool = 1,
    Int = 2,
    Float = 3,
    Text = 4,
    Object = 5,
    List = 6,
}

impl TypeClass {
    /// Returns a short lowercase name for this class.
    pub fn name(self) -> &'static str {
        match self {
            TypeClass::Null => "null",
            TypeClass::Bool => "bool",
            TypeClass::Int => "int",
            TypeClass::Float => "float",
            TypeClass::Text => "text",
            TypeClass::Object => "object",
            TypeClass::List => "list",
        }
    }

    /// Returns true for `Int` and `Float`.
    pub fn is_numeric(self) -> bool {
        matches!(self, TypeClass::Int | TypeClass::Float)
    }
}

/// A shared handle to a host object.
///
/// Equality is reference identity: two handles are equal only when they
/// point at the same object.
#[derive(Clone)]
pub struct ObjectRef(Rc<dyn Inspectable>);

impl ObjectRef {
    /// Wraps a host object.
    pub fn new(object: Rc<dyn Inspectable>) -> Self {
        Self(object)
    }

    /// Returns the underlying object.
    pub fn get(&self) -> &dyn Inspectable {
        &*self.0
    }

    /// Returns the host type name of the referenced object.
    pub fn type_name(&self) -> &str {
        self.0.type_name()
    }

    /// Returns true if both handles point at the same object.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Inspectable + 'static> From<Rc<T>> for ObjectRef {
    fn from(object: Rc<T>) -> Self {
        Self(object)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({})", self.type_name())
    }
}

/// A value read from a field, accessor, or method.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value (e.g. a member returned nothing).
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// 64-bit signed integer. Enum and flag fields use this class.
    Int(i64),

    /// 64-bit IEEE 754 float.
    Float(f64),

    /// UTF-8 text.
    Text(String),

    /// Reference to another object, or `None` for a null reference.
    Object(Option<ObjectRef>),

    /// Ordered sequence of values.
    List(Vec<Value>),
}

impl Value {
    /// Returns the type class of this value.
    pub fn type_class(&self) -> TypeClass {
        match self {
            Value::Null => TypeClass::Null,
            Value::Bool(_) => TypeClass::Bool,
            Value::Int(_) => TypeClass::Int,
            Value::Float(_) => TypeClass::Float,
            Value::Text(_) => TypeClass::Text,
            Value::Object(_) => TypeClass::Object,
            Value::List(_) => TypeClass::List,
        }
    }

    /// Returns the value as `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as `i64` if it is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as `bool` if it is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as `&str` if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the referenced object, if any.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(Some(obj)) => Some(obj),
            _ => None,
        }
    }

    /// Returns the elements if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns true if this value is numeric.
    pub fn is_numeric(&self) -> bool {
        self.type_class().is_numeric()
    }

    /// Validates this value before it is written back to a target.
    ///
    /// Returns an error description if invalid, None if valid.
    pub fn validate(&self) -> Option<&'static str> {
        match self {
            Value::Float(v) if v.is_nan() => Some("NaN is not allowed in Float"),
            Value::List(items) => items.iter().find_map(Value::validate),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v:?}"),
            Value::Object(None) => f.write_str("None"),
            Value::Object(Some(obj)) => write!(f, "<{}>", obj.type_name()),
            Value::List(items) => write!(f, "[{} items]", items.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<ObjectRef> for Value {
    fn from(v: ObjectRef) -> Self {
        Value::Object(Some(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MapObject;

    #[test]
    fn test_type_class() {
        assert_eq!(Value::Null.type_class(), TypeClass::Null);
        assert_eq!(Value::from(true).type_class(), TypeClass::Bool);
        assert_eq!(Value::from(3).type_class(), TypeClass::Int);
        assert_eq!(Value::from(3.5).type_class(), TypeClass::Float);
        assert_eq!(Value::from("x").type_class(), TypeClass::Text);
        assert_eq!(Value::Object(None).type_class(), TypeClass::Object);
        assert_eq!(Value::List(vec![]).type_class(), TypeClass::List);
        assert!(TypeClass::Int.is_numeric());
        assert!(!TypeClass::Text.is_numeric());
    }

    #[test]
    fn test_object_ref_identity() {
        let a = MapObject::new("Enemy").into_ref();
        let b = MapObject::new("Enemy").into_ref();
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(Value::from(a.clone()), Value::from(a));
    }

    #[test]
    fn test_value_validation_nan() {
        assert!(Value::Float(f64::NAN).validate().is_some());
        assert!(Value::Float(f64::INFINITY).validate().is_none());
        assert!(Value::List(vec![Value::Float(1.0), Value::Float(f64::NAN)]).validate().is_some());
        assert!(Value::Int(1).validate().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Int(4).to_string(), "4");
        assert_eq!(Value::from("hi").to_string(), "\"hi\"");
        assert_eq!(Value::Object(None).to_string(), "None");
        let obj = MapObject::new("Weapon").into_ref();
        assert_eq!(Value::from(obj).to_string(), "<Weapon>");
        assert_eq!(Value::List(vec![Value::Null; 3]).to_string(), "[3 items]");
    }
}
