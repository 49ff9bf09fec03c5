//! Dynamically typed host values.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::builtins::builtins;
use super::class::ClassRef;
use super::function::{BoundMethod, Function};
use super::object::ObjectRef;
use crate::error::CallError;

/// Shared, growable list storage.
pub type ListRef = Arc<RwLock<Vec<Value>>>;

/// Shared, string-keyed map storage.
pub type MapRef = Arc<RwLock<IndexMap<String, Value>>>;

/// A value living in the host object model.
///
/// Scalars are stored inline. Everything else is reference-counted, and
/// identity (see [`Value::is`]) means pointing at the same allocation.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    List(ListRef),
    Map(MapRef),
    Function(Arc<Function>),
    BoundMethod(Arc<BoundMethod>),
    Object(ObjectRef),
    Class(ClassRef),
}

impl Value {
    /// A new list value.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(Arc::new(RwLock::new(items.into_iter().collect())))
    }

    /// A new map value.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(Arc::new(RwLock::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    /// Wrap a function.
    pub fn function(function: Function) -> Self {
        Value::Function(Arc::new(function))
    }

    /// Name of the value's class.
    pub fn type_name(&self) -> String {
        self.class().name().to_string()
    }

    /// The class this value is an instance of.
    pub fn class(&self) -> ClassRef {
        let b = builtins();
        match self {
            Value::None => b.none.clone(),
            Value::Bool(_) => b.bool.clone(),
            Value::Int(_) => b.int.clone(),
            Value::Float(_) => b.float.clone(),
            Value::Str(_) => b.str.clone(),
            Value::List(_) => b.list.clone(),
            Value::Map(_) => b.dict.clone(),
            Value::Function(_) => b.function.clone(),
            Value::BoundMethod(_) => b.method.clone(),
            Value::Object(obj) => obj.class().clone(),
            Value::Class(cls) => cls.metaclass().cloned().unwrap_or_else(|| b.type_.clone()),
        }
    }

    /// Whether the value is a class.
    pub fn is_class(&self) -> bool {
        matches!(self, Value::Class(_))
    }

    pub fn as_class(&self) -> Option<&ClassRef> {
        match self {
            Value::Class(cls) => Some(cls),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Reference identity.
    ///
    /// `None`, booleans and integers are interned, so equal scalars are
    /// identical. Floats never are. Everything else compares allocations.
    pub fn is(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => Arc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Arc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::BoundMethod(a), Value::BoundMethod(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Call the value with positional arguments.
    ///
    /// Calling a class creates a bare instance of it.
    pub fn call(&self, args: &[Value]) -> Result<Value, CallError> {
        match self {
            Value::Function(f) => f.call(args),
            Value::BoundMethod(m) => m.call(args),
            Value::Class(cls) if args.is_empty() => Ok(Value::Object(cls.instantiate())),
            Value::Class(cls) => Err(CallError::Arity {
                name: cls.name().to_string(),
                expected: 0,
                given: args.len(),
            }),
            other => Err(CallError::NotCallable {
                kind: other.type_name(),
            }),
        }
    }

    /// Look up `name` and call it.
    pub fn call_method(&self, name: &str, args: &[Value]) -> Result<Value, CallError> {
        let attr = super::resolve::getattr(self, name).ok_or_else(|| {
            CallError::Lookup(format!("'{}' has no attribute '{}'", self.type_name(), name))
        })?;
        attr.call(args)
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        equal(self, other, &mut Vec::new())
    }
}

fn storage_key<T>(storage: &Arc<T>) -> usize {
    Arc::as_ptr(storage) as *const () as usize
}

/// Structural equality. A pair of containers already under comparison
/// compares unequal, so cyclic values terminate.
fn equal(a: &Value, b: &Value, active: &mut Vec<(usize, usize)>) -> bool {
    if a.is(b) {
        return true;
    }
    match (a, b) {
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::List(x), Value::List(y)) => {
            let key = (storage_key(x), storage_key(y));
            if active.contains(&key) {
                return false;
            }
            let (left, right) = (x.read().clone(), y.read().clone());
            active.push(key);
            let same = left.len() == right.len()
                && left.iter().zip(&right).all(|(l, r)| equal(l, r, active));
            active.pop();
            same
        }
        (Value::Map(x), Value::Map(y)) => {
            let key = (storage_key(x), storage_key(y));
            if active.contains(&key) {
                return false;
            }
            let (left, right) = (x.read().clone(), y.read().clone());
            active.push(key);
            let same = left.len() == right.len()
                && left
                    .iter()
                    .all(|(k, l)| right.get(k).is_some_and(|r| equal(l, r, active)));
            active.pop();
            same
        }
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (a, b) => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active = RefCell::new(Vec::new());
        fmt::Debug::fmt(
            &Repr {
                value: self,
                active: &active,
            },
            f,
        )
    }
}

/// Debug rendering that prints a container it is already inside of as
/// `[...]` or `{...}`.
struct Repr<'a> {
    value: &'a Value,
    active: &'a RefCell<Vec<usize>>,
}

impl Repr<'_> {
    fn enter(&self, key: usize) -> bool {
        let mut active = self.active.borrow_mut();
        if active.contains(&key) {
            return false;
        }
        active.push(key);
        true
    }

    fn leave(&self) {
        self.active.borrow_mut().pop();
    }
}

impl fmt::Debug for Repr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                if !self.enter(storage_key(items)) {
                    return f.write_str("[...]");
                }
                let items = items.read().clone();
                let result = f
                    .debug_list()
                    .entries(items.iter().map(|value| Repr {
                        value,
                        active: self.active,
                    }))
                    .finish();
                self.leave();
                result
            }
            Value::Map(entries) => {
                if !self.enter(storage_key(entries)) {
                    return f.write_str("{...}");
                }
                let entries = entries.read().clone();
                let result = f
                    .debug_map()
                    .entries(entries.iter().map(|(key, value)| {
                        (
                            key,
                            Repr {
                                value,
                                active: self.active,
                            },
                        )
                    }))
                    .finish();
                self.leave();
                result
            }
            Value::Function(func) => write!(f, "<function {}>", func.name()),
            Value::BoundMethod(m) => write!(f, "<bound method {}>", m.function().name()),
            Value::Object(obj) => write!(f, "<{} object>", obj.class().name()),
            Value::Class(cls) => write!(f, "<class '{}'>", cls.name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<ClassRef> for Value {
    fn from(cls: ClassRef) -> Self {
        Value::Class(cls)
    }
}

impl From<&ClassRef> for Value {
    fn from(cls: &ClassRef) -> Self {
        Value::Class(cls.clone())
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}
