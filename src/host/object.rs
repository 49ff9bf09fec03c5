//! Host object instances and their per-instance storage.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::class::ClassRef;
use super::value::Value;

/// Shared handle to an object.
pub type ObjectRef = Arc<Object>;

/// An instance of a class.
///
/// Own storage sits behind a lock so instances can change between
/// conformance queries and be inspected from several threads.
pub struct Object {
    class: ClassRef,
    slots: RwLock<IndexMap<String, Value>>,
}

impl Object {
    /// Create an instance with empty storage.
    pub fn new(class: &ClassRef) -> ObjectRef {
        Arc::new(Self {
            class: class.clone(),
            slots: RwLock::new(IndexMap::new()),
        })
    }

    /// Create an instance with the given own attributes.
    pub fn with_slots<K: Into<String>>(
        class: &ClassRef,
        slots: impl IntoIterator<Item = (K, Value)>,
    ) -> ObjectRef {
        Arc::new(Self {
            class: class.clone(),
            slots: RwLock::new(slots.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        })
    }

    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    /// Own attribute, ignoring the class.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.slots.read().get(name).cloned()
    }

    /// Whether `name` is in own storage.
    pub fn has_own(&self, name: &str) -> bool {
        self.slots.read().contains_key(name)
    }

    /// Set an own attribute, returning the previous value.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.slots.write().insert(name.into(), value.into())
    }

    /// Remove an own attribute.
    pub fn remove(&self, name: &str) -> Option<Value> {
        self.slots.write().shift_remove(name)
    }

    /// Names in own storage, in insertion order.
    pub fn own_names(&self) -> Vec<String> {
        self.slots.read().keys().cloned().collect()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("class", &self.class.name())
            .field("slots", &self.own_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Class;

    #[test]
    fn storage_is_live() {
        let cls = Class::builder("Point").build().unwrap();
        let obj = Object::with_slots(&cls, [("x", Value::Int(1))]);

        assert!(obj.has_own("x"));
        assert!(!obj.has_own("y"));

        obj.set("y", 2i64);
        assert_eq!(obj.get("y"), Some(Value::Int(2)));
        assert_eq!(obj.own_names(), vec!["x", "y"]);

        assert_eq!(obj.remove("x"), Some(Value::Int(1)));
        assert!(!obj.has_own("x"));
    }

    #[test]
    fn instances_share_their_class() {
        let cls = Class::builder("Thing").build().unwrap();
        let a = Object::new(&cls);
        let b = cls.instantiate();
        assert!(Arc::ptr_eq(a.class(), b.class()));
    }
}
