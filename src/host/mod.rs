//! The host object model conformance is checked against.
//!
//! Candidates are plain [`Value`]s: scalars, containers, functions, objects
//! and classes. Classes carry explicit bases and a C3 method resolution
//! order, functions carry explicit [`Signature`]s, and objects carry their
//! own per-instance storage. That is everything the checks in
//! [`crate::descriptor`] need to introspect.
//!
//! # Modules
//!
//! - [`value`] - Dynamically typed values, equality and identity
//! - [`class`] - Classes, members, bindings and linearization
//! - [`object`] - Instances with live per-instance storage
//! - [`function`] - Callables, signatures and bound methods
//! - [`builtins`] - Native types
//! - [`resolve`] - Attribute lookup and type queries
//!
//! # Example
//!
//! ```
//! use conformity::host::{getattr, Class, Function, Object, Signature, Value};
//!
//! let point = Class::builder("Point")
//!     .method(Function::new("norm", Signature::positional(["self"])))
//!     .build()
//!     .unwrap();
//!
//! let p = Value::Object(Object::with_slots(&point, [("x", Value::Int(3))]));
//! assert_eq!(getattr(&p, "x"), Some(Value::Int(3)));
//! assert!(matches!(getattr(&p, "norm"), Some(Value::BoundMethod(_))));
//! ```

pub mod builtins;
pub mod class;
pub mod function;
pub mod object;
pub mod resolve;
pub mod value;

pub use builtins::{builtins, Builtins};
pub use class::{Binding, Class, ClassBuilder, ClassRef, Member};
pub use function::{BoundMethod, CallableSignature, Function, NativeFn, Param, Signature};
pub use object::{Object, ObjectRef};
pub use resolve::{
    callable_signature, declared_in_chain, first_definer_binding, getattr, has_own, hasattr,
    is_callable, isinstance, subject_class,
};
pub use value::{ListRef, MapRef, Value};
