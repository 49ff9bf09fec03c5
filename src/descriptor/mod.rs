//! The descriptor model: the vocabulary of checkable requirements.
//!
//! - [`Requirement`] - The trait every requirement-set entry implements
//! - [`Descriptor`] - Existence, value, identity and validator checks plus a variant
//! - [`DescriptorKind`] - Property placement and method-kind refinements
//! - [`CallableShape`] - Arity, parameter names, optional count and variadics
//!
//! # Example
//!
//! ```
//! use conformity::descriptor::{Descriptor, Requirement};
//! use conformity::host::{Class, Function, Object, Signature, Value};
//!
//! let push = Descriptor::method().args(1).names(["value"]);
//! push.bind("push").unwrap();
//!
//! let stack = Class::builder("Stack")
//!     .method(Function::new("push", Signature::positional(["self", "value"])))
//!     .build()
//!     .unwrap();
//!
//! assert!(push.evaluate(&Value::Object(Object::new(&stack))));
//! assert!(push.evaluate(&Value::Class(stack)));
//! ```

pub mod attribute;
pub mod kind;
pub mod requirement;
pub mod shape;

pub use attribute::{Descriptor, Validator};
pub use kind::DescriptorKind;
pub use requirement::{same_requirement, Requirement, RequirementRef};
pub use shape::CallableShape;
