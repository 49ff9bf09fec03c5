//! Conformity - Structural interface conformance checking.
//!
//! Conformity declares interfaces as named sets of structural requirements
//! and answers whether a value satisfies one by shape alone: which
//! attributes it exposes, what they hold and how their callables are
//! shaped. No nominal relationship between candidate and interface is
//! needed.
//!
//! # Modules
//!
//! - [`host`] - The object model candidates live in
//! - [`descriptor`] - Descriptors and the requirement trait
//! - [`interface`] - Interface declaration, merging and conformance
//! - [`config`] - YAML declaration files and registries
//! - [`error`] - Error types and result aliases
//!
//! # Example
//!
//! ```
//! use conformity::descriptor::Descriptor;
//! use conformity::host::{Class, Function, Object, Signature, Value};
//! use conformity::interface::Interface;
//!
//! let stack = Interface::define("IStack")
//!     .require("push", Descriptor::method().args(1))
//!     .require("pop", Descriptor::method().args(0))
//!     .build()
//!     .unwrap();
//!
//! let list_stack = Class::builder("ListStack")
//!     .method(Function::new("push", Signature::positional(["self", "value"])))
//!     .method(Function::new("pop", Signature::positional(["self"])))
//!     .build()
//!     .unwrap();
//!
//! assert!(stack.is_satisfied_by(&Value::Object(Object::new(&list_stack))));
//! assert!(stack.is_satisfied_by(&Value::Class(list_stack)));
//! assert!(!stack.is_satisfied_by(&Value::Int(1)));
//! ```
//!
//! For file-based declarations, see [`config`].

pub mod config;
pub mod descriptor;
pub mod error;
pub mod host;
pub mod interface;

pub use error::{CallError, ConformityError, DeclarationError, Result};
pub use interface::{conforms, Interface, InterfaceRef};
