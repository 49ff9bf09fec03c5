//! Interface declaration files.
//!
//! This module handles declaring interfaces from YAML:
//! - Schema definitions in [`schema`]
//! - File loading in [`loader`]
//! - Interface construction in [`declare`]
//! - Type and interface lookup in [`registry`]
//! - JSON Schema generation in [`json_schema`]
//!
//! # Example
//!
//! ```
//! use conformity::config::{load_interfaces, InterfaceRegistry, TypeRegistry};
//! use conformity::host::Value;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("interfaces.yml");
//! fs::write(&path, r#"
//! interfaces:
//!   IMapping:
//!     assume: [dict]
//!     members:
//!       get: { kind: method, args: 1, optional: 1 }
//! "#).unwrap();
//!
//! let mut interfaces = InterfaceRegistry::new();
//! load_interfaces(&path, &TypeRegistry::with_builtins(), &mut interfaces).unwrap();
//!
//! let mapping = interfaces.get("IMapping").unwrap();
//! assert!(mapping.is_satisfied_by(&Value::map([("a", Value::Int(1))])));
//! ```

pub mod declare;
pub mod json_schema;
pub mod loader;
pub mod registry;
pub mod schema;

pub use declare::{declare, is_identifier, yaml_to_value};
pub use json_schema::DeclarationSchema;
pub use loader::{load_declarations_file, load_interfaces, parse_declarations};
pub use registry::{InterfaceRegistry, TypeRegistry};
pub use schema::{DeclarationFile, InterfaceDecl, MemberDecl, MemberKind};
