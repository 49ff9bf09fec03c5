//! Error types for interface declaration and loading.
//!
//! This module defines [`DeclarationError`], raised while an interface (or a
//! host class) is being defined, [`CallError`], raised when a host callable is
//! invoked, and [`ConformityError`], the top-level error used by the
//! declaration-file loader, plus a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Declaration mistakes surface immediately and fail the whole declaration
//! - Conformance mismatches are never errors; they fold into `bool`
//! - Use `anyhow::Error` (via `ConformityError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// A mistake in an interface or class declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    /// A member that is neither a requirement nor allow-listed metadata.
    #[error("Interfaces must only contain descriptors, not a {kind} named {key}")]
    NotADescriptor { key: String, kind: String },

    /// An interface tried to extend something that is not an interface.
    #[error("Interface '{interface}' may only extend interfaces, not class '{base}'")]
    ForeignBase { interface: String, base: String },

    /// Two requirement sets define the same names with different descriptors.
    #[error("Conflicting interfaces, {origin} redefines: {}", .keys.join(", "))]
    Conflict {
        interface: String,
        origin: String,
        keys: Vec<String>,
    },

    /// An allow-listed metadata field holds a value of the wrong shape.
    #[error("Invalid metadata {key} on interface '{interface}': {message}")]
    InvalidMetadata {
        interface: String,
        key: String,
        message: String,
    },

    /// A descriptor was already bound to a different requirement name.
    #[error("Descriptor already bound as '{bound}', cannot rebind as '{requested}'")]
    AlreadyBound { bound: String, requested: String },

    /// A `like` reference could not be introspected.
    #[error("Reference '{name}' has no introspectable signature")]
    Uninspectable { name: String },

    /// Class bases admit no consistent method resolution order.
    #[error("Cannot create a consistent method resolution order for class '{class}'")]
    InconsistentHierarchy { class: String },
}

/// Failure while invoking a host callable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The value cannot be called.
    #[error("'{kind}' object is not callable")]
    NotCallable { kind: String },

    /// The callable has no native body attached.
    #[error("'{name}' has no body")]
    NoBody { name: String },

    /// Wrong number of arguments.
    #[error("{name}() expected {expected} arguments, got {given}")]
    Arity {
        name: String,
        expected: usize,
        given: usize,
    },

    /// Argument or receiver of the wrong type.
    #[error("{0}")]
    Type(String),

    /// Lookup of a missing key or index.
    #[error("{0}")]
    Lookup(String),
}

/// Core error type for loading and registering interface declarations.
#[derive(Debug, Error)]
pub enum ConformityError {
    /// Declaration file not found at expected location.
    #[error("Declaration file not found: {path}")]
    DeclarationsNotFound { path: PathBuf },

    /// Failed to parse a declaration file.
    #[error("Failed to parse declarations at {path}: {message}")]
    DeclarationsParseError { path: PathBuf, message: String },

    /// A member entry could not be read as a descriptor declaration.
    #[error("Invalid member '{member}' in interface '{interface}': {message}")]
    InvalidMember {
        interface: String,
        member: String,
        message: String,
    },

    /// Member names must be identifiers.
    #[error("Invalid member name '{member}' in interface '{interface}'")]
    InvalidMemberName { interface: String, member: String },

    /// Referenced type is not registered.
    #[error("Unknown type '{name}' referenced by {context}")]
    UnknownType { name: String, context: String },

    /// Referenced interface is neither declared nor registered.
    #[error("Unknown interface '{name}' referenced by {context}")]
    UnknownInterface { name: String, context: String },

    /// An interface name is registered twice.
    #[error("Interface '{name}' is already registered")]
    DuplicateInterface { name: String },

    /// Interface inheritance cycle detected.
    #[error("Circular interface inheritance detected: {cycle}")]
    CircularExtends { cycle: String },

    /// Declaration rejected by the interface builder.
    #[error(transparent)]
    Declaration(#[from] DeclarationError),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for declaration loading.
pub type Result<T> = std::result::Result<T, ConformityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_a_descriptor_names_key_and_kind() {
        let err = DeclarationError::NotADescriptor {
            key: "foo".into(),
            kind: "int".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("foo"));
        assert!(msg.contains("int"));
    }

    #[test]
    fn conflict_lists_every_key() {
        let err = DeclarationError::Conflict {
            interface: "IGetterSetter".into(),
            origin: "IGetter".into(),
            keys: vec!["__getitem__".into(), "get".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("IGetter redefines"));
        assert!(msg.contains("__getitem__, get"));
    }

    #[test]
    fn foreign_base_displays_both_names() {
        let err = DeclarationError::ForeignBase {
            interface: "IBad".into(),
            base: "object".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("IBad"));
        assert!(msg.contains("object"));
    }

    #[test]
    fn call_arity_displays_counts() {
        let err = CallError::Arity {
            name: "push".into(),
            expected: 1,
            given: 3,
        };
        assert_eq!(err.to_string(), "push() expected 1 arguments, got 3");
    }

    #[test]
    fn declarations_parse_error_displays_path_and_message() {
        let err = ConformityError::DeclarationsParseError {
            path: PathBuf::from("/interfaces.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/interfaces.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn circular_extends_displays_cycle() {
        let err = ConformityError::CircularExtends {
            cycle: "IA -> IB -> IA".into(),
        };
        assert!(err.to_string().contains("IA -> IB -> IA"));
    }

    #[test]
    fn declaration_error_is_transparent() {
        let err: ConformityError = DeclarationError::Uninspectable {
            name: "dict.get".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Reference 'dict.get' has no introspectable signature"
        );
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: ConformityError = io_err.into();
        assert!(matches!(err, ConformityError::Io(_)));
    }

    #[test]
    fn anyhow_error_converts() {
        let err: ConformityError = anyhow::anyhow!("something broke").into();
        assert!(matches!(err, ConformityError::Other(_)));
        assert_eq!(err.to_string(), "something broke");
    }
}
