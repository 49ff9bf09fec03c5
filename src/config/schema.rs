//! Declaration file schema definitions.
//!
//! These types mirror the structure of an interface declaration file:
//!
//! ```yaml
//! policy: strict
//! interfaces:
//!   ISized:
//!     doc: Has a length.
//!     members:
//!       __len__: { kind: method, args: 0 }
//!   IStack:
//!     extends: [ISized]
//!     assume: [list]
//!     members:
//!       push: { kind: method, args: 1, names: [value] }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::interface::MergePolicy;

/// Root of a declaration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclarationFile {
    /// Default merge policy for every interface in the file.
    #[serde(default)]
    pub policy: MergePolicy,

    /// Interfaces by name, in declaration order.
    #[serde(default)]
    pub interfaces: IndexMap<String, InterfaceDecl>,
}

/// One interface declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterfaceDecl {
    #[serde(default)]
    pub doc: Option<String>,

    #[serde(default)]
    pub module: Option<String>,

    /// Names of extended interfaces.
    #[serde(default)]
    pub extends: Vec<String>,

    /// Names of types granted automatic conformance.
    #[serde(default)]
    pub assume: Vec<String>,

    /// Overrides the file-level policy.
    #[serde(default)]
    pub policy: Option<MergePolicy>,

    /// Raw member entries; each is read as a [`MemberDecl`] when the
    /// interface is declared so errors can name the member.
    #[serde(default)]
    pub members: IndexMap<String, serde_yaml::Value>,
}

/// Descriptor variant of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Attribute,
    Property,
    ClassProperty,
    InstanceProperty,
    Callable,
    Method,
    ClassMethod,
    StaticMethod,
}

impl MemberKind {
    /// All kinds, in schema order.
    pub const ALL: [MemberKind; 8] = [
        MemberKind::Attribute,
        MemberKind::Property,
        MemberKind::ClassProperty,
        MemberKind::InstanceProperty,
        MemberKind::Callable,
        MemberKind::Method,
        MemberKind::ClassMethod,
        MemberKind::StaticMethod,
    ];

    /// Name as written in declaration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberKind::Attribute => "attribute",
            MemberKind::Property => "property",
            MemberKind::ClassProperty => "class_property",
            MemberKind::InstanceProperty => "instance_property",
            MemberKind::Callable => "callable",
            MemberKind::Method => "method",
            MemberKind::ClassMethod => "class_method",
            MemberKind::StaticMethod => "static_method",
        }
    }
}

/// One member entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberDecl {
    pub kind: MemberKind,

    #[serde(default)]
    pub doc: Option<String>,

    /// Expected value, compared by equality.
    #[serde(default)]
    pub value: Option<serde_yaml::Value>,

    /// Accepted type names.
    #[serde(default, rename = "type")]
    pub types: Vec<String>,

    #[serde(default)]
    pub args: Option<usize>,

    #[serde(default)]
    pub names: Option<Vec<String>>,

    #[serde(default)]
    pub optional: Option<usize>,

    #[serde(default)]
    pub varargs: Option<bool>,

    #[serde(default)]
    pub kwargs: Option<bool>,

    /// Reference callable as `Type.member`.
    #[serde(default)]
    pub like: Option<String>,
}
