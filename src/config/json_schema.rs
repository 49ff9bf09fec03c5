//! JSON Schema generation for declaration files.
//!
//! This module generates a JSON Schema (Draft-07) for the interface
//! declaration format, enabling editor autocomplete and validation.

use serde_json::{json, Value};

use super::schema::MemberKind;

/// Generates JSON Schema for declaration files.
pub struct DeclarationSchema;

impl DeclarationSchema {
    /// Generate the complete JSON Schema.
    pub fn generate() -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": "Interface Declarations",
            "description": "Structural interfaces checked against host values",
            "type": "object",
            "properties": {
                "policy": Self::policy_schema(),
                "interfaces": {
                    "type": "object",
                    "description": "Interfaces by name",
                    "additionalProperties": Self::interface_schema()
                }
            },
            "additionalProperties": false
        })
    }

    fn policy_schema() -> Value {
        json!({
            "type": "string",
            "enum": ["strict", "override"],
            "default": "strict",
            "description": "How inherited requirement sets combine"
        })
    }

    fn interface_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "doc": { "type": "string" },
                "module": { "type": "string" },
                "extends": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Interfaces this one extends"
                },
                "assume": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Types that conform without checks"
                },
                "policy": Self::policy_schema(),
                "members": {
                    "type": "object",
                    "propertyNames": { "pattern": "^[A-Za-z_][A-Za-z0-9_]*$" },
                    "additionalProperties": Self::member_schema()
                }
            },
            "additionalProperties": false
        })
    }

    fn member_schema() -> Value {
        let kinds: Vec<&str> = MemberKind::ALL.iter().map(MemberKind::as_str).collect();
        let count = json!({ "type": "integer", "minimum": 0 });

        json!({
            "type": "object",
            "required": ["kind"],
            "properties": {
                "kind": { "type": "string", "enum": kinds },
                "doc": { "type": "string" },
                "value": { "description": "Expected value, compared by equality" },
                "type": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Accepted type names (properties only)"
                },
                "args": count.clone(),
                "names": { "type": "array", "items": { "type": "string" } },
                "optional": count,
                "varargs": { "type": "boolean" },
                "kwargs": { "type": "boolean" },
                "like": {
                    "type": "string",
                    "pattern": "^[A-Za-z_][A-Za-z0-9_]*\\.[A-Za-z_][A-Za-z0-9_]*$",
                    "description": "Reference callable as Type.member"
                }
            },
            "additionalProperties": false
        })
    }
}
