//! Descriptor variants and their refinement checks.

use std::fmt;

use super::shape::CallableShape;
use crate::host::{
    callable_signature, declared_in_chain, first_definer_binding, has_own, is_callable,
    isinstance, Binding, ClassRef, Value,
};

/// What a descriptor checks beyond existence, value, identity and validator.
#[derive(Debug, Clone)]
pub enum DescriptorKind {
    /// Existence only.
    Attribute,
    /// The value must be an instance of one of `types` (any type when empty).
    Property { types: Vec<ClassRef> },
    /// Like `Property`, and found on the class chain, not in own storage.
    ClassProperty { types: Vec<ClassRef> },
    /// Like `Property`, and present in the candidate's own storage.
    InstanceProperty { types: Vec<ClassRef> },
    /// Any callable with the given shape.
    Callable(CallableShape),
    /// A bound method on instances; the plain function form on classes.
    Method(CallableShape),
    /// A method whose first declaring ancestor uses class binding.
    ClassMethod(CallableShape),
    /// A callable whose first declaring ancestor uses static binding.
    StaticMethod(CallableShape),
}

impl DescriptorKind {
    /// Variant name.
    pub fn label(&self) -> &'static str {
        match self {
            DescriptorKind::Attribute => "Attribute",
            DescriptorKind::Property { .. } => "Property",
            DescriptorKind::ClassProperty { .. } => "ClassProperty",
            DescriptorKind::InstanceProperty { .. } => "InstanceProperty",
            DescriptorKind::Callable(_) => "Callable",
            DescriptorKind::Method(_) => "Method",
            DescriptorKind::ClassMethod(_) => "ClassMethod",
            DescriptorKind::StaticMethod(_) => "StaticMethod",
        }
    }

    pub fn types(&self) -> Option<&[ClassRef]> {
        match self {
            DescriptorKind::Property { types }
            | DescriptorKind::ClassProperty { types }
            | DescriptorKind::InstanceProperty { types } => Some(types),
            _ => None,
        }
    }

    pub fn shape(&self) -> Option<&CallableShape> {
        match self {
            DescriptorKind::Callable(shape)
            | DescriptorKind::Method(shape)
            | DescriptorKind::ClassMethod(shape)
            | DescriptorKind::StaticMethod(shape) => Some(shape),
            _ => None,
        }
    }

    pub(crate) fn types_mut(&mut self) -> Option<&mut Vec<ClassRef>> {
        match self {
            DescriptorKind::Property { types }
            | DescriptorKind::ClassProperty { types }
            | DescriptorKind::InstanceProperty { types } => Some(types),
            _ => None,
        }
    }

    pub(crate) fn shape_mut(&mut self) -> Option<&mut CallableShape> {
        match self {
            DescriptorKind::Callable(shape)
            | DescriptorKind::Method(shape)
            | DescriptorKind::ClassMethod(shape)
            | DescriptorKind::StaticMethod(shape) => Some(shape),
            _ => None,
        }
    }

    /// Whether the candidate's value carries an implicit receiver parameter.
    pub(crate) fn is_method_family(&self) -> bool {
        matches!(
            self,
            DescriptorKind::Method(_) | DescriptorKind::ClassMethod(_)
        )
    }

    /// Variant-specific check of an attribute that exists and passed the
    /// common constraints.
    pub(crate) fn refine(&self, name: &str, candidate: &Value, value: &Value) -> bool {
        match self {
            DescriptorKind::Attribute => true,
            DescriptorKind::Property { types } => type_matches(types, value),
            DescriptorKind::ClassProperty { types } => {
                type_matches(types, value)
                    && !has_own(candidate, name)
                    && declared_in_chain(candidate, name)
            }
            DescriptorKind::InstanceProperty { types } => {
                type_matches(types, value) && has_own(candidate, name)
            }
            DescriptorKind::Callable(shape) => shape_matches(shape, candidate, value, false),
            DescriptorKind::Method(shape) => {
                is_method(candidate, value) && shape_matches(shape, candidate, value, true)
            }
            DescriptorKind::ClassMethod(shape) => {
                is_method(candidate, value)
                    && shape_matches(shape, candidate, value, true)
                    && first_definer_binding(candidate, name) == Some(Binding::Class)
            }
            DescriptorKind::StaticMethod(shape) => {
                shape_matches(shape, candidate, value, false)
                    && first_definer_binding(candidate, name) == Some(Binding::Static)
            }
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn type_matches(types: &[ClassRef], value: &Value) -> bool {
    types.is_empty() || types.iter().any(|t| isinstance(value, t))
}

fn is_method(candidate: &Value, value: &Value) -> bool {
    candidate.is_class() || matches!(value, Value::BoundMethod(_))
}

/// Receiver parameters to drop before comparing shapes.
///
/// Bound methods always carry one. A plain function read from a class stands
/// in for a method, so it carries one too when a method is expected.
fn receiver_skip(candidate: &Value, value: &Value, method_family: bool) -> usize {
    match value {
        Value::BoundMethod(_) => 1,
        Value::Function(_) if method_family && candidate.is_class() => 1,
        _ => 0,
    }
}

fn shape_matches(shape: &CallableShape, candidate: &Value, value: &Value, method_family: bool) -> bool {
    if !is_callable(value) {
        return false;
    }

    callable_signature(value, receiver_skip(candidate, value, method_family))
        .is_some_and(|sig| shape.matches(&sig))
}
