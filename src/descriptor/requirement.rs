//! The requirement trait stored in requirement sets.

use std::fmt;
use std::sync::Arc;

use crate::error::DeclarationError;
use crate::host::Value;

/// A named, reusable structural check.
///
/// [`Descriptor`](super::Descriptor) is the production implementation. The
/// trait exists so that requirement sets can also hold test doubles, for
/// example to record that a check ran.
pub trait Requirement: fmt::Debug + Send + Sync {
    /// The bound requirement name, if any.
    fn name(&self) -> Option<&str>;

    /// Bind the requirement name. Binding happens once; re-binding to the
    /// same name is accepted, binding to a different name is an error.
    fn bind(&self, name: &str) -> Result<(), DeclarationError>;

    /// Whether the candidate satisfies this requirement. Never fails: any
    /// introspection problem means "does not satisfy".
    fn evaluate(&self, candidate: &Value) -> bool;

    /// Short description for diagnostics.
    fn describe(&self) -> String {
        self.name().unwrap_or("<unbound>").to_string()
    }
}

/// Shared handle to a requirement.
pub type RequirementRef = Arc<dyn Requirement>;

/// Whether two handles point at the same requirement instance.
pub fn same_requirement(a: &RequirementRef, b: &RequirementRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Descriptor;

    #[test]
    fn identity_is_per_instance() {
        let a: RequirementRef = Arc::new(Descriptor::attribute());
        let b: RequirementRef = Arc::new(Descriptor::attribute());
        assert!(same_requirement(&a, &a.clone()));
        assert!(!same_requirement(&a, &b));
    }

    #[test]
    fn descriptors_describe_kind_and_name() {
        let d = Descriptor::method();
        assert_eq!(d.describe(), "Method()");
        d.bind("push").unwrap();
        assert_eq!(d.describe(), "Method(push)");
    }
}
