//! Interfaces: named requirement sets with inheritance and assumptions.
//!
//! An interface is declared once through [`Interface::define`], which
//! validates its members, merges the requirement sets of the interfaces it
//! extends and binds each descriptor to its name. The result is immutable
//! and may be shared across threads.
//!
//! # Example
//!
//! ```
//! use conformity::descriptor::Descriptor;
//! use conformity::host::{builtins, Class, Function, Object, Signature, Value};
//! use conformity::interface::Interface;
//!
//! let sized = Interface::define("ISized")
//!     .require("__len__", Descriptor::method())
//!     .assume(&builtins().list)
//!     .build()
//!     .unwrap();
//!
//! let bag = Class::builder("Bag")
//!     .method(Function::new("__len__", Signature::positional(["self"])))
//!     .build()
//!     .unwrap();
//!
//! assert!(sized.is_satisfied_by(&Value::Object(Object::new(&bag))));
//! assert!(sized.is_satisfied_by(&Value::list([])));
//! assert!(!sized.is_satisfied_by(&Value::Int(3)));
//! ```

pub mod builder;
pub mod conformance;
pub mod requirements;

use std::fmt;
use std::sync::Arc;

pub use builder::{Base, Field, InterfaceBuilder, MergePolicy, ALLOWED_METADATA};
pub use conformance::{conforms, ConformanceReport, RequirementOutcome};
pub use requirements::RequirementSet;

use crate::descriptor::RequirementRef;
use crate::host::{ClassRef, Value};

/// Shared handle to an interface.
pub type InterfaceRef = Arc<Interface>;

/// A named set of structural requirements.
pub struct Interface {
    name: String,
    doc: Option<String>,
    module: Option<String>,
    qualname: Option<String>,
    bases: Vec<InterfaceRef>,
    requirements: RequirementSet,
    assumptions: Vec<ClassRef>,
    policy: MergePolicy,
}

impl Interface {
    /// Start declaring an interface.
    pub fn define(name: impl Into<String>) -> InterfaceBuilder {
        InterfaceBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualified name; the plain name unless one was declared.
    pub fn qualname(&self) -> &str {
        self.qualname.as_deref().unwrap_or(&self.name)
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Directly extended interfaces, in declaration order.
    pub fn bases(&self) -> &[InterfaceRef] {
        &self.bases
    }

    /// The merged requirement set, inherited entries first.
    pub fn requirements(&self) -> &RequirementSet {
        &self.requirements
    }

    /// Look up one requirement by name.
    pub fn requirement(&self, name: &str) -> Option<&RequirementRef> {
        self.requirements.get(name)
    }

    /// Classes whose instances and subclasses conform automatically.
    pub fn assumptions(&self) -> &[ClassRef] {
        &self.assumptions
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Whether this interface is `other` or extends it, directly or not.
    pub fn is_subinterface_of(&self, other: &Interface) -> bool {
        std::ptr::eq(self, other) || self.bases.iter().any(|b| b.is_subinterface_of(other))
    }

    /// Whether `candidate` conforms. Never fails.
    pub fn is_satisfied_by(&self, candidate: &Value) -> bool {
        conforms(self, candidate)
    }

    /// Evaluate every requirement and report each outcome.
    pub fn check(&self, candidate: &Value) -> ConformanceReport {
        ConformanceReport::build(self, candidate)
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.qualname())
    }
}

impl fmt::Debug for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interface")
            .field("name", &self.name)
            .field("bases", &self.bases.iter().map(|b| b.name()).collect::<Vec<_>>())
            .field("requirements", &self.requirements.names().collect::<Vec<_>>())
            .field(
                "assumptions",
                &self.assumptions.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{same_requirement, Descriptor};
    use crate::error::DeclarationError;
    use crate::host::{builtins, Class, Function, Object, Signature};

    fn iterable() -> InterfaceRef {
        Interface::define("IIterable")
            .require("__iter__", Descriptor::method())
            .build()
            .unwrap()
    }

    #[test]
    fn builds_requirement_set_in_order() {
        let iface = Interface::define("IPoint")
            .require("x", Descriptor::property())
            .require("y", Descriptor::property())
            .build()
            .unwrap();

        assert_eq!(iface.requirements().names().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(iface.requirement("x").and_then(|r| r.name()), Some("x"));
        assert!(iface.requirement("z").is_none());
    }

    #[test]
    fn rejects_plain_values() {
        let err = Interface::define("IBad")
            .field("x", Value::Int(27))
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            DeclarationError::NotADescriptor {
                key: "x".into(),
                kind: "int".into()
            }
        );
        assert_eq!(
            err.to_string(),
            "Interfaces must only contain descriptors, not a int named x"
        );
    }

    #[test]
    fn accepts_allowlisted_metadata() {
        let iface = Interface::define("IDoc")
            .field("__doc__", Value::from("Documented."))
            .field("__module__", Value::from("shapes"))
            .field("__qualname__", Value::from("shapes.IDoc"))
            .field("__assume__", Value::list([Value::from(&builtins().dict)]))
            .build()
            .unwrap();

        assert_eq!(iface.doc(), Some("Documented."));
        assert_eq!(iface.module(), Some("shapes"));
        assert_eq!(iface.qualname(), "shapes.IDoc");
        assert_eq!(iface.to_string(), "shapes.IDoc");
        assert_eq!(iface.assumptions().len(), 1);
        assert!(iface.requirements().is_empty());
    }

    #[test]
    fn sequence_metadata_is_accepted_and_ignored() {
        let iface = Interface::define("ICounted")
            .field("__sequence__", Value::Int(3))
            .require("count", Descriptor::attribute())
            .build()
            .unwrap();

        assert_eq!(iface.requirements().names().collect::<Vec<_>>(), vec!["count"]);
        assert!(iface.requirement("__sequence__").is_none());
    }

    #[test]
    fn rejects_malformed_metadata() {
        let err = Interface::define("IDoc")
            .field("__doc__", Value::Int(1))
            .build()
            .unwrap_err();
        assert!(matches!(err, DeclarationError::InvalidMetadata { ref key, .. } if key == "__doc__"));

        let err = Interface::define("IDoc")
            .field("__assume__", Value::list([Value::Int(1)]))
            .build()
            .unwrap_err();
        assert!(matches!(err, DeclarationError::InvalidMetadata { .. }));
    }

    #[test]
    fn rejects_class_bases() {
        let cls = Class::builder("Plain").build().unwrap();
        let err = Interface::define("IBad").extends(&cls).build().unwrap_err();
        assert_eq!(
            err,
            DeclarationError::ForeignBase {
                interface: "IBad".into(),
                base: "Plain".into()
            }
        );
    }

    #[test]
    fn inherits_identical_requirements() {
        let parent = iterable();
        let child = Interface::define("ISequence")
            .extends(&parent)
            .require("__len__", Descriptor::method())
            .build()
            .unwrap();

        let inherited = child.requirement("__iter__").unwrap();
        assert!(same_requirement(inherited, parent.requirement("__iter__").unwrap()));
        assert_eq!(
            child.requirements().names().collect::<Vec<_>>(),
            vec!["__iter__", "__len__"]
        );
        assert!(child.is_subinterface_of(&parent));
        assert!(child.is_subinterface_of(&child));
        assert!(!parent.is_subinterface_of(&child));
    }

    #[test]
    fn strict_policy_rejects_redefinition() {
        let parent = iterable();
        let err = Interface::define("IChild")
            .extends(&parent)
            .require("__iter__", Descriptor::method().args(1))
            .build()
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Conflicting interfaces, IChild redefines: __iter__"
        );
    }

    #[test]
    fn strict_policy_rejects_sibling_collisions() {
        let a = Interface::define("IA")
            .require("run", Descriptor::method())
            .build()
            .unwrap();
        let b = Interface::define("IB")
            .require("run", Descriptor::callable())
            .build()
            .unwrap();

        let err = Interface::define("IC").extends(&a).extends(&b).build().unwrap_err();
        assert_eq!(
            err,
            DeclarationError::Conflict {
                interface: "IC".into(),
                origin: "IB".into(),
                keys: vec!["run".into()],
            }
        );
    }

    #[test]
    fn diamond_is_not_a_conflict() {
        let root = iterable();
        let left = Interface::define("ILeft").extends(&root).build().unwrap();
        let right = Interface::define("IRight").extends(&root).build().unwrap();
        let joined = Interface::define("IJoined")
            .extends(&left)
            .extends(&right)
            .build()
            .unwrap();

        assert_eq!(joined.requirements().len(), 1);
        assert!(joined.is_subinterface_of(&root));
    }

    #[test]
    fn override_policy_replaces() {
        let parent = iterable();
        let replacement = Descriptor::callable();
        let child = Interface::define("IChild")
            .policy(MergePolicy::Override)
            .extends(&parent)
            .require("__iter__", replacement)
            .build()
            .unwrap();

        let req = child.requirement("__iter__").unwrap();
        assert!(!same_requirement(req, parent.requirement("__iter__").unwrap()));
        assert_eq!(child.policy(), MergePolicy::Override);
    }

    #[test]
    fn descriptor_cannot_serve_two_names() {
        let shared: RequirementRef = Arc::new(Descriptor::attribute());
        let err = Interface::define("IDup")
            .field("a", shared.clone())
            .field("b", shared.clone())
            .build()
            .unwrap_err();

        assert!(matches!(err, DeclarationError::AlreadyBound { .. }));
        assert!(shared.name().is_none());
    }

    #[test]
    fn failed_declaration_binds_nothing() {
        let parent = iterable();
        let fresh: RequirementRef = Arc::new(Descriptor::method());
        let result = Interface::define("IChild")
            .extends(&parent)
            .field("other", fresh.clone())
            .require("__iter__", Descriptor::callable())
            .build();

        assert!(result.is_err());
        assert!(fresh.name().is_none());
    }

    #[test]
    fn assumptions_are_inherited_unless_declared() {
        let parent = Interface::define("IMapping")
            .assume(&builtins().dict)
            .build()
            .unwrap();
        let child = Interface::define("IChild").extends(&parent).build().unwrap();
        let own = Interface::define("IOwn")
            .extends(&parent)
            .assume(&builtins().list)
            .build()
            .unwrap();

        assert!(Arc::ptr_eq(&child.assumptions()[0], &builtins().dict));
        assert_eq!(own.assumptions().len(), 1);
        assert!(Arc::ptr_eq(&own.assumptions()[0], &builtins().list));
    }

    #[test]
    fn assumption_shortcut_skips_requirements() {
        let iface = Interface::define("IMapping")
            .require("__getitem__", Descriptor::method().args(1))
            .require("missing", Descriptor::attribute())
            .assume(&builtins().dict)
            .build()
            .unwrap();

        let dict = Value::map([("a", Value::Int(1))]);
        assert!(iface.is_satisfied_by(&dict));
        assert!(iface.is_satisfied_by(&Value::Class(builtins().dict.clone())));
        assert!(!iface.is_satisfied_by(&Value::list([])));

        let report = iface.check(&dict);
        assert_eq!(report.assumed.as_deref(), Some("dict"));
        assert!(report.outcomes.is_empty());
        assert!(report.conforms());
    }

    #[test]
    fn report_lists_every_failure() {
        let iface = Interface::define("IStack")
            .require("push", Descriptor::method().args(1))
            .require("pop", Descriptor::method())
            .require("peek", Descriptor::method())
            .build()
            .unwrap();

        let cls = Class::builder("HalfStack")
            .method(Function::new("push", Signature::positional(["self", "value"])))
            .build()
            .unwrap();
        let report = iface.check(&Value::Object(Object::new(&cls)));

        assert!(!report.conforms());
        assert_eq!(report.failures(), vec!["pop", "peek"]);
        assert_eq!(report.outcomes.len(), 3);
        assert!(!iface.is_satisfied_by(&Value::Object(Object::new(&cls))));
    }

    #[test]
    fn empty_interface_accepts_anything() {
        let iface = Interface::define("IAnything").build().unwrap();
        assert!(iface.is_satisfied_by(&Value::None));
        assert!(iface.check(&Value::Int(1)).conforms());
    }
}
