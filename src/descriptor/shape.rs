//! Callable shape constraints.
//!
//! A shape is matched against the receiver-free [`CallableSignature`] of a
//! candidate value. Constraints are either configured explicitly or derived
//! from a reference callable (`like`). Explicit constraints always win.

use std::collections::BTreeSet;

use crate::error::DeclarationError;
use crate::host::{callable_signature, CallableSignature, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Constraints {
    args: Option<usize>,
    names: Option<BTreeSet<String>>,
    optional: Option<usize>,
    varargs: Option<bool>,
    kwargs: Option<bool>,
}

/// Required signature shape of a callable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallableShape {
    explicit: Constraints,
    derived: Constraints,
}

impl CallableShape {
    /// A shape with no constraints: any introspectable callable matches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact number of required positional parameters.
    pub fn args(&self) -> Option<usize> {
        self.explicit.args.or(self.derived.args)
    }

    /// Parameter names that must all be present.
    pub fn names(&self) -> Option<&BTreeSet<String>> {
        self.explicit
            .names
            .as_ref()
            .or(self.derived.names.as_ref())
    }

    /// Exact number of defaulted parameters.
    pub fn optional(&self) -> Option<usize> {
        self.explicit.optional.or(self.derived.optional)
    }

    /// Whether a variadic positional capture is required.
    pub fn varargs(&self) -> bool {
        self.explicit
            .varargs
            .or(self.derived.varargs)
            .unwrap_or(false)
    }

    /// Whether a variadic keyword capture is required.
    pub fn kwargs(&self) -> bool {
        self.explicit.kwargs.or(self.derived.kwargs).unwrap_or(false)
    }

    pub(crate) fn set_args(&mut self, args: usize) {
        self.explicit.args = Some(args);
    }

    pub(crate) fn set_names(&mut self, names: BTreeSet<String>) {
        self.explicit.names = Some(names);
    }

    pub(crate) fn set_optional(&mut self, optional: usize) {
        self.explicit.optional = Some(optional);
    }

    pub(crate) fn set_varargs(&mut self, required: bool) {
        self.explicit.varargs = Some(required);
    }

    pub(crate) fn set_kwargs(&mut self, required: bool) {
        self.explicit.kwargs = Some(required);
    }

    /// Derive constraints from a reference callable.
    ///
    /// Bound references drop their receiver. Unbound references drop one
    /// leading parameter when `receiver` is set (method-style references).
    pub(crate) fn derive_from(
        &mut self,
        reference: &Value,
        receiver: bool,
    ) -> Result<(), DeclarationError> {
        let skip = match reference {
            Value::BoundMethod(_) => 1,
            _ => usize::from(receiver),
        };
        let sig = callable_signature(reference, skip).ok_or_else(|| {
            DeclarationError::Uninspectable {
                name: format!("{:?}", reference),
            }
        })?;

        self.derived = Constraints {
            args: Some(sig.required_count),
            names: (!sig.positional_names.is_empty())
                .then(|| sig.positional_names.iter().cloned().collect()),
            optional: (sig.optional_count > 0).then_some(sig.optional_count),
            varargs: sig.has_variadic_positional.then_some(true),
            kwargs: sig.has_variadic_keyword.then_some(true),
        };
        Ok(())
    }

    /// Whether a candidate signature has this shape.
    pub fn matches(&self, sig: &CallableSignature) -> bool {
        if self.args().is_some_and(|args| sig.required_count != args) {
            return false;
        }

        if let Some(names) = self.names() {
            if !names.iter().all(|n| sig.positional_names.contains(n)) {
                return false;
            }
        }

        if self.varargs() && !sig.has_variadic_positional {
            return false;
        }

        if self.kwargs() && !sig.has_variadic_keyword {
            return false;
        }

        !self
            .optional()
            .is_some_and(|optional| sig.optional_count != optional)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Function, Signature};

    fn callable1() -> CallableSignature {
        Signature::new()
            .param("self")
            .param("arg1")
            .optional("arg2")
            .view(1)
    }

    fn callable2() -> CallableSignature {
        Signature::new()
            .param("cls")
            .varargs("args")
            .kwargs("kw")
            .view(1)
    }

    #[test]
    fn empty_shape_matches_anything() {
        let shape = CallableShape::new();
        assert!(shape.matches(&callable1()));
        assert!(shape.matches(&callable2()));
    }

    #[test]
    fn args_counts_required_params() {
        let mut shape = CallableShape::new();
        shape.set_args(1);
        assert!(shape.matches(&callable1()));
        assert!(!shape.matches(&callable2()));
    }

    #[test]
    fn optional_is_exact() {
        let mut shape = CallableShape::new();
        shape.set_optional(1);
        assert!(shape.matches(&callable1()));
        assert!(!shape.matches(&callable2()));
    }

    #[test]
    fn names_are_a_subset_check() {
        let mut shape = CallableShape::new();
        shape.set_names(["arg2".to_string()].into());
        assert!(shape.matches(&callable1()));

        shape.set_names(["arg1".to_string(), "arg3".to_string()].into());
        assert!(!shape.matches(&callable1()));
    }

    #[test]
    fn variadics_are_required_presence() {
        let mut shape = CallableShape::new();
        shape.set_varargs(true);
        shape.set_kwargs(true);
        assert!(shape.matches(&callable2()));
        assert!(!shape.matches(&callable1()));
    }

    #[test]
    fn like_derives_from_unbound_reference() {
        let reference = Value::function(Function::new(
            "callable1",
            Signature::new().param("self").param("arg1").optional("arg2"),
        ));
        let mut shape = CallableShape::new();
        shape.derive_from(&reference, true).unwrap();

        assert_eq!(shape.args(), Some(1));
        assert_eq!(shape.optional(), Some(1));
        assert_eq!(
            shape.names().unwrap().iter().collect::<Vec<_>>(),
            vec!["arg1", "arg2"]
        );
        assert!(!shape.varargs());
        assert!(shape.matches(&callable1()));
        assert!(!shape.matches(&callable2()));
    }

    #[test]
    fn like_variadic_reference() {
        let reference = Value::function(Function::new(
            "callable2",
            Signature::new().param("cls").varargs("args").kwargs("kw"),
        ));
        let mut shape = CallableShape::new();
        shape.derive_from(&reference, true).unwrap();

        assert_eq!(shape.args(), Some(0));
        assert!(shape.names().is_none());
        assert!(shape.optional().is_none());
        assert!(shape.matches(&callable2()));
        assert!(!shape.matches(&callable1()));
    }

    #[test]
    fn explicit_constraints_win_over_like() {
        let reference = Value::function(Function::new(
            "callable1",
            Signature::new().param("self").param("arg1").optional("arg2"),
        ));
        let mut shape = CallableShape::new();
        shape.set_args(2);
        shape.derive_from(&reference, true).unwrap();
        assert_eq!(shape.args(), Some(2));
        assert_eq!(shape.optional(), Some(1));
    }

    #[test]
    fn like_rejects_opaque_reference() {
        let reference = Value::function(Function::opaque("len"));
        let err = CallableShape::new()
            .derive_from(&reference, false)
            .unwrap_err();
        assert!(matches!(err, DeclarationError::Uninspectable { .. }));
    }
}
