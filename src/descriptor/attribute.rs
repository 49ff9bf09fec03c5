//! The production descriptor.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::{trace, warn};

use super::kind::DescriptorKind;
use super::requirement::Requirement;
use super::shape::CallableShape;
use crate::error::DeclarationError;
use crate::host::{getattr, ClassRef, Value};

/// Predicate over a resolved attribute value.
pub type Validator = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A structural check against one named attribute of a candidate.
///
/// Descriptors are constructed unnamed and receive their name when an
/// interface is built. Evaluation then runs, in order and stopping at the
/// first failure:
///
/// 1. the attribute must resolve
/// 2. it must equal the expected value, if one is set
/// 3. it must be the expected identity, if one is set
/// 4. the validator must accept it, if one is set
/// 5. the variant check of [`DescriptorKind`] must pass
///
/// # Example
///
/// ```
/// use conformity::descriptor::{Descriptor, Requirement};
/// use conformity::host::{builtins, Class, Object, Value};
///
/// let counter = Descriptor::property().of_type(&builtins().int);
/// counter.bind("count").unwrap();
///
/// let cls = Class::builder("Counter").attribute("count", 0i64).build().unwrap();
/// assert!(counter.evaluate(&Value::Object(Object::new(&cls))));
/// ```
pub struct Descriptor {
    name: OnceLock<String>,
    doc: Option<String>,
    value: Option<Value>,
    identity: Option<Value>,
    validator: Option<Validator>,
    kind: DescriptorKind,
}

impl Descriptor {
    fn with_kind(kind: DescriptorKind) -> Self {
        Self {
            name: OnceLock::new(),
            doc: None,
            value: None,
            identity: None,
            validator: None,
            kind,
        }
    }

    /// Existence check.
    pub fn attribute() -> Self {
        Self::with_kind(DescriptorKind::Attribute)
    }

    /// Typed property.
    pub fn property() -> Self {
        Self::with_kind(DescriptorKind::Property { types: Vec::new() })
    }

    /// Property found on the ancestor chain, absent from the candidate's own storage.
    pub fn class_property() -> Self {
        Self::with_kind(DescriptorKind::ClassProperty { types: Vec::new() })
    }

    /// Property held in the candidate's own storage.
    pub fn instance_property() -> Self {
        Self::with_kind(DescriptorKind::InstanceProperty { types: Vec::new() })
    }

    /// Any callable.
    pub fn callable() -> Self {
        Self::with_kind(DescriptorKind::Callable(CallableShape::new()))
    }

    /// Instance method.
    pub fn method() -> Self {
        Self::with_kind(DescriptorKind::Method(CallableShape::new()))
    }

    /// Class method.
    pub fn class_method() -> Self {
        Self::with_kind(DescriptorKind::ClassMethod(CallableShape::new()))
    }

    /// Static method.
    pub fn static_method() -> Self {
        Self::with_kind(DescriptorKind::StaticMethod(CallableShape::new()))
    }

    /// Documentation string.
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Require the attribute to equal `value`.
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Require the attribute to be `identity` itself.
    pub fn identity(mut self, identity: impl Into<Value>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Require `validator` to accept the attribute.
    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Accept values of `ty`. Repeat to accept any of several types.
    pub fn of_type(mut self, ty: &ClassRef) -> Self {
        match self.kind.types_mut() {
            Some(types) => types.push(ty.clone()),
            None => warn!(
                kind = self.kind.label(),
                ty = ty.name(),
                "type constraint ignored on a non-property descriptor"
            ),
        }
        self
    }

    /// Exact number of required positional parameters, receiver excluded.
    pub fn args(mut self, args: usize) -> Self {
        self.with_shape("args", |shape| shape.set_args(args));
        self
    }

    /// Parameter names that must be present.
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        self.with_shape("names", |shape| shape.set_names(names));
        self
    }

    /// Exact number of defaulted parameters.
    pub fn optional(mut self, optional: usize) -> Self {
        self.with_shape("optional", |shape| shape.set_optional(optional));
        self
    }

    /// Whether a variadic positional capture is required.
    pub fn varargs(mut self, required: bool) -> Self {
        self.with_shape("varargs", |shape| shape.set_varargs(required));
        self
    }

    /// Whether a variadic keyword capture is required.
    pub fn kwargs(mut self, required: bool) -> Self {
        self.with_shape("kwargs", |shape| shape.set_kwargs(required));
        self
    }

    /// Derive the shape from a reference callable.
    ///
    /// Fails when the reference cannot be introspected.
    pub fn like(mut self, reference: &Value) -> Result<Self, DeclarationError> {
        let receiver = self.kind.is_method_family();
        match self.kind.shape_mut() {
            Some(shape) => shape.derive_from(reference, receiver)?,
            None => warn!(
                kind = self.kind.label(),
                "`like` ignored on a non-callable descriptor"
            ),
        }
        Ok(self)
    }

    fn with_shape(&mut self, option: &str, apply: impl FnOnce(&mut CallableShape)) {
        match self.kind.shape_mut() {
            Some(shape) => apply(shape),
            None => warn!(
                kind = self.kind.label(),
                option,
                "shape constraint ignored on a non-callable descriptor"
            ),
        }
    }

    pub fn kind(&self) -> &DescriptorKind {
        &self.kind
    }

    pub fn documentation(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn expected_value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn expected_identity(&self) -> Option<&Value> {
        self.identity.as_ref()
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }
}

impl Requirement for Descriptor {
    fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    fn bind(&self, name: &str) -> Result<(), DeclarationError> {
        let bound = self.name.get_or_init(|| name.to_string());
        if bound == name {
            Ok(())
        } else {
            Err(DeclarationError::AlreadyBound {
                bound: bound.clone(),
                requested: name.to_string(),
            })
        }
    }

    fn evaluate(&self, candidate: &Value) -> bool {
        let Some(name) = self.name.get() else {
            trace!(descriptor = %self, "unbound descriptor");
            return false;
        };

        let Some(value) = getattr(candidate, name) else {
            trace!(requirement = %name, "attribute missing");
            return false;
        };

        if self.value.as_ref().is_some_and(|expected| value != *expected) {
            trace!(requirement = %name, "value mismatch");
            return false;
        }

        if self
            .identity
            .as_ref()
            .is_some_and(|expected| !value.is(expected))
        {
            trace!(requirement = %name, "identity mismatch");
            return false;
        }

        if self.validator.as_ref().is_some_and(|validate| !validate(&value)) {
            trace!(requirement = %name, "validator rejected value");
            return false;
        }

        let refined = self.kind.refine(name, candidate, &value);
        if !refined {
            trace!(requirement = %name, kind = self.kind.label(), "refinement failed");
        }
        refined
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({})",
            self.kind.label(),
            self.name.get().map(String::as_str).unwrap_or("")
        )
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name.get())
            .field("kind", &self.kind)
            .field("value", &self.value)
            .field("identity", &self.identity)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}
