//! Interface declaration: validation and requirement-set merging.
//!
//! # Merge policies
//!
//! - [`MergePolicy::Strict`] - a name defined by two parents, or by a parent
//!   and the interface itself, with different descriptors is a conflict.
//!   Reaching the same descriptor through two paths is not.
//! - [`MergePolicy::Override`] - later parents replace earlier ones and own
//!   fields replace everything inherited.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::requirements::RequirementSet;
use super::{Interface, InterfaceRef};
use crate::descriptor::{same_requirement, Descriptor, RequirementRef};
use crate::error::DeclarationError;
use crate::host::{ClassRef, Value};

/// Fields accepted alongside requirements.
pub const ALLOWED_METADATA: &[&str] = &[
    "__doc__",
    "__module__",
    "__qualname__",
    "__assume__",
    "__assume_interface__",
    "__sequence__",
];

/// How inherited requirement sets combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePolicy {
    #[default]
    Strict,
    Override,
}

/// Something an interface is declared to extend.
#[derive(Debug, Clone)]
pub enum Base {
    Interface(InterfaceRef),
    /// Always rejected; interfaces may only extend interfaces.
    Class(ClassRef),
}

impl From<InterfaceRef> for Base {
    fn from(interface: InterfaceRef) -> Self {
        Base::Interface(interface)
    }
}

impl From<&InterfaceRef> for Base {
    fn from(interface: &InterfaceRef) -> Self {
        Base::Interface(interface.clone())
    }
}

impl From<ClassRef> for Base {
    fn from(cls: ClassRef) -> Self {
        Base::Class(cls)
    }
}

impl From<&ClassRef> for Base {
    fn from(cls: &ClassRef) -> Self {
        Base::Class(cls.clone())
    }
}

/// A member of an interface declaration.
#[derive(Debug, Clone)]
pub enum Field {
    Requirement(RequirementRef),
    /// Plain value; only valid under an allow-listed metadata key.
    Value(Value),
}

impl From<Descriptor> for Field {
    fn from(descriptor: Descriptor) -> Self {
        Field::Requirement(Arc::new(descriptor))
    }
}

impl From<RequirementRef> for Field {
    fn from(requirement: RequirementRef) -> Self {
        Field::Requirement(requirement)
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Field::Value(value)
    }
}

/// Builder returned by [`Interface::define`].
#[derive(Debug)]
pub struct InterfaceBuilder {
    name: String,
    bases: Vec<Base>,
    fields: IndexMap<String, Field>,
    assumptions: Vec<ClassRef>,
    doc: Option<String>,
    module: Option<String>,
    qualname: Option<String>,
    policy: MergePolicy,
}

impl InterfaceBuilder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            fields: IndexMap::new(),
            assumptions: Vec::new(),
            doc: None,
            module: None,
            qualname: None,
            policy: MergePolicy::default(),
        }
    }

    /// Extend another interface.
    pub fn extends(mut self, base: impl Into<Base>) -> Self {
        self.bases.push(base.into());
        self
    }

    /// Declare a member. A repeated key replaces the earlier field.
    pub fn field(mut self, key: impl Into<String>, field: impl Into<Field>) -> Self {
        self.fields.insert(key.into(), field.into());
        self
    }

    /// Declare a descriptor requirement.
    pub fn require(self, key: impl Into<String>, descriptor: Descriptor) -> Self {
        self.field(key, descriptor)
    }

    /// Grant automatic conformance to instances and subclasses of `cls`.
    pub fn assume(mut self, cls: &ClassRef) -> Self {
        self.assumptions.push(cls.clone());
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn qualname(mut self, qualname: impl Into<String>) -> Self {
        self.qualname = Some(qualname.into());
        self
    }

    pub fn policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validate the declaration and merge requirement sets.
    ///
    /// Nothing is bound unless the whole declaration is valid.
    pub fn build(mut self) -> Result<InterfaceRef, DeclarationError> {
        let bases = self.interface_bases()?;
        let own = self.own_requirements()?;

        let mut merged: IndexMap<String, RequirementRef> = IndexMap::new();
        for base in &bases {
            let collisions = self.merge(&mut merged, base.requirements().iter());
            if !collisions.is_empty() {
                return Err(DeclarationError::Conflict {
                    interface: self.name.clone(),
                    origin: base.name().to_string(),
                    keys: collisions,
                });
            }
        }

        let mut staged = merged.clone();
        let collisions = self.merge(&mut staged, own.iter().map(|(k, v)| (k.as_str(), v)));
        if !collisions.is_empty() {
            return Err(DeclarationError::Conflict {
                interface: self.name.clone(),
                origin: self.name.clone(),
                keys: collisions,
            });
        }

        check_bindable(&own)?;
        for (key, requirement) in &own {
            requirement.bind(key)?;
        }

        let mut requirements = RequirementSet::new();
        for (key, requirement) in staged {
            requirements.insert(key, requirement);
        }

        let assumptions = if self.assumptions.is_empty() {
            bases
                .iter()
                .map(|b| b.assumptions())
                .find(|a| !a.is_empty())
                .map(<[ClassRef]>::to_vec)
                .unwrap_or_default()
        } else {
            self.assumptions
        };

        debug!(
            interface = %self.name,
            requirements = requirements.len(),
            bases = bases.len(),
            assumptions = assumptions.len(),
            "interface declared"
        );

        Ok(Arc::new(Interface {
            name: self.name,
            doc: self.doc,
            module: self.module,
            qualname: self.qualname,
            bases,
            requirements,
            assumptions,
            policy: self.policy,
        }))
    }

    fn interface_bases(&self) -> Result<Vec<InterfaceRef>, DeclarationError> {
        self.bases
            .iter()
            .map(|base| match base {
                Base::Interface(interface) => Ok(interface.clone()),
                Base::Class(cls) => Err(DeclarationError::ForeignBase {
                    interface: self.name.clone(),
                    base: cls.name().to_string(),
                }),
            })
            .collect()
    }

    /// Split fields into requirements and metadata, validating both.
    fn own_requirements(&mut self) -> Result<IndexMap<String, RequirementRef>, DeclarationError> {
        let mut own = IndexMap::new();

        for (key, field) in std::mem::take(&mut self.fields) {
            match field {
                Field::Requirement(requirement) => {
                    own.insert(key, requirement);
                }
                Field::Value(value) if ALLOWED_METADATA.contains(&key.as_str()) => {
                    self.apply_metadata(&key, value)?;
                }
                Field::Value(value) => {
                    return Err(DeclarationError::NotADescriptor {
                        key,
                        kind: value.type_name(),
                    });
                }
            }
        }

        Ok(own)
    }

    fn apply_metadata(&mut self, key: &str, value: Value) -> Result<(), DeclarationError> {
        let invalid = |message: &str| DeclarationError::InvalidMetadata {
            interface: self.name.clone(),
            key: key.to_string(),
            message: message.to_string(),
        };

        match key {
            "__assume__" | "__assume_interface__" => {
                let Value::List(items) = &value else {
                    return Err(invalid("expected a list of classes"));
                };
                let classes = items
                    .read()
                    .iter()
                    .map(|item| item.as_class().cloned())
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| invalid("expected a list of classes"))?;
                self.assumptions.extend(classes);
            }
            // Declaration-order counter; carries no meaning here.
            "__sequence__" => {}
            _ => {
                let text = value
                    .as_str()
                    .ok_or_else(|| invalid("expected a string"))?
                    .to_string();
                match key {
                    "__doc__" => self.doc = Some(text),
                    "__module__" => self.module = Some(text),
                    _ => self.qualname = Some(text),
                }
            }
        }
        Ok(())
    }

    /// Merge `incoming` into `merged`, returning names that collide under
    /// the strict policy.
    fn merge<'a>(
        &self,
        merged: &mut IndexMap<String, RequirementRef>,
        incoming: impl Iterator<Item = (&'a str, &'a RequirementRef)>,
    ) -> Vec<String> {
        let mut collisions = Vec::new();

        for (key, requirement) in incoming {
            match merged.get(key) {
                Some(existing) if same_requirement(existing, requirement) => {}
                Some(_) if self.policy == MergePolicy::Strict => {
                    collisions.push(key.to_string());
                }
                Some(_) => {
                    debug!(interface = %self.name, requirement = key, "requirement overridden");
                    merged.insert(key.to_string(), requirement.clone());
                }
                None => {
                    merged.insert(key.to_string(), requirement.clone());
                }
            }
        }

        collisions
    }
}

/// Reject names a requirement cannot take before anything is bound.
fn check_bindable(own: &IndexMap<String, RequirementRef>) -> Result<(), DeclarationError> {
    let mut claimed: Vec<(&RequirementRef, &str)> = Vec::new();

    for (key, requirement) in own {
        let bound = requirement.name().or_else(|| {
            claimed
                .iter()
                .find(|(other, _)| same_requirement(other, requirement))
                .map(|(_, name)| *name)
        });
        if let Some(bound) = bound.filter(|bound| *bound != key.as_str()) {
            return Err(DeclarationError::AlreadyBound {
                bound: bound.to_string(),
                requested: key.clone(),
            });
        }
        claimed.push((requirement, key));
    }

    Ok(())
}
