//! Host classes, their members, and C3 linearization.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::builtins::builtins;
use super::function::Function;
use super::object::{Object, ObjectRef};
use super::value::Value;
use crate::error::DeclarationError;

/// Shared handle to a class. Classes compare by identity.
pub type ClassRef = Arc<Class>;

/// How a class member is bound when it is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Plain data; returned as-is.
    Data,
    /// Bound to the instance; unbound when read from the class.
    Instance,
    /// Bound to the class, from instances and classes alike.
    Class,
    /// Never bound.
    Static,
}

/// A member declared directly on a class.
#[derive(Debug, Clone)]
pub enum Member {
    Data(Value),
    Method(Arc<Function>),
    ClassMethod(Arc<Function>),
    StaticMethod(Arc<Function>),
}

impl Member {
    pub fn binding(&self) -> Binding {
        match self {
            Member::Data(_) => Binding::Data,
            Member::Method(_) => Binding::Instance,
            Member::ClassMethod(_) => Binding::Class,
            Member::StaticMethod(_) => Binding::Static,
        }
    }
}

/// A named type with bases, directly-declared members and a precomputed MRO.
pub struct Class {
    name: String,
    bases: Vec<ClassRef>,
    members: IndexMap<String, Member>,
    metaclass: Option<ClassRef>,
    native: bool,
    // MRO without the class itself.
    ancestors: Vec<ClassRef>,
}

impl Class {
    /// Start declaring a class.
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            name: name.into(),
            bases: Vec::new(),
            members: IndexMap::new(),
            metaclass: None,
        }
    }

    /// A builtin class with at most one base; its MRO is trivially consistent.
    pub(crate) fn native(
        name: &str,
        base: Option<&ClassRef>,
        members: IndexMap<String, Member>,
    ) -> ClassRef {
        let ancestors = base
            .map(|b| std::iter::once(b.clone()).chain(b.ancestors.iter().cloned()).collect())
            .unwrap_or_default();
        Arc::new(Class {
            name: name.to_string(),
            bases: base.into_iter().cloned().collect(),
            members,
            metaclass: None,
            native: true,
            ancestors,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bases(&self) -> &[ClassRef] {
        &self.bases
    }

    pub fn metaclass(&self) -> Option<&ClassRef> {
        self.metaclass.as_ref()
    }

    /// Whether this is a builtin (native) type.
    pub fn is_native(&self) -> bool {
        self.native
    }

    /// Members declared directly on this class, excluding inherited ones.
    pub fn own_members(&self) -> &IndexMap<String, Member> {
        &self.members
    }

    /// Member declared directly on this class.
    pub fn own_member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    /// Method resolution order, starting with this class.
    pub fn mro(&self) -> impl Iterator<Item = &Class> {
        std::iter::once(self).chain(self.ancestors.iter().map(|c| c.as_ref()))
    }

    /// Names of the classes in the MRO.
    pub fn mro_names(&self) -> Vec<&str> {
        self.mro().map(|c| c.name()).collect()
    }

    /// Whether `self` is `other` or inherits from it.
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        self.mro().any(|c| std::ptr::eq(c, other))
    }

    /// First member named `name` along the MRO, with the class that declares it.
    pub fn lookup(&self, name: &str) -> Option<(&Class, &Member)> {
        self.mro()
            .find_map(|c| c.members.get(name).map(|member| (c, member)))
    }

    /// Create a bare instance.
    pub fn instantiate(self: &Arc<Self>) -> ObjectRef {
        Object::new(self)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("mro", &self.mro_names())
            .field("members", &self.members.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for user classes.
pub struct ClassBuilder {
    name: String,
    bases: Vec<ClassRef>,
    members: IndexMap<String, Member>,
    metaclass: Option<ClassRef>,
}

impl ClassBuilder {
    /// Add a base class. Without any, the class derives from `object`.
    pub fn base(mut self, base: &ClassRef) -> Self {
        self.bases.push(base.clone());
        self
    }

    /// Class used for lookups on the class object itself.
    pub fn metaclass(mut self, metaclass: &ClassRef) -> Self {
        self.metaclass = Some(metaclass.clone());
        self
    }

    /// Declare a plain class attribute.
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.insert(name.into(), Member::Data(value.into()));
        self
    }

    /// Declare an instance method. The function name becomes the member name.
    pub fn method(mut self, function: Function) -> Self {
        self.members
            .insert(function.name().to_string(), Member::Method(Arc::new(function)));
        self
    }

    /// Declare a class method.
    pub fn class_method(mut self, function: Function) -> Self {
        self.members.insert(
            function.name().to_string(),
            Member::ClassMethod(Arc::new(function)),
        );
        self
    }

    /// Declare a static method.
    pub fn static_method(mut self, function: Function) -> Self {
        self.members.insert(
            function.name().to_string(),
            Member::StaticMethod(Arc::new(function)),
        );
        self
    }

    /// Declare an arbitrary member under `name`.
    pub fn member(mut self, name: impl Into<String>, member: Member) -> Self {
        self.members.insert(name.into(), member);
        self
    }

    /// Linearize the bases and create the class.
    pub fn build(self) -> Result<ClassRef, DeclarationError> {
        let bases = if self.bases.is_empty() {
            vec![builtins().object.clone()]
        } else {
            self.bases
        };
        let ancestors = linearize(&self.name, &bases)?;

        Ok(Arc::new(Class {
            name: self.name,
            bases,
            members: self.members,
            metaclass: self.metaclass,
            native: false,
            ancestors,
        }))
    }
}

/// C3 merge of the bases' MROs followed by the base list itself.
fn linearize(name: &str, bases: &[ClassRef]) -> Result<Vec<ClassRef>, DeclarationError> {
    let mut seqs: Vec<Vec<ClassRef>> = bases
        .iter()
        .map(|b| {
            std::iter::once(b.clone())
                .chain(b.ancestors.iter().cloned())
                .collect()
        })
        .collect();
    seqs.push(bases.to_vec());

    let mut out: Vec<ClassRef> = Vec::new();
    loop {
        seqs.retain(|s| !s.is_empty());
        if seqs.is_empty() {
            return Ok(out);
        }

        let head = seqs
            .iter()
            .map(|s| &s[0])
            .find(|head| {
                !seqs
                    .iter()
                    .any(|s| s[1..].iter().any(|c| Arc::ptr_eq(c, head)))
            })
            .cloned()
            .ok_or_else(|| DeclarationError::InconsistentHierarchy {
                class: name.to_string(),
            })?;

        for seq in seqs.iter_mut() {
            if Arc::ptr_eq(&seq[0], &head) {
                seq.remove(0);
            }
        }
        out.push(head);
    }
}
