//! Name registries used when reading declaration files.
//!
//! [`TypeRegistry`] resolves type names in `type`, `assume` and `like`
//! options. [`InterfaceRegistry`] holds declared interfaces so later files
//! can extend them.

use indexmap::IndexMap;

use crate::error::{ConformityError, Result};
use crate::host::{builtins, getattr, ClassRef, Value};
use crate::interface::InterfaceRef;

/// Host classes addressable by name.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    classes: IndexMap<String, ClassRef>,
}

impl TypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            classes: IndexMap::new(),
        }
    }

    /// Create a registry with every builtin type.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, cls) in builtins().by_name() {
            registry.register_as(name, cls);
        }
        registry
    }

    /// Register a class under its own name.
    pub fn register(&mut self, cls: &ClassRef) {
        self.register_as(cls.name(), cls);
    }

    /// Register a class under `name`, replacing any earlier entry.
    pub fn register_as(&mut self, name: impl Into<String>, cls: &ClassRef) {
        self.classes.insert(name.into(), cls.clone());
    }

    /// Get a class by name.
    pub fn get(&self, name: &str) -> Option<&ClassRef> {
        self.classes.get(name)
    }

    /// Resolve a class name, naming `context` on failure.
    pub fn resolve(&self, name: &str, context: &str) -> Result<&ClassRef> {
        self.get(name).ok_or_else(|| ConformityError::UnknownType {
            name: name.to_string(),
            context: context.to_string(),
        })
    }

    /// Resolve a `Type.member` path to the member as read from the class.
    pub fn resolve_member(&self, path: &str, context: &str) -> Result<Value> {
        let unknown = || ConformityError::UnknownType {
            name: path.to_string(),
            context: context.to_string(),
        };

        let (type_name, member) = path.rsplit_once('.').ok_or_else(unknown)?;
        let cls = self.get(type_name).ok_or_else(unknown)?;
        getattr(&Value::Class(cls.clone()), member).ok_or_else(unknown)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Declared interfaces addressable by name.
#[derive(Debug, Clone, Default)]
pub struct InterfaceRegistry {
    interfaces: IndexMap<String, InterfaceRef>,
}

impl InterfaceRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an interface under its name.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateInterface` if the name is taken.
    pub fn register(&mut self, interface: InterfaceRef) -> Result<()> {
        let name = interface.name().to_string();
        if self.interfaces.contains_key(&name) {
            return Err(ConformityError::DuplicateInterface { name });
        }
        self.interfaces.insert(name, interface);
        Ok(())
    }

    /// Get an interface by name.
    pub fn get(&self, name: &str) -> Option<&InterfaceRef> {
        self.interfaces.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.interfaces.contains_key(name)
    }

    /// Iterate over interfaces in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &InterfaceRef> {
        self.interfaces.values()
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Class, Function, Signature};
    use crate::interface::Interface;

    #[test]
    fn builtins_are_registered() {
        let registry = TypeRegistry::with_builtins();
        assert!(registry.get("int").is_some());
        assert!(registry.get("dict").is_some());
        assert!(registry.get("Stack").is_none());
    }

    #[test]
    fn new_registry_is_empty() {
        assert!(TypeRegistry::new().is_empty());
        assert!(!TypeRegistry::default().is_empty());
    }

    #[test]
    fn resolve_names_context_on_failure() {
        let registry = TypeRegistry::with_builtins();
        let err = registry.resolve("Widget", "IThing.size").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown type 'Widget' referenced by IThing.size"
        );
    }

    #[test]
    fn resolve_member_reads_through_class() {
        let cls = Class::builder("Builder")
            .method(Function::new("build", Signature::positional(["self", "spec"])))
            .build()
            .unwrap();
        let mut registry = TypeRegistry::with_builtins();
        registry.register(&cls);

        let member = registry.resolve_member("Builder.build", "IBuild.build").unwrap();
        assert!(matches!(member, Value::Function(_)));

        assert!(registry.resolve_member("Builder.missing", "x").is_err());
        assert!(registry.resolve_member("Builder", "x").is_err());
        assert!(registry.resolve_member("Nope.build", "x").is_err());
    }

    #[test]
    fn interface_registry_rejects_duplicates() {
        let mut registry = InterfaceRegistry::new();
        registry
            .register(Interface::define("IA").build().unwrap())
            .unwrap();
        let err = registry
            .register(Interface::define("IA").build().unwrap())
            .unwrap_err();

        assert!(matches!(err, ConformityError::DuplicateInterface { ref name } if name == "IA"));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("IA"));
    }
}
