//! Turning parsed declaration files into interfaces.
//!
//! Interfaces may extend interfaces declared later in the same file, so
//! declaration follows `extends` depth-first. Nothing is registered unless
//! every interface in the file declares cleanly.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::debug;

use super::registry::{InterfaceRegistry, TypeRegistry};
use super::schema::{DeclarationFile, InterfaceDecl, MemberDecl, MemberKind};
use crate::descriptor::Descriptor;
use crate::error::{ConformityError, Result};
use crate::host::Value;
use crate::interface::{Base, Field, Interface, InterfaceRef};

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Whether `name` is usable as a member name.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Declare every interface in `file` and register them.
///
/// `extends` and `assume` names resolve against the file itself first, then
/// against `interfaces`, then against `types`.
///
/// # Errors
///
/// Fails on the first invalid interface; `interfaces` is left untouched.
pub fn declare(
    file: &DeclarationFile,
    types: &TypeRegistry,
    interfaces: &mut InterfaceRegistry,
) -> Result<Vec<InterfaceRef>> {
    if let Some(name) = file.interfaces.keys().find(|n| interfaces.contains(n)) {
        return Err(ConformityError::DuplicateInterface { name: name.clone() });
    }

    let mut declarer = Declarer {
        file,
        types,
        registered: interfaces,
        declared: IndexMap::new(),
        path: Vec::new(),
    };
    for name in file.interfaces.keys() {
        declarer.declare(name)?;
    }

    let declared = declarer.declared;
    let ordered: Vec<InterfaceRef> = file
        .interfaces
        .keys()
        .filter_map(|name| declared.get(name).cloned())
        .collect();
    for interface in &ordered {
        interfaces.register(interface.clone())?;
    }
    Ok(ordered)
}

struct Declarer<'a> {
    file: &'a DeclarationFile,
    types: &'a TypeRegistry,
    registered: &'a InterfaceRegistry,
    declared: IndexMap<String, InterfaceRef>,
    path: Vec<String>,
}

impl Declarer<'_> {
    fn declare(&mut self, name: &str) -> Result<InterfaceRef> {
        if let Some(done) = self.declared.get(name) {
            return Ok(done.clone());
        }

        if let Some(start) = self.path.iter().position(|n| n == name) {
            let cycle = self.path[start..].join(" -> ");
            return Err(ConformityError::CircularExtends {
                cycle: format!("{} -> {}", cycle, name),
            });
        }

        let file = self.file;
        let Some(decl) = file.interfaces.get(name) else {
            return self.registered.get(name).cloned().ok_or_else(|| {
                ConformityError::UnknownInterface {
                    name: name.to_string(),
                    context: "declaration".to_string(),
                }
            });
        };

        self.path.push(name.to_string());
        let bases = decl
            .extends
            .iter()
            .map(|base| self.base(name, base))
            .collect::<Result<Vec<_>>>();
        self.path.pop();

        let interface = self.build(name, decl, bases?)?;
        self.declared.insert(name.to_string(), interface.clone());
        Ok(interface)
    }

    fn base(&mut self, interface: &str, base: &str) -> Result<Base> {
        if self.file.interfaces.contains_key(base) {
            return self.declare(base).map(Base::Interface);
        }
        if let Some(registered) = self.registered.get(base) {
            return Ok(Base::Interface(registered.clone()));
        }
        if let Some(cls) = self.types.get(base) {
            return Ok(Base::Class(cls.clone()));
        }
        Err(ConformityError::UnknownInterface {
            name: base.to_string(),
            context: interface.to_string(),
        })
    }

    fn build(&self, name: &str, decl: &InterfaceDecl, bases: Vec<Base>) -> Result<InterfaceRef> {
        let mut builder = Interface::define(name).policy(decl.policy.unwrap_or(self.file.policy));

        for base in bases {
            builder = builder.extends(base);
        }
        for assumed in &decl.assume {
            builder = builder.assume(self.types.resolve(assumed, name)?);
        }
        if let Some(doc) = &decl.doc {
            builder = builder.doc(doc);
        }
        if let Some(module) = &decl.module {
            builder = builder.module(module);
        }
        for (key, raw) in &decl.members {
            builder = builder.field(key, member_field(name, key, raw, self.types)?);
        }

        let interface = builder.build()?;
        debug!(
            interface = name,
            requirements = interface.requirements().len(),
            "interface declared from file"
        );
        Ok(interface)
    }
}

/// Read one member entry.
///
/// Scalars pass through as plain values so the interface builder can accept
/// them as metadata or reject them as non-descriptors.
fn member_field(
    interface: &str,
    key: &str,
    raw: &serde_yaml::Value,
    types: &TypeRegistry,
) -> Result<Field> {
    if !is_identifier(key) {
        return Err(ConformityError::InvalidMemberName {
            interface: interface.to_string(),
            member: key.to_string(),
        });
    }

    if !raw.is_mapping() {
        return Ok(Field::Value(member_value(interface, key, raw)?));
    }

    let decl: MemberDecl =
        serde_yaml::from_value(raw.clone()).map_err(|e| ConformityError::InvalidMember {
            interface: interface.to_string(),
            member: key.to_string(),
            message: e.to_string(),
        })?;

    Ok(Field::from(descriptor(&decl, types, interface, key)?))
}

fn descriptor(
    decl: &MemberDecl,
    types: &TypeRegistry,
    interface: &str,
    member: &str,
) -> Result<Descriptor> {
    let context = format!("{}.{}", interface, member);
    let mut descriptor = match decl.kind {
        MemberKind::Attribute => Descriptor::attribute(),
        MemberKind::Property => Descriptor::property(),
        MemberKind::ClassProperty => Descriptor::class_property(),
        MemberKind::InstanceProperty => Descriptor::instance_property(),
        MemberKind::Callable => Descriptor::callable(),
        MemberKind::Method => Descriptor::method(),
        MemberKind::ClassMethod => Descriptor::class_method(),
        MemberKind::StaticMethod => Descriptor::static_method(),
    };

    if let Some(doc) = &decl.doc {
        descriptor = descriptor.doc(doc);
    }
    if let Some(value) = &decl.value {
        descriptor = descriptor.value(member_value(interface, member, value)?);
    }
    for ty in &decl.types {
        descriptor = descriptor.of_type(types.resolve(ty, &context)?);
    }
    if let Some(path) = &decl.like {
        let reference = types.resolve_member(path, &context)?;
        descriptor = descriptor.like(&reference)?;
    }
    if let Some(args) = decl.args {
        descriptor = descriptor.args(args);
    }
    if let Some(names) = &decl.names {
        descriptor = descriptor.names(names.iter().cloned());
    }
    if let Some(optional) = decl.optional {
        descriptor = descriptor.optional(optional);
    }
    if let Some(varargs) = decl.varargs {
        descriptor = descriptor.varargs(varargs);
    }
    if let Some(kwargs) = decl.kwargs {
        descriptor = descriptor.kwargs(kwargs);
    }

    Ok(descriptor)
}

/// Convert YAML data into a host value.
///
/// Fails on data the host cannot represent: mapping keys that are not
/// strings and integers outside the `i64` range.
pub fn yaml_to_value(yaml: &serde_yaml::Value) -> std::result::Result<Value, String> {
    use serde_yaml::Value as Yaml;

    match yaml {
        Yaml::Null => Ok(Value::None),
        Yaml::Bool(b) => Ok(Value::Bool(*b)),
        Yaml::Number(n) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.is_f64().then(|| n.as_f64()).flatten().map(Value::Float))
            .ok_or_else(|| format!("integer {} is out of range", n)),
        Yaml::String(s) => Ok(Value::from(s.as_str())),
        Yaml::Sequence(items) => Ok(Value::list(
            items.iter().map(yaml_to_value).collect::<std::result::Result<Vec<_>, _>>()?,
        )),
        Yaml::Mapping(entries) => {
            let entries = entries
                .iter()
                .map(|(k, v)| match k.as_str() {
                    Some(key) => Ok((key.to_string(), yaml_to_value(v)?)),
                    None => Err(format!("mapping key {:?} is not a string", k)),
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(Value::map(entries))
        }
        Yaml::Tagged(tagged) => yaml_to_value(&tagged.value),
    }
}

fn member_value(interface: &str, member: &str, yaml: &serde_yaml::Value) -> Result<Value> {
    yaml_to_value(yaml).map_err(|message| ConformityError::InvalidMember {
        interface: interface.to_string(),
        member: member.to_string(),
        message,
    })
}
