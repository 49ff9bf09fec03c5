//! Attribute resolution and type queries over host values.
//!
//! Lookup order for `getattr`:
//!
//! 1. An object's own storage
//! 2. Members along the MRO of the candidate's class (or of the candidate
//!    itself when it is a class), bound according to their [`Binding`]
//! 3. For classes only, members along the metaclass MRO, bound to the class

use std::sync::Arc;

use super::builtins::builtins;
use super::class::{Binding, Class, ClassRef, Member};
use super::function::{BoundMethod, CallableSignature, Function};
use super::value::Value;

fn bound(receiver: Value, function: &Arc<Function>) -> Value {
    Value::BoundMethod(Arc::new(BoundMethod::new(receiver, function.clone())))
}

/// Member as seen through an instance of `owner`.
fn through_instance(instance: &Value, owner: &ClassRef, member: &Member) -> Value {
    match member {
        Member::Data(value) => value.clone(),
        Member::Method(f) => bound(instance.clone(), f),
        Member::ClassMethod(f) => bound(Value::Class(owner.clone()), f),
        Member::StaticMethod(f) => Value::Function(f.clone()),
    }
}

/// Member as seen through the class object itself.
fn through_class(cls: &ClassRef, member: &Member) -> Value {
    match member {
        Member::Data(value) => value.clone(),
        Member::Method(f) | Member::StaticMethod(f) => Value::Function(f.clone()),
        Member::ClassMethod(f) => bound(Value::Class(cls.clone()), f),
    }
}

/// Resolve `candidate.<name>`, or `None` if the attribute does not exist.
pub fn getattr(candidate: &Value, name: &str) -> Option<Value> {
    match candidate {
        Value::Object(obj) => obj.get(name).or_else(|| {
            obj.class()
                .lookup(name)
                .map(|(_, member)| through_instance(candidate, obj.class(), member))
        }),
        Value::Class(cls) => cls
            .lookup(name)
            .map(|(_, member)| through_class(cls, member))
            .or_else(|| {
                let meta = cls.metaclass().unwrap_or(&builtins().type_);
                meta.lookup(name)
                    .map(|(_, member)| through_instance(candidate, meta, member))
            }),
        other => {
            let cls = other.class();
            cls.lookup(name)
                .map(|(_, member)| through_instance(candidate, &cls, member))
        }
    }
}

/// Whether `candidate.<name>` resolves.
pub fn hasattr(candidate: &Value, name: &str) -> bool {
    getattr(candidate, name).is_some()
}

/// Whether `value` is an instance of `cls` or of one of its subclasses.
pub fn isinstance(value: &Value, cls: &Class) -> bool {
    value.class().is_subclass_of(cls)
}

/// Whether `name` lives in the candidate's own storage.
///
/// An object's own storage is its slots; a class's is the members it
/// declares directly. Native values have none.
pub fn has_own(candidate: &Value, name: &str) -> bool {
    match candidate {
        Value::Object(obj) => obj.has_own(name),
        Value::Class(cls) => cls.own_member(name).is_some(),
        _ => false,
    }
}

/// The class whose ancestor chain describes the candidate: the candidate
/// itself for classes, its class otherwise.
pub fn subject_class(candidate: &Value) -> ClassRef {
    match candidate {
        Value::Class(cls) => cls.clone(),
        other => other.class(),
    }
}

/// Binding of the first ancestor that declares `name` directly.
pub fn first_definer_binding(candidate: &Value, name: &str) -> Option<Binding> {
    subject_class(candidate)
        .lookup(name)
        .map(|(_, member)| member.binding())
}

/// Whether some class along the candidate's ancestor chain declares `name`.
pub fn declared_in_chain(candidate: &Value, name: &str) -> bool {
    subject_class(candidate).lookup(name).is_some()
}

/// Introspect a callable value.
///
/// Returns the signature after removing `skip` receiver parameters, or `None`
/// when the value is not callable or its parameters are opaque. Objects are
/// introspected through a `__call__` member.
pub fn callable_signature(value: &Value, skip: usize) -> Option<CallableSignature> {
    match value {
        Value::Function(f) => f.signature().map(|sig| sig.view(skip)),
        Value::BoundMethod(m) => m.function().signature().map(|sig| sig.view(skip)),
        Value::Object(obj) => match obj.class().lookup("__call__") {
            Some((_, Member::Method(f))) => f.signature().map(|sig| sig.view(1)),
            _ => None,
        },
        _ => None,
    }
}

/// Whether the value can be called at all.
pub fn is_callable(value: &Value) -> bool {
    match value {
        Value::Function(_) | Value::BoundMethod(_) | Value::Class(_) => true,
        Value::Object(obj) => obj.class().lookup("__call__").is_some(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Object, Signature};

    fn sample() -> ClassRef {
        Class::builder("Sample")
            .attribute("foo", 27i64)
            .method(Function::new("callable1", Signature::new().param("self").param("arg1").optional("arg2")))
            .class_method(Function::new("callable2", Signature::new().param("cls").varargs("args").kwargs("kw")))
            .static_method(Function::new("callable3", Signature::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn instance_lookup_binds_methods() {
        let cls = sample();
        let inst = Value::Object(Object::new(&cls));

        assert!(matches!(getattr(&inst, "callable1"), Some(Value::BoundMethod(_))));
        match getattr(&inst, "callable2") {
            Some(Value::BoundMethod(m)) => assert!(m.receiver().is(&Value::Class(cls.clone()))),
            other => panic!("expected bound class method, got {:?}", other),
        }
        assert!(matches!(getattr(&inst, "callable3"), Some(Value::Function(_))));
        assert_eq!(getattr(&inst, "foo"), Some(Value::Int(27)));
        assert!(getattr(&inst, "missing").is_none());
    }

    #[test]
    fn class_lookup_leaves_instance_methods_unbound() {
        let cls = Value::Class(sample());
        assert!(matches!(getattr(&cls, "callable1"), Some(Value::Function(_))));
        assert!(matches!(getattr(&cls, "callable2"), Some(Value::BoundMethod(_))));
        assert!(matches!(getattr(&cls, "callable3"), Some(Value::Function(_))));
    }

    #[test]
    fn own_storage_shadows_class() {
        let cls = sample();
        let obj = Object::new(&cls);
        obj.set("foo", 42i64);
        let inst = Value::Object(obj);

        assert_eq!(getattr(&inst, "foo"), Some(Value::Int(42)));
        assert!(has_own(&inst, "foo"));
        assert!(!has_own(&inst, "callable1"));
    }

    #[test]
    fn class_storage_is_its_own_members() {
        let base = sample();
        let derived = Class::builder("Derived")
            .base(&base)
            .attribute("bar", 1i64)
            .build()
            .unwrap();

        assert!(has_own(&Value::Class(base), "foo"));
        assert!(has_own(&Value::Class(derived.clone()), "bar"));
        assert!(!has_own(&Value::Class(derived), "foo"));
        assert!(!has_own(&Value::list([]), "append"));
    }

    #[test]
    fn metaclass_members_are_visible_on_the_class_only() {
        let meta = Class::builder("MetaLengthly")
            .base(&builtins().type_)
            .method(Function::new("__len__", Signature::positional(["self"])))
            .build()
            .unwrap();
        let cls = Class::builder("MyLengthly").metaclass(&meta).build().unwrap();

        let as_class = Value::Class(cls.clone());
        assert!(matches!(getattr(&as_class, "__len__"), Some(Value::BoundMethod(_))));

        let inst = Value::Object(Object::new(&cls));
        assert!(getattr(&inst, "__len__").is_none());
    }

    #[test]
    fn native_values_resolve_builtin_methods() {
        let list = Value::list([]);
        assert!(matches!(getattr(&list, "append"), Some(Value::BoundMethod(_))));
        assert!(getattr(&Value::Int(3), "append").is_none());
    }

    #[test]
    fn isinstance_follows_mro() {
        let b = builtins();
        assert!(isinstance(&Value::Bool(true), &b.int));
        assert!(isinstance(&Value::Int(1), &b.object));
        assert!(!isinstance(&Value::Int(1), &b.str));
        assert!(isinstance(&Value::Class(b.dict.clone()), &b.type_));
    }

    #[test]
    fn first_definer_reports_binding() {
        let inst = Value::Object(Object::new(&sample()));
        assert_eq!(first_definer_binding(&inst, "callable2"), Some(Binding::Class));
        assert_eq!(first_definer_binding(&inst, "callable3"), Some(Binding::Static));
        assert_eq!(first_definer_binding(&inst, "foo"), Some(Binding::Data));
        assert_eq!(first_definer_binding(&inst, "nope"), None);
    }

    #[test]
    fn signatures_are_introspected() {
        let cls = sample();
        let inst = Value::Object(Object::new(&cls));
        let method = getattr(&inst, "callable1").unwrap();
        let sig = callable_signature(&method, 1).unwrap();
        assert_eq!(sig.positional_names, vec!["arg1", "arg2"]);

        assert!(callable_signature(&Value::Int(1), 0).is_none());
        let opaque = getattr(&Value::list([]), "append").unwrap();
        assert!(callable_signature(&opaque, 1).is_none());
    }

    #[test]
    fn callable_objects_use_dunder_call() {
        let cls = Class::builder("Functor")
            .method(Function::new("__call__", Signature::positional(["self", "x"])))
            .build()
            .unwrap();
        let inst = Value::Object(Object::new(&cls));
        assert!(is_callable(&inst));
        let sig = callable_signature(&inst, 0).unwrap();
        assert_eq!(sig.positional_names, vec!["x"]);
        assert!(!is_callable(&Value::from("text")));
    }
}
