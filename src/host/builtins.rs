//! Builtin (native) types.
//!
//! Native container methods are opaque: they are present for attribute
//! lookup but expose no signature, so structural checks cannot see into
//! them. Interfaces that want to accept native containers list them in
//! their assumption set instead.

use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;

use super::class::{Class, ClassRef, Member};
use super::function::Function;

/// The builtin type table.
#[derive(Debug)]
pub struct Builtins {
    pub object: ClassRef,
    pub type_: ClassRef,
    pub none: ClassRef,
    pub bool: ClassRef,
    pub int: ClassRef,
    pub float: ClassRef,
    pub str: ClassRef,
    pub list: ClassRef,
    pub dict: ClassRef,
    pub function: ClassRef,
    pub method: ClassRef,
}

impl Builtins {
    /// Every builtin, keyed by its host name.
    pub fn by_name(&self) -> Vec<(&str, &ClassRef)> {
        [
            &self.object,
            &self.type_,
            &self.none,
            &self.bool,
            &self.int,
            &self.float,
            &self.str,
            &self.list,
            &self.dict,
            &self.function,
            &self.method,
        ]
        .into_iter()
        .map(|cls| (cls.name(), cls))
        .collect()
    }
}

static BUILTINS: LazyLock<Builtins> = LazyLock::new(|| {
    let object = Class::native("object", None, IndexMap::new());
    let leaf = |name: &str, base: &ClassRef| Class::native(name, Some(base), IndexMap::new());
    let int = leaf("int", &object);

    Builtins {
        type_: leaf("type", &object),
        none: leaf("NoneType", &object),
        bool: leaf("bool", &int),
        float: leaf("float", &object),
        str: leaf("str", &object),
        list: Class::native("list", Some(&object), list_members()),
        dict: Class::native("dict", Some(&object), dict_members()),
        function: leaf("function", &object),
        method: leaf("method", &object),
        int,
        object,
    }
});

/// The shared builtin type table.
pub fn builtins() -> &'static Builtins {
    &BUILTINS
}

fn opaque_members(names: &[&str]) -> IndexMap<String, Member> {
    names
        .iter()
        .map(|name| {
            let method = Member::Method(Arc::new(Function::opaque(*name)));
            (name.to_string(), method)
        })
        .collect()
}

fn list_members() -> IndexMap<String, Member> {
    opaque_members(&["append", "pop", "__len__", "__getitem__", "__setitem__"])
}

fn dict_members() -> IndexMap<String, Member> {
    opaque_members(&["__getitem__", "__setitem__", "__delitem__", "__len__", "get"])
}
