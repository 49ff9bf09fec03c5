//! Requirement sets: the name → requirement mapping an interface enforces.

use indexmap::IndexMap;

use crate::descriptor::{same_requirement, RequirementRef};

/// Insertion-ordered requirements, keyed by name.
///
/// Built once by the interface builder and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct RequirementSet {
    entries: IndexMap<String, RequirementRef>,
}

impl RequirementSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a requirement by name.
    pub fn get(&self, name: &str) -> Option<&RequirementRef> {
        self.entries.get(name)
    }

    /// Whether a requirement named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Requirement names in evaluation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over requirements in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RequirementRef)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether both sets hold the same names mapped to the same instances.
    pub fn same_entries(&self, other: &RequirementSet) -> bool {
        self.len() == other.len()
            && self.iter().all(|(name, req)| {
                other
                    .get(name)
                    .is_some_and(|theirs| same_requirement(req, theirs))
            })
    }

    pub(crate) fn insert(&mut self, name: String, requirement: RequirementRef) {
        self.entries.insert(name, requirement);
    }
}

impl<'a> IntoIterator for &'a RequirementSet {
    type Item = (&'a String, &'a RequirementRef);
    type IntoIter = indexmap::map::Iter<'a, String, RequirementRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Descriptor;
    use std::sync::Arc;

    fn req() -> RequirementRef {
        Arc::new(Descriptor::attribute())
    }

    #[test]
    fn preserves_insertion_order() {
        let mut set = RequirementSet::new();
        set.insert("b".into(), req());
        set.insert("a".into(), req());
        set.insert("c".into(), req());
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn same_entries_compares_identity() {
        let shared = req();
        let mut a = RequirementSet::new();
        a.insert("x".into(), shared.clone());
        let mut b = RequirementSet::new();
        b.insert("x".into(), shared);
        let mut c = RequirementSet::new();
        c.insert("x".into(), req());

        assert!(a.same_entries(&b));
        assert!(!a.same_entries(&c));
        assert!(!a.same_entries(&RequirementSet::new()));
    }

    #[test]
    fn empty_set() {
        let set = RequirementSet::default();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert!(set.get("x").is_none());
        assert!(!set.contains("x"));
    }
}
