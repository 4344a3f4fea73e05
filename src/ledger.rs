//! Component usage ledgers.
//!
//! A ledger starts with the `usingComponents` of a manifest and is drained
//! as markup uses the declared tags. Whatever is left when the owning
//! scope ends (one markup file, or the whole build for the root manifest)
//! was declared but never used.
//!
//! A tag stays declared after it is taken. Markup checks placement with
//! [`ComponentLedger::declares`], so a root component used from a
//! subpackage is reported on every such use, even after a root page has
//! already taken it.

use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default)]
pub struct ComponentLedger {
    declared: BTreeMap<String, String>,
    unused: BTreeSet<String>,
}

impl ComponentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger over `(tag, component path)` declarations.
    pub fn from_declarations(decls: impl IntoIterator<Item = (String, String)>) -> Self {
        let declared: BTreeMap<_, _> = decls.into_iter().collect();
        let unused = declared.keys().cloned().collect();
        Self { declared, unused }
    }

    /// Whether `tag` was declared at all, used or not. Taking a tag does
    /// not change the answer.
    pub fn declares(&self, tag: &str) -> bool {
        self.declared.contains_key(tag)
    }

    /// Mark `tag` used. Returns its component path the first time only.
    pub fn take(&mut self, tag: &str) -> Option<&str> {
        if self.unused.remove(tag) {
            self.declared.get(tag).map(String::as_str)
        } else {
            None
        }
    }

    /// Declared-but-unused `(tag, path)` pairs, in tag order.
    pub fn unused(&self) -> impl Iterator<Item = (&str, &str)> {
        self.unused
            .iter()
            .filter_map(|tag| Some((tag.as_str(), self.declared.get(tag)?.as_str())))
    }

    pub fn is_drained(&self) -> bool {
        self.unused.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(pairs: &[(&str, &str)]) -> ComponentLedger {
        ComponentLedger::from_declarations(
            pairs.iter().map(|(t, p)| (t.to_string(), p.to_string())),
        )
    }

    #[test]
    fn test_take_once() {
        let mut l = ledger(&[("foo", "./foo"), ("bar", "./bar")]);
        assert_eq!(l.take("foo"), Some("./foo"));
        assert_eq!(l.take("foo"), None);
        assert!(l.declares("foo"));
        assert_eq!(l.unused().collect::<Vec<_>>(), vec![("bar", "./bar")]);
    }

    #[test]
    fn test_undeclared_tag() {
        let mut l = ledger(&[("foo", "./foo")]);
        assert!(!l.declares("view"));
        assert_eq!(l.take("view"), None);
        assert!(!l.is_drained());
        l.take("foo");
        assert!(l.is_drained());
    }

    #[test]
    fn test_empty_ledger() {
        let l = ComponentLedger::new();
        assert!(l.is_drained());
        assert_eq!(l.unused().count(), 0);
    }
}
