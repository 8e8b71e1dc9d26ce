// Copyright 2018 Kodebox, Inc.
// This file is part of CodeChain.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! A copy-on-write, structurally-shared prefix tree keyed by byte strings.
//!
//! Every mutating operation on a `Trie` returns a new `Trie` handle; the
//! receiver is left untouched and remains valid. Subtrees untouched by the
//! mutation are shared by `Arc`, not copied.

#[macro_use]
extern crate ferrodb_logger as flogger;
#[macro_use]
extern crate log;

mod node;

use std::sync::Arc;

use node::{TrieNode, ValueSlot};

/// A handle onto one (possibly empty) version of a copy-on-write trie.
///
/// `Trie` is immutable: `Get` never mutates it, and `Put`/`Remove` return a
/// new handle rather than changing this one. Because no mutation ever
/// touches a node another handle might see, a `Trie` is `Send + Sync` and
/// may be shared across threads without any lock.
#[derive(Clone, Default)]
pub struct Trie {
    root: Option<Arc<TrieNode>>,
}

impl Trie {
    /// The empty trie.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Look up `key`, interpreting the stored value as `T`.
    ///
    /// Returns `None` if `key` is absent, or if it is present but was
    /// last `Put` with a different type than `T`. The
    /// returned borrow is valid for as long as this `Trie` handle is.
    pub fn get<T: 'static>(&self, key: &[u8]) -> Option<&T> {
        let mut node = self.root.as_ref()?;
        for byte in key {
            node = node.children.get(byte)?;
        }
        if !node.is_value_node() {
            return None
        }
        match node.value.as_ref().expect("is_value_node implies value is Some").downcast_ref::<T>() {
            Some(value) => Some(value),
            None => {
                ctrace!(TRIE, "get: value at key found but type did not match requested T");
                None
            }
        }
    }

    /// Return a new trie in which `key` maps to `value`, sharing every
    /// subtree not on `key`'s root-to-leaf path with `self`.
    pub fn put<T: Send + Sync + 'static>(&self, key: &[u8], value: T) -> Trie {
        let slot: ValueSlot = Arc::new(value);
        Trie {
            root: Some(TrieNode::put(self.root.as_ref(), key, slot)),
        }
    }

    /// Return a new trie with `key` unmapped. If `key` was
    /// already absent, the result is observationally equal to `self`.
    pub fn remove(&self, key: &[u8]) -> Trie {
        Trie {
            root: TrieNode::remove(self.root.as_ref(), key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// An allocation-counting wrapper used to verify structural sharing:
    /// every `Put` should allocate exactly one
    /// new value of this type, no matter how large the trie already is.
    struct Counted(u32);

    static ALLOCATIONS: AtomicUsize = AtomicUsize::new(0);

    impl Counted {
        fn new(v: u32) -> Self {
            ALLOCATIONS.fetch_add(1, Ordering::SeqCst);
            Counted(v)
        }
    }

    #[test]
    fn get_after_put_on_empty_key() {
        let t = Trie::new().put(b"", "empty".to_string());
        assert_eq!(t.get::<String>(b""), Some(&"empty".to_string()));
    }

    #[test]
    fn get_after_put_nested_keys() {
        let t = Trie::new().put(b"ab", 1u32).put(b"abc", 2u32);
        assert_eq!(t.get::<u32>(b"ab"), Some(&1));
        assert_eq!(t.get::<u32>(b"abc"), Some(&2));

        let t2 = t.remove(b"ab");
        assert_eq!(t2.get::<u32>(b"ab"), None);
        assert_eq!(t2.get::<u32>(b"abc"), Some(&2));
    }

    #[test]
    fn put_same_key_replaces_value() {
        let t = Trie::new().put(b"abc", 5u32);
        let t = t.put(b"abc", 7u32);
        assert_eq!(t.get::<u32>(b"abc"), Some(&7));
    }

    #[test]
    fn remove_undoes_put_for_previously_absent_key() {
        let t = Trie::new();
        let t2 = t.put(b"a", 1u32).remove(b"a");
        assert_eq!(t2.get::<u32>(b"a"), None);
        assert!(t2.is_empty());
    }

    #[test]
    fn remove_one_of_two_siblings_keeps_the_other() {
        let t = Trie::new().put(b"a", 1u32).put(b"b", 2u32);
        let t2 = t.remove(b"a");
        assert_eq!(t2.get::<u32>(b"a"), None);
        assert_eq!(t2.get::<u32>(b"b"), Some(&2));
    }

    #[test]
    fn type_mismatch_on_get_is_absent_not_error() {
        let t = Trie::new().put(b"k", 1u32);
        assert_eq!(t.get::<String>(b"k"), None);
    }

    #[test]
    fn persistence_old_handle_is_unaffected_by_put() {
        let t = Trie::new().put(b"a", 1u32);
        let t2 = t.put(b"a", 2u32);
        assert_eq!(t.get::<u32>(b"a"), Some(&1));
        assert_eq!(t2.get::<u32>(b"a"), Some(&2));
    }

    #[test]
    fn move_only_owned_value_is_supported() {
        struct Holder(Box<u64>);

        let t = Trie::new().put(b"k", Holder(Box::new(42)));
        assert_eq!(*t.get::<Holder>(b"k").unwrap().0, 42);
    }

    #[test]
    fn sharing_unrelated_subtree_is_reference_identical_after_put() {
        let t = Trie::new().put(b"ax", Counted::new(1)).put(b"by", Counted::new(2));
        let before = ALLOCATIONS.load(Ordering::SeqCst);

        let t2 = t.put(b"az", Counted::new(3));
        assert_eq!(ALLOCATIONS.load(Ordering::SeqCst), before + 1, "put should allocate exactly one new value");

        // "by" shares its whole subtree with `t`: same node, same value.
        let a = t.get::<Counted>(b"by").unwrap() as *const Counted;
        let b = t2.get::<Counted>(b"by").unwrap() as *const Counted;
        assert_eq!(a, b);
    }

    #[test]
    fn no_plain_childless_node_after_sequence() {
        let t = Trie::new().put(b"a", 1u32).put(b"ab", 2u32);
        let t2 = t.remove(b"ab");
        // "a" still holds a value, so it must remain reachable.
        assert_eq!(t2.get::<u32>(b"a"), Some(&1));
        assert_eq!(t2.get::<u32>(b"ab"), None);

        let t3 = t2.remove(b"a");
        assert!(t3.is_empty());
    }
}
