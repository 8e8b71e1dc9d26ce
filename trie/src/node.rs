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

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// An opaque, type-erased value cell. `Get<T>` compares the stored
/// `TypeId` against the caller's `T` via `downcast_ref`, giving us the
/// runtime type discrimination the source implements with a dynamic cast.
pub type ValueSlot = Arc<dyn Any + Send + Sync>;

/// A single node on the path from the trie root to a key.
///
/// `value` is `None` for a plain node and `Some` for a valued node. A
/// node is never mutated in place once another `Trie`
/// may observe it: `Put`/`Remove` always allocate a fresh `TrieNode` for
/// every node on the affected path and share everything else by `Arc`.
#[derive(Default)]
pub struct TrieNode {
    pub(crate) children: HashMap<u8, Arc<TrieNode>>,
    pub(crate) value: Option<ValueSlot>,
}

impl TrieNode {
    pub(crate) fn is_value_node(&self) -> bool {
        self.value.is_some()
    }

    fn children_of(node: Option<&Arc<TrieNode>>) -> HashMap<u8, Arc<TrieNode>> {
        match node {
            Some(node) => node.children.clone(),
            None => HashMap::new(),
        }
    }

    /// Path-copy insert of `value` at `key`, rooted at `node`.
    ///
    /// Every node from `node` down to the key's terminal byte is
    /// reallocated; every other child is carried over as an `Arc` clone,
    /// i.e. shared by reference, not copied.
    pub(crate) fn put(node: Option<&Arc<TrieNode>>, key: &[u8], value: ValueSlot) -> Arc<TrieNode> {
        if key.is_empty() {
            return Arc::new(TrieNode {
                children: Self::children_of(node),
                value: Some(value),
            })
        }

        let head = key[0];
        let tail = &key[1..];
        let mut children = Self::children_of(node);
        let new_child = Self::put(children.get(&head), tail, value);
        children.insert(head, new_child);

        Arc::new(TrieNode {
            children,
            value: node.and_then(|n| n.value.clone()),
        })
    }

    /// Path-copy delete of `key`, rooted at `node`.
    ///
    /// Returns `None` when the node at this position would be left plain
    /// and childless, which propagates the prune upward through the
    /// caller's own `children.remove` — the "no plain-childless node"
    /// invariant falls directly out of this return type.
    pub(crate) fn remove(node: Option<&Arc<TrieNode>>, key: &[u8]) -> Option<Arc<TrieNode>> {
        let node = node?;

        if key.is_empty() {
            return if node.children.is_empty() {
                None
            } else {
                Some(Arc::new(TrieNode {
                    children: node.children.clone(),
                    value: None,
                }))
            }
        }

        let head = key[0];
        let tail = &key[1..];

        let child = match node.children.get(&head) {
            Some(child) => child,
            // Key not present under this node: nothing to prune, share as-is.
            None => return Some(node.clone()),
        };

        let mut children = node.children.clone();
        match Self::remove(Some(child), tail) {
            Some(new_child) => {
                children.insert(head, new_child);
            }
            None => {
                children.remove(&head);
            }
        }

        if children.is_empty() && node.value.is_none() {
            None
        } else {
            Some(Arc::new(TrieNode {
                children,
                value: node.value.clone(),
            }))
        }
    }
}
