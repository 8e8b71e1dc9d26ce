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

use std::collections::HashMap;

use crate::node::LRUKNode;

/// An intrusive doubly linked list of `LRUKNode`s, indexed by frame id.
///
/// Head is the least recently inserted/touched frame, tail the most
/// recent; `Evict` scans from head toward tail. A
/// `LRUKReplacer` owns two of these, "young" and "old"; this type knows
/// nothing about promotion between them. The owning replacer
/// detects the young -> old transition itself, rather than a back-pointer on the
/// container, to avoid aliasing two containers that both think
/// they own a node.
#[derive(Default)]
pub(crate) struct LRUKContainer {
    nodes: HashMap<usize, LRUKNode>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl LRUKContainer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn contains(&self, fid: usize) -> bool {
        self.nodes.contains_key(&fid)
    }

    pub(crate) fn get(&self, fid: usize) -> Option<&LRUKNode> {
        self.nodes.get(&fid)
    }

    pub(crate) fn get_mut(&mut self, fid: usize) -> Option<&mut LRUKNode> {
        self.nodes.get_mut(&fid)
    }

    /// Index `node` by its fid and link it at the tail.
    pub(crate) fn add_node(&mut self, mut node: LRUKNode) {
        let fid = node.fid;
        node.prev = self.tail;
        node.next = None;
        if let Some(tail) = self.tail {
            self.nodes.get_mut(&tail).expect("tail is indexed").next = Some(fid);
        } else {
            self.head = Some(fid);
        }
        self.tail = Some(fid);
        self.nodes.insert(fid, node);
    }

    /// Unlink `fid` from the list and the index, handing the node back
    /// to the caller (e.g. to re-insert it into the other container).
    pub(crate) fn remove_node(&mut self, fid: usize) -> Option<LRUKNode> {
        let node = self.nodes.remove(&fid)?;
        match node.prev {
            Some(prev) => self.nodes.get_mut(&prev).expect("prev is indexed").next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.nodes.get_mut(&next).expect("next is indexed").prev = node.prev,
            None => self.tail = node.prev,
        }
        Some(node)
    }

    /// Record a touch on an already-indexed node and move it to the tail,
    /// unless it is already there.
    pub(crate) fn touch(&mut self, fid: usize, ts: u64, k: usize) {
        {
            let node = self.nodes.get_mut(&fid).expect("touch called on indexed frame");
            node.push_access(ts, k);
        }
        if self.tail != Some(fid) {
            let node = self.remove_node(fid).expect("just checked it was indexed");
            self.add_node(node);
        }
    }

    /// The first evictable frame scanning from head to tail, if any.
    pub(crate) fn first_evictable(&self) -> Option<usize> {
        let mut cursor = self.head;
        while let Some(fid) = cursor {
            let node = self.nodes.get(&fid).expect("linked node is indexed");
            if node.is_evictable {
                return Some(fid)
            }
            cursor = node.next;
        }
        None
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}
