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

use std::collections::VecDeque;

/// Per-frame metadata tracked by the replacer.
///
/// `prev`/`next` are frame ids rather than raw pointers or indices into a
/// `Vec` — an arena-by-id, linking nodes by `Option<usize>` instead of
/// unsafe pointers. The owning `LRUKContainer`
/// keeps these consistent with its `head`/`tail`.
pub(crate) struct LRUKNode {
    pub(crate) fid: usize,
    /// Up to `k` most recent access timestamps, newest first.
    pub(crate) history: VecDeque<u64>,
    pub(crate) is_evictable: bool,
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>,
}

impl LRUKNode {
    pub(crate) fn new(fid: usize, ts: u64) -> Self {
        let mut history = VecDeque::with_capacity(1);
        history.push_front(ts);
        LRUKNode {
            fid,
            history,
            is_evictable: false,
            prev: None,
            next: None,
        }
    }

    /// Record a touch at `ts`, keeping at most `k` entries.
    pub(crate) fn push_access(&mut self, ts: u64, k: usize) {
        if self.history.len() == k {
            self.history.pop_back();
        }
        self.history.push_front(ts);
    }
}
