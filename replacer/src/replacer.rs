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

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::container::LRUKContainer;
use crate::error::Error;
use crate::node::LRUKNode;

/// The kind of access `RecordAccess` was called for. Accepted but not
/// yet acted on by this policy — kept as a three-way enum
/// rather than a unit type so call sites document their intent for
/// whichever future policy does start differentiating them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessType {
    Lookup,
    Scan,
    Index,
}

struct ReplacerState {
    young: LRUKContainer,
    old: LRUKContainer,
    curr_size: usize,
    capacity: usize,
    k: usize,
    next_timestamp: AtomicU64,
}

impl ReplacerState {
    fn new(capacity: usize, k: usize) -> Self {
        ReplacerState {
            young: LRUKContainer::new(),
            old: LRUKContainer::new(),
            curr_size: 0,
            capacity,
            k,
            next_timestamp: AtomicU64::new(0),
        }
    }

    fn check_bounds(&self, frame_id: usize) -> Result<(), Error> {
        if frame_id >= self.capacity {
            cwarn!(REPLACER, "frame {} is out of bounds for capacity {}", frame_id, self.capacity);
            return Err(Error::FrameOutOfBounds {
                frame_id,
                capacity: self.capacity,
            })
        }
        Ok(())
    }

    /// A monotonic per-call counter stands in for wall-clock time, so
    /// access ordering is deterministic under test.
    fn tick(&self) -> u64 {
        self.next_timestamp.fetch_add(1, Ordering::SeqCst)
    }

    fn record_access(&mut self, frame_id: usize, _access_type: AccessType) -> Result<(), Error> {
        self.check_bounds(frame_id)?;
        let ts = self.tick();

        if self.young.contains(frame_id) {
            self.touch_young(frame_id, ts);
        } else if self.old.contains(frame_id) {
            self.old.touch(frame_id, ts, self.k);
        } else {
            ctrace!(REPLACER, "first access for frame {}", frame_id);
            let node = LRUKNode::new(frame_id, ts);
            if node.history.len() >= self.k {
                self.old.add_node(node);
            } else {
                self.young.add_node(node);
            }
        }
        Ok(())
    }

    /// Touch a node already indexed in `young`, promoting it to `old`
    /// first if this access would bring its history length to `k`.
    fn touch_young(&mut self, frame_id: usize, ts: u64) {
        let about_to_fill = {
            let node = self.young.get(frame_id).expect("checked contains above");
            node.history.len() + 1 >= self.k
        };

        if about_to_fill {
            ctrace!(REPLACER, "frame {} promoted from young to old", frame_id);
            let node = self.young.remove_node(frame_id).expect("checked contains above");
            self.old.add_node(node);
            self.old.touch(frame_id, ts, self.k);
        } else {
            self.young.touch(frame_id, ts, self.k);
        }
    }

    fn evict(&mut self) -> Option<usize> {
        let fid = self.young.first_evictable().or_else(|| self.old.first_evictable())?;

        let removed =
            self.young.remove_node(fid).or_else(|| self.old.remove_node(fid)).expect("just located this frame");
        debug_assert!(removed.is_evictable);
        self.curr_size -= 1;
        ctrace!(REPLACER, "evicted frame {}", fid);
        Some(fid)
    }

    fn set_evictable(&mut self, frame_id: usize, evictable: bool) -> Result<(), Error> {
        self.check_bounds(frame_id)?;

        let node = match self.young.get_mut(frame_id) {
            Some(node) => node,
            None => match self.old.get_mut(frame_id) {
                Some(node) => node,
                // Frame was never accessed: a no-op, not an error.
                None => return Ok(()),
            },
        };

        if node.is_evictable == evictable {
            return Ok(())
        }
        node.is_evictable = evictable;
        if evictable {
            self.curr_size += 1;
        } else {
            self.curr_size -= 1;
        }
        Ok(())
    }

    fn remove(&mut self, frame_id: usize) -> Result<(), Error> {
        self.check_bounds(frame_id)?;

        let is_evictable = match self.young.get(frame_id).or_else(|| self.old.get(frame_id)) {
            Some(node) => node.is_evictable,
            None => return Ok(()),
        };

        if !is_evictable {
            return Err(Error::NotEvictable {
                frame_id,
            })
        }

        self.young.remove_node(frame_id).or_else(|| self.old.remove_node(frame_id)).expect("just located this frame");
        self.curr_size -= 1;
        Ok(())
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.young.len() + self.old.len()
    }
}

/// A mutex-protected LRU-K eviction policy for a fixed-capacity buffer
/// pool. Every public method acquires the latch for its
/// entire duration; operations never block on anything but the latch and
/// never suspend.
pub struct LRUKReplacer {
    inner: Mutex<ReplacerState>,
}

impl LRUKReplacer {
    /// Track at most `capacity` distinct frame ids, using a look-back
    /// depth of `k`.
    pub fn new(capacity: usize, k: usize) -> Self {
        LRUKReplacer {
            inner: Mutex::new(ReplacerState::new(capacity, k)),
        }
    }

    /// Record an access to `frame_id`. Creates tracking state for the
    /// frame on its first access.
    ///
    /// # Errors
    /// `Error::FrameOutOfBounds` if `frame_id >= capacity`.
    pub fn record_access(&self, frame_id: usize, access_type: AccessType) -> Result<(), Error> {
        self.inner.lock().record_access(frame_id, access_type)
    }

    /// Evict the coldest evictable frame, young frames before old ones,
    /// both scanned least-recently-touched first.
    pub fn evict(&self) -> Option<usize> {
        self.inner.lock().evict()
    }

    /// Pin or unpin `frame_id`. A no-op if the frame is unknown or
    /// already in the requested state.
    ///
    /// # Errors
    /// `Error::FrameOutOfBounds` if `frame_id >= capacity`.
    pub fn set_evictable(&self, frame_id: usize, evictable: bool) -> Result<(), Error> {
        self.inner.lock().set_evictable(frame_id, evictable)
    }

    /// Stop tracking `frame_id`. A no-op if the frame is unknown.
    ///
    /// # Errors
    /// `Error::FrameOutOfBounds` if `frame_id >= capacity`.
    /// `Error::NotEvictable` if the frame is still pinned.
    pub fn remove(&self, frame_id: usize) -> Result<(), Error> {
        self.inner.lock().remove(frame_id)
    }

    /// The number of frames currently evictable.
    pub fn size(&self) -> usize {
        self.inner.lock().curr_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(r: &LRUKReplacer, fid: usize) {
        r.record_access(fid, AccessType::Lookup).unwrap();
    }

    #[test]
    fn evictable_after_set_evictable_counts_toward_size() {
        let r = LRUKReplacer::new(7, 2);
        record(&r, 1);
        r.set_evictable(1, true).unwrap();
        assert_eq!(r.size(), 1);
    }

    #[test]
    fn evict_on_empty_or_fully_pinned_returns_none() {
        let r = LRUKReplacer::new(7, 2);
        assert_eq!(r.evict(), None);

        record(&r, 1);
        assert_eq!(r.evict(), None);
        assert_eq!(r.size(), 0);
    }

    #[test]
    fn young_frame_evicted_before_old_frame() {
        let r = LRUKReplacer::new(7, 2);
        record(&r, 1);
        record(&r, 1);
        r.set_evictable(1, true).unwrap(); // frame 1: 2 accesses -> old
        record(&r, 2);
        r.set_evictable(2, true).unwrap(); // frame 2: 1 access -> young

        assert_eq!(r.evict(), Some(2));
        assert_eq!(r.evict(), Some(1));
    }

    #[test]
    fn k_accesses_moves_frame_to_old() {
        let r = LRUKReplacer::new(7, 2);
        record(&r, 5);
        record(&r, 5);
        r.set_evictable(5, true).unwrap();
        record(&r, 6);
        r.set_evictable(6, true).unwrap();

        // 5 has reached k=2 accesses and is in old; 6 is still young and
        // is colder in the LRU-K sense, so it is evicted first.
        assert_eq!(r.evict(), Some(6));
        assert_eq!(r.evict(), Some(5));
    }

    #[test]
    fn remove_on_pinned_frame_errors_remove_on_absent_is_noop() {
        let r = LRUKReplacer::new(7, 2);
        record(&r, 1);
        assert_eq!(
            r.remove(1),
            Err(Error::NotEvictable {
                frame_id: 1
            })
        );

        r.remove(42).unwrap(); // never accessed, no-op
        r.set_evictable(1, true).unwrap();
        r.remove(1).unwrap();
        assert_eq!(r.size(), 0);
    }

    #[test]
    fn out_of_bounds_frame_is_an_error() {
        let r = LRUKReplacer::new(4, 2);
        assert_eq!(
            r.record_access(4, AccessType::Lookup),
            Err(Error::FrameOutOfBounds {
                frame_id: 4,
                capacity: 4,
            })
        );
    }

    #[test]
    fn set_evictable_false_then_true_tracks_size_and_skips_pinned_frame_on_evict() {
        let r = LRUKReplacer::new(7, 2);
        record(&r, 1);
        record(&r, 2);
        r.set_evictable(1, true).unwrap();
        r.set_evictable(2, true).unwrap();

        r.set_evictable(2, false).unwrap();
        assert_eq!(r.size(), 1);
        assert_eq!(r.evict(), Some(1));
        assert_eq!(r.evict(), None);
    }

    #[test]
    fn mixed_young_and_old_frames_evict_youngest_coldest_first() {
        let r = LRUKReplacer::new(7, 2);
        for fid in 1..=6 {
            record(&r, fid);
        }
        for fid in 1..=6 {
            r.set_evictable(fid, true).unwrap();
        }
        for fid in 1..=4 {
            record(&r, fid);
        }

        assert_eq!(r.evict(), Some(5));
        assert_eq!(r.evict(), Some(6));
        assert_eq!(r.evict(), Some(1));
        assert_eq!(r.evict(), Some(2));
    }

    #[test]
    fn tracked_frames_split_across_young_and_old() {
        let r = LRUKReplacer::new(7, 2);
        record(&r, 1);
        record(&r, 1);
        record(&r, 2);
        assert_eq!(r.inner.lock().tracked(), 2);
    }
}
