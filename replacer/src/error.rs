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

use std::fmt;

/// Errors a caller can get back from `LRUKReplacer`. Both variants mean the
/// caller broke the contract: an unknown frame id, or removing
/// a frame that is still pinned.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Error {
    /// `frame_id` was not in `[0, capacity)`.
    FrameOutOfBounds {
        frame_id: usize,
        capacity: usize,
    },
    /// `Remove` was called on a frame that is still pinned (not evictable).
    NotEvictable {
        frame_id: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrameOutOfBounds {
                frame_id,
                capacity,
            } => write!(f, "frame id {} is out of bounds for a replacer of capacity {}", frame_id, capacity),
            Error::NotEvictable {
                frame_id,
            } => write!(f, "frame id {} is pinned and cannot be removed", frame_id),
        }
    }
}

impl std::error::Error for Error {}
