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

//! The LRU-K eviction policy for a fixed-capacity buffer pool: frames
//! are partitioned into a "young" tier (fewer than `k` recorded
//! accesses) and an "old" tier (`k` or more), and eviction always
//! prefers the coldest young frame over any old one.

#[macro_use]
extern crate ferrodb_logger as flogger;
#[macro_use]
extern crate log;

mod container;
mod error;
mod node;
mod replacer;

pub use crate::error::Error;
pub use crate::replacer::{AccessType, LRUKReplacer};
