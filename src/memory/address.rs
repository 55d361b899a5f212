//
// sdtrig
//
// Copyright 2025- Manos Pitsidianakis
//
// This file is part of sdtrig.
//
// sdtrig is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// sdtrig is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with sdtrig. If not, see <http://www.gnu.org/licenses/>.
//
// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later

use serde_derive::{Deserialize, Serialize};

/// A guest virtual address.
#[derive(Copy, Clone, Default, Hash, Ord, Eq, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Address(pub u64);

impl Address {
    /// Returns `true` if `[self, self + len)` and `[other, other + other_len)` share a byte.
    pub const fn overlaps(self, len: u64, other: Self, other_len: u64) -> bool {
        let len = if len == 0 { 1 } else { len };
        let other_len = if other_len == 0 { 1 } else { other_len };
        self.0 < other.0.saturating_add(other_len) && other.0 < self.0.saturating_add(len)
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "0x{:x}", self.0)
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "0x{:x}", self.0)
    }
}
