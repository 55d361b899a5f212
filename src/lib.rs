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

//! RISC-V debug trigger module (Sdtrig) emulation.
//!
//! The crate models the `tselect`/`tdata1`/`tdata2`/`tdata3`/`tinfo` trigger
//! registers of a single hart, turns address match triggers into breakpoint
//! and watchpoint registrations against an execution engine, and counts
//! retired instructions for instruction count triggers.
//!
//! The execution engine itself is abstracted behind [`host::TriggerHost`]. A
//! deterministic reference engine lives in [`replay`].

pub mod cli;
pub mod config;
pub mod csr;
pub mod debug_monitor;
pub mod diagnostics;
pub mod host;
pub mod memory;
pub mod replay;
pub mod trigger;

pub use debug_monitor::DebugMonitor;

/// Number of trigger slots each hart implements.
pub const RV_MAX_TRIGGERS: usize = 2;

/// Extract `len` bits starting at bit `off`.
#[macro_export]
macro_rules! get_bits {
    ($n:expr, off = $offset:expr, len = $len:expr$(,)?) => {{
        ($n >> $offset) & ((1 << $len) - 1)
    }};
}

/// Replace `len` bits starting at bit `off` with `val`.
#[macro_export]
macro_rules! set_bits {
    ($n:expr, off = $offset:expr, len = $len:expr, val = $val:expr$(,)?) => {{
        let mask = ((1 << $len) - 1) << $offset;
        ($n & !mask) | (($val << $offset) & mask)
    }};
}
