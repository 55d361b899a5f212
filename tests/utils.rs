//
// sdtrig
//
// Copyright 2025 Emmanouil Pitsidianakis <manos@pitsidianak.is>
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

use sdtrig::{
    config::DebugConfig,
    csr::Xlen,
    diagnostics::RecordingSink,
    replay::Machine,
    trigger::{build_tdata1, TriggerType},
};

#[macro_export]
macro_rules! assert_hex_eq {
    ($left: expr, $right: expr$(,)?) => {{
        let left: u64 = $left;
        let right: u64 = $right;
        assert_eq!(
            left,
            right,
            "Comparing {left_s} with {right_s} failed:\n0x{left:016x} {left_s}\n0x{right:016x} \
             {right_s}\n0b{left:064b} {left_s}\n0b{right:064b} {right_s}",
            left_s = stringify!($left),
            right_s = stringify!($right),
            left = left,
            right = right,
        );
    }};
}

// mcontrol/mcontrol6 bits
#[allow(dead_code)]
pub const LOAD: u64 = 1 << 0;
#[allow(dead_code)]
pub const STORE: u64 = 1 << 1;
#[allow(dead_code)]
pub const EXECUTE: u64 = 1 << 2;
#[allow(dead_code)]
pub const MC_U: u64 = 1 << 3;
#[allow(dead_code)]
pub const MC_S: u64 = 1 << 4;
#[allow(dead_code)]
pub const MC_M: u64 = 1 << 6;
#[allow(dead_code)]
pub const MC6_VU: u64 = 1 << 23;
#[allow(dead_code)]
pub const MC6_VS: u64 = 1 << 24;

// icount bits
#[allow(dead_code)]
pub const IC_U: u64 = 1 << 6;
#[allow(dead_code)]
pub const IC_S: u64 = 1 << 7;
#[allow(dead_code)]
pub const IC_M: u64 = 1 << 9;
#[allow(dead_code)]
pub const IC_VU: u64 = 1 << 25;

#[allow(dead_code)]
pub fn mcontrol(xlen: Xlen, data: u64) -> u64 {
    build_tdata1(xlen, TriggerType::Mcontrol, false, data)
}

#[allow(dead_code)]
pub fn mcontrol6(xlen: Xlen, data: u64) -> u64 {
    build_tdata1(xlen, TriggerType::Mcontrol6, false, data)
}

#[allow(dead_code)]
pub fn icount(xlen: Xlen, modes: u64, count: u64) -> u64 {
    build_tdata1(xlen, TriggerType::Icount, false, modes | (count << 10))
}

/// A reset machine whose diagnostics are recorded.
#[allow(dead_code)]
pub fn make_test_machine(xlen: Xlen, icount: bool) -> (Machine, RecordingSink) {
    let sink = RecordingSink::new();
    let config = DebugConfig {
        xlen,
        ..DebugConfig::default()
    };
    let machine = Machine::with_sink(config, icount, Box::new(sink.clone()));
    (machine, sink)
}
