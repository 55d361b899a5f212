// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the sdtrig project.

//! Bit layouts of the type specific low 32 bits of `tdata1`.

use bilge::prelude::*;

use super::{AccessMask, ModeMask, SizeCode};
use crate::csr::Xlen;

#[bitsize(32)]
#[derive(Default, Copy, Clone, PartialEq, Eq, FromBits, DebugBits)]
/// Address/data match control (`mcontrol`, type 2).
pub struct Mcontrol {
    pub load: bool,
    pub store: bool,
    pub execute: bool,
    pub u: bool,
    pub s: bool,
    pub _res0: u1,
    pub m: bool,
    pub match_type: u4,
    pub chain: bool,
    pub action: u4,
    pub sizelo: u2,
    pub timing: bool,
    pub select: bool,
    pub hit: bool,
    /// Only present on RV64.
    pub sizehi: u2,
    pub _res1: u9,
}

impl Mcontrol {
    pub fn modes(&self) -> ModeMask {
        let mut modes = ModeMask::empty();
        modes.set(ModeMask::U, self.u());
        modes.set(ModeMask::S, self.s());
        modes.set(ModeMask::M, self.m());
        modes
    }

    pub fn access(&self) -> AccessMask {
        let mut access = AccessMask::empty();
        access.set(AccessMask::LOAD, self.load());
        access.set(AccessMask::STORE, self.store());
        access.set(AccessMask::EXECUTE, self.execute());
        access
    }

    /// Combined `sizehi:sizelo` access size.
    pub fn size(&self, xlen: Xlen) -> SizeCode {
        let sizehi = match xlen {
            Xlen::Rv32 => 0,
            Xlen::Rv64 | Xlen::Rv128 => self.sizehi().value(),
        };
        SizeCode((sizehi << 2) | self.sizelo().value())
    }
}

#[bitsize(32)]
#[derive(Default, Copy, Clone, PartialEq, Eq, FromBits, DebugBits)]
/// Extended address/data match control (`mcontrol6`, type 6).
pub struct Mcontrol6 {
    pub load: bool,
    pub store: bool,
    pub execute: bool,
    pub u: bool,
    pub s: bool,
    pub uncertainen: bool,
    pub m: bool,
    pub match_type: u4,
    pub chain: bool,
    pub action: u4,
    pub size: u4,
    pub timing: bool,
    pub select: bool,
    pub hit0: bool,
    pub vu: bool,
    pub vs: bool,
    pub hit1: bool,
    pub uncertain: bool,
    pub _res0: u5,
}

impl Mcontrol6 {
    pub fn modes(&self) -> ModeMask {
        let mut modes = ModeMask::empty();
        modes.set(ModeMask::U, self.u());
        modes.set(ModeMask::S, self.s());
        modes.set(ModeMask::M, self.m());
        modes.set(ModeMask::VU, self.vu());
        modes.set(ModeMask::VS, self.vs());
        modes
    }

    pub fn access(&self) -> AccessMask {
        let mut access = AccessMask::empty();
        access.set(AccessMask::LOAD, self.load());
        access.set(AccessMask::STORE, self.store());
        access.set(AccessMask::EXECUTE, self.execute());
        access
    }

    pub fn size_code(&self) -> SizeCode {
        SizeCode(self.size().value())
    }
}

#[bitsize(32)]
#[derive(Default, Copy, Clone, PartialEq, Eq, FromBits, DebugBits)]
/// Instruction count control (`icount`, type 3).
pub struct Icount {
    pub action: u6,
    pub u: bool,
    pub s: bool,
    pub pending: bool,
    pub m: bool,
    pub count: u14,
    pub hit: bool,
    pub vu: bool,
    pub vs: bool,
    pub _res0: u5,
}

impl Icount {
    /// Largest count the 14-bit field holds.
    pub const MAX_COUNT: u16 = (1 << 14) - 1;

    pub fn modes(&self) -> ModeMask {
        let mut modes = ModeMask::empty();
        modes.set(ModeMask::U, self.u());
        modes.set(ModeMask::S, self.s());
        modes.set(ModeMask::M, self.m());
        modes.set(ModeMask::VU, self.vu());
        modes.set(ModeMask::VS, self.vs());
        modes
    }

    pub fn count_value(&self) -> u16 {
        self.count().value()
    }

    pub fn set_count_value(&mut self, count: u16) {
        self.set_count(u14::new(count.min(Self::MAX_COUNT)));
    }
}
