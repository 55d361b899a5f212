// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the sdtrig project.

//! Decoded trigger configuration.
//!
//! A stored `tdata1` value is decoded once, when it is written, into a
//! [`TriggerConfig`]. The breakpoint engine, the instruction count engine and
//! the action dispatcher all match on it instead of re-reading raw bits.

use super::{
    extract_trigger_type, AccessMask, Icount, Mcontrol, Mcontrol6, ModeMask, SizeCode,
    TriggerAction, TriggerType,
};
use crate::{csr::TdataIndex, csr::Xlen, host::PrivilegeLevel};

/// Which address match layout a trigger uses.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AddressMatchKind {
    Mcontrol,
    Mcontrol6,
}

/// An address/data match trigger (types 2 and 6).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AddressMatch {
    pub kind: AddressMatchKind,
    pub modes: ModeMask,
    pub access: AccessMask,
    pub size: SizeCode,
    pub action: TriggerAction,
}

impl AddressMatch {
    /// A trigger is enabled when it is armed in at least one mode and for at
    /// least one kind of access.
    pub fn enabled(&self) -> bool {
        !self.modes.is_empty() && !self.access.is_empty()
    }

    /// Watchpoint length in bytes, falling back to the natural word size when
    /// the trigger matches any access size.
    pub fn watch_len(&self, xlen: Xlen) -> u64 {
        match self.size.bytes() {
            Some(0) | None => xlen.word_bytes(),
            Some(bytes) => bytes,
        }
    }
}

/// An instruction count trigger (type 3).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct InstructionCount {
    pub modes: ModeMask,
    /// Instructions remaining until the trigger fires.
    pub count: u16,
    pub action: TriggerAction,
}

/// The decoded form of a stored `tdata1` value.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TriggerConfig {
    AddressMatch(AddressMatch),
    InstructionCount(InstructionCount),
    /// A type whose behaviour is not implemented. The registers still hold
    /// whatever was written to them.
    Unsupported(TriggerType),
}

impl TriggerConfig {
    /// Decode a stored `tdata1` value.
    pub fn decode(xlen: Xlen, tdata1: u64) -> Self {
        let data = tdata1 as u32;
        match extract_trigger_type(xlen, tdata1) {
            TriggerType::Mcontrol => {
                let ctrl = Mcontrol::from(data);
                Self::AddressMatch(AddressMatch {
                    kind: AddressMatchKind::Mcontrol,
                    modes: ctrl.modes(),
                    access: ctrl.access(),
                    size: ctrl.size(xlen),
                    action: TriggerAction::from_code(ctrl.action().value()),
                })
            }
            TriggerType::Mcontrol6 => {
                let ctrl = Mcontrol6::from(data);
                Self::AddressMatch(AddressMatch {
                    kind: AddressMatchKind::Mcontrol6,
                    modes: ctrl.modes(),
                    access: ctrl.access(),
                    size: ctrl.size_code(),
                    action: TriggerAction::from_code(ctrl.action().value()),
                })
            }
            TriggerType::Icount => {
                let ctrl = Icount::from(data);
                Self::InstructionCount(InstructionCount {
                    modes: ctrl.modes(),
                    count: ctrl.count_value(),
                    action: TriggerAction::from_code(ctrl.action().value()),
                })
            }
            other => Self::Unsupported(other),
        }
    }

    pub fn trigger_type(&self) -> TriggerType {
        match self {
            Self::AddressMatch(AddressMatch {
                kind: AddressMatchKind::Mcontrol,
                ..
            }) => TriggerType::Mcontrol,
            Self::AddressMatch(AddressMatch {
                kind: AddressMatchKind::Mcontrol6,
                ..
            }) => TriggerType::Mcontrol6,
            Self::InstructionCount(_) => TriggerType::Icount,
            Self::Unsupported(ty) => *ty,
        }
    }

    pub fn modes(&self) -> ModeMask {
        match self {
            Self::AddressMatch(m) => m.modes,
            Self::InstructionCount(ic) => ic.modes,
            Self::Unsupported(_) => ModeMask::empty(),
        }
    }

    pub fn action(&self) -> TriggerAction {
        match self {
            Self::AddressMatch(m) => m.action,
            Self::InstructionCount(ic) => ic.action,
            Self::Unsupported(_) => TriggerAction::None,
        }
    }

    /// Whether the trigger may fire at privilege `level` with virtualization `virt`.
    ///
    /// `mcontrol` has no virtualized mode bits, so it never fires in VU/VS.
    pub fn matches_privilege(&self, level: PrivilegeLevel, virt: bool) -> bool {
        self.modes().intersects(ModeMask::eligible(level, virt))
    }
}

/// Which `tdataN` registers are meaningful for a trigger type.
///
/// This is informational: register accesses never consult it.
pub fn tdata_available(ty: TriggerType, index: TdataIndex) -> bool {
    let [tdata1, tdata2, tdata3] = match ty {
        TriggerType::NoExist | TriggerType::Legacy | TriggerType::Reserved => [false; 3],
        TriggerType::Mcontrol
        | TriggerType::Mcontrol6
        | TriggerType::Itrigger
        | TriggerType::Etrigger
        | TriggerType::Unavailable => [true; 3],
        TriggerType::Icount => [true, false, true],
        TriggerType::Tmexttrigger => [true, false, false],
    };
    match index {
        TdataIndex::Tdata1 => tdata1,
        TdataIndex::Tdata2 => tdata2,
        TdataIndex::Tdata3 => tdata3,
    }
}
