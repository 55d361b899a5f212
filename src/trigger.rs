// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the sdtrig project.

//! Trigger register model.
//!
//! `tdata1` carries a 4-bit type tag in its top bits (the position depends on
//! [`Xlen`]), a `dmode` bit immediately below it and type specific fields in
//! its low bits. The bit layouts of the type specific fields live in
//! [`fields`], their decoded form in [`config`], and write normalization in
//! [`validate`].

use bilge::prelude::*;

use crate::{csr::Xlen, get_bits, host::PrivilegeLevel};

pub mod config;
pub mod fields;
pub mod validate;

pub use config::*;
pub use fields::*;
pub use validate::*;

#[bitsize(4)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromBits)]
/// Trigger type tag, `tdata1[XLEN-1:XLEN-4]`.
pub enum TriggerType {
    /// There is no trigger at this `tselect`.
    NoExist = 0,
    /// Legacy SiFive address match trigger.
    Legacy = 1,
    /// Address/data match trigger (`mcontrol`).
    Mcontrol = 2,
    /// Instruction count trigger (`icount`).
    Icount = 3,
    /// Interrupt trigger (`itrigger`).
    Itrigger = 4,
    /// Exception trigger (`etrigger`).
    Etrigger = 5,
    /// Extended address/data match trigger (`mcontrol6`).
    Mcontrol6 = 6,
    /// External source trigger (`tmexttrigger`).
    Tmexttrigger = 7,
    /// Trigger exists but is currently unavailable.
    Unavailable = 15,
    #[fallback]
    /// Reserved and custom encodings.
    Reserved = 8,
}

impl TriggerType {
    /// Decode a raw type tag. Only the low 4 bits of `tag` are considered.
    pub fn from_tag(tag: u8) -> Self {
        Self::from(u4::new(tag & 0xf))
    }

    /// Encoded type tag.
    pub fn tag(self) -> u8 {
        u4::from(self).value()
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoExist => "no-exist",
            Self::Legacy => "legacy",
            Self::Mcontrol => "mcontrol",
            Self::Icount => "icount",
            Self::Itrigger => "itrigger",
            Self::Etrigger => "etrigger",
            Self::Mcontrol6 => "mcontrol6",
            Self::Tmexttrigger => "tmexttrigger",
            Self::Unavailable => "unavailable",
            Self::Reserved => "reserved",
        }
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.as_str())
    }
}

/// Trigger types whose behaviour is implemented.
pub const SUPPORTED_TYPES: [TriggerType; 2] = [TriggerType::Mcontrol, TriggerType::Mcontrol6];

/// `tinfo` value: one bit per supported trigger type tag.
pub fn tinfo() -> u64 {
    SUPPORTED_TYPES
        .iter()
        .fold(0, |acc, ty| acc | (1 << ty.tag()))
}

/// Extract the type tag of a `tdata1` value.
pub fn extract_trigger_type(xlen: Xlen, tdata1: u64) -> TriggerType {
    TriggerType::from_tag(get_bits!(tdata1, off = xlen.type_offset(), len = 4) as u8)
}

/// Extract the `dmode` bit of a `tdata1` value.
pub fn extract_dmode(xlen: Xlen, tdata1: u64) -> bool {
    get_bits!(tdata1, off = xlen.dmode_offset(), len = 1) == 1
}

/// Assemble a `tdata1` value from its type tag, `dmode` bit and low data bits.
pub fn build_tdata1(xlen: Xlen, ty: TriggerType, dmode: bool, data: u64) -> u64 {
    let data_mask = (1u64 << xlen.dmode_offset()) - 1;
    (u64::from(ty.tag()) << xlen.type_offset())
        | (u64::from(dmode) << xlen.dmode_offset())
        | (data & data_mask)
}

bitflags::bitflags! {
    /// Privilege modes a trigger is armed in.
    ///
    /// The non-virtualized bits sit at the privilege level encoding, so
    /// `1 << level` selects the bit of a level.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct ModeMask: u8 {
        const U = 1 << 0;
        const S = 1 << 1;
        const M = 1 << 3;
        const VU = 1 << 4;
        const VS = 1 << 5;
    }
}

impl ModeMask {
    /// The mode bit that must be set for a trigger to be eligible at `level`.
    ///
    /// Machine mode cannot run virtualized, so it has no bit when `virt` is set.
    pub const fn eligible(level: PrivilegeLevel, virt: bool) -> Self {
        match (level, virt) {
            (PrivilegeLevel::User, false) => Self::U,
            (PrivilegeLevel::Supervisor, false) => Self::S,
            (PrivilegeLevel::Machine, false) => Self::M,
            (PrivilegeLevel::User, true) => Self::VU,
            (PrivilegeLevel::Supervisor, true) => Self::VS,
            (PrivilegeLevel::Machine, true) => Self::empty(),
        }
    }
}

bitflags::bitflags! {
    /// Accesses an address match trigger fires on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct AccessMask: u8 {
        const LOAD = 1 << 0;
        const STORE = 1 << 1;
        const EXECUTE = 1 << 2;
    }
}

/// Access size encoding of address match triggers.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SizeCode(pub u8);

impl SizeCode {
    /// Match accesses of any size.
    pub const ANY: Self = Self(0);

    /// Bytes matched per size code, `None` for encodings that are not implemented.
    const ACCESS_SIZE: [Option<u64>; 16] = [
        Some(0),
        Some(1),
        Some(2),
        Some(4),
        // 48-bit accesses
        None,
        Some(8),
        None,
        None,
        None,
        None,
        None,
        None,
        None,
        None,
        None,
        None,
    ];

    /// Returns the number of bytes this code matches, `Some(0)` meaning any size.
    pub const fn bytes(self) -> Option<u64> {
        if self.0 as usize >= Self::ACCESS_SIZE.len() {
            return None;
        }
        Self::ACCESS_SIZE[self.0 as usize]
    }

    pub const fn is_supported(self) -> bool {
        self.bytes().is_some()
    }
}

/// Action taken when a trigger fires.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TriggerAction {
    /// The trigger type carries no action.
    None,
    /// Raise a breakpoint exception.
    Breakpoint,
    /// Enter debug mode.
    DebugMode,
    /// Start, stop or notify a trace unit (`trace0` to `trace3`).
    Trace(u8),
    /// Signal an external debug line (`external0`, `external1`).
    ExternalDebug(u8),
    /// Reserved encoding.
    Reserved(u8),
}

impl TriggerAction {
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Breakpoint,
            1 => Self::DebugMode,
            2..=5 => Self::Trace(code - 2),
            8 | 9 => Self::ExternalDebug(code - 8),
            other => Self::Reserved(other),
        }
    }
}

impl std::fmt::Display for TriggerAction {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::None => write!(fmt, "none"),
            Self::Breakpoint => write!(fmt, "breakpoint"),
            Self::DebugMode => write!(fmt, "debug mode"),
            Self::Trace(n) => write!(fmt, "trace{n}"),
            Self::ExternalDebug(n) => write!(fmt, "external{n}"),
            Self::Reserved(code) => write!(fmt, "reserved action {code}"),
        }
    }
}
