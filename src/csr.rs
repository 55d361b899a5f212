// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the sdtrig project.

//! Trigger CSR numbers and machine word width.

use serde_derive::{Deserialize, Serialize};

/// Trigger related control and status registers.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u16)]
pub enum Csr {
    /// Trigger select.
    Tselect = 0x7a0,
    /// Trigger data 1, the type and control word.
    Tdata1 = 0x7a1,
    /// Trigger data 2, the match value.
    Tdata2 = 0x7a2,
    /// Trigger data 3.
    Tdata3 = 0x7a3,
    /// Trigger info, the supported types bitmask.
    Tinfo = 0x7a4,
    /// Machine context.
    Mcontext = 0x7a8,
}

impl Csr {
    pub const POSSIBLE_VALUES: &'static [Self] = &[
        Self::Tselect,
        Self::Tdata1,
        Self::Tdata2,
        Self::Tdata3,
        Self::Tinfo,
        Self::Mcontext,
    ];

    pub const fn number(self) -> u16 {
        self as u16
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tselect => "tselect",
            Self::Tdata1 => "tdata1",
            Self::Tdata2 => "tdata2",
            Self::Tdata3 => "tdata3",
            Self::Tinfo => "tinfo",
            Self::Mcontext => "mcontext",
        }
    }

    /// Returns the `tdataN` register this CSR addresses, if any.
    pub const fn tdata_index(self) -> Option<TdataIndex> {
        match self {
            Self::Tdata1 => Some(TdataIndex::Tdata1),
            Self::Tdata2 => Some(TdataIndex::Tdata2),
            Self::Tdata3 => Some(TdataIndex::Tdata3),
            Self::Tselect | Self::Tinfo | Self::Mcontext => None,
        }
    }
}

impl std::fmt::Display for Csr {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.as_str())
    }
}

impl TryFrom<u16> for Csr {
    type Error = String;

    fn try_from(number: u16) -> Result<Self, Self::Error> {
        Self::POSSIBLE_VALUES
            .iter()
            .copied()
            .find(|csr| csr.number() == number)
            .ok_or_else(|| format!("CSR 0x{number:03x} is not a trigger register"))
    }
}

impl std::str::FromStr for Csr {
    type Err = Box<dyn std::error::Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for i in Self::POSSIBLE_VALUES.iter() {
            if i.as_str() == s {
                return Ok(*i);
            }
        }
        Err(Box::<dyn std::error::Error>::from(format!(
            "Expected one of {}",
            Self::POSSIBLE_VALUES
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<&str>>()
                .join(", ")
        )))
    }
}

/// One of the three `tdataN` registers of a trigger.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TdataIndex {
    Tdata1 = 0,
    Tdata2 = 1,
    Tdata3 = 2,
}

impl std::fmt::Display for TdataIndex {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Tdata1 => write!(fmt, "tdata1"),
            Self::Tdata2 => write!(fmt, "tdata2"),
            Self::Tdata3 => write!(fmt, "tdata3"),
        }
    }
}

/// Machine XLEN.
///
/// `RV128` keeps the trigger type field at the same position as `RV64`, since
/// only the low 64 bits of the trigger registers are implemented.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Xlen {
    #[value(name = "32")]
    Rv32,
    #[default]
    #[value(name = "64")]
    Rv64,
    #[value(name = "128")]
    Rv128,
}

impl Xlen {
    /// Bit offset of the 4-bit trigger type field in `tdata1`.
    pub const fn type_offset(self) -> u32 {
        match self {
            Self::Rv32 => 28,
            Self::Rv64 | Self::Rv128 => 60,
        }
    }

    /// Bit offset of the `dmode` bit in `tdata1`.
    pub const fn dmode_offset(self) -> u32 {
        self.type_offset() - 1
    }

    /// Mask of the bits a register of this width can hold.
    pub const fn mask(self) -> u64 {
        match self {
            Self::Rv32 => u32::MAX as u64,
            Self::Rv64 | Self::Rv128 => u64::MAX,
        }
    }

    /// Natural access width in bytes, used for watchpoints that match any size.
    pub const fn word_bytes(self) -> u64 {
        match self {
            Self::Rv32 => 4,
            Self::Rv64 | Self::Rv128 => 8,
        }
    }
}
