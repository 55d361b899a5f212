// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the sdtrig project.

//! Per-hart trigger module configuration.

use serde_derive::{Deserialize, Serialize};

use crate::csr::Xlen;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebugConfig {
    /// Register width of the hart.
    pub xlen: Xlen,
    /// Whether the hart implements the hypervisor extension. This widens
    /// `mcontext`.
    pub hypervisor: bool,
}

impl DebugConfig {
    pub fn from_json(s: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(serde_json::from_str(s)?)
    }

    /// Writable bits of `mcontext`.
    pub const fn mcontext_mask(&self) -> u64 {
        match (self.xlen, self.hypervisor) {
            (Xlen::Rv32, false) => 0x3f,
            (Xlen::Rv32, true) => 0x7f,
            (Xlen::Rv64 | Xlen::Rv128, false) => 0x1fff,
            (Xlen::Rv64 | Xlen::Rv128, true) => 0x3fff,
        }
    }
}
