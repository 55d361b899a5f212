// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the sdtrig project.

use crate::{
    csr::Xlen,
    host::{BreakpointHandle, TimerHandle, WatchpointHandle},
    trigger::{build_tdata1, Icount, TriggerConfig, TriggerType},
};

/// One trigger slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Trigger {
    pub tdata1: u64,
    pub tdata2: u64,
    pub tdata3: u64,
    /// `tdata1` decoded, kept in sync with every `tdata1` update.
    pub config: TriggerConfig,
    pub breakpoint: Option<BreakpointHandle>,
    pub watchpoint: Option<WatchpointHandle>,
    /// Instruction count timer, allocated by [`super::DebugMonitor::realize`].
    pub timer: Option<TimerHandle>,
}

impl Trigger {
    /// A disabled `mcontrol` trigger with no registrations and no timer.
    pub fn reset_state(xlen: Xlen) -> Self {
        let tdata1 = build_tdata1(xlen, TriggerType::Mcontrol, false, 0);
        Self {
            tdata1,
            tdata2: 0,
            tdata3: 0,
            config: TriggerConfig::decode(xlen, tdata1),
            breakpoint: None,
            watchpoint: None,
            timer: None,
        }
    }

    /// Reset registers. Registrations must already be removed; the timer
    /// allocation survives.
    pub(super) fn reset(&mut self, xlen: Xlen) {
        *self = Self {
            timer: self.timer,
            ..Self::reset_state(xlen)
        };
    }

    pub(super) fn set_tdata1(&mut self, xlen: Xlen, tdata1: u64) {
        self.tdata1 = tdata1;
        self.config = TriggerConfig::decode(xlen, tdata1);
    }

    /// Remaining instructions of an instruction count trigger, zero for any
    /// other type.
    pub fn icount(&self) -> u16 {
        match self.config {
            TriggerConfig::InstructionCount(ic) => ic.count,
            _ => 0,
        }
    }

    /// Store a new remaining count in `tdata1`. No-op for other types.
    pub(super) fn set_icount(&mut self, xlen: Xlen, count: u16) {
        let TriggerConfig::InstructionCount(ref mut ic) = self.config else {
            return;
        };
        let mut ctrl = Icount::from(self.tdata1 as u32);
        ctrl.set_count_value(count);
        ic.count = ctrl.count_value();
        let low = u64::from(u32::MAX);
        self.tdata1 = ((self.tdata1 & !low) | u64::from(u32::from(ctrl))) & xlen.mask();
    }
}
