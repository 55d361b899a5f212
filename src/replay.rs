// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the sdtrig project.

//! A reference execution engine for the trigger module.
//!
//! [`Machine`] drives a [`DebugMonitor`] the way an instruction set simulator
//! would: it retires instructions, switches privilege levels and performs
//! instruction fetches and data accesses, routing breakpoint, watchpoint and
//! timer hits back into the trigger module. [`Scenario`] describes such a run
//! as a JSON document.

mod host;
mod scenario;

pub use host::*;
pub use scenario::*;

use crate::{
    config::DebugConfig,
    csr::Csr,
    diagnostics::DiagnosticsSink,
    host::{BreakpointFlags, PrivilegeLevel},
    DebugMonitor,
};

/// Kind of a data access.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AccessKind {
    Load,
    Store,
}

impl AccessKind {
    pub const fn flags(self) -> BreakpointFlags {
        match self {
            Self::Load => BreakpointFlags::MEM_READ,
            Self::Store => BreakpointFlags::MEM_WRITE,
        }
    }
}

#[derive(Debug)]
pub struct Machine {
    pub monitor: DebugMonitor,
    pub host: ReplayHost,
}

impl Machine {
    /// A freshly reset hart in machine mode. `icount` selects deterministic
    /// instruction counting.
    pub fn new(config: DebugConfig, icount: bool) -> Self {
        Self::from_monitor(DebugMonitor::new(config), icount)
    }

    pub fn with_sink(config: DebugConfig, icount: bool, sink: Box<dyn DiagnosticsSink>) -> Self {
        Self::from_monitor(DebugMonitor::with_sink(config, sink), icount)
    }

    fn from_monitor(mut monitor: DebugMonitor, icount: bool) -> Self {
        let mut host = ReplayHost::new(icount);
        monitor.realize(&mut host);
        monitor.reset(&mut host);
        Self { monitor, host }
    }

    pub fn reset(&mut self) {
        self.monitor.reset(&mut self.host);
    }

    pub fn csr_read(&self, csr: Csr) -> u64 {
        self.monitor.csr_read(&self.host, csr)
    }

    pub fn csr_write(&mut self, csr: Csr, value: u64) {
        self.monitor.csr_write(&mut self.host, csr, value);
    }

    /// Retire `n` instructions, one at a time.
    ///
    /// Returns the number of breakpoint exceptions raised on the way.
    pub fn retire(&mut self, n: u64) -> usize {
        let mut raised = 0;
        for _ in 0..n {
            self.host.advance(1);
            if self.monitor.itrigger_enabled() && self.monitor.itrigger_match(&mut self.host) {
                raised += 1;
            }
            for slot in self.host.expired_timers() {
                if self.monitor.on_itrigger_timer(&mut self.host, slot) {
                    raised += 1;
                }
            }
        }
        raised
    }

    /// Switch privilege level, accounting instruction count triggers against
    /// the outgoing level first.
    pub fn set_privilege(&mut self, level: PrivilegeLevel, virt: bool) -> bool {
        let transferred = self.monitor.on_privilege_change(&mut self.host);
        log::trace!("privilege {} -> {level} (virt: {virt})", self.host.privilege);
        self.host.privilege = level;
        self.host.virt = virt;
        transferred
    }

    /// Execute the instruction at `pc`.
    ///
    /// A trigger breakpoint on `pc` stops execution before the instruction
    /// runs. Returns whether a breakpoint exception was raised.
    pub fn execute(&mut self, pc: u64) -> bool {
        if self.host.breakpoint_at(pc)
            && self.monitor.check_breakpoint(&self.host, pc).is_some()
            && self.monitor.on_breakpoint_hit(&mut self.host, pc)
        {
            return true;
        }
        self.retire(1) > 0
    }

    /// Perform a data access of `len` bytes at `address`.
    ///
    /// Returns whether a breakpoint exception was raised.
    pub fn access(&mut self, address: u64, len: u64, kind: AccessKind) -> bool {
        let flags = kind.flags();
        for wp in self.host.watchpoints_hit(address, len, flags) {
            if self
                .monitor
                .check_watchpoint(&self.host, wp.address.0, flags)
                .is_some()
                && self
                    .monitor
                    .on_watchpoint_hit(&mut self.host, wp.address.0, flags)
            {
                return true;
            }
        }
        false
    }
}
