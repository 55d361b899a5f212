// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the sdtrig project.

//! Per-hart trigger module.
//!
//! [`DebugMonitor`] owns the trigger bank and every piece of trigger related
//! hart state: `tselect`, `mcontext`, the instruction counter snapshot used by
//! instruction count triggers and the cached "any instruction count trigger
//! armed" flag. The execution engine is reached through a [`TriggerHost`]
//! passed to every operation that needs it.

use crate::{
    config::DebugConfig,
    csr::Xlen,
    diagnostics::{DiagnosticsSink, LogSink},
    host::TriggerHost,
    RV_MAX_TRIGGERS,
};

mod action;
mod bank;
mod breakpoints;
mod icount;
mod registers;

pub use bank::Trigger;

#[derive(Debug)]
pub struct DebugMonitor {
    config: DebugConfig,
    triggers: [Trigger; RV_MAX_TRIGGERS],
    /// Index of the trigger `tdataN` accesses address.
    tselect: usize,
    mcontext: u64,
    /// Raw instruction count at the last instruction count accounting pass.
    last_icount: u64,
    /// Whether the engine must call [`DebugMonitor::itrigger_match`] after
    /// every instruction.
    itrigger_enabled: bool,
    sink: Box<dyn DiagnosticsSink>,
}

impl DebugMonitor {
    /// Create a trigger module that reports diagnostics through [`log`].
    pub fn new(config: DebugConfig) -> Self {
        Self::with_sink(config, Box::new(LogSink))
    }

    pub fn with_sink(config: DebugConfig, sink: Box<dyn DiagnosticsSink>) -> Self {
        let reset = Trigger::reset_state(config.xlen);
        Self {
            config,
            triggers: [reset; RV_MAX_TRIGGERS],
            tselect: 0,
            mcontext: 0,
            last_icount: 0,
            itrigger_enabled: false,
            sink,
        }
    }

    pub fn config(&self) -> &DebugConfig {
        &self.config
    }

    pub fn xlen(&self) -> Xlen {
        self.config.xlen
    }

    /// Trigger in slot `index`, if it exists.
    pub fn trigger(&self, index: usize) -> Option<&Trigger> {
        self.triggers.get(index)
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Allocate one instruction count timer per trigger.
    ///
    /// Must be called once, before the first [`reset`](Self::reset).
    pub fn realize<H: TriggerHost + ?Sized>(&mut self, host: &mut H) {
        for (slot, trigger) in self.triggers.iter_mut().enumerate() {
            if trigger.timer.is_none() {
                trigger.timer = Some(host.timer_new(slot));
            }
        }
        log::trace!("allocated {} trigger timers", RV_MAX_TRIGGERS);
    }

    /// Return every trigger to a disabled `mcontrol` trigger.
    pub fn reset<H: TriggerHost + ?Sized>(&mut self, host: &mut H) {
        let xlen = self.xlen();
        for slot in 0..RV_MAX_TRIGGERS {
            self.remove_registrations(host, slot);
            let trigger = &mut self.triggers[slot];
            if let Some(timer) = trigger.timer {
                host.timer_del(timer);
            }
            trigger.reset(xlen);
        }
        self.tselect = 0;
        self.mcontext = 0;
        self.last_icount = host.icount_get_raw();
        self.refresh_itrigger_enabled(host);
        log::debug!("trigger module reset");
    }

    fn selected(&self) -> &Trigger {
        &self.triggers[self.tselect]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        csr::{Csr, TdataIndex},
        diagnostics::{Diagnostic, RecordingSink},
        host::{BreakpointFlags, PrivilegeLevel},
        replay::ReplayHost,
        trigger::{build_tdata1, TriggerConfig, TriggerType},
    };

    fn monitor(xlen: Xlen, icount: bool) -> (DebugMonitor, ReplayHost, RecordingSink) {
        let sink = RecordingSink::new();
        let config = DebugConfig {
            xlen,
            ..DebugConfig::default()
        };
        let mut monitor = DebugMonitor::with_sink(config, Box::new(sink.clone()));
        let mut host = ReplayHost::new(icount);
        monitor.realize(&mut host);
        monitor.reset(&mut host);
        (monitor, host, sink)
    }

    fn mcontrol(data: u64) -> u64 {
        build_tdata1(Xlen::Rv64, TriggerType::Mcontrol, false, data)
    }

    fn icount(data: u64) -> u64 {
        build_tdata1(Xlen::Rv64, TriggerType::Icount, false, data)
    }

    #[test]
    fn test_reset_state() {
        let (monitor, host, sink) = monitor(Xlen::Rv64, false);
        for trigger in monitor.triggers() {
            assert_eq!(trigger.tdata1, 0x2000_0000_0000_0000);
            assert_eq!(trigger.tdata2, 0);
            assert_eq!(trigger.tdata3, 0);
            assert!(trigger.timer.is_some());
            assert_eq!(trigger.config.trigger_type(), TriggerType::Mcontrol);
        }
        assert_eq!(host.breakpoints().count(), 0);
        assert_eq!(host.watchpoints().count(), 0);
        assert!(!monitor.itrigger_enabled());
        assert!(sink.take().is_empty());
    }

    #[test]
    fn test_reset_removes_registrations() {
        let (mut monitor, mut host, _) = monitor(Xlen::Rv64, false);
        monitor.tdata_write(&mut host, TdataIndex::Tdata2, 0x8000_0000);
        monitor.tdata_write(&mut host, TdataIndex::Tdata1, mcontrol((1 << 6) | 0b111));
        monitor.mcontext_write(0x55);
        monitor.tselect_write(1);
        assert_eq!(host.breakpoints().count(), 1);
        assert_eq!(host.watchpoints().count(), 1);

        monitor.reset(&mut host);
        assert_eq!(host.breakpoints().count(), 0);
        assert_eq!(host.watchpoints().count(), 0);
        assert_eq!(monitor.tselect_read(), 0);
        assert_eq!(monitor.mcontext_read(), 0);
        assert_eq!(monitor.trigger(0).map(|t| t.tdata2), Some(0));
    }

    #[test]
    fn test_tselect() {
        let (mut monitor, mut host, sink) = monitor(Xlen::Rv64, false);
        monitor.tselect_write(1);
        assert_eq!(monitor.tselect_read(), 1);
        monitor.tselect_write(RV_MAX_TRIGGERS as u64);
        assert_eq!(monitor.tselect_read(), 1);
        assert_eq!(
            sink.take(),
            vec![Diagnostic::InvalidTriggerSelect {
                index: RV_MAX_TRIGGERS as u64
            }]
        );

        monitor.csr_write(&mut host, Csr::Tdata2, 0x1234);
        assert_eq!(monitor.trigger(1).map(|t| t.tdata2), Some(0x1234));
        assert_eq!(monitor.trigger(0).map(|t| t.tdata2), Some(0));
        assert_eq!(monitor.csr_read(&host, Csr::Tdata2), 0x1234);
    }

    #[test]
    fn test_unsupported_action_reads_back_zero() {
        let (mut monitor, mut host, sink) = monitor(Xlen::Rv64, false);
        // m | execute | action=3
        monitor.tdata_write(&mut host, TdataIndex::Tdata1, mcontrol((1 << 6) | (1 << 2) | (3 << 12)));
        assert_eq!(
            monitor.tdata_read(&host, TdataIndex::Tdata1),
            mcontrol((1 << 6) | (1 << 2))
        );
        assert_eq!(sink.take().len(), 1);
    }

    #[test]
    fn test_tdata2_rewrite_moves_breakpoint() {
        let (mut monitor, mut host, _) = monitor(Xlen::Rv64, false);
        monitor.tdata_write(&mut host, TdataIndex::Tdata1, mcontrol((1 << 6) | (1 << 2)));
        monitor.tdata_write(&mut host, TdataIndex::Tdata2, 0x1000);
        monitor.tdata_write(&mut host, TdataIndex::Tdata2, 0x2000);
        let breakpoints: Vec<_> = host.breakpoints().collect();
        assert_eq!(breakpoints.len(), 1);
        assert_eq!(breakpoints[0].address.0, 0x2000);
        assert_eq!(
            breakpoints[0].flags,
            BreakpointFlags::CPU | BreakpointFlags::STOP_BEFORE_ACCESS
        );
        assert_eq!(monitor.check_breakpoint(&host, 0x2000), Some(0));
        assert_eq!(monitor.check_breakpoint(&host, 0x1000), None);
    }

    #[test]
    fn test_watchpoint_size() {
        let (mut monitor, mut host, _) = monitor(Xlen::Rv32, false);
        monitor.tdata_write(&mut host, TdataIndex::Tdata2, 0x100);
        // u | store, size any
        monitor.tdata_write(
            &mut host,
            TdataIndex::Tdata1,
            build_tdata1(Xlen::Rv32, TriggerType::Mcontrol, false, (1 << 3) | (1 << 1)),
        );
        let watchpoints: Vec<_> = host.watchpoints().collect();
        assert_eq!(watchpoints.len(), 1);
        assert_eq!(watchpoints[0].len, 4);
        assert_eq!(
            watchpoints[0].flags,
            BreakpointFlags::CPU | BreakpointFlags::STOP_BEFORE_ACCESS | BreakpointFlags::MEM_WRITE
        );

        host.privilege = PrivilegeLevel::User;
        assert_eq!(
            monitor.check_watchpoint(&host, 0x100, BreakpointFlags::MEM_WRITE),
            Some(0)
        );
        assert_eq!(
            monitor.check_watchpoint(&host, 0x100, BreakpointFlags::MEM_READ),
            None
        );
        host.privilege = PrivilegeLevel::Machine;
        assert_eq!(
            monitor.check_watchpoint(&host, 0x100, BreakpointFlags::MEM_WRITE),
            None
        );
    }

    #[test]
    fn test_type_change_drops_registrations() {
        let (mut monitor, mut host, _) = monitor(Xlen::Rv64, false);
        monitor.tdata_write(&mut host, TdataIndex::Tdata1, mcontrol((1 << 6) | (1 << 2)));
        assert_eq!(host.breakpoints().count(), 1);
        monitor.tdata_write(&mut host, TdataIndex::Tdata1, icount((1 << 9) | (3 << 10)));
        assert_eq!(host.breakpoints().count(), 0);
        assert!(matches!(
            monitor.selected().config,
            TriggerConfig::InstructionCount(_)
        ));
        assert!(monitor.itrigger_enabled());
    }

    #[test]
    fn test_reserved_type_keeps_state() {
        let (mut monitor, mut host, sink) = monitor(Xlen::Rv64, false);
        let armed = mcontrol((1 << 6) | (1 << 2));
        monitor.tdata_write(&mut host, TdataIndex::Tdata1, armed);
        monitor.tdata_write(&mut host, TdataIndex::Tdata1, 0xc000_0000_0000_0044);
        assert_eq!(monitor.tdata_read(&host, TdataIndex::Tdata1), armed);
        assert_eq!(host.breakpoints().count(), 1);
        assert_eq!(
            sink.take(),
            vec![Diagnostic::NonexistentTriggerType { tag: 12 }]
        );
    }

    #[test]
    fn test_unsupported_type_is_stored() {
        let (mut monitor, mut host, sink) = monitor(Xlen::Rv64, false);
        monitor.tdata_write(&mut host, TdataIndex::Tdata1, mcontrol((1 << 6) | (1 << 2)));
        let value = build_tdata1(Xlen::Rv64, TriggerType::Itrigger, false, 0xfff);
        monitor.tdata_write(&mut host, TdataIndex::Tdata1, value);
        assert_eq!(monitor.tdata_read(&host, TdataIndex::Tdata1), value);
        assert_eq!(host.breakpoints().count(), 0);
        monitor.tdata_write(&mut host, TdataIndex::Tdata3, 7);
        assert_eq!(monitor.tdata_read(&host, TdataIndex::Tdata3), 7);
        assert_eq!(
            sink.take(),
            vec![
                Diagnostic::UnsupportedTriggerType {
                    ty: TriggerType::Itrigger,
                    tag: 4
                },
                Diagnostic::UnsupportedTdata {
                    ty: TriggerType::Itrigger,
                    index: TdataIndex::Tdata3
                },
            ]
        );
        assert!(monitor.tdata_available(TdataIndex::Tdata3));
    }

    #[test]
    fn test_rv32_truncates() {
        let (mut monitor, mut host, _) = monitor(Xlen::Rv32, false);
        monitor.tdata_write(&mut host, TdataIndex::Tdata2, 0x1_2345_6789);
        assert_eq!(monitor.tdata_read(&host, TdataIndex::Tdata2), 0x2345_6789);
        monitor.mcontext_write(u64::MAX);
        assert_eq!(monitor.mcontext_read(), 0x3f);
    }

    #[test]
    fn test_tinfo() {
        let (monitor, host, _) = monitor(Xlen::Rv64, false);
        assert_eq!(monitor.csr_read(&host, Csr::Tinfo), 0b100_0100);
    }
}
