// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the sdtrig project.

//! Address match triggers as engine breakpoints and watchpoints.

use super::DebugMonitor;
use crate::{
    host::{BreakpointFlags, TriggerHost},
    trigger::{AccessMask, AddressMatch, TriggerConfig},
    RV_MAX_TRIGGERS,
};

impl DebugMonitor {
    fn address_match(&self, slot: usize) -> Option<AddressMatch> {
        match self.triggers.get(slot)?.config {
            TriggerConfig::AddressMatch(m) => Some(m),
            TriggerConfig::InstructionCount(_) | TriggerConfig::Unsupported(_) => None,
        }
    }

    /// Register the breakpoint and/or watchpoint an enabled address match
    /// trigger asks for.
    pub(super) fn insert_registrations<H: TriggerHost + ?Sized>(
        &mut self,
        host: &mut H,
        slot: usize,
    ) {
        let Some(m) = self.address_match(slot).filter(AddressMatch::enabled) else {
            return;
        };
        let xlen = self.xlen();
        let trigger = &mut self.triggers[slot];
        let address = trigger.tdata2;
        let flags = BreakpointFlags::CPU | BreakpointFlags::STOP_BEFORE_ACCESS;

        if m.access.contains(AccessMask::EXECUTE) {
            trigger.breakpoint = Some(host.breakpoint_insert(address, flags));
            log::debug!("trigger {slot}: breakpoint at 0x{address:x}");
        }

        let access = watch_flags(m.access);
        if !access.is_empty() {
            let wp_flags = flags | access;
            let len = m.watch_len(xlen);
            trigger.watchpoint = Some(host.watchpoint_insert(address, len, wp_flags));
            log::debug!("trigger {slot}: watchpoint at 0x{address:x} len {len} {wp_flags:?}");
        }
    }

    /// Drop whatever registrations the trigger holds.
    pub(super) fn remove_registrations<H: TriggerHost + ?Sized>(
        &mut self,
        host: &mut H,
        slot: usize,
    ) {
        let trigger = &mut self.triggers[slot];
        if let Some(handle) = trigger.breakpoint.take() {
            host.breakpoint_remove(handle);
        }
        if let Some(handle) = trigger.watchpoint.take() {
            host.watchpoint_remove(handle);
        }
    }

    /// Whether trigger `slot` may fire at the host's current privilege level.
    pub fn matches_privilege<H: TriggerHost + ?Sized>(&self, host: &H, slot: usize) -> bool {
        self.triggers
            .get(slot)
            .is_some_and(|t| t.config.matches_privilege(host.privilege(), host.virt_enabled()))
    }

    fn claims_execute(&self, slot: usize, pc: u64) -> bool {
        self.address_match(slot).is_some_and(|m| {
            m.access.contains(AccessMask::EXECUTE) && self.triggers[slot].tdata2 == pc
        })
    }

    fn claims_access(&self, slot: usize, address: u64, flags: BreakpointFlags) -> bool {
        self.address_match(slot).is_some_and(|m| {
            watch_flags(m.access).intersects(flags) && self.triggers[slot].tdata2 == address
        })
    }

    /// Returns the first trigger that claims an instruction breakpoint at `pc`.
    pub fn check_breakpoint<H: TriggerHost + ?Sized>(&self, host: &H, pc: u64) -> Option<usize> {
        (0..RV_MAX_TRIGGERS)
            .find(|&slot| self.claims_execute(slot, pc) && self.matches_privilege(host, slot))
    }

    /// Returns the first trigger that claims a watchpoint hit.
    ///
    /// `address` is the watched address as registered, `flags` the kind of
    /// access that hit it.
    pub fn check_watchpoint<H: TriggerHost + ?Sized>(
        &self,
        host: &H,
        address: u64,
        flags: BreakpointFlags,
    ) -> Option<usize> {
        (0..RV_MAX_TRIGGERS).find(|&slot| {
            self.claims_access(slot, address, flags) && self.matches_privilege(host, slot)
        })
    }

    /// Dispatch the triggers that claim the instruction breakpoint at `pc`,
    /// stopping at the first one that transfers control.
    ///
    /// Returns whether control was transferred to an exception handler.
    pub fn on_breakpoint_hit<H: TriggerHost + ?Sized>(&mut self, host: &mut H, pc: u64) -> bool {
        for slot in 0..RV_MAX_TRIGGERS {
            if self.claims_execute(slot, pc)
                && self.matches_privilege(host, slot)
                && self.do_trigger_action(host, slot, pc)
            {
                return true;
            }
        }
        false
    }

    /// Dispatch the triggers that claim a hit on the watchpoint registered at
    /// `address`, stopping at the first one that transfers control.
    pub fn on_watchpoint_hit<H: TriggerHost + ?Sized>(
        &mut self,
        host: &mut H,
        address: u64,
        flags: BreakpointFlags,
    ) -> bool {
        for slot in 0..RV_MAX_TRIGGERS {
            if self.claims_access(slot, address, flags)
                && self.matches_privilege(host, slot)
                && self.do_trigger_action(host, slot, address)
            {
                return true;
            }
        }
        false
    }
}

/// Watchpoint access flags an access mask asks for.
fn watch_flags(access: AccessMask) -> BreakpointFlags {
    let mut flags = BreakpointFlags::empty();
    flags.set(BreakpointFlags::MEM_READ, access.contains(AccessMask::LOAD));
    flags.set(BreakpointFlags::MEM_WRITE, access.contains(AccessMask::STORE));
    flags
}
