// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the sdtrig project.

use rustc_hash::FxHashMap;

use crate::{
    host::{
        BreakpointFlags, BreakpointHandle, PrivilegeLevel, TimerHandle, TriggerHost,
        WatchpointHandle,
    },
    memory::Address,
};

/// A registered instruction breakpoint.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Breakpoint {
    pub address: Address,
    pub flags: BreakpointFlags,
}

/// A registered watchpoint.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Watchpoint {
    pub address: Address,
    pub len: u64,
    pub flags: BreakpointFlags,
}

#[derive(Copy, Clone, Debug)]
struct Timer {
    slot: usize,
    /// Raw instruction count at which the timer fires, `None` while idle.
    deadline: Option<u64>,
}

/// A deterministic single hart execution engine.
///
/// Time is the raw instruction counter: timers fire once it reaches their
/// deadline.
#[derive(Debug, Default)]
pub struct ReplayHost {
    pub privilege: PrivilegeLevel,
    pub virt: bool,
    /// Deterministic instruction counting.
    pub icount: bool,
    raw: u64,
    next_handle: u64,
    breakpoints: FxHashMap<BreakpointHandle, Breakpoint>,
    watchpoints: FxHashMap<WatchpointHandle, Watchpoint>,
    timers: FxHashMap<TimerHandle, Timer>,
    /// Trap values of the breakpoint exceptions raised so far.
    exceptions: Vec<u64>,
}

impl ReplayHost {
    /// A host running in machine mode with the counter at zero.
    pub fn new(icount: bool) -> Self {
        Self {
            icount,
            ..Self::default()
        }
    }

    fn next_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    /// Advance the raw instruction counter without running anything.
    pub fn advance(&mut self, instructions: u64) {
        self.raw += instructions;
    }

    /// Slots whose timers have reached their deadline, in deadline order.
    /// Their timers become idle.
    pub fn expired_timers(&mut self) -> Vec<usize> {
        let raw = self.raw;
        let mut expired = self
            .timers
            .values_mut()
            .filter_map(|timer| match timer.deadline {
                Some(deadline) if deadline <= raw => {
                    timer.deadline = None;
                    Some((deadline, timer.slot))
                }
                _ => None,
            })
            .collect::<Vec<_>>();
        expired.sort_unstable();
        expired.into_iter().map(|(_, slot)| slot).collect()
    }

    /// Deadline of the timer of trigger `slot`, if it is armed.
    pub fn timer_deadline(&self, slot: usize) -> Option<u64> {
        self.timers
            .values()
            .find(|timer| timer.slot == slot)
            .and_then(|timer| timer.deadline)
    }

    pub fn breakpoints(&self) -> impl Iterator<Item = &Breakpoint> + '_ {
        self.breakpoints.values()
    }

    pub fn watchpoints(&self) -> impl Iterator<Item = &Watchpoint> + '_ {
        self.watchpoints.values()
    }

    /// Whether a CPU owned breakpoint is registered at `pc`.
    pub fn breakpoint_at(&self, pc: u64) -> bool {
        self.breakpoints
            .values()
            .any(|bp| bp.address.0 == pc && bp.flags.contains(BreakpointFlags::CPU))
    }

    /// Watchpoints an access of `len` bytes at `address` hits, lowest address
    /// first.
    pub fn watchpoints_hit(&self, address: u64, len: u64, access: BreakpointFlags) -> Vec<Watchpoint> {
        let mut hits = self
            .watchpoints
            .values()
            .filter(|wp| {
                wp.flags.intersects(access)
                    && Address(address).overlaps(len, wp.address, wp.len)
            })
            .copied()
            .collect::<Vec<_>>();
        hits.sort_unstable_by_key(|wp| wp.address);
        hits.dedup_by_key(|wp| wp.address);
        hits
    }

    pub fn exceptions(&self) -> &[u64] {
        &self.exceptions
    }

    pub fn take_exceptions(&mut self) -> Vec<u64> {
        std::mem::take(&mut self.exceptions)
    }
}

impl TriggerHost for ReplayHost {
    fn privilege(&self) -> PrivilegeLevel {
        self.privilege
    }

    fn virt_enabled(&self) -> bool {
        self.virt
    }

    fn icount_enabled(&self) -> bool {
        self.icount
    }

    fn icount_get_raw(&self) -> u64 {
        self.raw
    }

    fn timer_new(&mut self, slot: usize) -> TimerHandle {
        let handle = TimerHandle(self.next_handle());
        self.timers.insert(
            handle,
            Timer {
                slot,
                deadline: None,
            },
        );
        handle
    }

    fn timer_mod(&mut self, timer: TimerHandle, deadline: u64) {
        if let Some(timer) = self.timers.get_mut(&timer) {
            timer.deadline = Some(deadline);
        }
    }

    fn timer_del(&mut self, timer: TimerHandle) {
        if let Some(timer) = self.timers.get_mut(&timer) {
            timer.deadline = None;
        }
    }

    fn breakpoint_insert(&mut self, address: u64, flags: BreakpointFlags) -> BreakpointHandle {
        let handle = BreakpointHandle(self.next_handle());
        self.breakpoints.insert(
            handle,
            Breakpoint {
                address: Address(address),
                flags,
            },
        );
        handle
    }

    fn breakpoint_remove(&mut self, handle: BreakpointHandle) {
        self.breakpoints.remove(&handle);
    }

    fn watchpoint_insert(
        &mut self,
        address: u64,
        len: u64,
        flags: BreakpointFlags,
    ) -> WatchpointHandle {
        let handle = WatchpointHandle(self.next_handle());
        self.watchpoints.insert(
            handle,
            Watchpoint {
                address: Address(address),
                len,
                flags,
            },
        );
        handle
    }

    fn watchpoint_remove(&mut self, handle: WatchpointHandle) {
        self.watchpoints.remove(&handle);
    }

    fn raise_breakpoint_exception(&mut self, tval: u64) {
        log::debug!("breakpoint exception, tval 0x{tval:x}");
        self.exceptions.push(tval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timers() {
        let mut host = ReplayHost::new(true);
        let a = host.timer_new(0);
        let b = host.timer_new(1);
        host.timer_mod(a, 10);
        host.timer_mod(b, 5);
        host.advance(4);
        assert!(host.expired_timers().is_empty());
        host.advance(6);
        assert_eq!(host.expired_timers(), [1, 0]);
        assert!(host.expired_timers().is_empty());
        host.timer_mod(a, 12);
        host.timer_del(a);
        host.advance(10);
        assert!(host.expired_timers().is_empty());
        assert_eq!(host.timer_deadline(0), None);
    }

    #[test]
    fn test_watchpoints_hit() {
        let mut host = ReplayHost::new(false);
        let flags = BreakpointFlags::CPU | BreakpointFlags::MEM_WRITE;
        let handle = host.watchpoint_insert(0x1000, 8, flags);
        assert_eq!(
            host.watchpoints_hit(0x1004, 4, BreakpointFlags::MEM_WRITE).len(),
            1
        );
        assert!(host
            .watchpoints_hit(0x1004, 4, BreakpointFlags::MEM_READ)
            .is_empty());
        assert!(host
            .watchpoints_hit(0x1008, 4, BreakpointFlags::MEM_WRITE)
            .is_empty());
        assert!(host
            .watchpoints_hit(0xffc, 4, BreakpointFlags::MEM_WRITE)
            .is_empty());
        host.watchpoint_remove(handle);
        assert_eq!(host.watchpoints().count(), 0);
    }
}
