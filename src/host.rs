// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the sdtrig project.

//! Services the trigger module needs from the emulated hart.
//!
//! The trigger module owns no execution engine. It reads the current privilege
//! level and instruction counter from a [`TriggerHost`], registers breakpoints,
//! watchpoints and timers with it, and asks it to raise exceptions.

use serde_derive::{Deserialize, Serialize};

/// RISC-V privilege level, encoded as in `mstatus.MPP`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum PrivilegeLevel {
    User = 0,
    Supervisor = 1,
    #[default]
    Machine = 3,
}

impl PrivilegeLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Supervisor => "supervisor",
            Self::Machine => "machine",
        }
    }
}

impl std::fmt::Display for PrivilegeLevel {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.as_str())
    }
}

impl TryFrom<u8> for PrivilegeLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::User),
            1 => Ok(Self::Supervisor),
            3 => Ok(Self::Machine),
            other => Err(format!("{other} is not a privilege level")),
        }
    }
}

bitflags::bitflags! {
    /// Flags of a breakpoint or watchpoint registration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct BreakpointFlags: u8 {
        /// Registered by the CPU itself rather than by an external debugger.
        const CPU = 1 << 0;
        /// Report the hit before the access or instruction takes effect.
        const STOP_BEFORE_ACCESS = 1 << 1;
        const MEM_READ = 1 << 2;
        const MEM_WRITE = 1 << 3;
    }
}

/// Opaque handle of a registered instruction breakpoint.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct BreakpointHandle(pub u64);

/// Opaque handle of a registered watchpoint.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct WatchpointHandle(pub u64);

/// Opaque handle of a per-trigger timer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TimerHandle(pub u64);

/// Everything the trigger module needs from the hart it debugs.
pub trait TriggerHost {
    /// Current privilege level.
    fn privilege(&self) -> PrivilegeLevel;

    /// Whether the hart currently runs virtualized (VU/VS).
    fn virt_enabled(&self) -> bool;

    /// Whether instruction counting is deterministic. When it is, the hart
    /// does not call the per instruction hook and the trigger module relies on
    /// timers armed against [`icount_get_raw`](Self::icount_get_raw).
    fn icount_enabled(&self) -> bool;

    /// Number of instructions retired so far.
    fn icount_get_raw(&self) -> u64;

    /// Create a timer that fires for trigger `slot`.
    fn timer_new(&mut self, slot: usize) -> TimerHandle;

    /// (Re)arm `timer` to fire once the raw instruction count reaches `deadline`.
    fn timer_mod(&mut self, timer: TimerHandle, deadline: u64);

    /// Disarm `timer`. Disarming an idle timer is a no-op.
    fn timer_del(&mut self, timer: TimerHandle);

    fn breakpoint_insert(&mut self, address: u64, flags: BreakpointFlags) -> BreakpointHandle;

    fn breakpoint_remove(&mut self, handle: BreakpointHandle);

    fn watchpoint_insert(
        &mut self,
        address: u64,
        len: u64,
        flags: BreakpointFlags,
    ) -> WatchpointHandle;

    fn watchpoint_remove(&mut self, handle: WatchpointHandle);

    /// Raise a breakpoint exception with `tval` as the trap value.
    fn raise_breakpoint_exception(&mut self, tval: u64);
}
