// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the sdtrig project.

//! Instruction count triggers.
//!
//! With deterministic instruction counting the stored counts are only brought
//! up to date by an accounting pass, run from per-trigger timers and on
//! privilege changes. `last_icount` holds the raw count at the last pass.
//! Otherwise the engine calls [`DebugMonitor::itrigger_match`] after every
//! instruction while [`DebugMonitor::itrigger_enabled`] is set.

use super::DebugMonitor;
use crate::{host::TriggerHost, trigger::TriggerConfig, RV_MAX_TRIGGERS};

impl DebugMonitor {
    /// Whether the engine must call [`itrigger_match`](Self::itrigger_match)
    /// after every instruction.
    pub fn itrigger_enabled(&self) -> bool {
        self.itrigger_enabled
    }

    pub(super) fn refresh_itrigger_enabled<H: TriggerHost + ?Sized>(&mut self, host: &H) {
        self.itrigger_enabled = !host.icount_enabled()
            && self.triggers.iter().any(|t| {
                matches!(t.config, TriggerConfig::InstructionCount(ic)
                    if ic.count != 0 && !ic.modes.is_empty())
            });
    }

    /// Remaining count of trigger `slot` including instructions retired since
    /// the last accounting pass.
    pub(super) fn live_icount<H: TriggerHost + ?Sized>(&self, host: &H, slot: usize) -> u16 {
        let count = self.triggers[slot].icount();
        if count == 0 || !self.matches_privilege(host, slot) {
            return count;
        }
        let executed = host.icount_get_raw().saturating_sub(self.last_icount);
        // Never exceeds `count`.
        u64::from(count).saturating_sub(executed) as u16
    }

    /// Charge the instructions retired since the last pass to every trigger
    /// eligible at the current privilege level and fire those that expire.
    ///
    /// Triggers that are not eligible keep their count and get their timer
    /// pushed back so that a later pass looks at them again.
    pub(super) fn update_icount<H: TriggerHost + ?Sized>(&mut self, host: &mut H) -> bool {
        let xlen = self.xlen();
        let current = host.icount_get_raw();
        let executed = current.saturating_sub(self.last_icount);
        self.last_icount = current;

        let mut transferred = false;
        for slot in 0..RV_MAX_TRIGGERS {
            let count = u64::from(self.triggers[slot].icount());
            if count == 0 {
                continue;
            }
            let timer = self.triggers[slot].timer;
            if !self.matches_privilege(host, slot) {
                if let Some(timer) = timer {
                    host.timer_mod(timer, current + count);
                }
                continue;
            }
            let remaining = count.saturating_sub(executed);
            // `remaining <= count`, which came from the 14-bit field.
            self.triggers[slot].set_icount(xlen, remaining as u16);
            if remaining != 0 {
                if let Some(timer) = timer {
                    host.timer_mod(timer, current + remaining);
                }
            } else {
                log::trace!("trigger {slot}: count expired after {executed} instructions");
                if !transferred {
                    transferred = self.do_trigger_action(host, slot, 0);
                }
            }
        }
        self.refresh_itrigger_enabled(host);
        transferred
    }

    /// Account instructions retired at the current privilege level.
    ///
    /// Must be called before the engine switches to the new privilege level.
    /// Returns whether control was transferred to an exception handler.
    pub fn on_privilege_change<H: TriggerHost + ?Sized>(&mut self, host: &mut H) -> bool {
        if host.icount_enabled() {
            self.update_icount(host)
        } else {
            self.refresh_itrigger_enabled(host);
            false
        }
    }

    /// Timer callback of trigger `slot`.
    ///
    /// Returns whether control was transferred to an exception handler.
    pub fn on_itrigger_timer<H: TriggerHost + ?Sized>(&mut self, host: &mut H, slot: usize) -> bool {
        log::trace!("trigger {slot}: timer expired at {}", host.icount_get_raw());
        self.update_icount(host)
    }

    /// Count one retired instruction against every eligible instruction count
    /// trigger.
    ///
    /// Returns whether control was transferred to an exception handler.
    pub fn itrigger_match<H: TriggerHost + ?Sized>(&mut self, host: &mut H) -> bool {
        let xlen = self.xlen();
        let mut transferred = false;
        for slot in 0..RV_MAX_TRIGGERS {
            let count = self.triggers[slot].icount();
            if count == 0 || !self.matches_privilege(host, slot) {
                continue;
            }
            self.triggers[slot].set_icount(xlen, count - 1);
            if count == 1 {
                self.refresh_itrigger_enabled(host);
                if !transferred {
                    transferred = self.do_trigger_action(host, slot, 0);
                }
            }
        }
        transferred
    }
}
