// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the sdtrig project.

use super::DebugMonitor;
use crate::{diagnostics::Diagnostic, host::TriggerHost, trigger::TriggerAction};

impl DebugMonitor {
    /// Carry out the action of trigger `slot`, which just fired.
    ///
    /// `tval` is the trap value of a breakpoint exception. Returns whether
    /// control was transferred to an exception handler.
    pub(super) fn do_trigger_action<H: TriggerHost + ?Sized>(
        &mut self,
        host: &mut H,
        slot: usize,
        tval: u64,
    ) -> bool {
        let action = self.triggers[slot].config.action();
        log::debug!("trigger {slot} fired: {action}");
        match action {
            TriggerAction::None => false,
            TriggerAction::Breakpoint => {
                host.raise_breakpoint_exception(tval);
                true
            }
            TriggerAction::DebugMode
            | TriggerAction::Trace(_)
            | TriggerAction::ExternalDebug(_)
            | TriggerAction::Reserved(_) => {
                self.sink
                    .emit(Diagnostic::UnsupportedAction { slot, action });
                false
            }
        }
    }
}
