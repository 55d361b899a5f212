// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the sdtrig project.

//! Trigger CSR accessors.
//!
//! None of these fail: guest writes the module cannot honour are normalized or
//! dropped, with a diagnostic.

use super::DebugMonitor;
use crate::{
    csr::{Csr, TdataIndex},
    diagnostics::Diagnostic,
    host::TriggerHost,
    trigger::{self, Tdata1Write, TriggerConfig, Validator},
    RV_MAX_TRIGGERS,
};

impl DebugMonitor {
    pub fn tselect_read(&self) -> u64 {
        self.tselect as u64
    }

    pub fn tselect_write(&mut self, value: u64) {
        match usize::try_from(value) {
            Ok(index) if index < RV_MAX_TRIGGERS => self.tselect = index,
            _ => self
                .sink
                .emit(Diagnostic::InvalidTriggerSelect { index: value }),
        }
    }

    pub fn tdata_read<H: TriggerHost + ?Sized>(&self, host: &H, index: TdataIndex) -> u64 {
        let trigger = self.selected();
        match index {
            TdataIndex::Tdata1 => match trigger.config {
                TriggerConfig::InstructionCount(_) if host.icount_enabled() => {
                    let count = self.live_icount(host, self.tselect);
                    crate::set_bits!(trigger.tdata1, off = 10, len = 14, val = u64::from(count))
                }
                _ => trigger.tdata1,
            },
            TdataIndex::Tdata2 => trigger.tdata2,
            TdataIndex::Tdata3 => trigger.tdata3,
        }
    }

    pub fn tdata_write<H: TriggerHost + ?Sized>(
        &mut self,
        host: &mut H,
        index: TdataIndex,
        value: u64,
    ) {
        let value = value & self.xlen().mask();
        let slot = self.tselect;
        match index {
            TdataIndex::Tdata1 => self.tdata1_write(host, slot, value),
            TdataIndex::Tdata2 => match self.triggers[slot].config {
                TriggerConfig::AddressMatch(_) => {
                    if self.triggers[slot].tdata2 != value {
                        self.triggers[slot].tdata2 = value;
                        self.remove_registrations(host, slot);
                        self.insert_registrations(host, slot);
                    }
                }
                config => {
                    self.triggers[slot].tdata2 = value;
                    self.sink.emit(Diagnostic::UnsupportedTdata {
                        ty: config.trigger_type(),
                        index,
                    });
                }
            },
            TdataIndex::Tdata3 => {
                self.triggers[slot].tdata3 = value;
                self.sink.emit(Diagnostic::UnsupportedTdata {
                    ty: self.triggers[slot].config.trigger_type(),
                    index,
                });
            }
        }
    }

    fn tdata1_write<H: TriggerHost + ?Sized>(&mut self, host: &mut H, slot: usize, value: u64) {
        let xlen = self.xlen();
        let Tdata1Write::Store(new) = Validator::new(xlen, self.sink.as_ref()).tdata1(value) else {
            return;
        };
        let deterministic = host.icount_enabled();
        let is_icount = matches!(
            TriggerConfig::decode(xlen, new),
            TriggerConfig::InstructionCount(_)
        );
        // A deterministic count in `tdata1` lags until the next accounting
        // pass, so an equal value still re-arms the countdown.
        if new == self.triggers[slot].tdata1 && !(deterministic && is_icount) {
            return;
        }
        log::trace!("trigger {slot}: tdata1 0x{new:x}");

        if deterministic && is_icount {
            // Account for instructions retired under the previous snapshot
            // before it is replaced. A trigger expiring here raises its
            // exception, which is taken after this write completes.
            if self.update_icount(host) {
                log::trace!("trigger {slot}: tdata1 write completes before the pending trap");
            }
        }

        self.remove_registrations(host, slot);
        if let Some(timer) = self.triggers[slot].timer {
            host.timer_del(timer);
        }
        self.triggers[slot].set_tdata1(xlen, new);

        match self.triggers[slot].config {
            TriggerConfig::AddressMatch(_) => self.insert_registrations(host, slot),
            TriggerConfig::InstructionCount(ic) if deterministic => {
                self.last_icount = host.icount_get_raw();
                if let Some(timer) = self.triggers[slot].timer.filter(|_| ic.count != 0) {
                    host.timer_mod(timer, self.last_icount + u64::from(ic.count));
                }
            }
            TriggerConfig::InstructionCount(_) | TriggerConfig::Unsupported(_) => {}
        }
        self.refresh_itrigger_enabled(host);
    }

    pub fn tinfo_read(&self) -> u64 {
        trigger::tinfo()
    }

    pub fn mcontext_read(&self) -> u64 {
        self.mcontext
    }

    pub fn mcontext_write(&mut self, value: u64) {
        self.mcontext = value & self.config.mcontext_mask();
    }

    /// Whether `index` is meaningful for the selected trigger's type.
    pub fn tdata_available(&self, index: TdataIndex) -> bool {
        trigger::tdata_available(self.selected().config.trigger_type(), index)
    }

    pub fn csr_read<H: TriggerHost + ?Sized>(&self, host: &H, csr: Csr) -> u64 {
        match csr {
            Csr::Tselect => self.tselect_read(),
            Csr::Tdata1 | Csr::Tdata2 | Csr::Tdata3 => match csr.tdata_index() {
                Some(index) => self.tdata_read(host, index),
                None => 0,
            },
            Csr::Tinfo => self.tinfo_read(),
            Csr::Mcontext => self.mcontext_read(),
        }
    }

    pub fn csr_write<H: TriggerHost + ?Sized>(&mut self, host: &mut H, csr: Csr, value: u64) {
        match csr {
            Csr::Tselect => self.tselect_write(value),
            Csr::Tdata1 | Csr::Tdata2 | Csr::Tdata3 => {
                if let Some(index) = csr.tdata_index() {
                    self.tdata_write(host, index, value);
                }
            }
            // Read only, writes are ignored.
            Csr::Tinfo => log::trace!("ignoring tinfo write 0x{value:x}"),
            Csr::Mcontext => self.mcontext_write(value),
        }
    }
}
