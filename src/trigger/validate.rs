// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the sdtrig project.

//! Normalization of guest `tdata1` writes.
//!
//! Writes are never rejected. The validator keeps the fields that are
//! implemented, zeroes the rest and reports every dropped request to the
//! [`DiagnosticsSink`].

use bilge::prelude::*;

use super::{
    build_tdata1, extract_dmode, extract_trigger_type, Icount, Mcontrol, Mcontrol6, SizeCode,
    TriggerType,
};
use crate::{
    csr::Xlen,
    diagnostics::{Diagnostic, DiagnosticsSink},
};

/// Outcome of validating a `tdata1` write.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Tdata1Write {
    /// Store this normalized value.
    Store(u64),
    /// Drop the write and keep the previous value.
    Ignore,
}

#[derive(Copy, Clone, Debug)]
pub struct Validator<'a> {
    xlen: Xlen,
    sink: &'a dyn DiagnosticsSink,
}

impl<'a> Validator<'a> {
    pub fn new(xlen: Xlen, sink: &'a dyn DiagnosticsSink) -> Self {
        Self { xlen, sink }
    }

    /// Validate a `tdata1` write, dispatching on the type it requests.
    pub fn tdata1(&self, val: u64) -> Tdata1Write {
        let ty = extract_trigger_type(self.xlen, val);
        match ty {
            TriggerType::Mcontrol | TriggerType::Mcontrol6 | TriggerType::Icount => {
                Tdata1Write::Store(self.validate_as(ty, val))
            }
            TriggerType::Itrigger | TriggerType::Etrigger | TriggerType::Tmexttrigger => {
                self.sink.emit(Diagnostic::UnsupportedTriggerType { ty, tag: ty.tag() });
                Tdata1Write::Store(val & self.xlen.mask())
            }
            TriggerType::NoExist | TriggerType::Unavailable => {
                self.sink
                    .emit(Diagnostic::NonexistentTriggerType { tag: ty.tag() });
                Tdata1Write::Store(val & self.xlen.mask())
            }
            TriggerType::Legacy | TriggerType::Reserved => {
                let tag = get_tag(self.xlen, val);
                self.sink.emit(Diagnostic::NonexistentTriggerType { tag });
                Tdata1Write::Ignore
            }
        }
    }

    /// Validate `val` as a write for a trigger of type `ty`, whatever type it
    /// claims to be.
    pub fn validate_as(&self, ty: TriggerType, val: u64) -> u64 {
        match ty {
            TriggerType::Mcontrol => self.mcontrol(val),
            TriggerType::Mcontrol6 => self.mcontrol6(val),
            TriggerType::Icount => self.icount(val),
            _ => self.generic(ty, val),
        }
    }

    /// Returns a `tdata1` carrying only the type tag `ty` with `dmode` clear.
    fn generic(&self, ty: TriggerType, val: u64) -> u64 {
        let requested = extract_trigger_type(self.xlen, val);
        if requested != ty {
            self.sink.emit(Diagnostic::TypeWriteIgnored {
                requested,
                kept: ty,
            });
        }
        if extract_dmode(self.xlen, val) {
            self.sink.emit(Diagnostic::DebugModeUnsupported);
        }
        build_tdata1(self.xlen, ty, false, 0)
    }

    fn warn_always_zero(&self, ty: TriggerType, field: &'static str, set: bool) {
        if set {
            self.sink.emit(Diagnostic::AlwaysZeroField { ty, field });
        }
    }

    fn check_size(&self, ty: TriggerType, size: SizeCode) -> bool {
        if size.is_supported() {
            return true;
        }
        self.sink
            .emit(Diagnostic::UnsupportedSize { ty, code: size.0 });
        false
    }

    fn mcontrol(&self, val: u64) -> u64 {
        let ty = TriggerType::Mcontrol;
        let head = self.generic(ty, val);
        let ctrl = Mcontrol::from(val as u32);
        self.warn_always_zero(ty, "match", ctrl.match_type().value() != 0);
        self.warn_always_zero(ty, "chain", ctrl.chain());
        self.warn_always_zero(ty, "action", ctrl.action().value() != 0);
        self.warn_always_zero(ty, "timing", ctrl.timing());
        self.warn_always_zero(ty, "select", ctrl.select());
        self.warn_always_zero(ty, "hit", ctrl.hit());

        let mut kept = Mcontrol::default();
        if self.check_size(ty, ctrl.size(self.xlen)) {
            kept.set_sizelo(ctrl.sizelo());
            if self.xlen != Xlen::Rv32 {
                kept.set_sizehi(ctrl.sizehi());
            }
        }
        kept.set_u(ctrl.u());
        kept.set_s(ctrl.s());
        kept.set_m(ctrl.m());
        kept.set_load(ctrl.load());
        kept.set_store(ctrl.store());
        kept.set_execute(ctrl.execute());
        head | u64::from(u32::from(kept))
    }

    fn mcontrol6(&self, val: u64) -> u64 {
        let ty = TriggerType::Mcontrol6;
        let head = self.generic(ty, val);
        let ctrl = Mcontrol6::from(val as u32);
        self.warn_always_zero(ty, "match", ctrl.match_type().value() != 0);
        self.warn_always_zero(ty, "chain", ctrl.chain());
        self.warn_always_zero(ty, "action", ctrl.action().value() != 0);
        self.warn_always_zero(ty, "timing", ctrl.timing());
        self.warn_always_zero(ty, "select", ctrl.select());
        self.warn_always_zero(ty, "hit", ctrl.hit0());

        let mut kept = Mcontrol6::default();
        if self.check_size(ty, ctrl.size_code()) {
            kept.set_size(ctrl.size());
        }
        kept.set_vu(ctrl.vu());
        kept.set_vs(ctrl.vs());
        kept.set_u(ctrl.u());
        kept.set_s(ctrl.s());
        kept.set_m(ctrl.m());
        kept.set_load(ctrl.load());
        kept.set_store(ctrl.store());
        kept.set_execute(ctrl.execute());
        head | u64::from(u32::from(kept))
    }

    fn icount(&self, val: u64) -> u64 {
        let ty = TriggerType::Icount;
        let head = self.generic(ty, val);
        let ctrl = Icount::from(val as u32);
        self.warn_always_zero(ty, "action", ctrl.action().value() != 0);
        self.warn_always_zero(ty, "hit", ctrl.hit());
        self.warn_always_zero(ty, "pending", ctrl.pending());

        let mut kept = Icount::default();
        kept.set_vu(ctrl.vu());
        kept.set_vs(ctrl.vs());
        kept.set_u(ctrl.u());
        kept.set_s(ctrl.s());
        kept.set_m(ctrl.m());
        kept.set_count(ctrl.count());
        head | u64::from(u32::from(kept))
    }
}

fn get_tag(xlen: Xlen, val: u64) -> u8 {
    crate::get_bits!(val, off = xlen.type_offset(), len = 4) as u8
}
