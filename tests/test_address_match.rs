//
// sdtrig
//
// Copyright 2025- Manos Pitsidianakis
//
// This file is part of sdtrig.
//
// sdtrig is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// sdtrig is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with sdtrig. If not, see <http://www.gnu.org/licenses/>.
//
// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later

use sdtrig::{
    csr::{Csr, Xlen},
    diagnostics::Diagnostic,
    host::{BreakpointFlags, PrivilegeLevel},
    replay::AccessKind,
    trigger::TriggerType,
    RV_MAX_TRIGGERS,
};

#[macro_use]
mod utils;

use utils::*;

/// Reset leaves every trigger a disabled `mcontrol` trigger.
#[test_log::test]
fn test_reset_state() {
    let (mut machine, sink) = make_test_machine(Xlen::Rv64, false);
    machine.csr_write(Csr::Tdata2, 0x8000_1000);
    machine.csr_write(Csr::Tdata1, mcontrol(Xlen::Rv64, MC_M | EXECUTE));
    machine.reset();

    for slot in 0..RV_MAX_TRIGGERS {
        machine.csr_write(Csr::Tselect, slot as u64);
        assert_hex_eq!(machine.csr_read(Csr::Tdata1), 0x2000_0000_0000_0000);
        assert_hex_eq!(machine.csr_read(Csr::Tdata2), 0);
        assert_hex_eq!(machine.csr_read(Csr::Tdata3), 0);
    }
    assert_eq!(machine.host.breakpoints().count(), 0);
    assert_eq!(machine.host.watchpoints().count(), 0);
    assert!(!machine.execute(0x8000_1000));
    assert!(sink.take().is_empty());
}

/// An execute trigger armed for machine mode only.
#[test_log::test]
fn test_machine_mode_breakpoint() {
    let (mut machine, _) = make_test_machine(Xlen::Rv64, false);
    machine.csr_write(Csr::Tselect, 0);
    machine.csr_write(Csr::Tdata1, mcontrol(Xlen::Rv64, MC_M | EXECUTE));
    machine.csr_write(Csr::Tdata2, 0x8000_1000);
    assert_hex_eq!(
        machine.csr_read(Csr::Tdata1),
        mcontrol(Xlen::Rv64, MC_M | EXECUTE)
    );

    assert!(!machine.execute(0x8000_0ffc));
    assert!(machine.execute(0x8000_1000));
    assert_eq!(machine.host.take_exceptions(), [0x8000_1000]);

    machine.set_privilege(PrivilegeLevel::User, false);
    assert!(!machine.execute(0x8000_1000));
    assert!(machine.host.exceptions().is_empty());
}

/// Breakpoints and watchpoints are registered exactly when the trigger has
/// both a mode and an access kind.
#[test_log::test]
fn test_enable_predicate() {
    let modes = [0, MC_U, MC_S, MC_M, MC_U | MC_S | MC_M];
    let accesses = [0, EXECUTE, LOAD, STORE, LOAD | STORE | EXECUTE];
    let (mut machine, _) = make_test_machine(Xlen::Rv64, false);
    machine.csr_write(Csr::Tdata2, 0x4000);
    for mode in modes {
        for access in accesses {
            machine.csr_write(Csr::Tdata1, mcontrol(Xlen::Rv64, mode | access));
            let registered =
                machine.host.breakpoints().count() + machine.host.watchpoints().count();
            let expected = match (mode, access) {
                (0, _) | (_, 0) => 0,
                (_, EXECUTE) | (_, LOAD) | (_, STORE) => 1,
                _ => 2,
            };
            assert_eq!(registered, expected, "mode {mode:#x} access {access:#x}");
        }
    }
}

/// Rewriting `tdata2` moves the registration instead of adding one.
#[test_log::test]
fn test_tdata2_reregistration() {
    let (mut machine, _) = make_test_machine(Xlen::Rv64, false);
    machine.csr_write(Csr::Tdata1, mcontrol(Xlen::Rv64, MC_M | STORE));
    for address in [0x1000, 0x2000, 0x2000, 0x3000] {
        machine.csr_write(Csr::Tdata2, address);
        let watchpoints = machine.host.watchpoints().collect::<Vec<_>>();
        assert_eq!(watchpoints.len(), 1);
        assert_hex_eq!(watchpoints[0].address.0, address);
    }
    assert!(!machine.access(0x2000, 8, AccessKind::Store));
    assert!(machine.access(0x3004, 4, AccessKind::Store));
    assert_eq!(machine.host.exceptions(), [0x3000]);
}

/// Unsupported size codes read back as "any" and watch a full word.
#[test_log::test]
fn test_size_fallback() {
    let (mut machine, sink) = make_test_machine(Xlen::Rv64, false);
    machine.csr_write(Csr::Tdata2, 0x9000);
    // sizehi:sizelo = 0b100, the 48-bit encoding
    machine.csr_write(
        Csr::Tdata1,
        mcontrol(Xlen::Rv64, MC_M | LOAD | (1 << 21)),
    );
    assert_hex_eq!(machine.csr_read(Csr::Tdata1), mcontrol(Xlen::Rv64, MC_M | LOAD));
    let watchpoints = machine.host.watchpoints().collect::<Vec<_>>();
    assert_eq!(watchpoints.len(), 1);
    assert_eq!(watchpoints[0].len, 8);
    assert_eq!(
        watchpoints[0].flags,
        BreakpointFlags::CPU | BreakpointFlags::STOP_BEFORE_ACCESS | BreakpointFlags::MEM_READ
    );
    assert_eq!(
        sink.take(),
        vec![Diagnostic::UnsupportedSize {
            ty: TriggerType::Mcontrol,
            code: 4
        }]
    );

    // A supported size watches exactly that many bytes.
    machine.csr_write(
        Csr::Tdata1,
        mcontrol(Xlen::Rv64, MC_M | LOAD | (2 << 16)),
    );
    let watchpoints = machine.host.watchpoints().collect::<Vec<_>>();
    assert_eq!(watchpoints.len(), 1);
    assert_eq!(watchpoints[0].len, 2);
    assert!(!machine.access(0x9002, 2, AccessKind::Load));
    assert!(machine.access(0x9001, 1, AccessKind::Load));
}

/// `mcontrol` never fires while virtualized, `mcontrol6` uses its VU/VS bits.
#[test_log::test]
fn test_virtualized_modes() {
    let (mut machine, _) = make_test_machine(Xlen::Rv64, false);
    machine.csr_write(Csr::Tdata1, mcontrol(Xlen::Rv64, MC_U | MC_S | EXECUTE));
    machine.csr_write(Csr::Tdata2, 0x100);
    machine.csr_write(Csr::Tselect, 1);
    machine.csr_write(Csr::Tdata1, mcontrol6(Xlen::Rv64, MC6_VS | EXECUTE));
    machine.csr_write(Csr::Tdata2, 0x200);

    machine.set_privilege(PrivilegeLevel::Supervisor, false);
    assert!(machine.execute(0x100));
    assert!(!machine.execute(0x200));

    machine.set_privilege(PrivilegeLevel::Supervisor, true);
    assert!(!machine.execute(0x100));
    assert!(machine.execute(0x200));

    machine.set_privilege(PrivilegeLevel::User, true);
    assert!(!machine.execute(0x100));
    assert!(!machine.execute(0x200));

    assert_eq!(machine.host.exceptions(), [0x100, 0x200]);
}

/// Two triggers on the same address raise a single exception.
#[test_log::test]
fn test_shared_address() {
    let (mut machine, _) = make_test_machine(Xlen::Rv32, false);
    for slot in 0..2 {
        machine.csr_write(Csr::Tselect, slot);
        machine.csr_write(Csr::Tdata1, mcontrol(Xlen::Rv32, MC_M | EXECUTE | STORE));
        machine.csr_write(Csr::Tdata2, 0x8000_0000);
    }
    assert_eq!(machine.host.breakpoints().count(), 2);
    assert_eq!(machine.host.watchpoints().count(), 2);
    assert_eq!(machine.host.watchpoints().map(|wp| wp.len).max(), Some(4));
    assert!(machine.execute(0x8000_0000));
    assert_eq!(machine.host.take_exceptions(), [0x8000_0000]);
    assert!(machine.access(0x8000_0000, 4, AccessKind::Store));
    assert_eq!(machine.host.take_exceptions(), [0x8000_0000]);
}
