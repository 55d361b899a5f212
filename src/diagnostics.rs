// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the sdtrig project.

//! Diagnostics for guest writes the trigger module does not honour.
//!
//! Guest accesses to trigger registers never fail. When a write asks for
//! something that is not implemented, or is simply wrong, the module reports a
//! [`Diagnostic`] to its [`DiagnosticsSink`] and carries on.

use std::sync::{Arc, Mutex};

use crate::{
    csr::TdataIndex,
    trigger::{TriggerAction, TriggerType},
};

/// Log target of [`Severity::Unimplemented`] diagnostics.
pub const UNIMP_TARGET: &str = "sdtrig::unimp";
/// Log target of [`Severity::GuestError`] diagnostics.
pub const GUEST_ERROR_TARGET: &str = "sdtrig::guest_errors";

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Severity {
    /// The guest used an architectural feature that is not implemented.
    Unimplemented,
    /// The guest did something architecturally meaningless.
    GuestError,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Diagnostic {
    /// A `tdata1` write asked for a type other than the one being validated.
    TypeWriteIgnored {
        requested: TriggerType,
        kept: TriggerType,
    },
    /// A `tdata1` write set `dmode`.
    DebugModeUnsupported,
    /// A field that always reads as zero was written with a non-zero value.
    AlwaysZeroField {
        ty: TriggerType,
        field: &'static str,
    },
    /// An address match trigger asked for an access size that is not implemented.
    UnsupportedSize { ty: TriggerType, code: u8 },
    /// A `tdataN` register that the trigger type does not implement was written.
    UnsupportedTdata { ty: TriggerType, index: TdataIndex },
    /// A trigger type that exists architecturally but is not implemented.
    UnsupportedTriggerType { ty: TriggerType, tag: u8 },
    /// A trigger type that does not exist.
    NonexistentTriggerType { tag: u8 },
    /// `tselect` was written with an index past the last trigger.
    InvalidTriggerSelect { index: u64 },
    /// A trigger fired with an action that is not implemented.
    UnsupportedAction { slot: usize, action: TriggerAction },
}

impl Diagnostic {
    pub const fn severity(&self) -> Severity {
        match self {
            Self::TypeWriteIgnored { .. }
            | Self::NonexistentTriggerType { .. }
            | Self::InvalidTriggerSelect { .. } => Severity::GuestError,
            Self::DebugModeUnsupported
            | Self::AlwaysZeroField { .. }
            | Self::UnsupportedSize { .. }
            | Self::UnsupportedTdata { .. }
            | Self::UnsupportedTriggerType { .. }
            | Self::UnsupportedAction { .. } => Severity::Unimplemented,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::TypeWriteIgnored { requested, kept } => write!(
                fmt,
                "ignoring type write to tdata1 register: requested {requested}, keeping {kept}"
            ),
            Self::DebugModeUnsupported => write!(fmt, "debug mode is not supported"),
            Self::AlwaysZeroField { ty, field } => {
                write!(fmt, "{ty} {field} field is always zero")
            }
            Self::UnsupportedSize { ty, code } => write!(
                fmt,
                "{ty} access size {code} is not supported, using SIZE_ANY"
            ),
            Self::UnsupportedTdata { ty, index } => {
                write!(fmt, "{index} is not supported for {ty} trigger")
            }
            Self::UnsupportedTriggerType { ty, tag } => {
                write!(fmt, "trigger type {tag} ({ty}) is not supported")
            }
            Self::NonexistentTriggerType { tag } => {
                write!(fmt, "trigger type {tag} does not exist")
            }
            Self::InvalidTriggerSelect { index } => write!(
                fmt,
                "tselect value {index} is out of range, {} triggers implemented",
                crate::RV_MAX_TRIGGERS
            ),
            Self::UnsupportedAction { slot, action } => {
                write!(fmt, "trigger {slot}: action {action} is not supported")
            }
        }
    }
}

/// Receiver of trigger module diagnostics.
pub trait DiagnosticsSink: std::fmt::Debug + Send {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the [`log`] facade.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogSink;

impl DiagnosticsSink for LogSink {
    fn emit(&self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Unimplemented => log::warn!(target: UNIMP_TARGET, "{diagnostic}"),
            Severity::GuestError => log::warn!(target: GUEST_ERROR_TARGET, "{diagnostic}"),
        }
    }
}

/// Keeps every diagnostic it receives, and logs it like [`LogSink`]. Clones
/// share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    diagnostics: Arc<Mutex<Vec<Diagnostic>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the diagnostics received so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.lock())
    }

    /// Returns a copy of the diagnostics received so far.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Diagnostic>> {
        // A panic while holding the lock cannot leave the buffer inconsistent.
        self.diagnostics
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl DiagnosticsSink for RecordingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        LogSink.emit(diagnostic.clone());
        self.lock().push(diagnostic);
    }
}
