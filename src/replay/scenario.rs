// SPDX-License-Identifier: EUPL-1.2 OR GPL-3.0-or-later
// Copyright Contributors to the sdtrig project.

//! JSON scenarios for [`Machine`].
//!
//! ```json
//! {
//!   "config": { "xlen": "rv64" },
//!   "icount": false,
//!   "steps": [
//!     { "op": "csr_write", "csr": "tdata2", "value": "0x80000000" },
//!     { "op": "csr_write", "csr": "tdata1", "value": "0x2000000000000044" },
//!     { "op": "execute", "pc": "0x80000000" },
//!     { "op": "expect_exceptions", "tvals": ["0x80000000"] }
//!   ]
//! }
//! ```

use serde_derive::{Deserialize, Serialize};

use super::{AccessKind, Machine};
use crate::{
    config::DebugConfig,
    csr::Csr,
    diagnostics::RecordingSink,
    host::PrivilegeLevel,
};

/// A register value, written either as a JSON number or as a decimal or
/// `0x` prefixed hexadecimal string.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawValue", into = "u64")]
pub struct Value(pub u64);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(u64),
    Text(String),
}

impl TryFrom<RawValue> for Value {
    type Error = String;

    fn try_from(raw: RawValue) -> Result<Self, Self::Error> {
        const HEX_PREFIX: &str = "0x";
        const HEX_PREFIX_UPPER: &str = "0X";

        let s = match raw {
            RawValue::Number(n) => return Ok(Self(n)),
            RawValue::Text(s) => s,
        };
        let digits = s.replace('_', "");
        let result = match digits
            .strip_prefix(HEX_PREFIX)
            .or_else(|| digits.strip_prefix(HEX_PREFIX_UPPER))
        {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => digits.parse::<u64>(),
        };
        result
            .map(Self)
            .map_err(|err| format!("invalid value {s:?}: {err}"))
    }
}

impl From<Value> for u64 {
    fn from(value: Value) -> Self {
        value.0
    }
}

fn default_access_len() -> u64 {
    1
}

/// One step of a scenario.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    CsrWrite {
        csr: Csr,
        value: Value,
    },
    /// Read a CSR, optionally checking the value read.
    CsrRead {
        csr: Csr,
        #[serde(default)]
        expect: Option<Value>,
    },
    Retire {
        count: u64,
    },
    Privilege {
        level: PrivilegeLevel,
        #[serde(default)]
        virt: bool,
    },
    Execute {
        pc: Value,
    },
    Load {
        address: Value,
        #[serde(default = "default_access_len")]
        len: u64,
    },
    Store {
        address: Value,
        #[serde(default = "default_access_len")]
        len: u64,
    },
    /// Check the trap values of the breakpoint exceptions raised since the
    /// previous check.
    ExpectExceptions {
        tvals: Vec<Value>,
    },
    Reset,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub config: DebugConfig,
    /// Deterministic instruction counting.
    #[serde(default)]
    pub icount: bool,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_json(s: &str) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(serde_json::from_str(s)?)
    }
}

/// A CSR read performed by a scenario.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CsrReadout {
    pub step: usize,
    pub csr: Csr,
    pub value: u64,
}

/// Outcome of a successful scenario run.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Report {
    pub steps: usize,
    pub reads: Vec<CsrReadout>,
    /// Trap values of every breakpoint exception raised during the run.
    pub exceptions: Vec<u64>,
    pub diagnostics: Vec<String>,
}

/// Run `scenario` on a freshly reset [`Machine`].
///
/// Fails on the first `csr_read` or `expect_exceptions` step whose
/// expectation does not hold.
pub fn run_scenario(scenario: &Scenario) -> Result<Report, Box<dyn std::error::Error>> {
    let sink = RecordingSink::new();
    let mut machine = Machine::with_sink(scenario.config, scenario.icount, Box::new(sink.clone()));
    let mut report = Report::default();
    // Exceptions not yet checked by an `expect_exceptions` step.
    let mut unchecked = Vec::new();

    for (i, step) in scenario.steps.iter().enumerate() {
        log::trace!("step {i}: {step:?}");
        match *step {
            Step::CsrWrite { csr, value } => machine.csr_write(csr, value.0),
            Step::CsrRead { csr, expect } => {
                let value = machine.csr_read(csr);
                if let Some(Value(expected)) = expect {
                    if value != expected {
                        return Err(format!(
                            "step {i}: {csr} read 0x{value:x}, expected 0x{expected:x}"
                        )
                        .into());
                    }
                }
                report.reads.push(CsrReadout {
                    step: i,
                    csr,
                    value,
                });
            }
            Step::Retire { count } => {
                machine.retire(count);
            }
            Step::Privilege { level, virt } => {
                machine.set_privilege(level, virt);
            }
            Step::Execute { pc } => {
                machine.execute(pc.0);
            }
            Step::Load { address, len } => {
                machine.access(address.0, len, AccessKind::Load);
            }
            Step::Store { address, len } => {
                machine.access(address.0, len, AccessKind::Store);
            }
            Step::ExpectExceptions { ref tvals } => {
                unchecked.extend(machine.host.take_exceptions());
                let expected = tvals.iter().map(|v| v.0).collect::<Vec<u64>>();
                if unchecked != expected {
                    return Err(format!(
                        "step {i}: breakpoint exceptions {}, expected {}",
                        format_tvals(&unchecked),
                        format_tvals(&expected)
                    )
                    .into());
                }
                report.exceptions.append(&mut unchecked);
            }
            Step::Reset => machine.reset(),
        }
        unchecked.extend(machine.host.take_exceptions());
    }

    report.steps = scenario.steps.len();
    report.exceptions.append(&mut unchecked);
    report.diagnostics = sink.take().iter().map(ToString::to_string).collect();
    Ok(report)
}

fn format_tvals(tvals: &[u64]) -> String {
    let tvals = tvals
        .iter()
        .map(|tval| format!("0x{tval:x}"))
        .collect::<Vec<_>>();
    format!("[{}]", tvals.join(", "))
}
