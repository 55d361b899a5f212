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

use std::path::PathBuf;

use crate::{csr::Xlen, replay::Scenario};

/// Replay RISC-V debug trigger scenarios
#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Increase log verbosity. Repeat for more detail.
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Register width, overriding the scenario's.
    #[arg(long, value_enum)]
    pub xlen: Option<Xlen>,
    /// Use deterministic instruction counting, overriding the scenario's
    /// setting.
    #[arg(long)]
    pub icount: bool,
    /// Implement the hypervisor extension, overriding the scenario's setting.
    #[arg(long)]
    pub hypervisor: bool,

    /// Path to a JSON scenario.
    #[arg(value_name = "SCENARIO")]
    pub scenario: PathBuf,
}

impl Args {
    /// Parse command-line arguments from the process environment.
    pub fn parse() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Log level selected by `-v` repetitions.
    pub const fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }

    /// Read the scenario file and apply command line overrides to it.
    pub fn load_scenario(&self) -> Result<Scenario, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(&self.scenario).map_err(|err| {
            format!(
                "Could not read scenario from path {}: {err}",
                self.scenario.display()
            )
        })?;
        let mut scenario = Scenario::from_json(&contents).map_err(|err| {
            format!(
                "Could not parse scenario {}: {err}",
                self.scenario.display()
            )
        })?;
        self.apply(&mut scenario);
        Ok(scenario)
    }

    fn apply(&self, scenario: &mut Scenario) {
        if let Some(xlen) = self.xlen {
            scenario.config.xlen = xlen;
        }
        scenario.icount |= self.icount;
        scenario.config.hypervisor |= self.hypervisor;
    }
}
