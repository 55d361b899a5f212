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

use sdtrig::{cli::Args, replay::run_scenario};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    env_logger::builder()
        .filter_level(args.log_level())
        .parse_default_env()
        .init();

    let scenario = args.load_scenario()?;
    log::info!(
        "running {} steps, xlen {:?}, deterministic icount: {}",
        scenario.steps.len(),
        scenario.config.xlen,
        scenario.icount
    );
    let report = run_scenario(&scenario)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
