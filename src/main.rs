// Copyright 2017 CoreOS, Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::{Context, Result};
use slog::Drain;
use slog_scope::{debug, error};

mod cli;

fn main() {
    let cfg = match cli::parse_args(std::env::args()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    };

    // setup logging
    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog::LevelFilter::new(drain, cfg.log_level()).fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let log = slog::Logger::root(drain, slog::o!());
    let log_guard = slog_scope::set_global_logger(log);

    debug!("Logging initialized");

    if let Err(e) = run(cfg) {
        error!("error: {:#}", e);
        // flush the async drain before exiting
        drop(log_guard);
        std::process::exit(1);
    }
}

fn run(cfg: cli::CliConfig) -> Result<()> {
    cfg.run().context("running configdrive-metadata")
}
