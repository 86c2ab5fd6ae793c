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

//! Command-line arguments parsing.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use configdrive_metadata::dns::{DnsResolver, NameserverDnsResolver, NoopDnsResolver};
use configdrive_metadata::metadata;
use configdrive_metadata::MetadataSource;
use slog_scope::{debug, trace};
use std::path::Path;
use std::time::Duration;

mod configdrive;
mod file;

#[derive(Debug, Parser)]
#[clap(display_name = "configdrive-metadata")]
#[clap(version, propagate_version = true)]
pub(crate) struct CliConfig {
    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    cmd: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    ConfigDrive(configdrive::CliConfigDrive),
    File(file::CliFile),
}

/// Output and resolution options shared by every source.
#[derive(Debug, Args)]
struct CliOutput {
    /// The file into which the metadata attributes are written
    #[arg(long = "attributes", value_name = "path")]
    attributes_file: Option<String>,
    /// Report the registry endpoint as written, without DNS override
    #[arg(long)]
    no_resolve: bool,
    /// Timeout for each query to a user-data nameserver, in seconds
    #[arg(long, value_name = "secs", default_value_t = 1)]
    dns_timeout: u8,
}

impl CliConfig {
    /// Run the relevant CLI sub-command.
    pub fn run(self) -> Result<()> {
        let (source, output) = match self.cmd {
            CliCommand::ConfigDrive(cmd) => cmd.into_source(),
            CliCommand::File(cmd) => cmd.into_source(),
        };
        output.run(source)
    }

    /// Log level selected by the verbosity flag.
    pub fn log_level(&self) -> slog::Level {
        match self.verbose {
            0 => slog::Level::Info,
            1 => slog::Level::Debug,
            _ => slog::Level::Trace,
        }
    }
}

impl CliOutput {
    fn resolver(&self) -> Box<dyn DnsResolver> {
        if self.no_resolve {
            Box::new(NoopDnsResolver)
        } else {
            let timeout = Duration::from_secs(u64::from(self.dns_timeout));
            Box::new(NameserverDnsResolver::new().timeout(timeout))
        }
    }

    fn run(self, source: MetadataSource) -> Result<()> {
        debug!("metadata source - {:?}", source);
        let mut service =
            configdrive_metadata::new_metadata_service(source, self.resolver(), slog_scope::logger());
        service.load().context("loading metadata")?;

        match self.attributes_file {
            Some(path) => metadata::write_attributes(&*service, Path::new(&path))
                .context("writing metadata attributes")?,
            None => {
                let attrs = metadata::attributes(&*service)
                    .context("collecting metadata attributes")?;
                print!("{}", metadata::render_attributes(&attrs));
            }
        }
        Ok(())
    }
}

/// Parse command-line arguments into CLI configuration.
pub(crate) fn parse_args(argv: impl IntoIterator<Item = String>) -> Result<CliConfig> {
    let cfg = match CliConfig::try_parse_from(argv) {
        Err(e) if e.kind() == clap::error::ErrorKind::DisplayHelp => e.exit(),
        Err(e) if e.kind() == clap::error::ErrorKind::DisplayVersion => e.exit(),
        v => v,
    }?;
    trace!("cli configuration - {:?}", cfg);
    Ok(cfg)
}
