//! `file` CLI sub-command.

use clap::Parser;
use configdrive_metadata::MetadataSource;
use std::path::PathBuf;

use super::CliOutput;

/// Read metadata from documents on the local filesystem
#[derive(Debug, Parser)]
pub struct CliFile {
    /// Path of the metadata document
    #[arg(long = "metadata", value_name = "path")]
    metadata_path: PathBuf,
    /// Path of the user-data document
    #[arg(long = "userdata", value_name = "path")]
    userdata_path: PathBuf,
    #[command(flatten)]
    output: CliOutput,
}

impl CliFile {
    pub(super) fn into_source(self) -> (MetadataSource, CliOutput) {
        let source = MetadataSource::File {
            metadata_path: self.metadata_path,
            userdata_path: self.userdata_path,
        };
        (source, self.output)
    }
}
