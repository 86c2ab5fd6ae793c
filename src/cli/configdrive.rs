//! `config-drive` CLI sub-command.

use clap::Parser;
use configdrive_metadata::metadata::{DEFAULT_METADATA_PATH, DEFAULT_USERDATA_PATH};
use configdrive_metadata::platform::DEFAULT_FSTYPE;
use configdrive_metadata::MetadataSource;

use super::CliOutput;

/// Read metadata from a config drive among candidate disks
#[derive(Debug, Parser)]
pub struct CliConfigDrive {
    /// Candidate disk (or already mounted directory), probed in order
    #[arg(
        long = "disk",
        value_name = "path",
        default_values_t = [
            "/dev/disk/by-label/config-2".to_string(),
            "/dev/disk/by-label/CONFIG-2".to_string(),
        ]
    )]
    disks: Vec<String>,
    /// Path of the metadata document, relative to the drive root
    #[arg(long, value_name = "path", default_value = DEFAULT_METADATA_PATH)]
    metadata_path: String,
    /// Path of the user-data document, relative to the drive root
    #[arg(long, value_name = "path", default_value = DEFAULT_USERDATA_PATH)]
    userdata_path: String,
    /// Filesystem type used to mount candidate disks
    #[arg(long, value_name = "type", default_value = DEFAULT_FSTYPE)]
    fstype: String,
    #[command(flatten)]
    output: CliOutput,
}

impl CliConfigDrive {
    pub(super) fn into_source(self) -> (MetadataSource, CliOutput) {
        let source = MetadataSource::ConfigDrive {
            disks: self.disks,
            metadata_path: self.metadata_path,
            userdata_path: self.userdata_path,
            fstype: self.fstype,
        };
        (source, self.output)
    }
}
