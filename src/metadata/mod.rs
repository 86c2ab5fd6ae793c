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

//! Metadata services
//!
//! A metadata service tells the agent who it is (instance ID, server name,
//! SSH key) and where its registry lives. Each service knows where its
//! documents come from; externally, they all offer the same accessors through
//! [`MetadataService`] and are built from a [`MetadataSource`].

use anyhow::{Context, Result};
use slog::Logger;
use slog_scope::warn;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::dns::DnsResolver;
use crate::errors::{self, MetadataError};
use crate::network;
use crate::platform::MountingDiskReader;

pub mod configdrive;
pub mod file;
mod registry;
pub mod schema;

#[cfg(test)]
mod mock_tests;

pub use self::configdrive::ConfigDriveMetadataService;
pub use self::file::FileMetadataService;

/// Default location of the metadata document on an OpenStack-style drive.
pub const DEFAULT_METADATA_PATH: &str = "openstack/latest/meta_data.json";
/// Default location of the user-data document on an OpenStack-style drive.
pub const DEFAULT_USERDATA_PATH: &str = "openstack/latest/user_data";

/// Prefix of every attribute key.
const ATTRIBUTE_PREFIX: &str = "CONFIGDRIVE_";

pub trait MetadataService {
    /// (Re-)read the backing documents, replacing previously loaded ones only
    /// if both documents are read and parsed.
    fn load(&mut self) -> errors::Result<()>;

    fn public_key(&self) -> errors::Result<String>;
    fn instance_id(&self) -> errors::Result<String>;
    fn server_name(&self) -> errors::Result<String>;
    fn registry_endpoint(&self) -> errors::Result<String>;

    /// Network topology; services without one report an empty list.
    fn networks(&self) -> errors::Result<Vec<network::Interface>> {
        Ok(vec![])
    }
}

/// Where a metadata service gets its documents from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetadataSource {
    /// Documents on a config drive, found among candidate disks.
    ConfigDrive {
        disks: Vec<String>,
        metadata_path: String,
        userdata_path: String,
        fstype: String,
    },
    /// Documents on the local filesystem.
    File {
        metadata_path: PathBuf,
        userdata_path: PathBuf,
    },
}

/// Build the metadata service for `source`.
///
/// The returned service is not loaded yet.
pub fn new_metadata_service(
    source: MetadataSource,
    resolver: Box<dyn DnsResolver>,
    log: Logger,
) -> Box<dyn MetadataService> {
    match source {
        MetadataSource::ConfigDrive {
            disks,
            metadata_path,
            userdata_path,
            fstype,
        } => Box::new(ConfigDriveMetadataService::new(
            resolver,
            Box::new(MountingDiskReader::new().fstype(fstype)),
            disks,
            metadata_path,
            userdata_path,
            log,
        )),
        MetadataSource::File {
            metadata_path,
            userdata_path,
        } => Box::new(FileMetadataService::new(
            resolver,
            metadata_path,
            userdata_path,
            log,
        )),
    }
}

/// Collect every available datum of a loaded service as flat attributes.
///
/// Missing fields are skipped; any other failure is returned.
pub fn attributes(service: &dyn MetadataService) -> errors::Result<HashMap<String, String>> {
    let mut out = HashMap::with_capacity(4);
    let getters: [(&str, fn(&dyn MetadataService) -> errors::Result<String>); 4] = [
        ("INSTANCE_ID", |s| s.instance_id()),
        ("SERVER_NAME", |s| s.server_name()),
        ("PUBLIC_KEY", |s| s.public_key()),
        ("REGISTRY_ENDPOINT", |s| s.registry_endpoint()),
    ];
    for (key, get) in getters {
        match get(service) {
            Ok(value) => {
                out.insert(format!("{ATTRIBUTE_PREFIX}{key}"), value);
            }
            Err(MetadataError::MissingField(field)) => {
                warn!("skipping attribute {}: no {} in metadata", key, field);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

/// Render attributes as sorted `KEY=VALUE` lines.
pub fn render_attributes(attrs: &HashMap<String, String>) -> String {
    let mut keys: Vec<&String> = attrs.keys().collect();
    keys.sort();
    keys.into_iter()
        .map(|k| format!("{}={}\n", k, attrs[k]))
        .collect()
}

/// Write the attributes of a loaded service into `path`.
pub fn write_attributes(service: &dyn MetadataService, path: &Path) -> Result<()> {
    let attrs = attributes(service).context("collecting metadata attributes")?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
        }
    }

    let file = File::create(path)
        .with_context(|| format!("failed to create file '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(render_attributes(&attrs).as_bytes())
        .and_then(|_| writer.flush())
        .with_context(|| format!("failed to write attributes to '{}'", path.display()))?;
    Ok(())
}
