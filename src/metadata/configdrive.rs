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

//! Metadata service backed by a config drive.

use slog::{debug, Logger};

use super::registry::resolve_registry_endpoint;
use super::schema::{Contents, Metadata, UserData, METADATA_DOCUMENT, USERDATA_DOCUMENT};
use super::MetadataService;
use crate::dns::DnsResolver;
use crate::errors::{MetadataError, Result};
use crate::platform::DiskReader;

/// Config-drive metadata service.
///
/// Both documents are read through the disk reader, which decides which of
/// the candidate disks is live.
pub struct ConfigDriveMetadataService {
    resolver: Box<dyn DnsResolver>,
    disk_reader: Box<dyn DiskReader>,
    disks: Vec<String>,
    metadata_path: String,
    userdata_path: String,
    log: Logger,
    /// Documents of the last successful load.
    contents: Option<Contents>,
}

impl ConfigDriveMetadataService {
    pub fn new(
        resolver: Box<dyn DnsResolver>,
        disk_reader: Box<dyn DiskReader>,
        disks: Vec<String>,
        metadata_path: impl Into<String>,
        userdata_path: impl Into<String>,
        log: Logger,
    ) -> Self {
        Self {
            resolver,
            disk_reader,
            disks,
            metadata_path: metadata_path.into(),
            userdata_path: userdata_path.into(),
            log,
            contents: None,
        }
    }

    fn read_document(&self, path: &str, document: &'static str) -> Result<Vec<u8>> {
        debug!(self.log, "reading config-drive document";
            "document" => document, "path" => path, "disks" => ?self.disks);
        self.disk_reader
            .read_file_from_candidate_disks(&self.disks, path)
            .map_err(|cause| MetadataError::DiskRead { document, cause })
    }

    fn loaded(&self) -> Result<&Contents> {
        self.contents.as_ref().ok_or(MetadataError::NotLoaded)
    }
}

impl MetadataService for ConfigDriveMetadataService {
    fn load(&mut self) -> Result<()> {
        let metadata = self.read_document(&self.metadata_path, METADATA_DOCUMENT)?;
        let metadata = Metadata::from_slice(&metadata)?;
        let userdata = self.read_document(&self.userdata_path, USERDATA_DOCUMENT)?;
        let userdata = UserData::from_slice(&userdata)?;

        self.contents = Some(Contents { metadata, userdata });
        debug!(self.log, "config-drive metadata loaded");
        Ok(())
    }

    fn public_key(&self) -> Result<String> {
        self.loaded()?.public_key()
    }

    fn instance_id(&self) -> Result<String> {
        self.loaded()?.instance_id()
    }

    fn server_name(&self) -> Result<String> {
        self.loaded()?.server_name()
    }

    fn registry_endpoint(&self) -> Result<String> {
        resolve_registry_endpoint(&self.log, self.loaded()?, self.resolver.as_ref())
    }
}
