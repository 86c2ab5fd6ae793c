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

//! Metadata service backed by plain files, e.g. a drive unpacked by an
//! earlier boot stage.

use anyhow::Context;
use slog::{debug, Logger};
use std::path::{Path, PathBuf};

use super::registry::resolve_registry_endpoint;
use super::schema::{Contents, Metadata, UserData, METADATA_DOCUMENT, USERDATA_DOCUMENT};
use super::MetadataService;
use crate::dns::DnsResolver;
use crate::errors::{MetadataError, Result};

pub struct FileMetadataService {
    resolver: Box<dyn DnsResolver>,
    metadata_path: PathBuf,
    userdata_path: PathBuf,
    log: Logger,
    contents: Option<Contents>,
}

impl FileMetadataService {
    pub fn new(
        resolver: Box<dyn DnsResolver>,
        metadata_path: impl Into<PathBuf>,
        userdata_path: impl Into<PathBuf>,
        log: Logger,
    ) -> Self {
        Self {
            resolver,
            metadata_path: metadata_path.into(),
            userdata_path: userdata_path.into(),
            log,
            contents: None,
        }
    }

    fn loaded(&self) -> Result<&Contents> {
        self.contents.as_ref().ok_or(MetadataError::NotLoaded)
    }
}

fn read_document(path: &Path, document: &'static str) -> Result<Vec<u8>> {
    std::fs::read(path)
        .with_context(|| format!("failed to read file '{}'", path.display()))
        .map_err(|cause| MetadataError::DiskRead { document, cause })
}

impl MetadataService for FileMetadataService {
    fn load(&mut self) -> Result<()> {
        debug!(self.log, "reading metadata files";
            "metadata" => %self.metadata_path.display(),
            "userdata" => %self.userdata_path.display());
        let metadata = Metadata::from_slice(&read_document(&self.metadata_path, METADATA_DOCUMENT)?)?;
        let userdata = UserData::from_slice(&read_document(&self.userdata_path, USERDATA_DOCUMENT)?)?;

        self.contents = Some(Contents { metadata, userdata });
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
