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

//! Platform access to candidate config-drive disks.
//!
//! The reader owns the disk loop: services hand it the whole ordered list of
//! candidates and get back the bytes from the first disk that has the file.

use anyhow::{bail, Context, Result};
use slog_scope::{debug, warn};
use std::cell::RefCell;
use std::fs;
use std::path::Path;

use crate::util::MountedDisk;

/// Default filesystem type of config drives.
pub const DEFAULT_FSTYPE: &str = "iso9660";

/// Read a file from the first candidate disk that provides it.
pub trait DiskReader {
    /// Probe `disks` in order and return the contents of `path` (relative to
    /// the drive root) from the first one that can be read.
    fn read_file_from_candidate_disks(&self, disks: &[String], path: &str) -> Result<Vec<u8>>;
}

/// Disk reader mounting each candidate read-only in turn.
///
/// A candidate that is already a directory is taken to be a mounted (or
/// unpacked) drive and read in place.
#[derive(Debug)]
pub struct MountingDiskReader {
    fstype: String,
    mount_retries: u8,
    probed: RefCell<Vec<String>>,
}

impl Default for MountingDiskReader {
    fn default() -> Self {
        Self {
            fstype: DEFAULT_FSTYPE.to_string(),
            mount_retries: 3,
            probed: RefCell::new(Vec::new()),
        }
    }
}

impl MountingDiskReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filesystem type used when mounting block devices.
    pub fn fstype(mut self, fstype: impl Into<String>) -> Self {
        self.fstype = fstype.into();
        self
    }

    /// Set how many times a failed mount is retried.
    pub fn mount_retries(mut self, retries: u8) -> Self {
        self.mount_retries = retries;
        self
    }

    /// Candidates probed by the most recent read, in probing order.
    pub fn probed_disks(&self) -> Vec<String> {
        self.probed.borrow().clone()
    }

    fn read_from_disk(&self, disk: &str, path: &str) -> Result<Vec<u8>> {
        let source = Path::new(disk);
        if source.is_dir() {
            return read_relative(source, path);
        }

        let mounted = MountedDisk::mount(source, &self.fstype, self.mount_retries)?;
        read_relative(mounted.path(), path)
    }
}

impl DiskReader for MountingDiskReader {
    fn read_file_from_candidate_disks(&self, disks: &[String], path: &str) -> Result<Vec<u8>> {
        self.probed.borrow_mut().clear();
        if disks.is_empty() {
            bail!("no candidate disks to read '{}' from", path);
        }

        let mut failures = Vec::with_capacity(disks.len());
        for disk in disks {
            self.probed.borrow_mut().push(disk.clone());
            debug!("reading '{}' from candidate disk '{}'", path, disk);
            match self.read_from_disk(disk, path) {
                Ok(contents) => return Ok(contents),
                Err(e) => {
                    warn!("candidate disk '{}' unusable: {:#}", disk, e);
                    failures.push(format!("{disk}: {e:#}"));
                }
            }
        }
        bail!(
            "failed to read '{}' from any candidate disk: {}",
            path,
            failures.join("; ")
        )
    }
}

fn read_relative(root: &Path, path: &str) -> Result<Vec<u8>> {
    let filename = root.join(path.trim_start_matches('/'));
    fs::read(&filename).with_context(|| format!("failed to read file '{}'", filename.display()))
}
