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

//! Helpers for mounting and unmounting candidate disks.

use crate::retry::Retry;
use anyhow::{Context, Result};
use nix::mount;
use slog_scope::{debug, error, warn};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// A disk mounted read-only on a private temporary directory.
///
/// The disk is unmounted (and the directory removed) on drop.
#[derive(Debug)]
pub(crate) struct MountedDisk {
    mount_dir: TempDir,
    retries: u8,
}

impl MountedDisk {
    /// Mount `source` read-only with filesystem type `fstype`.
    pub fn mount(source: &Path, fstype: &str, retries: u8) -> Result<Self> {
        let mount_dir = tempfile::Builder::new()
            .prefix("configdrive-")
            .tempdir()
            .context("failed to create temporary directory")?;
        mount_ro(source, mount_dir.path(), fstype, retries)?;
        Ok(Self { mount_dir, retries })
    }

    /// Top directory of the mounted filesystem.
    pub fn path(&self) -> &Path {
        self.mount_dir.path()
    }
}

impl Drop for MountedDisk {
    fn drop(&mut self) {
        if let Err(e) = unmount(self.mount_dir.path(), self.retries) {
            error!("failed to cleanup config-drive mount: {:?}", e);
        }
    }
}

/// Try to unmount an existing target mountpoint.
///
/// This can internally retry in case of transient errors.
pub(crate) fn unmount(target: &Path, retries: u8) -> Result<()> {
    Retry::new().max_retries(retries).retry(|attempt| {
        debug!(
            "Unmounting '{}': attempt #{}",
            target.display(),
            attempt + 1
        );
        mount::umount(target).with_context(|| format!("failed to unmount '{}'", target.display()))
    })
}

/// Try to mount a filesystem read-only.
///
/// This can internally wait for udev events settling and retry in case of transient errors.
pub(crate) fn mount_ro(source: &Path, target: &Path, fstype: &str, retries: u8) -> Result<()> {
    Retry::new().max_retries(retries).retry(|attempt| {
        debug!("Mounting '{}': attempt #{}", source.display(), attempt + 1);
        let res = mount::mount(
            Some(source),
            target,
            Some(fstype),
            mount::MsFlags::MS_RDONLY,
            None::<&str>,
        )
        .with_context(|| {
            format!(
                "failed to mount (read-only) source '{}' to target '{}', with type '{}'",
                source.display(),
                target.display(),
                fstype
            )
        });

        // A just-attached drive may not have its device node yet.
        if res.is_err() {
            settle_udev(None)
        };

        res
    })
}

/// Wait for udev queue to settle, ignoring any errors.
fn settle_udev(timeout: Option<u8>) {
    let mut cmd = Command::new("udevadm");
    cmd.arg("settle");
    // If none, udevadm default is 120s.
    if let Some(t) = timeout {
        cmd.arg(format!("--timeout={t}"));
    }

    match cmd.output() {
        Err(e) => warn!("failed to run udevadm settle: {}", e),
        Ok(out) => {
            if !out.status.success() {
                warn!(
                    "udevadm settle failed: {}",
                    String::from_utf8_lossy(&out.stderr)
                );
            }
        }
    };
}
