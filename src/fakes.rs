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

//! Recording fakes for the platform and DNS collaborators.
//!
//! Clones share state, so a test can keep a handle after boxing one into a
//! service.

use anyhow::{anyhow, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::dns::DnsResolver;
use crate::platform::DiskReader;

#[derive(Debug, Default)]
struct DiskState {
    files: HashMap<String, std::result::Result<Vec<u8>, String>>,
    calls: Vec<(Vec<String>, String)>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct FakeDiskReader {
    state: Rc<RefCell<DiskState>>,
}

impl FakeDiskReader {
    pub fn set_contents(&self, path: &str, contents: impl Into<Vec<u8>>) {
        self.state
            .borrow_mut()
            .files
            .insert(path.to_string(), Ok(contents.into()));
    }

    pub fn set_error(&self, path: &str, err: &str) {
        self.state
            .borrow_mut()
            .files
            .insert(path.to_string(), Err(err.to_string()));
    }

    /// Every `(disks, path)` pair the reader was called with.
    pub fn calls(&self) -> Vec<(Vec<String>, String)> {
        self.state.borrow().calls.clone()
    }

    /// Every disk probed so far, flattened across calls.
    pub fn probed_disks(&self) -> Vec<String> {
        self.calls().into_iter().flat_map(|(d, _)| d).collect()
    }
}

impl DiskReader for FakeDiskReader {
    fn read_file_from_candidate_disks(&self, disks: &[String], path: &str) -> Result<Vec<u8>> {
        let mut state = self.state.borrow_mut();
        state.calls.push((disks.to_vec(), path.to_string()));
        match state.files.get(path) {
            Some(Ok(contents)) => Ok(contents.clone()),
            Some(Err(e)) => Err(anyhow!("{}", e)),
            None => Err(anyhow!("no such file '{}'", path)),
        }
    }
}

#[derive(Debug, Default)]
struct DnsState {
    records: Vec<(String, Vec<String>, String)>,
    lookup_err: Option<String>,
    lookups: Vec<(String, Vec<String>)>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct FakeDnsResolver {
    state: Rc<RefCell<DnsState>>,
}

impl FakeDnsResolver {
    /// Answer `host` with `address` when asked via exactly `nameservers`.
    pub fn register(&self, host: &str, nameservers: &[&str], address: &str) {
        self.state.borrow_mut().records.push((
            host.to_string(),
            nameservers.iter().map(ToString::to_string).collect(),
            address.to_string(),
        ));
    }

    /// Fail every lookup with `err`.
    pub fn fail_with(&self, err: &str) {
        self.state.borrow_mut().lookup_err = Some(err.to_string());
    }

    pub fn lookups(&self) -> Vec<(String, Vec<String>)> {
        self.state.borrow().lookups.clone()
    }
}

impl DnsResolver for FakeDnsResolver {
    fn lookup_host(&self, host: &str, nameservers: &[String]) -> Result<String> {
        let mut state = self.state.borrow_mut();
        state
            .lookups
            .push((host.to_string(), nameservers.to_vec()));
        if let Some(e) = &state.lookup_err {
            return Err(anyhow!("{}", e));
        }
        state
            .records
            .iter()
            .find(|(h, ns, _)| h == host && ns.as_slice() == nameservers)
            .map(|(_, _, addr)| addr.clone())
            .ok_or_else(|| anyhow!("no record for '{}'", host))
    }
}
