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

//! Config-drive documents.
//!
//! Every field is optional on the wire: unknown keys are ignored and a missing
//! key decodes to its empty value, so accessors only ever check for emptiness.

use serde::Deserialize;
use std::collections::HashMap;

use crate::errors::{MetadataError, Result};

/// Document name used in error messages for the metadata file.
pub const METADATA_DOCUMENT: &str = "meta_data.json";
/// Document name used in error messages for the user-data file.
pub const USERDATA_DOCUMENT: &str = "user_data";

/// Key-type under which SSH public keys are stored.
const OPENSSH_KEY_TYPE: &str = "openssh-key";
/// Slot holding the instance's primary key.
const PRIMARY_KEY_SLOT: &str = "0";

/// Partial object for `meta_data.json`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Metadata {
    /// Public keys, by slot and then by key-type.
    #[serde(default)]
    pub public_keys: HashMap<String, HashMap<String, String>>,
    /// Instance ID.
    #[serde(rename = "instance-id", default)]
    pub instance_id: String,
}

impl Metadata {
    /// Parse metadata from raw document bytes.
    pub fn from_slice(contents: &[u8]) -> Result<Self> {
        serde_json::from_slice(contents).map_err(|e| MetadataError::parse(METADATA_DOCUMENT, e))
    }

    /// Primary `openssh-key` entry, if present and non-empty.
    pub fn openssh_key(&self) -> Option<&str> {
        self.public_keys
            .get(PRIMARY_KEY_SLOT)
            .and_then(|slot| slot.get(OPENSSH_KEY_TYPE))
            .map(String::as_str)
            .filter(|key| !key.is_empty())
    }
}

/// Partial object for `user_data`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct UserData {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub registry: RegistrySection,
    #[serde(default)]
    pub dns: DnsSection,
}

impl UserData {
    /// Parse user-data from raw document bytes.
    pub fn from_slice(contents: &[u8]) -> Result<Self> {
        serde_json::from_slice(contents).map_err(|e| MetadataError::parse(USERDATA_DOCUMENT, e))
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ServerSection {
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct RegistrySection {
    #[serde(default)]
    pub endpoint: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct DnsSection {
    /// Nameservers to resolve the registry host against, in order.
    #[serde(default)]
    pub nameserver: Vec<String>,
}

/// Both documents of a single successful load.
///
/// Services only ever swap this in as a whole, so accessors can never observe
/// metadata from one load next to user-data from another.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Contents {
    pub metadata: Metadata,
    pub userdata: UserData,
}

impl Contents {
    pub fn public_key(&self) -> Result<String> {
        self.metadata
            .openssh_key()
            .map(ToString::to_string)
            .ok_or(MetadataError::MissingField("openssh-key"))
    }

    pub fn instance_id(&self) -> Result<String> {
        non_empty(&self.metadata.instance_id, "instance-id")
    }

    pub fn server_name(&self) -> Result<String> {
        non_empty(&self.userdata.server.name, "server name")
    }

    /// Registry endpoint as written in user-data, before any DNS override.
    pub fn raw_registry_endpoint(&self) -> Result<String> {
        non_empty(&self.userdata.registry.endpoint, "registry endpoint")
    }

    pub fn nameservers(&self) -> &[String] {
        &self.userdata.dns.nameserver
    }
}

fn non_empty(value: &str, field: &'static str) -> Result<String> {
    if value.is_empty() {
        return Err(MetadataError::MissingField(field));
    }
    Ok(value.to_string())
}
