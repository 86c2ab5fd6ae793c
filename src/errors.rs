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

//! Error kinds surfaced by metadata services.
//!
//! Collaborators (disk readers, DNS resolvers) report plain `anyhow` errors;
//! services wrap those into one of the kinds below so callers can tell a
//! broken drive from a broken document or an unresolvable registry.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MetadataError>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum MetadataError {
    /// The platform could not provide the bytes of a document.
    #[error("reading {document} from config drive: {cause:#}")]
    DiskRead {
        document: &'static str,
        cause: anyhow::Error,
    },

    /// A document (or a value inside it) failed to decode.
    #[error("Parsing config drive metadata from {document}: {source}")]
    Parse {
        document: &'static str,
        #[source]
        source: BoxError,
    },

    /// The requested datum is absent or empty in an otherwise valid document.
    #[error("Failed to load {0} from config drive metadata service")]
    MissingField(&'static str),

    /// DNS resolution of the registry host failed.
    #[error("resolving registry host '{host}': {cause:#}")]
    ResolveHost { host: String, cause: anyhow::Error },

    /// An accessor was called before any successful load.
    #[error("metadata service has not been loaded")]
    NotLoaded,
}

impl MetadataError {
    pub(crate) fn parse<E>(document: &'static str, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        MetadataError::Parse {
            document,
            source: source.into(),
        }
    }
}
