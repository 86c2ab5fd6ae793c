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

//! Instance metadata from an IaaS config drive.
//!
//! An agent builds a [`metadata::MetadataService`] for its platform, calls
//! `load()` once the drive is attached, and then queries its identity and
//! registry endpoint from the loaded documents.

pub mod dns;
pub mod errors;
pub mod metadata;
pub mod network;
pub mod platform;
mod retry;
mod util;

#[cfg(test)]
mod fakes;

pub use metadata::{new_metadata_service, MetadataService, MetadataSource};
