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

//! Registry endpoint resolution against user-data nameservers.

use slog::{debug, Logger};
use std::net::IpAddr;
use url::{Host, Position, Url};

use super::schema::{Contents, USERDATA_DOCUMENT};
use crate::dns::DnsResolver;
use crate::errors::{MetadataError, Result};

/// Return the registry endpoint, rewriting its host through `resolver` when
/// user-data carries nameservers.
pub(crate) fn resolve_registry_endpoint(
    log: &Logger,
    contents: &Contents,
    resolver: &dyn DnsResolver,
) -> Result<String> {
    let endpoint = contents.raw_registry_endpoint()?;
    let nameservers = contents.nameservers();
    if nameservers.is_empty() {
        return Ok(endpoint);
    }

    let mut url = Url::parse(&endpoint).map_err(|e| MetadataError::parse(USERDATA_DOCUMENT, e))?;
    // `host_str()` keeps the brackets around IPv6 literals
    let host = match url.host() {
        Some(Host::Domain(h)) if !h.is_empty() => h.to_string(),
        Some(Host::Ipv4(ip)) => ip.to_string(),
        Some(Host::Ipv6(ip)) => ip.to_string(),
        _ => {
            return Err(MetadataError::parse(
                USERDATA_DOCUMENT,
                format!("registry endpoint '{endpoint}' has no host"),
            ))
        }
    };

    debug!(log, "resolving registry host"; "host" => &host, "nameservers" => ?nameservers);
    let resolved = resolver
        .lookup_host(&host, nameservers)
        .map_err(|cause| MetadataError::ResolveHost {
            host: host.clone(),
            cause,
        })?;
    debug!(log, "resolved registry host"; "host" => &host, "address" => &resolved);

    set_host(&mut url, &resolved).map_err(|e| MetadataError::ResolveHost {
        host,
        cause: e.context(format!("resolver returned unusable address '{resolved}'")),
    })?;

    Ok(serialize_like(&url, &endpoint))
}

/// Substitute the host of `url`, keeping scheme, userinfo, port, path, query
/// and fragment.
fn set_host(url: &mut Url, address: &str) -> anyhow::Result<()> {
    let trimmed = address.trim_start_matches('[').trim_end_matches(']');
    match trimmed.parse::<IpAddr>() {
        Ok(ip) => url
            .set_ip_host(ip)
            .map_err(|_| anyhow::anyhow!("cannot set an IP host on this URL")),
        Err(_) => url.set_host(Some(address)).map_err(anyhow::Error::from),
    }
}

/// Serialize `url` without the root path `Url` adds to special schemes when
/// the original endpoint did not spell one out.
fn serialize_like(url: &Url, original: &str) -> String {
    if url.path() != "/" || has_explicit_path(original) {
        return url.to_string();
    }
    format!("{}{}", &url[..Position::BeforePath], &url[Position::AfterPath..])
}

fn has_explicit_path(endpoint: &str) -> bool {
    let rest = match endpoint.find("://") {
        Some(idx) => &endpoint[idx + 3..],
        None => return true,
    };
    match rest.find(['/', '?', '#']) {
        Some(idx) => rest[idx..].starts_with('/'),
        None => false,
    }
}
