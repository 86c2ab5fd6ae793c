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

//! Hostname resolution against an explicit list of nameservers.
//!
//! The system resolver is never consulted: user-data nameservers are
//! authoritative for the registry host.

use anyhow::{bail, Context, Result};
use slog_scope::{debug, trace};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use trust_dns_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use trust_dns_resolver::Resolver;

/// Port nameservers listen on unless one is given.
const DNS_PORT: u16 = 53;

/// Resolve a host against the given nameservers.
pub trait DnsResolver {
    /// Return an address for `host`, asking `nameservers` in order.
    fn lookup_host(&self, host: &str, nameservers: &[String]) -> Result<String>;
}

/// Resolver querying the given nameservers directly over UDP.
#[derive(Clone, Debug)]
pub struct NameserverDnsResolver {
    timeout: Duration,
}

impl Default for NameserverDnsResolver {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
        }
    }
}

impl NameserverDnsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-query timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn resolver(&self, nameservers: &[SocketAddr]) -> Result<Resolver> {
        let mut rc = ResolverConfig::new();
        for socket_addr in nameservers {
            rc.add_name_server(NameServerConfig {
                socket_addr: *socket_addr,
                protocol: Protocol::Udp,
                tls_dns_name: None,
                trust_nx_responses: false,
                bind_addr: None,
            });
        }
        let mut opts = ResolverOpts::default();
        opts.use_hosts_file = false;
        opts.timeout = self.timeout;
        opts.attempts = 1;
        // one nameserver at a time, in the configured order
        opts.num_concurrent_reqs = 1;
        Resolver::new(rc, opts).context("failed to create DNS resolver")
    }
}

impl DnsResolver for NameserverDnsResolver {
    fn lookup_host(&self, host: &str, nameservers: &[String]) -> Result<String> {
        let bare = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = bare.parse::<IpAddr>() {
            return Ok(ip.to_string());
        }
        if nameservers.is_empty() {
            bail!("no nameservers to resolve '{}' against", host);
        }

        let addrs = nameservers
            .iter()
            .map(|ns| parse_nameserver(ns))
            .collect::<Result<Vec<_>>>()?;
        debug!("looking up '{}' via nameservers {:?}", host, addrs);
        let answer = self
            .resolver(&addrs)?
            .lookup_ip(host)
            .with_context(|| format!("failed to resolve '{host}'"))?;
        let resolved: Vec<IpAddr> = answer.iter().collect();
        trace!("addresses for '{}': {:?}", host, resolved);

        match resolved.first() {
            Some(addr) => Ok(addr.to_string()),
            None => bail!("no address record for '{}'", host),
        }
    }
}

/// Resolver returning the host unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopDnsResolver;

impl DnsResolver for NoopDnsResolver {
    fn lookup_host(&self, host: &str, _nameservers: &[String]) -> Result<String> {
        Ok(host.to_string())
    }
}

/// Parse a nameserver given either as a bare IP or as `ip:port`.
fn parse_nameserver(nameserver: &str) -> Result<SocketAddr> {
    if let Ok(addr) = nameserver.parse::<SocketAddr>() {
        return Ok(addr);
    }
    let ip = nameserver
        .trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .with_context(|| format!("invalid nameserver address '{nameserver}'"))?;
    Ok(SocketAddr::new(ip, DNS_PORT))
}
