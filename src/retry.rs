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

//! Bounded retries with exponential backoff, for flaky device operations.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use slog_scope::debug;

#[derive(Clone, Debug)]
pub(crate) struct Retry {
    initial_backoff: Duration,
    max_backoff: Duration,
    max_retries: u8,
}

impl Default for Retry {
    fn default() -> Self {
        Retry {
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(4),
            max_retries: 3,
        }
    }
}

impl Retry {
    /// Build a new retrying driver.
    ///
    /// This defaults to 3 retries, starting at half a second of backoff.
    pub fn new() -> Self {
        Retry::default()
    }

    #[allow(dead_code)]
    pub fn initial_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    #[allow(dead_code)]
    pub fn max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    /// Maximum number of retries after the initial attempt.
    pub fn max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    /// Run `try_fn` until it succeeds or the retries are exhausted.
    ///
    /// The closure receives the zero-based attempt number.
    pub fn retry<F, R>(self, mut try_fn: F) -> Result<R>
    where
        F: FnMut(u8) -> Result<R>,
    {
        let mut delay = self.initial_backoff;
        let mut attempt = 0;

        loop {
            let err = match try_fn(attempt) {
                Ok(v) => return Ok(v),
                Err(e) => e,
            };
            if attempt >= self.max_retries {
                return Err(err).with_context(|| {
                    format!("giving up after {} attempt(s)", u16::from(attempt) + 1)
                });
            }
            debug!("attempt #{} failed, retrying in {:?}: {:#}", attempt + 1, delay, err);

            attempt = attempt.saturating_add(1);
            thread::sleep(delay);
            delay = std::cmp::min(delay.saturating_mul(2), self.max_backoff);
        }
    }
}
