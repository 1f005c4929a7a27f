/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Out-of-band reachability check for a tenant origin.
//!
//! The native surface renders its own error page for unresolvable hosts, so a
//! single request against the origin tells the session when the host cannot
//! be reached at all. HTTP status is left to the surface's own
//! `document-status` report: servers may answer a bare client differently
//! than a browser.

use std::time::Duration;

use log::debug;
use tenantshell_core::SurfaceEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Reachable { status: u16 },
    HttpError { status: u16 },
    /// DNS, connect, or TLS failure.
    Unreachable { reason: String },
    /// Timed out or failed after connecting; says nothing about the tenant.
    Inconclusive { reason: String },
}

impl ProbeOutcome {
    pub fn from_status(status: u16) -> Self {
        if status >= 400 {
            Self::HttpError { status }
        } else {
            Self::Reachable { status }
        }
    }

    pub fn from_error(error: &reqwest::Error) -> Self {
        let reason = format!("{error}");
        if error.is_timeout() || !error.is_connect() {
            Self::Inconclusive { reason }
        } else {
            Self::Unreachable { reason }
        }
    }

    /// Only an unreachable host is reported to the session.
    pub fn into_surface_event(self, url: &str) -> Option<SurfaceEvent> {
        match self {
            Self::Unreachable { reason } => Some(SurfaceEvent::LoadFailed {
                url: url.to_string(),
                reason,
            }),
            Self::Reachable { .. } | Self::HttpError { .. } | Self::Inconclusive { .. } => None,
        }
    }
}

fn client_builder(timeout: Duration) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(format!("tenantshell/{}", crate::VERSION))
}

/// Fetch `origin` once, following redirects.
pub async fn probe_origin(origin: String, timeout: Duration) -> ProbeOutcome {
    probe_with(client_builder(timeout), origin).await
}

async fn probe_with(builder: reqwest::ClientBuilder, origin: String) -> ProbeOutcome {
    let client = match builder.build() {
        Ok(client) => client,
        Err(e) => {
            return ProbeOutcome::Inconclusive {
                reason: format!("{e}"),
            };
        },
    };

    let outcome = match client.get(&origin).send().await {
        Ok(response) => ProbeOutcome::from_status(response.status().as_u16()),
        Err(e) => ProbeOutcome::from_error(&e),
    };
    debug!("Probed {origin}: {outcome:?}");
    outcome
}
