/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Detection of hosted-application routes after which the user may want to
//! switch tenants.
//!
//! The marker paths belong to the tenant web application's own routing, so
//! the matcher is a trait object the host can swap or configure.

pub const LOGIN_PATH_MARKER: &str = "/accounts/log-in";
pub const LOGOUT_PATH_MARKER: &str = "/accounts/log-out";

pub trait RouteMatcher {
    /// True when a navigation to `url` should expose the reset control.
    fn suggests_tenant_switch(&self, url: &str) -> bool;
}

impl<F> RouteMatcher for F
where
    F: Fn(&str) -> bool,
{
    fn suggests_tenant_switch(&self, url: &str) -> bool {
        self(url)
    }
}

/// Substring match against a list of path markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRouteMarkers {
    markers: Vec<String>,
}

impl AccountRouteMarkers {
    /// Blank markers are dropped; they would match every URL.
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(Into::into)
                .filter(|marker| !marker.trim().is_empty())
                .collect(),
        }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

impl Default for AccountRouteMarkers {
    fn default() -> Self {
        Self::new([LOGOUT_PATH_MARKER, LOGIN_PATH_MARKER])
    }
}

impl RouteMatcher for AccountRouteMarkers {
    fn suggests_tenant_switch(&self, url: &str) -> bool {
        self.markers.iter().any(|marker| url.contains(marker.as_str()))
    }
}
