/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Portable kernel for Tenant Shell.
//!
//! Everything here is free of windowing, webview, and network dependencies so
//! the session rules can be exercised with an in-memory store and synthetic
//! surface events. Hosts own the real store and the browser surface and feed
//! their events through [`session::Session`].

pub mod exit;
pub mod origin;
pub mod projection;
pub mod refresh;
pub mod routes;
pub mod session;
pub mod store;
pub mod tenant;

pub use exit::{ExitDecision, ExitGate};
pub use origin::{DEFAULT_SUFFIX_DOMAIN, OriginTemplate, resolve};
pub use projection::{ShellLayout, project};
pub use refresh::{DEFAULT_REFRESH_FALLBACK, RefreshTicket, RefreshTracker};
pub use routes::{AccountRouteMarkers, LOGIN_PATH_MARKER, LOGOUT_PATH_MARKER, RouteMatcher};
pub use session::{
    Session, SessionEvent, SessionState, SurfaceEvent, TENANT_NOT_FOUND_MESSAGE, Transition,
};
pub use store::{MemoryTenantStore, StoreError, TENANT_RECORD_KEY, TenantStore};
#[cfg(any(test, feature = "test-utils"))]
pub use store::StoreFailures;
pub use tenant::TenantId;
