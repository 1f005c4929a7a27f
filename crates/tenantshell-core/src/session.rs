/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Tenant session state machine.
//!
//! [`next_state`] is the pure transition table. [`Session`] wraps it with the
//! side effects that belong to each transition: persisting the tenant on
//! submit, deleting it on reset, and settling the refresh indicator when the
//! surface reports completion. Persistence failures are logged and never
//! block a transition.

use log::{debug, info, warn};

use crate::origin::OriginTemplate;
use crate::refresh::{RefreshTicket, RefreshTracker};
use crate::routes::{AccountRouteMarkers, RouteMatcher};
use crate::store::{TENANT_RECORD_KEY, TenantStore};
use crate::tenant::TenantId;

/// Shown for every load or HTTP failure, whatever the cause.
pub const TENANT_NOT_FOUND_MESSAGE: &str = "Tenant not found";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoTenant,
    Active,
    ActiveWithResetAffordance,
    ErrorNoTenantFound,
}

impl SessionState {
    pub fn has_tenant(self) -> bool {
        !matches!(self, SessionState::NoTenant)
    }

    /// The reset control is offered on account routes and implied by the
    /// error screen.
    pub fn shows_reset_affordance(self) -> bool {
        matches!(
            self,
            SessionState::ActiveWithResetAffordance | SessionState::ErrorNoTenantFound
        )
    }

    /// A browser surface is expected to be rendering.
    pub fn shows_surface(self) -> bool {
        matches!(
            self,
            SessionState::Active | SessionState::ActiveWithResetAffordance
        )
    }
}

/// Notifications from the embedded browser surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The surface is navigating to (or has settled on) `url`.
    Navigation { url: String },
    LoadFinished { url: String },
    LoadFailed { url: String, reason: String },
    HttpError { url: String, status: u16 },
}

impl SurfaceEvent {
    pub fn url(&self) -> &str {
        match self {
            SurfaceEvent::Navigation { url }
            | SurfaceEvent::LoadFinished { url }
            | SurfaceEvent::LoadFailed { url, .. }
            | SurfaceEvent::HttpError { url, .. } => url,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SurfaceEvent::LoadFailed { .. } | SurfaceEvent::HttpError { .. }
        )
    }

    /// Completion or failure of a load; either ends a refresh.
    pub fn ends_load(&self) -> bool {
        !matches!(self, SurfaceEvent::Navigation { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A non-blank tenant identifier was submitted from the entry form.
    Submitted,
    Surface(SurfaceEvent),
    Reset,
}

/// Pure transition function.
///
/// Surface events while no tenant is set come from a surface that has
/// already been torn down and are ignored. Once in the error state only an
/// explicit reset leaves it. Submissions while a tenant is active are
/// ignored; switching tenants goes through reset.
pub fn next_state(
    state: SessionState,
    event: &SessionEvent,
    routes: &dyn RouteMatcher,
) -> SessionState {
    use SessionState::*;

    match (state, event) {
        (_, SessionEvent::Reset) => NoTenant,
        (NoTenant, SessionEvent::Submitted) => Active,
        (state, SessionEvent::Submitted) => state,
        (NoTenant, SessionEvent::Surface(_)) => NoTenant,
        (ErrorNoTenantFound, SessionEvent::Surface(_)) => ErrorNoTenantFound,
        (_, SessionEvent::Surface(surface)) => match surface {
            SurfaceEvent::LoadFailed { .. } | SurfaceEvent::HttpError { .. } => {
                ErrorNoTenantFound
            },
            SurfaceEvent::LoadFinished { .. } => Active,
            SurfaceEvent::Navigation { url } => {
                if routes.suggests_tenant_switch(url) {
                    ActiveWithResetAffordance
                } else {
                    Active
                }
            },
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: SessionState,
    pub to: SessionState,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// The tenant session.
///
/// The resolved URL is never stored; [`Session::url`] derives it from the
/// current tenant so the two cannot diverge.
pub struct Session<S> {
    store: S,
    template: OriginTemplate,
    routes: Box<dyn RouteMatcher>,
    state: SessionState,
    tenant: Option<TenantId>,
    tenant_text: String,
    refresh: RefreshTracker,
}

impl<S: TenantStore> Session<S> {
    /// Build the session from whatever the store holds. A missing, blank, or
    /// unreadable record leaves the session in [`SessionState::NoTenant`].
    pub fn restore(store: S, template: OriginTemplate, routes: Box<dyn RouteMatcher>) -> Self {
        let persisted = match store.get(TENANT_RECORD_KEY) {
            Ok(value) => value.as_deref().and_then(TenantId::parse),
            Err(e) => {
                warn!("Failed to read persisted tenant: {e}");
                None
            },
        };

        let (state, tenant_text) = match &persisted {
            Some(tenant) => {
                info!("Restored tenant '{tenant}'");
                (SessionState::Active, tenant.to_string())
            },
            None => (SessionState::NoTenant, String::new()),
        };

        Self {
            store,
            template,
            routes,
            state,
            tenant: persisted,
            tenant_text,
            refresh: RefreshTracker::new(),
        }
    }

    /// [`Session::restore`] with the default origin template and account
    /// route markers.
    pub fn restore_with_defaults(store: S) -> Self {
        Self::restore(
            store,
            OriginTemplate::default(),
            Box::new(AccountRouteMarkers::default()),
        )
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn tenant(&self) -> Option<&TenantId> {
        self.tenant.as_ref()
    }

    pub fn tenant_text(&self) -> &str {
        &self.tenant_text
    }

    pub fn set_tenant_text(&mut self, text: impl Into<String>) {
        self.tenant_text = text.into();
    }

    pub fn url(&self) -> Option<String> {
        self.tenant
            .as_ref()
            .map(|tenant| self.template.resolve(tenant))
    }

    pub fn has_url(&self) -> bool {
        self.tenant.is_some()
    }

    pub fn error_message(&self) -> Option<&'static str> {
        (self.state == SessionState::ErrorNoTenantFound).then_some(TENANT_NOT_FOUND_MESSAGE)
    }

    pub fn shows_reset_affordance(&self) -> bool {
        self.state.shows_reset_affordance()
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_refreshing()
    }

    pub fn template(&self) -> &OriginTemplate {
        &self.template
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Submit the current tenant text.
    ///
    /// Blank text and submissions while a tenant is already active are
    /// ignored. The trimmed identifier is persisted best-effort.
    pub fn submit(&mut self) -> Transition {
        if self.state.has_tenant() {
            debug!("Ignoring tenant submission while a tenant is active");
            return self.unchanged();
        }
        let Some(tenant) = TenantId::parse(&self.tenant_text) else {
            debug!("Ignoring blank tenant submission");
            return self.unchanged();
        };

        if let Err(e) = self.store.set(TENANT_RECORD_KEY, tenant.as_str()) {
            warn!("Failed to persist tenant '{tenant}': {e}");
        }
        self.tenant_text = tenant.to_string();
        self.tenant = Some(tenant);
        self.refresh.settle();
        self.transition(&SessionEvent::Submitted)
    }

    /// Replace the tenant text and submit it.
    pub fn submit_text(&mut self, text: &str) -> Transition {
        if self.state.has_tenant() {
            debug!("Ignoring tenant submission while a tenant is active");
            return self.unchanged();
        }
        self.tenant_text = text.to_string();
        self.submit()
    }

    /// Forget the tenant and return to the entry form. Allowed from every
    /// state; a failed delete is logged and the reset still happens.
    pub fn reset(&mut self) -> Transition {
        if let Err(e) = self.store.delete(TENANT_RECORD_KEY) {
            warn!("Failed to delete persisted tenant: {e}");
        }
        self.tenant = None;
        self.tenant_text.clear();
        self.refresh.settle();
        self.transition(&SessionEvent::Reset)
    }

    pub fn observe(&mut self, event: &SurfaceEvent) -> Transition {
        if !self.state.has_tenant() {
            debug!("Dropping surface event without a tenant: {event:?}");
            return self.unchanged();
        }
        if event.ends_load() && self.refresh.settle() {
            debug!("Refresh settled by {event:?}");
        }
        if let SurfaceEvent::LoadFailed { url, reason } = event {
            warn!("Load of {url} failed: {reason}");
        }
        if let SurfaceEvent::HttpError { url, status } = event {
            warn!("Load of {url} returned HTTP {status}");
        }
        self.transition(&SessionEvent::Surface(event.clone()))
    }

    /// Start a manual refresh. Only meaningful while a surface is rendering;
    /// returns the ticket the host arms its fallback timer with.
    pub fn begin_refresh(&mut self) -> Option<RefreshTicket> {
        if !self.state.shows_surface() {
            return None;
        }
        Some(self.refresh.begin())
    }

    pub fn expire_refresh(&mut self, ticket: RefreshTicket) -> bool {
        self.refresh.expire(ticket)
    }

    fn transition(&mut self, event: &SessionEvent) -> Transition {
        let from = self.state;
        let to = next_state(from, event, self.routes.as_ref());
        self.state = to;
        if from != to {
            info!("Session {from:?} -> {to:?}");
        }
        Transition { from, to }
    }

    fn unchanged(&self) -> Transition {
        Transition {
            from: self.state,
            to: self.state,
        }
    }
}
