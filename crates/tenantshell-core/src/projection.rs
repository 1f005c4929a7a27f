/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Which shell layout a session maps to.

use crate::session::{Session, SessionState, TENANT_NOT_FOUND_MESSAGE};
use crate::store::TenantStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellLayout {
    /// No URL yet: the tenant entry form.
    EntryForm {
        tenant_text: String,
        can_submit: bool,
    },
    /// URL set but the load failed: message plus reset, no surface.
    TenantError { message: &'static str },
    /// URL set: the surface plus overlay controls.
    Browser {
        url: String,
        show_reset: bool,
        refreshing: bool,
    },
}

impl ShellLayout {
    pub fn is_entry_form(&self) -> bool {
        matches!(self, ShellLayout::EntryForm { .. })
    }

    pub fn surface_url(&self) -> Option<&str> {
        match self {
            ShellLayout::Browser { url, .. } => Some(url),
            _ => None,
        }
    }
}

pub fn project<S: TenantStore>(session: &Session<S>) -> ShellLayout {
    let Some(url) = session.url() else {
        return ShellLayout::EntryForm {
            tenant_text: session.tenant_text().to_string(),
            can_submit: !session.tenant_text().trim().is_empty(),
        };
    };

    match session.state() {
        SessionState::ErrorNoTenantFound => ShellLayout::TenantError {
            message: TENANT_NOT_FOUND_MESSAGE,
        },
        state => ShellLayout::Browser {
            url,
            show_reset: state == SessionState::ActiveWithResetAffordance,
            refreshing: session.is_refreshing(),
        },
    }
}
