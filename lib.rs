/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Tenant Shell: a single-window browser locked to one tenant origin.
//!
//! The session rules live in `tenantshell-core`. This crate adds the redb
//! tenant store, preferences, and the iced/wry desktop host.

pub mod panic_hook;
pub mod persistence;
pub mod prefs;
pub mod shell;

use log::warn;
use tracing_subscriber::EnvFilter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_LOG_FILTER: &str = "info";

/// Install the global subscriber. `log` records are bridged into it, so the
/// `log` macros used throughout the crate end up here.
pub fn init_tracing(filter: Option<&str>) {
    let (env_filter, rejected) = match filter {
        Some(directives) => match EnvFilter::try_new(directives) {
            Ok(env_filter) => (env_filter, None),
            Err(e) => (EnvFilter::new(DEFAULT_LOG_FILTER), Some(format!("{directives}: {e}"))),
        },
        None => (EnvFilter::new(DEFAULT_LOG_FILTER), None),
    };

    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_err()
    {
        return;
    }
    if let Some(rejected) = rejected {
        warn!("Ignoring invalid log filter {rejected}");
    }
}
