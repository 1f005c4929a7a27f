/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Manual refresh indicator.
//!
//! The flag clears on the surface's own completion or failure event. The
//! host also schedules a fixed-delay expiry per ticket as a fallback for
//! reloads whose completion is never reported.

use std::time::Duration;

pub const DEFAULT_REFRESH_FALLBACK: Duration = Duration::from_millis(1000);

/// Identifies one refresh gesture. A fallback timer armed for an older
/// ticket cannot clear a newer refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RefreshTicket(u64);

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RefreshTracker {
    active: Option<RefreshTicket>,
    generation: u64,
}

impl RefreshTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_refreshing(&self) -> bool {
        self.active.is_some()
    }

    /// Start a refresh, superseding any in flight.
    pub fn begin(&mut self) -> RefreshTicket {
        self.generation = self.generation.saturating_add(1);
        let ticket = RefreshTicket(self.generation);
        self.active = Some(ticket);
        ticket
    }

    /// The surface finished (or failed) loading.
    pub fn settle(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Fallback expiry. Returns true only if `ticket` was still current.
    pub fn expire(&mut self, ticket: RefreshTicket) -> bool {
        if self.active == Some(ticket) {
            self.active = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_sets_flag_and_settle_clears_it() {
        let mut tracker = RefreshTracker::new();
        assert!(!tracker.is_refreshing());
        tracker.begin();
        assert!(tracker.is_refreshing());
        assert!(tracker.settle());
        assert!(!tracker.is_refreshing());
        assert!(!tracker.settle());
    }

    #[test]
    fn fallback_expiry_clears_current_ticket() {
        let mut tracker = RefreshTracker::new();
        let ticket = tracker.begin();
        assert!(tracker.expire(ticket));
        assert!(!tracker.is_refreshing());
    }

    #[test]
    fn stale_ticket_does_not_clear_newer_refresh() {
        let mut tracker = RefreshTracker::new();
        let first = tracker.begin();
        let second = tracker.begin();
        assert_ne!(first, second);
        assert!(!tracker.expire(first));
        assert!(tracker.is_refreshing());
        assert!(tracker.expire(second));
    }

    #[test]
    fn expiry_after_settle_is_a_no_op() {
        let mut tracker = RefreshTracker::new();
        let ticket = tracker.begin();
        tracker.settle();
        assert!(!tracker.expire(ticket));
    }
}
