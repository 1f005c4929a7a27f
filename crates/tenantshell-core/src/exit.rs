/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Exit interception.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    /// Terminate now.
    Proceed,
    /// Show the confirmation prompt and wait for an answer.
    Confirm,
}

/// Tracks whether the exit confirmation prompt is open.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExitGate {
    prompting: bool,
}

impl ExitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// A platform back/close signal arrived. With a tenant origin showing the
    /// exit must be confirmed; on the bare entry form it proceeds.
    pub fn request(&mut self, has_url: bool) -> ExitDecision {
        if !has_url {
            self.prompting = false;
            return ExitDecision::Proceed;
        }
        self.prompting = true;
        ExitDecision::Confirm
    }

    pub fn is_prompting(&self) -> bool {
        self.prompting
    }

    /// "Yes". Returns true if a prompt was open and the process should exit.
    pub fn confirm(&mut self) -> bool {
        std::mem::replace(&mut self.prompting, false)
    }

    /// "No".
    pub fn cancel(&mut self) {
        self.prompting = false;
    }
}
