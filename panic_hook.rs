/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::panic::PanicHookInfo;

use log::error;

/// Route panics through the logger so they land next to the session log.
pub fn panic_hook(info: &PanicHookInfo<'_>) {
    let payload = info.payload();
    let message = match payload.downcast_ref::<&str>() {
        Some(s) => *s,
        None => match payload.downcast_ref::<String>() {
            Some(s) => s.as_str(),
            None => "Box<Any>",
        },
    };
    let location = info
        .location()
        .map(|location| format!("{}:{}", location.file(), location.line()))
        .unwrap_or_else(|| "<unknown>".to_string());
    let thread = std::thread::current();
    let name = thread.name().unwrap_or("<unnamed>");

    error!("Thread '{name}' panicked at {location}: {message}");
    error!("{:?}", backtrace::Backtrace::new());
}
