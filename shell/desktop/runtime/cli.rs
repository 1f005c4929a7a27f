/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::{env, panic};

use iced::{Size, window};
use log::{error, info};

use crate::panic_hook;
use crate::prefs::{ArgumentParsingResult, ShellPreferences, parse_command_line_arguments};
use crate::shell::desktop::host::app::ShellApp;

pub fn main() {
    // Skip the first argument, which is the binary name.
    let args: Vec<String> = env::args().skip(1).collect();
    let preferences = match parse_command_line_arguments(&args) {
        ArgumentParsingResult::Run(preferences) => preferences,
        ArgumentParsingResult::Exit => {
            std::process::exit(0);
        },
        ArgumentParsingResult::ErrorParsing => {
            std::process::exit(1);
        },
    };

    crate::init_tracing(preferences.log_filter.as_deref());
    panic::set_hook(Box::new(panic_hook::panic_hook));
    info!(
        "Tenant Shell {} starting (suffix domain {})",
        crate::VERSION,
        preferences.suffix_domain
    );

    if let Err(e) = run(preferences) {
        error!("Tenant Shell exited with an error: {e}");
        std::process::exit(1);
    }
}

fn run(preferences: ShellPreferences) -> iced::Result {
    let settings = window::Settings {
        size: Size::new(preferences.window_width, preferences.window_height),
        // Close requests go through the exit prompt.
        exit_on_close_request: false,
        ..window::Settings::default()
    };

    iced::application(
        move || ShellApp::new(&preferences),
        ShellApp::update,
        ShellApp::view,
    )
    .title(ShellApp::title)
    .subscription(ShellApp::subscription)
    .window(settings)
    .run()
}
