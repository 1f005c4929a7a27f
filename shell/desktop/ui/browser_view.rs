/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Chrome around the native browser surface.
//!
//! The surface itself is not an iced widget; it is a child view placed over
//! the area this layout leaves empty.

use iced::widget::{button, center, column, container, row, text};
use iced::{Center, Element, Fill};

use crate::shell::desktop::host::app::Message;
use crate::shell::desktop::lifecycle::webview_controller::CONTROL_STRIP_HEIGHT;

pub fn view<'a>(show_reset: bool, refreshing: bool) -> Element<'a, Message> {
    let status = if refreshing { "Refreshing..." } else { "" };

    let mut controls = row![
        container(text(status).size(14)).width(Fill),
        button(text("Refresh"))
            .on_press_maybe((!refreshing).then_some(Message::RefreshRequested)),
    ]
    .spacing(8)
    .align_y(Center);

    if show_reset {
        controls = controls.push(button(text("Change tenant")).on_press(Message::ResetTenant));
    }

    column![
        container(text("")).width(Fill).height(Fill),
        container(controls)
            .padding([8, 12])
            .width(Fill)
            .height(CONTROL_STRIP_HEIGHT),
    ]
    .into()
}

/// Shown instead of the surface when the tenant origin could not be loaded.
pub fn error_view<'a>(message: &'a str) -> Element<'a, Message> {
    let content = column![
        text(message).size(22),
        button(text("Reset")).on_press(Message::ResetTenant),
    ]
    .spacing(16)
    .align_x(Center);

    center(content).padding(24).into()
}
