/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use iced::widget::{button, center, column, row, text};
use iced::{Center, Element};

use crate::shell::desktop::host::app::Message;

pub fn view<'a>() -> Element<'a, Message> {
    let actions = row![
        button(text("No")).on_press(Message::ExitCancelled),
        button(text("Yes")).on_press(Message::ExitConfirmed),
    ]
    .spacing(12);

    let content = column![
        text("Exit app").size(22),
        text("Do you want to exit the app?"),
        actions,
    ]
    .spacing(16)
    .align_x(Center);

    center(content).padding(24).into()
}
