/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use iced::widget::{button, center, column, text, text_input};
use iced::{Center, Element};

use crate::shell::desktop::host::app::Message;

/// Tenant identifier prompt shown while no tenant is active.
pub fn view(tenant_text: &str, can_submit: bool) -> Element<'_, Message> {
    let input = text_input("Tenant ID", tenant_text)
        .on_input(Message::TenantTextChanged)
        .on_submit(Message::SubmitTenant)
        .padding(12)
        .size(18);

    let submit = button(text("Continue").size(18))
        .padding([10, 24])
        .on_press_maybe(can_submit.then_some(Message::SubmitTenant));

    let form = column![text("Enter your tenant ID").size(22), input, submit]
        .spacing(16)
        .max_width(360)
        .align_x(Center);

    center(form).padding(24).into()
}
