/// View builders for the shell
///
/// Everything here is presentation over the state core: these
/// functions read state and emit `Message`s, nothing more.
/// - Pin grid (grid.rs)
/// - Generator form (forms.rs)
/// - Login screen, header, profile page, detail panel (below)

pub mod forms;
pub mod grid;

use std::collections::HashSet;

use iced::widget::{button, column, container, row, text, text_input, Space};
use iced::{Alignment, Element, Length};

use crate::state::browse::{Browse, View};
use crate::state::data::Pin;
use crate::Message;

/// Shown until the persisted session flag says otherwise
pub fn login_screen() -> Element<'static, Message> {
    let content = column![
        text("Pinboard").size(48),
        text("Sign in to browse and create pins").size(16),
        button(text("Sign in").size(16))
            .on_press(Message::LoginPressed)
            .padding(10),
    ]
    .spacing(20)
    .align_x(Alignment::Center);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

/// Top bar: wordmark, live search, navigation, create, logout
pub fn header(browse: &Browse) -> Element<'_, Message> {
    let nav_style = |active: bool| -> fn(&iced::Theme, button::Status) -> button::Style {
        if active {
            button::primary
        } else {
            button::secondary
        }
    };

    row![
        text("Pinboard").size(24),
        text_input("Search pins...", browse.search_term())
            .on_input(Message::SearchChanged)
            .padding(8)
            .width(Length::Fill),
        button(text("Home").size(14))
            .on_press(Message::NavigateTo(View::Home))
            .style(nav_style(browse.current_view() == View::Home))
            .padding(8),
        button(text("Profile").size(14))
            .on_press(Message::NavigateTo(View::Profile))
            .style(nav_style(browse.current_view() == View::Profile))
            .padding(8),
        button(text("+ Create").size(14))
            .on_press(Message::GeneratorOpened)
            .padding(8),
        button(text("Log out").size(14))
            .on_press(Message::LogoutPressed)
            .style(button::text)
            .padding(8),
    ]
    .spacing(12)
    .padding(12)
    .align_y(Alignment::Center)
    .into()
}

/// Profile screen: the pins this session created, then the saved ones
pub fn profile_page(
    created: &[Pin],
    saved: &[Pin],
    saved_ids: &HashSet<String>,
) -> Element<'static, Message> {
    let section = |title: &str, pins: &[Pin], empty_note: &str| -> Element<'static, Message> {
        let body: Element<'static, Message> = if pins.is_empty() {
            text(empty_note.to_string()).size(14).into()
        } else {
            grid::pin_grid(pins, saved_ids)
        };

        column![text(title.to_string()).size(24), body]
            .spacing(12)
            .into()
    };

    column![
        section(
            "Created",
            created,
            "Nothing here yet. Generate or upload a pin to get started.",
        ),
        section("Saved", saved, "Pins you save will show up here."),
    ]
    .spacing(28)
    .padding(16)
    .into()
}

/// Detail panel for a selected pin
pub fn detail_panel(pin: &Pin, is_saved: bool) -> Element<'static, Message> {
    const DETAIL_WIDTH: f32 = 520.0;
    let height = (pin.height as f32 / pin.width as f32 * DETAIL_WIDTH).min(640.0);

    let save_label = if is_saved { "Saved" } else { "Save" };

    let content = column![
        container(text(""))
            .width(Length::Fixed(DETAIL_WIDTH))
            .height(Length::Fixed(height))
            .style(container::bordered_box),
        text(pin.prompt.clone()).size(20),
        text(format!("{} x {}", pin.width, pin.height)).size(13),
        row![
            button(text(save_label).size(14))
                .on_press(Message::SaveToggled(pin.id.clone()))
                .padding(8),
            button(text("Remix").size(14))
                .on_press(Message::RemixRequested(pin.clone()))
                .padding(8)
                .style(button::secondary),
            Space::with_width(Length::Fill),
            button(text("Close").size(14))
                .on_press(Message::DetailClosed)
                .padding(8)
                .style(button::text),
        ]
        .spacing(12)
        .width(Length::Fixed(DETAIL_WIDTH)),
    ]
    .spacing(14)
    .align_x(Alignment::Center);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

/// Home-feed notice when there is nothing to show
pub fn empty_feed_notice() -> Element<'static, Message> {
    column![
        text("Your feed is empty.").size(24),
        text("Start creating to see some magic!").size(16),
    ]
    .spacing(8)
    .align_x(Alignment::Center)
    .width(Length::Fill)
    .into()
}
