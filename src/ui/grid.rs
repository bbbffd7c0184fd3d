/// Flowing grid of pin cards
///
/// Cards are sized from each pin's intrinsic aspect ratio so the
/// grid keeps a masonry feel. The image itself is presentation
/// chrome; the card renders a sized placeholder block with the
/// prompt underneath.

use std::collections::HashSet;

use iced::widget::{button, column, container, row, text};
use iced::{Element, Length};
use iced_aw::Wrap;

use crate::state::data::Pin;
use crate::Message;

const CARD_WIDTH: f32 = 236.0;
/// Extremely tall pins are clamped so one card cannot dominate a column
const MAX_CARD_HEIGHT: f32 = 420.0;

pub fn pin_grid(pins: &[Pin], saved_ids: &HashSet<String>) -> Element<'static, Message> {
    let cards: Vec<Element<'static, Message>> = pins
        .iter()
        .map(|pin| pin_card(pin, saved_ids.contains(&pin.id)))
        .collect();

    Wrap::with_elements(cards)
        .spacing(12.0)
        .line_spacing(12.0)
        .into()
}

fn pin_card(pin: &Pin, is_saved: bool) -> Element<'static, Message> {
    let height = (pin.height as f32 / pin.width as f32 * CARD_WIDTH).min(MAX_CARD_HEIGHT);

    let placeholder = container(text(""))
        .width(Length::Fixed(CARD_WIDTH))
        .height(Length::Fixed(height))
        .style(container::bordered_box);

    let save_label = if is_saved { "Saved" } else { "Save" };
    let save = button(text(save_label).size(12))
        .on_press(Message::SaveToggled(pin.id.clone()))
        .padding(4);
    let save = if is_saved {
        save.style(button::secondary)
    } else {
        save
    };

    column![
        button(placeholder)
            .on_press(Message::PinSelected(pin.clone()))
            .padding(0)
            .style(button::text),
        row![
            text(pin.prompt.clone()).size(14).width(Length::Fill),
            save,
        ]
        .spacing(6),
    ]
    .spacing(6)
    .width(Length::Fixed(CARD_WIDTH))
    .into()
}
