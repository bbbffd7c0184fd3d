/// Pin generator form: prompt, backend, aspect ratio, optional
/// style, plus the upload path. The form owns its field state; the
/// request is assembled by `options`, seeded with the remix source
/// when one is active.

use iced::widget::{button, column, container, pick_list, row, text, text_input};
use iced::{Alignment, Element, Length};

use crate::state::data::{AspectRatio, GenerationModel, GenerationOptions, Pin, Style};
use crate::Message;

const FORM_WIDTH: f32 = 440.0;

/// Field state for the generator form
#[derive(Debug)]
pub struct GeneratorForm {
    pub prompt: String,
    pub model: GenerationModel,
    pub aspect_ratio: AspectRatio,
    pub style: Option<Style>,
}

impl GeneratorForm {
    pub fn new() -> Self {
        GeneratorForm {
            prompt: String::new(),
            model: GenerationModel::GeminiFlashImage,
            aspect_ratio: AspectRatio::Square,
            style: None,
        }
    }

    /// Clear the fields after a successful generate/upload
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Assemble a generation request from the current fields.
    /// A remix source contributes its image as the conditioning input.
    pub fn options(&self, remix: Option<&Pin>) -> GenerationOptions {
        GenerationOptions {
            prompt: self.prompt.trim().to_string(),
            model: self.model,
            aspect_ratio: self.aspect_ratio,
            style: self.style,
            base_image: remix.map(|pin| pin.image_url.clone()),
        }
    }
}

impl Default for GeneratorForm {
    fn default() -> Self {
        Self::new()
    }
}

/// The generator form screen
pub fn generator_form<'a>(
    form: &'a GeneratorForm,
    remix: Option<&'a Pin>,
    is_generating: bool,
) -> Element<'a, Message> {
    let title = if remix.is_some() {
        "Remix this pin"
    } else {
        "Create a pin"
    };

    let mut fields = column![text(title).size(28)].spacing(16);

    if let Some(source) = remix {
        fields = fields.push(
            container(text(format!("Remixing \"{}\"", source.prompt)).size(14))
                .padding(8)
                .width(Length::Fill)
                .style(container::bordered_box),
        );
    }

    fields = fields.push(
        text_input("Describe the pin you want...", &form.prompt)
            .on_input(Message::PromptChanged)
            .padding(10),
    );

    fields = fields.push(
        row![
            text("Model").size(14).width(Length::Fixed(90.0)),
            pick_list(GenerationModel::ALL, Some(form.model), Message::ModelPicked)
                .width(Length::Fill),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
    );

    fields = fields.push(
        row![
            text("Aspect").size(14).width(Length::Fixed(90.0)),
            pick_list(AspectRatio::ALL, Some(form.aspect_ratio), Message::AspectPicked)
                .width(Length::Fill),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
    );

    fields = fields.push(
        row![
            text("Style").size(14).width(Length::Fixed(90.0)),
            pick_list(Style::ALL, form.style, Message::StylePicked)
                .placeholder("Any style")
                .width(Length::Fill),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
    );

    // No on_press while a generation is pending: the button is
    // disabled until the in-flight operation settles
    let generate = if is_generating {
        button(text("Generating...").size(16))
    } else {
        button(text("Generate").size(16)).on_press(Message::GeneratePressed)
    };

    let upload = if is_generating {
        button(text("Upload an image...").size(16))
    } else {
        button(text("Upload an image...").size(16)).on_press(Message::UploadPressed)
    };

    fields = fields.push(
        row![
            generate.padding(10),
            upload.padding(10).style(button::secondary),
            button(text("Cancel").size(16))
                .on_press(Message::GeneratorClosed)
                .padding(10)
                .style(button::text),
        ]
        .spacing(12),
    );

    container(fields.width(Length::Fixed(FORM_WIDTH)))
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(id: &str, url: &str) -> Pin {
        Pin {
            id: id.to_string(),
            image_url: url.to_string(),
            prompt: "source".to_string(),
            width: 512,
            height: 512,
        }
    }

    #[test]
    fn test_options_trim_the_prompt() {
        let mut form = GeneratorForm::new();
        form.prompt = "  misty forest  ".to_string();

        let options = form.options(None);
        assert_eq!(options.prompt, "misty forest");
        assert_eq!(options.base_image, None);
    }

    #[test]
    fn test_remix_seeds_the_base_image() {
        let form = GeneratorForm::new();
        let source = pin("p1", "https://example.com/p1.jpg");

        let options = form.options(Some(&source));
        assert_eq!(
            options.base_image,
            Some("https://example.com/p1.jpg".to_string())
        );
    }
}
