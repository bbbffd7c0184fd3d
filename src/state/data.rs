/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the feed store, the gateway, and the UI layer.

use std::fmt;

/// A single entry in the feed: a generated or uploaded image
/// plus its descriptive prompt and intrinsic dimensions.
///
/// Pins are immutable once created. Only their saved-membership
/// tag (tracked by the feed, not the pin itself) ever changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    /// Unique identifier, stable for the pin's lifetime
    pub id: String,
    /// Reference to the rendered image (generated or uploaded)
    pub image_url: String,
    /// Text describing the pin; the sole search key
    pub prompt: String,
    /// Intrinsic image width in pixels, used for layout sizing
    pub width: u32,
    /// Intrinsic image height in pixels
    pub height: u32,
}

/// The fixed set of generation backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationModel {
    GeminiFlashImage,
    Imagen4,
}

impl GenerationModel {
    /// All models, in picker order
    pub const ALL: [GenerationModel; 2] = [
        GenerationModel::GeminiFlashImage,
        GenerationModel::Imagen4,
    ];

    /// Backend identifier sent with a generation request
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationModel::GeminiFlashImage => "gemini-2.5-flash-image",
            GenerationModel::Imagen4 => "imagen-4.0-generate-001",
        }
    }
}

impl fmt::Display for GenerationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed set of output aspect ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    Square,
    Portrait,
    Wide,
}

impl AspectRatio {
    /// All ratios, in picker order
    pub const ALL: [AspectRatio; 3] = [
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Wide,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Wide => "16:9",
        }
    }

    /// Pixel dimensions a generated image comes back with
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (1024, 1024),
            AspectRatio::Portrait => (720, 1280),
            AspectRatio::Wide => (1280, 720),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed style vocabulary for generation requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Photorealistic,
    Illustration,
    Anime,
    FantasyArt,
    Cinematic,
    Render3d,
    Minimalist,
    Watercolor,
}

impl Style {
    /// All styles, in picker order
    pub const ALL: [Style; 8] = [
        Style::Photorealistic,
        Style::Illustration,
        Style::Anime,
        Style::FantasyArt,
        Style::Cinematic,
        Style::Render3d,
        Style::Minimalist,
        Style::Watercolor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Photorealistic => "Photorealistic",
            Style::Illustration => "Illustration",
            Style::Anime => "Anime",
            Style::FantasyArt => "Fantasy Art",
            Style::Cinematic => "Cinematic",
            Style::Render3d => "3D Render",
            Style::Minimalist => "Minimalist",
            Style::Watercolor => "Watercolor",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transient input to a generation request.
/// Constructed per request and discarded after use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    pub prompt: String,
    pub model: GenerationModel,
    pub aspect_ratio: AspectRatio,
    pub style: Option<Style>,
    /// Reference image for image-conditioned generation ("remix")
    pub base_image: Option<String>,
}

/// Transient payload for a direct upload.
///
/// Structurally a [`Pin`] minus the id; the feed assigns an id
/// when the upload is ingested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPin {
    pub image_url: String,
    pub prompt: String,
    pub width: u32,
    pub height: u32,
}
