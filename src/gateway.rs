/// Generation/upload gateway
///
/// The gateway is the opaque async boundary behind the session: it
/// produces new pins from generation options, pages of ambient pins
/// from a cursor, and stored upload payloads from local files. The
/// session validates inputs and guards concurrency; the gateway only
/// has to settle every future it hands out.

use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use thiserror::Error;
use tokio::task;

use crate::state::data::{GenerationOptions, Pin, UploadedPin};

/// Pins per ambient page
const PAGE_SIZE: usize = 12;

/// Pages the stock provider serves before reporting end-of-feed
const STOCK_PAGES: u64 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("generation failed: {0}")]
pub struct GenerationError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("page fetch failed: {0}")]
pub struct FetchError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("upload failed: {0}")]
pub struct UploadError(pub String);

/// One page of ambient pins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub pins: Vec<Pin>,
    /// Cursor for the following page; `None` means end of feed
    pub next_cursor: Option<u64>,
}

/// External boundary that performs generation, upload storage, and
/// ambient-feed pagination.
///
/// Every future returned here must eventually settle; the session
/// keeps its in-flight flag raised until it does.
pub trait Gateway: Send + Sync {
    /// Produce a new pin from the given options. The prompt has
    /// already been validated as non-empty.
    fn generate(
        &self,
        options: GenerationOptions,
    ) -> impl Future<Output = Result<Pin, GenerationError>> + Send;

    /// Fetch the ambient page at `cursor`.
    fn fetch_page(&self, cursor: u64) -> impl Future<Output = Result<Page, FetchError>> + Send;

    /// Store a local image for upload: probe its intrinsic dimensions
    /// and copy it into app-owned storage. All-or-nothing; a failure
    /// here must leave no partial payload behind.
    fn store_upload(
        &self,
        source: PathBuf,
        prompt: String,
    ) -> impl Future<Output = Result<UploadedPin, UploadError>> + Send;
}

/// Prompts the stock provider cycles through for ambient pins
const STOCK_PROMPTS: [&str; 16] = [
    "Misty pine forest at dawn",
    "Neon-lit rainy street in Tokyo",
    "A lighthouse on a basalt cliff",
    "Macro shot of a dew-covered leaf",
    "Mid-century living room, warm light",
    "Snow leopard resting on a ledge",
    "Abandoned greenhouse overgrown with ivy",
    "Hot air balloons over Cappadocia",
    "A ceramic bowl of ramen, steam rising",
    "Star trails above a desert arch",
    "Old bookshop with ladders and brass lamps",
    "Surfer silhouetted against a sunset wave",
    "Terraced rice fields after rain",
    "A fox crossing a snowy meadow",
    "Minimalist concrete staircase, hard shadows",
    "Fishing boats in a Nordic harbor",
];

/// Card dimensions the stock provider rotates through, varied so the
/// grid gets a masonry feel
const STOCK_SIZES: [(u32, u32); 6] = [
    (600, 900),
    (800, 600),
    (700, 700),
    (600, 1067),
    (900, 600),
    (640, 960),
];

/// Deterministic offline gateway.
///
/// Serves placeholder image URLs seeded from the request, so the app
/// is fully functional without a generation backend and every test
/// sees reproducible pages.
pub struct StockGateway {
    upload_dir: PathBuf,
    /// Counts generation requests; keeps minted ids unique
    generated: AtomicU64,
}

impl StockGateway {
    pub fn new() -> Self {
        Self::with_upload_dir(default_upload_dir())
    }

    /// Use a specific upload directory (tests point this at a
    /// temporary location)
    pub fn with_upload_dir(upload_dir: PathBuf) -> Self {
        StockGateway {
            upload_dir,
            generated: AtomicU64::new(0),
        }
    }
}

impl Default for StockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl Gateway for StockGateway {
    fn generate(
        &self,
        options: GenerationOptions,
    ) -> impl Future<Output = Result<Pin, GenerationError>> + Send {
        let serial = self.generated.fetch_add(1, Ordering::Relaxed);

        async move {
            let (width, height) = options.aspect_ratio.dimensions();

            // Seed the placeholder from everything that shapes the
            // output, so remixes and styled requests render distinctly
            let mut seed = fold_seed(0, options.prompt.as_bytes());
            seed = fold_seed(seed, options.model.as_str().as_bytes());
            if let Some(style) = options.style {
                seed = fold_seed(seed, style.as_str().as_bytes());
            }
            if let Some(base) = &options.base_image {
                seed = fold_seed(seed, base.as_bytes());
            }

            Ok(Pin {
                id: format!("pin-gen-{}-{}", Utc::now().timestamp_millis(), serial),
                image_url: format!(
                    "https://picsum.photos/seed/{:x}/{}/{}",
                    seed, width, height
                ),
                prompt: options.prompt,
                width,
                height,
            })
        }
    }

    fn fetch_page(&self, cursor: u64) -> impl Future<Output = Result<Page, FetchError>> + Send {
        async move {
            if cursor >= STOCK_PAGES {
                return Ok(Page {
                    pins: Vec::new(),
                    next_cursor: None,
                });
            }

            let pins = (0..PAGE_SIZE)
                .map(|slot| {
                    let ordinal = cursor as usize * PAGE_SIZE + slot;
                    let (width, height) = STOCK_SIZES[ordinal % STOCK_SIZES.len()];
                    Pin {
                        id: format!("pin-ambient-{}-{}", cursor, slot),
                        image_url: format!(
                            "https://picsum.photos/seed/ambient-{}/{}/{}",
                            ordinal, width, height
                        ),
                        prompt: STOCK_PROMPTS[ordinal % STOCK_PROMPTS.len()].to_string(),
                        width,
                        height,
                    }
                })
                .collect();

            let next = cursor + 1;
            Ok(Page {
                pins,
                next_cursor: if next < STOCK_PAGES { Some(next) } else { None },
            })
        }
    }

    fn store_upload(
        &self,
        source: PathBuf,
        prompt: String,
    ) -> impl Future<Output = Result<UploadedPin, UploadError>> + Send {
        let upload_dir = self.upload_dir.clone();

        async move {
            // Probing decodes the image header; spawn_blocking keeps
            // the CPU work off the async executor
            let probe = source.clone();
            let (width, height) = task::spawn_blocking(move || image::image_dimensions(&probe))
                .await
                .map_err(|e| UploadError(format!("task join error: {}", e)))?
                .map_err(|e| UploadError(format!("could not read image: {}", e)))?;

            tokio::fs::create_dir_all(&upload_dir)
                .await
                .map_err(|e| UploadError(format!("could not create upload directory: {}", e)))?;

            let file_name = source
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| "upload".to_string());
            let dest = upload_dir.join(format!("{}-{}", Utc::now().timestamp_millis(), file_name));

            tokio::fs::copy(&source, &dest)
                .await
                .map_err(|e| UploadError(format!("could not store image: {}", e)))?;

            // An uploaded pin should always be searchable; fall back
            // to the file stem when no prompt was entered
            let prompt = if prompt.trim().is_empty() {
                source
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().to_string())
                    .unwrap_or_else(|| "Untitled upload".to_string())
            } else {
                prompt
            };

            Ok(UploadedPin {
                image_url: dest.display().to_string(),
                prompt,
                width,
                height,
            })
        }
    }
}

/// Cheap deterministic byte fold for placeholder seeds
fn fold_seed(seed: u64, bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(seed, |acc, &b| acc.wrapping_mul(31).wrapping_add(b as u64))
}

/// Where uploaded images are stored:
/// `<data_dir>/pinboard/uploads` (falls back to the home directory)
fn default_upload_dir() -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(|| dirs::home_dir())
        .expect("Could not determine user data directory");

    path.push("pinboard");
    path.push("uploads");
    path
}
