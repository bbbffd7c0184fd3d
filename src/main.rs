use std::collections::HashSet;
use std::sync::Arc;

use iced::widget::{column, container, scrollable, text, Space};
use iced::{Element, Length, Task, Theme};
use rfd::FileDialog;

mod auth;
mod gateway;
mod state;
mod ui;

use auth::AuthStore;
use gateway::{FetchError, Gateway, GenerationError, Page, StockGateway, UploadError};
use state::browse::{Browse, View};
use state::data::{AspectRatio, GenerationModel, Pin, Style, UploadedPin};
use state::scroll::{self, ScrollTrigger};
use state::session::{Session, SessionError};
use ui::forms::GeneratorForm;

/// Main application state
struct Pinboard {
    /// Persisted session flag, read once at startup
    auth: AuthStore,
    authenticated: bool,
    /// The feed/session core
    session: Session,
    /// Transient UI state and memoized view slices
    browse: Browse,
    trigger: ScrollTrigger,
    form: GeneratorForm,
    gateway: Arc<StockGateway>,
    /// Derived snapshots, refreshed after every message so `view`
    /// only ever reads
    home_pins: Arc<Vec<Pin>>,
    saved_ids: Arc<HashSet<String>>,
    /// Last observed sentinel visibility; only scroll events update
    /// it, so it stays false until the feed actually overflows
    sentinel_visible: bool,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User signed in on the login screen
    LoginPressed,
    /// User signed out from the header
    LogoutPressed,
    /// Search box content changed
    SearchChanged(String),
    /// Header navigation
    NavigateTo(View),
    /// A pin card was clicked open
    PinSelected(Pin),
    DetailClosed,
    /// Remix was requested from the detail panel
    RemixRequested(Pin),
    /// Save was toggled on a card or the detail panel
    SaveToggled(String),
    GeneratorOpened,
    GeneratorClosed,
    PromptChanged(String),
    ModelPicked(GenerationModel),
    AspectPicked(AspectRatio),
    StylePicked(Style),
    /// Generate was submitted from the form
    GeneratePressed,
    /// Background generation settled
    GenerationFinished(Result<Pin, GenerationError>),
    /// Upload was requested from the form
    UploadPressed,
    /// Background upload storage settled
    UploadFinished(Result<UploadedPin, UploadError>),
    /// The home feed scrolled
    FeedScrolled(scrollable::Viewport),
    /// Background page fetch settled
    PageLoaded(Result<Page, FetchError>),
}

impl Pinboard {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let auth = AuthStore::open();
        let authenticated = auth.is_authenticated();

        let status = if authenticated {
            "Loading your feed...".to_string()
        } else {
            "Sign in to start browsing.".to_string()
        };

        let mut app = Pinboard {
            auth,
            authenticated,
            session: Session::new(),
            browse: Browse::new(),
            trigger: ScrollTrigger::new(),
            form: GeneratorForm::new(),
            gateway: Arc::new(StockGateway::new()),
            home_pins: Arc::new(Vec::new()),
            saved_ids: Arc::new(HashSet::new()),
            sentinel_visible: false,
            status,
        };

        let task = if authenticated {
            println!("📌 Pinboard starting with a restored session");
            app.sync_trigger();
            app.begin_page_load()
        } else {
            Task::none()
        };

        (app, task)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let task = self.handle(message);

        // Refresh the derived snapshots so `view` only ever reads.
        // The memo caches make this free when nothing relevant changed.
        self.home_pins = self.browse.home_pins(self.session.feed());
        self.saved_ids = self.browse.saved_ids(self.session.feed());

        task
    }

    fn handle(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::LoginPressed => {
                if let Err(e) = self.auth.login() {
                    eprintln!("⚠️  Could not persist the session flag: {}", e);
                }
                self.authenticated = true;
                self.sentinel_visible = false;
                self.status = "Welcome back!".to_string();
                self.sync_trigger();

                // A fresh session starts with an initial page load
                if self.session.feed().is_empty() {
                    return self.begin_page_load();
                }
                Task::none()
            }
            Message::LogoutPressed => {
                if let Err(e) = self.auth.logout() {
                    eprintln!("⚠️  Could not persist the session flag: {}", e);
                }
                self.authenticated = false;
                self.browse.reset();
                self.form.reset();
                self.sync_trigger();
                self.status = "Signed out.".to_string();
                Task::none()
            }
            Message::SearchChanged(term) => {
                self.browse.set_search(term);
                Task::none()
            }
            Message::NavigateTo(view) => {
                self.browse.navigate(view);
                self.sync_trigger();
                // Coming back to a feed parked at the bottom should
                // resume loading without waiting for a new scroll
                self.maybe_load_more()
            }
            Message::PinSelected(pin) => {
                self.browse.select_pin(pin);
                Task::none()
            }
            Message::DetailClosed => {
                self.browse.close_detail();
                Task::none()
            }
            Message::RemixRequested(pin) => {
                self.status = format!("Remixing \"{}\"", pin.prompt);
                self.browse.start_remix(pin);
                Task::none()
            }
            Message::SaveToggled(id) => {
                match self.session.toggle_save(&id) {
                    Some(true) => self.status = "📌 Pin saved.".to_string(),
                    Some(false) => self.status = "Pin removed from saved.".to_string(),
                    None => eprintln!("⚠️  Ignoring save toggle for unknown pin {}", id),
                }
                Task::none()
            }
            Message::GeneratorOpened => {
                self.browse.open_generator();
                Task::none()
            }
            Message::GeneratorClosed => {
                self.browse.close_generator();
                Task::none()
            }
            Message::PromptChanged(prompt) => {
                self.form.prompt = prompt;
                Task::none()
            }
            Message::ModelPicked(model) => {
                self.form.model = model;
                Task::none()
            }
            Message::AspectPicked(aspect_ratio) => {
                self.form.aspect_ratio = aspect_ratio;
                Task::none()
            }
            Message::StylePicked(style) => {
                self.form.style = Some(style);
                Task::none()
            }
            Message::GeneratePressed => {
                let options = self.form.options(self.browse.pin_to_remix());
                match self.session.begin_generation(&options) {
                    Ok(()) => {
                        self.status = format!("🎨 Generating \"{}\"...", options.prompt);
                        let gateway = Arc::clone(&self.gateway);
                        Task::perform(
                            async move { gateway.generate(options).await },
                            Message::GenerationFinished,
                        )
                    }
                    Err(e) => {
                        self.status = format!("⚠️  {}", e);
                        Task::none()
                    }
                }
            }
            Message::GenerationFinished(result) => {
                match self.session.generation_finished(result) {
                    Ok(pin) => {
                        println!("🎨 Generated pin {} ({})", pin.id, pin.prompt);
                        self.status = format!("✅ Generated \"{}\"", pin.prompt);
                        self.browse.pin_created();
                        self.form.reset();
                        self.sync_trigger();
                    }
                    Err(e) => {
                        eprintln!("⚠️  Generation failed: {}", e);
                        self.status = format!("⚠️  {}", e);
                    }
                }
                // Generation no longer blocks pagination; re-check
                // the sentinel with the geometry we last saw
                self.maybe_load_more()
            }
            Message::UploadPressed => {
                let picked = FileDialog::new()
                    .set_title("Choose an image to upload")
                    .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp", "bmp"])
                    .pick_file();

                let Some(source) = picked else {
                    return Task::none();
                };

                match self.session.begin_upload() {
                    Ok(()) => {
                        self.status = format!("📤 Uploading {}...", source.display());
                        let prompt = self.form.prompt.clone();
                        let gateway = Arc::clone(&self.gateway);
                        Task::perform(
                            async move { gateway.store_upload(source, prompt).await },
                            Message::UploadFinished,
                        )
                    }
                    Err(e) => {
                        self.status = format!("⚠️  {}", e);
                        Task::none()
                    }
                }
            }
            Message::UploadFinished(result) => {
                match self.session.upload_finished(result) {
                    Ok(pin) => {
                        println!("📤 Uploaded pin {} ({})", pin.id, pin.prompt);
                        self.status = format!("✅ Uploaded \"{}\"", pin.prompt);
                        self.browse.pin_created();
                        self.form.reset();
                        self.sync_trigger();
                    }
                    Err(e) => {
                        eprintln!("⚠️  Upload failed: {}", e);
                        self.status = format!("⚠️  {}", e);
                    }
                }
                self.maybe_load_more()
            }
            Message::FeedScrolled(viewport) => {
                self.sentinel_visible = scroll::sentinel_in_view(
                    viewport.absolute_offset().y,
                    viewport.bounds().height,
                    viewport.content_bounds().height,
                );
                self.maybe_load_more()
            }
            Message::PageLoaded(result) => {
                match self.session.page_loaded(result) {
                    Ok(summary) => {
                        println!(
                            "📥 Page loaded: {} new, {} skipped",
                            summary.added_count, summary.skipped_count
                        );
                        self.status = if summary.skipped_count > 0 {
                            format!(
                                "✅ Loaded {} new pins, skipped {} duplicates.",
                                summary.added_count, summary.skipped_count
                            )
                        } else {
                            format!("✅ Loaded {} new pins.", summary.added_count)
                        };

                        if self.session.feed().is_exhausted() {
                            self.trigger.disarm();
                            self.status = format!(
                                "You're all caught up. {} pins in your feed.",
                                self.session.feed().len()
                            );
                        }

                        // The sentinel may still be in view (short
                        // content); keep filling until it leaves or
                        // the feed ends
                        self.trigger.load_settled();
                        self.maybe_load_more()
                    }
                    Err(e) => {
                        eprintln!("⚠️  Page load failed: {}", e);
                        self.status = format!("⚠️  {} Scroll again to retry.", e);
                        // The trigger stays latched: a failed fetch
                        // is never retried automatically, only on a
                        // fresh visibility transition
                        Task::none()
                    }
                }
            }
        }
    }

    /// Arm the trigger exactly while the authenticated home feed is
    /// on screen; disarm it everywhere else so a stale sentinel can
    /// never fire
    fn sync_trigger(&mut self) {
        let watching = self.authenticated
            && self.browse.current_view() == View::Home
            && !self.session.feed().is_exhausted();

        if watching {
            self.trigger.arm();
        } else {
            self.trigger.disarm();
        }
    }

    /// Issue a page fetch if the trigger fires for the current
    /// sentinel visibility
    fn maybe_load_more(&mut self) -> Task<Message> {
        let busy = self.session.is_loading() || self.session.is_generating();
        if self.trigger.observe(self.sentinel_visible, busy) {
            self.begin_page_load()
        } else {
            Task::none()
        }
    }

    /// Start a pagination fetch unless the session refuses
    fn begin_page_load(&mut self) -> Task<Message> {
        match self.session.request_page() {
            Ok(cursor) => {
                let gateway = Arc::clone(&self.gateway);
                Task::perform(
                    async move { gateway.fetch_page(cursor).await },
                    Message::PageLoaded,
                )
            }
            Err(SessionError::Exhausted) => {
                self.trigger.disarm();
                Task::none()
            }
            // Already in flight; the settled handler re-checks
            Err(_) => Task::none(),
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        if !self.authenticated {
            return ui::login_screen();
        }

        let busy = self.session.is_loading() || self.session.is_generating();

        let content: Element<'_, Message> = if self.browse.is_generator_open() {
            ui::forms::generator_form(
                &self.form,
                self.browse.pin_to_remix(),
                self.session.is_generating(),
            )
        } else if let Some(pin) = self.browse.selected_pin() {
            ui::detail_panel(pin, self.saved_ids.contains(&pin.id))
        } else {
            match self.browse.current_view() {
                View::Home => self.home_feed(busy),
                View::Profile => {
                    let created = self.session.feed().created_pins();
                    let saved = self.session.feed().saved_pins();
                    scrollable(ui::profile_page(&created, &saved, &self.saved_ids))
                        .height(Length::Fill)
                        .into()
                }
            }
        };

        column![
            ui::header(&self.browse),
            content,
            container(text(&self.status).size(13)).padding([6.0, 12.0]),
        ]
        .into()
    }

    /// The scrolling home feed with its bottom-of-feed sentinel
    fn home_feed(&self, busy: bool) -> Element<'_, Message> {
        // The notice means "no pins at all", so it is gated on the
        // unfiltered feed; a search that matches nothing just
        // renders an empty grid
        let body: Element<'_, Message> = if self.session.feed().is_empty() && !busy {
            ui::empty_feed_notice()
        } else {
            ui::grid::pin_grid(&self.home_pins, &self.saved_ids)
        };

        let mut feed = column![body].spacing(16).padding(16).width(Length::Fill);

        if busy {
            feed = feed.push(
                container(text("Loading more pins...").size(14))
                    .width(Length::Fill)
                    .center_x(Length::Fill),
            );
        }

        // The sentinel: an empty strip whose visibility drives
        // pagination
        feed = feed.push(Space::with_height(Length::Fixed(40.0)));

        scrollable(feed)
            .on_scroll(Message::FeedScrolled)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    iced::application("Pinboard", Pinboard::update, Pinboard::view)
        .theme(Pinboard::theme)
        .centered()
        .run_with(Pinboard::new)
}
