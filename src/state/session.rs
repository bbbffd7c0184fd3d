/// Session controller: the feed-lifecycle state machine
///
/// Owns the feed store and the in-flight flags for the two async
/// classes of work (pagination, generate-or-upload). Because app
/// state cannot be borrowed across an `await`, every async operation
/// is split into a begin/finish pair: the begin half validates and
/// takes the single-flight guard, the caller runs the gateway future,
/// and the finish half applies the settled result. The guard is
/// released on every finish, success or failure.

use thiserror::Error;

use crate::gateway::{FetchError, GenerationError, Page, UploadError};

use super::data::{GenerationOptions, Pin, UploadedPin};
use super::feed::{Feed, FeedError, PageSummary};

/// Flight state for one async class of work.
/// `InFlight -> InFlight` transitions are rejected, never interleaved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flight {
    Idle,
    InFlight,
}

/// Everything that can go wrong at the session boundary.
///
/// Gateway failures are wrapped here so they surface as values; they
/// never propagate into the view layer as panics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Rejected synchronously, before any async work starts
    #[error("prompt must not be empty")]
    EmptyPrompt,

    /// A generate or upload is already in flight; the prior
    /// operation is unaffected
    #[error("a generation is already in progress")]
    GenerationInProgress,

    /// A page fetch is already in flight
    #[error("a page load is already in progress")]
    LoadInProgress,

    /// The ambient feed reported end-of-feed earlier
    #[error("the feed has no more pages")]
    Exhausted,

    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

#[derive(Debug)]
pub struct Session {
    feed: Feed,
    loading: Flight,
    generating: Flight,
}

impl Session {
    pub fn new() -> Self {
        Session {
            feed: Feed::new(),
            loading: Flight::Idle,
            generating: Flight::Idle,
        }
    }

    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    /// True exactly while a pagination fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.loading == Flight::InFlight
    }

    /// True exactly while a generate or upload is in flight
    pub fn is_generating(&self) -> bool {
        self.generating == Flight::InFlight
    }

    /// Begin a pagination fetch. Returns the cursor to fetch with.
    ///
    /// Rejected while a fetch is already in flight (two concurrent
    /// requests collapse to one), while a generation is pending
    /// (pagination is suppressed until it settles), and once the
    /// ambient feed is exhausted.
    pub fn request_page(&mut self) -> Result<u64, SessionError> {
        if self.loading == Flight::InFlight {
            return Err(SessionError::LoadInProgress);
        }
        if self.generating == Flight::InFlight {
            return Err(SessionError::GenerationInProgress);
        }
        if self.feed.is_exhausted() {
            return Err(SessionError::Exhausted);
        }

        self.loading = Flight::InFlight;
        Ok(self.feed.cursor())
    }

    /// Apply a settled page fetch.
    ///
    /// On success the page is appended and the cursor advances. On
    /// failure the collection and the cursor are left untouched, so a
    /// manual retry re-requests the same page.
    pub fn page_loaded(
        &mut self,
        result: Result<Page, FetchError>,
    ) -> Result<PageSummary, SessionError> {
        self.loading = Flight::Idle;

        let page = result?;
        let summary = self.feed.extend_page(page.pins);
        self.feed.advance_cursor(page.next_cursor);
        Ok(summary)
    }

    /// Begin a generation. Validates the options before any async
    /// work: an empty or whitespace prompt never reaches the gateway.
    pub fn begin_generation(&mut self, options: &GenerationOptions) -> Result<(), SessionError> {
        if options.prompt.trim().is_empty() {
            return Err(SessionError::EmptyPrompt);
        }
        if self.generating == Flight::InFlight {
            return Err(SessionError::GenerationInProgress);
        }

        self.generating = Flight::InFlight;
        Ok(())
    }

    /// Apply a settled generation: front-insert the pin and tag it as
    /// created. On failure the feed is exactly as it was.
    pub fn generation_finished(
        &mut self,
        result: Result<Pin, GenerationError>,
    ) -> Result<Pin, SessionError> {
        self.generating = Flight::Idle;

        let pin = result?;
        self.feed.insert_created(pin.clone())?;
        Ok(pin)
    }

    /// Begin an upload. Shares the generate flight class: at most one
    /// generate-or-upload is in flight per session.
    pub fn begin_upload(&mut self) -> Result<(), SessionError> {
        if self.generating == Flight::InFlight {
            return Err(SessionError::GenerationInProgress);
        }

        self.generating = Flight::InFlight;
        Ok(())
    }

    /// Apply a settled upload. Ingestion is all-or-nothing: a failed
    /// upload never yields a partial pin entry.
    pub fn upload_finished(
        &mut self,
        result: Result<UploadedPin, UploadError>,
    ) -> Result<Pin, SessionError> {
        self.generating = Flight::Idle;

        let upload = result?;
        let pin = self.feed.ingest(upload)?;
        Ok(pin)
    }

    /// Flip saved membership; synchronous from the caller's side.
    /// Unknown ids are reported, not fatal.
    pub fn toggle_save(&mut self, id: &str) -> Option<bool> {
        self.feed.toggle_save(id)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Gateway;
    use crate::state::data::{AspectRatio, GenerationModel};
    use std::future::Future;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Scripted gateway: returns a fixed result and counts calls
    struct MockGateway {
        result: Result<Pin, GenerationError>,
        calls: AtomicU64,
    }

    impl MockGateway {
        fn returning(result: Result<Pin, GenerationError>) -> Self {
            MockGateway {
                result,
                calls: AtomicU64::new(0),
            }
        }

        fn calls(&self) -> u64 {
            self.calls.load(Ordering::Relaxed)
        }
    }

    impl Gateway for MockGateway {
        fn generate(
            &self,
            _options: GenerationOptions,
        ) -> impl Future<Output = Result<Pin, GenerationError>> + Send {
            self.calls.fetch_add(1, Ordering::Relaxed);
            let result = self.result.clone();
            async move { result }
        }

        fn fetch_page(
            &self,
            _cursor: u64,
        ) -> impl Future<Output = Result<Page, FetchError>> + Send {
            async move {
                Ok(Page {
                    pins: Vec::new(),
                    next_cursor: None,
                })
            }
        }

        fn store_upload(
            &self,
            _source: PathBuf,
            prompt: String,
        ) -> impl Future<Output = Result<UploadedPin, UploadError>> + Send {
            async move {
                Ok(UploadedPin {
                    image_url: "file:///tmp/mock.png".to_string(),
                    prompt,
                    width: 64,
                    height: 64,
                })
            }
        }
    }

    /// The exact sequence the update loop runs for a generation
    async fn drive_generation<G: Gateway>(
        session: &mut Session,
        gateway: &G,
        options: GenerationOptions,
    ) -> Result<Pin, SessionError> {
        session.begin_generation(&options)?;
        let result = gateway.generate(options).await;
        session.generation_finished(result)
    }

    fn options(prompt: &str) -> GenerationOptions {
        GenerationOptions {
            prompt: prompt.to_string(),
            model: GenerationModel::GeminiFlashImage,
            aspect_ratio: AspectRatio::Square,
            style: None,
            base_image: None,
        }
    }

    fn pin(id: &str, prompt: &str) -> Pin {
        Pin {
            id: id.to_string(),
            image_url: format!("u-{}", id),
            prompt: prompt.to_string(),
            width: 512,
            height: 512,
        }
    }

    fn page(ids: &[&str], next_cursor: Option<u64>) -> Page {
        Page {
            pins: ids.iter().map(|id| pin(id, "ambient")).collect(),
            next_cursor,
        }
    }

    #[test]
    fn test_concurrent_page_requests_collapse_to_one() {
        let mut session = Session::new();

        assert_eq!(session.request_page(), Ok(0));
        assert!(session.is_loading());

        // Second request while in flight is a no-op rejection
        assert_eq!(session.request_page(), Err(SessionError::LoadInProgress));
        assert_eq!(session.feed().len(), 0);
        assert_eq!(session.feed().cursor(), 0);
    }

    #[test]
    fn test_pagination_is_suppressed_while_generating() {
        let mut session = Session::new();
        session.begin_generation(&options("sunset")).unwrap();

        assert_eq!(
            session.request_page(),
            Err(SessionError::GenerationInProgress)
        );
        assert!(!session.is_loading());
    }

    #[test]
    fn test_page_success_appends_and_advances() {
        let mut session = Session::new();
        session.request_page().unwrap();

        let summary = session
            .page_loaded(Ok(page(&["a", "b"], Some(1))))
            .unwrap();

        assert_eq!(summary.added_count, 2);
        assert!(!session.is_loading());
        assert_eq!(session.feed().cursor(), 1);

        // The next request fetches the following page
        assert_eq!(session.request_page(), Ok(1));
    }

    #[test]
    fn test_failed_page_fetch_retains_cursor() {
        let mut session = Session::new();
        session.request_page().unwrap();

        let err = session
            .page_loaded(Err(FetchError("backend unreachable".to_string())))
            .unwrap_err();

        assert!(matches!(err, SessionError::Fetch(_)));
        assert!(!session.is_loading());
        assert_eq!(session.feed().len(), 0);

        // Manual retry re-requests the same page
        assert_eq!(session.request_page(), Ok(0));
    }

    #[test]
    fn test_exhausted_feed_rejects_further_requests() {
        let mut session = Session::new();
        session.request_page().unwrap();
        session.page_loaded(Ok(page(&["a"], None))).unwrap();

        assert_eq!(session.request_page(), Err(SessionError::Exhausted));
    }

    #[tokio::test]
    async fn test_empty_prompt_never_reaches_the_gateway() {
        let gateway = MockGateway::returning(Ok(pin("p1", "sunset")));
        let mut session = Session::new();

        let err = drive_generation(&mut session, &gateway, options("   "))
            .await
            .unwrap_err();

        assert_eq!(err, SessionError::EmptyPrompt);
        assert_eq!(gateway.calls(), 0);
        assert_eq!(session.feed().len(), 0);
        assert!(!session.is_generating());
    }

    #[tokio::test]
    async fn test_generation_success_scenario() {
        let expected = Pin {
            id: "p1".to_string(),
            image_url: "u1".to_string(),
            prompt: "sunset".to_string(),
            width: 512,
            height: 512,
        };
        let gateway = MockGateway::returning(Ok(expected.clone()));
        let mut session = Session::new();

        let opts = options("sunset");
        session.begin_generation(&opts).unwrap();
        assert!(session.is_generating());

        let result = gateway.generate(opts).await;
        let created = session.generation_finished(result).unwrap();

        assert!(!session.is_generating());
        assert_eq!(created, expected);
        assert_eq!(session.feed().pins(), &[expected.clone()]);
        assert_eq!(session.feed().created_pins(), vec![expected]);
    }

    #[test]
    fn test_second_generation_is_rejected_while_in_flight() {
        let mut session = Session::new();
        session.begin_generation(&options("first")).unwrap();

        assert_eq!(
            session.begin_generation(&options("second")),
            Err(SessionError::GenerationInProgress)
        );

        // The first operation is unaffected and still finishes
        assert!(session.is_generating());
        let finished = session.generation_finished(Ok(pin("p1", "first")));
        assert!(finished.is_ok());
    }

    #[test]
    fn test_generation_failure_leaves_feed_untouched() {
        let mut session = Session::new();
        session.begin_generation(&options("sunset")).unwrap();

        let err = session
            .generation_finished(Err(GenerationError("model overloaded".to_string())))
            .unwrap_err();

        assert!(matches!(err, SessionError::Generation(_)));
        assert!(!session.is_generating());
        assert_eq!(session.feed().len(), 0);
    }

    #[test]
    fn test_duplicate_generated_pin_is_refused_but_flag_clears() {
        let mut session = Session::new();
        session.begin_generation(&options("sunset")).unwrap();
        session.generation_finished(Ok(pin("p1", "sunset"))).unwrap();

        session.begin_generation(&options("sunset again")).unwrap();
        let err = session
            .generation_finished(Ok(pin("p1", "sunset again")))
            .unwrap_err();

        assert!(matches!(err, SessionError::Feed(_)));
        assert!(!session.is_generating());
        assert_eq!(session.feed().len(), 1);
    }

    #[test]
    fn test_upload_success_ingests_and_tags_created() {
        let mut session = Session::new();
        session.begin_upload().unwrap();
        assert!(session.is_generating());

        let upload = UploadedPin {
            image_url: "file:///tmp/cat.png".to_string(),
            prompt: "a cat".to_string(),
            width: 640,
            height: 480,
        };
        let pin = session.upload_finished(Ok(upload)).unwrap();

        assert!(!session.is_generating());
        assert!(!pin.id.is_empty());
        assert_eq!(session.feed().created_pins(), vec![pin]);
    }

    #[test]
    fn test_failed_upload_inserts_nothing() {
        let mut session = Session::new();
        session.begin_upload().unwrap();

        let err = session
            .upload_finished(Err(UploadError("disk full".to_string())))
            .unwrap_err();

        assert!(matches!(err, SessionError::Upload(_)));
        assert!(!session.is_generating());
        assert!(session.feed().is_empty());
    }

    #[test]
    fn test_upload_shares_the_generation_guard() {
        let mut session = Session::new();
        session.begin_generation(&options("busy")).unwrap();

        assert_eq!(
            session.begin_upload(),
            Err(SessionError::GenerationInProgress)
        );
    }
}
