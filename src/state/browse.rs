/// Transient UI state and derived view slices
///
/// `Browse` owns everything the screens need that is not the feed
/// itself: the search term, the active view, the detail selection,
/// the remix seed and the generator-open flag. The derived slices
/// (home-view filtered pins, saved-id lookup set) are pure functions
/// of the feed plus this state, memoized on the feed's version
/// counters so they are recomputed exactly when a dependency changes
/// and never more often. Snapshots come back as `Arc`s whose pointer
/// identity is stable across unrelated recomputations.

use std::collections::HashSet;
use std::sync::Arc;

use super::data::Pin;
use super::feed::Feed;

/// The two screens of the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Profile,
}

#[derive(Debug)]
struct HomeCache {
    pins_version: u64,
    search_term: String,
    view: View,
    pins: Arc<Vec<Pin>>,
}

#[derive(Debug)]
struct SavedCache {
    saved_version: u64,
    ids: Arc<HashSet<String>>,
}

#[derive(Debug)]
pub struct Browse {
    search_term: String,
    current_view: View,
    selected_pin: Option<Pin>,
    pin_to_remix: Option<Pin>,
    generator_open: bool,
    home_cache: Option<HomeCache>,
    saved_cache: Option<SavedCache>,
}

impl Browse {
    pub fn new() -> Self {
        Browse {
            search_term: String::new(),
            current_view: View::Home,
            selected_pin: None,
            pin_to_remix: None,
            generator_open: false,
            home_cache: None,
            saved_cache: None,
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn current_view(&self) -> View {
        self.current_view
    }

    pub fn selected_pin(&self) -> Option<&Pin> {
        self.selected_pin.as_ref()
    }

    pub fn pin_to_remix(&self) -> Option<&Pin> {
        self.pin_to_remix.as_ref()
    }

    pub fn is_generator_open(&self) -> bool {
        self.generator_open
    }

    pub fn set_search(&mut self, term: String) {
        self.search_term = term;
    }

    /// Switch screens. Navigating away from home always resets any
    /// active search.
    pub fn navigate(&mut self, view: View) {
        if view != View::Home {
            self.search_term.clear();
        }
        self.current_view = view;
    }

    pub fn select_pin(&mut self, pin: Pin) {
        self.selected_pin = Some(pin);
    }

    pub fn close_detail(&mut self) {
        self.selected_pin = None;
    }

    pub fn open_generator(&mut self) {
        self.generator_open = true;
    }

    /// Closing the generator also drops any remix seed
    pub fn close_generator(&mut self) {
        self.generator_open = false;
        self.pin_to_remix = None;
    }

    /// Start a remix from an existing pin: the detail selection is
    /// cleared and the generator opens seeded with this pin. The
    /// selection and the remix seed are never both active.
    pub fn start_remix(&mut self, pin: Pin) {
        self.selected_pin = None;
        self.pin_to_remix = Some(pin);
        self.generator_open = true;
    }

    /// A generate or upload just landed: close the form, drop the
    /// remix seed and show the profile so the new pin is visible.
    pub fn pin_created(&mut self) {
        self.generator_open = false;
        self.pin_to_remix = None;
        self.current_view = View::Profile;
    }

    /// Logout teardown: back to a pristine home view
    pub fn reset(&mut self) {
        self.search_term.clear();
        self.current_view = View::Home;
        self.selected_pin = None;
        self.pin_to_remix = None;
        self.generator_open = false;
    }

    /// The pins the home view should render: the feed filtered by a
    /// case-insensitive substring match of the search term against
    /// each prompt, in feed order. When the search term is empty the
    /// feed passes through unfiltered. Off the home view the filter
    /// is not computed at all and the snapshot is empty.
    pub fn home_pins(&mut self, feed: &Feed) -> Arc<Vec<Pin>> {
        if let Some(cache) = &self.home_cache {
            if cache.pins_version == feed.pins_version()
                && cache.view == self.current_view
                && cache.search_term == self.search_term
            {
                return Arc::clone(&cache.pins);
            }
        }

        let pins = if self.current_view != View::Home {
            Vec::new()
        } else if self.search_term.is_empty() {
            feed.pins().to_vec()
        } else {
            let needle = self.search_term.to_lowercase();
            feed.pins()
                .iter()
                .filter(|pin| pin.prompt.to_lowercase().contains(&needle))
                .cloned()
                .collect()
        };

        let pins = Arc::new(pins);
        self.home_cache = Some(HomeCache {
            pins_version: feed.pins_version(),
            search_term: self.search_term.clone(),
            view: self.current_view,
            pins: Arc::clone(&pins),
        });
        pins
    }

    /// Saved-id lookup set for O(1) "is this pin saved" checks while
    /// rendering. Recomputed when saved membership changes and never
    /// more often; pin inserts alone do not invalidate it.
    pub fn saved_ids(&mut self, feed: &Feed) -> Arc<HashSet<String>> {
        if let Some(cache) = &self.saved_cache {
            if cache.saved_version == feed.saved_version() {
                return Arc::clone(&cache.ids);
            }
        }

        let ids: HashSet<String> = feed
            .pins()
            .iter()
            .filter(|pin| feed.is_saved(&pin.id))
            .map(|pin| pin.id.clone())
            .collect();

        let ids = Arc::new(ids);
        self.saved_cache = Some(SavedCache {
            saved_version: feed.saved_version(),
            ids: Arc::clone(&ids),
        });
        ids
    }
}

impl Default for Browse {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(id: &str, prompt: &str) -> Pin {
        Pin {
            id: id.to_string(),
            image_url: format!("u-{}", id),
            prompt: prompt.to_string(),
            width: 512,
            height: 512,
        }
    }

    fn feed_with(prompts: &[(&str, &str)]) -> Feed {
        let mut feed = Feed::new();
        feed.extend_page(prompts.iter().map(|(id, p)| pin(id, p)).collect());
        feed
    }

    #[test]
    fn test_search_filter_is_case_insensitive_and_order_preserving() {
        let feed = feed_with(&[
            ("a", "a red fox"),
            ("b", "blue sky"),
            ("c", "Red Sports Car"),
        ]);
        let mut browse = Browse::new();
        browse.set_search("red".to_string());

        let shown = browse.home_pins(&feed);
        let ids: Vec<&str> = shown.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_empty_search_passes_the_feed_through() {
        let feed = feed_with(&[("a", "one"), ("b", "two")]);
        let mut browse = Browse::new();

        let shown = browse.home_pins(&feed);
        assert_eq!(shown.as_slice(), feed.pins());
    }

    #[test]
    fn test_home_filter_is_not_computed_off_the_home_view() {
        let feed = feed_with(&[("a", "a red fox")]);
        let mut browse = Browse::new();
        browse.set_search("red".to_string());
        browse.navigate(View::Profile);

        assert!(browse.home_pins(&feed).is_empty());
    }

    #[test]
    fn test_home_snapshot_identity_is_stable_across_unrelated_changes() {
        let mut feed = feed_with(&[("a", "one"), ("b", "two")]);
        let mut browse = Browse::new();

        let first = browse.home_pins(&feed);
        let second = browse.home_pins(&feed);
        assert!(Arc::ptr_eq(&first, &second));

        // Saved membership is not a dependency of the home filter
        feed.toggle_save("a");
        let third = browse.home_pins(&feed);
        assert!(Arc::ptr_eq(&first, &third));

        // A collection change is
        feed.insert_created(pin("c", "three")).unwrap();
        let fourth = browse.home_pins(&feed);
        assert!(!Arc::ptr_eq(&first, &fourth));
    }

    #[test]
    fn test_saved_ids_recompute_only_when_saves_change() {
        let mut feed = feed_with(&[("a", "one"), ("b", "two")]);
        let mut browse = Browse::new();

        let empty = browse.saved_ids(&feed);
        assert!(empty.is_empty());

        // A pin insert does not invalidate the saved lookup
        feed.insert_created(pin("c", "three")).unwrap();
        let unchanged = browse.saved_ids(&feed);
        assert!(Arc::ptr_eq(&empty, &unchanged));

        feed.toggle_save("a");
        let updated = browse.saved_ids(&feed);
        assert!(!Arc::ptr_eq(&empty, &updated));
        assert!(updated.contains("a"));
    }

    #[test]
    fn test_navigating_away_from_home_clears_the_search() {
        let mut browse = Browse::new();
        browse.set_search("fox".to_string());

        browse.navigate(View::Profile);
        assert_eq!(browse.search_term(), "");
        assert_eq!(browse.current_view(), View::Profile);

        // Coming back home does not resurrect the old term
        browse.navigate(View::Home);
        assert_eq!(browse.search_term(), "");
    }

    #[test]
    fn test_remix_clears_the_detail_selection() {
        let mut browse = Browse::new();
        let p1 = pin("p1", "sunset");
        browse.select_pin(p1.clone());

        browse.start_remix(p1.clone());

        assert!(browse.selected_pin().is_none());
        assert_eq!(browse.pin_to_remix(), Some(&p1));
        assert!(browse.is_generator_open());
    }

    #[test]
    fn test_pin_created_switches_to_profile() {
        let mut browse = Browse::new();
        browse.start_remix(pin("p1", "sunset"));

        browse.pin_created();

        assert!(!browse.is_generator_open());
        assert!(browse.pin_to_remix().is_none());
        assert_eq!(browse.current_view(), View::Profile);
    }

    #[test]
    fn test_closing_the_generator_drops_the_remix_seed() {
        let mut browse = Browse::new();
        browse.start_remix(pin("p1", "sunset"));

        browse.close_generator();

        assert!(!browse.is_generator_open());
        assert!(browse.pin_to_remix().is_none());
    }

    #[test]
    fn test_reset_returns_to_a_pristine_home_view() {
        let mut browse = Browse::new();
        browse.set_search("fox".to_string());
        browse.select_pin(pin("p1", "sunset"));
        browse.navigate(View::Profile);
        browse.open_generator();

        browse.reset();

        assert_eq!(browse.current_view(), View::Home);
        assert_eq!(browse.search_term(), "");
        assert!(browse.selected_pin().is_none());
        assert!(!browse.is_generator_open());
    }
}
