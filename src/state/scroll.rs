/// Edge-triggered pagination trigger
///
/// Watches the sentinel at the bottom of the home feed through an
/// explicit `arm`/`disarm` lifecycle instead of a toolkit-specific
/// visibility observer. `observe` is fed the current sentinel
/// visibility and the session's busy state on every scroll event and
/// fires at most once per visibility transition; the latch re-opens
/// when the sentinel leaves view or when the triggered fetch settles.

/// How close to the bottom edge (in pixels) counts as the sentinel
/// being in view
const SENTINEL_HEIGHT: f32 = 40.0;

#[derive(Debug)]
pub struct ScrollTrigger {
    /// Watching is active (home view + authenticated)
    armed: bool,
    /// A fetch was already triggered for the current visibility spell
    fired: bool,
}

impl ScrollTrigger {
    pub fn new() -> Self {
        ScrollTrigger {
            armed: false,
            fired: false,
        }
    }

    /// Start watching the sentinel (entering the home feed)
    pub fn arm(&mut self) {
        self.armed = true;
        self.fired = false;
    }

    /// Stop watching (leaving home, or feed teardown). Clears the
    /// latch so a stale trigger cannot fire against a rebuilt feed.
    /// In-flight fetches are not cancelled; only re-arming stops.
    pub fn disarm(&mut self) {
        self.armed = false;
        self.fired = false;
    }

    /// Feed the trigger one visibility sample. Returns true exactly
    /// when a page fetch should be issued: armed, sentinel visible,
    /// session not busy, and no fetch already triggered for this
    /// visibility spell.
    pub fn observe(&mut self, sentinel_visible: bool, busy: bool) -> bool {
        if !self.armed {
            return false;
        }
        if !sentinel_visible {
            // Leaving view re-opens the latch
            self.fired = false;
            return false;
        }
        if self.fired || busy {
            return false;
        }

        self.fired = true;
        true
    }

    /// The triggered fetch settled; the caller should re-observe the
    /// current geometry, which may fire again if the sentinel is
    /// still in view.
    pub fn load_settled(&mut self) {
        self.fired = false;
    }
}

impl Default for ScrollTrigger {
    fn default() -> Self {
        Self::new()
    }
}

/// Pure sentinel geometry: is the bottom-of-feed sentinel inside the
/// viewport for this scroll position? Content shorter than the
/// viewport always exposes it.
pub fn sentinel_in_view(offset_y: f32, viewport_height: f32, content_height: f32) -> bool {
    if content_height <= viewport_height {
        return true;
    }
    let remaining = content_height - (offset_y + viewport_height);
    remaining <= SENTINEL_HEIGHT
}
