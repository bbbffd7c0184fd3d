use std::collections::HashSet;

use chrono::Utc;
use thiserror::Error;

use super::data::{Pin, UploadedPin};

/// Errors raised by the feed store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// A pin with this id already exists. The store refuses the
    /// insert rather than corrupt the collection.
    #[error("pin \"{0}\" is already in the feed")]
    DuplicateId(String),
}

/// Result of appending a fetched page to the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSummary {
    pub added_count: usize,
    pub skipped_count: usize,
}

/// The Feed owns the canonical ordered collection of pins.
///
/// It tracks which pins are saved (favorited) and which were created
/// by this session's own generate/upload actions, and holds the
/// pagination cursor for the ambient feed. Every mutation goes through
/// the methods here; no other component holds a mutable reference.
///
/// Ordering convention: newly created pins are inserted at the front
/// (they surface first in the profile view), paginated pins are
/// appended at the back. Interleaved async completions are therefore
/// order-safe by construction.
#[derive(Debug)]
pub struct Feed {
    pins: Vec<Pin>,
    /// Id index for O(1) duplicate checks
    ids: HashSet<String>,
    saved: HashSet<String>,
    created: HashSet<String>,
    cursor: u64,
    exhausted: bool,
    /// Disambiguates ids minted within the same millisecond
    next_serial: u64,
    pins_version: u64,
    saved_version: u64,
}

impl Feed {
    pub fn new() -> Self {
        Feed {
            pins: Vec::new(),
            ids: HashSet::new(),
            saved: HashSet::new(),
            created: HashSet::new(),
            cursor: 0,
            exhausted: false,
            next_serial: 0,
            pins_version: 0,
            saved_version: 0,
        }
    }

    /// Insert a freshly generated pin at the front of the feed and
    /// tag it as created by this session.
    pub fn insert_created(&mut self, pin: Pin) -> Result<(), FeedError> {
        if self.ids.contains(&pin.id) {
            return Err(FeedError::DuplicateId(pin.id));
        }

        self.ids.insert(pin.id.clone());
        self.created.insert(pin.id.clone());
        self.pins.insert(0, pin);
        self.pins_version += 1;

        Ok(())
    }

    /// Append a fetched page at the back of the feed.
    ///
    /// Duplicate ids are skipped rather than rejected wholesale, so an
    /// overlapping page can never corrupt the collection. Returns how
    /// many pins were added and how many were skipped.
    pub fn extend_page(&mut self, page: Vec<Pin>) -> PageSummary {
        let mut added_count = 0;
        let mut skipped_count = 0;

        for pin in page {
            if self.ids.contains(&pin.id) {
                skipped_count += 1;
                continue;
            }
            self.ids.insert(pin.id.clone());
            self.pins.push(pin);
            added_count += 1;
        }

        if added_count > 0 {
            self.pins_version += 1;
        }

        PageSummary {
            added_count,
            skipped_count,
        }
    }

    /// Ingest a direct upload: synthesize a fresh id, construct the
    /// pin, insert it at the front and tag it as created.
    pub fn ingest(&mut self, upload: UploadedPin) -> Result<Pin, FeedError> {
        let serial = self.next_serial;
        self.next_serial += 1;

        let pin = Pin {
            id: format!("pin-{}-{}", Utc::now().timestamp_millis(), serial),
            image_url: upload.image_url,
            prompt: upload.prompt,
            width: upload.width,
            height: upload.height,
        };

        self.insert_created(pin.clone())?;
        Ok(pin)
    }

    /// Flip saved membership for a pin.
    ///
    /// Returns the new membership, or `None` if the id is not in the
    /// feed. An unknown id is a recoverable condition the caller may
    /// log and otherwise ignore.
    pub fn toggle_save(&mut self, id: &str) -> Option<bool> {
        if !self.ids.contains(id) {
            return None;
        }

        let now_saved = if self.saved.contains(id) {
            self.saved.remove(id);
            false
        } else {
            self.saved.insert(id.to_string());
            true
        };
        self.saved_version += 1;

        Some(now_saved)
    }

    pub fn is_saved(&self, id: &str) -> bool {
        self.saved.contains(id)
    }

    /// All pins, in feed order
    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    /// Saved pins, in feed order
    pub fn saved_pins(&self) -> Vec<Pin> {
        self.pins
            .iter()
            .filter(|pin| self.saved.contains(&pin.id))
            .cloned()
            .collect()
    }

    /// Pins created by this session's generate/upload actions,
    /// newest first (front insertion keeps this ordering for free)
    pub fn created_pins(&self) -> Vec<Pin> {
        self.pins
            .iter()
            .filter(|pin| self.created.contains(&pin.id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// The cursor the next ambient page should be fetched with
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Advance the cursor after a successful page fetch.
    /// `None` marks the ambient feed as exhausted.
    pub fn advance_cursor(&mut self, next: Option<u64>) {
        match next {
            Some(cursor) => self.cursor = cursor,
            None => self.exhausted = true,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Bumped on every change to the pin collection
    pub fn pins_version(&self) -> u64 {
        self.pins_version
    }

    /// Bumped only when saved membership actually changes
    pub fn saved_version(&self) -> u64 {
        self.saved_version
    }
}

impl Default for Feed {
    fn default() -> Self {
        Self::new()
    }
}
