//! Infinite-scroll pagination trigger
//!
//! The presentation layer renders a sentinel after the last result and reports
//! its visibility. A sentinel exists only while more pages are available and
//! no fetch is in flight; each one is backed by an [`Observation`] that is torn
//! down as soon as that guard changes.

use serde::{Deserialize, Serialize};

/// Identifier of a rendered sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentinelId(pub u64);

/// Visibility ratio at which the sentinel counts as seen
pub const FULL_VISIBILITY: f32 = 1.0;

/// Live observation of one sentinel; unregistered on drop.
#[derive(Debug)]
pub struct Observation {
    sentinel: SentinelId,
}

impl Observation {
    pub fn sentinel(&self) -> SentinelId {
        self.sentinel
    }
}

impl Drop for Observation {
    fn drop(&mut self) {
        tracing::trace!(sentinel = self.sentinel.0, "sentinel observation torn down");
    }
}

/// Decides when the next page should be requested
#[derive(Debug)]
pub struct PaginationTrigger {
    threshold: f32,
    next_id: u64,
    guard: Option<(bool, bool)>,
    observation: Option<Observation>,
}

impl Default for PaginationTrigger {
    fn default() -> Self {
        Self::new(FULL_VISIBILITY)
    }
}

impl PaginationTrigger {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            next_id: 0,
            guard: None,
            observation: None,
        }
    }

    /// Whether the sentinel should be rendered for this state
    pub fn should_render(has_more: bool, is_loading: bool) -> bool {
        has_more && !is_loading
    }

    /// Re-evaluate the guard after a state change.
    ///
    /// When `(has_more, is_loading)` differs from the last call, the current
    /// observation is dropped and, if the sentinel should be rendered, a new
    /// one is registered on a fresh sentinel. Returns the live sentinel.
    pub fn sync(&mut self, has_more: bool, is_loading: bool) -> Option<SentinelId> {
        let guard = (has_more, is_loading);
        if self.guard == Some(guard) {
            return self.sentinel();
        }
        self.guard = Some(guard);
        self.observation = None;

        if Self::should_render(has_more, is_loading) {
            self.next_id += 1;
            let sentinel = SentinelId(self.next_id);
            tracing::trace!(sentinel = sentinel.0, "observing sentinel");
            self.observation = Some(Observation { sentinel });
        }
        self.sentinel()
    }

    /// The sentinel currently observed, if any
    pub fn sentinel(&self) -> Option<SentinelId> {
        self.observation.as_ref().map(Observation::sentinel)
    }

    /// Whether a visibility report should advance the page.
    ///
    /// Reports for sentinels that are no longer observed are ignored.
    pub fn on_visibility(&self, sentinel: SentinelId, ratio: f32, is_loading: bool) -> bool {
        !is_loading && ratio >= self.threshold && self.sentinel() == Some(sentinel)
    }

    /// Stop observing; the next `sync` re-establishes observation.
    pub fn teardown(&mut self) {
        self.observation = None;
        self.guard = None;
    }
}
