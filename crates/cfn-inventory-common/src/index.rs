//! Arena-backed record tables with one-shot removal
//!
//! A [`RecordIndex`] keeps records in insertion order in a slot arena.
//! Removing a record empties its slot instead of shifting the tail, so a
//! [`Position`] returned by [`RecordIndex::search`] stays valid until that
//! record is removed and removal is O(1).

use crate::arn::KeyMatcher;
use crate::record::IndexedRecord;
use tracing::trace;

/// Slot handle returned by [`RecordIndex::search`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position(usize);

/// Insertion-ordered record table supporting key search and one-shot removal
#[derive(Debug, Clone)]
pub struct RecordIndex<R> {
    slots: Vec<Option<R>>,
    live: usize,
}

impl<R> Default for RecordIndex<R> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
        }
    }
}

impl<R> FromIterator<R> for RecordIndex<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        let slots: Vec<Option<R>> = iter.into_iter().map(Some).collect();
        let live = slots.len();
        Self { slots, live }
    }
}

impl<R> RecordIndex<R> {
    /// Build an index from records in catalog order.
    pub fn from_records(records: impl IntoIterator<Item = R>) -> Self {
        records.into_iter().collect()
    }

    /// Number of records not yet removed
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of records the index was built with
    pub fn total(&self) -> usize {
        self.slots.len()
    }

    /// Remove the record at `position`.
    ///
    /// Returns `None` if that record was already removed.
    pub fn remove(&mut self, position: Position) -> Option<R> {
        let record = self.slots.get_mut(position.0)?.take()?;
        self.live -= 1;
        trace!(position = position.0, remaining = self.live, "Removed record");
        Some(record)
    }

    /// Remaining records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.slots.iter().flatten()
    }

    /// Consume the index, yielding the remaining records in insertion order.
    pub fn into_remaining(self) -> Vec<R> {
        self.slots.into_iter().flatten().collect()
    }
}

impl<R: IndexedRecord> RecordIndex<R> {
    /// Find the first remaining record whose identifier matches `key`.
    ///
    /// Ties are broken by insertion order, not by match quality.
    pub fn search(&self, key: &str) -> Option<(Position, &R)> {
        let matcher = KeyMatcher::new(key);
        self.search_with(&matcher)
    }

    /// Same as [`search`](Self::search) with an already compiled key.
    pub fn search_with(&self, matcher: &KeyMatcher) -> Option<(Position, &R)> {
        self.slots.iter().enumerate().find_map(|(i, slot)| {
            slot.as_ref()
                .filter(|record| matcher.matches(record.identifier()))
                .map(|record| (Position(i), record))
        })
    }

    /// Search and remove in one step.
    pub fn take(&mut self, key: &str) -> Option<R> {
        let matcher = KeyMatcher::new(key);
        self.take_with(&matcher)
    }

    /// Same as [`take`](Self::take) with an already compiled key.
    pub fn take_with(&mut self, matcher: &KeyMatcher) -> Option<R> {
        let (position, _) = self.search_with(matcher)?;
        self.remove(position)
    }
}
