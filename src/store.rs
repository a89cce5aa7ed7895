use crate::types::events::{DisasterEvent, EventId};

use serde::Serialize;
use std::collections::HashMap;
use std::collections::HashSet;

/// Deduplicated events of one category, most recently merged first.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    events: Vec<DisasterEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub number: usize,
    pub count: usize,
    pub total: usize,
    pub events: Vec<DisasterEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[DisasterEvent] {
        &self.events
    }

    /// Replaces the collection with the startup seed.
    pub fn load(&mut self, initial: Vec<DisasterEvent>) {
        self.events = collapse_duplicates(initial);
    }

    /// Puts `incoming` in front and keeps the previously held events whose id
    /// is not part of the batch, in their existing order.
    pub fn merge(&mut self, incoming: Vec<DisasterEvent>) {
        let mut merged = collapse_duplicates(incoming);
        let incoming_ids: HashSet<EventId> = merged.iter().map(|event| event.id.clone()).collect();
        merged.extend(
            self.events
                .drain(..)
                .filter(|event| !incoming_ids.contains(&event.id)),
        );
        self.events = merged;
    }

    /// Slice `[(page_number - 1) * page_size, page_number * page_size)`, clipped.
    ///
    /// Both arguments must be at least 1; callers enforce that.
    pub fn paginate(&self, page_size: usize, page_number: usize) -> &[DisasterEvent] {
        debug_assert!(page_size >= 1, "page size must be positive");
        debug_assert!(page_number >= 1, "page number must be positive");
        let start = page_number.saturating_sub(1).saturating_mul(page_size);
        if start >= self.events.len() {
            return &[];
        }
        let end = start.saturating_add(page_size).min(self.events.len());
        &self.events[start..end]
    }

    /// Number of pages, never less than 1.
    pub fn page_count(&self, page_size: usize) -> usize {
        debug_assert!(page_size >= 1, "page size must be positive");
        self.events.len().div_ceil(page_size.max(1)).max(1)
    }

    pub fn page(&self, page_size: usize, page_number: usize) -> Page {
        Page {
            number: page_number,
            count: self.page_count(page_size),
            total: self.events.len(),
            events: self.paginate(page_size, page_number).to_vec(),
        }
    }
}

/// Keeps one entry per id: the position of the first occurrence with the
/// payload of the last one.
fn collapse_duplicates(events: Vec<DisasterEvent>) -> Vec<DisasterEvent> {
    let mut positions: HashMap<EventId, usize> = HashMap::with_capacity(events.len());
    let mut unique: Vec<DisasterEvent> = Vec::with_capacity(events.len());
    for event in events {
        match positions.get(&event.id) {
            Some(&index) => unique[index] = event,
            None => {
                positions.insert(event.id.clone(), unique.len());
                unique.push(event);
            }
        }
    }
    unique
}
