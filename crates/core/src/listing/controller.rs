use tracing::{debug, warn};

use super::{filter_listings, CategoryFilter, Listing, SearchQuery};
use crate::fetch::FetchError;

/// Lifecycle of one remote collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet.
    Idle,
    /// A request is in flight.
    Loading,
    /// The last request failed with this message.
    Failed(String),
    /// The last request succeeded.
    Loaded,
}

/// Identifies one load attempt so late responses from superseded attempts can be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// What the presentation layer should show for a collection.
#[derive(Debug, PartialEq)]
pub enum DisplayState<'a, T> {
    /// No response yet.
    Loading,
    /// The fetch failed with this message.
    Error(&'a str),
    /// Loaded, but nothing passes the current filter.
    Empty,
    /// Entities passing the current filter, in source order.
    Populated(Vec<&'a T>),
}

impl<'a, T> DisplayState<'a, T> {
    /// Visible entities, empty for every state but `Populated`.
    pub fn items(&self) -> &[&'a T] {
        match self {
            DisplayState::Populated(items) => items,
            _ => &[],
        }
    }
}

/// Holds a fetched collection together with its load state.
#[derive(Debug)]
pub struct ListingController<T> {
    items: Vec<T>,
    state: LoadState,
    generation: u64,
}

impl<T> Default for ListingController<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            state: LoadState::Idle,
            generation: 0,
        }
    }
}

impl<T: Listing> ListingController<T> {
    /// Create an idle controller with an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a new request as in flight, superseding any earlier one.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = LoadState::Loading;
        LoadTicket(self.generation)
    }

    /// Apply the outcome of a request. Returns `false` when the ticket is stale.
    ///
    /// On failure the collection keeps whatever it held before, so a first
    /// failed load leaves it empty.
    pub fn complete(&mut self, ticket: LoadTicket, result: Result<Vec<T>, FetchError>) -> bool {
        if ticket.0 != self.generation {
            debug!(
                ticket = ticket.0,
                current = self.generation,
                "Dropping stale load result"
            );
            return false;
        }

        match result {
            Ok(items) => {
                self.items = items;
                self.state = LoadState::Loaded;
            }
            Err(err) => {
                warn!(collection = %err.collection(), "Load failed: {err}");
                self.state = LoadState::Failed(err.to_string());
            }
        }
        true
    }

    /// The collection from the last successful load.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Current load state.
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// True until the current request settles. An idle controller counts as loading.
    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Idle | LoadState::Loading)
    }

    /// Message of the last failure, if the latest load failed.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Entities passing the current filter, recomputed on every call.
    pub fn filtered(&self, category: &CategoryFilter, query: &SearchQuery) -> Vec<&T> {
        filter_listings(&self.items, category, query)
    }

    /// Derive the display state: loading, then error, then empty or populated.
    pub fn display(&self, category: &CategoryFilter, query: &SearchQuery) -> DisplayState<'_, T> {
        if self.is_loading() {
            return DisplayState::Loading;
        }
        if let Some(message) = self.error() {
            return DisplayState::Error(message);
        }
        let items = self.filtered(category, query);
        if items.is_empty() {
            DisplayState::Empty
        } else {
            DisplayState::Populated(items)
        }
    }
}
