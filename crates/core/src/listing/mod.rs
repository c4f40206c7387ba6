//! Listing controller: fetch state, filtering and expansion for remote collections.

/// Per-collection load state and derived display state.
pub mod controller;
/// Both collections wired together with the async fetch scope.
pub mod dashboard;
/// Per-item "show more" flags.
pub mod expansion;
/// Category and free-text predicates.
pub mod filter;

pub use controller::{DisplayState, ListingController, LoadState, LoadTicket};
pub use dashboard::{Dashboard, FetchScope, ListingEvent};
pub use expansion::ExpansionMap;
pub use filter::{filter_listings, CategoryFilter, SearchQuery};

use crate::models::{Contest, Hackathon};

/// Capabilities the controller needs from an entity.
pub trait Listing {
    /// Stable identifier used as the expansion key.
    fn key(&self) -> Option<&str>;
    /// Text matched by the search box.
    fn title(&self) -> Option<&str>;
    /// Category matched by the platform filter, if the entity has one.
    fn category(&self) -> Option<&str> {
        None
    }
    /// Outbound link for the entity.
    fn link(&self) -> Option<&str>;
}

impl Listing for Contest {
    fn key(&self) -> Option<&str> {
        self.url.as_deref().or(self.name.as_deref())
    }

    fn title(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn category(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    fn link(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

impl Listing for Hackathon {
    fn key(&self) -> Option<&str> {
        self.id.as_deref().or(self.title.as_deref())
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn link(&self) -> Option<&str> {
        self.primary_url()
    }
}
