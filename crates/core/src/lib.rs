#![warn(clippy::all, missing_docs)]

//! Core logic for the contest and hackathon dashboard.
//!
//! This crate hosts the listing models, configuration handling, the HTTP
//! client for the aggregation API and the listing controller that filters
//! and tracks the fetched collections for the terminal UI and any future
//! frontends.

pub mod config;
pub mod fetch;
pub mod format;
pub mod listing;
pub mod models;

pub use config::AppConfig;
pub use fetch::{Collection, FetchError, ListingClient};
pub use listing::{
    CategoryFilter, Dashboard, DisplayState, ExpansionMap, FetchScope, Listing, ListingController,
    ListingEvent, LoadState, SearchQuery,
};
pub use models::{Contest, Hackathon, HackathonTheme};
