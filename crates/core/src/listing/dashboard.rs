use std::collections::HashMap;

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info};

use super::{
    CategoryFilter, DisplayState, ExpansionMap, ListingController, LoadTicket, SearchQuery,
};
use crate::{
    fetch::{Collection, FetchError, ListingClient},
    models::{Contest, Hackathon},
};

/// Result of a background fetch, tagged with the ticket it answers.
#[derive(Debug)]
pub enum ListingEvent {
    /// Outcome of a contest fetch.
    Contests {
        /// Load attempt this result answers.
        ticket: LoadTicket,
        /// Fetched entities or the failure.
        result: Result<Vec<Contest>, FetchError>,
    },
    /// Outcome of a hackathon fetch.
    Hackathons {
        /// Load attempt this result answers.
        ticket: LoadTicket,
        /// Fetched entities or the failure.
        result: Result<Vec<Hackathon>, FetchError>,
    },
}

/// Contests and hackathons plus the view criteria shared between them.
///
/// The two collections load and fail independently; an error in one never
/// hides the other.
#[derive(Debug, Default)]
pub struct Dashboard {
    contests: ListingController<Contest>,
    hackathons: ListingController<Hackathon>,
    category: CategoryFilter,
    query: SearchQuery,
    expansion: ExpansionMap,
}

impl Dashboard {
    /// Empty dashboard with both collections idle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Contest collection and its load state.
    pub fn contests(&self) -> &ListingController<Contest> {
        &self.contests
    }

    /// Hackathon collection and its load state.
    pub fn hackathons(&self) -> &ListingController<Hackathon> {
        &self.hackathons
    }

    /// Active platform filter.
    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    /// Change the platform filter.
    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
    }

    /// Current search text.
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Mutable access to the search text.
    pub fn query_mut(&mut self) -> &mut SearchQuery {
        &mut self.query
    }

    /// Expanded hackathon detail panels.
    pub fn expansion(&self) -> &ExpansionMap {
        &self.expansion
    }

    /// Flip the detail panel for a hackathon.
    pub fn toggle_expansion(&mut self, key: &str) -> bool {
        self.expansion.toggle(key)
    }

    /// Whether a hackathon's detail panel is open.
    pub fn is_expanded(&self, key: &str) -> bool {
        self.expansion.is_expanded(key)
    }

    /// True until both collections have settled.
    pub fn is_loading(&self) -> bool {
        self.contests.is_loading() || self.hackathons.is_loading()
    }

    /// Contests filtered by platform and search text.
    pub fn visible_contests(&self) -> DisplayState<'_, Contest> {
        self.contests.display(&self.category, &self.query)
    }

    /// Hackathons filtered by search text; they carry no platform.
    pub fn visible_hackathons(&self) -> DisplayState<'_, Hackathon> {
        self.hackathons.display(&CategoryFilter::All, &self.query)
    }

    /// Start a load for one collection. Filter, search and expansion are kept.
    pub fn begin_load(&mut self, collection: Collection) -> LoadTicket {
        match collection {
            Collection::Contests => self.contests.begin_load(),
            Collection::Hackathons => self.hackathons.begin_load(),
        }
    }

    /// Fold a fetch result into state. Returns `false` for stale results.
    pub fn apply(&mut self, event: ListingEvent) -> bool {
        match event {
            ListingEvent::Contests { ticket, result } => self.contests.complete(ticket, result),
            ListingEvent::Hackathons { ticket, result } => {
                self.hackathons.complete(ticket, result)
            }
        }
    }
}

/// Owns the in-flight fetch tasks for a dashboard.
///
/// Dropping the scope aborts every outstanding request, so results never
/// arrive after the view that asked for them is gone.
pub struct FetchScope {
    client: ListingClient,
    sender: mpsc::Sender<ListingEvent>,
    tasks: HashMap<Collection, JoinHandle<()>>,
}

impl FetchScope {
    /// Scope that reports results on `sender`.
    pub fn new(client: ListingClient, sender: mpsc::Sender<ListingEvent>) -> Self {
        Self {
            client,
            sender,
            tasks: HashMap::new(),
        }
    }

    /// Fetch one collection in the background, replacing any request already in flight for it.
    pub fn spawn(&mut self, dashboard: &mut Dashboard, collection: Collection) {
        let ticket = dashboard.begin_load(collection);
        let client = self.client.clone();
        let sender = self.sender.clone();

        let handle = tokio::spawn(async move {
            let event = match collection {
                Collection::Contests => ListingEvent::Contests {
                    ticket,
                    result: client.fetch_contests().await,
                },
                Collection::Hackathons => ListingEvent::Hackathons {
                    ticket,
                    result: client.fetch_hackathons().await,
                },
            };
            if sender.send(event).await.is_err() {
                debug!("Dashboard gone before {collection} arrived");
            }
        });

        if let Some(previous) = self.tasks.insert(collection, handle) {
            previous.abort();
        }
    }

    /// Fetch both collections concurrently.
    pub fn spawn_all(&mut self, dashboard: &mut Dashboard) {
        info!("Loading all collections");
        for collection in Collection::ALL {
            self.spawn(dashboard, collection);
        }
    }

    /// Number of fetches that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.tasks
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Abort all outstanding fetches.
    pub fn cancel(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}

impl Drop for FetchScope {
    fn drop(&mut self) {
        self.cancel();
    }
}
