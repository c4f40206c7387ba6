//! HTTP access to the aggregation API.

use std::fmt;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    config::AppConfig,
    models::{Contest, Hackathon},
};

/// The two remote collections the dashboard displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Upcoming coding contests.
    Contests,
    /// Hackathon listings.
    Hackathons,
}

impl Collection {
    /// Both collections in display order.
    pub const ALL: [Collection; 2] = [Collection::Contests, Collection::Hackathons];

    /// Lowercase plural noun used in messages.
    pub fn label(self) -> &'static str {
        match self {
            Collection::Contests => "contests",
            Collection::Hackathons => "hackathons",
        }
    }

    fn path(self, config: &AppConfig) -> &str {
        match self {
            Collection::Contests => &config.contests_path,
            Collection::Hackathons => &config.hackathons_path,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a collection could not be loaded.
///
/// The dashboard only ever shows the rendered message, but callers can still
/// tell transport, status and decode failures apart.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("Failed to fetch {collection}: {source}")]
    Transport {
        /// Collection that was requested.
        collection: Collection,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-2xx status.
    #[error("Failed to fetch {collection}: {status} {reason}")]
    Status {
        /// Collection that was requested.
        collection: Collection,
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
    },
    /// The body was not the expected JSON envelope.
    #[error("Failed to read {collection}: {message}")]
    Decode {
        /// Collection that was requested.
        collection: Collection,
        /// What the decoder rejected.
        message: String,
    },
}

impl FetchError {
    /// Collection the failed request targeted.
    pub fn collection(&self) -> Collection {
        match self {
            FetchError::Transport { collection, .. }
            | FetchError::Status { collection, .. }
            | FetchError::Decode { collection, .. } => *collection,
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
}

impl Envelope {
    /// A missing or `null` `data` key yields an empty collection. Elements that
    /// do not match `T` are skipped so one odd record cannot blank the whole view.
    fn into_items<T>(self) -> std::result::Result<Vec<T>, String>
    where
        T: DeserializeOwned,
    {
        let items = match self.data {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(format!(
                    "expected `data` to be an array, found {}",
                    json_kind(&other)
                ))
            }
        };

        let mut parsed = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value(item) {
                Ok(value) => parsed.push(value),
                Err(err) => warn!(index, "Skipping malformed record: {err}"),
            }
        }
        Ok(parsed)
    }
}

/// Unwrap a `{ "data": [...] }` body.
pub fn parse_envelope<T>(body: &[u8]) -> std::result::Result<Vec<T>, String>
where
    T: DeserializeOwned,
{
    let envelope: Envelope = serde_json::from_slice(body).map_err(|err| err.to_string())?;
    envelope.into_items()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Thin wrapper around a shared `reqwest` client bound to the configured API.
#[derive(Clone)]
pub struct ListingClient {
    http: reqwest::Client,
    config: AppConfig,
}

impl ListingClient {
    /// Build a client honouring the configured request timeout.
    pub fn new(config: AppConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, config })
    }

    /// Configuration the client was built from.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Full URL for a collection.
    pub fn endpoint(&self, collection: Collection) -> String {
        self.config.endpoint(collection.path(&self.config))
    }

    /// GET the contests collection.
    pub async fn fetch_contests(&self) -> std::result::Result<Vec<Contest>, FetchError> {
        self.fetch_collection(Collection::Contests).await
    }

    /// GET the hackathons collection.
    pub async fn fetch_hackathons(&self) -> std::result::Result<Vec<Hackathon>, FetchError> {
        self.fetch_collection(Collection::Hackathons).await
    }

    /// GET a collection and unwrap its envelope.
    pub async fn fetch_collection<T>(
        &self,
        collection: Collection,
    ) -> std::result::Result<Vec<T>, FetchError>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(collection);
        debug!(%url, "Fetching {collection}");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport { collection, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                collection,
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let envelope: Envelope = response.json().await.map_err(|source| {
            if source.is_decode() {
                FetchError::Decode {
                    collection,
                    message: source.to_string(),
                }
            } else {
                FetchError::Transport { collection, source }
            }
        })?;
        let items = envelope
            .into_items()
            .map_err(|message| FetchError::Decode { collection, message })?;

        info!(total = items.len(), "Fetched {collection}");
        Ok(items)
    }

    /// Fetch both collections concurrently; each result settles independently.
    pub async fn load_all(
        &self,
    ) -> (
        std::result::Result<Vec<Contest>, FetchError>,
        std::result::Result<Vec<Hackathon>, FetchError>,
    ) {
        tokio::join!(self.fetch_contests(), self.fetch_hackathons())
    }
}
