//! Listing DTOs served by the aggregation API.
//!
//! Every field is optional: the API owns these shapes and routinely omits
//! values, so display code falls back to placeholder text instead of failing.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::format;

/// Image shown for hackathons without a thumbnail.
pub const THUMBNAIL_PLACEHOLDER: &str = "/api/placeholder/200/150";

/// A scheduled coding contest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contest {
    /// Display title.
    pub name: Option<String>,
    /// Hosting platform, compared case-insensitively (e.g. `leetcode`).
    pub platform: Option<String>,
    /// ISO-8601 start timestamp.
    pub start_time: Option<String>,
    /// Human-readable duration, displayed verbatim.
    pub duration: Option<String>,
    /// External contest page.
    pub url: Option<String>,
}

impl Contest {
    /// Title shown on the card.
    pub fn display_name(&self) -> &str {
        non_empty(self.name.as_deref()).unwrap_or("Untitled contest")
    }

    /// Platform tag as served by the API.
    pub fn platform_tag(&self) -> &str {
        non_empty(self.platform.as_deref()).unwrap_or("unknown")
    }

    /// Start time rendered in the local timezone.
    pub fn start_label(&self) -> String {
        match non_empty(self.start_time.as_deref()) {
            Some(raw) => format::format_start_time(raw),
            None => "Start time not specified".to_string(),
        }
    }

    /// Duration as served, or "Not specified".
    pub fn duration_label(&self) -> &str {
        non_empty(self.duration.as_deref()).unwrap_or("Not specified")
    }
}

/// Topic tag attached to a hackathon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HackathonTheme {
    /// Theme identifier, string or number on the wire.
    #[serde(deserialize_with = "deserialize_key")]
    pub id: Option<String>,
    /// Display name, rendered as a `#tag`.
    pub name: Option<String>,
}

/// Where a hackathon takes place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayedLocation {
    /// Free-form place name, e.g. `Online`.
    pub location: Option<String>,
}

/// Prize breakdown counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrizeCounts {
    /// Number of cash prizes.
    pub cash: Option<u64>,
}

/// A hackathon listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hackathon {
    /// Unique identifier; the API sends either a number or a string.
    #[serde(deserialize_with = "deserialize_key")]
    pub id: Option<String>,
    /// Display title, also the search target.
    pub title: Option<String>,
    /// Banner image.
    pub thumbnail_url: Option<String>,
    /// Where it takes place.
    pub displayed_location: Option<DisplayedLocation>,
    /// Submission window, already formatted by the API.
    pub submission_period_dates: Option<String>,
    /// Countdown text such as `about 1 month left`.
    pub time_left_to_submission: Option<String>,
    /// Registered participants.
    pub registrations_count: Option<u64>,
    /// Prize text, may contain HTML markup.
    pub prize_amount: Option<String>,
    /// Topic tags.
    pub themes: Option<Vec<HackathonTheme>>,
    /// Hosting organization.
    pub organization_name: Option<String>,
    /// Lifecycle state, e.g. `open` or `upcoming`.
    pub open_state: Option<String>,
    /// Whether entry requires an invitation.
    pub invite_only: Option<bool>,
    /// Prize breakdown.
    pub prizes_counts: Option<PrizeCounts>,
    /// Whether Devpost manages the event.
    pub managed_by_devpost_badge: Option<bool>,
    /// Registration link; present only while submissions are accepted.
    pub start_a_submission_url: Option<String>,
    /// Hackathon page.
    pub url: Option<String>,
    /// Highlighted by the aggregator.
    pub featured: Option<bool>,
}

impl Hackathon {
    /// Title shown on the card.
    pub fn display_title(&self) -> &str {
        non_empty(self.title.as_deref()).unwrap_or("Untitled hackathon")
    }

    /// Location or "Location not specified".
    pub fn location_label(&self) -> &str {
        non_empty(
            self.displayed_location
                .as_ref()
                .and_then(|loc| loc.location.as_deref()),
        )
        .unwrap_or("Location not specified")
    }

    /// Submission window or "Dates not specified".
    pub fn dates_label(&self) -> &str {
        non_empty(self.submission_period_dates.as_deref()).unwrap_or("Dates not specified")
    }

    /// Time left or "Deadline not specified".
    pub fn deadline_label(&self) -> &str {
        non_empty(self.time_left_to_submission.as_deref()).unwrap_or("Deadline not specified")
    }

    /// `None` when the count is absent or zero, matching the card which hides the row.
    pub fn participants_label(&self) -> Option<String> {
        self.registrations_count
            .filter(|count| *count > 0)
            .map(|count| format!("{count} participants"))
    }

    /// Prize pool with markup removed, `None` when no prize is listed.
    pub fn prize_label(&self) -> Option<String> {
        non_empty(self.prize_amount.as_deref())
            .map(|raw| format!("Prize pool: {}", format::strip_tags(raw)))
    }

    /// Theme names in API order.
    pub fn theme_names(&self) -> Vec<&str> {
        self.themes
            .iter()
            .flatten()
            .filter_map(|theme| non_empty(theme.name.as_deref()))
            .collect()
    }

    /// Organization or "Not specified".
    pub fn organization_label(&self) -> &str {
        non_empty(self.organization_name.as_deref()).unwrap_or("Not specified")
    }

    /// Capitalized open state, e.g. `open` becomes `Open`.
    pub fn status_label(&self) -> String {
        match non_empty(self.open_state.as_deref()) {
            Some(state) => format::capitalize(state),
            None => "Not specified".to_string(),
        }
    }

    /// `Yes` or `No`; absent counts as `No`.
    pub fn invite_only_label(&self) -> &'static str {
        yes_no(self.invite_only)
    }

    /// "N cash prize(s)" or "No cash prizes".
    pub fn cash_prizes_label(&self) -> String {
        match self.prizes_counts.as_ref().and_then(|counts| counts.cash) {
            Some(cash) if cash > 0 => format!("{cash} cash prize(s)"),
            _ => "No cash prizes".to_string(),
        }
    }

    /// `Yes` or `No`; absent counts as `No`.
    pub fn managed_by_devpost_label(&self) -> &'static str {
        yes_no(self.managed_by_devpost_badge)
    }

    /// Whether to show the Featured badge.
    pub fn is_featured(&self) -> bool {
        self.featured.unwrap_or(false)
    }

    /// Banner image, or the placeholder used when none is listed.
    pub fn thumbnail_label(&self) -> &str {
        non_empty(self.thumbnail_url.as_deref()).unwrap_or(THUMBNAIL_PLACEHOLDER)
    }

    /// Hackathon page offered under "More Details", only while registration is open.
    pub fn details_url(&self) -> Option<&str> {
        self.registration_url()?;
        non_empty(self.url.as_deref())
    }

    /// Link used by the "register" action, when the hackathon accepts submissions.
    pub fn registration_url(&self) -> Option<&str> {
        non_empty(self.start_a_submission_url.as_deref())
    }

    /// Best outbound link: registration first, then the hackathon page.
    pub fn primary_url(&self) -> Option<&str> {
        self.registration_url()
            .or_else(|| non_empty(self.url.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

fn yes_no(flag: Option<bool>) -> &'static str {
    if flag.unwrap_or(false) {
        "Yes"
    } else {
        "No"
    }
}

/// Accept identifiers sent as strings or numbers and normalise them to strings.
fn deserialize_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}
