use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};

/// Cell value shown for a ride that has no assignee on a given day.
pub const CLOSED: &str = "CLOSED";

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// An attraction and how long one check of it takes.
///
/// Names are the join keys used everywhere else in the state; there are no
/// surrogate IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    #[serde(alias = "ride")]
    pub name: String,
    #[serde(alias = "time", deserialize_with = "lenient_minutes")]
    pub check_minutes: u32,
}

impl Ride {
    pub fn new(name: impl Into<String>, check_minutes: u32) -> Self {
        Self {
            name: name.into(),
            check_minutes,
        }
    }
}

/// A staff member and the rides they are trained to check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    #[serde(alias = "worker")]
    pub name: String,
    #[serde(alias = "canCheck", default)]
    pub qualified_rides: BTreeSet<String>,
}

impl Worker {
    pub fn new<I, S>(name: impl Into<String>, qualified_rides: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            qualified_rides: qualified_rides.into_iter().map(Into::into).collect(),
        }
    }
}

/// Operating constraints for one named day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRestriction {
    pub day: String,
    /// Minutes available before opening, i.e. the per-worker time budget.
    #[serde(alias = "time", deserialize_with = "lenient_minutes")]
    pub open_minutes: u32,
    #[serde(default)]
    pub closed_rides: BTreeSet<String>,
    #[serde(default)]
    pub absent_workers: BTreeSet<String>,
}

impl DayRestriction {
    /// A restriction with nothing closed and nobody absent.
    pub fn open(day: impl Into<String>, open_minutes: u32) -> Self {
        Self {
            day: day.into(),
            open_minutes,
            closed_rides: BTreeSet::new(),
            absent_workers: BTreeSet::new(),
        }
    }

    pub fn with_closed<I, S>(mut self, rides: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.closed_rides = rides.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_absent<I, S>(mut self, workers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.absent_workers = workers.into_iter().map(Into::into).collect();
        self
    }
}

/// One generated day of the assignment table: ride name -> worker name.
///
/// Rides absent from `assignment` are displayed as [`CLOSED`]. This is a
/// cached solver output and is allowed to reference rides, workers and days
/// that no longer exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ridecheck {
    pub day: String,
    #[serde(alias = "ridecheck", default, deserialize_with = "skip_unassigned")]
    pub assignment: BTreeMap<String, String>,
}

impl Ridecheck {
    pub fn new(day: impl Into<String>, assignment: BTreeMap<String, String>) -> Self {
        Self {
            day: day.into(),
            assignment,
        }
    }

    /// The assignee for `ride`, or [`CLOSED`].
    pub fn cell(&self, ride: &str) -> &str {
        self.assignment.get(ride).map_or(CLOSED, String::as_str)
    }
}

/// Minutes as written by any editor: whole numbers as-is, fractions rounded
/// to the nearest minute, and `null` (an emptied cell), negatives or
/// non-numbers-turned-null as 0.
fn lenient_minutes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let minutes = Option::<f64>::deserialize(deserializer)?;
    Ok(match minutes {
        Some(m) if m.is_finite() && m > 0.0 => m.round().min(f64::from(u32::MAX)) as u32,
        _ => 0,
    })
}

/// `null` assignees are dropped, leaving the ride [`CLOSED`].
fn skip_unassigned<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error> {
    let cells = BTreeMap::<String, Option<String>>::deserialize(deserializer)?;
    Ok(cells
        .into_iter()
        .filter_map(|(ride, worker)| worker.map(|w| (ride, w)))
        .collect())
}

// ---------------------------------------------------------------------------
// Whole state
// ---------------------------------------------------------------------------

/// The complete persisted dataset: one immutable snapshot of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub rides: Vec<Ride>,
    #[serde(default)]
    pub workers: Vec<Worker>,
    #[serde(alias = "dayrestrict", default)]
    pub day_restrictions: Vec<DayRestriction>,
    #[serde(default)]
    pub ridechecks: Vec<Ridecheck>,
}

/// Errors converting between [`AppState`] and its serialized blob.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("state blob is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("state blob is not a valid state document: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppState {
    /// A state with every collection empty.
    pub fn empty() -> Self {
        Self {
            rides: Vec::new(),
            workers: Vec::new(),
            day_restrictions: Vec::new(),
            ridechecks: Vec::new(),
        }
    }

    /// Serialize to the UTF-8 JSON blob handed to the persistence layer.
    pub fn to_blob(&self) -> Result<Vec<u8>, BlobError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse a blob previously produced by [`AppState::to_blob`] (or by the
    /// legacy desktop application, whose field names are accepted too).
    pub fn from_blob(blob: &[u8]) -> Result<Self, BlobError> {
        let text = std::str::from_utf8(blob)?;
        Ok(serde_json::from_str(text)?)
    }

    pub fn ride_names(&self) -> Vec<&str> {
        self.rides.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn worker_names(&self) -> Vec<&str> {
        self.workers.iter().map(|w| w.name.as_str()).collect()
    }

    /// Day names in day-restriction order. Duplicates are kept.
    pub fn days(&self) -> Vec<&str> {
        self.day_restrictions.iter().map(|d| d.day.as_str()).collect()
    }

    pub fn ridecheck_days(&self) -> Vec<&str> {
        self.ridechecks.iter().map(|r| r.day.as_str()).collect()
    }

    /// First restriction whose `day` equals `day`.
    pub fn day_restriction(&self, day: &str) -> Option<&DayRestriction> {
        self.day_restrictions.iter().find(|d| d.day == day)
    }

    /// First ridecheck whose `day` equals `day`.
    pub fn ridecheck(&self, day: &str) -> Option<&Ridecheck> {
        self.ridechecks.iter().find(|r| r.day == day)
    }
}

impl Default for AppState {
    fn default() -> Self {
        crate::defaults::default_state()
    }
}
