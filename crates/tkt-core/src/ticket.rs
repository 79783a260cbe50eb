//! Ticket data model for tkt
//!
//! One flat record per customer request. Field names serialize in camelCase
//! so backups stay readable by older exports.

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Ticket status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, Hash)]
pub enum Status {
    #[default]
    Waiting,
    #[serde(rename = "In Progress", alias = "InProgress", alias = "in_progress")]
    InProgress,
    Completed,
}

impl Status {
    /// All statuses in workflow order
    pub const ALL: [Status; 3] = [Status::Waiting, Status::InProgress, Status::Completed];

    /// Sort priority for the technician worklist (1 = first)
    pub fn priority(&self) -> u8 {
        match self {
            Status::Waiting => 1,
            Status::InProgress => 2,
            Status::Completed => 3,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Status::Completed)
    }

    /// Workflow only moves forward: Waiting -> In Progress -> Completed
    pub fn can_transition_to(&self, next: Status) -> bool {
        next.priority() >= self.priority()
    }
}

impl std::str::FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "waiting" => Ok(Status::Waiting),
            "inprogress" => Ok(Status::InProgress),
            "completed" => Ok(Status::Completed),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Waiting => write!(f, "Waiting"),
            Status::InProgress => write!(f, "In Progress"),
            Status::Completed => write!(f, "Completed"),
        }
    }
}

/// Core ticket structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Unique identifier (t-<millis>-<suffix>)
    pub id: String,

    /// Customer name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Customer phone number
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,

    /// Where the work happens
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,

    /// Reported problem
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    /// Image data-URLs or references, in upload order
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,

    /// When the ticket was created
    pub created_at: DateTime<Utc>,

    /// Current status
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: Status,

    /// Technician name, empty when unassigned
    #[serde(default, deserialize_with = "null_as_default")]
    pub assigned_to: String,

    /// First time the ticket left Waiting
    #[serde(default)]
    pub in_progress_at: Option<DateTime<Utc>>,

    /// When the ticket was completed
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    /// What the technician found
    #[serde(default, deserialize_with = "null_as_default")]
    pub root_cause: String,

    /// What the technician did
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions_taken: String,

    /// Service fee in whole currency units
    #[serde(default, deserialize_with = "deserialize_fee")]
    pub fee: u64,
}

impl Ticket {
    /// Create a new waiting ticket with minimal required fields
    pub fn new(id: String, name: String, phone: String) -> Self {
        Self {
            id,
            name,
            phone,
            address: String::new(),
            description: String::new(),
            images: Vec::new(),
            created_at: Utc::now(),
            status: Status::Waiting,
            assigned_to: String::new(),
            in_progress_at: None,
            completed_at: None,
            root_cause: String::new(),
            actions_taken: String::new(),
            fee: 0,
        }
    }

    pub fn is_assigned(&self) -> bool {
        !self.assigned_to.is_empty()
    }

    /// Validate a patch and merge it into this ticket
    ///
    /// Timestamps are stamped with `now`: `in_progress_at` the first time the
    /// status leaves Waiting, `completed_at` the first time it reaches
    /// Completed. Neither is ever cleared.
    pub fn apply_patch(&mut self, patch: &TicketPatch, now: DateTime<Utc>) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        if self.status.is_completed() {
            return Err(Error::TicketClosed(self.id.clone()));
        }
        if let Some(next) = patch.status
            && !self.status.can_transition_to(next)
        {
            return Err(Error::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        if let Some(ref assignee) = patch.assigned_to {
            self.assigned_to = assignee.trim().to_string();
        }
        if let Some(ref cause) = patch.root_cause {
            self.root_cause = cause.trim().to_string();
        }
        if let Some(ref actions) = patch.actions_taken {
            self.actions_taken = actions.trim().to_string();
        }
        if let Some(fee) = patch.fee {
            self.fee = fee;
        }
        self.images.extend(patch.append_images.iter().cloned());

        if let Some(next) = patch.status {
            self.status = next;
            if next != Status::Waiting && self.in_progress_at.is_none() {
                self.in_progress_at = Some(now);
            }
            if next == Status::Completed && self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
        }

        Ok(())
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {} ({})",
            self.id, self.status, self.name, self.phone
        )
    }
}

/// Intake form for a new ticket
#[derive(Debug, Clone, Default)]
pub struct NewTicket {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub description: String,
    pub images: Vec<String>,
}

impl NewTicket {
    /// Trim every field and build a waiting ticket with a fresh id
    pub fn into_ticket(self) -> Ticket {
        let mut ticket = Ticket::new(
            crate::generate_ticket_id(),
            self.name.trim().to_string(),
            self.phone.trim().to_string(),
        );
        ticket.address = self.address.trim().to_string();
        ticket.description = self.description.trim().to_string();
        ticket.images = self
            .images
            .into_iter()
            .map(|image| image.trim().to_string())
            .filter(|image| !image.is_empty())
            .collect();
        ticket
    }
}

/// Fields a technician may change on an existing ticket
///
/// `id`, `created_at` and the customer fields are not patchable; the
/// workflow timestamps are derived from `status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketPatch {
    pub assigned_to: Option<String>,
    pub status: Option<Status>,
    pub root_cause: Option<String>,
    pub actions_taken: Option<String>,
    pub fee: Option<u64>,
    pub append_images: Vec<String>,
}

impl TicketPatch {
    pub fn is_empty(&self) -> bool {
        self.assigned_to.is_none()
            && self.status.is_none()
            && self.root_cause.is_none()
            && self.actions_taken.is_none()
            && self.fee.is_none()
            && self.append_images.is_empty()
    }
}

/// Parse a fee the way a form field would: leading integer or 0
///
/// Leading whitespace and a sign are accepted, trailing garbage is ignored.
/// Negative, non-numeric and out-of-range input all become 0.
pub fn normalize_fee(input: &str) -> u64 {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];

    if negative || digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(0)
}

/// Treat an explicit `null` like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeeInput {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

fn deserialize_fee<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let fee = match Option::<FeeInput>::deserialize(deserializer)? {
        Some(FeeInput::Unsigned(n)) => n,
        Some(FeeInput::Signed(n)) => u64::try_from(n).unwrap_or(0),
        Some(FeeInput::Float(f)) if f.is_finite() && f > 0.0 => f.trunc() as u64,
        Some(FeeInput::Text(s)) => normalize_fee(&s),
        Some(FeeInput::Float(_) | FeeInput::Other(_)) | None => 0,
    };
    Ok(fee)
}
