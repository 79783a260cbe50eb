//! Snapshot store for tkt tickets
//!
//! The whole dataset is one JSON document held by a [`Backend`]. Nothing is
//! cached: every call reads the blob, and every mutation writes the full
//! snapshot back before returning.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::Backend;
use crate::{Config, Error, Result, Ticket, TicketPatch};

/// Current schema marker
pub const SCHEMA_VERSION: u32 = 1;

fn default_version() -> u32 {
    SCHEMA_VERSION
}

/// Full persisted state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: u32,

    pub tickets: Vec<Ticket>,

    /// False until bootstrap has run once
    #[serde(default)]
    pub initialized: bool,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            tickets: Vec::new(),
            initialized: false,
        }
    }
}

/// Size and count of the stored snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StorageInfo {
    pub version: u32,
    pub ticket_count: usize,
    pub size_bytes: usize,
}

impl StorageInfo {
    /// Render the size as bytes, KB or MB
    pub fn human_size(&self) -> String {
        const KB: usize = 1024;
        const MB: usize = 1024 * 1024;

        let bytes = self.size_bytes;
        if bytes < KB {
            format!("{} bytes", bytes)
        } else if bytes < MB {
            format!("{:.2} KB", bytes as f64 / KB as f64)
        } else {
            format!("{:.2} MB", bytes as f64 / MB as f64)
        }
    }
}

/// Suggested file name for a backup taken on `date`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("ticket-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Ticket store over a blob backend
pub struct TicketStore<B: Backend> {
    backend: B,
}

impl<B: Backend> TicketStore<B> {
    /// Open the store and run first-time bootstrap
    ///
    /// A store that was never initialized gets the demo tickets (if enabled
    /// and the store is empty) and is then marked initialized, so seeding
    /// never runs twice. An explicitly cleared store stays empty.
    pub fn open(backend: B, config: &Config) -> Result<Self> {
        let store = Self { backend };
        let mut snapshot = store.load()?;

        if !snapshot.initialized {
            if snapshot.tickets.is_empty() && config.seed_demo_data {
                snapshot.tickets = crate::seed::demo_tickets(Utc::now());
                tracing::info!(
                    count = snapshot.tickets.len(),
                    location = %store.backend.location(),
                    "seeded demo tickets"
                );
            }
            snapshot.initialized = true;
            store.save(&snapshot)?;
        }

        Ok(store)
    }

    /// Underlying backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Read the persisted snapshot
    ///
    /// Missing storage, text that is not JSON, or a document without a
    /// `tickets` array is not fatal: the old blob is set aside and a fresh,
    /// uninitialized snapshot is written and returned. A well-formed document
    /// holding a ticket that cannot be decoded is an error and nothing is
    /// written.
    pub fn load(&self) -> Result<Snapshot> {
        let Some(blob) = self.backend.read()? else {
            tracing::debug!(location = %self.backend.location(), "no ticket storage yet");
            return self.reset();
        };

        let value = match serde_json::from_str::<Value>(&blob) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    location = %self.backend.location(),
                    error = %e,
                    "ticket storage is not valid JSON, resetting to an empty snapshot"
                );
                self.backend.set_aside(&blob)?;
                return self.reset();
            }
        };

        if !has_ticket_list(&value) {
            tracing::warn!(
                location = %self.backend.location(),
                "ticket storage has no ticket list, resetting to an empty snapshot"
            );
            self.backend.set_aside(&blob)?;
            return self.reset();
        }

        decode_snapshot(value).inspect_err(|e| {
            tracing::warn!(
                location = %self.backend.location(),
                error = %e,
                "ticket storage could not be decoded, leaving it untouched"
            );
        })
    }

    fn reset(&self) -> Result<Snapshot> {
        let fresh = Snapshot::default();
        self.save(&fresh)?;
        Ok(fresh)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let blob = serde_json::to_string(snapshot)?;
        self.backend.write(&blob)?;
        tracing::debug!(
            bytes = blob.len(),
            tickets = snapshot.tickets.len(),
            "persisted snapshot"
        );
        Ok(())
    }

    /// All tickets in stored order
    pub fn get_all(&self) -> Result<Vec<Ticket>> {
        Ok(self.load()?.tickets)
    }

    /// Get a ticket by ID
    pub fn get(&self, id: &str) -> Result<Option<Ticket>> {
        Ok(self.load()?.tickets.into_iter().find(|t| t.id == id))
    }

    /// Overwrite the ticket list, keeping version and initialized
    pub fn replace_all(&mut self, tickets: Vec<Ticket>) -> Result<()> {
        let mut snapshot = self.load()?;
        snapshot.tickets = tickets;
        self.save(&snapshot)
    }

    /// Append a new ticket
    pub fn add(&mut self, ticket: Ticket) -> Result<()> {
        let mut snapshot = self.load()?;
        if snapshot.tickets.iter().any(|t| t.id == ticket.id) {
            return Err(Error::AlreadyExists(ticket.id));
        }
        tracing::info!(id = %ticket.id, "added ticket");
        snapshot.tickets.push(ticket);
        self.save(&snapshot)
    }

    /// Merge a patch into the first ticket with this id
    pub fn update(&mut self, id: &str, patch: &TicketPatch) -> Result<Ticket> {
        let mut snapshot = self.load()?;
        let ticket = snapshot
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        ticket.apply_patch(patch, Utc::now())?;
        let updated = ticket.clone();

        if !patch.is_empty() {
            self.save(&snapshot)?;
        }
        Ok(updated)
    }

    /// Remove every ticket with this id, returning how many were removed
    pub fn remove(&mut self, id: &str) -> Result<usize> {
        let mut snapshot = self.load()?;
        let before = snapshot.tickets.len();
        snapshot.tickets.retain(|t| t.id != id);
        let removed = before - snapshot.tickets.len();

        if removed > 0 {
            tracing::info!(id, removed, "removed ticket");
            self.save(&snapshot)?;
        }
        Ok(removed)
    }

    /// Drop every ticket; seeding will not run again
    pub fn clear(&mut self) -> Result<()> {
        let snapshot = Snapshot {
            version: SCHEMA_VERSION,
            tickets: Vec::new(),
            initialized: true,
        };
        tracing::info!("cleared all tickets");
        self.save(&snapshot)
    }

    /// Full snapshot as pretty JSON, for backups
    pub fn export_snapshot(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.load()?)?)
    }

    /// Replace the whole snapshot with a backup
    ///
    /// The payload must be an object whose `tickets` field is an array of
    /// tickets. On any failure the stored snapshot is left untouched.
    pub fn import_snapshot(&mut self, text: &str) -> Result<()> {
        let snapshot = match parse_backup(text) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "rejected backup import");
                return Err(e);
            }
        };

        tracing::info!(
            version = snapshot.version,
            tickets = snapshot.tickets.len(),
            "imported backup"
        );
        self.save(&snapshot)
    }

    /// Version, ticket count and serialized size
    pub fn storage_info(&self) -> Result<StorageInfo> {
        let snapshot = self.load()?;
        let size_bytes = serde_json::to_string(&snapshot)?.len();
        Ok(StorageInfo {
            version: snapshot.version,
            ticket_count: snapshot.tickets.len(),
            size_bytes,
        })
    }
}

fn has_ticket_list(value: &Value) -> bool {
    value.get("tickets").is_some_and(Value::is_array)
}

/// Decode a parsed snapshot, naming the first ticket that does not decode
fn decode_snapshot(mut value: Value) -> Result<Snapshot> {
    let items = match value.get_mut("tickets") {
        Some(Value::Array(items)) => std::mem::take(items),
        _ => Vec::new(),
    };

    let tickets = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<Ticket>(item).map_err(|e| Error::UnreadableTicket {
                index,
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut snapshot: Snapshot = serde_json::from_value(value)?;
    snapshot.tickets = tickets;
    Ok(snapshot)
}

fn parse_backup(text: &str) -> Result<Snapshot> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| Error::InvalidImport(e.to_string()))?;

    if !has_ticket_list(&value) {
        return Err(Error::InvalidImport("missing \"tickets\" array".to_string()));
    }

    decode_snapshot(value).map_err(|e| Error::InvalidImport(e.to_string()))
}
