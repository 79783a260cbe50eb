//! tkt-core: Core library for the tkt service-ticket tracker
//!
//! Provides the ticket model, the snapshot store and the query views used by
//! the front desk, technician and admin screens. The whole dataset is one
//! JSON document; there is no database and no daemon.

pub mod backend;
pub mod config;
pub mod error;
pub mod id;
pub mod query;
pub mod seed;
pub mod store;
pub mod ticket;

pub use backend::{Backend, FileBackend, MemoryBackend};
pub use config::{Config, DisplayConfig};
pub use error::Error;
pub use id::generate_ticket_id;
pub use query::{AdminQuery, AssigneeFilter, Statistics, StatusFilter};
pub use store::{SCHEMA_VERSION, Snapshot, StorageInfo, TicketStore, backup_file_name};
pub use ticket::{NewTicket, Status, Ticket, TicketPatch, normalize_fee};

/// Result type for tkt operations
pub type Result<T> = std::result::Result<T, Error>;
