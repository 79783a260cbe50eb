//! Error types for tkt

use crate::Status;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Ticket not found: {0}")]
    NotFound(String),

    #[error("Ticket already exists: {0}")]
    AlreadyExists(String),

    #[error("Unreadable ticket at index {index}: {reason}")]
    UnreadableTicket { index: usize, reason: String },

    #[error("Invalid backup file: {0}")]
    InvalidImport(String),

    #[error("Cannot move ticket from {from} to {to}")]
    InvalidTransition { from: Status, to: Status },

    #[error("Ticket {0} is completed and can no longer be edited")]
    TicketClosed(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
