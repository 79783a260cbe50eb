//! ID generation for tickets
//!
//! Format: t-<unix millis>-<suffix>. The millisecond stamp keeps ids roughly
//! ordered by creation, the hashed suffix keeps two tickets created in the
//! same millisecond apart without any coordination.

use sha2::{Digest, Sha256};
use uuid::Uuid;

const PREFIX: &str = "t";
const SUFFIX_LEN: usize = 9;

/// Generate a unique ticket ID
///
/// Uses UUID + nanosecond timestamp hash, encoded as base32 lowercase.
pub fn generate_ticket_id() -> String {
    let now = chrono::Utc::now();
    let uuid = Uuid::new_v4();
    let nanos = now.timestamp_nanos_opt().unwrap_or(0);

    let mut hasher = Sha256::new();
    hasher.update(uuid.as_bytes());
    hasher.update(nanos.to_le_bytes());

    let hash = hasher.finalize();

    // 8 bytes encode to 13 base32 chars, enough for the suffix
    let suffix = base32::encode(base32::Alphabet::Crockford, &hash[..8])
        .to_lowercase()
        .chars()
        .take(SUFFIX_LEN)
        .collect::<String>();

    format!("{}-{}-{}", PREFIX, now.timestamp_millis(), suffix)
}

/// Build the id of the n-th seeded ticket
pub(crate) fn seed_ticket_id(millis: i64, n: usize) -> String {
    format!("{}-{}-{}", PREFIX, millis, n)
}

/// Check that text looks like a ticket id (`t-<digits>-<alphanumeric>`)
pub fn is_ticket_id(text: &str) -> bool {
    let mut parts = text.splitn(3, '-');
    let (Some(prefix), Some(millis), Some(suffix)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    prefix == PREFIX
        && !millis.is_empty()
        && millis.chars().all(|c| c.is_ascii_digit())
        && !suffix.is_empty()
        && suffix.chars().all(|c| c.is_ascii_alphanumeric())
}
