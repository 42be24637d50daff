//! Key generation and decoding for the single-table design.
//!
//! Pure functions mapping (owner, entity ids) to partition and range keys
//! and back. All functions are sync and have no side effects. Range keys
//! are never assembled anywhere else; ad hoc string concatenation outside
//! this module risks silent prefix collisions.
//!
//! Owner ids must not contain the `#` delimiter; entity ids are UUIDs and
//! cannot contain it by construction, which keeps the encoding injective.

use booktrack_core::storage::{RepositoryError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

// ============================================================================
// Key prefixes
// ============================================================================

pub const OWNER_PREFIX: &str = "OWNER#";
pub const BOOK_PREFIX: &str = "BOOK#";
pub const NOTE_PREFIX: &str = "NOTE#";
pub const EVENT_PREFIX: &str = "EVENT#";

/// Fixed-width timestamp format embedded in event range keys.
///
/// Millisecond precision with a literal `Z`, so lexicographic key order is
/// chronological order. The event id suffix breaks same-instant ties.
const EVENT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

// ============================================================================
// Partition key
// ============================================================================

/// Generate the partition key for an owner.
///
/// Pattern: `OWNER#<owner_id>`
///
/// All of a user's rows share this key, and no cross-user range query is
/// expressible: isolation by key design, not by query filter.
pub fn owner_pk(owner_id: &str) -> String {
    format!("{OWNER_PREFIX}{owner_id}")
}

// ============================================================================
// Book keys
// ============================================================================

/// Generate the range key for a Book.
///
/// Pattern: `BOOK#<book_id>`
pub fn book_sk(book_id: Uuid) -> String {
    format!("{BOOK_PREFIX}{book_id}")
}

/// Range-key prefix matching all of an owner's Books.
pub fn book_sk_prefix() -> &'static str {
    BOOK_PREFIX
}

/// Extract the book id from a Book range key.
pub fn parse_book_sk(sk: &str) -> Result<Uuid> {
    let rest = sk
        .strip_prefix(BOOK_PREFIX)
        .ok_or_else(|| malformed("Book", sk))?;
    Uuid::parse_str(rest).map_err(|_| malformed("Book", sk))
}

// ============================================================================
// Note keys
// ============================================================================

/// Generate the range key for a Note.
///
/// Pattern: `NOTE#<book_id>#<note_id>`
pub fn note_sk(book_id: Uuid, note_id: Uuid) -> String {
    format!("{NOTE_PREFIX}{book_id}#{note_id}")
}

/// Range-key prefix matching all Notes of one book.
///
/// Pattern: `NOTE#<book_id>#`. The trailing `#` keeps a book id that is a
/// prefix of another id from matching the wrong book.
pub fn note_sk_prefix(book_id: Uuid) -> String {
    format!("{NOTE_PREFIX}{book_id}#")
}

/// Extract (book id, note id) from a Note range key.
pub fn parse_note_sk(sk: &str) -> Result<(Uuid, Uuid)> {
    let rest = sk
        .strip_prefix(NOTE_PREFIX)
        .ok_or_else(|| malformed("Note", sk))?;
    let (book_id, note_id) = rest.split_once('#').ok_or_else(|| malformed("Note", sk))?;
    Ok((
        Uuid::parse_str(book_id).map_err(|_| malformed("Note", sk))?,
        Uuid::parse_str(note_id).map_err(|_| malformed("Note", sk))?,
    ))
}

// ============================================================================
// Reading event keys
// ============================================================================

/// Generate the range key for a ReadingEvent.
///
/// Pattern: `EVENT#<book_id>#<occurred_at>#<event_id>`
///
/// The timestamp segment gives free chronological ordering on prefix
/// queries; no secondary sort is needed at query time.
pub fn event_sk(book_id: Uuid, occurred_at: DateTime<Utc>, event_id: Uuid) -> String {
    format!(
        "{EVENT_PREFIX}{book_id}#{}#{event_id}",
        occurred_at.format(EVENT_TIMESTAMP_FORMAT)
    )
}

/// Range-key prefix matching all ReadingEvents of one book.
///
/// Pattern: `EVENT#<book_id>#`
pub fn event_sk_prefix(book_id: Uuid) -> String {
    format!("{EVENT_PREFIX}{book_id}#")
}

/// Extract (book id, occurred-at, event id) from a ReadingEvent range key.
pub fn parse_event_sk(sk: &str) -> Result<(Uuid, DateTime<Utc>, Uuid)> {
    let rest = sk
        .strip_prefix(EVENT_PREFIX)
        .ok_or_else(|| malformed("ReadingEvent", sk))?;
    let mut parts = rest.splitn(3, '#');
    let book_id = parts.next().ok_or_else(|| malformed("ReadingEvent", sk))?;
    let timestamp = parts.next().ok_or_else(|| malformed("ReadingEvent", sk))?;
    let event_id = parts.next().ok_or_else(|| malformed("ReadingEvent", sk))?;

    let occurred_at = NaiveDateTime::parse_from_str(timestamp, EVENT_TIMESTAMP_FORMAT)
        .map_err(|_| malformed("ReadingEvent", sk))?
        .and_utc();

    Ok((
        Uuid::parse_str(book_id).map_err(|_| malformed("ReadingEvent", sk))?,
        occurred_at,
        Uuid::parse_str(event_id).map_err(|_| malformed("ReadingEvent", sk))?,
    ))
}

fn malformed(entity_type: &str, sk: &str) -> RepositoryError {
    RepositoryError::InvalidData(format!("Malformed {entity_type} range key: {sk}"))
}
