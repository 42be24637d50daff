//! Entity mapper: domain records to stored items and back.
//!
//! Items are the camelCase serde projection of an entity plus the `pk`,
//! `sk` and `entityType` attributes. Mapping back verifies the entity tag;
//! a malformed stored item is a data-corruption condition, not a normal
//! error path. Pure functions, testable without any backend.

use booktrack_core::book::{Book, Note, ReadingEvent};
use booktrack_core::storage::{Item, ItemKey, RepositoryError, Result};
use serde_json::Value;

use super::keys;

// ============================================================================
// Entity type constants
// ============================================================================

pub const ENTITY_TYPE_BOOK: &str = "BOOK";
pub const ENTITY_TYPE_NOTE: &str = "NOTE";
pub const ENTITY_TYPE_EVENT: &str = "EVENT";

// ============================================================================
// Book conversions
// ============================================================================

/// Convert a Book to a stored item.
pub fn book_to_item(book: &Book) -> Result<Item> {
    let mut item = to_attributes(book)?;
    item.insert("pk".to_string(), Value::String(keys::owner_pk(&book.owner_id)));
    item.insert("sk".to_string(), Value::String(keys::book_sk(book.id)));
    item.insert(
        "entityType".to_string(),
        Value::String(ENTITY_TYPE_BOOK.to_string()),
    );
    Ok(item)
}

/// Convert a stored item to a Book.
pub fn item_to_book(item: &Item) -> Result<Book> {
    expect_entity_type(item, ENTITY_TYPE_BOOK)?;
    from_attributes(item)
}

// ============================================================================
// Note conversions
// ============================================================================

/// Convert a Note to a stored item.
pub fn note_to_item(note: &Note) -> Result<Item> {
    let mut item = to_attributes(note)?;
    item.insert("pk".to_string(), Value::String(keys::owner_pk(&note.owner_id)));
    item.insert(
        "sk".to_string(),
        Value::String(keys::note_sk(note.book_id, note.id)),
    );
    item.insert(
        "entityType".to_string(),
        Value::String(ENTITY_TYPE_NOTE.to_string()),
    );
    Ok(item)
}

/// Convert a stored item to a Note.
pub fn item_to_note(item: &Item) -> Result<Note> {
    expect_entity_type(item, ENTITY_TYPE_NOTE)?;
    from_attributes(item)
}

// ============================================================================
// Reading event conversions
// ============================================================================

/// Convert a ReadingEvent to a stored item.
pub fn event_to_item(event: &ReadingEvent) -> Result<Item> {
    let mut item = to_attributes(event)?;
    item.insert(
        "pk".to_string(),
        Value::String(keys::owner_pk(&event.owner_id)),
    );
    item.insert(
        "sk".to_string(),
        Value::String(keys::event_sk(event.book_id, event.occurred_at, event.id)),
    );
    item.insert(
        "entityType".to_string(),
        Value::String(ENTITY_TYPE_EVENT.to_string()),
    );
    Ok(item)
}

/// Convert a stored item to a ReadingEvent.
pub fn item_to_event(item: &Item) -> Result<ReadingEvent> {
    expect_entity_type(item, ENTITY_TYPE_EVENT)?;
    from_attributes(item)
}

// ============================================================================
// Helper functions
// ============================================================================

/// Extract the (pk, sk) pair of a stored item, e.g. to build a delete
/// request for a row returned by a prefix query.
pub fn item_key(item: &Item) -> Result<ItemKey> {
    let pk = get_string(item, "pk")?;
    let sk = get_string(item, "sk")?;
    Ok(ItemKey::new(pk, sk))
}

fn to_attributes<T: serde::Serialize>(entity: &T) -> Result<Item> {
    match serde_json::to_value(entity) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(RepositoryError::Serialization(
            "Entity did not serialize to an object".to_string(),
        )),
        Err(e) => Err(RepositoryError::Serialization(e.to_string())),
    }
}

fn from_attributes<T: serde::de::DeserializeOwned>(item: &Item) -> Result<T> {
    serde_json::from_value(Value::Object(item.clone()))
        .map_err(|e| RepositoryError::Serialization(e.to_string()))
}

fn expect_entity_type(item: &Item, expected: &'static str) -> Result<()> {
    let actual = get_string(item, "entityType")?;
    if actual != expected {
        return Err(RepositoryError::InvalidData(format!(
            "Expected entityType {expected}, got {actual}"
        )));
    }
    Ok(())
}

fn get_string(item: &Item, key: &str) -> Result<String> {
    item.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {key}")))
}
