use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reading status of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookStatus {
    /// On the shelf, not started.
    Shelf,
    /// Currently being read.
    Reading,
    /// Finished.
    Read,
}

/// Physical format of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookFormat {
    Physical,
    Electronic,
}

/// A book owned by a single user.
///
/// Optional fields serialize as explicit `null` when unset; JSON consumers
/// distinguish "present and null" from "absent" and always get the former.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: BookStatus,
    /// Rating from 1 to 5.
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub store: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub bought_at: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub format: Option<BookFormat>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_id: String,
}

impl Book {
    /// Creates a new book with a fresh id and `created_at == updated_at`.
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>, status: BookStatus) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            status,
            rating: None,
            current_page: None,
            total_pages: None,
            price: None,
            currency: None,
            store: None,
            purchase_date: None,
            bought_at: None,
            image_url: None,
            format: None,
            created_at: now,
            updated_at: now,
            owner_id: owner_id.into(),
        }
    }

    /// Sets a specific ID for this book (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// A note attached to a book, owned by the same user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    /// The book this note belongs to.
    pub book_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_id: String,
}

impl Note {
    /// Creates a new note for the given book.
    pub fn new(owner_id: impl Into<String>, book_id: Uuid, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            book_id,
            content: content.into(),
            created_at: now,
            updated_at: now,
            owner_id: owner_id.into(),
        }
    }
}

/// A reading-progress event for a book.
///
/// Events are immutable once written; there is no update or individual
/// delete. Together they form an append-only log of progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingEvent {
    pub id: Uuid,
    /// The book this event belongs to.
    pub book_id: Uuid,
    /// The page reached.
    pub page: u32,
    pub occurred_at: DateTime<Utc>,
    pub owner_id: String,
}

impl ReadingEvent {
    /// Creates a new reading event occurring now.
    pub fn new(owner_id: impl Into<String>, book_id: Uuid, page: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            page,
            occurred_at: Utc::now(),
            owner_id: owner_id.into(),
        }
    }

    /// Creates a reading event at a specific instant (useful for testing).
    pub fn at(
        owner_id: impl Into<String>,
        book_id: Uuid,
        page: u32,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            page,
            occurred_at,
            owner_id: owner_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_book_timestamps_match() {
        let book = Book::new("user-1", "Dune", BookStatus::Reading);
        assert_eq!(book.created_at, book.updated_at);
        assert_eq!(book.owner_id, "user-1");
        assert_eq!(book.status, BookStatus::Reading);
    }

    #[test]
    fn test_book_status_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_value(BookStatus::Shelf).unwrap(),
            serde_json::json!("SHELF")
        );
        assert_eq!(
            serde_json::to_value(BookStatus::Reading).unwrap(),
            serde_json::json!("READING")
        );
        assert_eq!(
            serde_json::to_value(BookStatus::Read).unwrap(),
            serde_json::json!("READ")
        );
    }

    #[test]
    fn test_book_format_round_trip() {
        let json = serde_json::to_string(&BookFormat::Electronic).unwrap();
        assert_eq!(json, "\"ELECTRONIC\"");
        let parsed: BookFormat = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, BookFormat::Electronic);
    }

    #[test]
    fn test_unset_optionals_serialize_as_null() {
        let book = Book::new("user-1", "Dune", BookStatus::Shelf);
        let value = serde_json::to_value(&book).unwrap();
        let object = value.as_object().unwrap();

        for field in [
            "description",
            "rating",
            "currentPage",
            "totalPages",
            "price",
            "currency",
            "store",
            "purchaseDate",
            "boughtAt",
            "imageUrl",
            "format",
        ] {
            assert!(object.contains_key(field), "missing field: {field}");
            assert!(object[field].is_null(), "field not null: {field}");
        }
    }

    #[test]
    fn test_book_deserializes_with_absent_optionals() {
        let json = serde_json::json!({
            "id": "550e8400-e29b-41d4-a716-446655440001",
            "title": "Dune",
            "status": "READ",
            "createdAt": "2024-01-15T10:30:00Z",
            "updatedAt": "2024-01-15T10:30:00Z",
            "ownerId": "user-1",
        });
        let book: Book = serde_json::from_value(json).unwrap();
        assert_eq!(book.title, "Dune");
        assert!(book.image_url.is_none());
        assert!(book.format.is_none());
    }

    #[test]
    fn test_note_belongs_to_book() {
        let book = Book::new("user-1", "Dune", BookStatus::Reading);
        let note = Note::new("user-1", book.id, "Fear is the mind-killer");
        assert_eq!(note.book_id, book.id);
        assert_eq!(note.owner_id, book.owner_id);
    }

    #[test]
    fn test_reading_event_serializes_camel_case() {
        let event = ReadingEvent::new("user-1", Uuid::new_v4(), 42);
        let value = serde_json::to_value(&event).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("bookId"));
        assert!(object.contains_key("occurredAt"));
        assert!(object.contains_key("ownerId"));
        assert_eq!(object["page"], serde_json::json!(42));
    }
}
