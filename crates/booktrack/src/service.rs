//! Application services over the repository.
//!
//! The service layer owns the multi-step flows: existence checks before
//! attaching children, the record-page flow that appends an event and moves
//! the bookmark, and the empty-patch shortcut. It never talks to a backend
//! directly.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use booktrack_core::book::{Book, BookFormat, BookPatch, BookStatus, Note, ReadingEvent};
use booktrack_core::storage::Result;

use crate::storage::{ListBooksOptions, ListEventsOptions, Repository};

/// Fields for creating a book. Everything optional starts unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCreate {
    pub title: String,
    pub status: BookStatus,
    #[serde(default)]
    pub description: Option<String>,
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
}

impl BookCreate {
    pub fn new(title: impl Into<String>, status: BookStatus) -> Self {
        Self {
            title: title.into(),
            status,
            description: None,
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
        }
    }

    fn into_book(self, owner_id: &str) -> Book {
        let mut book = Book::new(owner_id, self.title, self.status);
        book.description = self.description;
        book.rating = self.rating;
        book.current_page = self.current_page;
        book.total_pages = self.total_pages;
        book.price = self.price;
        book.currency = self.currency;
        book.store = self.store;
        book.purchase_date = self.purchase_date;
        book.bought_at = self.bought_at;
        book.image_url = self.image_url;
        book.format = self.format;
        book
    }
}

#[derive(Clone)]
pub struct BookService {
    repo: Repository,
}

impl BookService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    // ========================================================================
    // Books
    // ========================================================================

    pub async fn create_book(&self, owner_id: &str, create: BookCreate) -> Result<Book> {
        let book = create.into_book(owner_id);
        self.repo.put_book(&book).await?;
        info!(book_id = %book.id, title = %book.title, "created book");
        Ok(book)
    }

    pub async fn get_book(&self, owner_id: &str, book_id: Uuid) -> Result<Option<Book>> {
        self.repo.get_book(owner_id, book_id).await
    }

    pub async fn list_books(
        &self,
        owner_id: &str,
        options: ListBooksOptions,
    ) -> Result<Vec<Book>> {
        self.repo.list_books(owner_id, options).await
    }

    /// Patch a book. An empty patch reads the stored book without writing,
    /// so `updated_at` does not move.
    pub async fn update_book(
        &self,
        owner_id: &str,
        book_id: Uuid,
        patch: BookPatch,
    ) -> Result<Option<Book>> {
        if patch.is_empty() {
            return self.repo.get_book(owner_id, book_id).await;
        }
        match self.repo.update_book(owner_id, book_id, patch).await {
            Ok(book) => Ok(Some(book)),
            Err(booktrack_core::storage::RepositoryError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn delete_book(&self, owner_id: &str, book_id: Uuid) -> Result<bool> {
        let deleted = self.repo.delete_book(owner_id, book_id).await?;
        if deleted {
            info!(%book_id, "deleted book");
        }
        Ok(deleted)
    }

    // ========================================================================
    // Notes
    // ========================================================================

    /// Attach a note to a book. Returns `None` when the book does not exist.
    pub async fn create_note(
        &self,
        owner_id: &str,
        book_id: Uuid,
        content: impl Into<String>,
    ) -> Result<Option<Note>> {
        if self.repo.get_book(owner_id, book_id).await?.is_none() {
            return Ok(None);
        }
        let note = Note::new(owner_id, book_id, content);
        self.repo.put_note(&note).await?;
        Ok(Some(note))
    }

    pub async fn list_notes(&self, owner_id: &str, book_id: Uuid) -> Result<Vec<Note>> {
        self.repo.list_notes(owner_id, book_id).await
    }

    // ========================================================================
    // Reading events
    // ========================================================================

    /// Record reaching a page: append a reading event, then move the book's
    /// bookmark to that page. Returns `None` when the book does not exist.
    ///
    /// Two writes, no transaction. If the bookmark update fails the event
    /// still stands, which only loses the cached `current_page`, not history.
    pub async fn record_page(
        &self,
        owner_id: &str,
        book_id: Uuid,
        page: u32,
    ) -> Result<Option<(ReadingEvent, Book)>> {
        self.record_page_at(owner_id, book_id, page, Utc::now()).await
    }

    /// Like [`record_page`](Self::record_page) with an explicit instant.
    pub async fn record_page_at(
        &self,
        owner_id: &str,
        book_id: Uuid,
        page: u32,
        occurred_at: DateTime<Utc>,
    ) -> Result<Option<(ReadingEvent, Book)>> {
        if self.repo.get_book(owner_id, book_id).await?.is_none() {
            return Ok(None);
        }
        let event = ReadingEvent::at(owner_id, book_id, page, occurred_at);
        self.repo.put_event(&event).await?;
        let book = self
            .repo
            .update_book(owner_id, book_id, BookPatch::current_page(page))
            .await?;
        Ok(Some((event, book)))
    }

    /// List a book's reading events, newest first.
    pub async fn list_reading_events(
        &self,
        owner_id: &str,
        book_id: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<ReadingEvent>> {
        let options = ListEventsOptions {
            limit: limit.unwrap_or(crate::storage::DEFAULT_EVENT_LIMIT),
            scan_forward: false,
        };
        self.repo.list_events(owner_id, book_id, options).await
    }
}
