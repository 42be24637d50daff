//! Repository over a storage backend.
//!
//! All entity persistence goes through this type. It owns key generation,
//! entity mapping and the cascade delete saga; the backend underneath only
//! sees opaque items and keys, so every operation here behaves identically
//! on DynamoDB and on the in-memory backend.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use booktrack_core::book::{sort_books_by_updated_at, Book, BookPatch, BookSort, BookStatus, Note, ReadingEvent};
use booktrack_core::storage::{
    ItemKey, QueryOptions, RepositoryError, Result, StorageBackend, MAX_BATCH_DELETE,
};

use super::{conversions, keys};

/// Default page size for reading-event listings.
pub const DEFAULT_EVENT_LIMIT: usize = 50;

/// Options for listing an owner's books.
///
/// Filtering and sorting both happen in memory after the prefix query; an
/// owner's shelf is small enough that a secondary index is not worth its
/// write amplification.
#[derive(Debug, Clone, Default)]
pub struct ListBooksOptions {
    pub status: Option<BookStatus>,
    pub sort: BookSort,
}

/// Options for listing a book's reading events.
#[derive(Debug, Clone)]
pub struct ListEventsOptions {
    pub limit: usize,
    /// `true` reads oldest first, `false` newest first.
    pub scan_forward: bool,
}

impl Default for ListEventsOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_EVENT_LIMIT,
            scan_forward: true,
        }
    }
}

#[derive(Clone)]
pub struct Repository {
    backend: Arc<dyn StorageBackend>,
}

impl Repository {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    // ========================================================================
    // Books
    // ========================================================================

    /// Store a book, overwriting any previous version. Last writer wins.
    pub async fn put_book(&self, book: &Book) -> Result<()> {
        self.backend.put_item(conversions::book_to_item(book)?).await
    }

    pub async fn get_book(&self, owner_id: &str, book_id: Uuid) -> Result<Option<Book>> {
        let key = ItemKey::new(keys::owner_pk(owner_id), keys::book_sk(book_id));
        match self.backend.get_item(&key).await? {
            Some(item) => Ok(Some(conversions::item_to_book(&item)?)),
            None => Ok(None),
        }
    }

    /// List an owner's books, optionally filtered by status, always sorted
    /// by last update.
    pub async fn list_books(&self, owner_id: &str, options: ListBooksOptions) -> Result<Vec<Book>> {
        let items = self
            .backend
            .query_prefix(
                &keys::owner_pk(owner_id),
                keys::book_sk_prefix(),
                QueryOptions::default(),
            )
            .await?;

        let mut books = items
            .iter()
            .map(conversions::item_to_book)
            .collect::<Result<Vec<_>>>()?;

        if let Some(status) = options.status {
            books.retain(|book| book.status == status);
        }
        sort_books_by_updated_at(&mut books, options.sort);
        Ok(books)
    }

    /// Apply a patch to a stored book and persist the result.
    ///
    /// Read-merge-write without a version check; concurrent updates resolve
    /// to whichever write lands last.
    pub async fn update_book(
        &self,
        owner_id: &str,
        book_id: Uuid,
        patch: BookPatch,
    ) -> Result<Book> {
        let existing = self
            .get_book(owner_id, book_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound {
                entity_type: "Book",
                id: book_id.to_string(),
            })?;

        let updated = patch.apply(&existing, Utc::now());
        self.put_book(&updated).await?;
        Ok(updated)
    }

    /// Delete a book together with all of its notes and reading events.
    ///
    /// Returns `Ok(false)` when the book does not exist; nothing is written
    /// in that case. Children are deleted first and the book row last, in
    /// sequential batches, so an interrupted cascade can leave an orphaned
    /// book but never orphaned children hiding behind a deleted book. There
    /// is no rollback: a failure after the first committed batch surfaces as
    /// [`RepositoryError::CascadeIncomplete`] and the operation is safe to
    /// retry.
    pub async fn delete_book(&self, owner_id: &str, book_id: Uuid) -> Result<bool> {
        let pk = keys::owner_pk(owner_id);
        let book_key = ItemKey::new(pk.clone(), keys::book_sk(book_id));

        if self.backend.get_item(&book_key).await?.is_none() {
            return Ok(false);
        }

        let mut targets = Vec::new();
        for prefix in [keys::note_sk_prefix(book_id), keys::event_sk_prefix(book_id)] {
            let children = self
                .backend
                .query_prefix(&pk, &prefix, QueryOptions::default())
                .await?;
            for child in &children {
                targets.push(conversions::item_key(child)?);
            }
        }
        targets.push(book_key);

        let total = targets.len();
        debug!(
            %book_id,
            rows = total,
            batches = total.div_ceil(MAX_BATCH_DELETE),
            "cascading book delete"
        );

        for (index, chunk) in targets.chunks(MAX_BATCH_DELETE).enumerate() {
            if let Err(err) = self.backend.delete_batch(chunk).await {
                let deleted = index * MAX_BATCH_DELETE;
                if deleted == 0 {
                    return Err(err);
                }
                warn!(
                    %book_id,
                    deleted,
                    remaining = total - deleted,
                    "cascade delete interrupted"
                );
                return Err(RepositoryError::CascadeIncomplete {
                    entity_type: "Book",
                    id: book_id.to_string(),
                    deleted,
                    remaining: total - deleted,
                    reason: err.to_string(),
                });
            }
        }

        Ok(true)
    }

    // ========================================================================
    // Notes
    // ========================================================================

    pub async fn put_note(&self, note: &Note) -> Result<()> {
        self.backend.put_item(conversions::note_to_item(note)?).await
    }

    /// List all notes attached to one book, in range-key order.
    pub async fn list_notes(&self, owner_id: &str, book_id: Uuid) -> Result<Vec<Note>> {
        let items = self
            .backend
            .query_prefix(
                &keys::owner_pk(owner_id),
                &keys::note_sk_prefix(book_id),
                QueryOptions::default(),
            )
            .await?;

        items.iter().map(conversions::item_to_note).collect()
    }

    // ========================================================================
    // Reading events
    // ========================================================================

    pub async fn put_event(&self, event: &ReadingEvent) -> Result<()> {
        self.backend
            .put_item(conversions::event_to_item(event)?)
            .await
    }

    /// List a book's reading events in chronological key order, oldest first
    /// when scanning forward.
    pub async fn list_events(
        &self,
        owner_id: &str,
        book_id: Uuid,
        options: ListEventsOptions,
    ) -> Result<Vec<ReadingEvent>> {
        let items = self
            .backend
            .query_prefix(
                &keys::owner_pk(owner_id),
                &keys::event_sk_prefix(book_id),
                QueryOptions {
                    limit: Some(options.limit),
                    scan_forward: options.scan_forward,
                },
            )
            .await?;

        items.iter().map(conversions::item_to_event).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::inmemory::MemoryBackend;
    use async_trait::async_trait;
    use booktrack_core::storage::Item;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;

    fn repo() -> (Repository, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        (Repository::new(backend.clone()), backend)
    }

    fn book(owner: &str, title: &str) -> Book {
        Book::new(owner, title, BookStatus::Shelf)
    }

    /// Delegates to a memory backend while recording every delete batch size.
    struct RecordingBackend {
        inner: MemoryBackend,
        batch_sizes: Mutex<Vec<usize>>,
    }

    impl RecordingBackend {
        fn new() -> Self {
            Self {
                inner: MemoryBackend::new(),
                batch_sizes: Mutex::new(Vec::new()),
            }
        }

        fn batch_sizes(&self) -> Vec<usize> {
            self.batch_sizes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StorageBackend for RecordingBackend {
        async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>> {
            self.inner.get_item(key).await
        }

        async fn put_item(&self, item: Item) -> Result<()> {
            self.inner.put_item(item).await
        }

        async fn query_prefix(
            &self,
            pk: &str,
            sk_prefix: &str,
            options: QueryOptions,
        ) -> Result<Vec<Item>> {
            self.inner.query_prefix(pk, sk_prefix, options).await
        }

        async fn delete_batch(&self, keys: &[ItemKey]) -> Result<()> {
            self.batch_sizes.lock().unwrap().push(keys.len());
            self.inner.delete_batch(keys).await
        }
    }

    /// Fails every delete batch after the first `succeed` calls.
    struct FlakyBackend {
        inner: MemoryBackend,
        succeed: usize,
        calls: Mutex<usize>,
    }

    impl FlakyBackend {
        fn failing_after(succeed: usize) -> Self {
            Self {
                inner: MemoryBackend::new(),
                succeed,
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl StorageBackend for FlakyBackend {
        async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>> {
            self.inner.get_item(key).await
        }

        async fn put_item(&self, item: Item) -> Result<()> {
            self.inner.put_item(item).await
        }

        async fn query_prefix(
            &self,
            pk: &str,
            sk_prefix: &str,
            options: QueryOptions,
        ) -> Result<Vec<Item>> {
            self.inner.query_prefix(pk, sk_prefix, options).await
        }

        async fn delete_batch(&self, keys: &[ItemKey]) -> Result<()> {
            let fail = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls > self.succeed
            };
            if fail {
                return Err(RepositoryError::QueryFailed(
                    "simulated batch failure".to_string(),
                ));
            }
            self.inner.delete_batch(keys).await
        }
    }

    async fn seed_book_with_children(
        repo: &Repository,
        owner: &str,
        notes: usize,
        events: usize,
    ) -> Book {
        let book = book(owner, "Dune");
        repo.put_book(&book).await.unwrap();
        for i in 0..notes {
            repo.put_note(&Note::new(owner, book.id, format!("note {i}")))
                .await
                .unwrap();
        }
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        for i in 0..events {
            let event =
                ReadingEvent::at(owner, book.id, i as u32, start + Duration::minutes(i as i64));
            repo.put_event(&event).await.unwrap();
        }
        book
    }

    #[tokio::test]
    async fn test_put_and_get_book() {
        let (repo, _) = repo();
        let book = book("user-1", "Dune");

        repo.put_book(&book).await.unwrap();

        assert_eq!(repo.get_book("user-1", book.id).await.unwrap(), Some(book));
    }

    #[tokio::test]
    async fn test_get_missing_book_is_none() {
        let (repo, _) = repo();
        assert_eq!(repo.get_book("user-1", Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_books_defaults_to_most_recent_first() {
        let (repo, _) = repo();
        let mut older = book("user-1", "Older");
        older.updated_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut newer = book("user-1", "Newer");
        newer.updated_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        repo.put_book(&older).await.unwrap();
        repo.put_book(&newer).await.unwrap();

        let books = repo
            .list_books("user-1", ListBooksOptions::default())
            .await
            .unwrap();

        let titles: Vec<_> = books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer", "Older"]);
    }

    #[tokio::test]
    async fn test_list_books_ascending_sort() {
        let (repo, _) = repo();
        let mut older = book("user-1", "Older");
        older.updated_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut newer = book("user-1", "Newer");
        newer.updated_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        repo.put_book(&newer).await.unwrap();
        repo.put_book(&older).await.unwrap();

        let books = repo
            .list_books(
                "user-1",
                ListBooksOptions {
                    sort: BookSort::UpdatedAtAsc,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let titles: Vec<_> = books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Older", "Newer"]);
    }

    #[tokio::test]
    async fn test_list_books_filters_by_status() {
        let (repo, _) = repo();
        let mut reading = book("user-1", "Reading");
        reading.status = BookStatus::Reading;
        repo.put_book(&reading).await.unwrap();
        repo.put_book(&book("user-1", "Shelved")).await.unwrap();

        let books = repo
            .list_books(
                "user-1",
                ListBooksOptions {
                    status: Some(BookStatus::Reading),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Reading");
    }

    #[tokio::test]
    async fn test_list_books_ignores_notes_and_events() {
        let (repo, _) = repo();
        seed_book_with_children(&repo, "user-1", 3, 3).await;

        let books = repo
            .list_books("user-1", ListBooksOptions::default())
            .await
            .unwrap();

        assert_eq!(books.len(), 1);
    }

    #[tokio::test]
    async fn test_update_book_merges_and_persists() {
        let (repo, _) = repo();
        let book = book("user-1", "Dune");
        repo.put_book(&book).await.unwrap();

        let updated = repo
            .update_book("user-1", book.id, BookPatch::current_page(120))
            .await
            .unwrap();

        assert_eq!(updated.current_page, Some(120));
        assert_eq!(updated.title, "Dune");
        assert!(updated.updated_at > book.updated_at);
        assert_eq!(
            repo.get_book("user-1", book.id).await.unwrap(),
            Some(updated)
        );
    }

    #[tokio::test]
    async fn test_update_missing_book_is_not_found() {
        let (repo, _) = repo();
        let result = repo
            .update_book("user-1", Uuid::new_v4(), BookPatch::current_page(1))
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_missing_book_writes_nothing() {
        let backend = Arc::new(RecordingBackend::new());
        let repo = Repository::new(backend.clone());

        let deleted = repo.delete_book("user-1", Uuid::new_v4()).await.unwrap();

        assert!(!deleted);
        assert!(backend.batch_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_delete_book_removes_children() {
        let (repo, backend) = repo();
        let book = seed_book_with_children(&repo, "user-1", 2, 3).await;

        assert!(repo.delete_book("user-1", book.id).await.unwrap());

        assert!(backend.is_empty().await);
        assert_eq!(repo.get_book("user-1", book.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_book_leaves_other_books_alone() {
        let (repo, _) = repo();
        let doomed = seed_book_with_children(&repo, "user-1", 1, 1).await;
        let survivor = book("user-1", "Survivor");
        repo.put_book(&survivor).await.unwrap();
        let survivor_note = Note::new("user-1", survivor.id, "keep me");
        repo.put_note(&survivor_note).await.unwrap();

        repo.delete_book("user-1", doomed.id).await.unwrap();

        assert!(repo.get_book("user-1", survivor.id).await.unwrap().is_some());
        assert_eq!(
            repo.list_notes("user-1", survivor.id).await.unwrap(),
            vec![survivor_note]
        );
    }

    #[tokio::test]
    async fn test_cascade_delete_chunks_at_batch_limit() {
        let backend = Arc::new(RecordingBackend::new());
        let repo = Repository::new(backend.clone());
        // 30 notes + 30 events + the book row = 61 deletes.
        let book = seed_book_with_children(&repo, "user-1", 30, 30).await;

        assert!(repo.delete_book("user-1", book.id).await.unwrap());

        assert_eq!(backend.batch_sizes(), vec![25, 25, 11]);
    }

    #[tokio::test]
    async fn test_cascade_failure_on_first_batch_propagates_raw_error() {
        let backend = Arc::new(FlakyBackend::failing_after(0));
        let repo = Repository::new(backend.clone());
        let book = seed_book_with_children(&repo, "user-1", 5, 0).await;

        let result = repo.delete_book("user-1", book.id).await;

        assert!(matches!(result, Err(RepositoryError::QueryFailed(_))));
    }

    #[tokio::test]
    async fn test_cascade_failure_mid_way_reports_progress() {
        let backend = Arc::new(FlakyBackend::failing_after(1));
        let repo = Repository::new(backend.clone());
        let book = seed_book_with_children(&repo, "user-1", 30, 30).await;

        let result = repo.delete_book("user-1", book.id).await;

        match result {
            Err(RepositoryError::CascadeIncomplete {
                deleted, remaining, ..
            }) => {
                assert_eq!(deleted, 25);
                assert_eq!(remaining, 36);
            }
            other => panic!("expected CascadeIncomplete, got {other:?}"),
        }
        // The book row is deleted last, so a retry still finds it.
        assert!(repo.get_book("user-1", book.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_notes_for_book() {
        let (repo, _) = repo();
        let book = seed_book_with_children(&repo, "user-1", 3, 0).await;

        let notes = repo.list_notes("user-1", book.id).await.unwrap();

        assert_eq!(notes.len(), 3);
        assert!(notes.iter().all(|n| n.book_id == book.id));
    }

    #[tokio::test]
    async fn test_list_events_oldest_first_by_default() {
        let (repo, _) = repo();
        let book = seed_book_with_children(&repo, "user-1", 0, 5).await;

        let events = repo
            .list_events("user-1", book.id, ListEventsOptions::default())
            .await
            .unwrap();

        assert_eq!(events.len(), 5);
        assert!(events.windows(2).all(|w| w[0].occurred_at < w[1].occurred_at));
    }

    #[tokio::test]
    async fn test_list_events_newest_first_with_limit() {
        let (repo, _) = repo();
        let book = seed_book_with_children(&repo, "user-1", 0, 5).await;

        let events = repo
            .list_events(
                "user-1",
                book.id,
                ListEventsOptions {
                    limit: 2,
                    scan_forward: false,
                },
            )
            .await
            .unwrap();

        assert_eq!(events.len(), 2);
        assert!(events[0].occurred_at > events[1].occurred_at);
        assert_eq!(events[0].page, 4);
    }

    #[tokio::test]
    async fn test_owner_isolation() {
        let (repo, _) = repo();
        let book = seed_book_with_children(&repo, "user-1", 1, 1).await;

        assert_eq!(repo.get_book("user-2", book.id).await.unwrap(), None);
        assert!(repo
            .list_books("user-2", ListBooksOptions::default())
            .await
            .unwrap()
            .is_empty());
        assert!(repo.list_notes("user-2", book.id).await.unwrap().is_empty());
    }
}
