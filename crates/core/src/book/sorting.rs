use serde::{Deserialize, Serialize};

use super::types::Book;

/// Sort order for book listings.
///
/// Wire values match the query parameter the API layer accepts:
/// `updatedAt_desc` (default) and `updatedAt_asc`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookSort {
    #[default]
    #[serde(rename = "updatedAt_desc")]
    UpdatedAtDesc,
    #[serde(rename = "updatedAt_asc")]
    UpdatedAtAsc,
}

/// Sorts books by `updated_at` in the requested direction.
///
/// Always applied to listing results: the physical key order of the store
/// is unrelated to `updated_at` and must not be relied on for books.
pub fn sort_books_by_updated_at(books: &mut [Book], sort: BookSort) {
    match sort {
        BookSort::UpdatedAtAsc => books.sort_by_key(|b| b.updated_at),
        BookSort::UpdatedAtDesc => books.sort_by_key(|b| std::cmp::Reverse(b.updated_at)),
    }
}
