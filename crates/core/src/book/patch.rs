use chrono::{DateTime, NaiveDate, Utc};

use super::types::{Book, BookFormat, BookStatus};

/// A partial update for a [`Book`] with merge semantics.
///
/// Each nullable field is tri-state: `None` leaves the stored value
/// untouched, `Some(None)` clears it to null, `Some(Some(v))` sets it.
/// `title` and `status` are never null, so they use a plain `Option`.
/// `id`, `owner_id` and `created_at` are not patchable.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub status: Option<BookStatus>,
    pub description: Option<Option<String>>,
    pub rating: Option<Option<u8>>,
    pub current_page: Option<Option<u32>>,
    pub total_pages: Option<Option<u32>>,
    pub price: Option<Option<f64>>,
    pub currency: Option<Option<String>>,
    pub store: Option<Option<String>>,
    pub purchase_date: Option<Option<NaiveDate>>,
    pub bought_at: Option<Option<String>>,
    pub image_url: Option<Option<String>>,
    pub format: Option<Option<BookFormat>>,
}

impl BookPatch {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.status.is_none()
            && self.description.is_none()
            && self.rating.is_none()
            && self.current_page.is_none()
            && self.total_pages.is_none()
            && self.price.is_none()
            && self.currency.is_none()
            && self.store.is_none()
            && self.purchase_date.is_none()
            && self.bought_at.is_none()
            && self.image_url.is_none()
            && self.format.is_none()
    }

    /// Convenience patch that only moves the bookmark.
    pub fn current_page(page: u32) -> Self {
        Self {
            current_page: Some(Some(page)),
            ..Self::default()
        }
    }

    /// Applies this patch to an existing book, stamping `updated_at`.
    ///
    /// Fields absent from the patch keep their stored value; fields set to
    /// `Some(None)` are cleared. `id`, `owner_id` and `created_at` always
    /// carry over unchanged.
    pub fn apply(self, existing: &Book, updated_at: DateTime<Utc>) -> Book {
        Book {
            id: existing.id,
            title: self.title.unwrap_or_else(|| existing.title.clone()),
            description: self
                .description
                .unwrap_or_else(|| existing.description.clone()),
            status: self.status.unwrap_or(existing.status),
            rating: self.rating.unwrap_or(existing.rating),
            current_page: self.current_page.unwrap_or(existing.current_page),
            total_pages: self.total_pages.unwrap_or(existing.total_pages),
            price: self.price.unwrap_or(existing.price),
            currency: self.currency.unwrap_or_else(|| existing.currency.clone()),
            store: self.store.unwrap_or_else(|| existing.store.clone()),
            purchase_date: self.purchase_date.unwrap_or(existing.purchase_date),
            bought_at: self.bought_at.unwrap_or_else(|| existing.bought_at.clone()),
            image_url: self.image_url.unwrap_or_else(|| existing.image_url.clone()),
            format: self.format.unwrap_or(existing.format),
            created_at: existing.created_at,
            updated_at,
            owner_id: existing.owner_id.clone(),
        }
    }
}
