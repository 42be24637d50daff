mod patch;
mod sorting;
mod types;

pub use patch::BookPatch;
pub use sorting::{sort_books_by_updated_at, BookSort};
pub use types::{Book, BookFormat, BookStatus, Note, ReadingEvent};
