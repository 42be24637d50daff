//! End-to-end tour against the in-memory backend.
//!
//! Run with: cargo run -p booktrack --example quickstart

use booktrack::config::StorageConfig;
use booktrack::service::{BookCreate, BookService};
use booktrack::storage::{backend_from_config, ListBooksOptions, Repository};
use booktrack_core::book::BookStatus;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let backend = backend_from_config(&StorageConfig::InMemory).await?;
    let service = BookService::new(Repository::new(backend));
    let owner = "demo-user";

    let mut create = BookCreate::new("Dune", BookStatus::Reading);
    create.total_pages = Some(412);
    let book = service.create_book(owner, create).await?;
    println!("created {} ({})", book.title, book.id);

    service
        .create_note(owner, book.id, "Fear is the mind-killer")
        .await?;

    let (event, book) = service
        .record_page(owner, book.id, 120)
        .await?
        .expect("book exists");
    println!(
        "reached page {} at {}; bookmark now {:?}",
        event.page, event.occurred_at, book.current_page
    );

    for book in service.list_books(owner, ListBooksOptions::default()).await? {
        println!(
            "{} [{:?}] page {:?}/{:?}",
            book.title, book.status, book.current_page, book.total_pages
        );
    }

    let deleted = service.delete_book(owner, book.id).await?;
    println!("deleted with notes and events: {deleted}");

    Ok(())
}
