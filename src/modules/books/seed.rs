use super::error::BooksResult;
use super::models::NewBook;
use super::repository::BookRepository;

/// Result of a seeding pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The catalog was empty and has been populated.
    Seeded { inserted: usize },
    /// Books already existed; nothing was written.
    AlreadySeeded { existing: i64 },
}

/// Books inserted into an empty catalog.
pub fn default_catalog() -> Vec<NewBook> {
    vec![
        NewBook::new(
            "Clean Code",
            "Robert C. Martin",
            Some("A handbook of agile software craftsmanship."),
        ),
        NewBook::new(
            "Fluent Python",
            "Luciano Ramalho",
            Some("Clear, practical guidance for Python developers."),
        ),
        NewBook::new(
            "Deep Learning",
            "Ian Goodfellow, Yoshua Bengio, Aaron Courville",
            Some("Comprehensive textbook on deep learning."),
        ),
    ]
}

/// Populate the catalog with [`default_catalog`] if it holds no books.
///
/// Safe to run on every startup. Two processes seeding the same empty file
/// at once can both insert.
pub async fn seed_books(repo: &BookRepository) -> BooksResult<SeedOutcome> {
    let existing = repo.count_books().await?;
    if existing > 0 {
        tracing::debug!(existing, "catalog already populated; skipping seed");
        return Ok(SeedOutcome::AlreadySeeded { existing });
    }

    let inserted = repo.insert_books(default_catalog()).await?.len();
    tracing::info!(inserted, "seeded empty catalog");
    Ok(SeedOutcome::Seeded { inserted })
}
