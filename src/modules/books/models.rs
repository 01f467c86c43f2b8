use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::validation::Rating;

/// Identifier of a book row.
pub type BookId = i64;

/// Identifier of a review row.
pub type ReviewId = i64;

/// Catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier assigned by the store
    pub id: BookId,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Optional blurb
    pub description: Option<String>,
}

/// Book to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: Option<String>,
}

impl NewBook {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        description: Option<&str>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            description: description.map(str::to_string),
        }
    }
}

/// User review attached to one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub book_id: BookId,
    pub username: String,
    /// Always within 1..=5
    pub rating: u8,
    pub comment: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Validated review ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub book_id: BookId,
    pub username: String,
    pub rating: Rating,
    pub comment: String,
    pub created_at: OffsetDateTime,
}

/// A book together with its reviews, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookDetail {
    pub book: Book,
    pub reviews: Vec<Review>,
}

/// Raw review submission as received from a form post.
///
/// Every field is untrusted text; missing fields arrive as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub comment: String,
}

impl ReviewForm {
    pub fn new(
        username: impl Into<String>,
        rating: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            rating: rating.into(),
            comment: comment.into(),
        }
    }

    /// Build a form from decoded `key=value` pairs.
    ///
    /// The first occurrence of a field wins; unknown keys are ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let (mut username, mut rating, mut comment) = (None, None, None);
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "username" => &mut username,
                "rating" => &mut rating,
                "comment" => &mut comment,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        Self {
            username: username.unwrap_or_default(),
            rating: rating.unwrap_or_default(),
            comment: comment.unwrap_or_default(),
        }
    }
}
