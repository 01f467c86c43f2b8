//! Review submission validation.
//!
//! Everything here is pure: no storage access, no clock. The submission
//! handler persists only what [`validate_review`] accepts.

use thiserror::Error;

use super::models::ReviewForm;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Star rating in `MIN_RATING..=MAX_RATING`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: i64) -> Result<Self, RatingError> {
        u8::try_from(value)
            .ok()
            .filter(|rating| (MIN_RATING..=MAX_RATING).contains(rating))
            .map(Self)
            .ok_or(RatingError::OutOfRange(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    #[error("rating '{0}' is not an integer")]
    NotAnInteger(String),

    #[error("rating {0} is outside 1..=5")]
    OutOfRange(i64),
}

/// Parse a rating written as a base-10 integer.
///
/// Decimal forms such as `"4.5"` or `"4.0"` are rejected, as is any
/// surrounding whitespace; callers trim first.
pub fn parse_rating(raw: &str) -> Result<Rating, RatingError> {
    let value: i64 = raw
        .parse()
        .map_err(|_| RatingError::NotAnInteger(raw.to_string()))?;
    Rating::new(value)
}

/// Reasons a review submission is rejected.
///
/// The `Display` text is shown to the submitter verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("All fields are required.")]
    MissingFields { missing: Vec<&'static str> },

    #[error("Rating must be a number between 1 and 5.")]
    InvalidRating(#[source] RatingError),
}

impl ValidationError {
    /// Machine-readable detail entries for error envelopes
    pub fn details(&self) -> Vec<serde_json::Value> {
        match self {
            ValidationError::MissingFields { missing } => missing
                .iter()
                .map(|field| serde_json::json!({ "field": field, "error": "required" }))
                .collect(),
            ValidationError::InvalidRating(reason) => vec![serde_json::json!({
                "field": "rating",
                "error": reason.to_string(),
            })],
        }
    }
}

/// Review fields after trimming and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidReview {
    pub username: String,
    pub rating: Rating,
    pub comment: String,
}

/// Trim and validate a raw submission.
///
/// Presence is checked before the rating is parsed, so an empty rating
/// reports missing fields rather than an invalid number.
pub fn validate_review(form: &ReviewForm) -> Result<ValidReview, ValidationError> {
    let username = form.username.trim();
    let rating = form.rating.trim();
    let comment = form.comment.trim();

    let missing: Vec<&'static str> = [
        ("username", username),
        ("rating", rating),
        ("comment", comment),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(field, _)| field)
    .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields { missing });
    }

    let rating = parse_rating(rating).map_err(ValidationError::InvalidRating)?;

    Ok(ValidReview {
        username: username.to_string(),
        rating,
        comment: comment.to_string(),
    })
}
