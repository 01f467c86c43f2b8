//! One-shot status messages carried across the post/redirect/get cycle.
//!
//! The cookie holds a short code, never free text, so its value is always a
//! valid cookie token.

use axum::http::{header, HeaderMap};
use serde::Serialize;

use super::validation::ValidationError;

pub const FLASH_COOKIE: &str = "folio_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// Outcome of a review submission, as shown on the next page view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    ReviewAdded,
    MissingFields,
    InvalidRating,
}

/// Serialized form of a [`Flash`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub message: &'static str,
}

impl Flash {
    pub fn code(self) -> &'static str {
        match self {
            Flash::ReviewAdded => "review_added",
            Flash::MissingFields => "missing_fields",
            Flash::InvalidRating => "invalid_rating",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "review_added" => Some(Flash::ReviewAdded),
            "missing_fields" => Some(Flash::MissingFields),
            "invalid_rating" => Some(Flash::InvalidRating),
            _ => None,
        }
    }

    pub fn kind(self) -> FlashKind {
        match self {
            Flash::ReviewAdded => FlashKind::Success,
            Flash::MissingFields | Flash::InvalidRating => FlashKind::Error,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Flash::ReviewAdded => "Your review has been added!",
            Flash::MissingFields => "All fields are required.",
            Flash::InvalidRating => "Rating must be a number between 1 and 5.",
        }
    }

    pub fn to_message(self) -> FlashMessage {
        FlashMessage {
            kind: self.kind(),
            message: self.message(),
        }
    }

    /// `Set-Cookie` value storing this flash until the next read.
    pub fn set_cookie(self) -> String {
        format!(
            "{FLASH_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            self.code()
        )
    }

    /// `Set-Cookie` value that discards a consumed flash.
    pub fn clear_cookie() -> String {
        format!("{FLASH_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
    }

    /// Read a pending flash from the request's `Cookie` headers.
    ///
    /// Unknown codes are ignored.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|cookies| cookies.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == FLASH_COOKIE)
            .and_then(|(_, code)| Flash::from_code(code))
    }
}

impl From<&ValidationError> for Flash {
    fn from(err: &ValidationError) -> Self {
        match err {
            ValidationError::MissingFields { .. } => Flash::MissingFields,
            ValidationError::InvalidRating(_) => Flash::InvalidRating,
        }
    }
}
