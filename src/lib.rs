//! Folio application library
//!
//! Book catalog and reviews service: the `books` module plus the bootstrap
//! shared by the `folio-app` and `folio-cli` binaries.

pub mod app;
pub mod modules;

pub use app::App;
