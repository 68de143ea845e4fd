//! Auth helpers and request extractors shared by handlers and services.

pub mod jwt;
pub mod password;
pub mod validate;

pub use validate::{ValidatedJson, ValidatedQuery};
