//! Shared types and models for Krishi Sakhi
//!
//! Domain vocabulary used by the backend and by any client that talks to it:
//! entity enums, bilingual labels, Kerala allow-lists and date helpers.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
