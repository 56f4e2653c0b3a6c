//! Domain models for Krishi Sakhi

mod activity;
mod advisory;
mod calendar;
mod crop;
mod market;
mod scheme;

pub use activity::*;
pub use advisory::*;
pub use calendar::*;
pub use crop::*;
pub use market::*;
pub use scheme::*;
