//! HTTP request handlers

pub mod activity;
pub mod advisory;
pub mod chat;
pub mod farm;
pub mod farmer;
pub mod health;
pub mod home;
pub mod knowledge;
pub mod schemes;

pub use activity::*;
pub use advisory::*;
pub use chat::*;
pub use farm::*;
pub use farmer::*;
pub use health::*;
pub use home::*;
pub use knowledge::*;
pub use schemes::*;
