//! Business logic services for Krishi Sakhi

pub mod activity;
pub mod advisory;
pub mod chat;
pub mod clock;
pub mod dashboard;
pub mod farm;
pub mod farmer;
pub mod formatting;
pub mod knowledge;
pub mod scheme;
pub mod weather;

pub use activity::ActivityService;
pub use advisory::AdvisoryService;
pub use chat::ChatService;
pub use dashboard::DashboardService;
pub use farm::FarmService;
pub use farmer::FarmerService;
pub use knowledge::KnowledgeService;
pub use scheme::{RecommendationCache, SchemeService};
pub use weather::WeatherService;
