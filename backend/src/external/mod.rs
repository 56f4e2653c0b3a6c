//! External API integrations

pub mod ai;
pub mod weather;

pub use ai::{AiGateway, GenerationOptions, ImageInput, LanguageModel};
pub use weather::WeatherClient;
