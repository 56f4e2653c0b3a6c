//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Supported languages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ml")]
    Malayalam,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Malayalam => "ml",
        }
    }

    /// Display name used inside model prompts
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Malayalam => "Malayalam",
        }
    }

    /// Parse a language code, defaulting to English for anything unknown
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "ml" => Language::Malayalam,
            _ => Language::English,
        }
    }

    /// Binary script heuristic: any Malayalam code point makes the text `ml`
    pub fn detect(text: &str) -> Self {
        if text.chars().any(is_malayalam_char) {
            Language::Malayalam
        } else {
            Language::English
        }
    }
}

/// Malayalam Unicode block (U+0D00..=U+0D7F)
pub fn is_malayalam_char(c: char) -> bool {
    ('\u{0D00}'..='\u{0D7F}').contains(&c)
}

/// Text carried in both supported languages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bilingual {
    pub en: String,
    pub ml: String,
}

impl Bilingual {
    pub fn new(en: impl Into<String>, ml: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ml: ml.into(),
        }
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::English => &self.en,
            Language::Malayalam => &self.ml,
        }
    }
}

/// LLM usage tier. Each role resolves to one provider route at startup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModelRole {
    /// Long conversational and advisory generation
    HeavyChat,
    /// Short utility calls: translation, vision, ranking
    LightUtility,
    /// Low latency classification and summarization
    FastInference,
}

impl ModelRole {
    pub const ALL: [ModelRole; 3] = [
        ModelRole::HeavyChat,
        ModelRole::LightUtility,
        ModelRole::FastInference,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelRole::HeavyChat => "heavy_chat",
            ModelRole::LightUtility => "light_utility",
            ModelRole::FastInference => "fast_inference",
        }
    }
}

/// Where a piece of enrichment data came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Fallback,
}

/// Result of an enrichment that may have degraded to placeholder data.
///
/// Upstream failures on read paths never fail the request; they produce a
/// `Fallback` carrying the reason so callers and tests can tell the two apart.
#[derive(Debug, Clone, PartialEq)]
pub enum Sourced<T> {
    Live(T),
    Fallback { reason: String, data: T },
}

impl<T> Sourced<T> {
    pub fn fallback(reason: impl Into<String>, data: T) -> Self {
        Sourced::Fallback {
            reason: reason.into(),
            data,
        }
    }

    pub fn data(&self) -> &T {
        match self {
            Sourced::Live(data) => data,
            Sourced::Fallback { data, .. } => data,
        }
    }

    pub fn into_data(self) -> T {
        match self {
            Sourced::Live(data) => data,
            Sourced::Fallback { data, .. } => data,
        }
    }

    pub fn source(&self) -> DataSource {
        match self {
            Sourced::Live(_) => DataSource::Live,
            Sourced::Fallback { .. } => DataSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Sourced::Fallback { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Sourced::Live(_) => None,
            Sourced::Fallback { reason, .. } => Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        match self {
            Sourced::Live(data) => Sourced::Live(f(data)),
            Sourced::Fallback { reason, data } => Sourced::Fallback {
                reason,
                data: f(data),
            },
        }
    }
}

/// Wire form of a [`Sourced`] value: `{source, reason?, data}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tagged<T> {
    pub source: DataSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub data: T,
}

impl<T> From<Sourced<T>> for Tagged<T> {
    fn from(value: Sourced<T>) -> Self {
        match value {
            Sourced::Live(data) => Tagged {
                source: DataSource::Live,
                reason: None,
                data,
            },
            Sourced::Fallback { reason, data } => Tagged {
                source: DataSource::Fallback,
                reason: Some(reason),
                data,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_malayalam_script() {
        assert_eq!(Language::detect("നെല്ല് കൃഷി"), Language::Malayalam);
        assert_eq!(Language::detect("How do I grow rice?"), Language::English);
        assert_eq!(Language::detect("rice നെല്ല്"), Language::Malayalam);
        assert_eq!(Language::detect(""), Language::English);
    }

    #[test]
    fn language_codes_round_trip() {
        assert_eq!(Language::from_code("ml"), Language::Malayalam);
        assert_eq!(Language::from_code("ML"), Language::Malayalam);
        assert_eq!(Language::from_code("hi"), Language::English);
        assert_eq!(Language::Malayalam.code(), "ml");
    }

    #[test]
    fn tagged_serializes_source() {
        let tagged: Tagged<u32> = Sourced::fallback("db down", 3).into();
        let json = serde_json::to_value(&tagged).unwrap();
        assert_eq!(json["source"], "fallback");
        assert_eq!(json["reason"], "db down");
        assert_eq!(json["data"], 3);

        let live: Tagged<u32> = Sourced::Live(7).into();
        let json = serde_json::to_value(&live).unwrap();
        assert_eq!(json["source"], "live");
        assert!(json.get("reason").is_none());
    }
}
