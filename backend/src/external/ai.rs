//! LLM provider gateway
//!
//! Exposes one [`LanguageModel`] interface over Gemini `generateContent` and
//! Groq's OpenAI-compatible chat completions. Every [`ModelRole`] is bound to
//! a provider route once, when the gateway is built from configuration.

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::ModelRole;
use std::{collections::HashMap, time::Duration};
use thiserror::Error;

use crate::config::{AiConfig, ProviderKind, ProviderRoute};

/// Sampling parameters for one call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub role: ModelRole,
    pub system: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
}

impl GenerationOptions {
    pub fn new(role: ModelRole) -> Self {
        Self {
            role,
            system: None,
            temperature: None,
            max_tokens: None,
            top_p: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// Uploaded image passed to a vision-capable model
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub data: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("no API key configured for {0}")]
    NotConfigured(&'static str),

    #[error("provider request failed: {0}")]
    Request(reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider returned no text")]
    EmptyResponse,

    #[error("{0} does not accept image input")]
    ImageUnsupported(&'static str),
}

/// Request URLs may carry credentials; errors never keep them
impl From<reqwest::Error> for AiError {
    fn from(error: reqwest::Error) -> Self {
        AiError::Request(error.without_url())
    }
}

/// Text generation backend
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, AiError>;

    async fn generate_from_image(
        &self,
        prompt: &str,
        image: &ImageInput,
        options: &GenerationOptions,
    ) -> Result<String, AiError>;
}

/// Gemini request body
#[derive(Debug, Serialize)]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Serialize)]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}

/// OpenAI-compatible chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Role-routed client for the hosted providers
#[derive(Clone)]
pub struct AiGateway {
    client: Client,
    routes: HashMap<ModelRole, ProviderRoute>,
    gemini_base_url: String,
    groq_base_url: String,
}

impl AiGateway {
    /// Resolve the capability map once. Roles without a key stay routed but
    /// every call on them fails with [`AiError::NotConfigured`].
    pub fn from_config(config: &AiConfig) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let mut routes = HashMap::new();
        for role in ModelRole::ALL {
            let route = config.route(role).clone();
            if route.api_key.trim().is_empty() {
                tracing::warn!(
                    "No API key for {} ({}); its callers will use fallback text",
                    role.as_str(),
                    route.provider.as_str()
                );
            } else {
                tracing::info!(
                    "{} routed to {} model {}",
                    role.as_str(),
                    route.provider.as_str(),
                    route.model
                );
            }
            routes.insert(role, route);
        }

        Ok(Self {
            client,
            routes,
            gemini_base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
            groq_base_url: config.groq_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn route(&self, role: ModelRole) -> Result<&ProviderRoute, AiError> {
        self.routes
            .get(&role)
            .filter(|route| !route.api_key.trim().is_empty())
            .ok_or(AiError::NotConfigured(role.as_str()))
    }

    async fn call_gemini(
        &self,
        route: &ProviderRoute,
        parts: Vec<GeminiPart>,
        options: &GenerationOptions,
    ) -> Result<String, AiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.gemini_base_url, route.model
        );
        let body = gemini_request(parts, options);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &route.api_key)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Status { status, body });
        }

        let data: GeminiResponse = response.json().await?;
        extract_gemini_text(data)
    }

    async fn call_groq(
        &self,
        route: &ProviderRoute,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, AiError> {
        let url = format!("{}/chat/completions", self.groq_base_url);

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = options.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let body = ChatCompletionRequest {
            model: &route.model,
            messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            top_p: options.top_p,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&route.api_key)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Status { status, body });
        }

        let data: ChatCompletionResponse = response.json().await?;
        data.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(AiError::EmptyResponse)
    }
}

#[async_trait]
impl LanguageModel for AiGateway {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, AiError> {
        let route = self.route(options.role)?;
        tracing::debug!("Generating with {} ({})", route.model, options.role.as_str());

        match route.provider {
            ProviderKind::Gemini => {
                let parts = vec![GeminiPart {
                    text: Some(prompt.to_string()),
                    inline_data: None,
                }];
                self.call_gemini(route, parts, options).await
            }
            ProviderKind::Groq => self.call_groq(route, prompt, options).await,
        }
    }

    async fn generate_from_image(
        &self,
        prompt: &str,
        image: &ImageInput,
        options: &GenerationOptions,
    ) -> Result<String, AiError> {
        let route = self.route(options.role)?;

        match route.provider {
            ProviderKind::Gemini => {
                let parts = vec![
                    GeminiPart {
                        text: Some(prompt.to_string()),
                        inline_data: None,
                    },
                    GeminiPart {
                        text: None,
                        inline_data: Some(GeminiInlineData {
                            mime_type: image.mime_type.clone(),
                            data: base64::engine::general_purpose::STANDARD.encode(&image.data),
                        }),
                    },
                ];
                self.call_gemini(route, parts, options).await
            }
            ProviderKind::Groq => Err(AiError::ImageUnsupported(route.provider.as_str())),
        }
    }
}

fn gemini_request(parts: Vec<GeminiPart>, options: &GenerationOptions) -> GeminiRequest {
    GeminiRequest {
        system_instruction: options.system.as_ref().map(|system| GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: Some(system.clone()),
                inline_data: None,
            }],
        }),
        contents: vec![GeminiContent {
            role: Some("user"),
            parts,
        }],
        generation_config: GeminiGenerationConfig {
            temperature: options.temperature,
            max_output_tokens: options.max_tokens,
            top_p: options.top_p,
        },
    }
}

/// Concatenate the text parts of the first candidate
fn extract_gemini_text(response: GeminiResponse) -> Result<String, AiError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        Err(AiError::EmptyResponse)
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(provider: ProviderKind, key: &str) -> ProviderRoute {
        ProviderRoute {
            provider,
            model: "test-model".into(),
            api_key: key.into(),
        }
    }

    fn config() -> AiConfig {
        AiConfig {
            request_timeout_secs: 1,
            gemini_base_url: "http://127.0.0.1:9/".into(),
            groq_base_url: "http://127.0.0.1:9".into(),
            heavy_chat: route(ProviderKind::Gemini, "key-1"),
            light_utility: route(ProviderKind::Gemini, ""),
            fast_inference: route(ProviderKind::Groq, "key-3"),
        }
    }

    #[test]
    fn gemini_request_shape() {
        let options = GenerationOptions::new(ModelRole::HeavyChat)
            .with_system("be brief")
            .with_temperature(0.7)
            .with_max_tokens(1500)
            .with_top_p(0.9);
        let parts = vec![GeminiPart {
            text: Some("hello".into()),
            inline_data: None,
        }];

        let json = serde_json::to_value(gemini_request(parts, &options)).unwrap();
        assert_eq!(json["system_instruction"]["parts"][0]["text"], "be brief");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["generation_config"]["max_output_tokens"], 1500);
        assert!(json["contents"][0]["parts"][0].get("inline_data").is_none());
    }

    #[test]
    fn joins_candidate_parts() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "Rice "}, {"text": "grows"}]}}]
        }))
        .unwrap();
        assert_eq!(extract_gemini_text(response).unwrap(), "Rice grows");
    }

    #[test]
    fn blocked_response_is_empty() {
        let response: GeminiResponse = serde_json::from_value(serde_json::json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert!(matches!(extract_gemini_text(response), Err(AiError::EmptyResponse)));
    }

    #[tokio::test]
    async fn role_without_key_is_not_configured() {
        let gateway = AiGateway::from_config(&config()).unwrap();
        let options = GenerationOptions::new(ModelRole::LightUtility);
        let err = gateway.generate("translate", &options).await.unwrap_err();
        assert!(matches!(err, AiError::NotConfigured("light_utility")));
    }

    #[tokio::test]
    async fn groq_rejects_images() {
        let gateway = AiGateway::from_config(&config()).unwrap();
        let image = ImageInput {
            data: vec![0xFF, 0xD8],
            mime_type: "image/jpeg".into(),
        };
        let options = GenerationOptions::new(ModelRole::FastInference);
        let err = gateway
            .generate_from_image("look", &image, &options)
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::ImageUnsupported("groq")));
    }

    #[tokio::test]
    async fn unreachable_provider_is_request_error() {
        let gateway = AiGateway::from_config(&config()).unwrap();
        let options = GenerationOptions::new(ModelRole::HeavyChat);
        let err = gateway.generate("hello", &options).await.unwrap_err();
        assert!(matches!(err, AiError::Request(_)));
    }

    #[tokio::test]
    async fn request_errors_do_not_reveal_keys() {
        let mut config = config();
        config.heavy_chat = route(ProviderKind::Gemini, "SUPERSECRETKEY");
        config.fast_inference = route(ProviderKind::Groq, "GROQSECRETKEY");
        let gateway = AiGateway::from_config(&config).unwrap();

        for (role, key) in [
            (ModelRole::HeavyChat, "SUPERSECRETKEY"),
            (ModelRole::FastInference, "GROQSECRETKEY"),
        ] {
            let err = gateway
                .generate("hello", &GenerationOptions::new(role))
                .await
                .unwrap_err();
            assert!(!format!("{}", err).contains(key));
            assert!(!format!("{:?}", err).contains(key));
            assert!(!format!("{:?}", crate::error::AppError::from(err)).contains(key));
        }
    }
}
