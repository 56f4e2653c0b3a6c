//! Chat, translation, image analysis and quick queries
//!
//! Stateless: every call builds its prompt from the request alone (plus live
//! weather for weather questions). Only the quick-query answer path surfaces
//! provider failures; everything else degrades to canned text.

use serde::{Deserialize, Serialize};
use shared::{detect_chat_activity, Language, ModelRole};
use sqlx::PgPool;
use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::external::weather::CurrentWeather;
use crate::external::{GenerationOptions, ImageInput, LanguageModel, WeatherClient};
use crate::services::activity::ActivityService;
use crate::services::formatting::{enhance_with_emojis, polish_reply};

const WEATHER_KEYWORDS: &[&str] = &[
    "weather",
    "temperature",
    "rain",
    "forecast",
    "കാലാവസ്ഥ",
    "താപനില",
    "മഴ",
];

pub const DEFAULT_IMAGE_MESSAGE: &str =
    "Please analyze this farming image and provide relevant agricultural advice.";

pub const DEFAULT_CATEGORIES: [&str; 5] = ["general", "pest", "disease", "weather", "fertilizer"];

const SYSTEM_PROMPT_EN: &str = "You are Krishi Sakhi, an AI farming assistant specialized in \
agriculture, crop management, and farming practices. You provide helpful, accurate, and practical \
advice to farmers in English.

**IMPORTANT: Always include relevant emojis in your responses to make them more engaging and \
visual. Use farming, weather, plant, and food related emojis contextually throughout your message.**

Your expertise includes:
1. Crop cultivation and management
2. Pest and disease identification and treatment
3. Weather-based farming advice
4. Soil health and fertilizer recommendations
5. Organic farming practices
6. Seasonal farming calendars
7. Agricultural equipment guidance
8. Market insights and crop pricing

Always provide practical, actionable advice. If asked about activities that should be logged (like \
sowing, irrigation, pest control, fertilizer application), mention that the farmer should consider \
logging these activities for better farm management.

Respond in a friendly, supportive manner as if you're a knowledgeable farming expert helping a \
fellow farmer. Always respond in English only.

Format your responses clearly with proper structure:
- Use simple paragraphs for explanations
- Use numbered lists (1., 2., 3.) for step-by-step instructions
- Use bullet points (-) for listing items or options
- Use **bold text** for important points or warnings
- Keep responses well-organized and easy to read
- Avoid using ### or ## markdown headers unnecessarily
- IMPORTANT: Do not use excessive line breaks or blank lines between sentences
- Keep paragraphs concise and well-connected";

const SYSTEM_PROMPT_ML: &str = "നിങ്ങൾ കൃഷി സഖി ആണ്, കൃഷി, വിള പരിപാലനം, കാർഷിക രീതികൾ എന്നിവയിൽ \
വിദഗ്ധനായ ഒരു AI കാർഷിക സഹായി. നിങ്ങൾ കർഷകർക്ക് സഹായകരവും കൃത്യവും പ്രായോഗികവുമായ ഉപദേശങ്ങൾ \
മലയാളത്തിൽ നൽകുന്നു.

**IMPORTANT: Always include relevant emojis in your responses to make them more engaging and \
visual. Use farming, weather, plant, and food related emojis contextually throughout your message.**

നിങ്ങളുടെ വൈദഗ്ധ്യം ഉൾപ്പെടുന്നു:
1. വിള കൃഷിയും പരിപാലനവും
2. കീടങ്ങളുടെയും രോഗങ്ങളുടെയും തിരിച്ചറിയലും ചികിത്സയും
3. കാലാവസ്ഥാധിഷ്ഠിത കാർഷിക ഉപദേശം
4. മണ്ണിന്റെ ആരോഗ്യവും വള ശുപാർശകളും
5. ജൈവകൃഷി രീതികൾ
6. സീസണൽ കാർഷിക കലണ്ടർ
7. കാർഷിക ഉപകരണ മാർഗ്ഗനിർദ്ദേശം
8. വിപണി സ്ഥിതിവിവരക്കണക്കുകളും വിള വിലയും

എല്ലായ്പ്പോഴും പ്രായോഗികവും പ്രവർത്തനക്ഷമവുമായ ഉപദേശം നൽകുക. വിതയൽ, ജലസേചനം, കീടനിയന്ത്രണം, \
വള പ്രയോഗം തുടങ്ങിയ പ്രവർത്തനങ്ങളെക്കുറിച്ച് ചോദിച്ചാൽ, മികച്ച ഫാം മാനേജ്മെന്റിനായി കർഷകൻ ഈ \
പ്രവർത്തനങ്ങൾ രേഖപ്പെടുത്താൻ പരിഗണിക്കണമെന്ന് സൂചിപ്പിക്കുക.

ഒരു കർഷക സുഹൃത്തിനെ സഹായിക്കുന്ന അറിവുള്ള കാർഷിക വിദഗ്ധനെപ്പോലെ സൗഹൃദപരവും പിന്തുണാത്മകവുമായ \
രീതിയിൽ മറുപടി നൽകുക. എല്ലാ ഉത്തരങ്ങളും മലയാളത്തിൽ മാത്രം നൽകുക.

നിങ്ങളുടെ ഉത്തരങ്ങൾ വ്യക്തമായി ഫോർമാറ്റ് ചെയ്യുക:
- വിശദീകരണങ്ങൾക്കായി ലളിതമായ ഖണ്ഡികകൾ ഉപയോഗിക്കുക
- ഘട്ടം ഘട്ടമായുള്ള നിർദ്ദേശങ്ങൾക്കായി അക്കങ്ങൾ (1., 2., 3.) ഉപയോഗിക്കുക
- ഇനങ്ങൾ ലിസ്റ്റ് ചെയ്യാൻ ബുള്ളറ്റ് പോയിന്റുകൾ (-) ഉപയോഗിക്കുക
- പ്രധാനപ്പെട്ട കാര്യങ്ങൾക്കായി **ബോൾഡ് ടെക്സ്റ്റ്** ഉപയോഗിക്കുക
- ഉത്തരങ്ങൾ നന്നായി ക്രമീകരിച്ച് വായിക്കാൻ എളുപ്പമാക്കുക
- പ്രധാനം: വാക്യങ്ങൾക്കിടയിൽ അധിക ലൈൻ ബ്രേക്കുകൾ ഉപയോഗിക്കരുത്
- ഖണ്ഡികകൾ സംക്ഷിപ്തവും നന്നായി ബന്ധിപ്പിച്ചതുമായി നിലനിർത്തുക";

const FALLBACK_EN: &str = "🌾 **Hello Farmer!** 👋

Thank you for your question! I'm currently experiencing technical difficulties and cannot provide \
a detailed response.

**General Farming Tips:**
• 🌱 Test soil before sowing
• 💧 Water at appropriate times
• 🦗 Monitor pests regularly
• 📝 Keep records of farming activities

Please try again later! 🤝";

const FALLBACK_ML: &str = "🌾 **കൃഷി സഖി**

നിങ്ങളുടെ ചോദ്യത്തിന് നന്ദി! നിലവിൽ സാങ്കേതിക പ്രശ്നങ്ങൾ കാരണം വിശദമായ ഉത്തരം നൽകാൻ കഴിയുന്നില്ല.

**പൊതു കാർഷിക നുറുങ്ങുകൾ:**
• 🌱 വിത്ത് വിതയ്ക്കുന്നതിന് മുമ്പ് മണ്ണ് പരിശോധിക്കുക
• 💧 ജലസേചനം സമയത്ത് ചെയ്യുക
• 🦗 കീടങ്ങളെ പതിവായി നിരീക്ഷിക്കുക
• 📝 കാർഷിക പ്രവർത്തനങ്ങൾ രേഖപ്പെടുത്തുക

ദയവായി പിന്നീട് വീണ്ടും ശ്രമിക്കുക! 🤝";

const TRANSLATE_TO_ML: &str = "You are a professional agricultural translator specializing in \
farming terminology. Translate the following English text to Malayalam accurately while \
maintaining the meaning and context.

IMPORTANT AGRICULTURAL TERMS:
- Paddy = നെൽ (not പരുത്തി which is cotton)
- Rice = അരി/നെല്ല്
- Crop = വിള
- Disease = രോഗം
- Pest = കീടം
- Fertilizer = വള
- Irrigation = ജലസേചനം
- Farmer = കർഷകൻ
- Soil = മണ്ണ്
- Seed = വിത്ത്
- Water = വെള്ളം
- Plant = ചെടി
- Harvest = വിളവെടുപ്പ്
- Sowing = വിതയൽ

Preserve all emojis, formatting, bullet points, and structure exactly as in the original. Provide \
only the translation without any additional text.";

const TRANSLATE_TO_EN: &str = "You are a professional agricultural translator specializing in \
farming terminology. Translate the following Malayalam text to English accurately while \
maintaining the meaning and context.

IMPORTANT AGRICULTURAL TERMS:
- നെൽ = Paddy/Rice
- വിള = Crop
- രോഗം = Disease
- കീടം = Pest
- വള = Fertilizer
- ജലസേചനം = Irrigation
- കർഷകൻ = Farmer
- മണ്ണ് = Soil
- വിത്ത് = Seed
- വെള്ളം = Water
- ചെടി = Plant
- വിളവെടുപ്പ് = Harvest
- വിതയൽ = Sowing

Preserve all emojis, formatting, bullet points, and structure exactly as in the original. Provide \
only the translation without any additional text.";

pub const TRANSLATION_FALLBACK_TO_ML: &str = "Sorry, translation service is currently unavailable. \
/ ക്ഷമിക്കണം, വിവർത്തന സേവനം നിലവിൽ ലഭ്യമല്ല.";
pub const TRANSLATION_FALLBACK_TO_EN: &str = "ക്ഷമിക്കണം, വിവർത്തന സേവനം നിലവിൽ ലഭ്യമല്ല. \
/ Sorry, translation service is currently unavailable.";

const SUMMARY_PROMPT: &str = "You are a concise agricultural assistant. Provide brief, practical \
summaries for farmers. Keep responses under 150 words.";
const GENERAL_PROMPT: &str = "You are a helpful agricultural assistant. Provide quick, practical \
answers for farmers. Keep responses concise but helpful.";

pub const QUICK_QUERY_ERROR: &str = "Unable to process quick query at this time";
pub const QUICK_QUERY_FALLBACK: &str = "Please try the main chat for detailed assistance";

#[derive(Clone)]
pub struct ChatService {
    db: PgPool,
    ai: Arc<dyn LanguageModel>,
    weather: WeatherClient,
    weather_location: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default = "default_to")]
    pub to: String,
}

fn default_from() -> String {
    "en".to_string()
}

fn default_to() -> String {
    "ml".to_string()
}

#[derive(Debug, Serialize)]
pub struct TranslateReply {
    #[serde(rename = "translatedText")]
    pub translated_text: String,
}

/// Kind of quick query
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuickQueryType {
    #[default]
    General,
    Summary,
    Classify,
}

#[derive(Debug, Deserialize)]
pub struct QuickQueryRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: QuickQueryType,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum QuickQueryReply {
    Classification {
        classification: String,
    },
    Answer {
        response: String,
        #[serde(rename = "type")]
        kind: QuickQueryType,
        powered_by: String,
    },
}

pub fn is_weather_question(message: &str) -> bool {
    let lowered = message.to_lowercase();
    WEATHER_KEYWORDS.iter().any(|k| lowered.contains(k))
}

pub fn weather_context(location: &str, current: &CurrentWeather) -> String {
    format!(
        "\n\nCurrent Weather Data for {}:\n\
         - Temperature: {}°C\n\
         - Feels like: {}°C\n\
         - Condition: {}\n\
         - Humidity: {}%\n\
         - Wind Speed: {} m/s\n\n\
         Please use this real-time weather data to answer the user's question.",
        location,
        current.temperature_celsius.round_dp(2),
        current.feels_like_celsius.round_dp(2),
        current.weather_description,
        current.humidity_percent,
        current.wind_speed_mps.round_dp(2),
    )
}

pub fn system_prompt(language: Language) -> &'static str {
    match language {
        Language::Malayalam => SYSTEM_PROMPT_ML,
        Language::English => SYSTEM_PROMPT_EN,
    }
}

pub fn chat_fallback(language: Language) -> &'static str {
    match language {
        Language::Malayalam => FALLBACK_ML,
        Language::English => FALLBACK_EN,
    }
}

pub fn translation_fallback(to: Language) -> &'static str {
    match to {
        Language::Malayalam => TRANSLATION_FALLBACK_TO_ML,
        Language::English => TRANSLATION_FALLBACK_TO_EN,
    }
}

pub fn vision_prompt(message: &str) -> String {
    format!(
        "You are Krishi Sakhi, an expert agricultural AI assistant. Analyze this farming-related \
         image and provide detailed, practical advice.\n\n\
         User's question/context: {message}\n\n\
         Please analyze the image and provide:\n\
         1. What you can observe in the image (crops, diseases, pests, soil conditions, equipment, etc.)\n\
         2. Agricultural assessment and diagnosis if applicable\n\
         3. Specific recommendations and actionable advice\n\
         4. Any warnings or concerns if you notice problems\n\
         5. Follow-up suggestions for better farming practices\n\n\
         **IMPORTANT: Include relevant farming emojis (🌾🚜🌱💧🐛🦋🌿🌞⚠️) throughout your response \
         to make it engaging.**\n\n\
         Respond in a helpful, expert manner as if you're advising a fellow farmer. Be specific and \
         practical in your recommendations."
    )
}

pub fn image_fallback(filename: &str) -> String {
    format!(
        "I can see you've uploaded an image: {}. While I'm having trouble analyzing the image \
         right now, please describe what you see and I'll provide detailed farming advice based \
         on your description. 🌾",
        filename
    )
}

/// Exact (case-sensitive) match against the categories, else the first one
pub fn pick_category(answer: &str, categories: &[String]) -> String {
    let answer = answer.trim();
    categories
        .iter()
        .find(|c| c.as_str() == answer)
        .or_else(|| categories.first())
        .cloned()
        .unwrap_or_else(|| "unknown".to_string())
}

fn required(value: Option<String>, field: &str, message: &str, message_ml: &str) -> AppResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::invalid(field, message, message_ml)),
    }
}

impl ChatService {
    pub fn new(
        db: PgPool,
        ai: Arc<dyn LanguageModel>,
        weather: WeatherClient,
        weather_location: impl Into<String>,
    ) -> Self {
        Self {
            db,
            ai,
            weather,
            weather_location: weather_location.into(),
        }
    }

    async fn weather_context_for(&self, message: &str) -> String {
        if !is_weather_question(message) {
            return String::new();
        }
        match self.weather.get_current_weather(&self.weather_location).await {
            Ok(current) => weather_context(&self.weather_location, &current),
            Err(e) => {
                tracing::warn!("Weather context for chat unavailable: {}", e);
                String::new()
            }
        }
    }

    /// Answer a farmer's message in the language it was written in
    pub async fn chat(&self, request: ChatRequest) -> AppResult<ChatReply> {
        let message = required(
            request.message,
            "message",
            "Please provide a message",
            "ദയവായി ഒരു സന്ദേശം നൽകുക",
        )?;

        let language = Language::detect(&message);
        let context = self.weather_context_for(&message).await;
        let prompt = format!("{}{}\n\nUser: {}", system_prompt(language), context, message);
        let options = GenerationOptions::new(ModelRole::HeavyChat)
            .with_temperature(0.7)
            .with_max_tokens(1500)
            .with_top_p(0.9);

        let response = match self.ai.generate(&prompt, &options).await {
            Ok(raw) => {
                let reply = polish_reply(&raw);
                self.log_mentioned_activity(&message).await;
                reply
            }
            Err(e) => {
                tracing::warn!("Chat generation failed: {}", e);
                chat_fallback(language).to_string()
            }
        };

        Ok(ChatReply { response })
    }

    /// Best-effort; a failed log never affects the reply
    async fn log_mentioned_activity(&self, message: &str) {
        let Some(activity_type) = detect_chat_activity(message) else {
            return;
        };
        let activities = ActivityService::new(self.db.clone());
        if let Err(e) = activities.log_from_chat(activity_type, message).await {
            tracing::warn!("Activity logging from chat failed: {}", e);
        }
    }

    /// Translate between English and Malayalam; never fails once text is given
    pub async fn translate(&self, request: TranslateRequest) -> AppResult<TranslateReply> {
        let text = required(
            request.text,
            "text",
            "Text is required",
            "വാചകം ആവശ്യമാണ്",
        )?;
        let to = Language::from_code(&request.to);
        tracing::debug!("Translating {} -> {}", request.from, to.code());

        let instructions = match to {
            Language::Malayalam => TRANSLATE_TO_ML,
            Language::English => TRANSLATE_TO_EN,
        };
        let prompt = format!("{}\n\nText to translate:\n{}", instructions, text);
        let options = GenerationOptions::new(ModelRole::LightUtility)
            .with_temperature(0.1)
            .with_max_tokens(2000);

        let translated_text = match self.ai.generate(&prompt, &options).await {
            Ok(out) if !out.trim().is_empty() => out.trim().to_string(),
            Ok(_) => translation_fallback(to).to_string(),
            Err(e) => {
                tracing::warn!("Translation failed: {}", e);
                translation_fallback(to).to_string()
            }
        };

        Ok(TranslateReply { translated_text })
    }

    /// Describe and diagnose an uploaded farm photo
    pub async fn analyze_image(&self, image: ImageInput, filename: &str, message: Option<String>) -> ChatReply {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_MESSAGE.to_string());
        let prompt = vision_prompt(&message);
        let options = GenerationOptions::new(ModelRole::LightUtility);

        let response = match self.ai.generate_from_image(&prompt, &image, &options).await {
            Ok(raw) => polish_reply(&raw),
            Err(e) => {
                tracing::warn!("Image analysis failed for {}: {}", filename, e);
                image_fallback(filename)
            }
        };

        ChatReply { response }
    }

    /// Low-latency classification, summary or short answer
    pub async fn quick_query(&self, request: QuickQueryRequest, powered_by: &str) -> AppResult<QuickQueryReply> {
        let query = required(
            request.query,
            "query",
            "Query is required",
            "ചോദ്യം ആവശ്യമാണ്",
        )?;

        if request.kind == QuickQueryType::Classify {
            let categories = request
                .categories
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect());
            return Ok(QuickQueryReply::Classification {
                classification: self.classify(&query, &categories).await,
            });
        }

        let system = match request.kind {
            QuickQueryType::Summary => SUMMARY_PROMPT,
            _ => GENERAL_PROMPT,
        };
        let options = GenerationOptions::new(ModelRole::FastInference)
            .with_system(system)
            .with_max_tokens(200)
            .with_temperature(0.7);

        let answer = self.ai.generate(&query, &options).await.map_err(|e| {
            tracing::warn!("Quick query failed: {}", e);
            AppError::AiUnavailable {
                message: QUICK_QUERY_ERROR.to_string(),
                fallback: Some(QUICK_QUERY_FALLBACK.to_string()),
            }
        })?;

        Ok(QuickQueryReply::Answer {
            response: enhance_with_emojis(answer.trim()),
            kind: request.kind,
            powered_by: powered_by.to_uppercase(),
        })
    }

    async fn classify(&self, text: &str, categories: &[String]) -> String {
        let options = GenerationOptions::new(ModelRole::FastInference)
            .with_system(format!(
                "Classify the following text into one of these categories: {}. \
                 Respond with only the category name.",
                categories.join(", ")
            ))
            .with_max_tokens(10)
            .with_temperature(0.1);

        match self.ai.generate(text, &options).await {
            Ok(answer) => pick_category(&answer, categories),
            Err(e) => {
                tracing::warn!("Classification failed: {}", e);
                pick_category("", categories)
            }
        }
    }
}
