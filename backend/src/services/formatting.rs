//! Post-processing of model output
//!
//! Emoji annotation for farming vocabulary in English, Hindi and Malayalam,
//! whitespace normalization, markdown stripping for plain-text advisories
//! and extraction of JSON bodies from fenced model replies.

use once_cell::sync::Lazy;
use regex::Regex;

/// Keyword patterns and the emoji placed in front of each match
const EMOJI_PATTERNS: &[(&str, &str)] = &[
    // Crops and plants
    (r"\b(rice|धान|നെല്ല്)\b", "🌾"),
    (r"\b(wheat|गेहूं|ഗോതമ്പ്)\b", "🌾"),
    (r"\b(corn|maize|मक्का|ചോളം)\b", "🌽"),
    (r"\b(tomato|टमाटर|തക്കാളി)\b", "🍅"),
    (r"\b(potato|आलू|ഉരുളക്കിഴങ്ങ്)\b", "🥔"),
    (r"\b(onion|प्याज|ഉള്ളി)\b", "🧅"),
    (r"\b(carrot|गाजर|കാരറ്റ്)\b", "🥕"),
    (r"\b(cucumber|खीरा|വെള്ളരിക്ക)\b", "🥒"),
    (r"\b(banana|केला|വാഴ)\b", "🍌"),
    (r"\b(mango|आम|മാങ്ങ)\b", "🥭"),
    (r"\b(coconut|नारियल|തേങ്ങ)\b", "🥥"),
    (r"\b(apple|सेब|ആപ്പിൾ)\b", "🍎"),
    (r"\b(orange|संतरा|ഓറഞ്ച്)\b", "🍊"),
    (r"\b(flower|फूल|പൂവ്)\b", "🌸"),
    (r"\b(seed|बीज|വിത്ത്)\b", "🌱"),
    (r"\b(plant|पौधा|ചെടി)\b", "🌱"),
    (r"\b(tree|पेड़|മരം)\b", "🌳"),
    (r"\b(leaf|leaves|पत्ता|ഇല)\b", "🍃"),
    // Weather
    (r"\b(rain|बारिश|മഴ)\b", "🌧️"),
    (r"\b(sun|धूप|സൂര്യൻ)\b", "☀️"),
    (r"\b(cloud|बादल|മേഘം)\b", "☁️"),
    (r"\b(wind|हवा|കാറ്റ്)\b", "💨"),
    (r"\b(storm|तूफान|കൊടുങ്കാറ്റ്)\b", "⛈️"),
    (r"\b(temperature|तापमान|താപനില)\b", "🌡️"),
    // Farming activities
    (r"\b(sowing|बुवाई|വിതയൽ)\b", "🌱"),
    (r"\b(harvest|फसल|വിളവ്)\b", "🌾"),
    (r"\b(irrigation|सिंचाई|ജലസേചനം)\b", "💧"),
    (r"\b(water|पानी|വെള്ളം)\b", "💧"),
    (r"\b(fertilizer|खाद|വള)\b", "💩"),
    (r"\b(pest|कीट|കീടം)\b", "🐛"),
    (r"\b(disease|बीमारी|രോഗം)\b", "🦠"),
    (r"\b(soil|मिट्टी|മണ്ണ്)\b", "🌍"),
    (r"\b(organic|जैविक|ജൈവിക)\b", "🌿"),
    // Tools and equipment
    (r"\b(tractor|ट्रैक्टर|ട്രാക്ടർ)\b", "🚜"),
    (r"\b(tool|औजार|ഉപകരണം)\b", "🛠️"),
    (r"\b(machine|मशीन|യന്ത്രം)\b", "⚙️"),
    // Success and growth
    (r"\b(growth|वृद्धि|വളർച്ച)\b", "📈"),
    (r"\b(success|सफलता|വിജയം)\b", "✅"),
    (r"\b(profit|लाभ|ലാഭം)\b", "💰"),
    (r"\b(market|बाजार|വിപണി)\b", "🏪"),
    // Time and seasons
    (r"\b(season|मौसम|സീസൺ)\b", "📅"),
    (r"\b(month|महीना|മാസം)\b", "📅"),
    (r"\b(summer|गर्मी|വേനൽ)\b", "☀️"),
    (r"\b(winter|सर्दी|ശൈത്യം)\b", "❄️"),
    (r"\b(monsoon|मानसून|മൺസൂൺ)\b", "🌧️"),
];

static EMOJI_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    EMOJI_PATTERNS
        .iter()
        .map(|(pattern, emoji)| {
            let re = Regex::new(&format!("(?i){}", pattern)).expect("emoji pattern");
            (re, *emoji)
        })
        .collect()
});

static GREETING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(hello|hi|hey|namaste|നമസ്കാരം|good|നല്ല|welcome|സ്വാഗതം)")
        .expect("greeting pattern")
});

const FARMING_KEYWORDS: &[&str] = &["crop", "farm", "cultivation", "agriculture", "കൃഷി", "കർഷക"];

static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("newline pattern"));
static PERIOD_CAPITAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.([A-Z])").expect("period pattern"));
static HORIZONTAL_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("space pattern"));

static MD_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*#{1,6}\s*").expect("header pattern"));
static MD_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*|__").expect("bold pattern"));
static MD_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*[\*\-•]\s+").expect("bullet pattern"));
static MD_STRAY_ASTERISK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*").expect("asterisk pattern"));
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n+").expect("blank line pattern"));

/// Prefix farming vocabulary with emojis, mark greetings with 🙏 and close
/// farming advice with 🌾.
pub fn enhance_with_emojis(text: &str) -> String {
    let mut enhanced = text.to_string();
    for (re, emoji) in EMOJI_RULES.iter() {
        enhanced = re
            .replace_all(&enhanced, |caps: &regex::Captures| format!("{} {}", emoji, &caps[0]))
            .into_owned();
    }

    if GREETING.is_match(&enhanced) {
        enhanced = format!("🙏 {}", enhanced);
    }

    let lowered = enhanced.to_lowercase();
    if FARMING_KEYWORDS.iter().any(|k| lowered.contains(k))
        && !enhanced.ends_with('🌾')
        && !enhanced.ends_with('🚜')
    {
        enhanced.push_str(" 🌾");
    }

    enhanced
}

/// Normalize whitespace in a model reply
pub fn format_ai_response(response: &str) -> String {
    let formatted = response.trim();
    let formatted = EXCESS_NEWLINES.replace_all(formatted, "\n\n");
    let formatted = formatted
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    let formatted = PERIOD_CAPITAL.replace_all(&formatted, ". $1");
    let formatted = HORIZONTAL_SPACE.replace_all(&formatted, " ");
    formatted.trim().to_string()
}

/// Annotate then normalize, the order every chat-style reply goes through
pub fn polish_reply(raw: &str) -> String {
    format_ai_response(&enhance_with_emojis(raw))
}

/// Reduce a markdown reply to plain sentences
pub fn strip_markdown(text: &str) -> String {
    let text = MD_HEADER.replace_all(text, "");
    let text = MD_BOLD.replace_all(&text, "");
    let text = MD_BULLET.replace_all(&text, "");
    let text = MD_STRAY_ASTERISK.replace_all(&text, "");
    let text = BLANK_LINES.replace_all(&text, "\n");
    text.trim().to_string()
}

/// The JSON object or array inside a model reply, with markdown code fences
/// removed
pub fn extract_json_block(reply: &str) -> &str {
    let trimmed = reply.trim();
    let unfenced = match trimmed.strip_prefix("```") {
        Some(rest) => {
            // Drop the info string (`json`) on the opening fence line
            let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
            body.trim_end().strip_suffix("```").unwrap_or(body).trim()
        }
        None => trimmed,
    };

    let Some(start) = unfenced.find(['{', '[']) else {
        return unfenced;
    };
    let close = if unfenced[start..].starts_with('{') { '}' } else { ']' };
    match unfenced.rfind(close) {
        Some(end) if start < end => &unfenced[start..=end],
        _ => unfenced,
    }
}
