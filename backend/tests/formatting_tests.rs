//! Reply formatting tests
//!
//! Tests for model output post-processing including:
//! - Emoji annotation of farming vocabulary
//! - Whitespace normalization
//! - Markdown stripping and JSON extraction

use proptest::prelude::*;

use krishi_sakhi_backend::services::formatting::{
    enhance_with_emojis, extract_json_block, format_ai_response, polish_reply, strip_markdown,
};

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_farming_words_get_emojis() {
        let out = enhance_with_emojis("Plant rice before the monsoon");
        assert!(out.contains("🌾 rice"));
        assert!(out.contains("🌧️ monsoon"));
    }

    #[test]
    fn test_greeting_is_marked() {
        assert!(enhance_with_emojis("Namaste, how can I help?").starts_with("🙏 "));
    }

    #[test]
    fn test_farming_advice_gets_closing_emoji() {
        let out = enhance_with_emojis("Rotate the crop every year");
        assert!(out.ends_with(" 🌾"));
    }

    #[test]
    fn test_malayalam_vocabulary() {
        let out = enhance_with_emojis("മഴ വരുന്നു");
        assert!(out.contains("🌧️ മഴ"));
    }

    #[test]
    fn test_excess_blank_lines_collapse() {
        let out = format_ai_response("First line\n\n\n\nSecond   line  \n");
        assert_eq!(out, "First line\n\nSecond line");
    }

    #[test]
    fn test_missing_space_after_period() {
        assert_eq!(format_ai_response("Water daily.Mulch weekly."), "Water daily. Mulch weekly.");
    }

    #[test]
    fn test_strip_markdown() {
        let text = "## Today\n\n**Spray** neem oil\n- Check drains\n* Mulch";
        assert_eq!(strip_markdown(text), "Today\nSpray neem oil\nCheck drains\nMulch");
    }

    #[test]
    fn test_extract_fenced_json() {
        let reply = "Here you go:\n```json\n{\"a\": 1}\n```";
        assert_eq!(extract_json_block(reply), "{\"a\": 1}");
        assert_eq!(extract_json_block("noise [1, 2] tail"), "[1, 2]");
        assert_eq!(extract_json_block("no json here"), "no json here");
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_polished_reply_is_trimmed(text in "[a-zA-Z .\n]{0,80}") {
            let out = polish_reply(&text);
            prop_assert_eq!(out.trim(), out.as_str());
        }

        #[test]
        fn prop_formatting_is_idempotent(text in "[a-z ]{0,60}") {
            let once = format_ai_response(&text);
            prop_assert_eq!(format_ai_response(&once), once.clone());
        }
    }
}
