//! Post-processing of raw backend text.

use crate::prompt::Flow;

/// Label prefixes small models like to put in front of a translation.
const TRANSLATION_LABELS: [&str; 4] = ["Translation:", "Translated:", "(Translated", "(Translation"];

/// Clean backend output for the given flow.
///
/// Every flow is trimmed; translations additionally lose one leading label.
pub fn sanitize(flow: Flow, raw: &str) -> String {
    match flow {
        Flow::Translate => strip_translation_label(raw),
        Flow::Chat | Flow::Summarize => raw.trim().to_string(),
    }
}

/// Remove a single leading translation label.
///
/// When the trimmed text starts with a known label, everything up to and including the first
/// colon is dropped, then one leading `)` and surrounding whitespace. Only the outermost label
/// is removed: `"Translation: Translated: Bonjour"` becomes `"Translated: Bonjour"`.
pub fn strip_translation_label(raw: &str) -> String {
    let trimmed = raw.trim();
    if !TRANSLATION_LABELS
        .iter()
        .any(|label| trimmed.starts_with(label))
    {
        return trimmed.to_string();
    }

    let rest = trimmed
        .split_once(':')
        .map_or(trimmed, |(_, after)| after)
        .trim();
    rest.strip_prefix(')').unwrap_or(rest).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_plain_label() {
        assert_eq!(strip_translation_label("Translation: Bonjour"), "Bonjour");
        assert_eq!(strip_translation_label("  Translated:   Hola \n"), "Hola");
    }

    #[test]
    fn strips_parenthesized_label() {
        assert_eq!(
            strip_translation_label("(Translated from Hindi): Good morning"),
            "Good morning"
        );
        assert_eq!(strip_translation_label("(Translation:) Danke"), "Danke");
    }

    #[test]
    fn only_outer_label_is_removed() {
        assert_eq!(
            strip_translation_label("Translation: Translated: Bonjour"),
            "Translated: Bonjour"
        );
    }

    #[test]
    fn unlabeled_text_is_only_trimmed() {
        assert_eq!(strip_translation_label("  Note: keep this  "), "Note: keep this");
        assert_eq!(strip_translation_label("translation: lowercase"), "translation: lowercase");
    }

    #[test]
    fn label_without_colon_keeps_text() {
        assert_eq!(strip_translation_label("(Translated) Bonjour"), "(Translated) Bonjour");
    }

    #[test]
    fn chat_and_summary_are_only_trimmed() {
        assert_eq!(sanitize(Flow::Chat, "  Translation: x "), "Translation: x");
        assert_eq!(sanitize(Flow::Summarize, "\n# Summary\n"), "# Summary");
        assert_eq!(sanitize(Flow::Translate, "Translation: x"), "x");
    }
}
