//! Language name resolution.
//!
//! Both the transcription engine and the translation engine speak ISO-639-1
//! codes, while callers typically send human-readable names ("english",
//! "Hindi"). Resolution is a pure lookup with an identity fallback: an unknown
//! name passes through lowercased and trimmed, on the assumption that it
//! already is a code. Unknown languages are never an error here; the
//! translation engine decides what it can actually handle.

/// Fixed mapping of language names to ISO-639-1 codes.
const LANGUAGE_CODES: &[(&str, &str)] = &[
    ("english", "en"),
    ("hindi", "hi"),
    ("french", "fr"),
    ("spanish", "es"),
    ("german", "de"),
    ("portuguese", "pt"),
    ("chinese", "zh"),
    ("japanese", "ja"),
    ("korean", "ko"),
    ("russian", "ru"),
    ("arabic", "ar"),
    ("italian", "it"),
    ("dutch", "nl"),
    ("polish", "pl"),
    ("turkish", "tr"),
    ("vietnamese", "vi"),
    ("thai", "th"),
];

/// Resolve a language name or code to an ISO-639-1 code.
pub fn resolve(name: &str) -> String {
    let normalized = name.trim().to_lowercase();

    LANGUAGE_CODES
        .iter()
        .find(|(candidate, _)| *candidate == normalized)
        .map(|(_, code)| (*code).to_string())
        .unwrap_or(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_names() {
        assert_eq!(resolve("english"), "en");
        assert_eq!(resolve("hindi"), "hi");
        assert_eq!(resolve("french"), "fr");
        assert_eq!(resolve("vietnamese"), "vi");
    }

    #[test]
    fn test_resolve_normalizes_case_and_whitespace() {
        assert_eq!(resolve("English"), "en");
        assert_eq!(resolve(" Hindi "), "hi");
        assert_eq!(resolve("JAPANESE"), "ja");
    }

    #[test]
    fn test_resolve_unknown_passes_through() {
        assert_eq!(resolve("xx"), "xx");
        assert_eq!(resolve("FR"), "fr");
        assert_eq!(resolve(" Klingon "), "klingon");
    }
}
