//! Fixed-size overlapping window chunker.

use super::{ChunkingConfig, TokenWindow};
use regex::Regex;
use std::sync::OnceLock;

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+").expect("valid word regex"))
}

/// Splits transcript text into overlapping token windows.
#[derive(Debug, Clone, Default)]
pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    /// Create a chunker. The config is assumed validated.
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    /// Lowercase, collapse whitespace runs to one space, and trim.
    pub fn normalize(text: &str) -> String {
        let lowered = text.to_lowercase();
        whitespace_regex()
            .replace_all(&lowered, " ")
            .trim()
            .to_string()
    }

    /// Split into alphanumeric word tokens; punctuation is dropped.
    pub fn tokenize(text: &str) -> Vec<String> {
        word_regex()
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Cut a token stream into windows.
    ///
    /// Windows advance by `chunk_size - chunk_overlap` and stop once a
    /// window reaches the end of the stream, so the last window may be
    /// shorter than `chunk_size` but never lies entirely inside the
    /// previous one.
    pub fn split(&self, tokens: &[String]) -> Vec<TokenWindow> {
        let size = self.config.chunk_size.max(1);
        let stride = self.config.stride().max(1);

        let mut windows = Vec::new();
        let mut start = 0;

        while start < tokens.len() {
            let end = (start + size).min(tokens.len());
            windows.push(TokenWindow {
                ordinal: windows.len() as u32 + 1,
                start,
                tokens: tokens[start..end].to_vec(),
            });

            // A further step would only repeat the tail of this window.
            if end == tokens.len() {
                break;
            }
            start += stride;
        }

        windows
    }

    /// Normalize, tokenize and window a transcript.
    pub fn process(&self, text: &str) -> Vec<TokenWindow> {
        let normalized = Self::normalize(text);
        let tokens = Self::tokenize(&normalized);
        self.split(&tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_tokens(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("t{}", i)).collect()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            TextChunker::normalize("  Hello\n\tWORLD   again  "),
            "hello world again"
        );
        assert_eq!(TextChunker::normalize(""), "");
    }

    #[test]
    fn test_tokenize_drops_punctuation() {
        let tokens = TextChunker::tokenize("machine-learning, models: v2 (draft)!");
        assert_eq!(tokens, vec!["machine", "learning", "models", "v2", "draft"]);
    }

    #[test]
    fn test_tokenize_keeps_unicode_words() {
        let tokens = TextChunker::tokenize("le modèle apprend très vite");
        assert_eq!(tokens, vec!["le", "modèle", "apprend", "très", "vite"]);
    }

    #[test]
    fn test_overlap_windows_for_450_tokens() {
        let chunker = TextChunker::default();
        let tokens = numbered_tokens(450);

        let windows = chunker.split(&tokens);

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].len(), 200);
        assert_eq!(windows[1].len(), 200);
        assert_eq!(windows[2].len(), 90);
        assert_eq!(windows[0].tokens[180..], windows[1].tokens[..20]);
        assert_eq!(windows[1].tokens[180..], windows[2].tokens[..20]);
        assert_eq!(
            windows.iter().map(|w| w.ordinal).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_windows_cover_stream_in_order() {
        let chunker = TextChunker::new(ChunkingConfig::new(7, 3).unwrap());
        for count in [1, 6, 7, 8, 11, 12, 50] {
            let tokens = numbered_tokens(count);
            let windows = chunker.split(&tokens);

            let mut rebuilt: Vec<String> = Vec::new();
            for (i, window) in windows.iter().enumerate() {
                let skip = if i == 0 { 0 } else { 3 };
                rebuilt.extend(window.tokens[skip..].iter().cloned());
            }
            assert_eq!(rebuilt, tokens, "count = {}", count);
        }
    }

    #[test]
    fn test_exact_fit_has_no_trailing_window() {
        let chunker = TextChunker::default();
        let windows = chunker.split(&numbered_tokens(200));
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].len(), 200);
    }

    #[test]
    fn test_short_transcript_is_single_chunk() {
        let chunker = TextChunker::default();
        let windows = chunker.process("Machine learning models require data.");

        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].ordinal, 1);
        assert_eq!(windows[0].text(), "machine learning models require data");
    }

    #[test]
    fn test_empty_text_has_no_windows() {
        let chunker = TextChunker::default();
        assert!(chunker.process("   ... !!! ").is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(ChunkingConfig::new(0, 0).is_err());
        assert!(ChunkingConfig::new(20, 20).is_err());
        assert!(ChunkingConfig::new(20, 19).is_ok());
    }
}
