//! Bundled tokenizers.
//!
//! - [`WhitespaceTokenizer`]: one token per whitespace-delimited word.
//!   Predictable, which keeps budget tests readable.
//! - [`HeuristicTokenizer`]: ~4 characters per token. Accurate within ~10%
//!   for BPE vocabularies on English text.
//! - `HuggingFaceTokenizer` (feature `huggingface`): a real `tokenizer.json`.

use rustedprompt_core::{TokenId, TokenizeError, Tokenizer};

/// Counts whitespace-delimited words.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<TokenId>, TokenizeError> {
        Ok(text.split_whitespace().zip(0..).map(|(_, id)| id).collect())
    }

    fn count(&self, text: &str) -> Result<usize, TokenizeError> {
        Ok(text.split_whitespace().count())
    }
}

/// Character-based estimate: 1 token ≈ 4 bytes, rounded up.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenizer;

impl HeuristicTokenizer {
    const BYTES_PER_TOKEN: usize = 4;

    fn estimate(text: &str) -> usize {
        text.len().div_ceil(Self::BYTES_PER_TOKEN)
    }
}

impl Tokenizer for HeuristicTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<TokenId>, TokenizeError> {
        Ok(text
            .as_bytes()
            .chunks(Self::BYTES_PER_TOKEN)
            .map(|chunk| chunk.iter().fold(0, |acc, b| acc * 31 + TokenId::from(*b)))
            .collect())
    }

    fn count(&self, text: &str) -> Result<usize, TokenizeError> {
        Ok(Self::estimate(text))
    }
}

/// Wraps a Hugging Face `tokenizer.json`.
#[cfg(feature = "huggingface")]
pub struct HuggingFaceTokenizer {
    inner: tokenizers::Tokenizer,
}

#[cfg(feature = "huggingface")]
impl HuggingFaceTokenizer {
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, TokenizeError> {
        let path = path.as_ref();
        let inner = tokenizers::Tokenizer::from_file(path).map_err(|e| {
            TokenizeError::Unavailable(format!("failed to load {}: {e}", path.display()))
        })?;
        Ok(Self { inner })
    }
}

#[cfg(feature = "huggingface")]
impl Tokenizer for HuggingFaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<TokenId>, TokenizeError> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| TokenizeError::Failed(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_counts_words() {
        assert_eq!(WhitespaceTokenizer.count("a b  c\n d").unwrap(), 4);
        assert_eq!(WhitespaceTokenizer.count("").unwrap(), 0);
    }

    #[test]
    fn whitespace_ids_match_count() {
        let ids = WhitespaceTokenizer.tokenize("one two three").unwrap();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn whitespace_ids_are_positional_for_long_text() {
        let text = "w ".repeat(300);
        let ids = WhitespaceTokenizer.tokenize(&text).unwrap();
        assert_eq!(ids.len(), 300);
        assert_eq!(ids.last(), Some(&299));
    }

    #[test]
    fn heuristic_empty_is_zero() {
        assert_eq!(HeuristicTokenizer.count("").unwrap(), 0);
    }

    #[test]
    fn heuristic_four_chars_is_one_token() {
        assert_eq!(HeuristicTokenizer.count("test").unwrap(), 1);
    }

    #[test]
    fn heuristic_rounds_up() {
        assert_eq!(HeuristicTokenizer.count("hello").unwrap(), 2);
        assert_eq!(HeuristicTokenizer.count(&"a".repeat(100)).unwrap(), 25);
    }

    #[test]
    fn heuristic_ids_agree_with_count() {
        let text = "hello world";
        let ids = HeuristicTokenizer.tokenize(text).unwrap();
        assert_eq!(ids.len(), HeuristicTokenizer.count(text).unwrap());
    }
}
