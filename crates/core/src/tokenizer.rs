//! Tokenizer trait — the abstraction over model vocabularies.
//!
//! The assembler only ever needs token *counts*, but implementations report
//! the full ID sequence so a real vocabulary can be plugged in unchanged.

use crate::error::TokenizeError;

/// An opaque token identifier.
pub type TokenId = u32;

/// Turns text into tokens. Must be pure: the same text always yields the
/// same sequence.
pub trait Tokenizer: Send + Sync {
    /// Tokenize `text` into an ordered sequence of IDs.
    fn tokenize(&self, text: &str) -> Result<Vec<TokenId>, TokenizeError>;

    /// Number of tokens `text` occupies.
    fn count(&self, text: &str) -> Result<usize, TokenizeError> {
        self.tokenize(text).map(|ids| ids.len())
    }
}

/// Any `Fn(&str) -> Result<Vec<TokenId>, TokenizeError>` is a tokenizer.
impl<F> Tokenizer for F
where
    F: Fn(&str) -> Result<Vec<TokenId>, TokenizeError> + Send + Sync,
{
    fn tokenize(&self, text: &str) -> Result<Vec<TokenId>, TokenizeError> {
        self(text)
    }
}
