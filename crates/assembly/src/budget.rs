//! Backward token-budget eviction.
//!
//! Walks the history newest → oldest and keeps the longest tail whose
//! estimated cost fits the limit. Two rules override the budget:
//!
//! - system messages are never evicted, wherever they sit;
//! - the newest non-system message is always kept, even if it alone
//!   exceeds the limit, so assembly always makes progress.

use rustedprompt_core::{Message, TokenizeError, Tokenizer};
use tracing::debug;

/// The messages that survived eviction, in their original order.
#[derive(Debug, Clone)]
pub struct Eviction<'m> {
    pub kept: Vec<&'m Message>,
    /// Non-system messages dropped from the front of the history.
    pub dropped: usize,
    /// Estimated cost of everything kept.
    pub estimated_tokens: usize,
}

/// Estimated cost of one message: its text tokens plus a flat charge per image.
pub fn message_cost(
    tokenizer: &dyn Tokenizer,
    message: &Message,
    image_weight: usize,
) -> Result<usize, TokenizeError> {
    let text = tokenizer.count(&message.content)?;
    Ok(text.saturating_add(image_weight.saturating_mul(message.images.len())))
}

/// Select the surviving messages for a budget of `limit` tokens.
pub fn evict<'m>(
    tokenizer: &dyn Tokenizer,
    messages: &'m [Message],
    limit: usize,
    image_weight: usize,
) -> Result<Eviction<'m>, TokenizeError> {
    let mut kept: Vec<&'m Message> = Vec::with_capacity(messages.len());
    let mut total = 0usize;
    let mut accepted = 0usize;
    let mut dropped = 0usize;
    let mut exhausted = false;

    for message in messages.iter().rev() {
        if message.is_system() {
            total = total.saturating_add(message_cost(tokenizer, message, image_weight)?);
            kept.push(message);
            continue;
        }

        if exhausted {
            dropped += 1;
            continue;
        }

        let trial = total.saturating_add(message_cost(tokenizer, message, image_weight)?);
        if trial > limit && accepted > 0 {
            debug!(
                limit,
                trial, "Budget reached, evicting older non-system messages"
            );
            exhausted = true;
            dropped += 1;
            continue;
        }

        total = trial;
        accepted += 1;
        kept.push(message);
    }

    kept.reverse();
    debug!(
        kept = kept.len(),
        dropped,
        estimated_tokens = total,
        "Eviction complete"
    );

    Ok(Eviction {
        kept,
        dropped,
        estimated_tokens: total,
    })
}
