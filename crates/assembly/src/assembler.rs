//! Prompt assembly pipeline — eviction, image indexing, turn rendering.
//!
//! ```text
//! messages ─▶ evict ─▶ index_images ─▶ TurnBuilder ─▶ prompt + images
//! ```
//!
//! # Determinism
//!
//! Assembly is a pure function of its inputs and collaborators: identical
//! messages, limit, tokenizer and template always produce identical output.
//! Nothing is retried and no partial prompt is returned on failure.

use crate::budget;
use crate::images;
use crate::turns::TurnBuilder;
use rustedprompt_core::{
    AssemblyError, IndexedImage, Message, TemplateRenderer, Tokenizer, ToolDefinition,
};
use serde::Serialize;
use tracing::debug;

/// Everything a single assembly call consumes.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyInput<'a> {
    /// Conversation history, oldest first.
    pub messages: &'a [Message],
    /// Tool descriptors, forwarded to the template untouched.
    pub tools: &'a [ToolDefinition],
    /// Token budget for the prompt.
    pub limit: usize,
}

/// The assembled prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptResult {
    /// Rendered prompt text.
    pub prompt: String,
    /// Images referenced by `[img-N]` placeholders, where N is the index.
    pub images: Vec<IndexedImage>,
    /// Messages that survived eviction (system messages included).
    pub messages_kept: usize,
    /// Non-system messages evicted from the front of the history.
    pub messages_dropped: usize,
    /// Estimated cost of the kept messages.
    pub estimated_tokens: usize,
}

/// The prompt assembler. Stateless — create one and reuse it.
pub struct PromptAssembler<'a> {
    tokenizer: &'a dyn Tokenizer,
    template: &'a dyn TemplateRenderer,
    image_weight: usize,
}

impl<'a> PromptAssembler<'a> {
    /// Create an assembler.
    ///
    /// `image_weight` is the token charge per image, taken from the model's
    /// vision projector. Pass 0 when images cost nothing against the budget.
    pub fn new(
        tokenizer: &'a dyn Tokenizer,
        template: &'a dyn TemplateRenderer,
        image_weight: usize,
    ) -> Self {
        Self {
            tokenizer,
            template,
            image_weight,
        }
    }

    /// Assemble a prompt.
    ///
    /// # Algorithm
    ///
    /// 1. Evict the oldest non-system messages that do not fit `limit`
    /// 2. Number surviving images and write their placeholders into the text
    /// 3. Fold the annotated messages into turns and render each one
    pub fn assemble(&self, input: &AssemblyInput<'_>) -> Result<PromptResult, AssemblyError> {
        let eviction = budget::evict(
            self.tokenizer,
            input.messages,
            input.limit,
            self.image_weight,
        )?;
        if eviction.dropped > 0 {
            debug!(
                dropped = eviction.dropped,
                limit = input.limit,
                "Truncated conversation to fit token budget"
            );
        }

        let indexed = images::index_images(&eviction.kept);

        let mut builder = TurnBuilder::new(self.template, input.tools);
        for message in &indexed.messages {
            builder.push(message)?;
        }
        let prompt = builder.finish()?;

        Ok(PromptResult {
            prompt,
            images: indexed.images,
            messages_kept: eviction.kept.len(),
            messages_dropped: eviction.dropped,
            estimated_tokens: eviction.estimated_tokens,
        })
    }
}

/// One-shot convenience wrapper around [`PromptAssembler::assemble`].
pub fn assemble(
    tokenizer: &dyn Tokenizer,
    template: &dyn TemplateRenderer,
    image_weight: usize,
    limit: usize,
    messages: &[Message],
    tools: &[ToolDefinition],
) -> Result<PromptResult, AssemblyError> {
    PromptAssembler::new(tokenizer, template, image_weight).assemble(&AssemblyInput {
        messages,
        tools,
        limit,
    })
}
