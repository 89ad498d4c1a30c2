//! Image indexing and placeholder substitution.
//!
//! Every image that survived eviction gets the next free identifier,
//! starting at 0, in the order it is met scanning messages left to right.
//! The owning message's text is rewritten to reference it as `[img-N]`:
//! an explicit `[img]` marker in the text is consumed first, otherwise the
//! placeholder is prepended. Several prepended placeholders in one message
//! come out in ascending order, back to back.

use rustedprompt_core::{IndexedImage, Message};
use tracing::debug;

/// Literal a user can place in text to position an image placeholder.
pub const IMAGE_MARKER: &str = "[img]";

/// Rewritten messages plus the images their placeholders refer to.
#[derive(Debug, Clone, Default)]
pub struct IndexedMessages {
    /// Working copies with placeholder-annotated text. Image payloads have
    /// moved to `images`.
    pub messages: Vec<Message>,
    pub images: Vec<IndexedImage>,
}

/// The placeholder for image `id`.
pub fn placeholder(id: usize) -> String {
    format!("[img-{id}]")
}

/// Insert the placeholder for image `id` into `text`.
pub fn attach_placeholder(text: &str, id: usize) -> String {
    let tag = placeholder(id);
    if text.contains(IMAGE_MARKER) {
        text.replacen(IMAGE_MARKER, &tag, 1)
    } else {
        prepend(&tag, text)
    }
}

fn prepend(prefix: &str, text: &str) -> String {
    format!("{prefix} {text}").trim().to_string()
}

/// Rewrite `text` for `count` images numbered from `first_id`. Images that
/// find no `[img]` marker share a single prefix.
fn annotate(text: &str, first_id: usize, count: usize) -> String {
    let mut content = text.to_string();
    let mut prefix = String::new();
    for id in first_id..first_id + count {
        if content.contains(IMAGE_MARKER) {
            content = content.replacen(IMAGE_MARKER, &placeholder(id), 1);
        } else {
            prefix.push_str(&placeholder(id));
        }
    }
    if prefix.is_empty() {
        content
    } else {
        prepend(&prefix, &content)
    }
}

/// Number the images of `messages` and annotate their text.
pub fn index_images(messages: &[&Message]) -> IndexedMessages {
    let mut images = Vec::new();
    let rewritten = messages
        .iter()
        .map(|message| {
            let content = annotate(&message.content, images.len(), message.images.len());
            for data in &message.images {
                images.push(IndexedImage {
                    id: images.len(),
                    data: data.clone(),
                });
            }
            Message {
                role: message.role,
                content,
                images: Vec::new(),
            }
        })
        .collect();

    if !images.is_empty() {
        debug!(images = images.len(), "Indexed images");
    }

    IndexedMessages {
        messages: rewritten,
        images,
    }
}
