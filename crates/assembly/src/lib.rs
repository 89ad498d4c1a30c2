//! Budgeted chat prompt assembly.
//!
//! Folds a role-tagged conversation into one rendered prompt plus the
//! images it references, under a token budget.
//!
//! # Pipeline
//!
//! | Stage | Module | Responsibility |
//! |-------|--------|----------------|
//! | 1. Eviction | [`budget`] | Keep the newest messages that fit; system messages always stay |
//! | 2. Image indexing | [`images`] | Number surviving images from 0 and write `[img-N]` into the text |
//! | 3. Turn building | [`turns`] | Group messages into System/Prompt/Response turns and render them |
//!
//! [`assembler::PromptAssembler`] wires the stages together. The tokenizer
//! and template are supplied by the caller; [`token`] and [`template`]
//! provide ready-made implementations of both.

pub mod assembler;
pub mod budget;
pub mod images;
pub mod template;
pub mod token;
pub mod turns;

pub use assembler::{AssemblyInput, PromptAssembler, PromptResult, assemble};
pub use budget::{Eviction, evict};
pub use images::{IMAGE_MARKER, IndexedMessages, index_images};
pub use template::FieldTemplate;
#[cfg(feature = "huggingface")]
pub use token::HuggingFaceTokenizer;
pub use token::{HeuristicTokenizer, WhitespaceTokenizer};
pub use turns::TurnBuilder;
