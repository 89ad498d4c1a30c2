//! `rustedprompt assemble` — Build a prompt from a conversation file.
//!
//! The input is JSON, either a bare array of messages or an object with
//! `messages` and optional `tools`:
//!
//! ```json
//! {"messages": [{"role": "user", "content": "hi", "images": ["<base64>"]}]}
//! ```

use anyhow::{Context, bail};
use clap::Args;
use rustedprompt_assembly::{
    AssemblyInput, FieldTemplate, HeuristicTokenizer, PromptAssembler, WhitespaceTokenizer,
};
use rustedprompt_config::{AppConfig, TokenizerKind};
use rustedprompt_core::{Message, Tokenizer, ToolDefinition};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct AssembleArgs {
    /// Conversation JSON file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Token budget (defaults to num_ctx - response_reserve)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Template file overriding the configured template
    #[arg(short, long)]
    pub template: Option<PathBuf>,

    /// Print the full result as JSON instead of the bare prompt
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Conversation {
    Bare(Vec<Message>),
    Full {
        messages: Vec<Message>,
        #[serde(default)]
        tools: Vec<ToolDefinition>,
    },
}

impl Conversation {
    fn into_parts(self) -> (Vec<Message>, Vec<ToolDefinition>) {
        match self {
            Conversation::Bare(messages) => (messages, Vec::new()),
            Conversation::Full { messages, tools } => (messages, tools),
        }
    }
}

pub fn run(config_path: &Path, args: AssembleArgs) -> anyhow::Result<()> {
    let config = AppConfig::load_with(config_path).context("Failed to load config")?;
    let output = assemble_file(&config, &args)?;
    println!("{output}");
    Ok(())
}

/// Run the assembly described by `args` and format its output.
fn assemble_file(config: &AppConfig, args: &AssembleArgs) -> anyhow::Result<String> {
    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let conversation: Conversation = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;
    let (messages, tools) = conversation.into_parts();

    let source = match &args.template {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template {}", path.display()))?,
        None => config.template.source.clone(),
    };
    let template = FieldTemplate::parse(&source)?;
    let tokenizer = build_tokenizer(config)?;
    let image_weight = image_weight(config, &messages)?;

    let limit = args.limit.unwrap_or_else(|| config.token_limit());
    if limit == 0 {
        bail!("--limit must be greater than zero");
    }

    let assembler = PromptAssembler::new(&*tokenizer, &template, image_weight);
    let result = assembler.assemble(&AssemblyInput {
        messages: &messages,
        tools: &tools,
        limit,
    })?;

    tracing::info!(
        kept = result.messages_kept,
        dropped = result.messages_dropped,
        images = result.images.len(),
        estimated_tokens = result.estimated_tokens,
        limit,
        "Assembled prompt"
    );

    if args.json {
        Ok(serde_json::to_string_pretty(&result)?)
    } else {
        Ok(result.prompt)
    }
}

fn build_tokenizer(config: &AppConfig) -> anyhow::Result<Box<dyn Tokenizer>> {
    match config.tokenizer.kind {
        TokenizerKind::Words => Ok(Box::new(WhitespaceTokenizer)),
        TokenizerKind::Heuristic => Ok(Box::new(HeuristicTokenizer)),
        TokenizerKind::HuggingFace => huggingface_tokenizer(config),
    }
}

#[cfg(feature = "huggingface")]
fn huggingface_tokenizer(config: &AppConfig) -> anyhow::Result<Box<dyn Tokenizer>> {
    let Some(path) = &config.tokenizer.path else {
        bail!("tokenizer.path is required for kind = \"huggingface\"");
    };
    let tokenizer = rustedprompt_assembly::HuggingFaceTokenizer::from_file(path)?;
    Ok(Box::new(tokenizer))
}

#[cfg(not(feature = "huggingface"))]
fn huggingface_tokenizer(_config: &AppConfig) -> anyhow::Result<Box<dyn Tokenizer>> {
    bail!("this build has no Hugging Face tokenizer support; rebuild with --features huggingface")
}

/// The per-image charge. Image-bearing input without a configured weight is
/// rejected rather than guessed at.
fn image_weight(config: &AppConfig, messages: &[Message]) -> anyhow::Result<usize> {
    match config.vision.image_token_weight {
        Some(weight) => Ok(weight),
        None if messages.iter().any(|m| !m.images.is_empty()) => bail!(
            "messages carry images but vision.image_token_weight is not configured \
             (set it in config.toml or RUSTEDPROMPT_IMAGE_TOKEN_WEIGHT)"
        ),
        None => Ok(0),
    }
}
