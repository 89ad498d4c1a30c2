//! A small field template language for rendering turns.
//!
//! ```text
//! {{- if .System }}{{ .System }} {{ end }}
//! {{- if .Prompt }}{{ .Prompt }} {{ end }}
//! {{- if .Response }}{{ .Response }} {{ end }}
//! ```
//!
//! Grammar (informal):
//! ```text
//! template = (TEXT | action)*
//! action   = "{{" ["-"] body ["-"] "}}"
//! body     = field | "if" field | "else" | "end"
//! field    = ".System" | ".Prompt" | ".Response" | ".Tools"
//! ```
//!
//! `{{-` trims whitespace before the action, `-}}` trims whitespace after
//! it. `if` blocks nest and take an optional `else`. A field is truthy when
//! non-empty. `.Tools` renders the tool list as JSON.

use rustedprompt_core::{RenderError, TemplateRenderer, ToolDefinition, Turn};
use std::str::FromStr;

/// A parsed turn template.
#[derive(Debug, Clone)]
pub struct FieldTemplate {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    System,
    Prompt,
    Response,
    Tools,
}

impl Field {
    fn parse(name: &str) -> Result<Self, RenderError> {
        match name {
            ".System" => Ok(Field::System),
            ".Prompt" => Ok(Field::Prompt),
            ".Response" => Ok(Field::Response),
            ".Tools" => Ok(Field::Tools),
            other => Err(RenderError::Template(format!("unknown field {other:?}"))),
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Text(String),
    Field(Field),
    If {
        field: Field,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

// ─── Lexer ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Text(String),
    Action(String),
}

fn lex(source: &str) -> Result<Vec<Piece>, RenderError> {
    let mut pieces = Vec::new();
    let mut rest = source;
    let mut trim_next = false;

    while let Some(start) = rest.find("{{") {
        let mut text = &rest[..start];
        if trim_next {
            text = text.trim_start();
        }

        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| RenderError::Template("unterminated action".into()))?;
        let mut body = &after[..end];

        if let Some(stripped) = body.strip_prefix('-') {
            text = text.trim_end();
            body = stripped;
        }
        trim_next = false;
        if let Some(stripped) = body.strip_suffix('-') {
            trim_next = true;
            body = stripped;
        }

        if !text.is_empty() {
            pieces.push(Piece::Text(text.to_string()));
        }
        pieces.push(Piece::Action(body.trim().to_string()));
        rest = &after[end + 2..];
    }

    let text = if trim_next { rest.trim_start() } else { rest };
    if !text.is_empty() {
        pieces.push(Piece::Text(text.to_string()));
    }
    Ok(pieces)
}

// ─── Parser ──────────────────────────────────────────────────────────

/// What ended a block.
enum Stop {
    Else,
    End,
    Eof,
}

fn parse_block<I>(pieces: &mut I) -> Result<(Vec<Node>, Stop), RenderError>
where
    I: Iterator<Item = Piece>,
{
    let mut nodes = Vec::new();

    while let Some(piece) = pieces.next() {
        let body = match piece {
            Piece::Text(text) => {
                nodes.push(Node::Text(text));
                continue;
            }
            Piece::Action(body) => body,
        };

        match body.as_str() {
            "else" => return Ok((nodes, Stop::Else)),
            "end" => return Ok((nodes, Stop::End)),
            _ => {}
        }

        let Some(condition) = body.strip_prefix("if ") else {
            nodes.push(Node::Field(Field::parse(&body)?));
            continue;
        };

        let field = Field::parse(condition.trim())?;
        let (then, stop) = parse_block(pieces)?;
        let otherwise = match stop {
            Stop::End => Vec::new(),
            Stop::Else => match parse_block(pieces)? {
                (otherwise, Stop::End) => otherwise,
                (_, Stop::Else) => {
                    return Err(RenderError::Template("duplicate {{ else }}".into()));
                }
                (_, Stop::Eof) => return Err(unclosed()),
            },
            Stop::Eof => return Err(unclosed()),
        };
        nodes.push(Node::If {
            field,
            then,
            otherwise,
        });
    }

    Ok((nodes, Stop::Eof))
}

fn unclosed() -> RenderError {
    RenderError::Template("{{ if }} without matching {{ end }}".into())
}

impl FieldTemplate {
    /// Parse a template source.
    pub fn parse(source: &str) -> Result<Self, RenderError> {
        let mut pieces = lex(source)?.into_iter();
        match parse_block(&mut pieces)? {
            (nodes, Stop::Eof) => Ok(Self { nodes }),
            (_, Stop::Else) => Err(RenderError::Template("{{ else }} outside {{ if }}".into())),
            (_, Stop::End) => Err(RenderError::Template("{{ end }} outside {{ if }}".into())),
        }
    }
}

impl FromStr for FieldTemplate {
    type Err = RenderError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::parse(source)
    }
}

// ─── Rendering ───────────────────────────────────────────────────────

struct Scope<'a> {
    turn: &'a Turn,
    tools: &'a [ToolDefinition],
}

impl Scope<'_> {
    fn truthy(&self, field: Field) -> bool {
        match field {
            Field::System => !self.turn.system.is_empty(),
            Field::Prompt => !self.turn.prompt.is_empty(),
            Field::Response => !self.turn.response.is_empty(),
            Field::Tools => !self.tools.is_empty(),
        }
    }

    fn write(&self, field: Field, out: &mut String) -> Result<(), RenderError> {
        match field {
            Field::System => out.push_str(&self.turn.system),
            Field::Prompt => out.push_str(&self.turn.prompt),
            Field::Response => out.push_str(&self.turn.response),
            Field::Tools => {
                let json = serde_json::to_string(self.tools)
                    .map_err(|e| RenderError::Failed(format!("tools: {e}")))?;
                out.push_str(&json);
            }
        }
        Ok(())
    }

    fn render(&self, nodes: &[Node], out: &mut String) -> Result<(), RenderError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Field(field) => self.write(*field, out)?,
                Node::If {
                    field,
                    then,
                    otherwise,
                } => {
                    let branch = if self.truthy(*field) { then } else { otherwise };
                    self.render(branch, out)?;
                }
            }
        }
        Ok(())
    }
}

impl TemplateRenderer for FieldTemplate {
    fn render(&self, turn: &Turn, tools: &[ToolDefinition]) -> Result<String, RenderError> {
        let mut out = String::new();
        Scope { turn, tools }.render(&self.nodes, &mut out)?;
        Ok(out)
    }
}
