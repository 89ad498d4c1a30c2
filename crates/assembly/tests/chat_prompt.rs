//! End-to-end tests for chat prompt assembly.
//!
//! These drive the public API with a word-counting tokenizer and a template
//! that prints each non-empty turn field followed by a space.

use rustedprompt_assembly::{FieldTemplate, WhitespaceTokenizer, assemble};
use rustedprompt_core::{Message, RenderError, ToolDefinition, Turn};

const SPACED: &str = "{{- if .System }}{{ .System }} {{ end }}
{{- if .Prompt }}{{ .Prompt }} {{ end }}
{{- if .Response }}{{ .Response }} {{ end }}";

/// Per-image charge of a vision projector.
const IMAGE_WEIGHT: usize = 768;

const GREETING: &str = "Welcome aboard, navigator!";
const QUESTION: &str = "Where are we headed?";
const ORDERS: &str = "North, past the reef. Keep the lamps lit tonight.";

struct Expect {
    prompt: &'static str,
    images: Vec<&'static str>,
}

fn run(limit: usize, msgs: &[Message]) -> (String, Vec<(usize, Vec<u8>)>) {
    let tmpl = FieldTemplate::parse(SPACED).unwrap();
    let result = assemble(&WhitespaceTokenizer, &tmpl, IMAGE_WEIGHT, limit, msgs, &[]).unwrap();
    let images = result
        .images
        .into_iter()
        .map(|img| (img.id, img.data.0))
        .collect();
    (result.prompt, images)
}

fn check(limit: usize, msgs: &[Message], expect: Expect) {
    let (prompt, images) = run(limit, msgs);
    assert_eq!(prompt, expect.prompt);
    assert_eq!(images.len(), expect.images.len(), "image count");
    for (i, (id, data)) in images.iter().enumerate() {
        assert_eq!(*id, i, "image ids are dense and ordered");
        assert_eq!(data.as_slice(), expect.images[i].as_bytes());
    }
}

fn dialogue() -> Vec<Message> {
    vec![
        Message::user(GREETING),
        Message::assistant(QUESTION),
        Message::user(ORDERS),
    ]
}

// ── Budget ───────────────────────────────────────────────────────────────

#[test]
fn whole_dialogue_fits() {
    check(
        64,
        &dialogue(),
        Expect {
            prompt: "Welcome aboard, navigator! Where are we headed? North, past the reef. Keep the lamps lit tonight. ",
            images: vec![],
        },
    );
}

#[test]
fn tiny_budget_keeps_last_message() {
    check(
        1,
        &dialogue(),
        Expect {
            prompt: "North, past the reef. Keep the lamps lit tonight. ",
            images: vec![],
        },
    );
}

#[test]
fn oversized_image_message_still_survives() {
    let mut msgs = dialogue();
    msgs[2] = Message::user(ORDERS).with_image(b"chart".as_slice());
    check(
        64,
        &msgs,
        Expect {
            prompt: "[img-0] North, past the reef. Keep the lamps lit tonight. ",
            images: vec!["chart"],
        },
    );
}

#[test]
fn evicted_image_ids_are_renumbered() {
    let msgs = vec![
        Message::user(GREETING).with_image(b"harbor".as_slice()),
        Message::assistant(QUESTION),
        Message::user(ORDERS).with_image(b"chart".as_slice()),
    ];
    check(
        64,
        &msgs,
        Expect {
            prompt: "[img-0] North, past the reef. Keep the lamps lit tonight. ",
            images: vec!["chart"],
        },
    );
}

#[test]
fn images_across_messages() {
    let msgs = vec![
        Message::user(GREETING).with_image(b"harbor".as_slice()),
        Message::assistant(QUESTION),
        Message::user(ORDERS).with_image(b"chart".as_slice()),
    ];
    check(
        2048,
        &msgs,
        Expect {
            prompt: "[img-0] Welcome aboard, navigator! Where are we headed? [img-1] North, past the reef. Keep the lamps lit tonight. ",
            images: vec!["harbor", "chart"],
        },
    );
}

#[test]
fn image_marker_positions_placeholder() {
    let msgs = vec![
        Message::user("Welcome aboard, navigator! [img]").with_image(b"harbor".as_slice()),
        Message::assistant(QUESTION),
        Message::user(ORDERS).with_image(b"chart".as_slice()),
    ];
    check(
        2048,
        &msgs,
        Expect {
            prompt: "Welcome aboard, navigator! [img-0] Where are we headed? [img-1] North, past the reef. Keep the lamps lit tonight. ",
            images: vec!["harbor", "chart"],
        },
    );
}

fn interleaved() -> Vec<Message> {
    vec![
        Message::user(GREETING),
        Message::user("").with_image(b"harbor".as_slice()),
        Message::user("").with_image(b"chart".as_slice()),
        Message::assistant(QUESTION),
        Message::user(ORDERS),
    ]
}

#[test]
fn interleaved_images_merge_into_one_prompt() {
    check(
        2048,
        &interleaved(),
        Expect {
            prompt: "Welcome aboard, navigator!\n\n[img-0]\n\n[img-1] Where are we headed? North, past the reef. Keep the lamps lit tonight. ",
            images: vec!["harbor", "chart"],
        },
    );
}

#[test]
fn interleaved_images_truncate_from_the_front() {
    // 9 + 4 + 768 fits in 1024; the next image would not.
    check(
        1024,
        &interleaved(),
        Expect {
            prompt: "[img-0] Where are we headed? North, past the reef. Keep the lamps lit tonight. ",
            images: vec!["chart"],
        },
    );
}

// ── System messages ──────────────────────────────────────────────────────

#[test]
fn leading_system_message() {
    let mut msgs = vec![Message::system("You steer the ship.")];
    msgs.extend(dialogue());
    check(
        2048,
        &msgs,
        Expect {
            prompt: "You steer the ship. Welcome aboard, navigator! Where are we headed? North, past the reef. Keep the lamps lit tonight. ",
            images: vec![],
        },
    );
}

#[test]
fn out_of_order_system_message() {
    let msgs = vec![
        Message::user(GREETING),
        Message::assistant(QUESTION),
        Message::system("You steer the ship."),
        Message::user(ORDERS),
    ];
    check(
        2048,
        &msgs,
        Expect {
            prompt: "Welcome aboard, navigator! Where are we headed? You steer the ship. North, past the reef. Keep the lamps lit tonight. ",
            images: vec![],
        },
    );
}

#[test]
fn system_message_survives_any_budget() {
    let mut msgs = vec![Message::system("You steer the ship.")];
    msgs.extend(dialogue());
    check(
        1,
        &msgs,
        Expect {
            prompt: "You steer the ship. North, past the reef. Keep the lamps lit tonight. ",
            images: vec![],
        },
    );
}

#[test]
fn system_only_conversation() {
    check(
        10,
        &[Message::system("rules")],
        Expect {
            prompt: "rules ",
            images: vec![],
        },
    );
}

#[test]
fn empty_conversation_renders_empty_turn() {
    let tmpl = FieldTemplate::parse("[{{ .System }}|{{ .Prompt }}|{{ .Response }}]").unwrap();
    let result = assemble(&WhitespaceTokenizer, &tmpl, IMAGE_WEIGHT, 10, &[], &[]).unwrap();
    assert_eq!(result.prompt, "[||]");
    assert!(result.images.is_empty());
}

// ── Short scenarios ──────────────────────────────────────────────────────

#[test]
fn short_dialogue_without_truncation() {
    let msgs = vec![
        Message::user("a b"),
        Message::assistant("c d"),
        Message::user("e f"),
    ];
    assert_eq!(run(usize::MAX, &msgs).0, "a b c d e f ");
    assert_eq!(run(1, &msgs).0, "e f ");
}

#[test]
fn image_without_marker_is_prepended() {
    let (prompt, images) = run(2048, &[Message::user("hi").with_image(b"X".as_slice())]);
    assert_eq!(prompt, "[img-0] hi ");
    assert_eq!(images, vec![(0, b"X".to_vec())]);
}

#[test]
fn image_marker_is_replaced_in_place() {
    let (prompt, _) = run(
        2048,
        &[Message::user("see [img] here").with_image(b"X".as_slice())],
    );
    assert_eq!(prompt, "see [img-0] here ");
}

#[test]
fn several_images_in_one_message_read_in_order() {
    let msgs = vec![
        Message::user("")
            .with_image(b"harbor".as_slice())
            .with_image(b"chart".as_slice()),
        Message::assistant(QUESTION),
        Message::user("Compare these.")
            .with_image(b"reef".as_slice())
            .with_image(b"lamp".as_slice())
            .with_image(b"mast".as_slice()),
    ];
    check(
        4096,
        &msgs,
        Expect {
            prompt: "[img-0][img-1] Where are we headed? [img-2][img-3][img-4] Compare these. ",
            images: vec!["harbor", "chart", "reef", "lamp", "mast"],
        },
    );
}

#[test]
fn text_then_image_only_message_share_a_turn() {
    let calls = std::sync::Mutex::new(Vec::new());
    let render = |turn: &Turn, _: &[ToolDefinition]| -> Result<String, RenderError> {
        calls.lock().unwrap().push(turn.clone());
        Ok(format!("{} ", turn.prompt))
    };
    let msgs = vec![
        Message::user("x"),
        Message::user("").with_image(b"Y".as_slice()),
    ];
    let result = assemble(&WhitespaceTokenizer, &render, IMAGE_WEIGHT, 2048, &msgs, &[]).unwrap();
    assert_eq!(result.prompt, "x\n\n[img-0] ");
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].prompt, "x\n\n[img-0]");
}

#[test]
fn system_between_turns_flushes() {
    let msgs = vec![
        Message::user("a"),
        Message::assistant("b"),
        Message::system("s"),
        Message::user("c"),
    ];
    assert_eq!(run(2048, &msgs).0, "a b s c ");
}

// ── Properties ───────────────────────────────────────────────────────────

fn placeholder_ids(prompt: &str) -> Vec<usize> {
    prompt
        .match_indices("[img-")
        .filter_map(|(at, _)| {
            let rest = &prompt[at + 5..];
            let end = rest.find(']')?;
            rest[..end].parse().ok()
        })
        .collect()
}

#[test]
fn placeholders_match_images_at_every_budget() {
    let msgs = vec![
        Message::system("Describe what you see."),
        Message::user("first [img] shot").with_image(b"1".as_slice()),
        Message::assistant("A lighthouse."),
        Message::user("")
            .with_image(b"2".as_slice())
            .with_image(b"3".as_slice()),
        Message::assistant("Two boats."),
        Message::user("and this one?").with_image(b"4".as_slice()),
    ];

    for limit in [1, 10, 800, 1600, 2400, 3200, 10_000] {
        let (prompt, images) = run(limit, &msgs);
        let mut ids = placeholder_ids(&prompt);
        ids.sort_unstable();
        let expected: Vec<usize> = (0..images.len()).collect();
        assert_eq!(ids, expected, "limit {limit}: {prompt:?}");
        assert!(!images.is_empty(), "newest message always survives");
        assert!(prompt.starts_with("Describe what you see."));
    }
}
