use corpspeak_core::{format_message, ContentBlock};

fn items(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn text_without_triggers_is_returned_whole() {
    let samples = [
        "Hello there",
        "line one\nline two\n\nline three",
        "no-space-after-dash and 3.14 pi",
        "*bold*, 1.5x growth",
        "   ",
        "émoji 🚀 — dashes – too",
    ];
    for sample in samples {
        assert_eq!(
            format_message(sample),
            vec![ContentBlock::Paragraph(sample.to_string())],
            "input: {:?}",
            sample
        );
    }
}

#[test]
fn empty_input_is_empty_paragraph() {
    assert_eq!(format_message(""), vec![ContentBlock::Paragraph(String::new())]);
}

#[test]
fn simple_bullet_list() {
    assert_eq!(
        format_message("- a\n- b"),
        vec![ContentBlock::UnorderedList(items(&["a", "b"]))]
    );
}

#[test]
fn three_item_numbered_list() {
    assert_eq!(
        format_message("1. a\n2. b\n3. c"),
        vec![ContentBlock::OrderedList(items(&["a", "b", "c"]))]
    );
}

#[test]
fn intro_paragraph_then_list() {
    assert_eq!(
        format_message("intro\n\n- a\n- b"),
        vec![
            ContentBlock::Paragraph("intro".to_string()),
            ContentBlock::UnorderedList(items(&["a", "b"])),
        ]
    );
}

#[test]
fn prose_lines_inside_list_paragraph_are_dropped() {
    let blocks = format_message("note\n- a\nmore text\n- b");
    assert_eq!(blocks, vec![ContentBlock::UnorderedList(items(&["a", "b"]))]);

    let all_text: String = blocks
        .iter()
        .flat_map(|b| b.items().unwrap_or_default().to_vec())
        .collect();
    assert!(!all_text.contains("note"));
    assert!(!all_text.contains("more text"));
}

#[test]
fn list_starting_at_three_is_plain_text() {
    let text = "3. c\n4. d\n5. e";
    assert_eq!(format_message(text), vec![ContentBlock::Paragraph(text.to_string())]);
}

#[test]
fn paragraph_order_is_preserved() {
    let text = "First:\n\n- x\n- y\n\nThen:\n\n1. one\n2. two\n\nDone.";
    let kinds: Vec<&str> = format_message(text)
        .iter()
        .map(|b| match b {
            ContentBlock::Paragraph(_) => "p",
            ContentBlock::UnorderedList(_) => "ul",
            ContentBlock::OrderedList(_) => "ol",
        })
        .collect();
    assert_eq!(kinds, vec!["p", "ul", "p", "ol", "p"]);
}

#[test]
fn plain_paragraphs_round_trip_when_split() {
    let text = "Alpha paragraph\n\nBeta paragraph\n\n- item";
    let blocks = format_message(text);
    let paragraphs: Vec<&str> = blocks
        .iter()
        .filter_map(|b| match b {
            ContentBlock::Paragraph(p) => Some(p.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(paragraphs, vec!["Alpha paragraph", "Beta paragraph"]);
}
