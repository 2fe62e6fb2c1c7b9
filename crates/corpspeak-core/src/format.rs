//! Reply formatting
//!
//! Turns the raw text of an assistant reply into an ordered list of
//! [`ContentBlock`]s that a UI can lay out as paragraphs, bulleted lists and
//! numbered lists. Nothing beyond list detection is interpreted.
//!
//! Detection is literal: a paragraph is treated as a list when it *contains* a
//! marker anywhere, and prose lines inside such a paragraph are dropped from
//! the list. Ordered lists are only recognised through the `1. ` and `2. `
//! substrings.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Substrings whose presence anywhere in a reply enables paragraph splitting.
pub const TRIGGERS: [&str; 4] = ["- ", "* ", "1. ", "2. "];

const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// A renderable unit of a formatted reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum ContentBlock {
    Paragraph(String),
    UnorderedList(Vec<String>),
    OrderedList(Vec<String>),
}

impl ContentBlock {
    /// List items, or `None` for a paragraph.
    pub fn items(&self) -> Option<&[String]> {
        match self {
            ContentBlock::Paragraph(_) => None,
            ContentBlock::UnorderedList(items) | ContentBlock::OrderedList(items) => Some(items),
        }
    }

    pub fn is_list(&self) -> bool {
        self.items().is_some()
    }
}

fn bullet_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-*]\s+").expect("valid bullet regex"))
}

fn number_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+\.\s+").expect("valid number regex"))
}

/// Split a reply into paragraphs and lists.
///
/// Never fails: text without any trigger substring comes back as a single
/// paragraph holding the input unchanged.
pub fn format_message(content: &str) -> Vec<ContentBlock> {
    if !TRIGGERS.iter().any(|trigger| content.contains(trigger)) {
        return vec![ContentBlock::Paragraph(content.to_string())];
    }

    content
        .split(PARAGRAPH_SEPARATOR)
        .map(classify_paragraph)
        .collect()
}

fn classify_paragraph(paragraph: &str) -> ContentBlock {
    if paragraph.contains("- ") || paragraph.contains("* ") {
        let items = collect_items(paragraph, bullet_prefix(), |line| {
            line.starts_with("- ") || line.starts_with("* ")
        });
        if !items.is_empty() {
            return ContentBlock::UnorderedList(items);
        }
    } else if paragraph.contains("1. ") || paragraph.contains("2. ") {
        let items = collect_items(paragraph, number_prefix(), |line| {
            number_prefix().is_match(line)
        });
        if !items.is_empty() {
            return ContentBlock::OrderedList(items);
        }
    }

    ContentBlock::Paragraph(paragraph.to_string())
}

/// Keep only the lines accepted by `is_item` and strip their marker.
fn collect_items(paragraph: &str, prefix: &Regex, is_item: impl Fn(&str) -> bool) -> Vec<String> {
    paragraph
        .split('\n')
        .map(str::trim)
        .filter(|line| is_item(*line))
        .map(|line| prefix.replace(line, "").trim().to_string())
        .collect()
}
