//! Response parser.
//!
//! Turns the model's free-form reply into a uniform slide list. Structured
//! formats answer with a JSON object carrying a `slides` array; everything
//! else, and any structured reply that fails validation, goes through a
//! line-oriented recovery state machine.

use rand::seq::SliceRandom;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use vignette_core::{ContentFormat, OutputMode, Slide};

/// Substring markers that identify a call-to-action line (case-insensitive).
const CTA_MARKERS: &[&str] = &[
    "save this",
    "save for later",
    "send this",
    "try one tonight",
    "which one are you",
    "comment which",
    "drop it below",
    "come back to it",
];

/// Canned closers for when the model never produced a call-to-action.
const CANNED_CTAS: &[&str] = &[
    "save this so you can come back to it when you need it",
    "save this for later 💙",
    "try one tonight 💙",
    "send this to someone who needs it",
];

/// Literal placeholder fragments that invalidate a structured reply.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "explanation here",
    "[hook text]",
    "[phrase]",
    "[situation]",
    "[action phrase]",
];

/// Item prefixes that open a numbered block.
const ITEM_PREFIXES: &[&str] = &["tip ", "step ", "habit ", "script "];

/// A parsed model reply.
///
/// `caption` and `stock_query` only come back from structured replies;
/// heuristic recovery never produces them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    /// Hook first, call-to-action last.
    pub slides: Vec<Slide>,
    /// Caption text surfaced by the format's JSON reply.
    pub caption: Option<String>,
    /// Stock search query surfaced by the format's JSON reply.
    pub stock_query: Option<String>,
}

/// Parse a raw model reply into exactly the expected number of slides.
///
/// Structured formats try the JSON path first; a missing object, a slide
/// count mismatch, or placeholder text all fall back to heuristic recovery
/// rather than failing. Heuristic recovery always yields a full slide list,
/// padding with visibly-marked placeholder items when the reply came up
/// short.
#[tracing::instrument(skip(raw), fields(format = %format.name(), num_items))]
pub fn parse_response(
    raw: &str,
    format: &ContentFormat,
    topic: &str,
    num_items: usize,
) -> ParsedResponse {
    let expected_total = match format {
        ContentFormat::Cloned(cloned) => cloned.slide_count,
        ContentFormat::Builtin(_) => num_items + 2,
    };

    if format.output_mode() == OutputMode::Structured {
        if let Some(parsed) = parse_structured(raw, expected_total) {
            return parsed;
        }
        tracing::warn!(
            format = %format.name(),
            "Structured parse failed, falling back to heuristic recovery"
        );
    }

    parse_heuristic(raw, format, topic, expected_total.saturating_sub(2))
}

#[derive(Debug, Deserialize)]
struct WireSlide {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    slides: Vec<WireSlide>,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default, alias = "pexels_query")]
    stock_query: Option<String>,
}

/// Structured path: deserialize the first top-level object literal in the
/// reply. Returns `None` on any defect so the caller can fall back.
fn parse_structured(raw: &str, expected_total: usize) -> Option<ParsedResponse> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }

    let wire: WireResponse = serde_json::from_str(&raw[start..=end]).ok()?;
    if wire.slides.len() != expected_total {
        tracing::warn!(
            got = wire.slides.len(),
            expected = expected_total,
            "Structured reply has wrong slide count"
        );
        return None;
    }

    let has_placeholder = wire.slides.iter().any(|slide| {
        let lower = slide.text.to_lowercase();
        PLACEHOLDER_PATTERNS.iter().any(|p| lower.contains(p))
    });
    if has_placeholder {
        tracing::warn!("Structured reply contains placeholder text");
        return None;
    }

    Some(ParsedResponse {
        slides: wire.slides.into_iter().map(|s| Slide::new(s.text)).collect(),
        caption: wire.caption,
        stock_query: wire.stock_query,
    })
}

/// Heuristic recovery state machine.
#[derive(Debug)]
enum ParseState {
    SeekingItem,
    InItem { lines: Vec<String> },
    Done,
}

fn parse_heuristic(
    raw: &str,
    format: &ContentFormat,
    topic: &str,
    num_items: usize,
) -> ParsedResponse {
    let cleaned = strip_meta_markup(raw);
    let lines: Vec<&str> = cleaned.lines().map(str::trim).collect();

    let hook = find_hook(&lines)
        .map(clean_text)
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| format.fallback_hook(topic, num_items));

    let mut items: Vec<String> = Vec::new();
    let mut state = ParseState::SeekingItem;
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];

        state = match state {
            ParseState::SeekingItem => {
                if line.is_empty() || matches!(line, "---" | "****" | "***" | "**" | "*") {
                    index += 1;
                    ParseState::SeekingItem
                } else if line.to_lowercase().starts_with("slide") || line.starts_with('#') {
                    index += 1;
                    ParseState::SeekingItem
                } else if line == hook {
                    index += 1;
                    ParseState::SeekingItem
                } else if is_cta(line) {
                    ParseState::Done
                } else if is_item_start(line) {
                    index += 1;
                    ParseState::InItem {
                        lines: vec![line.to_string()],
                    }
                } else {
                    index += 1;
                    ParseState::SeekingItem
                }
            }
            ParseState::InItem { lines: mut item_lines } => {
                if line.is_empty() {
                    // A blank line ends the item only when the next real
                    // content opens a new item or the call-to-action;
                    // otherwise it is dropped and collection continues.
                    let peek = lines[index + 1..]
                        .iter()
                        .find(|l| !l.is_empty())
                        .copied();
                    match peek {
                        Some(next) if is_item_start(next) || is_cta(next) => {
                            finish_item(&mut items, item_lines, &hook);
                            ParseState::SeekingItem
                        }
                        _ => {
                            index += 1;
                            ParseState::InItem { lines: item_lines }
                        }
                    }
                } else if is_cta(line) {
                    finish_item(&mut items, item_lines, &hook);
                    ParseState::Done
                } else if line.to_lowercase().starts_with("slide") || line.starts_with('#') {
                    finish_item(&mut items, item_lines, &hook);
                    index += 1;
                    ParseState::SeekingItem
                } else if is_item_start(line) {
                    finish_item(&mut items, item_lines, &hook);
                    ParseState::SeekingItem
                } else {
                    item_lines.push(line.to_string());
                    index += 1;
                    ParseState::InItem { lines: item_lines }
                }
            }
            ParseState::Done => break,
        };

        if items.len() >= num_items {
            if let ParseState::SeekingItem = state {
                break;
            }
        }
    }
    if let ParseState::InItem { lines: item_lines } = state {
        finish_item(&mut items, item_lines, &hook);
    }

    // The call-to-action may appear anywhere in the raw reply; the first
    // matching line becomes the final slide.
    let cta = lines
        .iter()
        .find(|l| is_cta(l))
        .map(|l| clean_text(l))
        .filter(|c| !c.is_empty())
        .unwrap_or_else(random_cta);

    items.truncate(num_items);
    if items.len() < num_items {
        tracing::warn!(
            got = items.len(),
            expected = num_items,
            "Recovered fewer items than requested, padding with placeholders"
        );
        while items.len() < num_items {
            items.push(format!("tip {}\n\nexplanation here", items.len() + 1));
        }
    }

    let mut slides = Vec::with_capacity(num_items + 2);
    slides.push(Slide::new(hook));
    slides.extend(items.into_iter().map(Slide::new));
    slides.push(Slide::new(cta));

    ParsedResponse {
        slides,
        caption: None,
        stock_query: None,
    }
}

/// The hook is the first non-empty, non-all-caps line that is neither an
/// item opener nor a call-to-action.
fn find_hook<'a>(lines: &[&'a str]) -> Option<&'a str> {
    lines.iter().copied().find(|line| {
        !line.is_empty()
            && !starts_with_item_prefix(line)
            && !line.to_lowercase().starts_with("save this")
            && !is_all_caps(line)
    })
}

fn finish_item(items: &mut Vec<String>, item_lines: Vec<String>, hook: &str) {
    // Header and body rejoined with a blank line; the renderer splits on it.
    let joined = clean_text(&item_lines.join("\n\n"));
    if !joined.is_empty() && joined != hook {
        items.push(joined);
    }
}

fn starts_with_item_prefix(line: &str) -> bool {
    let lower = line.to_lowercase();
    ITEM_PREFIXES.iter().any(|p| lower.starts_with(p))
}

fn is_item_start(line: &str) -> bool {
    if starts_with_item_prefix(line) {
        return true;
    }
    // Generic "label: content" opener; cloned formats invent their own
    // labels, so any short pre-colon phrase counts.
    if let Some((before, _)) = line.split_once(':') {
        let before = before.trim();
        let words = before.split_whitespace().count();
        return (1..=3).contains(&words) && before.len() <= 30;
    }
    false
}

fn is_cta(line: &str) -> bool {
    let lower = line.to_lowercase();
    CTA_MARKERS.iter().any(|m| lower.contains(m))
}

fn is_all_caps(line: &str) -> bool {
    let mut has_alpha = false;
    for c in line.chars() {
        if c.is_alphabetic() {
            has_alpha = true;
            if c.is_lowercase() {
                return false;
            }
        }
    }
    has_alpha
}

fn random_cta() -> String {
    let mut rng = rand::thread_rng();
    CANNED_CTAS
        .choose(&mut rng)
        .copied()
        .unwrap_or(CANNED_CTAS[0])
        .to_string()
}

static SLIDE_BOLD_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*\*SLIDE\s+\d+\s*(\([^)]*\))?\s*\*\*:?\s*").expect("slide bold label pattern")
});
static SLIDE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)#?\s*SLIDE\s+\d+:?\s*(\([^)]*\))?\s*").expect("slide label pattern")
});
static HEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s+.*$").expect("heading line pattern"));
static EMPTY_BOLD_COLON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\*\*:\*\*\s*$").expect("empty bold colon pattern"));
static SLIDE_META_INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\*\*SLIDE\s+\d+\s*\([^)]*\)\s*\*\*:?").expect("inline slide meta pattern")
});
static LEADING_HASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#+\s*").expect("leading hashes pattern"));
static BOLD_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("bold span pattern"));

/// Remove slide-number labels, heading lines, and separator rules before
/// line-oriented recovery.
fn strip_meta_markup(raw: &str) -> String {
    let text = SLIDE_BOLD_LABEL.replace_all(raw, "");
    let text = SLIDE_LABEL.replace_all(&text, "");
    let text = text.replace("---", "");
    let text = HEADING_LINE.replace_all(&text, "");
    EMPTY_BOLD_COLON.replace_all(&text, "").into_owned()
}

/// Normalize one slide's text: drop markup artifacts, trim every line, and
/// rejoin the survivors with blank lines.
fn clean_text(text: &str) -> String {
    let text = SLIDE_META_INLINE.replace_all(text, "");
    let text = text.trim_matches(|c| c == '"' || c == '\'');
    let text = text.replace("\\\"", "").replace("\\'", "");
    let text = LEADING_HASHES.replace(&text, "");
    let text = BOLD_SPAN.replace_all(&text, "$1");
    let text = text.replace("****", "").replace("***", "").replace("---", "");

    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use vignette_core::{BuiltinFormat, ClonedFormat};

    fn habit_list() -> ContentFormat {
        ContentFormat::Builtin(BuiltinFormat::HabitList)
    }

    fn scripts() -> ContentFormat {
        ContentFormat::Builtin(BuiltinFormat::Scripts)
    }

    fn tip_block(n: usize) -> String {
        format!("tip {n}: do the thing\n\nthis works because reasons. honestly it does.")
    }

    #[test]
    fn well_formed_reply_parses_to_full_carousel() {
        let mut raw = String::from("why your bedtime routine keeps failing\n\n");
        for n in 1..=5 {
            raw.push_str(&tip_block(n));
            raw.push_str("\n\n");
        }
        raw.push_str("save this so you can come back to it\n");

        let parsed = parse_response(&raw, &habit_list(), "toddler tantrums", 5);
        assert_eq!(parsed.slides.len(), 7);
        assert_eq!(parsed.slides[0].text, "why your bedtime routine keeps failing");
        for n in 1..=5 {
            assert!(parsed.slides[n].text.starts_with("tip"), "{:?}", parsed.slides[n]);
        }
        assert!(parsed.slides[6].text.contains("save this"));
    }

    #[test]
    fn slide_count_law_holds_across_item_counts() {
        for count in 5..=10 {
            let mut raw = String::from("the hook line\n\n");
            for n in 1..=count {
                raw.push_str(&tip_block(n));
                raw.push_str("\n\n");
            }
            raw.push_str("save for later\n");

            let parsed = parse_response(&raw, &habit_list(), "naps", count);
            assert_eq!(parsed.slides.len(), count + 2);
            assert_eq!(parsed.slides[0].text, "the hook line");
            assert!(is_cta(&parsed.slides[count + 1].text));
        }
    }

    #[test]
    fn hook_skips_all_caps_titles_and_item_lines() {
        let raw = "HOW TO HANDLE PICKY EATING\n\ntip 1: offer twice\n\nthe real hook\n";
        let lines: Vec<&str> = raw.lines().map(str::trim).collect();
        assert_eq!(find_hook(&lines), Some("the real hook"));
    }

    #[test]
    fn missing_hook_synthesizes_format_fallback() {
        let raw = "tip 1: something\n\nexplanation text here\n\nsave this for later\n";
        let parsed = parse_response(&raw, &habit_list(), "picky eating", 5);
        assert_eq!(
            parsed.slides[0].text,
            "5 tips about picky eating that actually work"
        );
    }

    #[test]
    fn short_reply_pads_with_visible_placeholders_before_cta() {
        let raw = "a decent hook\n\ntip 1: only one tip\n\nit works\n\nsave this for later\n";
        let parsed = parse_response(&raw, &habit_list(), "naps", 5);
        assert_eq!(parsed.slides.len(), 7);
        assert!(parsed.slides[2].text.contains("explanation here"));
        assert!(parsed.slides[6].text.contains("save this"), "CTA stays last");
    }

    #[test]
    fn missing_cta_synthesizes_canned_closer() {
        let mut raw = String::from("a hook\n\n");
        for n in 1..=5 {
            raw.push_str(&tip_block(n));
            raw.push_str("\n\n");
        }
        let parsed = parse_response(&raw, &habit_list(), "naps", 5);
        assert!(is_cta(&parsed.slides[6].text));
    }

    #[test]
    fn blank_line_lookahead_keeps_multi_paragraph_items_together() {
        let raw = "hook line\n\ntip 1: wake windows\n\nfirst paragraph.\n\nsecond paragraph, \
                   still tip 1.\n\ntip 2: dark room\n\nexplanation.\n\nsave this for later\n";
        let parsed = parse_response(&raw, &habit_list(), "naps", 2);
        assert!(parsed.slides[1].text.contains("second paragraph"));
        assert!(parsed.slides[2].text.starts_with("tip 2"));
    }

    #[test]
    fn label_colon_heuristic_accepts_short_labels_only() {
        assert!(is_item_start("Morning Reset: open the blinds first"));
        assert!(is_item_start("step 3: check the wake window"));
        assert!(!is_item_start(
            "here's the thing that nobody mentions about routines: they drift"
        ));
        assert!(!is_item_start("plain continuation line"));
    }

    #[test]
    fn meta_markup_is_stripped_before_recovery() {
        let raw = "**SLIDE 1 (Hook):** the actual hook\n\n---\n\n# SLIDE 2:\ntip 1: do less\n\n\
                   it compounds.\n\nsave this for later\n";
        let parsed = parse_response(&raw, &habit_list(), "routines", 1);
        assert_eq!(parsed.slides[0].text, "the actual hook");
        assert!(parsed.slides[1].text.starts_with("tip 1"));
    }

    #[test]
    fn clean_text_unwraps_bold_and_quotes() {
        assert_eq!(clean_text("\"**bold claim**\""), "bold claim");
        assert_eq!(clean_text("## heading style"), "heading style");
        assert_eq!(
            clean_text("label line\n   \nbody line  "),
            "label line\n\nbody line"
        );
    }

    #[test]
    fn structured_reply_returns_slides_byte_for_byte() {
        let raw = r#"Here you go:
{"slides":[{"text":"Tantrum Scripts That Work\n(What to Say)"},{"text":"When They're Melting Down\n• come here\n• I see you\n• let's breathe"},{"text":"When They Refuse\n• two choices\n• you pick\n• then we go"},{"text":"When They Hit\n• hands down\n• I won't let you\n• try again"},{"text":"When They Scream\n• quiet voice\n• I'm here\n• take your time"},{"text":"When They Cling\n• one more hug\n• then mama goes\n• see you soon"},{"text":"Save this for the next meltdown 💙"}],"caption":"scripts that actually work","pexels_query":"parent comforting toddler"}"#;
        let parsed = parse_response(raw, &scripts(), "toddler tantrums", 5);
        assert_eq!(parsed.slides.len(), 7);
        assert_eq!(
            parsed.slides[0].text,
            "Tantrum Scripts That Work\n(What to Say)"
        );
        assert_eq!(parsed.caption.as_deref(), Some("scripts that actually work"));
        assert_eq!(parsed.stock_query.as_deref(), Some("parent comforting toddler"));
    }

    #[test]
    fn structured_reparse_of_serialized_slides_is_identical() {
        let slides: Vec<Slide> = (0..7)
            .map(|i| Slide::new(format!("slide text {i}")))
            .collect();
        let json = serde_json::json!({
            "slides": slides.iter().map(|s| serde_json::json!({"text": s.text})).collect::<Vec<_>>()
        })
        .to_string();
        let parsed = parse_response(&json, &scripts(), "anything", 5);
        assert_eq!(parsed.slides, slides);
    }

    #[test]
    fn structured_count_mismatch_falls_back_to_heuristic() {
        let raw = r#"{"slides":[{"text":"only"},{"text":"three"},{"text":"slides"}]}"#;
        let parsed = parse_response(raw, &scripts(), "tantrums", 5);
        // Heuristic recovery still yields a full carousel.
        assert_eq!(parsed.slides.len(), 7);
    }

    #[test]
    fn structured_placeholder_text_falls_back_to_heuristic() {
        let raw = r#"{"slides":[{"text":"hook"},{"text":"[situation] goes here"},{"text":"b"},{"text":"c"},{"text":"d"},{"text":"e"},{"text":"save this"}]}"#;
        let parsed = parse_response(raw, &scripts(), "tantrums", 5);
        assert_eq!(parsed.slides.len(), 7);
        assert!(parsed.caption.is_none(), "structured path must be rejected");
    }

    #[test]
    fn cloned_format_uses_its_own_slide_count() {
        let cloned = ContentFormat::Cloned(ClonedFormat {
            name: "myth_busting".into(),
            slide_count: 4,
            prompt_template: "bust myths about {topic}".into(),
            image_prompt_templates: vec![],
        });
        let raw = r#"{"slides":[{"text":"a"},{"text":"b"},{"text":"c"},{"text":"d"}]}"#;
        let parsed = parse_response(raw, &cloned, "sleep myths", 5);
        assert_eq!(parsed.slides.len(), 4);
    }
}
