//! Intent values and the summarize presentation rule.

use lectern_core::AgentKind;

/// Presented-text ceiling before the shortening rule applies.
const PRESENTED_MAX_CHARS: usize = 500;

/// Lines kept when a long selection has at least this many.
const PRESENTED_MAX_LINES: usize = 3;

/// What the user chose to do with a selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntentKind {
    /// Pre-fill the input with the selection and let the user edit it.
    Ask,
    /// Send the selection to the summarizer immediately.
    Summarize,
}

/// Transient description of what the user wants done with selected text.
///
/// Never stored. `source_text` is always the full original selection and is
/// the authoritative context sent to the backend; only `presented_text` may
/// be shortened for display.
#[derive(Clone, Debug, PartialEq)]
pub struct Intent {
    pub kind: IntentKind,
    pub source_text: String,
    pub presented_text: String,
    pub agent_hint: Option<AgentKind>,
    /// True when the intent dispatches immediately on window open instead of
    /// waiting in the input.
    pub auto_dispatch: bool,
}

impl Intent {
    /// Ask about the selection. Nothing is truncated and nothing dispatches.
    pub fn ask(selection_text: &str) -> Self {
        Self {
            kind: IntentKind::Ask,
            source_text: selection_text.to_string(),
            presented_text: selection_text.to_string(),
            agent_hint: None,
            auto_dispatch: false,
        }
    }

    /// Summarize the selection. Dispatches immediately with the summarizer
    /// hint; the presented text follows the shortening rule.
    pub fn summarize(selection_text: &str) -> Self {
        Self {
            kind: IntentKind::Summarize,
            source_text: selection_text.to_string(),
            presented_text: summarize_presented_text(selection_text),
            agent_hint: Some(AgentKind::Summarizer),
            auto_dispatch: true,
        }
    }
}

/// Derives the displayed rendition of a summarize selection.
///
/// Trims and normalizes line breaks, then shortens only when the normalized
/// text exceeds 500 characters: to its first 3 lines when at least 3 exist,
/// to its first 500 characters otherwise.
pub fn summarize_presented_text(selection_text: &str) -> String {
    let normalized = normalize_line_breaks(selection_text.trim());
    if normalized.chars().count() <= PRESENTED_MAX_CHARS {
        return normalized;
    }

    let lines: Vec<&str> = normalized.lines().collect();
    if lines.len() >= PRESENTED_MAX_LINES {
        lines[..PRESENTED_MAX_LINES].join("\n")
    } else {
        normalized.chars().take(PRESENTED_MAX_CHARS).collect()
    }
}

fn normalize_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ---- Presented-text derivation ----

    #[test]
    fn test_short_selection_presented_unchanged() {
        let text = "A short paragraph about lecterns.";
        assert_eq!(summarize_presented_text(text), text);
    }

    #[test]
    fn test_exactly_500_chars_unchanged() {
        let text = "a".repeat(500);
        assert_eq!(summarize_presented_text(&text), text);
    }

    #[test]
    fn test_long_single_line_takes_first_500_chars() {
        let text = "b".repeat(900);
        let presented = summarize_presented_text(&text);
        assert_eq!(presented, "b".repeat(500));
    }

    #[test]
    fn test_three_line_800_char_selection_keeps_lines() {
        let line = "c".repeat(266);
        let text = format!("{line}\n{line}\n{line}");
        assert!(text.chars().count() > 500);

        let presented = summarize_presented_text(&text);
        assert_eq!(presented, text);
    }

    #[test]
    fn test_four_line_selection_keeps_first_three() {
        let line = "d".repeat(200);
        let text = format!("{line}\n{line}\n{line}\n{line}");

        let presented = summarize_presented_text(&text);
        assert_eq!(presented, format!("{line}\n{line}\n{line}"));
    }

    #[test]
    fn test_two_line_long_selection_takes_first_500_chars() {
        let line = "e".repeat(400);
        let text = format!("{line}\n{line}");

        let presented = summarize_presented_text(&text);
        let expected: String = text.chars().take(500).collect();
        assert_eq!(presented, expected);
    }

    #[test]
    fn test_crlf_and_cr_normalized() {
        let text = "first\r\nsecond\rthird";
        assert_eq!(summarize_presented_text(text), "first\nsecond\nthird");
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        let text = "  padded selection \n";
        assert_eq!(summarize_presented_text(text), "padded selection");
    }

    #[test]
    fn test_line_count_includes_newline_chars_in_budget() {
        // 3 lines of 166 chars plus 2 newlines stays at exactly 500.
        let line = "f".repeat(166);
        let text = format!("{line}\n{line}\n{line}");
        assert_eq!(text.chars().count(), 500);
        assert_eq!(summarize_presented_text(&text), text);
    }

    // ---- Intent construction ----

    #[test]
    fn test_ask_never_truncates() {
        let text = "g".repeat(2000);
        let intent = Intent::ask(&text);
        assert_eq!(intent.kind, IntentKind::Ask);
        assert_eq!(intent.presented_text, intent.source_text);
        assert_eq!(intent.source_text, text);
        assert_eq!(intent.agent_hint, None);
        assert!(!intent.auto_dispatch);
    }

    #[test]
    fn test_summarize_keeps_source_text_whole() {
        let line = "h".repeat(300);
        let text = format!("{line}\n{line}\n{line}\n{line}");
        let intent = Intent::summarize(&text);

        assert_eq!(intent.kind, IntentKind::Summarize);
        assert_eq!(intent.source_text, text);
        assert_eq!(intent.presented_text, format!("{line}\n{line}\n{line}"));
        assert_eq!(intent.agent_hint, Some(AgentKind::Summarizer));
        assert!(intent.auto_dispatch);
    }

    #[test]
    fn test_summarize_short_selection_presented_equals_source() {
        let intent = Intent::summarize("brief passage");
        assert_eq!(intent.presented_text, intent.source_text);
    }
}
