//! Structural post-processing of generated responses. Pure and
//! deterministic; a second pass over already-well-formatted text is a
//! no-op.

use once_cell::sync::Lazy;
use regex::Regex;

/// Threshold beyond which a response gets a synthesized executive summary.
pub const SUMMARY_LENGTH_THRESHOLD: usize = 1200;

/// Paragraph chunks longer than this without their own header get one.
const HEADERLESS_CHUNK_LIMIT: usize = 80;

const MAX_SUMMARY_LINES: usize = 6;

/// Keyword table mapping chunk content to a section header, checked in
/// order; the rotation below covers chunks that match nothing.
const HEADER_KEYWORDS: &[(&[&str], &str)] = &[
    (&["implement", "execute", "rollout", "timeline"], "## Implementation Strategy"),
    (&["position", "differentiat", "competitor"], "## Market Positioning"),
    (&["audience", "customer", "segment"], "## Audience Insights"),
    (&["metric", "measure", "kpi", "roi"], "## Success Metrics"),
    (&["brand", "identity", "visual", "logo"], "## Brand Foundations"),
];

const DEFAULT_HEADERS: &[&str] = &[
    "## Strategic Overview",
    "## Key Considerations",
    "## Recommended Actions",
    "## Next Steps",
];

static EXCESS_BLANK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("blank pattern"));
static TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#\s+\S").expect("title pattern"));
static LIST_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(\s*)(?:\d+[.)]|[*•])\s+").expect("list pattern"));
static EXEC_SUMMARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^#{1,3}\s.*executive summary").expect("summary pattern"));
static KEY_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(important|critical|key|essential)\b").expect("key pattern"));

/// Apply the full formatting pipeline to raw generated text.
pub fn format_response(text: &str) -> String {
    let text = normalize_whitespace(text);
    let text = ensure_title(&text);
    let text = assign_section_headers(&text);
    let text = normalize_lists(&text);
    let text = collapse_blank_lines(&text);
    let text = inject_executive_summary(&text);
    text.trim().to_string()
}

fn normalize_whitespace(text: &str) -> String {
    let trimmed_lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    collapse_blank_lines(&trimmed_lines.join("\n"))
        .trim()
        .to_string()
}

fn collapse_blank_lines(text: &str) -> String {
    EXCESS_BLANK_RE.replace_all(text, "\n\n").into_owned()
}

/// Synthesize a title from the first sentence when none exists and the
/// sentence is short enough to read as one.
fn ensure_title(text: &str) -> String {
    if TITLE_RE.is_match(text) || text.trim_start().starts_with('#') {
        return text.to_string();
    }

    let first_sentence = text
        .split_inclusive(['.', '!', '?'])
        .next()
        .map(|s| s.trim_end_matches(['.', '!', '?']).trim())
        .unwrap_or("");

    if (10..=100).contains(&first_sentence.len()) {
        format!("# {}\n\n{}", first_sentence, text)
    } else {
        text.to_string()
    }
}

fn chunk_has_structure(chunk: &str) -> bool {
    let first_line = chunk.lines().next().unwrap_or("").trim_start();
    first_line.starts_with('#')
        || first_line.starts_with('-')
        || first_line.starts_with('*')
        || first_line.starts_with('•')
        || first_line == "---"
        || first_line
            .chars()
            .next()
            .map(|c| c.is_ascii_digit())
            .unwrap_or(false)
}

fn header_for_chunk(chunk: &str, rotation: &mut usize) -> &'static str {
    let lowered = chunk.to_lowercase();
    for (keywords, header) in HEADER_KEYWORDS {
        if keywords.iter().any(|kw| lowered.contains(kw)) {
            return header;
        }
    }
    let header = DEFAULT_HEADERS[*rotation % DEFAULT_HEADERS.len()];
    *rotation += 1;
    header
}

fn assign_section_headers(text: &str) -> String {
    let mut rotation = 0;
    let mut out: Vec<String> = Vec::new();
    for chunk in text.split("\n\n") {
        // A chunk sitting directly under a `##` header already has one; only
        // the document title does not count.
        let under_section = out
            .last()
            .and_then(|prev| prev.lines().last())
            .map(|line| line.trim_start().starts_with("##"))
            .unwrap_or(false);

        if chunk.len() > HEADERLESS_CHUNK_LIMIT && !chunk_has_structure(chunk) && !under_section {
            out.push(format!(
                "{}\n\n{}",
                header_for_chunk(chunk, &mut rotation),
                chunk
            ));
        } else {
            out.push(chunk.to_string());
        }
    }
    out.join("\n\n")
}

/// Rewrite numbered and alternative bullet markers as `- `.
fn normalize_lists(text: &str) -> String {
    LIST_MARKER_RE.replace_all(text, "${1}- ").into_owned()
}

fn is_key_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("- ") || trimmed.contains("**") || KEY_LINE_RE.is_match(trimmed)
}

fn inject_executive_summary(text: &str) -> String {
    if text.len() <= SUMMARY_LENGTH_THRESHOLD || EXEC_SUMMARY_RE.is_match(text) {
        return text.to_string();
    }

    let key_lines: Vec<String> = text
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .filter(|line| is_key_line(line))
        .take(MAX_SUMMARY_LINES)
        .map(|line| {
            let stripped = line.trim().trim_start_matches("- ").trim();
            format!("- {}", stripped)
        })
        .collect();

    if key_lines.is_empty() {
        return text.to_string();
    }

    format!(
        "## Executive Summary\n\n{}\n\n---\n\n{}",
        key_lines.join("\n"),
        text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excess_blank_lines_are_collapsed() {
        let formatted = format_response("# Plan\n\n## Scope\n\n\n\n- first item here");
        assert!(!formatted.contains("\n\n\n"));
    }

    #[test]
    fn title_is_synthesized_from_a_short_first_sentence() {
        let formatted = format_response("Position the brand around trust. More detail follows.");
        assert!(formatted.starts_with("# Position the brand around trust"));
    }

    #[test]
    fn overlong_first_sentence_is_not_promoted_to_title() {
        let long_sentence = format!("{} end.", "very long opening clause ".repeat(8));
        let formatted = format_response(&long_sentence);
        // A section header may still be assigned; a title must not be.
        assert!(!formatted.starts_with("# "));
    }

    #[test]
    fn chunk_headers_are_chosen_by_keyword() {
        let chunk = "You should implement the rollout in carefully sequenced phases so the team can absorb each change.";
        let formatted = format_response(&format!("# Plan\n\n{}", chunk));
        assert!(formatted.contains("## Implementation Strategy"));
    }

    #[test]
    fn unmatched_chunks_rotate_through_default_headers() {
        let filler = "The agency will refine this direction over the coming weeks with the founding team.";
        let formatted = format_response(&format!("# Plan\n\n{}", filler));
        assert!(formatted.contains("## Strategic Overview"));
    }

    #[test]
    fn numbered_lists_become_bullets() {
        let formatted = format_response("# Plan\n\n1. do this\n2) then this\n* and this");
        assert!(formatted.contains("- do this"));
        assert!(formatted.contains("- then this"));
        assert!(formatted.contains("- and this"));
        assert!(!formatted.contains("1."));
    }

    #[test]
    fn long_responses_get_an_executive_summary() {
        let mut body = String::from("# Growth Plan\n\n## Market Positioning\n\n");
        body.push_str("It is critical to anchor the positioning before scaling spend.\n\n");
        for i in 0..30 {
            body.push_str(&format!("- recommendation number {} with supporting detail\n", i));
        }
        let formatted = format_response(&body);
        assert!(formatted.starts_with("## Executive Summary"));
        assert!(formatted.contains("---"));
        // At most six extracted lines between the summary header and divider.
        let summary = formatted.split("---").next().unwrap();
        assert!(summary.matches("\n- ").count() <= 6);
    }

    #[test]
    fn short_responses_get_no_summary() {
        let formatted = format_response("# Plan\n\n- one note");
        assert!(!formatted.contains("Executive Summary"));
    }

    #[test]
    fn formatting_is_idempotent_on_well_formed_input() {
        let inputs = [
            "# Plan\n\n## Scope\n\n- first\n- second\n\n## Next Steps\n\n- third",
            "Position the brand around trust. Then expand into adjacent segments with care.",
            "# Plan\n\n1. one\n2. two\n\n\n\nclosing note",
        ];
        for input in inputs {
            let once = format_response(input);
            let twice = format_response(&once);
            assert_eq!(once, twice, "input: {:?}", input);
        }
    }

    #[test]
    fn summary_injection_is_idempotent() {
        let mut body = String::from("# Growth Plan\n\n## Market Positioning\n\n");
        for i in 0..40 {
            body.push_str(&format!("- recommendation number {} with supporting detail\n", i));
        }
        let once = format_response(&body);
        let twice = format_response(&once);
        assert_eq!(once, twice);
    }
}
