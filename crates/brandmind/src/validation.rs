//! Response quality scoring against a fixed rubric. Pure string analysis;
//! no I/O.
//!
//! Casual tone is the one hard failure: a single casual-language match sets
//! `is_valid` to false. The depth and structure checks only subtract from
//! the numeric score, which a later pass can recover.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum characters before a response stops being flagged as too brief.
pub const MIN_RESPONSE_LENGTH: usize = 800;

/// Content-score penalty per flagged issue.
const ISSUE_PENALTY: u32 = 20;

pub const PROFESSIONAL_TERMS: &[&str] = &[
    "analysis",
    "strategy",
    "framework",
    "metrics",
    "roi",
    "methodology",
    "benchmarks",
    "implementation",
];

pub const ACTIONABLE_VERBS: &[&str] = &[
    "implement",
    "execute",
    "create",
    "develop",
    "establish",
    "build",
];

static CASUAL_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)^\s*(hey|hi|hello|howdy)\b", "greeting opener"),
        (
            r"(?i)\b(awesome|amazing|super cool|love it|thrilled)\b",
            "enthusiasm marker",
        ),
        (r"[\x{1F300}-\x{1FAFF}\x{2600}-\x{27BF}]", "emoji"),
        (r"!{2,}", "repeated exclamation marks"),
        (
            r"(?i)\b(anyway|by the way|you know|kind of|sort of)\b",
            "filler transition",
        ),
    ]
    .into_iter()
    .map(|(pattern, label)| (Regex::new(pattern).expect("casual pattern"), label))
    .collect()
});

static TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#\s+\S").expect("title pattern"));
static SECTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^##\s+\S").expect("section pattern"));
static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*[-*•]\s+\S").expect("bullet pattern"));
static BLANK_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n[ \t]*\n[ \t]*\n").expect("blank run pattern"));
static EXEC_SUMMARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^#{1,3}\s.*executive summary").expect("summary pattern"));

/// Ephemeral quality verdict for one piece of generated text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// 0–100, weighted 70% content / 30% formatting.
    pub score: u8,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

pub fn validate(text: &str) -> ValidationResult {
    let mut issues = Vec::new();
    let mut suggestions = Vec::new();
    let lowered = text.to_lowercase();

    let mut casual_matched = false;
    for (pattern, label) in CASUAL_PATTERNS.iter() {
        if pattern.is_match(text) {
            casual_matched = true;
            issues.push(format!("Casual language detected: {}", label));
            suggestions
                .push("Rewrite in a formal consulting register without conversational tone".into());
        }
    }

    let distinct_terms = PROFESSIONAL_TERMS
        .iter()
        .filter(|term| lowered.contains(*term))
        .count();
    if distinct_terms < 3 {
        issues.push(format!(
            "Only {} professional consulting terms present (need 3)",
            distinct_terms
        ));
        suggestions.push(
            "Anchor the advice in named frameworks, metrics, benchmarks or methodology".into(),
        );
    }

    if text.len() < MIN_RESPONSE_LENGTH {
        issues.push("Response too brief for professional consultation".into());
        suggestions.push("Expand each recommendation with rationale and expected outcomes".into());
    }

    let actionable_hits: usize = ACTIONABLE_VERBS
        .iter()
        .map(|verb| lowered.matches(verb).count())
        .sum();
    if actionable_hits < 2 {
        issues.push("Insufficient actionable recommendations".into());
        suggestions
            .push("Close each section with concrete steps the client can implement".into());
    }

    let content_score = 100u32.saturating_sub(ISSUE_PENALTY * issues.len() as u32);
    let formatting_score = formatting_score(text);
    let score = (0.7 * content_score as f64 + 0.3 * formatting_score as f64).round() as u8;

    ValidationResult {
        is_valid: !casual_matched,
        score,
        issues,
        suggestions,
    }
}

/// Structural sub-score out of 100, fixed penalties per missing element.
fn formatting_score(text: &str) -> u32 {
    let mut score: i32 = 100;

    if !TITLE_RE.is_match(text) {
        score -= 20;
    }
    if !SECTION_RE.is_match(text) {
        score -= 25;
    }
    if !BULLET_RE.is_match(text) {
        score -= 15;
    }
    if BLANK_RUN_RE.is_match(text) {
        score -= 10;
    }
    if text.len() > 1000 && !EXEC_SUMMARY_RE.is_match(text) {
        score -= 10;
    }

    score.max(0) as u32
}
