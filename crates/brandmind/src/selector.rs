//! Keyword-frequency provider selection. Deliberately plain data tables
//! scored by a pure function; ties and keyword-free queries go to the
//! creative default.

use crate::providers::base::ProviderKind;

/// Terms that mark a query as creative/strategic work.
pub const CREATIVE_KEYWORDS: &[&str] = &[
    "strategy",
    "strategic",
    "brainstorm",
    "creative",
    "positioning",
    "vision",
    "story",
    "identity",
    "naming",
    "campaign",
    "tagline",
];

/// Terms that mark a query as analytical/factual work.
pub const ANALYTICAL_KEYWORDS: &[&str] = &[
    "data",
    "statistics",
    "benchmark",
    "metric",
    "measure",
    "conversion",
    "percentage",
    "survey",
    "report",
    "compare",
    "numbers",
];

fn keyword_frequency(query: &str, keywords: &[&str]) -> usize {
    keywords.iter().map(|kw| query.matches(kw).count()).sum()
}

/// Pick the provider to try first. The analytical provider wins only when
/// its match count strictly exceeds the creative count.
pub fn select_provider(query: &str) -> ProviderKind {
    select_provider_with_default(query, ProviderKind::OpenAi)
}

/// Same heuristic with a configurable creative-default arm.
pub fn select_provider_with_default(query: &str, default: ProviderKind) -> ProviderKind {
    let query = query.to_lowercase();
    let creative = keyword_frequency(&query, CREATIVE_KEYWORDS);
    let analytical = keyword_frequency(&query, ANALYTICAL_KEYWORDS);

    if analytical > creative {
        ProviderKind::Google
    } else {
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("show me conversion data and benchmark statistics", ProviderKind::Google; "analytical keywords only")]
    #[test_case("brainstorm a naming strategy and brand story", ProviderKind::OpenAi; "creative keywords only")]
    #[test_case("what should I do next?", ProviderKind::OpenAi; "no keywords defaults to creative")]
    #[test_case("benchmark our positioning", ProviderKind::OpenAi; "tie goes to creative")]
    fn selection(query: &str, expected: ProviderKind) {
        assert_eq!(select_provider(query), expected);
    }

    #[test]
    fn selection_is_deterministic() {
        let query = "Compare survey data against industry benchmarks";
        assert_eq!(select_provider(query), select_provider(query));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(
            select_provider("SHOW ME THE DATA AND STATISTICS"),
            ProviderKind::Google
        );
    }

    #[test]
    fn configured_default_takes_the_creative_arm() {
        assert_eq!(
            select_provider_with_default("hello", ProviderKind::Google),
            ProviderKind::Google
        );
    }
}
