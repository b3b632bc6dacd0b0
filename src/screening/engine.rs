use indexmap::IndexMap;
use serde::Serialize;

use super::rubric::Rubric;

/// Keyword hits in one category that earn its full weight
const MATCHES_FOR_FULL_SCORE: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub label: String,
    /// Weighted score earned, 0..=max
    pub score: f64,
    /// The category weight
    pub max: f64,
    /// Keywords found, in rubric order
    pub matched: Vec<String>,
    pub match_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub total_score: f64,
    pub max_possible: f64,
    /// Percentage of `max_possible`, one decimal place
    pub pct: f64,
    /// One entry per rubric category, in rubric order
    pub categories: IndexMap<String, CategoryScore>,
}

impl ScoreResult {
    /// First `per_category` matches of each category, capped at `total`
    pub fn top_matches(&self, per_category: usize, total: usize) -> Vec<&str> {
        self.categories
            .values()
            .flat_map(|c| c.matched.iter().take(per_category))
            .take(total)
            .map(String::as_str)
            .collect()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Score `text` against `rubric`.
///
/// Each category earns `min(matches / 3, 1) * weight`, where a match is a
/// distinct keyword found as a case-insensitive substring. Pure: the same
/// text and rubric always give the same result.
pub fn score_candidate(text: &str, rubric: &Rubric) -> ScoreResult {
    let text = text.to_lowercase();

    let mut categories = IndexMap::with_capacity(rubric.len());
    let mut total = 0.0;
    let mut max_possible = 0.0;

    for criterion in rubric {
        // Keywords are already lowercase in the rubric
        let matched: Vec<String> = criterion
            .keywords
            .iter()
            .filter(|kw| text.contains(**kw))
            .map(|kw| kw.to_string())
            .collect();

        let raw = (matched.len() as f64 / MATCHES_FOR_FULL_SCORE).min(1.0);
        let score = round2(raw * criterion.weight);

        total += score;
        max_possible += criterion.weight;

        categories.insert(
            criterion.key.to_string(),
            CategoryScore {
                label: criterion.label.to_string(),
                score,
                max: criterion.weight,
                match_count: matched.len(),
                matched,
            },
        );
    }

    let pct = if max_possible > 0.0 {
        ((total / max_possible * 1000.0).round() / 10.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    ScoreResult {
        total_score: round2(total),
        max_possible: round2(max_possible),
        pct,
        categories,
    }
}
