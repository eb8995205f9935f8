//! Keyword retrieval over the program catalog.
//!
//! Scoring: a query is split into significant tokens (normalized, length >= 3,
//! stopwords dropped, deduplicated). Each distinct token that appears as a
//! substring of a record's normalized field scores once per field, weighted
//! `name` 3, `faculty` 2, `description` 1. Zero-score records are dropped,
//! the rest are sorted by score descending with catalog order breaking ties,
//! and the result is truncated to `limit`.

use tracing::debug;

use crate::catalog::Catalog;
use crate::models::MatchResult;

const NAME_WEIGHT: u32 = 3;
const FACULTY_WEIGHT: u32 = 2;
const DESCRIPTION_WEIGHT: u32 = 1;

/// Tokens shorter than this are never significant.
const MIN_TOKEN_LEN: usize = 3;

/// Common query filler that would otherwise match every record description.
const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "you", "your", "can", "what", "when", "where",
    "which", "who", "how", "about", "tell", "does", "this", "that", "with",
    "have", "from", "please", "want", "need", "know", "give", "get", "any",
    "all", "its", "there", "will", "would", "could", "should", "like",
];

/// Rank catalog records by relevance to `query`, returning at most `limit`
/// matches. An empty or all-stopword query yields no matches; so does an
/// empty catalog. Never fails.
pub fn search(query: &str, catalog: &Catalog, limit: usize) -> Vec<MatchResult> {
    let tokens = significant_tokens(query);
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<MatchResult> = catalog
        .programs()
        .iter()
        .filter_map(|record| {
            let name = normalize(&record.name);
            let faculty = normalize(&record.faculty);
            let description = normalize(&record.description);
            let score = tokens
                .iter()
                .map(|token| {
                    let mut s = 0;
                    if name.contains(token.as_str()) {
                        s += NAME_WEIGHT;
                    }
                    if faculty.contains(token.as_str()) {
                        s += FACULTY_WEIGHT;
                    }
                    if description.contains(token.as_str()) {
                        s += DESCRIPTION_WEIGHT;
                    }
                    s
                })
                .sum::<u32>();
            (score > 0).then(|| MatchResult {
                record: record.clone(),
                score,
            })
        })
        .collect();

    // Stable sort: catalog order breaks ties, so output is deterministic.
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches.truncate(limit);

    debug!(
        tokens = tokens.len(),
        matches = matches.len(),
        "retrieval complete"
    );
    matches
}

/// Lowercase and replace every non-alphanumeric character with a space.
/// Comparison only; stored records are never altered.
fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect()
}

/// Distinct normalized query tokens that are long enough and not stopwords.
fn significant_tokens(query: &str) -> Vec<String> {
    let normalized = normalize(query);
    let mut tokens: Vec<String> = Vec::new();
    for token in normalized.split_whitespace() {
        if token.len() < MIN_TOKEN_LEN || STOPWORDS.contains(&token) {
            continue;
        }
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    }
    tokens
}
