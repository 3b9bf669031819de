//! Keyword frequency analysis over the corpus text buffer.

use std::collections::HashMap;

use tracing::{debug, instrument};

use slidepipe_shared::{Keyword, KeywordProfile, PlanningConfig};

/// Tokenizer and ranking settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordOptions {
    /// Shortest cleaned token (in characters) that is counted.
    pub min_length: usize,
    /// Number of ranked keywords retained.
    pub top_n: usize,
}

impl Default for KeywordOptions {
    fn default() -> Self {
        Self {
            min_length: 4,
            top_n: 20,
        }
    }
}

impl From<&PlanningConfig> for KeywordOptions {
    fn from(config: &PlanningConfig) -> Self {
        Self {
            min_length: config.keyword_min_length,
            top_n: config.keyword_top_n,
        }
    }
}

/// Rank cleaned whitespace tokens by frequency.
///
/// Each token is stripped of non-alphanumeric characters and lowercased.
/// Equal counts keep first-seen order.
#[instrument(skip_all, fields(text_len = text.len()))]
pub fn analyze(text: &str, opts: &KeywordOptions) -> KeywordProfile {
    let mut ranked: Vec<Keyword> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for raw in text.split_whitespace() {
        let token = clean_token(raw);
        if token.chars().count() < opts.min_length {
            continue;
        }
        match index.get(&token) {
            Some(&i) => ranked[i].count += 1,
            None => {
                index.insert(token.clone(), ranked.len());
                ranked.push(Keyword { token, count: 1 });
            }
        }
    }

    let distinct = ranked.len();

    // `sort_by` is stable: ties stay in first-seen order.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(opts.top_n);

    debug!(distinct, kept = ranked.len(), "keyword profile built");

    KeywordProfile(ranked)
}

fn clean_token(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
