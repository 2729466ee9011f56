//! Weighted relevance scoring.
//!
//! A record's score is the sum of three independent components:
//!
//! - **Title**: exact match, else phrase match (with a bonus when the title
//!   starts with the term), else an all-words-present bonus for multi-word
//!   terms. Only the first applicable branch counts.
//! - **Content**: non-overlapping occurrences of the term in the plain-text
//!   body, capped.
//! - **Recency**: linear decay from `recency_max` on the day of publication
//!   to zero at `recency_days` old.
//!
//! All comparisons run on normalized, lower-cased text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::normalize::{fold, plain_text, words};
use crate::types::{ContentRecord, ScoredRecord};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// The relevance weight table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Title equals the term.
    pub exact_title_match: f64,
    /// Title contains the term.
    pub title_phrase_match: f64,
    /// Added to `title_phrase_match` when the title starts with the term.
    pub title_start_bonus: f64,
    /// Every word of a multi-word term appears in the title.
    pub all_words_in_title: f64,
    /// Added per word found, alongside `all_words_in_title`.
    pub per_word_in_title: f64,
    /// Per occurrence of the term in the body.
    pub content_per_match: f64,
    /// Cap on the content component.
    pub content_max: f64,
    /// Recency score of a record published right now.
    pub recency_max: f64,
    /// Age in days at which the recency score reaches zero.
    pub recency_days: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            exact_title_match: 1000.0,
            title_phrase_match: 500.0,
            title_start_bonus: 200.0,
            all_words_in_title: 400.0,
            per_word_in_title: 25.0,
            content_per_match: 50.0,
            content_max: 200.0,
            recency_max: 100.0,
            recency_days: 365.0,
        }
    }
}

impl ScoringWeights {
    /// Every weight must be finite and non-negative; `recency_days` must be
    /// strictly positive.
    pub fn validate(&self) -> Result<(), SearchError> {
        let named = [
            ("exact_title_match", self.exact_title_match),
            ("title_phrase_match", self.title_phrase_match),
            ("title_start_bonus", self.title_start_bonus),
            ("all_words_in_title", self.all_words_in_title),
            ("per_word_in_title", self.per_word_in_title),
            ("content_per_match", self.content_per_match),
            ("content_max", self.content_max),
            ("recency_max", self.recency_max),
            ("recency_days", self.recency_days),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(SearchError::Config(format!(
                    "weight {name} must be a finite non-negative number"
                )));
            }
        }
        if self.recency_days == 0.0 {
            return Err(SearchError::Config(
                "weight recency_days must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Title component. Both inputs must already be folded.
pub fn title_score(title: &str, term: &str, weights: &ScoringWeights) -> f64 {
    if term.is_empty() {
        return 0.0;
    }
    if title == term {
        return weights.exact_title_match;
    }
    if let Some(position) = title.find(term) {
        let mut score = weights.title_phrase_match;
        if position == 0 {
            score += weights.title_start_bonus;
        }
        return score;
    }

    let term_words = words(term);
    let found = term_words.iter().filter(|w| title.contains(*w)).count();
    if term_words.len() > 1 && found == term_words.len() {
        weights.all_words_in_title + found as f64 * weights.per_word_in_title
    } else {
        0.0
    }
}

/// Content component. Both inputs must already be folded.
pub fn content_score(body: &str, term: &str, weights: &ScoringWeights) -> f64 {
    if term.is_empty() {
        return 0.0;
    }
    let occurrences = body.matches(term).count();
    (occurrences as f64 * weights.content_per_match).min(weights.content_max)
}

/// Recency component. Records dated in the future count as brand new.
pub fn recency_score(
    published_at: DateTime<Utc>,
    now: DateTime<Utc>,
    weights: &ScoringWeights,
) -> f64 {
    let days_old = ((now - published_at).num_seconds() as f64 / SECONDS_PER_DAY).max(0.0);
    let decay_per_day = weights.recency_max / weights.recency_days;
    (weights.recency_max - days_old * decay_per_day).max(0.0)
}

/// Calculate the relevance score of `record` for `term` at `now`.
///
/// Returns 0 for an empty term; callers skip scoring entirely in that case.
pub fn calculate_score(
    record: &ContentRecord,
    term: &str,
    now: DateTime<Utc>,
    weights: &ScoringWeights,
) -> f64 {
    let term = fold(term.trim());
    if term.is_empty() {
        return 0.0;
    }
    let title = fold(&record.title);
    let body = fold(&plain_text(&record.content));

    title_score(&title, &term, weights)
        + content_score(&body, &term, weights)
        + recency_score(record.published_at, now, weights)
}

/// Annotate every record with its score. An empty term leaves every
/// record unscored.
pub fn score_records(
    records: Vec<ContentRecord>,
    term: &str,
    now: DateTime<Utc>,
    weights: &ScoringWeights,
) -> Vec<ScoredRecord> {
    if term.trim().is_empty() {
        return records.into_iter().map(ScoredRecord::unscored).collect();
    }
    records
        .into_iter()
        .map(|record| {
            let score = calculate_score(&record, term, now, weights);
            ScoredRecord {
                record,
                score: Some(score),
            }
        })
        .collect()
}
