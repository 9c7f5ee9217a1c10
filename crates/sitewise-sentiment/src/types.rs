use std::collections::BTreeMap;

use serde::Serialize;
use sitewise_core::Review;

/// Compound score at or above which a review counts as positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound score at or below which a review counts as negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    #[must_use]
    pub fn from_compound(compound: f64) -> Self {
        if compound >= POSITIVE_THRESHOLD {
            Self::Positive
        } else if compound <= NEGATIVE_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

/// A review with its lexicon score attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredReview {
    #[serde(flatten)]
    pub review: Review,
    /// Compound score in `[-1.0, 1.0]`.
    pub compound: f64,
    pub label: SentimentLabel,
}

/// Aggregate sentiment over a set of scored reviews.
///
/// Percentages are rounded to one decimal place; all fields are zero for an
/// empty set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SentimentSummary {
    pub total_reviews: usize,
    pub average_compound: f64,
    pub positive_count: usize,
    pub neutral_count: usize,
    pub negative_count: usize,
    pub positive_percentage: f64,
    pub neutral_percentage: f64,
    pub negative_percentage: f64,
}

/// Market-wide and per-business sentiment for one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarketSentiment {
    pub overall: SentimentSummary,
    /// Keyed by business name.
    pub per_business: BTreeMap<String, SentimentSummary>,
    /// Reviews that were long enough to score, in input order.
    pub scored: Vec<ScoredReview>,
    /// Reviews dropped for having too little text.
    pub skipped: usize,
}

/// The strongest reviews on each side for one business.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopReviews {
    /// Most positive first.
    pub most_positive: Vec<ScoredReview>,
    /// Most negative first.
    pub most_negative: Vec<ScoredReview>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_thresholds_are_inclusive() {
        assert_eq!(SentimentLabel::from_compound(0.05), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_compound(-0.05), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_compound(0.049), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_compound(0.0), SentimentLabel::Neutral);
    }

    #[test]
    fn label_serializes_lowercase() {
        let json = serde_json::to_string(&SentimentLabel::Negative).expect("serialize");
        assert_eq!(json, "\"negative\"");
    }
}
