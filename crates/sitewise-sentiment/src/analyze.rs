//! Review scoring and aggregation.

use std::collections::BTreeMap;

use sitewise_core::Review;

use crate::scorer::lexicon_score;
use crate::types::{MarketSentiment, ScoredReview, SentimentLabel, SentimentSummary, TopReviews};

/// Reviews with fewer characters of text than this are not scored.
pub const MIN_REVIEW_CHARS: usize = 10;

/// Scores one review; `None` when its text is too short to judge.
#[must_use]
pub fn score_review(review: &Review) -> Option<ScoredReview> {
    if review.text.trim().chars().count() < MIN_REVIEW_CHARS {
        return None;
    }
    let compound = lexicon_score(&review.text);
    Some(ScoredReview {
        review: review.clone(),
        compound,
        label: SentimentLabel::from_compound(compound),
    })
}

/// Scores every review long enough to judge, preserving order.
#[must_use]
pub fn score_reviews(reviews: &[Review]) -> Vec<ScoredReview> {
    reviews.iter().filter_map(score_review).collect()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Averages and label counts over `scored`.
#[must_use]
pub fn aggregate(scored: &[ScoredReview]) -> SentimentSummary {
    if scored.is_empty() {
        return SentimentSummary::default();
    }

    let count = |label| scored.iter().filter(|r| r.label == label).count();
    let positive_count = count(SentimentLabel::Positive);
    let negative_count = count(SentimentLabel::Negative);
    let neutral_count = count(SentimentLabel::Neutral);

    #[allow(clippy::cast_precision_loss)]
    let total = scored.len() as f64;
    #[allow(clippy::cast_precision_loss)]
    let pct = |n: usize| round1(n as f64 / total * 100.0);

    SentimentSummary {
        total_reviews: scored.len(),
        average_compound: scored.iter().map(|r| r.compound).sum::<f64>() / total,
        positive_count,
        neutral_count,
        negative_count,
        positive_percentage: pct(positive_count),
        neutral_percentage: pct(neutral_count),
        negative_percentage: pct(negative_count),
    }
}

/// Scores `reviews` and summarises them market-wide and per business.
#[must_use]
pub fn analyze_market(reviews: &[Review]) -> MarketSentiment {
    let scored = score_reviews(reviews);
    let skipped = reviews.len() - scored.len();

    let mut by_business: BTreeMap<String, Vec<ScoredReview>> = BTreeMap::new();
    for review in &scored {
        by_business
            .entry(review.review.business_name.clone())
            .or_default()
            .push(review.clone());
    }
    let per_business = by_business
        .into_iter()
        .map(|(name, reviews)| (name, aggregate(&reviews)))
        .collect();

    let overall = aggregate(&scored);
    tracing::info!(
        scored = overall.total_reviews,
        skipped,
        average = overall.average_compound,
        "sentiment analysis complete"
    );

    MarketSentiment {
        overall,
        per_business,
        scored,
        skipped,
    }
}

/// Picks up to `n` most positive and `n` most negative reviews of `business`.
///
/// Only positively labelled reviews appear in `most_positive` and only
/// negatively labelled ones in `most_negative`. Ties keep input order.
#[must_use]
pub fn top_reviews(scored: &[ScoredReview], business: &str, n: usize) -> TopReviews {
    let mut positive: Vec<&ScoredReview> = scored
        .iter()
        .filter(|r| r.review.business_name == business && r.label == SentimentLabel::Positive)
        .collect();
    let mut negative: Vec<&ScoredReview> = scored
        .iter()
        .filter(|r| r.review.business_name == business && r.label == SentimentLabel::Negative)
        .collect();

    positive.sort_by(|a, b| b.compound.total_cmp(&a.compound));
    negative.sort_by(|a, b| a.compound.total_cmp(&b.compound));

    TopReviews {
        most_positive: positive.into_iter().take(n).cloned().collect(),
        most_negative: negative.into_iter().take(n).cloned().collect(),
    }
}
