//! Review sentiment for sitewise.
//!
//! Scores competitor reviews with a review-domain lexicon and aggregates the
//! scores per business and across the market.

pub mod analyze;
pub mod scorer;
pub mod types;

pub use analyze::{
    aggregate, analyze_market, score_review, score_reviews, top_reviews, MIN_REVIEW_CHARS,
};
pub use scorer::lexicon_score;
pub use types::{
    MarketSentiment, ScoredReview, SentimentLabel, SentimentSummary, TopReviews,
    NEGATIVE_THRESHOLD, POSITIVE_THRESHOLD,
};
