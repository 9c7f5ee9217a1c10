//! Lexicon scorer for customer reviews of local businesses.
//!
//! Word valences sit on a `-4.0..=4.0` scale. Each hit is adjusted for
//! intensity boosters and negation in the three preceding words, the clause
//! after a "but" outweighs the clause before it, and trailing exclamation
//! marks amplify the total. The sum is normalised into a compound score in
//! `[-1.0, 1.0]`.

/// Review-domain word valences.
///
/// Keys are lowercase single words.
pub(crate) const LEXICON: &[(&str, f64)] = &[
    // Positive signals
    ("good", 1.9),
    ("great", 3.1),
    ("excellent", 2.7),
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("superb", 3.1),
    ("fantastic", 2.6),
    ("wonderful", 2.7),
    ("perfect", 2.7),
    ("love", 3.2),
    ("loved", 2.9),
    ("lovely", 2.8),
    ("best", 3.2),
    ("delicious", 2.7),
    ("tasty", 2.1),
    ("fresh", 1.3),
    ("friendly", 2.2),
    ("nice", 1.8),
    ("clean", 1.7),
    ("cozy", 1.8),
    ("cosy", 1.8),
    ("beautiful", 2.9),
    ("pleasant", 2.3),
    ("comfortable", 1.5),
    ("spacious", 1.2),
    ("helpful", 1.8),
    ("polite", 1.9),
    ("happy", 2.7),
    ("enjoy", 2.2),
    ("enjoyed", 2.3),
    ("recommend", 1.5),
    ("recommended", 1.5),
    ("worth", 0.9),
    ("affordable", 1.2),
    ("reasonable", 1.0),
    ("quick", 1.0),
    ("favourite", 2.0),
    ("favorite", 2.0),
    // Negative signals
    ("bad", -2.5),
    ("poor", -2.1),
    ("terrible", -2.5),
    ("awful", -2.0),
    ("horrible", -2.5),
    ("worst", -3.1),
    ("hate", -2.7),
    ("rude", -2.0),
    ("unfriendly", -2.1),
    ("dirty", -1.9),
    ("unhygienic", -2.3),
    ("stale", -1.5),
    ("bland", -1.3),
    ("tasteless", -1.9),
    ("mediocre", -1.3),
    ("boring", -1.3),
    ("slow", -1.0),
    ("late", -0.8),
    ("noisy", -1.2),
    ("crowded", -0.9),
    ("overpriced", -1.8),
    ("expensive", -0.9),
    ("disappointing", -2.2),
    ("disappointed", -1.9),
    ("waste", -1.8),
    ("wrong", -2.1),
    ("problem", -1.7),
    ("sick", -1.9),
    ("avoid", -1.2),
];

/// Words that add (or, when negative, remove) intensity from the next hit.
const BOOSTERS: &[(&str, f64)] = &[
    ("very", 0.293),
    ("really", 0.293),
    ("extremely", 0.293),
    ("absolutely", 0.293),
    ("highly", 0.293),
    ("super", 0.293),
    ("so", 0.293),
    ("too", 0.293),
    ("quite", 0.15),
    ("slightly", -0.293),
    ("somewhat", -0.293),
    ("kinda", -0.293),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "nothing", "nobody", "none", "neither", "nor", "without", "hardly",
    "barely", "cannot",
];

const NEGATION_SCALAR: f64 = -0.74;
const EXCLAMATION_BOOST: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
const NORMALIZATION_ALPHA: f64 = 15.0;

/// How far back boosters and negations reach.
const LOOKBACK: usize = 3;

fn lexicon_valence(word: &str) -> Option<f64> {
    LEXICON
        .iter()
        .find(|(lex_word, _)| *lex_word == word)
        .map(|&(_, v)| v)
}

fn booster(word: &str) -> Option<f64> {
    BOOSTERS
        .iter()
        .find(|(b, _)| *b == word)
        .map(|&(_, v)| v)
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| {
            word.replace('\u{2019}', "'")
                .trim_matches(|c: char| !c.is_alphabetic())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Score a review using the lexicon.
///
/// Returns a compound score in `[-1.0, 1.0]`; `0.0` for empty text or text
/// with no lexicon words.
#[must_use]
pub fn lexicon_score(text: &str) -> f64 {
    let tokens = tokenize(text);
    let but_at = tokens.iter().rposition(|t| t == "but");

    let mut sum = 0.0_f64;
    let mut hits = 0_usize;

    for (i, token) in tokens.iter().enumerate() {
        let Some(mut valence) = lexicon_valence(token) else {
            continue;
        };

        let window = &tokens[i.saturating_sub(LOOKBACK)..i];
        for (distance, prior) in window.iter().rev().enumerate() {
            if let Some(boost) = booster(prior) {
                // Boosts fade the further they sit from the word.
                #[allow(clippy::cast_precision_loss)]
                let fade = 1.0 - 0.05 * distance as f64;
                let signed = if valence < 0.0 { -boost } else { boost };
                valence += signed * fade;
            }
        }
        if window.iter().any(|w| is_negation(w)) {
            valence *= NEGATION_SCALAR;
        }

        if let Some(b) = but_at {
            valence *= if i < b { 0.5 } else { 1.5 };
        }

        sum += valence;
        hits += 1;
    }

    if hits == 0 {
        return 0.0;
    }

    let exclamations = text.matches('!').count().min(MAX_EXCLAMATIONS);
    #[allow(clippy::cast_precision_loss)]
    let emphasis = exclamations as f64 * EXCLAMATION_BOOST;
    if sum > 0.0 {
        sum += emphasis;
    } else if sum < 0.0 {
        sum -= emphasis;
    }

    (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_returns_zero() {
        assert!(lexicon_score("").abs() < f64::EPSILON);
        assert!(lexicon_score("   ").abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_text_returns_zero() {
        assert!(lexicon_score("we ordered two sandwiches at noon").abs() < f64::EPSILON);
    }

    #[test]
    fn positive_keyword_returns_positive() {
        let score = lexicon_score("The coffee was great");
        // 3.1 / sqrt(3.1^2 + 15)
        assert!((score - 0.6249).abs() < 1e-3, "got {score}");
    }

    #[test]
    fn negative_keyword_returns_negative() {
        let score = lexicon_score("Staff were rude to us");
        assert!(score < -0.05, "expected negative score, got {score}");
    }

    #[test]
    fn negation_flips_polarity() {
        let score = lexicon_score("the food was not good");
        assert!(score < -0.05, "expected negative score, got {score}");
    }

    #[test]
    fn contraction_negates() {
        let score = lexicon_score("Honestly it isn't good at all");
        assert!(score < -0.05, "expected negative score, got {score}");
        let curly = lexicon_score("Honestly it isn\u{2019}t good at all");
        assert!((score - curly).abs() < f64::EPSILON);
    }

    #[test]
    fn negation_reaches_three_words_back() {
        assert!(lexicon_score("never a truly good meal") < 0.0);
        assert!(lexicon_score("never had one single truly good meal") > 0.0);
    }

    #[test]
    fn boosters_intensify() {
        assert!(lexicon_score("very good") > lexicon_score("good"));
        assert!(lexicon_score("very bad") < lexicon_score("bad"));
        assert!(lexicon_score("slightly good") < lexicon_score("good"));
    }

    #[test]
    fn clause_after_but_dominates() {
        let score = lexicon_score("food is good but service is slow");
        // 1.9 * 0.5 - 1.0 * 1.5 = -0.55
        assert!(score < -0.05, "expected negative score, got {score}");
    }

    #[test]
    fn exclamations_amplify() {
        assert!(lexicon_score("great!!!") > lexicon_score("great"));
        assert!(lexicon_score("terrible!!") < lexicon_score("terrible"));
    }

    #[test]
    fn exclamations_alone_are_neutral() {
        assert!(lexicon_score("we went on sunday!!!").abs() < f64::EPSILON);
    }

    #[test]
    fn score_stays_within_unit_range() {
        let text = "great excellent best love amazing awesome superb perfect delicious!!!!!!";
        let score = lexicon_score(text);
        assert!(score > 0.95 && score <= 1.0, "got {score}");

        let text = "worst terrible horrible awful rude dirty stale bland overpriced!!!!";
        let score = lexicon_score(text);
        assert!((-1.0..-0.95).contains(&score), "got {score}");
    }

    #[test]
    fn punctuation_stripped_from_words() {
        assert!(lexicon_score("\"Delicious,\" she said.") > 0.0);
    }
}
