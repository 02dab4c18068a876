//! Headline sentiment scoring.
//!
//! A small embedded lexicon maps words to `[polarity, subjectivity]` pairs;
//! a title's score is the average over every lexicon hit, with a negation
//! window that flips polarity. Values stay in `[-1, 1]` and `[0, 1]`. A run
//! scores every title of every source, so this path stays allocation-light.

use std::collections::HashMap;

use once_cell::sync::Lazy;

static LEXICON: Lazy<HashMap<String, [f64; 2]>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, [f64; 2]>>(raw).expect("valid sentiment lexicon")
});

/// TextBlob-style feature pair attached to every story.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sentiment {
    /// Tone, `-1.0` (negative) to `1.0` (positive).
    pub polarity: f64,
    /// Opinionatedness, `0.0` (factual) to `1.0` (subjective).
    pub subjectivity: f64,
}

impl Sentiment {
    pub const NEUTRAL: Sentiment = Sentiment {
        polarity: 0.0,
        subjectivity: 0.0,
    };
}

/// Scoring seam. Production uses [`LexiconModel`]; tests plug in fixtures.
pub trait SentimentModel: Send + Sync {
    fn score(&self, text: &str) -> Sentiment;
}

#[derive(Debug, Clone, Default)]
pub struct LexiconModel;

impl LexiconModel {
    pub fn new() -> Self {
        Self
    }
}

impl SentimentModel for LexiconModel {
    /// Average of lexicon hits. No hits scores [`Sentiment::NEUTRAL`].
    ///
    /// Negation: a negator within the previous 1..=3 tokens flips the sign of
    /// that word's polarity. Subjectivity is unaffected, a negated opinion is
    /// still an opinion.
    fn score(&self, text: &str) -> Sentiment {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut polarity_sum = 0.0;
        let mut subjectivity_sum = 0.0;
        let mut hits = 0usize;

        for i in 0..tokens.len() {
            if let Some(&[polarity, subjectivity]) = LEXICON.get(tokens[i].as_str()) {
                let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
                polarity_sum += if negated { -polarity } else { polarity };
                subjectivity_sum += subjectivity;
                hits += 1;
            }
        }

        if hits == 0 {
            return Sentiment::NEUTRAL;
        }
        let n = hits as f64;
        Sentiment {
            polarity: (polarity_sum / n).clamp(-1.0, 1.0),
            subjectivity: (subjectivity_sum / n).clamp(0.0, 1.0),
        }
    }
}

/// Alphanumeric tokens, lower-cased. Contractions split ("isn't" -> isn, t),
/// which is why the negator list sticks to whole words.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not" | "no" | "never" | "none" | "nor" | "cannot" | "without" | "hardly" | "barely"
    )
}
