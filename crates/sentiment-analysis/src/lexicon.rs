use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "aren't",
    "wasn't", "weren't", "won't", "wouldn't", "couldn't", "shouldn't", "hardly",
    "barely", "neither", "nor", "without",
];

const NEGATION_WINDOW: usize = 3;

/// A negated word keeps half its strength with the sign flipped.
const NEGATION_FACTOR: f64 = -0.5;

const POSITIVE_WORDS: &[(&str, f64)] = &[
    ("bullish", 0.8), ("rally", 0.6), ("rallies", 0.6), ("surge", 0.7), ("surges", 0.7),
    ("soar", 0.8), ("soars", 0.8), ("gain", 0.4), ("gains", 0.4), ("profit", 0.4),
    ("profitable", 0.5), ("growth", 0.4), ("beat", 0.5), ("beats", 0.5), ("upgrade", 0.6),
    ("upgraded", 0.6), ("outperform", 0.6), ("strong", 0.5), ("stronger", 0.5),
    ("positive", 0.5), ("rise", 0.3), ("rises", 0.3), ("increase", 0.3), ("breakthrough", 0.7),
    ("innovation", 0.4), ("innovative", 0.5), ("success", 0.6), ("successful", 0.6),
    ("exceed", 0.5), ("exceeds", 0.5), ("momentum", 0.3), ("optimistic", 0.6), ("record", 0.5),
    ("advance", 0.3), ("dividend", 0.2), ("buyback", 0.3), ("repurchase", 0.2),
    ("accretive", 0.4), ("upside", 0.4), ("recovery", 0.4), ("rebound", 0.4),
    ("expansion", 0.3), ("robust", 0.5), ("accelerating", 0.4), ("overweight", 0.4),
    ("raised", 0.3), ("outpacing", 0.4), ("tailwind", 0.4), ("good", 0.7), ("great", 0.8),
    ("excellent", 1.0), ("best", 1.0), ("win", 0.8), ("wins", 0.8), ("boost", 0.5),
    ("boosts", 0.5), ("improve", 0.4), ("improves", 0.4), ("improved", 0.4),
];

const NEGATIVE_WORDS: &[(&str, f64)] = &[
    ("bearish", -0.8), ("decline", -0.4), ("declines", -0.4), ("loss", -0.5), ("losses", -0.5),
    ("fall", -0.4), ("falls", -0.4), ("plunge", -0.8), ("plunges", -0.8), ("crash", -0.9),
    ("miss", -0.5), ("misses", -0.5), ("downgrade", -0.6), ("downgraded", -0.6),
    ("underperform", -0.6), ("weak", -0.5), ("weaker", -0.5), ("negative", -0.5),
    ("drop", -0.4), ("drops", -0.4), ("decrease", -0.3), ("concern", -0.4), ("concerns", -0.4),
    ("fail", -0.6), ("fails", -0.6), ("failure", -0.7), ("disappoint", -0.6),
    ("disappointing", -0.6), ("slump", -0.6), ("warning", -0.5), ("pessimistic", -0.6),
    ("retreat", -0.3), ("fear", -0.6), ("fears", -0.6), ("trouble", -0.5), ("dilution", -0.4),
    ("dilutive", -0.4), ("headwind", -0.4), ("headwinds", -0.4), ("lawsuit", -0.5),
    ("litigation", -0.4), ("recall", -0.5), ("investigation", -0.5), ("probe", -0.4),
    ("default", -0.7), ("bankruptcy", -1.0), ("restructuring", -0.3), ("layoff", -0.5),
    ("layoffs", -0.5), ("downside", -0.4), ("overvalued", -0.5), ("bubble", -0.5),
    ("underweight", -0.4), ("lowered", -0.3), ("suspended", -0.5), ("bad", -0.7),
    ("worst", -1.0), ("poor", -0.4), ("risky", -0.5), ("slowdown", -0.4), ("cut", -0.3),
    ("cuts", -0.3),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Scores beyond +/-0.1 are directional.
    pub fn from_score(score: f64) -> Self {
        if score > 0.1 {
            SentimentLabel::Positive
        } else if score < -0.1 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        }
    }
}

/// Word-polarity dictionary for financial headlines.
pub struct Lexicon {
    words: HashMap<String, f64>,
    negations: HashSet<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

/// Words of already lower-cased `text`, punctuation stripped.
pub(crate) fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '.' | '!' | '?' | ':' | '"' | '(' | ')'))
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
        .filter(|t| !t.is_empty())
        .collect()
}

impl Lexicon {
    pub fn new() -> Self {
        Self {
            words: POSITIVE_WORDS
                .iter()
                .chain(NEGATIVE_WORDS)
                .map(|(word, value)| (word.to_string(), *value))
                .collect(),
            negations: NEGATION_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Mean polarity of the lexicon words found in `text`, in [-1, 1].
    /// Text without any lexicon word scores 0.
    pub fn polarity(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let tokens = tokenize(&lower);

        let mut total = 0.0;
        let mut matched = 0usize;

        for (i, token) in tokens.iter().enumerate() {
            let Some(&value) = self.words.get(*token) else {
                continue;
            };
            let negated = tokens[i.saturating_sub(NEGATION_WINDOW)..i]
                .iter()
                .any(|t| self.negations.contains(*t));

            total += if negated { value * NEGATION_FACTOR } else { value };
            matched += 1;
        }

        if matched == 0 {
            0.0
        } else {
            (total / matched as f64).clamp(-1.0, 1.0)
        }
    }
}
