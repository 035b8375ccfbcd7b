//! Lexicon-based sentiment scoring for financial news
//!
//! Scores are count ratios over lexicon hits, so they always land in
//! [-1.0, 1.0]. A small negation window flips hits preceded by "not",
//! "no", etc.

use serde::{Deserialize, Serialize};

use crate::data::NewsArticle;

const POSITIVE_WORDS: &[&str] = &[
    "gain", "gains", "surge", "surges", "rally", "rallies", "jump", "jumps", "rise", "rises",
    "climb", "climbs", "soar", "soars", "bull", "bullish", "strong", "strength", "positive",
    "growth", "profit", "profits", "beat", "beats", "upgrade", "upgraded", "outperform",
    "record", "rebound", "recovery", "optimism",
];

const NEGATIVE_WORDS: &[&str] = &[
    "fall", "falls", "drop", "drops", "crash", "crashes", "decline", "declines", "slump",
    "slumps", "plunge", "plunges", "tumble", "tumbles", "bear", "bearish", "weak", "weakness",
    "negative", "loss", "losses", "miss", "misses", "downgrade", "downgraded", "underperform",
    "concern", "concerns", "fear", "fears", "selloff", "recession", "layoffs",
];

const NEGATORS: &[&str] = &["not", "no", "never", "without", "hardly", "barely"];

/// How many tokens back a negator still flips a lexicon hit
const NEGATION_WINDOW: usize = 2;

/// Per-article classification threshold
const ARTICLE_THRESHOLD: f64 = 0.05;

/// Aggregate tone bands
const TONE_THRESHOLD: f64 = 0.3;

/// Overall tone of a set of articles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Positive => "Positive",
            Tone::Negative => "Negative",
            Tone::Neutral => "Neutral",
        }
    }

    fn from_mean(mean: f64) -> Self {
        if mean > TONE_THRESHOLD {
            Tone::Positive
        } else if mean < -TONE_THRESHOLD {
            Tone::Negative
        } else {
            Tone::Neutral
        }
    }
}

/// Aggregated sentiment over a batch of articles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub article_count: usize,
    pub mean_score: f64,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub tone: Tone,
}

impl SentimentSummary {
    pub fn empty() -> Self {
        Self {
            article_count: 0,
            mean_score: 0.0,
            positive: 0,
            negative: 0,
            neutral: 0,
            tone: Tone::Neutral,
        }
    }
}

#[derive(Debug, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Score a text in [-1.0, 1.0]
    pub fn score_text(&self, text: &str) -> f64 {
        let tokens: Vec<String> = text
            .split(|c: char| !c.is_ascii_alphanumeric() && c != '\'')
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .collect();

        let mut positive = 0i32;
        let mut negative = 0i32;

        for (i, token) in tokens.iter().enumerate() {
            let polarity = if POSITIVE_WORDS.contains(&token.as_str()) {
                1
            } else if NEGATIVE_WORDS.contains(&token.as_str()) {
                -1
            } else {
                continue;
            };

            let negated = tokens[i.saturating_sub(NEGATION_WINDOW)..i]
                .iter()
                .any(|t| NEGATORS.contains(&t.as_str()));

            match if negated { -polarity } else { polarity } {
                1 => positive += 1,
                _ => negative += 1,
            }
        }

        let hits = positive + negative;
        if hits == 0 {
            return 0.0;
        }

        f64::from(positive - negative) / f64::from(hits)
    }

    /// Score an article from its title and description
    pub fn score_article(&self, article: &NewsArticle) -> f64 {
        let text = match &article.description {
            Some(description) => format!("{} {}", article.title, description),
            None => article.title.clone(),
        };
        self.score_text(&text)
    }

    /// Score every article in place
    pub fn score_all(&self, articles: &mut [NewsArticle]) {
        for article in articles.iter_mut() {
            article.sentiment = Some(self.score_article(article));
        }
    }

    /// Aggregate scored articles into a summary
    pub fn summarize(&self, articles: &[NewsArticle]) -> SentimentSummary {
        if articles.is_empty() {
            return SentimentSummary::empty();
        }

        let scores: Vec<f64> = articles
            .iter()
            .map(|a| a.sentiment.unwrap_or_else(|| self.score_article(a)))
            .collect();

        let mean_score = scores.iter().sum::<f64>() / scores.len() as f64;
        let positive = scores.iter().filter(|&&s| s > ARTICLE_THRESHOLD).count();
        let negative = scores.iter().filter(|&&s| s < -ARTICLE_THRESHOLD).count();
        let neutral = scores.len() - positive - negative;

        SentimentSummary {
            article_count: articles.len(),
            mean_score,
            positive,
            negative,
            neutral,
            tone: Tone::from_mean(mean_score),
        }
    }
}
