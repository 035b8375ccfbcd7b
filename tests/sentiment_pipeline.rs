//! Integration tests for the sentiment pipeline
//! Scores synthetic article batches end to end and checks the summary

use chrono::Utc;
use sectorpulse::data::NewsArticle;
use sectorpulse::sentiment::{SentimentAnalyzer, Tone};

fn article(title: &str, description: Option<&str>) -> NewsArticle {
    NewsArticle {
        title: title.to_string(),
        description: description.map(String::from),
        url: format!("https://news.example.com/{}", title.replace(' ', "-")),
        source: "Example Wire".to_string(),
        published_at: Utc::now(),
        sentiment: None,
    }
}

#[test]
fn bullish_batch_summarizes_positive() {
    let analyzer = SentimentAnalyzer::new();
    let mut articles = vec![
        article(
            "Energy shares surge on strong earnings beat",
            Some("Producers rally as profits climb to a record"),
        ),
        article("Oil majors extend gains after upgrade", None),
        article("Sector outlook brightens on recovery optimism", None),
    ];

    analyzer.score_all(&mut articles);
    let summary = analyzer.summarize(&articles);

    assert_eq!(summary.article_count, 3);
    assert!(summary.mean_score > 0.3);
    assert_eq!(summary.tone, Tone::Positive);
    assert_eq!(summary.negative, 0);
    for a in &articles {
        let score = a.sentiment.expect("scored");
        assert!((-1.0..=1.0).contains(&score));
    }
}

#[test]
fn bearish_batch_summarizes_negative() {
    let analyzer = SentimentAnalyzer::new();
    let mut articles = vec![
        article(
            "Tech stocks plunge amid recession fears",
            Some("Selloff deepens as losses mount"),
        ),
        article("Chipmakers tumble after downgrade", None),
        article("Layoffs spread across the sector", None),
    ];

    analyzer.score_all(&mut articles);
    let summary = analyzer.summarize(&articles);

    assert!(summary.mean_score < -0.3);
    assert_eq!(summary.tone, Tone::Negative);
    assert_eq!(summary.positive, 0);
}

#[test]
fn mixed_batch_stays_neutral() {
    let analyzer = SentimentAnalyzer::new();
    let mut articles = vec![
        article("Utilities rally on strong demand", None),
        article("Utilities slump on weak demand", None),
        article("Regulator schedules quarterly hearing", None),
    ];

    analyzer.score_all(&mut articles);
    let summary = analyzer.summarize(&articles);

    assert_eq!(summary.article_count, 3);
    assert_eq!(summary.positive, 1);
    assert_eq!(summary.negative, 1);
    assert_eq!(summary.neutral, 1);
    assert_eq!(summary.tone, Tone::Neutral);
}

#[test]
fn empty_batch_is_neutral_with_zero_count() {
    let analyzer = SentimentAnalyzer::new();
    let summary = analyzer.summarize(&[]);

    assert_eq!(summary.article_count, 0);
    assert_eq!(summary.mean_score, 0.0);
    assert_eq!(summary.tone, Tone::Neutral);
}

#[test]
fn description_contributes_to_the_score() {
    let analyzer = SentimentAnalyzer::new();
    let bare = article("Quarterly sector review", None);
    let detailed = article(
        "Quarterly sector review",
        Some("Margins weak, losses widen, outlook negative"),
    );

    assert_eq!(analyzer.score_article(&bare), 0.0);
    assert!(analyzer.score_article(&detailed) < 0.0);
}
