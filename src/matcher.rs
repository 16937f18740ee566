//! Keyword-based theme detection for dream descriptions.
//!
//! Every catalog keyword is matched as a whole word (or whole phrase) against the
//! lower-cased text. A theme's score is the total number of keyword hits, and its
//! confidence is length-normalised:
//!
//! ```text
//! confidence = min(score / max(word_count * 0.1, 1) * 100, 100)
//! ```
//!
//! so a short dream with one hit is already a strong signal, while a long dream needs
//! proportionally more hits before it saturates at 100%.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::catalog::{THEMES, Theme};

/// Fraction of the dream's word count that one keyword hit is weighed against.
const WORDS_PER_HIT: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeMatch {
    pub theme: &'static str,
    /// Total keyword occurrences for the theme
    pub score: usize,
    /// Percentage in `[0, 100]`
    pub confidence: f64,
    /// Every keyword hit, repeats included
    pub matched_keywords: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interpretation {
    pub theme: &'static str,
    pub confidence: f64,
    pub interpretation: &'static str,
    pub tips: &'static [&'static str],
    pub keywords_found: Vec<&'static str>,
}

struct CompiledTheme {
    theme: &'static Theme,
    patterns: Vec<(&'static str, Regex)>,
}

// Compile-once keyword patterns.
fn compiled_themes() -> &'static [CompiledTheme] {
    static COMPILED: OnceLock<Vec<CompiledTheme>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        THEMES
            .iter()
            .map(|theme| CompiledTheme {
                theme,
                patterns: theme
                    .keywords
                    .iter()
                    .map(|keyword| {
                        let pattern = format!(r"\b{}\b", regex::escape(keyword));
                        let re = Regex::new(&pattern).expect("escaped keyword is a valid pattern");
                        (*keyword, re)
                    })
                    .collect(),
            })
            .collect()
    })
}

/// Detects catalog themes in `text`, strongest first.
///
/// Themes without a single hit are left out, so text with no catalog keywords (or empty
/// text) yields an empty list. Equal scores keep catalog order.
pub fn analyze(text: &str) -> Vec<ThemeMatch> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let lowered = text.to_lowercase();
    let word_count = text.split_whitespace().count();

    let mut matches: Vec<ThemeMatch> = compiled_themes()
        .iter()
        .filter_map(|compiled| {
            let mut matched_keywords = Vec::new();
            for (keyword, re) in &compiled.patterns {
                let hits = re.find_iter(&lowered).count();
                matched_keywords.extend(std::iter::repeat_n(*keyword, hits));
            }

            let score = matched_keywords.len();
            (score > 0).then(|| ThemeMatch {
                theme: compiled.theme.name,
                score,
                confidence: confidence(score, word_count),
                matched_keywords,
            })
        })
        .collect();

    // Stable: ties stay in catalog order. Confidence is monotonic in score for a
    // fixed text, so this is also the confidence order.
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches
}

/// Length-normalised confidence, clamped to `[0, 100]`.
pub fn confidence(score: usize, word_count: usize) -> f64 {
    let denominator = (word_count as f64 * WORDS_PER_HIT).max(1.0);
    (score as f64 / denominator * 100.0).clamp(0.0, 100.0)
}

/// Names of the `n` strongest themes in `text`.
pub fn top_themes(text: &str, n: usize) -> Vec<&'static str> {
    analyze(text).into_iter().take(n).map(|m| m.theme).collect()
}

/// Attaches catalog interpretation and tips to each match.
pub fn interpret(matches: &[ThemeMatch]) -> Vec<Interpretation> {
    matches
        .iter()
        .filter_map(|m| {
            let theme = crate::catalog::find(m.theme)?;
            Some(Interpretation {
                theme: theme.name,
                confidence: m.confidence,
                interpretation: theme.interpretation,
                tips: theme.tips,
                keywords_found: m.matched_keywords.clone(),
            })
        })
        .collect()
}
