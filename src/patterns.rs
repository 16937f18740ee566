//! Cross-night aggregation of detected dream themes.
//!
//! Only entries with the dream flag set *and* a non-empty description take part here.
//! That denominator ("dream nights analysed") differs on purpose from the dream
//! frequency in [`crate::stats`], which counts every night with the dream flag.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, Local, NaiveDate};
use itertools::Itertools;
use serde::Serialize;

use crate::catalog;
use crate::error::{JournalError, Result};
use crate::matcher;
use crate::models::{DATE_FORMAT, SleepEntry};

/// A theme counts as recurring when it shows up in at least this share of dream nights.
pub const RECURRING_FRACTION: f64 = 0.2;
/// Themes per night that feed frequency counts and emotion correlation.
pub const THEMES_PER_ENTRY: usize = 2;
pub const MOST_COMMON_LIMIT: usize = 5;
/// Minimum associations before an emotion gets a most-common-theme verdict.
pub const MIN_EMOTION_ASSOCIATIONS: usize = 2;

/// Which nights to aggregate over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Window {
    All,
    /// Entries dated on or after `today - n` days
    LastDays(u32),
    /// Entries dated on or after the cutoff (`YYYY-MM-DD`)
    Since(String),
}

impl Window {
    /// Validated `Since` window.
    pub fn since(cutoff: &str) -> Result<Self> {
        NaiveDate::parse_from_str(cutoff, DATE_FORMAT)
            .map_err(|_| JournalError::InvalidDate(cutoff.to_string()))?;
        Ok(Self::Since(cutoff.to_string()))
    }

    fn cutoff(&self, today: NaiveDate) -> Option<String> {
        match self {
            Self::All => None,
            Self::LastDays(days) => {
                Some((today - Duration::days(i64::from(*days))).format(DATE_FORMAT).to_string())
            }
            Self::Since(cutoff) => Some(cutoff.clone()),
        }
    }

    // ISO dates order correctly as strings.
    fn contains(cutoff: Option<&str>, date: &str) -> bool {
        cutoff.is_none_or(|c| date >= c)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeCount {
    pub theme: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecurringTheme {
    pub theme: &'static str,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionCorrelation {
    pub most_common_theme: &'static str,
    pub frequency: usize,
    pub total_occurrences: usize,
}

/// Aggregate view of the themes across a set of dream nights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DreamPatterns {
    pub total_dream_nights: usize,
    pub most_common_themes: Vec<ThemeCount>,
    pub recurring_themes: Vec<RecurringTheme>,
    pub dreams_by_date: BTreeMap<String, Vec<&'static str>>,
    pub emotion_correlation: BTreeMap<String, EmotionCorrelation>,
    pub analysis_period: String,
}

impl DreamPatterns {
    pub fn share_of_nights(&self, count: usize) -> f64 {
        if self.total_dream_nights == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total_dream_nights as f64
        }
    }
}

/// Counter that remembers first-seen order so equal counts sort deterministically.
#[derive(Default)]
struct OrderedCounter<K> {
    order: Vec<K>,
    counts: HashMap<K, usize>,
}

impl<K: std::hash::Hash + Eq + Clone> OrderedCounter<K> {
    fn add(&mut self, key: K) {
        let count = self.counts.entry(key.clone()).or_insert(0);
        if *count == 0 {
            self.order.push(key);
        }
        *count += 1;
    }

    fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// In first-seen order.
    fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.order.iter().map(|k| (k, self.counts[k]))
    }

    /// Descending by count, ties in first-seen order.
    fn most_common(&self) -> Vec<(&K, usize)> {
        self.iter().sorted_by(|a, b| b.1.cmp(&a.1)).collect()
    }
}

/// Aggregates themes over `entries` using the local date for relative windows.
pub fn analyze(entries: &[SleepEntry], window: &Window) -> Option<DreamPatterns> {
    analyze_as_of(entries, window, Local::now().date_naive())
}

/// Aggregates themes over `entries`, resolving relative windows against `today`.
///
/// Returns `None` when no entry in the window has dream text.
pub fn analyze_as_of(
    entries: &[SleepEntry],
    window: &Window,
    today: NaiveDate,
) -> Option<DreamPatterns> {
    let cutoff = window.cutoff(today);
    let dream_entries: Vec<&SleepEntry> = entries
        .iter()
        .filter(|e| e.has_dream_text() && Window::contains(cutoff.as_deref(), &e.date))
        .collect();

    let (first, last) = (dream_entries.first()?, dream_entries.last()?);

    let mut theme_counter = OrderedCounter::default();
    let mut dreams_by_date = BTreeMap::new();
    let mut emotion_themes: HashMap<String, OrderedCounter<&'static str>> = HashMap::new();

    for entry in &dream_entries {
        let themes: Vec<&'static str> = matcher::analyze(&entry.dream_content)
            .into_iter()
            .map(|m| m.theme)
            .collect();
        let top = &themes[..themes.len().min(THEMES_PER_ENTRY)];

        for theme in top {
            theme_counter.add(*theme);
        }
        for emotion in normalized_emotions(entry) {
            let counter = emotion_themes.entry(emotion).or_default();
            for theme in top {
                counter.add(*theme);
            }
        }
        dreams_by_date.insert(entry.date.clone(), themes);
    }

    let total = dream_entries.len();
    let most_common_themes = theme_counter
        .most_common()
        .into_iter()
        .take(MOST_COMMON_LIMIT)
        .map(|(theme, count)| ThemeCount { theme: *theme, count })
        .collect();

    let recurring_themes = theme_counter
        .iter()
        .filter(|(_, count)| *count as f64 / total as f64 >= RECURRING_FRACTION)
        .map(|(theme, count)| RecurringTheme {
            theme: *theme,
            count,
            percentage: count as f64 * 100.0 / total as f64,
        })
        .collect();

    let analysis_period = match window {
        Window::All => format!("{} to {}", first.date, last.date),
        Window::LastDays(days) => format!("Last {days} days"),
        Window::Since(cutoff) => format!("Since {cutoff}"),
    };

    Some(DreamPatterns {
        total_dream_nights: total,
        most_common_themes,
        recurring_themes,
        dreams_by_date,
        emotion_correlation: correlate_emotions(&emotion_themes),
        analysis_period,
    })
}

/// Emotion -> most frequent associated theme.
///
/// An emotion needs at least [`MIN_EMOTION_ASSOCIATIONS`] associations in total and its
/// leading theme must itself reach that count; an emotion spread one-per-theme across
/// several themes has no single most common theme and is left out.
fn correlate_emotions(
    emotion_themes: &HashMap<String, OrderedCounter<&'static str>>,
) -> BTreeMap<String, EmotionCorrelation> {
    emotion_themes
        .iter()
        .filter_map(|(emotion, counter)| {
            let total_occurrences = counter.total();
            if total_occurrences < MIN_EMOTION_ASSOCIATIONS {
                return None;
            }
            let (theme, frequency) = counter.most_common().into_iter().next()?;
            (frequency >= MIN_EMOTION_ASSOCIATIONS).then(|| {
                (
                    emotion.clone(),
                    EmotionCorrelation {
                        most_common_theme: *theme,
                        frequency,
                        total_occurrences,
                    },
                )
            })
        })
        .collect()
}

fn normalized_emotions(entry: &SleepEntry) -> impl Iterator<Item = String> + '_ {
    entry
        .dream_emotions
        .iter()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeRecommendation {
    pub theme: &'static str,
    pub frequency: usize,
    pub recommendation: String,
    pub insight: &'static str,
}

/// Advice for the three most common themes.
pub fn theme_recommendations(patterns: &DreamPatterns) -> Vec<ThemeRecommendation> {
    patterns
        .most_common_themes
        .iter()
        .take(3)
        .filter_map(|tc| {
            let theme = catalog::find(tc.theme)?;
            let tip = theme.tips.first()?;
            Some(ThemeRecommendation {
                theme: theme.name,
                frequency: tc.count,
                recommendation: format!(
                    "Since '{}' appears frequently in your dreams, {}",
                    theme.name,
                    tip.to_lowercase()
                ),
                insight: theme.interpretation,
            })
        })
        .collect()
}

/// Dream nights whose detected themes include `theme` (matched case-insensitively).
pub fn search_by_theme<'a>(entries: &'a [SleepEntry], theme: &str) -> Result<Vec<&'a SleepEntry>> {
    let theme = catalog::find(theme).ok_or_else(|| JournalError::UnknownTheme(theme.to_string()))?;
    Ok(entries
        .iter()
        .filter(|e| e.has_dream_text())
        .filter(|e| matcher::analyze(&e.dream_content).iter().any(|m| m.theme == theme.name))
        .collect())
}

/// Dream nights tagged with `emotion`, case-insensitively.
pub fn with_emotion<'a>(
    entries: &'a [SleepEntry],
    emotion: &str,
) -> impl Iterator<Item = &'a SleepEntry> + use<'a> {
    let target = emotion.trim().to_lowercase();
    entries
        .iter()
        .filter(|e| e.had_dreams)
        .filter(move |e| normalized_emotions(e).any(|em| em == target))
}

/// Criteria for narrowing down dream nights. Unset criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct DreamFilter {
    pub min_quality: Option<u8>,
    /// Any of these emotions, case-insensitive
    pub emotions: Vec<String>,
    /// Any of these substrings in the description, case-insensitive
    pub keywords: Vec<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl DreamFilter {
    pub fn matches(&self, entry: &SleepEntry) -> bool {
        if !entry.had_dreams {
            return false;
        }
        if self.min_quality.is_some_and(|min| entry.sleep_quality < min) {
            return false;
        }
        if self.from_date.as_deref().is_some_and(|from| entry.date.as_str() < from) {
            return false;
        }
        if self.to_date.as_deref().is_some_and(|to| entry.date.as_str() > to) {
            return false;
        }
        if !self.emotions.is_empty() {
            let wanted: Vec<String> = self.emotions.iter().map(|e| e.trim().to_lowercase()).collect();
            if !normalized_emotions(entry).any(|em| wanted.contains(&em)) {
                return false;
            }
        }
        if !self.keywords.is_empty() {
            let content = entry.dream_content.to_lowercase();
            if !self.keywords.iter().any(|k| content.contains(&k.to_lowercase())) {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, entries: &'a [SleepEntry]) -> Vec<&'a SleepEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}

/// Overlapping runs of `size` consecutive dream nights, oldest first.
pub fn sliding_windows(entries: &[SleepEntry], size: usize) -> Result<Vec<Vec<&SleepEntry>>> {
    if size == 0 {
        return Err(JournalError::InvalidArgument("window size must be at least 1".into()));
    }
    let dream_entries: Vec<&SleepEntry> = entries.iter().filter(|e| e.had_dreams).collect();
    Ok(dream_entries.windows(size).map(<[_]>::to_vec).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dream(date: &str, content: &str, emotions: &[&str], quality: u8) -> SleepEntry {
        SleepEntry::new(date, "23:00", "07:00", quality).with_dream(content, emotions.iter().copied())
    }

    fn scenario() -> Vec<SleepEntry> {
        vec![
            dream(
                "2024-01-15",
                "I was flying over beautiful mountains and felt so peaceful and free",
                &["peaceful", "happy", "excited"],
                8,
            ),
            dream(
                "2024-01-17",
                "I was swimming in clear blue water with dolphins",
                &["peaceful", "joyful"],
                7,
            ),
        ]
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
    }

    #[test]
    fn test_scenario_aggregate() {
        let patterns = analyze_as_of(&scenario(), &Window::All, today()).unwrap();
        assert_eq!(patterns.total_dream_nights, 2);
        assert_eq!(patterns.dreams_by_date["2024-01-15"], vec!["Flying"]);
        assert_eq!(patterns.dreams_by_date["2024-01-17"], vec!["Water"]);
        assert_eq!(patterns.analysis_period, "2024-01-15 to 2024-01-17");
        // peaceful is split one-per-theme: no single most common theme
        assert!(!patterns.emotion_correlation.contains_key("peaceful"));
        assert!(patterns.emotion_correlation.is_empty());
    }

    #[test]
    fn test_no_qualifying_entries() {
        assert!(analyze_as_of(&[], &Window::All, today()).is_none());
        let entries = vec![
            SleepEntry::new("2024-01-01", "23:00", "07:00", 5),
            SleepEntry::new("2024-01-02", "23:00", "07:00", 5).with_dream("", ["odd"]),
        ];
        assert!(analyze_as_of(&entries, &Window::All, today()).is_none());
    }

    #[test]
    fn test_entries_without_matches_still_count_as_nights() {
        let entries = vec![
            dream("2024-01-01", "flying high", &[], 7),
            dream("2024-01-02", "nothing recognisable", &[], 7),
        ];
        let patterns = analyze_as_of(&entries, &Window::All, today()).unwrap();
        assert_eq!(patterns.total_dream_nights, 2);
        assert!(patterns.dreams_by_date["2024-01-02"].is_empty());
        assert_eq!(patterns.recurring_themes[0].percentage, 50.0);
    }

    #[test]
    fn test_most_common_ties_keep_first_seen_order() {
        let entries = vec![
            dream("2024-01-01", "a fire", &[], 7),
            dream("2024-01-02", "the sea", &[], 7),
            dream("2024-01-03", "the ocean", &[], 7),
            dream("2024-01-04", "fire again", &[], 7),
            dream("2024-01-05", "a dog", &[], 7),
        ];
        let patterns = analyze_as_of(&entries, &Window::All, today()).unwrap();
        let order: Vec<_> = patterns.most_common_themes.iter().map(|t| (t.theme, t.count)).collect();
        assert_eq!(order, vec![("Fire", 2), ("Water", 2), ("Animals", 1)]);
    }

    #[test]
    fn test_recurring_threshold() {
        // Ten nights: Water in 5, Fire in 2, Animals in 1
        let mut entries = Vec::new();
        for day in 1..=10 {
            let content = match day {
                1..=5 => "deep water",
                6 | 7 => "a fire",
                8 => "a dog",
                _ => "plain night",
            };
            entries.push(dream(&format!("2024-02-{day:02}"), content, &[], 6));
        }
        let patterns = analyze_as_of(&entries, &Window::All, today()).unwrap();
        let recurring: Vec<_> = patterns.recurring_themes.iter().map(|r| r.theme).collect();
        assert_eq!(recurring, vec!["Water", "Fire"]);
        for r in &patterns.recurring_themes {
            assert!(r.count as f64 / patterns.total_dream_nights as f64 >= RECURRING_FRACTION);
        }
        assert_eq!(patterns.recurring_themes[1].percentage, 20.0);
    }

    #[test]
    fn test_emotion_correlation_reports_dominant_theme() {
        let entries = vec![
            dream("2024-01-01", "running from a wolf", &["Scared"], 4),
            dream("2024-01-02", "escape through the maze", &[" scared "], 4),
            dream("2024-01-03", "fire", &["calm"], 7),
        ];
        let patterns = analyze_as_of(&entries, &Window::All, today()).unwrap();
        let scared = &patterns.emotion_correlation["scared"];
        assert_eq!(scared.most_common_theme, "Chase");
        assert_eq!(scared.frequency, 2);
        assert_eq!(scared.total_occurrences, 4);
        assert!(!patterns.emotion_correlation.contains_key("calm"));
    }

    #[test]
    fn test_window_filters() {
        let entries = vec![
            dream("2024-01-01", "fire", &[], 6),
            dream("2024-01-18", "water", &[], 6),
        ];
        let recent = analyze_as_of(&entries, &Window::LastDays(7), today()).unwrap();
        assert_eq!(recent.total_dream_nights, 1);
        assert_eq!(recent.analysis_period, "Last 7 days");

        let since = analyze_as_of(&entries, &Window::since("2024-01-01").unwrap(), today()).unwrap();
        assert_eq!(since.total_dream_nights, 2);
        assert_eq!(since.analysis_period, "Since 2024-01-01");

        assert!(analyze_as_of(&entries, &Window::LastDays(0), today()).is_none());
        assert!(matches!(Window::since("01/02/2024"), Err(JournalError::InvalidDate(_))));
    }

    #[test]
    fn test_duplicate_date_last_write_wins_in_index() {
        let entries = vec![dream("2024-01-01", "fire", &[], 6), dream("2024-01-01", "water", &[], 6)];
        let patterns = analyze_as_of(&entries, &Window::All, today()).unwrap();
        assert_eq!(patterns.dreams_by_date["2024-01-01"], vec!["Water"]);
    }

    #[test]
    fn test_aggregation_is_repeatable() {
        let entries = scenario();
        let first = analyze_as_of(&entries, &Window::All, today());
        let second = analyze_as_of(&entries, &Window::All, today());
        assert_eq!(first, second);
        assert_eq!(entries, scenario());
    }

    #[test]
    fn test_theme_recommendations() {
        let patterns = analyze_as_of(&scenario(), &Window::All, today()).unwrap();
        let recs = theme_recommendations(&patterns);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].theme, "Flying");
        assert!(recs[0].recommendation.starts_with("Since 'Flying' appears frequently in your dreams, consider"));
    }

    #[test]
    fn test_search_by_theme() {
        let entries = scenario();
        let found = search_by_theme(&entries, "water").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, "2024-01-17");
        assert!(matches!(search_by_theme(&entries, "Dragons"), Err(JournalError::UnknownTheme(_))));
    }

    #[test]
    fn test_with_emotion_and_filter() {
        let entries = scenario();
        assert_eq!(with_emotion(&entries, "PEACEFUL").count(), 2);
        assert_eq!(with_emotion(&entries, "joyful").count(), 1);

        let filter = DreamFilter {
            min_quality: Some(8),
            keywords: vec!["Mountains".into()],
            ..Default::default()
        };
        let found = filter.apply(&entries);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, "2024-01-15");

        let by_date = DreamFilter {
            from_date: Some("2024-01-16".into()),
            to_date: Some("2024-01-31".into()),
            emotions: vec!["joyful".into(), "angry".into()],
            ..Default::default()
        };
        assert_eq!(by_date.apply(&entries).len(), 1);
    }

    #[test]
    fn test_sliding_windows() {
        let mut entries = scenario();
        entries.push(SleepEntry::new("2024-01-18", "23:00", "07:00", 5));
        entries.push(dream("2024-01-19", "fire", &[], 6));
        let windows = sliding_windows(&entries, 2).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[1][1].date, "2024-01-19");
        assert!(sliding_windows(&entries, 5).unwrap().is_empty());
        assert!(matches!(sliding_windows(&entries, 0), Err(JournalError::InvalidArgument(_))));
    }
}
