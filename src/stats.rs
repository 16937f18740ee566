//! Numeric summaries shared by the sleep, performance and dream views.
//!
//! Trend here is a directional heuristic over consecutive pairs, not a fitted slope.
//! It is meant for "is this moving up or down" labels in a personal report.

use std::collections::HashMap;
use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::models::{PerformanceEntry, SleepEntry, round_to};

/// Minimum number of dates present in both collections before correlating them.
pub const MIN_CORRELATION_DAYS: usize = 3;
pub const GOOD_SLEEP_QUALITY: u8 = 7;
pub const POOR_SLEEP_QUALITY: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Improving,
    Declining,
    Stable,
    InsufficientData,
    NoData,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Trend::Improving => "Improving",
            Trend::Declining => "Declining",
            Trend::Stable => "Stable",
            Trend::InsufficientData => "Insufficient data",
            Trend::NoData => "No data",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    /// Rounded to two decimals
    pub average: f64,
    pub trend: Trend,
}

/// Count, range, average and trend of `values`.
///
/// Empty input is a valid "no data" summary with zeroes and [`Trend::NoData`].
pub fn summarize(values: &[f64]) -> Summary {
    if values.is_empty() {
        return Summary {
            count: 0,
            min: 0.0,
            max: 0.0,
            average: 0.0,
            trend: Trend::NoData,
        };
    }

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    Summary {
        count: values.len(),
        min,
        max,
        average: round_to(mean(values), 2),
        trend: trend(values),
    }
}

/// Compares consecutive pairs and labels the majority direction.
pub fn trend(values: &[f64]) -> Trend {
    if values.len() < 2 {
        return Trend::InsufficientData;
    }

    let (increases, decreases) =
        values
            .iter()
            .tuple_windows()
            .fold((0usize, 0usize), |(up, down), (prev, next)| {
                if next > prev {
                    (up + 1, down)
                } else if next < prev {
                    (up, down + 1)
                } else {
                    (up, down)
                }
            });

    match increases.cmp(&decreases) {
        std::cmp::Ordering::Greater => Trend::Improving,
        std::cmp::Ordering::Less => Trend::Declining,
        std::cmp::Ordering::Equal => Trend::Stable,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn average_of<T>(items: &[T], value: impl Fn(&T) -> f64) -> Option<f64> {
    if items.is_empty() {
        return None;
    }
    let values: Vec<f64> = items.iter().map(value).collect();
    Some(round_to(mean(&values), 1))
}

// ---------------------------------------------------------------------------
// Sleep / performance averages
// ---------------------------------------------------------------------------

pub fn average_sleep_quality(entries: &[SleepEntry]) -> Option<f64> {
    average_of(entries, |e| f64::from(e.sleep_quality))
}

pub fn average_sleep_duration(entries: &[SleepEntry]) -> Option<f64> {
    average_of(entries, |e| e.sleep_duration)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformanceAverages {
    pub productivity: f64,
    pub mood: f64,
    pub energy: f64,
    pub stress: f64,
    pub overall: f64,
}

pub fn average_performance(entries: &[PerformanceEntry]) -> Option<PerformanceAverages> {
    Some(PerformanceAverages {
        productivity: average_of(entries, |e| f64::from(e.productivity))?,
        mood: average_of(entries, |e| f64::from(e.mood))?,
        energy: average_of(entries, |e| f64::from(e.energy_level))?,
        stress: average_of(entries, |e| f64::from(e.stress_level))?,
        overall: average_of(entries, |e| e.overall_score)?,
    })
}

/// Percentage of nights with the dream flag set, one decimal. Description text is
/// irrelevant here.
pub fn dream_frequency(entries: &[SleepEntry]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    let dreams = entries.iter().filter(|e| e.had_dreams).count();
    round_to(dreams as f64 * 100.0 / entries.len() as f64, 1)
}

/// Emotion counts on dream nights, case-folded, most frequent first.
pub fn common_emotions(entries: &[SleepEntry], limit: usize) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for emotion in entries
        .iter()
        .filter(|e| e.had_dreams)
        .flat_map(|e| e.dream_emotions.iter())
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
    {
        let count = counts.entry(emotion.clone()).or_insert(0);
        if *count == 0 {
            order.push(emotion);
        }
        *count += 1;
    }

    order
        .into_iter()
        .map(|e| {
            let count = counts[&e];
            (e, count)
        })
        .sorted_by(|a, b| b.1.cmp(&a.1))
        .take(limit)
        .collect()
}

/// First entry with the highest and first with the lowest quality.
pub fn best_and_worst_sleep(entries: &[SleepEntry]) -> Option<(&SleepEntry, &SleepEntry)> {
    let best = entries.iter().rev().max_by_key(|e| e.sleep_quality)?;
    let worst = entries.iter().min_by_key(|e| e.sleep_quality)?;
    Some((best, worst))
}

pub fn best_and_worst_performance(
    entries: &[PerformanceEntry],
) -> Option<(&PerformanceEntry, &PerformanceEntry)> {
    let best = entries
        .iter()
        .rev()
        .max_by(|a, b| a.overall_score.total_cmp(&b.overall_score))?;
    let worst = entries
        .iter()
        .min_by(|a, b| a.overall_score.total_cmp(&b.overall_score))?;
    Some((best, worst))
}

// ---------------------------------------------------------------------------
// Dream statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DreamStatistics {
    pub total_nights: usize,
    pub dream_nights: usize,
    pub dream_frequency: f64,
    pub average_dream_length_words: f64,
    pub avg_sleep_quality_with_dreams: f64,
    pub avg_sleep_quality_without_dreams: f64,
    pub most_common_emotions: Vec<(String, usize)>,
    pub total_emotions_recorded: usize,
    pub unique_emotions: usize,
}

/// Whole-journal dream statistics; `None` for an empty journal.
///
/// `dream_nights` counts every night with the dream flag, including ones without a
/// description. Average length only looks at nights that do have text.
pub fn dream_statistics(entries: &[SleepEntry]) -> Option<DreamStatistics> {
    if entries.is_empty() {
        return None;
    }

    let (with_dreams, without_dreams): (Vec<&SleepEntry>, Vec<&SleepEntry>) =
        entries.iter().partition(|e| e.had_dreams);

    let lengths: Vec<f64> = with_dreams
        .iter()
        .filter(|e| !e.dream_content.trim().is_empty())
        .map(|e| e.dream_content.split_whitespace().count() as f64)
        .collect();


    let emotions: Vec<String> = with_dreams
        .iter()
        .flat_map(|e| e.dream_emotions.iter())
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    Some(DreamStatistics {
        total_nights: entries.len(),
        dream_nights: with_dreams.len(),
        dream_frequency: dream_frequency(entries),
        average_dream_length_words: round_to(mean(&lengths), 1),
        avg_sleep_quality_with_dreams: mean_quality(&with_dreams),
        avg_sleep_quality_without_dreams: mean_quality(&without_dreams),
        most_common_emotions: common_emotions(entries, 5),
        total_emotions_recorded: emotions.len(),
        unique_emotions: emotions.iter().unique().count(),
    })
}

fn mean_quality(group: &[&SleepEntry]) -> f64 {
    let values: Vec<f64> = group.iter().map(|e| f64::from(e.sleep_quality)).collect();
    round_to(mean(&values), 1)
}

// ---------------------------------------------------------------------------
// Sleep <-> performance correlation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationReport {
    pub matched_days: usize,
    /// Average overall score on nights with quality >= 7
    pub good_sleep_performance: Option<f64>,
    /// Average overall score on nights with quality <= 4
    pub poor_sleep_performance: Option<f64>,
    /// Both dream groups are present only when both are non-empty
    pub with_dreams_performance: Option<f64>,
    pub without_dreams_performance: Option<f64>,
}

impl CorrelationReport {
    pub fn findings(&self) -> Vec<String> {
        let mut findings = Vec::new();
        if let Some(avg) = self.good_sleep_performance {
            findings.push(format!("Average performance on good sleep days (7+): {avg}/10"));
        }
        if let Some(avg) = self.poor_sleep_performance {
            findings.push(format!("Average performance on poor sleep days (<=4): {avg}/10"));
        }
        if let (Some(with), Some(without)) = (self.with_dreams_performance, self.without_dreams_performance) {
            findings.push(format!("Average performance with dreams: {with}/10"));
            findings.push(format!("Average performance without dreams: {without}/10"));
        }
        findings
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Correlation {
    /// Fewer than [`MIN_CORRELATION_DAYS`] dates appear in both collections
    InsufficientData { matched_days: usize },
    Report(CorrelationReport),
}

/// Joins sleep and performance by exact date and compares performance across
/// sleep-quality and dream groups. A date repeated in one collection uses its last entry.
pub fn correlate(sleep: &[SleepEntry], performance: &[PerformanceEntry]) -> Correlation {
    let sleep_by_date: HashMap<&str, &SleepEntry> =
        sleep.iter().map(|e| (e.date.as_str(), e)).collect();
    let perf_by_date: HashMap<&str, &PerformanceEntry> =
        performance.iter().map(|e| (e.date.as_str(), e)).collect();

    let pairs: Vec<(&SleepEntry, &PerformanceEntry)> = sleep_by_date
        .iter()
        .filter_map(|(date, s)| perf_by_date.get(date).map(|p| (*s, *p)))
        .sorted_by(|a, b| a.0.date.cmp(&b.0.date))
        .collect();

    if pairs.len() < MIN_CORRELATION_DAYS {
        return Correlation::InsufficientData {
            matched_days: pairs.len(),
        };
    }

    let with_dreams = group_average(&pairs, |s| s.had_dreams);
    let without_dreams = group_average(&pairs, |s| !s.had_dreams);
    let (with_dreams, without_dreams) = match (with_dreams, without_dreams) {
        (Some(w), Some(wo)) => (Some(w), Some(wo)),
        _ => (None, None),
    };

    Correlation::Report(CorrelationReport {
        matched_days: pairs.len(),
        good_sleep_performance: group_average(&pairs, |s| s.sleep_quality >= GOOD_SLEEP_QUALITY),
        poor_sleep_performance: group_average(&pairs, |s| s.sleep_quality <= POOR_SLEEP_QUALITY),
        with_dreams_performance: with_dreams,
        without_dreams_performance: without_dreams,
    })
}

fn group_average(
    pairs: &[(&SleepEntry, &PerformanceEntry)],
    pred: impl Fn(&SleepEntry) -> bool,
) -> Option<f64> {
    let scores: Vec<f64> = pairs
        .iter()
        .filter(|(s, _)| pred(*s))
        .map(|(_, p)| p.overall_score)
        .collect();
    (!scores.is_empty()).then(|| round_to(mean(&scores), 1))
}

// ---------------------------------------------------------------------------
// Distribution buckets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub label: &'static str,
    pub count: usize,
}

pub const DURATION_BUCKETS: [&str; 5] = ["<6h", "6-7h", "7-8h", "8-9h", ">9h"];
pub const QUALITY_BUCKETS: [&str; 5] = ["1-2", "3-4", "5-6", "7-8", "9-10"];
pub const PERFORMANCE_BUCKETS: [&str; 3] = ["Low (1-3)", "Medium (4-6)", "High (7-10)"];

fn bucketize<I>(labels: &[&'static str], indices: I) -> Vec<Bucket>
where
    I: IntoIterator<Item = usize>,
{
    let mut buckets: Vec<Bucket> = labels.iter().map(|&label| Bucket { label, count: 0 }).collect();
    for i in indices {
        buckets[i].count += 1;
    }
    buckets
}

pub fn duration_bucket(hours: f64) -> usize {
    match hours {
        h if h < 6.0 => 0,
        h if h < 7.0 => 1,
        h if h < 8.0 => 2,
        h if h < 9.0 => 3,
        _ => 4,
    }
}

/// Pairs of quality scores, with 9 and 10 sharing the top bucket.
pub fn quality_bucket(quality: u8) -> usize {
    let q = quality.clamp(1, 10);
    usize::from((q - 1) / 2)
}

pub fn performance_bucket(score: f64) -> usize {
    if score <= 3.0 {
        0
    } else if score <= 6.0 {
        1
    } else {
        2
    }
}

pub fn duration_distribution(entries: &[SleepEntry]) -> Vec<Bucket> {
    bucketize(&DURATION_BUCKETS, entries.iter().map(|e| duration_bucket(e.sleep_duration)))
}

pub fn quality_distribution(entries: &[SleepEntry]) -> Vec<Bucket> {
    bucketize(&QUALITY_BUCKETS, entries.iter().map(|e| quality_bucket(e.sleep_quality)))
}

pub fn performance_distribution(entries: &[PerformanceEntry]) -> Vec<Bucket> {
    bucketize(&PERFORMANCE_BUCKETS, entries.iter().map(|e| performance_bucket(e.overall_score)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sleep(date: &str, quality: u8, dreams: bool) -> SleepEntry {
        let entry = SleepEntry::new(date, "23:00", "07:00", quality);
        if dreams { entry.with_dream("a dream", ["calm"]) } else { entry }
    }

    fn perf(date: &str, productivity: u8, stress: u8) -> PerformanceEntry {
        PerformanceEntry::new(date, productivity, productivity, productivity, stress)
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average, 0.0);
        assert_eq!(summary.trend, Trend::NoData);
        assert_eq!(summary.trend.to_string(), "No data");
    }

    #[test]
    fn test_summarize_values() {
        let summary = summarize(&[4.0, 9.0, 5.0]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min, 4.0);
        assert_eq!(summary.max, 9.0);
        assert_eq!(summary.average, 6.0);
        assert_eq!(summarize(&[1.0, 2.0, 2.0]).average, 1.67);
    }

    #[test]
    fn test_trend_labels() {
        assert_eq!(trend(&[5.0, 6.0, 7.0, 8.0]), Trend::Improving);
        assert_eq!(trend(&[8.0, 7.0, 6.0, 5.0]), Trend::Declining);
        assert_eq!(trend(&[5.0, 5.0, 5.0]), Trend::Stable);
        assert_eq!(trend(&[5.0, 7.0, 6.0]), Trend::Stable);
        assert_eq!(trend(&[5.0]), Trend::InsufficientData);
        assert_eq!(summarize(&[5.0]).trend.to_string(), "Insufficient data");
    }

    #[test]
    fn test_correlation_needs_three_matched_dates() {
        let sleep_entries = vec![sleep("2024-01-01", 8, false), sleep("2024-01-02", 3, true)];
        let perf_entries = vec![perf("2024-01-01", 8, 2), perf("2024-01-02", 4, 8), perf("2024-01-05", 5, 5)];
        assert_eq!(
            correlate(&sleep_entries, &perf_entries),
            Correlation::InsufficientData { matched_days: 2 }
        );
        assert_eq!(correlate(&[], &perf_entries), Correlation::InsufficientData { matched_days: 0 });
    }

    #[test]
    fn test_correlation_groups() {
        let sleep_entries = vec![
            sleep("2024-01-01", 8, true),
            sleep("2024-01-02", 3, false),
            sleep("2024-01-03", 9, true),
            sleep("2024-01-04", 5, false),
        ];
        let perf_entries = vec![
            perf("2024-01-01", 8, 3), // (8+8+8+8)/4 = 8.0
            perf("2024-01-02", 4, 7), // (4+4+4+4)/4 = 4.0
            perf("2024-01-03", 9, 2), // 9.0
            perf("2024-01-04", 6, 5), // 6.0
        ];
        let Correlation::Report(report) = correlate(&sleep_entries, &perf_entries) else {
            panic!("expected a correlation report");
        };
        assert_eq!(report.matched_days, 4);
        assert_eq!(report.good_sleep_performance, Some(8.5));
        assert_eq!(report.poor_sleep_performance, Some(4.0));
        assert_eq!(report.with_dreams_performance, Some(8.5));
        assert_eq!(report.without_dreams_performance, Some(5.0));
        assert_eq!(report.findings().len(), 4);
    }

    #[test]
    fn test_correlation_omits_one_sided_dream_groups() {
        let sleep_entries: Vec<_> = (1..=3).map(|d| sleep(&format!("2024-01-0{d}"), 5, true)).collect();
        let perf_entries: Vec<_> = (1..=3).map(|d| perf(&format!("2024-01-0{d}"), 5, 5)).collect();
        let Correlation::Report(report) = correlate(&sleep_entries, &perf_entries) else {
            panic!("expected a correlation report");
        };
        assert_eq!(report.with_dreams_performance, None);
        assert_eq!(report.good_sleep_performance, None);
        assert!(report.findings().is_empty());
    }

    #[test]
    fn test_buckets() {
        assert_eq!(duration_bucket(5.9), 0);
        assert_eq!(duration_bucket(6.0), 1);
        assert_eq!(duration_bucket(7.5), 2);
        assert_eq!(duration_bucket(8.0), 3);
        assert_eq!(duration_bucket(9.0), 4);
        assert_eq!(quality_bucket(1), 0);
        assert_eq!(quality_bucket(4), 1);
        assert_eq!(quality_bucket(8), 3);
        assert_eq!(quality_bucket(9), 4);
        assert_eq!(quality_bucket(10), 4);
        assert_eq!(performance_bucket(3.0), 0);
        assert_eq!(performance_bucket(6.0), 1);
        assert_eq!(performance_bucket(6.1), 2);
    }

    #[test]
    fn test_distributions_keep_every_bucket() {
        let entries = vec![
            SleepEntry::new("2024-01-01", "23:00", "07:00", 9),
            SleepEntry::new("2024-01-02", "01:00", "06:00", 2),
            SleepEntry::new("2024-01-03", "22:00", "07:30", 10),
        ];
        let durations: Vec<_> = duration_distribution(&entries).iter().map(|b| b.count).collect();
        assert_eq!(durations, vec![1, 0, 0, 1, 1]);
        let qualities = quality_distribution(&entries);
        assert_eq!(qualities.len(), 5);
        assert_eq!(qualities[4], Bucket { label: "9-10", count: 2 });
        assert_eq!(qualities[0].count, 1);
    }

    #[test]
    fn test_averages() {
        let entries = vec![sleep("2024-01-01", 7, true), sleep("2024-01-02", 8, false)];
        assert_eq!(average_sleep_quality(&entries), Some(7.5));
        assert_eq!(average_sleep_duration(&entries), Some(8.0));
        assert_eq!(average_sleep_quality(&[]), None);

        let perf_entries = vec![perf("2024-01-01", 6, 8), perf("2024-01-02", 7, 6)];
        let avg = average_performance(&perf_entries).unwrap();
        assert_eq!(avg.productivity, 6.5);
        assert_eq!(avg.stress, 7.0);
        assert!(average_performance(&[]).is_none());
    }

    #[test]
    fn test_dream_frequency_counts_flag_only() {
        let entries = vec![
            sleep("2024-01-01", 7, true),
            SleepEntry::new("2024-01-02", "23:00", "07:00", 6).with_dream("", Vec::<String>::new()),
            sleep("2024-01-03", 5, false),
        ];
        assert_eq!(dream_frequency(&entries), 66.7);
        let stats = dream_statistics(&entries).unwrap();
        assert_eq!(stats.dream_nights, 2);
        assert_eq!(stats.average_dream_length_words, 2.0);
        assert_eq!(stats.avg_sleep_quality_with_dreams, 6.5);
        assert_eq!(stats.avg_sleep_quality_without_dreams, 5.0);
        assert_eq!(stats.unique_emotions, 1);
        assert!(dream_statistics(&[]).is_none());
    }

    #[test]
    fn test_common_emotions_case_folded() {
        let entries = vec![
            SleepEntry::new("2024-01-01", "23:00", "07:00", 7).with_dream("x", ["Happy", "calm"]),
            SleepEntry::new("2024-01-02", "23:00", "07:00", 7).with_dream("y", ["happy "]),
        ];
        assert_eq!(
            common_emotions(&entries, 5),
            vec![("happy".to_string(), 2), ("calm".to_string(), 1)]
        );
    }

    #[test]
    fn test_best_and_worst() {
        let entries = vec![sleep("2024-01-01", 6, false), sleep("2024-01-02", 9, false), sleep("2024-01-03", 9, false)];
        let (best, worst) = best_and_worst_sleep(&entries).unwrap();
        assert_eq!(best.date, "2024-01-02");
        assert_eq!(worst.date, "2024-01-01");
        assert!(best_and_worst_sleep(&[]).is_none());
    }
}
