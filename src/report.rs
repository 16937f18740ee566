//! Text reports stitched together from [`crate::stats`] and [`crate::patterns`].
//!
//! Nothing in here computes new statistics beyond percentages and differences for
//! display. Recommendations come from a fixed table of threshold rules.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use itertools::Itertools;

use crate::error::{JournalError, Result};
use crate::journal::Journal;
use crate::models::{DATE_FORMAT, PerformanceEntry, SleepEntry};
use crate::patterns::{self, DreamPatterns, Window};
use crate::stats::{self, Bucket, Correlation, PerformanceAverages};

pub const CHART_WIDTH: usize = 40;
const SECTION_RULE: usize = 50;
const PAGE_RULE: usize = 80;

/// Builds the full report and the smaller summaries, stamped with a fixed time so output
/// is reproducible.
#[derive(Debug, Clone, Copy)]
pub struct ReportComposer {
    generated_at: NaiveDateTime,
}

impl ReportComposer {
    pub fn new(generated_at: NaiveDateTime) -> Self {
        Self { generated_at }
    }

    pub fn now() -> Self {
        Self::new(chrono::Local::now().naive_local())
    }

    fn today(&self) -> NaiveDate {
        self.generated_at.date()
    }

    /// Every report section in display order.
    pub fn sections(&self, journal: &Journal) -> Vec<String> {
        vec![
            self.header(),
            data_overview(journal),
            sleep_analysis(journal.sleep()),
            performance_analysis(journal),
            dream_analysis(journal.sleep()),
            self.dream_themes(journal.sleep()),
            correlation_analysis(journal),
            recommendations_section(journal),
            footer(),
        ]
    }

    pub fn compose(&self, journal: &Journal) -> String {
        self.sections(journal).join("\n\n")
    }

    fn header(&self) -> String {
        let rule = "=".repeat(PAGE_RULE);
        let stamp = format!("Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S"));
        format!(
            "{rule}\n{:^width$}\n{:^width$}\n{rule}",
            "SLEEP ANALYTICS & PERFORMANCE REPORT",
            stamp,
            width = PAGE_RULE
        )
    }

    fn dream_themes(&self, entries: &[SleepEntry]) -> String {
        const TITLE: &str = "DREAM THEMES";
        let Some(dream_stats) = stats::dream_statistics(entries).filter(|s| s.dream_nights > 0) else {
            return section(TITLE, "No dreams recorded for theme analysis.");
        };

        let mut body = vec![
            format!(
                "Dream Frequency: {}% ({}/{} nights)",
                dream_stats.dream_frequency, dream_stats.dream_nights, dream_stats.total_nights
            ),
            format!("Average Dream Length: {} words", dream_stats.average_dream_length_words),
            format!(
                "Emotional Diversity: {} unique emotions recorded",
                dream_stats.unique_emotions
            ),
        ];

        let patterns = patterns::analyze_as_of(entries, &Window::All, self.today());
        if let Some(patterns) = patterns.as_ref().filter(|p| !p.most_common_themes.is_empty()) {
            body.push(String::new());
            body.push("Dominant dream themes:".to_string());
            for (rank, tc) in patterns.most_common_themes.iter().enumerate() {
                body.push(format!(
                    "- {}: {} occurrences ({:.1}% of dreams)",
                    tc.theme,
                    tc.count,
                    patterns.share_of_nights(tc.count)
                ));
                if rank < 3 {
                    if let Some(theme) = crate::catalog::find(tc.theme) {
                        body.push(format!("  > {}", truncate(theme.interpretation, 100)));
                    }
                }
            }
        }

        if !dream_stats.most_common_emotions.is_empty() {
            body.push(String::new());
            body.push("Emotional patterns:".to_string());
            for (emotion, count) in &dream_stats.most_common_emotions {
                let share = *count as f64 * 100.0 / dream_stats.total_emotions_recorded as f64;
                body.push(format!("- {}: {count} times ({share:.1}%)", title_case(emotion)));
            }
        }

        body.push(String::new());
        body.push("Dream and sleep quality:".to_string());
        body.push(format!(
            "- Sleep quality with dreams: {}/10",
            dream_stats.avg_sleep_quality_with_dreams
        ));
        body.push(format!(
            "- Sleep quality without dreams: {}/10",
            dream_stats.avg_sleep_quality_without_dreams
        ));
        let diff = dream_stats.avg_sleep_quality_with_dreams - dream_stats.avg_sleep_quality_without_dreams;
        if diff > 0.5 {
            body.push(format!(
                "- Insight: You sleep {diff:.1} points better on nights when you remember dreams"
            ));
        } else if diff < -0.5 {
            body.push(format!(
                "- Insight: You sleep {:.1} points better on nights when you don't remember dreams",
                diff.abs()
            ));
        }

        if let Some(patterns) = &patterns {
            let tips = theme_tips(patterns);
            if !tips.is_empty() {
                body.push(String::new());
                body.push("Personalized dream insights:".to_string());
                body.extend(tips.iter().enumerate().map(|(i, tip)| format!("{}. {tip}", i + 1)));
            }
        }

        section(TITLE, &body.join("\n"))
    }

    /// Averages over the last `weeks` weeks up to and including the report date.
    pub fn weekly_summary(&self, journal: &Journal, weeks: u32) -> Result<String> {
        if weeks == 0 {
            return Err(JournalError::InvalidArgument("weeks back must be at least 1".into()));
        }
        let end = self.today();
        let start = end - Duration::weeks(i64::from(weeks));
        let (start, end) = (start.format(DATE_FORMAT).to_string(), end.format(DATE_FORMAT).to_string());
        let window = journal.between(&start, &end);

        if window.is_empty() {
            return Ok("No data available for the selected week.".to_string());
        }

        let mut lines = vec![
            format!("WEEKLY SUMMARY ({start} to {end})"),
            "=".repeat(60),
            format!("Sleep Entries: {}", window.sleep().len()),
            format!("Performance Entries: {}", window.performance().len()),
        ];
        if let (Some(quality), Some(duration)) = (
            stats::average_sleep_quality(window.sleep()),
            stats::average_sleep_duration(window.sleep()),
        ) {
            lines.push(format!("Average Sleep Quality: {quality:.1}/10"));
            lines.push(format!("Average Sleep Duration: {}", format_duration(duration)));
        }
        if let Some(avg) = stats::average_performance(window.performance()) {
            lines.push(format!("Average Productivity: {:.1}/10", avg.productivity));
            lines.push(format!("Average Mood: {:.1}/10", avg.mood));
        }
        Ok(lines.join("\n"))
    }
}

fn section(title: &str, body: &str) -> String {
    format!("{title}\n{}\n{body}", "=".repeat(SECTION_RULE))
}

fn data_overview(journal: &Journal) -> String {
    let sleep = journal.sleep();
    let date_range = match sleep.iter().map(|e| e.date.as_str()).minmax().into_option() {
        Some((first, last)) => format!("{first} to {last}"),
        None => "No data".to_string(),
    };
    section(
        "DATA OVERVIEW",
        &format!(
            "Total Sleep Entries: {}\nTotal Performance Entries: {}\nDate Range: {date_range}\nData Quality: {}",
            sleep.len(),
            journal.performance().len(),
            data_quality(sleep.len())
        ),
    )
}

pub fn data_quality(sleep_entries: usize) -> &'static str {
    match sleep_entries {
        n if n >= 7 => "Good",
        n if n >= 3 => "Limited",
        _ => "Insufficient",
    }
}

fn sleep_analysis(entries: &[SleepEntry]) -> String {
    const TITLE: &str = "SLEEP ANALYSIS";
    let Some((best, worst)) = stats::best_and_worst_sleep(entries) else {
        return section(TITLE, "No sleep data available for analysis.");
    };

    let qualities: Vec<f64> = entries.iter().map(|e| f64::from(e.sleep_quality)).collect();
    let summary = stats::summarize(&qualities);

    let body = format!(
        "Average Sleep Quality: {}/10\n\
         Average Sleep Duration: {}\n\n\
         Sleep Quality Distribution:\n{}\n\n\
         Sleep Duration Distribution:\n{}\n\n\
         Sleep Quality Statistics:\n\
         - Minimum: {}/10\n\
         - Maximum: {}/10\n\
         - Trend: {}\n\n\
         Best Sleep Day: {} (Quality: {}/10)\n\
         Worst Sleep Day: {} (Quality: {}/10)",
        stats::average_sleep_quality(entries).unwrap_or_default(),
        format_duration(stats::average_sleep_duration(entries).unwrap_or_default()),
        bucket_chart(&stats::quality_distribution(entries)),
        bucket_chart(&stats::duration_distribution(entries)),
        summary.min,
        summary.max,
        summary.trend,
        best.date,
        best.sleep_quality,
        worst.date,
        worst.sleep_quality,
    );
    section(TITLE, &body)
}

fn performance_analysis(journal: &Journal) -> String {
    const TITLE: &str = "PERFORMANCE ANALYSIS";
    let entries = journal.performance();
    let (Some(avg), Some((best, worst))) = (
        stats::average_performance(entries),
        stats::best_and_worst_performance(entries),
    ) else {
        return section(TITLE, "No performance data available for analysis.");
    };

    let productivity = metric_summary(entries, |e| e.productivity);
    let mood = metric_summary(entries, |e| e.mood);
    let energy = metric_summary(entries, |e| e.energy_level);
    let stress = metric_summary(entries, |e| e.stress_level);

    let body = format!(
        "Average Performance Metrics:\n\
         - Productivity: {}/10 (Trend: {})\n\
         - Mood: {}/10 (Trend: {})\n\
         - Energy: {}/10 (Trend: {})\n\
         - Stress: {}/10 (Trend: {})\n\
         - Overall Score: {}/10\n\n\
         Performance Distribution:\n{}\n\n\
         Best Performance Day: {} (Score: {}/10)\n\
         Worst Performance Day: {} (Score: {}/10)\n\n\
         Performance Insights:\n\
         - Highest Productivity: {}/10\n\
         - Best Mood Day: {}/10\n\
         - Peak Energy Level: {}/10\n\
         - Lowest Stress: {}/10",
        avg.productivity,
        productivity.trend,
        avg.mood,
        mood.trend,
        avg.energy,
        energy.trend,
        avg.stress,
        stress.trend,
        avg.overall,
        bucket_chart(&stats::performance_distribution(entries)),
        best.date,
        best.overall_score,
        worst.date,
        worst.overall_score,
        productivity.max,
        mood.max,
        energy.max,
        stress.min,
    );
    section(TITLE, &body)
}

fn metric_summary(entries: &[PerformanceEntry], rating: impl Fn(&PerformanceEntry) -> u8) -> stats::Summary {
    let values: Vec<f64> = entries.iter().map(|e| f64::from(rating(e))).collect();
    stats::summarize(&values)
}

fn dream_analysis(entries: &[SleepEntry]) -> String {
    const TITLE: &str = "DREAM ANALYSIS";
    let Some(dream_stats) = stats::dream_statistics(entries) else {
        return section(TITLE, "No sleep data available for dream analysis.");
    };

    let mut body = format!(
        "Dream Frequency: {}% ({}/{} nights)\n\n\
         Sleep Quality Comparison:\n\
         - Nights with dreams: {:.1}/10\n\
         - Nights without dreams: {:.1}/10",
        dream_stats.dream_frequency,
        dream_stats.dream_nights,
        dream_stats.total_nights,
        dream_stats.avg_sleep_quality_with_dreams,
        dream_stats.avg_sleep_quality_without_dreams,
    );

    let emotions = stats::common_emotions(entries, 5);
    if !emotions.is_empty() {
        body.push_str(&format!("\n\nMost Common Dream Emotions:\n{}", chart(&emotions, CHART_WIDTH)));
    }

    let recent: Vec<&SleepEntry> = entries[entries.len().saturating_sub(10)..]
        .iter()
        .filter(|e| e.had_dreams)
        .collect();
    if !recent.is_empty() {
        body.push_str(&format!("\n\nRecent Dreams ({} entries):", recent.len()));
        for dream in &recent[recent.len().saturating_sub(3)..] {
            body.push_str(&format!("\n- {}: {}", dream.date, truncate(&dream.dream_content, 60)));
        }
    }

    section(TITLE, &body)
}

fn correlation_analysis(journal: &Journal) -> String {
    const TITLE: &str = "CORRELATION ANALYSIS";
    match stats::correlate(journal.sleep(), journal.performance()) {
        Correlation::InsufficientData { .. } => section(
            TITLE,
            "Insufficient data for meaningful correlation analysis.\n\
             Need at least 3 matching sleep and performance entries.",
        ),
        Correlation::Report(report) => {
            let findings = report.findings();
            let mut body = format!("Matched days: {}", report.matched_days);
            for finding in &findings {
                body.push_str(&format!("\n- {finding}"));
            }
            if findings.len() > 2 {
                body.push_str(
                    "\n\nKey Insights:\n\
                     - Track patterns over time to identify personal sleep-performance relationships\n\
                     - Look for consistent patterns across multiple weeks\n\
                     - Consider outside factors such as stress and activities that influence both",
                );
            }
            section(TITLE, &body)
        }
    }
}

/// Inputs for the recommendation rules.
#[derive(Debug, Clone, Copy)]
struct Metrics {
    sleep_count: usize,
    performance_count: usize,
    avg_quality: Option<f64>,
    avg_duration: Option<f64>,
    dream_frequency: Option<f64>,
    performance: Option<PerformanceAverages>,
}

impl Metrics {
    fn from_journal(journal: &Journal) -> Self {
        let sleep = journal.sleep();
        Self {
            sleep_count: sleep.len(),
            performance_count: journal.performance().len(),
            avg_quality: stats::average_sleep_quality(sleep),
            avg_duration: stats::average_sleep_duration(sleep),
            dream_frequency: (!sleep.is_empty()).then(|| stats::dream_frequency(sleep)),
            performance: stats::average_performance(journal.performance()),
        }
    }
}

struct Rule {
    fires: fn(&Metrics) -> bool,
    message: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        fires: |m| m.avg_quality.is_some_and(|q| q < 6.0),
        message: "Focus on improving sleep quality - consider sleep hygiene practices",
    },
    Rule {
        fires: |m| m.avg_duration.is_some_and(|d| d < 7.0),
        message: "Aim for 7-9 hours of sleep per night for optimal performance",
    },
    Rule {
        fires: |m| m.avg_duration.is_some_and(|d| d > 9.0),
        message: "Consider if you're oversleeping - 7-9 hours is typically optimal",
    },
    Rule {
        fires: |m| m.dream_frequency.is_some_and(|f| f > 80.0),
        message: "High dream recall - consider keeping a detailed dream journal",
    },
    Rule {
        fires: |m| m.dream_frequency.is_some_and(|f| f < 20.0),
        message: "Low dream recall - try meditation or stress reduction techniques",
    },
    Rule {
        fires: |m| m.performance.is_some_and(|p| p.stress > 7.0),
        message: "High stress levels detected - consider stress management techniques",
    },
    Rule {
        fires: |m| m.performance.is_some_and(|p| p.energy < 5.0),
        message: "Low energy levels - review sleep schedule and consider exercise",
    },
    Rule {
        fires: |m| m.performance.is_some_and(|p| p.productivity < 6.0),
        message: "Focus on productivity optimization - analyze your peak performance times",
    },
    Rule {
        fires: |m| m.sleep_count < 14,
        message: "Continue logging data for at least 2 weeks for meaningful insights",
    },
    Rule {
        fires: |m| m.performance_count < m.sleep_count,
        message: "Log performance data consistently with sleep data for better correlations",
    },
];

const ALL_CLEAR: [&str; 2] = [
    "Great job maintaining consistent sleep and performance tracking!",
    "Continue monitoring patterns for long-term insights",
];

/// Messages of every rule that fires, in table order.
pub fn recommendations(journal: &Journal) -> Vec<&'static str> {
    let metrics = Metrics::from_journal(journal);
    let fired: Vec<&'static str> = RULES
        .iter()
        .filter(|rule| (rule.fires)(&metrics))
        .map(|rule| rule.message)
        .collect();
    if fired.is_empty() { ALL_CLEAR.to_vec() } else { fired }
}

fn recommendations_section(journal: &Journal) -> String {
    let body = recommendations(journal)
        .iter()
        .enumerate()
        .map(|(i, rec)| format!("{}. {rec}", i + 1))
        .join("\n");
    section("PERSONALIZED RECOMMENDATIONS", &body)
}

fn footer() -> String {
    let rule = "=".repeat(PAGE_RULE);
    format!(
        "{rule}\n\
         Report generated by sleep-analytics\n\
         Keep tracking your sleep and performance patterns.\n\
         Consistency in data logging leads to better insights.\n\
         {rule}"
    )
}

/// First two tips of the two leading themes, de-duplicated, at most four.
fn theme_tips(patterns: &DreamPatterns) -> Vec<&'static str> {
    patterns
        .most_common_themes
        .iter()
        .take(2)
        .filter_map(|tc| crate::catalog::find(tc.theme))
        .flat_map(|theme| theme.tips.iter().take(2).copied())
        .unique()
        .take(4)
        .collect()
}

// ---------------------------------------------------------------------------
// Dream-only reports
// ---------------------------------------------------------------------------

/// Narrative summary of the dream nights in `entries`.
pub fn dream_insights(entries: &[SleepEntry]) -> String {
    let dream_entries: Vec<&SleepEntry> = entries.iter().filter(|e| e.had_dreams).collect();
    if dream_entries.is_empty() {
        return "No dream data available for analysis.".to_string();
    }

    let mut lines = vec!["DREAM INSIGHTS".to_string(), "=".repeat(SECTION_RULE)];

    let recent: Vec<&SleepEntry> = entries[entries.len().saturating_sub(30)..]
        .iter()
        .filter(|e| e.had_dreams)
        .collect();
    let recent_quality = average_quality(&recent);
    lines.push(String::new());
    lines.push("Recent activity (last 30 entries):".to_string());
    lines.push(format!("Dreams recorded: {}", recent.len()));
    if let Some(avg) = recent_quality {
        lines.push(format!("Average sleep quality with dreams: {avg:.1}/10"));
    }

    if let Some(day) = busiest_weekday(&dream_entries) {
        lines.push(String::new());
        lines.push("Dream patterns:".to_string());
        lines.push(format!("Most dreams occur on: {day}"));
    }

    let emotions = stats::common_emotions(entries, usize::MAX);
    if let Some((emotion, count)) = emotions.first() {
        lines.push(String::new());
        lines.push("Emotional patterns:".to_string());
        lines.push(format!("Most frequent dream emotion: {} ({count} times)", title_case(emotion)));
    }

    if dream_entries.len() >= 5 {
        let high = dream_entries.iter().filter(|e| e.sleep_quality >= 8).count();
        let low = dream_entries.iter().filter(|e| e.sleep_quality <= 5).count();
        lines.push(String::new());
        lines.push("Sleep quality:".to_string());
        lines.push(format!("Dreams with high sleep quality (8+): {high}"));
        lines.push(format!("Dreams with low sleep quality (<=5): {low}"));
    }

    let total_words: usize = dream_entries
        .iter()
        .map(|e| e.dream_content.split_whitespace().count())
        .sum();
    let avg_length = total_words as f64 / dream_entries.len() as f64;
    lines.push(String::new());
    lines.push("Content:".to_string());
    lines.push(format!("Average dream description length: {avg_length:.1} words"));
    lines.push(format!("Total dream content recorded: {total_words} words"));

    lines.push(String::new());
    lines.push("Recommendations:".to_string());
    match recent_quality {
        Some(avg) if avg < 6.0 => lines.push("- Consider improving sleep hygiene for better dream recall".into()),
        Some(avg) if avg > 8.0 => lines.push("- Great sleep quality! Your dreams are well-remembered".into()),
        _ => {}
    }
    if emotions.len() > 5 {
        lines.push("- You experience diverse emotions in dreams, a sign of active processing".into());
    }
    if avg_length > 50.0 {
        lines.push("- You provide detailed dream descriptions, excellent for pattern analysis".into());
    }

    lines.join("\n")
}

fn average_quality(entries: &[&SleepEntry]) -> Option<f64> {
    if entries.is_empty() {
        return None;
    }
    let total: u32 = entries.iter().map(|e| u32::from(e.sleep_quality)).sum();
    Some(f64::from(total) / entries.len() as f64)
}

/// Weekday with the most dream nights; ties go to the weekday seen first.
fn busiest_weekday(entries: &[&SleepEntry]) -> Option<String> {
    let weekdays: Vec<String> = entries
        .iter()
        .filter_map(|e| NaiveDate::parse_from_str(&e.date, DATE_FORMAT).ok())
        .map(|d| d.format("%A").to_string())
        .collect();
    let mut busiest: Option<(&String, usize)> = None;
    for day in weekdays.iter().unique() {
        let count = weekdays.iter().filter(|d| *d == day).count();
        if busiest.is_none_or(|(_, best)| count > best) {
            busiest = Some((day, count));
        }
    }
    busiest.map(|(day, _)| day.clone())
}

/// Two leading themes for each of the last `limit` dream dates, oldest first.
pub fn timeline(patterns: &DreamPatterns, limit: usize) -> String {
    let mut lines = vec!["DREAM TIMELINE".to_string(), "=".repeat(SECTION_RULE)];
    let skip = patterns.dreams_by_date.len().saturating_sub(limit);
    for (date, themes) in patterns.dreams_by_date.iter().skip(skip) {
        let weekday = NaiveDate::parse_from_str(date, DATE_FORMAT)
            .map(|d| format!(" ({})", d.weekday()))
            .unwrap_or_default();
        let themes = if themes.is_empty() {
            "No themes detected".to_string()
        } else {
            themes.iter().take(2).join(", ")
        };
        lines.push(format!("{date}{weekday}: {themes}"));
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Horizontal bar chart, bars scaled so the largest value spans `max_width`.
pub fn chart<L: fmt::Display>(rows: &[(L, usize)], max_width: usize) -> String {
    if rows.is_empty() {
        return "No data to display".to_string();
    }
    let max_value = rows.iter().map(|(_, v)| *v).max().unwrap_or(0);
    rows.iter()
        .map(|(label, value)| {
            let width = if max_value > 0 { value * max_width / max_value } else { 0 };
            format!("{label:15} | {} {value}", "█".repeat(width))
        })
        .join("\n")
}

fn bucket_chart(buckets: &[Bucket]) -> String {
    let rows: Vec<(&str, usize)> = buckets.iter().map(|b| (b.label, b.count)).collect();
    chart(&rows, CHART_WIDTH)
}

/// `7.5` -> `7h 30m`, `8.0` -> `8 hours`, `0.5` -> `30 minutes`.
pub fn format_duration(hours: f64) -> String {
    let total_minutes = (hours * 60.0).round().max(0.0) as u64;
    let (whole_hours, minutes) = (total_minutes / 60, total_minutes % 60);
    match (whole_hours, minutes) {
        (0, 0) => "0 hours".to_string(),
        (0, m) => format!("{m} minutes"),
        (1, 0) => "1 hour".to_string(),
        (h, 0) => format!("{h} hours"),
        (h, m) => format!("{h}h {m}m"),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer() -> ReportComposer {
        let at = NaiveDate::from_ymd_opt(2024, 1, 20)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .unwrap();
        ReportComposer::new(at)
    }

    fn night(date: &str, bed: &str, wake: &str, quality: u8) -> SleepEntry {
        SleepEntry::new(date, bed, wake, quality)
    }

    fn sample_journal() -> Journal {
        let mut journal = Journal::new();
        journal.record_sleep(
            night("2024-01-15", "23:00", "07:00", 8)
                .with_dream("I was flying over beautiful mountains", ["peaceful", "happy"]),
        );
        journal.record_sleep(night("2024-01-16", "00:30", "06:00", 4));
        journal.record_sleep(
            night("2024-01-17", "22:30", "07:00", 7)
                .with_dream("I was swimming in clear blue water with dolphins", ["peaceful", "joyful"]),
        );
        journal.record_performance(PerformanceEntry::new("2024-01-15", 8, 8, 7, 3));
        journal.record_performance(PerformanceEntry::new("2024-01-16", 4, 5, 3, 8));
        journal.record_performance(PerformanceEntry::new("2024-01-17", 7, 7, 7, 4));
        journal
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0 hours");
        assert_eq!(format_duration(0.5), "30 minutes");
        assert_eq!(format_duration(1.0), "1 hour");
        assert_eq!(format_duration(8.0), "8 hours");
        assert_eq!(format_duration(7.5), "7h 30m");
        assert_eq!(format_duration(7.3), "7h 18m");
    }

    #[test]
    fn test_chart_scales_to_largest_value() {
        assert_eq!(chart::<&str>(&[], CHART_WIDTH), "No data to display");
        let out = chart(&[("a", 4), ("b", 1), ("c", 0)], 8);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], format!("{:15} | {} 4", "a", "█".repeat(8)));
        assert_eq!(lines[1], format!("{:15} | {} 1", "b", "█".repeat(2)));
        assert_eq!(lines[2], format!("{:15} |  0", "c"));
    }

    #[test]
    fn test_data_quality_labels() {
        assert_eq!(data_quality(0), "Insufficient");
        assert_eq!(data_quality(3), "Limited");
        assert_eq!(data_quality(7), "Good");
    }

    #[test]
    fn test_compose_orders_sections() {
        let report = composer().compose(&sample_journal());
        let headings = [
            "SLEEP ANALYTICS & PERFORMANCE REPORT",
            "DATA OVERVIEW",
            "SLEEP ANALYSIS",
            "PERFORMANCE ANALYSIS",
            "DREAM ANALYSIS",
            "DREAM THEMES",
            "CORRELATION ANALYSIS",
            "PERSONALIZED RECOMMENDATIONS",
        ];
        let positions: Vec<usize> = headings
            .iter()
            .map(|h| report.find(h).unwrap_or_else(|| panic!("missing {h}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(report.contains("Generated: 2024-01-20 09:30:00"));
        assert!(report.contains("Date Range: 2024-01-15 to 2024-01-17"));
        assert!(report.contains("Data Quality: Limited"));
        assert!(report.contains("- Flying: 1 occurrences (50.0% of dreams)"));
    }

    #[test]
    fn test_empty_journal_report() {
        let report = composer().compose(&Journal::new());
        assert!(report.contains("No sleep data available for analysis."));
        assert!(report.contains("No performance data available for analysis."));
        assert!(report.contains("No dreams recorded for theme analysis."));
        assert!(report.contains("Insufficient data for meaningful correlation analysis."));
        assert!(report.contains("Data Quality: Insufficient"));
    }

    #[test]
    fn test_recommendation_rules() {
        let mut journal = Journal::new();
        for d in 1..=3 {
            journal.record_sleep(night(&format!("2024-01-0{d}"), "01:00", "06:00", 4));
        }
        let recs = recommendations(&journal);
        assert_eq!(
            recs,
            vec![
                "Focus on improving sleep quality - consider sleep hygiene practices",
                "Aim for 7-9 hours of sleep per night for optimal performance",
                "Low dream recall - try meditation or stress reduction techniques",
                "Continue logging data for at least 2 weeks for meaningful insights",
                "Log performance data consistently with sleep data for better correlations",
            ]
        );
    }

    #[test]
    fn test_recommendations_all_clear() {
        let mut journal = Journal::new();
        for d in 1..=14 {
            let date = format!("2024-02-{d:02}");
            let entry = night(&date, "23:00", "07:00", 8);
            let entry = if d % 2 == 0 { entry.with_dream("a walk", ["calm"]) } else { entry };
            journal.record_sleep(entry);
            journal.record_performance(PerformanceEntry::new(date, 8, 8, 8, 2));
        }
        assert_eq!(recommendations(&journal), ALL_CLEAR.to_vec());
    }

    #[test]
    fn test_stress_rule() {
        let mut journal = Journal::new();
        journal.record_performance(PerformanceEntry::new("2024-01-01", 8, 8, 8, 9));
        assert!(recommendations(&journal).contains(&RULES[5].message));
    }

    #[test]
    fn test_weekly_summary() {
        let journal = sample_journal();
        assert!(matches!(
            composer().weekly_summary(&journal, 0),
            Err(JournalError::InvalidArgument(_))
        ));

        let summary = composer().weekly_summary(&journal, 1).unwrap();
        assert!(summary.starts_with("WEEKLY SUMMARY (2024-01-13 to 2024-01-20)"));
        assert!(summary.contains("Sleep Entries: 3"));
        assert!(summary.contains("Average Productivity: 6.3/10"));

        let later = ReportComposer::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).and_then(|d| d.and_hms_opt(0, 0, 0)).unwrap(),
        );
        assert_eq!(
            later.weekly_summary(&journal, 2).unwrap(),
            "No data available for the selected week."
        );
    }

    #[test]
    fn test_dream_insights() {
        assert_eq!(dream_insights(&[]), "No dream data available for analysis.");
        let journal = sample_journal();
        let text = dream_insights(journal.sleep());
        assert!(text.contains("Dreams recorded: 2"));
        // 2024-01-15 is a Monday, 2024-01-17 a Wednesday
        assert!(text.contains("Most dreams occur on: Monday"));
        assert!(text.contains("Most frequent dream emotion: Peaceful (2 times)"));
        assert!(!text.contains("Sleep quality:"));
    }

    #[test]
    fn test_timeline_keeps_last_dates() {
        let journal = sample_journal();
        let patterns = patterns::analyze_as_of(journal.sleep(), &Window::All, composer().today()).unwrap();
        let text = timeline(&patterns, 1);
        assert!(text.contains("2024-01-17 (Wed): Water"));
        assert!(!text.contains("2024-01-15"));
    }

    #[test]
    fn test_title_case_and_truncate() {
        assert_eq!(title_case("deeply calm"), "Deeply Calm");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
    }
}
