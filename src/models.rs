use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// One night of sleep.
///
/// `date` is an ISO `YYYY-MM-DD` string and is the unique key inside a [`crate::Journal`].
/// `sleep_duration` is derived from the bedtime and wake time when the entry is built.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SleepEntry {
    pub date: String,
    pub bedtime: String,
    pub wake_time: String,
    pub sleep_quality: u8,
    pub had_dreams: bool,
    pub dream_content: String,
    pub dream_emotions: Vec<String>,
    pub sleep_duration: f64,
}

impl SleepEntry {
    pub fn new(
        date: impl Into<String>,
        bedtime: impl Into<String>,
        wake_time: impl Into<String>,
        sleep_quality: u8,
    ) -> Self {
        let bedtime = bedtime.into();
        let wake_time = wake_time.into();
        let sleep_duration = sleep_duration_hours(&bedtime, &wake_time);
        Self {
            date: date.into(),
            bedtime,
            wake_time,
            sleep_quality,
            had_dreams: false,
            dream_content: String::new(),
            dream_emotions: Vec::new(),
            sleep_duration,
        }
    }

    /// Marks the night as a dream night with the given description and emotions.
    pub fn with_dream<I, S>(mut self, content: impl Into<String>, emotions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.had_dreams = true;
        self.dream_content = content.into();
        self.dream_emotions = emotions
            .into_iter()
            .map(Into::into)
            .map(|e: String| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    /// Dream flag set and a non-empty description, i.e. eligible for theme analysis.
    pub fn has_dream_text(&self) -> bool {
        self.had_dreams && !self.dream_content.trim().is_empty()
    }

    pub fn emotion_summary(&self) -> String {
        if self.dream_emotions.is_empty() {
            "No emotions recorded".to_string()
        } else {
            self.dream_emotions.join(", ")
        }
    }
}

/// Hours between bedtime and wake time, wrapping past midnight, rounded to one decimal.
/// Either time failing to parse yields 0.0.
pub fn sleep_duration_hours(bedtime: &str, wake_time: &str) -> f64 {
    let (Ok(bed), Ok(wake)) = (
        NaiveTime::parse_from_str(bedtime.trim(), TIME_FORMAT),
        NaiveTime::parse_from_str(wake_time.trim(), TIME_FORMAT),
    ) else {
        return 0.0;
    };

    let mut minutes = (wake - bed).num_minutes();
    if minutes < 0 {
        minutes += 24 * 60;
    }
    round_to(minutes as f64 / 60.0, 1)
}

/// One day of self-rated performance.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PerformanceEntry {
    pub date: String,
    pub productivity: u8,
    pub mood: u8,
    pub energy_level: u8,
    pub stress_level: u8,
    pub activities: String,
    pub notes: String,
    pub overall_score: f64,
}

impl PerformanceEntry {
    pub fn new(
        date: impl Into<String>,
        productivity: u8,
        mood: u8,
        energy_level: u8,
        stress_level: u8,
    ) -> Self {
        Self {
            date: date.into(),
            productivity,
            mood,
            energy_level,
            stress_level,
            activities: String::new(),
            notes: String::new(),
            overall_score: overall_score(productivity, mood, energy_level, stress_level),
        }
    }

    pub fn with_notes(mut self, activities: impl Into<String>, notes: impl Into<String>) -> Self {
        self.activities = activities.into();
        self.notes = notes.into();
        self
    }
}

/// Average of productivity, mood, energy and inverted stress (`11 - stress`), one decimal.
pub fn overall_score(productivity: u8, mood: u8, energy_level: u8, stress_level: u8) -> f64 {
    let inverted_stress = 11 - i32::from(stress_level);
    let total = i32::from(productivity) + i32::from(mood) + i32::from(energy_level) + inverted_stress;
    round_to(f64::from(total) / 4.0, 1)
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_same_day() {
        assert_eq!(sleep_duration_hours("01:00", "08:30"), 7.5);
    }

    #[test]
    fn test_duration_wraps_midnight() {
        assert_eq!(sleep_duration_hours("23:00", "07:00"), 8.0);
        assert_eq!(sleep_duration_hours("22:40", "06:00"), 7.3);
    }

    #[test]
    fn test_duration_unparsable_is_zero() {
        assert_eq!(sleep_duration_hours("late", "07:00"), 0.0);
        assert_eq!(sleep_duration_hours("23:00", ""), 0.0);
        assert_eq!(SleepEntry::new("2024-01-01", "25:00", "07:00", 5).sleep_duration, 0.0);
    }

    #[test]
    fn test_overall_score_inverts_stress() {
        // (8 + 7 + 6 + (11 - 3)) / 4 = 7.25 -> 7.3
        assert_eq!(overall_score(8, 7, 6, 3), 7.3);
        assert_eq!(overall_score(10, 10, 10, 1), 10.0);
        assert_eq!(PerformanceEntry::new("2024-01-01", 1, 1, 1, 10).overall_score, 1.0);
    }

    #[test]
    fn test_with_dream_trims_emotions() {
        let entry = SleepEntry::new("2024-01-01", "23:00", "07:00", 7)
            .with_dream("a dream", [" happy ", "", "calm"]);
        assert!(entry.had_dreams);
        assert_eq!(entry.dream_emotions, vec!["happy", "calm"]);
        assert_eq!(entry.emotion_summary(), "happy, calm");
    }

    #[test]
    fn test_has_dream_text_requires_content() {
        let entry = SleepEntry::new("2024-01-01", "23:00", "07:00", 7).with_dream("   ", ["odd"]);
        assert!(entry.had_dreams);
        assert!(!entry.has_dream_text());
    }
}
