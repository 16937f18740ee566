use chrono::{Datelike, NaiveDate};

use crate::models::{DATE_FORMAT, PerformanceEntry, SleepEntry};

/// The two ordered entry collections. Dates are unique within each; recording a date
/// that already exists replaces that entry where it stands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Journal {
    sleep: Vec<SleepEntry>,
    performance: Vec<PerformanceEntry>,
}

/// Whether a record call appended a new date or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    Added,
    Replaced,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a journal from loaded collections. Later duplicates of a date win.
    pub fn from_entries(sleep: Vec<SleepEntry>, performance: Vec<PerformanceEntry>) -> Self {
        let mut journal = Self::new();
        for entry in sleep {
            journal.record_sleep(entry);
        }
        for entry in performance {
            journal.record_performance(entry);
        }
        journal
    }

    pub fn sleep(&self) -> &[SleepEntry] {
        &self.sleep
    }

    pub fn performance(&self) -> &[PerformanceEntry] {
        &self.performance
    }

    pub fn is_empty(&self) -> bool {
        self.sleep.is_empty() && self.performance.is_empty()
    }

    pub fn record_sleep(&mut self, entry: SleepEntry) -> Recorded {
        if let Some(index) = self.sleep.iter().position(|e| e.date == entry.date) {
            self.sleep[index] = entry;
            Recorded::Replaced
        } else {
            self.sleep.push(entry);
            Recorded::Added
        }
    }

    pub fn record_performance(&mut self, entry: PerformanceEntry) -> Recorded {
        if let Some(index) = self.performance.iter().position(|e| e.date == entry.date) {
            self.performance[index] = entry;
            Recorded::Replaced
        } else {
            self.performance.push(entry);
            Recorded::Added
        }
    }

    pub fn sleep_on(&self, date: &str) -> Option<&SleepEntry> {
        self.sleep.iter().find(|e| e.date == date)
    }

    pub fn performance_on(&self, date: &str) -> Option<&PerformanceEntry> {
        self.performance.iter().find(|e| e.date == date)
    }

    /// The last `n` sleep entries in stored order.
    pub fn recent_sleep(&self, n: usize) -> &[SleepEntry] {
        &self.sleep[self.sleep.len().saturating_sub(n)..]
    }

    pub fn recent_performance(&self, n: usize) -> &[PerformanceEntry] {
        &self.performance[self.performance.len().saturating_sub(n)..]
    }

    /// Sleep entries dated in the given month. Unparsable dates are skipped.
    pub fn sleep_in_month(&self, year: i32, month: u32) -> impl Iterator<Item = &SleepEntry> {
        self.sleep.iter().filter(move |e| {
            NaiveDate::parse_from_str(&e.date, DATE_FORMAT)
                .is_ok_and(|d| d.year() == year && d.month() == month)
        })
    }

    pub fn high_quality_sleep(&self, min_quality: u8) -> impl Iterator<Item = &SleepEntry> {
        self.sleep.iter().filter(move |e| e.sleep_quality >= min_quality)
    }

    /// Nights with the dream flag set, with or without a description.
    pub fn dream_entries(&self) -> impl Iterator<Item = &SleepEntry> {
        self.sleep.iter().filter(|e| e.had_dreams)
    }

    pub fn sleep_since<'a>(&'a self, cutoff: &'a str) -> impl Iterator<Item = &'a SleepEntry> {
        self.sleep.iter().filter(move |e| e.date.as_str() >= cutoff)
    }

    pub fn performance_since<'a>(&'a self, cutoff: &'a str) -> impl Iterator<Item = &'a PerformanceEntry> {
        self.performance.iter().filter(move |e| e.date.as_str() >= cutoff)
    }

    /// Cloned sleep and performance entries dated on or after `cutoff`.
    pub fn since(&self, cutoff: &str) -> Journal {
        Journal {
            sleep: self.sleep_since(cutoff).cloned().collect(),
            performance: self.performance_since(cutoff).cloned().collect(),
        }
    }

    /// Cloned entries dated within `[from, to]`, both inclusive.
    pub fn between(&self, from: &str, to: &str) -> Journal {
        Journal {
            sleep: self
                .sleep
                .iter()
                .filter(|e| e.date.as_str() >= from && e.date.as_str() <= to)
                .cloned()
                .collect(),
            performance: self
                .performance
                .iter()
                .filter(|e| e.date.as_str() >= from && e.date.as_str() <= to)
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn night(date: &str, quality: u8) -> SleepEntry {
        SleepEntry::new(date, "23:00", "07:00", quality)
    }

    #[test]
    fn test_record_replaces_same_date_in_place() {
        let mut journal = Journal::new();
        assert_eq!(journal.record_sleep(night("2024-01-01", 5)), Recorded::Added);
        assert_eq!(journal.record_sleep(night("2024-01-02", 6)), Recorded::Added);
        assert_eq!(journal.record_sleep(night("2024-01-01", 9)), Recorded::Replaced);

        let dates: Vec<_> = journal.sleep().iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02"]);
        assert_eq!(journal.sleep_on("2024-01-01").map(|e| e.sleep_quality), Some(9));
    }

    #[test]
    fn test_from_entries_last_duplicate_wins() {
        let perf = vec![
            PerformanceEntry::new("2024-01-01", 5, 5, 5, 5),
            PerformanceEntry::new("2024-01-01", 9, 9, 9, 1),
        ];
        let journal = Journal::from_entries(Vec::new(), perf);
        assert_eq!(journal.performance().len(), 1);
        assert_eq!(journal.performance_on("2024-01-01").map(|e| e.productivity), Some(9));
    }

    #[test]
    fn test_recent_views() {
        let journal = Journal::from_entries(
            (1..=5).map(|d| night(&format!("2024-01-0{d}"), 5)).collect(),
            Vec::new(),
        );
        assert_eq!(journal.recent_sleep(2).len(), 2);
        assert_eq!(journal.recent_sleep(2)[0].date, "2024-01-04");
        assert_eq!(journal.recent_sleep(50).len(), 5);
        assert!(journal.recent_performance(3).is_empty());
    }

    #[test]
    fn test_month_quality_and_dream_views() {
        let mut journal = Journal::new();
        journal.record_sleep(night("2024-01-31", 8));
        journal.record_sleep(night("2024-02-01", 4).with_dream("", Vec::<String>::new()));
        journal.record_sleep(night("2024-02-14", 7).with_dream("a river", ["calm"]));
        journal.record_sleep(night("not-a-date", 9));

        assert_eq!(journal.sleep_in_month(2024, 2).count(), 2);
        assert_eq!(journal.high_quality_sleep(7).count(), 3);
        assert_eq!(journal.dream_entries().count(), 2);
    }

    #[test]
    fn test_since_and_between() {
        let mut journal = Journal::new();
        for d in 1..=9 {
            journal.record_sleep(night(&format!("2024-03-0{d}"), 6));
            journal.record_performance(PerformanceEntry::new(format!("2024-03-0{d}"), 6, 6, 6, 6));
        }
        let recent = journal.since("2024-03-07");
        assert_eq!(recent.sleep().len(), 3);
        assert_eq!(recent.performance().len(), 3);
        assert_eq!(journal.between("2024-03-02", "2024-03-04").sleep().len(), 3);
    }
}
