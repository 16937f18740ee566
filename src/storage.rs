//! On-disk persistence for the journal.
//!
//! Layout under the data directory:
//!
//! ```text
//! sleep_data.txt             date|bedtime|wake|quality|had_dreams|content|emotions
//! performance_data.txt       date|productivity|mood|energy|stress|activities|notes
//! sleep_table.json           exported rows with spreadsheet column names
//! performance_table.json
//! backup/                    timestamped copies of the two text files
//! reports/                   saved reports
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{JournalError, Result};
use crate::journal::Journal;
use crate::models::{PerformanceEntry, SleepEntry};

pub const SLEEP_FILE: &str = "sleep_data.txt";
pub const PERFORMANCE_FILE: &str = "performance_data.txt";
pub const SLEEP_TABLE_FILE: &str = "sleep_table.json";
pub const PERFORMANCE_TABLE_FILE: &str = "performance_table.json";
pub const BACKUP_DIR: &str = "backup";
pub const REPORTS_DIR: &str = "reports";
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const FIELD_SEPARATOR: char = '|';
const FIELD_COUNT: usize = 7;

#[derive(Debug, Clone)]
pub struct Store {
    data_dir: PathBuf,
}

impl Store {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Store rooted at `data_dir`, creating it and its backup and report folders.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(data_dir);
        fs::create_dir_all(store.backup_dir())?;
        fs::create_dir_all(store.reports_dir())?;
        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn sleep_path(&self) -> PathBuf {
        self.data_dir.join(SLEEP_FILE)
    }

    pub fn performance_path(&self) -> PathBuf {
        self.data_dir.join(PERFORMANCE_FILE)
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.data_dir.join(BACKUP_DIR)
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.data_dir.join(REPORTS_DIR)
    }

    pub fn load_journal(&self) -> Result<Journal> {
        Ok(Journal::from_entries(self.load_sleep()?, self.load_performance()?))
    }

    pub fn save_journal(&self, journal: &Journal) -> Result<()> {
        self.save_sleep(journal.sleep())?;
        self.save_performance(journal.performance())
    }

    pub fn load_sleep(&self) -> Result<Vec<SleepEntry>> {
        let entries = load_lines(&self.sleep_path(), parse_sleep_line)?;
        info!("Loaded {} sleep entries", entries.len());
        Ok(entries)
    }

    pub fn load_performance(&self) -> Result<Vec<PerformanceEntry>> {
        let entries = load_lines(&self.performance_path(), parse_performance_line)?;
        info!("Loaded {} performance entries", entries.len());
        Ok(entries)
    }

    pub fn save_sleep(&self, entries: &[SleepEntry]) -> Result<()> {
        let lines: Vec<String> = entries.iter().map(format_sleep_line).collect();
        write_lines(&self.sleep_path(), &lines)?;
        info!("Sleep data saved: {} entries", entries.len());
        Ok(())
    }

    pub fn save_performance(&self, entries: &[PerformanceEntry]) -> Result<()> {
        let lines: Vec<String> = entries.iter().map(format_performance_line).collect();
        write_lines(&self.performance_path(), &lines)?;
        info!("Performance data saved: {} entries", entries.len());
        Ok(())
    }

    /// Copies whichever data files exist into `backup/`. Returns the copies made.
    pub fn create_backup(&self, at: NaiveDateTime) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(self.backup_dir())?;
        let stamp = at.format(TIMESTAMP_FORMAT);
        let mut copies = Vec::new();
        for (source, stem) in [
            (self.sleep_path(), "sleep_data"),
            (self.performance_path(), "performance_data"),
        ] {
            if !source.exists() {
                debug!("Nothing to back up at {}", source.display());
                continue;
            }
            let target = self.backup_dir().join(format!("{stem}_backup_{stamp}.txt"));
            fs::copy(&source, &target)?;
            copies.push(target);
        }
        info!("Backup created with {} file(s)", copies.len());
        Ok(copies)
    }

    pub fn save_report(&self, content: &str, at: NaiveDateTime) -> Result<PathBuf> {
        fs::create_dir_all(self.reports_dir())?;
        let path = self
            .reports_dir()
            .join(format!("sleep_analysis_report_{}.txt", at.format(TIMESTAMP_FORMAT)));
        let body = format!(
            "Sleep Analytics Report - Generated on {}\n{}\n\n{content}",
            at.format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(80)
        );
        fs::write(&path, body)?;
        info!("Report saved as {}", path.display());
        Ok(path)
    }

    pub fn data_statistics(&self) -> Result<DataStatistics> {
        let (sleep_entries, sleep_file_size) = count_records(&self.sleep_path())?;
        let (performance_entries, performance_file_size) = count_records(&self.performance_path())?;
        Ok(DataStatistics {
            sleep_entries,
            performance_entries,
            sleep_file_size,
            performance_file_size,
            last_backup: self.last_backup()?,
        })
    }

    /// Time stamped into the newest backup file name, if any.
    pub fn last_backup(&self) -> Result<Option<NaiveDateTime>> {
        let dir = self.backup_dir();
        if !dir.exists() {
            return Ok(None);
        }
        let mut latest = None;
        for entry in fs::read_dir(dir)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if let Some(stamp) = backup_timestamp(&name) {
                latest = latest.max(Some(stamp));
            }
        }
        Ok(latest)
    }

    /// Writes both collections as JSON tables. Returns the sleep and performance paths.
    pub fn export_tables(&self, journal: &Journal) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(&self.data_dir)?;
        let sleep_rows: Vec<SleepRow> = journal.sleep().iter().map(SleepRow::from).collect();
        let performance_rows: Vec<PerformanceRow> =
            journal.performance().iter().map(PerformanceRow::from).collect();

        let sleep_path = self.data_dir.join(SLEEP_TABLE_FILE);
        let performance_path = self.data_dir.join(PERFORMANCE_TABLE_FILE);
        fs::write(&sleep_path, serde_json::to_string_pretty(&sleep_rows)?)?;
        fs::write(&performance_path, serde_json::to_string_pretty(&performance_rows)?)?;
        info!(
            "Exported {} sleep and {} performance rows",
            sleep_rows.len(),
            performance_rows.len()
        );
        Ok((sleep_path, performance_path))
    }

    /// Reads the JSON tables back. A missing table reads as empty.
    pub fn import_tables(&self) -> Result<(Vec<SleepEntry>, Vec<PerformanceEntry>)> {
        let sleep_rows: Vec<SleepRow> = read_table(&self.data_dir.join(SLEEP_TABLE_FILE))?;
        let performance_rows: Vec<PerformanceRow> =
            read_table(&self.data_dir.join(PERFORMANCE_TABLE_FILE))?;
        info!(
            "Imported {} sleep and {} performance rows",
            sleep_rows.len(),
            performance_rows.len()
        );
        Ok((
            sleep_rows.into_iter().map(SleepEntry::from).collect(),
            performance_rows.into_iter().map(PerformanceEntry::from).collect(),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataStatistics {
    pub sleep_entries: usize,
    pub performance_entries: usize,
    /// Bytes
    pub sleep_file_size: u64,
    pub performance_file_size: u64,
    pub last_backup: Option<NaiveDateTime>,
}

fn load_lines<T>(path: &Path, parse: fn(&str, usize) -> Result<T>) -> Result<Vec<T>> {
    if !path.exists() {
        info!("No existing data at {}, starting fresh", path.display());
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path)?;
    let mut records = Vec::new();
    for (index, line) in data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse(line, index + 1) {
            Ok(record) => records.push(record),
            Err(e) => warn!("{}: {e}, skipping", path.display()),
        }
    }
    Ok(records)
}

fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut data = lines.join("\n");
    if !data.is_empty() {
        data.push('\n');
    }
    fs::write(path, data)?;
    Ok(())
}

fn count_records(path: &Path) -> Result<(usize, u64)> {
    if !path.exists() {
        return Ok((0, 0));
    }
    let data = fs::read_to_string(path)?;
    let count = data.lines().filter(|l| !l.trim().is_empty()).count();
    Ok((count, fs::metadata(path)?.len()))
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// `sleep_data_backup_20240115_083000.txt` -> 2024-01-15 08:30:00
fn backup_timestamp(file_name: &str) -> Option<NaiveDateTime> {
    let stem = file_name.strip_suffix(".txt")?;
    let (_, stamp) = stem.split_once("_backup_")?;
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()
}

// Separators inside free text would break the line format.
fn sanitize(field: &str) -> String {
    field.replace([FIELD_SEPARATOR, '\n', '\r'], " ")
}

fn split_fields(line: &str, line_number: usize) -> Result<Vec<&str>> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() != FIELD_COUNT {
        return Err(JournalError::MalformedLine {
            line: line_number,
            reason: format!("expected {FIELD_COUNT} fields, found {}", fields.len()),
        });
    }
    Ok(fields)
}

fn parse_rating(field: &str, name: &str, line_number: usize) -> Result<u8> {
    field.trim().parse().map_err(|_| JournalError::MalformedLine {
        line: line_number,
        reason: format!("{name} '{field}' is not a number"),
    })
}

fn split_emotions(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(String::from)
        .collect()
}

pub fn format_sleep_line(entry: &SleepEntry) -> String {
    let emotions: Vec<String> = entry.dream_emotions.iter().map(|e| sanitize(e)).collect();
    [
        sanitize(&entry.date),
        sanitize(&entry.bedtime),
        sanitize(&entry.wake_time),
        entry.sleep_quality.to_string(),
        if entry.had_dreams { "True" } else { "False" }.to_string(),
        sanitize(&entry.dream_content),
        emotions.join(","),
    ]
    .join("|")
}

pub fn parse_sleep_line(line: &str, line_number: usize) -> Result<SleepEntry> {
    let fields = split_fields(line, line_number)?;
    let quality = parse_rating(fields[3], "sleep quality", line_number)?;
    let mut entry = SleepEntry::new(fields[0].trim(), fields[1].trim(), fields[2].trim(), quality);
    entry.had_dreams = fields[4].trim().eq_ignore_ascii_case("true");
    entry.dream_content = fields[5].to_string();
    entry.dream_emotions = split_emotions(fields[6]);
    Ok(entry)
}

pub fn format_performance_line(entry: &PerformanceEntry) -> String {
    [
        sanitize(&entry.date),
        entry.productivity.to_string(),
        entry.mood.to_string(),
        entry.energy_level.to_string(),
        entry.stress_level.to_string(),
        sanitize(&entry.activities),
        sanitize(&entry.notes),
    ]
    .join("|")
}

pub fn parse_performance_line(line: &str, line_number: usize) -> Result<PerformanceEntry> {
    let fields = split_fields(line, line_number)?;
    Ok(PerformanceEntry::new(
        fields[0].trim(),
        parse_rating(fields[1], "productivity", line_number)?,
        parse_rating(fields[2], "mood", line_number)?,
        parse_rating(fields[3], "energy level", line_number)?,
        parse_rating(fields[4], "stress level", line_number)?,
    )
    .with_notes(fields[5], fields[6]))
}

// ---------------------------------------------------------------------------
// Table rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SleepRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Bedtime")]
    bedtime: String,
    #[serde(rename = "Wake_Time")]
    wake_time: String,
    #[serde(rename = "Sleep_Quality")]
    sleep_quality: u8,
    #[serde(rename = "Had_Dreams")]
    had_dreams: bool,
    #[serde(rename = "Dream_Content", default)]
    dream_content: String,
    #[serde(rename = "Dream_Emotions", default)]
    dream_emotions: String,
}

impl From<&SleepEntry> for SleepRow {
    fn from(entry: &SleepEntry) -> Self {
        Self {
            date: entry.date.clone(),
            bedtime: entry.bedtime.clone(),
            wake_time: entry.wake_time.clone(),
            sleep_quality: entry.sleep_quality,
            had_dreams: entry.had_dreams,
            dream_content: entry.dream_content.clone(),
            dream_emotions: entry.dream_emotions.join(", "),
        }
    }
}

impl From<SleepRow> for SleepEntry {
    fn from(row: SleepRow) -> Self {
        let mut entry = SleepEntry::new(row.date, row.bedtime, row.wake_time, row.sleep_quality);
        entry.had_dreams = row.had_dreams;
        entry.dream_content = row.dream_content;
        entry.dream_emotions = split_emotions(&row.dream_emotions);
        entry
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PerformanceRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Productivity")]
    productivity: u8,
    #[serde(rename = "Mood")]
    mood: u8,
    #[serde(rename = "Energy_Level")]
    energy_level: u8,
    #[serde(rename = "Stress_Level")]
    stress_level: u8,
    #[serde(rename = "Activities", default)]
    activities: String,
    #[serde(rename = "Notes", default)]
    notes: String,
}

impl From<&PerformanceEntry> for PerformanceRow {
    fn from(entry: &PerformanceEntry) -> Self {
        Self {
            date: entry.date.clone(),
            productivity: entry.productivity,
            mood: entry.mood,
            energy_level: entry.energy_level,
            stress_level: entry.stress_level,
            activities: entry.activities.clone(),
            notes: entry.notes.clone(),
        }
    }
}

impl From<PerformanceRow> for PerformanceEntry {
    fn from(row: PerformanceRow) -> Self {
        PerformanceEntry::new(row.date, row.productivity, row.mood, row.energy_level, row.stress_level)
            .with_notes(row.activities, row.notes)
    }
}
