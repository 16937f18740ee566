//! Sleep and performance journaling with keyword-based dream theme analysis.
//!
//! The analytic core ([`matcher`], [`patterns`], [`stats`], [`report`]) works on plain
//! in-memory records and never touches the filesystem. [`storage`] and [`config`] are the
//! thin I/O layer used by the command-line front end.

pub mod catalog;
pub mod config;
pub mod error;
pub mod journal;
pub mod matcher;
pub mod models;
pub mod patterns;
pub mod report;
pub mod stats;
pub mod storage;
pub mod telemetry;

pub use config::Config;
pub use error::{JournalError, Result};
pub use journal::{Journal, Recorded};
pub use matcher::{Interpretation, ThemeMatch};
pub use models::{PerformanceEntry, SleepEntry};
pub use patterns::{DreamFilter, DreamPatterns, Window};
pub use report::ReportComposer;
pub use stats::{Correlation, Summary, Trend};
pub use storage::Store;
