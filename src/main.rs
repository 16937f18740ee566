use chrono::prelude::*;
use clap::{Args, Parser, Subcommand};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::{cursor, execute, terminal};
use std::{
    io::{self, Write},
    path::PathBuf,
};
use tracing::{debug, info};

use sleep_analytics::models::{DATE_FORMAT, TIME_FORMAT};
use sleep_analytics::patterns::{self, DreamFilter, Window};
use sleep_analytics::report::{self, ReportComposer};
use sleep_analytics::stats::{self, Correlation};
use sleep_analytics::telemetry::{self, timed};
use sleep_analytics::{
    Config, Journal, PerformanceEntry, Recorded, SleepEntry, Store, catalog, matcher,
};

const RECENT_DREAM_NIGHTS: usize = 14;
const ROLLING_WINDOW: usize = 3;

#[derive(Parser)]
#[command(name = "sleep-analytics")]
#[command(version)]
#[command(about = "Terminal journal for sleep, daily performance and dream themes")]
struct Cli {
    /// Config file (defaults to ./sleep_analytics.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Sleep(SleepCommands),
    Perf(PerfCommands),
    /// Full analysis report
    Report {
        /// Also write the report into the reports folder
        #[arg(long)]
        save: bool,
    },
    Weekly {
        #[arg(short, long, default_value = "1")]
        weeks: u32,
    },
    Correlations,
    Dreams(DreamCommands),
    Backup,
    Status,
    /// Write both collections as JSON tables
    Export,
    /// Merge the JSON tables back into the journal
    Import,
    /// Interactive menu
    Menu,
}

#[derive(Args)]
struct SleepCommands {
    #[command(subcommand)]
    action: SleepActions,
}

#[derive(Subcommand)]
enum SleepActions {
    Add {
        /// Defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
    History {
        #[arg(short, long)]
        limit: Option<usize>,
        /// Only nights in this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
        #[arg(short = 'q', long)]
        min_quality: Option<u8>,
    },
}

#[derive(Args)]
struct PerfCommands {
    #[command(subcommand)]
    action: PerfActions,
}

#[derive(Subcommand)]
enum PerfActions {
    Add {
        #[arg(short, long)]
        date: Option<String>,
    },
    History {
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[derive(Args)]
struct DreamCommands {
    #[command(subcommand)]
    action: DreamActions,
}

#[derive(Subcommand)]
enum DreamActions {
    /// Theme patterns over a time window
    Analyze {
        /// Look back this many days (defaults to the configured window)
        #[arg(short, long, conflicts_with = "since")]
        days: Option<u32>,
        /// Only dreams on or after this date (YYYY-MM-DD)
        #[arg(short, long)]
        since: Option<String>,
        #[arg(long, conflicts_with_all = ["days", "since"])]
        all: bool,
    },
    Insights,
    /// List the theme catalog
    Themes,
    Explore {
        theme: String,
    },
    Search {
        #[arg(short, long)]
        keyword: Vec<String>,
        #[arg(short, long)]
        emotion: Vec<String>,
        #[arg(short = 'q', long)]
        min_quality: Option<u8>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    Stats,
    Timeline {
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },
}

struct App {
    config: Config,
    store: Store,
    journal: Journal,
}

impl App {
    fn load(config: Config) -> anyhow::Result<Self> {
        let store = Store::open(&config.data_dir)?;
        let journal = store.load_journal()?;
        debug!(
            sleep = journal.sleep().len(),
            performance = journal.performance().len(),
            "journal loaded"
        );
        Ok(Self {
            config,
            store,
            journal,
        })
    }

    fn save(&self) -> anyhow::Result<()> {
        self.store.save_journal(&self.journal)?;
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    let config = Config::load(cli.config.as_deref())?.with_data_dir(cli.data_dir);
    let mut app = App::load(config)?;

    match cli.command {
        Commands::Sleep(sleep_cmd) => match sleep_cmd.action {
            SleepActions::Add { date } => record_sleep(&mut app, date)?,
            SleepActions::History {
                limit,
                month,
                min_quality,
            } => sleep_history(&app, limit, month.as_deref(), min_quality)?,
        },
        Commands::Perf(perf_cmd) => match perf_cmd.action {
            PerfActions::Add { date } => record_performance(&mut app, date)?,
            PerfActions::History { limit } => performance_history(&app, limit),
        },
        Commands::Report { save } => full_report(&app, save)?,
        Commands::Weekly { weeks } => weekly_summary(&app, weeks)?,
        Commands::Correlations => show_correlations(&app),
        Commands::Dreams(dream_cmd) => match dream_cmd.action {
            DreamActions::Analyze { days, since, all } => {
                let window = match (days, since, all) {
                    (_, _, true) => Window::All,
                    (_, Some(cutoff), _) => Window::since(&cutoff)?,
                    (Some(days), None, _) => Window::LastDays(days),
                    (None, None, _) => Window::LastDays(app.config.analysis_window_days),
                };
                analyze_dreams(&app, &window);
            }
            DreamActions::Insights => dream_insights(&app),
            DreamActions::Themes => list_themes(),
            DreamActions::Explore { theme } => explore_theme(&app, &theme)?,
            DreamActions::Search {
                keyword,
                emotion,
                min_quality,
                from,
                to,
            } => {
                let filter = DreamFilter {
                    min_quality,
                    emotions: emotion,
                    keywords: keyword,
                    from_date: from,
                    to_date: to,
                };
                print_dream_matches(&filter.apply(app.journal.sleep()));
            }
            DreamActions::Stats => dream_statistics(&app)?,
            DreamActions::Timeline { limit } => dream_timeline(&app, limit),
        },
        Commands::Backup => backup(&app)?,
        Commands::Status => status(&app)?,
        Commands::Export => export_tables(&app)?,
        Commands::Import => import_tables(&mut app)?,
        Commands::Menu => run_menu(&mut app)?,
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Input helpers
// ---------------------------------------------------------------------------

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn confirm(label: &str) -> anyhow::Result<bool> {
    Ok(prompt(label)?.eq_ignore_ascii_case("y"))
}

/// Ratings are clamped to 1..=10 here so the library can trust them.
fn prompt_rating(label: &str) -> anyhow::Result<u8> {
    loop {
        match prompt(label)?.parse::<u8>() {
            Ok(value) => return Ok(value.clamp(1, 10)),
            Err(_) => println!("Please enter a number between 1 and 10."),
        }
    }
}

fn prompt_time(label: &str) -> anyhow::Result<String> {
    loop {
        let input = prompt(label)?;
        if NaiveTime::parse_from_str(&input, TIME_FORMAT).is_ok() {
            return Ok(input);
        }
        println!("Please use the HH:MM format.");
    }
}

fn prompt_date(label: &str) -> anyhow::Result<String> {
    loop {
        let input = prompt(label)?;
        if input.is_empty() {
            return Ok(today());
        }
        if NaiveDate::parse_from_str(&input, DATE_FORMAT).is_ok() {
            return Ok(input);
        }
        println!("Please use the YYYY-MM-DD format.");
    }
}

fn resolve_date(date: Option<String>) -> anyhow::Result<String> {
    match date {
        Some(date) => {
            NaiveDate::parse_from_str(&date, DATE_FORMAT)
                .map_err(|_| anyhow::anyhow!("Invalid date '{date}', expected YYYY-MM-DD"))?;
            Ok(date)
        }
        None => Ok(today()),
    }
}

fn today() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

fn wait_for_keypress() -> anyhow::Result<()> {
    println!("\nPress any key to continue...");
    terminal::enable_raw_mode()?;
    let result = loop {
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => break Ok(()),
            Ok(_) => continue,
            Err(e) => break Err(e),
        }
    };
    terminal::disable_raw_mode()?;
    Ok(result?)
}

fn clear_screen() -> anyhow::Result<()> {
    execute!(
        io::stdout(),
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(0, 0)
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Sleep and performance
// ---------------------------------------------------------------------------

fn record_sleep(app: &mut App, date: Option<String>) -> anyhow::Result<()> {
    println!("\n--- RECORD SLEEP ---");
    let date = match date {
        Some(date) => resolve_date(Some(date))?,
        None => prompt_date("Date (YYYY-MM-DD, empty for today): ")?,
    };

    if let Some(existing) = app.journal.sleep_on(&date) {
        println!("Sleep entry already exists for {date}:");
        print_sleep_entry(existing);
        if !confirm("Do you want to replace it? (y/n): ")? {
            return Ok(());
        }
    }

    let bedtime = prompt_time("Bedtime (HH:MM): ")?;
    let wake_time = prompt_time("Wake time (HH:MM): ")?;
    let quality = prompt_rating("Sleep quality (1-10): ")?;
    let mut entry = SleepEntry::new(date, bedtime, wake_time, quality);

    if confirm("Did you remember any dreams? (y/n): ")? {
        let content = prompt("Describe your dream: ")?;
        let emotions = prompt("Dream emotions (comma separated): ")?;
        entry = entry.with_dream(content, emotions.split(','));
        print_theme_preview(&entry.dream_content);
    }

    let outcome = app.journal.record_sleep(entry);
    app.save()?;
    match outcome {
        Recorded::Added => println!("\nSleep entry recorded!"),
        Recorded::Replaced => println!("\nSleep entry updated!"),
    }
    Ok(())
}

fn print_theme_preview(content: &str) {
    let matches = timed("theme detection", || matcher::analyze(content));
    if matches.is_empty() {
        return;
    }
    println!("\nDetected dream themes:");
    for m in matches.iter().take(3) {
        println!("  - {} (confidence {:.1}%)", m.theme, m.confidence);
    }
    if let Some(top) = matcher::interpret(&matches[..1]).first() {
        println!("\nTheme insight: {}", top.interpretation);
        if let Some(tip) = top.tips.first() {
            println!("Suggestion: {tip}");
        }
    }
}

fn print_sleep_entry(entry: &SleepEntry) {
    println!(
        "{}  {} -> {}  ({}h)  quality {}/10",
        entry.date, entry.bedtime, entry.wake_time, entry.sleep_duration, entry.sleep_quality
    );
    if entry.had_dreams {
        println!("  Dream: {}", entry.dream_content);
        println!("  Emotions: {}", entry.emotion_summary());
    }
}

fn sleep_history(
    app: &App,
    limit: Option<usize>,
    month: Option<&str>,
    min_quality: Option<u8>,
) -> anyhow::Result<()> {
    let limit = limit.unwrap_or(app.config.history_limit);
    let entries: Vec<&SleepEntry> = match (month, min_quality) {
        (Some(month), _) => {
            let first = NaiveDate::parse_from_str(&format!("{month}-01"), DATE_FORMAT)
                .map_err(|_| anyhow::anyhow!("Invalid month '{month}', expected YYYY-MM"))?;
            app.journal
                .sleep_in_month(first.year(), first.month())
                .filter(|e| min_quality.is_none_or(|q| e.sleep_quality >= q))
                .collect()
        }
        (None, Some(q)) => app.journal.high_quality_sleep(q).collect(),
        (None, None) => app.journal.recent_sleep(limit).iter().collect(),
    };

    println!("\n--- SLEEP HISTORY ---");
    if entries.is_empty() {
        println!("No sleep data found.");
        return Ok(());
    }

    println!(
        "{:<12} {:<7} {:<7} {:<9} {:<8} {:<7}",
        "Date", "Bed", "Wake", "Duration", "Quality", "Dreams"
    );
    for entry in &entries[entries.len().saturating_sub(limit)..] {
        println!(
            "{:<12} {:<7} {:<7} {:<9} {:<8} {:<7}",
            entry.date,
            entry.bedtime,
            entry.wake_time,
            format!("{}h", entry.sleep_duration),
            format!("{}/10", entry.sleep_quality),
            if entry.had_dreams { "yes" } else { "no" }
        );
    }
    Ok(())
}

fn record_performance(app: &mut App, date: Option<String>) -> anyhow::Result<()> {
    println!("\n--- RECORD PERFORMANCE ---");
    let date = match date {
        Some(date) => resolve_date(Some(date))?,
        None => prompt_date("Date (YYYY-MM-DD, empty for today): ")?,
    };

    if app.journal.performance_on(&date).is_some()
        && !confirm(&format!("Performance entry for {date} exists. Replace it? (y/n): "))?
    {
        return Ok(());
    }

    let productivity = prompt_rating("Productivity (1-10): ")?;
    let mood = prompt_rating("Mood (1-10): ")?;
    let energy = prompt_rating("Energy level (1-10): ")?;
    let stress = prompt_rating("Stress level (1-10): ")?;
    let activities = prompt("Main activities of the day: ")?;
    let notes = prompt("Additional notes (optional): ")?;

    let entry = PerformanceEntry::new(date, productivity, mood, energy, stress)
        .with_notes(activities, notes);
    let score = entry.overall_score;
    app.journal.record_performance(entry);
    app.save()?;
    println!("\nPerformance recorded! Overall score: {score}/10");
    Ok(())
}

fn performance_history(app: &App, limit: Option<usize>) {
    let entries = app
        .journal
        .recent_performance(limit.unwrap_or(app.config.history_limit));

    println!("\n--- PERFORMANCE HISTORY ---");
    if entries.is_empty() {
        println!("No performance data found.");
        return;
    }

    println!(
        "{:<12} {:<6} {:<6} {:<7} {:<7} {:<8} {:<20}",
        "Date", "Prod", "Mood", "Energy", "Stress", "Overall", "Activities"
    );
    for entry in entries {
        println!(
            "{:<12} {:<6} {:<6} {:<7} {:<7} {:<8} {:<20}",
            entry.date,
            entry.productivity,
            entry.mood,
            entry.energy_level,
            entry.stress_level,
            entry.overall_score,
            entry.activities
        );
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

fn full_report(app: &App, save: bool) -> anyhow::Result<()> {
    let composer = ReportComposer::now();
    let report = timed("report", || composer.compose(&app.journal));
    println!("{report}");
    if save {
        let path = app.store.save_report(&report, Local::now().naive_local())?;
        println!("\nReport saved to {}", path.display());
    }
    Ok(())
}

fn weekly_summary(app: &App, weeks: u32) -> anyhow::Result<()> {
    let summary = ReportComposer::now().weekly_summary(&app.journal, weeks)?;
    println!("{summary}");
    Ok(())
}

fn show_correlations(app: &App) {
    println!("\n--- SLEEP-PERFORMANCE CORRELATIONS ---");
    let correlation = timed("correlation", || {
        stats::correlate(app.journal.sleep(), app.journal.performance())
    });
    match correlation {
        Correlation::InsufficientData { matched_days } => {
            println!("Insufficient data for correlation analysis.");
            println!(
                "Matched days: {matched_days} (need at least {})",
                stats::MIN_CORRELATION_DAYS
            );
        }
        Correlation::Report(report) => {
            println!("Matched days: {}", report.matched_days);
            let findings = report.findings();
            if findings.is_empty() {
                println!("No sleep-quality or dream groups to compare yet.");
            }
            for finding in findings {
                println!("- {finding}");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Dreams
// ---------------------------------------------------------------------------

fn analyze_dreams(app: &App, window: &Window) {
    let patterns = timed("dream patterns", || {
        patterns::analyze(app.journal.sleep(), window)
    });
    let Some(patterns) = patterns else {
        println!("No dream descriptions found in this period.");
        return;
    };

    println!("\n--- DREAM PATTERNS ({}) ---", patterns.analysis_period);
    println!("Dream nights analysed: {}", patterns.total_dream_nights);

    println!("\nMost common themes:");
    for tc in &patterns.most_common_themes {
        println!(
            "  {:<16} {:>3} ({:.1}%)",
            tc.theme,
            tc.count,
            patterns.share_of_nights(tc.count)
        );
    }

    if !patterns.recurring_themes.is_empty() {
        println!("\nRecurring themes:");
        for rt in &patterns.recurring_themes {
            println!("  {:<16} {:>3} ({:.1}% of nights)", rt.theme, rt.count, rt.percentage);
        }
    }

    if !patterns.emotion_correlation.is_empty() {
        println!("\nEmotion and theme links:");
        for (emotion, link) in &patterns.emotion_correlation {
            println!(
                "  {:<12} -> {} ({} of {})",
                emotion, link.most_common_theme, link.frequency, link.total_occurrences
            );
        }
    }

    let recommendations = patterns::theme_recommendations(&patterns);
    if !recommendations.is_empty() {
        println!("\nRecommendations:");
        for (i, rec) in recommendations.iter().enumerate() {
            println!("{}. {}", i + 1, rec.recommendation);
            println!("   {}", rec.insight);
        }
    }
}

fn dream_insights(app: &App) {
    if app.journal.dream_entries().next().is_none() {
        println!("No dreams found in your data. Start recording dreams to see analysis!");
        return;
    }
    println!("{}", report::dream_insights(app.journal.sleep()));
    dream_timeline(app, 5);
}

fn dream_timeline(app: &App, limit: usize) {
    match patterns::analyze(app.journal.sleep(), &Window::All) {
        Some(patterns) => println!("\n{}", report::timeline(&patterns, limit)),
        None => println!("No dream descriptions to place on a timeline."),
    }
}

fn list_themes() {
    println!("\n--- DREAM THEMES ---");
    for (i, theme) in catalog::THEMES.iter().enumerate() {
        println!("{:>2}. {:<16} {}", i + 1, theme.name, theme.keywords.join(", "));
    }
}

fn explore_theme(app: &App, theme: &str) -> anyhow::Result<()> {
    let matches = patterns::search_by_theme(app.journal.sleep(), theme)?;
    let theme = catalog::find(theme).ok_or_else(|| anyhow::anyhow!("Theme not found"))?;

    if matches.is_empty() {
        println!("\nNo dreams found with the '{}' theme.", theme.name);
    } else {
        println!("\nDreams with the '{}' theme ({} found):", theme.name, matches.len());
        print_dream_matches(&matches[matches.len().saturating_sub(5)..]);
    }

    println!("\nMeaning: {}", theme.interpretation);
    println!("Tips:");
    for (i, tip) in theme.tips.iter().enumerate() {
        println!("  {}. {tip}", i + 1);
    }
    Ok(())
}

fn print_dream_matches(entries: &[&SleepEntry]) {
    if entries.is_empty() {
        println!("No matching dreams found.");
        return;
    }
    println!("{}", "=".repeat(60));
    for entry in entries {
        let content: String = entry.dream_content.chars().take(100).collect();
        let ellipsis = if entry.dream_content.chars().count() > 100 { "..." } else { "" };
        println!("Date: {}", entry.date);
        println!("Content: {content}{ellipsis}");
        println!("Emotions: {}", entry.emotion_summary());
        println!("Sleep quality: {}/10", entry.sleep_quality);
        println!("{}", "-".repeat(40));
    }
}

fn dream_statistics(app: &App) -> anyhow::Result<()> {
    let sleep = app.journal.sleep();
    let Some(dream_stats) = stats::dream_statistics(sleep).filter(|s| s.dream_nights > 0) else {
        println!("No dream data available for statistics.");
        return Ok(());
    };

    println!("\n--- DREAM STATISTICS ---");
    println!("Total nights tracked: {}", dream_stats.total_nights);
    println!("Nights with dreams: {}", dream_stats.dream_nights);
    println!("Dream frequency: {}%", dream_stats.dream_frequency);
    println!("Average dream length: {} words", dream_stats.average_dream_length_words);

    println!("\nSleep quality with dreams: {}/10", dream_stats.avg_sleep_quality_with_dreams);
    println!("Sleep quality without dreams: {}/10", dream_stats.avg_sleep_quality_without_dreams);

    if !dream_stats.most_common_emotions.is_empty() {
        println!("\nMost common dream emotions:");
        println!("{}", report::chart(&dream_stats.most_common_emotions, report::CHART_WIDTH));
    }
    println!(
        "Emotions recorded: {} ({} unique)",
        dream_stats.total_emotions_recorded, dream_stats.unique_emotions
    );

    let recent = &sleep[sleep.len().saturating_sub(RECENT_DREAM_NIGHTS)..];
    let recent_quality: Vec<f64> = recent
        .iter()
        .filter(|e| e.had_dreams)
        .map(|e| f64::from(e.sleep_quality))
        .collect();
    if recent_quality.len() >= 3 {
        let summary = stats::summarize(&recent_quality);
        println!("\nRecent dream nights (last {RECENT_DREAM_NIGHTS} entries): {}", summary.count);
        println!("Average sleep quality: {}/10, trend: {}", summary.average, summary.trend);
    }

    let windows = patterns::sliding_windows(sleep, ROLLING_WINDOW)?;
    if !windows.is_empty() {
        println!("\nRolling {ROLLING_WINDOW}-dream quality:");
        for window in windows.iter().rev().take(5).rev() {
            let avg = window.iter().map(|e| f64::from(e.sleep_quality)).sum::<f64>() / window.len() as f64;
            let (first, last) = (window[0].date.as_str(), window[window.len() - 1].date.as_str());
            println!("  {first} .. {last}: {avg:.1}/10");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Data management
// ---------------------------------------------------------------------------

fn backup(app: &App) -> anyhow::Result<()> {
    let copies = app.store.create_backup(Local::now().naive_local())?;
    if copies.is_empty() {
        println!("Nothing to back up yet.");
    } else {
        println!("Data backup created:");
        for path in copies {
            println!("  {}", path.display());
        }
    }
    Ok(())
}

fn status(app: &App) -> anyhow::Result<()> {
    let data = app.store.data_statistics()?;
    println!("\n--- DATA STATUS ---");
    println!("Data directory: {}", app.store.data_dir().display());
    println!("Sleep entries: {} ({} bytes)", data.sleep_entries, data.sleep_file_size);
    println!(
        "Performance entries: {} ({} bytes)",
        data.performance_entries, data.performance_file_size
    );
    println!(
        "Last backup: {}",
        data.last_backup
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "Never".to_string())
    );
    println!("Analysis window: {} days", app.config.analysis_window_days);
    Ok(())
}

fn export_tables(app: &App) -> anyhow::Result<()> {
    let (sleep_path, performance_path) = app.store.export_tables(&app.journal)?;
    println!("Exported {}", sleep_path.display());
    println!("Exported {}", performance_path.display());
    Ok(())
}

fn import_tables(app: &mut App) -> anyhow::Result<()> {
    let (sleep, performance) = app.store.import_tables()?;
    let mut outcomes = Vec::with_capacity(sleep.len() + performance.len());
    for entry in sleep {
        outcomes.push(app.journal.record_sleep(entry));
    }
    for entry in performance {
        outcomes.push(app.journal.record_performance(entry));
    }
    let added = outcomes.iter().filter(|o| **o == Recorded::Added).count();
    let replaced = outcomes.len() - added;
    app.save()?;
    info!(added, replaced, "tables imported");
    println!("Imported {added} new and {replaced} updated entries.");
    Ok(())
}

// ---------------------------------------------------------------------------
// Interactive menu
// ---------------------------------------------------------------------------

const MENU: &[&str] = &[
    "Record sleep",
    "Record performance",
    "Sleep history",
    "Performance history",
    "Full report",
    "Correlations",
    "Dream insights",
    "Dream theme explorer",
    "Search dreams",
    "Dream statistics",
    "Backup data",
    "Exit",
];

fn run_menu(app: &mut App) -> anyhow::Result<()> {
    loop {
        clear_screen()?;
        println!("=== SLEEP ANALYTICS ===");
        for (i, item) in MENU.iter().enumerate() {
            println!("{:>2}. {item}", i + 1);
        }

        let choice = prompt(&format!("\nEnter your choice (1-{}): ", MENU.len()))?;
        let result = match choice.parse::<usize>() {
            Ok(1) => record_sleep(app, None),
            Ok(2) => record_performance(app, None),
            Ok(3) => sleep_history(app, None, None, None),
            Ok(4) => {
                performance_history(app, None);
                Ok(())
            }
            Ok(5) => full_report(app, true),
            Ok(6) => {
                show_correlations(app);
                Ok(())
            }
            Ok(7) => {
                dream_insights(app);
                Ok(())
            }
            Ok(8) => menu_explore(app),
            Ok(9) => menu_search(app),
            Ok(10) => dream_statistics(app),
            Ok(11) => backup(app),
            Ok(12) => {
                println!("Goodbye!");
                return Ok(());
            }
            _ => {
                println!("Invalid choice.");
                Ok(())
            }
        };
        if let Err(e) = result {
            println!("Error: {e}");
        }
        wait_for_keypress()?;
    }
}

fn menu_explore(app: &App) -> anyhow::Result<()> {
    list_themes();
    let choice = prompt("\nTheme number to explore: ")?;
    let theme = choice
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| catalog::THEMES.get(i))
        .ok_or_else(|| anyhow::anyhow!("No theme numbered '{choice}'"))?;
    explore_theme(app, theme.name)
}

fn menu_search(app: &App) -> anyhow::Result<()> {
    println!("1. By keyword");
    println!("2. By emotion");
    println!("3. By minimum sleep quality");
    println!("4. By date range");
    let sleep = app.journal.sleep();
    let found: Vec<&SleepEntry> = match prompt("Search type (1-4): ")?.as_str() {
        "1" => DreamFilter {
            keywords: vec![prompt("Keyword: ")?],
            ..Default::default()
        }
        .apply(sleep),
        "2" => patterns::with_emotion(sleep, &prompt("Emotion: ")?).collect(),
        "3" => DreamFilter {
            min_quality: Some(prompt_rating("Minimum sleep quality (1-10): ")?),
            ..Default::default()
        }
        .apply(sleep),
        "4" => DreamFilter {
            from_date: Some(prompt_date("Start date (YYYY-MM-DD): ")?),
            to_date: Some(prompt_date("End date (YYYY-MM-DD): ")?),
            ..Default::default()
        }
        .apply(sleep),
        other => anyhow::bail!("Unknown search type '{other}'"),
    };
    print_dream_matches(&found);
    Ok(())
}
