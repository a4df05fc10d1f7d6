use std::fmt;

use chrono::{DateTime, Utc};
use journey_core::day::DayStatus;
use services::{AppServices, ChecklistError, Clock};
use storage::repository::Storage;
use tracing::debug;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct Args {
    db_url: String,
    /// Simulated current time, for test automation.
    now: Option<DateTime<Utc>>,
    /// Reset-state flag: clear the program and every daily record, then
    /// exit.
    reset: bool,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>   SQLite URL (default: sqlite:journey.sqlite3)");
    eprintln!("  --now <rfc3339>     Simulated current time (test automation)");
    eprintln!("  --reset             Clear the program and all progress, then exit");
    eprintln!("  -h, --help          Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  JOURNEY_DB_URL");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("JOURNEY_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://journey.sqlite3".into(), normalize_sqlite_url);
        let mut now = None;
        let mut reset = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--now" => {
                    let value = require_value(args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?;
                    now = Some(parsed.with_timezone(&Utc));
                }
                "--reset" => reset = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, now, reset })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn print_checklist(app: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let view = match app.checklist().today_view().await {
        Ok(view) => view,
        Err(ChecklistError::NoProgram) => {
            // Absence is the setup flow, not an error.
            println!("No saved program. Create one to start tracking.");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    println!("DAY {} OF {}  ({})", view.day_number, view.total_days, view.date);
    for row in &view.rows {
        let mark = if row.completed { "x" } else { " " };
        match &row.description {
            Some(desc) => println!("  [{mark}] {} - {desc}", row.title),
            None => println!("  [{mark}] {}", row.title),
        }
    }

    let streak = app.checklist().current_streak().await?;
    if streak > 0 {
        println!("Streak: {streak} day{}", if streak == 1 { "" } else { "s" });
    }

    if let Some(missed) = app.checklist().refresh_missed_day_marker().await? {
        println!("Missed day: {missed}. Not all tasks were completed before the end of day.");
    } else if view.after_cutoff && !view.is_complete {
        println!("The end of day has passed with tasks still open.");
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so
    // core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;

    let clock = match args.now {
        Some(at) => Clock::fixed(at),
        None => Clock::default_clock(),
    };
    debug!(db = %args.db_url, fixed_clock = clock.is_fixed(), "starting");

    let storage = Storage::sqlite(&args.db_url).await?;
    let app = AppServices::new(&storage, clock).await?;

    if args.reset {
        app.programs().reset().await?;
        println!("State cleared.");
        return Ok(());
    }

    print_checklist(&app).await?;

    // The calendar line: a compact count of how the program has gone so
    // far, matching what the calendar screen summarizes.
    if let Ok(overview) = app.checklist().day_overview().await {
        let complete = overview
            .iter()
            .filter(|d| d.status == DayStatus::Complete)
            .count();
        let missed = overview
            .iter()
            .filter(|d| d.status == DayStatus::Missed)
            .count();
        println!("Progress: {complete} complete, {missed} missed");
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
