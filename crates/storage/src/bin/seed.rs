use std::fmt;

use chrono::{DateTime, Duration, Utc};
use journey_core::day::EndOfDay;
use journey_core::model::{builtin_templates, default_metrics, DailyProgress, ProgressId};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    completed_days: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidDays { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidDays { raw } => write!(f, "invalid --completed-days value: {raw}"),
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("JOURNEY_DB_URL").unwrap_or_else(|_| "sqlite:journey.sqlite3".into());
        let mut completed_days = std::env::var("JOURNEY_SEED_DAYS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(2);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--completed-days" => {
                    let value = require_value(&mut args, "--completed-days")?;
                    completed_days = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidDays { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?;
                    now = Some(parsed.with_timezone(&Utc));
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            completed_days,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:journey.sqlite3)");
    eprintln!("  --completed-days <n>      Days of progress to mark complete (default: 2)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  JOURNEY_DB_URL, JOURNEY_SEED_DAYS");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let templates = builtin_templates(now)?;
    for template in &templates {
        storage.templates.upsert_template(template).await?;
    }

    for metric in default_metrics(now)? {
        storage.metrics.upsert_metric(&metric).await?;
    }

    // A program started far enough back that the requested number of days
    // can already be complete.
    let start = now.date_naive() - Duration::days(i64::from(args.completed_days));
    let program = templates[0].instantiate(start, EndOfDay::default(), None)?;
    storage.programs.save_program(&program).await?;

    for offset in 0..args.completed_days {
        let date = start + Duration::days(i64::from(offset));
        let mut progress = DailyProgress::new(ProgressId::new(), date);
        for task in program.tasks() {
            progress.toggle(task.id());
        }
        storage.daily_progress.upsert_progress(&progress).await?;
    }

    println!(
        "Seeded {} templates, a {}-day program starting {}, and {} completed days into {}",
        templates.len(),
        program.number_of_days(),
        program.start_date(),
        args.completed_days,
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
