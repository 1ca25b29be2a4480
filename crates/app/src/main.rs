use std::fmt;
use std::path::{Path, PathBuf};

use kidsafe_core::model::{GameId, LevelId, LevelProgress, QuizId, QuizResult};
use services::{AppServices, Clock, GameResult, RecordOutcome};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { what: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
    InvalidId { raw: String },
    InvalidDbUrl { raw: String },
    TooManyCorrect { correct: u32, total: u32 },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { what } => write!(f, "missing {what}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidId { raw } => write!(f, "invalid id: {raw:?}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::TooManyCorrect { correct, total } => {
                write!(f, "--correct {correct} is more than --total {total}")
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

fn parse_number(raw: String, flag: &'static str) -> Result<u32, ArgsError> {
    raw.parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn parse_id<T: std::str::FromStr>(raw: String) -> Result<T, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidId { raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app [--db <sqlite_url>] [--verbose] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  status                                   overall progress (default)");
    eprintln!("  badges                                   every badge with its progress");
    eprintln!("  game <id> --score <n> [--completed] [--level <id>] [--minutes <m>]");
    eprintln!("  quiz <id> --correct <n> --total <n> [--bonus <n>]");
    eprintln!("  time <minutes>                           add adventure time");
    eprintln!("  reset                                    wipe all progress");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://kidsafe.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  KIDSAFE_DB_URL, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Status,
    Badges,
    Game {
        id: GameId,
        score: u32,
        completed: bool,
        level: Option<LevelId>,
        minutes: u32,
    },
    Quiz {
        id: QuizId,
        correct: u32,
        total: u32,
        bonus: u32,
    },
    Time {
        minutes: u32,
    },
    Reset,
}

#[derive(Debug)]
struct Args {
    db_url: String,
    verbose: bool,
    command: Command,
}

impl Args {
    fn parse(argv: Vec<String>) -> Result<Option<Self>, ArgsError> {
        let mut db_url = std::env::var("KIDSAFE_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://kidsafe.sqlite3".into(), normalize_sqlite_url);
        let mut verbose = false;
        let mut rest = Vec::new();

        let mut args = argv.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" => return Ok(None),
                _ => rest.push(arg),
            }
        }

        let mut rest = rest.into_iter();
        let command = match rest.next().as_deref() {
            None | Some("status") => Command::Status,
            Some("badges") => Command::Badges,
            Some("reset") => Command::Reset,
            Some("time") => {
                let raw = rest
                    .next()
                    .ok_or(ArgsError::MissingArgument { what: "minutes" })?;
                Command::Time {
                    minutes: parse_number(raw, "minutes")?,
                }
            }
            Some("game") => Self::parse_game(&mut rest)?,
            Some("quiz") => Self::parse_quiz(&mut rest)?,
            Some(other) => return Err(ArgsError::UnknownArg(other.to_string())),
        };

        if let Some(extra) = rest.next() {
            return Err(ArgsError::UnknownArg(extra));
        }

        Ok(Some(Self {
            db_url,
            verbose,
            command,
        }))
    }

    fn parse_game(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
        let id = parse_id(
            args.next()
                .ok_or(ArgsError::MissingArgument { what: "game id" })?,
        )?;
        let mut score = None;
        let mut completed = false;
        let mut level = None;
        let mut minutes = 0;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--score" => score = Some(parse_number(require_value(args, "--score")?, "--score")?),
                "--completed" => completed = true,
                "--level" => level = Some(parse_id(require_value(args, "--level")?)?),
                "--minutes" => {
                    minutes = parse_number(require_value(args, "--minutes")?, "--minutes")?;
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Command::Game {
            id,
            score: score.ok_or(ArgsError::MissingValue { flag: "--score" })?,
            completed,
            level,
            minutes,
        })
    }

    fn parse_quiz(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
        let id = parse_id(
            args.next()
                .ok_or(ArgsError::MissingArgument { what: "quiz id" })?,
        )?;
        let mut correct = None;
        let mut total = None;
        let mut bonus = 0;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--correct" => {
                    correct = Some(parse_number(require_value(args, "--correct")?, "--correct")?);
                }
                "--total" => total = Some(parse_number(require_value(args, "--total")?, "--total")?),
                "--bonus" => bonus = parse_number(require_value(args, "--bonus")?, "--bonus")?,
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let correct = correct.ok_or(ArgsError::MissingValue { flag: "--correct" })?;
        let total = total.ok_or(ArgsError::MissingValue { flag: "--total" })?;
        if correct > total {
            return Err(ArgsError::TooManyCorrect { correct, total });
        }

        Ok(Command::Quiz {
            id,
            correct,
            total,
            bonus,
        })
    }
}

/// Turn a bare or relative path into an absolute `sqlite://` URL.
fn normalize_sqlite_url(raw: String) -> String {
    let raw = raw.trim();
    let already_url = ["sqlite://", "sqlite::memory:", "sqlite:file:"]
        .iter()
        .any(|prefix| raw.starts_with(prefix));
    if already_url {
        return raw.to_string();
    }
    let path = PathBuf::from(raw.strip_prefix("sqlite:").unwrap_or(raw));
    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    };
    format!("sqlite://{}", path.display())
}

/// File behind a `sqlite://` URL; `None` for in-memory databases.
fn database_file(db_url: &str) -> Option<&Path> {
    let rest = db_url.strip_prefix("sqlite://")?;
    let path = rest.split('?').next().unwrap_or(rest);
    (!path.is_empty()).then(|| Path::new(path))
}

/// `SQLite` creates the file but not missing directories above it.
fn ensure_database_dir(db_url: &str) -> std::io::Result<()> {
    match database_file(db_url).and_then(Path::parent) {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn report(outcome: &RecordOutcome) {
    if !outcome.status.is_persisted() {
        println!("warning: progress could not be saved");
    }
    for badge in &outcome.unlocked_badges {
        println!("new badge unlocked: {badge}");
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let Some(args) = Args::parse(argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?
    else {
        print_usage();
        return Ok(());
    };

    init_logging(args.verbose);

    ensure_database_dir(&args.db_url)?;
    tracing::debug!(db = %args.db_url, "opening progress database");
    let app = AppServices::new_sqlite(&args.db_url, Clock::default_clock()).await?;
    let store = app.progress_store();

    match args.command {
        Command::Status => {
            let progress = store.get_user_progress().await;
            println!("overall progress: {}%", progress.overall_percentage());
            println!("adventure time:   {} min", progress.adventure_time);
            println!(
                "games completed:  {}/{}",
                progress.games.values().filter(|g| g.completed).count(),
                progress.games.len()
            );
            println!(
                "quizzes done:     {}/{}",
                progress.quizzes.values().filter(|q| q.completed).count(),
                progress.quizzes.len()
            );
            println!(
                "badges unlocked:  {}/{}",
                progress.badges.values().filter(|b| b.unlocked).count(),
                progress.badges.len()
            );
        }
        Command::Badges => {
            for status in app.badges().badge_statuses().await {
                let mark = if status.unlocked { "x" } else { " " };
                let level = status
                    .badge
                    .level
                    .map_or("", |level| level.display_name());
                println!(
                    "[{mark}] {:<26} {:>3}%  {:<6} {}",
                    status.badge.title, status.progress, level, status.badge.description
                );
            }
        }
        Command::Game {
            id,
            score,
            completed,
            level,
            minutes,
        } => {
            let mut result = GameResult::new(score, completed).with_minutes(minutes);
            if let Some(level_id) = level {
                result = result.with_level(
                    level_id,
                    LevelProgress {
                        completed,
                        score,
                        ..LevelProgress::default()
                    },
                );
            }
            let outcome = app.games().record_game_result(&id, result).await;
            report(&outcome);
        }
        Command::Quiz {
            id,
            correct,
            total,
            bonus,
        } => {
            let result = QuizResult::from_counts(correct, total, bonus);
            println!(
                "score {} (base {}), {}",
                result.score,
                result.base_score,
                if result.passed { "passed" } else { "not passed" }
            );
            let outcome = app.quizzes().save_quiz_result(&id, &result).await;
            report(&outcome);
        }
        Command::Time { minutes } => {
            if !store.update_adventure_time(minutes).await.is_persisted() {
                println!("warning: progress could not be saved");
            }
        }
        Command::Reset => {
            if store.reset_user_progress().await.is_persisted() {
                println!("progress reset");
            } else {
                println!("warning: progress could not be reset");
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn defaults_to_status() {
        let args = Args::parse(argv(&["--db", "sqlite::memory:"])).unwrap().unwrap();
        assert_eq!(args.command, Command::Status);
        assert_eq!(args.db_url, "sqlite::memory:");
        assert!(!args.verbose);
    }

    #[test]
    fn parses_game_command() {
        let args = Args::parse(argv(&[
            "game",
            "password-hero",
            "--score",
            "500",
            "--completed",
            "--minutes",
            "7",
            "-v",
        ]))
        .unwrap()
        .unwrap();
        assert!(args.verbose);
        assert_eq!(
            args.command,
            Command::Game {
                id: GameId::new("password-hero"),
                score: 500,
                completed: true,
                level: None,
                minutes: 7,
            }
        );
    }

    #[test]
    fn quiz_requires_counts() {
        let err = Args::parse(argv(&["quiz", "ai-ethics", "--correct", "3"])).unwrap_err();
        assert!(matches!(err, ArgsError::MissingValue { flag: "--total" }));
    }

    #[test]
    fn quiz_rejects_more_correct_than_total() {
        let err = Args::parse(argv(&["quiz", "ai-ethics", "--correct", "12", "--total", "10"]))
            .unwrap_err();
        assert!(matches!(
            err,
            ArgsError::TooManyCorrect {
                correct: 12,
                total: 10
            }
        ));

        let args = Args::parse(argv(&["quiz", "ai-ethics", "--correct", "10", "--total", "10"]))
            .unwrap()
            .unwrap();
        assert!(matches!(args.command, Command::Quiz { correct: 10, total: 10, .. }));
    }

    #[test]
    fn rejects_bad_numbers_and_unknown_commands() {
        assert!(matches!(
            Args::parse(argv(&["time", "-5"])),
            Err(ArgsError::InvalidNumber { .. })
        ));
        assert!(matches!(
            Args::parse(argv(&["dance"])),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn relative_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("data/kidsafe.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/kidsafe.sqlite3"));
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
    }

    #[test]
    fn in_memory_urls_have_no_file() {
        assert_eq!(database_file("sqlite::memory:"), None);
        assert_eq!(
            database_file("sqlite:///tmp/kidsafe.sqlite3?mode=rwc"),
            Some(Path::new("/tmp/kidsafe.sqlite3"))
        );
    }

    #[test]
    fn help_short_circuits() {
        assert!(Args::parse(argv(&["--help"])).unwrap().is_none());
    }
}
