use std::fmt;
use std::path::{Path, PathBuf};

use portal_core::model::{ActivityId, ExamId, LessonId, LessonLevel, UserId};
use services::LevelFilter;

pub const DEFAULT_DB_URL: &str = "sqlite://ay-portal.sqlite3";
const DEFAULT_HISTORY_LIMIT: u32 = 20;

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingCommand,
    UnknownCommand(String),
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidLevel { raw: String },
    InvalidAnswers { raw: String },
    InvalidLimit { raw: String },
    InvalidId { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingCommand => write!(f, "a command is required"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidLevel { raw } => {
                write!(f, "invalid --level value (all, junior, senior): {raw}")
            }
            ArgsError::InvalidAnswers { raw } => {
                write!(f, "invalid --answers value (expected e.g. 3,2): {raw}")
            }
            ArgsError::InvalidLimit { raw } => write!(f, "invalid --limit value: {raw}"),
            ArgsError::InvalidId { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dashboard,
    Lessons { level: LevelFilter },
    Complete { lesson: LessonId },
    Activities,
    Register { activity: ActivityId },
    Exams,
    /// `answers` holds 0-based option indices; `None` runs interactively.
    Exam {
        exam: ExamId,
        answers: Option<Vec<usize>>,
    },
    History { limit: u32 },
    /// Empty question opens an interactive chat.
    Ask { question: String },
    SignIn { user: UserId },
    SignOut,
    Admin,
    Seed,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub db_url: String,
    pub command: Command,
}

impl Args {
    /// Parse `argv` (without the program name). `env_db` is `AY_DB_URL`.
    pub fn parse(
        argv: impl IntoIterator<Item = String>,
        env_db: Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env_db
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| DEFAULT_DB_URL.to_owned(), normalize_sqlite_url);

        // `--db` may appear anywhere; pull it out before command parsing.
        let mut rest = Vec::new();
        let mut iter = argv.into_iter();
        while let Some(arg) = iter.next() {
            if arg == "--db" {
                let value = require_value(&mut iter, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                db_url = normalize_sqlite_url(value);
            } else {
                rest.push(arg);
            }
        }

        let mut rest = rest.into_iter();
        let name = rest.next().ok_or(ArgsError::MissingCommand)?;
        let command = match name.as_str() {
            "dashboard" => no_flags(rest, Command::Dashboard)?,
            "lessons" => parse_lessons(rest)?,
            "complete" => Command::Complete {
                lesson: required_id(rest, "--lesson")?,
            },
            "activities" => no_flags(rest, Command::Activities)?,
            "register" => Command::Register {
                activity: required_id(rest, "--activity")?,
            },
            "exams" => no_flags(rest, Command::Exams)?,
            "exam" => parse_exam(rest)?,
            "history" => parse_history(rest)?,
            "ask" => Command::Ask {
                question: rest.collect::<Vec<_>>().join(" ").trim().to_owned(),
            },
            "sign-in" => Command::SignIn {
                user: required_id(rest, "--user")?,
            },
            "sign-out" => no_flags(rest, Command::SignOut)?,
            "admin" => no_flags(rest, Command::Admin)?,
            "seed" => no_flags(rest, Command::Seed)?,
            "help" | "--help" | "-h" => Command::Help,
            _ => return Err(ArgsError::UnknownCommand(name)),
        };

        Ok(Self { db_url, command })
    }
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn no_flags(mut args: impl Iterator<Item = String>, command: Command) -> Result<Command, ArgsError> {
    match args.next() {
        Some(arg) => Err(ArgsError::UnknownArg(arg)),
        None => Ok(command),
    }
}

fn required_id<T: std::str::FromStr>(
    mut args: impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ArgsError> {
    let mut id = None;
    while let Some(arg) = args.next() {
        if arg == flag {
            let value = require_value(&mut args, flag)?;
            id = Some(
                value
                    .parse()
                    .map_err(|_| ArgsError::InvalidId { flag, raw: value })?,
            );
        } else {
            return Err(ArgsError::UnknownArg(arg));
        }
    }
    id.ok_or(ArgsError::MissingFlag { flag })
}

fn parse_lessons(mut args: impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut level = LevelFilter::All;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--level" => {
                let value = require_value(&mut args, "--level")?;
                level = parse_level(&value)?;
            }
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::Lessons { level })
}

fn parse_level(raw: &str) -> Result<LevelFilter, ArgsError> {
    if raw.trim().eq_ignore_ascii_case("all") {
        return Ok(LevelFilter::All);
    }
    raw.parse::<LessonLevel>()
        .map(LevelFilter::Only)
        .map_err(|_| ArgsError::InvalidLevel { raw: raw.to_owned() })
}

fn parse_exam(mut args: impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut exam = None;
    let mut answers = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--exam" => {
                let value = require_value(&mut args, "--exam")?;
                exam = Some(value.parse::<ExamId>().map_err(|_| ArgsError::InvalidId {
                    flag: "--exam",
                    raw: value,
                })?);
            }
            "--answers" => {
                let value = require_value(&mut args, "--answers")?;
                answers = Some(parse_answers(&value)?);
            }
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::Exam {
        exam: exam.ok_or(ArgsError::MissingFlag { flag: "--exam" })?,
        answers,
    })
}

/// `"3,2"` (1-based, as shown on screen) to `[2, 1]`.
fn parse_answers(raw: &str) -> Result<Vec<usize>, ArgsError> {
    let invalid = || ArgsError::InvalidAnswers { raw: raw.to_owned() };
    raw.split(',')
        .map(|part| {
            let n: usize = part.trim().parse().map_err(|_| invalid())?;
            n.checked_sub(1).ok_or_else(invalid)
        })
        .collect()
}

fn parse_history(mut args: impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut limit = DEFAULT_HISTORY_LIMIT;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--limit" => {
                let value = require_value(&mut args, "--limit")?;
                limit = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidLimit { raw: value })?;
            }
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::History { limit })
}

pub fn normalize_sqlite_url(raw: String) -> String {
    let trimmed = raw.trim().to_owned();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed;
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(&trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Make sure the database file and its directory exist before connecting.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_owned(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_owned(),
        }
        .into());
    }

    let path = Path::new(path);
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

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(args.iter().map(|s| (*s).to_owned()), None)
    }

    #[test]
    fn db_flag_is_accepted_anywhere() {
        let args = parse(&["exams", "--db", "sqlite::memory:"]).unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.command, Command::Exams);

        let args = parse(&["--db", "sqlite:///tmp/ay.db", "admin"]).unwrap();
        assert_eq!(args.db_url, "sqlite:///tmp/ay.db");
        assert_eq!(args.command, Command::Admin);
    }

    #[test]
    fn env_db_is_overridden_by_flag() {
        let args = Args::parse(
            ["sign-out".to_owned()],
            Some("sqlite::memory:".to_owned()),
        )
        .unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(parse(&["sign-out"]).unwrap().db_url, DEFAULT_DB_URL);
    }

    #[test]
    fn exam_answers_are_one_based_on_the_command_line() {
        let args = parse(&["exam", "--exam", "e1", "--answers", "3, 2"]).unwrap();
        assert_eq!(
            args.command,
            Command::Exam {
                exam: ExamId::new("e1"),
                answers: Some(vec![2, 1]),
            }
        );
        assert!(matches!(
            parse(&["exam", "--exam", "e1", "--answers", "0,1"]),
            Err(ArgsError::InvalidAnswers { .. })
        ));
        assert_eq!(
            parse(&["exam"]).unwrap_err(),
            ArgsError::MissingFlag { flag: "--exam" }
        );
    }

    #[test]
    fn lesson_level_filter() {
        let args = parse(&["lessons", "--level", "Junior"]).unwrap();
        assert_eq!(
            args.command,
            Command::Lessons {
                level: LevelFilter::Only(LessonLevel::Junior)
            }
        );
        assert!(matches!(
            parse(&["lessons", "--level", "master"]),
            Err(ArgsError::InvalidLevel { .. })
        ));
    }

    #[test]
    fn ask_joins_words() {
        let args = parse(&["ask", "Who", "was", "Joseph", "Bates?"]).unwrap();
        assert_eq!(
            args.command,
            Command::Ask {
                question: "Who was Joseph Bates?".into()
            }
        );
    }

    #[test]
    fn unknown_input_is_reported() {
        assert_eq!(parse(&[]).unwrap_err(), ArgsError::MissingCommand);
        assert!(matches!(
            parse(&["grade"]),
            Err(ArgsError::UnknownCommand(_))
        ));
        assert!(matches!(
            parse(&["admin", "--verbose"]),
            Err(ArgsError::UnknownArg(_))
        ));
        assert_eq!(
            parse(&["register"]).unwrap_err(),
            ArgsError::MissingFlag { flag: "--activity" }
        );
    }
}
