use std::io::{self, BufRead, Write};

use portal_core::{Advance, ExamEngine};
use services::{AppServices, Clock, Conversation, MentorConfig, QuestionView};
use tracing_subscriber::EnvFilter;

mod args;
mod render;

use args::{Args, Command, prepare_sqlite_file};

fn print_usage() {
    eprintln!("Usage: ay-portal [--db <sqlite_url>] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  dashboard");
    eprintln!("  lessons [--level all|junior|senior]");
    eprintln!("  complete --lesson <id>");
    eprintln!("  activities");
    eprintln!("  register --activity <id>");
    eprintln!("  exams");
    eprintln!("  exam --exam <id> [--answers 3,2]     # 1-based; interactive without --answers");
    eprintln!("  history [--limit <n>]");
    eprintln!("  ask [question...]                    # interactive chat without a question");
    eprintln!("  sign-in --user <id>");
    eprintln!("  sign-out");
    eprintln!("  admin");
    eprintln!("  seed");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  AY_DB_URL (default {})", args::DEFAULT_DB_URL);
    eprintln!("  AY_MENTOR_API_KEY, AY_MENTOR_BASE_URL, AY_MENTOR_MODEL");
    eprintln!("  RUST_LOG (default info)");
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .try_init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = Args::parse(std::env::args().skip(1), std::env::var("AY_DB_URL").ok())
        .map_err(|e| {
            eprintln!("{e}");
            print_usage();
            e
        })?;
    if parsed.command == Command::Help {
        print_usage();
        return Ok(());
    }

    prepare_sqlite_file(&parsed.db_url)?;
    let app =
        AppServices::new_sqlite(&parsed.db_url, Clock::default_clock(), MentorConfig::from_env())
            .await?;
    let profile = app.profile();
    let signed_in = profile.restore().await?;

    match parsed.command {
        Command::SignIn { user } => {
            let user = profile.sign_in(&user).await?;
            println!("Signed in as {} ({})", user.name(), user.role());
        }
        Command::SignOut => {
            profile.sign_out().await?;
            println!("Signed out.");
        }
        Command::Seed => {
            app.seed_demo().await?;
            println!("Demo data loaded; signed in as u1.");
        }
        Command::Admin => {
            let admin = app.admin();
            render::admin(&admin.overview().await?, &admin.members().await?);
        }
        Command::Exams => render::exams(&app.exams().list_exams()),
        Command::Ask { question } => {
            if question.is_empty() {
                chat(&app).await?;
            } else if let Some(answer) = app.mentor().ask(&question).await {
                println!("{answer}");
            }
        }
        command => {
            let user = match signed_in {
                Some(user) => user,
                None => profile.require_user().await?,
            };
            match command {
                Command::Dashboard => {
                    render::dashboard(&app.dashboard().snapshot(&user).await?);
                }
                Command::Lessons { level } => {
                    render::lessons(&app.lessons().list(user.id(), level).await?);
                }
                Command::Complete { lesson } => {
                    let done = app.lessons().complete_lesson(&lesson).await?;
                    if done.newly_completed {
                        println!("Lesson {lesson} completed. Progress: {}%", done.progress);
                    } else {
                        println!(
                            "Lesson {lesson} was already completed. Progress: {}%",
                            done.progress
                        );
                    }
                }
                Command::Activities => {
                    render::activities(&app.activities().list(user.id()).await?);
                }
                Command::Register { activity } => {
                    app.activities().register(user.id(), &activity).await?;
                    println!("Registered for {activity}.");
                }
                Command::Exam {
                    exam,
                    answers: Some(answers),
                } => {
                    let attempt = app
                        .exams()
                        .submit_answers(user.id().clone(), &exam, &answers)
                        .await?;
                    if let Some(outcome) = attempt.engine().outcome() {
                        render::outcome(&outcome);
                    }
                }
                Command::Exam {
                    exam,
                    answers: None,
                } => take_exam(&app, user.id().clone(), &exam).await?,
                Command::History { limit } => {
                    render::history(&app.exams().history(user.id(), limit).await?);
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn prompt(label: &str) -> io::Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

async fn take_exam(
    app: &AppServices,
    user_id: portal_core::model::UserId,
    exam_id: &portal_core::model::ExamId,
) -> Result<(), Box<dyn std::error::Error>> {
    let exams = app.exams();
    let mut attempt = exams.start_exam(user_id, exam_id)?;

    loop {
        if let Some(view) = QuestionView::from_engine(attempt.engine()) {
            render::question(&view);
            let label = if view.is_last {
                "Answer (1-n, q quits, Enter finishes): "
            } else {
                "Answer (1-n, q quits, Enter next): "
            };
            let Some(input) = prompt(label)? else {
                exams.abandon(attempt)?;
                return Ok(());
            };
            match input.as_str() {
                "q" => {
                    exams.abandon(attempt)?;
                    println!("Exam abandoned; nothing was recorded.");
                    return Ok(());
                }
                "" => {
                    if !view.can_advance {
                        println!("Pick an option first.");
                        continue;
                    }
                    if let Advance::Finished(outcome) = exams.advance(&mut attempt).await?.advance {
                        render::outcome(&outcome);
                    }
                }
                raw => match raw.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) {
                    Some(option) => {
                        if let Err(err) = exams.answer(&mut attempt, option) {
                            println!("{err}");
                        }
                    }
                    None => println!("Enter an option number."),
                },
            }
            continue;
        }

        if !offers_retry(attempt.engine()) {
            return Ok(());
        }
        match prompt("Retry this exam? [y/N] ")?.as_deref() {
            Some("y" | "Y") => exams.retry(&mut attempt)?,
            _ => return Ok(()),
        }
    }
}

/// Retry is only offered after a failed attempt.
fn offers_retry(engine: &ExamEngine) -> bool {
    engine.passed() == Some(false)
}

async fn chat(app: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let mentor = app.mentor();
    let mut conversation = Conversation::new();
    if let Some(greeting) = conversation.lines().first() {
        println!("{}", greeting.text);
    }
    if !mentor.enabled() {
        tracing::warn!("AY_MENTOR_API_KEY is not set; the mentor will not answer");
    }

    while let Some(question) = prompt("> ")? {
        if question.is_empty() {
            break;
        }
        if let Some(answer) = conversation.ask(&mentor, &question).await {
            println!("{answer}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
