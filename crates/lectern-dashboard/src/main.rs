use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use lectern_core::{FormField, LecternConfig, LecternError, LectureId};
use lectern_store::{HttpLectureStore, LectureBook, SubmitOutcome};
use tracing::{info, warn};

mod render;
mod sink;
mod watch;

use render::lecture_table;
use sink::TerminalToasts;

#[derive(Parser, Debug)]
#[command(
    name = "lectern",
    version,
    about = "Teacher lectures dashboard with upcoming-lesson reminders"
)]
struct Cli {
    /// Config file (default: ~/.lectern/lectern.toml)
    #[arg(long, env = "LECTERN_CONFIG", global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every lecture.
    List,
    /// Add a lecture.
    Add(LectureArgs),
    /// Update a lecture; omitted fields keep their current value.
    Update {
        id: LectureId,
        #[command(flatten)]
        fields: LectureArgs,
    },
    /// Delete a lecture.
    Delete {
        id: LectureId,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
    /// Show the dashboard and raise reminders for lectures starting soon.
    Watch,
}

#[derive(Args, Debug)]
struct LectureArgs {
    #[arg(long)]
    teacher: Option<String>,
    #[arg(long)]
    lesson: Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// e.g. 2024-01-01T10:00
    #[arg(long)]
    time: Option<String>,
}

impl LectureArgs {
    fn values(&self) -> [(FormField, Option<&String>); 4] {
        [
            (FormField::TeacherName, self.teacher.as_ref()),
            (FormField::LessonName, self.lesson.as_ref()),
            (FormField::Email, self.email.as_ref()),
            (FormField::Time, self.time.as_ref()),
        ]
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_log_filter().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // explicit path > LECTERN_CONFIG env > ~/.lectern/lectern.toml
    let config = LecternConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!(code = e.code(), "Config load failed ({}), using defaults", e);
        LecternConfig::default()
    });
    info!(
        lectures_url = %config.store.lectures_url,
        upcoming_url = %config.store.upcoming_url,
        "lecture service configured"
    );

    let store = Arc::new(
        HttpLectureStore::new(&config.store).context("failed to build lecture service client")?,
    );
    let toasts = Arc::new(TerminalToasts::new());
    let mut book = LectureBook::new(store.clone(), toasts.clone());

    match cli.command {
        Command::List => {
            book.refresh().await?;
            print!("{}", lecture_table(book.lectures()));
        }
        Command::Add(args) => {
            for (field, value) in args.values() {
                book.set_field(field, value.cloned().unwrap_or_default());
            }
            submit(&mut book).await?;
        }
        Command::Update { id, fields } => {
            book.refresh().await?;
            let Some(current) = book.lectures().iter().find(|l| l.id == id).cloned() else {
                bail!("lecture {id} not found");
            };
            book.edit(&current);
            for (field, value) in fields.values() {
                if let Some(value) = value {
                    book.set_field(field, value.clone());
                }
            }
            submit(&mut book).await?;
        }
        Command::Delete { id, yes } => {
            if !yes && !confirm(&format!("Are you sure you want to delete lecture {id}?"))? {
                println!("Cancelled.");
                return Ok(());
            }
            book.delete(id).await?;
        }
        Command::Watch => watch::run(&config, store, toasts).await?,
    }
    Ok(())
}

/// Events from this binary are targeted at its crate name (`lectern`), not the package name.
fn default_log_filter() -> String {
    format!(
        "{}=info,lectern_reminders=info,lectern_store=info",
        env!("CARGO_CRATE_NAME")
    )
}

async fn submit(book: &mut LectureBook) -> anyhow::Result<()> {
    match book.submit().await {
        SubmitOutcome::Created(lecture) | SubmitOutcome::Updated(lecture) => {
            print!("{}", lecture_table(std::slice::from_ref(&lecture)));
            Ok(())
        }
        SubmitOutcome::Invalid(errors) => {
            for (field, message) in errors.iter() {
                eprintln!("  {}: {}", field.label(), message);
            }
            Err(LecternError::Validation(errors).into())
        }
        SubmitOutcome::Failed(e) => Err(e.into()),
    }
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn update_takes_id_and_optional_fields() {
        let cli = Cli::parse_from(["lectern", "update", "7", "--lesson", "Physics"]);
        match cli.command {
            Command::Update { id, fields } => {
                assert_eq!(id, LectureId(7));
                assert_eq!(fields.lesson.as_deref(), Some("Physics"));
                assert!(fields.teacher.is_none());
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn default_log_filter_covers_this_binary() {
        let own_target = module_path!().split("::").next().unwrap();
        assert_eq!(own_target, "lectern");
        assert!(default_log_filter()
            .split(',')
            .any(|directive| directive == format!("{own_target}=info")));
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["lectern", "delete", "3", "--yes", "--config", "/tmp/l.toml"]);
        assert_eq!(cli.config.as_deref(), Some("/tmp/l.toml"));
        assert!(matches!(cli.command, Command::Delete { yes: true, .. }));
    }
}
