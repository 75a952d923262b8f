use std::io::{self, BufRead};
use std::sync::Arc;

use lectern_core::LecternConfig;
use lectern_reminders::{PollScheduler, ReminderEngine};
use lectern_store::{HttpLectureStore, LectureBook};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::render::{lecture_table, toast_line, upcoming_banner};
use crate::sink::TerminalToasts;

/// A line typed while the dashboard is watching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    Clear,
    List,
    Help,
    Quit,
    Unknown(String),
}

impl WatchCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let word = line.trim().to_ascii_lowercase();
        let cmd = match word.as_str() {
            "" => return None,
            "clear" | "dismiss" => Self::Clear,
            "list" | "ls" => Self::List,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => Self::Unknown(word),
        };
        Some(cmd)
    }
}

/// Forward lines from a blocking reader over a channel.
///
/// The reader gets its own OS thread so a pending read never holds up runtime
/// shutdown; the thread ends at EOF, on a read error, or once the receiver is gone.
fn spawn_line_reader<R>(reader: R) -> io::Result<mpsc::Receiver<io::Result<String>>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);
    std::thread::Builder::new()
        .name("lectern-stdin".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let failed = line.is_err();
                if tx.blocking_send(line).is_err() || failed {
                    break;
                }
            }
        })?;
    Ok(rx)
}

const HELP: &str = "commands: clear (dismiss upcoming), list (reload lectures), quit";

/// Live dashboard: lecture table plus reminders until `quit` or Ctrl-C.
pub async fn run(
    config: &LecternConfig,
    store: Arc<HttpLectureStore>,
    toasts: Arc<TerminalToasts>,
) -> anyhow::Result<()> {
    let mut book = LectureBook::new(store.clone(), toasts.clone());
    if book.refresh().await.is_ok() {
        print!("{}", lecture_table(book.lectures()));
    }

    let engine = Arc::new(
        ReminderEngine::new(store, toasts.clone())
            .with_toast_duration(config.reminders.toast_duration()),
    );
    let mut banner = engine.subscribe();
    let mut scheduler = PollScheduler::new(Arc::clone(&engine), config.reminders.poll_interval())
        .immediate_first_poll(config.reminders.immediate_first_poll);
    scheduler.start();
    println!("{HELP}");

    let mut lines = spawn_line_reader(io::BufReader::new(io::stdin()))?;
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("interrupt received");
                break;
            }
            changed = banner.changed() => {
                if changed.is_err() {
                    break;
                }
                let lessons = banner.borrow_and_update().clone();
                if lessons.is_empty() {
                    println!("Upcoming lessons dismissed.");
                } else {
                    print!("{}", upcoming_banner(&lessons));
                }
            }
            line = lines.recv(), if stdin_open => match line {
                Some(Ok(line)) => match WatchCommand::parse(&line) {
                    Some(WatchCommand::Quit) => break,
                    Some(WatchCommand::Clear) => engine.dismiss_all(),
                    Some(WatchCommand::List) => {
                        if book.refresh().await.is_ok() {
                            print!("{}", lecture_table(book.lectures()));
                        }
                        print!("{}", upcoming_banner(&engine.upcoming()));
                        for toast in toasts.recent() {
                            println!("{}", toast_line(&toast));
                        }
                    }
                    Some(WatchCommand::Help) => println!("{HELP}"),
                    Some(WatchCommand::Unknown(word)) => println!("unknown command `{word}`; {HELP}"),
                    None => {}
                },
                None => {
                    info!("stdin closed, watching until interrupted");
                    stdin_open = false;
                }
                Some(Err(e)) => {
                    warn!(error = %e, "failed to read command");
                    stdin_open = false;
                }
            },
        }
    }

    scheduler.stop().await;
    info!("dashboard stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_case_insensitively() {
        assert_eq!(WatchCommand::parse("clear"), Some(WatchCommand::Clear));
        assert_eq!(WatchCommand::parse("  LIST \n"), Some(WatchCommand::List));
        assert_eq!(WatchCommand::parse("q"), Some(WatchCommand::Quit));
        assert_eq!(WatchCommand::parse("?"), Some(WatchCommand::Help));
    }

    #[test]
    fn blank_lines_are_ignored_and_others_reported() {
        assert_eq!(WatchCommand::parse("   "), None);
        assert_eq!(
            WatchCommand::parse("Snooze"),
            Some(WatchCommand::Unknown("snooze".to_string()))
        );
    }

    #[tokio::test]
    async fn line_reader_forwards_lines_then_closes() {
        let mut lines = spawn_line_reader(io::Cursor::new("clear\nlist\n")).unwrap();

        assert_eq!(lines.recv().await.unwrap().unwrap(), "clear");
        assert_eq!(lines.recv().await.unwrap().unwrap(), "list");
        assert!(lines.recv().await.is_none());
    }

    /// A reader whose first read blocks until the gate's sender is dropped.
    struct Stalled(std::sync::mpsc::Receiver<()>);

    impl io::Read for Stalled {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            let _ = self.0.recv();
            Ok(0)
        }
    }

    #[test]
    fn runtime_shutdown_does_not_wait_on_a_pending_read() {
        let (_hold, gate) = std::sync::mpsc::channel::<()>();
        let started = std::time::Instant::now();

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let _lines = spawn_line_reader(io::BufReader::new(Stalled(gate))).unwrap();
            tokio::task::yield_now().await;
        });
        drop(rt);

        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }
}
