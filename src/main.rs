//! Line-oriented command shell around a drivedeck [`Session`].
//!
//! Commands are read from stdin, one per line, and turned into library
//! events. Every view model published by the session is rendered to stdout.
//!
//! # Threads
//!
//! ```text
//! stdin reader ──Event──▶ Session::run_until (main thread) ──UIViewModel──▶ printer
//! ```
//!
//! # Commands
//!
//! Files are referenced by their 1-based position in the current list, by
//! exact name, or by id. For `star`, `trash`, `restore` and `delete` the
//! whole rest of the line is the reference, so names may contain spaces.
//!
//! - `search [text]`: Set (or clear) the search query
//! - `view <my-drive|starred|recent|bin>`: Switch view
//! - `layout <list|grid>`: Switch layout
//! - `star <file>`, `trash <file>`, `restore <file>`, `delete <file>`
//! - `download <file> [dir]`: Write the file into `dir` (default `.`)
//! - `upload <path>...`: Queue files and start the upload
//! - `open`, `queue <path>...`, `unqueue <n>`, `start`, `close`: Upload dialog
//! - `dismiss`: Clear the inline error
//! - `help`, `quit`
//!
//! # Configuration
//!
//! `drivedeck --config <file.toml>` reads a TOML file; without it the
//! `DRIVEDECK_*` environment variables are used. `drivedeck --help` prints
//! usage.

#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use drivedeck::app::QueuedFile;
use drivedeck::ui::{render_viewmodel, UIViewModel};
use drivedeck::{Config, Event, Layout, Session, View};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

const DEFAULT_COLUMNS: usize = 100;

const HELP: &str = "\
commands:
  search [text]               set or clear the search query
  view <name>                 my-drive, starred, recent, bin
  layout <list|grid>          switch layout
  star|trash|restore|delete <file>
  download <file> [dir]       write the file into dir (default .)
  upload <path>...            queue files and start uploading
  open | queue <path>... | unqueue <n> | start | close
  dismiss                     clear the error message
  quit
files are referenced by list position, name or id";

#[derive(Parser, Debug)]
#[command(name = "drivedeck")]
#[command(about = "Browse, search, star, bin and upload files in a drive collection", long_about = None)]
struct Cli {
    /// TOML configuration file; without it DRIVEDECK_* environment variables are read
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    fn load_config(&self) -> drivedeck::Result<Config> {
        match &self.config {
            Some(path) => Config::from_file(path),
            None => Config::from_env(),
        }
    }
}

/// Latest view model, shared with the reader to resolve file references.
type SharedView = Arc<Mutex<Option<UIViewModel>>>;

/// What one input line asks for.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Events(Vec<Event>),
    Help,
    Quit,
    Nothing,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("drivedeck: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> drivedeck::Result<()> {
    let config = Cli::parse().load_config()?;
    let mut session = drivedeck::initialize(&config)?;

    let latest: SharedView = Arc::new(Mutex::new(None));
    let columns = std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.parse().ok())
        .unwrap_or(DEFAULT_COLUMNS);

    spawn_printer(session.watch(), Arc::clone(&latest), columns)?;

    let stop = Arc::new(AtomicBool::new(false));
    spawn_reader(session.sender(), latest, Arc::clone(&stop))?;

    session.run_until(&stop)?;
    session.shutdown();
    tracing::debug!("drivedeck stopped");
    Ok(())
}

fn spawn_printer(views: Receiver<UIViewModel>, latest: SharedView, columns: usize) -> drivedeck::Result<()> {
    std::thread::Builder::new()
        .name("drivedeck-printer".to_string())
        .spawn(move || {
            for viewmodel in views {
                let mut out = io::stdout().lock();
                let written = writeln!(out)
                    .and_then(|()| render_viewmodel(&viewmodel, &mut out, columns))
                    .and_then(|()| out.flush());
                if written.is_err() {
                    return;
                }
                if let Ok(mut slot) = latest.lock() {
                    *slot = Some(viewmodel);
                }
            }
        })
        .map(|_| ())
        .map_err(|e| drivedeck::DriveError::Worker(format!("failed to spawn printer: {e}")))
}

fn spawn_reader(events: Sender<Event>, latest: SharedView, stop: Arc<AtomicBool>) -> drivedeck::Result<()> {
    std::thread::Builder::new()
        .name("drivedeck-input".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                let command = {
                    let Ok(view) = latest.lock() else { break };
                    parse_command(&line, view.as_ref())
                };
                match command {
                    Ok(Command::Events(batch)) => {
                        if batch.into_iter().any(|event| events.send(event).is_err()) {
                            break;
                        }
                    }
                    Ok(Command::Help) => eprintln!("{HELP}"),
                    Ok(Command::Quit) => break,
                    Ok(Command::Nothing) => {}
                    Err(message) => eprintln!("{message}"),
                }
            }
            stop.store(true, Ordering::Relaxed);
        })
        .map(|_| ())
        .map_err(|e| drivedeck::DriveError::Worker(format!("failed to spawn input reader: {e}")))
}

fn parse_command(line: &str, view: Option<&UIViewModel>) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let args: Vec<&str> = rest.split_whitespace().collect();

    let file = |name: &str| -> Result<String, String> {
        if rest.is_empty() {
            return Err(format!("usage: {name} <file>"));
        }
        Ok(resolve_file(rest, view))
    };

    let events = match verb {
        "" => return Ok(Command::Nothing),
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" | "q" => return Ok(Command::Quit),
        "search" => vec![Event::SetSearchQuery(rest.to_string())],
        "view" => vec![Event::SetView(rest.parse::<View>().map_err(|e| e.to_string())?)],
        "layout" => match rest {
            "list" => vec![Event::SetLayout(Layout::List)],
            "grid" => vec![Event::SetLayout(Layout::Grid)],
            _ => return Err("usage: layout <list|grid>".to_string()),
        },
        "star" => vec![Event::ToggleStar { id: file("star")? }],
        "trash" => vec![Event::MoveToTrash { id: file("trash")? }],
        "restore" => vec![Event::RestoreFromTrash { id: file("restore")? }],
        "delete" => vec![Event::PermanentlyDelete { id: file("delete")? }],
        "download" => vec![Event::Download {
            id: args
                .first()
                .map(|target| resolve_file(target, view))
                .ok_or("usage: download <file> [dir]")?,
            destination: args.get(1).map_or_else(|| PathBuf::from("."), PathBuf::from),
        }],
        "dismiss" => vec![Event::DismissError],
        "open" => vec![Event::OpenUploadDialog],
        "queue" => vec![Event::QueueFiles(queued_files(&args)?)],
        "unqueue" => {
            let position: usize = rest.parse().map_err(|_| "usage: unqueue <n>".to_string())?;
            let index = position.checked_sub(1).ok_or("positions start at 1")?;
            vec![Event::RemoveQueuedFile(index)]
        }
        "start" => vec![Event::StartUpload],
        "close" => vec![Event::CloseUploadDialog],
        "upload" => vec![
            Event::OpenUploadDialog,
            Event::QueueFiles(queued_files(&args)?),
            Event::StartUpload,
        ],
        other => return Err(format!("unknown command: {other} (try help)")),
    };
    Ok(Command::Events(events))
}

fn queued_files(paths: &[&str]) -> Result<Vec<QueuedFile>, String> {
    if paths.is_empty() {
        return Err("no files given".to_string());
    }
    paths
        .iter()
        .map(|path| {
            QueuedFile::from_path(drivedeck::infrastructure::expand_tilde(path))
                .map_err(|e| format!("{path}: {e}"))
        })
        .collect()
}

/// List position (1-based), then exact name, then the text as an id.
fn resolve_file(target: &str, view: Option<&UIViewModel>) -> String {
    let Some(view) = view else {
        return target.to_string();
    };
    if let Some(item) = target
        .parse::<usize>()
        .ok()
        .and_then(|position| position.checked_sub(1))
        .and_then(|index| view.display_items.get(index))
    {
        return item.id.clone();
    }
    view.display_items
        .iter()
        .find(|item| item.name == target)
        .map_or_else(|| target.to_string(), |item| item.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivedeck::{handle_event, DriveState, FileRecord};

    fn view_with(names: &[(&str, &str)]) -> UIViewModel {
        let mut state = DriveState::new();
        let files = names
            .iter()
            .map(|(id, name)| FileRecord {
                id: (*id).to_string(),
                name: (*name).to_string(),
                mime_type: "text/plain".to_string(),
                size: 1,
                upload_date: chrono::Utc::now(),
                data: String::new(),
                timestamp: None,
            })
            .collect();
        handle_event(&mut state, &Event::SnapshotReceived { files }).unwrap();
        state.compute_viewmodel()
    }

    #[test]
    fn resolves_position_name_or_id() {
        let view = view_with(&[("id-a", "a.txt"), ("id-b", "b.txt")]);
        assert_eq!(resolve_file("2", Some(&view)), "id-b");
        assert_eq!(resolve_file("a.txt", Some(&view)), "id-a");
        assert_eq!(resolve_file("raw-id", Some(&view)), "raw-id");
        assert_eq!(resolve_file("9", None), "9");
    }

    #[test]
    fn references_may_contain_spaces() {
        let view = view_with(&[("id-a", "Quarterly report.pdf")]);
        assert_eq!(
            parse_command("trash Quarterly report.pdf", Some(&view)),
            Ok(Command::Events(vec![Event::MoveToTrash { id: "id-a".to_string() }]))
        );
        assert_eq!(
            parse_command("star  1 ", Some(&view)),
            Ok(Command::Events(vec![Event::ToggleStar { id: "id-a".to_string() }]))
        );
        assert_eq!(
            parse_command("download 1 out", Some(&view)),
            Ok(Command::Events(vec![Event::Download {
                id: "id-a".to_string(),
                destination: PathBuf::from("out"),
            }]))
        );
    }

    #[test]
    fn cli_takes_optional_config_path() {
        let cli = Cli::try_parse_from(["drivedeck", "--config", "drive.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("drive.toml")));
        assert_eq!(Cli::try_parse_from(["drivedeck", "-c", "a.toml"]).unwrap().config, Some(PathBuf::from("a.toml")));
        assert!(Cli::try_parse_from(["drivedeck"]).unwrap().config.is_none());
    }

    #[test]
    fn cli_prints_help_and_rejects_unknown_arguments() {
        let help = Cli::try_parse_from(["drivedeck", "--help"]).unwrap_err();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);

        let unknown = Cli::try_parse_from(["drivedeck", "--verbose"]).unwrap_err();
        assert_eq!(unknown.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_command("search  quarterly report ", None),
            Ok(Command::Events(vec![Event::SetSearchQuery("quarterly report".to_string())]))
        );
        assert_eq!(parse_command("search", None), Ok(Command::Events(vec![Event::SetSearchQuery(String::new())])));
        assert_eq!(parse_command("view bin", None), Ok(Command::Events(vec![Event::SetView(View::Bin)])));
        assert_eq!(parse_command("unqueue 1", None), Ok(Command::Events(vec![Event::RemoveQueuedFile(0)])));
        assert_eq!(parse_command("quit", None), Ok(Command::Quit));
        assert_eq!(parse_command("   ", None), Ok(Command::Nothing));
        assert!(parse_command("view shared", None).is_err());
        assert!(parse_command("star", None).is_err());
        assert!(parse_command("upload /definitely/missing.txt", None).is_err());
    }
}
