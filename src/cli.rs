//! Command-line interface module for reshelf.
//!
//! This module handles all CLI-related functionality including:
//! - Command definitions shared by one-shot runs and the interactive shell
//! - Organization, duplicate scans and undo dispatch
//! - Rendering pass results through [`OutputFormatter`]
//!
//! Undo history lives in the [`Session`]'s engine, so `undo` only has
//! something to revert inside the interactive shell, where one session
//! outlives many commands.

use crate::config::ReshelfConfig;
use crate::duplicates::DuplicateScanner;
use crate::file_organizer::{OrganizeOptions, OrganizerEngine};
use crate::output::{OutputFormatter, PercentBar};
use crate::reporting::Hooks;
use crate::undo::UndoOutcome;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::debug;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Sort files into category folders, find duplicates, undo the last change.
#[derive(Parser, Debug)]
#[command(name = "reshelf", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a TOML or JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Organize a directory once
    Organize(OrganizeArgs),
    /// Report files whose content duplicates an earlier file
    Duplicates {
        /// Directory to scan
        dir: PathBuf,
    },
    /// Start an interactive session with undo support
    Shell,
}

/// Arguments of the `organize` command.
#[derive(Args, Debug, Clone)]
pub struct OrganizeArgs {
    /// Directory to organize
    pub dir: PathBuf,

    /// Show what would change without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Only organize files directly inside the directory
    #[arg(long)]
    pub no_recursive: bool,

    /// Do not run a duplicate scan after organizing
    #[arg(long)]
    pub skip_duplicates: bool,
}

impl OrganizeArgs {
    fn options(&self) -> OrganizeOptions {
        OrganizeOptions {
            recursive: !self.no_recursive,
            dry_run: self.dry_run,
        }
    }
}

/// One line typed into the interactive shell.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Organize a directory
    Organize(OrganizeArgs),
    /// Report duplicate files under a directory
    Duplicates {
        dir: PathBuf,
    },
    /// Revert the most recent rename or move
    Undo,
    /// List what `undo` would revert, newest first
    History,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

/// A long-lived engine plus the output glue around it.
pub struct Session {
    engine: OrganizerEngine,
}

impl Session {
    /// Creates a session from configuration.
    pub fn new(config: &ReshelfConfig) -> Result<Self> {
        let engine =
            OrganizerEngine::from_config(config).context("Error compiling configuration")?;
        Ok(Self { engine })
    }

    /// Runs one organize pass and prints its summary. When the pass is live
    /// and `skip_duplicates` is not set, a duplicate scan follows.
    pub fn organize(&mut self, args: &OrganizeArgs) -> Result<()> {
        let options = args.options();
        if options.dry_run {
            OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", args.dir.display()));
        } else {
            OutputFormatter::info(&format!("Organizing contents of: {}", args.dir.display()));
        }

        let bar = PercentBar::new("organizing");
        let hooks = Hooks::none().with_logger(&bar).with_progress(&bar);
        let result = self.engine.organize(&args.dir, options, hooks);
        bar.finish();

        let summary = result.with_context(|| format!("Error organizing {}", args.dir.display()))?;
        OutputFormatter::organize_summary(&summary);

        if options.dry_run {
            OutputFormatter::success("Dry run complete. No files were modified.");
            return Ok(());
        }

        OutputFormatter::success("Organization complete!");
        if !args.skip_duplicates {
            self.duplicates(&args.dir)?;
        }
        Ok(())
    }

    /// Scans for duplicates and prints the report.
    pub fn duplicates(&self, dir: &Path) -> Result<()> {
        OutputFormatter::info(&format!("Checking for duplicates in: {}", dir.display()));

        let bar = PercentBar::new("hashing");
        let hooks = Hooks::none().with_progress(&bar);
        let result = DuplicateScanner::scan(dir, hooks);
        bar.finish();

        let report = result.with_context(|| format!("Error scanning {}", dir.display()))?;
        OutputFormatter::duplicate_report(&report);
        Ok(())
    }

    /// Reverts the most recent action.
    pub fn undo(&mut self) -> Result<()> {
        match self.engine.undo() {
            Ok(UndoOutcome::NothingToUndo) => {
                OutputFormatter::info("Nothing to undo.");
                Ok(())
            }
            Ok(UndoOutcome::Reverted(record)) => {
                OutputFormatter::success(&format!("Undid {}", record));
                Ok(())
            }
            Err(e) => Err(e).context("Undo failed; that action has been dropped from history"),
        }
    }

    pub fn history(&self) {
        OutputFormatter::history(self.engine.actions().records());
    }
}

/// Runs a one-shot command.
///
/// # Examples
///
/// ```no_run
/// use reshelf::cli::{Command, OrganizeArgs, run_cli};
/// use std::path::PathBuf;
///
/// let command = Command::Organize(OrganizeArgs {
///     dir: PathBuf::from("/path/to/directory"),
///     dry_run: true,
///     no_recursive: false,
///     skip_duplicates: false,
/// });
/// if let Err(e) = run_cli(&command, None) {
///     eprintln!("Error: {:#}", e);
/// }
/// ```
pub fn run_cli(command: &Command, config_path: Option<&Path>) -> Result<()> {
    let config = ReshelfConfig::load(config_path).context("Error loading configuration")?;

    match command {
        Command::Organize(args) => Session::new(&config)?.organize(args),
        Command::Duplicates { dir } => Session::new(&config)?.duplicates(dir),
        Command::Shell => {
            let stdin = io::stdin();
            run_shell(Session::new(&config)?, stdin.lock())
        }
    }
}

/// Reads shell commands from `input` until `quit` or end of input.
///
/// A failing command is reported and the shell keeps going.
pub fn run_shell<R: BufRead>(mut session: Session, input: R) -> Result<()> {
    OutputFormatter::plain("reshelf shell. Commands: organize, duplicates, undo, history, quit");
    prompt();

    for line in input.lines() {
        let line = line.context("Error reading input")?;
        let words = split_words(&line);
        if words.is_empty() {
            prompt();
            continue;
        }

        match ShellLine::try_parse_from(&words) {
            Ok(parsed) => {
                debug!("Shell command: {:?}", parsed.command);
                if let Err(e) = dispatch(&mut session, parsed.command) {
                    match e {
                        Dispatch::Quit => return Ok(()),
                        Dispatch::Failed(e) => OutputFormatter::error(&format!("{:#}", e)),
                    }
                }
            }
            Err(e) => {
                let _ = e.print();
            }
        }
        prompt();
    }

    Ok(())
}

enum Dispatch {
    Quit,
    Failed(anyhow::Error),
}

fn dispatch(session: &mut Session, command: ShellCommand) -> Result<(), Dispatch> {
    let result = match command {
        ShellCommand::Organize(args) => session.organize(&args),
        ShellCommand::Duplicates { dir } => session.duplicates(&dir),
        ShellCommand::Undo => session.undo(),
        ShellCommand::History => {
            session.history();
            Ok(())
        }
        ShellCommand::Quit => return Err(Dispatch::Quit),
    };
    result.map_err(Dispatch::Failed)
}

fn prompt() {
    print!("reshelf> ");
    let _ = io::stdout().flush();
}

/// Splits a shell line on whitespace, honoring single and double quotes so
/// paths with spaces can be typed as `"My Videos"`.
fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;

    for c in line.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if in_word {
        words.push(current);
    }
    words
}
