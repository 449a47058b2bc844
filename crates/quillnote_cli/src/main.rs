//! QuillNote command-line entry point.
//!
//! # Responsibility
//! - Parse and validate boundary input (blank fields, tag names, ids).
//! - Resolve configuration, start logging, open storage, run one command.
//! - Map failures to stable exit codes.

mod commands;

use clap::{Args, Parser, Subcommand};
use commands::{execute, CliError};
use log::{error, info};
use quillnote_core::db::open_db;
use quillnote_core::{
    core_version, init_logging, AppConfig, ConfigOverrides, NoteService, SqliteNoteRepository, Tag,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "quillnote")]
#[command(version, about = "Personal notes with tags and word statistics")]
#[command(propagate_version = true)]
struct Cli {
    /// SQLite database file (env: QUILLNOTE_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// trace|debug|info|warn|error (env: QUILLNOTE_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files (env: QUILLNOTE_LOG_DIR)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Create a note
    Create(NoteContent),

    /// Replace title and text of a note; tags change only when given
    Update {
        id: String,

        #[command(flatten)]
        content: NoteContent,

        /// Remove all tags from the note
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },

    /// Delete a note permanently
    Delete { id: String },

    /// Show one note
    Get { id: String },

    /// List notes newest first
    List {
        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: u32,

        /// Page size (0 means default, capped at 100)
        #[arg(long, default_value_t = 10)]
        size: u32,

        /// Only notes carrying this tag
        #[arg(long)]
        tag: Option<Tag>,
    },

    /// Word frequencies of a note's text
    Stats { id: String },
}

#[derive(Debug, Args)]
pub(crate) struct NoteContent {
    #[arg(long)]
    title: String,

    #[arg(long)]
    text: String,

    /// BUSINESS, PERSONAL or IMPORTANT; repeat for several
    #[arg(long = "tag", id = "tags")]
    tags: Vec<Tag>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(
                "event=cli_command module=cli status=error exit_code={} error={err}",
                err.exit_code()
            );
            eprintln!("Error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = AppConfig::from_env(ConfigOverrides {
        db_path: cli.db,
        log_level: cli.log_level,
        log_dir: cli.log_dir,
    })?;

    if let Some(log_dir) = config.log_dir.as_ref() {
        init_logging(config.log_level, log_dir)?;
    }
    info!(
        "event=cli_start module=cli status=ok core_version={}",
        core_version()
    );

    let conn = open_db(&config.db_path)?;
    let repo = SqliteNoteRepository::try_new(&conn)?;
    let service = NoteService::new(repo);

    let output = execute(cli.command, &service)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
