//! Command-line interface for taskboard
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group lives in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::board::TaskBoard;
use crate::config::{self, Config};
use crate::error::Result;
use crate::events::{Event, EventDestination, EventKind, EventSink};
use crate::output::{HumanOutput, OutputOptions};
use crate::persist::Persistence;
use crate::storage::FileSlotStore;
use crate::store::{SaveOutcome, Store};

mod board;
mod column;
mod task;

/// taskboard - a kanban board in your terminal
///
/// Columns hold ordered tasks; every change is written to a local slot file
/// before the command returns.
#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the board slot (defaults to the platform data dir)
    #[arg(long, global = true, env = "TASKBOARD_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to a config file (defaults to <data-dir>/.taskboard.toml)
    #[arg(long, global = true, env = "TASKBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit change events as JSON lines to a file, or "-" for stdout
    #[arg(long, global = true)]
    pub events: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the board
    Show,

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Column management
    #[command(subcommand)]
    Column(ColumnCommands),

    /// Reload the board from its slot and rewrite it
    Refresh,
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a task
    Add {
        /// Task name (1-100 characters)
        #[arg(long)]
        name: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        deadline: String,

        /// Column id (defaults to the first column)
        #[arg(long)]
        column: Option<String>,

        /// Optional description
        #[arg(long)]
        description: Option<String>,

        /// Mark as favorite
        #[arg(long)]
        favorite: bool,

        /// Attach a file (stored base64-encoded)
        #[arg(long, conflicts_with = "image")]
        image_file: Option<PathBuf>,

        /// Attach an already base64-encoded payload
        #[arg(long)]
        image: Option<String>,
    },

    /// Edit a task; moving it with --column appends it to the new column
    Edit {
        /// Task id
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        deadline: Option<String>,

        #[arg(long)]
        column: Option<String>,

        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,

        /// Remove the description
        #[arg(long)]
        clear_description: bool,

        /// Set the favorite flag (true/false)
        #[arg(long)]
        favorite: Option<bool>,

        #[arg(long, conflicts_with_all = ["image", "clear_image"])]
        image_file: Option<PathBuf>,

        #[arg(long, conflicts_with = "clear_image")]
        image: Option<String>,

        /// Remove the attachment
        #[arg(long)]
        clear_image: bool,
    },

    /// Delete a task
    Delete {
        /// Task id
        id: String,
    },

    /// Move a task to another column
    Move {
        /// Task id
        id: String,

        /// Target column id
        column: String,
    },

    /// Show a single task
    Show {
        /// Task id
        id: String,
    },
}

/// Column subcommands
#[derive(Subcommand, Debug)]
pub enum ColumnCommands {
    /// Add a column (title 1-50 characters)
    Add {
        title: String,
    },

    /// Delete an empty, user-created column
    Delete {
        /// Column id
        id: String,
    },
}

/// Everything a command needs: the opened board and output settings.
pub(crate) struct Context {
    pub board: TaskBoard<FileSlotStore>,
    pub output: OutputOptions,
    events: Option<EventSink>,
}

impl Context {
    fn open(cli: &Cli) -> Result<Self> {
        let config = match cli.config.as_deref() {
            Some(path) => Config::load(path)?,
            None => {
                let candidate = match cli.data_dir.clone() {
                    Some(dir) => Some(dir),
                    None => config::default_data_dir().ok(),
                };
                candidate
                    .map(|dir| Config::load_from_dir(&dir))
                    .unwrap_or_default()
            }
        };
        let data_dir = config::resolve_data_dir(cli.data_dir.as_deref(), &config)?;
        tracing::debug!(data_dir = %data_dir.display(), slot = %config.storage.slot, "opening board");

        let slots =
            FileSlotStore::new(data_dir).with_lock_timeout(config.storage.lock_timeout_ms);
        let store = Store::open(Persistence::new(slots, config.storage.slot.clone()));
        let board = TaskBoard::new(store).with_policy(config.board.policy());

        // Events on stdout take over the JSON channel.
        let destination = EventDestination::parse(cli.events.as_deref());
        let events_to_stdout = matches!(destination, Some(EventDestination::Stdout));
        let events = destination.map(|d| d.open()).transpose()?;

        Ok(Self {
            board,
            output: OutputOptions {
                json: cli.json && !events_to_stdout,
                quiet: cli.quiet,
            },
            events,
        })
    }

    /// Emit a change event if an event sink is configured.
    pub fn emit_event<T: serde::Serialize>(&mut self, kind: EventKind, data: T) -> Result<()> {
        if let Some(sink) = self.events.as_mut() {
            sink.emit(&Event::new(kind).with_data(data)?)?;
        }
        Ok(())
    }

    /// Add a warning when the last write to the slot failed.
    pub fn note_save_outcome(&self, human: &mut HumanOutput) {
        if let SaveOutcome::Failed(reason) = self.board.last_save() {
            human.push_warning(format!("board was not saved: {reason}"));
        }
    }

    pub fn note_load_source(&self, human: &mut HumanOutput) {
        use crate::persist::LoadSource;
        match self.board.store().load_source() {
            LoadSource::Invalid => {
                human.push_warning("stored board was unreadable; started from default columns")
            }
            LoadSource::Repaired(repairs) => {
                if repairs.unreadable > 0 {
                    human.push_warning(format!(
                        "left out {} unreadable task record(s); they are dropped on the next save",
                        repairs.unreadable
                    ));
                }
                if repairs.duplicates > 0 {
                    human.push_warning(format!(
                        "dropped {} duplicate task(s)",
                        repairs.duplicates
                    ));
                }
                if repairs.relinked > 0 {
                    human.push_warning(format!(
                        "repaired column references on {} task(s)",
                        repairs.relinked
                    ));
                }
            }
            LoadSource::Slot | LoadSource::Missing => {}
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let mut ctx = Context::open(&self)?;
        match self.command {
            Commands::Show => board::run_show(&mut ctx),
            Commands::Refresh => board::run_refresh(&mut ctx),
            Commands::Task(cmd) => match cmd {
                TaskCommands::Add {
                    name,
                    deadline,
                    column,
                    description,
                    favorite,
                    image_file,
                    image,
                } => task::run_add(
                    &mut ctx,
                    task::AddOptions {
                        name,
                        deadline,
                        column,
                        description,
                        favorite,
                        image_file,
                        image,
                    },
                ),
                TaskCommands::Edit {
                    id,
                    name,
                    deadline,
                    column,
                    description,
                    clear_description,
                    favorite,
                    image_file,
                    image,
                    clear_image,
                } => task::run_edit(
                    &mut ctx,
                    task::EditOptions {
                        id,
                        name,
                        deadline,
                        column,
                        description,
                        clear_description,
                        favorite,
                        image_file,
                        image,
                        clear_image,
                    },
                ),
                TaskCommands::Delete { id } => task::run_delete(&mut ctx, &id),
                TaskCommands::Move { id, column } => task::run_move(&mut ctx, &id, &column),
                TaskCommands::Show { id } => task::run_show(&mut ctx, &id),
            },
            Commands::Column(cmd) => match cmd {
                ColumnCommands::Add { title } => column::run_add(&mut ctx, &title),
                ColumnCommands::Delete { id } => column::run_delete(&mut ctx, &id),
            },
        }
    }
}
