//! taskboard - Kanban Board State Library
//!
//! This library provides the board state manager behind the taskboard CLI:
//! an ordered set of columns holding ordered tasks, kept in memory and written
//! through to a local key-value slot on every change.
//!
//! # Core Concepts
//!
//! - **Board**: ordered columns, each owning an ordered list of tasks
//! - **Seed columns**: `To Do`, `In Progress`, `Done`; never deletable
//! - **Slot**: the named storage location holding the serialized board
//! - **Store**: authoritative in-memory board plus observers
//!
//! # Module Organization
//!
//! - `board`: Mutation API (add/edit/move/delete tasks, add/delete columns)
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.taskboard.toml`
//! - `error`: Error types and result aliases
//! - `events`: JSONL change events for integrations
//! - `lock`: File locking and atomic writes for slot files
//! - `model`: Task, Column and Board types
//! - `output`: Human and JSON output formatting
//! - `persist`: Board load/save with fallback to defaults
//! - `storage`: Key-value slot backends (file, memory)
//! - `store`: In-memory board with write-through persistence
//! - `validate`: Input checks run before calling the Mutation API

pub mod board;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod lock;
pub mod model;
pub mod output;
pub mod persist;
pub mod storage;
pub mod store;
pub mod validate;

pub use board::{Applied, NotFoundPolicy, TaskBoard};
pub use error::{Error, Result};
pub use model::{Board, Column, Deadline, Task, TaskInput};
pub use persist::Persistence;
pub use store::Store;
