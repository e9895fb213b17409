//! Board persistence over a single named slot.
//!
//! Loading never fails: a missing or unreadable slot, or one that is not a
//! list of column records, yields the default board and a warning in the log.
//! Inside a valid column list, task records that cannot be parsed are left out
//! one by one instead of discarding the board. Saving reports failures to the
//! caller, which decides whether they are fatal.

use serde::Deserialize;

use crate::error::Result;
use crate::model::{Board, Column, Task};
use crate::storage::SlotStore;

/// Default slot name for the board.
pub const DEFAULT_SLOT: &str = "taskColumns";

/// Where a loaded board came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// The slot held a valid board.
    Slot,
    /// The slot held a board that had to be fixed up while loading.
    Repaired(Repairs),
    /// The slot was absent.
    Missing,
    /// The slot could not be read or parsed.
    Invalid,
}

/// Fixes applied to a stored board while loading it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Repairs {
    /// Tasks whose `column` field was rewritten to name their owner.
    pub relinked: usize,
    /// Later copies of a task id already seen on the board.
    pub duplicates: usize,
    /// Task records that could not be parsed and were left out.
    pub unreadable: usize,
}

impl Repairs {
    pub fn is_empty(&self) -> bool {
        self.relinked == 0 && self.duplicates == 0 && self.unreadable == 0
    }
}

/// Column record as stored, with tasks decoded separately.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredColumn {
    id: String,
    title: String,
    #[serde(default)]
    tasks: Vec<serde_json::Value>,
    #[serde(default)]
    is_default: bool,
}

/// Reads and writes the board in one slot of a [`SlotStore`].
#[derive(Debug)]
pub struct Persistence<S> {
    store: S,
    slot: String,
}

impl<S: SlotStore> Persistence<S> {
    pub fn new(store: S, slot: impl Into<String>) -> Self {
        Self {
            store,
            slot: slot.into(),
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the board, falling back to the default board.
    pub fn load(&self) -> Board {
        self.load_with_source().0
    }

    /// Load the board and report whether the slot was used.
    pub fn load_with_source(&self) -> (Board, LoadSource) {
        let raw = match self.store.get(&self.slot) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(slot = %self.slot, "slot empty, using default board");
                return (Board::default(), LoadSource::Missing);
            }
            Err(err) => {
                tracing::warn!(slot = %self.slot, error = %err, "slot unreadable, using default board");
                return (Board::default(), LoadSource::Invalid);
            }
        };

        let stored: Vec<StoredColumn> = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(slot = %self.slot, error = %err, "slot is not a column list, using default board");
                return (Board::default(), LoadSource::Invalid);
            }
        };

        let mut repairs = Repairs::default();
        let mut board = Board {
            columns: Vec::with_capacity(stored.len()),
        };
        for column in stored {
            let mut tasks = Vec::with_capacity(column.tasks.len());
            for (position, value) in column.tasks.into_iter().enumerate() {
                match serde_json::from_value::<Task>(value) {
                    Ok(task) => tasks.push(task),
                    Err(err) => {
                        tracing::warn!(
                            slot = %self.slot,
                            column = %column.id,
                            position,
                            error = %err,
                            "leaving out unreadable task record"
                        );
                        repairs.unreadable += 1;
                    }
                }
            }
            board.columns.push(Column {
                id: column.id,
                title: column.title,
                tasks,
                is_default: column.is_default,
            });
        }

        repairs.duplicates = board.dedupe_tasks();
        repairs.relinked = board.repair_integrity();
        if !repairs.is_empty() {
            tracing::warn!(
                slot = %self.slot,
                relinked = repairs.relinked,
                duplicates = repairs.duplicates,
                unreadable = repairs.unreadable,
                "stored board needed repairs"
            );
            return (board, LoadSource::Repaired(repairs));
        }

        tracing::debug!(slot = %self.slot, columns = board.columns.len(), tasks = board.task_count(), "board loaded");
        (board, LoadSource::Slot)
    }

    /// Write the board to the slot verbatim.
    pub fn save(&self, board: &Board) -> Result<()> {
        let json = serde_json::to_string(board)?;
        self.store.set(&self.slot, &json)?;
        tracing::debug!(slot = %self.slot, bytes = json.len(), "board saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{Column, TaskInput};
    use crate::storage::MemorySlotStore;

    fn sample_board() -> Board {
        let mut board = Board::default();
        let task = TaskInput::new("Write docs", "2024-03-20".parse().unwrap(), "2")
            .with_description("user guide")
            .with_image("iVBORw0KGgo=")
            .into_task();
        board.columns[1].tasks.push(task);
        board.columns.push(Column::new("Backlog"));
        board
    }

    #[test]
    fn save_then_load_round_trips() {
        let persistence = Persistence::new(MemorySlotStore::new(), DEFAULT_SLOT);
        let board = sample_board();

        persistence.save(&board).unwrap();
        let (loaded, source) = persistence.load_with_source();

        assert_eq!(loaded, board);
        assert_eq!(source, LoadSource::Slot);
    }

    #[test]
    fn missing_slot_loads_defaults() {
        let persistence = Persistence::new(MemorySlotStore::new(), DEFAULT_SLOT);
        let (board, source) = persistence.load_with_source();
        assert_eq!(board, Board::default());
        assert_eq!(source, LoadSource::Missing);
    }

    #[test]
    fn malformed_slots_load_defaults() {
        for raw in [
            "not json",
            "{\"id\":\"1\"}",
            "42",
            "[{\"title\":\"no id\"}]",
            "[1, 2, 3]",
            "[{\"id\":\"1\",\"title\":\"To Do\",\"tasks\":{}}]",
        ] {
            let store = MemorySlotStore::new();
            store.set(DEFAULT_SLOT, raw).unwrap();
            let persistence = Persistence::new(store, DEFAULT_SLOT);

            let (board, source) = persistence.load_with_source();
            assert_eq!(board, Board::default(), "input: {raw}");
            assert_eq!(source, LoadSource::Invalid, "input: {raw}");
        }
    }

    #[test]
    fn empty_array_is_a_valid_board() {
        let store = MemorySlotStore::new();
        store.set(DEFAULT_SLOT, "[]").unwrap();
        let persistence = Persistence::new(store, DEFAULT_SLOT);
        assert!(persistence.load().columns.is_empty());
    }

    #[test]
    fn mismatched_task_columns_are_repaired_on_load() {
        let mut board = sample_board();
        board.columns[1].tasks[0].column = "3".to_string();
        let store = MemorySlotStore::new();
        store
            .set(DEFAULT_SLOT, &serde_json::to_string(&board).unwrap())
            .unwrap();
        let persistence = Persistence::new(store, DEFAULT_SLOT);

        let (loaded, source) = persistence.load_with_source();
        assert_eq!(
            source,
            LoadSource::Repaired(Repairs {
                relinked: 1,
                ..Repairs::default()
            })
        );
        assert_eq!(loaded.columns[1].tasks[0].column, "2");
    }

    fn load_raw(raw: &str) -> (Board, LoadSource) {
        let store = MemorySlotStore::new();
        store.set(DEFAULT_SLOT, raw).unwrap();
        Persistence::new(store, DEFAULT_SLOT).load_with_source()
    }

    #[test]
    fn unreadable_task_does_not_discard_the_board() {
        let raw = r#"[
            {"id":"1","title":"To Do","isDefault":true,"tasks":[
                {"id":"a","name":"Kept","deadline":"2024-03-20T10:00","column":"1"},
                {"id":"b","name":"Broken","deadline":"next week","column":"1"}
            ]},
            {"id":"2","title":"In Progress","isDefault":true,"tasks":[
                {"id":"c","name":"Also kept","deadline":"2024-03-22","column":"2","favorite":true}
            ]},
            {"id":"x","title":"Later","tasks":[{"name":"no id"}]}
        ]"#;

        let (board, source) = load_raw(raw);

        assert_eq!(
            source,
            LoadSource::Repaired(Repairs {
                unreadable: 2,
                ..Repairs::default()
            })
        );
        let ids: Vec<_> = board.columns.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "x"]);
        assert_eq!(board.task_count(), 2);
        let (kept, _) = board.find_task("a").expect("task a kept");
        assert_eq!(kept.deadline.to_string(), "2024-03-20");
        assert!(board.find_task("c").expect("task c kept").0.favorite);
        assert!(board.columns[2].tasks.is_empty());
    }

    #[test]
    fn duplicate_task_ids_are_collapsed_on_load() {
        let raw = r#"[
            {"id":"1","title":"To Do","isDefault":true,"tasks":[
                {"id":"a","name":"First","deadline":"2024-03-20","column":"1"}
            ]},
            {"id":"2","title":"In Progress","isDefault":true,"tasks":[
                {"id":"a","name":"Copy","deadline":"2024-03-20","column":"1"}
            ]}
        ]"#;

        let (board, source) = load_raw(raw);

        assert_eq!(
            source,
            LoadSource::Repaired(Repairs {
                duplicates: 1,
                ..Repairs::default()
            })
        );
        assert_eq!(board.task_count(), 1);
        assert_eq!(board.find_task("a").expect("task a").1.id, "1");
    }

    #[test]
    fn save_surfaces_quota_errors() {
        let persistence = Persistence::new(MemorySlotStore::with_quota(16), DEFAULT_SLOT);
        let err = persistence.save(&sample_board()).unwrap_err();
        assert!(matches!(err, Error::QuotaExceeded { .. }));
    }
}
