//! Board mutations.
//!
//! Each operation copies the current board, applies the change to the copy and
//! hands the result to [`Store::set_board`]. An operation that fails leaves the
//! stored board untouched.
//!
//! Unknown task or column ids are errors in strict mode. In lenient mode they
//! are logged and ignored. The two column-deletion guards apply in both modes.

use crate::error::{Error, Result};
use crate::model::{Board, Column, Task, TaskInput};
use crate::store::{SaveOutcome, Store};
use crate::storage::SlotStore;

/// How unknown task or column ids are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundPolicy {
    /// Return `TaskNotFound` / `ColumnNotFound`.
    Strict,
    /// Leave the board unchanged and report success.
    Lenient,
}

impl NotFoundPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            NotFoundPolicy::Strict
        } else {
            NotFoundPolicy::Lenient
        }
    }
}

/// Outcome of a mutation that may have been skipped in lenient mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied<T> {
    Changed(T),
    Skipped,
}

impl<T> Applied<T> {
    pub fn changed(self) -> Option<T> {
        match self {
            Applied::Changed(value) => Some(value),
            Applied::Skipped => None,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Applied::Changed(_))
    }
}

/// The mutation API over a [`Store`].
#[derive(Debug)]
pub struct TaskBoard<S> {
    store: Store<S>,
    policy: NotFoundPolicy,
}

impl<S: SlotStore> TaskBoard<S> {
    pub fn new(store: Store<S>) -> Self {
        Self {
            store,
            policy: NotFoundPolicy::Strict,
        }
    }

    pub fn with_policy(mut self, policy: NotFoundPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> NotFoundPolicy {
        self.policy
    }

    pub fn board(&self) -> &Board {
        self.store.board()
    }

    pub fn store(&self) -> &Store<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store<S> {
        &mut self.store
    }

    pub fn last_save(&self) -> &SaveOutcome {
        self.store.last_save()
    }

    /// Look up a task by id.
    pub fn task(&self, task_id: &str) -> Result<&Task> {
        self.store
            .board()
            .find_task(task_id)
            .map(|(task, _)| task)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))
    }

    /// Append a new task to the column named by `input.column`.
    pub fn add_task(&mut self, input: TaskInput) -> Result<Applied<Task>> {
        let mut next = self.store.snapshot();
        let Some(column) = next.column_mut(&input.column) else {
            return self.missing(Error::ColumnNotFound(input.column));
        };

        let task = input.into_task();
        column.tasks.push(task.clone());
        tracing::debug!(task_id = %task.id, column = %task.column, "task added");
        self.commit(next);
        Ok(Applied::Changed(task))
    }

    /// Replace a task's fields, relocating it if its column changed.
    ///
    /// A task that stays in its column keeps its position; a relocated task
    /// is appended to the end of the target column.
    pub fn edit_task(&mut self, task: Task) -> Result<Applied<Task>> {
        let mut next = self.store.snapshot();
        let Some((from_idx, task_idx)) = next.locate_task(&task.id) else {
            return self.missing(Error::TaskNotFound(task.id));
        };

        if next.columns[from_idx].id == task.column {
            next.columns[from_idx].tasks[task_idx] = task.clone();
            tracing::debug!(task_id = %task.id, "task edited in place");
        } else {
            let Some(to_idx) = next.column_index(&task.column) else {
                return self.missing(Error::ColumnNotFound(task.column));
            };
            next.columns[from_idx].tasks.remove(task_idx);
            next.columns[to_idx].tasks.push(task.clone());
            tracing::debug!(
                task_id = %task.id,
                from = %next.columns[from_idx].id,
                to = %task.column,
                "task edited and relocated"
            );
        }

        self.commit(next);
        Ok(Applied::Changed(task))
    }

    /// Remove a task from whichever column holds it.
    pub fn delete_task(&mut self, task_id: &str) -> Result<Applied<Task>> {
        let mut next = self.store.snapshot();
        let Some((col_idx, task_idx)) = next.locate_task(task_id) else {
            return self.missing(Error::TaskNotFound(task_id.to_string()));
        };

        let removed = next.columns[col_idx].tasks.remove(task_idx);
        tracing::debug!(task_id, column = %removed.column, "task deleted");
        self.commit(next);
        Ok(Applied::Changed(removed))
    }

    /// Move a task to another column, changing nothing but `column`.
    ///
    /// Moving a task to the column it is already in leaves it where it is.
    pub fn move_task(&mut self, task_id: &str, target_column: &str) -> Result<Applied<Task>> {
        let mut next = self.store.snapshot();
        let Some((from_idx, task_idx)) = next.locate_task(task_id) else {
            return self.missing(Error::TaskNotFound(task_id.to_string()));
        };
        let Some(to_idx) = next.column_index(target_column) else {
            return self.missing(Error::ColumnNotFound(target_column.to_string()));
        };

        if from_idx == to_idx {
            return Ok(Applied::Changed(next.columns[from_idx].tasks[task_idx].clone()));
        }

        let mut task = next.columns[from_idx].tasks.remove(task_idx);
        task.column = target_column.to_string();
        next.columns[to_idx].tasks.push(task.clone());
        tracing::debug!(task_id, from = %next.columns[from_idx].id, to = target_column, "task moved");
        self.commit(next);
        Ok(Applied::Changed(task))
    }

    /// Append a user column. The title is expected to be validated already.
    pub fn add_column(&mut self, title: impl Into<String>) -> Column {
        let mut next = self.store.snapshot();
        let column = Column::new(title);
        next.columns.push(column.clone());
        tracing::debug!(column_id = %column.id, title = %column.title, "column added");
        self.commit(next);
        column
    }

    /// Delete an empty, user-created column.
    pub fn delete_column(&mut self, column_id: &str) -> Result<Applied<Column>> {
        let mut next = self.store.snapshot();
        let Some(col_idx) = next.column_index(column_id) else {
            return self.missing(Error::ColumnNotFound(column_id.to_string()));
        };

        let column = &next.columns[col_idx];
        if column.is_default {
            return Err(Error::DefaultColumnProtected(column_id.to_string()));
        }
        if !column.tasks.is_empty() {
            return Err(Error::ColumnNotEmpty {
                id: column_id.to_string(),
                tasks: column.tasks.len(),
            });
        }

        let removed = next.columns.remove(col_idx);
        tracing::debug!(column_id, "column deleted");
        self.commit(next);
        Ok(Applied::Changed(removed))
    }

    /// Reload the board from the slot, discarding unsaved in-memory state.
    pub fn refresh_board(&mut self) -> &Board {
        tracing::debug!("refreshing board from slot");
        self.store.reload();
        self.store.board()
    }

    fn commit(&mut self, next: Board) {
        debug_assert!(next.check_integrity().is_empty());
        self.store.set_board(next);
    }

    fn missing<T>(&self, err: Error) -> Result<Applied<T>> {
        match self.policy {
            NotFoundPolicy::Strict => Err(err),
            NotFoundPolicy::Lenient => {
                tracing::debug!(reason = %err, "ignoring mutation");
                Ok(Applied::Skipped)
            }
        }
    }
}
