//! In-memory board state with write-through persistence.
//!
//! The [`Store`] owns the authoritative board. Every replacement is saved to
//! the slot before observers are notified. A failed save is logged and the
//! in-memory board stays authoritative until the next successful save.

use crate::model::Board;
use crate::persist::{LoadSource, Persistence};
use crate::storage::SlotStore;

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Result of persisting a board replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Failed(String),
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }
}

type Observer = Box<dyn FnMut(&Board)>;

pub struct Store<S> {
    board: Board,
    persistence: Persistence<S>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
    load_source: LoadSource,
    last_save: SaveOutcome,
}

impl<S: SlotStore> Store<S> {
    /// Open the store, loading the board from the slot (or defaults).
    pub fn open(persistence: Persistence<S>) -> Self {
        let (board, load_source) = persistence.load_with_source();
        Self {
            board,
            persistence,
            observers: Vec::new(),
            next_subscription: 0,
            load_source,
            last_save: SaveOutcome::Saved,
        }
    }

    /// Current board. Read-only; use [`Store::set_board`] to change it.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Owned copy of the current board.
    pub fn snapshot(&self) -> Board {
        self.board.clone()
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    /// How the most recent load resolved.
    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    pub fn last_save(&self) -> &SaveOutcome {
        &self.last_save
    }

    /// Replace the board, persist it and notify observers.
    pub fn set_board(&mut self, board: Board) -> &SaveOutcome {
        self.board = board;
        self.last_save = match self.persistence.save(&self.board) {
            Ok(()) => SaveOutcome::Saved,
            Err(err) => {
                tracing::error!(
                    slot = %self.persistence.slot(),
                    error = %err,
                    "failed to persist board; keeping in-memory state"
                );
                SaveOutcome::Failed(err.to_string())
            }
        };
        self.notify();
        &self.last_save
    }

    /// Reload from the slot, discarding unsaved state, and republish.
    pub fn reload(&mut self) -> &SaveOutcome {
        let (board, source) = self.persistence.load_with_source();
        self.load_source = source;
        self.set_board(board)
    }

    /// Register an observer called with the board after every replacement.
    pub fn subscribe(&mut self, observer: impl FnMut(&Board) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn notify(&mut self) {
        for (_, observer) in &mut self.observers {
            observer(&self.board);
        }
    }
}

impl<S> std::fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("board", &self.board)
            .field("observers", &self.observers.len())
            .field("load_source", &self.load_source)
            .field("last_save", &self.last_save)
            .finish()
    }
}
