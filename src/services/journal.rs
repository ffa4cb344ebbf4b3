//! Per-board transient state: the undo stack and the history log.
//!
//! Nothing here is persisted. Entries live for the lifetime of the process
//! and are dropped when their board is deleted.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::models::{Command, Event};

pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Default)]
pub struct BoardLedger {
    undo: Vec<Command>,
    /// Most recent first.
    history: VecDeque<Event>,
}

impl BoardLedger {
    pub fn push(&mut self, command: Command) {
        self.undo.push(command);
    }

    pub fn pop(&mut self) -> Option<Command> {
        self.undo.pop()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn record(&mut self, actor: &str, action: &str, detail: impl Into<String>) {
        self.history.push_front(Event {
            actor: actor.to_string(),
            action: action.to_string(),
            detail: detail.into(),
            timestamp: Utc::now(),
        });
        self.history.truncate(HISTORY_LIMIT);
    }

    pub fn history(&self) -> Vec<Event> {
        self.history.iter().cloned().collect()
    }
}

/// Side-table from board id to its ledger. Holding a board's guard
/// serializes every mutation of that board; other boards are unaffected.
#[derive(Clone, Default)]
pub struct BoardJournal {
    boards: Arc<Mutex<HashMap<Uuid, Arc<AsyncMutex<BoardLedger>>>>>,
}

impl BoardJournal {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, board_id: Uuid) -> Arc<AsyncMutex<BoardLedger>> {
        let mut boards = self.boards.lock().unwrap_or_else(PoisonError::into_inner);
        boards.entry(board_id).or_default().clone()
    }

    /// Registers a freshly created board.
    pub fn open(&self, board_id: Uuid) {
        self.entry(board_id);
    }

    /// Waits for exclusive access to the board's ledger. Boards created
    /// before this process started get an empty ledger on first use.
    pub async fn lock(&self, board_id: Uuid) -> OwnedMutexGuard<BoardLedger> {
        self.entry(board_id).lock_owned().await
    }

    /// Drops the ledger of a deleted board.
    pub fn forget(&self, board_id: Uuid) {
        let mut boards = self.boards.lock().unwrap_or_else(PoisonError::into_inner);
        boards.remove(&board_id);
    }
}
