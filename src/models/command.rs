use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{Card, List};

/// A list as it was right before deletion, cards in list order.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot {
    pub list: List,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovedCard {
    pub card_id: Uuid,
    pub source_list_id: Uuid,
    /// Index in the source list at the moment the card left it.
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeletedCard {
    pub card: Card,
    pub source_list_id: Uuid,
    pub position: i32,
}

/// One reversible board mutation. Every variant owns exactly what its
/// reversal needs; nothing points back into live state.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateCard { card_id: Uuid, list_id: Uuid },
    DeleteCard { card: Card, list_id: Uuid, position: i32 },
    CreateList { list_id: Uuid },
    DeleteList { snapshot: ListSnapshot, position: i32 },
    BulkMove { moves: Vec<MovedCard> },
    BulkDelete { cards: Vec<DeletedCard> },
}

impl Command {
    /// Human label of the action this command records.
    pub fn label(&self) -> &'static str {
        match self {
            Command::CreateCard { .. } => "Create Card",
            Command::DeleteCard { .. } => "Delete Card",
            Command::CreateList { .. } => "Create List",
            Command::DeleteList { .. } => "Delete List",
            Command::BulkMove { moves } if moves.len() == 1 => "Move Card",
            Command::BulkMove { .. } => "Move Cards",
            Command::BulkDelete { .. } => "Delete Cards",
        }
    }
}

/// Audit entry shown in a board's history. Never reversed.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub actor: String,
    pub action: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub events: Vec<Event>,
    pub undo_depth: usize,
}
