use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::list::ListResponse;

pub const DEFAULT_BOARD_ICON: &str = "👥";

/// A board belongs to the user who created it; only that user can see or
/// change it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub icon: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// Board list entry with how many lists and contacts it holds.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct BoardSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub board: Board,
    pub list_count: i64,
    pub card_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateBoard {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBoard {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BoardWithDetails {
    #[serde(flatten)]
    pub board: Board,
    pub lists: Vec<ListResponse>,
}
