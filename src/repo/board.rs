use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Board, BoardSummary, DEFAULT_BOARD_ICON};

#[derive(Clone)]
pub struct BoardRepository {
    pool: Arc<SqlitePool>,
}

impl BoardRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        name: &str,
        description: Option<&str>,
        icon: Option<&str>,
    ) -> Result<Board> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (id, name, description, icon, owner_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, datetime('now'), datetime('now'))
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(icon.unwrap_or(DEFAULT_BOARD_ICON))
        .bind(owner_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(board)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Board>> {
        let board = sqlx::query_as::<_, Board>("SELECT * FROM boards WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(board)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Board> {
        self.find_by_id(id).await?.ok_or(AppError::NotFound("Board"))
    }

    /// The owner's boards, most recently touched first, with list and
    /// contact counts.
    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<BoardSummary>> {
        let boards = sqlx::query_as::<_, BoardSummary>(
            r#"
            SELECT b.*,
                   (SELECT COUNT(*) FROM lists l WHERE l.board_id = b.id) AS list_count,
                   (SELECT COUNT(*) FROM cards c
                      INNER JOIN lists l ON c.list_id = l.id
                      WHERE l.board_id = b.id) AS card_count
            FROM boards b
            WHERE b.owner_id = $1
            ORDER BY b.updated_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(boards)
    }

    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        icon: Option<&str>,
    ) -> Result<Board> {
        sqlx::query_as::<_, Board>(
            r#"
            UPDATE boards
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                icon = COALESCE($4, icon),
                updated_at = datetime('now')
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(icon)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(AppError::NotFound("Board"))
    }

    /// Deletes the board; its lists and cards go with it.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Board"));
        }

        Ok(())
    }
}
