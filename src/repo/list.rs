use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::List;

/// List persistence on a caller-supplied connection. Positions stay
/// contiguous within a board.
#[derive(Clone, Copy, Default)]
pub struct ListRepository;

impl ListRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create(
        &self,
        conn: &mut SqliteConnection,
        board_id: Uuid,
        name: &str,
        color: &str,
        position: Option<i32>,
    ) -> Result<List> {
        let id = Uuid::new_v4();
        let position = self.open_slot(conn, board_id, position, id).await?;

        let list = sqlx::query_as::<_, List>(
            r#"
            INSERT INTO lists (id, board_id, name, color, position, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, datetime('now'), datetime('now'))
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(board_id)
        .bind(name)
        .bind(color)
        .bind(position)
        .fetch_one(&mut *conn)
        .await?;

        Ok(list)
    }

    /// Re-inserts a deleted list with its original id at `position`.
    pub async fn restore(&self, conn: &mut SqliteConnection, snapshot: &List, position: i32) -> Result<List> {
        let position = self
            .open_slot(conn, snapshot.board_id, Some(position), snapshot.id)
            .await?;

        let list = sqlx::query_as::<_, List>(
            r#"
            INSERT INTO lists (id, board_id, name, color, position, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(snapshot.id)
        .bind(snapshot.board_id)
        .bind(&snapshot.name)
        .bind(&snapshot.color)
        .bind(position)
        .bind(snapshot.created_at)
        .bind(snapshot.updated_at)
        .fetch_one(&mut *conn)
        .await?;

        Ok(list)
    }

    pub async fn find_by_id(&self, conn: &mut SqliteConnection, id: Uuid) -> Result<Option<List>> {
        let list = sqlx::query_as::<_, List>("SELECT * FROM lists WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(list)
    }

    pub async fn get_by_id(&self, conn: &mut SqliteConnection, id: Uuid) -> Result<List> {
        self.find_by_id(conn, id)
            .await?
            .ok_or(AppError::NotFound("List"))
    }

    pub async fn list_by_board(&self, conn: &mut SqliteConnection, board_id: Uuid) -> Result<Vec<List>> {
        let lists = sqlx::query_as::<_, List>(
            "SELECT * FROM lists WHERE board_id = $1 ORDER BY position ASC",
        )
        .bind(board_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(lists)
    }

    pub async fn update(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<List> {
        let list = sqlx::query_as::<_, List>(
            r#"
            UPDATE lists
            SET name = COALESCE($2, name),
                color = COALESCE($3, color),
                updated_at = datetime('now')
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(color)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(AppError::NotFound("List"))?;

        Ok(list)
    }

    /// Deletes the list; its cards go with it through the foreign key cascade.
    pub async fn delete(&self, conn: &mut SqliteConnection, list: &List) -> Result<()> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(list.id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("List"));
        }

        sqlx::query(
            r#"
            UPDATE lists
            SET position = position - 1
            WHERE board_id = $1 AND position > $2
            "#,
        )
        .bind(list.board_id)
        .bind(list.position)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn move_list(&self, conn: &mut SqliteConnection, list: &List, new_position: i32) -> Result<List> {
        let last = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lists WHERE board_id = $1")
            .bind(list.board_id)
            .fetch_one(&mut *conn)
            .await? as i32
            - 1;
        let new_position = new_position.clamp(0, last.max(0));

        if new_position > list.position {
            sqlx::query(
                r#"
                UPDATE lists
                SET position = position - 1
                WHERE board_id = $1 AND position > $2 AND position <= $3
                "#,
            )
            .bind(list.board_id)
            .bind(list.position)
            .bind(new_position)
            .execute(&mut *conn)
            .await?;
        } else if new_position < list.position {
            sqlx::query(
                r#"
                UPDATE lists
                SET position = position + 1
                WHERE board_id = $1 AND position >= $2 AND position < $3
                "#,
            )
            .bind(list.board_id)
            .bind(new_position)
            .bind(list.position)
            .execute(&mut *conn)
            .await?;
        }

        let updated = sqlx::query_as::<_, List>(
            r#"
            UPDATE lists
            SET position = $2, updated_at = datetime('now')
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(list.id)
        .bind(new_position)
        .fetch_one(&mut *conn)
        .await?;

        Ok(updated)
    }

    async fn open_slot(
        &self,
        conn: &mut SqliteConnection,
        board_id: Uuid,
        position: Option<i32>,
        list_id: Uuid,
    ) -> Result<i32> {
        let len = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM lists WHERE board_id = $1 AND id != $2",
        )
        .bind(board_id)
        .bind(list_id)
        .fetch_one(&mut *conn)
        .await? as i32;

        let slot = match position {
            Some(p) if (0..=len).contains(&p) => p,
            _ => len,
        };

        sqlx::query(
            r#"
            UPDATE lists
            SET position = position + 1
            WHERE board_id = $1 AND position >= $2 AND id != $3
            "#,
        )
        .bind(board_id)
        .bind(slot)
        .bind(list_id)
        .execute(&mut *conn)
        .await?;

        Ok(slot)
    }
}
