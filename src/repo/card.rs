use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Card, CardFields};

/// Card persistence. Every method runs on a caller-supplied connection so a
/// whole logical operation can share one transaction. Positions stay
/// contiguous (`0..n`) within a list.
#[derive(Clone, Copy, Default)]
pub struct CardRepository;

impl CardRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create(
        &self,
        conn: &mut SqliteConnection,
        list_id: Uuid,
        first_name: &str,
        fields: &CardFields,
        created_by: Uuid,
    ) -> Result<Card> {
        let id = Uuid::new_v4();
        let position = self.open_slot(conn, list_id, None, id).await?;

        let card = sqlx::query_as::<_, Card>(
            r#"
            INSERT INTO cards (id, list_id, first_name, last_name, address, phone, email, age, occupation,
                               marital_status, birth_date, spouse_name, children_count, children_ages,
                               baptized, is_leader, ministry, notes, latitude, longitude, position,
                               created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18,
                    $19, $20, $21, $22, datetime('now'), datetime('now'))
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(list_id)
        .bind(first_name.trim())
        .bind(fields.last_name.as_deref())
        .bind(fields.address.as_deref())
        .bind(fields.phone.as_deref())
        .bind(fields.email.as_deref())
        .bind(fields.age)
        .bind(fields.occupation.as_deref())
        .bind(fields.marital_status.as_deref())
        .bind(fields.birth_date)
        .bind(fields.spouse_name.as_deref())
        .bind(fields.children_count.unwrap_or(0))
        .bind(fields.children_ages.as_deref())
        .bind(fields.baptized.unwrap_or(false))
        .bind(fields.is_leader.unwrap_or(false))
        .bind(fields.ministry.as_deref())
        .bind(fields.notes.as_deref())
        .bind(fields.latitude)
        .bind(fields.longitude)
        .bind(position)
        .bind(created_by)
        .fetch_one(&mut *conn)
        .await?;

        Ok(card)
    }

    /// Re-inserts a deleted card with its original id and field values at
    /// `position` (clamped to the list length). Returns the stored card.
    pub async fn restore(
        &self,
        conn: &mut SqliteConnection,
        snapshot: &Card,
        list_id: Uuid,
        position: i32,
    ) -> Result<Card> {
        let position = self
            .open_slot(conn, list_id, Some(position), snapshot.id)
            .await?;

        let card = sqlx::query_as::<_, Card>(
            r#"
            INSERT INTO cards (id, list_id, first_name, last_name, address, phone, email, age, occupation,
                               marital_status, birth_date, spouse_name, children_count, children_ages,
                               baptized, is_leader, ministry, notes, latitude, longitude, position,
                               created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18,
                    $19, $20, $21, $22, $23, $24)
            RETURNING *
            "#,
        )
        .bind(snapshot.id)
        .bind(list_id)
        .bind(&snapshot.first_name)
        .bind(snapshot.last_name.as_deref())
        .bind(snapshot.address.as_deref())
        .bind(snapshot.phone.as_deref())
        .bind(snapshot.email.as_deref())
        .bind(snapshot.age)
        .bind(snapshot.occupation.as_deref())
        .bind(snapshot.marital_status.as_deref())
        .bind(snapshot.birth_date)
        .bind(snapshot.spouse_name.as_deref())
        .bind(snapshot.children_count)
        .bind(snapshot.children_ages.as_deref())
        .bind(snapshot.baptized)
        .bind(snapshot.is_leader)
        .bind(snapshot.ministry.as_deref())
        .bind(snapshot.notes.as_deref())
        .bind(snapshot.latitude)
        .bind(snapshot.longitude)
        .bind(position)
        .bind(snapshot.created_by)
        .bind(snapshot.created_at)
        .bind(snapshot.updated_at)
        .fetch_one(&mut *conn)
        .await?;

        Ok(card)
    }

    pub async fn find_by_id(&self, conn: &mut SqliteConnection, id: Uuid) -> Result<Option<Card>> {
        let card = sqlx::query_as::<_, Card>("SELECT * FROM cards WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(card)
    }

    pub async fn get_by_id(&self, conn: &mut SqliteConnection, id: Uuid) -> Result<Card> {
        self.find_by_id(conn, id)
            .await?
            .ok_or(AppError::NotFound("Card"))
    }

    /// Looks a card up only if it lives on `board_id`.
    pub async fn find_on_board(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        board_id: Uuid,
    ) -> Result<Option<Card>> {
        let card = sqlx::query_as::<_, Card>(
            r#"
            SELECT c.* FROM cards c
            INNER JOIN lists l ON c.list_id = l.id
            WHERE c.id = $1 AND l.board_id = $2
            "#,
        )
        .bind(id)
        .bind(board_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(card)
    }

    pub async fn list_by_list(&self, conn: &mut SqliteConnection, list_id: Uuid) -> Result<Vec<Card>> {
        let cards = sqlx::query_as::<_, Card>(
            "SELECT * FROM cards WHERE list_id = $1 ORDER BY position ASC",
        )
        .bind(list_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(cards)
    }

    /// All cards of a board in display order: list by list, top to bottom.
    pub async fn list_by_board(&self, conn: &mut SqliteConnection, board_id: Uuid) -> Result<Vec<Card>> {
        let cards = sqlx::query_as::<_, Card>(
            r#"
            SELECT c.* FROM cards c
            INNER JOIN lists l ON c.list_id = l.id
            WHERE l.board_id = $1
            ORDER BY l.position ASC, c.position ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(cards)
    }

    /// Applies the fields that are present; absent fields keep their value.
    /// Coordinates are cleared through [`Self::clear_coordinates`].
    pub async fn update(&self, conn: &mut SqliteConnection, id: Uuid, fields: &CardFields) -> Result<Card> {
        let card = sqlx::query_as::<_, Card>(
            r#"
            UPDATE cards
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                address = COALESCE($4, address),
                phone = COALESCE($5, phone),
                email = COALESCE($6, email),
                age = COALESCE($7, age),
                occupation = COALESCE($8, occupation),
                marital_status = COALESCE($9, marital_status),
                birth_date = COALESCE($10, birth_date),
                spouse_name = COALESCE($11, spouse_name),
                children_count = COALESCE($12, children_count),
                children_ages = COALESCE($13, children_ages),
                baptized = COALESCE($14, baptized),
                is_leader = COALESCE($15, is_leader),
                ministry = COALESCE($16, ministry),
                notes = COALESCE($17, notes),
                latitude = COALESCE($18, latitude),
                longitude = COALESCE($19, longitude),
                updated_at = datetime('now')
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.first_name.as_deref().map(str::trim))
        .bind(fields.last_name.as_deref())
        .bind(fields.address.as_deref())
        .bind(fields.phone.as_deref())
        .bind(fields.email.as_deref())
        .bind(fields.age)
        .bind(fields.occupation.as_deref())
        .bind(fields.marital_status.as_deref())
        .bind(fields.birth_date)
        .bind(fields.spouse_name.as_deref())
        .bind(fields.children_count)
        .bind(fields.children_ages.as_deref())
        .bind(fields.baptized)
        .bind(fields.is_leader)
        .bind(fields.ministry.as_deref())
        .bind(fields.notes.as_deref())
        .bind(fields.latitude)
        .bind(fields.longitude)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(AppError::NotFound("Card"))?;

        Ok(card)
    }

    pub async fn set_coordinates(
        &self,
        conn: &mut SqliteConnection,
        id: Uuid,
        latitude: f64,
        longitude: f64,
    ) -> Result<Card> {
        let card = sqlx::query_as::<_, Card>(
            r#"
            UPDATE cards
            SET latitude = $2, longitude = $3, updated_at = datetime('now')
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(latitude)
        .bind(longitude)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(AppError::NotFound("Card"))?;

        Ok(card)
    }

    /// Marks the card as not geocoded again.
    pub async fn clear_coordinates(&self, conn: &mut SqliteConnection, id: Uuid) -> Result<Card> {
        sqlx::query_as::<_, Card>(
            r#"
            UPDATE cards
            SET latitude = NULL, longitude = NULL, updated_at = datetime('now')
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(AppError::NotFound("Card"))
    }

    pub async fn delete(&self, conn: &mut SqliteConnection, card: &Card) -> Result<()> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(card.id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Card"));
        }

        self.close_gap(conn, card.list_id, card.position, card.id)
            .await
    }

    /// Moves `card` into `list_id` at `position`, or to the end of the list
    /// when no position is given. Works for moves within the same list too.
    pub async fn move_card(
        &self,
        conn: &mut SqliteConnection,
        card: &Card,
        list_id: Uuid,
        position: Option<i32>,
    ) -> Result<Card> {
        self.close_gap(conn, card.list_id, card.position, card.id)
            .await?;
        let position = self.open_slot(conn, list_id, position, card.id).await?;

        let moved = sqlx::query_as::<_, Card>(
            r#"
            UPDATE cards
            SET list_id = $2, position = $3, updated_at = datetime('now')
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(card.id)
        .bind(list_id)
        .bind(position)
        .fetch_one(&mut *conn)
        .await?;

        Ok(moved)
    }

    pub async fn get_board_id_for_card(&self, conn: &mut SqliteConnection, card_id: Uuid) -> Result<Uuid> {
        let board_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT l.board_id FROM cards c
            INNER JOIN lists l ON c.list_id = l.id
            WHERE c.id = $1
            "#,
        )
        .bind(card_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(AppError::NotFound("Card"))?;

        Ok(board_id)
    }

    /// Shifts the cards below `position` up by one after `card_id` left it.
    async fn close_gap(
        &self,
        conn: &mut SqliteConnection,
        list_id: Uuid,
        position: i32,
        card_id: Uuid,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE cards
            SET position = position - 1
            WHERE list_id = $1 AND position > $2 AND id != $3
            "#,
        )
        .bind(list_id)
        .bind(position)
        .bind(card_id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Makes room for `card_id` in `list_id` and returns the slot it should
    /// take. `None` or an out-of-range position means "append".
    async fn open_slot(
        &self,
        conn: &mut SqliteConnection,
        list_id: Uuid,
        position: Option<i32>,
        card_id: Uuid,
    ) -> Result<i32> {
        let len = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM cards WHERE list_id = $1 AND id != $2",
        )
        .bind(list_id)
        .bind(card_id)
        .fetch_one(&mut *conn)
        .await? as i32;

        let slot = match position {
            Some(p) if (0..=len).contains(&p) => p,
            _ => len,
        };

        sqlx::query(
            r#"
            UPDATE cards
            SET position = position + 1
            WHERE list_id = $1 AND position >= $2 AND id != $3
            "#,
        )
        .bind(list_id)
        .bind(slot)
        .bind(card_id)
        .execute(&mut *conn)
        .await?;

        Ok(slot)
    }
}
