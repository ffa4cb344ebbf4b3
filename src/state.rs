use sqlx::{pool::PoolConnection, Sqlite, SqlitePool, Transaction};
use std::sync::Arc;

use crate::config::ReorganizeConfig;
use crate::error::Result;
use crate::repo::{
    BoardRepository, CardRepository, ListRepository, SessionRepository, UserRepository,
};
use crate::services::journal::BoardJournal;

#[derive(Clone)]
pub struct AppState {
    pub users: UserRepository,
    pub sessions: SessionRepository,
    pub boards: BoardRepository,
    pub lists: ListRepository,
    pub cards: CardRepository,
    pub journal: BoardJournal,
    pub reorganize: Arc<ReorganizeConfig>,
    pub pool: Arc<SqlitePool>,
}

impl AppState {
    pub fn new(pool: SqlitePool, reorganize: ReorganizeConfig) -> Self {
        let pool = Arc::new(pool);
        Self {
            users: UserRepository::new(pool.clone()),
            sessions: SessionRepository::new(pool.clone()),
            boards: BoardRepository::new(pool.clone()),
            lists: ListRepository::new(),
            cards: CardRepository::new(),
            journal: BoardJournal::new(),
            reorganize: Arc::new(reorganize),
            pool,
        }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    pub async fn conn(&self) -> Result<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await?)
    }
}
