pub mod auth;
pub mod boards;
pub mod cards;
pub mod lists;
pub mod reorganize;

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Board;
use crate::state::AppState;

/// Loads a board the caller owns: 404 if it does not exist, 403 if it
/// belongs to someone else.
pub(crate) async fn owned_board(state: &AppState, board_id: Uuid, user_id: Uuid) -> Result<Board> {
    let board = state.boards.get_by_id(board_id).await?;
    if !board.is_owned_by(user_id) {
        return Err(AppError::Forbidden);
    }
    Ok(board)
}
