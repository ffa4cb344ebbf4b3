use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::extract::Json;
use crate::handlers::owned_board;
use crate::models::{
    Board, BoardSummary, BoardWithDetails, CreateBoard, HistoryResponse, ListResponse, UpdateBoard,
};
use crate::services::export::{self, ExportFormat};
use crate::state::AppState;

pub async fn create_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateBoard>,
) -> Result<Json<Board>> {
    if input.name.trim().is_empty() {
        return Err(AppError::Validation("Board name is required".to_string()));
    }

    let board = state
        .boards
        .create(
            auth.user.id,
            input.name.trim(),
            input.description.as_deref(),
            input.icon.as_deref(),
        )
        .await?;
    state.journal.open(board.id);
    tracing::info!(board_id = %board.id, owner = %auth.user.id, "board created");

    Ok(Json(board))
}

pub async fn list_boards(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<BoardSummary>>> {
    Ok(Json(state.boards.list_by_owner(auth.user.id).await?))
}

pub async fn get_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
) -> Result<Json<BoardWithDetails>> {
    let board = owned_board(&state, board_id, auth.user.id).await?;

    let mut conn = state.conn().await?;
    let lists = state.lists.list_by_board(&mut conn, board_id).await?;

    let mut list_responses = Vec::with_capacity(lists.len());
    for list in lists {
        let cards = state.cards.list_by_list(&mut conn, list.id).await?;
        let mut response: ListResponse = list.into();
        response.cards = cards;
        list_responses.push(response);
    }

    Ok(Json(BoardWithDetails {
        board,
        lists: list_responses,
    }))
}

pub async fn update_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
    Json(input): Json<UpdateBoard>,
) -> Result<Json<Board>> {
    owned_board(&state, board_id, auth.user.id).await?;

    if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Validation("Board name cannot be empty".to_string()));
    }

    let board = state
        .boards
        .update(
            board_id,
            input.name.as_deref().map(str::trim),
            input.description.as_deref(),
            input.icon.as_deref(),
        )
        .await?;

    Ok(Json(board))
}

pub async fn delete_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
) -> Result<()> {
    owned_board(&state, board_id, auth.user.id).await?;

    // Wait for in-flight mutations of this board before dropping its ledger.
    let ledger = state.journal.lock(board_id).await;
    state.boards.delete(board_id).await?;
    drop(ledger);
    state.journal.forget(board_id);
    tracing::info!(%board_id, "board deleted");

    Ok(())
}

pub async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
) -> Result<Json<HistoryResponse>> {
    owned_board(&state, board_id, auth.user.id).await?;

    let ledger = state.journal.lock(board_id).await;
    Ok(Json(HistoryResponse {
        events: ledger.history(),
        undo_depth: ledger.undo_depth(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

/// Downloads every contact of the board as CSV or JSON.
pub async fn export(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<Response> {
    let board = owned_board(&state, board_id, auth.user.id).await?;
    let format: ExportFormat = query.format.as_deref().unwrap_or("csv").parse()?;

    let rows = export::board_rows(&state, board_id).await?;
    let body = match format {
        ExportFormat::Csv => export::to_csv(&rows)?,
        ExportFormat::Json => export::to_json(&rows)?,
    };
    tracing::info!(%board_id, rows = rows.len(), format = format.extension(), "board exported");

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export::file_name(&board.name, format)
    );
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
