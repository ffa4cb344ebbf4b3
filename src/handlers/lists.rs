use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::extract::Json;
use crate::handlers::owned_board;
use crate::models::{CreateList, ListResponse, MoveList, UpdateList, DEFAULT_LIST_COLOR};
use crate::services::reorganize;
use crate::state::AppState;

pub async fn create_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
    Json(input): Json<CreateList>,
) -> Result<(StatusCode, Json<ListResponse>)> {
    owned_board(&state, board_id, auth.user.id).await?;

    if input.name.trim().is_empty() {
        return Err(AppError::Validation("List name is required".to_string()));
    }

    let color = input.color.as_deref().unwrap_or(DEFAULT_LIST_COLOR);
    let list = reorganize::create_list(
        &state,
        board_id,
        input.name.trim(),
        color,
        input.position,
        &auth.user.name,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(list.into())))
}

pub async fn list_lists(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(board_id): Path<Uuid>,
) -> Result<Json<Vec<ListResponse>>> {
    owned_board(&state, board_id, auth.user.id).await?;

    let mut conn = state.conn().await?;
    let lists = state.lists.list_by_board(&mut conn, board_id).await?;
    Ok(Json(lists.into_iter().map(|l| l.into()).collect()))
}

pub async fn update_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<Uuid>,
    Json(input): Json<UpdateList>,
) -> Result<Json<ListResponse>> {
    let board_id = {
        let mut conn = state.conn().await?;
        state.lists.get_by_id(&mut conn, list_id).await?.board_id
    };
    owned_board(&state, board_id, auth.user.id).await?;

    if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Validation("List name cannot be empty".to_string()));
    }

    let mut conn = state.conn().await?;
    let updated = state
        .lists
        .update(
            &mut conn,
            list_id,
            input.name.as_deref().map(str::trim),
            input.color.as_deref(),
        )
        .await?;
    Ok(Json(updated.into()))
}

pub async fn delete_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<Uuid>,
) -> Result<()> {
    let list = {
        let mut conn = state.conn().await?;
        state.lists.get_by_id(&mut conn, list_id).await?
    };
    owned_board(&state, list.board_id, auth.user.id).await?;

    reorganize::delete_list(&state, list.board_id, list_id, &auth.user.name).await
}

pub async fn move_list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<Uuid>,
    Json(input): Json<MoveList>,
) -> Result<Json<ListResponse>> {
    let board_id = {
        let mut conn = state.conn().await?;
        state.lists.get_by_id(&mut conn, list_id).await?.board_id
    };
    owned_board(&state, board_id, auth.user.id).await?;

    // Reordering shares the board lock so it cannot interleave with an undo.
    let _ledger = state.journal.lock(board_id).await;
    let mut tx = state.begin().await?;
    let list = state.lists.get_by_id(&mut tx, list_id).await?;
    let updated = state.lists.move_list(&mut tx, &list, input.position).await?;
    tx.commit().await?;

    Ok(Json(updated.into()))
}
