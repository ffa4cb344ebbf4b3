use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::extract::Json;
use crate::handlers::owned_board;
use crate::models::{validate_coordinates, Card, CardFields, MoveCard, UpdateCoordinates};
use crate::services::reorganize;
use crate::state::AppState;

async fn board_of_list(state: &AppState, list_id: Uuid) -> Result<Uuid> {
    let mut conn = state.conn().await?;
    Ok(state.lists.get_by_id(&mut conn, list_id).await?.board_id)
}

async fn board_of_card(state: &AppState, card_id: Uuid) -> Result<Uuid> {
    let mut conn = state.conn().await?;
    state.cards.get_board_id_for_card(&mut conn, card_id).await
}

pub async fn create_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(list_id): Path<Uuid>,
    Json(input): Json<CardFields>,
) -> Result<(StatusCode, Json<Card>)> {
    let board_id = board_of_list(&state, list_id).await?;
    owned_board(&state, board_id, auth.user.id).await?;

    input.validate()?;
    let first_name = input
        .first_name
        .clone()
        .ok_or_else(|| AppError::Validation("First name is required".to_string()))?;

    let card = reorganize::create_card(
        &state,
        board_id,
        list_id,
        &first_name,
        &input,
        &auth.user.name,
        auth.user.id,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(card)))
}

pub async fn get_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<Uuid>,
) -> Result<Json<Card>> {
    let board_id = board_of_card(&state, card_id).await?;
    owned_board(&state, board_id, auth.user.id).await?;

    let mut conn = state.conn().await?;
    Ok(Json(state.cards.get_by_id(&mut conn, card_id).await?))
}

pub async fn update_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<Uuid>,
    Json(input): Json<CardFields>,
) -> Result<Json<Card>> {
    let board_id = board_of_card(&state, card_id).await?;
    owned_board(&state, board_id, auth.user.id).await?;

    input.validate()?;

    // Edits are not undoable, but they still wait for any undo in flight.
    let _ledger = state.journal.lock(board_id).await;
    let mut conn = state.conn().await?;
    Ok(Json(state.cards.update(&mut conn, card_id, &input).await?))
}

pub async fn delete_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<Uuid>,
) -> Result<()> {
    let board_id = board_of_card(&state, card_id).await?;
    owned_board(&state, board_id, auth.user.id).await?;

    reorganize::delete_card(&state, board_id, card_id, &auth.user.name).await
}

pub async fn move_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<Uuid>,
    Json(input): Json<MoveCard>,
) -> Result<Json<Card>> {
    let board_id = board_of_card(&state, card_id).await?;
    owned_board(&state, board_id, auth.user.id).await?;

    let card = reorganize::move_card(
        &state,
        board_id,
        card_id,
        input.list_id,
        input.position,
        &auth.user.name,
    )
    .await?;

    Ok(Json(card))
}

/// Stores coordinates resolved by the external geocoder.
pub async fn update_coordinates(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<Uuid>,
    Json(input): Json<UpdateCoordinates>,
) -> Result<Json<Card>> {
    let board_id = board_of_card(&state, card_id).await?;
    owned_board(&state, board_id, auth.user.id).await?;

    validate_coordinates(input.lat, input.lng)?;

    let _ledger = state.journal.lock(board_id).await;
    let mut conn = state.conn().await?;
    let card = state
        .cards
        .set_coordinates(&mut conn, card_id, input.lat, input.lng)
        .await?;

    Ok(Json(card))
}

/// Drops a bad geocode so the card shows up as uncoded again.
pub async fn clear_coordinates(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(card_id): Path<Uuid>,
) -> Result<Json<Card>> {
    let board_id = board_of_card(&state, card_id).await?;
    owned_board(&state, board_id, auth.user.id).await?;

    let _ledger = state.journal.lock(board_id).await;
    let mut conn = state.conn().await?;
    Ok(Json(state.cards.clear_coordinates(&mut conn, card_id).await?))
}
