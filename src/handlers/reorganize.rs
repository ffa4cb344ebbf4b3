use axum::extract::State;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::extract::Json;
use crate::handlers::owned_board;
use crate::models::{
    ApplyClustersRequest, ApplyClustersResponse, BoardRequest, BulkDeleteRequest, BulkMoveRequest,
    ClusterView, CountResponse, MessageResponse, PreviewClustersRequest, PreviewClustersResponse,
    UncodedCard, UncodedCardsResponse,
};
use crate::services::{clustering::ClusterParams, reorganize, undo};
use crate::state::AppState;

pub async fn preview_clusters(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<PreviewClustersRequest>,
) -> Result<Json<PreviewClustersResponse>> {
    owned_board(&state, input.board_id, auth.user.id).await?;

    let params = ClusterParams::new(input.max_distance, input.min_size, input.max_size)?;
    let clusters = reorganize::preview_clusters(&state, input.board_id, &params).await?;

    let total_clustered = clusters.iter().map(|c| c.count()).sum();
    let clusters = clusters
        .into_iter()
        .map(|c| ClusterView {
            center: c.center,
            count: c.count(),
            is_outlier: c.is_outlier,
            members: c.members,
        })
        .collect();

    Ok(Json(PreviewClustersResponse {
        success: true,
        clusters,
        total_clustered,
    }))
}

pub async fn apply_clusters(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ApplyClustersRequest>,
) -> Result<Json<ApplyClustersResponse>> {
    owned_board(&state, input.board_id, auth.user.id).await?;

    let outcome =
        reorganize::apply_clusters(&state, input.board_id, &input.clusters, &auth.user.name)
            .await?;

    Ok(Json(ApplyClustersResponse {
        success: true,
        created_lists: outcome.created_lists,
        moved_cards: outcome.moved_cards,
        message: format!(
            "Created {} lists with {} cards",
            outcome.created_lists, outcome.moved_cards
        ),
    }))
}

pub async fn bulk_move(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<BulkMoveRequest>,
) -> Result<Json<CountResponse>> {
    owned_board(&state, input.board_id, auth.user.id).await?;

    let count = reorganize::bulk_move(
        &state,
        input.board_id,
        &input.card_ids,
        input.target_list_id,
        &auth.user.name,
    )
    .await?;

    Ok(Json(CountResponse {
        success: true,
        count,
    }))
}

pub async fn bulk_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<BulkDeleteRequest>,
) -> Result<Json<CountResponse>> {
    owned_board(&state, input.board_id, auth.user.id).await?;

    let count =
        reorganize::bulk_delete(&state, input.board_id, &input.card_ids, &auth.user.name).await?;

    Ok(Json(CountResponse {
        success: true,
        count,
    }))
}

pub async fn undo_last(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<BoardRequest>,
) -> Result<Json<MessageResponse>> {
    owned_board(&state, input.board_id, auth.user.id).await?;

    let action = undo::undo_last(&state, input.board_id, &auth.user.name).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: format!("Undid: {}", action),
    }))
}

pub async fn uncoded_cards(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<BoardRequest>,
) -> Result<Json<UncodedCardsResponse>> {
    owned_board(&state, input.board_id, auth.user.id).await?;

    let cards: Vec<UncodedCard> = reorganize::uncoded_cards(&state, input.board_id)
        .await?
        .iter()
        .map(UncodedCard::from)
        .collect();

    Ok(Json(UncodedCardsResponse {
        success: true,
        count: cards.len(),
        cards,
    }))
}
