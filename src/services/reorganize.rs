//! Board mutations that are recorded for undo, plus the clustering
//! preview/apply pair.
//!
//! Every mutating function follows the same shape: take the board's ledger
//! lock, run the whole change in one transaction, commit, and only then push
//! the command and append the history event.

use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    ApplyCluster, Card, CardFields, ClusterMember, Command, DeletedCard, List, ListSnapshot,
    MovedCard,
};
use crate::services::clustering::{create_clusters, Cluster, ClusterParams};
use crate::state::AppState;

pub async fn create_card(
    state: &AppState,
    board_id: Uuid,
    list_id: Uuid,
    first_name: &str,
    fields: &CardFields,
    actor: &str,
    created_by: Uuid,
) -> Result<Card> {
    let mut ledger = state.journal.lock(board_id).await;
    let mut tx = state.begin().await?;

    let list = list_on_board(state, &mut tx, board_id, list_id).await?;
    let card = state
        .cards
        .create(&mut tx, list.id, first_name, fields, created_by)
        .await?;
    tx.commit().await?;

    ledger.push(Command::CreateCard {
        card_id: card.id,
        list_id: list.id,
    });
    ledger.record(
        actor,
        "Create Card",
        format!("Created \"{}\" in list \"{}\"", card.full_name(), list.name),
    );

    Ok(card)
}

pub async fn delete_card(state: &AppState, board_id: Uuid, card_id: Uuid, actor: &str) -> Result<()> {
    let mut ledger = state.journal.lock(board_id).await;
    let mut tx = state.begin().await?;

    let card = state
        .cards
        .find_on_board(&mut tx, card_id, board_id)
        .await?
        .ok_or(AppError::NotFound("Card"))?;
    let list = state.lists.get_by_id(&mut tx, card.list_id).await?;
    state.cards.delete(&mut tx, &card).await?;
    tx.commit().await?;

    let detail = format!("Deleted \"{}\" from list \"{}\"", card.full_name(), list.name);
    let (list_id, position) = (card.list_id, card.position);
    ledger.push(Command::DeleteCard {
        card,
        list_id,
        position,
    });
    ledger.record(actor, "Delete Card", detail);

    Ok(())
}

pub async fn create_list(
    state: &AppState,
    board_id: Uuid,
    name: &str,
    color: &str,
    position: Option<i32>,
    actor: &str,
) -> Result<List> {
    let mut ledger = state.journal.lock(board_id).await;
    let mut tx = state.begin().await?;
    let list = state
        .lists
        .create(&mut tx, board_id, name, color, position)
        .await?;
    tx.commit().await?;

    ledger.push(Command::CreateList { list_id: list.id });
    ledger.record(actor, "Create List", format!("Created list \"{}\"", list.name));

    Ok(list)
}

/// Deletes a list together with its cards; the snapshot keeps both.
pub async fn delete_list(state: &AppState, board_id: Uuid, list_id: Uuid, actor: &str) -> Result<()> {
    let mut ledger = state.journal.lock(board_id).await;
    let mut tx = state.begin().await?;

    let list = list_on_board(state, &mut tx, board_id, list_id).await?;
    let cards = state.cards.list_by_list(&mut tx, list.id).await?;
    state.lists.delete(&mut tx, &list).await?;
    tx.commit().await?;

    let detail = format!("Deleted list \"{}\" with {} cards", list.name, cards.len());
    let position = list.position;
    ledger.push(Command::DeleteList {
        snapshot: ListSnapshot { list, cards },
        position,
    });
    ledger.record(actor, "Delete List", detail);

    Ok(())
}

/// Moves one card to `list_id` at `position` (end of list when omitted).
pub async fn move_card(
    state: &AppState,
    board_id: Uuid,
    card_id: Uuid,
    list_id: Uuid,
    position: Option<i32>,
    actor: &str,
) -> Result<Card> {
    let mut ledger = state.journal.lock(board_id).await;
    let mut tx = state.begin().await?;

    let card = state
        .cards
        .find_on_board(&mut tx, card_id, board_id)
        .await?
        .ok_or(AppError::NotFound("Card"))?;
    let target = list_on_board(state, &mut tx, board_id, list_id).await?;
    let moved = state
        .cards
        .move_card(&mut tx, &card, target.id, position)
        .await?;
    tx.commit().await?;

    if moved.list_id != card.list_id || moved.position != card.position {
        ledger.push(Command::BulkMove {
            moves: vec![MovedCard {
                card_id: card.id,
                source_list_id: card.list_id,
                position: card.position,
            }],
        });
        ledger.record(
            actor,
            "Move Card",
            format!("Moved \"{}\" to \"{}\"", card.full_name(), target.name),
        );
    }

    Ok(moved)
}

/// Moves every listed card that is on the board and not already in the
/// target list. Returns how many actually moved.
pub async fn bulk_move(
    state: &AppState,
    board_id: Uuid,
    card_ids: &[Uuid],
    target_list_id: Uuid,
    actor: &str,
) -> Result<usize> {
    if card_ids.is_empty() {
        return Err(AppError::Validation("No cards selected".to_string()));
    }

    let mut ledger = state.journal.lock(board_id).await;
    let mut tx = state.begin().await?;

    let target = list_on_board(state, &mut tx, board_id, target_list_id).await?;
    let moves = relocate(state, &mut tx, board_id, card_ids, &target).await?;
    tx.commit().await?;

    let count = moves.len();
    if count > 0 {
        ledger.push(Command::BulkMove { moves });
        ledger.record(
            actor,
            "Move Cards",
            format!("Moved {} cards to \"{}\"", count, target.name),
        );
    }
    tracing::info!(%board_id, requested = card_ids.len(), moved = count, "bulk move");

    Ok(count)
}

/// Deletes every listed card found on the board. Returns how many were
/// deleted.
pub async fn bulk_delete(state: &AppState, board_id: Uuid, card_ids: &[Uuid], actor: &str) -> Result<usize> {
    if card_ids.is_empty() {
        return Err(AppError::Validation("No cards selected".to_string()));
    }

    let mut ledger = state.journal.lock(board_id).await;
    let mut tx = state.begin().await?;

    let mut deleted = Vec::new();
    for &card_id in card_ids {
        let Some(card) = state.cards.find_on_board(&mut tx, card_id, board_id).await? else {
            continue;
        };
        state.cards.delete(&mut tx, &card).await?;
        deleted.push(DeletedCard {
            source_list_id: card.list_id,
            position: card.position,
            card,
        });
    }
    tx.commit().await?;

    let count = deleted.len();
    if count > 0 {
        ledger.push(Command::BulkDelete { cards: deleted });
        ledger.record(actor, "Delete Cards", format!("Deleted {} cards", count));
    }
    tracing::info!(%board_id, requested = card_ids.len(), deleted = count, "bulk delete");

    Ok(count)
}

/// Groups the board's coded cards, in board order. Read-only.
pub async fn preview_clusters(
    state: &AppState,
    board_id: Uuid,
    params: &ClusterParams,
) -> Result<Vec<Cluster<ClusterMember>>> {
    let mut conn = state.conn().await?;
    let members: Vec<ClusterMember> = state
        .cards
        .list_by_board(&mut conn, board_id)
        .await?
        .iter()
        .filter_map(ClusterMember::from_card)
        .collect();

    Ok(create_clusters(members, params))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub created_lists: usize,
    pub moved_cards: usize,
}

/// Turns previewed clusters into lists. Outlier clusters are skipped; each
/// applied cluster records a `CreateList` followed by a `BulkMove`, so undo
/// hands the cards back before it removes the list.
pub async fn apply_clusters(
    state: &AppState,
    board_id: Uuid,
    clusters: &[ApplyCluster],
    actor: &str,
) -> Result<ApplyOutcome> {
    if clusters.is_empty() {
        return Err(AppError::Validation("No clusters to apply".to_string()));
    }
    if clusters
        .iter()
        .any(|c| !c.is_outlier && c.members.is_empty())
    {
        return Err(AppError::Validation("Cluster has no members".to_string()));
    }

    let config = state.reorganize.clone();
    let mut ledger = state.journal.lock(board_id).await;
    let mut tx = state.begin().await?;

    let mut commands = Vec::new();
    let mut outcome = ApplyOutcome {
        created_lists: 0,
        moved_cards: 0,
    };

    for (index, cluster) in clusters.iter().enumerate() {
        if cluster.is_outlier {
            continue;
        }

        let name = format!("{} {}", config.list_prefix, index + 1);
        let list = state
            .lists
            .create(&mut tx, board_id, &name, config.color_for(index), None)
            .await?;
        commands.push(Command::CreateList { list_id: list.id });
        outcome.created_lists += 1;

        let card_ids: Vec<Uuid> = cluster.members.iter().map(|m| m.id).collect();
        let moves = relocate(state, &mut tx, board_id, &card_ids, &list).await?;
        if !moves.is_empty() {
            outcome.moved_cards += moves.len();
            commands.push(Command::BulkMove { moves });
        }
    }
    tx.commit().await?;

    if outcome.created_lists > 0 {
        for command in commands {
            ledger.push(command);
        }
        ledger.record(
            actor,
            "Apply Clusters",
            format!(
                "Created {} lists with {} cards",
                outcome.created_lists, outcome.moved_cards
            ),
        );
    }
    tracing::info!(
        %board_id,
        lists = outcome.created_lists,
        cards = outcome.moved_cards,
        "clusters applied"
    );

    Ok(outcome)
}

/// Cards with an address but no usable coordinates, in board order.
pub async fn uncoded_cards(state: &AppState, board_id: Uuid) -> Result<Vec<Card>> {
    let mut conn = state.conn().await?;
    let cards = state.cards.list_by_board(&mut conn, board_id).await?;
    Ok(cards.into_iter().filter(Card::needs_geocoding).collect())
}

/// Moves cards to the end of `target`, skipping cards that are not on the
/// board or already there. Each recorded index is the card's position at
/// the moment it left its list.
async fn relocate(
    state: &AppState,
    conn: &mut SqliteConnection,
    board_id: Uuid,
    card_ids: &[Uuid],
    target: &List,
) -> Result<Vec<MovedCard>> {
    let mut moves = Vec::new();
    for &card_id in card_ids {
        let Some(card) = state.cards.find_on_board(conn, card_id, board_id).await? else {
            continue;
        };
        if card.list_id == target.id {
            continue;
        }

        state.cards.move_card(conn, &card, target.id, None).await?;
        moves.push(MovedCard {
            card_id: card.id,
            source_list_id: card.list_id,
            position: card.position,
        });
    }
    Ok(moves)
}

async fn list_on_board(
    state: &AppState,
    conn: &mut SqliteConnection,
    board_id: Uuid,
    list_id: Uuid,
) -> Result<List> {
    match state.lists.find_by_id(conn, list_id).await? {
        Some(list) if list.board_id == board_id => Ok(list),
        _ => Err(AppError::NotFound("List")),
    }
}
