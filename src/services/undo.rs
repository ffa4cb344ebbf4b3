//! Reversal of recorded board commands.

use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Command, List};
use crate::state::AppState;

/// Pops the board's most recent command and reverses it in one transaction.
///
/// A command whose targets have disappeared fails with
/// [`AppError::DanglingReference`] and is dropped. Any other failure rolls
/// the transaction back and puts the command back on top of the stack, so
/// the board and its stack stay in step. Returns the label of the reversed
/// action.
pub async fn undo_last(state: &AppState, board_id: Uuid, actor: &str) -> Result<&'static str> {
    let mut ledger = state.journal.lock(board_id).await;
    let command = ledger.pop().ok_or(AppError::EmptyStack)?;
    let label = command.label();

    match reverse(state, board_id, &command).await {
        Ok(()) => {
            ledger.record(actor, "Undo", format!("Undo: {}", label));
            tracing::info!(%board_id, action = label, remaining = ledger.undo_depth(), "undo applied");
            Ok(label)
        }
        Err(e @ AppError::DanglingReference(_)) => {
            tracing::warn!(%board_id, action = label, error = %e, "undo target gone, command discarded");
            Err(e)
        }
        Err(e) => {
            tracing::error!(%board_id, action = label, error = %e, "undo failed, command kept");
            ledger.push(command);
            Err(e)
        }
    }
}

async fn reverse(state: &AppState, board_id: Uuid, command: &Command) -> Result<()> {
    let mut tx = state.begin().await?;
    revert(state, &mut tx, board_id, command).await?;
    tx.commit().await?;
    Ok(())
}

async fn revert(
    state: &AppState,
    conn: &mut SqliteConnection,
    board_id: Uuid,
    command: &Command,
) -> Result<()> {
    match command {
        Command::CreateCard { card_id, list_id } => {
            require_list(state, conn, board_id, *list_id).await?;
            let card = state
                .cards
                .find_on_board(conn, *card_id, board_id)
                .await?
                .ok_or_else(|| dangling("card", *card_id))?;
            state.cards.delete(conn, &card).await
        }
        Command::DeleteCard {
            card,
            list_id,
            position,
        } => {
            require_list(state, conn, board_id, *list_id).await?;
            state.cards.restore(conn, card, *list_id, *position).await?;
            Ok(())
        }
        Command::CreateList { list_id } => {
            let list = require_list(state, conn, board_id, *list_id).await?;
            state.lists.delete(conn, &list).await
        }
        Command::DeleteList { snapshot, position } => {
            if snapshot.list.board_id != board_id {
                return Err(dangling("board", snapshot.list.board_id));
            }
            let list = state.lists.restore(conn, &snapshot.list, *position).await?;
            for card in &snapshot.cards {
                state.cards.restore(conn, card, list.id, card.position).await?;
            }
            Ok(())
        }
        Command::BulkMove { moves } => {
            // Reverse order: each card's recorded index was taken after the
            // cards before it had already left.
            for mv in moves.iter().rev() {
                let source = require_list(state, conn, board_id, mv.source_list_id).await?;
                let card = state
                    .cards
                    .find_on_board(conn, mv.card_id, board_id)
                    .await?
                    .ok_or_else(|| dangling("card", mv.card_id))?;
                state
                    .cards
                    .move_card(conn, &card, source.id, Some(mv.position))
                    .await?;
            }
            Ok(())
        }
        Command::BulkDelete { cards } => {
            for deleted in cards.iter().rev() {
                require_list(state, conn, board_id, deleted.source_list_id).await?;
                state
                    .cards
                    .restore(conn, &deleted.card, deleted.source_list_id, deleted.position)
                    .await?;
            }
            Ok(())
        }
    }
}

async fn require_list(
    state: &AppState,
    conn: &mut SqliteConnection,
    board_id: Uuid,
    list_id: Uuid,
) -> Result<List> {
    match state.lists.find_by_id(conn, list_id).await? {
        Some(list) if list.board_id == board_id => Ok(list),
        _ => Err(dangling("list", list_id)),
    }
}

fn dangling(what: &str, id: Uuid) -> AppError {
    AppError::DanglingReference(format!("{} {} no longer exists", what, id))
}
