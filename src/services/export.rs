//! Flat export of a board's contacts, one row per card in board order.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Card;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(AppError::Validation(format!(
                "Unsupported export format: {}",
                other
            ))),
        }
    }
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub list: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub marital_status: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub spouse_name: Option<String>,
    pub children_count: i32,
    pub children_ages: Option<String>,
    pub baptized: bool,
    pub is_leader: bool,
    pub ministry: Option<String>,
    pub occupation: Option<String>,
    pub notes: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl ExportRow {
    pub fn new(list: &str, card: &Card) -> Self {
        Self {
            list: list.to_string(),
            name: card.full_name(),
            address: card.address.clone(),
            phone: card.phone.clone(),
            email: card.email.clone(),
            age: card.age,
            marital_status: card.marital_status.clone(),
            birth_date: card.birth_date,
            spouse_name: card.spouse_name.clone(),
            children_count: card.children_count,
            children_ages: card.children_ages.clone(),
            baptized: card.baptized,
            is_leader: card.is_leader,
            ministry: card.ministry.clone(),
            occupation: card.occupation.clone(),
            notes: card.notes.clone(),
            latitude: card.latitude,
            longitude: card.longitude,
        }
    }
}

/// Every card of the board, tagged with its list name. Fails if the board
/// has no cards at all.
pub async fn board_rows(state: &AppState, board_id: Uuid) -> Result<Vec<ExportRow>> {
    let mut conn = state.conn().await?;
    let names: HashMap<Uuid, String> = state
        .lists
        .list_by_board(&mut conn, board_id)
        .await?
        .into_iter()
        .map(|l| (l.id, l.name))
        .collect();
    let cards = state.cards.list_by_board(&mut conn, board_id).await?;

    if cards.is_empty() {
        return Err(AppError::Validation(
            "Board has no contacts to export".to_string(),
        ));
    }

    Ok(cards
        .iter()
        .map(|card| {
            let list = names.get(&card.list_id).map(String::as_str).unwrap_or_default();
            ExportRow::new(list, card)
        })
        .collect())
}

pub fn to_csv(rows: &[ExportRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))
}

pub fn to_json(rows: &[ExportRow]) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(rows)
        .map_err(|e| AppError::Internal(format!("JSON export failed: {}", e)))
}

/// `Contacts / 2024` becomes `Contacts___2024.csv`.
pub fn file_name(board_name: &str, format: ExportFormat) -> String {
    let stem: String = board_name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    let stem = if stem.is_empty() { "board".to_string() } else { stem };
    format!("{}.{}", stem, format.extension())
}
