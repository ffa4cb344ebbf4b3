use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Card;

// Wire names on this surface follow the existing board frontend
// (`tablero_id`, `tarjeta_ids`, `latitud`, ...).

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct BoardRequest {
    #[serde(rename = "tablero_id")]
    pub board_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct PreviewClustersRequest {
    #[serde(rename = "tablero_id")]
    pub board_id: Uuid,
    pub max_distance: Option<f64>,
    pub min_size: Option<usize>,
    pub max_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterMember {
    pub id: Uuid,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "latitud")]
    pub latitude: f64,
    #[serde(rename = "longitud")]
    pub longitude: f64,
    #[serde(rename = "lista_id")]
    pub list_id: Uuid,
}

impl ClusterMember {
    pub fn from_card(card: &Card) -> Option<Self> {
        let (latitude, longitude) = card.coordinates()?;
        Some(Self {
            id: card.id,
            name: card.full_name(),
            latitude,
            longitude,
            list_id: card.list_id,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ClusterView {
    pub center: Coordinates,
    pub members: Vec<ClusterMember>,
    pub count: usize,
    pub is_outlier: bool,
}

#[derive(Debug, Serialize)]
pub struct PreviewClustersResponse {
    pub success: bool,
    pub clusters: Vec<ClusterView>,
    pub total_clustered: usize,
}

#[derive(Debug, Deserialize)]
pub struct ApplyMember {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ApplyCluster {
    #[serde(default)]
    pub members: Vec<ApplyMember>,
    #[serde(default)]
    pub is_outlier: bool,
}

#[derive(Debug, Deserialize)]
pub struct ApplyClustersRequest {
    #[serde(rename = "tablero_id")]
    pub board_id: Uuid,
    #[serde(default)]
    pub clusters: Vec<ApplyCluster>,
}

#[derive(Debug, Serialize)]
pub struct ApplyClustersResponse {
    pub success: bool,
    pub created_lists: usize,
    pub moved_cards: usize,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkMoveRequest {
    #[serde(rename = "tablero_id")]
    pub board_id: Uuid,
    #[serde(rename = "tarjeta_ids", default)]
    pub card_ids: Vec<Uuid>,
    #[serde(rename = "lista_destino_id")]
    pub target_list_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    #[serde(rename = "tablero_id")]
    pub board_id: Uuid,
    #[serde(rename = "tarjeta_ids", default)]
    pub card_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub success: bool,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UncodedCardsResponse {
    pub success: bool,
    #[serde(rename = "personas")]
    pub cards: Vec<super::UncodedCard>,
    pub count: usize,
}
