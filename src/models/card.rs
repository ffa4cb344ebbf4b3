use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Card {
    pub id: Uuid,
    pub list_id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub occupation: Option<String>,
    pub marital_status: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub spouse_name: Option<String>,
    pub children_count: i32,
    /// Comma-separated, e.g. `"5,8,12"`.
    pub children_ages: Option<String>,
    pub baptized: bool,
    pub is_leader: bool,
    pub ministry: Option<String>,
    pub notes: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub position: i32,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref() {
            Some(last) if !last.trim().is_empty() => format!("{} {}", self.first_name, last.trim()),
            _ => self.first_name.clone(),
        }
    }

    /// Usable coordinates, if any. `(0, 0)` is what a failed geocode leaves
    /// behind, so it counts as uncoded.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if !(lat == 0.0 && lng == 0.0) => Some((lat, lng)),
            _ => None,
        }
    }

    pub fn needs_geocoding(&self) -> bool {
        let has_address = self
            .address
            .as_deref()
            .is_some_and(|a| !a.trim().is_empty());
        has_address && self.coordinates().is_none()
    }
}

/// Field values shared by card creation and card edits.
#[derive(Debug, Default, Deserialize)]
pub struct CardFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub occupation: Option<String>,
    pub marital_status: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub spouse_name: Option<String>,
    pub children_count: Option<i32>,
    pub children_ages: Option<String>,
    pub baptized: Option<bool>,
    pub is_leader: Option<bool>,
    pub ministry: Option<String>,
    pub notes: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CardFields {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.first_name {
            if name.trim().is_empty() {
                return Err(AppError::Validation("First name cannot be empty".to_string()));
            }
        }
        if self.age.is_some_and(|a| a < 0) || self.children_count.is_some_and(|n| n < 0) {
            return Err(AppError::Validation("Counts and ages cannot be negative".to_string()));
        }
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => validate_coordinates(lat, lng),
            (None, None) => Ok(()),
            _ => Err(AppError::Validation(
                "Latitude and longitude must be set together".to_string(),
            )),
        }
    }
}

pub fn validate_coordinates(lat: f64, lng: f64) -> Result<(), AppError> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(AppError::Validation(format!("Invalid latitude: {}", lat)));
    }
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
        return Err(AppError::Validation(format!("Invalid longitude: {}", lng)));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct MoveCard {
    pub list_id: Uuid,
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCoordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub struct UncodedCard {
    pub id: Uuid,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "direccion")]
    pub address: String,
}

impl From<&Card> for UncodedCard {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id,
            name: card.full_name(),
            address: card.address.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(lat: Option<f64>, lng: Option<f64>, address: Option<&str>) -> Card {
        let now = Utc::now();
        Card {
            id: Uuid::new_v4(),
            list_id: Uuid::new_v4(),
            first_name: "Ana".to_string(),
            last_name: Some("Ruiz".to_string()),
            address: address.map(str::to_string),
            phone: None,
            email: None,
            age: None,
            occupation: None,
            marital_status: None,
            birth_date: None,
            spouse_name: None,
            children_count: 0,
            children_ages: None,
            baptized: false,
            is_leader: false,
            ministry: None,
            notes: None,
            latitude: lat,
            longitude: lng,
            position: 0,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn zero_coordinates_count_as_uncoded() {
        let c = card(Some(0.0), Some(0.0), Some("1 Main St"));
        assert_eq!(c.coordinates(), None);
        assert!(c.needs_geocoding());
    }

    #[test]
    fn blank_address_never_needs_geocoding() {
        assert!(!card(None, None, Some("   ")).needs_geocoding());
        assert!(!card(None, None, None).needs_geocoding());
    }

    #[test]
    fn full_name_skips_missing_last_name() {
        let mut c = card(None, None, None);
        assert_eq!(c.full_name(), "Ana Ruiz");
        c.last_name = None;
        assert_eq!(c.full_name(), "Ana");
    }

    #[test]
    fn half_set_coordinates_are_rejected() {
        let fields = CardFields {
            latitude: Some(1.0),
            ..Default::default()
        };
        assert!(matches!(fields.validate(), Err(AppError::Validation(_))));
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(45.0, -120.0).is_ok());
    }

    #[test]
    fn negative_children_count_is_rejected() {
        let fields = CardFields {
            children_count: Some(-1),
            ..Default::default()
        };
        assert!(matches!(fields.validate(), Err(AppError::Validation(_))));
    }
}
