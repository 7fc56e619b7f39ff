//! Field models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::GpsCoordinates;

/// A cultivated field owned by a farmer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub crop_type: String,
    pub soil_type: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    /// Area in decares (1 dekar = 1,000 m²)
    pub area_decares: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Field {
    pub fn coordinates(&self) -> Option<GpsCoordinates> {
        Some(GpsCoordinates::new(self.latitude?, self.longitude?))
    }
}
