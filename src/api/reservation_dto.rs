use serde::{Deserialize, Serialize};

/// Persisted form of a committed reservation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDto {
    pub id: String,
    pub unit: String,
    pub applicant: String,
    pub phone: String,

    /// `YYYY-MM-DD`
    pub date: String,
    pub time_slot: String,
    pub drone_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_count: Option<u32>,
    pub created_at: i64,
}
