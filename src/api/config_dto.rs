use serde::{Deserialize, Serialize};

/// On-disk form of the booking configuration. Missing fields fall back to the defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfigDto {
    pub max_dates_per_request: Option<usize>,
    pub total_shared_batteries: Option<u32>,

    /// Overrides the per-drone `sharedBatteryPool` flags when present.
    pub shared_pool_equipment_ids: Option<Vec<String>>,
    pub drones: Option<Vec<DroneDto>>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DroneDto {
    pub id: String,
    pub name: String,
    pub model: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub shared_battery_pool: bool,
}
