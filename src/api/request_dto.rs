use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SlotSelectionDto {
    pub date: String,
    pub time_slot: String,
}

/// A booking request as entered by an applicant, before its ids and labels are checked.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequestDto {
    pub unit: String,
    pub applicant: String,
    pub phone: String,
    pub drone_id: String,
    pub slots: Vec<SlotSelectionDto>,
    pub battery_count: Option<u32>,
}
