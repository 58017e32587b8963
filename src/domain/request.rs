use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::api::request_dto::{BookingRequestDto, SlotSelectionDto};
use crate::domain::equipment::EquipmentId;
use crate::domain::reservation::Applicant;
use crate::domain::time_slot::TimeSlot;
use crate::domain::utils::date::parse_date;
use crate::error::{Error, Result};

/// A (date, time slot) pair of a booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotSelection {
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
}

impl SlotSelection {
    pub fn new(date: NaiveDate, time_slot: TimeSlot) -> Self {
        SlotSelection { date, time_slot }
    }

    pub fn overlaps(&self, other: &SlotSelection) -> bool {
        self.date == other.date && self.time_slot.overlaps(other.time_slot)
    }
}

/// An unsaved, multi-slot booking proposal awaiting validation.
///
/// All slots share the applicant, the drone and (for shared-pool drones) the battery quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub applicant: Applicant,
    pub equipment_id: EquipmentId,
    pub slots: Vec<SlotSelection>,
    pub battery_count: Option<u32>,
}

impl BookingRequest {
    pub fn new(applicant: Applicant, equipment_id: EquipmentId) -> Self {
        BookingRequest { applicant, equipment_id, slots: Vec::new(), battery_count: None }
    }

    pub fn with_slot(mut self, date: NaiveDate, time_slot: TimeSlot) -> Self {
        self.slots.push(SlotSelection::new(date, time_slot));
        self
    }

    pub fn with_batteries(mut self, battery_count: u32) -> Self {
        self.battery_count = Some(battery_count);
        self
    }

    /// Calendar dates touched by the request, duplicates collapsed.
    pub fn distinct_dates(&self) -> BTreeSet<NaiveDate> {
        self.slots.iter().map(|slot| slot.date).collect()
    }
}

impl TryFrom<&SlotSelectionDto> for SlotSelection {
    type Error = Error;

    fn try_from(dto: &SlotSelectionDto) -> Result<Self> {
        Ok(SlotSelection::new(parse_date(&dto.date)?, dto.time_slot.parse()?))
    }
}

impl FromStr for SlotSelection {
    type Err = Error;

    /// Parses `YYYY-MM-DD:<slot>`, e.g. `2024-06-10:morning`.
    fn from_str(s: &str) -> Result<Self> {
        let (date, time_slot) = s.split_once(':').ok_or_else(|| Error::InvalidSlotLabel(s.to_string()))?;
        Ok(SlotSelection::new(parse_date(date)?, time_slot.parse()?))
    }
}

impl TryFrom<BookingRequestDto> for BookingRequest {
    type Error = Error;

    /// Fails on the first drone id, date or slot label outside its closed set.
    fn try_from(dto: BookingRequestDto) -> Result<Self> {
        let slots = dto.slots.iter().map(SlotSelection::try_from).collect::<Result<Vec<_>>>()?;

        Ok(BookingRequest {
            applicant: Applicant::new(dto.unit, dto.applicant, dto.phone),
            equipment_id: dto.drone_id.parse()?,
            slots,
            battery_count: dto.battery_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_dates_collapse_duplicates() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let request = BookingRequest::new(Applicant::default(), EquipmentId::M210)
            .with_slot(day, TimeSlot::Morning)
            .with_slot(day, TimeSlot::Afternoon)
            .with_slot(day.succ_opt().unwrap(), TimeSlot::Morning);

        assert_eq!(request.distinct_dates().len(), 2);
    }

    #[test]
    fn test_slot_selection_from_str() {
        let slot: SlotSelection = "2024-06-10:full-day".parse().unwrap();
        assert_eq!(slot, SlotSelection::new(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(), TimeSlot::FullDay));

        assert!(matches!("2024-06-10".parse::<SlotSelection>(), Err(Error::InvalidSlotLabel(_))));
        assert!(matches!("2024-06-10:night".parse::<SlotSelection>(), Err(Error::InvalidSlotLabel(_))));
        assert!(matches!("2024-13-10:morning".parse::<SlotSelection>(), Err(Error::InvalidDate(_))));
    }

    #[test]
    fn test_request_dto_conversion() {
        let dto: BookingRequestDto = serde_json::from_str(
            r#"{
                "unit": "災害搶救科",
                "applicant": "王小明",
                "phone": "0912-345-678",
                "droneId": "hexa",
                "slots": [{ "date": "2024-07-02", "timeSlot": "morning" }, { "date": "2024-07-03", "timeSlot": "全日 (08:00 - 17:00)" }],
                "batteryCount": 2
            }"#,
        )
        .unwrap();

        let request = BookingRequest::try_from(dto).unwrap();
        assert_eq!(request.equipment_id, EquipmentId::Hexa);
        assert_eq!(request.slots[1].time_slot, TimeSlot::FullDay);
        assert_eq!(request.battery_count, Some(2));
    }

    #[test]
    fn test_unknown_drone_in_request_dto() {
        let dto = BookingRequestDto {
            unit: String::new(),
            applicant: String::new(),
            phone: String::new(),
            drone_id: "mavic".to_string(),
            slots: vec![],
            battery_count: None,
        };

        assert!(matches!(BookingRequest::try_from(dto), Err(Error::UnknownEquipment(id)) if id == "mavic"));
    }
}
