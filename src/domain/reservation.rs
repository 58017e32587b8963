use chrono::NaiveDate;

use crate::api::reservation_dto::ReservationDto;
use crate::domain::equipment::EquipmentId;
use crate::domain::time_slot::TimeSlot;
use crate::domain::utils::date::{format_date, parse_date};
use crate::domain::utils::id::ReservationId;
use crate::error::{Error, Result};

/// Who is borrowing the equipment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Applicant {
    /// Organizational unit, e.g. a department.
    pub unit: String,
    pub name: String,
    pub phone: String,
}

impl Applicant {
    pub fn new(unit: impl Into<String>, name: impl Into<String>, phone: impl Into<String>) -> Self {
        Applicant { unit: unit.into(), name: name.into(), phone: phone.into() }
    }
}

/// A committed booking of one drone for one slot of one calendar date.
///
/// Reservations are only produced by an accepted booking request (or loaded back from
/// the persisted list) and are never modified afterwards.
///
/// `battery_count` is `Some` exactly when the drone belongs to the shared battery pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: ReservationId,
    pub applicant: Applicant,
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub equipment_id: EquipmentId,
    pub battery_count: Option<u32>,

    /// Milliseconds since the Unix epoch. Shared by all reservations of one request.
    pub created_at: i64,
}

impl Reservation {
    /// Checks whether this reservation occupies the given date and a slot overlapping `time_slot`.
    pub fn occupies(&self, date: NaiveDate, time_slot: TimeSlot) -> bool {
        self.date == date && self.time_slot.overlaps(time_slot)
    }

    /// Battery units drawn from the pool. A missing count draws nothing.
    pub fn battery_units(&self) -> u32 {
        self.battery_count.unwrap_or(0)
    }
}

impl TryFrom<ReservationDto> for Reservation {
    type Error = Error;

    fn try_from(dto: ReservationDto) -> Result<Self> {
        Ok(Reservation {
            id: ReservationId::new(dto.id),
            applicant: Applicant::new(dto.unit, dto.applicant, dto.phone),
            date: parse_date(&dto.date)?,
            time_slot: dto.time_slot.parse()?,
            equipment_id: dto.drone_id.parse()?,
            battery_count: dto.battery_count,
            created_at: dto.created_at,
        })
    }
}

impl From<&Reservation> for ReservationDto {
    fn from(reservation: &Reservation) -> Self {
        ReservationDto {
            id: reservation.id.as_str().to_string(),
            unit: reservation.applicant.unit.clone(),
            applicant: reservation.applicant.name.clone(),
            phone: reservation.applicant.phone.clone(),
            date: format_date(reservation.date),
            time_slot: reservation.time_slot.label().to_string(),
            drone_id: reservation.equipment_id.as_str().to_string(),
            battery_count: reservation.battery_count,
            created_at: reservation.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(time_slot: &str, drone_id: &str) -> ReservationDto {
        ReservationDto {
            id: "1".to_string(),
            unit: "資工系".to_string(),
            applicant: "張大明".to_string(),
            phone: "0912-345-678".to_string(),
            date: "2024-06-10".to_string(),
            time_slot: time_slot.to_string(),
            drone_id: drone_id.to_string(),
            battery_count: Some(4),
            created_at: 1_718_000_000_000,
        }
    }

    #[test]
    fn test_legacy_record_is_normalized() {
        let reservation = Reservation::try_from(dto("上午 (08:00 - 12:00)", "m490")).unwrap();

        assert_eq!(reservation.time_slot, TimeSlot::Morning);
        assert_eq!(reservation.equipment_id, EquipmentId::M490);
        assert_eq!(reservation.applicant.unit, "資工系");

        let written = ReservationDto::from(&reservation);
        assert_eq!(written.time_slot, "morning");
        assert_eq!(written.date, "2024-06-10");
        assert_eq!(written.battery_count, Some(4));
    }

    #[test]
    fn test_closed_set_violations_are_errors() {
        assert!(matches!(Reservation::try_from(dto("evening", "m490")), Err(Error::InvalidSlotLabel(_))));
        assert!(matches!(Reservation::try_from(dto("morning", "phantom")), Err(Error::UnknownEquipment(_))));
    }

    #[test]
    fn test_occupies_requires_same_date() {
        let reservation = Reservation::try_from(dto("full-day", "m210")).unwrap();

        assert!(reservation.occupies(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(), TimeSlot::Afternoon));
        assert!(!reservation.occupies(NaiveDate::from_ymd_opt(2024, 6, 11).unwrap(), TimeSlot::Afternoon));
    }
}
