use std::io::Write;

use crate::domain::booking_config::BookingConfig;
use crate::domain::reservation::Reservation;
use crate::domain::utils::date::format_date;
use crate::error::Result;

/// Writes reservations as CSV, one row per reservation, with a header row.
///
/// The drone column carries the catalog display name when the drone is known.
pub fn export_csv<W: Write>(writer: W, reservations: &[Reservation], config: &BookingConfig) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(["date", "time_slot", "drone_id", "drone", "unit", "applicant", "phone", "battery_count", "id"])?;

    for r in reservations {
        let drone_name = config.equipment(r.equipment_id).map(|e| e.name.as_str()).unwrap_or("");
        let battery_count = r.battery_count.map(|n| n.to_string()).unwrap_or_default();

        wtr.write_record([
            format_date(r.date).as_str(),
            r.time_slot.display_name(),
            r.equipment_id.as_str(),
            drone_name,
            r.applicant.unit.as_str(),
            r.applicant.name.as_str(),
            r.applicant.phone.as_str(),
            battery_count.as_str(),
            r.id.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::equipment::EquipmentId;
    use crate::domain::reservation::Applicant;
    use crate::domain::time_slot::TimeSlot;
    use crate::domain::utils::id::ReservationId;
    use chrono::NaiveDate;

    #[test]
    fn test_export_csv() {
        let reservations = vec![Reservation {
            id: ReservationId::new("r1"),
            applicant: Applicant::new("資工系", "張大明", "0912-345-678"),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            time_slot: TimeSlot::Morning,
            equipment_id: EquipmentId::M490,
            battery_count: Some(4),
            created_at: 0,
        }];

        let mut out = Vec::new();
        export_csv(&mut out, &reservations, &BookingConfig::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("date,time_slot,drone_id"));
        assert_eq!(lines[1], "2024-06-10,上午 (08:00 - 12:00),m490,亞拓 M490,資工系,張大明,0912-345-678,4,r1");
    }
}
