use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::booking_config::BookingConfig;
use crate::domain::clock::Clock;
use crate::domain::equipment::EquipmentId;
use crate::domain::request::{BookingRequest, SlotSelection};
use crate::domain::reservation::Reservation;
use crate::domain::time_slot::TimeSlot;
use crate::domain::utils::id::ReservationId;

/// Why a booking request was not admitted.
///
/// Every variant is an expected, user-correctable outcome. Evaluating the same request
/// against the same snapshot always yields the same rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("drone '{equipment_id}' is not part of the catalog")]
    UnknownEquipment { equipment_id: EquipmentId },

    #[error("the request contains no time slots")]
    EmptyRequest,

    #[error("a single request may span at most {max} dates, got {count}")]
    TooManyDates { count: usize, max: usize },

    #[error("drone '{equipment_id}' is already booked on {date} {time_slot}")]
    EquipmentConflict { equipment_id: EquipmentId, date: NaiveDate, time_slot: TimeSlot, conflicting_reservation: ReservationId },

    #[error("the requested slots overlap each other on {date}: {first} and {second}")]
    InternalConflict { date: NaiveDate, first: TimeSlot, second: TimeSlot },

    #[error("at most {available} batteries can be borrowed for the selected slots, requested {requested}")]
    InsufficientBatteries { requested: u32, available: u32 },

    #[error("a battery quantity is required for drone '{equipment_id}'")]
    BatteryQuantityRequired { equipment_id: EquipmentId },
}

/// Result of a successful evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Maximum batteries borrowable over all requested slots. `None` for drones with dedicated batteries.
    pub available_batteries: Option<u32>,
}

/// An admitted request expanded into reservations, ready to be appended as one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedBatch {
    pub reservations: Vec<Reservation>,
    pub available_batteries: Option<u32>,
}

/// Occupancy of one drone at one date/slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentAvailability {
    pub equipment_id: EquipmentId,

    /// The reservation holding the drone, if any.
    pub booked_by: Option<ReservationId>,
}

/// Occupancy of the whole fleet and the battery pool at one date/slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotAvailability {
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub equipment: Vec<EquipmentAvailability>,
    pub available_batteries: u32,
}

/// Decides whether a booking request may be committed against a snapshot of reservations.
///
/// The validator never mutates the snapshot. All checks are pure functions of
/// (request, snapshot, configuration).
#[derive(Debug, Clone, Copy)]
pub struct BookingValidator<'a> {
    config: &'a BookingConfig,
    snapshot: &'a [Reservation],
}

impl<'a> BookingValidator<'a> {
    pub fn new(config: &'a BookingConfig, snapshot: &'a [Reservation]) -> Self {
        BookingValidator { config, snapshot }
    }

    /// Runs the admission rules in order; the first failing rule decides.
    ///
    /// 1. the drone must be in the catalog and the request must contain slots,
    /// 2. at most `max_dates_per_request` distinct dates,
    /// 3. no overlap with an existing reservation of the same drone,
    /// 4. no overlap between the request's own slots,
    /// 5. for shared-pool drones, a positive battery quantity within the pool ceiling.
    pub fn evaluate(&self, request: &BookingRequest) -> Result<Admission, Rejection> {
        let decision = self.run_rules(request);

        match &decision {
            Ok(admission) => tracing::debug!(
                equipment = %request.equipment_id,
                slots = request.slots.len(),
                available_batteries = ?admission.available_batteries,
                "booking request admitted"
            ),
            Err(rejection) => tracing::info!(equipment = %request.equipment_id, slots = request.slots.len(), "booking request rejected: {}", rejection),
        }

        decision
    }

    fn run_rules(&self, request: &BookingRequest) -> Result<Admission, Rejection> {
        if self.config.equipment(request.equipment_id).is_none() {
            return Err(Rejection::UnknownEquipment { equipment_id: request.equipment_id });
        }

        if request.slots.is_empty() {
            return Err(Rejection::EmptyRequest);
        }

        let distinct_dates = request.distinct_dates().len();
        if distinct_dates > self.config.max_dates_per_request {
            return Err(Rejection::TooManyDates { count: distinct_dates, max: self.config.max_dates_per_request });
        }

        for slot in &request.slots {
            if let Some(existing) = self.find_equipment_conflict(request.equipment_id, slot) {
                return Err(Rejection::EquipmentConflict {
                    equipment_id: request.equipment_id,
                    date: slot.date,
                    time_slot: slot.time_slot,
                    conflicting_reservation: existing.id.clone(),
                });
            }
        }

        if let Some((first, second)) = find_internal_conflict(&request.slots) {
            return Err(Rejection::InternalConflict { date: first.date, first: first.time_slot, second: second.time_slot });
        }

        if !self.config.is_shared_pool(request.equipment_id) {
            return Ok(Admission { available_batteries: None });
        }

        let available = self.battery_ceiling(&request.slots);
        let requested = request.battery_count.unwrap_or(0);

        if requested > available {
            return Err(Rejection::InsufficientBatteries { requested, available });
        }

        if requested == 0 {
            return Err(Rejection::BatteryQuantityRequired { equipment_id: request.equipment_id });
        }

        Ok(Admission { available_batteries: Some(available) })
    }

    /// Evaluates the request and, if admitted, expands it into one reservation per slot.
    ///
    /// All reservations of the batch share the clock's current time as creation timestamp.
    /// Drones with dedicated batteries never carry a battery count, whatever the request says.
    pub fn admit(&self, request: &BookingRequest, clock: &dyn Clock) -> Result<AcceptedBatch, Rejection> {
        let admission = self.evaluate(request)?;
        let created_at = clock.get_current_time_in_ms();
        let battery_count = admission.available_batteries.and(request.battery_count);

        if admission.available_batteries.is_none() && request.battery_count.is_some() {
            log::debug!("Ignoring battery quantity for drone '{}' which has dedicated batteries.", request.equipment_id);
        }

        let reservations = request
            .slots
            .iter()
            .map(|slot| Reservation {
                id: ReservationId::generate(),
                applicant: request.applicant.clone(),
                date: slot.date,
                time_slot: slot.time_slot,
                equipment_id: request.equipment_id,
                battery_count,
                created_at,
            })
            .collect();

        Ok(AcceptedBatch { reservations, available_batteries: admission.available_batteries })
    }

    /// First existing reservation of `equipment_id` occupying the slot.
    pub fn find_equipment_conflict(&self, equipment_id: EquipmentId, slot: &SlotSelection) -> Option<&'a Reservation> {
        self.snapshot.iter().find(|r| r.equipment_id == equipment_id && r.occupies(slot.date, slot.time_slot))
    }

    /// Batteries drawn from the pool by existing reservations overlapping the date/slot.
    ///
    /// The pool is shared by the whole shared-pool class, so every shared-pool drone counts.
    pub fn used_batteries_at(&self, date: NaiveDate, time_slot: TimeSlot) -> u32 {
        self.snapshot
            .iter()
            .filter(|r| self.config.is_shared_pool(r.equipment_id) && r.occupies(date, time_slot))
            .map(|r| r.battery_units())
            .sum()
    }

    pub fn available_batteries_at(&self, date: NaiveDate, time_slot: TimeSlot) -> u32 {
        self.config.total_shared_batteries.saturating_sub(self.used_batteries_at(date, time_slot))
    }

    /// Batteries borrowable for the whole set of slots: the tightest slot binds.
    ///
    /// The slots of the request itself are not counted against each other.
    /// Without slots the full pool is reported.
    pub fn battery_ceiling(&self, slots: &[SlotSelection]) -> u32 {
        slots.iter().map(|slot| self.available_batteries_at(slot.date, slot.time_slot)).min().unwrap_or(self.config.total_shared_batteries)
    }

    /// Which catalog drones are free at the date/slot and how many pool batteries remain.
    pub fn slot_availability(&self, date: NaiveDate, time_slot: TimeSlot) -> SlotAvailability {
        let slot = SlotSelection::new(date, time_slot);

        let equipment = self
            .config
            .catalog()
            .iter()
            .map(|e| EquipmentAvailability { equipment_id: e.id, booked_by: self.find_equipment_conflict(e.id, &slot).map(|r| r.id.clone()) })
            .collect();

        SlotAvailability { date, time_slot, equipment, available_batteries: self.available_batteries_at(date, time_slot) }
    }
}

/// First pair (i < j) of slots on the same date with overlapping periods.
pub fn find_internal_conflict(slots: &[SlotSelection]) -> Option<(SlotSelection, SlotSelection)> {
    slots.iter().enumerate().find_map(|(i, first)| slots[i + 1..].iter().find(|second| first.overlaps(second)).map(|second| (*first, *second)))
}
