use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use slotmap::{SlotMap, new_key_type};

use crate::domain::booking_config::BookingConfig;
use crate::domain::booking_validator::{AcceptedBatch, Admission, BookingValidator, Rejection};
use crate::domain::clock::Clock;
use crate::domain::request::BookingRequest;
use crate::domain::reservation::Reservation;
use crate::domain::utils::id::ReservationId;
use crate::error::{Error, Result};

new_key_type! {
    pub struct ReservationKey;
}

#[derive(Debug, Default)]
struct StoreInner {
    /// Reservation Storage.
    slots: SlotMap<ReservationKey, Reservation>,

    /// Index lookup InternalKey (ReservationKey) using the public reservation id.
    id_index: HashMap<ReservationId, ReservationKey>,

    /// Keys in commit order. Persisted lists are written in this order.
    order: Vec<ReservationKey>,
}

impl StoreInner {
    fn snapshot(&self) -> Vec<Reservation> {
        self.order.iter().filter_map(|key| self.slots.get(*key)).cloned().collect()
    }

    fn insert(&mut self, reservation: Reservation) -> ReservationKey {
        let id = reservation.id.clone();
        let key = self.slots.insert(reservation);

        self.id_index.insert(id, key);
        self.order.push(key);
        key
    }

    /// Refuses a loaded record that breaks the battery rule of its drone or overlaps
    /// an already loaded record of the same drone.
    fn check_loaded(&self, reservation: &Reservation, config: &BookingConfig) -> Result<()> {
        let inconsistent = |reason: String| Error::InconsistentReservation { id: reservation.id.as_str().to_string(), reason };
        let equipment_id = reservation.equipment_id;

        // Drones dropped from the catalog keep whatever count they were booked with.
        if config.equipment(equipment_id).is_some() {
            match (config.is_shared_pool(equipment_id), reservation.battery_count) {
                (true, None | Some(0)) => return Err(inconsistent(format!("shared-pool drone '{}' has no battery count", equipment_id))),
                (false, Some(count)) => return Err(inconsistent(format!("drone '{}' has dedicated batteries but borrows {} from the pool", equipment_id, count))),
                _ => {}
            }
        }

        let clash = self.slots.values().find(|other| other.equipment_id == equipment_id && other.occupies(reservation.date, reservation.time_slot));
        if let Some(other) = clash {
            return Err(inconsistent(format!("drone '{}' is also booked by '{}' on {} ({} / {})", equipment_id, other.id, reservation.date, other.time_slot, reservation.time_slot)));
        }

        Ok(())
    }
}

/// Owner of the committed reservations.
///
/// Evaluation and commit of a request happen under one write lock, so concurrent submissions
/// cannot double-book and readers never observe half of a multi-slot batch.
#[derive(Debug, Clone, Default)]
pub struct ReservationStore {
    /// All maps are protected with a single lock.
    inner: Arc<RwLock<StoreInner>>,
}

impl ReservationStore {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(StoreInner::default())) }
    }

    /// Builds a store from a previously persisted list.
    ///
    /// # Errors
    /// - `Error::DuplicateReservationId` if two records share an id.
    /// - `Error::InconsistentReservation` if a record has a battery count its drone cannot
    ///   have, or overlaps an earlier record of the same drone.
    pub fn from_reservations(reservations: Vec<Reservation>, config: &BookingConfig) -> Result<Self> {
        let mut inner = StoreInner::default();

        for reservation in reservations {
            if inner.id_index.contains_key(&reservation.id) {
                return Err(Error::DuplicateReservationId(reservation.id.into()));
            }
            inner.check_loaded(&reservation, config)?;
            inner.insert(reservation);
        }

        log::debug!("ReservationStore initialized with {} reservations.", inner.order.len());

        Ok(Self { inner: Arc::new(RwLock::new(inner)) })
    }

    fn read_inner(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(|poisoned| {
            log::warn!("ReservationStore lock was poisoned. Recovering data.");
            PoisonError::into_inner(poisoned)
        })
    }

    fn write_inner(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(|poisoned| {
            log::warn!("ReservationStore lock was poisoned. Recovering data.");
            PoisonError::into_inner(poisoned)
        })
    }

    pub fn len(&self) -> usize {
        self.read_inner().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get Reservation with internal key (ReservationKey).
    pub fn get(&self, key: ReservationKey) -> Option<Reservation> {
        self.read_inner().slots.get(key).cloned()
    }

    /// Get Reservation with its public id.
    pub fn get_by_id(&self, id: &ReservationId) -> Option<Reservation> {
        let guard = self.read_inner();
        let key = guard.id_index.get(id)?;
        guard.slots.get(*key).cloned()
    }

    /// Copy of all committed reservations in commit order.
    pub fn snapshot(&self) -> Vec<Reservation> {
        self.read_inner().snapshot()
    }

    /// Reservations with `start <= date <= end`, ordered by date, slot and creation time.
    pub fn reservations_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<Reservation> {
        let mut reservations: Vec<Reservation> = self.read_inner().slots.values().filter(|r| r.date >= start && r.date <= end).cloned().collect();
        reservations.sort_by(|a, b| (a.date, a.time_slot, a.created_at).cmp(&(b.date, b.time_slot, b.created_at)));
        reservations
    }

    pub fn reservations_on(&self, date: NaiveDate) -> Vec<Reservation> {
        self.reservations_between(date, date)
    }

    /// Evaluates a request against the current state without committing anything.
    pub fn evaluate(&self, request: &BookingRequest, config: &BookingConfig) -> std::result::Result<Admission, Rejection> {
        let snapshot = self.snapshot();
        BookingValidator::new(config, &snapshot).evaluate(request)
    }

    /// Evaluates and commits a request in one step.
    pub fn submit(&self, request: &BookingRequest, config: &BookingConfig, clock: &dyn Clock) -> Result<AcceptedBatch> {
        self.submit_with(request, config, clock, |_| Ok(()))
    }

    /// Evaluates and commits a request, handing the resulting full reservation list to `persist`
    /// before it becomes visible.
    ///
    /// The batch is appended only if `persist` succeeds; on any error the store is unchanged.
    ///
    /// # Errors
    /// `Error::Rejected` if the request is not admissible, or whatever `persist` returns.
    pub fn submit_with<F>(&self, request: &BookingRequest, config: &BookingConfig, clock: &dyn Clock, persist: F) -> Result<AcceptedBatch>
    where
        F: FnOnce(&[Reservation]) -> Result<()>,
    {
        let mut guard = self.write_inner();
        let mut next = guard.snapshot();

        let mut batch = BookingValidator::new(config, &next).admit(request, clock)?;

        for reservation in batch.reservations.iter_mut() {
            // If new generated Id is already in use create a new one.
            while guard.id_index.contains_key(&reservation.id) {
                reservation.id = ReservationId::generate();
            }
        }

        next.extend(batch.reservations.iter().cloned());
        persist(&next)?;

        for reservation in &batch.reservations {
            guard.insert(reservation.clone());
        }

        log::info!(
            "Committed {} reservation(s) of drone '{}' for unit '{}' ({}).",
            batch.reservations.len(),
            request.equipment_id,
            request.applicant.unit,
            request.applicant.name
        );

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::FixedClock;
    use crate::domain::equipment::EquipmentId;
    use crate::domain::reservation::Applicant;
    use crate::domain::time_slot::TimeSlot;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn request(equipment_id: EquipmentId, day: u32, time_slot: TimeSlot) -> BookingRequest {
        BookingRequest::new(Applicant::new("電機系", "李小華", "0922-333-444"), equipment_id).with_slot(date(day), time_slot)
    }

    #[test]
    fn test_submit_appends_batch() {
        let store = ReservationStore::new();
        let config = BookingConfig::default();
        let clock = FixedClock::new(42);

        let batch = store.submit(&request(EquipmentId::M210, 10, TimeSlot::Morning).with_slot(date(11), TimeSlot::FullDay), &config, &clock).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.snapshot(), batch.reservations);
        assert_eq!(store.get_by_id(&batch.reservations[1].id), Some(batch.reservations[1].clone()));
    }

    #[test]
    fn test_failed_persist_leaves_store_unchanged() {
        let store = ReservationStore::new();
        let config = BookingConfig::default();
        let clock = FixedClock::new(42);

        let result = store.submit_with(&request(EquipmentId::T110, 10, TimeSlot::Morning), &config, &clock, |next| {
            assert_eq!(next.len(), 1);
            Err(Error::IoError(std::io::Error::other("disk full")))
        });

        assert!(matches!(result, Err(Error::IoError(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_rejected_submit_is_not_persisted() {
        let store = ReservationStore::new();
        let config = BookingConfig::default();
        let clock = FixedClock::new(42);

        store.submit(&request(EquipmentId::T110, 10, TimeSlot::FullDay), &config, &clock).unwrap();

        let mut persisted = false;
        let result = store.submit_with(&request(EquipmentId::T110, 10, TimeSlot::Afternoon), &config, &clock, |_| {
            persisted = true;
            Ok(())
        });

        assert!(matches!(result, Err(Error::Rejected(Rejection::EquipmentConflict { .. }))));
        assert!(!persisted);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_ids_are_refused_on_load() {
        let reservation = Reservation {
            id: ReservationId::new("dup"),
            applicant: Applicant::default(),
            date: date(1),
            time_slot: TimeSlot::Morning,
            equipment_id: EquipmentId::M210,
            battery_count: None,
            created_at: 0,
        };

        let result = ReservationStore::from_reservations(vec![reservation.clone(), reservation], &BookingConfig::default());
        assert!(matches!(result, Err(Error::DuplicateReservationId(id)) if id == "dup"));
    }

    #[test]
    fn test_loaded_records_follow_catalog_battery_rules() {
        let record = |id: &str, equipment_id: EquipmentId, battery_count: Option<u32>| Reservation {
            id: ReservationId::new(id),
            applicant: Applicant::default(),
            date: date(2),
            time_slot: TimeSlot::Morning,
            equipment_id,
            battery_count,
            created_at: 0,
        };
        let config = BookingConfig::default();

        let store = ReservationStore::from_reservations(vec![record("a", EquipmentId::M490, Some(3)), record("b", EquipmentId::M210, None)], &config).unwrap();
        assert_eq!(store.len(), 2);

        let zero = ReservationStore::from_reservations(vec![record("z", EquipmentId::Hexa, Some(0))], &config);
        assert!(matches!(zero, Err(Error::InconsistentReservation { id, .. }) if id == "z"));

        // A drone outside the configured catalog is not held to a pool rule.
        let restricted = BookingConfig::new(5, 8, vec![crate::domain::equipment::DEFAULT_CATALOG[2].clone()]).unwrap();
        assert!(ReservationStore::from_reservations(vec![record("a", EquipmentId::M490, None)], &restricted).is_ok());
    }

    #[test]
    fn test_reservations_on_date_are_sorted_by_slot() {
        let store = ReservationStore::new();
        let config = BookingConfig::default();

        store.submit(&request(EquipmentId::T110, 12, TimeSlot::Afternoon), &config, &FixedClock::new(1)).unwrap();
        store.submit(&request(EquipmentId::M210, 12, TimeSlot::Morning), &config, &FixedClock::new(2)).unwrap();
        store.submit(&request(EquipmentId::M210, 13, TimeSlot::Morning), &config, &FixedClock::new(3)).unwrap();

        let day = store.reservations_on(date(12));
        assert_eq!(day.len(), 2);
        assert_eq!(day[0].time_slot, TimeSlot::Morning);
        assert_eq!(day[1].time_slot, TimeSlot::Afternoon);

        assert_eq!(store.reservations_between(date(1), date(30)).len(), 3);
    }
}
