use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::booking_config::BookingConfig;
use crate::domain::booking_validator::{AcceptedBatch, Admission, BookingValidator, Rejection, SlotAvailability};
use crate::domain::clock::SharedClock;
use crate::domain::request::{BookingRequest, SlotSelection};
use crate::domain::reservation_store::ReservationStore;
use crate::domain::time_slot::TimeSlot;
use crate::error::Result;
use crate::loader::reservation_file::ReservationRepository;

/// Front door of the scheduler: configuration, committed reservations and their durable copy.
#[derive(Debug, Clone)]
pub struct BookingService {
    config: BookingConfig,
    store: ReservationStore,
    repository: Arc<dyn ReservationRepository>,
    clock: SharedClock,
}

impl BookingService {
    /// Loads the persisted reservations and builds the service around them.
    pub fn open(config: BookingConfig, repository: Arc<dyn ReservationRepository>, clock: SharedClock) -> Result<Self> {
        let store = ReservationStore::from_reservations(repository.load()?, &config)?;
        Ok(BookingService { config, store, repository, clock })
    }

    pub fn config(&self) -> &BookingConfig {
        &self.config
    }

    pub fn store(&self) -> &ReservationStore {
        &self.store
    }

    /// Dry run of [`BookingService::book`].
    pub fn check(&self, request: &BookingRequest) -> std::result::Result<Admission, Rejection> {
        self.store.evaluate(request, &self.config)
    }

    /// Current battery ceiling for a set of slots, independent of the rest of the request.
    pub fn battery_ceiling(&self, slots: &[SlotSelection]) -> u32 {
        let snapshot = self.store.snapshot();
        BookingValidator::new(&self.config, &snapshot).battery_ceiling(slots)
    }

    pub fn availability(&self, date: NaiveDate, time_slot: TimeSlot) -> SlotAvailability {
        let snapshot = self.store.snapshot();
        BookingValidator::new(&self.config, &snapshot).slot_availability(date, time_slot)
    }

    /// Validates the request and, if admitted, writes the new full list and commits the batch.
    pub fn book(&self, request: &BookingRequest) -> Result<AcceptedBatch> {
        let repository = Arc::clone(&self.repository);
        self.store.submit_with(request, &self.config, self.clock.as_ref(), |next| repository.save(next))
    }
}
