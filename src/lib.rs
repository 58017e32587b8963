pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

pub use domain::booking_config::BookingConfig;
pub use domain::booking_service::BookingService;
pub use domain::booking_validator::{AcceptedBatch, Admission, BookingValidator, Rejection};
pub use domain::equipment::EquipmentId;
pub use domain::request::{BookingRequest, SlotSelection};
pub use domain::reservation::{Applicant, Reservation};
pub use domain::time_slot::{TimeSlot, overlaps_labels};
pub use error::{Error, Result};
