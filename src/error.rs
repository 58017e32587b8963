use thiserror::Error;

use crate::domain::booking_validator::Rejection;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to write CSV export: {0}")]
    CsvError(#[from] csv::Error),

    /// A time slot label outside the closed set. Signals a caller or data bug.
    #[error("Invalid time slot label: '{0}'")]
    InvalidSlotLabel(String),

    #[error("Unknown equipment id: '{0}'")]
    UnknownEquipment(String),

    #[error("Invalid calendar date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid booking configuration: {0}")]
    ConfigError(String),

    #[error("Reservation id '{0}' occurs more than once in the loaded data")]
    DuplicateReservationId(String),

    /// A loaded record that the booking rules could never have produced.
    #[error("Reservation '{id}' in the loaded data is inconsistent: {reason}")]
    InconsistentReservation { id: String, reason: String },

    #[error("Booking rejected: {0}")]
    Rejected(#[from] Rejection),
}

pub type Result<T> = std::result::Result<T, Error>;
