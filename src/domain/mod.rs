pub mod booking_config;
pub mod booking_service;
pub mod booking_validator;
pub mod clock;
pub mod equipment;
pub mod request;
pub mod reservation;
pub mod reservation_store;
pub mod time_slot;
pub mod utils;
