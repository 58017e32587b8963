use std::path::{Path, PathBuf};

use crate::api::reservation_dto::ReservationDto;
use crate::domain::reservation::Reservation;
use crate::error::Result;
use crate::loader::parser::{parse_json_file, write_json_file};

/// Durable home of the committed reservation list.
///
/// The list is always read and written as a whole; there is no incremental format.
pub trait ReservationRepository: std::fmt::Debug + Send + Sync {
    fn load(&self) -> Result<Vec<Reservation>>;

    fn save(&self, reservations: &[Reservation]) -> Result<()>;
}

/// Stores the reservations as a JSON array of camelCase records.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileRepository { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReservationRepository for JsonFileRepository {
    /// A missing file is an empty list; a malformed one is an error.
    fn load(&self) -> Result<Vec<Reservation>> {
        if !self.path.exists() {
            log::info!("No reservation file at '{}'. Starting with an empty list.", self.path.display());
            return Ok(Vec::new());
        }

        let dtos: Vec<ReservationDto> = parse_json_file(&self.path)?;
        let reservations = dtos.into_iter().map(Reservation::try_from).collect::<Result<Vec<_>>>()?;

        log::info!("Loaded {} reservations from '{}'.", reservations.len(), self.path.display());
        Ok(reservations)
    }

    fn save(&self, reservations: &[Reservation]) -> Result<()> {
        let dtos: Vec<ReservationDto> = reservations.iter().map(ReservationDto::from).collect();
        write_json_file(&self.path, &dtos)?;

        log::debug!("Wrote {} reservations to '{}'.", dtos.len(), self.path.display());
        Ok(())
    }
}
