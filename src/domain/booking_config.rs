use std::collections::HashSet;
use std::path::Path;

use crate::api::config_dto::BookingConfigDto;
use crate::domain::equipment::{DEFAULT_CATALOG, Equipment, EquipmentId};
use crate::error::{Error, Result};
use crate::loader::parser::parse_json_file;

pub const DEFAULT_MAX_DATES_PER_REQUEST: usize = 5;
pub const DEFAULT_TOTAL_SHARED_BATTERIES: u32 = 8;

/// Deployment-specific limits and the drone catalog.
///
/// Passed explicitly into every validation call; nothing in the engine reads ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingConfig {
    /// Maximum number of distinct calendar dates one request may touch.
    pub max_dates_per_request: usize,

    /// Size of the battery pool shared by all shared-pool drones.
    pub total_shared_batteries: u32,

    catalog: Vec<Equipment>,
}

impl Default for BookingConfig {
    fn default() -> Self {
        BookingConfig { max_dates_per_request: DEFAULT_MAX_DATES_PER_REQUEST, total_shared_batteries: DEFAULT_TOTAL_SHARED_BATTERIES, catalog: DEFAULT_CATALOG.clone() }
    }
}

impl BookingConfig {
    /// Builds a validated configuration.
    ///
    /// # Errors
    /// `Error::ConfigError` if the date limit is zero, the catalog is empty or lists a drone twice,
    /// or shared-pool drones exist while the pool has no batteries.
    pub fn new(max_dates_per_request: usize, total_shared_batteries: u32, catalog: Vec<Equipment>) -> Result<Self> {
        if max_dates_per_request == 0 {
            return Err(Error::ConfigError("maxDatesPerRequest must be at least 1".to_string()));
        }

        if catalog.is_empty() {
            return Err(Error::ConfigError("the drone catalog is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for equipment in &catalog {
            if !seen.insert(equipment.id) {
                return Err(Error::ConfigError(format!("drone '{}' is listed more than once", equipment.id)));
            }
        }

        if total_shared_batteries == 0 && catalog.iter().any(|e| e.shared_battery_pool) {
            return Err(Error::ConfigError("shared-pool drones are configured but totalSharedBatteries is 0".to_string()));
        }

        Ok(BookingConfig { max_dates_per_request, total_shared_batteries, catalog })
    }

    /// Reads and validates a JSON configuration file.
    pub fn load(file_path: impl AsRef<Path>) -> Result<Self> {
        let file_path = file_path.as_ref();
        let dto: BookingConfigDto = parse_json_file(file_path)?;
        let config = BookingConfig::try_from(dto)?;

        log::info!(
            "Loaded booking configuration from '{}': {} drones, {} shared batteries, at most {} dates per request.",
            file_path.display(),
            config.catalog.len(),
            config.total_shared_batteries,
            config.max_dates_per_request
        );

        Ok(config)
    }

    pub fn catalog(&self) -> &[Equipment] {
        &self.catalog
    }

    pub fn equipment(&self, id: EquipmentId) -> Option<&Equipment> {
        self.catalog.iter().find(|e| e.id == id)
    }

    /// Drones not in the catalog never count as shared-pool.
    pub fn is_shared_pool(&self, id: EquipmentId) -> bool {
        self.equipment(id).is_some_and(|e| e.shared_battery_pool)
    }

    pub fn shared_pool_ids(&self) -> Vec<EquipmentId> {
        self.catalog.iter().filter(|e| e.shared_battery_pool).map(|e| e.id).collect()
    }
}

impl TryFrom<BookingConfigDto> for BookingConfig {
    type Error = Error;

    fn try_from(dto: BookingConfigDto) -> Result<Self> {
        let mut catalog = match dto.drones {
            Some(drones) => {
                let mut catalog = Vec::with_capacity(drones.len());
                for drone in drones {
                    let id: EquipmentId = drone.id.parse()?;
                    catalog.push(Equipment::new(id, drone.name, drone.model.unwrap_or_default(), drone.description.unwrap_or_default(), drone.shared_battery_pool));
                }
                catalog
            }
            None => DEFAULT_CATALOG.clone(),
        };

        if let Some(shared_ids) = dto.shared_pool_equipment_ids {
            let mut shared = HashSet::new();
            for raw in shared_ids {
                let id: EquipmentId = raw.parse()?;
                if !catalog.iter().any(|e| e.id == id) {
                    return Err(Error::ConfigError(format!("shared-pool drone '{}' is not part of the catalog", id)));
                }
                shared.insert(id);
            }

            for equipment in catalog.iter_mut() {
                equipment.shared_battery_pool = shared.contains(&equipment.id);
            }
        }

        BookingConfig::new(
            dto.max_dates_per_request.unwrap_or(DEFAULT_MAX_DATES_PER_REQUEST),
            dto.total_shared_batteries.unwrap_or(DEFAULT_TOTAL_SHARED_BATTERIES),
            catalog,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config_dto::DroneDto;

    #[test]
    fn test_default_config() {
        let config = BookingConfig::default();
        assert_eq!(config.max_dates_per_request, 5);
        assert_eq!(config.total_shared_batteries, 8);
        assert!(config.is_shared_pool(EquipmentId::Hexa));
        assert!(!config.is_shared_pool(EquipmentId::T110));
    }

    #[test]
    fn test_empty_dto_yields_defaults() {
        let config = BookingConfig::try_from(BookingConfigDto::default()).unwrap();
        assert_eq!(config, BookingConfig::default());
    }

    #[test]
    fn test_shared_pool_override() {
        let dto: BookingConfigDto = serde_json::from_str(r#"{ "totalSharedBatteries": 12, "sharedPoolEquipmentIds": ["m210"] }"#).unwrap();
        let config = BookingConfig::try_from(dto).unwrap();

        assert_eq!(config.total_shared_batteries, 12);
        assert_eq!(config.shared_pool_ids(), vec![EquipmentId::M210]);
    }

    #[test]
    fn test_restricted_catalog() {
        let dto = BookingConfigDto {
            drones: Some(vec![DroneDto { id: "t110".into(), name: "T110".into(), model: None, description: None, shared_battery_pool: false }]),
            ..Default::default()
        };
        let config = BookingConfig::try_from(dto).unwrap();

        assert!(config.equipment(EquipmentId::T110).is_some());
        assert!(config.equipment(EquipmentId::M490).is_none());
        assert!(config.shared_pool_ids().is_empty());
    }

    #[test]
    fn test_malformed_configs_fail_fast() {
        let zero_dates = BookingConfigDto { max_dates_per_request: Some(0), ..Default::default() };
        assert!(matches!(BookingConfig::try_from(zero_dates), Err(Error::ConfigError(_))));

        let no_batteries = BookingConfigDto { total_shared_batteries: Some(0), ..Default::default() };
        assert!(matches!(BookingConfig::try_from(no_batteries), Err(Error::ConfigError(_))));

        let unknown_shared = BookingConfigDto { shared_pool_equipment_ids: Some(vec!["phantom".into()]), ..Default::default() };
        assert!(matches!(BookingConfig::try_from(unknown_shared), Err(Error::UnknownEquipment(_))));

        let duplicate = BookingConfig::new(5, 8, vec![DEFAULT_CATALOG[0].clone(), DEFAULT_CATALOG[0].clone()]);
        assert!(matches!(duplicate, Err(Error::ConfigError(_))));
    }
}
