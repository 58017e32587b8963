use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;

use crate::error::{Error, Result};

/// Closed set of bookable drones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EquipmentId {
    M490,
    Hexa,
    M210,
    T110,
}

impl EquipmentId {
    pub const ALL: [EquipmentId; 4] = [EquipmentId::M490, EquipmentId::Hexa, EquipmentId::M210, EquipmentId::T110];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentId::M490 => "m490",
            EquipmentId::Hexa => "hexa",
            EquipmentId::M210 => "m210",
            EquipmentId::T110 => "t110",
        }
    }
}

impl fmt::Display for EquipmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EquipmentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        EquipmentId::ALL.into_iter().find(|id| s == id.as_str()).ok_or_else(|| Error::UnknownEquipment(s.to_string()))
    }
}

/// Static catalog entry of a drone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equipment {
    pub id: EquipmentId,
    pub name: String,
    pub model: String,
    pub description: String,

    /// Whether this drone draws its batteries from the shared pool instead of dedicated ones.
    pub shared_battery_pool: bool,
}

impl Equipment {
    pub fn new(id: EquipmentId, name: impl Into<String>, model: impl Into<String>, description: impl Into<String>, shared_battery_pool: bool) -> Self {
        Equipment { id, name: name.into(), model: model.into(), description: description.into(), shared_battery_pool }
    }
}

lazy_static! {
    /// The drone fleet the scheduler ships with.
    pub static ref DEFAULT_CATALOG: Vec<Equipment> = vec![
        Equipment::new(EquipmentId::M490, "亞拓 M490", "Align M490", "可考I、Ia (建議用於定位模式)", true),
        Equipment::new(EquipmentId::Hexa, "六軸自組機", "Custom Hexacopter", "可考I、Ia (建議用於定位模式)", true),
        Equipment::new(EquipmentId::M210, "DJI M210", "Matrice 210", "可考Ia (可用於定位模式、姿態模式)", false),
        Equipment::new(EquipmentId::T110, "樂飛 T110", "LeFei T110", "可考I、Ia、Ib (可用於定位模式、姿態模式)", false),
    ];
}
