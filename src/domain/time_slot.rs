use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// One of the three bookable periods of a calendar day.
///
/// `FullDay` covers both half days, so it overlaps every slot on the same date.
/// The two half days never overlap each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeSlot {
    /// 08:00 - 12:00
    Morning,

    /// 13:00 - 17:00
    Afternoon,

    /// 08:00 - 17:00
    FullDay,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 3] = [TimeSlot::Morning, TimeSlot::Afternoon, TimeSlot::FullDay];

    /// Checks whether two slots on the **same date** occupy a common period.
    ///
    /// The relation is symmetric and reflexive. Date equality is the caller's concern.
    pub fn overlaps(self, other: TimeSlot) -> bool {
        match (self, other) {
            (TimeSlot::FullDay, _) | (_, TimeSlot::FullDay) => true,
            (a, b) => a == b,
        }
    }

    /// Canonical label used in the persisted data and on the command line.
    pub fn label(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "morning",
            TimeSlot::Afternoon => "afternoon",
            TimeSlot::FullDay => "full-day",
        }
    }

    /// Label shown to applicants, including the covered hours.
    pub fn display_name(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "上午 (08:00 - 12:00)",
            TimeSlot::Afternoon => "下午 (13:00 - 17:00)",
            TimeSlot::FullDay => "全日 (08:00 - 17:00)",
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for TimeSlot {
    type Err = Error;

    /// Parses the canonical label or one of the display names. Both are matched exactly.
    fn from_str(s: &str) -> Result<Self> {
        TimeSlot::ALL.into_iter().find(|slot| s == slot.label() || s == slot.display_name()).ok_or_else(|| Error::InvalidSlotLabel(s.to_string()))
    }
}

/// String-level form of [`TimeSlot::overlaps`].
///
/// # Errors
/// Returns `Error::InvalidSlotLabel` if either label is outside the closed set.
/// An unknown label must never be treated as "no overlap".
pub fn overlaps_labels(a: &str, b: &str) -> Result<bool> {
    let a: TimeSlot = a.parse()?;
    let b: TimeSlot = b.parse()?;
    Ok(a.overlaps(b))
}
