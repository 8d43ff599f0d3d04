//! Skill level value type.

use crate::error::ScheduleError;
use serde::{Deserialize, Serialize};

/// An integer skill level in `[0, 9]`.
///
/// Construction fails with [`ScheduleError::ValidationError`] outside that
/// range, so every `SkillPoint` in the system is guaranteed valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SkillPoint(u8);

impl SkillPoint {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 9;

    /// Builds a skill point, failing if `value` falls outside `[0, 9]`.
    pub fn new(value: u8) -> Result<Self, ScheduleError> {
        if value > Self::MAX {
            return Err(ScheduleError::validation(
                "SkillPoint",
                format!("value {value} is out of range [0, {}]", Self::MAX),
            ));
        }
        Ok(Self(value))
    }

    #[inline]
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for SkillPoint {
    type Error = ScheduleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SkillPoint> for u8 {
    fn from(skill: SkillPoint) -> Self {
        skill.0
    }
}
