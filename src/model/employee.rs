//! Employee model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{EmployeeId, SkillPoint};
use crate::error::ScheduleError;

/// An employee who can be assigned to tasks.
///
/// Immutable: once built, an `Employee` cannot be mutated in place. A
/// scheduler never rewrites an employee; it only decides which tasks get
/// assigned to which `EmployeeId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    name: String,
    skills: HashMap<String, SkillPoint>,
}

impl Employee {
    /// Creates an employee, failing if `name` is blank.
    pub fn new(
        name: impl Into<String>,
        skills: HashMap<String, SkillPoint>,
    ) -> Result<Self, ScheduleError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ScheduleError::validation(
                "Employee.name",
                "employee name must not be blank",
            ));
        }
        Ok(Self {
            id: EmployeeId::new(),
            name,
            skills,
        })
    }

    /// Creates an employee with a specific id (deserialization, tests).
    pub fn with_id(
        id: EmployeeId,
        name: impl Into<String>,
        skills: HashMap<String, SkillPoint>,
    ) -> Result<Self, ScheduleError> {
        let mut employee = Self::new(name, skills)?;
        employee.id = id;
        Ok(employee)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn skills(&self) -> &HashMap<String, SkillPoint> {
        &self.skills
    }

    pub fn skill_level(&self, skill: &str) -> Option<SkillPoint> {
        self.skills.get(skill).copied()
    }
}
