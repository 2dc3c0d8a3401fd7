//! Projects and their employee assignments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Earliest date accepted for project schedules.
pub const SCHEDULE_MIN: NaiveDate = match NaiveDate::from_ymd_opt(2000, 1, 1) {
    Some(date) => date,
    None => panic!("schedule minimum is a valid date"),
};

/// Latest date accepted for project schedules.
pub const SCHEDULE_MAX: NaiveDate = match NaiveDate::from_ymd_opt(2050, 12, 31) {
    Some(date) => date,
    None => panic!("schedule maximum is a valid date"),
};

/// Minimum length for a project name.
pub const PROJECT_NAME_MIN: usize = 3;
/// Maximum length for a project name.
pub const PROJECT_NAME_MAX: usize = 15;

/// Validation errors raised by project constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectValidationError {
    #[error("Name must be at least {PROJECT_NAME_MIN} characters long.")]
    NameTooShort,
    #[error("Name can't be more than {PROJECT_NAME_MAX} characters long.")]
    NameTooLong,
    #[error("Description can't be empty.")]
    EmptyDescription,
    #[error("{field} can't be outside the years 2000 to 2050.")]
    DateOutOfRange { field: &'static str },
    #[error("End date must be after start date.")]
    EndBeforeStart,
    #[error("Actual end date must be after start date.")]
    ActualEndBeforeStart,
    #[error("Hourly rate must be a positive number.")]
    NonPositiveHourlyRate,
    #[error("Project value must be a positive number.")]
    NonPositiveValue,
    #[error("Some employees are duplicates.")]
    DuplicateAssignment,
}

/// Billing model for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ProjectType {
    Fixed,
    OnGoing,
}

/// How the project was acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum SalesChannel {
    Online,
    InPerson,
    Referral,
    Other,
}

impl SalesChannel {
    pub const ALL: [Self; 4] = [Self::Online, Self::InPerson, Self::Referral, Self::Other];
}

/// Delivery state of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ProjectStatus {
    Active,
    OnHold,
    Inactive,
    Completed,
}

/// One employee's assignment to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub employee_id: Uuid,
    /// Part-time assignments count as half an allocation in cost and
    /// utilization arithmetic.
    pub part_time: bool,
}

/// Assignment cost/utilization weight: 0.5 for part-time, 1.0 otherwise.
pub fn assignment_fraction(part_time: bool) -> f64 {
    if part_time {
        0.5
    } else {
        1.0
    }
}

/// Project record with its employee assignments.
///
/// ## Invariants
/// - `name` is unique per deployment (enforced by the repository) and 3 to
///   15 characters long.
/// - `start_date <= end_date`, both within 2000-01-01..=2050-12-31.
/// - `actual_end_date`, when set, is not before `start_date`.
/// - Employees appear in `assignments` at most once.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_end_date: Option<NaiveDate>,
    pub project_type: ProjectType,
    pub hourly_rate: f64,
    #[serde(rename = "projectValueBAM")]
    pub project_value_bam: f64,
    pub project_velocity: f64,
    pub sales_channel: SalesChannel,
    pub project_status: ProjectStatus,
    pub assignments: Vec<Assignment>,
}

fn check_schedule_date(
    field: &'static str,
    date: NaiveDate,
) -> Result<(), ProjectValidationError> {
    if (SCHEDULE_MIN..=SCHEDULE_MAX).contains(&date) {
        Ok(())
    } else {
        Err(ProjectValidationError::DateOutOfRange { field })
    }
}

/// Ensure no employee is assigned twice.
pub fn check_assignments(assignments: &[Assignment]) -> Result<(), ProjectValidationError> {
    let mut seen = std::collections::HashSet::new();
    for assignment in assignments {
        if !seen.insert(assignment.employee_id) {
            return Err(ProjectValidationError::DuplicateAssignment);
        }
    }
    Ok(())
}

impl Project {
    /// Check the record-level invariants after construction or update.
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        let length = self.name.chars().count();
        if length < PROJECT_NAME_MIN {
            return Err(ProjectValidationError::NameTooShort);
        }
        if length > PROJECT_NAME_MAX {
            return Err(ProjectValidationError::NameTooLong);
        }
        if self.description.trim().is_empty() {
            return Err(ProjectValidationError::EmptyDescription);
        }
        check_schedule_date("Start date", self.start_date)?;
        check_schedule_date("End date", self.end_date)?;
        if self.end_date < self.start_date {
            return Err(ProjectValidationError::EndBeforeStart);
        }
        if let Some(actual_end) = self.actual_end_date {
            check_schedule_date("Actual end date", actual_end)?;
            if actual_end < self.start_date {
                return Err(ProjectValidationError::ActualEndBeforeStart);
            }
        }
        if self.hourly_rate <= 0.0 {
            return Err(ProjectValidationError::NonPositiveHourlyRate);
        }
        if self.project_value_bam <= 0.0 {
            return Err(ProjectValidationError::NonPositiveValue);
        }
        check_assignments(&self.assignments)
    }

    /// Whether the project schedule contains `day` (inclusive bounds).
    pub fn active_on(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }

    /// Whether the schedule overlaps the inclusive interval `[from, to]`.
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.start_date <= to && from <= self.end_date
    }
}
