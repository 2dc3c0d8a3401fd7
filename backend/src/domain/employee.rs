//! Employee records: compensation, department, and employment interval.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::PersonName;

/// Validation errors raised by employee constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmployeeValidationError {
    #[error("Salary must be greater than 0.")]
    NonPositiveSalary,
    #[error("This combination of department and tech stack is not allowed.")]
    DepartmentTechStackMismatch,
    #[error("Termination date can't be before hiring date.")]
    TerminationBeforeHiring,
}

/// Company department an employee belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Department {
    Administration,
    Management,
    Development,
    Design,
}

impl Department {
    pub const ALL: [Self; 4] = [
        Self::Administration,
        Self::Management,
        Self::Development,
        Self::Design,
    ];
}

/// Currency an employee's salary is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "BAM")]
    Bam,
}

impl Currency {
    /// Fixed conversion factor into the BAM base currency.
    pub fn bam_conversion_factor(self) -> f64 {
        match self {
            Self::Usd => 1.78,
            Self::Eur => 1.95,
            Self::Bam => 1.0,
        }
    }
}

/// Convert an amount in the given currency into BAM.
///
/// Pure linear scaling; the reporting layer leans on this being exact for
/// BAM-denominated inputs.
pub fn amount_in_bam(amount: f64, currency: Currency) -> f64 {
    amount * currency.bam_conversion_factor()
}

/// Specialisation an employee works in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TechStack {
    AdminNA,
    MgmtNA,
    FullStack,
    Backend,
    Frontend,
    #[serde(rename = "UXUI")]
    UxUi,
}

impl TechStack {
    /// The tech stacks an employee of `department` may hold.
    pub fn allowed_for(department: Department) -> &'static [Self] {
        match department {
            Department::Administration => &[Self::AdminNA],
            Department::Management => &[Self::MgmtNA],
            Department::Development => &[Self::FullStack, Self::Backend, Self::Frontend],
            Department::Design => &[Self::UxUi],
        }
    }
}

/// Ensure the department/tech-stack pairing is allowed.
pub fn check_department_tech_stack(
    department: Department,
    tech_stack: TechStack,
) -> Result<(), EmployeeValidationError> {
    if TechStack::allowed_for(department).contains(&tech_stack) {
        Ok(())
    } else {
        Err(EmployeeValidationError::DepartmentTechStackMismatch)
    }
}

/// Validate a salary amount.
pub fn check_salary(salary: f64) -> Result<(), EmployeeValidationError> {
    if salary > 0.0 {
        Ok(())
    } else {
        Err(EmployeeValidationError::NonPositiveSalary)
    }
}

/// Employee record.
///
/// ## Invariants
/// - `salary` is strictly positive and denominated in `currency`.
/// - `tech_stack` is allowed for `department`.
/// - `termination_date`, when set, is not before `hiring_date`, and
///   `is_employed` is false exactly when a termination date exists.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: Uuid,
    #[schema(value_type = String, example = "Ada")]
    pub first_name: PersonName,
    #[schema(value_type = String, example = "Lovelace")]
    pub last_name: PersonName,
    pub department: Department,
    pub salary: f64,
    pub currency: Currency,
    pub tech_stack: TechStack,
    pub is_employed: bool,
    pub hiring_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Employee {
    /// Check the record-level invariants after construction or update.
    pub fn validate(&self) -> Result<(), EmployeeValidationError> {
        check_salary(self.salary)?;
        check_department_tech_stack(self.department, self.tech_stack)?;
        if let Some(termination) = self.termination_date {
            if termination < self.hiring_date {
                return Err(EmployeeValidationError::TerminationBeforeHiring);
            }
        }
        Ok(())
    }

    /// Salary converted into the BAM base currency.
    pub fn salary_in_bam(&self) -> f64 {
        amount_in_bam(self.salary, self.currency)
    }

    /// Whether the employee was employed on `day`: hired on or before it and
    /// not yet terminated.
    pub fn employed_on(&self, day: NaiveDate) -> bool {
        self.hiring_date <= day && self.termination_date.map_or(true, |t| day < t)
    }

    /// Case-insensitive match of a free-text search term against the first
    /// name, last name, or "first last" pair.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        let first = self.first_name.as_ref().to_lowercase();
        let last = self.last_name.as_ref().to_lowercase();
        if first.contains(&term) || last.contains(&term) {
            return true;
        }
        match term.split_once(' ') {
            Some((head, tail)) => first.contains(head.trim()) && last.contains(tail.trim()),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn employee(first: &str, last: &str) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            first_name: PersonName::new("First name", first).expect("valid name"),
            last_name: PersonName::new("Last name", last).expect("valid name"),
            department: Department::Development,
            salary: 3000.0,
            currency: Currency::Bam,
            tech_stack: TechStack::Backend,
            is_employed: true,
            hiring_date: NaiveDate::from_ymd_opt(2021, 3, 1).expect("valid date"),
            termination_date: None,
            image: None,
        }
    }

    #[rstest]
    #[case(1000.0, Currency::Bam, 1000.0)]
    #[case(1000.0, Currency::Usd, 1780.0)]
    #[case(1000.0, Currency::Eur, 1950.0)]
    #[case(0.0, Currency::Usd, 0.0)]
    fn converts_salaries_linearly(
        #[case] amount: f64,
        #[case] currency: Currency,
        #[case] expected: f64,
    ) {
        assert!((amount_in_bam(amount, currency) - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(Department::Development, TechStack::Backend, true)]
    #[case(Department::Development, TechStack::UxUi, false)]
    #[case(Department::Design, TechStack::UxUi, true)]
    #[case(Department::Administration, TechStack::AdminNA, true)]
    #[case(Department::Management, TechStack::Frontend, false)]
    fn constrains_department_tech_stack(
        #[case] department: Department,
        #[case] tech_stack: TechStack,
        #[case] allowed: bool,
    ) {
        assert_eq!(
            check_department_tech_stack(department, tech_stack).is_ok(),
            allowed
        );
    }

    #[test]
    fn rejects_non_positive_salary() {
        let mut emp = employee("Ada", "Lovelace");
        emp.salary = 0.0;
        assert_eq!(
            emp.validate(),
            Err(EmployeeValidationError::NonPositiveSalary)
        );
    }

    #[test]
    fn employment_interval_is_half_open() {
        let mut emp = employee("Ada", "Lovelace");
        emp.termination_date = NaiveDate::from_ymd_opt(2022, 6, 1);
        let hired = NaiveDate::from_ymd_opt(2021, 3, 1).expect("valid date");
        let last_day = NaiveDate::from_ymd_opt(2022, 5, 31).expect("valid date");
        let gone = NaiveDate::from_ymd_opt(2022, 6, 1).expect("valid date");

        assert!(emp.employed_on(hired));
        assert!(emp.employed_on(last_day));
        assert!(!emp.employed_on(gone));
        assert!(!emp.employed_on(hired.pred_opt().expect("previous day")));
    }

    #[rstest]
    #[case("ada", true)]
    #[case("LOVE", true)]
    #[case("ada lovelace", true)]
    #[case("ada byron", false)]
    #[case("", true)]
    #[case("zzz", false)]
    fn searches_names_case_insensitively(#[case] term: &str, #[case] expected: bool) {
        assert_eq!(employee("Ada", "Lovelace").matches_search(term), expected);
    }

    #[test]
    fn enum_wire_names_match_the_api() {
        assert_eq!(
            serde_json::to_value(Currency::Usd).expect("serialize"),
            "USD"
        );
        assert_eq!(
            serde_json::to_value(TechStack::UxUi).expect("serialize"),
            "UXUI"
        );
        assert_eq!(
            serde_json::to_value(Department::Development).expect("serialize"),
            "Development"
        );
    }
}
