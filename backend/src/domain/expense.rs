//! Expense categories and monthly expense records.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors raised by expense constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpenseValidationError {
    #[error("Name can't be empty.")]
    EmptyCategoryName,
    #[error("Description can't be empty.")]
    EmptyCategoryDescription,
    #[error("Year can't be outside the years 2000 to 2050.")]
    YearOutOfRange,
    #[error("Planned expense must be a positive number.")]
    NonPositivePlannedExpense,
    #[error("Actual expense can't be a negative number.")]
    NegativeActualExpense,
}

/// Calendar month, serialized by its English name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Self; 12] = [
        Self::January,
        Self::February,
        Self::March,
        Self::April,
        Self::May,
        Self::June,
        Self::July,
        Self::August,
        Self::September,
        Self::October,
        Self::November,
        Self::December,
    ];

    /// One-based month number as used by `chrono`.
    pub fn number(self) -> u32 {
        match self {
            Self::January => 1,
            Self::February => 2,
            Self::March => 3,
            Self::April => 4,
            Self::May => 5,
            Self::June => 6,
            Self::July => 7,
            Self::August => 8,
            Self::September => 9,
            Self::October => 10,
            Self::November => 11,
            Self::December => 12,
        }
    }

    /// Inverse of [`Month::number`].
    pub fn from_number(number: u32) -> Option<Self> {
        Self::ALL.get(number.checked_sub(1)? as usize).copied()
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::January => "January",
            Self::February => "February",
            Self::March => "March",
            Self::April => "April",
            Self::May => "May",
            Self::June => "June",
            Self::July => "July",
            Self::August => "August",
            Self::September => "September",
            Self::October => "October",
            Self::November => "November",
            Self::December => "December",
        })
    }
}

/// Category an expense is booked under.
///
/// The `Direct` category is special cased: its planned amount is derived
/// from monthly project employee cost rather than entered by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseCategory {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

/// Name of the category whose planned amount is derived, not entered.
pub const DIRECT_CATEGORY_NAME: &str = "Direct";

impl ExpenseCategory {
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if self.name.trim().is_empty() {
            return Err(ExpenseValidationError::EmptyCategoryName);
        }
        if self.description.trim().is_empty() {
            return Err(ExpenseValidationError::EmptyCategoryDescription);
        }
        Ok(())
    }

    /// Whether planned amounts for this category are derived from
    /// project employee cost.
    pub fn is_direct(&self) -> bool {
        self.name.eq_ignore_ascii_case(DIRECT_CATEGORY_NAME)
    }
}

/// One month's expense under a category.
///
/// At most one expense exists per `(year, month, category)`; the
/// repository enforces the uniqueness.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: Uuid,
    pub year: i32,
    pub month: Month,
    /// Planned amount in BAM. Derived for the `Direct` category.
    pub planned_expense: f64,
    /// Amount actually spent in BAM, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_expense: Option<f64>,
    #[schema(value_type = String)]
    pub expense_category_id: Uuid,
}

impl Expense {
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if !(2000..=2050).contains(&self.year) {
            return Err(ExpenseValidationError::YearOutOfRange);
        }
        if self.planned_expense <= 0.0 {
            return Err(ExpenseValidationError::NonPositivePlannedExpense);
        }
        if self.actual_expense.is_some_and(|amount| amount < 0.0) {
            return Err(ExpenseValidationError::NegativeActualExpense);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn category(name: &str) -> ExpenseCategory {
        ExpenseCategory {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            description: "Recurring office costs".to_owned(),
        }
    }

    fn expense() -> Expense {
        Expense {
            id: Uuid::new_v4(),
            year: 2024,
            month: Month::March,
            planned_expense: 1_500.0,
            actual_expense: Some(1_420.5),
            expense_category_id: Uuid::new_v4(),
        }
    }

    #[rstest]
    #[case(Month::January, 1)]
    #[case(Month::June, 6)]
    #[case(Month::December, 12)]
    fn month_numbers_round_trip(#[case] month: Month, #[case] number: u32) {
        assert_eq!(month.number(), number);
        assert_eq!(Month::from_number(number), Some(month));
    }

    #[rstest]
    #[case(0)]
    #[case(13)]
    fn rejects_out_of_range_month_numbers(#[case] number: u32) {
        assert_eq!(Month::from_number(number), None);
    }

    #[test]
    fn months_serialize_by_name() {
        let value = serde_json::to_value(Month::October).expect("serialize month");
        assert_eq!(value, serde_json::json!("October"));
    }

    #[rstest]
    #[case("Direct", true)]
    #[case("direct", true)]
    #[case("Marketing", false)]
    fn recognises_the_direct_category(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(category(name).is_direct(), expected);
    }

    #[test]
    fn rejects_blank_category_name() {
        let mut c = category("  ");
        c.name = "  ".to_owned();
        assert_eq!(
            c.validate(),
            Err(ExpenseValidationError::EmptyCategoryName)
        );
    }

    #[rstest]
    #[case(1999, ExpenseValidationError::YearOutOfRange)]
    #[case(2051, ExpenseValidationError::YearOutOfRange)]
    fn bounds_the_year(#[case] year: i32, #[case] expected: ExpenseValidationError) {
        let mut e = expense();
        e.year = year;
        assert_eq!(e.validate(), Err(expected));
    }

    #[test]
    fn rejects_non_positive_planned_expense() {
        let mut e = expense();
        e.planned_expense = 0.0;
        assert_eq!(
            e.validate(),
            Err(ExpenseValidationError::NonPositivePlannedExpense)
        );
    }

    #[test]
    fn rejects_negative_actual_expense() {
        let mut e = expense();
        e.actual_expense = Some(-1.0);
        assert_eq!(
            e.validate(),
            Err(ExpenseValidationError::NegativeActualExpense)
        );
    }

    #[test]
    fn missing_actual_expense_is_omitted_from_json() {
        let mut e = expense();
        e.actual_expense = None;
        let value = serde_json::to_value(e).expect("serialize expense");
        assert!(value.get("actualExpense").is_none());
    }
}
