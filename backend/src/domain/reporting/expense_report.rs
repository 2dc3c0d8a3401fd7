//! Planned versus actual expense variance.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::expense::{Expense, Month};

/// An expense joined with its category name.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizedExpense {
    pub expense: Expense,
    pub category_name: String,
}

/// Planned and actual totals for one category over the year.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotals {
    pub category: String,
    pub total_planned_expense: f64,
    pub total_actual_expense: f64,
}

/// Planned and actual totals for one calendar month of the year.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyExpenseTotal {
    pub month: Month,
    pub total_planned_expense: f64,
    pub total_actual_expense: f64,
}

/// Yearly expense report: category totals, monthly series, grand totals.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseReport {
    pub year: i32,
    pub by_category: Vec<CategoryTotals>,
    pub by_month: Vec<MonthlyExpenseTotal>,
    pub total_planned_expenses: f64,
    pub total_actual_expenses: f64,
}

/// Aggregate the expenses recorded for `year`.
///
/// Planned totals sum planned amounts and actual totals sum actual
/// amounts; a missing actual amount contributes zero. Grand totals equal
/// the sum of the per-category components.
pub fn expense_report(year: i32, expenses: &[CategorizedExpense]) -> ExpenseReport {
    let selected: Vec<&CategorizedExpense> = expenses
        .iter()
        .filter(|record| record.expense.year == year)
        .collect();

    let mut by_category: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for record in &selected {
        let entry = by_category
            .entry(record.category_name.clone())
            .or_insert((0.0, 0.0));
        entry.0 += record.expense.planned_expense;
        entry.1 += record.expense.actual_expense.unwrap_or(0.0);
    }

    let by_month = Month::ALL
        .iter()
        .map(|&month| {
            let mut planned = 0.0;
            let mut actual = 0.0;
            for record in selected.iter().filter(|r| r.expense.month == month) {
                planned += record.expense.planned_expense;
                actual += record.expense.actual_expense.unwrap_or(0.0);
            }
            MonthlyExpenseTotal {
                month,
                total_planned_expense: planned,
                total_actual_expense: actual,
            }
        })
        .collect();

    let total_planned_expenses = by_category.values().map(|(planned, _)| planned).sum();
    let total_actual_expenses = by_category.values().map(|(_, actual)| actual).sum();

    ExpenseReport {
        year,
        by_category: by_category
            .into_iter()
            .map(|(category, (planned, actual))| CategoryTotals {
                category,
                total_planned_expense: planned,
                total_actual_expense: actual,
            })
            .collect(),
        by_month,
        total_planned_expenses,
        total_actual_expenses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn record(
        year: i32,
        month: Month,
        category: &str,
        planned: f64,
        actual: Option<f64>,
    ) -> CategorizedExpense {
        CategorizedExpense {
            expense: Expense {
                id: Uuid::new_v4(),
                year,
                month,
                planned_expense: planned,
                actual_expense: actual,
                expense_category_id: Uuid::new_v4(),
            },
            category_name: category.to_owned(),
        }
    }

    #[test]
    fn groups_totals_by_category() {
        let expenses = [
            record(2024, Month::January, "Marketing", 500.0, Some(620.0)),
            record(2024, Month::February, "Marketing", 500.0, Some(480.0)),
            record(2024, Month::January, "Office cost", 300.0, None),
        ];
        let report = expense_report(2024, &expenses);
        let marketing = report
            .by_category
            .iter()
            .find(|c| c.category == "Marketing")
            .expect("marketing totals");
        assert_eq!(marketing.total_planned_expense, 1000.0);
        assert_eq!(marketing.total_actual_expense, 1100.0);
        let office = report
            .by_category
            .iter()
            .find(|c| c.category == "Office cost")
            .expect("office totals");
        assert_eq!(office.total_planned_expense, 300.0);
        assert_eq!(office.total_actual_expense, 0.0);
    }

    #[test]
    fn planned_and_actual_sides_stay_separate() {
        // A planned amount must never leak into the actual total.
        let expenses = [record(2024, Month::March, "HR costs", 900.0, Some(100.0))];
        let report = expense_report(2024, &expenses);
        assert_eq!(report.total_planned_expenses, 900.0);
        assert_eq!(report.total_actual_expenses, 100.0);
    }

    #[test]
    fn monthly_series_covers_all_twelve_months() {
        let expenses = [record(2024, Month::June, "Marketing", 500.0, Some(450.0))];
        let report = expense_report(2024, &expenses);
        assert_eq!(report.by_month.len(), 12);
        assert_eq!(report.by_month[5].month, Month::June);
        assert_eq!(report.by_month[5].total_planned_expense, 500.0);
        assert_eq!(report.by_month[5].total_actual_expense, 450.0);
        assert_eq!(report.by_month[0].total_planned_expense, 0.0);
    }

    #[test]
    fn other_years_are_excluded() {
        let expenses = [
            record(2023, Month::June, "Marketing", 500.0, Some(450.0)),
            record(2024, Month::June, "Marketing", 700.0, Some(650.0)),
        ];
        let report = expense_report(2024, &expenses);
        assert_eq!(report.total_planned_expenses, 700.0);
        assert_eq!(report.total_actual_expenses, 650.0);
    }

    #[test]
    fn grand_totals_sum_category_components() {
        let expenses = [
            record(2024, Month::January, "Marketing", 500.0, Some(620.0)),
            record(2024, Month::April, "Sales costs", 200.0, Some(180.0)),
            record(2024, Month::April, "Indirect", 750.0, None),
        ];
        let report = expense_report(2024, &expenses);
        let planned: f64 = report
            .by_category
            .iter()
            .map(|c| c.total_planned_expense)
            .sum();
        let actual: f64 = report
            .by_category
            .iter()
            .map(|c| c.total_actual_expense)
            .sum();
        assert_eq!(report.total_planned_expenses, planned);
        assert_eq!(report.total_actual_expenses, actual);
    }
}
