//! Derived financial and utilization reports.
//!
//! Everything in this module is a pure function over records the caller
//! has already loaded. Handlers fetch via the ports, join the pieces into
//! the view structs below, and hand them over; the computations never
//! touch storage.

mod expense_report;
mod portfolio;
mod utilization;

pub use expense_report::{
    expense_report, CategorizedExpense, CategoryTotals, ExpenseReport, MonthlyExpenseTotal,
};
pub use portfolio::{
    portfolio_summary, PortfolioSummary, ProjectSnapshot, ProjectStaffing, StaffedAssignment,
};
pub use utilization::{utilization_by_month, MonthlyUtilization, StaffingRecord};

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

/// Working hours in one billed or available day.
pub const HOURS_PER_DAY: f64 = 8.0;

/// An employee's assignment to a project, flattened to the schedule and
/// allocation the reports need.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentSpan {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub part_time: bool,
}

impl AssignmentSpan {
    /// Whether the assignment's project schedule contains `day`
    /// (inclusive bounds).
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }

    /// Whether the schedule overlaps the half-open interval `[from, to)`.
    pub fn overlaps(&self, from: NaiveDate, to: NaiveDate) -> bool {
        self.start_date < to && from <= self.end_date
    }
}

/// First day of the given one-based month.
pub(crate) fn month_start(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// First day of the month after the given one-based month.
pub(crate) fn month_end_exclusive(year: i32, month: u32) -> Option<NaiveDate> {
    if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
}
