//! Monthly availability, billed time, and department labor cost.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::employee::{Department, Employee};
use crate::domain::expense::Month;
use crate::domain::reporting::{month_end_exclusive, month_start, AssignmentSpan, HOURS_PER_DAY};

/// An employee joined with the schedules of their project assignments.
#[derive(Debug, Clone, PartialEq)]
pub struct StaffingRecord {
    pub employee: Employee,
    pub assignments: Vec<AssignmentSpan>,
}

/// One month's utilization and labor cost figures.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyUtilization {
    pub month: Month,
    pub total_hours_available: f64,
    pub total_hours_billed: f64,
    pub development_cost: f64,
    pub design_cost: f64,
    pub other_cost: f64,
    pub total_cost: f64,
}

fn is_weekday(day: NaiveDate) -> bool {
    !matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// How much of one weekday the employee bills, given the assignments
/// whose project schedule contains that day. One full-time assignment
/// or two part-time assignments fill the day; a single part-time
/// assignment fills half of it.
fn billed_fraction(assignments: &[AssignmentSpan], day: NaiveDate) -> f64 {
    let mut full_time = 0u32;
    let mut part_time = 0u32;
    for span in assignments.iter().filter(|span| span.covers(day)) {
        if span.part_time {
            part_time += 1;
        } else {
            full_time += 1;
        }
        if full_time >= 1 || part_time >= 2 {
            return 1.0;
        }
    }
    if part_time == 1 {
        0.5
    } else {
        0.0
    }
}

/// Walk the weekdays of one month for one employee and tally available
/// and billed days. The employment interval is half-open: the hiring day
/// counts, the termination day does not.
fn tally_employee_month(
    record: &StaffingRecord,
    month_from: NaiveDate,
    month_to: NaiveDate,
) -> (f64, f64) {
    let employee = &record.employee;
    let from = employee.hiring_date.max(month_from);
    let to = match employee.termination_date {
        Some(termination) => termination.min(month_to),
        None => month_to,
    };

    let mut available = 0.0;
    let mut billed = 0.0;
    let mut day = from;
    while day < to {
        if is_weekday(day) {
            available += 1.0;
            billed += billed_fraction(&record.assignments, day);
        }
        day = day.succ_opt().unwrap_or(to);
    }
    (available, billed)
}

/// Monthly BAM salary cost of the employees staffed on projects during
/// the month, split by department. A part-time assignment halves the
/// employee's contribution.
fn department_costs(
    records: &[StaffingRecord],
    month_from: NaiveDate,
    month_to: NaiveDate,
) -> (f64, f64, f64) {
    let mut development = 0.0;
    let mut design = 0.0;
    let mut other = 0.0;
    for record in records {
        let active: Vec<&AssignmentSpan> = record
            .assignments
            .iter()
            .filter(|span| span.overlaps(month_from, month_to))
            .collect();
        if active.is_empty() {
            continue;
        }
        let mut cost = record.employee.salary_in_bam();
        if active.iter().any(|span| span.part_time) {
            cost /= 2.0;
        }
        match record.employee.department {
            Department::Development => development += cost,
            Department::Design => design += cost,
            Department::Administration | Department::Management => other += cost,
        }
    }
    (development, design, other)
}

/// Compute the twelve monthly utilization rows for `year`.
pub fn utilization_by_month(year: i32, records: &[StaffingRecord]) -> Vec<MonthlyUtilization> {
    Month::ALL
        .iter()
        .map(|&month| {
            let (Some(from), Some(to)) = (
                month_start(year, month.number()),
                month_end_exclusive(year, month.number()),
            ) else {
                // Unreachable for validated years; emit an empty row
                // rather than panic.
                return MonthlyUtilization {
                    month,
                    total_hours_available: 0.0,
                    total_hours_billed: 0.0,
                    development_cost: 0.0,
                    design_cost: 0.0,
                    other_cost: 0.0,
                    total_cost: 0.0,
                };
            };

            let mut available_days = 0.0;
            let mut billed_days = 0.0;
            for record in records {
                let (available, billed) = tally_employee_month(record, from, to);
                available_days += available;
                billed_days += billed;
            }

            let (development_cost, design_cost, other_cost) =
                department_costs(records, from, to);

            MonthlyUtilization {
                month,
                total_hours_available: available_days * HOURS_PER_DAY,
                total_hours_billed: billed_days * HOURS_PER_DAY,
                development_cost,
                design_cost,
                other_cost,
                total_cost: development_cost + design_cost + other_cost,
            }
        })
        .collect()
}
