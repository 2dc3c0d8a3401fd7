//! Yearly project portfolio summary.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::employee::{amount_in_bam, Currency};
use crate::domain::project::{
    assignment_fraction, Project, ProjectType, SalesChannel,
};

/// One assignment joined with the assigned employee's compensation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaffedAssignment {
    pub part_time: bool,
    pub salary: f64,
    pub currency: Currency,
}

/// A project joined with the compensation of its assigned employees.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectStaffing {
    pub project: Project,
    pub staff: Vec<StaffedAssignment>,
}

impl ProjectStaffing {
    /// Monthly BAM labor cost of the project's team. Part-time
    /// assignments contribute half the converted salary.
    pub fn monthly_cost(&self) -> f64 {
        self.staff
            .iter()
            .map(|member| {
                amount_in_bam(member.salary, member.currency)
                    * assignment_fraction(member.part_time)
            })
            .sum()
    }
}

/// Per-project line of the portfolio summary.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_end_date: Option<NaiveDate>,
    pub hourly_rate: f64,
    pub project_velocity: f64,
    pub number_of_employees: usize,
    pub revenue: f64,
    pub cost: f64,
    pub profit: f64,
}

/// Portfolio-level aggregates for one year.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_projects: usize,
    pub total_value: f64,
    pub total_cost: f64,
    pub gross_profit: f64,
    pub average_value: f64,
    pub average_rate: f64,
    pub average_velocity: f64,
    pub average_team_size: f64,
    pub weeks_over_deadline: f64,
    pub sales_channel_percentage: BTreeMap<String, f64>,
    pub project_type_count: BTreeMap<String, usize>,
    pub projects: Vec<ProjectSnapshot>,
}

impl PortfolioSummary {
    fn empty() -> Self {
        Self {
            total_projects: 0,
            total_value: 0.0,
            total_cost: 0.0,
            gross_profit: 0.0,
            average_value: 0.0,
            average_rate: 0.0,
            average_velocity: 0.0,
            average_team_size: 0.0,
            weeks_over_deadline: 0.0,
            sales_channel_percentage: BTreeMap::new(),
            project_type_count: BTreeMap::new(),
            projects: Vec::new(),
        }
    }
}

fn sales_channel_key(channel: SalesChannel) -> &'static str {
    match channel {
        SalesChannel::Online => "Online",
        SalesChannel::InPerson => "InPerson",
        SalesChannel::Referral => "Referral",
        SalesChannel::Other => "Other",
    }
}

fn project_type_key(project_type: ProjectType) -> &'static str {
    match project_type {
        ProjectType::Fixed => "Fixed",
        ProjectType::OnGoing => "OnGoing",
    }
}

/// Whole weeks (fractions allowed) the project finished past its planned
/// end; zero when it finished on time or is still open.
fn weeks_over_deadline(project: &Project) -> f64 {
    match project.actual_end_date {
        Some(actual_end) if actual_end >= project.end_date => {
            f64::from((actual_end - project.end_date).num_days() as i32) / 7.0
        }
        _ => 0.0,
    }
}

/// Summarize the projects whose schedule overlaps `year`.
///
/// Revenue is the project value in BAM, cost the summed allocated team
/// salaries, profit their difference. Aggregates are plain sums and
/// arithmetic means over the selected projects.
pub fn portfolio_summary(year: i32, staffings: &[ProjectStaffing]) -> PortfolioSummary {
    let (Some(year_start), Some(year_end)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) else {
        return PortfolioSummary::empty();
    };

    let selected: Vec<&ProjectStaffing> = staffings
        .iter()
        .filter(|staffing| staffing.project.overlaps(year_start, year_end))
        .collect();
    if selected.is_empty() {
        return PortfolioSummary::empty();
    }

    let projects: Vec<ProjectSnapshot> = selected
        .iter()
        .map(|staffing| {
            let revenue = staffing.project.project_value_bam;
            let cost = staffing.monthly_cost();
            ProjectSnapshot {
                name: staffing.project.name.clone(),
                start_date: staffing.project.start_date,
                end_date: staffing.project.end_date,
                actual_end_date: staffing.project.actual_end_date,
                hourly_rate: staffing.project.hourly_rate,
                project_velocity: staffing.project.project_velocity,
                number_of_employees: staffing.staff.len(),
                revenue,
                cost,
                profit: revenue - cost,
            }
        })
        .collect();

    let total = selected.len();
    let count = total as f64;
    let total_value: f64 = projects.iter().map(|p| p.revenue).sum();
    let total_cost: f64 = projects.iter().map(|p| p.cost).sum();
    let total_rate: f64 = projects.iter().map(|p| p.hourly_rate).sum();
    let total_velocity: f64 = projects.iter().map(|p| p.project_velocity).sum();
    let total_team: usize = projects.iter().map(|p| p.number_of_employees).sum();
    let over_deadline: f64 = selected
        .iter()
        .map(|staffing| weeks_over_deadline(&staffing.project))
        .sum();

    let mut sales_channel_percentage = BTreeMap::new();
    let mut project_type_count = BTreeMap::new();
    for staffing in &selected {
        *sales_channel_percentage
            .entry(sales_channel_key(staffing.project.sales_channel).to_owned())
            .or_insert(0.0) += 100.0 / count;
        *project_type_count
            .entry(project_type_key(staffing.project.project_type).to_owned())
            .or_insert(0) += 1;
    }

    PortfolioSummary {
        total_projects: total,
        total_value,
        total_cost,
        gross_profit: total_value - total_cost,
        average_value: total_value / count,
        average_rate: total_rate / count,
        average_velocity: total_velocity / count,
        average_team_size: total_team as f64 / count,
        weeks_over_deadline: over_deadline,
        sales_channel_percentage,
        project_type_count,
        projects,
    }
}
