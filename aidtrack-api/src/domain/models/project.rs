use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use super::{LookupEntry, LookupId, ProjectId};

/// Everything stored for a project, with lookups referenced by id.
///
/// This is the write model: an upsert replaces every field with the values here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub project_id: ProjectId,
    pub title: String,
    pub paas_code: Option<String>,
    pub approval_status: LookupId,
    pub fund: LookupId,
    pub pag_value: Option<Decimal>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub country: LookupId,
    pub lead_org_unit: Option<LookupId>,
    pub theme: Option<LookupId>,
    pub total_expenditure: Option<Decimal>,
    pub total_contribution: Option<Decimal>,
    pub total_psc: Option<Decimal>,
}

/// A project as presented to readers, with lookup names resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub project_id: ProjectId,
    pub title: String,
    pub paas_code: Option<String>,
    pub approval_status: LookupId,
    pub approval_status_name: String,
    pub fund: LookupId,
    pub fund_code: String,
    pub pag_value: Option<Decimal>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub country: LookupId,
    pub country_name: String,
    pub lead_org_unit: Option<LookupId>,
    pub lead_org_unit_name: Option<String>,
    pub theme: Option<LookupId>,
    pub theme_name: Option<String>,
    pub total_expenditure: Option<Decimal>,
    pub total_contribution: Option<Decimal>,
    pub total_psc: Option<Decimal>,
}

/// A project together with its linked donors (ordered by name).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: ProjectSummary,
    pub donors: Vec<LookupEntry>,
}

/// Which projects a listing should return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectFilter {
    All,
    /// Country name, matched case-insensitively.
    Country(String),
    /// Approval status name, matched case-insensitively.
    ApprovalStatus(String),
}

/// Result of writing a project through the upsert path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub project_id: ProjectId,
    /// `false` when an existing project was overwritten.
    pub created: bool,
}
