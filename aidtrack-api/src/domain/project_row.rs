//! One line of the tab-separated project export, validated but not yet resolved against
//! the lookup tables.

use std::str::FromStr;

use itertools::Itertools;
use rust_decimal::Decimal;
use thiserror::Error;
use time::Date;

use super::{
    models::{LookupId, ProjectId, ProjectRecord},
    project_date::parse_project_date,
};

/// Rows with fewer fields than this are skipped.
pub const MIN_FIELDS: usize = 16;

mod column {
    pub const PROJECT_ID: usize = 0;
    pub const TITLE: usize = 1;
    pub const PAAS_CODE: usize = 2;
    pub const APPROVAL_STATUS: usize = 3;
    pub const FUND_CODE: usize = 4;
    pub const PAG_VALUE: usize = 5;
    pub const START_DATE: usize = 6;
    pub const END_DATE: usize = 7;
    pub const COUNTRY: usize = 8;
    pub const LEAD_ORG_UNIT: usize = 9;
    pub const THEME: usize = 10;
    pub const DONORS: usize = 11;
    pub const TOTAL_EXPENDITURE: usize = 12;
    pub const TOTAL_CONTRIBUTION: usize = 13;
    // 14 is not used
    pub const TOTAL_PSC: usize = 15;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("expected at least {} fields, found {found}", MIN_FIELDS)]
    TooFewFields { found: usize },
    #[error("project id is not an integer: {0:?}")]
    InvalidProjectId(String),
    #[error("{field} is not a valid amount: {value:?}")]
    InvalidAmount { field: &'static str, value: String },
}

/// Parse a monetary amount, dropping thousands separators (`"4,218,607.00"`).
///
/// Blank input yields `None`.
pub fn parse_amount(field: &'static str, text: &str) -> Result<Option<Decimal>, RowError> {
    let cleaned = text.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(None);
    }

    Decimal::from_str(cleaned)
        .map(Some)
        .map_err(|_| RowError::InvalidAmount {
            field,
            value: text.to_string(),
        })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRow {
    pub project_id: ProjectId,
    pub title: String,
    pub paas_code: Option<String>,
    /// Required lookup names are resolved as written, even when blank.
    pub approval_status: String,
    pub fund_code: String,
    pub pag_value: Option<Decimal>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub country: String,
    pub lead_org_unit: Option<String>,
    pub theme: Option<String>,
    /// Distinct donor names in the order they were listed.
    pub donors: Vec<String>,
    pub total_expenditure: Option<Decimal>,
    pub total_contribution: Option<Decimal>,
    pub total_psc: Option<Decimal>,
}

/// Lookup ids a [`ProjectRow`] resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedLookups {
    pub approval_status: LookupId,
    pub fund: LookupId,
    pub country: LookupId,
    pub lead_org_unit: Option<LookupId>,
    pub theme: Option<LookupId>,
}

impl ProjectRow {
    /// Validate the raw fields of one line.
    ///
    /// Unparseable dates do not reject the row; they become `None` with a warning.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, RowError> {
        if fields.len() < MIN_FIELDS {
            return Err(RowError::TooFewFields {
                found: fields.len(),
            });
        }
        let field = |index: usize| fields[index].as_ref().trim();

        let project_id = field(column::PROJECT_ID)
            .parse::<i32>()
            .map(ProjectId::new)
            .map_err(|_| RowError::InvalidProjectId(field(column::PROJECT_ID).to_string()))?;

        Ok(Self {
            project_id,
            title: field(column::TITLE).to_string(),
            paas_code: optional(field(column::PAAS_CODE)),
            approval_status: field(column::APPROVAL_STATUS).to_string(),
            fund_code: field(column::FUND_CODE).to_string(),
            pag_value: parse_amount("pag value", field(column::PAG_VALUE))?,
            start_date: parse_project_date(field(column::START_DATE)),
            end_date: parse_project_date(field(column::END_DATE)),
            country: field(column::COUNTRY).to_string(),
            lead_org_unit: optional(field(column::LEAD_ORG_UNIT)),
            theme: optional(field(column::THEME)),
            donors: split_donors(field(column::DONORS)),
            total_expenditure: parse_amount(
                "total expenditure",
                field(column::TOTAL_EXPENDITURE),
            )?,
            total_contribution: parse_amount(
                "total contribution",
                field(column::TOTAL_CONTRIBUTION),
            )?,
            total_psc: parse_amount("total psc", field(column::TOTAL_PSC))?,
        })
    }

    pub fn to_record(&self, lookups: ResolvedLookups) -> ProjectRecord {
        ProjectRecord {
            project_id: self.project_id,
            title: self.title.clone(),
            paas_code: self.paas_code.clone(),
            approval_status: lookups.approval_status,
            fund: lookups.fund,
            pag_value: self.pag_value,
            start_date: self.start_date,
            end_date: self.end_date,
            country: lookups.country,
            lead_org_unit: lookups.lead_org_unit,
            theme: lookups.theme,
            total_expenditure: self.total_expenditure,
            total_contribution: self.total_contribution,
            total_psc: self.total_psc,
        }
    }
}

fn optional(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn split_donors(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unique()
        .map(str::to_string)
        .collect()
}
