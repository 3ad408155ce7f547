use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::LookupId;

/// The six reference tables a project points into.
///
/// Serialized in kebab-case plural form, which is also the path segment used by the
/// `/lookups/:kind` routes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LookupKind {
    #[serde(rename = "approval-statuses")]
    #[strum(serialize = "approval-statuses")]
    ApprovalStatus,
    #[serde(rename = "funds")]
    #[strum(serialize = "funds")]
    Fund,
    #[serde(rename = "countries")]
    #[strum(serialize = "countries")]
    Country,
    #[serde(rename = "lead-org-units")]
    #[strum(serialize = "lead-org-units")]
    LeadOrgUnit,
    #[serde(rename = "themes")]
    #[strum(serialize = "themes")]
    Theme,
    #[serde(rename = "donors")]
    #[strum(serialize = "donors")]
    Donor,
}

impl LookupKind {
    /// Backing table name. Static, so it is safe to splice into SQL.
    pub fn table(&self) -> &'static str {
        match self {
            Self::ApprovalStatus => "approval_statuses",
            Self::Fund => "funds",
            Self::Country => "countries",
            Self::LeadOrgUnit => "lead_org_units",
            Self::Theme => "themes",
            Self::Donor => "donors",
        }
    }

    /// Human readable label for log lines and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ApprovalStatus => "approval status",
            Self::Fund => "fund",
            Self::Country => "country",
            Self::LeadOrgUnit => "lead org unit",
            Self::Theme => "theme",
            Self::Donor => "donor",
        }
    }
}

/// A single row of a lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntry {
    pub id: LookupId,
    pub name: String,
}

impl LookupEntry {
    pub fn new(id: impl Into<LookupId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
