//! Reference data and one demo project for a fresh database.

use rust_decimal::Decimal;
use time::macros::date;
use tracing::info;

use crate::{
    domain::models::{LookupKind, ProjectId, ProjectRecord},
    repositories::{LookupRepository, ProjectRepository, RepositoryError},
};

const DEMO_PROJECT_ID: i32 = 1000;

const REFERENCE_DATA: &[(LookupKind, &[&str])] = &[
    (LookupKind::ApprovalStatus, &["Approved", "Pending Approval"]),
    (LookupKind::Fund, &["FNO", "FNE", "FOD", "FJO", "QXB"]),
    (LookupKind::Country, &["GLOBAL", "Kenya", "Uganda"]),
    (LookupKind::LeadOrgUnit, &["Urban Economy", "Urban Planning"]),
    (LookupKind::Theme, &["Urban Economy", "Urban Planning"]),
    (
        LookupKind::Donor,
        &["BASF Stiftung", "PM of Norway to the United Nations"],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedOutcome {
    pub lookups_resolved: usize,
    pub demo_project_created: bool,
}

/// Seed the lookup tables and the demo project.
///
/// Safe to run repeatedly. An existing demo project is left untouched.
pub async fn seed_initial_data<L, P>(
    lookups: &L,
    projects: &P,
) -> Result<SeedOutcome, RepositoryError>
where
    L: LookupRepository + ?Sized,
    P: ProjectRepository + ?Sized,
{
    let mut lookups_resolved = 0;
    for (kind, names) in REFERENCE_DATA {
        for name in names.iter() {
            lookups.resolve(*kind, name).await?;
            lookups_resolved += 1;
        }
    }

    let project_id = ProjectId::new(DEMO_PROJECT_ID);
    match projects.get(project_id).await {
        Ok(_) => {
            info!(%project_id, "Demo project already present");
            return Ok(SeedOutcome {
                lookups_resolved,
                demo_project_created: false,
            });
        }
        Err(RepositoryError::NotFound(_)) => {}
        Err(e) => return Err(e),
    }

    let record = ProjectRecord {
        project_id,
        title: "FSGLO10S05:Youth Empowerment for Urban Development".to_string(),
        paas_code: Some("H139".to_string()),
        approval_status: lookups.resolve(LookupKind::ApprovalStatus, "Approved").await?,
        fund: lookups.resolve(LookupKind::Fund, "FNO").await?,
        pag_value: Some(Decimal::new(421860700, 2)),
        start_date: Some(date!(2012 - 01 - 01)),
        end_date: Some(date!(2013 - 12 - 31)),
        country: lookups.resolve(LookupKind::Country, "GLOBAL").await?,
        lead_org_unit: Some(lookups.resolve(LookupKind::LeadOrgUnit, "Urban Economy").await?),
        theme: Some(lookups.resolve(LookupKind::Theme, "Urban Economy").await?),
        total_expenditure: Some(Decimal::new(443975700, 2)),
        total_contribution: Some(Decimal::new(432925700, 2)),
        total_psc: Some(Decimal::new(31654800, 2)),
    };
    projects.insert(&record).await?;

    for donor in ["BASF Stiftung", "PM of Norway to the United Nations"] {
        let donor_id = lookups.resolve(LookupKind::Donor, donor).await?;
        projects.link_donor(project_id, donor_id).await?;
    }

    info!(%project_id, lookups_resolved, "Seeded demo project");

    Ok(SeedOutcome {
        lookups_resolved,
        demo_project_created: true,
    })
}
