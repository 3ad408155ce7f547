//! Loads the tab-separated project export into the store.
//!
//! Rows are processed one at a time in file order. A bad row is logged and skipped; it never
//! aborts the rest of the file.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    domain::{
        models::{LookupKind, ProjectId},
        project_row::{ProjectRow, ResolvedLookups, RowError},
    },
    repositories::{LookupRepository, ProjectRepository, RepositoryError},
};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read import data: {0}")]
    Read(#[source] csv::Error),
}

/// Why a single row was not imported.
#[derive(Debug, Error)]
pub enum RowImportError {
    #[error(transparent)]
    Invalid(#[from] RowError),
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// Result of importing one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowImport {
    pub project_id: ProjectId,
    pub created: bool,
    pub donor_links_added: usize,
}

/// Totals for one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    /// Rows rejected before touching the store (too few fields, bad numbers, ...).
    pub skipped: usize,
    /// Rows the store refused.
    pub failed: usize,
    pub donor_links_added: usize,
}

impl ImportSummary {
    pub fn imported(&self) -> usize {
        self.created + self.updated
    }
}

/// Turns export rows into projects, lookup entries and donor links.
///
/// # Example
///
/// ```ignore
/// let importer = ProjectImporter::new(lookup_repo, project_repo);
/// let summary = importer.import_file(Path::new("projects.txt")).await?;
/// println!("{} created, {} updated", summary.created, summary.updated);
/// ```
pub struct ProjectImporter<L: ?Sized, P: ?Sized> {
    lookups: Arc<L>,
    projects: Arc<P>,
}

impl<L, P> ProjectImporter<L, P>
where
    L: LookupRepository + ?Sized,
    P: ProjectRepository + ?Sized,
{
    pub fn new(lookups: Arc<L>, projects: Arc<P>) -> Self {
        Self { lookups, projects }
    }

    /// Import one row of at least 16 fields.
    ///
    /// The project is created or fully overwritten. Donor links are only ever added, so a
    /// donor missing from a re-imported row keeps its existing link.
    pub async fn import_row<S: AsRef<str>>(
        &self,
        fields: &[S],
    ) -> Result<RowImport, RowImportError> {
        let row = ProjectRow::from_fields(fields)?;

        let lookups = ResolvedLookups {
            approval_status: self
                .lookups
                .resolve(LookupKind::ApprovalStatus, &row.approval_status)
                .await?,
            fund: self.lookups.resolve(LookupKind::Fund, &row.fund_code).await?,
            country: self
                .lookups
                .resolve(LookupKind::Country, &row.country)
                .await?,
            lead_org_unit: self
                .lookups
                .resolve_optional(LookupKind::LeadOrgUnit, row.lead_org_unit.as_deref())
                .await?,
            theme: self
                .lookups
                .resolve_optional(LookupKind::Theme, row.theme.as_deref())
                .await?,
        };

        let outcome = self.projects.upsert(&row.to_record(lookups)).await?;

        let mut donor_links_added = 0;
        for donor in &row.donors {
            let donor_id = self.lookups.resolve(LookupKind::Donor, donor).await?;
            if self
                .projects
                .link_donor(outcome.project_id, donor_id)
                .await?
            {
                donor_links_added += 1;
            }
        }

        if outcome.created {
            info!(project_id = %outcome.project_id, title = %row.title, "Created project");
        } else {
            info!(project_id = %outcome.project_id, title = %row.title, "Updated project");
        }

        Ok(RowImport {
            project_id: outcome.project_id,
            created: outcome.created,
            donor_links_added,
        })
    }

    pub async fn import_file(&self, path: &Path) -> Result<ImportSummary, ImportError> {
        info!(path = %path.display(), "Importing projects");

        let file = File::open(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.import_reader(file).await
    }

    /// Import every line after the header.
    ///
    /// Per-line problems are only reflected in the returned summary. Failing to read the
    /// input at all is an error.
    pub async fn import_reader<R: Read>(&self, reader: R) -> Result<ImportSummary, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut summary = ImportSummary::default();

        for record in csv_reader.records() {
            let record = match record {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Err(ImportError::Read(e)),
                Err(e) => {
                    let line = e.position().map(|position| position.line());
                    warn!(line, error = %e, "Skipping unreadable line");
                    summary.skipped += 1;
                    continue;
                }
            };
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            let line = record.position().map(|position| position.line());

            let fields: Vec<&str> = record.iter().collect();
            match self.import_row(&fields).await {
                Ok(imported) => {
                    if imported.created {
                        summary.created += 1;
                    } else {
                        summary.updated += 1;
                    }
                    summary.donor_links_added += imported.donor_links_added;
                }
                Err(RowImportError::Invalid(e)) => {
                    warn!(line, error = %e, "Skipping line");
                    summary.skipped += 1;
                }
                Err(RowImportError::Storage(e)) => {
                    error!(line, error = %e, "Failed to store line");
                    summary.failed += 1;
                }
            }
        }

        info!(
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            failed = summary.failed,
            donor_links_added = summary.donor_links_added,
            "Finished importing projects"
        );

        Ok(summary)
    }
}
