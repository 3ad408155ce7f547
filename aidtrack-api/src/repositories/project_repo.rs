use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{postgres::PgArguments, query::QueryScalar, PgPool, Postgres};
use time::Date;

use crate::domain::models::{
    Dashboard, GroupBy, GroupSummary, LookupEntry, LookupId, ProjectDetail, ProjectFilter,
    ProjectId, ProjectRecord, ProjectSummary, UpsertOutcome,
};

use super::repo_error::RepositoryError;

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Projects matching `filter`, ordered by project id.
    async fn list(&self, filter: &ProjectFilter) -> Result<Vec<ProjectSummary>, RepositoryError>;

    async fn get(&self, project_id: ProjectId) -> Result<ProjectDetail, RepositoryError>;

    /// Create the project, or replace every field of the existing one.
    async fn upsert(&self, record: &ProjectRecord) -> Result<UpsertOutcome, RepositoryError>;

    /// Create a project. Fails with [`RepositoryError::AlreadyExists`] if the id is taken.
    async fn insert(&self, record: &ProjectRecord) -> Result<(), RepositoryError>;

    /// Replace an existing project. Fails with [`RepositoryError::NotFound`] if absent.
    async fn update(&self, record: &ProjectRecord) -> Result<(), RepositoryError>;

    /// Delete a project together with its donor links.
    async fn delete(&self, project_id: ProjectId) -> Result<(), RepositoryError>;

    /// Link a donor to a project. Returns `false` if the link already existed.
    async fn link_donor(
        &self,
        project_id: ProjectId,
        donor_id: LookupId,
    ) -> Result<bool, RepositoryError>;

    /// Project count and PAG value total per group, most populated group first.
    async fn summarize(&self, group_by: GroupBy) -> Result<Vec<GroupSummary>, RepositoryError>;

    async fn dashboard(&self) -> Result<Dashboard, RepositoryError> {
        Ok(Dashboard {
            by_country: self.summarize(GroupBy::Country).await?,
            by_org_unit: self.summarize(GroupBy::OrgUnit).await?,
            by_theme: self.summarize(GroupBy::Theme).await?,
        })
    }
}

const PROJECT_SELECT: &str = r#"
    SELECT
        p.project_id, p.title, p.paas_code,
        p.approval_status_id, a.name AS approval_status_name,
        p.fund_id, f.name AS fund_code,
        p.pag_value, p.start_date, p.end_date,
        p.country_id, c.name AS country_name,
        p.lead_org_unit_id, l.name AS lead_org_unit_name,
        p.theme_id, t.name AS theme_name,
        p.total_expenditure, p.total_contribution, p.total_psc
    FROM projects p
    JOIN approval_statuses a ON a.id = p.approval_status_id
    JOIN funds f ON f.id = p.fund_id
    JOIN countries c ON c.id = p.country_id
    LEFT JOIN lead_org_units l ON l.id = p.lead_org_unit_id
    LEFT JOIN themes t ON t.id = p.theme_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct DatabaseProject {
    project_id: i32,
    title: String,
    paas_code: Option<String>,
    approval_status_id: i32,
    approval_status_name: String,
    fund_id: i32,
    fund_code: String,
    pag_value: Option<Decimal>,
    start_date: Option<Date>,
    end_date: Option<Date>,
    country_id: i32,
    country_name: String,
    lead_org_unit_id: Option<i32>,
    lead_org_unit_name: Option<String>,
    theme_id: Option<i32>,
    theme_name: Option<String>,
    total_expenditure: Option<Decimal>,
    total_contribution: Option<Decimal>,
    total_psc: Option<Decimal>,
}

impl From<DatabaseProject> for ProjectSummary {
    fn from(row: DatabaseProject) -> Self {
        ProjectSummary {
            project_id: ProjectId::new(row.project_id),
            title: row.title,
            paas_code: row.paas_code,
            approval_status: LookupId::new(row.approval_status_id),
            approval_status_name: row.approval_status_name,
            fund: LookupId::new(row.fund_id),
            fund_code: row.fund_code,
            pag_value: row.pag_value,
            start_date: row.start_date,
            end_date: row.end_date,
            country: LookupId::new(row.country_id),
            country_name: row.country_name,
            lead_org_unit: row.lead_org_unit_id.map(LookupId::new),
            lead_org_unit_name: row.lead_org_unit_name,
            theme: row.theme_id.map(LookupId::new),
            theme_name: row.theme_name,
            total_expenditure: row.total_expenditure,
            total_contribution: row.total_contribution,
            total_psc: row.total_psc,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DatabaseDonor {
    id: i32,
    name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct DatabaseGroup {
    group_key: Option<String>,
    count: i64,
    total_value: Option<Decimal>,
}

/// Bind the record's fields as `$1..$14` in `projects` column order.
fn bind_record<'q, O>(
    query: QueryScalar<'q, Postgres, O, PgArguments>,
    record: &ProjectRecord,
) -> QueryScalar<'q, Postgres, O, PgArguments> {
    query
        .bind(record.project_id.as_i32())
        .bind(record.title.clone())
        .bind(record.paas_code.clone())
        .bind(record.approval_status.as_i32())
        .bind(record.fund.as_i32())
        .bind(record.pag_value)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(record.country.as_i32())
        .bind(record.lead_org_unit.map(|id| id.as_i32()))
        .bind(record.theme.map(|id| id.as_i32()))
        .bind(record.total_expenditure)
        .bind(record.total_contribution)
        .bind(record.total_psc)
}

pub struct ProjectRepositoryImpl {
    pool: PgPool,
}

impl ProjectRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for ProjectRepositoryImpl {
    async fn list(&self, filter: &ProjectFilter) -> Result<Vec<ProjectSummary>, RepositoryError> {
        let (condition, name) = match filter {
            ProjectFilter::All => ("", None),
            ProjectFilter::Country(name) => {
                ("WHERE LOWER(c.name) = LOWER($1)", Some(name.as_str()))
            }
            ProjectFilter::ApprovalStatus(name) => {
                ("WHERE LOWER(a.name) = LOWER($1)", Some(name.as_str()))
            }
        };
        let sql = format!("{PROJECT_SELECT} {condition} ORDER BY p.project_id");

        let mut query = sqlx::query_as::<_, DatabaseProject>(&sql);
        if let Some(name) = name {
            query = query.bind(name);
        }
        let rows = query.fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(ProjectSummary::from).collect())
    }

    async fn get(&self, project_id: ProjectId) -> Result<ProjectDetail, RepositoryError> {
        let sql = format!("{PROJECT_SELECT} WHERE p.project_id = $1");
        let project = sqlx::query_as::<_, DatabaseProject>(&sql)
            .bind(project_id.as_i32())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("project {project_id}")))?;

        let donors = sqlx::query_as::<_, DatabaseDonor>(
            r#"
            SELECT d.id, d.name
            FROM project_donors pd
            JOIN donors d ON d.id = pd.donor_id
            WHERE pd.project_id = $1
            ORDER BY d.name
            "#,
        )
        .bind(project_id.as_i32())
        .fetch_all(&self.pool)
        .await?;

        Ok(ProjectDetail {
            project: project.into(),
            donors: donors
                .into_iter()
                .map(|donor| LookupEntry::new(donor.id, donor.name))
                .collect(),
        })
    }

    async fn upsert(&self, record: &ProjectRecord) -> Result<UpsertOutcome, RepositoryError> {
        // xmax is only zero for a freshly inserted tuple.
        let query = sqlx::query_scalar::<_, bool>(
            r#"
            INSERT INTO projects (
                project_id, title, paas_code, approval_status_id, fund_id, pag_value,
                start_date, end_date, country_id, lead_org_unit_id, theme_id,
                total_expenditure, total_contribution, total_psc
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (project_id) DO UPDATE
            SET title = EXCLUDED.title,
                paas_code = EXCLUDED.paas_code,
                approval_status_id = EXCLUDED.approval_status_id,
                fund_id = EXCLUDED.fund_id,
                pag_value = EXCLUDED.pag_value,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                country_id = EXCLUDED.country_id,
                lead_org_unit_id = EXCLUDED.lead_org_unit_id,
                theme_id = EXCLUDED.theme_id,
                total_expenditure = EXCLUDED.total_expenditure,
                total_contribution = EXCLUDED.total_contribution,
                total_psc = EXCLUDED.total_psc
            RETURNING (xmax = 0) AS created
            "#,
        );

        let created = bind_record(query, record)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, format!("project {}", record.project_id)))?;

        Ok(UpsertOutcome {
            project_id: record.project_id,
            created,
        })
    }

    async fn insert(&self, record: &ProjectRecord) -> Result<(), RepositoryError> {
        let query = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO projects (
                project_id, title, paas_code, approval_status_id, fund_id, pag_value,
                start_date, end_date, country_id, lead_org_unit_id, theme_id,
                total_expenditure, total_contribution, total_psc
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING project_id
            "#,
        );

        bind_record(query, record)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, format!("project {}", record.project_id)))?;

        Ok(())
    }

    async fn update(&self, record: &ProjectRecord) -> Result<(), RepositoryError> {
        let query = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE projects
            SET title = $2,
                paas_code = $3,
                approval_status_id = $4,
                fund_id = $5,
                pag_value = $6,
                start_date = $7,
                end_date = $8,
                country_id = $9,
                lead_org_unit_id = $10,
                theme_id = $11,
                total_expenditure = $12,
                total_contribution = $13,
                total_psc = $14
            WHERE project_id = $1
            RETURNING project_id
            "#,
        );

        bind_record(query, record)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, format!("project {}", record.project_id)))?
            .ok_or_else(|| RepositoryError::NotFound(format!("project {}", record.project_id)))?;

        Ok(())
    }

    async fn delete(&self, project_id: ProjectId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM projects WHERE project_id = $1")
            .bind(project_id.as_i32())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("project {project_id}")));
        }

        Ok(())
    }

    async fn link_donor(
        &self,
        project_id: ProjectId,
        donor_id: LookupId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO project_donors (project_id, donor_id)
            VALUES ($1, $2)
            ON CONFLICT (project_id, donor_id) DO NOTHING
            "#,
        )
        .bind(project_id.as_i32())
        .bind(donor_id.as_i32())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_write(e, format!("donor {donor_id} of project {project_id}"))
        })?;

        Ok(result.rows_affected() == 1)
    }

    async fn summarize(&self, group_by: GroupBy) -> Result<Vec<GroupSummary>, RepositoryError> {
        let (key, join) = match group_by {
            GroupBy::Country => ("c.name", "JOIN countries c ON c.id = p.country_id"),
            GroupBy::OrgUnit => (
                "l.name",
                "LEFT JOIN lead_org_units l ON l.id = p.lead_org_unit_id",
            ),
            GroupBy::Theme => ("t.name", "LEFT JOIN themes t ON t.id = p.theme_id"),
        };
        let sql = format!(
            r#"
            SELECT {key} AS group_key,
                   COUNT(p.project_id) AS count,
                   SUM(p.pag_value) AS total_value
            FROM projects p
            {join}
            GROUP BY {key}
            ORDER BY count DESC, group_key ASC NULLS LAST
            "#
        );

        let rows = sqlx::query_as::<_, DatabaseGroup>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| GroupSummary {
                group_key: row.group_key,
                count: row.count,
                total_value: row.total_value,
            })
            .collect())
    }
}
