use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::models::{LookupEntry, LookupId, LookupKind};

use super::repo_error::RepositoryError;

/// Get-or-create access to the reference tables.
#[async_trait]
pub trait LookupRepository: Send + Sync {
    /// Id of the entry named exactly `name`, creating it if absent.
    ///
    /// Repeated calls with the same pair always return the same id.
    async fn resolve(&self, kind: LookupKind, name: &str) -> Result<LookupId, RepositoryError>;

    /// Like [`resolve`](Self::resolve), but a missing or blank name means "no reference"
    /// and nothing is created.
    async fn resolve_optional(
        &self,
        kind: LookupKind,
        name: Option<&str>,
    ) -> Result<Option<LookupId>, RepositoryError> {
        match name.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => self.resolve(kind, name).await.map(Some),
            None => Ok(None),
        }
    }

    async fn list(&self, kind: LookupKind) -> Result<Vec<LookupEntry>, RepositoryError>;

    async fn get(&self, kind: LookupKind, id: LookupId) -> Result<LookupEntry, RepositoryError>;

    /// Remove an entry. Fails with [`RepositoryError::Referenced`] while a project uses it;
    /// deleting a donor drops its project links.
    async fn delete(&self, kind: LookupKind, id: LookupId) -> Result<(), RepositoryError>;
}

#[derive(Debug, sqlx::FromRow)]
struct DatabaseLookup {
    id: i32,
    name: String,
}

impl From<DatabaseLookup> for LookupEntry {
    fn from(row: DatabaseLookup) -> Self {
        LookupEntry::new(row.id, row.name)
    }
}

pub struct LookupRepositoryImpl {
    pool: PgPool,
}

impl LookupRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LookupRepository for LookupRepositoryImpl {
    async fn resolve(&self, kind: LookupKind, name: &str) -> Result<LookupId, RepositoryError> {
        // The no-op update makes RETURNING yield the existing row on conflict, so concurrent
        // resolvers of a new name converge on a single id.
        let sql = format!(
            r#"
            INSERT INTO {table} (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE
            SET name = EXCLUDED.name
            RETURNING id
            "#,
            table = kind.table()
        );

        let id = sqlx::query_scalar::<_, i32>(&sql)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(LookupId::new(id))
    }

    async fn list(&self, kind: LookupKind) -> Result<Vec<LookupEntry>, RepositoryError> {
        let sql = format!(
            "SELECT id, name FROM {table} ORDER BY name",
            table = kind.table()
        );

        let rows = sqlx::query_as::<_, DatabaseLookup>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(LookupEntry::from).collect())
    }

    async fn get(&self, kind: LookupKind, id: LookupId) -> Result<LookupEntry, RepositoryError> {
        let sql = format!(
            "SELECT id, name FROM {table} WHERE id = $1",
            table = kind.table()
        );

        sqlx::query_as::<_, DatabaseLookup>(&sql)
            .bind(id.as_i32())
            .fetch_optional(&self.pool)
            .await?
            .map(LookupEntry::from)
            .ok_or_else(|| RepositoryError::NotFound(format!("{} {}", kind.label(), id)))
    }

    async fn delete(&self, kind: LookupKind, id: LookupId) -> Result<(), RepositoryError> {
        let sql = format!("DELETE FROM {table} WHERE id = $1", table = kind.table());

        let result = sqlx::query(&sql)
            .bind(id.as_i32())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_delete(e, format!("{} {}", kind.label(), id)))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("{} {}", kind.label(), id)));
        }

        Ok(())
    }
}
