//! In-memory implementation of the repository traits for tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::models::{
    GroupBy, GroupSummary, LookupEntry, LookupId, LookupKind, ProjectDetail, ProjectFilter,
    ProjectId, ProjectRecord, ProjectSummary, UpsertOutcome,
};

use super::{LookupRepository, ProjectRepository, RepositoryError};

#[derive(Default)]
struct State {
    lookups: HashMap<LookupKind, BTreeMap<LookupId, String>>,
    next_lookup_id: i32,
    projects: BTreeMap<ProjectId, ProjectRecord>,
    donor_links: BTreeSet<(ProjectId, LookupId)>,
}

impl State {
    fn name(&self, kind: LookupKind, id: LookupId) -> Option<&String> {
        self.lookups.get(&kind).and_then(|table| table.get(&id))
    }

    fn check_references(&self, record: &ProjectRecord) -> Result<(), RepositoryError> {
        let references = [
            (LookupKind::ApprovalStatus, Some(record.approval_status)),
            (LookupKind::Fund, Some(record.fund)),
            (LookupKind::Country, Some(record.country)),
            (LookupKind::LeadOrgUnit, record.lead_org_unit),
            (LookupKind::Theme, record.theme),
        ];
        for (kind, id) in references {
            if let Some(id) = id {
                if self.name(kind, id).is_none() {
                    return Err(RepositoryError::InvalidReference(format!(
                        "{} {}",
                        kind.label(),
                        id
                    )));
                }
            }
        }
        Ok(())
    }

    fn summary(&self, record: &ProjectRecord) -> ProjectSummary {
        let name = |kind, id| self.name(kind, id).cloned().unwrap_or_default();
        ProjectSummary {
            project_id: record.project_id,
            title: record.title.clone(),
            paas_code: record.paas_code.clone(),
            approval_status: record.approval_status,
            approval_status_name: name(LookupKind::ApprovalStatus, record.approval_status),
            fund: record.fund,
            fund_code: name(LookupKind::Fund, record.fund),
            pag_value: record.pag_value,
            start_date: record.start_date,
            end_date: record.end_date,
            country: record.country,
            country_name: name(LookupKind::Country, record.country),
            lead_org_unit: record.lead_org_unit,
            lead_org_unit_name: record
                .lead_org_unit
                .map(|id| name(LookupKind::LeadOrgUnit, id)),
            theme: record.theme,
            theme_name: record.theme.map(|id| name(LookupKind::Theme, id)),
            total_expenditure: record.total_expenditure,
            total_contribution: record.total_contribution,
            total_psc: record.total_psc,
        }
    }
}

/// Shared in-memory store implementing both [`LookupRepository`] and [`ProjectRepository`].
///
/// Clones share state. Enforces the same uniqueness and reference rules as the schema.
#[derive(Clone, Default)]
pub struct MockStore {
    state: Arc<RwLock<State>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in a lookup table.
    pub fn lookup_count(&self, kind: LookupKind) -> usize {
        self.state
            .read()
            .unwrap()
            .lookups
            .get(&kind)
            .map_or(0, BTreeMap::len)
    }

    pub fn project_count(&self) -> usize {
        self.state.read().unwrap().projects.len()
    }

    pub fn record(&self, project_id: ProjectId) -> Option<ProjectRecord> {
        self.state
            .read()
            .unwrap()
            .projects
            .get(&project_id)
            .cloned()
    }

    /// Names of the donors linked to a project, sorted.
    pub fn donor_names(&self, project_id: ProjectId) -> Vec<String> {
        let state = self.state.read().unwrap();
        let mut names: Vec<String> = state
            .donor_links
            .iter()
            .filter(|(project, _)| *project == project_id)
            .filter_map(|(_, donor)| state.name(LookupKind::Donor, *donor).cloned())
            .collect();
        names.sort();
        names
    }

    pub fn donor_link_count(&self) -> usize {
        self.state.read().unwrap().donor_links.len()
    }
}

#[async_trait]
impl LookupRepository for MockStore {
    async fn resolve(&self, kind: LookupKind, name: &str) -> Result<LookupId, RepositoryError> {
        let mut state = self.state.write().unwrap();
        let existing = state.lookups.get(&kind).and_then(|table| {
            table
                .iter()
                .find(|(_, existing)| existing.as_str() == name)
                .map(|(id, _)| *id)
        });
        if let Some(id) = existing {
            return Ok(id);
        }

        state.next_lookup_id += 1;
        let id = LookupId::new(state.next_lookup_id);
        state
            .lookups
            .entry(kind)
            .or_default()
            .insert(id, name.to_string());
        Ok(id)
    }

    async fn list(&self, kind: LookupKind) -> Result<Vec<LookupEntry>, RepositoryError> {
        let state = self.state.read().unwrap();
        let mut entries: Vec<LookupEntry> = state
            .lookups
            .get(&kind)
            .into_iter()
            .flatten()
            .map(|(id, name)| LookupEntry::new(*id, name.clone()))
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn get(&self, kind: LookupKind, id: LookupId) -> Result<LookupEntry, RepositoryError> {
        self.state
            .read()
            .unwrap()
            .name(kind, id)
            .map(|name| LookupEntry::new(id, name.clone()))
            .ok_or_else(|| RepositoryError::NotFound(format!("{} {}", kind.label(), id)))
    }

    async fn delete(&self, kind: LookupKind, id: LookupId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().unwrap();
        if state.name(kind, id).is_none() {
            return Err(RepositoryError::NotFound(format!("{} {}", kind.label(), id)));
        }

        let referenced = state.projects.values().any(|record| match kind {
            LookupKind::ApprovalStatus => record.approval_status == id,
            LookupKind::Fund => record.fund == id,
            LookupKind::Country => record.country == id,
            LookupKind::LeadOrgUnit => record.lead_org_unit == Some(id),
            LookupKind::Theme => record.theme == Some(id),
            LookupKind::Donor => false,
        });
        if referenced {
            return Err(RepositoryError::Referenced(format!("{} {}", kind.label(), id)));
        }

        if kind == LookupKind::Donor {
            state.donor_links.retain(|(_, donor)| *donor != id);
        }
        if let Some(table) = state.lookups.get_mut(&kind) {
            table.remove(&id);
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectRepository for MockStore {
    async fn list(&self, filter: &ProjectFilter) -> Result<Vec<ProjectSummary>, RepositoryError> {
        let state = self.state.read().unwrap();
        let projects = state
            .projects
            .values()
            .map(|record| state.summary(record))
            .filter(|project| match filter {
                ProjectFilter::All => true,
                ProjectFilter::Country(name) => project.country_name.eq_ignore_ascii_case(name),
                ProjectFilter::ApprovalStatus(name) => {
                    project.approval_status_name.eq_ignore_ascii_case(name)
                }
            })
            .collect();
        Ok(projects)
    }

    async fn get(&self, project_id: ProjectId) -> Result<ProjectDetail, RepositoryError> {
        let state = self.state.read().unwrap();
        let record = state
            .projects
            .get(&project_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("project {project_id}")))?;

        let mut donors: Vec<LookupEntry> = state
            .donor_links
            .iter()
            .filter(|(project, _)| *project == project_id)
            .filter_map(|(_, donor)| {
                state
                    .name(LookupKind::Donor, *donor)
                    .map(|name| LookupEntry::new(*donor, name.clone()))
            })
            .collect();
        donors.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(ProjectDetail {
            project: state.summary(record),
            donors,
        })
    }

    async fn upsert(&self, record: &ProjectRecord) -> Result<UpsertOutcome, RepositoryError> {
        let mut state = self.state.write().unwrap();
        state.check_references(record)?;
        let created = state
            .projects
            .insert(record.project_id, record.clone())
            .is_none();
        Ok(UpsertOutcome {
            project_id: record.project_id,
            created,
        })
    }

    async fn insert(&self, record: &ProjectRecord) -> Result<(), RepositoryError> {
        let mut state = self.state.write().unwrap();
        if state.projects.contains_key(&record.project_id) {
            return Err(RepositoryError::AlreadyExists(format!(
                "project {}",
                record.project_id
            )));
        }
        state.check_references(record)?;
        state.projects.insert(record.project_id, record.clone());
        Ok(())
    }

    async fn update(&self, record: &ProjectRecord) -> Result<(), RepositoryError> {
        let mut state = self.state.write().unwrap();
        if !state.projects.contains_key(&record.project_id) {
            return Err(RepositoryError::NotFound(format!(
                "project {}",
                record.project_id
            )));
        }
        state.check_references(record)?;
        state.projects.insert(record.project_id, record.clone());
        Ok(())
    }

    async fn delete(&self, project_id: ProjectId) -> Result<(), RepositoryError> {
        let mut state = self.state.write().unwrap();
        if state.projects.remove(&project_id).is_none() {
            return Err(RepositoryError::NotFound(format!("project {project_id}")));
        }
        state.donor_links.retain(|(project, _)| *project != project_id);
        Ok(())
    }

    async fn link_donor(
        &self,
        project_id: ProjectId,
        donor_id: LookupId,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().unwrap();
        if !state.projects.contains_key(&project_id)
            || state.name(LookupKind::Donor, donor_id).is_none()
        {
            return Err(RepositoryError::InvalidReference(format!(
                "donor {donor_id} of project {project_id}"
            )));
        }
        Ok(state.donor_links.insert((project_id, donor_id)))
    }

    async fn summarize(&self, group_by: GroupBy) -> Result<Vec<GroupSummary>, RepositoryError> {
        let state = self.state.read().unwrap();
        let mut groups: BTreeMap<Option<String>, (i64, Option<Decimal>)> = BTreeMap::new();

        for record in state.projects.values() {
            let key = match group_by {
                GroupBy::Country => state.name(LookupKind::Country, record.country).cloned(),
                GroupBy::OrgUnit => record
                    .lead_org_unit
                    .and_then(|id| state.name(LookupKind::LeadOrgUnit, id).cloned()),
                GroupBy::Theme => record
                    .theme
                    .and_then(|id| state.name(LookupKind::Theme, id).cloned()),
            };
            let (count, total) = groups.entry(key).or_insert((0, None));
            *count += 1;
            if let Some(value) = record.pag_value {
                *total = Some(total.unwrap_or_default() + value);
            }
        }

        let mut summaries: Vec<GroupSummary> = groups
            .into_iter()
            .map(|(group_key, (count, total_value))| GroupSummary {
                group_key,
                count,
                total_value,
            })
            .collect();
        summaries.sort_by(GroupSummary::dashboard_order);
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    async fn record(store: &MockStore, project_id: i32, country: &str) -> ProjectRecord {
        ProjectRecord {
            project_id: ProjectId::new(project_id),
            title: format!("Project {project_id}"),
            paas_code: None,
            approval_status: store
                .resolve(LookupKind::ApprovalStatus, "Approved")
                .await
                .unwrap(),
            fund: store.resolve(LookupKind::Fund, "FNO").await.unwrap(),
            pag_value: Some(Decimal::new(100, 0)),
            start_date: None,
            end_date: None,
            country: store.resolve(LookupKind::Country, country).await.unwrap(),
            lead_org_unit: None,
            theme: None,
            total_expenditure: None,
            total_contribution: None,
            total_psc: None,
        }
    }

    #[tokio::test]
    async fn resolve_is_idempotent_per_table() {
        let store = MockStore::new();

        let first = store.resolve(LookupKind::Country, "Kenya").await.unwrap();
        let second = store.resolve(LookupKind::Country, "Kenya").await.unwrap();
        let theme = store.resolve(LookupKind::Theme, "Kenya").await.unwrap();

        assert_eq!(first, second);
        assert_ne!(first, theme);
        assert_eq!(store.lookup_count(LookupKind::Country), 1);
        assert_eq!(store.lookup_count(LookupKind::Theme), 1);
    }

    #[tokio::test]
    async fn resolve_optional_skips_blank_names() {
        let store = MockStore::new();

        assert_eq!(
            store
                .resolve_optional(LookupKind::Theme, Some("  "))
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            store
                .resolve_optional(LookupKind::Theme, None)
                .await
                .unwrap(),
            None
        );
        assert_eq!(store.lookup_count(LookupKind::Theme), 0);
    }

    #[tokio::test]
    async fn referenced_lookup_cannot_be_deleted() {
        let store = MockStore::new();
        let project = record(&store, 1, "Kenya").await;
        store.upsert(&project).await.unwrap();

        let result = LookupRepository::delete(&store, LookupKind::Country, project.country).await;
        assert!(matches!(result, Err(RepositoryError::Referenced(_))));

        ProjectRepository::delete(&store, project.project_id)
            .await
            .unwrap();
        LookupRepository::delete(&store, LookupKind::Country, project.country)
            .await
            .unwrap();
        assert_eq!(store.lookup_count(LookupKind::Country), 0);
    }

    #[tokio::test]
    async fn deleting_a_donor_drops_its_links() {
        let store = MockStore::new();
        let project = record(&store, 1, "Kenya").await;
        store.upsert(&project).await.unwrap();
        let donor = store.resolve(LookupKind::Donor, "Sida").await.unwrap();
        store.link_donor(project.project_id, donor).await.unwrap();

        LookupRepository::delete(&store, LookupKind::Donor, donor)
            .await
            .unwrap();

        assert_eq!(store.donor_link_count(), 0);
    }

    #[tokio::test]
    async fn insert_rejects_unknown_lookup_ids() {
        let store = MockStore::new();
        let mut project = record(&store, 1, "Kenya").await;
        project.theme = Some(LookupId::new(999));

        let result = store.insert(&project).await;
        assert!(matches!(result, Err(RepositoryError::InvalidReference(_))));
        assert_eq!(store.project_count(), 0);
    }

    #[tokio::test]
    async fn summaries_group_and_sum_by_country() {
        let store = MockStore::new();
        for (id, country) in [(1, "Kenya"), (2, "Kenya"), (3, "Uganda")] {
            let project = record(&store, id, country).await;
            store.upsert(&project).await.unwrap();
        }

        let by_country = store.summarize(GroupBy::Country).await.unwrap();
        assert_eq!(
            by_country,
            vec![
                GroupSummary {
                    group_key: Some("Kenya".to_string()),
                    count: 2,
                    total_value: Some(Decimal::new(200, 0)),
                },
                GroupSummary {
                    group_key: Some("Uganda".to_string()),
                    count: 1,
                    total_value: Some(Decimal::new(100, 0)),
                },
            ]
        );

        let by_theme = store.summarize(GroupBy::Theme).await.unwrap();
        assert_eq!(by_theme.len(), 1);
        assert_eq!(by_theme[0].group_key, None);
        assert_eq!(by_theme[0].count, 3);
    }
}
