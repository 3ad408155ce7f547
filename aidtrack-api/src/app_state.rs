use std::sync::Arc;

use sqlx::PgPool;

use crate::repositories::{
    LookupRepository, LookupRepositoryImpl, ProjectRepository, ProjectRepositoryImpl,
};

#[derive(Clone)]
pub struct AppState {
    pub lookup_repo: Arc<dyn LookupRepository>,
    pub project_repo: Arc<dyn ProjectRepository>,
}

impl AppState {
    pub fn new(db_pool: PgPool) -> Self {
        Self::from_repositories(
            Arc::new(LookupRepositoryImpl::new(db_pool.clone())),
            Arc::new(ProjectRepositoryImpl::new(db_pool)),
        )
    }

    pub fn from_repositories(
        lookup_repo: Arc<dyn LookupRepository>,
        project_repo: Arc<dyn ProjectRepository>,
    ) -> Self {
        Self {
            lookup_repo,
            project_repo,
        }
    }
}
