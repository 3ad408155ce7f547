mod lookup_repo;
#[cfg(test)]
mod mock;
mod project_repo;
mod repo_error;

pub use lookup_repo::*;
#[cfg(test)]
pub use mock::MockStore;
pub use project_repo::*;
pub use repo_error::RepositoryError;
