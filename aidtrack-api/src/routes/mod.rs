pub(crate) mod dashboard;
pub(crate) mod error;
pub(crate) mod lookups;
pub(crate) mod projects;

pub(crate) use error::ApiError;

#[cfg(test)]
pub(crate) fn test_server(store: &crate::repositories::MockStore) -> axum_test::TestServer {
    use std::sync::Arc;

    let store = Arc::new(store.clone());
    let app_state = crate::AppState::from_repositories(store.clone(), store);
    axum_test::TestServer::new(crate::router::routes(app_state))
        .expect("failed to start test server")
}
