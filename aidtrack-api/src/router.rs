use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::{app_state::AppState, config::Settings, routes};

pub fn create(app_state: AppState, config: &Settings) -> Router<()> {
    let app_url = config.application.app_url.clone();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            origin.as_bytes() == app_url.as_bytes()
        }));

    routes(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}

pub(crate) fn routes(app_state: AppState) -> Router<()> {
    Router::new()
        .route("/", get(|| async { "aidtrack-api is running" }))
        .nest("/projects", routes::projects::router())
        .nest("/lookups", routes::lookups::router())
        .nest("/dashboard", routes::dashboard::router())
        .with_state(app_state)
}
