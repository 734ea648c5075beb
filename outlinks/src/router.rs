use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method, StatusCode},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{future::ready, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api::endpoints::{
    create_outlink, delete_outlink, get_outlink, list_outlinks, method_not_allowed, preflight,
    record_method_not_allowed, update_outlink,
};
use crate::metrics_utils::track_metrics;
use crate::service::OutLinkService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OutLinkService>,
}

pub fn router(
    service: Arc<OutLinkService>,
    enable_cors: bool,
    max_body_size: usize,
    metrics: Option<PrometheusHandle>,
) -> Router {
    let state = AppState { service };

    let mut collection = get(list_outlinks)
        .post(create_outlink)
        .put(update_outlink)
        .delete(delete_outlink);
    if enable_cors {
        collection = collection.options(preflight);
    }
    let collection = collection.fallback(method_not_allowed);
    let record = get(get_outlink).fallback(record_method_not_allowed);

    let status_router = Router::new()
        .route("/_readiness", get(|| ready(StatusCode::OK)))
        .route("/_liveness", get(|| ready(StatusCode::OK)));

    let outlinks_router = Router::new()
        .route("/outlinks", collection.clone())
        .route("/outlinks/:id", record.clone())
        .route("/api/outlinks", collection)
        .route("/api/outlinks/:id", record);

    let mut router = Router::new()
        .merge(status_router)
        .merge(outlinks_router)
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
            .allow_origin(Any);
        router = router.layer(cors);
    }

    let router = router.with_state(state);

    match metrics {
        Some(recorder_handle) => router
            .route("/metrics", get(move || ready(recorder_handle.render())))
            .layer(axum::middleware::from_fn(track_metrics)),
        None => router,
    }
}
