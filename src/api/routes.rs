use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::server::{api_key_auth, AppState};

use super::health::health;
use super::messages::{build_read_receipt, build_text_message, build_typing_indicator};
use super::metrics::prometheus_metrics;
use super::templates::{
    compile_template_message, delete_template, extract_template_slots, get_template,
    list_templates, load_templates,
};

pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .nest(
            "/api/v1",
            Router::new()
                // Templates
                .route("/templates", get(list_templates).post(load_templates))
                .route("/templates/slots", post(extract_template_slots))
                .route(
                    "/templates/{name}/{language}",
                    get(get_template).delete(delete_template),
                )
                // Outbound payloads
                .route("/messages/template", post(compile_template_message))
                .route("/messages/text", post(build_text_message))
                .route("/messages/read", post(build_read_receipt))
                .route("/messages/typing", post(build_typing_indicator))
                .route_layer(middleware::from_fn_with_state(state, api_key_auth)),
        )
}
