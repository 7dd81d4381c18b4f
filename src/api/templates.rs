//! Template endpoints: slot extraction, payload compilation and the catalog.

use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::Result;
use crate::messages::Recipient;
use crate::metrics::{CatalogMetrics, CompileMetrics, SlotMetrics};
use crate::server::AppState;
use crate::template::{compile_with_report, extract_slots, LoadSummary, MessageTemplate};

use super::models::{
    require_non_empty, to_variable_map, CompileTemplateRequest, CompileTemplateResponse,
    ExtractSlotsRequest, ExtractSlotsResponse, TemplateListResponse, Unresolved,
};

/// POST /api/v1/templates/slots - Input slots of a template
///
/// Inline templates that do not parse have no slots.
#[tracing::instrument(name = "http.extract_slots", skip(state, request))]
pub async fn extract_template_slots(
    State(state): State<AppState>,
    Json(request): Json<ExtractSlotsRequest>,
) -> Result<Json<ExtractSlotsResponse>> {
    let slots = match request.source.resolve(&state.catalog) {
        Ok(template) => extract_slots(&template),
        Err(Unresolved::Malformed(e)) => {
            tracing::debug!(error = %e, "Inline template did not parse");
            Vec::new()
        }
        Err(Unresolved::Rejected(e)) => return Err(e),
    };

    SlotMetrics::record_extraction(slots.len());
    let total = slots.len();

    Ok(Json(ExtractSlotsResponse { slots, total }))
}

/// POST /api/v1/messages/template - Compile a template send payload
#[tracing::instrument(name = "http.compile_template", skip(state, request))]
pub async fn compile_template_message(
    State(state): State<AppState>,
    Json(request): Json<CompileTemplateRequest>,
) -> Result<Json<CompileTemplateResponse>> {
    require_non_empty("from", &request.from)?;
    let to = Recipient::parse(&request.to)?;

    let template = match request.source.resolve(&state.catalog) {
        Ok(template) => template,
        Err(Unresolved::Malformed(e)) => return Err(e.into()),
        Err(Unresolved::Rejected(e)) => return Err(e),
    };
    let variables = to_variable_map(request.variables);

    let started = Instant::now();
    let compilation = compile_with_report(&template, &request.from, to.as_str(), &variables);
    CompileMetrics::record_compiled(&compilation.fallbacks, started.elapsed());

    for fallback in &compilation.fallbacks {
        tracing::debug!(
            template = %template.name,
            slot = %fallback.slot_id,
            kind = fallback.kind.as_str(),
            "Compilation fallback applied"
        );
    }

    Ok(Json(CompileTemplateResponse {
        payload: compilation.payload,
        fallbacks: compilation.fallbacks,
    }))
}

/// POST /api/v1/templates - Load a template listing response into the catalog
#[tracing::instrument(name = "http.load_templates", skip(state, listing))]
pub async fn load_templates(
    State(state): State<AppState>,
    Json(listing): Json<serde_json::Value>,
) -> Result<Json<LoadSummary>> {
    let summary = state.catalog.load_listing(&listing)?;
    CatalogMetrics::set_size(state.catalog.count());
    Ok(Json(summary))
}

/// GET /api/v1/templates - List catalog templates
#[tracing::instrument(name = "http.list_templates", skip(state))]
pub async fn list_templates(State(state): State<AppState>) -> Json<TemplateListResponse> {
    let templates = state.catalog.options();
    let total = templates.len();

    Json(TemplateListResponse { templates, total })
}

/// GET /api/v1/templates/{name}/{language} - Get a catalog template
#[tracing::instrument(name = "http.get_template", skip(state))]
pub async fn get_template(
    State(state): State<AppState>,
    Path((name, language)): Path<(String, String)>,
) -> Result<Json<MessageTemplate>> {
    Ok(Json(state.catalog.get(&name, &language)?))
}

/// DELETE /api/v1/templates/{name}/{language} - Remove a catalog template
#[tracing::instrument(name = "http.delete_template", skip(state))]
pub async fn delete_template(
    State(state): State<AppState>,
    Path((name, language)): Path<(String, String)>,
) -> Result<StatusCode> {
    state.catalog.remove(&name, &language)?;
    CatalogMetrics::set_size(state.catalog.count());
    Ok(StatusCode::NO_CONTENT)
}
