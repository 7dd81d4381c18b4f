//! API layer - HTTP endpoint handlers organized by domain.

mod health;
mod messages;
mod metrics;
mod models;
mod routes;
mod templates;

// Re-export all handlers for use in server/app.rs
pub use health::{health, CatalogHealthResponse, HealthResponse};
pub use messages::{build_read_receipt, build_text_message, build_typing_indicator};
pub use metrics::prometheus_metrics;
pub use models::{
    to_variable_map, CompileTemplateRequest, CompileTemplateResponse, ExtractSlotsRequest,
    ExtractSlotsResponse, MessageStatusRequest, TemplateListResponse, TemplateRef,
    TemplateSource, TextMessageRequest,
};
pub use routes::api_routes;
pub use templates::{
    compile_template_message, delete_template, extract_template_slots, get_template,
    list_templates, load_templates,
};
