//! Session message endpoints.

use axum::Json;

use crate::error::Result;
use crate::messages::{self, Recipient, StatusUpdate, TextMessage};
use crate::metrics::SessionMetrics;

use super::models::{require_non_empty, MessageStatusRequest, TextMessageRequest};

/// POST /api/v1/messages/text - Build a free-form text message
#[tracing::instrument(name = "http.text_message", skip(request))]
pub async fn build_text_message(Json(request): Json<TextMessageRequest>) -> Result<Json<TextMessage>> {
    require_non_empty("from", &request.from)?;
    require_non_empty("body", &request.body)?;
    let to = Recipient::parse(&request.to)?;

    SessionMetrics::record_text();
    Ok(Json(messages::text_message(
        &request.from,
        &to,
        &request.body,
        request.preview_url,
    )))
}

/// POST /api/v1/messages/read - Build a read receipt
#[tracing::instrument(name = "http.read_receipt", skip(request))]
pub async fn build_read_receipt(
    Json(request): Json<MessageStatusRequest>,
) -> Result<Json<StatusUpdate>> {
    let update = messages::mark_as_read(request.target()?)?;
    tracing::debug!(phone_number_id = %update.phone_number_id, "Read receipt built");

    SessionMetrics::record_read();
    Ok(Json(update))
}

/// POST /api/v1/messages/typing - Build a read receipt with typing indicator
#[tracing::instrument(name = "http.typing_indicator", skip(request))]
pub async fn build_typing_indicator(
    Json(request): Json<MessageStatusRequest>,
) -> Result<Json<StatusUpdate>> {
    let update = messages::show_typing(request.target()?)?;
    tracing::debug!(phone_number_id = %update.phone_number_id, "Typing indicator built");

    SessionMetrics::record_typing();
    Ok(Json(update))
}
