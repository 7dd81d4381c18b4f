//! Request and response bodies of the HTTP API

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::messages::StatusTarget;
use crate::template::{
    Fallback, MessageTemplate, OutboundPayload, SlotDescriptor, TemplateCatalog, TemplateOption,
    VariableMap,
};

/// Where a request's template comes from: inline JSON or the catalog
#[derive(Debug, Default, Deserialize)]
pub struct TemplateSource {
    /// Full template JSON as returned by the listing API
    #[serde(default)]
    pub template: Option<serde_json::Value>,

    /// Reference to a template already loaded into the catalog
    #[serde(default)]
    pub template_ref: Option<TemplateRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateRef {
    pub name: String,
    pub language: String,
}

/// A template source that could not be turned into a template
pub enum Unresolved {
    /// Inline JSON that does not match the document model
    Malformed(crate::template::TemplateError),
    /// Anything else: missing source, unknown catalog reference
    Rejected(AppError),
}

impl TemplateSource {
    /// Resolve to a template, keeping malformed inline JSON distinguishable.
    pub fn resolve(self, catalog: &TemplateCatalog) -> std::result::Result<MessageTemplate, Unresolved> {
        match (self.template, self.template_ref) {
            (Some(inline), _) => MessageTemplate::from_value(inline).map_err(Unresolved::Malformed),
            (None, Some(reference)) => catalog
                .get(&reference.name, &reference.language)
                .map_err(|e| Unresolved::Rejected(e.into())),
            (None, None) => Err(Unresolved::Rejected(AppError::Validation(
                "Either `template` or `template_ref` is required".to_string(),
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExtractSlotsRequest {
    #[serde(flatten)]
    pub source: TemplateSource,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractSlotsResponse {
    pub slots: Vec<SlotDescriptor>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct CompileTemplateRequest {
    /// Sending business phone number
    pub from: String,

    /// Recipient phone number, normalized to E.164
    pub to: String,

    #[serde(flatten)]
    pub source: TemplateSource,

    /// Slot id -> value; any JSON scalar is accepted
    #[serde(default)]
    pub variables: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompileTemplateResponse {
    pub payload: OutboundPayload,
    pub fallbacks: Vec<Fallback>,
}

#[derive(Debug, Deserialize)]
pub struct TextMessageRequest {
    pub from: String,
    pub to: String,
    pub body: String,
    #[serde(default)]
    pub preview_url: bool,
}

/// Read/typing request. Ids missing here are looked up in `inbound`.
#[derive(Debug, Default, Deserialize)]
pub struct MessageStatusRequest {
    #[serde(default)]
    pub phone_number_id: Option<String>,

    #[serde(default)]
    pub message_id: Option<String>,

    /// Inbound webhook payload being replied to
    #[serde(default)]
    pub inbound: Option<serde_json::Value>,
}

impl MessageStatusRequest {
    pub fn target(&self) -> Result<StatusTarget> {
        Ok(StatusTarget::resolve(
            self.phone_number_id.as_deref(),
            self.message_id.as_deref(),
            self.inbound.as_ref(),
        )?)
    }
}

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateOption>,
    pub total: usize,
}

/// Convert request variables to the compiler's string map.
///
/// Numbers and booleans are stringified, `null` counts as missing and
/// arrays/objects are passed on as JSON text (flow action data).
pub fn to_variable_map(values: serde_json::Map<String, serde_json::Value>) -> VariableMap {
    values
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Null => return None,
                other => other.to_string(),
            };
            Some((key, text))
        })
        .collect()
}

pub fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("`{}` must not be empty", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_variable_map() {
        let values = json!({
            "body_param_1": "John",
            "body_param_2": 42,
            "body_param_3": true,
            "body_param_4": null,
            "button_0_flow_action_data": {"screen": "HOME"}
        });
        let serde_json::Value::Object(values) = values else {
            unreachable!()
        };

        let map = to_variable_map(values);
        assert_eq!(map["body_param_1"], "John");
        assert_eq!(map["body_param_2"], "42");
        assert_eq!(map["body_param_3"], "true");
        assert!(!map.contains_key("body_param_4"));
        assert_eq!(map["button_0_flow_action_data"], r#"{"screen":"HOME"}"#);
    }

    #[test]
    fn test_resolve_requires_a_source() {
        let catalog = TemplateCatalog::default();
        assert!(matches!(
            TemplateSource::default().resolve(&catalog),
            Err(Unresolved::Rejected(AppError::Validation(_)))
        ));
    }

    #[test]
    fn test_resolve_inline_and_reference() {
        let catalog = TemplateCatalog::default();
        let inline = TemplateSource {
            template: Some(json!({"name": "hello", "language": "en"})),
            template_ref: None,
        };
        assert_eq!(inline.resolve(&catalog).ok().unwrap().name, "hello");

        let malformed = TemplateSource {
            template: Some(json!({"name": []})),
            template_ref: None,
        };
        assert!(matches!(
            malformed.resolve(&catalog),
            Err(Unresolved::Malformed(_))
        ));

        let missing = TemplateSource {
            template: None,
            template_ref: Some(TemplateRef {
                name: "nope".to_string(),
                language: "en".to_string(),
            }),
        };
        assert!(matches!(
            missing.resolve(&catalog),
            Err(Unresolved::Rejected(AppError::NotFound(_)))
        ));
    }
}
