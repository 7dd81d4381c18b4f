//! Slot extraction: which inputs does a template need?

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::slot_id::SlotKey;
use super::tokens::placeholders;
use super::types::{
    BodyComponent, Button, ButtonsComponent, HeaderComponent, MediaFormat, MessageTemplate,
    TemplateComponent,
};

/// A user-fillable input position derived from a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDescriptor {
    /// Stable slot id, the key of the variable map at compile time
    pub id: String,

    /// Human readable label for the input
    pub display_label: String,

    pub required: bool,

    /// Example value taken from the template, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_value: Option<String>,

    /// Whether the slot can be used as a match key for incoming records
    pub can_be_used_to_match: bool,
}

impl SlotDescriptor {
    fn required(key: SlotKey<'_>, display_label: String) -> Self {
        Self {
            id: key.id(),
            display_label,
            required: true,
            example_value: None,
            can_be_used_to_match: true,
        }
    }

    fn optional(key: SlotKey<'_>, display_label: String) -> Self {
        Self {
            required: false,
            ..Self::required(key, display_label)
        }
    }

    fn with_example(mut self, example: Option<&str>) -> Self {
        self.example_value = example.map(str::to_string);
        self
    }
}

/// Ordered, deduplicated slot list scoped to one extraction call.
#[derive(Default)]
struct SlotCollector {
    seen: HashSet<String>,
    slots: Vec<SlotDescriptor>,
}

impl SlotCollector {
    fn push(&mut self, slot: SlotDescriptor) {
        if self.seen.insert(slot.id.clone()) {
            self.slots.push(slot);
        }
    }

    fn contains(&self, key: SlotKey<'_>) -> bool {
        self.seen.contains(&key.id())
    }
}

/// Derive the input slots of a template, in component order.
pub fn extract_slots(template: &MessageTemplate) -> Vec<SlotDescriptor> {
    let mut collector = SlotCollector::default();

    for component in &template.components {
        match component {
            TemplateComponent::Body(body) => collect_body(body, &mut collector),
            TemplateComponent::Header(header) => collect_header(header, &mut collector),
            TemplateComponent::Buttons(buttons) => collect_buttons(buttons, &mut collector),
            TemplateComponent::Footer(_)
            | TemplateComponent::Carousel(_)
            | TemplateComponent::LimitedTimeOffer(_)
            | TemplateComponent::CallPermissionRequest
            | TemplateComponent::Unknown => {}
        }
    }

    collector.slots
}

/// Extract slots from raw template JSON.
///
/// Anything that does not parse as a template yields no slots.
pub fn extract_slots_from_json(raw: &str) -> Vec<SlotDescriptor> {
    match MessageTemplate::from_json(raw) {
        Ok(template) => extract_slots(&template),
        Err(e) => {
            tracing::debug!(error = %e, "Template did not parse, no slots extracted");
            Vec::new()
        }
    }
}

/// Extract slots from an already-decoded JSON value.
pub fn extract_slots_from_value(value: serde_json::Value) -> Vec<SlotDescriptor> {
    match MessageTemplate::from_value(value) {
        Ok(template) => extract_slots(&template),
        Err(e) => {
            tracing::debug!(error = %e, "Template did not parse, no slots extracted");
            Vec::new()
        }
    }
}

fn collect_body(body: &BodyComponent, collector: &mut SlotCollector) {
    let Some(text) = body.text.as_deref() else {
        return;
    };

    for token in placeholders(text) {
        let key = SlotKey::Body(token.name());
        if collector.contains(key) {
            continue;
        }

        let example = token
            .position()
            .and_then(|position| body.positional_example(position));
        let label = match example {
            Some(example) => format!("Body Variable {}. Example: {}", token.raw(), example),
            None => format!("Body Variable {}", token.raw()),
        };

        collector.push(SlotDescriptor::required(key, label).with_example(example));
    }
}

fn collect_header(header: &HeaderComponent, collector: &mut SlotCollector) {
    match header {
        HeaderComponent::Text(text_header) => {
            for token in placeholders(&text_header.text) {
                let label = format!("Header Variable {}", token.raw());
                collector.push(SlotDescriptor::required(SlotKey::Header(token.name()), label));
            }
        }
        HeaderComponent::Image(_) | HeaderComponent::Video(_) | HeaderComponent::Document(_) => {
            if let Some(format) = header.media_format() {
                collect_media_url(format, collector);
            }
        }
        // Audio headers are compiled but never offered as an input
        HeaderComponent::Audio(_)
        | HeaderComponent::Location
        | HeaderComponent::Product
        | HeaderComponent::Unknown => {}
    }
}

fn collect_media_url(format: MediaFormat, collector: &mut SlotCollector) {
    let label = format!("Header {} URL", format.label());
    collector.push(SlotDescriptor::required(SlotKey::HeaderMedia, label));
}

fn collect_buttons(component: &ButtonsComponent, collector: &mut SlotCollector) {
    for (index, button) in component.buttons.iter().enumerate() {
        let searchable = match button {
            Button::Url(url) => first_non_empty(&[Some(url.url.as_str()), Some(url.text.as_str())]),
            Button::CopyCode(code) => first_non_empty(&[code.url.as_deref(), code.text.as_deref()]),
            Button::Flow(_)
            | Button::PhoneNumber(_)
            | Button::QuickReply(_)
            | Button::Spm(_)
            | Button::Catalog(_)
            | Button::Mpm(_)
            | Button::Otp(_)
            | Button::Unknown => "",
        };

        for token in placeholders(searchable) {
            let label = format!(
                "Button {} Variable {}. Type: {}",
                index + 1,
                token.raw(),
                button.type_label()
            );
            let key = SlotKey::ButtonParam {
                index,
                name: token.name(),
            };
            collector.push(SlotDescriptor::required(key, label));
        }

        if let Button::Flow(_) = button {
            collector.push(SlotDescriptor::optional(
                SlotKey::FlowToken { index },
                format!("Button {} Flow Token", index + 1),
            ));
            collector.push(SlotDescriptor::optional(
                SlotKey::FlowActionData { index },
                format!("Button {} Flow Action Data (JSON)", index + 1),
            ));
        }
    }
}

fn first_non_empty<'a>(candidates: &[Option<&'a str>]) -> &'a str {
    candidates
        .iter()
        .flatten()
        .find(|text| !text.is_empty())
        .copied()
        .unwrap_or("")
}
