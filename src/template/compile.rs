//! Payload compilation: template + variables -> provider send body.
//!
//! Compilation is total. A missing variable never fails a send; each
//! component kind has its own fallback, and every fallback applied is
//! reported next to the payload so callers can log or count it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::slot_id::SlotKey;
use super::tokens::{first_placeholder, placeholders, Placeholder};
use super::types::{
    BodyComponent, Button, ButtonsComponent, FlowButton, FlowId, HeaderComponent, MediaFormat,
    MessageTemplate, TemplateComponent,
};

/// Value sent for an unresolved URL or copy-code button parameter.
/// The provider rejects raw `{{...}}` tokens in button payloads.
pub const BUTTON_PARAM_FALLBACK: &str = "123456";

/// Flow token sent when the caller supplies none
pub const FLOW_TOKEN_FALLBACK: &str = "unused";

/// Slot id -> user supplied value
pub type VariableMap = HashMap<String, String>;

/// The provider's send-message body for a template message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundPayload {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub template: TemplatePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplatePayload {
    pub name: String,
    pub lang_code: String,
    pub components: Vec<CompiledComponent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledComponent {
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<ButtonSubType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Header,
    Body,
    Button,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonSubType {
    Url,
    CopyCode,
    Flow,
}

/// A single wire parameter, keyed on `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Parameter {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parameter_name: Option<String>,
    },
    Image {
        image: MediaLink,
    },
    Video {
        video: MediaLink,
    },
    Document {
        document: MediaLink,
    },
    Audio {
        audio: MediaLink,
    },
    Action {
        action: FlowAction,
    },
}

impl Parameter {
    fn text(token: &Placeholder<'_>, text: String) -> Self {
        Parameter::Text {
            text,
            parameter_name: token.parameter_name().map(str::to_string),
        }
    }

    fn media(format: MediaFormat, link: &str) -> Self {
        let link = MediaLink {
            link: link.to_string(),
        };
        match format {
            MediaFormat::Image => Parameter::Image { image: link },
            MediaFormat::Video => Parameter::Video { video: link },
            MediaFormat::Document => Parameter::Document { document: link },
            MediaFormat::Audio => Parameter::Audio { audio: link },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaLink {
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowAction {
    pub flow_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_action_data: Option<serde_json::Value>,
}

/// Which default replaced a missing or unusable variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackKind {
    /// Body/header parameter sent as its literal `{{X}}` token
    RawToken,
    /// Button parameter sent as [`BUTTON_PARAM_FALLBACK`]
    ButtonPlaceholder,
    /// Flow token sent as [`FLOW_TOKEN_FALLBACK`]
    FlowToken,
    /// Flow action data that was not valid JSON, sent as `{}`
    MalformedFlowActionData,
    /// Media header dropped because no URL was supplied
    MediaOmitted,
}

impl FallbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackKind::RawToken => "raw_token",
            FallbackKind::ButtonPlaceholder => "button_placeholder",
            FallbackKind::FlowToken => "flow_token",
            FallbackKind::MalformedFlowActionData => "malformed_flow_action_data",
            FallbackKind::MediaOmitted => "media_omitted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fallback {
    pub slot_id: String,
    pub kind: FallbackKind,
}

/// Compiled payload plus the fallbacks applied while building it
#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    pub payload: OutboundPayload,
    pub fallbacks: Vec<Fallback>,
}

/// Build the send body for `template` addressed `from` -> `to`.
pub fn compile(
    template: &MessageTemplate,
    from: &str,
    to: &str,
    variables: &VariableMap,
) -> OutboundPayload {
    compile_with_report(template, from, to, variables).payload
}

/// Same as [`compile`], also reporting every fallback applied.
pub fn compile_with_report(
    template: &MessageTemplate,
    from: &str,
    to: &str,
    variables: &VariableMap,
) -> Compilation {
    let mut compiler = Compiler {
        variables,
        components: Vec::new(),
        fallbacks: Vec::new(),
    };

    for component in &template.components {
        match component {
            TemplateComponent::Header(header) => compiler.header(header),
            TemplateComponent::Body(body) => compiler.body(body),
            TemplateComponent::Buttons(buttons) => compiler.buttons(buttons),
            TemplateComponent::Footer(_)
            | TemplateComponent::Carousel(_)
            | TemplateComponent::LimitedTimeOffer(_)
            | TemplateComponent::CallPermissionRequest
            | TemplateComponent::Unknown => {}
        }
    }

    Compilation {
        payload: OutboundPayload {
            from: from.to_string(),
            to: to.to_string(),
            message_type: "template".to_string(),
            template: TemplatePayload {
                name: template.name.clone(),
                lang_code: template.language.clone(),
                components: compiler.components,
            },
        },
        fallbacks: compiler.fallbacks,
    }
}

struct Compiler<'v> {
    variables: &'v VariableMap,
    components: Vec<CompiledComponent>,
    fallbacks: Vec<Fallback>,
}

impl<'v> Compiler<'v> {
    /// Empty strings count as missing.
    fn lookup(&self, key: SlotKey<'_>) -> Option<&'v str> {
        self.variables
            .get(&key.id())
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    fn fallback(&mut self, key: SlotKey<'_>, kind: FallbackKind) {
        self.fallbacks.push(Fallback {
            slot_id: key.id(),
            kind,
        });
    }

    fn push(
        &mut self,
        component_type: ComponentType,
        button: Option<(ButtonSubType, usize)>,
        parameters: Vec<Parameter>,
    ) {
        if parameters.is_empty() {
            return;
        }
        self.components.push(CompiledComponent {
            component_type,
            sub_type: button.map(|(sub_type, _)| sub_type),
            index: button.map(|(_, index)| index),
            parameters,
        });
    }

    /// One text parameter per distinct token, unresolved ones kept verbatim.
    fn text_parameters<'t>(
        &mut self,
        text: &'t str,
        key_for: impl Fn(&'t str) -> SlotKey<'t>,
    ) -> Vec<Parameter> {
        placeholders(text)
            .iter()
            .map(|token| {
                let key = key_for(token.name());
                let value = match self.lookup(key) {
                    Some(value) => value.to_string(),
                    None => {
                        self.fallback(key, FallbackKind::RawToken);
                        token.raw().to_string()
                    }
                };
                Parameter::text(token, value)
            })
            .collect()
    }

    fn body(&mut self, body: &BodyComponent) {
        let Some(text) = body.text.as_deref() else {
            return;
        };
        let parameters = self.text_parameters(text, SlotKey::Body);
        self.push(ComponentType::Body, None, parameters);
    }

    fn header(&mut self, header: &HeaderComponent) {
        match header {
            HeaderComponent::Text(text_header) => {
                let parameters = self.text_parameters(&text_header.text, SlotKey::Header);
                self.push(ComponentType::Header, None, parameters);
            }
            HeaderComponent::Image(_)
            | HeaderComponent::Video(_)
            | HeaderComponent::Document(_)
            | HeaderComponent::Audio(_) => {
                let Some(format) = header.media_format() else {
                    return;
                };
                match self.lookup(SlotKey::HeaderMedia) {
                    Some(url) => self.push(
                        ComponentType::Header,
                        None,
                        vec![Parameter::media(format, url)],
                    ),
                    None => self.fallback(SlotKey::HeaderMedia, FallbackKind::MediaOmitted),
                }
            }
            HeaderComponent::Location | HeaderComponent::Product | HeaderComponent::Unknown => {}
        }
    }

    fn buttons(&mut self, component: &ButtonsComponent) {
        for (index, button) in component.buttons.iter().enumerate() {
            match button {
                Button::Url(url) => {
                    self.button_param(index, ButtonSubType::Url, &url.url);
                }
                Button::CopyCode(code) => {
                    let source = [code.text.as_deref(), code.url.as_deref()]
                        .into_iter()
                        .flatten()
                        .find(|text| !text.is_empty())
                        .unwrap_or("");
                    self.button_param(index, ButtonSubType::CopyCode, source);
                }
                Button::Flow(flow) => self.flow_button(index, flow),
                Button::PhoneNumber(_)
                | Button::QuickReply(_)
                | Button::Spm(_)
                | Button::Catalog(_)
                | Button::Mpm(_)
                | Button::Otp(_)
                | Button::Unknown => {}
            }
        }
    }

    /// Only the first token of the field is sent.
    fn button_param(&mut self, index: usize, sub_type: ButtonSubType, source: &str) {
        let Some(token) = first_placeholder(source) else {
            return;
        };

        let key = SlotKey::ButtonParam {
            index,
            name: token.name(),
        };
        let value = match self.lookup(key) {
            Some(value) => value.to_string(),
            None => {
                self.fallback(key, FallbackKind::ButtonPlaceholder);
                BUTTON_PARAM_FALLBACK.to_string()
            }
        };

        self.push(
            ComponentType::Button,
            Some((sub_type, index)),
            vec![Parameter::text(&token, value)],
        );
    }

    fn flow_button(&mut self, index: usize, flow: &FlowButton) {
        let token_key = SlotKey::FlowToken { index };
        let flow_token = match self.lookup(token_key) {
            Some(token) => token.to_string(),
            None => {
                self.fallback(token_key, FallbackKind::FlowToken);
                FLOW_TOKEN_FALLBACK.to_string()
            }
        };

        let data_key = SlotKey::FlowActionData { index };
        let flow_action_data = match self.lookup(data_key) {
            Some(raw) => Some(serde_json::from_str(raw).unwrap_or_else(|_| {
                self.fallback(data_key, FallbackKind::MalformedFlowActionData);
                empty_flow_action_data()
            })),
            None => default_flow_action_data(flow),
        };

        self.push(
            ComponentType::Button,
            Some((ButtonSubType::Flow, index)),
            vec![Parameter::Action {
                action: FlowAction {
                    flow_token,
                    flow_action_data,
                },
            }],
        );
    }
}

fn empty_flow_action_data() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Action data assembled from the button definition itself.
fn default_flow_action_data(flow: &FlowButton) -> Option<serde_json::Value> {
    let mut data = serde_json::Map::new();

    match &flow.flow_id {
        Some(FlowId::Number(id)) => {
            data.insert("flow_id".to_string(), (*id).into());
        }
        Some(FlowId::Text(id)) if !id.is_empty() => {
            data.insert("flow_id".to_string(), id.clone().into());
        }
        _ => {}
    }
    if let Some(action) = flow.flow_action.as_ref().filter(|a| !a.is_empty()) {
        data.insert("flow_action".to_string(), action.clone().into());
    }
    if let Some(screen) = flow.navigate_screen.as_ref().filter(|s| !s.is_empty()) {
        data.insert("navigate_screen".to_string(), screen.clone().into());
    }

    if data.is_empty() {
        None
    } else {
        Some(serde_json::Value::Object(data))
    }
}
