//! WhatsApp message templates.
//!
//! This module provides:
//! - The template document model (components and buttons as tagged unions)
//! - Placeholder token scanning (`{{1}}` positional, `{{name}}` named)
//! - Slot extraction: the inputs a template needs, with stable ids
//! - Payload compilation: template + variables -> provider send body
//! - An in-memory catalog of already-fetched templates
//!
//! Extraction and compilation both derive slot ids through [`SlotKey`], so a
//! value stored under an extracted slot id always lands in the wire parameter
//! that produced the slot.
//!
//! # Example
//!
//! ```ignore
//! let template = MessageTemplate::from_json(raw)?;
//!
//! // body_param_1, header_media_url, button_0_param_1, ...
//! let slots = extract_slots(&template);
//!
//! let mut variables = VariableMap::new();
//! variables.insert("body_param_1".to_string(), "John".to_string());
//!
//! let payload = compile(&template, "+15550001111", "+15550002222", &variables);
//! ```

mod catalog;
mod compile;
mod extract;
mod slot_id;
mod tokens;
mod types;

pub use catalog::{
    create_template_catalog, CatalogEntry, LoadSummary, TemplateCatalog, TemplateKey,
    TemplateOption, DEFAULT_MAX_TEMPLATES,
};
pub use compile::{
    compile, compile_with_report, ButtonSubType, Compilation, CompiledComponent, ComponentType,
    Fallback, FallbackKind, FlowAction, MediaLink, OutboundPayload, Parameter, TemplatePayload,
    VariableMap, BUTTON_PARAM_FALLBACK, FLOW_TOKEN_FALLBACK,
};
pub use extract::{extract_slots, extract_slots_from_json, extract_slots_from_value, SlotDescriptor};
pub use slot_id::{SlotKey, HEADER_MEDIA_URL};
pub use tokens::{first_placeholder, placeholders, Placeholder, TokenKind};
pub use types::{
    AutofillOtp, BodyComponent, BodyExample, Button, ButtonsComponent, CarouselCard,
    CarouselComponent, CopyCodeButton, CopyCodeOtp, FlowButton, FlowId, FooterComponent,
    HeaderComponent, LimitedTimeOffer, LimitedTimeOfferComponent, MediaFormat, MediaHeader,
    MediaHeaderExample, MessageTemplate, NamedParamExample, OtpButton, ParameterFormat,
    PhoneNumberButton, SupportedApp, TemplateCategory, TemplateComponent, TemplateError,
    TemplateResult, TemplateStatus, TextButton, TextHeader, TextHeaderExample, UrlButton,
};
