//! Template document model and error definitions
//!
//! Mirrors the provider's template listing format: every component and
//! button is a tagged union keyed on `type` (and `format` / `otp_type` for
//! headers and OTP buttons). Text fields default to empty so partially
//! populated templates still parse.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Template-specific error type
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Invalid template listing: {0}")]
    InvalidListing(String),

    #[error("Template catalog is full ({0} templates)")]
    CatalogFull(usize),
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// An approved message template as returned by the listing API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageTemplate {
    /// Provider-side template id (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Template name, sent back verbatim on compile
    pub name: String,

    /// Language code, sent back as `lang_code`
    pub language: String,

    #[serde(default)]
    pub category: TemplateCategory,

    #[serde(default)]
    pub status: TemplateStatus,

    /// Message time-to-live in seconds (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_send_ttl_seconds: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_format: Option<ParameterFormat>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,

    /// Ordered template components
    #[serde(default)]
    pub components: Vec<TemplateComponent>,
}

impl MessageTemplate {
    pub fn new(
        name: impl Into<String>,
        language: impl Into<String>,
        components: Vec<TemplateComponent>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            language: language.into(),
            category: TemplateCategory::default(),
            status: TemplateStatus::default(),
            message_send_ttl_seconds: None,
            parameter_format: None,
            sub_category: None,
            components,
        }
    }

    /// Parse a template from its JSON text
    pub fn from_json(raw: &str) -> TemplateResult<Self> {
        serde_json::from_str(raw).map_err(|e| TemplateError::InvalidTemplate(e.to_string()))
    }

    /// Parse a template from an already-decoded JSON value
    pub fn from_value(value: serde_json::Value) -> TemplateResult<Self> {
        serde_json::from_value(value).map_err(|e| TemplateError::InvalidTemplate(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateCategory {
    Utility,
    Marketing,
    Authentication,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TemplateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::Utility => "UTILITY",
            TemplateCategory::Marketing => "MARKETING",
            TemplateCategory::Authentication => "AUTHENTICATION",
            TemplateCategory::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateStatus {
    Approved,
    Pending,
    Rejected,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterFormat {
    #[serde(alias = "NAMED")]
    Named,
    #[serde(alias = "POSITIONAL")]
    Positional,
}

/// One structural block of a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateComponent {
    Header(HeaderComponent),
    Body(BodyComponent),
    Footer(FooterComponent),
    Buttons(ButtonsComponent),
    Carousel(CarouselComponent),
    LimitedTimeOffer(LimitedTimeOfferComponent),
    CallPermissionRequest,
    /// Component types this model does not know yet
    #[serde(other)]
    Unknown,
}

/// Header variants, keyed on `format`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeaderComponent {
    Text(TextHeader),
    Image(MediaHeader),
    Video(MediaHeader),
    Document(MediaHeader),
    Audio(MediaHeader),
    Location,
    Product,
    #[serde(other)]
    Unknown,
}

impl HeaderComponent {
    /// Media format of IMAGE/VIDEO/DOCUMENT/AUDIO headers
    pub fn media_format(&self) -> Option<MediaFormat> {
        match self {
            HeaderComponent::Image(_) => Some(MediaFormat::Image),
            HeaderComponent::Video(_) => Some(MediaFormat::Video),
            HeaderComponent::Document(_) => Some(MediaFormat::Document),
            HeaderComponent::Audio(_) => Some(MediaFormat::Audio),
            HeaderComponent::Text(_)
            | HeaderComponent::Location
            | HeaderComponent::Product
            | HeaderComponent::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextHeader {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<TextHeaderExample>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextHeaderExample {
    #[serde(default)]
    pub header_text: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<MediaHeaderExample>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaHeaderExample {
    #[serde(default)]
    pub header_handle: Vec<String>,
}

/// Hosted media kinds a header can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    Image,
    Video,
    Document,
    Audio,
}

impl MediaFormat {
    /// Upper-case format name as it appears in templates
    pub fn label(&self) -> &'static str {
        match self {
            MediaFormat::Image => "IMAGE",
            MediaFormat::Video => "VIDEO",
            MediaFormat::Document => "DOCUMENT",
            MediaFormat::Audio => "AUDIO",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyComponent {
    /// Authentication bodies have no text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_security_recommendation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<BodyExample>,
}

impl BodyComponent {
    /// Example value for a 1-based positional placeholder.
    ///
    /// Rows of `example.body_text` are flattened before indexing.
    pub fn positional_example(&self, position: usize) -> Option<&str> {
        let example = self.example.as_ref()?;
        let index = position.checked_sub(1)?;
        example
            .body_text
            .iter()
            .flatten()
            .nth(index)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyExample {
    #[serde(default)]
    pub body_text: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body_text_named_params: Vec<NamedParamExample>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedParamExample {
    pub param_name: String,
    pub example: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FooterComponent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_expiration_minutes: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ButtonsComponent {
    #[serde(default)]
    pub buttons: Vec<Button>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarouselComponent {
    #[serde(default)]
    pub cards: Vec<CarouselCard>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarouselCard {
    #[serde(default)]
    pub components: Vec<TemplateComponent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LimitedTimeOfferComponent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limited_time_offer: Option<LimitedTimeOffer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LimitedTimeOffer {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_expiration: Option<bool>,
}

/// Template button variants, keyed on `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Button {
    Url(UrlButton),
    PhoneNumber(PhoneNumberButton),
    QuickReply(TextButton),
    CopyCode(CopyCodeButton),
    Flow(FlowButton),
    Spm(TextButton),
    Catalog(TextButton),
    Mpm(TextButton),
    Otp(OtpButton),
    #[serde(other)]
    Unknown,
}

impl Button {
    /// The button's `type` as it appears on the wire
    pub fn type_label(&self) -> &'static str {
        match self {
            Button::Url(_) => "URL",
            Button::PhoneNumber(_) => "PHONE_NUMBER",
            Button::QuickReply(_) => "QUICK_REPLY",
            Button::CopyCode(_) => "COPY_CODE",
            Button::Flow(_) => "FLOW",
            Button::Spm(_) => "SPM",
            Button::Catalog(_) => "CATALOG",
            Button::Mpm(_) => "MPM",
            Button::Otp(_) => "OTP",
            Button::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlButton {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub example: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumberButton {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub phone_number: String,
}

/// Buttons that only carry a label (QUICK_REPLY, SPM, CATALOG, MPM)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextButton {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopyCodeButton {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Either a single example code or a list of them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowButton {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<FlowId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigate_screen: Option<String>,
}

/// Flow ids arrive as numbers from the listing API but are strings elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlowId {
    Number(u64),
    Text(String),
}

/// Authentication template OTP buttons, keyed on `otp_type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "otp_type", rename_all = "snake_case")]
pub enum OtpButton {
    OneTap(AutofillOtp),
    ZeroTap(AutofillOtp),
    CopyCode(CopyCodeOtp),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutofillOtp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autofill_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_tap_terms_accepted: Option<bool>,
    #[serde(default)]
    pub supported_apps: Vec<SupportedApp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportedApp {
    pub package_name: String,
    pub signature_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopyCodeOtp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}
