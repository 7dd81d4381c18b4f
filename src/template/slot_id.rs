//! Slot identifier derivation shared by extraction and compilation.

use std::fmt;

/// Slot holding the hosted media URL of an IMAGE/VIDEO/DOCUMENT/AUDIO header
pub const HEADER_MEDIA_URL: &str = "header_media_url";

/// Where a user-fillable value lands in a template.
///
/// The rendered id is a pure function of the component kind, the button
/// index and the placeholder text, so both directions always agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKey<'a> {
    Body(&'a str),
    Header(&'a str),
    HeaderMedia,
    ButtonParam { index: usize, name: &'a str },
    FlowToken { index: usize },
    FlowActionData { index: usize },
}

impl SlotKey<'_> {
    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SlotKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKey::Body(name) => write!(f, "body_param_{}", name),
            SlotKey::Header(name) => write!(f, "header_param_{}", name),
            SlotKey::HeaderMedia => f.write_str(HEADER_MEDIA_URL),
            SlotKey::ButtonParam { index, name } => write!(f, "button_{}_param_{}", index, name),
            SlotKey::FlowToken { index } => write!(f, "button_{}_flow_token", index),
            SlotKey::FlowActionData { index } => write!(f, "button_{}_flow_action_data", index),
        }
    }
}
