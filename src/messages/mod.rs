//! Session (non-template) message payloads.
//!
//! Free-form text replies, read receipts and typing indicators. Like the
//! template compiler these only build request bodies; sending them is the
//! caller's job.
//!
//! Read receipts and typing indicators are addressed to a business phone
//! number id. Both that id and the inbound message id can be given
//! explicitly or looked up in the inbound webhook payload that triggered
//! the reply.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

lazy_static! {
    static ref E164: Regex = Regex::new(r"^\+[1-9]\d{7,14}$").expect("E.164 pattern is valid");
}

const MESSAGING_PRODUCT: &str = "whatsapp";

/// Webhook locations of the business phone number id, in lookup order
const PHONE_NUMBER_ID_POINTERS: &[&str] = &[
    "/phoneNumberId",
    "/phone_number_id",
    "/entry/0/changes/0/value/metadata/phone_number_id",
];

/// Webhook locations of the inbound message id, in lookup order
const MESSAGE_ID_POINTERS: &[&str] = &[
    "/messages/0/id",
    "/message/id",
    "/message_id",
    "/entry/0/changes/0/value/messages/0/id",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessageError {
    #[error("Invalid phone number format. Use E.164, e.g. +1234567890 (got {0:?})")]
    InvalidRecipient(String),

    #[error("Message ID could not be resolved")]
    UnresolvedMessageId,

    #[error("Phone Number ID could not be resolved")]
    UnresolvedPhoneNumberId,
}

pub type MessageResult<T> = Result<T, MessageError>;

/// A recipient phone number in E.164 form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient(String);

impl Recipient {
    /// Normalize and validate a phone number.
    ///
    /// Surrounding whitespace is trimmed and a missing leading `+` is added.
    pub fn parse(raw: &str) -> MessageResult<Self> {
        let trimmed = raw.trim();
        let normalized = if trimmed.starts_with('+') {
            trimmed.to_string()
        } else {
            format!("+{}", trimmed)
        };

        if E164.is_match(&normalized) {
            Ok(Recipient(normalized))
        } else {
            Err(MessageError::InvalidRecipient(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMessage {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub text: TextBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBody {
    pub body: String,
    pub preview_url: bool,
}

/// Build a free-form text message
pub fn text_message(from: &str, to: &Recipient, body: &str, preview_url: bool) -> TextMessage {
    TextMessage {
        from: from.to_string(),
        to: to.as_str().to_string(),
        message_type: "text".to_string(),
        text: TextBody {
            body: body.to_string(),
            preview_url,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadReceipt {
    pub messaging_product: String,
    pub status: String,
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typing_indicator: Option<TypingIndicator>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingIndicator {
    #[serde(rename = "type")]
    pub indicator_type: String,
}

/// Mark an inbound message as read
pub fn read_receipt(message_id: &str) -> MessageResult<ReadReceipt> {
    let message_id = message_id.trim();
    if message_id.is_empty() {
        return Err(MessageError::UnresolvedMessageId);
    }

    Ok(ReadReceipt {
        messaging_product: MESSAGING_PRODUCT.to_string(),
        status: "read".to_string(),
        message_id: message_id.to_string(),
        typing_indicator: None,
    })
}

/// Mark an inbound message as read and show a typing indicator
pub fn typing_indicator(message_id: &str) -> MessageResult<ReadReceipt> {
    let mut receipt = read_receipt(message_id)?;
    receipt.typing_indicator = Some(TypingIndicator {
        indicator_type: "text".to_string(),
    });
    Ok(receipt)
}

/// The phone number a status update is sent from and the message it marks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTarget {
    pub phone_number_id: String,
    pub message_id: String,
}

impl StatusTarget {
    /// Resolve both ids. Explicit non-empty values win, otherwise the
    /// inbound webhook payload is searched.
    pub fn resolve(
        phone_number_id: Option<&str>,
        message_id: Option<&str>,
        inbound: Option<&Value>,
    ) -> MessageResult<Self> {
        let phone_number_id = resolve_id(phone_number_id, inbound, PHONE_NUMBER_ID_POINTERS)
            .ok_or(MessageError::UnresolvedPhoneNumberId)?;
        let message_id = resolve_id(message_id, inbound, MESSAGE_ID_POINTERS)
            .ok_or(MessageError::UnresolvedMessageId)?;

        Ok(Self {
            phone_number_id,
            message_id,
        })
    }
}

fn resolve_id(explicit: Option<&str>, inbound: Option<&Value>, pointers: &[&str]) -> Option<String> {
    if let Some(id) = explicit.map(str::trim).filter(|id| !id.is_empty()) {
        return Some(id.to_string());
    }

    let inbound = inbound?;
    pointers
        .iter()
        .find_map(|pointer| match inbound.pointer(pointer)? {
            Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        })
}

/// A status payload together with the phone number id it is posted for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub phone_number_id: String,
    pub payload: ReadReceipt,
}

/// Read receipt for a resolved target
pub fn mark_as_read(target: StatusTarget) -> MessageResult<StatusUpdate> {
    Ok(StatusUpdate {
        payload: read_receipt(&target.message_id)?,
        phone_number_id: target.phone_number_id,
    })
}

/// Read receipt with typing indicator for a resolved target
pub fn show_typing(target: StatusTarget) -> MessageResult<StatusUpdate> {
    Ok(StatusUpdate {
        payload: typing_indicator(&target.message_id)?,
        phone_number_id: target.phone_number_id,
    })
}
