use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Which party authored a message. Travels as a plain integer on the wire;
/// anything outside {0, 1, 2} is rejected at decode time.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "u8", into = "u8")]
pub enum SenderType {
    Undefined = 0,
    Client = 1,
    CustomerService = 2,
}

impl TryFrom<u8> for SenderType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SenderType::Undefined),
            1 => Ok(SenderType::Client),
            2 => Ok(SenderType::CustomerService),
            other => Err(format!("invalid sender_type: {}", other)),
        }
    }
}

impl From<SenderType> for u8 {
    fn from(value: SenderType) -> u8 {
        value as u8
    }
}

/// Inbound wire form of a message. Every field is required, so a missing or
/// mistyped field fails deserialization before any handler runs.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewMessage {
    pub chat_id: String,
    pub text: String,
    pub sender_type: SenderType,
    pub sender_name: String,
    pub timestamp: f64,
    pub is_seen: bool,
}

/// A message as the store keeps and serves it. Immutable once inserted,
/// except for `is_seen`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Message {
    pub message_id: String,
    pub chat_id: String,
    pub text: String,
    pub sender_type: SenderType,
    pub sender_name: String,
    pub timestamp: f64,
    pub is_seen: bool,
}

/// Builds a wire message stamped with the current time. The store assigns
/// the message id later, at insert.
pub fn compose(
    text: &str,
    chat_id: &str,
    sender_type: SenderType,
    sender_name: &str,
) -> NewMessage {
    NewMessage {
        chat_id: chat_id.to_string(),
        text: text.to_string(),
        sender_type,
        sender_name: sender_name.to_string(),
        timestamp: epoch_now(),
        is_seen: false,
    }
}

/// Seconds since the Unix epoch, millisecond precision.
pub fn epoch_now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_starts_unseen() {
        let msg = compose("hello", "ab12cd", SenderType::Client, "alice");
        assert!(!msg.is_seen);
        assert_eq!(msg.chat_id, "ab12cd");
        assert_eq!(msg.sender_type, SenderType::Client);
        assert!(msg.timestamp > 0.0);
    }

    #[test]
    fn sender_type_rejects_out_of_range() {
        let err = serde_json::from_str::<SenderType>("3").unwrap_err();
        assert!(err.to_string().contains("invalid sender_type"));
        assert_eq!(
            serde_json::from_str::<SenderType>("2").unwrap(),
            SenderType::CustomerService
        );
    }

    #[test]
    fn new_message_requires_all_fields() {
        let body = r#"{"chat_id": "ab12cd", "text": "hi"}"#;
        assert!(serde_json::from_str::<NewMessage>(body).is_err());
    }
}
