use serde::{Deserialize, Serialize};

use crate::models::message::Message;

/// On-disk chat record: a unique id plus an append-only message log.
/// Insertion order of messages is arrival order and is never changed.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChatDocument {
    pub chat_id: String,
    pub messages: Vec<Message>,
}

impl ChatDocument {
    pub fn new(chat_id: String) -> Self {
        Self {
            chat_id,
            messages: Vec::new(),
        }
    }
}
