use std::collections::HashMap;

use rand::RngCore;

use crate::models::message::{Message, NewMessage};
use crate::store::{ChatStore, StoreError};

/// Bytes of entropy in a chat id token (12 hex chars once encoded).
const CHAT_ID_BYTES: usize = 6;

/// Generates a short random hex token and registers it as a new chat.
/// Tokens are only ever minted here, never taken from a client.
pub async fn new_chat_id(store: &ChatStore) -> Result<String, StoreError> {
    let mut bytes = [0u8; CHAT_ID_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let chat_id = hex::encode(bytes);
    store.create_chat(&chat_id).await
}

pub async fn post_message(
    store: &ChatStore,
    chat_id: &str,
    msg: NewMessage,
) -> Result<(), StoreError> {
    store.append_message(chat_id, msg).await
}

pub async fn get_chat(
    store: &ChatStore,
    chat_id: &str,
    unread_only: bool,
) -> Result<Vec<Message>, StoreError> {
    store.list_messages(chat_id, unread_only).await
}

/// Every non-empty chat, keyed by id. A chat whose messages are all filtered
/// out, or that emptied between the id listing and the per-chat read, is
/// skipped rather than surfaced.
pub async fn get_all_chats(
    store: &ChatStore,
    unread_only: bool,
) -> Result<Vec<HashMap<String, Vec<Message>>>, StoreError> {
    let mut chats = Vec::new();
    for chat_id in store.list_nonempty_chat_ids().await {
        let messages = get_chat(store, &chat_id, unread_only).await?;
        if !messages.is_empty() {
            chats.push(HashMap::from([(chat_id, messages)]));
        }
    }
    Ok(chats)
}
