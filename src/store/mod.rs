use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::chat::ChatDocument;
use crate::models::message::{epoch_now, Message, NewMessage};

/// Chat store error types
#[derive(Error, Debug)]
pub enum StoreError {
    /// A write was addressed to a chat id the store has never seen
    #[error("unknown chat_id: {0}")]
    ChatNotFound(String),

    /// The backing file could not be read or written
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but does not parse as a chat store
    #[error("store file corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// File-backed document store holding every chat. All documents live in one
/// JSON file; each mutation rewrites the file before the call returns, so a
/// successful response is always durable.
#[derive(Debug)]
pub struct ChatStore {
    path: PathBuf,
    chats: Mutex<Vec<ChatDocument>>,
}

impl ChatStore {
    /// Opens the store at `path`, loading existing documents or starting
    /// empty when no file is there yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let chats = if path.is_file() {
            info!("loading chat store from {}", path.display());
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            info!("no chat store at {}, starting empty", path.display());
            Vec::new()
        };
        Ok(Self {
            path,
            chats: Mutex::new(chats),
        })
    }

    // Rewrites the whole store file via tmp file + rename, so a crash
    // mid-write never leaves a truncated store behind. The tmp file is
    // fsynced before the rename; the contents must be on disk before they
    // become visible under the store path.
    async fn persist(&self, chats: &[ChatDocument]) -> Result<(), StoreError> {
        let raw = serde_json::to_vec(chats)?;
        let tmp = self.path.with_extension("tmp");

        let mut tmp_file = tokio::fs::File::create(&tmp).await?;
        tmp_file.write_all(&raw).await?;
        tmp_file.sync_all().await?;
        drop(tmp_file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Registers a chat id with an empty message log. Creation is
    /// idempotent: a colliding id is logged and handed back unchanged.
    pub async fn create_chat(&self, chat_id: &str) -> Result<String, StoreError> {
        let mut chats = self.chats.lock().await;
        if chats.iter().any(|c| c.chat_id == chat_id) {
            warn!("chat_id {} already exists", chat_id);
            return Ok(chat_id.to_string());
        }

        let mut next = chats.clone();
        next.push(ChatDocument::new(chat_id.to_string()));
        self.persist(&next).await?;
        *chats = next;
        Ok(chat_id.to_string())
    }

    /// Appends a message to an existing chat. The store assigns the message
    /// id and timestamp and always inserts the message unseen. The in-memory
    /// state only picks up the append once the file write has succeeded.
    pub async fn append_message(&self, chat_id: &str, msg: NewMessage) -> Result<(), StoreError> {
        let mut chats = self.chats.lock().await;

        let mut next = chats.clone();
        let chat = next
            .iter_mut()
            .find(|c| c.chat_id == chat_id)
            .ok_or_else(|| StoreError::ChatNotFound(chat_id.to_string()))?;
        chat.messages.push(Message {
            message_id: Uuid::new_v4().simple().to_string(),
            chat_id: chat_id.to_string(),
            text: msg.text,
            sender_type: msg.sender_type,
            sender_name: msg.sender_name,
            timestamp: epoch_now(),
            is_seen: false,
        });

        self.persist(&next).await?;
        *chats = next;
        Ok(())
    }

    /// Messages of one chat in arrival order. An unknown chat id reads as an
    /// empty chat, not an error. With `unread_only` set, only messages still
    /// flagged unseen come back, keeping their relative order.
    pub async fn list_messages(
        &self,
        chat_id: &str,
        unread_only: bool,
    ) -> Result<Vec<Message>, StoreError> {
        let chats = self.chats.lock().await;
        let messages = match chats.iter().find(|c| c.chat_id == chat_id) {
            Some(chat) => chat
                .messages
                .iter()
                .filter(|m| !unread_only || !m.is_seen)
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        Ok(messages)
    }

    /// Ids of every chat holding at least one message. Chats that were
    /// created but never written to are considered not yet started.
    pub async fn list_nonempty_chat_ids(&self) -> Vec<String> {
        let chats = self.chats.lock().await;
        chats
            .iter()
            .filter(|c| !c.messages.is_empty())
            .map(|c| c.chat_id.clone())
            .collect()
    }

    /// Administrative full wipe. Not reachable through the HTTP routes.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let mut chats = self.chats.lock().await;
        let next = Vec::new();
        self.persist(&next).await?;
        *chats = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::{compose, SenderType};
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> ChatStore {
        ChatStore::open(dir.path().join("chats.json")).unwrap()
    }

    fn client_msg(text: &str, chat_id: &str) -> NewMessage {
        compose(text, chat_id, SenderType::Client, "alice")
    }

    #[tokio::test]
    async fn create_chat_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.create_chat("test1").await.unwrap(), "test1");
        assert_eq!(store.create_chat("test1").await.unwrap(), "test1");
        store.create_chat("test2").await.unwrap();

        store
            .append_message("test1", client_msg("hello1", "test1"))
            .await
            .unwrap();
        store
            .append_message("test2", client_msg("hello2", "test2"))
            .await
            .unwrap();

        // one document per id, no duplicate from the second create
        let ids = store.list_nonempty_chat_ids().await;
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"test1".to_string()));
        assert!(ids.contains(&"test2".to_string()));
        assert_eq!(store.list_messages("test1", false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn append_preserves_order_and_ids_are_distinct() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.create_chat("test1").await.unwrap();

        for i in 0..5 {
            store
                .append_message("test1", client_msg(&format!("msg{}", i), "test1"))
                .await
                .unwrap();
        }

        let messages = store.list_messages("test1", false).await.unwrap();
        assert_eq!(messages.len(), 5);
        for (i, m) in messages.iter().enumerate() {
            assert_eq!(m.text, format!("msg{}", i));
            assert!(!m.is_seen);
        }
        let mut ids: Vec<_> = messages.iter().map(|m| m.message_id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[tokio::test]
    async fn unknown_chat_reads_empty_but_fails_writes() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.create_chat("test1").await.unwrap();

        assert!(store
            .list_messages("doesnotexist", false)
            .await
            .unwrap()
            .is_empty());

        let err = store
            .append_message("doesnotexist", client_msg("hello", "doesnotexist"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ChatNotFound(_)));

        // failed write left nothing behind
        assert!(store.list_nonempty_chat_ids().await.is_empty());
        assert!(store.list_messages("test1", false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_chats_are_not_listed() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.create_chat("quiet").await.unwrap();
        store.create_chat("busy").await.unwrap();
        store
            .append_message("busy", client_msg("hello", "busy"))
            .await
            .unwrap();

        assert_eq!(store.list_nonempty_chat_ids().await, vec!["busy"]);
    }

    #[tokio::test]
    async fn unread_filter_keeps_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chats.json");
        let store = ChatStore::open(&path).unwrap();
        store.create_chat("test1").await.unwrap();
        for i in 0..4 {
            store
                .append_message("test1", client_msg(&format!("msg{}", i), "test1"))
                .await
                .unwrap();
        }
        drop(store);

        // flip two messages to seen the way an external reader would,
        // directly in the store file
        let raw = std::fs::read_to_string(&path).unwrap();
        let mut docs: Vec<ChatDocument> = serde_json::from_str(&raw).unwrap();
        docs[0].messages[0].is_seen = true;
        docs[0].messages[2].is_seen = true;
        std::fs::write(&path, serde_json::to_vec(&docs).unwrap()).unwrap();

        let store = ChatStore::open(&path).unwrap();
        let unread = store.list_messages("test1", true).await.unwrap();
        assert_eq!(unread.len(), 2);
        assert_eq!(unread[0].text, "msg1");
        assert_eq!(unread[1].text, "msg3");
        assert_eq!(store.list_messages("test1", false).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn mutations_are_committed_to_the_store_file_on_return() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chats.json");
        let store = ChatStore::open(&path).unwrap();

        store.create_chat("test1").await.unwrap();
        store
            .append_message("test1", client_msg("hello", "test1"))
            .await
            .unwrap();

        // the append is already in the store file, not only in memory, and
        // the scratch file from the write is gone
        let raw = std::fs::read_to_string(&path).unwrap();
        let docs: Vec<ChatDocument> = serde_json::from_str(&raw).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].messages.len(), 1);
        assert_eq!(docs[0].messages[0].text, "hello");
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn mutations_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chats.json");

        let store = ChatStore::open(&path).unwrap();
        store.create_chat("test1").await.unwrap();
        store
            .append_message("test1", client_msg("hello", "test1"))
            .await
            .unwrap();
        drop(store);

        let store = ChatStore::open(&path).unwrap();
        let messages = store.list_messages("test1", false).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "hello");
        assert_eq!(messages[0].sender_name, "alice");
    }

    #[tokio::test]
    async fn clear_empties_store_and_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chats.json");
        let store = ChatStore::open(&path).unwrap();
        store.create_chat("test1").await.unwrap();
        store
            .append_message("test1", client_msg("hello", "test1"))
            .await
            .unwrap();

        store.clear().await.unwrap();
        assert!(store.list_nonempty_chat_ids().await.is_empty());

        let store = ChatStore::open(&path).unwrap();
        assert!(store.list_messages("test1", false).await.unwrap().is_empty());
    }

    #[test]
    fn corrupt_store_file_fails_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chats.json");
        std::fs::write(&path, b"not json at all").unwrap();
        assert!(matches!(
            ChatStore::open(&path).unwrap_err(),
            StoreError::Corrupt(_)
        ));
    }
}
