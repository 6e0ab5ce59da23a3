use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use hyper::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::app_state::AppState;
use crate::models::message::NewMessage;
use crate::services::chat_service;

/// Optional `?unread=true` query on the read routes.
#[derive(Deserialize)]
pub struct UnreadFilter {
    #[serde(default)]
    pub unread: bool,
}

/// Liveness probe.
pub async fn hello() -> impl IntoResponse {
    Json("world")
}

pub async fn new_chat(Extension(state): Extension<AppState>) -> impl IntoResponse {
    match chat_service::new_chat_id(&state.store).await {
        Ok(chat_id) => {
            println!("chat id: {}", chat_id);
            Ok(Json(chat_id))
        }
        Err(e) => {
            eprintln!("Error creating chat: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

pub async fn read_chat(
    Extension(state): Extension<AppState>,
    Path(chat_id): Path<String>,
    Query(filter): Query<UnreadFilter>,
) -> impl IntoResponse {
    match chat_service::get_chat(&state.store, &chat_id, filter.unread).await {
        Ok(messages) => Ok(Json(messages)),
        Err(e) => {
            eprintln!("Error reading chat {}: {}", chat_id, e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

pub async fn read_chats(
    Extension(state): Extension<AppState>,
    Query(filter): Query<UnreadFilter>,
) -> impl IntoResponse {
    match chat_service::get_all_chats(&state.store, filter.unread).await {
        Ok(chats) => Ok(Json(chats)),
        Err(e) => {
            eprintln!("Error reading chats: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// Accepts a message for an existing chat. The body's chat_id wins when it
/// differs from the path segment; writes to an unknown chat fail.
pub async fn receive_msg(
    Extension(state): Extension<AppState>,
    Path(chat_id): Path<String>,
    Json(payload): Json<NewMessage>,
) -> impl IntoResponse {
    if payload.chat_id != chat_id {
        debug!(
            "path chat_id {} differs from body chat_id {}",
            chat_id, payload.chat_id
        );
    }

    let target = payload.chat_id.clone();
    match chat_service::post_message(&state.store, &target, payload).await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("Error receiving message for {}: {}", target, e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}
