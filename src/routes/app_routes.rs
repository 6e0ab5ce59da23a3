// src/routes/app_routes.rs

use axum::{routing::get, Extension, Router};
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::handlers::chat_handlers::{hello, new_chat, read_chat, read_chats, receive_msg};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/hello", get(hello))
        .route("/chats/newchat", get(new_chat))
        .route("/chats/:chat_id", get(read_chat).put(receive_msg))
        .route("/chats", get(read_chats))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}
