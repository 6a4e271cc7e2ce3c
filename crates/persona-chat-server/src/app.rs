//! HTTP routes.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /` | chat page |
//! | `POST /api/chat` | one visitor turn |
//! | `POST /api/contact` | contact form, recorded through `record_user_details` |
//! | `GET /health` | liveness |
//!
//! The browser owns the history. Every response carries the history the
//! page should show next; a failed turn returns it unchanged.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use persona_chat::context::extend_history;
use persona_chat::{ChatMessage, ChatRole, Chatbot};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::OwnedMutexGuard;
use tracing::{error, info, instrument, warn};

use crate::page;
use crate::tools::RECORD_USER_DETAILS;

/// Reply shown when a turn fails.
pub const CHAT_FAILED: &str =
    "Sorry, I couldn\u{2019}t answer that right now. Please try again in a moment.";
/// Reply shown when contact details were recorded.
pub const CONTACT_RECORDED: &str =
    "Thanks! I\u{2019}ve recorded your details and will be in touch via email.";
/// Reply shown when contact details could not be recorded.
pub const CONTACT_FAILED: &str =
    "Sorry, I couldn\u{2019}t record your details right now. Please try again later.";

/// Speaker of a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// The visitor.
    User,
    /// The assistant.
    Assistant,
}

/// One entry of the browser-held history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who spoke.
    pub role: TurnRole,
    /// What they said.
    pub content: String,
}

impl Turn {
    /// A visitor entry.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    /// An assistant entry.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        match turn.role {
            TurnRole::User => ChatMessage::user(&turn.content),
            TurnRole::Assistant => ChatMessage::assistant(&turn.content),
        }
    }
}

impl From<&ChatMessage> for Turn {
    fn from(msg: &ChatMessage) -> Self {
        let content = msg.text().unwrap_or_default();
        match msg.role {
            ChatRole::Assistant => Turn::assistant(content),
            _ => Turn::user(content),
        }
    }
}

/// `POST /api/chat` body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The visitor's new message.
    pub message: String,
    /// Prior turns, oldest first.
    #[serde(default)]
    pub history: Vec<Turn>,
    /// Serializes turns that share an id.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// `POST /api/contact` body.
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    /// Visitor's name.
    #[serde(default)]
    pub name: String,
    /// Visitor's email address.
    #[serde(default)]
    pub email: String,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
    /// Prior turns, oldest first.
    #[serde(default)]
    pub history: Vec<Turn>,
    /// Serializes requests that share an id.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response body of both `POST` routes.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatReply {
    /// Text to show for this request.
    pub reply: String,
    /// The history the page should display next.
    pub history: Vec<Turn>,
}

/// Per-session locks, so two requests of one conversation never interleave.
#[derive(Debug, Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionLocks {
    /// Waits for exclusive access to `session_id`.
    pub async fn acquire(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Drop locks nobody holds or waits on.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(session_id.to_owned()).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of sessions currently tracked.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no session is tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared state of the HTTP layer.
#[derive(Debug)]
pub struct AppState {
    chatbot: Chatbot,
    page: String,
    sessions: SessionLocks,
}

impl AppState {
    /// Wraps a chatbot for the persona named `persona_name`.
    pub fn new(chatbot: Chatbot, persona_name: &str) -> Self {
        Self {
            chatbot,
            page: page::render(persona_name),
            sessions: SessionLocks::default(),
        }
    }

    async fn session_guard(&self, session_id: Option<&str>) -> Option<OwnedMutexGuard<()>> {
        match session_id {
            Some(id) => Some(self.sessions.acquire(id).await),
            None => None,
        }
    }
}

/// Builds the router.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/chat", post(chat))
        .route("/api/contact", post(contact))
        .route("/health", get(health))
        .with_state(state)
}

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.page.clone())
}

async fn health() -> StatusCode {
    StatusCode::OK
}

#[instrument(skip_all, fields(session = req.session_id.as_deref().unwrap_or("-"), history = req.history.len()))]
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<ChatReply>) {
    let message = req.message.trim();
    if message.is_empty() {
        return (
            StatusCode::OK,
            Json(ChatReply {
                reply: String::new(),
                history: req.history,
            }),
        );
    }

    let _guard = state.session_guard(req.session_id.as_deref()).await;
    let history: Vec<ChatMessage> = req.history.iter().map(ChatMessage::from).collect();

    match state.chatbot.chat(message, &history).await {
        Ok(reply) => {
            let history = extend_history(&history, message, &reply)
                .iter()
                .map(Turn::from)
                .collect();
            (StatusCode::OK, Json(ChatReply { reply, history }))
        }
        Err(e) => {
            error!(error = %e, "chat turn failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ChatReply {
                    reply: CHAT_FAILED.into(),
                    history: req.history,
                }),
            )
        }
    }
}

#[instrument(skip_all, fields(session = req.session_id.as_deref().unwrap_or("-")))]
async fn contact(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ContactRequest>,
) -> Json<ChatReply> {
    let _guard = state.session_guard(req.session_id.as_deref()).await;

    let args = json!({
        "email": req.email.trim(),
        "name": req.name.trim(),
        "notes": req.notes.trim(),
    });
    let reply = match state.chatbot.registry().invoke(RECORD_USER_DETAILS, args).await {
        Ok(_) => {
            info!("contact details recorded");
            CONTACT_RECORDED
        }
        Err(e) => {
            warn!(error = %e, "contact details not recorded");
            CONTACT_FAILED
        }
    };

    let mut history = req.history;
    history.push(Turn::assistant(reply));
    Json(ChatReply {
        reply: reply.into(),
        history,
    })
}
