//! Ephemeral secure chat widget.
//!
//! DESIGN
//! ======
//! One `ChatWidget` per mount. Mount generates an in-memory AES-256-GCM key
//! and a random session id; the transcript lives only as long as the widget.
//! Sending walks a small state machine:
//!
//! ```text
//! Idle -> Encrypting -> Persisting (authenticated only) -> AwaitingResponse -> Idle
//! ```
//!
//! Any failure on the way appends one error entry and drops back to `Idle`.
//!
//! CONCURRENCY
//! ===========
//! Widgets sit behind a `tokio::sync::Mutex`. `send` releases the lock while
//! the inference call is in flight so status reads and teardown never wait
//! on the model. The phase field (not the lock) is what rejects a second
//! send. A reply that lands after teardown is dropped.
//!
//! Persistence and teardown deletes are detached tasks (see [`store`]); the
//! transcript never waits on the store.

pub mod format;
pub mod layout;
pub mod registry;
pub mod store;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::crypto::{self, CryptoError, SessionKey};
use crate::inference::{Inference, InferenceError};
use format::Segment;
use store::{ChatStore, EncryptedRow, StoreError};

/// First transcript entry of every mount.
pub const GREETING: &str = "Secure Session Initialized. Keys in RAM only.";

/// Bot entry appended when any step of a send fails.
pub const SECURE_ERROR: &str = "Error: Could not secure connection.";

pub const PLACEHOLDER_READY: &str = "Ask secure question...";
pub const PLACEHOLDER_INITIALIZING: &str = "Initializing keys...";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("session keys unavailable")]
    KeysUnavailable,
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl crate::error::ErrorCode for ChatError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::KeysUnavailable => "E_KEYS_UNAVAILABLE",
            Self::Crypto(e) => e.error_code(),
            Self::Inference(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::KeysUnavailable | Self::Crypto(_) => false,
            Self::Inference(e) => e.retryable(),
            Self::Store(e) => e.retryable(),
        }
    }
}

// =============================================================================
// MESSAGES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

/// One transcript entry. Plaintext, in memory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    /// Drives the "encrypted" badge. True when the text travelled (or would
    /// travel) to the store as ciphertext.
    pub encrypted: bool,
}

impl ChatMessage {
    fn new(text: impl Into<String>, sender: Sender, encrypted: bool) -> Self {
        Self { id: Uuid::new_v4(), text: text.into(), sender, encrypted }
    }
}

/// Transcript entry with link tokens expanded, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub encrypted: bool,
    pub segments: Vec<Segment>,
}

impl From<&ChatMessage> for RenderedMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self { id: msg.id, sender: msg.sender, encrypted: msg.encrypted, segments: format::render(&msg.text) }
    }
}

// =============================================================================
// WIDGET
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendPhase {
    Idle,
    Encrypting,
    Persisting,
    AwaitingResponse,
}

#[derive(Debug)]
enum KeyState {
    Ready(Arc<SessionKey>),
    Unavailable,
}

/// Why a send was a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    KeysInitializing,
    Busy,
    Blank,
    Unmounted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum SendOutcome {
    /// Nothing happened; transcript unchanged.
    Ignored(IgnoreReason),
    /// User entry and reply appended.
    Replied,
    /// User entry and one error entry appended.
    Failed,
    /// The widget was torn down while the reply was in flight.
    Discarded,
}

/// Collaborators the send flow talks to.
#[derive(Clone)]
pub struct ChatDeps {
    pub store: Arc<dyn ChatStore>,
    /// `None` when no inference provider is configured; every send then fails.
    pub inference: Option<Arc<dyn Inference>>,
}

#[derive(Debug)]
pub struct ChatWidget {
    session_id: Uuid,
    key: KeyState,
    transcript: Vec<ChatMessage>,
    phase: SendPhase,
    mounted: bool,
    last_active: Instant,
}

impl ChatWidget {
    /// Mount a widget with a key from the OS entropy source.
    #[must_use]
    pub fn mount() -> Self {
        Self::mount_with(SessionKey::generate)
    }

    /// Mount with a caller-supplied key source. A failing source leaves the
    /// widget uninitialized: sends are ignored and nothing retries.
    pub fn mount_with<F>(keygen: F) -> Self
    where
        F: FnOnce() -> Result<SessionKey, CryptoError>,
    {
        let session_id = Uuid::new_v4();
        let key = match keygen() {
            Ok(key) => {
                info!(%session_id, "chat: session keys initialized");
                KeyState::Ready(Arc::new(key))
            }
            Err(e) => {
                error!(error = %e, %session_id, "chat: key generation failed; input disabled");
                KeyState::Unavailable
            }
        };

        Self {
            session_id,
            key,
            transcript: vec![ChatMessage::new(GREETING, Sender::Bot, false)],
            phase: SendPhase::Idle,
            mounted: true,
            last_active: Instant::now(),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.key, KeyState::Ready(_))
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    #[must_use]
    pub fn phase(&self) -> SendPhase {
        self.phase
    }

    #[must_use]
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    #[must_use]
    pub fn placeholder(&self) -> &'static str {
        if self.is_ready() { PLACEHOLDER_READY } else { PLACEHOLDER_INITIALIZING }
    }

    /// Input box enabled state. A send in flight only disables the button,
    /// which `send` enforces through the phase check.
    #[must_use]
    pub fn input_enabled(&self) -> bool {
        self.mounted && self.is_ready()
    }

    #[must_use]
    pub fn last_active(&self) -> Instant {
        self.last_active
    }

    fn key(&self) -> Option<Arc<SessionKey>> {
        match &self.key {
            KeyState::Ready(key) => Some(Arc::clone(key)),
            KeyState::Unavailable => None,
        }
    }

    fn fail(&mut self, err: &ChatError) {
        error!(error = %err, session_id = %self.session_id, "chat: send failed");
        self.transcript.push(ChatMessage::new(SECURE_ERROR, Sender::Bot, false));
        self.phase = SendPhase::Idle;
    }

    /// Unload: discard the key and purge this session's stored rows in the
    /// background. A widget that never got a key has nothing to purge.
    /// Idempotent.
    ///
    /// Inserts and the purge are independent spawned tasks with no ordering
    /// between them. An insert still in flight when this runs can land after
    /// the purge, and that row then outlives the session.
    pub fn teardown(&mut self, store: Arc<dyn ChatStore>) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        if matches!(self.key, KeyState::Ready(_)) {
            store::purge_best_effort(store, self.session_id);
        }
        self.key = KeyState::Unavailable;
        info!(session_id = %self.session_id, "chat: session torn down");
    }
}

// =============================================================================
// SEND FLOW
// =============================================================================

/// Send one user message through the widget.
///
/// `user_id` is the authenticated caller, if any. Anonymous sends still reach
/// the model; only persistence is skipped.
pub async fn send(widget: &Mutex<ChatWidget>, deps: &ChatDeps, user_id: Option<Uuid>, text: &str) -> SendOutcome {
    let (session_id, key) = {
        let mut w = widget.lock().await;
        if !w.mounted {
            return SendOutcome::Ignored(IgnoreReason::Unmounted);
        }
        let Some(key) = w.key() else {
            return SendOutcome::Ignored(IgnoreReason::KeysInitializing);
        };
        if w.phase != SendPhase::Idle {
            return SendOutcome::Ignored(IgnoreReason::Busy);
        }
        if text.trim().is_empty() {
            return SendOutcome::Ignored(IgnoreReason::Blank);
        }

        w.last_active = Instant::now();
        w.transcript.push(ChatMessage::new(text, Sender::User, true));
        w.phase = SendPhase::Encrypting;

        let ciphertext = match key.encrypt(text) {
            Ok(ct) => ct,
            Err(e) => {
                w.fail(&ChatError::from(e));
                return SendOutcome::Failed;
            }
        };
        if user_id.is_some() {
            w.phase = SendPhase::Persisting;
        }
        persist_if_authenticated(deps, w.session_id, user_id, ciphertext, true);
        w.phase = SendPhase::AwaitingResponse;
        (w.session_id, key)
    };

    let result = match &deps.inference {
        Some(inference) => inference.respond(text).await,
        None => Err(InferenceError::NotConfigured),
    };

    let mut w = widget.lock().await;
    if !w.mounted {
        debug!(%session_id, "chat: reply arrived after teardown; discarded");
        return SendOutcome::Discarded;
    }

    let reply = match result {
        Ok(reply) => reply.into_text(),
        Err(e) => {
            w.fail(&ChatError::from(e));
            return SendOutcome::Failed;
        }
    };
    debug!(%session_id, links = ?format::link_paths(&reply), "chat: reply received");
    let ciphertext = match key.encrypt(&reply) {
        Ok(ct) => ct,
        Err(e) => {
            w.fail(&ChatError::from(e));
            return SendOutcome::Failed;
        }
    };
    persist_if_authenticated(deps, session_id, user_id, ciphertext, false);

    w.transcript.push(ChatMessage::new(reply, Sender::Bot, true));
    w.phase = SendPhase::Idle;
    w.last_active = Instant::now();
    SendOutcome::Replied
}

fn persist_if_authenticated(
    deps: &ChatDeps,
    session_id: Uuid,
    user_id: Option<Uuid>,
    content_encrypted: String,
    is_user_message: bool,
) {
    let Some(user_id) = user_id else {
        warn!(%session_id, "chat: user not logged in, skipping insert");
        return;
    };
    store::persist_best_effort(
        Arc::clone(&deps.store),
        EncryptedRow { session_id, user_id, content_encrypted, is_user_message },
    );
}

// =============================================================================
// HISTORY
// =============================================================================

/// Reload this session's stored rows and decrypt them with the session key.
/// Rows that fail to decrypt show the placeholder instead.
///
/// # Errors
///
/// Returns [`ChatError::KeysUnavailable`] for a widget without a key, or a
/// store error if the rows cannot be read.
pub async fn history(widget: &Mutex<ChatWidget>, store: &dyn ChatStore) -> Result<Vec<ChatMessage>, ChatError> {
    let (session_id, key) = {
        let w = widget.lock().await;
        (w.session_id, w.key().ok_or(ChatError::KeysUnavailable)?)
    };

    let rows = store.list_session(session_id).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let (text, decrypted) = crypto::decrypt_or_placeholder(&row.content_encrypted, &key);
            let sender = if row.is_user_message { Sender::User } else { Sender::Bot };
            ChatMessage { id: row.id, text, sender, encrypted: decrypted }
        })
        .collect())
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
