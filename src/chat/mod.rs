//! Follow-up chat: a session bound to one API key + model pairing, and the
//! transcript shown to the user.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::MobiusError;
use crate::generate::NO_CONTENT_FALLBACK;
use crate::model::{ConversationTurn, ModelId};
use crate::provider::{ChatConnection, DynProvider};

pub const GREETING: &str = "Hi! I'm MobiusPrime. Ask me anything about your marketing strategy.";

pub const CHAT_ERROR_MESSAGE: &str =
    "I encountered an error processing your request. Please check your API key and try again.";

/// What `send` does when the endpoint fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnChatError {
    /// Answer with [`CHAT_ERROR_MESSAGE`] so the transcript never has a gap.
    #[default]
    SubstituteMessage,
    Propagate,
}

enum State {
    Uninitialized,
    Ready {
        api_key: String,
        selected: ModelId,
        connection: Box<dyn ChatConnection>,
    },
}

pub struct ChatSession {
    provider: DynProvider,
    chat_model: Option<ModelId>,
    on_error: OnChatError,
    state: State,
}

impl ChatSession {
    /// `chat_model` pins the chat model; `None` upgrades to the most capable one.
    pub fn new(provider: DynProvider, chat_model: Option<ModelId>, on_error: OnChatError) -> Self {
        Self { provider, chat_model, on_error, state: State::Uninitialized }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready { .. })
    }

    /// Model the connection talks to, if any.
    pub fn model(&self) -> Option<ModelId> {
        match &self.state {
            State::Ready { connection, .. } => Some(connection.model()),
            State::Uninitialized => None,
        }
    }

    fn chat_model(&self) -> ModelId {
        self.chat_model.unwrap_or_else(ModelId::highest_capability)
    }

    /// Bring the session in line with the current key and selected model.
    ///
    /// Same pairing keeps the live connection. A different pairing replaces
    /// it with a fresh one that has no memory of earlier turns. An empty key
    /// drops back to uninitialized.
    pub fn bind(&mut self, api_key: &str, selected: ModelId) {
        if api_key.trim().is_empty() {
            self.state = State::Uninitialized;
            return;
        }
        if let State::Ready { api_key: k, selected: m, .. } = &self.state {
            if k == api_key && *m == selected {
                return;
            }
        }

        let model = self.chat_model();
        match self.provider.start_chat(api_key, model) {
            Ok(connection) => {
                debug!(%model, %selected, "chat session bound");
                self.state = State::Ready { api_key: api_key.to_string(), selected, connection };
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "failed to init chat");
                self.state = State::Uninitialized;
            }
        }
    }

    pub async fn send(&mut self, text: &str) -> Result<String, MobiusError> {
        let State::Ready { connection, .. } = &mut self.state else {
            return Err(MobiusError::SessionNotReady);
        };

        match connection.send_message(text).await {
            Ok(Some(reply)) if !reply.is_empty() => Ok(reply),
            Ok(_) => {
                warn!("chat reply had no content");
                Ok(NO_CONTENT_FALLBACK.to_string())
            }
            Err(e) => {
                let msg = format!("{e:#}");
                warn!(error = %msg, policy = ?self.on_error, "chat turn failed");
                match self.on_error {
                    OnChatError::SubstituteMessage => Ok(CHAT_ERROR_MESSAGE.to_string()),
                    OnChatError::Propagate => Err(MobiusError::GenerationFailed(msg)),
                }
            }
        }
    }
}

/// The chat widget: transcript plus session.
///
/// Rebinding the session leaves the transcript alone.
pub struct Conversation {
    session: ChatSession,
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new(session: ChatSession) -> Self {
        Self { session, turns: vec![ConversationTurn::model(GREETING)] }
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn bind(&mut self, api_key: &str, selected: ModelId) {
        self.session.bind(api_key, selected);
    }

    /// Append the user turn and the model's answer.
    ///
    /// Blank input is ignored (`Ok(None)`). An unready session is reported
    /// before anything is appended, and a propagated failure takes the user
    /// turn back out.
    pub async fn submit(&mut self, text: &str) -> Result<Option<&ConversationTurn>, MobiusError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        if !self.session.is_ready() {
            return Err(MobiusError::SessionNotReady);
        }

        self.turns.push(ConversationTurn::user(text));
        let reply = match self.session.send(text).await {
            Ok(reply) => reply,
            Err(e) => {
                self.turns.pop();
                return Err(e);
            }
        };
        self.turns.push(ConversationTurn::model(reply));
        Ok(self.turns.last())
    }
}
