//! Presentation-layer state. Every mutation is a named [`Action`] or one of
//! the generation/chat entry points, so the flows can be driven without a UI.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::chat::{ChatSession, Conversation};
use crate::config::Config;
use crate::errors::MobiusError;
use crate::generate::GenerationClient;
use crate::history::HistoryStore;
use crate::model::{BusinessProfile, ConversationTurn, GenerationResult, ModelId, OutputKind, ProfileField};
use crate::provider::DynProvider;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetApiKey(String),
    SelectModel(ModelId),
    SetField(ProfileField, String),
    UseAiToAnswer(ProfileField),
    SelectOutput(OutputKind),
    ToggleHistory,
    ToggleChat,
    LoadHistoryItem(String),
}

/// Handed out by [`AppState::begin_generation`]. Only the most recent ticket
/// may update the displayed output.
#[derive(Debug, Clone)]
pub struct GenerationTicket {
    seq: u64,
    api_key: String,
    model: ModelId,
    snapshot: BusinessProfile,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Shown, and saved under `id` unless the history write failed.
    Applied { id: String, created_at: DateTime<Utc> },
    /// A newer request was started meanwhile; the result was dropped.
    Superseded,
}

pub struct AppState {
    api_key: String,
    selected_model: ModelId,
    form: BusinessProfile,
    output: Option<String>,
    history: HistoryStore,
    show_history: bool,
    chat_open: bool,
    busy: bool,
    generation_seq: u64,
    client: GenerationClient,
    chat: Conversation,
}

impl AppState {
    pub fn new(cfg: &Config, provider: DynProvider, history: HistoryStore) -> Self {
        let session = ChatSession::new(provider.clone(), cfg.chat.model, cfg.chat.on_error);
        Self {
            api_key: String::new(),
            selected_model: cfg.default_model,
            form: BusinessProfile::default(),
            output: None,
            history,
            show_history: false,
            chat_open: false,
            busy: false,
            generation_seq: 0,
            client: GenerationClient::new(provider, cfg.temperature),
            chat: Conversation::new(session),
        }
    }

    pub fn form(&self) -> &BusinessProfile { &self.form }
    pub fn output(&self) -> Option<&str> { self.output.as_deref() }
    pub fn history(&self) -> &HistoryStore { &self.history }
    pub fn is_busy(&self) -> bool { self.busy }
    pub fn show_history(&self) -> bool { self.show_history }
    pub fn chat_open(&self) -> bool { self.chat_open }
    pub fn chat(&self) -> &Conversation { &self.chat }
    pub fn has_api_key(&self) -> bool { !self.api_key.trim().is_empty() }

    pub fn apply(&mut self, action: Action) -> Result<(), MobiusError> {
        debug!(?action, "apply");
        match action {
            Action::SetApiKey(key) => {
                self.api_key = key;
                self.chat.bind(&self.api_key, self.selected_model);
            }
            Action::SelectModel(model) => {
                self.selected_model = model;
                self.chat.bind(&self.api_key, self.selected_model);
            }
            Action::SetField(field, value) => self.form.set(field, value),
            Action::UseAiToAnswer(field) => self.form.use_ai_to_answer(field),
            Action::SelectOutput(kind) => self.form.selected_output = kind,
            Action::ToggleHistory => self.show_history = !self.show_history,
            Action::ToggleChat => self.chat_open = !self.chat_open,
            Action::LoadHistoryItem(id) => {
                let item = self.history.load_one(&id)?;
                self.form = item.form_data.clone();
                self.output = Some(item.content.clone());
                self.show_history = false;
            }
        }
        Ok(())
    }

    /// Check the credential, snapshot the form and mark the UI busy.
    pub fn begin_generation(&mut self) -> Result<GenerationTicket, MobiusError> {
        if !self.has_api_key() {
            return Err(MobiusError::MissingCredential);
        }
        self.generation_seq += 1;
        self.busy = true;
        Ok(GenerationTicket {
            seq: self.generation_seq,
            api_key: self.api_key.clone(),
            model: self.selected_model,
            snapshot: self.form.clone(),
        })
    }

    /// Apply a finished generation. Results of superseded tickets are dropped;
    /// a failure leaves the previous output in place.
    pub fn finish_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<String, MobiusError>,
    ) -> Result<GenerationOutcome, MobiusError> {
        if ticket.seq != self.generation_seq {
            debug!(seq = ticket.seq, latest = self.generation_seq, "dropping superseded generation");
            return Ok(GenerationOutcome::Superseded);
        }
        self.busy = false;

        let content = result?;
        self.output = Some(content.clone());
        let item = GenerationResult::new(ticket.snapshot, content, ticket.model);
        let (id, created_at) = (item.id.clone(), item.timestamp);
        if let Err(e) = self.history.append(item) {
            warn!(error = %e, "generated output not saved to history");
        }
        Ok(GenerationOutcome::Applied { id, created_at })
    }

    pub async fn generate(&mut self) -> Result<GenerationOutcome, MobiusError> {
        let ticket = self.begin_generation()?;
        let result = self
            .client
            .generate(&ticket.api_key, ticket.model, &ticket.snapshot)
            .await;
        self.finish_generation(ticket, result)
    }

    pub async fn send_chat(&mut self, text: &str) -> Result<Option<&ConversationTurn>, MobiusError> {
        self.chat.submit(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{CHAT_ERROR_MESSAGE, GREETING};
    use crate::generate::NO_CONTENT_FALLBACK;
    use crate::history::KvStore;
    use crate::provider::testing::{provider, MockProvider, Reply};
    use std::sync::Arc;

    fn app(mock: &Arc<MockProvider>) -> AppState {
        AppState::new(&Config::default(), provider(mock), HistoryStore::in_memory())
    }

    fn keyed(mock: &Arc<MockProvider>) -> AppState {
        let mut a = app(mock);
        a.apply(Action::SetApiKey("key".into())).unwrap();
        a
    }

    #[tokio::test]
    async fn generate_without_key_has_no_side_effects() {
        let mock = MockProvider::with_replies(vec![]);
        let mut a = app(&mock);
        assert_eq!(a.generate().await.unwrap_err(), MobiusError::MissingCredential);
        assert!(!a.is_busy());
        assert!(a.output().is_none());
        assert!(a.history().is_empty());
        assert_eq!(mock.generate_count(), 0);
    }

    #[tokio::test]
    async fn successful_generation_shows_and_saves() {
        let mock = MockProvider::with_replies(vec![Reply::Text("# Personas for Acme".into())]);
        let mut a = keyed(&mock);
        a.apply(Action::SetField(ProfileField::BusinessName, "Acme".into())).unwrap();
        a.apply(Action::SelectModel(ModelId::Gemini25Pro)).unwrap();

        let GenerationOutcome::Applied { id, .. } = a.generate().await.unwrap() else {
            panic!("expected applied outcome");
        };
        assert_eq!(a.output(), Some("# Personas for Acme"));
        assert!(!a.is_busy());

        let saved = a.history().load_one(&id).unwrap();
        assert_eq!(saved.form_data.business_name, "Acme");
        assert_eq!(saved.model, ModelId::Gemini25Pro);
        assert_eq!(a.history().load_all()[0].id, id);
    }

    #[tokio::test]
    async fn empty_reply_is_saved_as_fallback() {
        let mock = MockProvider::with_replies(vec![Reply::Empty]);
        let mut a = keyed(&mock);
        a.generate().await.unwrap();
        assert_eq!(a.output(), Some(NO_CONTENT_FALLBACK));
        assert_eq!(a.history().len(), 1);
    }

    struct ReadOnlyKv;

    impl KvStore for ReadOnlyKv {
        fn get(&self, _: &str) -> Result<Option<String>, MobiusError> {
            Ok(None)
        }
        fn set(&mut self, _: &str, _: &str) -> Result<(), MobiusError> {
            Err(MobiusError::Storage("read-only".into()))
        }
        fn remove(&mut self, _: &str) -> Result<(), MobiusError> {
            Err(MobiusError::Storage("read-only".into()))
        }
    }

    #[tokio::test]
    async fn unsaved_result_still_reports_its_timestamp() {
        let mock = MockProvider::with_replies(vec![Reply::Text("plan".into())]);
        let history = HistoryStore::open(Box::new(ReadOnlyKv));
        let mut a = AppState::new(&Config::default(), provider(&mock), history);
        a.apply(Action::SetApiKey("key".into())).unwrap();

        let before = crate::model::now_millis();
        let GenerationOutcome::Applied { id, created_at } = a.generate().await.unwrap() else {
            panic!("expected applied outcome");
        };
        assert_eq!(a.output(), Some("plan"));
        assert!(created_at >= before);
        assert!(a.history().is_empty());
        assert_eq!(a.history().load_one(&id).unwrap_err(), MobiusError::NotFound(id));
    }

    #[tokio::test]
    async fn failure_keeps_previous_output() {
        let mock = MockProvider::with_replies(vec![
            Reply::Text("first".into()),
            Reply::Fail("503 overloaded".into()),
        ]);
        let mut a = keyed(&mock);
        a.generate().await.unwrap();
        let err = a.generate().await.unwrap_err();
        assert_eq!(err, MobiusError::GenerationFailed("503 overloaded".into()));
        assert_eq!(a.output(), Some("first"));
        assert_eq!(a.history().len(), 1);
        assert!(!a.is_busy());
    }

    #[test]
    fn snapshot_ignores_edits_after_submit() {
        let mock = MockProvider::with_replies(vec![]);
        let mut a = keyed(&mock);
        a.apply(Action::SetField(ProfileField::BusinessName, "Before".into())).unwrap();
        let ticket = a.begin_generation().unwrap();
        a.apply(Action::SetField(ProfileField::BusinessName, "After".into())).unwrap();

        let GenerationOutcome::Applied { id, .. } = a.finish_generation(ticket, Ok("out".into())).unwrap() else {
            panic!("expected applied outcome");
        };
        assert_eq!(a.history().load_one(&id).unwrap().form_data.business_name, "Before");
        assert_eq!(a.form().business_name, "After");
    }

    #[test]
    fn superseded_result_is_dropped() {
        let mock = MockProvider::with_replies(vec![]);
        let mut a = keyed(&mock);
        let slow = a.begin_generation().unwrap();
        let fast = a.begin_generation().unwrap();

        assert!(matches!(a.finish_generation(fast, Ok("new".into())), Ok(GenerationOutcome::Applied { .. })));
        assert_eq!(a.finish_generation(slow, Ok("old".into())).unwrap(), GenerationOutcome::Superseded);
        assert_eq!(a.output(), Some("new"));
        assert_eq!(a.history().len(), 1);
    }

    #[test]
    fn busy_until_latest_ticket_finishes() {
        let mock = MockProvider::with_replies(vec![]);
        let mut a = keyed(&mock);
        let first = a.begin_generation().unwrap();
        let second = a.begin_generation().unwrap();
        a.finish_generation(first, Ok("x".into())).unwrap();
        assert!(a.is_busy());
        a.finish_generation(second, Err(MobiusError::GenerationFailed("e".into()))).unwrap_err();
        assert!(!a.is_busy());
    }

    #[tokio::test]
    async fn load_history_item_restores_form_and_output() {
        let mock = MockProvider::with_replies(vec![Reply::Text("calendar".into())]);
        let mut a = keyed(&mock);
        a.apply(Action::SetField(ProfileField::Industry, "Bakery".into())).unwrap();
        a.apply(Action::SelectOutput(OutputKind::Calendar30)).unwrap();
        let GenerationOutcome::Applied { id, .. } = a.generate().await.unwrap() else {
            panic!("expected applied outcome");
        };

        a.apply(Action::SetField(ProfileField::Industry, "Florist".into())).unwrap();
        a.apply(Action::ToggleHistory).unwrap();
        assert!(a.show_history());
        a.apply(Action::LoadHistoryItem(id)).unwrap();

        assert_eq!(a.form().industry, "Bakery");
        assert_eq!(a.form().selected_output, OutputKind::Calendar30);
        assert_eq!(a.output(), Some("calendar"));
        assert!(!a.show_history());
    }

    #[test]
    fn unknown_history_item_is_not_found() {
        let mock = MockProvider::with_replies(vec![]);
        let mut a = app(&mock);
        assert_eq!(
            a.apply(Action::LoadHistoryItem("nope".into())).unwrap_err(),
            MobiusError::NotFound("nope".into())
        );
    }

    #[test]
    fn use_ai_to_answer_action() {
        let mock = MockProvider::with_replies(vec![]);
        let mut a = app(&mock);
        a.apply(Action::UseAiToAnswer(ProfileField::PainPoints)).unwrap();
        assert_eq!(a.form().pain_points, crate::model::AI_TO_ANSWER);
    }

    #[tokio::test]
    async fn chat_binds_when_key_arrives() {
        let mock = MockProvider::with_replies(vec![Reply::Fail("bad key".into())]);
        let mut a = app(&mock);
        assert_eq!(a.send_chat("hi").await.unwrap_err(), MobiusError::SessionNotReady);
        assert_eq!(a.chat().turns().len(), 1);

        a.apply(Action::SetApiKey("key".into())).unwrap();
        assert!(a.chat().session().is_ready());
        let reply = a.send_chat("hi").await.unwrap().cloned().unwrap();
        assert_eq!(reply.text, CHAT_ERROR_MESSAGE);
        assert_eq!(a.chat().turns()[0].text, GREETING);
        assert_eq!(a.chat().turns().len(), 3);
    }

    #[test]
    fn model_change_rebinds_chat() {
        let mock = MockProvider::with_replies(vec![]);
        let mut a = keyed(&mock);
        a.apply(Action::SelectModel(ModelId::Gemini25Pro)).unwrap();
        assert_eq!(mock.chat_count(), 2);
        a.apply(Action::ToggleChat).unwrap();
        assert!(a.chat_open());
    }
}
