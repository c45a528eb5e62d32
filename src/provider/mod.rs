use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Config;
use crate::model::ModelId;

pub mod gemini;

/// One-shot generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: ModelId,
    pub prompt: String,
    pub temperature: f32,
}

/// A text-generation endpoint. The API key is passed per call and never stored
/// beyond the lifetime of a chat connection.
#[async_trait]
pub trait Provider: Send + Sync {
    /// `Ok(None)` means the endpoint answered without any text.
    async fn generate(&self, api_key: &str, req: &GenerateRequest) -> Result<Option<String>>;

    /// Open a stateful conversation bound to `api_key` and `model`.
    fn start_chat(&self, api_key: &str, model: ModelId) -> Result<Box<dyn ChatConnection>>;
}

/// Conversational connection. Implementations keep the prior turns and send
/// them along with every new message.
#[async_trait]
pub trait ChatConnection: Send {
    async fn send_message(&mut self, text: &str) -> Result<Option<String>>;
    fn model(&self) -> ModelId;
}

pub type DynProvider = Arc<dyn Provider>;

pub fn make_provider(cfg: &Config, debug: bool) -> Result<DynProvider> {
    Ok(Arc::new(gemini::GeminiProvider::new(
        cfg.api_base.clone(),
        cfg.timeout_secs,
        debug,
    )?))
}

#[cfg(test)]
pub mod testing {
    //! Scripted provider used by the session and client tests.
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Clone, Debug)]
    pub enum Reply {
        Text(String),
        Empty,
        Fail(String),
    }

    impl Reply {
        fn into_result(self) -> Result<Option<String>> {
            match self {
                Reply::Text(t) => Ok(Some(t)),
                Reply::Empty => Ok(None),
                Reply::Fail(m) => Err(anyhow!(m)),
            }
        }
    }

    #[derive(Default)]
    pub struct MockProvider {
        pub replies: Mutex<Vec<Reply>>,
        pub generate_calls: AtomicUsize,
        pub chats_started: AtomicUsize,
        pub last_request: Mutex<Option<GenerateRequest>>,
        pub last_chat_model: Mutex<Option<ModelId>>,
    }

    impl MockProvider {
        pub fn with_replies(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self { replies: Mutex::new(replies), ..Default::default() })
        }

        fn next_reply(&self) -> Reply {
            let mut q = self.replies.lock().unwrap();
            if q.is_empty() { Reply::Empty } else { q.remove(0) }
        }

        pub fn generate_count(&self) -> usize {
            self.generate_calls.load(Ordering::SeqCst)
        }

        pub fn chat_count(&self) -> usize {
            self.chats_started.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Provider for Arc<MockProvider> {
        async fn generate(&self, _api_key: &str, req: &GenerateRequest) -> Result<Option<String>> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(req.clone());
            self.next_reply().into_result()
        }

        fn start_chat(&self, _api_key: &str, model: ModelId) -> Result<Box<dyn ChatConnection>> {
            self.chats_started.fetch_add(1, Ordering::SeqCst);
            *self.last_chat_model.lock().unwrap() = Some(model);
            Ok(Box::new(MockChat { owner: Arc::clone(self), model, seen: Vec::new() }))
        }
    }

    pub struct MockChat {
        owner: Arc<MockProvider>,
        model: ModelId,
        pub seen: Vec<String>,
    }

    #[async_trait]
    impl ChatConnection for MockChat {
        async fn send_message(&mut self, text: &str) -> Result<Option<String>> {
            self.seen.push(text.to_string());
            self.owner.next_reply().into_result()
        }

        fn model(&self) -> ModelId {
            self.model
        }
    }

    pub fn provider(mock: &Arc<MockProvider>) -> DynProvider {
        Arc::new(Arc::clone(mock))
    }
}
