use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{ChatConnection, GenerateRequest, Provider};
use crate::model::ModelId;
use crate::wire::{ApiErrorBody, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig};

/// Google Generative Language REST adapter.
pub struct GeminiProvider {
    client: Client,
    api_base: String,
    debug: bool,
}

impl GeminiProvider {
    pub fn new(api_base: String, timeout_secs: u64, debug: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("building HTTP client")?;
        Ok(Self { client, api_base, debug })
    }
}

fn endpoint(api_base: &str, model: ModelId) -> String {
    format!("{}/v1beta/models/{}:generateContent", api_base.trim_end_matches('/'), model)
}

async fn post_generate(
    client: &Client,
    url: &str,
    api_key: &str,
    body: &GenerateContentRequest,
    debug: bool,
) -> Result<Option<String>> {
    debug!(%url, turns = body.contents.len(), "gemini: POST generateContent");

    let resp = client
        .post(url)
        .header("x-goog-api-key", api_key)
        .json(body)
        .send()
        .await
        .context("gemini request failed")?;

    let status = resp.status();
    let text = resp.text().await.context("gemini read body failed")?;

    if debug {
        crate::log::print_json_debug("gemini", body, &text)?;
    }

    if !status.is_success() {
        // Surface the provider's own message when the body carries one.
        if let Ok(err) = serde_json::from_str::<ApiErrorBody>(&text) {
            if !err.error.message.is_empty() {
                bail!("{}", err.error.message);
            }
        }
        bail!("Gemini API error ({}): {}", status, text);
    }

    let parsed: GenerateContentResponse = serde_json::from_str(&text)
        .map_err(|e| anyhow!("Failed to parse Gemini response: {e}\nRaw: {text}"))?;
    Ok(parsed.text())
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn generate(&self, api_key: &str, req: &GenerateRequest) -> Result<Option<String>> {
        let body = GenerateContentRequest {
            contents: vec![Content::user(req.prompt.clone())],
            generation_config: Some(GenerationConfig { temperature: Some(req.temperature) }),
        };
        post_generate(&self.client, &endpoint(&self.api_base, req.model), api_key, &body, self.debug).await
    }

    fn start_chat(&self, api_key: &str, model: ModelId) -> Result<Box<dyn ChatConnection>> {
        if api_key.trim().is_empty() {
            bail!("cannot open a chat without an API key");
        }
        Ok(Box::new(GeminiChat {
            client: self.client.clone(),
            url: endpoint(&self.api_base, model),
            api_key: api_key.to_string(),
            model,
            history: Vec::new(),
            debug: self.debug,
        }))
    }
}

/// Chat over the stateless endpoint: the accumulated turns are resent on
/// every message. A turn pair is recorded only once the model has answered
/// with text; the endpoint rejects empty parts.
pub struct GeminiChat {
    client: Client,
    url: String,
    api_key: String,
    model: ModelId,
    history: Vec<Content>,
    debug: bool,
}

#[async_trait]
impl ChatConnection for GeminiChat {
    async fn send_message(&mut self, text: &str) -> Result<Option<String>> {
        let mut contents = self.history.clone();
        contents.push(Content::user(text));
        let body = GenerateContentRequest { contents, generation_config: None };

        let reply = post_generate(&self.client, &self.url, &self.api_key, &body, self.debug).await?;

        if let Some(text) = reply.as_deref().filter(|t| !t.is_empty()) {
            self.history = body.contents;
            self.history.push(Content::model(text));
        }
        Ok(reply)
    }

    fn model(&self) -> ModelId {
        self.model
    }
}
