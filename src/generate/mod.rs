use tracing::{debug, warn};

use crate::errors::MobiusError;
use crate::model::{BusinessProfile, ModelId};
use crate::prompt::{build_prompt, FRAMEWORK_INSTRUCTIONS};
use crate::provider::{DynProvider, GenerateRequest};

/// Returned when the endpoint succeeds without producing any text.
pub const NO_CONTENT_FALLBACK: &str = "No content generated.";

/// Used when the endpoint fails without saying why.
pub const GENERATION_FAILED_FALLBACK: &str = "Failed to generate content";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// One-shot generation. Never retries and never persists.
pub struct GenerationClient {
    provider: DynProvider,
    temperature: f32,
}

impl GenerationClient {
    pub fn new(provider: DynProvider, temperature: f32) -> Self {
        Self { provider, temperature }
    }

    pub async fn generate(
        &self,
        api_key: &str,
        model: ModelId,
        profile: &BusinessProfile,
    ) -> Result<String, MobiusError> {
        if api_key.trim().is_empty() {
            return Err(MobiusError::MissingCredential);
        }

        let req = GenerateRequest {
            model,
            prompt: build_prompt(FRAMEWORK_INSTRUCTIONS, profile),
            temperature: self.temperature,
        };
        debug!(%model, output = %profile.selected_output, prompt_bytes = req.prompt.len(), "generating");

        match self.provider.generate(api_key, &req).await {
            Ok(Some(text)) if !text.is_empty() => Ok(text),
            Ok(_) => {
                warn!(%model, "endpoint returned no content");
                Ok(NO_CONTENT_FALLBACK.to_string())
            }
            Err(e) => {
                let mut msg = format!("{e:#}");
                if msg.trim().is_empty() {
                    msg = GENERATION_FAILED_FALLBACK.to_string();
                }
                warn!(%model, error = %msg, "generation failed");
                Err(MobiusError::GenerationFailed(msg))
            }
        }
    }
}
