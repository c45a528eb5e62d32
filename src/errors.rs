use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MobiusError {
    #[error("an API key is required")] MissingCredential,
    #[error("generation failed: {0}")] GenerationFailed(String),
    #[error("chat session is not ready; enter an API key first")] SessionNotReady,
    #[error("stored history is corrupt: {0}")] PersistenceCorrupt(String),
    #[error("history item not found: {0}")] NotFound(String),
    #[error("storage error: {0}")] Storage(String),
    #[error("export failed: {0}")] Export(String),
}
