pub mod openai;
pub mod prompt;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use openai::OpenAiGenerator;
pub use types::{GenMessage, GenRequest};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("text-generation request timed out after {0}s")]
    Timeout(u64),
    #[error("cannot reach text-generation endpoint: {0}")]
    Connect(String),
    #[error("text-generation api error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("text-generation transport error: {0}")]
    Transport(String),
    #[error("text-generation response had no content")]
    EmptyContent,
}

/// The external collaborator that turns a prompt into model output.
///
/// Implementations return the raw text exactly as the model produced it;
/// deciding whether it is usable is `zizu_schema::interpret`'s job, not the
/// gateway's.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenRequest) -> Result<String, GatewayError>;
}

/// Canned-output generator for tests and offline runs.
pub struct StubGenerator {
    body: String,
}

impl StubGenerator {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, _request: GenRequest) -> Result<String, GatewayError> {
        Ok(self.body.clone())
    }
}
