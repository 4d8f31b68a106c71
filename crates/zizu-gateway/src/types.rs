use serde::{Deserialize, Serialize};
use zizu_schema::ChatTask;

/// One prior exchange handed to the model as context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenMessage {
    pub role: String,
    pub content: String,
}

impl GenMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: content.into(),
        }
    }
}

/// Everything the gateway needs to produce one structured reply.
#[derive(Debug, Clone)]
pub struct GenRequest {
    pub task: ChatTask,
    /// Prior session turns, oldest first, already flattened to role/content.
    pub history: Vec<GenMessage>,
    /// The new user message, un-framed (the gateway adds the task prefix).
    pub message: String,
    /// Caller-supplied language hint, passed through to the prompt.
    pub language_hint: Option<String>,
}

impl GenRequest {
    pub fn simple(task: ChatTask, message: impl Into<String>) -> Self {
        Self {
            task,
            history: Vec::new(),
            message: message.into(),
            language_hint: None,
        }
    }
}
