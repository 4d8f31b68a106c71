pub mod interpret;

pub use interpret::{interpret, InterpretError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which job the model was asked to do for a `/chat` call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatTask {
    #[default]
    Consult,
    Classify,
    Handoff,
}

impl ChatTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consult => "consult",
            Self::Classify => "classify",
            Self::Handoff => "handoff",
        }
    }
}

/// Languages the model is allowed to answer in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ru,
    Uk,
    De,
    Ar,
    Fr,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Hot,
    Warm,
    Cold,
    Spam,
    Invalid,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Urgency {
    #[serde(rename = "<2w")]
    Under2Weeks,
    #[serde(rename = "2-8w")]
    TwoToEightWeeks,
    #[serde(rename = ">8w")]
    Over8Weeks,
    #[serde(rename = "unknown")]
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Priority {
    P0,
    P1,
    P2,
}

/// Structured model output for one chat turn.
///
/// Exactly one of `consult`/`classify`/`handoff` must be populated and must
/// match `task`; [`interpret`] enforces this after decoding. Optional fields
/// are skipped on serialization so a decoded payload re-serializes unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BotReply {
    pub task: ChatTask,
    pub language: Language,
    pub need_tools: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_contact: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_contact_form: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consult: Option<ConsultReply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classify: Option<ClassifyReply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handoff: Option<HandoffReply>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConsultReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_questions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ClassifyReply {
    pub segment: Segment,
    /// Nominally 0-100. Out-of-range values pass through as received; the
    /// interpreter never clamps or repairs.
    pub lead_score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasons: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_contact: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HandoffReply {
    pub brief_summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_facts: Option<Vec<String>>,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_call: Option<ScheduledCall>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScheduledCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime_iso: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

/// One user-message/bot-response exchange. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub user: String,
    pub bot: BotReply,
    pub at: DateTime<Utc>,
}

/// Contact submission before the store stamps id, timestamp and history.
#[derive(Debug, Clone)]
pub struct LeadDraft {
    pub session_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub planning_horizon: Option<String>,
    pub description: Option<String>,
}

/// A captured contact plus a snapshot of its session's conversation.
///
/// `conversation` is a copy taken at capture time; later turns on the same
/// session never show up here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lead {
    pub id: i64,
    pub session_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning_horizon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub conversation: Vec<Turn>,
    pub captured_at: DateTime<Utc>,
}
