//! Process-wide conversation and lead state.
//!
//! One [`ZizuStore`] is constructed at startup and handed by reference into
//! every request handler. Sessions are created lazily on first append and
//! never evicted; the lead ledger is append-only. Both live behind a single
//! async lock that is never held across a network call.

pub mod snapshot;

pub use snapshot::Snapshot;

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::warn;
use zizu_schema::{BotReply, Lead, LeadDraft, Turn};

#[derive(Default)]
struct StoreInner {
    conversations: HashMap<String, Vec<Turn>>,
    leads: Vec<Lead>,
    last_updated: Option<DateTime<Utc>>,
}

pub struct ZizuStore {
    inner: RwLock<StoreInner>,
    snapshot_path: Option<PathBuf>,
    /// Serializes snapshot writes so concurrent mutations cannot interleave
    /// bytes in the temp file. Mutations themselves stay concurrent.
    save_lock: Mutex<()>,
}

impl Default for ZizuStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ZizuStore {
    /// In-memory only; state is lost on process exit.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            snapshot_path: None,
            save_lock: Mutex::new(()),
        }
    }

    /// Mirror every mutation to a JSON snapshot file, loading any existing
    /// snapshot first.
    pub async fn with_snapshot(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut inner = StoreInner::default();
        if let Some(snapshot) = Snapshot::load(&path).await? {
            inner.conversations = snapshot.conversations;
            inner.leads = snapshot.leads;
            inner.last_updated = snapshot.last_updated;
        }
        Ok(Self {
            inner: RwLock::new(inner),
            snapshot_path: Some(path),
            save_lock: Mutex::new(()),
        })
    }

    /// Ordered turns for a session; empty when the key is unknown.
    pub async fn history(&self, session_id: &str) -> Vec<Turn> {
        let inner = self.inner.read().await;
        inner
            .conversations
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Append one turn, creating the session entry if absent.
    ///
    /// Concurrent appends to the same key land in completion order, which may
    /// differ from issuance order. That interleaving is accepted; the store
    /// only guarantees that no turn is lost.
    pub async fn append_turn(&self, session_id: &str, user_message: &str, bot: BotReply) -> Turn {
        let turn = Turn {
            user: user_message.to_owned(),
            bot,
            at: Utc::now(),
        };
        {
            let mut inner = self.inner.write().await;
            inner
                .conversations
                .entry(session_id.to_owned())
                .or_default()
                .push(turn.clone());
            inner.last_updated = Some(turn.at);
        }
        self.persist().await;
        turn
    }

    /// Turn a validated contact submission into a durable ledger entry.
    ///
    /// The conversation is copied out at capture time, so the lead's history
    /// stays stable if the session keeps going afterwards. Ids are epoch
    /// millis, bumped by one when two captures share a millisecond.
    pub async fn capture_lead(&self, draft: LeadDraft) -> Lead {
        let lead = {
            let mut inner = self.inner.write().await;
            let now = Utc::now();
            let id = match inner.leads.last() {
                Some(last) if last.id >= now.timestamp_millis() => last.id + 1,
                _ => now.timestamp_millis(),
            };
            let conversation = inner
                .conversations
                .get(&draft.session_id)
                .cloned()
                .unwrap_or_default();
            let lead = Lead {
                id,
                session_id: draft.session_id,
                name: draft.name,
                email: draft.email,
                phone: draft.phone,
                planning_horizon: draft.planning_horizon,
                description: draft.description,
                conversation,
                captured_at: now,
            };
            inner.leads.push(lead.clone());
            inner.last_updated = Some(now);
            lead
        };
        self.persist().await;
        lead
    }

    pub async fn leads(&self) -> Vec<Lead> {
        self.inner.read().await.leads.clone()
    }

    pub async fn lead_count(&self) -> usize {
        self.inner.read().await.leads.len()
    }

    pub async fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.last_updated
    }

    /// Rewrite the snapshot if one is configured. A failed write is logged
    /// and swallowed: the in-memory mutation already happened and the request
    /// that caused it should not fail retroactively.
    async fn persist(&self) {
        let Some(path) = &self.snapshot_path else {
            return;
        };
        let snapshot = {
            let inner = self.inner.read().await;
            Snapshot {
                conversations: inner.conversations.clone(),
                leads: inner.leads.clone(),
                last_updated: inner.last_updated,
            }
        };
        let _guard = self.save_lock.lock().await;
        if let Err(err) = snapshot.save(path).await {
            warn!("snapshot write to {} failed: {err:#}", path.display());
        }
    }
}
