//! Outbound lead notifications.
//!
//! The service cares that a captured lead reaches a human; how it travels is
//! behind the [`Notifier`] seam. The production implementation is SMTP; a
//! no-op stands in when mail is not configured so lead capture keeps working.

pub mod smtp;
pub mod summary;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

pub use smtp::{SmtpConfig, SmtpNotifier};
pub use summary::LeadSummary;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification timed out after {0}s")]
    Timeout(u64),
    #[error("mail transport failed: {0}")]
    Transport(String),
    #[error("could not build mail message: {0}")]
    Message(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_lead(&self, summary: &LeadSummary) -> Result<(), NotifyError>;
}

/// Used when no SMTP block is configured. Logs and succeeds, so the lead is
/// still recorded and the caller sees a normal capture.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify_lead(&self, summary: &LeadSummary) -> Result<(), NotifyError> {
        warn!(
            lead_id = summary.lead_id,
            "mail transport not configured; lead summary not delivered"
        );
        Ok(())
    }
}
