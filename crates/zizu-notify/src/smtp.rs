use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::{LeadSummary, Notifier, NotifyError};

const SEND_TIMEOUT_SECS: u64 = 30;

fn default_port() -> u16 {
    587
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender address, e.g. `Zizu <bot@example.com>`.
    pub from: String,
    /// Where lead summaries go.
    pub to: String,
}

impl SmtpConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            username: String::new(),
            password: String::new(),
            from: String::new(),
            to: String::new(),
        }
    }
}

/// STARTTLS relay transport. The transport itself carries a connect/send
/// timeout, and the whole send is additionally capped so a stuck relay
/// surfaces as a typed timeout instead of hanging the request.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(SEND_TIMEOUT_SECS)))
            .build();
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::Message(format!("from address: {e}")))?;
        let to = config
            .to
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::Message(format!("to address: {e}")))?;
        Ok(Self {
            transport,
            from,
            to,
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify_lead(&self, summary: &LeadSummary) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(summary.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                summary.text_body.clone(),
                summary.html_body.clone(),
            ))
            .map_err(|e| NotifyError::Message(e.to_string()))?;

        match tokio::time::timeout(
            Duration::from_secs(SEND_TIMEOUT_SECS),
            self.transport.send(email),
        )
        .await
        {
            Err(_) => Err(NotifyError::Timeout(SEND_TIMEOUT_SECS)),
            Ok(Err(e)) => Err(NotifyError::Transport(e.to_string())),
            Ok(Ok(_)) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".into(),
            port: 587,
            username: "bot".into(),
            password: "secret".into(),
            from: "Zizu <bot@example.com>".into(),
            to: "sales@example.com".into(),
        }
    }

    #[test]
    fn valid_config_builds_a_notifier() {
        assert!(SmtpNotifier::new(&config()).is_ok());
    }

    #[test]
    fn bad_from_address_is_a_message_error() {
        let mut config = config();
        config.from = "not an address".into();
        let err = SmtpNotifier::new(&config).err().expect("must fail");
        match err {
            NotifyError::Message(reason) => assert!(reason.contains("from address")),
            other => panic!("expected Message error, got {other:?}"),
        }
    }

    #[test]
    fn default_port_is_starttls_submission() {
        assert_eq!(SmtpConfig::new("smtp.example.com").port, 587);
    }
}
