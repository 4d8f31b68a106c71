//! Environment-variable configuration.
//!
//! The service is configured entirely through the environment (plus an
//! optional `.env` file loaded by the binary). Parsing is factored over a
//! key-lookup closure so tests never have to mutate process-wide env state.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use zizu_notify::SmtpConfig;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct ZizuConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub port: u16,
    pub snapshot_path: Option<PathBuf>,
    pub log_dir: PathBuf,
    /// None disables lead notifications (NoopNotifier).
    pub smtp: Option<SmtpConfig>,
}

impl ZizuConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get_nonblank = |key: &str| {
            get(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        let Some(api_key) = get_nonblank("OPENAI_API_KEY") else {
            bail!("OPENAI_API_KEY is not set");
        };
        let api_base = get_nonblank("OPENAI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.into());
        let model = get_nonblank("ZIZU_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());
        let port = match get_nonblank("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port number: {raw:?}"))?,
            None => DEFAULT_PORT,
        };
        let snapshot_path = get_nonblank("ZIZU_SNAPSHOT_PATH").map(PathBuf::from);
        let log_dir = get_nonblank("ZIZU_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("logs"));

        let smtp = match get_nonblank("SMTP_HOST") {
            None => None,
            Some(host) => {
                let require = |key: &str| {
                    get_nonblank(key)
                        .with_context(|| format!("{key} is required when SMTP_HOST is set"))
                };
                let mut smtp = SmtpConfig::new(host);
                if let Some(raw) = get_nonblank("SMTP_PORT") {
                    smtp.port = raw
                        .parse::<u16>()
                        .with_context(|| format!("SMTP_PORT is not a valid port number: {raw:?}"))?;
                }
                smtp.username = require("SMTP_USERNAME")?;
                smtp.password = require("SMTP_PASSWORD")?;
                smtp.from = require("SMTP_FROM")?;
                smtp.to = require("LEADS_TO")?;
                Some(smtp)
            }
        };

        Ok(Self {
            api_key,
            api_base,
            model,
            port,
            snapshot_path,
            log_dir,
            smtp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn minimal_env_gets_defaults() {
        let config = ZizuConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.snapshot_path.is_none());
        assert!(config.smtp.is_none());
    }

    #[test]
    fn missing_api_key_fails() {
        let err = ZizuConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn blank_api_key_fails() {
        assert!(ZizuConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "   ")])).is_err());
    }

    #[test]
    fn invalid_port_fails_with_context() {
        let err = ZizuConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(format!("{err:#}").contains("PORT"));
    }

    #[test]
    fn smtp_block_requires_all_fields() {
        let err = ZizuConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_USERNAME", "bot"),
        ]))
        .unwrap_err();
        assert!(format!("{err:#}").contains("SMTP_PASSWORD"));
    }

    #[test]
    fn full_smtp_block_parses() {
        let config = ZizuConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "2525"),
            ("SMTP_USERNAME", "bot"),
            ("SMTP_PASSWORD", "secret"),
            ("SMTP_FROM", "Zizu <bot@example.com>"),
            ("LEADS_TO", "sales@example.com"),
        ]))
        .unwrap();
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.port, 2525);
        assert_eq!(smtp.to, "sales@example.com");
    }

    #[test]
    fn smtp_port_defaults_to_587() {
        let config = ZizuConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_USERNAME", "bot"),
            ("SMTP_PASSWORD", "secret"),
            ("SMTP_FROM", "bot@example.com"),
            ("LEADS_TO", "sales@example.com"),
        ]))
        .unwrap();
        assert_eq!(config.smtp.unwrap().port, 587);
    }
}
