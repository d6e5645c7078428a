//! Server configuration
//!
//! Layering, lowest to highest precedence:
//! 1. built-in defaults
//! 2. `~/.mentallap/config.toml` (or an explicit `--config` path)
//! 3. environment variables (`SMTP_HOST`, `SMTP_PORT`, `SMTP_EMAIL`, `SMTP_PASSWORD`,
//!    `MENTALLAP_SITE_URL`, `CALENDLY_URL`)
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:3000"
//!
//! [session]
//! ttl_days = 30
//! secure_cookie = true
//!
//! [mail]
//! smtp_host = "smtp.gmail.com"
//! smtp_email = "hello@thementallap.com"
//!
//! [contact]
//! support_email = "support@thementallap.com"
//! partnerships_email = "partners@thementallap.com"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::mail::smtp::DEFAULT_SMTP_PORT;
use crate::mail::templates::ContactRouting;
use crate::mail::SmtpSettings;

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("{key} must be between {min} and {max}, got {value}")]
    OutOfRange {
        key: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// Longest session a config may ask for
pub const MAX_SESSION_TTL_DAYS: i64 = 365;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    /// Allow any origin (development only)
    pub cors_permissive: bool,
    pub request_timeout_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".into(),
            cors_permissive: false,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub ttl_days: i64,
    /// Mark the cookie `Secure` (requires HTTPS)
    pub secure_cookie: bool,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            ttl_days: 30,
            secure_cookie: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSection {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_email: Option<String>,
    pub smtp_password: Option<String>,
}

impl Default for MailSection {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_email: None,
            smtp_password: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSection {
    pub support_email: String,
    pub partnerships_email: String,
}

impl Default for ContactSection {
    fn default() -> Self {
        let routing = ContactRouting::default();
        Self {
            support_email: routing.support,
            partnerships_email: routing.partnerships,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    pub url: String,
    /// Rendered on the sessions page when set
    pub calendly_url: Option<String>,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            url: ContactRouting::default().site_url,
            calendly_url: None,
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub session: SessionSection,
    pub mail: MailSection,
    pub contact: ContactSection,
    pub site: SiteSection,
}

impl AppConfig {
    /// Default config path: ~/.mentallap/config.toml
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".mentallap/config.toml")
    }

    /// Load from an explicit path (must exist) or the default path (optional).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path(), false),
        };

        if !path.exists() {
            if required {
                return Err(ConfigError::NotFound(path));
            }
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let ttl = self.session.ttl_days;
        if !(1..=MAX_SESSION_TTL_DAYS).contains(&ttl) {
            return Err(ConfigError::OutOfRange {
                key: "session.ttl_days",
                value: ttl,
                min: 1,
                max: MAX_SESSION_TTL_DAYS,
            });
        }
        Ok(())
    }

    /// Overlay environment variables read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = non_empty("SMTP_HOST") {
            self.mail.smtp_host = Some(host);
        }
        if let Some(port) = non_empty("SMTP_PORT") {
            self.mail.smtp_port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: "SMTP_PORT",
                value: port,
            })?;
        }
        if let Some(email) = non_empty("SMTP_EMAIL") {
            self.mail.smtp_email = Some(email);
        }
        if let Some(password) = non_empty("SMTP_PASSWORD") {
            self.mail.smtp_password = Some(password);
        }
        if let Some(url) = non_empty("MENTALLAP_SITE_URL") {
            self.site.url = url;
        }
        if let Some(url) = non_empty("CALENDLY_URL") {
            self.site.calendly_url = Some(url);
        }
        Ok(())
    }

    /// SMTP settings when both an account and a password are configured.
    /// The host defaults to Gmail's relay, matching the account type the
    /// business uses.
    pub fn smtp_settings(&self) -> Option<SmtpSettings> {
        let username = self.mail.smtp_email.clone()?;
        let password = self.mail.smtp_password.clone()?;
        Some(SmtpSettings {
            host: self
                .mail
                .smtp_host
                .clone()
                .unwrap_or_else(|| "smtp.gmail.com".into()),
            port: self.mail.smtp_port,
            username,
            password,
        })
    }

    pub fn contact_routing(&self) -> ContactRouting {
        ContactRouting {
            support: self.contact.support_email.clone(),
            partnerships: self.contact.partnerships_email.clone(),
            site_url: self.site.url.clone(),
        }
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.session.ttl_days.clamp(1, MAX_SESSION_TTL_DAYS))
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.server.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.session_ttl(), chrono::Duration::days(30));
        assert_eq!(config.contact.support_email, "support@thementallap.com");
        assert!(config.smtp_settings().is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            bind = "0.0.0.0:8080"

            [contact]
            partnerships_email = "deals@example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.contact.partnerships_email, "deals@example.com");
        assert_eq!(config.contact.support_email, "support@thementallap.com");
    }

    #[test]
    fn rejects_bad_toml() {
        assert!(matches!(
            AppConfig::from_toml("[server\nbind = 1").unwrap_err(),
            ConfigError::Parse(_)
        ));
    }

    #[test]
    fn env_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("SMTP_EMAIL", "hello@thementallap.com"),
            ("SMTP_PASSWORD", "secret"),
            ("SMTP_PORT", "465"),
            ("SMTP_HOST", ""),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        let smtp = config.smtp_settings().unwrap();
        assert_eq!(smtp.host, "smtp.gmail.com");
        assert_eq!(smtp.port, 465);
        assert_eq!(smtp.username, "hello@thementallap.com");
    }

    #[test]
    fn invalid_port_is_reported() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(|k| (k == "SMTP_PORT").then(|| "smtp".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "SMTP_PORT", .. }));
    }

    #[test]
    fn session_ttl_out_of_range_is_rejected() {
        for ttl in ["0", "-3", "9223372036854775807"] {
            let err = AppConfig::from_toml(&format!("[session]\nttl_days = {ttl}")).unwrap_err();
            assert!(
                matches!(err, ConfigError::OutOfRange { key: "session.ttl_days", .. }),
                "{ttl}"
            );
        }
    }

    #[test]
    fn session_ttl_is_clamped_in_code() {
        let mut config = AppConfig::default();
        config.session.ttl_days = i64::MAX;
        assert_eq!(config.session_ttl(), chrono::Duration::days(MAX_SESSION_TTL_DAYS));
        let expires = chrono::Utc::now() + config.session_ttl();
        assert!(expires > chrono::Utc::now());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[session]\nttl_days = 7\nsecure_cookie = true").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.session_ttl(), chrono::Duration::days(7));
        assert!(config.session.secure_cookie);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            AppConfig::load(Some(&missing)).unwrap_err(),
            ConfigError::NotFound(_)
        ));
    }
}
