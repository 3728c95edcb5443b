use anyhow::{Context, anyhow};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Output format of the process-wide log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(anyhow!("LOG_FORMAT must be json or pretty, got {}", other)),
        }
    }
}

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Missing key is reported per request, not at startup.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub request_timeout: Duration,
    pub port: u16,
    pub max_upload_bytes: Option<usize>,
    pub log_format: LogFormat,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            port: DEFAULT_PORT,
            max_upload_bytes: None,
            log_format: LogFormat::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let gemini_api_key = lookup("GEMINI_API_KEY").filter(|key| !key.is_empty());

        let gemini_model = lookup("GEMINI_MODEL")
            .filter(|model| !model.trim().is_empty())
            .unwrap_or(defaults.gemini_model);

        let gemini_base_url = lookup("GEMINI_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.gemini_base_url);

        let request_timeout = match lookup("GEMINI_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse::<u64>()
                    .with_context(|| format!("GEMINI_TIMEOUT_SECS is not a number: {}", raw))?,
            ),
            None => defaults.request_timeout,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT is not a valid port: {}", raw))?,
            None => defaults.port,
        };

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) => {
                let limit = raw
                    .parse::<usize>()
                    .with_context(|| format!("MAX_UPLOAD_BYTES is not a number: {}", raw))?;
                if limit == 0 {
                    return Err(anyhow!("MAX_UPLOAD_BYTES must be greater than zero"));
                }
                Some(limit)
            }
            None => None,
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => LogFormat::parse(&raw)?,
            None => defaults.log_format,
        };

        Ok(Self {
            gemini_api_key,
            gemini_model,
            gemini_base_url,
            request_timeout,
            port,
            max_upload_bytes,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = ServiceConfig::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.gemini_model, DEFAULT_MODEL);
        assert_eq!(config.gemini_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.port, 3000);
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert!(config.max_upload_bytes.is_none());
    }

    #[test]
    fn empty_api_key_counts_as_unconfigured() {
        let config = ServiceConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "")])).unwrap();
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn whitespace_api_key_is_kept_as_configured() {
        let config = ServiceConfig::from_lookup(lookup_from(&[("GEMINI_API_KEY", "  ")])).unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("  "));
    }

    #[test]
    fn log_format_is_parsed() {
        let config = ServiceConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);

        let config = ServiceConfig::from_lookup(lookup_from(&[("LOG_FORMAT", "Pretty")])).unwrap();
        assert_eq!(config.log_format, LogFormat::Pretty);

        assert!(ServiceConfig::from_lookup(lookup_from(&[("LOG_FORMAT", "xml")])).is_err());
    }

    #[test]
    fn overrides_are_read() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-2.5-pro"),
            ("GEMINI_BASE_URL", "http://localhost:9999/v1beta/"),
            ("GEMINI_TIMEOUT_SECS", "5"),
            ("PORT", "8080"),
            ("MAX_UPLOAD_BYTES", "1048576"),
        ]))
        .unwrap();

        assert_eq!(config.gemini_api_key.as_deref(), Some("secret"));
        assert_eq!(config.gemini_model, "gemini-2.5-pro");
        assert_eq!(config.gemini_base_url, "http://localhost:9999/v1beta");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, Some(1_048_576));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert!(ServiceConfig::from_lookup(lookup_from(&[("PORT", "http")])).is_err());
        assert!(ServiceConfig::from_lookup(lookup_from(&[("MAX_UPLOAD_BYTES", "0")])).is_err());
        assert!(
            ServiceConfig::from_lookup(lookup_from(&[("GEMINI_TIMEOUT_SECS", "-1")])).is_err()
        );
    }
}
