//! Client configuration from the environment.

use std::fmt;
use std::time::Duration;
use url::Url;

use crate::client::DEFAULT_USER_AGENT;
use crate::error::{Error, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for [`Client::from_config`](crate::Client::from_config).
///
/// Read from these variables by [`Config::from_env`]:
///
/// | variable | required | default |
/// |---|---|---|
/// | `NUCLEUS_ORG` | yes | |
/// | `NUCLEUS_API_KEY` | yes | |
/// | `NUCLEUS_BASE_URL` | no | `https://{org}.nucleussec.com/nucleus/api/` |
/// | `NUCLEUS_USER_AGENT` | no | `nucleus_api/<version>` |
/// | `NUCLEUS_TIMEOUT_SECS` | no | 30 |
/// | `NUCLEUS_CONNECT_TIMEOUT_SECS` | no | 10 |
#[derive(Clone)]
pub struct Config {
    pub organisation: String,
    pub api_key: String,
    pub base_url: Option<Url>,
    pub user_agent: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Config {
    pub fn new(organisation: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            organisation: organisation.into(),
            api_key: api_key.into(),
            base_url: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Config(format!("{name} must be set")))
        };
        let secs = |name: &str, default: Duration| -> Result<Duration> {
            match lookup(name) {
                Some(v) => v
                    .parse()
                    .map(Duration::from_secs)
                    .map_err(|_| Error::Config(format!("{name} must be a whole number of seconds, got {v:?}"))),
                None => Ok(default),
            }
        };

        let mut config = Self::new(required("NUCLEUS_ORG")?, required("NUCLEUS_API_KEY")?);
        if let Some(raw) = lookup("NUCLEUS_BASE_URL") {
            let url = Url::parse(&raw)
                .map_err(|e| Error::Config(format!("NUCLEUS_BASE_URL is not a valid URL: {e}")))?;
            config.base_url = Some(url);
        }
        if let Some(user_agent) = lookup("NUCLEUS_USER_AGENT") {
            config.user_agent = user_agent;
        }
        config.timeout = secs("NUCLEUS_TIMEOUT_SECS", DEFAULT_TIMEOUT)?;
        config.connect_timeout = secs("NUCLEUS_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT)?;
        Ok(config)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("organisation", &self.organisation)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config =
            Config::from_lookup(lookup(&[("NUCLEUS_ORG", "acme"), ("NUCLEUS_API_KEY", "k")]))
                .unwrap();
        assert_eq!(config.organisation, "acme");
        assert_eq!(config.base_url, None);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let err = Config::from_lookup(lookup(&[("NUCLEUS_ORG", "acme")])).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("NUCLEUS_API_KEY")));
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("NUCLEUS_ORG", "acme"),
            ("NUCLEUS_API_KEY", "k"),
            ("NUCLEUS_BASE_URL", "http://localhost:8080/nucleus/api/"),
            ("NUCLEUS_USER_AGENT", ""),
            ("NUCLEUS_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(
            config.base_url.unwrap().as_str(),
            "http://localhost:8080/nucleus/api/"
        );
        assert_eq!(config.user_agent, "");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_bad_timeout_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("NUCLEUS_ORG", "acme"),
            ("NUCLEUS_API_KEY", "k"),
            ("NUCLEUS_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Config::new("acme", "very-secret");
        assert!(!format!("{config:?}").contains("very-secret"));
    }
}
