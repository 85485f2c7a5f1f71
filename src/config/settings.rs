use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Clone, Debug)]
pub struct Settings {
    pub api_url: String,
    pub request_timeout: Duration,
    /// Bearer token saved from an earlier sign-in.
    pub token: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = match lookup("TALEWEAVER_API_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => normalize_api_url(&url).context("invalid TALEWEAVER_API_URL")?,
            None => DEFAULT_API_URL.to_string(),
        };

        let timeout_secs = match lookup("TALEWEAVER_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("TALEWEAVER_TIMEOUT_SECS is not a number: {raw}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            bail!("TALEWEAVER_TIMEOUT_SECS must be greater than zero");
        }

        let token = lookup("TALEWEAVER_TOKEN")
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty());

        Ok(Self {
            api_url,
            request_timeout: Duration::from_secs(timeout_secs),
            token,
        })
    }

    /// Points the client at another backend, e.g. from a command-line flag.
    pub fn with_api_url(mut self, url: &str) -> Result<Self> {
        self.api_url = normalize_api_url(url)?;
        Ok(self)
    }
}

fn normalize_api_url(url: &str) -> Result<String> {
    let url = url.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("API URL must be an http(s) URL, got {url:?}");
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings_from(vars: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let settings = settings_from(&[]).unwrap();
        assert_eq!(settings.api_url, "http://localhost:5000");
        assert_eq!(settings.request_timeout, Duration::from_secs(120));
        assert!(settings.token.is_none());
    }

    #[test]
    fn trims_trailing_slash_and_blank_token() {
        let settings = settings_from(&[
            ("TALEWEAVER_API_URL", "https://tales.example.com/"),
            ("TALEWEAVER_TOKEN", "   "),
            ("TALEWEAVER_TIMEOUT_SECS", "30"),
        ])
        .unwrap();
        assert_eq!(settings.api_url, "https://tales.example.com");
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
        assert!(settings.token.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(settings_from(&[("TALEWEAVER_API_URL", "ftp://nope")]).is_err());
        assert!(settings_from(&[("TALEWEAVER_TIMEOUT_SECS", "soon")]).is_err());
        assert!(settings_from(&[("TALEWEAVER_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn api_url_override_is_validated() {
        let settings = settings_from(&[]).unwrap();

        let moved = settings.clone().with_api_url(" https://staging.example.com/ ").unwrap();
        assert_eq!(moved.api_url, "https://staging.example.com");

        assert!(settings.clone().with_api_url("localhost:5000").is_err());
        assert!(settings.with_api_url("").is_err());
    }
}
