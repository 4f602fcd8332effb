use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const API_KEY_VAR: &str = "API_KEY";
pub const CSE_ID_VAR: &str = "CSE_ID";
pub const PROXY_URL_VAR: &str = "PROXY_URL";

pub const IPS_FILE: &str = "ips.txt";
pub const DOMAINS_FILE: &str = "reversed-domains.txt";
pub const QUERIES_FILE: &str = "sentences.txt";

pub const DEFAULT_MAX_CONCURRENCY: usize = 50;
pub const DEFAULT_QUERY_COUNT: RangeInclusive<usize> = 10..=30;
pub const DEFAULT_SEARCH_DELAY: Duration = Duration::from_millis(200);

/// Keys for the external services. Both are required.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub cse_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("cse_id", &self.cse_id)
            .finish()
    }
}

/// Locations of the three append-only logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub ips: PathBuf,
    pub domains: PathBuf,
    pub queries: PathBuf,
}

impl StorePaths {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            ips: dir.join(IPS_FILE),
            domains: dir.join(DOMAINS_FILE),
            queries: dir.join(QUERIES_FILE),
        }
    }
}

impl Default for StorePaths {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Hides the startup banner.
    pub no_banner: bool,
    /// 0 prints everything, 1 drops section headers, 2 prints only the summary.
    pub quiet: u8,
    /// Disables the raw-mode key listener ('q' to stop early).
    pub disable_input: bool,
    pub stores: StorePaths,
    /// How many queries to ask the generator for; one value is drawn per run.
    pub query_count: RangeInclusive<usize>,
    /// Upper bound on simultaneous reverse lookups.
    pub max_concurrency: usize,
    /// Pause between two search calls.
    pub search_delay: Duration,
    pub api_key: Option<String>,
    pub cse_id: Option<String>,
    /// Passed verbatim to the reverse lookup client.
    pub proxy_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            no_banner: false,
            quiet: 0,
            disable_input: false,
            stores: StorePaths::default(),
            query_count: DEFAULT_QUERY_COUNT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            search_delay: DEFAULT_SEARCH_DELAY,
            api_key: None,
            cse_id: None,
            proxy_url: None,
        }
    }
}

impl Settings {
    /// Fills the credential and proxy fields from a key lookup, usually the
    /// process environment. Blank values count as unset.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        self.api_key = get(API_KEY_VAR);
        self.cse_id = get(CSE_ID_VAR);
        self.proxy_url = get(PROXY_URL_VAR);
        self
    }

    /// Returns the credentials, or every missing variable at once.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let mut missing = Vec::new();
        if self.api_key.is_none() {
            missing.push(API_KEY_VAR.to_string());
        }
        if self.cse_id.is_none() {
            missing.push(CSE_ID_VAR.to_string());
        }

        match (&self.api_key, &self.cse_id) {
            (Some(api_key), Some(cse_id)) => Ok(Credentials {
                api_key: api_key.clone(),
                cse_id: cse_id.clone(),
            }),
            _ => Err(ConfigError::MissingVariables(missing)),
        }
    }

    /// Checks the numeric knobs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                key: "concurrency",
                value: self.max_concurrency.to_string(),
                reason: "must be at least 1",
            });
        }
        if *self.query_count.start() == 0 {
            return Err(ConfigError::InvalidValue {
                key: "min-queries",
                value: self.query_count.start().to_string(),
                reason: "must be at least 1",
            });
        }
        if self.query_count.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "max-queries",
                value: self.query_count.end().to_string(),
                reason: "must not be below min-queries",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn credentials_present() {
        let settings = Settings::default().with_env(env(&[("API_KEY", "k"), ("CSE_ID", "c")]));
        let creds = settings.credentials().unwrap();
        assert_eq!(creds.api_key, "k");
        assert_eq!(creds.cse_id, "c");
        assert!(settings.proxy_url.is_none());
    }

    #[test]
    fn reports_every_missing_variable() {
        let settings = Settings::default().with_env(env(&[("API_KEY", "   ")]));
        match settings.credentials() {
            Err(ConfigError::MissingVariables(missing)) => {
                assert_eq!(missing, vec!["API_KEY".to_string(), "CSE_ID".to_string()]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn debug_output_hides_api_key() {
        let creds = Credentials {
            api_key: "secret".into(),
            cse_id: "cx".into(),
        };
        assert!(!format!("{creds:?}").contains("secret"));
    }

    #[test]
    fn validate_rejects_bad_ranges() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_ok());

        settings.query_count = 5..=2;
        assert!(settings.validate().is_err());

        settings.query_count = 0..=2;
        assert!(settings.validate().is_err());

        settings.query_count = 1..=1;
        settings.max_concurrency = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn store_paths_use_default_names() {
        let paths = StorePaths::in_dir("/data");
        assert_eq!(paths.ips, PathBuf::from("/data/ips.txt"));
        assert_eq!(paths.domains, PathBuf::from("/data/reversed-domains.txt"));
        assert_eq!(paths.queries, PathBuf::from("/data/sentences.txt"));
    }
}
