/**
 * config.rs
 * Parser for dashboard configuration files (YAML format)
 *
 * Format:
 * ```yaml
 * apiVersion: cellar/v1
 * kind: Dashboard
 * spec:
 *   sparql:
 *     url: https://publications.europa.eu/webapi/rdf/sparql
 *     timeoutSecs: 60
 *   ted:
 *     url: https://api.acceptance.ted.europa.eu/v3/notices/search
 *     timeoutSecs: 30
 *   retry:
 *     maxRetries: 0
 *     backoffMs: 500
 *   labels:
 *     language: en
 * ```
 *
 * Every section of `spec` is optional and falls back to the public
 * endpoints.
 */

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::cache::DEFAULT_LANGUAGE;
use crate::errors::{CellarError, Result};
use crate::fetch::ted::DEFAULT_TED_URL;
use crate::fetch::{EndpointConfig, RetryPolicy, DEFAULT_TIMEOUT};
use crate::query::sparql::is_language_tag;

pub const API_VERSION: &str = "cellar/v1";
pub const KIND: &str = "Dashboard";

/// Public Cellar SPARQL endpoint.
pub const DEFAULT_SPARQL_URL: &str = "https://publications.europa.eu/webapi/rdf/sparql";

/// Dashboard configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CellarConfig {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub spec: DashboardSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSpec {
    #[serde(default = "EndpointSection::sparql")]
    pub sparql: EndpointSection,
    #[serde(default = "EndpointSection::ted")]
    pub ted: EndpointSection,
    #[serde(default)]
    pub retry: RetrySection,
    #[serde(default)]
    pub labels: LabelSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSection {
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl EndpointSection {
    fn sparql() -> Self {
        Self {
            url: DEFAULT_SPARQL_URL.to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }

    fn ted() -> Self {
        Self {
            url: DEFAULT_TED_URL.to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn endpoint(&self) -> EndpointConfig {
        EndpointConfig::new(self.url.clone()).with_timeout(Duration::from_secs(self.timeout_secs))
    }

    fn validate(&self, section: &str) -> Result<()> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(CellarError::Config(format!(
                "spec.{}.url must be an http(s) URL, got '{}'",
                section, self.url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(CellarError::Config(format!(
                "spec.{}.timeoutSecs must be greater than zero",
                section
            )));
        }
        Ok(())
    }
}

/// Retry is off unless configured.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetrySection {
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default)]
    pub backoff_ms: u64,
}

impl RetrySection {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.backoff_ms))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabelSection {
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for LabelSection {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

impl Default for DashboardSpec {
    fn default() -> Self {
        Self {
            sparql: EndpointSection::sparql(),
            ted: EndpointSection::ted(),
            retry: RetrySection::default(),
            labels: LabelSection::default(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Default for CellarConfig {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            spec: DashboardSpec::default(),
        }
    }
}

impl CellarConfig {
    /// Load and validate a configuration file
    ///
    /// # Example
    /// ```no_run
    /// use cellar_core::CellarConfig;
    ///
    /// let config = CellarConfig::load("cellar.yaml")?;
    /// println!("{}", config.spec.sparql.url);
    /// # Ok::<(), cellar_core::CellarError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(CellarError::FileNotFound(path.to_string_lossy().to_string()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load `path` if given, otherwise the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: CellarConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration structure
    ///
    /// Ensures:
    /// - apiVersion is "cellar/v1" and kind is "Dashboard"
    /// - both endpoints are http(s) URLs with a non-zero timeout
    /// - the label language is a lowercase ISO 639 code
    pub fn validate(&self) -> Result<()> {
        if self.api_version != API_VERSION {
            return Err(CellarError::Config(format!(
                "Invalid apiVersion: expected '{}', got '{}'",
                API_VERSION, self.api_version
            )));
        }

        if self.kind != KIND {
            return Err(CellarError::Config(format!(
                "Invalid kind: expected '{}', got '{}'",
                KIND, self.kind
            )));
        }

        self.spec.sparql.validate("sparql")?;
        self.spec.ted.validate("ted")?;

        if !is_language_tag(&self.spec.labels.language) {
            return Err(CellarError::Config(format!(
                "spec.labels.language must be a lowercase ISO 639 code, got '{}'",
                self.spec.labels.language
            )));
        }

        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path.as_ref(), yaml)?;
        Ok(())
    }
}
