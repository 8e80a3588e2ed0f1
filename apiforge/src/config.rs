//! Run configuration.
//!
//! Built once by the binary from CLI flags and environment, then passed by
//! value into the driver and the agent service. Library code never reads
//! the process environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL, LlmClient};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// Directory the five artifacts are written into.
    pub output_dir: PathBuf,
    pub max_tokens: u32,
    pub timeout: Duration,
}

// Keeps the credential out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("output_dir", &self.output_dir)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Config with defaults for everything but the credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from("."),
            max_tokens: 4096,
            timeout: Duration::from_secs(300),
        }
    }

    /// Build from optional parts, failing when the credential is absent.
    pub fn from_parts(
        api_key: Option<String>,
        model: &str,
        base_url: &str,
        output_dir: PathBuf,
        max_tokens: u32,
        timeout_secs: u64,
    ) -> Result<Self> {
        let api_key = api_key.unwrap_or_default();
        let config = Self {
            model: model.to_string(),
            base_url: base_url.to_string(),
            output_dir,
            max_tokens,
            timeout: Duration::from_secs(timeout_secs),
            ..Self::new(api_key)
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::config(format!(
                "{API_KEY_ENV} environment variable not set (export {API_KEY_ENV}=your_api_key_here)"
            )));
        }
        if self.model.trim().is_empty() {
            return Err(Error::config("model name must not be empty"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::config(format!(
                "base URL must be http(s), got {:?}",
                self.base_url
            )));
        }
        if self.max_tokens == 0 {
            return Err(Error::config("max tokens must be positive"));
        }
        Ok(())
    }

    /// Chat client configured from this config.
    pub fn llm_client(&self) -> Result<LlmClient> {
        let client = LlmClient::new(self.api_key.clone())
            .with_model(&self.model)
            .with_base_url(&self.base_url)
            .with_max_tokens(self.max_tokens)
            .with_timeout(self.timeout)?;
        Ok(client)
    }
}
