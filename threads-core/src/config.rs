use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://graph.threads.net/v1.0";
pub const DEFAULT_PAGE_LIMIT: u32 = 5;
pub const DEFAULT_BACKFILL_DAYS: u32 = 7;
/// Longest accepted backfill window, roughly a century.
pub const MAX_BACKFILL_DAYS: u32 = 36_500;
/// Page size sent when the configured limit is unset or zero.
pub const FALLBACK_PAGE_LIMIT: u32 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_USER_ID: &str = "USER_ID";
pub const ENV_ACCESS_TOKEN: &str = "ACCESS_TOKEN";
pub const ENV_APP_SECRET: &str = "APP_SECRET";

/// Source of environment variables consulted during config resolution.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Resolved, immutable client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub account_id: String,
    pub access_token: String,
    pub app_secret: Option<String>,
    pub page_limit: Option<u32>,
    pub backfill_days: u32,
    pub base_url: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Resolves credentials from the process environment only.
    pub fn from_env() -> Result<Self, ConfigError> {
        ClientConfigBuilder::default().resolve(&ProcessEnv)
    }

    /// Page size actually sent to the API. `None` and `0` both collapse to 100.
    pub fn effective_limit(&self) -> u32 {
        match self.page_limit {
            Some(0) | None => FALLBACK_PAGE_LIMIT,
            Some(limit) => limit,
        }
    }
}

/// `[threads]` table of a TOML config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub threads: ConfigFileSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFileSection {
    pub account_id: Option<String>,
    pub access_token: Option<String>,
    pub app_secret: Option<String>,
    pub page_limit: Option<u32>,
    pub backfill_days: Option<u32>,
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl ConfigFile {
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::Io {
                path: path.display().to_string(),
                source: e,
            },
        })?;
        debug!("Loaded config file {}", path.display());
        Self::parse(&contents)
    }
}

/// Collects explicit settings; `resolve` fills credential gaps from the
/// environment exactly once.
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    account_id: Option<String>,
    access_token: Option<String>,
    app_secret: Option<String>,
    page_limit: Option<u32>,
    backfill_days: u32,
    base_url: String,
    request_timeout: Duration,
    user_agent: String,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self {
            account_id: None,
            access_token: None,
            app_secret: None,
            page_limit: Some(DEFAULT_PAGE_LIMIT),
            backfill_days: DEFAULT_BACKFILL_DAYS,
            base_url: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("threads-sdk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfigBuilder {
    pub fn account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    pub fn app_secret(mut self, app_secret: impl Into<String>) -> Self {
        self.app_secret = Some(app_secret.into());
        self
    }

    pub fn page_limit(mut self, page_limit: Option<u32>) -> Self {
        self.page_limit = page_limit;
        self
    }

    pub fn backfill_days(mut self, days: u32) -> Self {
        self.backfill_days = days;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Applies values from a config file. Values set on the builder afterwards
    /// still win.
    pub fn with_file(mut self, file: ConfigFile) -> Self {
        let section = file.threads;
        if section.account_id.is_some() {
            self.account_id = section.account_id;
        }
        if section.access_token.is_some() {
            self.access_token = section.access_token;
        }
        if section.app_secret.is_some() {
            self.app_secret = section.app_secret;
        }
        if section.page_limit.is_some() {
            self.page_limit = section.page_limit;
        }
        if let Some(days) = section.backfill_days {
            self.backfill_days = days;
        }
        if let Some(base_url) = section.base_url {
            self.base_url = base_url;
        }
        if let Some(secs) = section.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(user_agent) = section.user_agent {
            self.user_agent = user_agent;
        }
        self
    }

    pub fn resolve(self, env: &dyn EnvSource) -> Result<ClientConfig, ConfigError> {
        let account_id = pick(self.account_id, env, ENV_USER_ID).ok_or_else(|| {
            ConfigError::MissingEnvironmentVariable {
                var_name: ENV_USER_ID.to_string(),
            }
        })?;
        let access_token = pick(self.access_token, env, ENV_ACCESS_TOKEN).ok_or_else(|| {
            ConfigError::MissingEnvironmentVariable {
                var_name: ENV_ACCESS_TOKEN.to_string(),
            }
        })?;
        let app_secret = pick(self.app_secret, env, ENV_APP_SECRET);

        if self.backfill_days > MAX_BACKFILL_DAYS {
            return Err(ConfigError::InvalidValue {
                field: "backfill_days".to_string(),
                value: self.backfill_days.to_string(),
            });
        }

        if self.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                value: self.base_url,
            });
        }

        Ok(ClientConfig {
            account_id,
            access_token,
            app_secret,
            page_limit: self.page_limit,
            backfill_days: self.backfill_days,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            request_timeout: self.request_timeout,
            user_agent: self.user_agent,
        })
    }
}

// Explicit value first, then the environment. Empty strings count as unset.
fn pick(explicit: Option<String>, env: &dyn EnvSource, key: &str) -> Option<String> {
    explicit
        .filter(|v| !v.is_empty())
        .or_else(|| env.var(key).filter(|v| !v.is_empty()))
}
