//! Configuration management for the hublink contact sync service.

use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use hublink_crm::{ClientConfig, OauthConfig};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The service works out-of-the-box against the public HubSpot endpoints;
/// credentials come from `CLIENT_ID`/`CLIENT_SECRET` (OAuth app) or
/// `HUBSPOT_API_KEY` (private app token).
///
/// # Example
///
/// ```no_run
/// use hublink_api::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
/// println!("Server will bind to {}:{}", config.host, config.port);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,
    /// HTTP request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    // Credentials
    /// OAuth application client id.
    ///
    /// Environment variable: `CLIENT_ID`
    #[serde(default, alias = "CLIENT_ID")]
    pub client_id: String,
    /// OAuth application client secret.
    ///
    /// Environment variable: `CLIENT_SECRET`
    #[serde(default, alias = "CLIENT_SECRET")]
    pub client_secret: String,
    /// Private app token used when no OAuth authorization has completed.
    ///
    /// Environment variable: `HUBSPOT_API_KEY`
    #[serde(default, alias = "HUBSPOT_API_KEY")]
    pub hubspot_api_key: String,

    // HubSpot endpoints
    /// Base URL of the CRM API.
    ///
    /// Environment variable: `HUBSPOT_BASE_URL`
    #[serde(default = "default_hubspot_base_url", alias = "HUBSPOT_BASE_URL")]
    pub hubspot_base_url: String,
    /// Provider consent page URL.
    ///
    /// Environment variable: `OAUTH_AUTHORIZE_URL`
    #[serde(default = "default_authorize_url", alias = "OAUTH_AUTHORIZE_URL")]
    pub oauth_authorize_url: String,
    /// Token endpoint URL.
    ///
    /// Environment variable: `OAUTH_TOKEN_URL`
    #[serde(default = "default_token_url", alias = "OAUTH_TOKEN_URL")]
    pub oauth_token_url: String,
    /// Redirect URI registered with the provider.
    ///
    /// Environment variable: `OAUTH_REDIRECT_URI`
    #[serde(default = "default_redirect_uri", alias = "OAUTH_REDIRECT_URI")]
    pub oauth_redirect_uri: String,
    /// Scopes requested during authorization.
    ///
    /// Environment variable: `OAUTH_SCOPES`
    #[serde(default = "default_scopes", alias = "OAUTH_SCOPES")]
    pub oauth_scopes: String,

    // Logging
    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Load configuration from defaults, config file, and environment
    /// variable overrides.
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (e.g., `CLIENT_ID`, `PORT`)
    /// 2. Configuration file (`config.toml`)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Convert to the CRM client configuration.
    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.hubspot_base_url.clone(),
            timeout: Duration::from_secs(self.request_timeout),
            user_agent: format!("Hublink/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Convert to the OAuth broker configuration.
    pub fn to_oauth_config(&self) -> OauthConfig {
        OauthConfig {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            authorize_url: self.oauth_authorize_url.clone(),
            token_url: self.oauth_token_url.clone(),
            redirect_uri: self.oauth_redirect_uri.clone(),
            scopes: self.oauth_scopes.clone(),
        }
    }

    /// Parse server socket address from host and port configuration.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Client secret masked for logging.
    pub fn client_secret_masked(&self) -> &'static str {
        if self.client_secret.is_empty() {
            "(unset)"
        } else {
            "***"
        }
    }

    /// API key masked for logging.
    pub fn hubspot_api_key_masked(&self) -> &'static str {
        if self.hubspot_api_key.is_empty() {
            "(unset)"
        } else {
            "***"
        }
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.request_timeout == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        if self.hubspot_base_url.is_empty() {
            anyhow::bail!("hubspot_base_url must not be empty");
        }

        if self.oauth_redirect_uri.is_empty() {
            anyhow::bail!("oauth_redirect_uri must not be empty");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            client_id: String::new(),
            client_secret: String::new(),
            hubspot_api_key: String::new(),
            hubspot_base_url: default_hubspot_base_url(),
            oauth_authorize_url: default_authorize_url(),
            oauth_token_url: default_token_url(),
            oauth_redirect_uri: default_redirect_uri(),
            oauth_scopes: default_scopes(),
            rust_log: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_hubspot_base_url() -> String {
    "https://api.hubapi.com".to_string()
}

fn default_authorize_url() -> String {
    "https://app.hubspot.com/oauth/authorize".to_string()
}

fn default_token_url() -> String {
    "https://api.hubapi.com/oauth/v1/token".to_string()
}

fn default_redirect_uri() -> String {
    "http://localhost:5000/callback".to_string()
}

fn default_scopes() -> String {
    "contacts".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, env, sync::Mutex};

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct TestEnvGuard {
        _lock: std::sync::MutexGuard<'static, ()>,
        vars: Vec<String>,
        originals: HashMap<String, Option<String>>,
    }

    impl TestEnvGuard {
        fn new() -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            Self { _lock: lock, vars: Vec::new(), originals: HashMap::new() }
        }

        fn set_var(&mut self, key: &str, value: &str) {
            if !self.vars.contains(&key.to_string()) {
                self.originals.insert(key.to_string(), env::var(key).ok());
                self.vars.push(key.to_string());
            }
            env::set_var(key, value);
        }
    }

    impl Drop for TestEnvGuard {
        fn drop(&mut self) {
            for var in &self.vars {
                match self.originals.get(var) {
                    Some(Some(value)) => env::set_var(var, value),
                    Some(None) => env::remove_var(var),
                    None => {},
                }
            }
        }
    }

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.port, 5000);
        assert_eq!(config.oauth_scopes, "contacts");
        assert_eq!(config.oauth_redirect_uri, "http://localhost:5000/callback");
        assert!(config.client_id.is_empty());
    }

    #[test]
    fn env_overrides_apply() {
        let mut guard = TestEnvGuard::new();
        guard.set_var("CLIENT_ID", "env-client");
        guard.set_var("CLIENT_SECRET", "env-secret");
        guard.set_var("HUBSPOT_API_KEY", "env-key");
        guard.set_var("PORT", "8081");
        guard.set_var("REQUEST_TIMEOUT", "10");

        let config = Config::load().expect("Config should load with env overrides");

        assert_eq!(config.client_id, "env-client");
        assert_eq!(config.client_secret, "env-secret");
        assert_eq!(config.hubspot_api_key, "env-key");
        assert_eq!(config.port, 8081);
        assert_eq!(config.request_timeout, 10);
    }

    #[test]
    fn invalid_config_validation_fails() {
        let mut config = Config::default();
        config.port = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.request_timeout = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.oauth_redirect_uri = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn secrets_are_masked_for_logging() {
        let mut config = Config::default();
        assert_eq!(config.client_secret_masked(), "(unset)");
        assert_eq!(config.hubspot_api_key_masked(), "(unset)");

        config.client_secret = "super-secret".to_string();
        config.hubspot_api_key = "pat-na1-key".to_string();
        assert_eq!(config.client_secret_masked(), "***");
        assert_eq!(config.hubspot_api_key_masked(), "***");
    }

    #[test]
    fn config_conversions_carry_endpoints() {
        let mut config = Config::default();
        config.client_id = "client-1".to_string();
        config.request_timeout = 12;

        let client_config = config.to_client_config();
        assert_eq!(client_config.base_url, "https://api.hubapi.com");
        assert_eq!(client_config.timeout.as_secs(), 12);

        let oauth_config = config.to_oauth_config();
        assert_eq!(oauth_config.client_id, "client-1");
        assert_eq!(oauth_config.token_url, "https://api.hubapi.com/oauth/v1/token");
        assert_eq!(oauth_config.redirect_uri, "http://localhost:5000/callback");
        assert_eq!(oauth_config.scopes, "contacts");
    }

    #[test]
    fn socket_address_parsing() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 9000;

        let addr = config.parse_server_addr().expect("Should parse socket address");

        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 9000);
    }
}
