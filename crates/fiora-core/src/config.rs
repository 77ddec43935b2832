//! Runtime configuration, read from the environment at bootstrap.

use std::time::Duration;

/// Connection settings for the CUA (computer-use agent) cloud service.
#[derive(Debug, Clone)]
pub struct CuaConfig {
    /// API base URL, e.g. `https://api.trycua.com/v1`.
    pub base_url: String,
    /// Bearer credential. Empty means "not configured" — workflow
    /// submission is rejected until it is set.
    pub api_key: String,
}

impl CuaConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("CUA_BASE_URL")
                .unwrap_or_else(|_| "https://api.trycua.com/v1".to_string()),
            api_key: std::env::var("CUA_API_KEY").unwrap_or_default(),
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub cua: CuaConfig,
    /// Default SAP Fiori launchpad URL, overridable per request.
    pub sap_fiori_url: String,
    /// Fixed grace period after the initial navigation. There is no
    /// readiness signal from the agent, only this wait.
    pub page_load_grace: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            cua: CuaConfig::from_env(),
            sap_fiori_url: std::env::var("SAP_FIORI_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            page_load_grace: Duration::from_secs(3),
        }
    }
}
