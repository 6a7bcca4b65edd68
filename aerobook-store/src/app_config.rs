use aerobook_core::PricingConfig;
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub ai: AiConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub url: String,
    /// 0 disables the timeout
    #[serde(default)]
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    pub url: String,
    #[serde(default)]
    pub request_timeout_seconds: u64,
    /// Answer with locally generated data when the AI service fails
    #[serde(default = "default_true")]
    pub synthetic_fallback: bool,
}

fn default_true() -> bool { true }

impl BackendConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.request_timeout_seconds > 0).then(|| Duration::from_secs(self.request_timeout_seconds))
    }
}

impl AiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.request_timeout_seconds > 0).then(|| Duration::from_secs(self.request_timeout_seconds))
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Self::builder(
            "config",
            &run_mode,
            config::Environment::with_prefix("AEROBOOK").separator("__").try_parsing(true),
            env::var("BACKEND_URL").ok(),
            env::var("AI_SERVICE_URL").ok(),
        )?
        .build()?
        .try_deserialize()
    }

    /// Layering: built-in defaults, `{dir}/default`, `{dir}/{run_mode}`,
    /// `{dir}/local`, prefixed environment, then the two service URL variables.
    pub fn builder(
        dir: &str,
        run_mode: &str,
        environment: config::Environment,
        backend_url: Option<String>,
        ai_service_url: Option<String>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("server.port", 3001)?
            .set_default("backend.url", "http://localhost:5000")?
            .set_default("backend.request_timeout_seconds", 30)?
            .set_default("ai.url", "http://localhost:8000")?
            .set_default("ai.request_timeout_seconds", 10)?
            .set_default("ai.synthetic_fallback", true)?
            .add_source(config::File::with_name(&format!("{}/default", dir)).required(false))
            .add_source(config::File::with_name(&format!("{}/{}", dir, run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name(&format!("{}/local", dir)).required(false))
            // Eg.. `AEROBOOK__SERVER__PORT=8080`
            .add_source(environment)
            .set_override_option("backend.url", backend_url.filter(|u| !u.is_empty()))?
            .set_override_option("ai.url", ai_service_url.filter(|u| !u.is_empty()))
    }
}
