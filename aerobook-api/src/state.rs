use aerobook_store::app_config::Config;
use aerobook_store::BackendClient;

use crate::upstream::Upstream;

#[derive(Clone)]
pub struct AppState {
    /// Raw pass-through to the flights/bookings backend
    pub backend: Upstream,
    /// Typed client over the same backend
    pub client: BackendClient,
    pub ai: Upstream,
    pub ai_fallback: bool,
}

impl AppState {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            backend: Upstream::new("backend", &config.backend.url, config.backend.timeout())?,
            client: BackendClient::new(&config.backend)?,
            ai: Upstream::new("ai", &config.ai.url, config.ai.timeout())?,
            ai_fallback: config.ai.synthetic_fallback,
        })
    }
}
