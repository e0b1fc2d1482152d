/// Connection settings for the image provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the provider REST API, without a trailing slash.
    pub base_url: String,
    /// API key sent as `Authorization: Key <api_key>`.
    pub api_key: String,
    /// Model identifier forwarded with generation requests.
    pub model: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Default per-request timeout in seconds. Generation is slow.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

impl ProviderConfig {
    /// Load provider configuration from environment variables.
    ///
    /// | Env Var                 | Default                  |
    /// |-------------------------|--------------------------|
    /// | `PROVIDER_BASE_URL`     | `http://localhost:8188`  |
    /// | `PROVIDER_API_KEY`      | empty                    |
    /// | `PROVIDER_MODEL`        | `flux-dev`               |
    /// | `PROVIDER_TIMEOUT_SECS` | `120`                    |
    pub fn from_env() -> Self {
        let base_url = std::env::var("PROVIDER_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8188".into())
            .trim_end_matches('/')
            .to_string();

        let api_key = std::env::var("PROVIDER_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("PROVIDER_API_KEY is not set; provider calls will be unauthenticated");
        }

        let model = std::env::var("PROVIDER_MODEL").unwrap_or_else(|_| "flux-dev".into());

        let timeout_secs: u64 = std::env::var("PROVIDER_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("PROVIDER_TIMEOUT_SECS must be a valid u64");

        Self {
            base_url,
            api_key,
            model,
            timeout_secs,
        }
    }
}
