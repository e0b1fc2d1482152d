//! REST client for the hosted image-generation API.
//!
//! Wraps the provider's HTTP endpoints (text-to-image generation and
//! virtual try-on) using [`reqwest`]. Calls are made once: there is no retry
//! and no idempotency key, so a dropped connection surfaces as an error.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::types::{GenerateBody, GenerateParams, GenerationOutput, TryOnBody, TryOnParams};

/// Image generation backend used by the API layer.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generate images from a prompt.
    async fn generate(&self, params: &GenerateParams) -> Result<GenerationOutput, ProviderError>;

    /// Composite a garment onto a model photo.
    async fn virtual_try_on(
        &self,
        params: &TryOnParams,
    ) -> Result<GenerationOutput, ProviderError>;
}

/// HTTP client for the provider REST API.
pub struct HttpImageProvider {
    client: reqwest::Client,
    config: ProviderConfig,
}

impl HttpImageProvider {
    /// Create a new API client.
    pub fn new(config: ProviderConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling).
    pub fn with_client(client: reqwest::Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url)
    }

    async fn post_json<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<GenerationOutput, ProviderError> {
        let mut request = self
            .client
            .post(self.url(path))
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .json(body);
        if !self.config.api_key.is_empty() {
            request = request.header(
                reqwest::header::AUTHORIZATION,
                format!("Key {}", self.config.api_key),
            );
        }

        let response = request.send().await?;
        let output: GenerationOutput = Self::parse_response(response).await?;

        if output.images.is_empty() {
            return Err(ProviderError::InvalidResponse(
                "provider returned no images".into(),
            ));
        }
        Ok(output)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or a [`ProviderError::Api`] containing the
    /// status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        let response = Self::ensure_success(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ImageProvider for HttpImageProvider {
    async fn generate(&self, params: &GenerateParams) -> Result<GenerationOutput, ProviderError> {
        let body = GenerateBody {
            model: &self.config.model,
            prompt: &params.prompt,
            image_size: params.image_size,
            num_images: params.num_images,
            loras: &params.loras,
            seed: params.seed,
        };

        tracing::debug!(
            model = %self.config.model,
            image_size = params.image_size.as_str(),
            num_images = params.num_images,
            loras = params.loras.len(),
            "Submitting generation request",
        );

        self.post_json("generate", &body).await
    }

    async fn virtual_try_on(
        &self,
        params: &TryOnParams,
    ) -> Result<GenerationOutput, ProviderError> {
        let body = TryOnBody {
            model_image_url: &params.model_image_url,
            garment_image_url: &params.garment_image_url,
            category: &params.category,
        };

        tracing::debug!(category = %params.category, "Submitting try-on request");

        self.post_json("try-on", &body).await
    }
}
