//! Request and response payloads exchanged with the provider.

use modiste_core::generation::ImageSize;
use serde::{Deserialize, Serialize};

/// A LoRA weight reference passed straight through to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoraRef {
    pub path: String,
    #[serde(default = "default_lora_scale")]
    pub scale: f64,
}

fn default_lora_scale() -> f64 {
    1.0
}

/// Parameters for a text-to-image generation.
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub prompt: String,
    pub image_size: ImageSize,
    pub num_images: i64,
    pub loras: Vec<LoraRef>,
    pub seed: Option<i64>,
}

/// Parameters for a virtual try-on composite.
#[derive(Debug, Clone)]
pub struct TryOnParams {
    /// Photo of the model persona.
    pub model_image_url: String,
    /// Photo of the garment to put on the model.
    pub garment_image_url: String,
    /// Garment category (`top`, `bottom`, `dress`, `outerwear`).
    pub category: String,
}

/// One image returned by the provider.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProviderImage {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Successful provider response.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationOutput {
    pub images: Vec<ProviderImage>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub seed: Option<i64>,
}

/// Wire body for `POST /generate`.
#[derive(Debug, Serialize)]
pub(crate) struct GenerateBody<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub image_size: ImageSize,
    pub num_images: i64,
    #[serde(skip_serializing_if = "no_loras")]
    pub loras: &'a [LoraRef],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

fn no_loras(loras: &&[LoraRef]) -> bool {
    loras.is_empty()
}

/// Wire body for `POST /try-on`.
#[derive(Debug, Serialize)]
pub(crate) struct TryOnBody<'a> {
    pub model_image_url: &'a str,
    pub garment_image_url: &'a str,
    pub category: &'a str,
}
