//! Generation request validation and provider failure classification.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum prompt length in characters.
pub const MAX_PROMPT_LEN: usize = 2_000;

/// Images per request are bounded by the provider.
pub const MIN_IMAGES: i64 = 1;
pub const MAX_IMAGES: i64 = 4;

/// Maximum number of style references sent along with a prompt.
pub const MAX_STYLE_ITEMS: usize = 8;

/// Output sizes accepted by the image provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSize {
    #[default]
    SquareHd,
    Square,
    #[serde(rename = "portrait_4_3")]
    Portrait4x3,
    #[serde(rename = "portrait_16_9")]
    Portrait16x9,
    #[serde(rename = "landscape_4_3")]
    Landscape4x3,
    #[serde(rename = "landscape_16_9")]
    Landscape16x9,
}

impl ImageSize {
    /// Wire name, as stored in `generated_images.image_size`.
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSize::SquareHd => "square_hd",
            ImageSize::Square => "square",
            ImageSize::Portrait4x3 => "portrait_4_3",
            ImageSize::Portrait16x9 => "portrait_16_9",
            ImageSize::Landscape4x3 => "landscape_4_3",
            ImageSize::Landscape16x9 => "landscape_16_9",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.trim() {
            "square_hd" => Ok(ImageSize::SquareHd),
            "square" => Ok(ImageSize::Square),
            "portrait_4_3" => Ok(ImageSize::Portrait4x3),
            "portrait_16_9" => Ok(ImageSize::Portrait16x9),
            "landscape_4_3" => Ok(ImageSize::Landscape4x3),
            "landscape_16_9" => Ok(ImageSize::Landscape16x9),
            other => Err(CoreError::Validation(format!("Unknown image size '{other}'"))),
        }
    }

    /// Pixel dimensions `(width, height)`.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            ImageSize::SquareHd => (1024, 1024),
            ImageSize::Square => (512, 512),
            ImageSize::Portrait4x3 => (768, 1024),
            ImageSize::Portrait16x9 => (576, 1024),
            ImageSize::Landscape4x3 => (1024, 768),
            ImageSize::Landscape16x9 => (1024, 576),
        }
    }
}

/// Validate a prompt and return it trimmed.
pub fn validate_prompt(prompt: Option<&str>) -> Result<String, CoreError> {
    let prompt = prompt.map(str::trim).unwrap_or_default();
    if prompt.is_empty() {
        return Err(CoreError::Validation("Prompt is required".into()));
    }
    if prompt.chars().count() > MAX_PROMPT_LEN {
        return Err(CoreError::Validation(format!(
            "Prompt must be at most {MAX_PROMPT_LEN} characters"
        )));
    }
    Ok(prompt.to_string())
}

/// Validate the requested image count, defaulting to one.
pub fn validate_num_images(num_images: Option<i64>) -> Result<i64, CoreError> {
    let n = num_images.unwrap_or(MIN_IMAGES);
    if !(MIN_IMAGES..=MAX_IMAGES).contains(&n) {
        return Err(CoreError::Validation(format!(
            "num_images must be between {MIN_IMAGES} and {MAX_IMAGES}"
        )));
    }
    Ok(n)
}

/// Validate that a reference is an absolute http(s) URL.
///
/// Used for LoRA weights, garment and model photos passed to the provider.
pub fn validate_reference_url(field: &str, url: &str) -> Result<(), CoreError> {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(()),
        _ => Err(CoreError::Validation(format!(
            "{field} must be an absolute http(s) URL"
        ))),
    }
}

/// Validate the style references attached to a generation request.
pub fn validate_style_items(items: &[serde_json::Value]) -> Result<(), CoreError> {
    if items.len() > MAX_STYLE_ITEMS {
        return Err(CoreError::Validation(format!(
            "At most {MAX_STYLE_ITEMS} style items are allowed"
        )));
    }
    if items.iter().any(|item| !item.is_object()) {
        return Err(CoreError::Validation(
            "Each style item must be a JSON object".into(),
        ));
    }
    Ok(())
}

/// Fold style references into the prompt sent to the provider.
///
/// Each style item may carry a `prompt` fragment; fragments are appended in
/// order, separated by commas.
pub fn compose_prompt(prompt: &str, style_items: &[serde_json::Value]) -> String {
    let fragments: Vec<&str> = style_items
        .iter()
        .filter_map(|item| item.get("prompt").and_then(|p| p.as_str()))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if fragments.is_empty() {
        prompt.to_string()
    } else {
        format!("{prompt}, {}", fragments.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Provider failure classification
// ---------------------------------------------------------------------------

/// Category of a failed provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderFailure {
    /// The prompt or an input image was rejected by the provider's safety filter.
    ContentPolicy,
    /// The provider is throttling us.
    RateLimited,
    /// The provider rejected the request parameters.
    InvalidParameters,
    /// Anything else: network failure, 5xx, unparseable response.
    Unknown,
}

const CONTENT_POLICY_MARKERS: &[&str] = &[
    "content policy",
    "content_policy",
    "nsfw",
    "safety",
    "flagged",
];

impl ProviderFailure {
    /// Classify a provider response by HTTP status and body text.
    ///
    /// Safety rejections are recognised from the body first, since providers
    /// report them with either 400 or 422.
    pub fn classify(status: Option<u16>, body: &str) -> Self {
        let lowered = body.to_ascii_lowercase();
        if CONTENT_POLICY_MARKERS.iter().any(|m| lowered.contains(m)) {
            return ProviderFailure::ContentPolicy;
        }
        match status {
            Some(429) => ProviderFailure::RateLimited,
            Some(400) | Some(422) => ProviderFailure::InvalidParameters,
            _ => ProviderFailure::Unknown,
        }
    }

    /// Machine-readable error code returned to clients.
    pub fn code(self) -> &'static str {
        match self {
            ProviderFailure::ContentPolicy => "CONTENT_POLICY_VIOLATION",
            ProviderFailure::RateLimited => "RATE_LIMITED",
            ProviderFailure::InvalidParameters => "INVALID_PARAMETERS",
            ProviderFailure::Unknown => "GENERATION_FAILED",
        }
    }

    /// Human-readable message returned to clients.
    pub fn message(self) -> &'static str {
        match self {
            ProviderFailure::ContentPolicy => {
                "The request was rejected by the content policy. Please adjust your prompt or images."
            }
            ProviderFailure::RateLimited => {
                "The image service is busy. Please wait a moment and try again."
            }
            ProviderFailure::InvalidParameters => {
                "The image service rejected the request parameters."
            }
            ProviderFailure::Unknown => "Image generation failed. No credits were charged.",
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_prompt_is_rejected_with_fixed_message() {
        for prompt in [None, Some(""), Some("   \n")] {
            let err = validate_prompt(prompt).unwrap_err();
            assert_matches!(err, CoreError::Validation(ref msg) if msg == "Prompt is required");
        }
    }

    #[test]
    fn prompt_is_trimmed() {
        assert_eq!(validate_prompt(Some("  red dress  ")).unwrap(), "red dress");
    }

    #[test]
    fn overlong_prompt_is_rejected() {
        let long = "a".repeat(MAX_PROMPT_LEN + 1);
        assert!(validate_prompt(Some(&long)).is_err());
        let exact = "a".repeat(MAX_PROMPT_LEN);
        assert!(validate_prompt(Some(&exact)).is_ok());
    }

    #[test]
    fn image_count_defaults_and_bounds() {
        assert_eq!(validate_num_images(None).unwrap(), 1);
        assert_eq!(validate_num_images(Some(4)).unwrap(), 4);
        assert!(validate_num_images(Some(0)).is_err());
        assert!(validate_num_images(Some(5)).is_err());
    }

    #[test]
    fn image_size_wire_names() {
        let size: ImageSize = serde_json::from_value(json!("portrait_4_3")).unwrap();
        assert_eq!(size, ImageSize::Portrait4x3);
        assert_eq!(size.as_str(), "portrait_4_3");
        assert_eq!(serde_json::to_value(ImageSize::SquareHd).unwrap(), json!("square_hd"));
        assert_eq!(ImageSize::Landscape16x9.dimensions(), (1024, 576));
        assert_eq!(ImageSize::parse("square").unwrap(), ImageSize::Square);
        assert!(ImageSize::parse("huge").is_err());
    }

    #[test]
    fn reference_urls_must_be_http() {
        let lora = "https://cdn.example.com/a.safetensors";
        assert!(validate_reference_url("lora_url", lora).is_ok());
        assert!(validate_reference_url("lora_url", "http://host/x").is_ok());
        assert!(validate_reference_url("lora_url", "ftp://host/x").is_err());
        assert!(validate_reference_url("lora_url", "https://").is_err());
        assert!(validate_reference_url("lora_url", "not a url").is_err());
    }

    #[test]
    fn style_items_limited_and_must_be_objects() {
        assert!(validate_style_items(&[json!({"name": "minimal"})]).is_ok());
        assert!(validate_style_items(&[json!("minimal")]).is_err());
        let many = vec![json!({}); MAX_STYLE_ITEMS + 1];
        assert!(validate_style_items(&many).is_err());
    }

    #[test]
    fn style_prompts_are_appended() {
        let items = [
            json!({"name": "studio", "prompt": "softbox lighting"}),
            json!({"name": "no-prompt"}),
            json!({"prompt": "  editorial  "}),
        ];
        assert_eq!(
            compose_prompt("model in a trench coat", &items),
            "model in a trench coat, softbox lighting, editorial"
        );
        assert_eq!(compose_prompt("plain", &[]), "plain");
    }

    #[test]
    fn classify_content_policy_from_body() {
        assert_eq!(
            ProviderFailure::classify(Some(400), r#"{"detail":"Content policy violation"}"#),
            ProviderFailure::ContentPolicy
        );
        assert_eq!(
            ProviderFailure::classify(Some(422), "image flagged as NSFW"),
            ProviderFailure::ContentPolicy
        );
    }

    #[test]
    fn classify_by_status() {
        assert_eq!(ProviderFailure::classify(Some(429), ""), ProviderFailure::RateLimited);
        assert_eq!(
            ProviderFailure::classify(Some(422), "image_size invalid"),
            ProviderFailure::InvalidParameters
        );
        assert_eq!(ProviderFailure::classify(Some(503), "down"), ProviderFailure::Unknown);
        assert_eq!(ProviderFailure::classify(None, "timeout"), ProviderFailure::Unknown);
    }

    #[test]
    fn failure_codes_are_distinct() {
        let codes = [
            ProviderFailure::ContentPolicy.code(),
            ProviderFailure::RateLimited.code(),
            ProviderFailure::InvalidParameters.code(),
            ProviderFailure::Unknown.code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
