//! Product catalog rules, pagination clamps and upload checks.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Maximum number of tags on a product.
pub const MAX_TAGS: usize = 20;

/// Maximum length of a single tag.
pub const MAX_TAG_LEN: usize = 40;

/// Maximum product name length.
pub const MAX_PRODUCT_NAME_LEN: usize = 120;

/// Garment type, stored as text in `products.product_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Top,
    Bottom,
    Dress,
    Outerwear,
}

impl ProductType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductType::Top => "top",
            ProductType::Bottom => "bottom",
            ProductType::Dress => "dress",
            ProductType::Outerwear => "outerwear",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(ProductType::Top),
            "bottom" => Ok(ProductType::Bottom),
            "dress" => Ok(ProductType::Dress),
            "outerwear" => Ok(ProductType::Outerwear),
            other => Err(CoreError::Validation(format!(
                "Unknown product type '{other}'. Expected top, bottom, dress or outerwear"
            ))),
        }
    }
}

/// Validate and trim a product name.
pub fn validate_product_name(name: &str) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("Product name is required".into()));
    }
    if name.chars().count() > MAX_PRODUCT_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Product name must be at most {MAX_PRODUCT_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Normalise a tag list: trim, lowercase, drop empties and duplicates.
///
/// Order of first occurrence is preserved.
pub fn normalize_tags<I, S>(tags: I) -> Result<Vec<String>, CoreError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if tag.is_empty() || out.contains(&tag) {
            continue;
        }
        if tag.chars().count() > MAX_TAG_LEN {
            return Err(CoreError::Validation(format!(
                "Tags must be at most {MAX_TAG_LEN} characters"
            )));
        }
        out.push(tag);
    }
    if out.len() > MAX_TAGS {
        return Err(CoreError::Validation(format!(
            "At most {MAX_TAGS} tags are allowed"
        )));
    }
    Ok(out)
}

/// Parse a comma-separated tag string, as sent in multipart forms.
pub fn parse_tag_list(raw: &str) -> Result<Vec<String>, CoreError> {
    normalize_tags(raw.split(','))
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Clamp a user-provided limit to `[1, max]`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Resolve the row offset from either an explicit offset or a 1-based page.
///
/// An explicit `offset` wins when both are supplied.
pub fn resolve_offset(page: Option<i64>, offset: Option<i64>, limit: i64) -> i64 {
    match (offset, page) {
        (Some(_), _) => clamp_offset(offset),
        (None, Some(page)) => (page.max(1) - 1).saturating_mul(limit),
        (None, None) => 0,
    }
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

/// Content types accepted for garment uploads.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Default upload size cap (10 MiB).
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Facts about an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadInfo {
    /// File extension matching the detected format (`jpg`, `png`, `webp`).
    pub extension: &'static str,
    pub width: u32,
    pub height: u32,
}

/// File extension for an accepted content type.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Check an uploaded image against the declared content type and size cap.
///
/// The bytes are sniffed so a renamed file cannot slip through, and the
/// dimensions are read from the header without decoding pixels.
pub fn validate_upload(
    content_type: &str,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<UploadInfo, CoreError> {
    if bytes.is_empty() {
        return Err(CoreError::Validation("Uploaded file is empty".into()));
    }
    if bytes.len() > max_bytes {
        return Err(CoreError::Validation(format!(
            "File is too large. Maximum size is {} MB",
            max_bytes / (1024 * 1024)
        )));
    }

    let declared = extension_for(content_type).ok_or_else(|| {
        CoreError::Validation("Only JPEG, PNG and WebP images are allowed".into())
    })?;

    let detected = match image::guess_format(bytes) {
        Ok(image::ImageFormat::Jpeg) => "jpg",
        Ok(image::ImageFormat::Png) => "png",
        Ok(image::ImageFormat::WebP) => "webp",
        _ => {
            return Err(CoreError::Validation(
                "Only JPEG, PNG and WebP images are allowed".into(),
            ))
        }
    };
    if detected != declared {
        return Err(CoreError::Validation(format!(
            "File content does not match declared type {content_type}"
        )));
    }

    let (width, height) = image::ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CoreError::Validation(format!("Unreadable image: {e}")))?
        .into_dimensions()
        .map_err(|e| CoreError::Validation(format!("Unreadable image: {e}")))?;

    Ok(UploadInfo {
        extension: detected,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use assert_matches::assert_matches;

    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::new(width, height));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn product_type_parse() {
        assert_eq!(ProductType::parse("Dress").unwrap(), ProductType::Dress);
        assert_eq!(ProductType::parse(" outerwear ").unwrap(), ProductType::Outerwear);
        assert_matches!(ProductType::parse("shoes"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn tags_are_normalised() {
        let tags = normalize_tags(["  Linen", "summer", "linen", "", "SUMMER "]).unwrap();
        assert_eq!(tags, vec!["linen", "summer"]);
    }

    #[test]
    fn tag_limits_enforced() {
        let many: Vec<String> = (0..=MAX_TAGS).map(|i| format!("t{i}")).collect();
        assert!(normalize_tags(&many).is_err());
        assert!(normalize_tags([&"x".repeat(MAX_TAG_LEN + 1)]).is_err());
    }

    #[test]
    fn tag_list_from_form_field() {
        assert_eq!(parse_tag_list("denim, Blue ,,denim").unwrap(), vec!["denim", "blue"]);
    }

    #[test]
    fn clamp_limit_behaviour() {
        assert_eq!(clamp_limit(None, 20, 100), 20);
        assert_eq!(clamp_limit(Some(200), 20, 100), 100);
        assert_eq!(clamp_limit(Some(0), 20, 100), 1);
        assert_eq!(clamp_limit(Some(50), 20, 100), 50);
    }

    #[test]
    fn offset_from_page_or_offset() {
        assert_eq!(resolve_offset(None, None, 20), 0);
        assert_eq!(resolve_offset(Some(3), None, 20), 40);
        assert_eq!(resolve_offset(Some(0), None, 20), 0);
        assert_eq!(resolve_offset(Some(3), Some(5), 20), 5);
        assert_eq!(resolve_offset(None, Some(-5), 20), 0);
    }

    #[test]
    fn accepts_matching_png() {
        let bytes = png_bytes(3, 2);
        let info = validate_upload("image/png", &bytes, DEFAULT_UPLOAD_MAX_BYTES).unwrap();
        assert_eq!(
            info,
            UploadInfo {
                extension: "png",
                width: 3,
                height: 2
            }
        );
    }

    #[test]
    fn rejects_disallowed_content_type() {
        let bytes = png_bytes(1, 1);
        assert!(validate_upload("image/gif", &bytes, DEFAULT_UPLOAD_MAX_BYTES).is_err());
    }

    #[test]
    fn rejects_mismatched_content() {
        let bytes = png_bytes(1, 1);
        assert!(validate_upload("image/jpeg", &bytes, DEFAULT_UPLOAD_MAX_BYTES).is_err());
        assert!(validate_upload("image/png", b"not an image", DEFAULT_UPLOAD_MAX_BYTES).is_err());
    }

    #[test]
    fn rejects_oversized_and_empty() {
        let bytes = png_bytes(4, 4);
        assert!(validate_upload("image/png", &bytes, bytes.len() - 1).is_err());
        assert!(validate_upload("image/png", &[], DEFAULT_UPLOAD_MAX_BYTES).is_err());
    }
}
