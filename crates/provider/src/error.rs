use modiste_core::generation::ProviderFailure;

/// Errors from the provider REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The provider answered 2xx but the payload was unusable.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Classify this error for client-facing reporting.
    pub fn failure(&self) -> ProviderFailure {
        match self {
            ProviderError::Api { status, body } => ProviderFailure::classify(Some(*status), body),
            ProviderError::Request(err) => {
                ProviderFailure::classify(err.status().map(|s| s.as_u16()), "")
            }
            ProviderError::InvalidResponse(_) => ProviderFailure::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_are_classified() {
        let err = ProviderError::Api {
            status: 429,
            body: "slow down".into(),
        };
        assert_eq!(err.failure(), ProviderFailure::RateLimited);

        let err = ProviderError::Api {
            status: 400,
            body: r#"{"error":"Prompt violates content policy"}"#.into(),
        };
        assert_eq!(err.failure(), ProviderFailure::ContentPolicy);
    }

    #[test]
    fn invalid_response_is_unknown() {
        let err = ProviderError::InvalidResponse("no images".into());
        assert_eq!(err.failure(), ProviderFailure::Unknown);
    }
}
