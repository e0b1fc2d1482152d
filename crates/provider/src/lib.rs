//! Client library for the hosted image-generation service.
//!
//! Exposes an [`ImageProvider`] trait so the API layer can be exercised with
//! a stand-in provider, and [`HttpImageProvider`], the REST implementation
//! used in production.

pub mod api;
pub mod config;
pub mod error;
pub mod types;

pub use api::{HttpImageProvider, ImageProvider};
pub use config::ProviderConfig;
pub use error::ProviderError;
pub use types::{GenerateParams, GenerationOutput, LoraRef, ProviderImage, TryOnParams};
