use std::path::PathBuf;

use modiste_core::catalog::DEFAULT_UPLOAD_MAX_BYTES;
use modiste_core::credits::DEFAULT_SIGNUP_CREDITS;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `180`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Emails provisioned with the admin role at registration (lowercased).
    pub admin_emails: Vec<String>,
    /// Opening balance for regular accounts.
    pub signup_credits: i64,
    /// Directory uploaded files are written to and served from `/uploads`.
    pub upload_dir: PathBuf,
    /// Largest accepted upload in bytes.
    pub upload_max_bytes: usize,
    /// Externally reachable origin of this server, used to turn stored
    /// `/uploads/...` paths into URLs the image provider can fetch.
    pub public_base_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `180`                      |
    /// | `ADMIN_EMAILS`         | empty                      |
    /// | `SIGNUP_CREDITS`       | `10`                       |
    /// | `UPLOAD_DIR`           | `./uploads`                |
    /// | `UPLOAD_MAX_BYTES`     | `10485760` (10 MiB)        |
    /// | `PUBLIC_BASE_URL`      | `http://localhost:3000`    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = split_list(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        // Generation calls can take a while; keep this above the provider timeout.
        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "180".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();

        let admin_emails: Vec<String> =
            split_list(&std::env::var("ADMIN_EMAILS").unwrap_or_default())
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect();

        let signup_credits: i64 = std::env::var("SIGNUP_CREDITS")
            .unwrap_or_else(|_| DEFAULT_SIGNUP_CREDITS.to_string())
            .parse()
            .expect("SIGNUP_CREDITS must be a valid i64");

        let upload_dir =
            PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".into()));

        let upload_max_bytes: usize = std::env::var("UPLOAD_MAX_BYTES")
            .unwrap_or_else(|_| DEFAULT_UPLOAD_MAX_BYTES.to_string())
            .parse()
            .expect("UPLOAD_MAX_BYTES must be a valid usize");

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            admin_emails,
            signup_credits,
            upload_dir,
            upload_max_bytes,
            public_base_url,
        }
    }

    /// Resolve a stored asset path to a URL reachable from outside.
    ///
    /// Absolute URLs are returned unchanged.
    pub fn public_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.public_base_url, path.trim_start_matches('/'))
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
