use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub max_upload_bytes: usize,
    /// Replaces the built-in placeholder served for posts without an image.
    pub fallback_image: Option<PathBuf>,
    /// Single allowed CORS origin; `None` allows any origin.
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("SCRIBE_PORT") {
            Some(raw) => raw.parse().with_context(|| format!("SCRIBE_PORT: invalid port {:?}", raw))?,
            None => 8080,
        };
        let max_upload_bytes = match lookup("SCRIBE_MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("SCRIBE_MAX_UPLOAD_BYTES: invalid size {:?}", raw))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            host: lookup("SCRIBE_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: lookup("SCRIBE_DB_PATH").unwrap_or_else(|| "scribe.db".into()).into(),
            max_upload_bytes,
            fallback_image: lookup("SCRIBE_FALLBACK_IMAGE").filter(|v| !v.is_empty()).map(PathBuf::from),
            cors_origin: lookup("SCRIBE_CORS_ORIGIN").filter(|v| !v.is_empty()),
        })
    }
}
