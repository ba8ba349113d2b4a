//! Configuration and temporary storage management.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MAX_FILE_SIZE_MB: u64 = 10;
const DEFAULT_ALLOWED_EXTENSIONS: &str = "txt";
const DEFAULT_TEMP_DIR: &str = "./static/temp";
const DEFAULT_RETENTION_HOURS: u64 = 24;
const DEFAULT_MAX_JOBS: usize = 1000;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;
const BYTES_PER_MB: u64 = 1024 * 1024;

/// Limits applied to every upload before any processing happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadLimits {
    /// Ceiling in megabytes, as configured.
    pub max_file_size_mb: u64,
    /// Lowercase extensions without the leading dot.
    pub allowed_extensions: Vec<String>,
}

impl UploadLimits {
    pub fn new(max_file_size_mb: u64, allowed_extensions: &[&str]) -> Self {
        Self {
            max_file_size_mb,
            allowed_extensions: allowed_extensions
                .iter()
                .map(|e| normalize_extension(e))
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(BYTES_PER_MB)
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE_MB, &[DEFAULT_ALLOWED_EXTENSIONS])
    }
}

/// How long finished jobs (and their artifacts) are kept around.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Terminal jobs older than this are swept.
    pub job_ttl: Duration,
    /// Upper bound on the number of jobs held in memory.
    pub max_jobs: usize,
    /// Period of the background sweeper.
    pub sweep_interval: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            job_ttl: Duration::from_secs(DEFAULT_RETENTION_HOURS * 3600),
            max_jobs: DEFAULT_MAX_JOBS,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

/// Top-level DocForge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocForgeConfig {
    /// Interface the HTTP server binds to.
    pub host: String,
    /// HTTP server port.
    pub port: u16,
    pub limits: UploadLimits,
    /// Root directory for generated artifacts (one subdirectory per job).
    pub temp_storage_path: PathBuf,
    pub retention: RetentionPolicy,
}

impl DocForgeConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("DOCFORGE_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup("DOCFORGE_PORT") {
            Some(_) => parse_or("DOCFORGE_PORT", &lookup, DEFAULT_PORT),
            None => parse_or("PORT", &lookup, DEFAULT_PORT),
        };

        let max_file_size_mb =
            parse_or("DOCFORGE_MAX_FILE_SIZE_MB", &lookup, DEFAULT_MAX_FILE_SIZE_MB);
        if max_file_size_mb == 0 {
            return Err(Error::Config(
                "DOCFORGE_MAX_FILE_SIZE_MB must be greater than zero".into(),
            ));
        }
        if max_file_size_mb.checked_mul(BYTES_PER_MB).is_none() {
            return Err(Error::Config(format!(
                "DOCFORGE_MAX_FILE_SIZE_MB is too large: {}",
                max_file_size_mb
            )));
        }

        let extensions = lookup("DOCFORGE_ALLOWED_EXTENSIONS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_EXTENSIONS.to_string());
        let extensions: Vec<&str> = extensions.split(',').collect();
        let limits = UploadLimits::new(max_file_size_mb, &extensions);
        if limits.allowed_extensions.is_empty() {
            return Err(Error::Config(
                "DOCFORGE_ALLOWED_EXTENSIONS must name at least one extension".into(),
            ));
        }

        let temp_storage_path = lookup("DOCFORGE_TEMP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMP_DIR));

        let retention_hours =
            parse_or("DOCFORGE_JOB_RETENTION_HOURS", &lookup, DEFAULT_RETENTION_HOURS);
        let retention_secs = retention_hours.checked_mul(3600).ok_or_else(|| {
            Error::Config(format!(
                "DOCFORGE_JOB_RETENTION_HOURS is too large: {}",
                retention_hours
            ))
        })?;
        let max_jobs = parse_or("DOCFORGE_MAX_JOBS", &lookup, DEFAULT_MAX_JOBS);
        if max_jobs == 0 {
            return Err(Error::Config("DOCFORGE_MAX_JOBS must be greater than zero".into()));
        }
        let sweep_secs = parse_or(
            "DOCFORGE_SWEEP_INTERVAL_SECS",
            &lookup,
            DEFAULT_SWEEP_INTERVAL_SECS,
        )
        .max(1);

        Ok(Self {
            host,
            port,
            limits,
            temp_storage_path,
            retention: RetentionPolicy {
                job_ttl: Duration::from_secs(retention_secs),
                max_jobs,
                sweep_interval: Duration::from_secs(sweep_secs),
            },
        })
    }

    /// Configuration rooted at a given storage directory, everything else default.
    pub fn with_storage(temp_storage_path: impl AsRef<Path>) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            limits: UploadLimits::default(),
            temp_storage_path: temp_storage_path.as_ref().to_path_buf(),
            retention: RetentionPolicy::default(),
        }
    }

    /// `host:port` string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Create the temporary storage directory if needed.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.temp_storage_path)
    }
}

/// Lowercase an extension and strip surrounding whitespace and a leading dot.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

fn parse_or<T: FromStr>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> T {
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring invalid value for {}: {:?}", key, raw);
                default
            }
        },
        None => default,
    }
}
