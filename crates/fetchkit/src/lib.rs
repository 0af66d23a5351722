//! # fetchkit
//!
//! Checksum-verified file downloads with atomic placement.
//!
//! A fetch downloads into memory, verifies the SHA-256 digest, writes to a
//! temp file next to the destination and renames it into place. A failed
//! fetch never leaves a file at the destination.
//!
//! ## Example
//!
//! ```no_run
//! use fetchkit::Fetcher;
//! use std::path::Path;
//!
//! let fetcher = Fetcher::new();
//! let dest = Path::new("/Library/Fonts/Hack-Regular.ttf");
//! let sha = "0c2604631b1f055041c68a0e09ae4801acab6c5072ba2db6a822f53c3f8290ac";
//! if !fetcher.matches(dest, Some(sha))? {
//!     fetcher.fetch("https://example.com/Hack-Regular.ttf", dest, Some(sha))?;
//! }
//! # Ok::<(), fetchkit::Error>(())
//! ```

#![warn(missing_docs)]

pub mod checksum;
pub mod error;

pub use checksum::{Checksum, sha256_file, sha256_hex};
pub use error::{Error, ErrorCategory, Result};

use std::fs;
use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Maximum download size (assets are fonts, images and widgets).
const MAX_BODY_SIZE: u64 = 200 * 1024 * 1024;

const USER_AGENT: &str = concat!("fetchkit/", env!("CARGO_PKG_VERSION"));

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry, doubled after each attempt
    pub base_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(attempt))
            .min(self.max_delay)
    }
}

/// Downloads files over http(s) or copies them from `file://` URLs.
pub struct Fetcher {
    agent: ureq::Agent,
    retry: RetryConfig,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    /// Create a fetcher with default retry settings.
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
            retry: RetryConfig::default(),
        }
    }

    /// Use a custom retry configuration.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch `url` to `dest`, verifying `checksum` when given.
    ///
    /// The parent directory of `dest` must already exist.
    pub fn fetch(&self, url: &str, dest: &Path, checksum: Option<&str>) -> Result<()> {
        let expected = checksum.map(Checksum::parse).transpose()?;
        let bytes = self.download_with_retry(url)?;

        if let Some(expected) = &expected {
            let actual = sha256_hex(&bytes);
            if !expected.matches_hex(&actual) {
                return Err(Error::ChecksumMismatch {
                    url: url.to_string(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        place(&bytes, dest)?;
        log::info!("fetched {url} to {} ({} bytes)", dest.display(), bytes.len());
        Ok(())
    }

    /// Check whether `dest` exists and, when a checksum is given, matches it.
    pub fn matches(&self, dest: &Path, checksum: Option<&str>) -> Result<bool> {
        if !dest.is_file() {
            return Ok(false);
        }
        match checksum {
            None => Ok(true),
            Some(checksum) => {
                let expected = Checksum::parse(checksum)?;
                Ok(expected.matches_hex(&sha256_file(dest)?))
            }
        }
    }

    fn download_with_retry(&self, url: &str) -> Result<Vec<u8>> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            let err = match self.download(url) {
                Ok(bytes) => return Ok(bytes),
                Err(e) => e,
            };

            attempt += 1;
            if !err.is_retryable() || attempt >= max_attempts {
                return Err(err);
            }
            let delay = self.retry.delay_for_attempt(attempt - 1);
            log::warn!(
                "attempt {attempt}/{max_attempts} failed: {err}. Retrying in {}s",
                delay.as_secs()
            );
            thread::sleep(delay);
        }
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        if let Some(path) = url.strip_prefix("file://") {
            return fs::read(path).map_err(|e| Error::io(path, e));
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(Error::UnsupportedScheme(url.to_string()));
        }

        log::debug!("GET {url}");
        let mut response = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| Error::from_ureq(url, e))?;

        response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_SIZE)
            .read_to_vec()
            .map_err(|e| Error::from_ureq(url, e))
    }
}

/// Write `bytes` to a temp file beside `dest`, then rename it into place.
fn place(bytes: &[u8], dest: &Path) -> Result<()> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| Error::io(tmp.path(), e))?;
    tmp.persist(dest).map_err(|e| Error::io(dest, e.error))?;
    Ok(())
}
