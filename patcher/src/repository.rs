//! Artifact repository base URL.
//!
//! Coordinates are resolved against a Maven-layout repository; Maven Central
//! is used unless another base URL is configured.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Base URL of Maven Central's repository layout.
pub const MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2";

/// Errors arising from an unusable repository URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryUrlError {
    /// The URL does not use the `http` or `https` scheme.
    #[error("repository URL \"{value}\" must start with http:// or https://")]
    UnsupportedScheme {
        /// The rejected URL.
        value: String,
    },
}

/// A validated repository base URL without a trailing slash.
///
/// # Examples
///
/// ```
/// use warpatch::repository::RepositoryUrl;
///
/// let url: RepositoryUrl = "https://mirror.example/maven2/".parse().unwrap();
/// assert_eq!(url.as_str(), "https://mirror.example/maven2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryUrl(String);

impl RepositoryUrl {
    /// Return the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RepositoryUrl {
    fn default() -> Self {
        Self(MAVEN_CENTRAL.to_owned())
    }
}

impl FromStr for RepositoryUrl {
    type Err = RepositoryUrlError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if !(value.starts_with("http://") || value.starts_with("https://")) {
            return Err(RepositoryUrlError::UnsupportedScheme {
                value: value.to_owned(),
            });
        }
        Ok(Self(value.trim_end_matches('/').to_owned()))
    }
}

impl fmt::Display for RepositoryUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
