//! Library coordinate newtype for Maven-style `group:artifact:version` triples.
//!
//! A coordinate identifies exactly one JAR in the artifact repository and
//! determines both its download URL and the filename it is given inside the
//! WAR's library directory.

use crate::repository::RepositoryUrl;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between the components of a coordinate string.
const SEPARATOR: char = ':';

/// Errors arising from malformed coordinate strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    /// The string does not split into three non-empty components.
    #[error("invalid library format \"{value}\": {reason}")]
    InvalidFormat {
        /// The rejected coordinate string.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },
}

/// A validated `group:artifact:version` triple.
///
/// # Examples
///
/// ```
/// use warpatch::coordinate::LibraryCoordinate;
///
/// let coordinate: LibraryCoordinate = "org.example:lib:1.0".parse().unwrap();
/// assert_eq!(coordinate.group(), "org.example");
/// assert_eq!(coordinate.jar_filename(), "lib-1.0.jar");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LibraryCoordinate {
    group: String,
    artifact: String,
    version: String,
}

impl LibraryCoordinate {
    /// Return the group identifier, e.g. `org.example`.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Return the artifact identifier.
    #[must_use]
    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// Return the version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Return the group as a repository path (`org.example` → `org/example`).
    #[must_use]
    pub fn group_path(&self) -> String {
        self.group.replace('.', "/")
    }

    /// Return the JAR filename, `<artifact>-<version>.jar`.
    #[must_use]
    pub fn jar_filename(&self) -> String {
        format!("{}-{}.jar", self.artifact, self.version)
    }

    /// Build the download URL of this JAR within `repository`.
    ///
    /// # Examples
    ///
    /// ```
    /// use warpatch::coordinate::LibraryCoordinate;
    /// use warpatch::repository::RepositoryUrl;
    ///
    /// let coordinate: LibraryCoordinate = "org.example:lib:1.0".parse().unwrap();
    /// assert_eq!(
    ///     coordinate.artifact_url(&RepositoryUrl::default()),
    ///     "https://repo1.maven.org/maven2/org/example/lib/1.0/lib-1.0.jar"
    /// );
    /// ```
    #[must_use]
    pub fn artifact_url(&self, repository: &RepositoryUrl) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            repository.as_str(),
            self.group_path(),
            self.artifact,
            self.version,
            self.jar_filename()
        )
    }
}

impl FromStr for LibraryCoordinate {
    type Err = CoordinateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = value.split(SEPARATOR).collect();
        let [group, artifact, version] = parts.as_slice() else {
            return Err(CoordinateError::InvalidFormat {
                value: value.to_owned(),
                reason: format!(
                    "expected groupId:artifactId:version, found {} component(s)",
                    parts.len()
                ),
            });
        };

        for (label, part) in [
            ("groupId", group),
            ("artifactId", artifact),
            ("version", version),
        ] {
            if part.is_empty() {
                return Err(CoordinateError::InvalidFormat {
                    value: value.to_owned(),
                    reason: format!("{label} must not be empty"),
                });
            }
        }

        Ok(Self {
            group: (*group).to_owned(),
            artifact: (*artifact).to_owned(),
            version: (*version).to_owned(),
        })
    }
}

impl TryFrom<&str> for LibraryCoordinate {
    type Error = CoordinateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for LibraryCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}
