#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the showcase crate."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free.
//!
//! Only configuration and CLI errors ever reach a caller. The enrichment
//! pipeline produces [`Error::MalformedIdentifier`],
//! [`Error::RemoteFetchFailed`] and [`Error::CacheUnavailable`] internally and
//! degrades each of them before returning.

use std::path::{Path, PathBuf};

/// Unified error type returned by the library and CLI.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// A registry entry carries a repository identifier that is not of the
    /// form `owner/repo`.
    #[error("malformed repository identifier '{repository_id}': {reason}")]
    MalformedIdentifier {
        /// Identifier exactly as it appears in the registry.
        repository_id: String,
        /// Short description of the violated rule.
        reason:        String
    },
    /// The batched remote query could not be completed.
    ///
    /// Timeouts, authentication failures, rate limits and undecodable bodies
    /// all end up here; they differ only in the attached diagnostics.
    #[error("remote fetch failed: {message}")]
    RemoteFetchFailed {
        /// HTTP status reported by the API, when one was received.
        status:            Option<u16>,
        /// Human readable description of the failure.
        message:           String,
        /// Documentation reference supplied by the API, if any.
        documentation_url: Option<String>
    },
    /// The cache storage backend could not be read or written.
    #[error("cache unavailable: {message}")]
    CacheUnavailable {
        /// Human readable description of the storage failure.
        message: String
    },
    /// Wraps I/O errors that occur while reading configuration files.
    #[error("failed to read configuration from {path:?}: {source}")]
    Io {
        /// Location of the configuration file.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error
    },
    /// Wraps YAML decoding errors.
    #[error("failed to parse configuration: {source}")]
    Parse {
        /// Source decoding error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Returned when configuration or CLI input violates invariants.
    #[error("invalid configuration: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Wraps serialization errors when writing JSON output.
    #[error("failed to serialize output: {source}")]
    Serialize {
        /// Underlying serialization error.
        source: serde_json::Error
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a malformed identifier error.
    ///
    /// # Parameters
    ///
    /// * `repository_id` - The offending identifier.
    /// * `reason` - Which rule the identifier violates.
    pub fn malformed<I, R>(repository_id: I, reason: R) -> Self
    where
        I: Into<String>,
        R: Into<String>
    {
        Self::MalformedIdentifier {
            repository_id: repository_id.into(),
            reason:        reason.into()
        }
    }

    /// Constructs a remote failure that carries no HTTP diagnostics.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the failure.
    pub fn remote<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::RemoteFetchFailed {
            status:            None,
            message:           message.into(),
            documentation_url: None
        }
    }

    /// Constructs a cache storage error.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the storage failure.
    pub fn cache<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::CacheUnavailable {
            message: message.into()
        }
    }

    /// Returns the HTTP status attached to a remote failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteFetchFailed {
                status, ..
            } => *status,
            _ => None
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// The returned string matches the [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Parse {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

impl From<octocrab::Error> for Error {
    fn from(error: octocrab::Error) -> Self {
        match error {
            octocrab::Error::GitHub {
                source, ..
            } => Self::RemoteFetchFailed {
                status:            Some(source.status_code.as_u16()),
                message:           source.message.clone(),
                documentation_url: source.documentation_url.clone()
            },
            other => Self::remote(other.to_string())
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the configuration file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn validation_constructor_populates_message() {
        let error = Error::validation("something went wrong");
        match error {
            Error::Validation {
                ref message
            } => {
                assert_eq!(message, "something went wrong");
            }
            other => panic!("expected validation error, got {other:?}")
        }
    }

    #[test]
    fn to_display_string_matches_display() {
        let error = Error::validation("display me");
        assert_eq!(error.to_string(), error.to_display_string());
    }

    #[test]
    fn malformed_identifier_mentions_identifier_and_reason() {
        let error = Error::malformed("bad-id", "missing '/' separator");
        assert_eq!(
            error.to_string(),
            "malformed repository identifier 'bad-id': missing '/' separator"
        );
    }

    #[test]
    fn remote_constructor_has_no_status() {
        let error = Error::remote("connection reset");
        assert_eq!(error.status(), None);
        assert_eq!(error.to_string(), "remote fetch failed: connection reset");
    }

    #[test]
    fn status_is_exposed_for_remote_failures_only() {
        let remote = Error::RemoteFetchFailed {
            status:            Some(401),
            message:           "Bad credentials".to_owned(),
            documentation_url: Some("https://docs.github.com/graphql".to_owned())
        };
        assert_eq!(remote.status(), Some(401));
        assert_eq!(Error::cache("disk full").status(), None);
    }

    #[test]
    fn io_error_helper_wraps_path_and_source() {
        let path = std::path::Path::new("/tmp/portfolio.yaml");
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = super::io_error(path, io_error);

        match error {
            Error::Io {
                path: ref stored_path,
                ref source
            } => {
                assert_eq!(stored_path, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected io error, got {other:?}")
        }
    }

    #[test]
    fn serde_yaml_conversion_maps_to_parse_variant() {
        let error = serde_yaml::from_str::<usize>("not-a-number").unwrap_err();
        let mapped: Error = error.into();
        assert!(matches!(mapped, Error::Parse { .. }));
    }

    #[test]
    fn serde_json_conversion_maps_to_serialize_variant() {
        let invalid = serde_json::from_str::<serde_json::Value>("not-json").unwrap_err();
        let mapped: Error = invalid.into();
        assert!(matches!(mapped, Error::Serialize { .. }));
    }
}
