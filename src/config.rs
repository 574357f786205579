// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Runtime settings and the portfolio document.
//!
//! [`Settings`] carries the process-wide values the pipeline needs: the API
//! credential, the endpoint, and the cache location and lifetime. The binary
//! fills it from command-line flags with environment fallbacks.
//!
//! [`PortfolioConfig`] mirrors an optional YAML document that overrides the
//! built-in project registry and supplies resume content.

use std::{fs, path::Path, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    error::{self, Error},
    portfolio::Profile,
    registry::{ProjectDescriptor, Registry},
};

/// Lifetime of a cached enrichment result.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60,);
/// Base URI of the GitHub API. The client appends `/graphql`.
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com";
/// Directory used for the file-backed cache when none is configured.
pub const DEFAULT_CACHE_DIR: &str = ".showcase-cache";
/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Process-wide pipeline settings.
#[derive(Clone, PartialEq, Eq,)]
pub struct Settings
{
    /// Bearer credential attached to API requests.
    pub token:     Option<String,>,
    /// API base URI.
    pub endpoint:  String,
    /// How long a successful enrichment stays valid.
    pub cache_ttl: Duration,
    /// Directory holding the file-backed cache.
    pub cache_dir: PathBuf,
}

impl Default for Settings
{
    fn default() -> Self
    {
        Self {
            token:     None,
            endpoint:  DEFAULT_ENDPOINT.to_owned(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR,),
        }
    }
}

impl std::fmt::Debug for Settings
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        f.debug_struct("Settings",)
            .field("token", &self.token.as_ref().map(|_| "<redacted>",),)
            .field("endpoint", &self.endpoint,)
            .field("cache_ttl", &self.cache_ttl,)
            .field("cache_dir", &self.cache_dir,)
            .finish()
    }
}

impl Settings
{
    /// Checks that the settings can drive a refresh.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the endpoint is blank or the cache
    /// lifetime is zero.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        if self.endpoint.trim().is_empty() {
            return Err(Error::validation("endpoint cannot be empty",),);
        }
        if self.cache_ttl.is_zero() {
            return Err(Error::validation("cache TTL must be greater than zero",),);
        }
        Ok((),)
    }
}

/// Root portfolio document.
///
/// # Examples
///
/// ```
/// use showcase::PortfolioConfig;
///
/// let yaml = r#"
/// projects:
///   - name: hello-world
///     repositoryId: octocat/hello-world
///     displayUrl: https://github.com/octocat/hello-world
///     imageRef: hello.png
/// "#;
/// let config = PortfolioConfig::parse(yaml,)?;
/// assert_eq!(config.registry().len(), 1);
/// # Ok::<(), showcase::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize,)]
pub struct PortfolioConfig
{
    /// Project registry override. The built-in list is used when absent.
    #[serde(default)]
    pub projects: Option<Vec<ProjectDescriptor,>,>,
    /// Resume content.
    #[serde(default)]
    pub profile:  Option<Profile,>,
}

impl PortfolioConfig
{
    /// Loads and validates a portfolio document from disk.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::Io`] when the file cannot be read, and the errors
    /// documented on [`PortfolioConfig::parse`].
    pub fn load(path: &Path,) -> Result<Self, Error,>
    {
        let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
        Self::parse(&contents,)
    }

    /// Parses and validates a portfolio document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when the YAML cannot be decoded and
    /// [`Error::Validation`] when the project list is present but empty,
    /// contains a blank name, or the profile violates its invariants.
    pub fn parse(contents: &str,) -> Result<Self, Error,>
    {
        let config: Self = serde_yaml::from_str(contents,)?;
        config.validate()?;
        Ok(config,)
    }

    fn validate(&self,) -> Result<(), Error,>
    {
        if let Some(projects,) = self.projects.as_ref() {
            if projects.is_empty() {
                return Err(Error::validation(
                    "projects must list at least one project when present",
                ),);
            }
            if let Some(index,) = projects.iter().position(|project| project.name.trim().is_empty(),) {
                return Err(Error::validation(format!("projects[{index}].name cannot be empty"),),);
            }
        }

        if let Some(profile,) = self.profile.as_ref() {
            profile.validate()?;
        }

        Ok((),)
    }

    /// Registry described by the document, or the built-in one.
    pub fn registry(&self,) -> Registry
    {
        match self.projects.as_ref() {
            Some(projects,) => Registry::new(projects.clone(),),
            None => Registry::default(),
        }
    }
}
