// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Static project registry that seeds the enrichment pipeline.
//!
//! Descriptors are defined once, either from the built-in list or from the
//! `projects` section of a portfolio document, and are never mutated
//! afterwards. Enrichment always produces new records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::Error, project::EnrichedProject};

/// Separator between the owner and repository name in an identifier.
const SEPARATOR: char = '/';

/// Static, pre-enrichment project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor
{
    /// Display name of the project.
    pub name:          String,
    /// Repository identifier in `owner/repo` form. Kept verbatim so malformed
    /// values still flow through to the output.
    #[serde(alias = "repository_id", alias = "gitName", alias = "git_name")]
    pub repository_id: String,
    /// Link shown to visitors.
    #[serde(alias = "display_url", alias = "url")]
    pub display_url:   String,
    /// Image asset associated with the project.
    #[serde(alias = "image_ref", alias = "image")]
    pub image_ref:     String,
    /// Optional short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description:   Option<String,>,
    /// Ordered technology tags.
    #[serde(default)]
    pub tags:          Vec<String,>,
}

impl ProjectDescriptor
{
    /// Parses the descriptor's repository identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedIdentifier`] when the identifier is not of
    /// the form `owner/repo`.
    pub fn repository(&self,) -> Result<RepositoryId, Error,>
    {
        RepositoryId::parse(&self.repository_id,)
    }
}

/// Validated `owner/repo` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord,)]
pub struct RepositoryId
{
    owner: String,
    name:  String,
}

impl RepositoryId
{
    /// Parses an identifier of the form `owner/repo`.
    ///
    /// Surrounding whitespace is trimmed. The identifier must contain exactly
    /// one separator, both sides must be non-empty, and neither side may
    /// contain whitespace or control characters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedIdentifier`] describing the violated rule.
    ///
    /// # Examples
    ///
    /// ```
    /// use showcase::RepositoryId;
    ///
    /// let id = RepositoryId::parse(" octocat/hello-world ",)?;
    /// assert_eq!(id.owner(), "octocat");
    /// assert_eq!(id.name(), "hello-world");
    /// assert!(RepositoryId::parse("hello-world",).is_err());
    /// # Ok::<(), showcase::Error>(())
    /// ```
    pub fn parse(raw: &str,) -> Result<Self, Error,>
    {
        let trimmed = raw.trim();
        let mut parts = trimmed.split(SEPARATOR,);
        let (owner, name,) = match (parts.next(), parts.next(), parts.next(),) {
            (Some(owner,), Some(name,), None,) => (owner, name,),
            (_, None, _,) => {
                return Err(Error::malformed(raw, "missing '/' separator",),);
            }
            _ => {
                return Err(Error::malformed(raw, "more than one '/' separator",),);
            }
        };

        if owner.is_empty() {
            return Err(Error::malformed(raw, "owner is empty",),);
        }
        if name.is_empty() {
            return Err(Error::malformed(raw, "repository name is empty",),);
        }
        if trimmed.chars().any(|ch| ch.is_whitespace() || ch.is_control(),) {
            return Err(Error::malformed(raw, "contains whitespace or control characters",),);
        }

        Ok(Self {
            owner: owner.to_owned(), name: name.to_owned(),
        },)
    }

    /// Account that owns the repository.
    pub fn owner(&self,) -> &str
    {
        &self.owner
    }

    /// Repository name.
    pub fn name(&self,) -> &str
    {
        &self.name
    }
}

impl fmt::Display for RepositoryId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(f, "{}{SEPARATOR}{}", self.owner, self.name)
    }
}

/// Immutable ordered collection of project descriptors.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct Registry
{
    projects: Vec<ProjectDescriptor,>,
}

impl Registry
{
    /// Wraps the provided descriptors without reordering them.
    pub fn new(projects: Vec<ProjectDescriptor,>,) -> Self
    {
        Self {
            projects,
        }
    }

    /// Descriptors in registry order.
    pub fn projects(&self,) -> &[ProjectDescriptor]
    {
        &self.projects
    }

    /// Number of descriptors.
    pub fn len(&self,) -> usize
    {
        self.projects.len()
    }

    /// Returns `true` when the registry holds no descriptors.
    pub fn is_empty(&self,) -> bool
    {
        self.projects.is_empty()
    }

    /// Last-resort list: every descriptor verbatim with unknown counts and no
    /// contributors, in registry order.
    pub fn fallback(&self,) -> Vec<EnrichedProject,>
    {
        self.projects.iter().cloned().map(EnrichedProject::unresolved,).collect()
    }
}

impl Default for Registry
{
    fn default() -> Self
    {
        Self::new(default_projects(),)
    }
}

fn descriptor(
    name: &str,
    repository_id: &str,
    display_url: &str,
    image_ref: &str,
    description: &str,
    tags: &[&str],
) -> ProjectDescriptor
{
    ProjectDescriptor {
        name:          name.to_owned(),
        repository_id: repository_id.to_owned(),
        display_url:   display_url.to_owned(),
        image_ref:     image_ref.to_owned(),
        description:   Some(description.to_owned(),),
        tags:          tags.iter().map(|tag| (*tag).to_owned(),).collect(),
    }
}

/// Built-in project list used when no portfolio document overrides it.
pub fn default_projects() -> Vec<ProjectDescriptor,>
{
    vec![
        descriptor(
            "geoSpartial_village",
            "stephenWanjala/geoSpartial_village",
            "https://github.com/stephenWanjala/geoSpartial_village",
            "geosparcial.jpeg",
            "Health IT hackathon 2024 Digimal solution",
            &["Vue 3", "Pinia", "LeafLet js", "TypeScript", "Vuetify3"],
        ),
        descriptor(
            "NoShame",
            "stephenWanjala/No-shame",
            "https://github.com/stephenWanjala/No-shame",
            "noshame.png",
            "An application to track women's menstrual cycle and provide information on \
             menstrual health and awereness on menstrual hygiene",
            &["Android", "Kotlin", "Jetpack Compose"],
        ),
        descriptor(
            "sakko",
            "stephenWanjala/sakko",
            "https://github.com/stephenWanjala/sakko",
            "sakko.jpg",
            "A web platform that aims to eliminate the exploitation of rural milk farmers by \
             middlemen. ",
            &["python Django", "Rest_framework", "jwt"],
        ),
        descriptor(
            "ktor-jwtAuth",
            "stephenWanjala/ktor-jwtAuth",
            "https://github.com/stephenWanjala/ktor-jwtAuth",
            "ktor.png",
            "A simple ktor application with jwt authentication (Learning how to use ktor)",
            &["Kotlin", "ktor", "jwt", "mongodb"],
        ),
        descriptor(
            "bookstore",
            "stephenWanjala/bookstore",
            "https://github.com/stephenWanjala/bookstore",
            "bookstore.png",
            "This repository contains a CRUD (Create, Read, Update, Delete) API for a \
             bookstore implemented using the Go programming language (Golang) and the GORM ORM \
             library with MySQL database",
            &["Go", "gorm", "mysql"],
        ),
        descriptor(
            "RevVault",
            "stephenWanjala/RevVault",
            "https://github.com/stephenWanjala/RevVault.git",
            "bookstore.png",
            "Share && Access a comprehensive collection of past papers, study guides, and \
             practice questions to prepare for your exams and achieve academic success.",
            &["Kotlin", "ktor", "PostgreSQL", "Exposed Framework"],
        ),
    ]
}
