// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Builds the single batched GraphQL query for a registry.
//!
//! Each eligible descriptor contributes one aliased `repository` clause. The
//! alias is only a wire-level label: the document keeps an explicit map from
//! alias to [`RepositoryId`] so responses are matched back by identifier
//! rather than by position.

use std::{
    collections::{BTreeMap, HashSet},
    fmt::Write,
};

use tracing::{debug, warn};

use crate::registry::{ProjectDescriptor, RepositoryId};

/// Maximum number of contributor identities requested per repository.
pub const CONTRIBUTOR_LIMIT: u8 = 10;

const LABEL_PREFIX: &str = "repo";

/// Batched query text together with the alias to repository map.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct QueryDocument
{
    text:   String,
    labels: BTreeMap<String, RepositoryId,>,
}

impl QueryDocument
{
    /// GraphQL document text.
    pub fn text(&self,) -> &str
    {
        &self.text
    }

    /// Alias to repository map, ordered by alias.
    pub fn labels(&self,) -> &BTreeMap<String, RepositoryId,>
    {
        &self.labels
    }

    /// Repository requested under the given alias.
    pub fn repository_for(&self, label: &str,) -> Option<&RepositoryId,>
    {
        self.labels.get(label,)
    }

    /// Returns `true` when no descriptor was eligible.
    ///
    /// The text is still a valid document, but there is nothing worth
    /// sending.
    pub fn is_empty(&self,) -> bool
    {
        self.labels.is_empty()
    }
}

/// Builds the batched query for the provided descriptors.
///
/// Descriptors with malformed identifiers are skipped with a warning.
/// Duplicate identifiers are requested once; the alias is derived from the
/// position of the first descriptor carrying the identifier.
///
/// # Examples
///
/// ```
/// use showcase::{Registry, build_query};
///
/// let registry = Registry::default();
/// let query = build_query(registry.projects(),);
/// assert_eq!(query.labels().len(), registry.len());
/// assert!(query.text().contains("stargazerCount"));
/// ```
pub fn build_query(projects: &[ProjectDescriptor],) -> QueryDocument
{
    let mut text = String::from("query {\n",);
    let mut labels = BTreeMap::new();
    let mut requested = HashSet::with_capacity(projects.len(),);

    for (index, project,) in projects.iter().enumerate() {
        let repository = match project.repository() {
            Ok(repository,) => repository,
            Err(error,) => {
                warn!("Skipping project '{}': {}", project.name, error);
                continue;
            }
        };

        if !requested.insert(repository.clone(),) {
            debug!("Repository {} already requested, reusing its clause", repository);
            continue;
        }

        let label = format!("{LABEL_PREFIX}{index}");
        push_clause(&mut text, &label, &repository,);
        labels.insert(label, repository,);
    }

    if labels.is_empty() {
        text.push_str("  __typename\n",);
    }
    text.push('}',);

    debug!("Built query with {} repository clauses", labels.len());

    QueryDocument {
        text,
        labels,
    }
}

fn push_clause(text: &mut String, label: &str, repository: &RepositoryId,)
{
    // Writing into a String cannot fail.
    let _ = write!(
        text,
        "  {label}: repository(owner: {}, name: {}) {{\n    stargazerCount\n    forkCount\n    \
         mentionableUsers(first: {CONTRIBUTOR_LIMIT}) {{\n      nodes {{\n        login\n        \
         avatarUrl\n        url\n      }}\n    }}\n  }}\n",
        quote(repository.owner(),),
        quote(repository.name(),),
    );
}

fn quote(value: &str,) -> String
{
    let mut quoted = String::with_capacity(value.len() + 2,);
    quoted.push('"',);
    for ch in value.chars() {
        match ch {
            '"' => quoted.push_str("\\\"",),
            '\\' => quoted.push_str("\\\\",),
            _ => quoted.push(ch,),
        }
    }
    quoted.push('"',);
    quoted
}
