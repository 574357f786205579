// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Transformation logic that converts raw API entries into enriched projects.
//!
//! Response entries are first re-keyed by [`RepositoryId`] through the query
//! document's alias map, then every descriptor looks up its own identifier.
//! A descriptor without a matching entry is a normal outcome and yields an
//! unresolved record rather than an error.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    client::{RawResponse, RepositoryNode, UserConnection},
    project::{ContributorSummary, Count, EnrichedProject},
    query::QueryDocument,
    registry::{ProjectDescriptor, RepositoryId},
};

/// Produces one enriched record per descriptor, in descriptor order.
///
/// # Examples
///
/// ```
/// use showcase::{RawResponse, Registry, build_query, normalize};
///
/// let registry = Registry::default();
/// let query = build_query(registry.projects(),);
/// let enriched = normalize(registry.projects(), &query, &RawResponse::default(),);
/// assert_eq!(enriched.len(), registry.len());
/// assert!(enriched.iter().all(|project| project.stars.is_unknown()));
/// ```
pub fn normalize(
    projects: &[ProjectDescriptor],
    query: &QueryDocument,
    response: &RawResponse,
) -> Vec<EnrichedProject,>
{
    let resolved = index_by_repository(query, response,);

    projects
        .iter()
        .map(|project| {
            let node = project
                .repository()
                .ok()
                .and_then(|repository| resolved.get(&repository,).copied(),);
            match node {
                Some(node,) => enrich(project.clone(), node,),
                None => {
                    debug!("No data for project '{}', keeping unknown counts", project.name);
                    EnrichedProject::unresolved(project.clone(),)
                }
            }
        },)
        .collect()
}

fn index_by_repository<'a,>(
    query: &'a QueryDocument,
    response: &'a RawResponse,
) -> HashMap<&'a RepositoryId, &'a RepositoryNode,>
{
    let mut resolved = HashMap::with_capacity(query.labels().len(),);
    for (label, node,) in response.iter() {
        match query.repository_for(label,) {
            Some(repository,) => {
                resolved.insert(repository, node,);
            }
            None => debug!("Ignoring unexpected response entry '{}'", label),
        }
    }
    resolved
}

fn enrich(descriptor: ProjectDescriptor, node: &RepositoryNode,) -> EnrichedProject
{
    EnrichedProject {
        descriptor,
        stars: non_negative(node.stargazer_count,),
        forks: non_negative(node.fork_count,),
        contributors: node.mentionable_users.as_ref().map(contributors,).unwrap_or_default(),
    }
}

fn non_negative(value: Option<i64,>,) -> Count
{
    let value = value.unwrap_or_default().max(0,);
    Count::Known(value.unsigned_abs(),)
}

fn contributors(connection: &UserConnection,) -> Vec<ContributorSummary,>
{
    connection
        .nodes
        .iter()
        .flatten()
        .filter_map(|node| {
            let login = node.login.as_deref().map(str::trim,).filter(|login| !login.is_empty(),)?;
            Some(ContributorSummary {
                login:         login.to_owned(),
                avatar_url:    node.avatar_url.clone().unwrap_or_default(),
                profile_url:   node
                    .url
                    .clone()
                    .unwrap_or_else(|| format!("https://github.com/{login}"),),
                contributions: node.contributions.unwrap_or_default(),
            },)
        },)
        .collect()
}

#[cfg(test)]
mod tests
{
    use super::normalize;
    use crate::{
        client::{RawResponse, RepositoryNode, UserConnection, UserNode},
        project::Count,
        query::build_query,
        registry::ProjectDescriptor,
    };

    fn project(name: &str, repository_id: &str,) -> ProjectDescriptor
    {
        ProjectDescriptor {
            name:          name.to_owned(),
            repository_id: repository_id.to_owned(),
            display_url:   format!("https://github.com/{repository_id}"),
            image_ref:     format!("{name}.png"),
            description:   Some(format!("{name} description"),),
            tags:          vec!["Rust".to_owned()],
        }
    }

    fn user(login: &str,) -> UserNode
    {
        UserNode {
            login:         Some(login.to_owned(),),
            avatar_url:    Some(format!("https://avatars.example/{login}"),),
            url:           Some(format!("https://github.com/{login}"),),
            contributions: None,
        }
    }

    fn node(stars: i64, forks: i64, users: Vec<UserNode,>,) -> RepositoryNode
    {
        RepositoryNode {
            stargazer_count:   Some(stars,),
            fork_count:        Some(forks,),
            mentionable_users: Some(UserConnection {
                nodes: users.into_iter().map(Some,).collect(),
            },),
        }
    }

    #[test]
    fn matched_entries_are_enriched_and_unmatched_stay_unknown()
    {
        let projects = vec![project("a", "alice/repo-a",), project("bad", "bad-id",)];
        let query = build_query(&projects,);
        let response: RawResponse =
            vec![("repo0".to_owned(), node(42, 7, vec![user("alice")],),)].into_iter().collect();

        let enriched = normalize(&projects, &query, &response,);

        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].descriptor, projects[0]);
        assert_eq!(enriched[0].stars, Count::Known(42,));
        assert_eq!(enriched[0].forks, Count::Known(7,));
        assert_eq!(enriched[0].contributors.len(), 1);
        assert_eq!(enriched[0].contributors[0].login, "alice");
        assert_eq!(enriched[0].contributors[0].contributions, 0);

        assert_eq!(enriched[1].descriptor, projects[1]);
        assert!(enriched[1].stars.is_unknown());
        assert!(enriched[1].forks.is_unknown());
        assert!(enriched[1].contributors.is_empty());
    }

    #[test]
    fn absent_numeric_fields_default_to_zero()
    {
        let projects = vec![project("a", "alice/repo-a",)];
        let query = build_query(&projects,);
        let response: RawResponse =
            vec![("repo0".to_owned(), RepositoryNode::default(),)].into_iter().collect();

        let enriched = normalize(&projects, &query, &response,);

        assert_eq!(enriched[0].stars, Count::Known(0,));
        assert_eq!(enriched[0].forks, Count::Known(0,));
        assert!(enriched[0].contributors.is_empty());
    }

    #[test]
    fn negative_counts_are_clamped()
    {
        let projects = vec![project("a", "alice/repo-a",)];
        let query = build_query(&projects,);
        let response: RawResponse =
            vec![("repo0".to_owned(), node(-5, 3, Vec::new(),),)].into_iter().collect();

        let enriched = normalize(&projects, &query, &response,);
        assert_eq!(enriched[0].stars, Count::Known(0,));
        assert_eq!(enriched[0].forks, Count::Known(3,));
    }

    #[test]
    fn contributors_keep_source_order_and_skip_anonymous_nodes()
    {
        let projects = vec![project("a", "alice/repo-a",)];
        let query = build_query(&projects,);
        let mut anonymous = user("ghost",);
        anonymous.login = None;
        let mut partial = user("bob",);
        partial.url = None;
        partial.avatar_url = None;
        partial.contributions = Some(12,);

        let response: RawResponse = vec![(
            "repo0".to_owned(),
            node(1, 1, vec![user("carol"), anonymous, partial, user("alice")],),
        )]
        .into_iter()
        .collect();

        let enriched = normalize(&projects, &query, &response,);
        let logins: Vec<&str,> =
            enriched[0].contributors.iter().map(|summary| summary.login.as_str(),).collect();
        assert_eq!(logins, vec!["carol", "bob", "alice"]);

        let bob = &enriched[0].contributors[1];
        assert_eq!(bob.profile_url, "https://github.com/bob");
        assert_eq!(bob.avatar_url, "");
        assert_eq!(bob.contributions, 12);
    }

    #[test]
    fn duplicate_descriptors_share_one_entry()
    {
        let projects = vec![project("first", "alice/repo-a",), project("again", "alice/repo-a",)];
        let query = build_query(&projects,);
        let response: RawResponse =
            vec![("repo0".to_owned(), node(5, 1, Vec::new(),),)].into_iter().collect();

        let enriched = normalize(&projects, &query, &response,);
        assert_eq!(enriched[0].stars, Count::Known(5,));
        assert_eq!(enriched[1].stars, Count::Known(5,));
        assert_eq!(enriched[1].descriptor.name, "again");
    }

    #[test]
    fn unexpected_labels_are_ignored()
    {
        let projects = vec![project("a", "alice/repo-a",)];
        let query = build_query(&projects,);
        let response: RawResponse =
            vec![("repo9".to_owned(), node(100, 100, Vec::new(),),)].into_iter().collect();

        let enriched = normalize(&projects, &query, &response,);
        assert!(enriched[0].stars.is_unknown());
    }
}
