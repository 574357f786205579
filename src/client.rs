// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Remote client issuing the batched repository query.
//!
//! The [`RemoteSource`] trait is the seam between the orchestrator and the
//! network. [`GithubClient`] implements it on top of Octocrab; every failure
//! is reported through [`Error::RemoteFetchFailed`].

use std::{collections::HashMap, future::Future};

use octocrab::Octocrab;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{config::Settings, error::Error, query::QueryDocument};

/// Source of raw repository data for a batched query.
pub trait RemoteSource
{
    /// Executes the query and returns the entries keyed by alias.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteFetchFailed`] for network, HTTP and decoding
    /// failures.
    fn fetch(
        &self,
        query: &QueryDocument,
    ) -> impl Future<Output = Result<RawResponse, Error,>,> + Send;
}

/// Per-alias response entries. A `null` entry means the repository could not
/// be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize,)]
#[serde(transparent)]
pub struct RawResponse
{
    entries: HashMap<String, Option<RepositoryNode,>,>,
}

impl RawResponse
{
    /// Resolved entry for the alias, if any.
    pub fn entry(&self, label: &str,) -> Option<&RepositoryNode,>
    {
        self.entries.get(label,).and_then(Option::as_ref,)
    }

    /// Iterates over resolved entries.
    pub fn iter(&self,) -> impl Iterator<Item = (&str, &RepositoryNode,),>
    {
        self.entries
            .iter()
            .filter_map(|(label, node,)| node.as_ref().map(|node| (label.as_str(), node,),),)
    }

    /// Number of aliases present in the response, resolved or not.
    pub fn len(&self,) -> usize
    {
        self.entries.len()
    }

    /// Returns `true` when the response carries no aliases.
    pub fn is_empty(&self,) -> bool
    {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, RepositoryNode,),> for RawResponse
{
    fn from_iter<I: IntoIterator<Item = (String, RepositoryNode,),>,>(iter: I,) -> Self
    {
        Self {
            entries: iter.into_iter().map(|(label, node,)| (label, Some(node,),),).collect(),
        }
    }
}

/// Repository entry as returned by the API. Every field is optional because
/// the shape differs between API versions and partial failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize,)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode
{
    /// Stargazer count.
    #[serde(default)]
    pub stargazer_count:   Option<i64,>,
    /// Fork count.
    #[serde(default)]
    pub fork_count:        Option<i64,>,
    /// Users able to be mentioned in the repository.
    #[serde(default)]
    pub mentionable_users: Option<UserConnection,>,
}

/// Connection wrapper around user nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize,)]
pub struct UserConnection
{
    /// Nodes in source order; individual nodes may be `null`.
    #[serde(default)]
    pub nodes: Vec<Option<UserNode,>,>,
}

/// User identity returned inside a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize,)]
#[serde(rename_all = "camelCase")]
pub struct UserNode
{
    /// Account login.
    #[serde(default)]
    pub login:         Option<String,>,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar_url:    Option<String,>,
    /// Profile page URL.
    #[serde(default)]
    pub url:           Option<String,>,
    /// Contribution count, only reported by REST-shaped sources.
    #[serde(default)]
    pub contributions: Option<u32,>,
}

/// Route of the GraphQL endpoint relative to the API base URI.
const GRAPHQL_ROUTE: &str = "/graphql";
/// Longest slice of a non-JSON error body kept in the diagnostic.
const BODY_EXCERPT_LIMIT: usize = 200;

#[derive(Debug, Deserialize,)]
struct GraphQlResponse
{
    #[serde(default)]
    data:   Option<RawResponse,>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError,>,>,
}

#[derive(Debug, Deserialize,)]
struct GraphQlError
{
    message: String,
    #[serde(default)]
    path:    Vec<serde_json::Value,>,
}

impl GraphQlResponse
{
    /// Accepts partial data, logging accompanying errors, and rejects
    /// responses that carry errors only.
    fn into_data(self,) -> Result<RawResponse, Error,>
    {
        let errors = self.errors.unwrap_or_default();

        match self.data {
            Some(data,) => {
                for error in &errors {
                    warn!("GraphQL reported a partial failure at {:?}: {}", error.path, error.message);
                }
                Ok(data,)
            }
            None if errors.is_empty() => Err(Error::remote("GraphQL response carried no data",),),
            None => {
                let messages: Vec<&str,> =
                    errors.iter().map(|error| error.message.as_str(),).collect();
                Err(Error::remote(format!("GraphQL request failed: {}", messages.join("; ")),),)
            }
        }
    }
}

/// Error body GitHub attaches to non-success statuses.
#[derive(Debug, Deserialize,)]
struct ApiErrorBody
{
    message:           String,
    #[serde(default)]
    documentation_url: Option<String,>,
}

/// Decodes an HTTP exchange into the GraphQL envelope. Every failure carries
/// the HTTP status, including bodies that are not JSON at all.
fn decode_envelope(status: u16, body: &str,) -> Result<GraphQlResponse, Error,>
{
    if !(200..300).contains(&status,) {
        let (message, documentation_url,) = match serde_json::from_str::<ApiErrorBody,>(body,) {
            Ok(api,) => (api.message, api.documentation_url,),
            Err(_,) => {
                let excerpt: String = body.trim().chars().take(BODY_EXCERPT_LIMIT,).collect();
                if excerpt.is_empty() {
                    (format!("HTTP {status}"), None,)
                } else {
                    (format!("HTTP {status}: {excerpt}"), None,)
                }
            }
        };
        return Err(Error::RemoteFetchFailed {
            status: Some(status,),
            message,
            documentation_url,
        },);
    }

    serde_json::from_str(body,).map_err(|e| Error::RemoteFetchFailed {
        status:            Some(status,),
        message:           format!("undecodable response body: {e}"),
        documentation_url: None,
    },)
}

/// GitHub GraphQL client.
#[derive(Clone,)]
pub struct GithubClient
{
    octocrab: Octocrab,
}

impl std::fmt::Debug for GithubClient
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        f.debug_struct("GithubClient",).finish_non_exhaustive()
    }
}

impl GithubClient
{
    /// Builds a client for the configured endpoint and credential.
    ///
    /// A missing token is not rejected here; the API answers with an
    /// authentication failure which the orchestrator degrades like any other
    /// remote error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the endpoint is not a valid URI or
    /// the HTTP client cannot be constructed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use showcase::{GithubClient, Settings};
    ///
    /// # fn example() -> Result<(), showcase::Error> {
    /// let settings = Settings {
    ///     token: std::env::var("GITHUB_TOKEN",).ok(),
    ///     ..Settings::default()
    /// };
    /// let client = GithubClient::new(&settings,)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(settings: &Settings,) -> Result<Self, Error,>
    {
        let mut builder = Octocrab::builder().base_uri(settings.endpoint.as_str(),).map_err(|e| {
            Error::validation(format!("invalid endpoint '{}': {e}", settings.endpoint),)
        },)?;

        match settings.token.as_deref().map(str::trim,).filter(|token| !token.is_empty(),) {
            Some(token,) => builder = builder.personal_token(token,),
            None => warn!("No API token configured; the request will be sent unauthenticated"),
        }

        let octocrab = builder.build().map_err(|e| {
            Error::validation(format!("failed to initialize GitHub client: {e}"),)
        },)?;

        Ok(Self {
            octocrab,
        },)
    }
}

impl RemoteSource for GithubClient
{
    async fn fetch(&self, query: &QueryDocument,) -> Result<RawResponse, Error,>
    {
        debug!("Requesting {} repositories", query.labels().len());

        let payload = serde_json::json!({ "query": query.text() });
        let response = self.octocrab._post(GRAPHQL_ROUTE, Some(&payload,),).await?;
        let status = response.status().as_u16();
        let body = self.octocrab.body_to_string(response,).await.map_err(|e| {
            Error::RemoteFetchFailed {
                status:            Some(status,),
                message:           format!("failed to read response body: {e}"),
                documentation_url: None,
            }
        },)?;
        let data = decode_envelope(status, &body,)?.into_data()?;

        debug!("Received {} repository entries", data.len());
        Ok(data,)
    }
}

#[cfg(test)]
mod tests
{
    use mockito::{Matcher, Server};
    use serde_json::json;

    use super::{GithubClient, GraphQlResponse, RawResponse, RemoteSource, decode_envelope};
    use crate::{
        config::Settings,
        error::Error,
        query::build_query,
        registry::ProjectDescriptor,
    };

    fn settings(endpoint: String, token: Option<&str,>,) -> Settings
    {
        Settings {
            endpoint,
            token: token.map(str::to_owned,),
            ..Settings::default()
        }
    }

    fn project(repository_id: &str,) -> ProjectDescriptor
    {
        ProjectDescriptor {
            name:          repository_id.to_owned(),
            repository_id: repository_id.to_owned(),
            display_url:   format!("https://github.com/{repository_id}"),
            image_ref:     "image.png".to_owned(),
            description:   None,
            tags:          Vec::new(),
        }
    }

    #[test]
    fn response_decodes_heterogeneous_entries()
    {
        let response: GraphQlResponse = serde_json::from_value(json!({
            "data": {
                "repo0": {
                    "stargazerCount": 42,
                    "forkCount": 7,
                    "mentionableUsers": { "nodes": [
                        { "login": "alice", "avatarUrl": "https://a", "url": "https://u" },
                        null
                    ] }
                },
                "repo1": null,
                "repo2": { "stargazerCount": 3 }
            }
        }),)
        .expect("valid response",);

        let data = response.into_data().expect("data present",);
        assert_eq!(data.len(), 3);
        assert!(data.entry("repo1").is_none());

        let first = data.entry("repo0",).expect("repo0 resolved",);
        assert_eq!(first.stargazer_count, Some(42));
        let users = first.mentionable_users.as_ref().expect("users present",);
        assert_eq!(users.nodes.len(), 2);

        let partial = data.entry("repo2",).expect("repo2 resolved",);
        assert_eq!(partial.fork_count, None);
        assert!(partial.mentionable_users.is_none());
        assert_eq!(data.iter().count(), 2);
    }

    #[test]
    fn errors_without_data_are_rejected()
    {
        let response: GraphQlResponse = serde_json::from_value(json!({
            "errors": [{ "message": "Something went wrong" }, { "message": "Another" }]
        }),)
        .expect("valid response",);

        let error = response.into_data().expect_err("expected failure",);
        assert_eq!(
            error.to_string(),
            "remote fetch failed: GraphQL request failed: Something went wrong; Another"
        );
    }

    #[test]
    fn errors_with_partial_data_are_tolerated()
    {
        let response: GraphQlResponse = serde_json::from_value(json!({
            "data": { "repo0": null },
            "errors": [{
                "type": "NOT_FOUND",
                "path": ["repo0"],
                "message": "Could not resolve to a Repository with the name 'alice/missing'."
            }]
        }),)
        .expect("valid response",);

        let data = response.into_data().expect("partial data accepted",);
        assert!(data.entry("repo0").is_none());
    }

    #[test]
    fn client_rejects_invalid_endpoint()
    {
        let error = GithubClient::new(&settings("not a uri".to_owned(), None,),)
            .expect_err("expected validation error",);
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn fetch_posts_query_with_bearer_token()
    {
        let mut server = Server::new_async().await;
        let query = build_query(&[project("alice/repo-a",)],);

        let mock = server
            .mock("POST", "/graphql",)
            .match_header("authorization", "Bearer test-token",)
            .match_body(Matcher::PartialJson(json!({ "query": query.text() }),),)
            .with_status(200,)
            .with_header("content-type", "application/json",)
            .with_body(
                json!({
                    "data": { "repo0": { "stargazerCount": 42, "forkCount": 7,
                        "mentionableUsers": { "nodes": [] } } }
                })
                .to_string(),
            )
            .expect(1,)
            .create_async()
            .await;

        let client = GithubClient::new(&settings(server.url(), Some("test-token",),),)
            .expect("client builds",);
        let data = client.fetch(&query,).await.expect("fetch succeeds",);

        mock.assert_async().await;
        let entry = data.entry("repo0",).expect("repo0 resolved",);
        assert_eq!(entry.stargazer_count, Some(42));
        assert_eq!(entry.fork_count, Some(7));
    }

    #[tokio::test]
    async fn fetch_maps_http_failures_to_remote_error()
    {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql",)
            .with_status(401,)
            .with_header("content-type", "application/json",)
            .with_body(
                json!({
                    "message": "Bad credentials",
                    "documentation_url": "https://docs.github.com/graphql"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = GithubClient::new(&settings(server.url(), Some("expired",),),)
            .expect("client builds",);
        let error = client
            .fetch(&build_query(&[project("alice/repo-a",)],),)
            .await
            .expect_err("expected remote failure",);

        mock.assert_async().await;
        match error {
            Error::RemoteFetchFailed {
                status,
                message,
                documentation_url,
            } => {
                assert_eq!(status, Some(401));
                assert_eq!(message, "Bad credentials");
                assert_eq!(documentation_url.as_deref(), Some("https://docs.github.com/graphql"));
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_maps_undecodable_body_to_remote_error()
    {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/graphql",)
            .with_status(200,)
            .with_header("content-type", "application/json",)
            .with_body("not json",)
            .create_async()
            .await;

        let client =
            GithubClient::new(&settings(server.url(), Some("token",),),).expect("client builds",);
        let error = client
            .fetch(&build_query(&[project("alice/repo-a",)],),)
            .await
            .expect_err("expected remote failure",);

        match error {
            Error::RemoteFetchFailed {
                status,
                message,
                ..
            } => {
                assert_eq!(status, Some(200));
                assert!(message.starts_with("undecodable response body"));
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_keeps_status_for_non_json_error_pages()
    {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql",)
            .with_status(502,)
            .with_header("content-type", "text/html",)
            .with_body("<html>Bad Gateway</html>",)
            .create_async()
            .await;

        let client =
            GithubClient::new(&settings(server.url(), Some("token",),),).expect("client builds",);
        let error = client
            .fetch(&build_query(&[project("alice/repo-a",)],),)
            .await
            .expect_err("expected remote failure",);

        mock.assert_async().await;
        assert_eq!(error.status(), Some(502));
        assert_eq!(error.to_string(), "remote fetch failed: HTTP 502: <html>Bad Gateway</html>");
    }

    #[test]
    fn empty_error_body_reports_bare_status()
    {
        let error = decode_envelope(503, "  ",).expect_err("expected remote failure",);
        assert_eq!(error.status(), Some(503));
        assert_eq!(error.to_string(), "remote fetch failed: HTTP 503");
    }

    #[test]
    fn long_error_pages_are_truncated()
    {
        let page = "x".repeat(1_000,);
        let error = decode_envelope(503, &page,).expect_err("expected remote failure",);
        let expected = format!("remote fetch failed: HTTP 503: {}", "x".repeat(200,));
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn raw_response_collects_resolved_entries()
    {
        let response: RawResponse =
            vec![("repo0".to_owned(), Default::default(),)].into_iter().collect();
        assert!(response.entry("repo0").is_some());
        assert!(!response.is_empty());
    }
}
