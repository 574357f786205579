// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Refresh orchestration for enriched project listings.
//!
//! Composes cache lookup, query construction, the remote call,
//! normalization, ranking and the cache write behind a single operation that
//! always yields a displayable list. Observers follow progress through a
//! [`tokio::sync::watch`] channel instead of shared mutable state.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    cache::{Clock, ExpiringCache, Storage, SystemClock},
    client::RemoteSource,
    error::Error,
    normalizer::normalize,
    project::EnrichedProject,
    query::build_query,
    ranker::rank,
    registry::Registry,
};

/// Lifecycle of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum Phase
{
    /// No refresh in flight.
    Idle,
    /// A remote refresh is in flight.
    Refreshing,
}

/// Snapshot published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct ProjectsState
{
    /// Current lifecycle phase.
    pub phase:    Phase,
    /// Latest list handed out by the orchestrator.
    pub projects: Vec<EnrichedProject,>,
}

impl ProjectsState
{
    /// Returns `true` while a remote refresh is in flight.
    pub fn is_loading(&self,) -> bool
    {
        self.phase == Phase::Refreshing
    }
}

/// Where a refresh result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum RefreshOrigin
{
    /// A valid cache entry was returned without a network call.
    Cache,
    /// Fresh data was fetched, ranked and cached.
    Remote,
    /// The static registry was returned with unknown counts.
    Fallback,
}

/// Outcome of a refresh, including the diagnostic that caused a fallback.
#[derive(Debug,)]
pub struct RefreshReport
{
    /// Projects to display.
    pub projects:   Vec<EnrichedProject,>,
    /// Source of [`RefreshReport::projects`].
    pub origin:     RefreshOrigin,
    /// Error swallowed on the way to a fallback, if any.
    pub diagnostic: Option<Error,>,
}

/// Entry point that turns the static registry into an enriched listing.
///
/// Overlapping refreshes are not serialized; the cache write replaces the
/// entry wholesale, so the last writer wins.
#[derive(Debug,)]
pub struct RefreshOrchestrator<R, S, C = SystemClock,>
{
    registry: Registry,
    remote:   R,
    cache:    ExpiringCache<S, C,>,
    ttl:      Duration,
    state:    watch::Sender<ProjectsState,>,
}

impl<R, S, C,> RefreshOrchestrator<R, S, C,>
where
    R: RemoteSource,
    S: Storage,
    C: Clock,
{
    /// Creates an idle orchestrator whose published list starts as the
    /// registry fallback.
    pub fn new(registry: Registry, remote: R, cache: ExpiringCache<S, C,>, ttl: Duration,) -> Self
    {
        let (state, _,) = watch::channel(ProjectsState {
            phase: Phase::Idle, projects: registry.fallback(),
        },);

        Self {
            registry,
            remote,
            cache,
            ttl,
            state,
        }
    }

    /// Registry the orchestrator enriches.
    pub fn registry(&self,) -> &Registry
    {
        &self.registry
    }

    /// Cache consulted before every remote call.
    pub fn cache(&self,) -> &ExpiringCache<S, C,>
    {
        &self.cache
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self,) -> watch::Receiver<ProjectsState,>
    {
        self.state.subscribe()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self,) -> ProjectsState
    {
        self.state.borrow().clone()
    }

    /// Returns `true` while a remote refresh is in flight.
    pub fn is_loading(&self,) -> bool
    {
        self.state.borrow().is_loading()
    }

    /// Returns the enriched listing. Never fails.
    pub async fn refresh(&self,) -> Vec<EnrichedProject,>
    {
        self.refresh_report().await.projects
    }

    /// Returns the enriched listing together with its origin and any
    /// swallowed diagnostic.
    pub async fn refresh_report(&self,) -> RefreshReport
    {
        if let Some(entry,) = self.cache.read_valid() {
            debug!("Serving {} projects from cache", entry.data.len());
            self.publish(Phase::Idle, &entry.data,);
            return RefreshReport {
                projects:   entry.data,
                origin:     RefreshOrigin::Cache,
                diagnostic: None,
            };
        }

        let loading = LoadingGuard::enter(&self.state,);

        let report = match self.fetch_ranked().await {
            Ok(Some(projects,),) => {
                self.cache.write(&projects, self.ttl,);
                info!("Refreshed {} projects from the API", projects.len());
                RefreshReport {
                    projects,
                    origin: RefreshOrigin::Remote,
                    diagnostic: None,
                }
            }
            Ok(None,) => {
                warn!("No project has a well-formed repository identifier, skipping the API");
                RefreshReport {
                    projects:   self.registry.fallback(),
                    origin:     RefreshOrigin::Fallback,
                    diagnostic: None,
                }
            }
            Err(error,) => {
                warn!("Falling back to static project data: {}", error);
                RefreshReport {
                    projects:   self.registry.fallback(),
                    origin:     RefreshOrigin::Fallback,
                    diagnostic: Some(error,),
                }
            }
        };

        self.publish(Phase::Idle, &report.projects,);
        drop(loading,);
        report
    }

    /// Runs the remote part of the pipeline. `Ok(None)` means no descriptor
    /// was eligible and nothing was requested.
    async fn fetch_ranked(&self,) -> Result<Option<Vec<EnrichedProject,>,>, Error,>
    {
        let projects = self.registry.projects();
        let query = build_query(projects,);
        if query.is_empty() {
            return Ok(None,);
        }

        let response = self.remote.fetch(&query,).await?;
        let mut enriched = normalize(projects, &query, &response,);
        rank(&mut enriched,);
        Ok(Some(enriched,),)
    }

    fn publish(&self, phase: Phase, projects: &[EnrichedProject],)
    {
        self.state.send_modify(|state| {
            state.phase = phase;
            state.projects = projects.to_vec();
        },);
    }
}

/// Holds the published phase at `Refreshing` and resets it to `Idle` on drop,
/// so a refresh cancelled mid-fetch does not leave the flag set.
struct LoadingGuard<'a,>
{
    state: &'a watch::Sender<ProjectsState,>,
}

impl<'a,> LoadingGuard<'a,>
{
    fn enter(state: &'a watch::Sender<ProjectsState,>,) -> Self
    {
        state.send_modify(|state| state.phase = Phase::Refreshing,);
        Self {
            state,
        }
    }
}

impl Drop for LoadingGuard<'_,>
{
    fn drop(&mut self,)
    {
        self.state.send_if_modified(|state| {
            let was_loading = state.is_loading();
            state.phase = Phase::Idle;
            was_loading
        },);
    }
}
