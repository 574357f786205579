// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Enrichment pipeline for a developer portfolio's project listing.
//!
//! A static [`Registry`] of showcased projects is turned into a ranked list of
//! [`EnrichedProject`] values carrying live star, fork and contributor data.
//! One batched GraphQL request covers every well-formed repository, results
//! are cached for a configurable lifetime, and any failure along the way
//! degrades to the registry with unknown counts instead of surfacing an error.
//!
//! ```no_run
//! use showcase::{ExpiringCache, FileStorage, GithubClient, RefreshOrchestrator, Registry, Settings};
//!
//! # async fn example() -> Result<(), showcase::Error> {
//! let settings = Settings::default();
//! let client = GithubClient::new(&settings,)?;
//! let cache = ExpiringCache::new(FileStorage::new(&settings.cache_dir,),);
//! let orchestrator =
//!     RefreshOrchestrator::new(Registry::default(), client, cache, settings.cache_ttl,);
//! for project in orchestrator.refresh().await {
//!     println!("{} {}", project.descriptor.name, project.stars);
//! }
//! # Ok(())
//! # }
//! ```

mod cache;
mod client;
mod config;
mod error;
mod normalizer;
mod orchestrator;
mod portfolio;
mod project;
mod query;
mod ranker;
mod registry;

pub use cache::{
    CACHE_KEY, CacheEntry, Clock, ExpiringCache, FileStorage, ManualClock, MemoryStorage,
    Storage, SystemClock,
};
pub use client::{GithubClient, RawResponse, RemoteSource, RepositoryNode, UserConnection, UserNode};
pub use config::{
    DEFAULT_CACHE_DIR, DEFAULT_CACHE_TTL, DEFAULT_ENDPOINT, PortfolioConfig, Settings, TOKEN_ENV,
};
pub use error::{Error, io_error};
pub use normalizer::normalize;
pub use orchestrator::{Phase, ProjectsState, RefreshOrchestrator, RefreshOrigin, RefreshReport};
pub use portfolio::{
    Contact, Education, Experience, Language, MAX_SKILL_LEVEL, Period, Profile, Role, Skill,
    Social, YearMonth,
};
pub use project::{ContributorSummary, Count, EnrichedProject, UNKNOWN_MARKER};
pub use query::{CONTRIBUTOR_LIMIT, QueryDocument, build_query};
pub use ranker::{compare, rank};
pub use registry::{ProjectDescriptor, Registry, RepositoryId, default_projects};
