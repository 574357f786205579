// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Command-line interface for the showcase binary.
//!
//! Every command writes JSON to stdout. Logs and the progress spinner go to
//! stderr so the output can be piped straight into other tools.

use std::{
    io,
    path::{Path, PathBuf},
    process,
    time::Duration,
};

use clap::{ArgAction, Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use showcase::{
    DEFAULT_CACHE_DIR, DEFAULT_CACHE_TTL, DEFAULT_ENDPOINT, Error, ExpiringCache, FileStorage,
    GithubClient, MemoryStorage, PortfolioConfig, ProjectsState, RefreshOrchestrator,
    RefreshOrigin, Registry, Settings, Storage,
};
use tokio::sync::watch;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "showcase=info";

/// Command line interface for enriching portfolio project listings.
#[derive(Debug, Parser,)]
#[command(name = "showcase", version, about = "Enrich portfolio projects with live GitHub data")]
struct Cli
{
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    settings: SettingsArgs,
}

#[derive(Debug, Subcommand,)]
/// Supported commands exposed by the CLI.
enum Command
{
    /// Fetch live repository data and print the ranked project list.
    Refresh(RefreshArgs,),
    /// Print the static project registry.
    Projects(ProjectsArgs,),
    /// Print the profile section of a portfolio document.
    Portfolio(PortfolioArgs,),
    /// Manage the on-disk cache.
    Cache(CacheArgs,),
}

/// Pipeline settings shared by every command.
#[derive(Debug, Args,)]
struct SettingsArgs
{
    /// API token used for authenticated requests.
    #[arg(long = "token", env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    token: Option<String,>,

    /// Base URI of the GitHub API.
    #[arg(long = "endpoint", env = "SHOWCASE_ENDPOINT", default_value = DEFAULT_ENDPOINT, global = true)]
    endpoint: String,

    /// Directory holding the cached enrichment result.
    #[arg(
        long = "cache-dir",
        value_name = "DIR",
        env = "SHOWCASE_CACHE_DIR",
        default_value = DEFAULT_CACHE_DIR,
        global = true
    )]
    cache_dir: PathBuf,

    /// Lifetime of a cached result in seconds.
    #[arg(
        long = "ttl-secs",
        value_name = "SECONDS",
        env = "SHOWCASE_CACHE_TTL_SECS",
        default_value_t = DEFAULT_CACHE_TTL.as_secs(),
        global = true
    )]
    ttl_secs: u64,
}

impl SettingsArgs
{
    fn to_settings(&self,) -> Result<Settings, Error,>
    {
        let settings = Settings {
            token:     self.token.clone(),
            endpoint:  self.endpoint.clone(),
            cache_ttl: Duration::from_secs(self.ttl_secs,),
            cache_dir: self.cache_dir.clone(),
        };
        settings.validate()?;
        Ok(settings,)
    }
}

#[derive(Debug, Args,)]
/// Arguments accepted by the `refresh` subcommand.
struct RefreshArgs
{
    /// Portfolio document overriding the built-in project registry.
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf,>,

    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,

    /// Neither read nor write the on-disk cache.
    #[arg(long = "no-cache", action = ArgAction::SetTrue)]
    no_cache: bool,
}

#[derive(Debug, Args,)]
struct ProjectsArgs
{
    /// Portfolio document overriding the built-in project registry.
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf,>,

    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,
}

#[derive(Debug, Args,)]
struct PortfolioArgs
{
    /// Portfolio document holding the profile section.
    #[arg(long = "config", value_name = "PATH")]
    config: PathBuf,

    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,
}

#[derive(Debug, Args,)]
struct CacheArgs
{
    #[command(subcommand)]
    command: CacheCommand,
}

#[derive(Debug, Subcommand,)]
enum CacheCommand
{
    /// Remove the cached enrichment result.
    Clear,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main()
{
    init_tracing();

    if let Err(error,) = run(Cli::parse(),).await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

fn init_tracing()
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER,),);
    tracing_subscriber::fmt().with_env_filter(filter,).with_writer(io::stderr,).init();
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates settings, configuration and serialization errors. Failures of
/// the enrichment pipeline itself never reach this point.
async fn run(cli: Cli,) -> Result<(), Error,>
{
    let settings = cli.settings.to_settings()?;

    match cli.command {
        Command::Refresh(args,) => run_refresh(&settings, args,).await,
        Command::Projects(args,) => run_projects(&args,),
        Command::Portfolio(args,) => run_portfolio(&args,),
        Command::Cache(args,) => match args.command {
            CacheCommand::Clear => run_cache_clear(&settings,),
        },
    }
}

fn load_registry(config: Option<&Path,>,) -> Result<Registry, Error,>
{
    match config {
        Some(path,) => Ok(PortfolioConfig::load(path,)?.registry(),),
        None => Ok(Registry::default(),),
    }
}

async fn run_refresh(settings: &Settings, args: RefreshArgs,) -> Result<(), Error,>
{
    let registry = load_registry(args.config.as_deref(),)?;
    let client = GithubClient::new(settings,)?;

    let projects = if args.no_cache {
        refresh_with(settings, registry, client, MemoryStorage::default(),).await
    } else {
        let storage = FileStorage::new(&settings.cache_dir,);
        refresh_with(settings, registry, client, storage,).await
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, &projects, args.pretty,)
}

async fn refresh_with<S: Storage,>(
    settings: &Settings,
    registry: Registry,
    client: GithubClient,
    storage: S,
) -> Vec<showcase::EnrichedProject,>
{
    let orchestrator =
        RefreshOrchestrator::new(registry, client, ExpiringCache::new(storage,), settings.cache_ttl,);
    let progress = tokio::spawn(follow_progress(orchestrator.subscribe(),),);

    let report = orchestrator.refresh_report().await;
    match report.origin {
        RefreshOrigin::Cache => debug!("Served {} projects from cache", report.projects.len()),
        RefreshOrigin::Remote => debug!("Served {} fresh projects", report.projects.len()),
        RefreshOrigin::Fallback => info!(
            "Served static project data{}",
            report.diagnostic.as_ref().map(|e| format!(" ({e})")).unwrap_or_default()
        ),
    }

    drop(orchestrator,);
    if let Err(error,) = progress.await {
        debug!("Progress reporter stopped unexpectedly: {}", error);
    }

    report.projects
}

/// Shows a spinner on stderr while the orchestrator reports a refresh in
/// flight. Returns once the orchestrator is dropped.
async fn follow_progress(mut receiver: watch::Receiver<ProjectsState,>,)
{
    let mut spinner: Option<ProgressBar,> = None;

    while receiver.changed().await.is_ok() {
        let loading = receiver.borrow_and_update().is_loading();
        match (loading, spinner.as_ref(),) {
            (true, None,) => spinner = Some(start_spinner(),),
            (false, Some(active,),) => {
                active.finish_and_clear();
                spinner = None;
            }
            _ => {}
        }
    }

    if let Some(active,) = spinner {
        active.finish_and_clear();
    }
}

fn start_spinner() -> ProgressBar
{
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.yellow} [{elapsed_precise}] {msg}",)
            .unwrap_or_else(|_| ProgressStyle::default_spinner(),),
    );
    spinner.set_message("Fetching repository data from GitHub...",);
    spinner.enable_steady_tick(Duration::from_millis(100,),);
    spinner
}

fn run_projects(args: &ProjectsArgs,) -> Result<(), Error,>
{
    let registry = load_registry(args.config.as_deref(),)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, registry.projects(), args.pretty,)
}

fn run_portfolio(args: &PortfolioArgs,) -> Result<(), Error,>
{
    let profile = load_profile(&args.config,)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, &profile, args.pretty,)
}

fn load_profile(path: &Path,) -> Result<showcase::Profile, Error,>
{
    PortfolioConfig::load(path,)?.profile.ok_or_else(|| {
        Error::validation(format!("{} has no profile section", path.display()),)
    },)
}

fn run_cache_clear(settings: &Settings,) -> Result<(), Error,>
{
    if !ExpiringCache::new(FileStorage::new(&settings.cache_dir,),).clear() {
        return Err(Error::cache(format!(
            "failed to clear cache in {}",
            settings.cache_dir.display()
        ),),);
    }
    info!("Cleared cache in {}", settings.cache_dir.display());
    Ok((),)
}

fn write_json<W: io::Write, T: Serialize + ?Sized,>(
    writer: &mut W,
    value: &T,
    pretty: bool,
) -> Result<(), Error,>
{
    if pretty {
        serde_json::to_writer_pretty(writer, value,)?;
    } else {
        serde_json::to_writer(writer, value,)?;
    }

    Ok((),)
}
