use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{TimeZone, Utc};
use clap::Parser;
use folio_cache::{MemoryStore, SnapshotCache, SnapshotStore, SqliteStore};
use folio_core::render::updated_label;
use folio_core::{
    apply_controls, Config, Controls, Gallery, GitHubProvider, HtmlPage, Loaded, ProjectsGallery,
    Repository, SortMode,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Cache slot shared by every command
const CACHE_KEY: &str = "projects-gallery";

#[derive(Parser)]
#[command(name = "folio")]
#[command(version, about = "Projects gallery for a GitHub profile", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/folio/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Profile whose repositories are shown, e.g. https://github.com/octocat
    #[arg(long, global = true)]
    profile_url: Option<String>,

    /// GitHub token, enables pinned repositories
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Repository name pattern to hide (repeatable, `*` is a wildcard)
    #[arg(long, global = true)]
    exclude: Vec<String>,

    /// Page size of the repository listing
    #[arg(long, global = true)]
    per_page: Option<u32>,

    /// Keep pinned repositories in listing order
    #[arg(long, global = true)]
    no_pinned_first: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Render the gallery page to an HTML file
    Build {
        /// Output file
        #[arg(short, long, default_value = "index.html")]
        out: PathBuf,

        /// Page template containing a {{projects}} slot
        #[arg(short, long)]
        template: Option<PathBuf>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Ignore a fresh cache and fetch again
        #[arg(long)]
        refresh: bool,
    },
    /// Print the filtered projects as a table
    List {
        #[command(flatten)]
        filters: FilterArgs,

        /// Ignore a fresh cache and fetch again
        #[arg(long)]
        refresh: bool,
    },
    /// Browse the gallery in the terminal
    Browse {
        /// Ignore a fresh cache and fetch again
        #[arg(long)]
        refresh: bool,
    },
    /// Inspect or clear the cached projects
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(clap::Subcommand)]
enum CacheAction {
    /// Show what is cached and how old it is
    Show,
    /// Drop the cached projects
    Clear,
}

#[derive(clap::Args, Debug, Default)]
struct FilterArgs {
    /// Free-text search over name, description and topics
    #[arg(short, long, default_value = "")]
    query: String,

    /// Only this language
    #[arg(short, long)]
    language: Option<String>,

    /// Only repositories tagged with this topic
    #[arg(long)]
    topic: Option<String>,

    /// pinned, stars, updated or az
    #[arg(short, long, default_value = "pinned")]
    sort: SortMode,

    /// Only the first entries of the gallery
    #[arg(long)]
    pinned_only: bool,
}

impl FilterArgs {
    fn controls(&self) -> Controls {
        Controls {
            query: self.query.clone(),
            language: self.language.clone(),
            topic: self.topic.clone(),
            sort: self.sort,
            pinned_only: self.pinned_only,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The terminal panel owns the screen, so it gets no log output
    if !matches!(cli.command, Commands::Browse { .. }) {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "folio=info".into()),
            )
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Build {
            out,
            template,
            filters,
            refresh,
        } => {
            let template = match template {
                Some(path) => Some(
                    std::fs::read_to_string(path)
                        .with_context(|| format!("Failed to read template {}", path.display()))?,
                ),
                None => None,
            };

            let (html, shown, total) =
                render_page(&config, template, filters.controls(), *refresh).await?;

            std::fs::write(out, html)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            tracing::info!("Wrote {} ({} of {} projects)", out.display(), shown, total);
            println!("{}", out.display());
        }
        Commands::List { filters, refresh } => {
            let (loaded, _, _) = load(&config, *refresh).await?;
            let visible = apply_controls(&loaded.repos, &filters.controls());
            print_table(&visible);
        }
        Commands::Browse { refresh } => {
            let (loaded, username, _) = load(&config, *refresh).await?;
            folio_tui::run_tui(loaded, &username)?;
        }
        Commands::Cache { action } => {
            let cache = SnapshotCache::with_ttl(open_store(&config)?, config.cache.ttl()?);
            match action {
                CacheAction::Show => match cache.load::<Repository>() {
                    Some(snapshot) => {
                        let now = Utc::now();
                        let taken = Utc
                            .timestamp_millis_opt(snapshot.timestamp)
                            .single()
                            .map(|t| t.to_rfc3339())
                            .unwrap_or_else(|| snapshot.timestamp.to_string());
                        println!("Slot:     {}", cache.store().key());
                        println!("Written:  {}", taken);
                        match snapshot.age(now) {
                            Some(age) => println!("Age:      {}s", age.num_seconds()),
                            None => println!("Age:      unknown"),
                        }
                        println!(
                            "Fresh:    {}",
                            if snapshot.is_fresh(now, cache.ttl()) { "yes" } else { "no" }
                        );
                        println!("Projects: {}", snapshot.data.len());
                    }
                    None => println!("Nothing cached"),
                },
                CacheAction::Clear => {
                    cache.clear()?;
                    println!("Cache cleared");
                }
            }
        }
    }

    Ok(())
}

/// Config file overlaid with command-line flags
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(url) = &cli.profile_url {
        config.gallery.profile_url = Some(url.clone());
    }
    if let Some(token) = &cli.token {
        config.gallery.github_token = Some(token.clone());
    }
    if !cli.exclude.is_empty() {
        config.gallery.exclude.extend(cli.exclude.iter().cloned());
    }
    if let Some(per_page) = cli.per_page {
        config.gallery.per_page = per_page;
    }
    if cli.no_pinned_first {
        config.gallery.pinned_first = false;
    }

    Ok(config)
}

fn open_store(config: &Config) -> anyhow::Result<SqliteStore> {
    let db_path = config.cache.db_path()?;
    SqliteStore::open(&db_path, CACHE_KEY)
        .with_context(|| format!("Failed to open cache at {}", db_path.display()))
}

/// Cache for a load cycle; an unusable SQLite slot degrades to memory
fn gallery_cache(config: &Config) -> anyhow::Result<SnapshotCache<Arc<dyn SnapshotStore>>> {
    let ttl = config.cache.ttl()?;
    let store: Arc<dyn SnapshotStore> = match open_store(config) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!("Cache unavailable, continuing without it: {:#}", e);
            Arc::new(MemoryStore::new())
        }
    };
    Ok(SnapshotCache::with_ttl(store, ttl))
}

/// Run one load cycle; returns the records plus owner details
async fn load(config: &Config, refresh: bool) -> anyhow::Result<(Loaded, String, String)> {
    let options = config.gallery_options(refresh)?;
    let provider = GitHubProvider::with_base_url(
        config.gallery.github_token.clone(),
        config.gallery.api_url.clone(),
    )?;
    let gallery = ProjectsGallery::new(options, provider, gallery_cache(config)?)?;

    let loaded = gallery.load().await;
    tracing::info!("Loaded {} projects ({:?})", loaded.repos.len(), loaded.origin);

    Ok((
        loaded,
        gallery.username().to_string(),
        gallery.profile_url().to_string(),
    ))
}

/// Load and render the page; returns the HTML plus shown and total counts
async fn render_page(
    config: &Config,
    template: Option<String>,
    controls: Controls,
    refresh: bool,
) -> anyhow::Result<(String, usize, usize)> {
    let (loaded, username, profile_url) = load(config, refresh).await?;
    let page = match template {
        Some(template) => HtmlPage::mount(template, controls)?,
        None => HtmlPage::with_default_template(controls),
    }
    .with_profile(&username, &profile_url);

    let gallery = Gallery::mount(loaded.repos, page);
    let shown = gallery.visible_count();
    let total = gallery.repos().len();
    Ok((gallery.into_view().to_html(), shown, total))
}

fn print_table(repos: &[Repository]) {
    if repos.is_empty() {
        println!("{}", folio_core::render::EMPTY_STATE);
        return;
    }

    let now = Utc::now();
    let width = repos.iter().map(|r| r.name.chars().count()).max().unwrap_or(4).max(4);

    println!(
        "{:<width$}  {:>6}  {:>5}  {:<12}  {:>8}  {}",
        "NAME", "STARS", "FORKS", "LANGUAGE", "UPDATED", "PIN",
        width = width
    );
    for repo in repos {
        println!(
            "{:<width$}  {:>6}  {:>5}  {:<12}  {:>8}  {}",
            repo.name,
            repo.stars,
            repo.forks,
            repo.language,
            updated_label(repo, now),
            if repo.pinned { "*" } else { "" },
            width = width
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_build_flags() {
        let cli = Cli::try_parse_from([
            "folio",
            "--profile-url",
            "https://github.com/octo",
            "--exclude",
            "dotfiles",
            "--exclude",
            "*-old",
            "build",
            "--out",
            "site/index.html",
            "--sort",
            "stars",
            "--pinned-only",
        ])
        .unwrap();

        assert_eq!(cli.exclude, vec!["dotfiles", "*-old"]);
        match cli.command {
            Commands::Build { out, filters, .. } => {
                assert_eq!(out, PathBuf::from("site/index.html"));
                assert_eq!(filters.sort, SortMode::Stars);
                assert!(filters.pinned_only);
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[gallery]\nprofile_url = \"https://github.com/file\"\nper_page = 30\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "folio",
            "--config",
            path.to_str().unwrap(),
            "--profile-url",
            "https://github.com/flag",
            "--no-pinned-first",
            "list",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();

        assert_eq!(
            config.gallery.profile_url.as_deref(),
            Some("https://github.com/flag")
        );
        assert_eq!(config.gallery.per_page, 30);
        assert!(!config.gallery.pinned_first);
    }

    #[tokio::test]
    async fn test_unusable_cache_still_renders_placeholder() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let mut config = Config::default();
        config.gallery.profile_url = Some("https://github.com/octo".to_string());
        config.gallery.api_url = "http://127.0.0.1:9".to_string();
        config.cache.path = Some(blocker.join("folio").join("cache.db"));

        let (html, shown, total) = render_page(&config, None, Controls::default(), false)
            .await
            .unwrap();

        assert_eq!((shown, total), (1, 1));
        assert!(html.contains("<h3 class=\"project-title\">profile</h3>"));
    }

    #[test]
    fn test_out_of_range_ttl_is_a_config_error() {
        let mut config = Config::default();
        config.cache.ttl_secs = i64::MAX;
        assert!(gallery_cache(&config).is_err());
    }

    #[test]
    fn test_unknown_sort_is_rejected() {
        assert!(Cli::try_parse_from(["folio", "list", "--sort", "random"]).is_err());
    }
}
