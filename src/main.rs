use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cds_scout::config::{CrawlSettings, DEFAULT_LATEST_COUNT};
use cds_scout::crawl::{CrawlResult, HttpFetcher, crawl};
use cds_scout::download::{download_artifact, installer_url, unpack_installer};

#[derive(Parser)]
#[command(name = "cds-scout")]
#[command(version, about = "Discover and fetch VMware Workstation installers from a CDS mirror")]
struct Cli {
    #[command(flatten)]
    crawl: CrawlArgs,

    #[command(subcommand)]
    command: Command,
}

/// Crawl options shared by every subcommand. Flags override the settings
/// file, which overrides the built-in mirror defaults.
#[derive(Args)]
struct CrawlArgs {
    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root mirror listing URL
    #[arg(long, global = true)]
    mirror: Option<String>,

    /// Platform directory token
    #[arg(long, global = true)]
    platform: Option<String>,

    /// Category directory token
    #[arg(long, global = true)]
    category: Option<String>,

    /// Required installer file-name suffix
    #[arg(long, global = true)]
    suffix: Option<String>,

    /// Maximum branches crawled at once
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Overall crawl deadline in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl the mirror and list every installer in version order
    List,
    /// Show only the newest installers
    Latest {
        /// How many to show
        #[arg(short = 'n', long, default_value_t = DEFAULT_LATEST_COUNT)]
        count: usize,
    },
    /// Download one installer and unpack the inner executable
    Download {
        /// Installer file name as printed by `list`, or "latest"
        name: String,

        /// Directory to download and unpack into
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Keep the downloaded tar wrapper after unpacking
        #[arg(long)]
        keep_archive: bool,
    },
}

impl CrawlArgs {
    fn settings(&self) -> anyhow::Result<CrawlSettings> {
        let mut settings = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read settings file {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("Invalid settings file {}", path.display()))?
            }
            None => CrawlSettings::default(),
        };

        if let Some(mirror) = &self.mirror {
            settings.mirror = mirror.clone();
        }
        if let Some(platform) = &self.platform {
            settings.platform_token = platform.clone();
        }
        if let Some(category) = &self.category {
            settings.category_token = category.clone();
        }
        if let Some(suffix) = &self.suffix {
            settings.artifact_suffix = suffix.clone();
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = concurrency;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            settings.timeout_secs = timeout_secs;
        }
        Ok(settings)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.crawl.settings()?;
    let client = reqwest::Client::builder().user_agent("cds-scout").build()?;
    let fetcher = HttpFetcher::with_client(client.clone());

    match cli.command {
        Command::List => {
            let result = crawl(&fetcher, &settings.crawl_config()).await?;
            print_installers(result.artifacts());
        }
        Command::Latest { count } => {
            let result = crawl(&fetcher, &settings.crawl_config()).await?;
            print_installers(&result.latest(count));
        }
        Command::Download {
            name,
            dir,
            keep_archive,
        } => {
            let name = resolve_name(&fetcher, &settings, name).await?;
            let url = installer_url(&settings.mirror, &name)?;

            let archive = download_artifact(&client, &url, &dir).await?;

            let archive_path = archive.clone();
            let unpack_dir = dir.clone();
            let installer =
                tokio::task::spawn_blocking(move || unpack_installer(&archive_path, &unpack_dir))
                    .await
                    .context("Unpack task failed")??;

            if !keep_archive {
                tokio::fs::remove_file(&archive)
                    .await
                    .with_context(|| format!("Failed to remove {}", archive.display()))?;
            }

            println!("{}", installer.display());
        }
    }

    Ok(())
}

/// Resolve the special name "latest" to the newest discovered installer.
async fn resolve_name(
    fetcher: &HttpFetcher,
    settings: &CrawlSettings,
    name: String,
) -> anyhow::Result<String> {
    if name != "latest" {
        return Ok(name);
    }

    let result: CrawlResult = crawl(fetcher, &settings.crawl_config()).await?;
    result
        .latest(1)
        .first()
        .cloned()
        .context("No installers available")
}

fn print_installers(names: &[String]) {
    if names.is_empty() {
        println!("No installers available.");
        return;
    }
    for name in names {
        println!("{name}");
    }
}
