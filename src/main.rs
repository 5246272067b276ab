use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use podcast_feed_server::config::{AppConfig, CliConfig, FileConfig};
use podcast_feed_server::rss::render_feed;
use podcast_feed_server::{run_server, FeedSynthesizer, RequestsLoggingLevel};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Base URL clients reach this server at, e.g. http://podcasts.lan:9111.
    #[clap(long)]
    pub external: Option<String>,

    /// Directory whose subdirectories are served as feeds.
    #[clap(long, value_parser = parse_path)]
    pub directory: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 9111)]
    pub port: u16,

    /// The address to listen on.
    #[clap(long, default_value = "0.0.0.0")]
    pub host: String,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// The maximum age of downloaded media in client caches, in seconds.
    #[clap(long, default_value_t = 3600)]
    pub content_cache_age_sec: usize,

    /// TOML file whose values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Render the feed of this collection to stdout and exit.
    #[clap(long)]
    pub print_feed: Option<String>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            base_url: self.external.clone(),
            media_root: self.directory.clone(),
            host: self.host.clone(),
            port: self.port,
            logging_level: self.logging_level.clone(),
            content_cache_age_sec: self.content_cache_age_sec,
        }
    }
}

fn print_feed(synthesizer: &FeedSynthesizer, name: &str) -> Result<()> {
    let synthesis = synthesizer
        .synthesize(name)
        .with_context(|| format!("Failed to resolve feed {:?}", name))?;
    for problem in synthesis.problems.iter() {
        warn!("{:?}", problem);
    }
    let xml = render_feed(&synthesis.feed).context("Failed to render feed")?;
    println!("{}", xml);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    let synthesizer = FeedSynthesizer::new(app_config.feed_config());

    if let Some(name) = &cli_args.print_feed {
        return print_feed(&synthesizer, name);
    }

    info!(
        "Found {} collections in {:?}",
        synthesizer.list_collections().len(),
        app_config.media_root
    );

    run_server(synthesizer, app_config.server_config()).await
}
