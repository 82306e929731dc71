use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use composer::{AnimeRecord, MarkdownMeasurer, PaginatedComposer};
use parser::{TitleFilter, TitleParser, extract_fansub_groups};
use rss::{FeedKind, FeedUrl, RssClient};
use server::{Config, ErrorNotifierLayer, create_error_channel};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "herald")]
#[command(version = env!("APP_VERSION"))]
#[command(about = "Watches fansub release feeds and publishes new episodes", long_about = None)]
struct Cli {
    /// Data directory holding settings.toml and store.json
    #[arg(short, long, global = true, default_value = "./data")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll the configured feeds and publish releases until Ctrl-C
    Run,
    /// Parse a release title and print the result as JSON
    Parse {
        title: String,
        /// Publishing team; defaults to the first group of the title
        #[arg(short, long)]
        team: Option<String>,
    },
    /// Check whether a title passes the release filter
    Filter { title: String },
    /// Render the navigation card pages of a show stored as JSON
    Compose {
        file: PathBuf,
        /// Date used for the airing tag, YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Fetch one feed and list the items that pass the filter
    Feed {
        url: String,
        #[arg(short, long, value_enum, default_value_t = FeedArg::Dmhy)]
        kind: FeedArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FeedArg {
    Bangumi,
    Dmhy,
    Acgnx,
}

impl From<FeedArg> for FeedKind {
    fn from(arg: FeedArg) -> Self {
        match arg {
            FeedArg::Bangumi => FeedKind::Bangumi,
            FeedArg::Dmhy => FeedKind::Dmhy,
            FeedArg::Acgnx => FeedKind::Acgnx,
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run => {
            let (sender, receiver) = create_error_channel();
            tracing_subscriber::registry()
                .with(env_filter())
                .with(tracing_subscriber::fmt::layer())
                .with(ErrorNotifierLayer::new(sender))
                .init();

            tracing::info!("herald {} starting", env!("APP_VERSION"));
            server::run_watcher(Config::new(cli.config), receiver)
                .await
                .map_err(|e| -> Box<dyn std::error::Error> { e })?;
        }
        Command::Parse { title, team } => {
            init_logging();
            let team = team.or_else(|| extract_fansub_groups(&title).into_iter().next());
            let release = TitleParser::default().parse(&title, team.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&release)?);
        }
        Command::Filter { title } => {
            init_logging();
            if TitleFilter::new().allow(&title) {
                println!("allowed");
            } else {
                println!("rejected");
                std::process::exit(1);
            }
        }
        Command::Compose { file, date } => {
            init_logging();
            let content = tokio::fs::read_to_string(&file).await?;
            let anime: AnimeRecord = serde_json::from_str(&content)?;
            let composer = PaginatedComposer::default();
            let pages = match date {
                Some(date) => composer.compose_at(&MarkdownMeasurer, &anime, date).await?,
                None => composer.compose(&MarkdownMeasurer, &anime).await?,
            };
            for (index, page) in pages.iter().enumerate() {
                let label = if index == 0 {
                    "card".to_string()
                } else {
                    format!("page {}", index)
                };
                println!("===== {} =====\n{}\n", label, page);
            }
        }
        Command::Feed { url, kind } => {
            init_logging();
            let feed = FeedUrl::new(kind.into(), url);
            let client = RssClient::with_client(reqwest::Client::new(), vec![feed.clone()]);
            for item in client.fetch(&feed).await? {
                println!("{}\t{}", item.pub_date, item.title);
            }
        }
    }

    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();
}
