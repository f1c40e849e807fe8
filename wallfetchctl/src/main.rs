//! Thin CLI over `wallfetch-core`.

mod args;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wallfetch_core::{
    AcquisitionPipeline, CandidatePools, GsettingsSetter, HistoryStore, HttpDownloader,
    ImageCache, JsonHistoryStore, LocalSource, RandomMode, SourceRegistry, UnknownResolution,
    probe::{FixedResolution, ResolutionProbe},
};
use wallfetch_model::FetchQuery;

use args::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_root = match &cli.data_root {
        Some(root) => root.clone(),
        None => dirs::data_dir()
            .context("could not determine the platform data directory")?
            .join("wallfetch"),
    };

    let history = Arc::new(JsonHistoryStore::new(data_root.join("history.json")));
    let probe: Arc<dyn ResolutionProbe> = match cli.resolution {
        Some(resolution) => Arc::new(FixedResolution(resolution)),
        None => Arc::new(UnknownResolution),
    };

    let mut sources = SourceRegistry::new();
    sources.register(Arc::new(LocalSource::new()));

    let pipeline = AcquisitionPipeline::new(
        sources,
        ImageCache::new(data_root.join("cache")),
        Arc::new(HttpDownloader::new()),
        probe,
        Arc::new(GsettingsSetter::new()),
        history.clone(),
        data_root.join("current.jpg"),
    );

    run(cli.cmd, &pipeline, history.as_ref(), &data_root).await
}

async fn run(
    cmd: Command,
    pipeline: &AcquisitionPipeline,
    history: &JsonHistoryStore,
    data_root: &Path,
) -> anyhow::Result<()> {
    match cmd {
        Command::Fetch { source, query } => {
            let installed = pipeline
                .acquire_and_install(&FetchQuery::new(source, query))
                .await?;
            println!(
                "installed {} ({}x{}) from {}",
                installed.id, installed.width, installed.height, installed.source
            );
        }

        Command::Set { id } => {
            let pool = history.all().await?;
            pipeline.install_from_known(&id, &pool, "history").await?;
            println!("installed {id}");
        }

        Command::Random => {
            let pools = CandidatePools {
                history: history.all().await?,
                ..Default::default()
            };
            pipeline.install_random(&pools, RandomMode::History).await?;
        }

        Command::Current => match history.current().await? {
            Some(current) => println!(
                "{} ({}x{}) from {} by {}",
                current.id, current.width, current.height, current.source, current.author
            ),
            None => println!("no wallpaper installed yet"),
        },

        Command::Cleanup => {
            let valid: HashSet<String> =
                history.all().await?.into_iter().map(|w| w.id).collect();
            let report = pipeline.cache().reconcile(&valid).await?;
            info!(data_root = %data_root.display(), "cache reconciled");
            println!(
                "removed {} stale cache file(s), {} failure(s)",
                report.removed.len(),
                report.failed.len()
            );
        }
    }

    Ok(())
}
