use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wallfetch_model::DisplayResolution;

#[derive(Debug, Parser)]
#[command(name = "wallfetchctl", version, about = "Fetch, validate and install desktop wallpapers")]
pub struct Cli {
    /// Data root holding the cache and history (default: platform data dir).
    #[arg(long, global = true)]
    pub data_root: Option<PathBuf>,

    /// Display resolution as WIDTHxHEIGHT, e.g. 1920x1080. Omitted means
    /// "accept the first decodable image".
    #[arg(long, global = true)]
    pub resolution: Option<DisplayResolution>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Acquire a fresh wallpaper from a source and install it.
    Fetch {
        /// Source provider name.
        #[arg(long, default_value = "local")]
        source: String,
        /// Provider-specific query; the local source expects a folder path.
        #[arg(long, default_value = "")]
        query: String,
    },
    /// Re-apply a wallpaper already recorded in history.
    Set { id: String },
    /// Install a random wallpaper from history.
    Random,
    /// Show the currently installed wallpaper.
    Current,
    /// Delete cached images no longer referenced by history.
    Cleanup,
}
