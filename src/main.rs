use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use radar::app::{App, Command};
use radar::catalog::View;
use radar::{ArcPath, ArcStr};

#[derive(Parser)]
#[command(name = "radar")]
#[command(about = "Browse and search the anime, manga and manhwa catalog")]
struct Cli {
    /// Catalog segment to browse
    #[arg(short, long, default_value = "anime")]
    view: View,
    /// Search text; the top listing is shown when empty
    #[arg(short, long, default_value = "")]
    search: String,
    /// Path of the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => ArcPath::from(path),
        None => default_config_path()?,
    };

    let app = App::build(config_path).await?;
    app.resolve(Command::Browse {
        view: cli.view,
        search: ArcStr::from(cli.search),
    })
    .await
}

fn default_config_path() -> anyhow::Result<ArcPath> {
    let home = std::env::var("HOME").context("Reading HOME")?;
    let path = Path::new(&home)
        .join(".config")
        .join("radar")
        .join("config.toml");
    Ok(ArcPath::from(path))
}
