use std::fs::{self, File};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use newsum::app::AppContext;
use newsum::cli::{commands, Cli, Commands, PrefsAction};
use newsum::config::Config;

/// The TUI owns the terminal, so its logs go to `<data dir>/newsum/newsum.log`.
fn init_tracing(to_file: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if to_file {
        let dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?
            .join("newsum");
        fs::create_dir_all(&dir)?;
        let file = File::options()
            .create(true)
            .append(true)
            .open(dir.join("newsum.log"))?;

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(Arc::new(file)).with_ansi(false))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Commands::Tui))?;

    let config = Config::load(cli.config.as_deref())?;
    let ctx = AppContext::new(config, cli.base_url.as_deref())?;

    match cli.command {
        Commands::Headlines { json } => {
            commands::list_headlines(&ctx, json).await?;
        }
        Commands::Show { index } => {
            commands::show_headline(&ctx, index).await?;
        }
        Commands::Latest => {
            commands::list_latest(&ctx).await?;
        }
        Commands::Prefs { action } => match action {
            PrefsAction::TextScale { value } => commands::text_scale(&ctx, value)?,
        },
        Commands::Tui => {
            newsum::tui::run(Arc::new(ctx)).await?;
        }
        Commands::About => commands::about(),
    }

    Ok(())
}
