pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "newsum")]
#[command(about = "A terminal reader for summarized news headlines", long_about = None)]
pub struct Cli {
    /// API root, overriding `[api] base_url` from the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Config file to use instead of ~/.config/newsum/config.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch and list the current headlines
    Headlines {
        /// Print the decoded headlines as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fetch the headlines and print one in full
    Show {
        /// Position in the list printed by `headlines`
        index: usize,
    },
    /// Fetch and list the latest article summaries
    Latest,
    /// Show or change stored preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
    /// Launch the TUI
    Tui,
    /// What newsum is for
    About,
}

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Show the text scale, or set it (0.8 to 1.4, steps of 0.1)
    TextScale { value: Option<f64> },
}
