pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};

use crate::scraper::ScraperConfig;

#[derive(Parser)]
#[command(name = "goodscribe")]
#[command(about = "Scrape a product link and write marketing copy for it", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape a product and generate copy
    Run {
        /// Product URL or pasted share text
        text: String,

        /// Cookie header value sent with every request
        #[arg(short, long)]
        cookie: Option<String>,

        /// You have logged in since the last attempt
        #[arg(long)]
        login_confirmed: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Do not open a login window when the page asks for login
        #[arg(long)]
        no_prompt: bool,

        /// Browser timing preset, overriding the configured waits
        #[arg(long, value_enum)]
        preset: Option<Preset>,
    },
    /// Open a browser window to log in and save the session
    Login {
        /// Product URL or pasted share text to open
        text: String,
    },
    /// Show how a link is parsed, without fetching anything
    Normalize {
        /// Product URL or pasted share text
        text: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Browser timing presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Short waits; may miss late-loading media
    Fast,
    /// Long waits for slow pages
    Thorough,
}

impl Preset {
    pub fn scraper_config(self) -> ScraperConfig {
        match self {
            Preset::Fast => ScraperConfig::fast(),
            Preset::Thorough => ScraperConfig::thorough(),
        }
    }
}
