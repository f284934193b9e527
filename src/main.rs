use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use goodscribe::app::AppContext;
use goodscribe::cli::commands::{self, RunOptions};
use goodscribe::cli::{Cli, Commands};
use goodscribe::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Commands::Run {
        preset: Some(preset),
        ..
    } = &cli.command
    {
        config.scraper.apply_timing(&preset.scraper_config());
    }
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Run {
            text,
            cookie,
            login_confirmed,
            json,
            no_prompt,
            ..
        } => {
            let options = RunOptions {
                cookie,
                login_confirmed,
                json,
                no_prompt,
            };
            commands::run(&ctx, &text, options).await?;
        }
        Commands::Login { text } => {
            commands::login(&ctx, &text).await?;
        }
        Commands::Normalize { text, json } => {
            commands::normalize(&ctx, &text, json)?;
        }
    }

    Ok(())
}
