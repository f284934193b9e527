//! # Goodscribe
//!
//! Scrapes a product listing (title, primary image, video) from a pasted link
//! and writes marketing copy for it.
//!
//! ## Architecture
//!
//! Goodscribe runs a two-tier scrape followed by copy generation:
//!
//! ```text
//! Normalizer → StaticScraper → (if incomplete) ChromeRenderer → merge → CopyWriter
//!                                    ↕
//!                               SessionStore
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Scrape and write copy
//! goodscribe run "https://mobile.yangkeduo.com/goods.html?goods_id=123"
//!
//! # Log in once so the browser tier can see login-only pages
//! goodscribe login "https://mobile.yangkeduo.com/goods.html?goods_id=123"
//!
//! # Check how share text is parsed
//! goodscribe normalize "【好物】https://... 快来看"
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the pipeline
/// and the session store from a loaded [`Config`](config::Config).
pub mod app;

/// Command-line interface using clap.
///
/// - `run <text>` - Scrape and generate copy
/// - `login <text>` - Log in through a visible browser
/// - `normalize <text>` - Show the parsed link
pub mod cli;

/// Configuration loaded from `~/.config/goodscribe/config.toml` with
/// environment overrides.
pub mod config;

/// Core domain models.
///
/// - [`ProductLink`](domain::ProductLink): Parsed input link
/// - [`ScrapeResult`](domain::ScrapeResult): Title, image and video from one tier
/// - [`LoginSession`](domain::LoginSession): Saved browser cookies
/// - [`ProductReport`](domain::ProductReport): Final output with diagnostics
pub mod domain;

/// Field extraction rules shared by both scrape tiers.
pub mod extract;

/// Static HTTP tier.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for page fetching
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
/// - [`StaticScraper`](fetcher::StaticScraper): Tries each candidate URL in order
pub mod fetcher;

/// Marketing copy generation with an AI service and a local template fallback.
pub mod generator;

/// Turns pasted share text into a [`ProductLink`](domain::ProductLink).
pub mod normalizer;

/// Orchestration of one scrape-and-write run.
pub mod pipeline;

/// Browser rendering tier.
///
/// Uses Chrome via chromiumoxide to render pages the static tier could not
/// read, watching network traffic for media and detecting login walls.
///
/// - [`ChromeRenderer`](scraper::ChromeRenderer): Chrome-based renderer
/// - [`ScraperConfig`](scraper::ScraperConfig): Configuration options
/// - [`Renderer`](scraper::Renderer): Async trait for rendering implementations
pub mod scraper;

/// Login session persistence.
///
/// - [`SessionStore`](store::SessionStore): Load/save trait
/// - [`FileSessionStore`](store::FileSessionStore): JSON file implementation
pub mod store;
