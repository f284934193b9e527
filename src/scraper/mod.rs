//! Browser rendering tier.
//!
//! Used when the static tier could not find both a title and an image. The
//! page is loaded in a real browser with the saved login session, given time
//! to run its scripts, and then read three ways: the rendered HTML through
//! the shared extraction rules, live media elements, and the page's own
//! network traffic.
//!
//! # Architecture
//!
//! ```text
//! ProductLink → ChromeRenderer → PageSnapshot + NetworkMedia → conclude → RenderOutcome
//!                    ↑                                             ↓
//!              SessionStore::load                           SessionStore::save
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use goodscribe::scraper::{ChromeRenderer, Renderer, ScraperConfig};
//!
//! let renderer = ChromeRenderer::new(ScraperConfig::default(), link_config, store);
//! match renderer.render(&link, None).await? {
//!     RenderOutcome::Rendered { result, .. } => println!("{:?}", result.title),
//!     RenderOutcome::LoginRequired { url } => println!("log in at {url}"),
//! }
//! ```

mod browser;
mod chrome;
mod config;
mod extractor;
pub mod login;
pub mod network;
mod window;

pub use chrome::ChromeRenderer;
pub use config::ScraperConfig;
pub use login::{login_wall, PageSnapshot};
pub use network::NetworkMedia;
pub use window::{LoginWindow, OpenLoginWindow};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::app::Result;
use crate::domain::{LoginSession, MediaCandidates, ProductLink, ScrapeResult, Source};
use crate::extract::{extract_page, media};
use crate::normalizer::LinkConfig;
use crate::store::SessionStore;

/// What a render produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered {
        result: ScrapeResult,
        /// Media seen while rendering, for diagnostics
        candidates: MediaCandidates,
    },
    /// The page sits behind a login wall; nothing was saved
    LoginRequired { url: String },
}

/// Trait for page rendering implementations
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render `link`, sending `cookie` along with the saved session.
    ///
    /// Launch, navigation and timeout failures are errors.
    async fn render(&self, link: &ProductLink, cookie: Option<&str>) -> Result<RenderOutcome>;
}

/// Build a result from everything a render observed.
///
/// The title comes from the rendered HTML. Images prefer markup over live
/// elements over network traffic. Videos prefer network traffic, where the
/// real stream URL shows up, over anything found in the DOM. Every image and
/// video considered is kept as a candidate.
pub fn assemble(
    snapshot: &PageSnapshot,
    network: NetworkMedia,
    link_config: &LinkConfig,
) -> (ScrapeResult, MediaCandidates) {
    let page = extract_page(&snapshot.html, link_config);

    let images = media::dedup_by_path(
        page.images
            .into_iter()
            .chain(snapshot.dom_images.iter().cloned())
            .chain(network.images)
            .filter(|u| media::is_product_image(u)),
    );
    let videos = media::dedup_by_path(
        network
            .videos
            .into_iter()
            .chain(page.videos)
            .chain(snapshot.dom_videos.iter().cloned()),
    );

    let mut candidates = MediaCandidates {
        network_urls_count: network.response_count,
        ..Default::default()
    };
    candidates.add_images(images.iter().cloned());
    candidates.add_videos(videos.iter().cloned());
    candidates.add_json_videos(network.json_videos);

    let result = ScrapeResult {
        title: page.title,
        image_url: images.into_iter().next(),
        video_url: videos.into_iter().find(|v| media::is_playable_video(v)),
        source: Source::Dynamic,
    };
    (result, candidates)
}

/// Decide the outcome of a finished render and persist the session if it succeeded.
///
/// A login wall never overwrites the saved session. A failed save is logged
/// and does not fail the render.
pub fn conclude(
    snapshot: &PageSnapshot,
    network: NetworkMedia,
    config: &ScraperConfig,
    link_config: &LinkConfig,
    store: &dyn SessionStore,
) -> RenderOutcome {
    if let Some(reason) = login_wall(snapshot, config) {
        warn!("Login required at {} ({})", snapshot.final_url, reason);
        return RenderOutcome::LoginRequired {
            url: snapshot.final_url.clone(),
        };
    }

    let (result, candidates) = assemble(snapshot, network, link_config);
    info!(
        "Rendered {}: title={} image={} video={}",
        snapshot.final_url,
        result.title.is_some(),
        result.image_url.is_some(),
        result.video_url.is_some()
    );

    if !snapshot.cookies.is_empty() {
        if let Err(e) = store.save(&LoginSession::new(snapshot.cookies.clone())) {
            warn!("Failed to save login session: {}", e);
        }
    }

    RenderOutcome::Rendered { result, candidates }
}
