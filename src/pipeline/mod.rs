//! One scrape-and-write run per user action.
//!
//! ```text
//! text → Normalizer → StaticScraper ──complete─────────┐
//!                          │                            ↓
//!                      incomplete → Renderer → merge → CopyWriter → ProductReport
//!                                      │
//!                                login wall → Outcome::AwaitingLogin
//! ```

pub mod merge;

pub use merge::merge;

use std::sync::Arc;

use tracing::{info, warn};

use crate::app::{GoodscribeError, Result};
use crate::domain::{Diagnostics, DynamicStatus, ProductReport, ScrapeResult};
use crate::fetcher::StaticScraper;
use crate::generator::CopyWriter;
use crate::normalizer::Normalizer;
use crate::scraper::{RenderOutcome, Renderer};

/// What the user submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub raw_text: String,
    /// Raw `Cookie` header value, sent by both tiers
    pub cookie: Option<String>,
    /// The user says they have logged in since the last attempt
    pub login_confirmed: bool,
}

impl ScrapeRequest {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            ..Default::default()
        }
    }

    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

/// A run stopped at a login wall, waiting for the user.
#[derive(Debug, Clone)]
pub struct LoginCheckpoint {
    /// Where the browser hit the wall
    pub url: String,
    /// The page to log in on
    pub login_url: String,
    pub request: ScrapeRequest,
    /// What the static tier had found
    pub partial: ScrapeResult,
    pub diagnostics: Diagnostics,
}

impl LoginCheckpoint {
    /// The request to resubmit once the user has logged in.
    pub fn confirm(self) -> ScrapeRequest {
        ScrapeRequest {
            login_confirmed: true,
            ..self.request
        }
    }
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Completed(ProductReport),
    AwaitingLogin(LoginCheckpoint),
}

pub struct Pipeline {
    normalizer: Normalizer,
    static_scraper: StaticScraper,
    renderer: Arc<dyn Renderer>,
    writer: Arc<dyn CopyWriter>,
}

impl Pipeline {
    pub fn new(
        normalizer: Normalizer,
        static_scraper: StaticScraper,
        renderer: Arc<dyn Renderer>,
        writer: Arc<dyn CopyWriter>,
    ) -> Self {
        Self {
            normalizer,
            static_scraper,
            renderer,
            writer,
        }
    }

    /// Scrape the linked product and write copy for it.
    ///
    /// The browser is only started when the static tier comes back without a
    /// title or image. A browser failure degrades to the static result. Copy
    /// is only written for a complete result; an incomplete one is an
    /// [`GoodscribeError::IncompleteResult`]. A login wall yields
    /// [`Outcome::AwaitingLogin`], or [`GoodscribeError::LoginRequired`] if
    /// the request already carried a login confirmation.
    pub async fn run(&self, request: &ScrapeRequest) -> Result<Outcome> {
        let link = self.normalizer.normalize(&request.raw_text)?;
        let cookie = request.cookie();
        let mut diagnostics = Diagnostics::for_link(&link);

        let report = self.static_scraper.scrape(&link, cookie).await;
        diagnostics.attempted_urls = report.attempted;
        diagnostics.static_errors = report.errors;
        diagnostics.candidates = report.candidates;
        let static_result = report.result;

        let dynamic_result = if static_result.is_complete() {
            info!("Static result complete, skipping browser");
            None
        } else {
            info!("Static result incomplete, rendering {}", link.target_url());
            match self.renderer.render(&link, cookie).await {
                Ok(RenderOutcome::Rendered { result, candidates }) => {
                    diagnostics.dynamic = DynamicStatus::Rendered;
                    diagnostics.candidates.absorb(candidates);
                    Some(result)
                }
                Ok(RenderOutcome::LoginRequired { url }) => {
                    diagnostics.dynamic = DynamicStatus::LoginRequired;
                    if request.login_confirmed {
                        return Err(GoodscribeError::LoginRequired { url });
                    }
                    return Ok(Outcome::AwaitingLogin(LoginCheckpoint {
                        url,
                        login_url: link.target_url().to_string(),
                        request: request.clone(),
                        partial: static_result,
                        diagnostics,
                    }));
                }
                Err(e) => {
                    warn!("Browser tier failed, keeping static result: {}", e);
                    diagnostics.dynamic = DynamicStatus::Failed(e.to_string());
                    None
                }
            }
        };

        let merged = merge(&static_result, dynamic_result.as_ref());
        if !merged.is_complete() {
            return Err(GoodscribeError::IncompleteResult {
                url: link.target_url().to_string(),
            });
        }

        let content = self.writer.write(&merged).await;
        info!(
            "Wrote {:?} copy for {} ({:?})",
            content.generated_by,
            merged.display_title(),
            merged.source
        );
        Ok(Outcome::Completed(ProductReport::new(merged, content, diagnostics)))
    }
}
