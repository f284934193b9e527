use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::Page;
use tracing::{debug, info, warn};

use crate::app::{GoodscribeError, Result};
use crate::domain::ProductLink;
use crate::normalizer::LinkConfig;
use crate::scraper::browser::{install_cookies, read_cookies, BrowserSession};
use crate::scraper::extractor::{probe_script, scroll_script, DomProbe, SCROLL_STEPS};
use crate::scraper::login::PageSnapshot;
use crate::scraper::network::{NetworkMedia, NetworkWatch};
use crate::scraper::{conclude, RenderOutcome, Renderer, ScraperConfig};
use crate::store::SessionStore;

/// Renders product pages in a fresh Chrome instance per call.
pub struct ChromeRenderer {
    config: ScraperConfig,
    link_config: LinkConfig,
    store: Arc<dyn SessionStore>,
}

impl ChromeRenderer {
    pub fn new(
        config: ScraperConfig,
        link_config: LinkConfig,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            config,
            link_config,
            store,
        }
    }

    async fn render_page(
        &self,
        session: &BrowserSession,
        target: &str,
        cookie: Option<&str>,
    ) -> Result<(PageSnapshot, NetworkMedia)> {
        let page = session.new_page().await?;

        let saved = self.store.load();
        install_cookies(&page, saved.as_ref(), cookie, target).await?;

        let watch = NetworkWatch::attach(&page, &self.config).await?;

        self.goto(&page, target).await?;
        let landed = current_url(&page).await;
        if self.config.is_jump_url(&landed) {
            info!("Redirected to an app download page, retrying {}", target);
            self.goto(&page, target).await?;
        }

        watch.wait_for_idle(self.config.network_idle()).await;
        tokio::time::sleep(self.config.wait_after_load()).await;

        for (dy, pause_ms) in SCROLL_STEPS {
            if let Err(e) = page.evaluate(scroll_script(dy)).await {
                debug!("Scroll failed: {}", e);
            }
            tokio::time::sleep(std::time::Duration::from_millis(pause_ms)).await;
        }

        let probe: DomProbe = page
            .evaluate(probe_script())
            .await
            .map_err(|e| GoodscribeError::Render(format!("Script execution failed: {}", e)))?
            .into_value()
            .map_err(|e| GoodscribeError::Render(format!("Failed to parse result: {:?}", e)))?;

        let final_url = current_url(&page).await;
        let cookies = read_cookies(&page).await.unwrap_or_else(|e| {
            warn!("{}", e);
            Vec::new()
        });
        let media = watch.finish().await;

        Ok((probe.into_snapshot(final_url, cookies), media))
    }

    async fn goto(&self, page: &Page, url: &str) -> Result<()> {
        match tokio::time::timeout(self.config.timeout(), page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(GoodscribeError::Render(format!("Navigation failed: {}", e))),
            Err(_) => Err(GoodscribeError::Render(format!(
                "Navigation timed out after {}s",
                self.config.timeout_secs
            ))),
        }
    }
}

async fn current_url(page: &Page) -> String {
    page.url().await.ok().flatten().unwrap_or_default()
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn render(&self, link: &ProductLink, cookie: Option<&str>) -> Result<RenderOutcome> {
        let target = link.target_url();
        info!("Rendering {}", target);

        let mut session = BrowserSession::launch(&self.config, self.config.headless).await?;
        let rendered = self.render_page(&session, target, cookie).await;
        session.close().await;

        let (snapshot, media) = rendered?;
        Ok(conclude(
            &snapshot,
            media,
            &self.config,
            &self.link_config,
            self.store.as_ref(),
        ))
    }
}
