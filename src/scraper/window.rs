use std::sync::Arc;

use chromiumoxide::Page;
use tracing::info;

use crate::app::{GoodscribeError, Result};
use crate::domain::LoginSession;
use crate::scraper::browser::{install_cookies, read_cookies, BrowserSession};
use crate::scraper::ScraperConfig;
use crate::store::SessionStore;

/// A visible browser for logging in by hand.
///
/// Opening the window does not wait for anything; the caller decides when
/// the user is done and calls [`OpenLoginWindow::confirm`].
pub struct LoginWindow {
    config: ScraperConfig,
    store: Arc<dyn SessionStore>,
}

impl LoginWindow {
    pub fn new(config: ScraperConfig, store: Arc<dyn SessionStore>) -> Self {
        Self { config, store }
    }

    pub async fn open(&self, url: &str) -> Result<OpenLoginWindow> {
        let mut session = BrowserSession::launch(&self.config, false).await?;

        let page = match self.prepare(&session, url).await {
            Ok(page) => page,
            Err(e) => {
                session.close().await;
                return Err(e);
            }
        };

        info!("Login window open at {}", url);
        Ok(OpenLoginWindow {
            session,
            page,
            store: self.store.clone(),
        })
    }

    async fn prepare(&self, session: &BrowserSession, url: &str) -> Result<Page> {
        let page = session.new_page().await?;
        let saved = self.store.load();
        install_cookies(&page, saved.as_ref(), None, url).await?;
        page.goto(url)
            .await
            .map_err(|e| GoodscribeError::Render(format!("Navigation failed: {}", e)))?;
        Ok(page)
    }
}

pub struct OpenLoginWindow {
    session: BrowserSession,
    page: Page,
    store: Arc<dyn SessionStore>,
}

impl OpenLoginWindow {
    /// Save the window's cookies as the login session and close it.
    ///
    /// Returns the number of cookies saved.
    pub async fn confirm(mut self) -> Result<usize> {
        let cookies = read_cookies(&self.page).await;
        self.session.close().await;

        let cookies = cookies?;
        let count = cookies.len();
        if count > 0 {
            self.store.save(&LoginSession::new(cookies))?;
        }
        info!("Saved login session with {} cookie(s)", count);
        Ok(count)
    }

    /// Close without saving.
    pub async fn cancel(mut self) {
        self.session.close().await;
    }
}
