use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    self, CookieParam, SetCookiesParams, TimeSinceEpoch,
};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::Page;
use futures::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::app::{GoodscribeError, Result};
use crate::domain::{parse_cookie_header, LoginSession, SessionCookie};
use crate::scraper::extractor::STEALTH_SCRIPT;
use crate::scraper::ScraperConfig;

/// One browser process with its own throwaway profile directory.
///
/// Nothing is shared between sessions except what is passed in as cookies.
pub struct BrowserSession {
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
    _profile: TempDir,
}

impl BrowserSession {
    pub async fn launch(config: &ScraperConfig, headless: bool) -> Result<Self> {
        let profile = tempfile::Builder::new()
            .prefix("goodscribe-profile-")
            .tempdir()?;

        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile.path())
            .window_size(1280, 900)
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--lang=zh-CN");

        if let Some(ref ua) = config.user_agent {
            builder = builder.arg(format!("--user-agent={}", ua));
        }
        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }
        if !headless {
            builder = builder.with_head();
        }

        let browser_config = builder.build().map_err(|e| {
            GoodscribeError::Render(format!("Failed to build browser config: {}", e))
        })?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            GoodscribeError::Render(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser: Some(browser),
            handler: Some(handle),
            _profile: profile,
        })
    }

    /// Open a blank page with the anti-automation script installed.
    pub async fn new_page(&self) -> Result<Page> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| GoodscribeError::Render("Browser already closed".into()))?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| GoodscribeError::Render(format!("Failed to create page: {}", e)))?;

        if let Err(e) = page
            .execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_SCRIPT))
            .await
        {
            debug!("Stealth script injection failed: {}", e);
        }

        Ok(page)
    }

    /// Close the browser and wait for its event loop to end.
    pub async fn close(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("Browser did not close cleanly: {}", e);
            }
            let _ = browser.wait().await;
        }
        if let Some(handler) = self.handler.take() {
            let _ = handler.await;
        }
    }
}

/// Install the saved session and a user-supplied `Cookie` header before navigation.
///
/// Header cookies are scoped to `target_url` and applied last, so they win
/// over saved cookies of the same name.
pub async fn install_cookies(
    page: &Page,
    session: Option<&LoginSession>,
    header: Option<&str>,
    target_url: &str,
) -> Result<usize> {
    let mut params: Vec<CookieParam> = session
        .map(|s| s.cookies.iter().filter_map(session_cookie_param).collect())
        .unwrap_or_default();

    if let Some(header) = header {
        params.extend(
            parse_cookie_header(header)
                .into_iter()
                .filter_map(|(name, value)| {
                    CookieParam::builder()
                        .name(name)
                        .value(value)
                        .url(target_url)
                        .build()
                        .ok()
                }),
        );
    }

    if params.is_empty() {
        return Ok(0);
    }
    let count = params.len();
    page.execute(SetCookiesParams::new(params))
        .await
        .map_err(|e| GoodscribeError::Render(format!("Failed to set cookies: {}", e)))?;
    debug!("Installed {} cookie(s)", count);
    Ok(count)
}

fn session_cookie_param(cookie: &SessionCookie) -> Option<CookieParam> {
    let mut builder = CookieParam::builder()
        .name(cookie.name.clone())
        .value(cookie.value.clone())
        .domain(cookie.domain.clone())
        .path(cookie.path.clone())
        .secure(cookie.secure)
        .http_only(cookie.http_only);
    if let Some(expires) = cookie.expires {
        builder = builder.expires(TimeSinceEpoch::new(expires));
    }
    match builder.build() {
        Ok(param) => Some(param),
        Err(e) => {
            warn!("Skipping saved cookie {}: {}", cookie.name, e);
            None
        }
    }
}

/// Read the page's cookies into the session format.
pub async fn read_cookies(page: &Page) -> Result<Vec<SessionCookie>> {
    let cookies = page
        .get_cookies()
        .await
        .map_err(|e| GoodscribeError::Render(format!("Failed to read cookies: {}", e)))?;
    Ok(cookies.into_iter().map(session_cookie).collect())
}

fn session_cookie(cookie: network::Cookie) -> SessionCookie {
    SessionCookie {
        expires: (!cookie.session).then_some(cookie.expires),
        name: cookie.name,
        value: cookie.value,
        domain: cookie.domain,
        path: cookie.path,
        secure: cookie.secure,
        http_only: cookie.http_only,
    }
}
