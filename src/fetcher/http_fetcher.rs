use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE};
use reqwest::redirect::Policy;
use reqwest::Client;
use tracing::{debug, warn};

use crate::app::Result;
use crate::fetcher::{FetchedPage, Fetcher, FetcherConfig};

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"));

        let client = Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true)
            .redirect(Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, cookie: Option<&str>) -> Result<FetchedPage> {
        let mut request = self.client.get(url);

        if let Some(cookie) = cookie.map(str::trim).filter(|c| !c.is_empty()) {
            match HeaderValue::from_str(cookie) {
                Ok(value) => request = request.header(COOKIE, value),
                Err(_) => warn!("Ignoring cookie string that is not a valid header value"),
            }
        }

        let response = request.send().await?;
        response.error_for_status_ref()?;

        let final_url = response.url().to_string();
        let body = response.text().await?;
        debug!("Fetched {} ({} bytes) -> {}", url, body.len(), final_url);

        Ok(FetchedPage { final_url, body })
    }
}
