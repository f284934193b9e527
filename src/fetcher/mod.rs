pub mod config;
pub mod http_fetcher;
pub mod static_tier;

pub use config::FetcherConfig;
pub use http_fetcher::HttpFetcher;
pub use static_tier::{StaticReport, StaticScraper};

use async_trait::async_trait;

use crate::app::Result;

/// A fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects
    pub final_url: String,
    pub body: String,
}

#[async_trait]
pub trait Fetcher {
    /// GET `url`, sending `cookie` as the `Cookie` header when given.
    async fn fetch(&self, url: &str, cookie: Option<&str>) -> Result<FetchedPage>;
}
