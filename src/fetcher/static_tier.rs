use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{MediaCandidates, ProductLink, ScrapeResult, Source};
use crate::extract::extract_page;
use crate::fetcher::Fetcher;
use crate::normalizer::LinkConfig;

/// Outcome of the static tier across all candidate URLs
#[derive(Debug, Clone)]
pub struct StaticReport {
    pub result: ScrapeResult,
    /// Candidates actually requested, in order
    pub attempted: Vec<String>,
    /// One `"<url> -> <error>"` line per failed candidate
    pub errors: Vec<String>,
    pub candidates: MediaCandidates,
}

/// Fetches candidate URLs without running page scripts.
pub struct StaticScraper {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    link_config: LinkConfig,
}

impl StaticScraper {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, link_config: LinkConfig) -> Self {
        Self {
            fetcher,
            link_config,
        }
    }

    /// Try each candidate of `link` in order.
    ///
    /// Stops at the first candidate that makes the result complete; otherwise
    /// later candidates only fill fields that are still absent. A failing
    /// candidate is recorded and skipped, never fatal.
    pub async fn scrape(&self, link: &ProductLink, cookie: Option<&str>) -> StaticReport {
        let mut report = StaticReport {
            result: ScrapeResult::empty(Source::Static),
            attempted: Vec::new(),
            errors: Vec::new(),
            candidates: MediaCandidates::default(),
        };

        for url in link.candidates() {
            report.attempted.push(url.clone());

            let page = match self.fetcher.fetch(&url, cookie).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("Static fetch failed for {}: {}", url, e);
                    report.errors.push(format!("{} -> {}", url, e));
                    continue;
                }
            };

            let mut extraction = extract_page(&page.body, &self.link_config);
            if extraction.storefront {
                info!(
                    "{} landed on the storefront home page ({}), ignoring its media",
                    url, page.final_url
                );
                extraction.images.clear();
                extraction.videos.clear();
            }
            report.candidates.add_images(extraction.images.iter().cloned());
            report.candidates.add_videos(extraction.videos.iter().cloned());

            let found = extraction.into_result(Source::Static);
            debug!(
                "Static candidate {} (final {}): title={} image={} video={}",
                url,
                page.final_url,
                found.title.is_some(),
                found.image_url.is_some(),
                found.video_url.is_some()
            );
            report.result.fill_missing(&found);

            if report.result.is_complete() {
                break;
            }
        }

        info!(
            "Static tier done: complete={} after {} candidate(s)",
            report.result.is_complete(),
            report.attempted.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::app::{GoodscribeError, Result};
    use crate::fetcher::FetchedPage;

    /// Serves canned bodies by URL; unknown URLs fail.
    struct CannedFetcher {
        pages: HashMap<String, String>,
        calls: Mutex<Vec<String>>,
    }

    impl CannedFetcher {
        fn new(pages: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                pages: pages
                    .iter()
                    .map(|(u, b)| (u.to_string(), b.to_string()))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for CannedFetcher {
        async fn fetch(&self, url: &str, _cookie: Option<&str>) -> Result<FetchedPage> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.pages.get(url) {
                Some(body) => Ok(FetchedPage {
                    final_url: url.to_string(),
                    body: body.clone(),
                }),
                None => Err(GoodscribeError::Fetch {
                    url: url.to_string(),
                    reason: "connection refused".into(),
                }),
            }
        }
    }

    const ORIGINAL: &str = "https://share.example/s?goods_id=123";
    const NORMALIZED: &str = "https://shop.example/goods.html?goods_id=123";

    fn link() -> ProductLink {
        ProductLink {
            raw_text: ORIGINAL.into(),
            original_url: ORIGINAL.into(),
            goods_id: Some("123".into()),
            normalized_url: Some(NORMALIZED.into()),
        }
    }

    const FULL_PAGE: &str = r#"<html><head><title>Mug</title>
        <meta property="og:image" content="https://img.example/mug.jpg"></head></html>"#;

    #[tokio::test]
    async fn test_stops_after_complete_candidate() {
        let fetcher = CannedFetcher::new(&[(ORIGINAL, FULL_PAGE), (NORMALIZED, FULL_PAGE)]);
        let scraper = StaticScraper::new(fetcher.clone(), LinkConfig::default());

        let report = scraper.scrape(&link(), None).await;

        assert!(report.result.is_complete());
        assert_eq!(report.result.title.as_deref(), Some("Mug"));
        assert_eq!(fetcher.calls(), vec![ORIGINAL.to_string()]);
        assert!(report.errors.is_empty());
    }

    #[tokio::test]
    async fn test_later_candidates_fill_missing_fields() {
        let title_only = "<html><head><title>Mug</title></head></html>";
        let other = r#"<html><head><title>Other</title>
            <meta property="og:image" content="https://img.example/mug.jpg"></head></html>"#;
        let fetcher = CannedFetcher::new(&[(ORIGINAL, title_only), (NORMALIZED, other)]);
        let scraper = StaticScraper::new(fetcher, LinkConfig::default());

        let report = scraper.scrape(&link(), None).await;

        assert_eq!(report.result.title.as_deref(), Some("Mug"));
        assert_eq!(report.result.image_url.as_deref(), Some("https://img.example/mug.jpg"));
        assert_eq!(report.attempted.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_candidate_moves_on() {
        let fetcher = CannedFetcher::new(&[(NORMALIZED, FULL_PAGE)]);
        let scraper = StaticScraper::new(fetcher, LinkConfig::default());

        let report = scraper.scrape(&link(), None).await;

        assert!(report.result.is_complete());
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with(ORIGINAL));
    }

    #[tokio::test]
    async fn test_all_candidates_fail() {
        let fetcher = CannedFetcher::new(&[]);
        let scraper = StaticScraper::new(fetcher, LinkConfig::default());

        let report = scraper.scrape(&link(), None).await;

        assert!(report.result.is_empty());
        assert_eq!(report.result.source, Source::Static);
        assert_eq!(report.errors.len(), 2);
    }

    #[tokio::test]
    async fn test_homepage_redirect_title_is_absent() {
        let home = r#"<html><head><title>拼多多商城</title>
            <meta property="og:image" content="https://img.example/banner.jpg"></head></html>"#;
        let fetcher = CannedFetcher::new(&[(ORIGINAL, home), (NORMALIZED, home)]);
        let scraper = StaticScraper::new(fetcher, LinkConfig::default());

        let report = scraper.scrape(&link(), None).await;

        assert!(report.result.title.is_none());
        assert!(report.result.image_url.is_none());
        assert!(report.candidates.image_candidates.is_empty());
        assert!(!report.result.is_complete());
    }

    #[tokio::test]
    async fn test_homepage_banner_does_not_mask_product_image() {
        let home = r#"<html><head><title>拼多多商城</title>
            <meta property="og:image" content="https://img.example/banner.jpg"></head></html>"#;
        let product = r#"<html><head>
            <meta property="og:image" content="https://img.example/goods/mug.jpg"></head></html>"#;
        let fetcher = CannedFetcher::new(&[(ORIGINAL, home), (NORMALIZED, product)]);
        let scraper = StaticScraper::new(fetcher, LinkConfig::default());

        let report = scraper.scrape(&link(), None).await;

        assert_eq!(
            report.result.image_url.as_deref(),
            Some("https://img.example/goods/mug.jpg")
        );
    }

    #[tokio::test]
    async fn test_candidates_are_collected_across_pages() {
        let first = r#"<html><head><title>Mug</title></head>
            <body><video src="https://v.example/embed/player?id=1"></video></body></html>"#;
        let second = r#"<html><head>
            <meta property="og:image" content="https://img.example/mug.jpg"></head></html>"#;
        let fetcher = CannedFetcher::new(&[(ORIGINAL, first), (NORMALIZED, second)]);
        let scraper = StaticScraper::new(fetcher, LinkConfig::default());

        let report = scraper.scrape(&link(), None).await;

        assert_eq!(
            report.candidates.video_candidates,
            vec!["https://v.example/embed/player?id=1".to_string()]
        );
        assert_eq!(
            report.candidates.image_candidates,
            vec!["https://img.example/mug.jpg".to_string()]
        );
        assert!(report.result.video_url.is_none());
    }
}
