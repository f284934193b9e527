//! Heuristic field extraction from product page HTML.
//!
//! Each field has an ordered list of [`Rule`]s. A rule may find nothing (a
//! missing meta tag, an unparsable selector) without affecting the others;
//! candidates are collected in rule order and the first acceptable one wins.
//! The static and dynamic tiers share these rules so both read a page the
//! same way.

pub mod media;

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::domain::{ScrapeResult, Source};
use crate::normalizer::LinkConfig;

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| parse_selector("title"));
static IMG_SELECTOR: LazyLock<Selector> = LazyLock::new(|| parse_selector("img"));
static VIDEO_SELECTOR: LazyLock<Selector> = LazyLock::new(|| parse_selector("video"));
static SOURCE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector("video source, source"));
static SCRIPT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| parse_selector("script"));

fn parse_selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e}"))
}

/// A named candidate source for one field.
pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&Html) -> Vec<String>,
}

pub const TITLE_RULES: &[Rule] = &[
    Rule {
        name: "og:title",
        apply: og_title,
    },
    Rule {
        name: "twitter:title",
        apply: twitter_title,
    },
    Rule {
        name: "title",
        apply: title_tag,
    },
];

pub const IMAGE_RULES: &[Rule] = &[
    Rule {
        name: "og:image",
        apply: og_image,
    },
    Rule {
        name: "twitter:image",
        apply: twitter_image,
    },
    Rule {
        name: "img",
        apply: img_tags,
    },
    Rule {
        name: "script-image",
        apply: script_images,
    },
];

pub const VIDEO_RULES: &[Rule] = &[
    Rule {
        name: "og:video",
        apply: og_video,
    },
    Rule {
        name: "twitter:player",
        apply: twitter_player,
    },
    Rule {
        name: "video",
        apply: video_tags,
    },
    Rule {
        name: "script-video",
        apply: script_videos,
    },
];

fn og_title(doc: &Html) -> Vec<String> {
    meta_values(doc, "og:title")
}

fn twitter_title(doc: &Html) -> Vec<String> {
    meta_values(doc, "twitter:title")
}

fn title_tag(doc: &Html) -> Vec<String> {
    doc.select(&TITLE_SELECTOR)
        .map(|e| e.text().collect::<String>().trim().to_string())
        .collect()
}

fn og_image(doc: &Html) -> Vec<String> {
    meta_urls(doc, &["og:image"])
}

fn twitter_image(doc: &Html) -> Vec<String> {
    meta_urls(doc, &["twitter:image"])
}

fn img_tags(doc: &Html) -> Vec<String> {
    doc.select(&IMG_SELECTOR)
        .filter_map(|e| {
            let el = e.value();
            el.attr("src")
                .or_else(|| el.attr("data-src"))
                .or_else(|| el.attr("data-original"))
                .map(media::normalize_candidate)
        })
        .collect()
}

fn script_images(doc: &Html) -> Vec<String> {
    media::classify(script_urls(doc)).0
}

fn og_video(doc: &Html) -> Vec<String> {
    meta_urls(doc, &["og:video", "og:video:url"])
}

fn twitter_player(doc: &Html) -> Vec<String> {
    meta_urls(doc, &["twitter:player"])
}

fn video_tags(doc: &Html) -> Vec<String> {
    let tags = doc.select(&VIDEO_SELECTOR).filter_map(|e| e.value().attr("src"));
    let sources = doc.select(&SOURCE_SELECTOR).filter_map(|e| e.value().attr("src"));
    tags.chain(sources).map(media::normalize_candidate).collect()
}

fn script_videos(doc: &Html) -> Vec<String> {
    media::classify(script_urls(doc)).1
}

fn meta_urls(doc: &Html, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .flat_map(|key| meta_values(doc, key))
        .map(|v| media::normalize_candidate(&v))
        .collect()
}

/// `content` of `<meta property=key>` and `<meta name=key>` tags.
fn meta_values(doc: &Html, key: &str) -> Vec<String> {
    let css = format!(r#"meta[property="{key}"], meta[name="{key}"]"#);
    let Ok(selector) = Selector::parse(&css) else {
        return Vec::new();
    };
    doc.select(&selector)
        .filter_map(|e| e.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

fn script_urls(doc: &Html) -> Vec<String> {
    let text = doc
        .select(&SCRIPT_SELECTOR)
        .map(|e| e.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");
    media::urls_in_text(&text)
}

/// Collect candidates from `rules` in order, keeping those `accept` allows.
pub fn apply_rules<F>(rules: &[Rule], doc: &Html, accept: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let candidates = rules.iter().flat_map(|rule| {
        let found = (rule.apply)(doc);
        tracing::trace!(rule = rule.name, count = found.len(), "extraction rule");
        found
    });
    let mut seen = HashSet::new();
    candidates
        .filter(|c| !c.trim().is_empty() && accept(c.as_str()))
        .filter(|c| seen.insert(c.clone()))
        .collect()
}

/// Everything the rules found on one page, best candidate first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtraction {
    pub title: Option<String>,
    pub images: Vec<String>,
    pub videos: Vec<String>,
    /// Only generic storefront titles were found; this is the home page
    pub storefront: bool,
}

impl PageExtraction {
    /// Reduce to a [`ScrapeResult`] with the first candidate of each field.
    pub fn into_result(self, source: Source) -> ScrapeResult {
        ScrapeResult {
            title: self.title,
            image_url: self.images.into_iter().next(),
            video_url: self.videos.into_iter().find(|v| media::is_playable_video(v)),
            source,
        }
    }
}

/// Run all field rules over `html`.
///
/// A title equal to one of the storefront's generic titles is rejected: it
/// means the request landed on the home page, not the product. When no other
/// title is present the page is flagged as [`PageExtraction::storefront`].
pub fn extract_page(html: &str, link_config: &LinkConfig) -> PageExtraction {
    let doc = Html::parse_document(html);

    let titles = apply_rules(TITLE_RULES, &doc, |_| true);
    let title = titles
        .iter()
        .find(|t| !link_config.is_generic_title(t))
        .map(|t| t.trim().to_string());
    let storefront = title.is_none() && !titles.is_empty();
    let images = media::dedup_by_path(apply_rules(IMAGE_RULES, &doc, media::is_product_image));
    let videos = media::dedup_by_path(apply_rules(VIDEO_RULES, &doc, |v| {
        let v = v.to_ascii_lowercase();
        v.starts_with("http") && !media::is_static_asset(&v)
    }));

    PageExtraction {
        title,
        images,
        videos,
        storefront,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT_PAGE: &str = r#"<!doctype html>
<html><head>
  <title>Fallback title</title>
  <meta property="og:title" content="  Silicone phone case  ">
  <meta property="og:image" content="//img.example/goods/main.jpg">
</head>
<body>
  <img src="https://img.example/static/logo.png">
  <img data-src="https://img.example/goods/second.jpg">
  <video src="https://v.example/video/clip.mp4"></video>
  <script>window.rawData = {"video":"https:\/\/v.example\/video\/other.mp4"};</script>
</body></html>"#;

    #[test]
    fn test_extracts_fields_in_rule_order() {
        let page = extract_page(PRODUCT_PAGE, &LinkConfig::default());

        assert_eq!(page.title.as_deref(), Some("Silicone phone case"));
        assert_eq!(page.images[0], "https://img.example/goods/main.jpg");
        assert!(page.images.contains(&"https://img.example/goods/second.jpg".to_string()));
        assert!(!page.images.iter().any(|i| i.contains("logo")));
        assert_eq!(page.videos[0], "https://v.example/video/clip.mp4");
        assert!(page.videos.contains(&"https://v.example/video/other.mp4".to_string()));
    }

    #[test]
    fn test_title_falls_back_to_title_tag() {
        let html = "<html><head><title>Desk lamp</title></head><body></body></html>";
        let page = extract_page(html, &LinkConfig::default());
        assert_eq!(page.title.as_deref(), Some("Desk lamp"));
    }

    #[test]
    fn test_generic_storefront_title_is_absent() {
        let html = "<html><head><title>拼多多商城</title></head><body></body></html>";
        let page = extract_page(html, &LinkConfig::default());
        assert!(page.title.is_none());
        assert!(page.storefront);
    }

    #[test]
    fn test_generic_og_title_yields_to_next_rule() {
        let html = r#"<html><head>
            <meta property="og:title" content="拼多多商城">
            <title>Real product</title>
        </head></html>"#;
        let page = extract_page(html, &LinkConfig::default());
        assert_eq!(page.title.as_deref(), Some("Real product"));
        assert!(!page.storefront);
    }

    #[test]
    fn test_into_result_picks_first_playable_video() {
        let page = PageExtraction {
            title: Some("T".into()),
            images: vec!["https://img.example/a.jpg".into()],
            videos: vec![
                "https://example.com/embed?video=1".into(),
                "https://v.example/video/a.m3u8".into(),
            ],
            storefront: false,
        };
        let result = page.into_result(Source::Static);
        assert_eq!(result.video_url.as_deref(), Some("https://v.example/video/a.m3u8"));
        assert_eq!(result.image_url.as_deref(), Some("https://img.example/a.jpg"));
        assert_eq!(result.source, Source::Static);
    }

    #[test]
    fn test_empty_page_extracts_nothing() {
        let page = extract_page("<html></html>", &LinkConfig::default());
        assert_eq!(page, PageExtraction::default());
    }
}
