use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::app::{GoodscribeError, Result};
use crate::domain::ProductLink;

const GOODS_ID_PLACEHOLDER: &str = "{goods_id}";

/// Query keys that carry the product identifier, in priority order
const GOODS_ID_KEYS: [&str; 3] = ["goods_id", "goodsId", "gid"];

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)https?://[^\s"'<>\\]+"#).expect("valid URL regex"));
static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid digits regex"));
static GOODS_ID_TEXT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"goods_id=(\d+)", r"/goods/(\d+)"]
        .iter()
        .map(|p| Regex::new(p).expect("valid goods_id regex"))
        .collect()
});

/// Link handling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Goods-detail URL with a `{goods_id}` placeholder
    pub goods_url_template: String,

    /// Titles the storefront shows on its home page; a product page carrying
    /// one of these means we were redirected away from the product
    pub generic_titles: Vec<String>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            goods_url_template: "https://mobile.yangkeduo.com/goods.html?goods_id={goods_id}"
                .to_string(),
            generic_titles: vec!["拼多多商城".to_string(), "拼多多".to_string()],
        }
    }
}

impl LinkConfig {
    pub fn is_generic_title(&self, title: &str) -> bool {
        let title = title.trim();
        self.generic_titles.iter().any(|g| g.trim() == title)
    }
}

/// Turns pasted share text into a [`ProductLink`].
#[derive(Debug, Clone)]
pub struct Normalizer {
    config: LinkConfig,
    /// Matches URLs built from `goods_url_template`
    template_re: Option<Regex>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(LinkConfig::default())
    }
}

impl Normalizer {
    pub fn new(config: LinkConfig) -> Self {
        let template_re = template_regex(&config.goods_url_template);
        Self {
            config,
            template_re,
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Normalize raw user input.
    ///
    /// Only blank input is an error. Text without a recognisable URL or goods id
    /// still yields a link; `goods_id` and `normalized_url` are then `None`.
    pub fn normalize(&self, raw: &str) -> Result<ProductLink> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GoodscribeError::InvalidInput("empty link".into()));
        }

        let original_url = extract_url(trimmed).unwrap_or_else(|| {
            debug!("No URL found in input, using text as-is");
            trimmed.to_string()
        });

        let goods_id = self.goods_id(&original_url);
        let normalized_url = goods_id.as_deref().and_then(|id| self.goods_url(id));

        if normalized_url.is_none() {
            debug!("No goods_id in {}, falling back to the original URL", original_url);
        }

        Ok(ProductLink {
            raw_text: raw.to_string(),
            original_url,
            goods_id,
            normalized_url,
        })
    }

    /// Extract the product identifier, trying the configured template first
    /// so that a normalized URL normalizes to itself.
    pub fn goods_id(&self, url: &str) -> Option<String> {
        self.template_re
            .as_ref()
            .and_then(|re| re.captures(url))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .or_else(|| extract_goods_id(url))
    }

    fn goods_url(&self, goods_id: &str) -> Option<String> {
        let template = &self.config.goods_url_template;
        if !template.contains(GOODS_ID_PLACEHOLDER) {
            debug!("goods_url_template has no {} placeholder", GOODS_ID_PLACEHOLDER);
            return None;
        }
        Some(template.replace(GOODS_ID_PLACEHOLDER, goods_id))
    }
}

fn template_regex(template: &str) -> Option<Regex> {
    let (prefix, suffix) = template.split_once(GOODS_ID_PLACEHOLDER)?;
    let pattern = format!(
        r"^{}(\d+){}(?:$|[&#?/])",
        regex::escape(prefix),
        regex::escape(suffix)
    );
    Regex::new(&pattern).ok()
}

/// Find the first URL in free text.
///
/// Trailing punctuation glued to the link by share text is removed. Text
/// without an `http(s)://` prefix is accepted when it parses as a host-led
/// URL once `https://` is prepended.
pub fn extract_url(text: &str) -> Option<String> {
    if let Some(m) = URL_RE.find(text) {
        let url = m.as_str().trim_end_matches(['，', '。', ',', '.']);
        return Some(url.to_string());
    }

    let first = text.split_whitespace().next()?;
    let candidate = format!("https://{}", first.trim_end_matches(['，', '。', ',', '.']));
    match Url::parse(&candidate) {
        Ok(url) if url.host_str().is_some_and(|h| h.contains('.')) => Some(candidate),
        _ => None,
    }
}

/// Extract the product identifier from a URL's query or path.
pub fn extract_goods_id(url: &str) -> Option<String> {
    if let Ok(parsed) = Url::parse(url) {
        for key in GOODS_ID_KEYS {
            let value = parsed
                .query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned());
            if let Some(digits) = value.as_deref().and_then(|v| DIGITS_RE.find(v)) {
                return Some(digits.as_str().to_string());
            }
        }
    }

    GOODS_ID_TEXT_RES
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
