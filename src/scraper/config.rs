use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the browser-rendering tier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Navigation timeout in seconds (default: 45)
    pub timeout_secs: u64,

    /// Longest wait for the network to go quiet after navigation,
    /// in milliseconds (default: 8000)
    pub network_idle_ms: u64,

    /// Wait time after load for late API calls in milliseconds (default: 2500)
    pub wait_after_load_ms: u64,

    /// Maximum JSON/XHR response bodies inspected per render (default: 80)
    pub max_json_bodies: usize,

    /// User agent string to use
    pub user_agent: Option<String>,

    /// Chrome or Chromium executable; searched on PATH when unset
    pub chrome_path: Option<PathBuf>,

    /// A response body must mention one of these to be inspected
    pub media_keywords: Vec<String>,

    /// Body text that only appears on a rendered product page
    pub goods_keywords: Vec<String>,

    /// Body text of login prompts
    pub login_words: Vec<String>,

    /// URL path fragments of login pages
    pub login_paths: Vec<String>,

    /// URL fragments of app-download jump pages
    pub jump_keywords: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            timeout_secs: 45,
            network_idle_ms: 8000,
            wait_after_load_ms: 2500,
            max_json_bodies: 80,
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                    .to_string(),
            ),
            chrome_path: None,
            media_keywords: strings(&["video", "image", "goods", "mp4", "m3u8"]),
            goods_keywords: strings(&[
                "立即拼单",
                "已拼",
                "券后",
                "看视频享专属优惠",
                "商品",
            ]),
            login_words: strings(&[
                "登录",
                "注册",
                "手机号登录",
                "验证码登录",
                "请先登录",
            ]),
            login_paths: strings(&["/login", "/passport", "/oauth", "/verify"]),
            jump_keywords: strings(&[
                "down_download",
                "android_browser_download",
                "ios_fast_download",
                "need_popover=true",
                "itunes.apple.com",
                "apps.apple.com",
            ]),
        }
    }
}

impl ScraperConfig {
    /// Get the navigation timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn network_idle(&self) -> Duration {
        Duration::from_millis(self.network_idle_ms)
    }

    /// Get the wait time after load as a Duration
    pub fn wait_after_load(&self) -> Duration {
        Duration::from_millis(self.wait_after_load_ms)
    }

    /// Whether `url` is an app-download interstitial rather than the product.
    pub fn is_jump_url(&self, url: &str) -> bool {
        let low = url.to_lowercase();
        self.jump_keywords.iter().any(|k| low.contains(k.as_str()))
    }

    /// Create a config optimized for speed (may miss late-loading media)
    pub fn fast() -> Self {
        Self {
            timeout_secs: 20,
            network_idle_ms: 3000,
            wait_after_load_ms: 800,
            max_json_bodies: 30,
            ..Default::default()
        }
    }

    /// Create a config optimized for slow pages
    pub fn thorough() -> Self {
        Self {
            timeout_secs: 90,
            network_idle_ms: 15000,
            wait_after_load_ms: 5000,
            max_json_bodies: 200,
            ..Default::default()
        }
    }

    /// Take the timing and capture limits of `preset`, keeping everything else.
    pub fn apply_timing(&mut self, preset: &ScraperConfig) {
        self.timeout_secs = preset.timeout_secs;
        self.network_idle_ms = preset.network_idle_ms;
        self.wait_after_load_ms = preset.wait_after_load_ms;
        self.max_json_bodies = preset.max_json_bodies;
    }
}
