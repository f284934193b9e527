use serde::Deserialize;

use crate::domain::SessionCookie;
use crate::extract::media;
use crate::scraper::login::PageSnapshot;

/// Hides the usual automation fingerprints before any page script runs.
pub const STEALTH_SCRIPT: &str = r#"
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
Object.defineProperty(navigator, 'languages', { get: () => ['zh-CN', 'zh', 'en-US', 'en'] });
Object.defineProperty(navigator, 'platform', { get: () => 'MacIntel' });
window.chrome = window.chrome || { runtime: {} };
"#;

/// Scroll offsets that trigger lazy-loaded galleries and players.
pub const SCROLL_STEPS: [(i64, u64); 3] = [(1800, 1200), (-800, 500), (2200, 800)];

/// Raw result of [`probe_script`] as returned by the page.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomProbe {
    pub html: String,
    pub text: String,
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub has_video: bool,
    pub has_login_form: bool,
}

impl DomProbe {
    pub fn into_snapshot(self, final_url: String, cookies: Vec<SessionCookie>) -> PageSnapshot {
        let keep = |urls: Vec<String>| {
            urls.iter()
                .map(|u| media::normalize_candidate(u))
                .filter(|u| u.starts_with("http"))
                .collect::<Vec<_>>()
        };
        PageSnapshot {
            final_url,
            html: self.html,
            body_text: self.text,
            has_video_element: self.has_video,
            has_login_form: self.has_login_form,
            dom_images: keep(self.images),
            dom_videos: keep(self.videos),
            cookies,
        }
    }
}

/// Script returning a [`DomProbe`] for the current document.
///
/// Reads live `currentSrc` values, which differ from the markup once lazy
/// loaders have swapped placeholders out.
pub fn probe_script() -> &'static str {
    r#"
    (() => {
        const images = Array.from(document.querySelectorAll('img'))
            .map(n => n.currentSrc || n.src || n.getAttribute('data-src') || '')
            .filter(Boolean);
        const videos = Array.from(document.querySelectorAll('video'))
            .map(n => n.currentSrc || n.src || '')
            .concat(Array.from(document.querySelectorAll('source')).map(n => n.src || ''))
            .filter(Boolean);
        const hasVideo = !!document.querySelector(
            'video[src], video source[src], source[src*=".mp4"], source[src*=".m3u8"]'
        );
        const hasLoginForm = !!document.querySelector(
            'input[type="password"], input[type="tel"], input[name*="phone"], input[name*="mobile"]'
        );
        return {
            html: document.documentElement ? document.documentElement.outerHTML : '',
            text: document.body ? document.body.innerText : '',
            images,
            videos,
            hasVideo,
            hasLoginForm
        };
    })()
    "#
}

pub fn scroll_script(dy: i64) -> String {
    format!("window.scrollBy(0, {dy})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_script_reads_live_sources() {
        let script = probe_script();
        assert!(script.contains("currentSrc"));
        assert!(script.contains("hasLoginForm"));
    }

    #[test]
    fn test_probe_deserializes_from_page_json() {
        let value = serde_json::json!({
            "html": "<html></html>",
            "text": "商品详情",
            "images": ["//img.example/a.jpg", "data:image/png;base64,xx"],
            "videos": ["https://v.example/a.mp4"],
            "hasVideo": true
        });
        let probe: DomProbe = serde_json::from_value(value).unwrap();
        let snapshot = probe.into_snapshot("https://m.example.com/g".into(), Vec::new());

        assert_eq!(snapshot.dom_images, vec!["https://img.example/a.jpg".to_string()]);
        assert_eq!(snapshot.dom_videos, vec!["https://v.example/a.mp4".to_string()]);
        assert!(snapshot.has_video_element);
        assert!(!snapshot.has_login_form);
        assert_eq!(snapshot.body_text, "商品详情");
    }

    #[test]
    fn test_scroll_script() {
        assert_eq!(scroll_script(-800), "window.scrollBy(0, -800)");
    }
}
