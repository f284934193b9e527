//! Login-wall detection over a rendered page.

use url::Url;

use crate::domain::SessionCookie;
use crate::scraper::ScraperConfig;

/// What the renderer saw once the page settled.
#[derive(Debug, Clone, Default)]
pub struct PageSnapshot {
    pub final_url: String,
    pub html: String,
    /// `document.body.innerText`
    pub body_text: String,
    /// A `<video>`/`<source>` element with a playable source exists
    pub has_video_element: bool,
    /// A password, phone or SMS-code style input exists
    pub has_login_form: bool,
    pub dom_images: Vec<String>,
    pub dom_videos: Vec<String>,
    pub cookies: Vec<SessionCookie>,
}

/// Why a page is considered to be behind a login wall, if it is.
///
/// Product content wins: a page that already shows a video or goods text is
/// treated as logged in even when its URL carries login-ish parameters.
pub fn login_wall(snapshot: &PageSnapshot, config: &ScraperConfig) -> Option<String> {
    if has_product_content(snapshot, config) {
        return None;
    }

    let url = snapshot.final_url.to_lowercase();
    let path = Url::parse(&url)
        .map(|u| u.path().to_string())
        .unwrap_or_default();

    if let Some(p) = config.login_paths.iter().find(|p| path.contains(p.as_str())) {
        return Some(format!("login path {}", p));
    }
    if url.contains("needs_login=1") && !url.contains("goods_id=") {
        return Some("needs_login=1 without goods_id".to_string());
    }
    if config.is_jump_url(&url) {
        return Some("app download page".to_string());
    }
    if snapshot.has_login_form
        && config
            .login_words
            .iter()
            .any(|w| snapshot.body_text.contains(w.as_str()))
    {
        return Some("login form".to_string());
    }
    None
}

fn has_product_content(snapshot: &PageSnapshot, config: &ScraperConfig) -> bool {
    snapshot.has_video_element
        || config
            .goods_keywords
            .iter()
            .any(|k| snapshot.body_text.contains(k.as_str()))
}
