//! Media URL classification.
//!
//! Product pages deliver their media through a mix of tags, inline script
//! blobs and API responses. These helpers decide whether a bare URL looks like
//! a product image or a playable video.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static URL_IN_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)https?://[^\s"'<>\\]+"#).expect("valid URL regex"));
static IMAGE_EXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(?:jpg|jpeg|png|webp|avif|gif)(?:$|\?)").expect("valid image regex")
});
static VIDEO_EXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(?:mp4|m3u8|mov|webm)(?:$|\?)").expect("valid video regex")
});
static STATIC_ASSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(?:js|css|map|json|html|htm|txt|xml)(?:$|\?)").expect("valid asset regex")
});

const VIDEO_HINTS: [&str; 6] = ["video", "play", "stream", "hls", "goods_video", "video_url"];
const IMAGE_HINTS: [&str; 5] = ["image", "img", "cover", "thumb", "pic"];
const VIDEO_PATH_TOKENS: [&str; 5] = ["/video", "video-", "/play", "m3u8", "mp4"];
const IMAGE_PATH_TOKENS: [&str; 5] = ["/image", "/img", "cover", "thumb", "pic"];

/// Small decorative images that are never the product shot
const NON_PRODUCT_IMAGE_TOKENS: [&str; 6] =
    ["icon", "logo", "avatar", "sprite", "loading", "placeholder"];

/// Turn scheme-relative `//host/path` into `https://host/path`.
pub fn normalize_candidate(value: &str) -> String {
    let v = value.trim();
    match v.strip_prefix("//") {
        Some(rest) => format!("https://{}", rest),
        None => v.to_string(),
    }
}

fn lower_path(url: &str) -> String {
    url::Url::parse(url)
        .map(|u| u.path().to_ascii_lowercase())
        .unwrap_or_default()
}

pub fn is_static_asset(url: &str) -> bool {
    STATIC_ASSET_RE.is_match(url)
}

pub fn looks_like_image(url: &str) -> bool {
    let low = url.to_ascii_lowercase();
    if !low.starts_with("http") || is_static_asset(&low) {
        return false;
    }
    if IMAGE_EXT_RE.is_match(&low) {
        return true;
    }
    let path = lower_path(&low);
    IMAGE_HINTS.iter().any(|h| low.contains(h))
        && IMAGE_PATH_TOKENS.iter().any(|t| path.contains(t))
}

pub fn looks_like_video(url: &str) -> bool {
    let low = url.to_ascii_lowercase();
    if !low.starts_with("http") || is_static_asset(&low) {
        return false;
    }
    if VIDEO_EXT_RE.is_match(&low) {
        return true;
    }
    // "svideo_index.js" style names are excluded by the static-asset check above
    let path = lower_path(&low);
    VIDEO_HINTS.iter().any(|h| low.contains(h))
        && VIDEO_PATH_TOKENS.iter().any(|t| path.contains(t))
}

/// Whether an image URL is plausible as the primary product image.
pub fn is_product_image(url: &str) -> bool {
    let low = url.to_ascii_lowercase();
    low.starts_with("http")
        && !is_static_asset(&low)
        && !NON_PRODUCT_IMAGE_TOKENS.iter().any(|t| low.contains(t))
}

/// Stricter check applied to the final video URL: must look playable.
pub fn is_playable_video(url: &str) -> bool {
    let low = url.to_ascii_lowercase();
    if !low.starts_with("http") || is_static_asset(&low) {
        return false;
    }
    if VIDEO_EXT_RE.is_match(&low) {
        return true;
    }
    let path = lower_path(&low);
    ["/video", "video-", "/play"].iter().any(|t| path.contains(t))
        && ["m3u8", "mp4", "video"].iter().any(|t| low.contains(t))
}

/// Keep the first URL for each distinct path (query strings ignored).
pub fn dedup_by_path<I>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|u| seen.insert(u.split('?').next().unwrap_or(u).to_string()))
        .collect()
}

/// Pull URLs out of script or response text, undoing JSON slash escapes.
pub fn urls_in_text(text: &str) -> Vec<String> {
    let unescaped = text
        .replace("\\u002F", "/")
        .replace("\\u002f", "/")
        .replace("\\/", "/");
    URL_IN_TEXT_RE
        .find_iter(&unescaped)
        .map(|m| html_escape::decode_html_entities(m.as_str()).into_owned())
        .collect()
}

/// Split candidate URLs into (images, videos).
pub fn classify<I>(candidates: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = String>,
{
    let mut images = Vec::new();
    let mut videos = Vec::new();
    for raw in candidates {
        let url = normalize_candidate(&raw);
        if looks_like_image(&url) {
            images.push(url);
        } else if looks_like_video(&url) {
            videos.push(url);
        }
    }
    (dedup_by_path(images), dedup_by_path(videos))
}

/// Walk a JSON payload and classify every URL-valued string.
///
/// The key path decides first (`goods.video_url` is a video whatever its
/// extension); URLs under neutral keys fall back to [`classify`].
pub fn media_from_json(value: &Value) -> (Vec<String>, Vec<String>) {
    let mut images = Vec::new();
    let mut videos = Vec::new();
    walk_json(value, String::new(), &mut images, &mut videos);
    (dedup_by_path(images), dedup_by_path(videos))
}

fn walk_json(value: &Value, path: String, images: &mut Vec<String>, videos: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let next = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                walk_json(child, next, images, videos);
            }
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                walk_json(child, format!("{}[{}]", path, idx), images, videos);
            }
        }
        Value::String(s) => {
            let mut found = urls_in_text(s);
            let direct = normalize_candidate(s);
            if direct.starts_with("http") && !found.contains(&direct) {
                found.insert(0, direct);
            }
            for url in found {
                classify_by_key(&path, url, images, videos);
            }
        }
        _ => {}
    }
}

fn classify_by_key(path: &str, url: String, images: &mut Vec<String>, videos: &mut Vec<String>) {
    let low_path = path.to_ascii_lowercase();
    if is_static_asset(&url) {
        return;
    }
    if VIDEO_HINTS.iter().any(|h| low_path.contains(h)) {
        videos.push(url);
    } else if IMAGE_HINTS.iter().any(|h| low_path.contains(h)) {
        images.push(url);
    } else {
        let (i, v) = classify([url]);
        images.extend(i);
        videos.extend(v);
    }
}
