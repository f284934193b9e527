use serde::{Deserialize, Serialize};

/// Which tier produced a [`ScrapeResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Static,
    Dynamic,
    Merged,
}

/// Title, primary image and video scraped from a product page.
///
/// Every field is independently optional. A result is complete once it has
/// both a title and an image; the video is best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub source: Source,
}

impl ScrapeResult {
    pub fn empty(source: Source) -> Self {
        Self {
            title: None,
            image_url: None,
            video_url: None,
            source,
        }
    }

    pub fn is_complete(&self) -> bool {
        non_empty(&self.title).is_some() && non_empty(&self.image_url).is_some()
    }

    pub fn is_empty(&self) -> bool {
        non_empty(&self.title).is_none()
            && non_empty(&self.image_url).is_none()
            && non_empty(&self.video_url).is_none()
    }

    /// Fill only the fields that are still absent from `other`.
    pub fn fill_missing(&mut self, other: &ScrapeResult) {
        fill(&mut self.title, &other.title);
        fill(&mut self.image_url, &other.image_url);
        fill(&mut self.video_url, &other.video_url);
    }

    pub fn display_title(&self) -> &str {
        non_empty(&self.title).unwrap_or("(untitled)")
    }
}

/// Value of an optional field, treating blank strings as absent.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn fill(slot: &mut Option<String>, other: &Option<String>) {
    if non_empty(slot).is_none() {
        if let Some(v) = non_empty(other) {
            *slot = Some(v.to_string());
        }
    }
}
