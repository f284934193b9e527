use serde::{Deserialize, Serialize};

use crate::domain::{GeneratedBy, GeneratedContent, ProductLink, ScrapeResult, Source};

/// What happened in the dynamic tier during one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum DynamicStatus {
    /// Static result was already complete
    Skipped,
    Rendered,
    LoginRequired,
    Failed(String),
}

/// Longest candidate list kept for display
pub const MAX_CANDIDATES: usize = 12;

/// Media URLs seen on the way to the final result.
///
/// Shown to the user when no playable video survived, so they can check the
/// page's media by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCandidates {
    pub image_candidates: Vec<String>,
    pub video_candidates: Vec<String>,
    /// Videos found by key path in JSON response bodies
    pub json_video_candidates: Vec<String>,
    pub network_urls_count: usize,
}

impl MediaCandidates {
    pub fn add_images(&mut self, urls: impl IntoIterator<Item = String>) {
        push_capped(&mut self.image_candidates, urls);
    }

    pub fn add_videos(&mut self, urls: impl IntoIterator<Item = String>) {
        push_capped(&mut self.video_candidates, urls);
    }

    pub fn add_json_videos(&mut self, urls: impl IntoIterator<Item = String>) {
        push_capped(&mut self.json_video_candidates, urls);
    }

    /// Append another tier's candidates after ours.
    pub fn absorb(&mut self, other: MediaCandidates) {
        self.add_images(other.image_candidates);
        self.add_videos(other.video_candidates);
        self.add_json_videos(other.json_video_candidates);
        self.network_urls_count += other.network_urls_count;
    }

    pub fn is_empty(&self) -> bool {
        self.image_candidates.is_empty()
            && self.video_candidates.is_empty()
            && self.json_video_candidates.is_empty()
    }
}

fn push_capped(list: &mut Vec<String>, urls: impl IntoIterator<Item = String>) {
    for url in urls {
        if list.len() >= MAX_CANDIDATES {
            break;
        }
        if !list.contains(&url) {
            list.push(url);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub original_url: String,
    pub normalized_url: Option<String>,
    pub goods_id: Option<String>,
    pub attempted_urls: Vec<String>,
    pub static_errors: Vec<String>,
    pub dynamic: DynamicStatus,
    pub candidates: MediaCandidates,
}

impl Diagnostics {
    pub fn for_link(link: &ProductLink) -> Self {
        Self {
            original_url: link.original_url.clone(),
            normalized_url: link.normalized_url.clone(),
            goods_id: link.goods_id.clone(),
            attempted_urls: Vec::new(),
            static_errors: Vec::new(),
            dynamic: DynamicStatus::Skipped,
            candidates: MediaCandidates::default(),
        }
    }
}

/// Final output of the pipeline, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductReport {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub selling_points: String,
    pub script: String,
    pub rewrite: String,
    pub source: Source,
    pub generated_by: GeneratedBy,
    pub diagnostics: Diagnostics,
}

impl ProductReport {
    pub fn new(
        result: ScrapeResult,
        content: GeneratedContent,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            title: result.title,
            image_url: result.image_url,
            video_url: result.video_url,
            selling_points: content.selling_points,
            script: content.script,
            rewrite: content.rewrite,
            source: result.source,
            generated_by: content.generated_by,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_status_serialization() {
        let json = serde_json::to_value(DynamicStatus::Failed("timeout".into())).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "timeout");

        let json = serde_json::to_value(DynamicStatus::LoginRequired).unwrap();
        assert_eq!(json["status"], "login_required");
    }

    #[test]
    fn test_candidates_are_capped_and_unique() {
        let mut candidates = MediaCandidates::default();
        candidates.add_videos((0..20).map(|i| format!("https://v.example/{}.mp4", i)));
        candidates.add_images(vec!["https://img.example/a.jpg".to_string(); 3]);

        assert_eq!(candidates.video_candidates.len(), MAX_CANDIDATES);
        assert_eq!(candidates.video_candidates[0], "https://v.example/0.mp4");
        assert_eq!(candidates.image_candidates, vec!["https://img.example/a.jpg".to_string()]);
    }

    #[test]
    fn test_absorb_appends_and_counts() {
        let mut static_tier = MediaCandidates::default();
        static_tier.add_images(["https://img.example/s.jpg".to_string()]);

        let mut rendered = MediaCandidates {
            network_urls_count: 7,
            ..Default::default()
        };
        rendered.add_images([
            "https://img.example/s.jpg".to_string(),
            "https://img.example/d.jpg".to_string(),
        ]);
        rendered.add_json_videos(["https://v.example/play/1".to_string()]);

        static_tier.absorb(rendered);

        assert_eq!(
            static_tier.image_candidates,
            vec![
                "https://img.example/s.jpg".to_string(),
                "https://img.example/d.jpg".to_string()
            ]
        );
        assert_eq!(static_tier.json_video_candidates.len(), 1);
        assert_eq!(static_tier.network_urls_count, 7);
        assert!(!static_tier.is_empty());
    }

    #[test]
    fn test_diagnostics_json_carries_candidates() {
        let mut diagnostics = Diagnostics::for_link(&ProductLink {
            raw_text: "x".into(),
            original_url: "https://example.com/x".into(),
            goods_id: None,
            normalized_url: None,
        });
        diagnostics.candidates.add_videos(["https://v.example/a.mp4".to_string()]);

        let json = serde_json::to_value(&diagnostics).unwrap();
        assert_eq!(json["candidates"]["video_candidates"][0], "https://v.example/a.mp4");
        assert_eq!(json["candidates"]["network_urls_count"], 0);
    }
}
