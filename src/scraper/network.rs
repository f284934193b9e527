//! Media discovery from the page's own network traffic.
//!
//! Product players are often wired up by an API response rather than by
//! markup, so the renderer listens to CDP network events while the page
//! loads. Every response URL is recorded; XHR/fetch and JSON responses that
//! mention media have their bodies pulled and searched as well.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::network;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

use crate::app::{GoodscribeError, Result};
use crate::extract::media;
use crate::scraper::ScraperConfig;

/// Image and video URLs observed on the wire, best candidate first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkMedia {
    pub images: Vec<String>,
    pub videos: Vec<String>,
    /// Videos found by key path in JSON bodies, a subset of `videos`
    pub json_videos: Vec<String>,
    pub response_count: usize,
}

/// Accumulates what the network listener has seen.
#[derive(Debug, Default)]
pub struct NetworkCapture {
    response_urls: Vec<String>,
    body_urls: Vec<String>,
    json_images: Vec<String>,
    json_videos: Vec<String>,
    bodies_requested: usize,
}

impl NetworkCapture {
    pub fn record_response(&mut self, url: &str) {
        if url.starts_with("http") {
            self.response_urls.push(url.to_string());
        }
    }

    /// Whether a response is worth pulling the body for.
    pub fn wants_body(&self, is_xhr: bool, mime_type: &str, max_bodies: usize) -> bool {
        (is_xhr || mime_type.to_ascii_lowercase().contains("json"))
            && self.bodies_requested < max_bodies
    }

    pub fn note_body_requested(&mut self) {
        self.bodies_requested += 1;
    }

    /// Search a response body for media URLs.
    ///
    /// Bodies without a URL or without any of `keywords` are ignored. JSON
    /// bodies are additionally walked by key path.
    pub fn absorb_body(&mut self, body: &str, keywords: &[String]) {
        if !body.contains("http") {
            return;
        }
        let low = body.to_lowercase();
        if !keywords.iter().any(|k| low.contains(k.as_str())) {
            return;
        }

        self.body_urls.extend(media::urls_in_text(body));
        if let Ok(payload) = serde_json::from_str::<serde_json::Value>(body) {
            let (images, videos) = media::media_from_json(&payload);
            self.json_images.extend(images);
            self.json_videos.extend(videos);
        }
    }

    /// Key-path matches from JSON first, then anything classifiable by URL shape.
    pub fn media(&self) -> NetworkMedia {
        let (url_images, url_videos) = media::classify(
            self.response_urls
                .iter()
                .chain(self.body_urls.iter())
                .cloned(),
        );

        NetworkMedia {
            images: media::dedup_by_path(self.json_images.iter().cloned().chain(url_images)),
            videos: media::dedup_by_path(self.json_videos.iter().cloned().chain(url_videos)),
            json_videos: media::dedup_by_path(self.json_videos.iter().cloned()),
            response_count: self.response_urls.len(),
        }
    }
}

/// Request ids sent but not yet finished or failed
type InFlight = std::sync::Mutex<HashSet<String>>;

/// Live listener attached to one page.
pub struct NetworkWatch {
    capture: Arc<Mutex<NetworkCapture>>,
    in_flight: Arc<InFlight>,
    task: JoinHandle<()>,
}

impl NetworkWatch {
    /// Enable network events on `page` and start recording.
    pub async fn attach(page: &Page, config: &ScraperConfig) -> Result<Self> {
        page.execute(network::EnableParams::default())
            .await
            .map_err(|e| render_error("enable network events", e))?;

        let mut sent = page
            .event_listener::<network::EventRequestWillBeSent>()
            .await
            .map_err(|e| render_error("subscribe to request events", e))?;
        let mut responses = page
            .event_listener::<network::EventResponseReceived>()
            .await
            .map_err(|e| render_error("subscribe to response events", e))?;
        let mut finished = page
            .event_listener::<network::EventLoadingFinished>()
            .await
            .map_err(|e| render_error("subscribe to loading finished events", e))?;
        let mut failed = page
            .event_listener::<network::EventLoadingFailed>()
            .await
            .map_err(|e| render_error("subscribe to loading failed events", e))?;

        let capture = Arc::new(Mutex::new(NetworkCapture::default()));
        let in_flight = Arc::new(InFlight::new(HashSet::new()));

        let page = page.clone();
        let max_bodies = config.max_json_bodies;
        let keywords = config.media_keywords.clone();
        let task_capture = capture.clone();
        let task_in_flight = in_flight.clone();

        let task = tokio::spawn(async move {
            // Bodies can only be read once loading has finished
            let mut pending: HashSet<String> = HashSet::new();

            loop {
                tokio::select! {
                    Some(event) = sent.next() => {
                        // Redirect hops reuse the request id
                        track(&task_in_flight, event.request_id.inner(), true);
                    }
                    Some(event) = responses.next() => {
                        let is_xhr = matches!(
                            event.r#type,
                            network::ResourceType::Xhr | network::ResourceType::Fetch
                        );
                        let mut capture = task_capture.lock().await;
                        capture.record_response(&event.response.url);
                        if capture.wants_body(is_xhr, &event.response.mime_type, max_bodies) {
                            capture.note_body_requested();
                            pending.insert(event.request_id.inner().clone());
                        }
                    }
                    Some(event) = finished.next() => {
                        track(&task_in_flight, event.request_id.inner(), false);
                        let id = event.request_id.inner().clone();
                        if pending.remove(&id) {
                            read_body(&page, id, &task_capture, &keywords).await;
                        }
                    }
                    Some(event) = failed.next() => {
                        track(&task_in_flight, event.request_id.inner(), false);
                        pending.remove(event.request_id.inner());
                    }
                    else => break,
                }
            }
        });

        Ok(Self {
            capture,
            in_flight,
            task,
        })
    }

    /// Wait until no request has been in flight for 500ms, at most `limit`.
    ///
    /// Returns false when the page never went quiet; that is not an error.
    pub async fn wait_for_idle(&self, limit: Duration) -> bool {
        let deadline = Instant::now() + limit;
        let quiet_required = Duration::from_millis(500);
        let mut quiet_since: Option<Instant> = None;

        while Instant::now() < deadline {
            if in_flight_count(&self.in_flight) == 0 {
                let start = *quiet_since.get_or_insert_with(Instant::now);
                if start.elapsed() >= quiet_required {
                    return true;
                }
            } else {
                quiet_since = None;
            }
            sleep(Duration::from_millis(50)).await;
        }
        debug!("Network still busy after {:?}", limit);
        false
    }

    /// Stop listening and return what was observed.
    pub async fn finish(self) -> NetworkMedia {
        self.task.abort();
        let capture = self.capture.lock().await;
        let media = capture.media();
        debug!(
            "Network capture: {} response(s), {} image(s), {} video(s)",
            capture.response_urls.len(),
            media.images.len(),
            media.videos.len()
        );
        media
    }
}

fn track(in_flight: &InFlight, id: &str, started: bool) {
    let mut ids = match in_flight.lock() {
        Ok(ids) => ids,
        Err(poisoned) => poisoned.into_inner(),
    };
    if started {
        ids.insert(id.to_string());
    } else {
        ids.remove(id);
    }
}

fn in_flight_count(in_flight: &InFlight) -> usize {
    match in_flight.lock() {
        Ok(ids) => ids.len(),
        Err(poisoned) => poisoned.into_inner().len(),
    }
}

async fn read_body(
    page: &Page,
    id: String,
    capture: &Mutex<NetworkCapture>,
    keywords: &[String],
) {
    let params = network::GetResponseBodyParams::new(network::RequestId::new(id));
    match page.execute(params).await {
        Ok(response) if !response.result.base64_encoded => {
            capture.lock().await.absorb_body(&response.result.body, keywords);
        }
        Ok(_) => trace!("Skipping binary response body"),
        Err(e) => trace!("Response body unavailable: {}", e),
    }
}

fn render_error(action: &str, e: impl std::fmt::Display) -> GoodscribeError {
    GoodscribeError::Render(format!("Failed to {}: {}", action, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords() -> Vec<String> {
        ScraperConfig::default().media_keywords
    }

    #[test]
    fn test_response_urls_are_classified() {
        let mut capture = NetworkCapture::default();
        capture.record_response("https://v.example/stream/a.m3u8");
        capture.record_response("https://img.example/goods/1.jpg");
        capture.record_response("https://cdn.example/app.js");
        capture.record_response("data:image/png;base64,xx");

        let media = capture.media();
        assert_eq!(media.videos, vec!["https://v.example/stream/a.m3u8".to_string()]);
        assert_eq!(media.images, vec!["https://img.example/goods/1.jpg".to_string()]);
    }

    #[test]
    fn test_json_key_paths_come_first() {
        let mut capture = NetworkCapture::default();
        capture.record_response("https://v.example/other.mp4");
        capture.absorb_body(
            r#"{"goods":{"video_url":"https://v.example/play/998"}}"#,
            &keywords(),
        );

        let media = capture.media();
        assert_eq!(media.videos[0], "https://v.example/play/998");
        assert!(media.videos.contains(&"https://v.example/other.mp4".to_string()));
        assert_eq!(media.json_videos, vec!["https://v.example/play/998".to_string()]);
        assert_eq!(media.response_count, 1);
    }

    #[test]
    fn test_redirect_hops_count_as_one_request() {
        let in_flight = InFlight::new(HashSet::new());
        track(&in_flight, "1000.1", true);
        track(&in_flight, "1000.1", true);
        track(&in_flight, "1000.2", true);
        assert_eq!(in_flight_count(&in_flight), 2);

        track(&in_flight, "1000.1", false);
        track(&in_flight, "1000.2", false);
        assert_eq!(in_flight_count(&in_flight), 0);
    }

    #[test]
    fn test_body_without_media_keywords_is_ignored() {
        let mut capture = NetworkCapture::default();
        capture.absorb_body(r#"{"next":"https://api.example/page/2"}"#, &keywords());
        assert_eq!(capture.media(), NetworkMedia::default());
    }

    #[test]
    fn test_non_json_body_still_yields_urls() {
        let mut capture = NetworkCapture::default();
        capture.absorb_body(
            "callback({video: 'https:\\/\\/v.example\\/clip.mp4'})",
            &keywords(),
        );
        assert_eq!(capture.media().videos, vec!["https://v.example/clip.mp4".to_string()]);
    }

    #[test]
    fn test_body_cap() {
        let mut capture = NetworkCapture::default();
        assert!(capture.wants_body(true, "text/plain", 2));
        assert!(capture.wants_body(false, "application/json; charset=utf-8", 2));
        assert!(!capture.wants_body(false, "text/html", 2));

        capture.note_body_requested();
        capture.note_body_requested();
        assert!(!capture.wants_body(true, "application/json", 2));
    }
}
