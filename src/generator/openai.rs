use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::app::{GoodscribeError, Result};
use crate::domain::{non_empty, GeneratedBy, GeneratedContent, ScrapeResult};
use crate::generator::{CopyWriter, GeneratorConfig, TemplateCopyWriter};

const SYSTEM_PROMPT: &str = "你是电商内容策略师。请根据商品信息输出JSON，字段固定为\
selling_points, script_30s, xhs_rewrite。内容使用简体中文。";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: Value,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// Copy writer backed by an OpenAI-compatible chat completions endpoint.
pub struct AiCopyWriter {
    config: GeneratorConfig,
    http: Client,
    fallback: TemplateCopyWriter,
}

impl AiCopyWriter {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            config,
            http,
            fallback: TemplateCopyWriter::new(),
        })
    }

    fn headers(&self, api_key: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| GoodscribeError::Generation(format!("Invalid API key: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn request(&self, api_key: &str, result: &ScrapeResult) -> Result<GeneratedContent> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let request = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            response_format: json!({ "type": "json_object" }),
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: Some(SYSTEM_PROMPT.into()),
                },
                ChatMessage {
                    role: "user".into(),
                    content: Some(user_prompt(result).to_string()),
                },
            ],
        };

        debug!(model = %self.config.model, "Chat completion request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers(api_key)?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(GoodscribeError::Generation(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GoodscribeError::Generation("Empty completion".into()))?;

        parse_copy(&content)
    }
}

#[async_trait]
impl CopyWriter for AiCopyWriter {
    async fn write(&self, result: &ScrapeResult) -> GeneratedContent {
        let Some(api_key) = self.config.api_key() else {
            info!("No AI API key configured, using template copy");
            return self.fallback.compose(result);
        };

        match self.request(api_key, result).await {
            Ok(content) => content,
            Err(e) => {
                warn!("AI copy generation failed, using template: {}", e);
                self.fallback.compose(result)
            }
        }
    }
}

/// Product facts and goals sent as the user message.
///
/// Video instructions are only included when there is a video to talk about.
fn user_prompt(result: &ScrapeResult) -> Value {
    let mut goal = vec!["卖点拆解（3-5条）", "30秒带货脚本（分段）", "小红书版本改写（标题+正文）"];
    let mut prompt = json!({
        "title": non_empty(&result.title),
        "image_url": non_empty(&result.image_url),
    });

    if let Some(video) = non_empty(&result.video_url) {
        prompt["video_url"] = json!(video);
        goal.push("脚本需结合商品视频画面设计镜头");
    }
    prompt["goal"] = json!(goal);
    prompt
}

/// Parse the model's JSON object into copy; every field must be present and non-blank.
fn parse_copy(content: &str) -> Result<GeneratedContent> {
    let data: Value = serde_json::from_str(content)?;

    let field = |key: &str| -> Result<String> {
        let text = match data.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| v.as_str().map(String::from).unwrap_or_else(|| v.to_string()))
                .collect::<Vec<_>>()
                .join("\n"),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        if text.trim().is_empty() {
            return Err(GoodscribeError::Generation(format!("Response missing {}", key)));
        }
        Ok(text)
    };

    Ok(GeneratedContent {
        selling_points: field("selling_points")?,
        script: field("script_30s")?,
        rewrite: field("xhs_rewrite")?,
        generated_by: GeneratedBy::Ai,
    })
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::domain::Source;

    fn result(video: Option<&str>) -> ScrapeResult {
        ScrapeResult {
            title: Some("保温杯".into()),
            image_url: Some("https://img.example/a.jpg".into()),
            video_url: video.map(String::from),
            source: Source::Merged,
        }
    }

    fn writer(server: &MockServer, api_key: Option<&str>) -> AiCopyWriter {
        AiCopyWriter::new(GeneratorConfig {
            api_key: api_key.map(String::from),
            base_url: server.uri(),
            ..Default::default()
        })
        .unwrap()
    }

    fn completion(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        }))
    }

    #[tokio::test]
    async fn test_ai_copy_from_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "response_format": { "type": "json_object" }
            })))
            .respond_with(completion(
                r#"{"selling_points":["保温12小时","轻巧"],"script_30s":"脚本","xhs_rewrite":"改写"}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let content = writer(&server, Some("sk-test")).write(&result(None)).await;

        assert_eq!(content.generated_by, GeneratedBy::Ai);
        assert_eq!(content.selling_points, "保温12小时\n轻巧");
        assert_eq!(content.script, "脚本");
        assert_eq!(content.rewrite, "改写");
    }

    #[tokio::test]
    async fn test_missing_api_key_uses_template_without_calling() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion("{}"))
            .expect(0)
            .mount(&server)
            .await;

        let content = writer(&server, None).write(&result(None)).await;

        assert_eq!(content.generated_by, GeneratedBy::Template);
        assert!(content.is_filled());
    }

    #[tokio::test]
    async fn test_incomplete_response_uses_template() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion(r#"{"selling_points":"a","script_30s":"b"}"#))
            .mount(&server)
            .await;

        let content = writer(&server, Some("sk-test")).write(&result(None)).await;
        assert_eq!(content.generated_by, GeneratedBy::Template);
        assert!(content.is_filled());
    }

    #[tokio::test]
    async fn test_http_error_uses_template() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let content = writer(&server, Some("sk-test")).write(&result(None)).await;
        assert_eq!(content.generated_by, GeneratedBy::Template);
    }

    #[test]
    fn test_video_instructions_only_with_video() {
        let with_video = user_prompt(&result(Some("https://v.example/a.mp4")));
        let without = user_prompt(&result(None));

        assert_eq!(with_video["video_url"], "https://v.example/a.mp4");
        assert_eq!(with_video["goal"].as_array().unwrap().len(), 4);
        assert!(without.get("video_url").is_none());
        assert_eq!(without["goal"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_parse_copy_rejects_blank_fields() {
        let err = parse_copy(r#"{"selling_points":"a","script_30s":" ","xhs_rewrite":"c"}"#);
        assert!(matches!(err, Err(GoodscribeError::Generation(_))));
    }
}
