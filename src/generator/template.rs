use async_trait::async_trait;

use crate::domain::{non_empty, GeneratedBy, GeneratedContent, ScrapeResult};
use crate::generator::CopyWriter;

const PLACEHOLDER_TITLE: &str = "该商品";

/// Fixed local copy used when no AI service is available.
#[derive(Debug, Clone, Default)]
pub struct TemplateCopyWriter;

impl TemplateCopyWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn compose(&self, result: &ScrapeResult) -> GeneratedContent {
        let title = non_empty(&result.title).unwrap_or(PLACEHOLDER_TITLE);

        let selling_points = format!(
            "1) 用户关注点：{title}是否真有性价比。\n\
             2) 核心卖点：价格门槛低、下单链路短、适合快速决策。\n\
             3) 下单触发：限时、限量、真实使用场景。"
        );

        let opening = if non_empty(&result.video_url).is_some() {
            format!("开场3秒：直接放商品视频，今天测一个爆款，名字叫《{title}》。")
        } else {
            format!("开场3秒：今天测一个爆款，名字叫《{title}》。")
        };
        let script = format!(
            "{opening}\n\
             中段15秒：我先说结论，它最大的优势是入手门槛低，功能覆盖常见需求。\
             如果你跟我一样追求省钱省事，这个配置已经够用。\n\
             收尾12秒：适合学生党、租房党、和第一次尝试的人群。想要链接我放在评论区，先领券再下单。"
        );

        let rewrite = format!(
            "标题建议：挖到宝了｜{title}值不值？\n\
             正文建议：\n\
             最近在做平价好物测评，这个我实际看下来有3个优点：\n\
             1. 预算友好\n2. 使用门槛低\n3. 日常场景覆盖广\n\
             不夸张不踩雷，建议先领券再决定。"
        );

        GeneratedContent {
            selling_points,
            script,
            rewrite,
            generated_by: GeneratedBy::Template,
        }
    }
}

#[async_trait]
impl CopyWriter for TemplateCopyWriter {
    async fn write(&self, result: &ScrapeResult) -> GeneratedContent {
        self.compose(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Source;

    fn result(title: Option<&str>, video: Option<&str>) -> ScrapeResult {
        ScrapeResult {
            title: title.map(String::from),
            image_url: Some("https://img.example/a.jpg".into()),
            video_url: video.map(String::from),
            source: Source::Static,
        }
    }

    #[test]
    fn test_template_uses_title() {
        let content = TemplateCopyWriter::new().compose(&result(Some("保温杯"), None));
        assert!(content.is_filled());
        assert!(content.selling_points.contains("保温杯"));
        assert!(content.script.contains("《保温杯》"));
        assert!(content.rewrite.contains("保温杯值不值"));
        assert_eq!(content.generated_by, GeneratedBy::Template);
    }

    #[test]
    fn test_template_without_title_uses_placeholder() {
        let content = TemplateCopyWriter::new().compose(&result(Some("  "), None));
        assert!(content.is_filled());
        assert!(content.script.contains("《该商品》"));
    }

    #[test]
    fn test_template_mentions_video_only_when_present() {
        let writer = TemplateCopyWriter::new();
        let with_video = writer.compose(&result(Some("T"), Some("https://v.example/a.mp4")));
        let without = writer.compose(&result(Some("T"), None));
        assert!(with_video.script.contains("商品视频"));
        assert!(!without.script.contains("商品视频"));
    }

    #[test]
    fn test_copy_writer_trait_returns_template() {
        let writer: &dyn CopyWriter = &TemplateCopyWriter::new();
        let content = tokio_test::block_on(writer.write(&result(None, None)));
        assert_eq!(content.generated_by, GeneratedBy::Template);
        assert!(content.script.contains("《该商品》"));
    }

    #[test]
    fn test_template_is_deterministic() {
        let writer = TemplateCopyWriter::new();
        let r = result(Some("T"), None);
        assert_eq!(writer.compose(&r), writer.compose(&r));
    }
}
