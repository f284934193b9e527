use crate::domain::{non_empty, ScrapeResult, Source};

/// Combine the static result with an optional dynamic one, field by field.
///
/// Static values win; dynamic values only fill fields the static tier left
/// absent or blank. The result is tagged `Merged` when both tiers supplied at
/// least one field, otherwise with whichever tier supplied anything, and
/// `Static` when neither did.
pub fn merge(static_result: &ScrapeResult, dynamic_result: Option<&ScrapeResult>) -> ScrapeResult {
    let mut from_static = false;
    let mut from_dynamic = false;

    let mut pick = |s: &Option<String>, d: Option<&Option<String>>| -> Option<String> {
        if let Some(v) = non_empty(s) {
            from_static = true;
            return Some(v.to_string());
        }
        let v = d.and_then(non_empty)?;
        from_dynamic = true;
        Some(v.to_string())
    };

    let title = pick(&static_result.title, dynamic_result.map(|d| &d.title));
    let image_url = pick(&static_result.image_url, dynamic_result.map(|d| &d.image_url));
    let video_url = pick(&static_result.video_url, dynamic_result.map(|d| &d.video_url));

    let source = match (from_static, from_dynamic) {
        (true, true) => Source::Merged,
        (false, true) => Source::Dynamic,
        _ => Source::Static,
    };

    ScrapeResult {
        title,
        image_url,
        video_url,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(
        title: Option<&str>,
        image: Option<&str>,
        video: Option<&str>,
        source: Source,
    ) -> ScrapeResult {
        ScrapeResult {
            title: title.map(String::from),
            image_url: image.map(String::from),
            video_url: video.map(String::from),
            source,
        }
    }

    #[test]
    fn test_static_title_dynamic_media() {
        let s = r(Some("T"), None, None, Source::Static);
        let d = r(None, Some("I"), Some("V"), Source::Dynamic);

        let merged = merge(&s, Some(&d));
        assert_eq!(merged, r(Some("T"), Some("I"), Some("V"), Source::Merged));
    }

    #[test]
    fn test_static_value_wins() {
        let s = r(Some("static"), Some("I1"), None, Source::Static);
        let d = r(Some("dynamic"), Some("I2"), None, Source::Dynamic);

        let merged = merge(&s, Some(&d));
        assert_eq!(merged.title.as_deref(), Some("static"));
        assert_eq!(merged.image_url.as_deref(), Some("I1"));
        assert_eq!(merged.source, Source::Static);
    }

    #[test]
    fn test_blank_static_value_is_absent() {
        let s = r(Some("  "), None, None, Source::Static);
        let d = r(Some("dynamic"), None, None, Source::Dynamic);

        let merged = merge(&s, Some(&d));
        assert_eq!(merged.title.as_deref(), Some("dynamic"));
        assert_eq!(merged.source, Source::Dynamic);
    }

    #[test]
    fn test_empty_dynamic_never_clears_static() {
        let s = r(Some("T"), Some("I"), Some("V"), Source::Static);
        let d = r(Some(""), None, Some(" "), Source::Dynamic);

        assert_eq!(merge(&s, Some(&d)), s);
    }

    #[test]
    fn test_nothing_anywhere_is_static() {
        let s = ScrapeResult::empty(Source::Static);
        let d = ScrapeResult::empty(Source::Dynamic);

        let merged = merge(&s, Some(&d));
        assert!(merged.is_empty());
        assert_eq!(merged.source, Source::Static);
        assert_eq!(merge(&s, None).source, Source::Static);
    }
}
