use serde::{Deserialize, Serialize};

/// A product link as entered by the user, after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLink {
    /// The text exactly as the user pasted it
    pub raw_text: String,
    /// First URL found in the text, or the trimmed text when none was found
    pub original_url: String,
    /// Canonical product identifier, when one could be parsed
    pub goods_id: Option<String>,
    /// Goods-detail URL built from `goods_id`
    pub normalized_url: Option<String>,
}

impl ProductLink {
    /// URL the browser should navigate to: the normalized one when available.
    pub fn target_url(&self) -> &str {
        self.normalized_url.as_deref().unwrap_or(&self.original_url)
    }

    /// Candidate URLs for the static tier, original first, without duplicates.
    pub fn candidates(&self) -> Vec<String> {
        let mut urls = vec![self.original_url.clone()];
        if let Some(normalized) = &self.normalized_url {
            if normalized != &self.original_url {
                urls.push(normalized.clone());
            }
        }
        urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(normalized: Option<&str>) -> ProductLink {
        ProductLink {
            raw_text: "https://example.com/goods.html?goods_id=123".into(),
            original_url: "https://example.com/goods.html?goods_id=123".into(),
            goods_id: normalized.map(|_| "123".into()),
            normalized_url: normalized.map(String::from),
        }
    }

    #[test]
    fn test_target_prefers_normalized() {
        let l = link(Some("https://shop.example/goods.html?goods_id=123"));
        assert_eq!(l.target_url(), "https://shop.example/goods.html?goods_id=123");
    }

    #[test]
    fn test_target_falls_back_to_original() {
        let l = link(None);
        assert_eq!(l.target_url(), "https://example.com/goods.html?goods_id=123");
    }

    #[test]
    fn test_candidates_order_and_dedup() {
        let l = link(Some("https://shop.example/goods.html?goods_id=123"));
        assert_eq!(
            l.candidates(),
            vec![
                "https://example.com/goods.html?goods_id=123".to_string(),
                "https://shop.example/goods.html?goods_id=123".to_string(),
            ]
        );

        let same = link(Some("https://example.com/goods.html?goods_id=123"));
        assert_eq!(same.candidates().len(), 1);
    }
}
