use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One browser cookie captured from a logged-in page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    /// Seconds since the epoch; `None` for session cookies
    #[serde(default)]
    pub expires: Option<f64>,
}

/// Serialized login state for the browser, kept in a single global slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginSession {
    pub cookies: Vec<SessionCookie>,
    pub saved_at: DateTime<Utc>,
}

impl LoginSession {
    pub fn new(cookies: Vec<SessionCookie>) -> Self {
        Self {
            cookies,
            saved_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

/// Split a `Cookie:` header value into name/value pairs.
///
/// Parts without `=` or with an empty name are skipped.
pub fn parse_cookie_header(text: &str) -> Vec<(String, String)> {
    text.split(';')
        .filter_map(|part| {
            let (name, value) = part.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}
