use serde::{Deserialize, Serialize};

/// The one response shape every scrape ends in, success or not. Pipeline
/// failures come back through this body with `success:false`, never as bare
/// transport errors.
///
/// Invariant: `success` is true exactly when `error` is absent and `count`
/// equals the (non-zero) number of links.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_packed_scripts: Option<usize>,
    #[serde(default)]
    pub m3u8_links: Vec<String>,
    #[serde(default)]
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScrapeResponse {
    pub fn found(slug: String, total_packed_scripts: usize, m3u8_links: Vec<String>) -> Self {
        Self {
            success: true,
            slug: Some(slug),
            total_packed_scripts: Some(total_packed_scripts),
            count: m3u8_links.len(),
            m3u8_links,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            slug: None,
            total_packed_scripts: None,
            m3u8_links: Vec::new(),
            count: 0,
            error: Some(error.into()),
        }
    }

    /// Failure that still carries the diagnostics gathered before the
    /// pipeline came up empty.
    pub fn failed_with_diagnostics(
        error: impl Into<String>,
        slug: String,
        total_packed_scripts: usize,
    ) -> Self {
        Self {
            slug: Some(slug),
            total_packed_scripts: Some(total_packed_scripts),
            ..Self::failed(error)
        }
    }
}
