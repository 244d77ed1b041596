use url::Url;

/// Pulls the lookup slug out of a page URL: the last non-empty path segment,
/// falling back to an `id` query parameter when the path is empty.
pub fn resolve_slug(raw_url: &str) -> Option<String> {
    let parsed = Url::parse(raw_url).ok()?;

    if let Some(segment) = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
    {
        return Some(segment.to_string());
    }

    parsed
        .query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_last_path_segment() {
        assert_eq!(
            resolve_slug("https://host/a/b/slug123"),
            Some("slug123".to_string())
        );
    }

    #[test]
    fn ignores_trailing_slash() {
        assert_eq!(
            resolve_slug("https://host/watch/ep-4/"),
            Some("ep-4".to_string())
        );
    }

    #[test]
    fn ignores_query_when_path_present() {
        assert_eq!(
            resolve_slug("https://host/bkg/abc?ref=site.example"),
            Some("abc".to_string())
        );
    }

    #[test]
    fn falls_back_to_id_parameter() {
        assert_eq!(resolve_slug("https://host/?id=xyz"), Some("xyz".to_string()));
    }

    #[test]
    fn empty_path_and_no_id_is_none() {
        assert_eq!(resolve_slug("https://host/"), None);
        assert_eq!(resolve_slug("https://host/?ref=other"), None);
    }

    #[test]
    fn garbage_input_is_none() {
        assert_eq!(resolve_slug("not a url"), None);
    }
}
