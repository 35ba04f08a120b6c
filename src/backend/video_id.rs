//! Video id extraction for embed URLs

/// URL markers tried in order. The id runs from the end of the marker to the
/// first `?` or `&`.
const ID_MARKERS: [&str; 3] = ["embed/", "watch?v=", "youtu.be/"];

/// Extract the embed video id from `url`, or return `fallback_id` when none of
/// the known URL shapes yields a non-empty id.
pub fn resolve(url: &str, fallback_id: &str) -> String {
    ID_MARKERS
        .iter()
        .find_map(|marker| extract_after(url, marker))
        .unwrap_or(fallback_id)
        .to_string()
}

fn extract_after<'a>(url: &'a str, marker: &str) -> Option<&'a str> {
    let start = url.find(marker)? + marker.len();
    let rest = &url[start..];
    let end = rest.find(['?', '&']).unwrap_or(rest.len());
    let id = &rest[..end];
    (!id.is_empty()).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_embed_path() {
        assert_eq!(resolve("https://www.youtube.com/embed/abc123?x=1", "fb"), "abc123");
    }

    #[test]
    fn test_resolve_watch_query() {
        assert_eq!(resolve("https://www.youtube.com/watch?v=xyz789&t=5", "fb"), "xyz789");
    }

    #[test]
    fn test_resolve_short_link() {
        assert_eq!(resolve("youtu.be/qrs456", "fb"), "qrs456");
        assert_eq!(resolve("https://youtu.be/qrs456?si=share", "fb"), "qrs456");
    }

    #[test]
    fn test_resolve_falls_back() {
        assert_eq!(resolve("https://example.com/video", "fallback"), "fallback");
        assert_eq!(resolve("", "fallback"), "fallback");
    }

    #[test]
    fn test_resolve_empty_match_falls_through() {
        assert_eq!(resolve("https://www.youtube.com/embed/?v=1", "fb"), "fb");
        assert_eq!(resolve("https://www.youtube.com/embed/&watch?v=real", "fb"), "real");
    }
}
