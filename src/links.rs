use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:https?://|ftp://|www\.)[^\s<>"]+"#).expect("url regex")
});

/// Rewrites a bare `www.` host into an explicit `http://` URL.
/// Anything else is returned verbatim.
pub fn normalize_url(url: &str) -> String {
    let is_bare_www = url
        .get(..4)
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case("www."));

    if is_bare_www {
        format!("http://{}", url)
    } else {
        url.to_string()
    }
}

/// Drops repeated entries, keeping the first occurrence of each.
pub fn dedup_preserving_order<I>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Extracts normalized URLs from message text in first-occurrence order.
pub fn extract_urls(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    dedup_preserving_order(URL_RE.find_iter(text).map(|m| normalize_url(m.as_str())))
}
