//! In-memory response cache keyed by host.
//!
//! Entries are written after cacheable responses but nothing reads them back
//! before a request yet, and nothing expires them.

use ig_core::BrowserError;
use ig_core::BrowserResult;
use ig_core::codes;
use std::collections::BTreeMap;

/// Cached bodies for one host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheEntry {
    /// Request path to raw (pre-lexer) body.
    pub path_values: BTreeMap<String, String>,
    /// As sent by the server; zero and negative values are kept verbatim.
    pub max_age_seconds: i64,
}

/// Process-lifetime cache owned by whoever drives the loader.
///
/// Unsynchronized; share it only within one thread.
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    entries: BTreeMap<String, CacheEntry>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `body` for `path` under `host`, replacing the host's max-age.
    pub fn set(&mut self, host: &str, path: &str, body: &str, max_age_seconds: i64) {
        let entry = self.entries.entry(normalize_host(host)).or_default();
        entry.path_values.insert(path.to_owned(), body.to_owned());
        entry.max_age_seconds = max_age_seconds;
        log::debug!("cached {host}{path} for {max_age_seconds}s");
    }

    pub fn get(&self, host: &str) -> Option<&CacheEntry> {
        self.entries.get(&normalize_host(host))
    }

    pub fn contains(&self, host: &str, path: &str) -> bool {
        self.get(host)
            .is_some_and(|entry| entry.path_values.contains_key(path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Extracts the `max-age` of a `cache-control` value.
///
/// Returns `None` for `no-store` or when no `max-age` directive is present.
/// The directive value runs up to the next `,`; it must be an integer.
pub fn parse_max_age(cache_control: &str) -> BrowserResult<Option<i64>> {
    if cache_control.trim() == "no-store" || !cache_control.contains("max-age") {
        return Ok(None);
    }

    let suffix = cache_control
        .split_once("max-age=")
        .map(|(_, rest)| rest)
        .unwrap_or_default();
    let value = suffix.split(',').next().unwrap_or_default().trim();

    value.parse::<i64>().map(Some).map_err(|error| {
        BrowserError::new(
            codes::MAX_AGE_INVALID,
            format!("invalid max-age `{value}` in cache-control `{cache_control}`: {error}"),
        )
    })
}

fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::ResponseCache;
    use super::parse_max_age;
    use ig_core::codes;

    #[test]
    fn stores_body_under_host_and_path() {
        let mut cache = ResponseCache::new();
        assert!(cache.is_empty());

        cache.set("example.org", "/index.html", "<p>hi</p>", 120);

        let entry = match cache.get("example.org") {
            Some(value) => value,
            None => panic!("entry missing"),
        };
        assert_eq!(entry.max_age_seconds, 120);
        assert_eq!(
            entry.path_values.get("/index.html").map(String::as_str),
            Some("<p>hi</p>")
        );
        assert!(cache.contains("EXAMPLE.org", "/index.html"));
        assert!(!cache.contains("example.org", "/other"));
    }

    #[test]
    fn later_writes_merge_paths_and_replace_max_age() {
        let mut cache = ResponseCache::new();
        cache.set("example.org", "/a", "first", 60);
        cache.set("example.org", "/b", "second", 30);
        cache.set("example.org", "/a", "third", 10);

        assert_eq!(cache.len(), 1);
        let entry = match cache.get("example.org") {
            Some(value) => value,
            None => panic!("entry missing"),
        };
        assert_eq!(entry.path_values.len(), 2);
        assert_eq!(entry.path_values.get("/a").map(String::as_str), Some("third"));
        assert_eq!(entry.max_age_seconds, 10);

        cache.clear();
        assert!(cache.get("example.org").is_none());
    }

    #[test]
    fn parses_max_age_directive() {
        assert_eq!(parse_max_age("max-age=120"), Ok(Some(120)));
        assert_eq!(parse_max_age("public, max-age=3600"), Ok(Some(3600)));
        assert_eq!(parse_max_age("max-age=60, must-revalidate"), Ok(Some(60)));
    }

    #[test]
    fn negative_and_zero_max_age_are_integers() {
        assert_eq!(parse_max_age("max-age=-1"), Ok(Some(-1)));
        assert_eq!(parse_max_age("private, max-age=0"), Ok(Some(0)));
    }

    #[test]
    fn skips_uncacheable_values() {
        assert_eq!(parse_max_age("no-store"), Ok(None));
        assert_eq!(parse_max_age("no-cache"), Ok(None));
        assert_eq!(parse_max_age(""), Ok(None));
    }

    #[test]
    fn non_integer_max_age_is_an_error() {
        for value in ["max-age=soon", "max-age", "max-age=1.5"] {
            let parsed = parse_max_age(value);
            assert!(parsed.is_err(), "{value}");
            if let Err(error) = parsed {
                assert_eq!(error.code, codes::MAX_AGE_INVALID);
            }
        }
    }
}
