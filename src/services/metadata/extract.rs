//! Metadata extraction from IMDb title pages.
//!
//! Each strategy is a pure function from an HTML document to a [`PartialMetadata`].
//! [`extract`] runs them in order and merges their results, so a field found by an
//! earlier strategy is never overwritten by a later one.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::models::PartialMetadata;

/// A single extraction strategy
pub type Strategy = fn(&str) -> PartialMetadata;

/// Strategies in priority order
pub const STRATEGIES: [(&str, Strategy); 5] = [
    ("json_ld", json_ld),
    ("meta_description", meta_description),
    ("page_title", page_title),
    ("open_graph", open_graph),
    ("raw_image_urls", raw_image_urls),
];

const MAX_CAST: usize = 5;
const MAX_IMAGE_CANDIDATES: usize = 5;
const MIN_DESCRIPTION_LEN: usize = 10;

static JSON_LD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("json-ld regex")
});

static META_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("meta regex"));

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("attr regex")
});

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title regex"));

static IMAGE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https?://[^"'\s<>]+\.(?:jpg|jpeg|png|webp)[^"'\s<>]*"#).expect("image regex")
});

/// Runs every strategy in order and merges the results
pub fn extract(document: &str) -> PartialMetadata {
    let mut merged = PartialMetadata::default();
    for (name, strategy) in STRATEGIES {
        if merged.is_complete() {
            break;
        }
        let found = strategy(document);
        if found != PartialMetadata::default() {
            tracing::trace!(strategy = name, "Extraction strategy matched");
        }
        merged = merged.merge(found);
    }
    merged
}

/// Structured data embedded as `application/ld+json`
pub fn json_ld(document: &str) -> PartialMetadata {
    let data = JSON_LD_RE
        .captures_iter(document)
        .filter_map(|c| serde_json::from_str::<Value>(c[1].trim()).ok())
        .find(Value::is_object);

    let Some(data) = data else {
        return PartialMetadata::default();
    };

    let cast = data["actor"].as_array().map(|actors| {
        actors
            .iter()
            .take(MAX_CAST)
            .filter_map(|actor| actor["name"].as_str())
            .filter(|name| !name.is_empty())
            .map(decode_entities)
            .collect::<Vec<_>>()
            .join(", ")
    });

    PartialMetadata {
        title: data["name"].as_str().map(text),
        cast,
        plot: data["description"].as_str().map(text),
        poster_url: data["image"].as_str().filter(|url| is_http(url)).map(str::to_string),
    }
}

/// `<meta name="description">`, conventionally "Title. Cast. Story."
pub fn meta_description(document: &str) -> PartialMetadata {
    let Some(description) = meta_content(document, "name", "description") else {
        return PartialMetadata::default();
    };
    if description.len() <= MIN_DESCRIPTION_LEN {
        return PartialMetadata::default();
    }

    let parts: Vec<&str> = description.split('.').collect();
    PartialMetadata {
        title: parts.first().map(|p| text(p)),
        cast: parts.get(1).map(|p| text(p)),
        plot: (parts.len() >= 3).then(|| text(&parts[2..].join("."))),
        poster_url: None,
    }
}

/// The document `<title>`
pub fn page_title(document: &str) -> PartialMetadata {
    PartialMetadata {
        title: TITLE_RE
            .captures(document)
            .map(|c| clean_title(&decode_entities(&c[1]))),
        ..Default::default()
    }
}

/// Open Graph `og:image` and `og:title`
pub fn open_graph(document: &str) -> PartialMetadata {
    PartialMetadata {
        title: meta_content(document, "property", "og:title").map(|t| clean_title(&t)),
        poster_url: meta_content(document, "property", "og:image").filter(|url| is_http(url)),
        ..Default::default()
    }
}

/// Last resort: any poster-like image URL in the raw page
pub fn raw_image_urls(document: &str) -> PartialMetadata {
    let poster_url = IMAGE_URL_RE
        .find_iter(document)
        .take(MAX_IMAGE_CANDIDATES)
        .map(|m| m.as_str())
        .find(|url| {
            let lower = url.to_lowercase();
            lower.contains("poster") || lower.contains("images")
        })
        .map(upscale_poster);

    PartialMetadata {
        poster_url,
        ..Default::default()
    }
}

/// Strips IMDb suffixes such as " - IMDb", " | ..." and " (2009)" from a page title
pub fn clean_title(raw: &str) -> String {
    let title = raw.split(" - IMDb").next().unwrap_or_default();
    let title = title.split(" | ").next().unwrap_or_default();
    let title = title.split(" (").next().unwrap_or_default();
    text(title)
}

/// Requests the 300px-wide rendition of an IMDb image URL
pub fn upscale_poster(url: &str) -> String {
    match url.split_once("._V1_") {
        Some((base, _)) => format!("{}._V1_SX300.jpg", base),
        None => url.to_string(),
    }
}

fn meta_content(document: &str, attr: &str, value: &str) -> Option<String> {
    META_RE
        .find_iter(document)
        .map(|tag| attributes(tag.as_str()))
        .find(|attrs| {
            attrs
                .get(attr)
                .is_some_and(|v| v.eq_ignore_ascii_case(value))
        })
        .and_then(|mut attrs| attrs.remove("content"))
        .map(|content| decode_entities(&content))
}

fn attributes(tag: &str) -> HashMap<String, String> {
    ATTR_RE
        .captures_iter(tag)
        .map(|c| {
            let value = c.get(2).or_else(|| c.get(3)).map_or("", |m| m.as_str());
            (c[1].to_ascii_lowercase(), value.to_string())
        })
        .collect()
}

fn text(raw: &str) -> String {
    decode_entities(raw)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMDB_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>Avatar (2009) - IMDb</title>
<meta name="description" content="Avatar: Directed by James Cameron. With Sam Worthington, Zoe Saldana. A paraplegic Marine dispatched to the moon Pandora.">
<meta property="og:title" content="Avatar (2009) &#x27;Extended&#x27; | IMDb">
<meta content="https://m.media-amazon.com/images/M/og.jpg" property="og:image">
<script type="application/ld+json">{"@type":"Movie","name":"Avatar","description":"A paraplegic Marine dispatched to the moon Pandora on a unique mission becomes torn between following his orders and protecting the world he feels is his home.","image":"https://m.media-amazon.com/images/M/poster.jpg","actor":[{"@type":"Person","name":"Sam Worthington"},{"@type":"Person","name":"Zoe Saldana"},{"@type":"Person","name":"Sigourney Weaver"}]}</script>
</head>
<body></body>
</html>"#;

    #[test]
    fn test_json_ld() {
        let found = json_ld(IMDB_PAGE);
        assert_eq!(found.title.as_deref(), Some("Avatar"));
        assert_eq!(
            found.cast.as_deref(),
            Some("Sam Worthington, Zoe Saldana, Sigourney Weaver")
        );
        assert!(found.plot.unwrap().starts_with("A paraplegic Marine"));
        assert_eq!(
            found.poster_url.as_deref(),
            Some("https://m.media-amazon.com/images/M/poster.jpg")
        );
    }

    #[test]
    fn test_json_ld_limits_cast() {
        let doc = r#"<script type="application/ld+json">{"actor":[{"name":"A"},{"name":"B"},{"name":"C"},{"name":"D"},{"name":"E"},{"name":"F"}]}</script>"#;
        assert_eq!(json_ld(doc).cast.as_deref(), Some("A, B, C, D, E"));
    }

    #[test]
    fn test_json_ld_ignores_invalid_json() {
        let doc = r#"<script type="application/ld+json">{not json</script>"#;
        assert_eq!(json_ld(doc), PartialMetadata::default());
    }

    #[test]
    fn test_json_ld_ignores_relative_image() {
        let doc = r#"<script type="application/ld+json">{"image":"/poster.jpg"}</script>"#;
        assert_eq!(json_ld(doc).poster_url, None);
    }

    #[test]
    fn test_meta_description_splits_on_periods() {
        let found = meta_description(IMDB_PAGE);
        assert_eq!(found.title.as_deref(), Some("Avatar: Directed by James Cameron"));
        assert_eq!(found.cast.as_deref(), Some("With Sam Worthington, Zoe Saldana"));
        assert_eq!(
            found.plot.as_deref(),
            Some("A paraplegic Marine dispatched to the moon Pandora.")
        );
    }

    #[test]
    fn test_meta_description_too_short() {
        let doc = r#"<meta name="description" content="Short.">"#;
        assert_eq!(meta_description(doc), PartialMetadata::default());
    }

    #[test]
    fn test_page_title_is_cleaned() {
        assert_eq!(page_title(IMDB_PAGE).title.as_deref(), Some("Avatar"));
    }

    #[test]
    fn test_open_graph_attribute_order_and_entities() {
        let found = open_graph(IMDB_PAGE);
        assert_eq!(
            found.poster_url.as_deref(),
            Some("https://m.media-amazon.com/images/M/og.jpg")
        );
        assert_eq!(found.title.as_deref(), Some("Avatar"));
    }

    #[test]
    fn test_raw_image_urls() {
        let doc = r#"<div style="background:url(https://cdn.example.com/logo.png)"></div>
            <img src="https://m.media-amazon.com/images/M/MV5B._V1_QL75_UX190_.jpg">"#;
        assert_eq!(
            raw_image_urls(doc).poster_url.as_deref(),
            Some("https://m.media-amazon.com/images/M/MV5B._V1_SX300.jpg")
        );
    }

    #[test]
    fn test_raw_image_urls_without_match() {
        let doc = r#"<img src="https://cdn.example.com/logo.png">"#;
        assert_eq!(raw_image_urls(doc).poster_url, None);
    }

    #[test]
    fn test_extract_prefers_earlier_strategies() {
        let found = extract(IMDB_PAGE);
        assert_eq!(found.title.as_deref(), Some("Avatar"));
        assert_eq!(
            found.poster_url.as_deref(),
            Some("https://m.media-amazon.com/images/M/poster.jpg")
        );
        assert!(found.is_complete());
    }

    #[test]
    fn test_extract_merges_partial_strategies() {
        let doc = r#"<html><head>
            <title>Heat (1995) - IMDb</title>
            <meta property="og:image" content="https://m.media-amazon.com/images/M/heat.jpg">
            </head></html>"#;
        let found = extract(doc);
        assert_eq!(found.title.as_deref(), Some("Heat"));
        assert_eq!(
            found.poster_url.as_deref(),
            Some("https://m.media-amazon.com/images/M/heat.jpg")
        );
        assert_eq!(found.cast, None);
        assert_eq!(found.plot, None);
    }

    #[test]
    fn test_extract_empty_document() {
        assert_eq!(extract(""), PartialMetadata::default());
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("The Dark Knight (2008) - IMDb"), "The Dark Knight");
        assert_eq!(clean_title("Inception | Official Site"), "Inception");
        assert_eq!(clean_title("  Up  "), "Up");
    }

    #[test]
    fn test_upscale_poster() {
        assert_eq!(
            upscale_poster("https://m.media-amazon.com/images/M/abc._V1_UX67_CR0,0,67,98_AL_.jpg"),
            "https://m.media-amazon.com/images/M/abc._V1_SX300.jpg"
        );
        assert_eq!(upscale_poster("https://x/poster.jpg"), "https://x/poster.jpg");
    }
}
