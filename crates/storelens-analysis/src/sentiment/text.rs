//! Review text preparation.

use std::sync::LazyLock;

use regex::Regex;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://\S+|www\.\S+").unwrap());

static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// `"<title>. <body>"` when both are present, else whichever exists.
pub fn compose_text(title: Option<&str>, body: Option<&str>) -> String {
    let t = title.unwrap_or("").trim();
    let b = body.unwrap_or("").trim();
    match (t.is_empty(), b.is_empty()) {
        (false, false) => format!("{t}. {b}"),
        (false, true) => t.to_string(),
        _ => b.to_string(),
    }
}

/// Strip URLs and collapse whitespace.
pub fn clean_text(s: &str) -> String {
    let s = URL_RE.replace_all(s, " ");
    SPACE_RE.replace_all(&s, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_text() {
        assert_eq!(compose_text(Some("Nice"), Some("Works well")), "Nice. Works well");
        assert_eq!(compose_text(Some("  "), Some("Works")), "Works");
        assert_eq!(compose_text(Some("Only title"), None), "Only title");
        assert_eq!(compose_text(None, None), "");
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(
            clean_text("see  https://a.b/c and\twww.x.io   now"),
            "see and now"
        );
    }
}
