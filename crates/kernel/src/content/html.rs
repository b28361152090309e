//! HTML escaping, sanitization, and URL checks shared by the renderers.

/// HTML-escape a string for safe output in text or attribute position.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Sanitize user-provided rich text, allowing only safe inline HTML.
///
/// Uses ammonia to strip dangerous tags/attributes while preserving
/// basic formatting tags (`<b>`, `<i>`, `<a>`, `<br>`, etc.).
pub fn sanitize_text(input: &str) -> String {
    ammonia::clean(input)
}

/// Whether a URL uses http or https.
pub fn is_safe_url(url: &str) -> bool {
    let trimmed = url.trim();
    trimmed.starts_with("https://") || trimmed.starts_with("http://")
}

/// Whether a link target is http(s), site-relative, or an in-page anchor.
pub fn is_safe_href(href: &str) -> bool {
    let trimmed = href.trim();
    is_safe_url(trimmed)
        || trimmed.starts_with('#')
        || (trimmed.starts_with('/') && !trimmed.starts_with("//"))
        || trimmed.starts_with("mailto:")
        || trimmed.starts_with("tel:")
}

/// Whether a background value is a plain colour: `#rgb`, `#rgba`,
/// `#rrggbb`, `#rrggbbaa`, or a single alphabetic keyword such as `white`.
///
/// Anything else (`url(...)`, `var(...)`, gradients) is dropped by the
/// renderers.
pub fn is_safe_color(value: &str) -> bool {
    let value = value.trim();
    match value.strip_prefix('#') {
        Some(hex) => {
            matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => {
            !value.is_empty() && value.len() <= 32 && value.chars().all(|c| c.is_ascii_alphabetic())
        }
    }
}

/// Video hosts allowed to render as iframes.
const EMBED_WHITELIST: &[&str] = &[
    "youtube.com/watch",
    "youtube.com/embed/",
    "youtu.be/",
    "vimeo.com/",
    "player.vimeo.com/",
];

/// Check whether the given URL matches one of the whitelisted embed patterns.
pub fn is_whitelisted_embed(url: &str) -> bool {
    let normalised = url
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.");

    EMBED_WHITELIST
        .iter()
        .any(|pattern| normalised.starts_with(pattern))
}
