//! Small text helpers shared by the config, auth, and remote modules.

/// Trim optional text and drop it when nothing is left.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Validate an HTTP(S) base URL and strip trailing slashes.
pub fn normalize_base_url(raw: &str, field: &str) -> Result<String, String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if !is_http_url(trimmed) {
        return Err(format!("{field} must include http:// or https://"));
    }
    Ok(trimmed.to_string())
}

/// Truncate backend error bodies before they end up in logs.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}
