use std::path::Path;

/// Turn user input into a URL the browser can open
///
/// Existing files become `file://` URLs; otherwise missing protocols are
/// added the way an address bar would.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();

    if trimmed.starts_with("http://")
        || trimmed.starts_with("https://")
        || trimmed.starts_with("file://")
        || trimmed.starts_with("data:")
        || trimmed.starts_with("about:")
    {
        return trimmed.to_string();
    }

    // Saved pages are the usual input when inspecting offline
    let path = Path::new(trimmed);
    if path.exists() {
        let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        return format!("file://{}", absolute.display());
    }

    if trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1") {
        return format!("http://{}", trimmed);
    }

    format!("https://{}", trimmed)
}
