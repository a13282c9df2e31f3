use url::Url;

/// Used when neither the URL nor the content type yields an extension.
pub const UNKNOWN_EXTENSION: &str = ".unknown";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtensionSource {
    Url,
    ContentType,
    Fallback,
}

/// Extension (with leading dot) for a downloaded file.
pub fn resolve(source_url: &str, content_type: Option<&str>) -> (String, ExtensionSource) {
    if let Some(ext) = from_url(source_url) {
        return (ext, ExtensionSource::Url);
    }
    match content_type.and_then(from_content_type) {
        Some(ext) => (ext.to_string(), ExtensionSource::ContentType),
        None => (UNKNOWN_EXTENSION.to_string(), ExtensionSource::Fallback),
    }
}

/// True when the extension says the host sent back a web page rather than the file.
pub fn is_html(ext: &str) -> bool {
    ext.to_ascii_lowercase().contains("htm")
}

/// True for `text/html`-style content types, whatever the URL says.
pub fn is_html_content_type(content_type: &str) -> bool {
    from_content_type(content_type).is_some_and(is_html)
}

pub fn from_url(source_url: &str) -> Option<String> {
    let path = match Url::parse(source_url) {
        Ok(u) => u.path().to_string(),
        // not absolute; strip query/fragment by hand
        Err(_) => source_url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    let last = path.rsplit('/').next()?;
    let dot = last.rfind('.')?;
    let ext = &last[dot..];
    if ext.len() < 2 { return None; }
    Some(ext.to_string())
}

pub fn from_content_type(content_type: &str) -> Option<&'static str> {
    let essence = content_type.split(';').next()?.trim().to_ascii_lowercase();
    let ext = match essence.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/webp" => ".webp",
        "image/bmp" => ".bmp",
        "image/svg+xml" => ".svg",
        "image/tiff" => ".tiff",
        "image/heic" => ".heic",
        "image/x-icon" | "image/vnd.microsoft.icon" => ".ico",
        "application/pdf" => ".pdf",
        "application/zip" => ".zip",
        "application/gzip" => ".gz",
        "application/json" => ".json",
        "application/xml" | "text/xml" => ".xml",
        "application/msword" => ".doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => ".docx",
        "application/vnd.ms-excel" => ".xls",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => ".xlsx",
        "application/vnd.ms-powerpoint" => ".ppt",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation" => ".pptx",
        "text/plain" => ".txt",
        "text/csv" => ".csv",
        "text/css" => ".css",
        "text/html" => ".html",
        "application/xhtml+xml" => ".xhtml",
        "audio/mpeg" => ".mp3",
        "audio/wav" | "audio/x-wav" => ".wav",
        "audio/ogg" => ".ogg",
        "video/mp4" => ".mp4",
        "video/webm" => ".webm",
        "video/quicktime" => ".mov",
        _ => return None,
    };
    Some(ext)
}
