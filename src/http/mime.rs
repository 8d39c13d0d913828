//! MIME type detection module
//!
//! Returns the Content-Type for a resource based on its file extension.

use mime_guess::mime;
use std::path::Path;

/// Get MIME Content-Type for a file path
///
/// Text types are served as UTF-8.
///
/// # Examples
/// ```
/// use cachelab::http::mime::content_type_for;
/// use std::path::Path;
/// assert_eq!(content_type_for(Path::new("index.html")), "text/html; charset=utf-8");
/// assert_eq!(content_type_for(Path::new("logo.png")), "image/png");
/// ```
pub fn content_type_for(path: &Path) -> String {
    let guessed = mime_guess::from_path(path).first_or_octet_stream();
    if guessed.type_() == mime::TEXT && guessed.get_param(mime::CHARSET).is_none() {
        format!("{guessed}; charset=utf-8")
    } else {
        guessed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(
            content_type_for(Path::new("static/index.html")),
            "text/html; charset=utf-8"
        );
        assert_eq!(
            content_type_for(Path::new("static/app.css")),
            "text/css; charset=utf-8"
        );
        assert_eq!(content_type_for(Path::new("static/logo.png")), "image/png");
        assert_eq!(
            content_type_for(Path::new("static/data.json")),
            "application/json"
        );
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(
            content_type_for(Path::new("static/blob.qqqzz")),
            "application/octet-stream"
        );
        assert_eq!(
            content_type_for(Path::new("static/README")),
            "application/octet-stream"
        );
    }
}
