//! Resource path resolution
//!
//! Maps a request path onto a file under the static root.

use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

/// Resolve `request_path` (the URL path component, query already removed)
/// against `root`.
///
/// The path is percent-decoded and joined segment by segment. When the last
/// segment has no extension, or the path names the root itself, `index_file`
/// is appended. Returns `None` for paths that could escape the root: `..`
/// segments, NUL bytes, backslashes, or bytes that are not valid UTF-8 once
/// decoded.
pub fn resolve_resource_path(root: &Path, request_path: &str, index_file: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;
    if decoded.contains('\0') || decoded.contains('\\') {
        return None;
    }

    let mut resolved = root.to_path_buf();
    let mut last_segment = None;

    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            name => {
                resolved.push(name);
                last_segment = Some(name);
            }
        }
    }

    let has_extension = last_segment.is_some_and(|name| Path::new(name).extension().is_some());
    if !has_extension {
        resolved.push(index_file);
    }

    Some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(path: &str) -> Option<PathBuf> {
        resolve_resource_path(Path::new("/srv/static"), path, "index.html")
    }

    #[test]
    fn test_root_resolves_to_index() {
        assert_eq!(resolve("/"), Some(PathBuf::from("/srv/static/index.html")));
        assert_eq!(resolve(""), Some(PathBuf::from("/srv/static/index.html")));
    }

    #[test]
    fn test_extensionless_path_is_a_directory() {
        assert_eq!(
            resolve("/docs/guide"),
            Some(PathBuf::from("/srv/static/docs/guide/index.html"))
        );
        assert_eq!(
            resolve("/docs/"),
            Some(PathBuf::from("/srv/static/docs/index.html"))
        );
    }

    #[test]
    fn test_file_with_extension() {
        assert_eq!(
            resolve("/css/site.css"),
            Some(PathBuf::from("/srv/static/css/site.css"))
        );
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(
            resolve("/my%20page.html"),
            Some(PathBuf::from("/srv/static/my page.html"))
        );
    }

    #[test]
    fn test_traversal_rejected() {
        assert_eq!(resolve("/../etc/passwd"), None);
        assert_eq!(resolve("/a/../../secret.txt"), None);
        assert_eq!(resolve("/%2e%2e/secret.txt"), None);
        assert_eq!(resolve("/..%2fsecret.txt"), None);
        assert_eq!(resolve("/a%5c..%5csecret.txt"), None);
        assert_eq!(resolve("/index.html%00.png"), None);
    }

    #[test]
    fn test_dot_segments_ignored() {
        assert_eq!(
            resolve("/./a//b.txt"),
            Some(PathBuf::from("/srv/static/a/b.txt"))
        );
    }
}
