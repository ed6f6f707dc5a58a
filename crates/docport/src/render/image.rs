use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use tracing::warn;

use super::escape_html;

/// Matches an image reference at the start of a line: `![alt](path)`.
static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!\[([^\]]*)\]\(([^)]+)\)").expect("image pattern is valid"));

/// An image reference extracted from a markdown line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRef<'a> {
    pub alt: &'a str,
    pub path: &'a str,
}

/// Parses an image reference from the start of a (trimmed) line.
///
/// Trailing text after the closing parenthesis is ignored.
#[must_use]
pub(crate) fn parse_image_line(line: &str) -> Option<ImageRef<'_>> {
    let caps = IMAGE_RE.captures(line)?;
    Some(ImageRef {
        alt: caps.get(1)?.as_str(),
        path: caps.get(2)?.as_str(),
    })
}

/// Error from resolving an image reference to an embeddable source.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// The referenced file does not exist.
    #[error("image not found: {0}")]
    NotFound(PathBuf),

    /// The file exists but could not be read.
    #[error("failed to read image {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Converts an image file into a base64 data URI.
///
/// Relative paths resolve against `base_dir`. The MIME type comes from a
/// fixed extension table; unrecognized extensions fall back to `image/png`.
///
/// # Errors
///
/// Returns [`ImageError::NotFound`] if the resolved file does not exist, or
/// [`ImageError::Read`] if it cannot be read.
pub fn to_data_uri(path: &str, base_dir: &Path) -> Result<String, ImageError> {
    let resolved = resolve_path(path, base_dir);
    if !resolved.exists() {
        return Err(ImageError::NotFound(resolved));
    }
    let bytes = fs::read(&resolved).map_err(|source| ImageError::Read {
        path: resolved.clone(),
        source,
    })?;
    Ok(format!(
        "data:{};base64,{}",
        mime_type(&resolved),
        STANDARD.encode(bytes)
    ))
}

/// Resolves an image reference to an `src` value, degrading gracefully.
///
/// On success this is a data URI; on failure the raw path is kept, a warning
/// is logged, and rendering continues.
#[must_use]
pub fn resolve_src(path: &str, base_dir: &Path) -> String {
    match to_data_uri(path, base_dir) {
        Ok(uri) => uri,
        Err(e) => {
            warn!(path, error = %e, "image embedding failed, keeping raw reference");
            path.to_owned()
        }
    }
}

/// Renders a block-flow `<img>` element tagged with the given class.
#[must_use]
pub(crate) fn render_img_tag(src: &str, alt: &str, class: &str) -> String {
    format!(
        r#"<img src="{}" alt="{}" class="{class}" />"#,
        escape_html(src),
        escape_html(alt)
    )
}

fn resolve_path(path: &str, base_dir: &Path) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_owned()
    } else {
        base_dir.join(path)
    }
}

/// Maps a file extension (case-insensitive) to a MIME type.
fn mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        // png and anything unrecognized
        _ => "image/png",
    }
}
