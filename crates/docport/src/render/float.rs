use std::ops::RangeInclusive;
use std::path::Path;

use super::image;

/// Substring (matched case-insensitively against the image path) that marks
/// an image as the document's floating image.
const PATH_MARKER: &str = "screenshot";

/// Line-index window in which the floating block may be inserted.
const INSERT_WINDOW: RangeInclusive<usize> = 10..=12;

/// Content substrings that identify the insertion line inside the window.
///
/// Deliberate simplification: the window and markers are tuned to the lead
/// paragraph of the documents this tool is run against, not inferred from
/// document structure.
const CONTENT_MARKERS: [&str; 2] = ["Turns out", "tools themselves"];

/// A floating image located by the pre-scan pass, ready for one-shot
/// insertion near the top of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatingImage {
    pub src: String,
    pub caption: String,
}

impl FloatingImage {
    /// Renders the floated container inserted ahead of the trigger line.
    #[must_use]
    pub fn container_html(&self) -> String {
        format!(
            "<div class=\"screenshot-container\">{}</div>\n",
            image::render_img_tag(&self.src, &self.caption, "screenshot")
        )
    }
}

/// Returns true if `path` names the floating image.
pub(crate) fn is_floating_path(path: &str) -> bool {
    path.to_ascii_lowercase().contains(PATH_MARKER)
}

/// Pre-scan pass: locates the first floating-image candidate.
///
/// Scans top to bottom and stops at the first image line whose path carries
/// the marker substring. The candidate's source is resolved immediately
/// (falling back to the raw path on failure) and paired with a caption: the
/// first non-empty line after the candidate when that line is wrapped in
/// single asterisks, otherwise the image's alt text.
#[must_use]
pub fn find_floating_image(lines: &[&str], base_dir: &Path) -> Option<FloatingImage> {
    for (i, line) in lines.iter().enumerate() {
        let Some(image_ref) = image::parse_image_line(line.trim()) else {
            continue;
        };
        if !is_floating_path(image_ref.path) {
            continue;
        }
        let src = image::resolve_src(image_ref.path, base_dir);
        let caption =
            caption_after(&lines[i + 1..]).unwrap_or_else(|| image_ref.alt.to_owned());
        return Some(FloatingImage { src, caption });
    }
    None
}

fn caption_after(rest: &[&str]) -> Option<String> {
    let line = rest.iter().map(|l| l.trim()).find(|l| !l.is_empty())?;
    is_caption_line(line).then(|| line.trim_matches('*').trim().to_owned())
}

/// Returns true for a line wrapped in single asterisks on both ends.
pub(crate) fn is_caption_line(line: &str) -> bool {
    line.len() >= 2 && line.starts_with('*') && line.ends_with('*')
}

/// Returns true when the floating block should be inserted before `line`.
///
/// Fires on a non-empty line inside the fixed index window that carries one
/// of the content markers and is not itself a heading, image, caption, or
/// code-fence line.
#[must_use]
pub fn should_insert_at(index: usize, line: &str) -> bool {
    INSERT_WINDOW.contains(&index)
        && !line.is_empty()
        && !line.starts_with('#')
        && !line.starts_with('!')
        && !line.starts_with('*')
        && !line.starts_with("```")
        && CONTENT_MARKERS.iter().any(|marker| line.contains(marker))
}
