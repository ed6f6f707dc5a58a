use std::fmt::Write;
use std::path::Path;

use super::float::{self, FloatingImage};
use super::image::{self, ImageRef};
use super::inline::apply_inline_styles;
use super::{escape_code, escape_html};

/// Renders a markdown document body to HTML in one forward pass over its
/// lines.
///
/// Relative image paths resolve against `base_dir`. The renderer never
/// fails: unrecognized constructs fall through to the paragraph case and
/// image resolution failures degrade to raw path references.
#[must_use]
pub fn render_body(content: &str, base_dir: &Path) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    Renderer::new(&lines, base_dir).render()
}

/// Which list wrapper is currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Numbered,
}

impl ListKind {
    fn open_tag(self) -> &'static str {
        match self {
            Self::Bullet => "<ul>\n",
            Self::Numbered => "<ol>\n",
        }
    }

    fn close_tag(self) -> &'static str {
        match self {
            Self::Bullet => "</ul>\n",
            Self::Numbered => "</ol>\n",
        }
    }
}

/// Mutable state threaded through the single rendering pass.
#[derive(Debug, Default)]
struct RenderState {
    in_code_block: bool,
    open_list: Option<ListKind>,
    prev_line_was_image: bool,
    float_placed: bool,
}

struct Renderer<'a> {
    lines: &'a [&'a str],
    base_dir: &'a Path,
    /// Candidate located by the pre-scan pass, inserted at most once.
    floating: Option<FloatingImage>,
    state: RenderState,
    html: String,
}

impl<'a> Renderer<'a> {
    fn new(lines: &'a [&'a str], base_dir: &'a Path) -> Self {
        Self {
            lines,
            base_dir,
            floating: float::find_floating_image(lines, base_dir),
            state: RenderState::default(),
            html: String::new(),
        }
    }

    fn render(mut self) -> String {
        for i in 0..self.lines.len() {
            self.line(i);
        }
        // Force-close a list left open at end of input.
        self.close_list();
        self.html
    }

    fn line(&mut self, i: usize) {
        let raw = self.lines[i];
        let line = raw.trim();

        // Image reference: `![alt](path)`.
        if let Some(image_ref) = image::parse_image_line(line) {
            self.image_line(image_ref);
            return;
        }

        // Caption immediately following an image.
        if self.state.prev_line_was_image && float::is_caption_line(line) {
            let _ = writeln!(
                self.html,
                "<p class=\"image-caption\">{}</p>",
                line.trim_matches('*')
            );
            self.state.prev_line_was_image = false;
            return;
        }

        // One-shot floating-image insertion, ahead of the line's own content.
        if !self.state.float_placed
            && let Some(floating) = &self.floating
            && float::should_insert_at(i, line)
        {
            let container = floating.container_html();
            self.html.push_str(&container);
            self.state.float_placed = true;
        }

        self.state.prev_line_was_image = false;

        if line.starts_with("```") {
            self.toggle_code_fence(line);
        } else if self.state.in_code_block {
            // Verbatim, original indentation kept, HTML specials escaped.
            self.html.push_str(&escape_code(raw));
            self.html.push('\n');
        } else if let Some(text) = line.strip_prefix("### ") {
            self.close_list();
            let _ = writeln!(self.html, "<h3>{text}</h3>");
        } else if let Some(text) = line.strip_prefix("## ") {
            self.close_list();
            let anchor = heading_anchor(text);
            let _ = writeln!(self.html, "<h2 id=\"{}\">{text}</h2>", escape_html(&anchor));
        } else if let Some(text) = line.strip_prefix("# ") {
            self.close_list();
            let _ = writeln!(self.html, "<h1>{text}</h1>");
        } else if let Some(item) = line
            .strip_prefix("- ")
            .or_else(|| line.strip_prefix("* "))
        {
            self.list_item(ListKind::Bullet, item);
        } else if let Some(item) = strip_ordered_prefix(line) {
            self.list_item(ListKind::Numbered, item);
        } else if line.is_empty() {
            self.blank_line(i);
        } else {
            self.close_list();
            let _ = writeln!(self.html, "<p>{}</p>", apply_inline_styles(line));
        }
    }

    fn image_line(&mut self, image_ref: ImageRef<'_>) {
        // The floating image is placed once via its own slot, never inline.
        if float::is_floating_path(image_ref.path) {
            return;
        }
        self.close_list();
        let src = image::resolve_src(image_ref.path, self.base_dir);
        let tag = image::render_img_tag(&src, image_ref.alt, "diagram");
        let _ = writeln!(self.html, "{tag}");
        self.state.prev_line_was_image = true;
    }

    fn toggle_code_fence(&mut self, line: &str) {
        if self.state.in_code_block {
            self.html.push_str("</code></pre>\n");
            self.state.in_code_block = false;
        } else {
            let lang = line[3..].trim();
            let _ = writeln!(
                self.html,
                "<pre><code class=\"language-{}\">",
                escape_html(lang)
            );
            self.state.in_code_block = true;
        }
    }

    fn list_item(&mut self, kind: ListKind, item: &str) {
        if self.state.open_list != Some(kind) {
            self.close_list();
            self.html.push_str(kind.open_tag());
            self.state.open_list = Some(kind);
        }
        let _ = writeln!(self.html, "<li>{}</li>", apply_inline_styles(item));
    }

    /// A blank line closes an open list unless the lookahead shows list
    /// syntax resuming; a paragraph spacer is emitted either way.
    fn blank_line(&mut self, i: usize) {
        if self.state.open_list.is_some() && !self.list_resumes_after(i) {
            self.close_list();
        }
        self.html.push_str("<p></p>\n");
    }

    /// Lookahead over the next two raw lines (blanks among them ignored) for
    /// a `-`, `*`, or `<digits>.` prefix.
    fn list_resumes_after(&self, i: usize) -> bool {
        self.lines
            .iter()
            .skip(i + 1)
            .take(2)
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .any(|l| {
                l.starts_with('-') || l.starts_with('*') || starts_with_ordered_marker(l)
            })
    }

    fn close_list(&mut self) {
        if let Some(kind) = self.state.open_list.take() {
            self.html.push_str(kind.close_tag());
        }
    }
}

/// Derives a stable anchor id from level-2 heading text: lowercased, spaces
/// replaced with hyphens, `:` and `?` stripped.
fn heading_anchor(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter_map(|ch| match ch {
            ' ' => Some('-'),
            ':' | '?' => None,
            other => Some(other),
        })
        .collect()
}

/// Strips a `1. ` ordered-list marker, returning the item text.
fn strip_ordered_prefix(line: &str) -> Option<&str> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix('.')?;
    let item = rest.trim_start();
    // The marker needs at least one space after the dot.
    (item.len() < rest.len()).then_some(item)
}

fn starts_with_ordered_marker(line: &str) -> bool {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && line.as_bytes().get(digits) == Some(&b'.')
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    fn render(content: &str) -> String {
        render_body(content, Path::new("."))
    }

    /// A document whose line at `marker_index` carries a trigger marker, with
    /// `head` lines placed at the top and blank padding in between.
    fn doc_with_trigger(head: &[&str], marker_index: usize) -> String {
        let mut lines: Vec<String> = head.iter().map(|l| (*l).to_owned()).collect();
        while lines.len() < marker_index {
            lines.push(String::new());
        }
        lines.push("Turns out this works.".to_owned());
        lines.join("\n")
    }

    // -- headings --

    #[test]
    fn h1_renders_once() {
        let html = render("# Title");
        assert_eq!(html, "<h1>Title</h1>\n");
    }

    #[test]
    fn h2_gets_anchor_id() {
        let html = render("## Does It Work?");
        assert_eq!(html, "<h2 id=\"does-it-work\">Does It Work?</h2>\n");
    }

    #[test]
    fn h2_anchor_strips_colon() {
        let html = render("## Rules: The Basics");
        assert!(
            html.contains("id=\"rules-the-basics\""),
            "html:\n{html}"
        );
    }

    #[test]
    fn h3_renders() {
        assert_eq!(render("### Sub"), "<h3>Sub</h3>\n");
    }

    #[test]
    fn heading_without_space_is_paragraph() {
        assert_eq!(render("#notes"), "<p>#notes</p>\n");
    }

    // -- paragraphs and inline styles --

    #[test]
    fn paragraph_with_inline_styles() {
        let html = render("some **bold** and *em* and `code`");
        assert_eq!(
            html,
            "<p>some <strong>bold</strong> and <em>em</em> and <code>code</code></p>\n"
        );
    }

    #[test]
    fn styled_spans_leave_no_delimiters() {
        let html = render("**a** *b* `c`");
        assert!(!html.contains('*'), "no residual asterisks, html:\n{html}");
        assert!(!html.contains('`'), "no residual backticks, html:\n{html}");
    }

    // -- lists --

    #[test]
    fn consecutive_bullets_share_one_wrapper() {
        let html = render("- a\n- b");
        assert_eq!(html, "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
    }

    #[test]
    fn document_without_lists_has_no_wrappers() {
        let html = render("just text\n\n# Heading\nmore text");
        assert!(!html.contains("<ul>"), "html:\n{html}");
        assert!(!html.contains("<ol>"), "html:\n{html}");
    }

    #[test]
    fn star_bullets_work() {
        let html = render("* a\n* b");
        assert_eq!(html, "<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");
    }

    #[test]
    fn numbered_list_uses_ol() {
        let html = render("1. first\n2. second");
        assert_eq!(html, "<ol>\n<li>first</li>\n<li>second</li>\n</ol>\n");
    }

    #[test]
    fn source_numbering_is_discarded() {
        let html = render("7. first\n99. second");
        assert_eq!(html, "<ol>\n<li>first</li>\n<li>second</li>\n</ol>\n");
    }

    #[test]
    fn switching_list_kind_closes_previous_wrapper() {
        let html = render("- a\n1. b");
        assert_eq!(html, "<ul>\n<li>a</li>\n</ul>\n<ol>\n<li>b</li>\n</ol>\n");
    }

    #[test]
    fn list_items_get_inline_styles() {
        let html = render("- **bold** item");
        assert!(
            html.contains("<li><strong>bold</strong> item</li>"),
            "html:\n{html}"
        );
    }

    #[test]
    fn heading_closes_open_list() {
        let html = render("- a\n# Done");
        assert_eq!(html, "<ul>\n<li>a</li>\n</ul>\n<h1>Done</h1>\n");
    }

    #[test]
    fn paragraph_closes_open_list() {
        let html = render("- a\ntext");
        assert_eq!(html, "<ul>\n<li>a</li>\n</ul>\n<p>text</p>\n");
    }

    #[test]
    fn list_open_at_end_of_input_is_closed() {
        let html = render("- a");
        assert!(html.ends_with("</ul>\n"), "html:\n{html}");
    }

    #[test]
    fn blank_line_between_items_keeps_list_open() {
        let html = render("- a\n\n- b");
        assert_eq!(html, "<ul>\n<li>a</li>\n<p></p>\n<li>b</li>\n</ul>\n");
    }

    #[test]
    fn blank_line_with_lookahead_miss_closes_list() {
        let html = render("- a\n\ntext");
        assert_eq!(html, "<ul>\n<li>a</li>\n</ul>\n<p></p>\n<p>text</p>\n");
    }

    #[test]
    fn lookahead_sees_past_one_blank_line() {
        let html = render("- a\n\n\n- b");
        assert_eq!(
            html,
            "<ul>\n<li>a</li>\n<p></p>\n<p></p>\n<li>b</li>\n</ul>\n"
        );
    }

    #[test]
    fn blank_line_without_list_emits_spacer() {
        assert_eq!(render("a\n\nb"), "<p>a</p>\n<p></p>\n<p>b</p>\n");
    }

    // -- fenced code blocks --

    #[test]
    fn code_block_is_verbatim_and_escaped() {
        let md = indoc! {r#"
            ```python
            x = "<b>"
            ```
        "#};
        let html = render(md);
        assert!(
            html.contains("<pre><code class=\"language-python\">"),
            "html:\n{html}"
        );
        assert!(
            html.contains("x = \"&lt;b&gt;\""),
            "code content should be escaped verbatim, html:\n{html}"
        );
        assert!(
            !html.contains("<strong>") && !html.contains("<em>"),
            "no inline styles inside code, html:\n{html}"
        );
        assert!(html.contains("</code></pre>"), "html:\n{html}");
    }

    #[test]
    fn code_block_keeps_indentation() {
        let md = indoc! {"
            ```
            fn main() {
                body();
            }
            ```
        "};
        let html = render(md);
        assert!(html.contains("\n    body();\n"), "html:\n{html}");
    }

    #[test]
    fn code_block_ignores_markdown_syntax() {
        let md = indoc! {"
            ```
            # not a heading
            - not a list
            ```
        "};
        let html = render(md);
        assert!(!html.contains("<h1>"), "html:\n{html}");
        assert!(!html.contains("<li>"), "html:\n{html}");
    }

    #[test]
    fn fence_without_language_has_empty_class() {
        let html = render("```\ncode\n```");
        assert!(html.contains("class=\"language-\""), "html:\n{html}");
    }

    // -- images and captions --

    #[test]
    fn missing_image_falls_back_to_raw_path_and_continues() {
        let html = render("![A diagram](missing.png)\nafter");
        assert!(
            html.contains("<img src=\"missing.png\" alt=\"A diagram\" class=\"diagram\" />"),
            "html:\n{html}"
        );
        assert!(html.contains("<p>after</p>"), "rendering continues, html:\n{html}");
    }

    #[test]
    fn existing_image_is_embedded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pic.png"), b"abc").unwrap();

        let html = render_body("![Pic](pic.png)", dir.path());
        assert!(
            html.contains("src=\"data:image/png;base64,YWJj\""),
            "html:\n{html}"
        );
    }

    #[test]
    fn image_closes_open_list() {
        let html = render("- a\n![d](missing.png)");
        assert!(html.starts_with("<ul>\n<li>a</li>\n</ul>\n<img "), "html:\n{html}");
    }

    #[test]
    fn caption_line_follows_image() {
        let html = render("![d](missing.png)\n*What it shows*");
        assert!(
            html.contains("<p class=\"image-caption\">What it shows</p>"),
            "html:\n{html}"
        );
    }

    #[test]
    fn caption_without_preceding_image_is_styled_text() {
        let html = render("*just emphasis*");
        assert_eq!(html, "<p><em>just emphasis</em></p>\n");
    }

    #[test]
    fn caption_flag_does_not_survive_intermediate_line() {
        let html = render("![d](missing.png)\ntext\n*late*");
        assert!(
            !html.contains("image-caption"),
            "caption pairing is adjacent-only, html:\n{html}"
        );
    }

    // -- floating image --

    #[test]
    fn floating_image_inserted_once_before_trigger_line() {
        let md = doc_with_trigger(&["![App](shot-screenshot.png)", "*The app*"], 10);
        let html = render(&md);

        let occurrences = html.matches("screenshot-container").count();
        assert_eq!(occurrences, 1, "exactly one floating block, html:\n{html}");
        assert!(
            html.contains("alt=\"The app\""),
            "caption from italic line, html:\n{html}"
        );

        let container = html.find("screenshot-container").unwrap();
        let trigger = html.find("<p>Turns out").unwrap();
        assert!(container < trigger, "container precedes trigger, html:\n{html}");
    }

    #[test]
    fn marked_images_are_never_rendered_inline() {
        let md = doc_with_trigger(
            &["![A](one-screenshot.png)", "![B](two-screenshot.png)"],
            10,
        );
        let html = render(&md);
        assert_eq!(
            html.matches("class=\"screenshot\"").count(),
            1,
            "only the floating slot renders a marked image, html:\n{html}"
        );
        assert!(!html.contains("class=\"diagram\""), "html:\n{html}");
    }

    #[test]
    fn no_trigger_line_means_no_floating_block() {
        let md = "![App](shot-screenshot.png)\nplain text";
        let html = render(md);
        assert!(!html.contains("screenshot-container"), "html:\n{html}");
    }

    #[test]
    fn trigger_outside_window_does_not_insert() {
        let md = doc_with_trigger(&["![App](shot-screenshot.png)"], 15);
        let html = render(&md);
        assert!(!html.contains("screenshot-container"), "html:\n{html}");
    }

    #[test]
    fn no_candidate_means_trigger_is_plain_paragraph() {
        let md = doc_with_trigger(&["no images here"], 10);
        let html = render(&md);
        assert!(!html.contains("screenshot-container"), "html:\n{html}");
        assert!(html.contains("<p>Turns out this works.</p>"), "html:\n{html}");
    }

    // -- helpers --

    #[test]
    fn heading_anchor_basic() {
        assert_eq!(heading_anchor("Does It Work?"), "does-it-work");
        assert_eq!(heading_anchor("Rules: The Basics"), "rules-the-basics");
        assert_eq!(heading_anchor("Plain"), "plain");
    }

    #[test]
    fn ordered_prefix_variants() {
        assert_eq!(strip_ordered_prefix("1. item"), Some("item"));
        assert_eq!(strip_ordered_prefix("42.  spaced"), Some("spaced"));
        assert_eq!(strip_ordered_prefix("1.no-space"), None);
        assert_eq!(strip_ordered_prefix("x. item"), None);
        assert_eq!(strip_ordered_prefix("1 item"), None);
    }
}
