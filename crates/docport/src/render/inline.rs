/// Inline style delimiters, tried in order. `**` must come before `*` so a
/// bold opener is never consumed as an italic one.
const SPANS: [(&str, &str); 3] = [("**", "strong"), ("*", "em"), ("`", "code")];

/// Applies inline-style substitution to one line of text.
///
/// Recognizes, in a single left-to-right scan, three non-overlapping span
/// types: `**bold**`, `*italic*`, and `` `code` ``. Span content is emitted
/// as-is (no nesting). Delimiters must pair on the same line; unmatched
/// delimiters are left as literal characters.
#[must_use]
pub fn apply_inline_styles(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        if let Some((span, remainder)) = take_span(rest) {
            output.push_str(&span);
            rest = remainder;
        } else {
            output.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }

    output
}

/// Consumes a complete styled span at the start of `rest`, if one is there.
fn take_span(rest: &str) -> Option<(String, &str)> {
    for (delim, tag) in SPANS {
        let Some(after_open) = rest.strip_prefix(delim) else {
            continue;
        };
        // Opening delimiter without a closing one stays literal.
        let end = after_open.find(delim)?;
        let body = &after_open[..end];
        let remainder = &after_open[end + delim.len()..];
        return Some((format!("<{tag}>{body}</{tag}>"), remainder));
    }
    None
}
