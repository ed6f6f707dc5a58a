use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::page;
use crate::render::markdown::render_body;

/// Converts a markdown file into a standalone HTML page.
///
/// Reads `input`, renders its body with relative image paths resolved
/// against the input's directory, wraps it in the page shell, and writes
/// `output`.
///
/// # Errors
///
/// Returns an error if the input cannot be read, the shell fails to render,
/// or the output cannot be written.
pub fn convert(input: &Path, output: &Path, title: &str, config: &Config) -> Result<()> {
    let content = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let base_dir = match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let body = render_body(&content, base_dir);
    let html = page::render_page(title, &config.stylesheet, &body)?;

    fs::write(output, html).with_context(|| format!("failed to write {}", output.display()))?;
    println!("✓ HTML file created: {}", output.display());
    Ok(())
}
