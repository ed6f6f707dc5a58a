use anyhow::{Context, Result};
use minijinja::{Environment, context};

/// Fixed page shell wrapped around every rendered document body.
///
/// Standalone by construction: one external stylesheet reference, an inline
/// script placeholder, and the layout CSS embedded so the output file needs
/// nothing but its stylesheet URL. The body is injected pre-rendered via
/// `| safe`; the title is auto-escaped.
const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <link rel="stylesheet" href="{{ stylesheet }}">
    <script>
        // Reserved for per-document interactive extensions.
    </script>
    <style>
        body {
            max-width: 900px;
            margin: 0 auto;
            padding: 0;
            line-height: 1.7;
            font-size: 16px;
        }
        .content-wrapper {
            padding: 20px;
            padding-top: 24px;
        }
        .screenshot-container {
            float: right;
            width: 180px;
            margin: 0 0 20px 24px;
            z-index: 10;
        }
        h1 {
            margin-top: 0;
            margin-bottom: 16px;
        }
        h2 {
            margin-top: 32px;
            margin-bottom: 16px;
        }
        h3 {
            margin-top: 24px;
            margin-bottom: 12px;
        }
        p {
            margin: 0 0 16px 0;
        }
        code {
            background: #f4f4f4;
            padding: 2px 6px;
            border-radius: 3px;
        }
        pre code {
            background: #f4f4f4;
            padding: 10px;
            display: block;
            border-radius: 5px;
            overflow-x: auto;
        }
        img {
            border-radius: 5px;
        }
        img.screenshot {
            max-width: 180px;
            width: 180px;
            height: auto;
            border-radius: 12px;
            box-shadow: 0 8px 24px rgba(0, 0, 0, 0.15), 0 2px 8px rgba(0, 0, 0, 0.1);
            border: 2px solid rgba(255, 255, 255, 0.8);
        }
        img.diagram {
            max-width: 100%;
            height: auto;
            margin: 20px 0;
        }
        .image-caption {
            font-style: italic;
            color: #666;
            text-align: center;
            margin-top: -15px;
            margin-bottom: 20px;
            clear: both;
        }
    </style>
</head>
<body>
    <div class="content-wrapper">
{{ body | safe }}
    </div>
</body>
</html>
"#;

/// Wraps a rendered document body in the standalone page shell.
///
/// # Errors
///
/// Returns an error if the shell template fails to compile or render.
pub fn render_page(title: &str, stylesheet: &str, body: &str) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("page.html", PAGE_TEMPLATE)
        .context("failed to compile page template")?;
    let template = env
        .get_template("page.html")
        .context("failed to load page template")?;
    template
        .render(context! { title, stylesheet, body })
        .context("failed to render page template")
}
