// HTML rendering for the single-page UI
// Author: kelexine (https://github.com/kelexine)

use crate::vision::ImageFormat;

/// What to show below the upload form.
#[derive(Debug, Default)]
pub struct PageView {
    /// `data:` URI of the uploaded image.
    pub preview: Option<String>,
    /// Model answer, rendered under "Analysis Complete!".
    pub answer: Option<String>,
    /// Message rendered as an error block.
    pub error: Option<String>,
}

impl PageView {
    pub fn answer(preview: String, text: String) -> Self {
        Self {
            preview: Some(preview),
            answer: Some(text),
            error: None,
        }
    }

    pub fn error(preview: Option<String>, message: impl Into<String>) -> Self {
        Self {
            preview,
            answer: None,
            error: Some(message.into()),
        }
    }
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 46rem; margin: 2rem auto; padding: 0 1rem; color: #262730; }
h1 { margin-bottom: .25rem; }
form { display: flex; flex-direction: column; gap: .75rem; margin: 1.5rem 0; }
button { align-self: flex-start; padding: .5rem 1rem; border-radius: .5rem; border: 1px solid #ccc; background: #fff; cursor: pointer; }
figure { margin: 0; } figure img { max-width: 100%; } figcaption { color: #808495; font-size: .875rem; }
.success { background: #dff5e3; color: #177233; padding: .75rem 1rem; border-radius: .5rem; }
.error { background: #fde2e2; color: #7d1a1a; padding: .75rem 1rem; border-radius: .5rem; }
.answer { white-space: pre-wrap; line-height: 1.5; }
#spinner { display: none; color: #808495; }
"#;

const SCRIPT: &str = r#"
const input = document.getElementById('image');
const preview = document.getElementById('preview');
input.addEventListener('change', () => {
  const file = input.files[0];
  if (!file) return;
  preview.innerHTML = '<figure><img alt="Your Math Problem Image"><figcaption>Your Math Problem Image</figcaption></figure>';
  preview.querySelector('img').src = URL.createObjectURL(file);
});
document.getElementById('solve-form').addEventListener('submit', () => {
  document.getElementById('spinner').style.display = 'block';
});
"#;

/// Render the full page.
pub fn render(view: &PageView) -> String {
    let accept = ImageFormat::EXTENSIONS
        .iter()
        .map(|e| format!(".{}", e))
        .collect::<Vec<_>>()
        .join(",");

    let mut body = String::new();

    body.push_str("<div id=\"preview\">");
    if let Some(uri) = &view.preview {
        body.push_str(&format!(
            "<figure><img src=\"{}\" alt=\"Your Math Problem Image\"><figcaption>Your Math Problem Image</figcaption></figure>",
            escape_html(uri)
        ));
    }
    body.push_str("</div>");

    if let Some(message) = &view.error {
        body.push_str(&format!("<div class=\"error\">{}</div>", escape_html(message)));
    }
    if let Some(answer) = &view.answer {
        body.push_str("<div class=\"success\">Analysis Complete!</div>");
        body.push_str(&format!("<div class=\"answer\">{}</div>", escape_html(answer)));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Math Problem Solver</title>
<style>{style}</style>
</head>
<body>
<h1>&#x1F522; Math Advisor</h1>
<p>Upload a photo of your math problem to solve it!</p>
<form id="solve-form" method="post" action="/solve" enctype="multipart/form-data">
<label for="image">Upload your math problem image (jpg, jpeg, or png)</label>
<input type="file" id="image" name="image" accept="{accept}">
<button type="submit">Solve the problem</button>
<p id="spinner">Analyzing your math problem...</p>
</form>
{body}
<script>{script}</script>
</body>
</html>
"#,
        style = STYLE,
        accept = accept,
        body = body,
        script = SCRIPT,
    )
}

/// Escape text for HTML element and attribute content.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
