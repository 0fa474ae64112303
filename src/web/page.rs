use base64::{engine::general_purpose, Engine};

use crate::handlers::collector::{CONTEXT_FIELD, IMAGE_FIELD};
use crate::models::{SubmissionOutcome, UploadedImage};

pub const MISSING_IMAGE_MESSAGE: &str = "Please upload an image of your meal to proceed.";
pub const SUCCESS_MESSAGE: &str = "Calorie breakdown is ready!";
pub const BUSY_MESSAGE: &str = "Analyzing the image and calculating calories...";

const STYLE: &str = include_str!("../../static/page.css");
const SCRIPT: &str = include_str!("../../static/page.js");

/// What the single page shows for one render.
#[derive(Debug, Default)]
pub struct PageView<'a> {
    pub context: &'a str,
    pub preview: Option<&'a UploadedImage>,
    pub outcome: Option<&'a SubmissionOutcome>,
}

impl<'a> PageView<'a> {
    pub fn idle() -> Self {
        Self::default()
    }
}

pub fn render(view: &PageView<'_>) -> String {
    let (preview_hidden, preview_src) = match view.preview {
        Some(image) => ("", data_url(image)),
        None => (" hidden", String::new()),
    };

    let result = view.outcome.map(render_outcome).unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Gemini Health App</title>
<link rel="icon" href="data:image/svg+xml,<svg xmlns=%22http://www.w3.org/2000/svg%22 viewBox=%220 0 100 100%22><text y=%22.9em%22 font-size=%2290%22>🍎</text></svg>">
<style>
{style}</style>
</head>
<body>
<main>
<h1>🥗 Gemini Health App - Calorie Calculator</h1>
<p>This app helps you calculate the total calories in the food items from an image.</p>
<form id="meal-form" method="post" action="/calculate" enctype="multipart/form-data">
<label for="{context_field}">Describe your meal or give additional context:</label>
<input type="text" id="{context_field}" name="{context_field}" value="{context}">
<label for="{image_field}">Upload an image of your meal (jpg, jpeg, png):</label>
<input type="file" id="{image_field}" name="{image_field}" accept=".jpg,.jpeg,.png,image/jpeg,image/png">
<figure id="preview"{preview_hidden}>
<img id="preview-img" src="{preview_src}" alt="Uploaded meal">
<figcaption>Uploaded Image.</figcaption>
</figure>
<section class="instructions">
<p><strong>Instructions:</strong></p>
<ul>
<li>Upload an image of your food.</li>
<li>Provide any additional context (optional).</li>
<li>Click 'Calculate Calories' to see the total calorie count and breakdown of each food item.</li>
</ul>
</section>
<button type="submit">🍽️ Calculate Calories</button>
<p id="busy" class="busy" hidden>{busy}</p>
</form>
{result}<footer>
<hr>
<em>Powered by Google Gemini Pro Vision API</em>
</footer>
</main>
<script>
{script}</script>
</body>
</html>
"#,
        style = STYLE,
        script = SCRIPT,
        context_field = CONTEXT_FIELD,
        image_field = IMAGE_FIELD,
        context = html_escape::encode_double_quoted_attribute(view.context),
        preview_hidden = preview_hidden,
        preview_src = preview_src,
        busy = BUSY_MESSAGE,
        result = result,
    )
}

fn render_outcome(outcome: &SubmissionOutcome) -> String {
    match outcome {
        SubmissionOutcome::MissingImage => format!(
            "<section id=\"result\">\n<div class=\"banner error\">{}</div>\n</section>\n",
            MISSING_IMAGE_MESSAGE
        ),
        SubmissionOutcome::Success(text) => format!(
            "<section id=\"result\">\n<div class=\"banner success\">{}</div>\n<h2>Calorie Breakdown</h2>\n<div class=\"response\">{}</div>\n</section>\n",
            SUCCESS_MESSAGE,
            html_escape::encode_text(text)
        ),
        SubmissionOutcome::Failed(message) => format!(
            "<section id=\"result\">\n<div class=\"banner error\">An error occurred: {}</div>\n</section>\n",
            html_escape::encode_text(message)
        ),
    }
}

fn data_url(image: &UploadedImage) -> String {
    format!(
        "data:{};base64,{}",
        image.media_type.as_mime(),
        general_purpose::STANDARD.encode(&image.bytes)
    )
}
