//! Server-rendered pages.

use crate::handlers::index::CropResult;
use maud::{html, Markup, DOCTYPE};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 56rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
form { display: grid; gap: .75rem; padding: 1rem; border: 1px solid #ddd; border-radius: .5rem; }
label { font-weight: 600; }
.error { padding: .75rem 1rem; border-radius: .5rem; background: #fdecea; color: #8a1c12; }
.results { display: flex; flex-wrap: wrap; gap: 1.5rem; margin-top: 1.5rem; }
.results figure { margin: 0; }
.results img { max-width: 24rem; border: 1px solid #ddd; }
"#;

fn layout(content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "Image Cropper" }
                style { (maud::PreEscaped(STYLE)) }
            }
            body {
                h1 { "Image Cropper" }
                p { "Removes a 26 pixel border from every edge of an image." }
                (content)
            }
        }
    }
}

fn upload_form() -> Markup {
    html! {
        form method="post" action="/" enctype="multipart/form-data" {
            label for="image" { "Upload an image" }
            input type="file" id="image" name="image" accept="image/*";
            label for="image_url" { "or enter an image URL" }
            input type="url" id="image_url" name="image_url" placeholder="https://example.com/picture.png";
            button type="submit" { "Crop" }
        }
    }
}

/// The empty form, optionally with a message above it.
pub fn index_page(error: Option<&str>) -> Markup {
    layout(html! {
        @if let Some(message) = error {
            p.error role="alert" { (message) }
        }
        (upload_form())
    })
}

pub fn result_page(result: &CropResult) -> Markup {
    layout(html! {
        (upload_form())
        section.results {
            figure {
                img src={ "/artifacts/" (result.original.as_str()) } alt="Original image";
                figcaption {
                    "Original (" (result.original_dimensions.0) "×" (result.original_dimensions.1) ") "
                    a.download data-kind="original" href={ "/download/" (result.original.as_str()) } { "Download" }
                }
            }
            figure {
                img src={ "/artifacts/" (result.cropped.as_str()) } alt="Cropped image";
                figcaption {
                    "Cropped (" (result.cropped_dimensions.0) "×" (result.cropped_dimensions.1) ") "
                    a.download data-kind="cropped" href={ "/download/" (result.cropped.as_str()) } { "Download" }
                }
            }
        }
    })
}
