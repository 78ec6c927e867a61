//! Upload form and crop submission integration tests.
//!
//! Run with: `cargo test -p cropper-api --test crop_test`

mod helpers;

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use bytes::Bytes;
use cropper_core::{ArtifactKind, ArtifactName};
use cropper_storage::{
    Artifact, ArtifactStore, LocalStorage, PurgeReport, StorageError, StorageResult,
};
use helpers::fixtures::{create_test_png, decode_dimensions};
use helpers::upstream::spawn_upstream;
use helpers::{download_links, setup_test_app, setup_test_app_with_store};

/// Local store whose writes always fail, as on a full disk.
struct FullDiskStore(LocalStorage);

#[async_trait]
impl ArtifactStore for FullDiskStore {
    async fn put_batch(&self, _items: Vec<(Bytes, ArtifactKind)>) -> StorageResult<Vec<ArtifactName>> {
        Err(StorageError::UploadFailed(
            "Failed to write staging file: No space left on device (os error 28)".to_string(),
        ))
    }

    async fn get(&self, name: &str) -> StorageResult<Artifact> {
        self.0.get(name).await
    }

    async fn exists(&self, name: &str) -> StorageResult<bool> {
        self.0.exists(name).await
    }

    async fn purge_all(&self) -> StorageResult<PurgeReport> {
        self.0.purge_all().await
    }

    async fn health_check(&self) -> StorageResult<()> {
        self.0.health_check().await
    }
}

fn upload_form(png: Vec<u8>) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from(png))
        .file_name("image.png")
        .mime_type("image/png");
    MultipartForm::new()
        .add_part("image", part)
        .add_text("image_url", "")
}

fn url_form(url: &str) -> MultipartForm {
    let empty = Part::bytes(bytes::Bytes::new())
        .file_name("")
        .mime_type("application/octet-stream");
    MultipartForm::new()
        .add_part("image", empty)
        .add_text("image_url", url)
}

#[tokio::test]
async fn test_index_shows_form() {
    let app = setup_test_app().await;

    let response = app.client().get("/").await;

    assert_eq!(response.status_code(), 200);
    let html = response.text();
    assert!(html.contains(r#"name="image""#));
    assert!(html.contains(r#"name="image_url""#));
    assert!(download_links(&html).is_empty());
    assert_eq!(app.artifact_count(), 0);
}

#[tokio::test]
async fn test_upload_creates_original_and_cropped() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client.post("/").multipart(upload_form(create_test_png(100, 100))).await;

    assert_eq!(response.status_code(), 200);
    let links = download_links(&response.text());
    assert_eq!(links.len(), 2);
    assert!(links[0].ends_with("_original.png"));
    assert!(links[1].ends_with("_cropped.png"));
    assert_eq!(app.artifact_count(), 2);

    let original = client.get(&format!("/download/{}", links[0])).await;
    assert_eq!(original.status_code(), 200);
    assert_eq!(decode_dimensions(original.as_bytes()), (100, 100));

    let cropped = client.get(&format!("/download/{}", links[1])).await;
    assert_eq!(cropped.status_code(), 200);
    assert_eq!(cropped.header("content-type"), "image/png");
    let disposition = cropped.header("content-disposition");
    let disposition = disposition.to_str().unwrap();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains(&links[1]));
    assert_eq!(decode_dimensions(cropped.as_bytes()), (48, 48));
}

#[tokio::test]
async fn test_cropped_pixels_come_from_inside_the_margin() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client.post("/").multipart(upload_form(create_test_png(120, 90))).await;
    let links = download_links(&response.text());

    let cropped = client.get(&format!("/download/{}", links[1])).await;
    let img = image::load_from_memory(cropped.as_bytes()).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (68, 38));
    // Fixture pixels encode their coordinates: (x, y, 128, 255).
    assert_eq!(img.get_pixel(0, 0).0, [26, 26, 128, 255]);
    assert_eq!(img.get_pixel(67, 37).0, [93, 63, 128, 255]);
}

#[tokio::test]
async fn test_url_input_is_fetched_and_cropped() {
    let app = setup_test_app().await;
    let upstream = spawn_upstream().await;

    let response = app
        .client()
        .post("/")
        .multipart(url_form(&upstream.url("/image.png")))
        .await;

    assert_eq!(response.status_code(), 200);
    let links = download_links(&response.text());
    assert_eq!(links.len(), 2);
    assert_eq!(app.artifact_count(), 2);

    let cropped = app.client().get(&format!("/download/{}", links[1])).await;
    assert_eq!(decode_dimensions(cropped.as_bytes()), (12, 12));
}

#[tokio::test]
async fn test_upstream_error_shows_fetch_message() {
    let app = setup_test_app().await;
    let upstream = spawn_upstream().await;

    let response = app
        .client()
        .post("/")
        .multipart(url_form(&upstream.url("/broken")))
        .await;

    assert_eq!(response.status_code(), 200);
    let html = response.text();
    assert!(html.contains("Could not fetch the image"));
    assert!(html.contains("500"));
    assert!(download_links(&html).is_empty());
    assert_eq!(app.artifact_count(), 0);
}

#[tokio::test]
async fn test_non_image_url_shows_decode_message() {
    let app = setup_test_app().await;
    let upstream = spawn_upstream().await;

    let response = app
        .client()
        .post("/")
        .multipart(url_form(&upstream.url("/not-an-image")))
        .await;

    assert_eq!(response.status_code(), 200);
    assert!(response.text().contains("could not be read as an image"));
    assert_eq!(app.artifact_count(), 0);
}

#[tokio::test]
async fn test_small_image_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/")
        .multipart(upload_form(create_test_png(40, 40)))
        .await;

    assert_eq!(response.status_code(), 200);
    let html = response.text();
    assert!(html.contains("too small"));
    assert!(html.contains("40x40"));
    assert!(download_links(&html).is_empty());
    assert_eq!(app.artifact_count(), 0);
}

#[tokio::test]
async fn test_boundary_image_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/")
        .multipart(upload_form(create_test_png(52, 200)))
        .await;

    assert!(response.text().contains("too small"));
    assert_eq!(app.artifact_count(), 0);
}

#[tokio::test]
async fn test_missing_input_prompts_user() {
    let app = setup_test_app().await;

    let response = app.client().post("/").multipart(url_form("   ")).await;

    assert_eq!(response.status_code(), 200);
    assert!(response
        .text()
        .contains("Please upload an image or provide an image URL."));
    assert_eq!(app.artifact_count(), 0);
}

#[tokio::test]
async fn test_garbage_upload_shows_decode_message() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/")
        .multipart(upload_form(b"this is not a picture".to_vec()))
        .await;

    assert_eq!(response.status_code(), 200);
    assert!(response.text().contains("could not be read as an image"));
    assert_eq!(app.artifact_count(), 0);
}

#[tokio::test]
async fn test_upload_wins_over_url() {
    let app = setup_test_app().await;
    let upstream = spawn_upstream().await;

    let part = Part::bytes(bytes::Bytes::from(create_test_png(100, 100)))
        .file_name("image.png")
        .mime_type("image/png");
    let form = MultipartForm::new()
        .add_part("image", part)
        .add_text("image_url", upstream.url("/broken"));

    let response = app.client().post("/").multipart(form).await;

    let links = download_links(&response.text());
    assert_eq!(links.len(), 2);
    let cropped = app.client().get(&format!("/download/{}", links[1])).await;
    assert_eq!(decode_dimensions(cropped.as_bytes()), (48, 48));
}

#[tokio::test]
async fn test_post_without_form_prompts_user() {
    let app = setup_test_app().await;

    let response = app.client().post("/").await;

    assert_eq!(response.status_code(), 200);
    let html = response.text();
    assert!(html.contains("Please upload an image or provide an image URL."));
    assert!(html.contains(r#"name="image_url""#));
    assert_eq!(app.artifact_count(), 0);
}

#[tokio::test]
async fn test_urlencoded_post_prompts_user() {
    let app = setup_test_app().await;

    let response = app.client().post("/").form(&[("image_url", "")]).await;

    assert_eq!(response.status_code(), 200);
    assert!(response
        .text()
        .contains("Please upload an image or provide an image URL."));
    assert_eq!(app.artifact_count(), 0);
}

#[tokio::test]
async fn test_storage_failure_shows_generic_message() {
    let app = setup_test_app_with_store(FullDiskStore).await;

    let response = app
        .client()
        .post("/")
        .multipart(upload_form(create_test_png(100, 100)))
        .await;

    assert_eq!(response.status_code(), 500);
    let html = response.text();
    assert!(html.contains("could not be saved"));
    assert!(!html.contains("No space left"));
    assert!(download_links(&html).is_empty());
    assert_eq!(app.artifact_count(), 0);

    // The service keeps answering after the failure.
    assert_eq!(app.client().get("/").await.status_code(), 200);
    assert_eq!(app.client().get("/health").await.status_code(), 200);
}
