//! Image source resolution
//!
//! A submission carries an uploaded file, an image URL, or neither. The
//! resolver turns it into a decoded [`SourceImage`], fetching remote images
//! with a bounded timeout and body size.

use crate::error::ProcessingError;
use bytes::{Bytes, BytesMut};
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;
use std::time::{Duration, Instant};

/// Where the image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    Upload(Bytes),
    Url(String),
}

impl ImageInput {
    /// Pick the input from the raw form fields.
    ///
    /// An empty file part and a blank URL count as absent. When both are
    /// present the upload is used.
    pub fn from_form(upload: Option<Bytes>, url: Option<&str>) -> Result<Self, ProcessingError> {
        if let Some(data) = upload.filter(|data| !data.is_empty()) {
            return Ok(ImageInput::Upload(data));
        }

        match url.map(str::trim).filter(|url| !url.is_empty()) {
            Some(url) => Ok(ImageInput::Url(url.to_string())),
            None => Err(ProcessingError::MissingInput),
        }
    }
}

/// A decoded input image, owned by the request that produced it.
#[derive(Debug, Clone)]
pub struct SourceImage {
    image: DynamicImage,
}

impl SourceImage {
    pub fn new(image: DynamicImage) -> Self {
        SourceImage { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Decode raw bytes, guessing the format from their content.
    ///
    /// CPU-bound; call from the blocking pool.
    pub fn decode(data: &[u8]) -> Result<Self, ProcessingError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;

        if reader.format().is_none() {
            return Err(ProcessingError::Decode("unrecognized image format".to_string()));
        }

        let image = reader
            .decode()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;

        Ok(SourceImage { image })
    }
}

/// Resolves an [`ImageInput`] into a decoded [`SourceImage`].
#[derive(Clone)]
pub struct ImageSourceResolver {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl ImageSourceResolver {
    pub fn new(fetch_timeout: Duration, max_body_bytes: usize) -> Result<Self, ProcessingError> {
        let client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .map_err(|e| ProcessingError::Task(format!("Failed to create HTTP client: {}", e)))?;

        Ok(ImageSourceResolver {
            client,
            max_body_bytes,
        })
    }

    pub async fn resolve(&self, input: ImageInput) -> Result<SourceImage, ProcessingError> {
        let data = match input {
            ImageInput::Upload(data) => data,
            ImageInput::Url(url) => self.fetch(&url).await?,
        };

        let start = Instant::now();
        let size_bytes = data.len();
        let source = tokio::task::spawn_blocking(move || SourceImage::decode(&data)).await??;

        tracing::debug!(
            size_bytes,
            width = source.width(),
            height = source.height(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Decoded source image"
        );

        Ok(source)
    }

    /// Download the body behind `url`, failing on non-2xx status, timeout,
    /// or a body larger than the configured cap.
    #[tracing::instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<Bytes, ProcessingError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|_| ProcessingError::Fetch(format!("Invalid URL: {}", url)))?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ProcessingError::Fetch(
                "Only HTTP and HTTPS URLs are allowed".to_string(),
            ));
        }

        let start = Instant::now();
        let mut response = self.client.get(parsed).send().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to download from URL");
            if e.is_timeout() {
                ProcessingError::Fetch("The request timed out".to_string())
            } else {
                ProcessingError::Fetch(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "URL returned an error status");
            return Err(ProcessingError::Fetch(format!(
                "URL returned status code: {}",
                status
            )));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_body_bytes as u64 {
                return Err(self.too_large());
            }
        }

        let mut body = BytesMut::new();
        loop {
            let chunk = response.chunk().await.map_err(|e| {
                if e.is_timeout() {
                    ProcessingError::Fetch("The request timed out".to_string())
                } else {
                    ProcessingError::Fetch(format!("Failed to read response body: {}", e))
                }
            })?;

            let Some(chunk) = chunk else { break };
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(self.too_large());
            }
            body.extend_from_slice(&chunk);
        }

        tracing::info!(
            size_bytes = body.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Fetched remote image"
        );

        Ok(body.freeze())
    }

    fn too_large(&self) -> ProcessingError {
        ProcessingError::Fetch(format!(
            "Image exceeds the maximum size of {} bytes",
            self.max_body_bytes
        ))
    }
}
