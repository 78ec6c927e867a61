//! Resolve, crop and encode a submission in one call.

use crate::crop::crop_margins;
use crate::encode::encode_png;
use crate::error::ProcessingError;
use crate::source::{ImageInput, ImageSourceResolver};
use bytes::Bytes;
use cropper_core::CropMargins;
use std::time::Instant;

/// Encoded images ready to be stored.
#[derive(Debug, Clone)]
pub struct CropOutput {
    pub original: Bytes,
    pub cropped: Bytes,
    pub original_dimensions: (u32, u32),
    pub cropped_dimensions: (u32, u32),
}

/// Runs a submission through resolve, crop and encode.
///
/// Nothing is written anywhere; the caller stores the output.
#[derive(Clone)]
pub struct CropPipeline {
    resolver: ImageSourceResolver,
    margins: CropMargins,
}

impl CropPipeline {
    pub fn new(resolver: ImageSourceResolver, margins: CropMargins) -> Self {
        CropPipeline { resolver, margins }
    }

    pub async fn run(&self, input: ImageInput) -> Result<CropOutput, ProcessingError> {
        let source = self.resolver.resolve(input).await?;
        let margins = self.margins;

        tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            let derived = crop_margins(&source, margins)?;

            let output = CropOutput {
                original: encode_png(source.image())?,
                cropped: encode_png(derived.image())?,
                original_dimensions: source.dimensions(),
                cropped_dimensions: derived.dimensions(),
            };

            tracing::debug!(
                width = output.cropped_dimensions.0,
                height = output.cropped_dimensions.1,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Cropped and encoded image"
            );

            Ok::<_, ProcessingError>(output)
        })
        .await?
    }
}
