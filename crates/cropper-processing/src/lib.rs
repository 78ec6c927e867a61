//! Cropper Processing Library
//!
//! Turns a form submission into image bytes ready for storage:
//! - resolving the input (uploaded file or remote URL) into a decoded image (source)
//! - removing a fixed margin from every edge (crop)
//! - encoding images for storage (encode)
//! - chaining the three off the async workers (pipeline)

pub mod crop;
pub mod encode;
pub mod error;
pub mod pipeline;
pub mod source;

pub use crop::{crop_margins, DerivedImage};
pub use encode::encode_png;
pub use error::ProcessingError;
pub use pipeline::{CropOutput, CropPipeline};
pub use source::{ImageInput, ImageSourceResolver, SourceImage};
