//! Artifact name generation and content-type inference.

use cropper_core::{ArtifactKind, ArtifactName, InvalidArtifactName};
use uuid::Uuid;

/// Generate a fresh artifact name for the given kind.
///
/// The token is a random UUIDv4 in simple (32 hex chars) form, so names drawn
/// concurrently practically never collide. Publishing still refuses to
/// overwrite an existing file; see `LocalStorage::put_batch`.
pub fn generate_name(kind: ArtifactKind) -> Result<ArtifactName, InvalidArtifactName> {
    let token = Uuid::new_v4().simple().to_string();
    ArtifactName::generate(&token, kind)
}

/// MIME type inferred from an artifact's extension.
pub fn content_type_for(name: &ArtifactName) -> &'static str {
    match name.extension().map(|ext| ext.to_ascii_lowercase()).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}
