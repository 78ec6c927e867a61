//! Domain models shared by storage, processing and the HTTP layer.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// File extension of every artifact written by the pipeline.
pub const ARTIFACT_EXTENSION: &str = "png";

/// What an artifact holds: the image as received, or its cropped derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Original,
    Cropped,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Original => "original",
            ArtifactKind::Cropped => "cropped",
        }
    }
}

impl FromStr for ArtifactKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "original" => Ok(ArtifactKind::Original),
            "cropped" => Ok(ArtifactKind::Cropped),
            _ => Err(anyhow::anyhow!("Invalid artifact kind: {}", s)),
        }
    }
}

impl Display for ArtifactKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid artifact name: {0}")]
pub struct InvalidArtifactName(pub String);

/// Name of a stored artifact.
///
/// Artifacts live in a flat namespace, so a valid name is a single path
/// component: ASCII letters, digits, `_`, `-` and `.`, never starting with
/// `.` and never containing `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactName(String);

impl ArtifactName {
    const MAX_LEN: usize = 255;

    /// Build the name for a freshly generated token, e.g.
    /// `3f2a..._cropped.png`.
    pub fn generate(token: &str, kind: ArtifactKind) -> Result<Self, InvalidArtifactName> {
        Self::parse(&format!("{}_{}.{}", token, kind, ARTIFACT_EXTENSION))
    }

    pub fn parse(raw: &str) -> Result<Self, InvalidArtifactName> {
        let valid = !raw.is_empty()
            && raw.len() <= Self::MAX_LEN
            && !raw.starts_with('.')
            && !raw.contains("..")
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

        if valid {
            Ok(ArtifactName(raw.to_string()))
        } else {
            Err(InvalidArtifactName(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Kind encoded in the name (`{token}_{kind}.{ext}`), if any.
    pub fn kind(&self) -> Option<ArtifactKind> {
        let stem = self.0.rsplit_once('.').map_or(self.0.as_str(), |(s, _)| s);
        let (_, suffix) = stem.rsplit_once('_')?;
        suffix.parse().ok()
    }

    pub fn extension(&self) -> Option<&str> {
        self.0.rsplit_once('.').map(|(_, ext)| ext)
    }
}

impl Display for ArtifactName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArtifactName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ArtifactName {
    type Error = InvalidArtifactName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ArtifactName::parse(&value)
    }
}

impl From<ArtifactName> for String {
    fn from(name: ArtifactName) -> Self {
        name.0
    }
}

/// Pixels removed from each edge by the crop transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropMargins {
    pub x: u32,
    pub y: u32,
}

impl CropMargins {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Smallest width an image must strictly exceed to be cropped.
    pub fn min_width(&self) -> u32 {
        self.x.saturating_mul(2)
    }

    /// Smallest height an image must strictly exceed to be cropped.
    pub fn min_height(&self) -> u32 {
        self.y.saturating_mul(2)
    }
}

impl Default for CropMargins {
    fn default() -> Self {
        Self::new(26, 26)
    }
}
