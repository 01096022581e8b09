//! Stateless bounds checks for uploaded listing photos

use image::ImageReader;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

/// Container formats the decoder may not recognise; their dimensions are not checked
const UNDECODED_EXTENSIONS: [&str; 1] = ["heic"];

/// Size, format and dimension limits for uploads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageLimits {
    pub min_bytes: usize,
    pub max_bytes: usize,
    /// Lower-case extensions without the leading dot
    pub allowed_extensions: Vec<String>,
    pub min_dimension: u32,
    pub max_dimension: u32,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            min_bytes: 1024,
            max_bytes: 10 * 1024 * 1024,
            allowed_extensions: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "heic".to_string(),
            ],
            min_dimension: 100,
            max_dimension: 4096,
        }
    }
}

/// Why an image was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageError {
    #[error("Image is too small ({size} bytes); minimum is {min} bytes")]
    TooSmall { size: usize, min: usize },
    #[error("Image is too large ({size} bytes); maximum is {max} bytes")]
    TooLarge { size: usize, max: usize },
    #[error("Unsupported file type '{extension}'; allowed: {allowed}")]
    UnsupportedExtension { extension: String, allowed: String },
    #[error("Image dimensions {width}x{height} are outside the allowed range {min}-{max} pixels")]
    DimensionsOutOfRange {
        width: u32,
        height: u32,
        min: u32,
        max: u32,
    },
    #[error("invalid image")]
    Invalid,
}

/// Facts established about an accepted image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub size: usize,
    pub extension: Option<String>,
    /// Pixel dimensions, when the format could be decoded
    pub dimensions: Option<(u32, u32)>,
}

/// Validates raw upload bytes against `ImageLimits`
#[derive(Debug, Clone, Default)]
pub struct ImageValidator {
    limits: ImageLimits,
}

impl ImageValidator {
    pub fn new(limits: ImageLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ImageLimits {
        &self.limits
    }

    /// Check byte size, extension (if a filename is given) and pixel dimensions
    pub fn validate(&self, bytes: &[u8], filename: Option<&str>) -> Result<ImageInfo, ImageError> {
        let size = bytes.len();
        if size < self.limits.min_bytes {
            return Err(ImageError::TooSmall {
                size,
                min: self.limits.min_bytes,
            });
        }
        if size > self.limits.max_bytes {
            return Err(ImageError::TooLarge {
                size,
                max: self.limits.max_bytes,
            });
        }

        let extension = match filename {
            Some(name) => Some(self.check_extension(name)?),
            None => None,
        };

        let dimensions = match read_dimensions(bytes) {
            Ok(dimensions) => Some(dimensions),
            Err(DecodeFailure::UnknownFormat)
                if extension
                    .as_deref()
                    .is_some_and(|ext| UNDECODED_EXTENSIONS.contains(&ext)) =>
            {
                tracing::debug!(extension = ?extension, "Skipping dimension check for undecodable container");
                None
            }
            Err(_) => return Err(ImageError::Invalid),
        };

        if let Some((width, height)) = dimensions {
            let range = self.limits.min_dimension..=self.limits.max_dimension;
            if !range.contains(&width) || !range.contains(&height) {
                return Err(ImageError::DimensionsOutOfRange {
                    width,
                    height,
                    min: self.limits.min_dimension,
                    max: self.limits.max_dimension,
                });
            }
        }

        Ok(ImageInfo {
            size,
            extension,
            dimensions,
        })
    }

    fn check_extension(&self, filename: &str) -> Result<String, ImageError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        if self.limits.allowed_extensions.iter().any(|a| a.eq_ignore_ascii_case(&extension)) {
            Ok(extension)
        } else {
            Err(ImageError::UnsupportedExtension {
                extension,
                allowed: self.limits.allowed_extensions.join(", "),
            })
        }
    }
}

enum DecodeFailure {
    UnknownFormat,
    Corrupt,
}

/// Reads only the image header to get its dimensions
fn read_dimensions(bytes: &[u8]) -> Result<(u32, u32), DecodeFailure> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|_| DecodeFailure::Corrupt)?;

    if reader.format().is_none() {
        return Err(DecodeFailure::UnknownFormat);
    }

    reader.into_dimensions().map_err(|_| DecodeFailure::Corrupt)
}
