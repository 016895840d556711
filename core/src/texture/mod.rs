//! CPU-side palette textures.
//!
//! Every mesh samples its colors from a small RGBA8 palette indexed by the
//! vertex texcoord U. Palettes are loaded from PNG next to the mesh asset, or
//! generated for headless runs.

use std::fmt;
#[cfg(feature = "palette-io")]
use std::path::Path;

/// Bytes per RGBA8 texel.
pub const BYTES_PER_TEXEL: usize = 4;

/// Errors from palette loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteError {
    /// The file could not be read.
    Io(String),
    /// The file is not a decodable image.
    Decode(String),
    /// The image has a zero dimension.
    Empty,
}

impl fmt::Display for PaletteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "palette read failed: {msg}"),
            Self::Decode(msg) => write!(f, "palette decode failed: {msg}"),
            Self::Empty => write!(f, "palette has no texels"),
        }
    }
}

impl std::error::Error for PaletteError {}

/// RGBA8 pixel data held in CPU memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuTexture {
    pub width: u32,
    pub height: u32,
    /// Row-major, tightly packed RGBA8.
    pub data: Vec<u8>,
}

impl CpuTexture {
    /// Wrap raw RGBA8 data.
    ///
    /// Returns [`PaletteError::Empty`] for a zero dimension and
    /// [`PaletteError::Decode`] when `data` does not match the extent.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, PaletteError> {
        if width == 0 || height == 0 {
            return Err(PaletteError::Empty);
        }
        let expected = width as usize * height as usize * BYTES_PER_TEXEL;
        if data.len() != expected {
            return Err(PaletteError::Decode(format!(
                "expected {expected} bytes for {width}x{height}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a one-row palette with one texel per color.
    pub fn from_colors(colors: &[[u8; 4]]) -> Result<Self, PaletteError> {
        let data = colors.iter().flatten().copied().collect();
        Self::new(colors.len() as u32, 1, data)
    }

    /// Bytes per row.
    pub fn bytes_per_row(&self) -> u32 {
        self.width * BYTES_PER_TEXEL as u32
    }

    /// Texcoord U that samples the centre of palette column `column`.
    pub fn texcoord_for(&self, column: u32) -> f32 {
        (column as f32 + 0.5) / self.width as f32
    }
}

/// Load an RGBA8 palette from an image file.
#[cfg(feature = "palette-io")]
pub fn load_palette(path: impl AsRef<Path>) -> Result<CpuTexture, PaletteError> {
    let path = path.as_ref();
    let image = image::open(path).map_err(|e| match e {
        image::ImageError::IoError(io) => PaletteError::Io(format!("{}: {io}", path.display())),
        other => PaletteError::Decode(format!("{}: {other}", path.display())),
    })?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::debug!("Loaded palette {} ({width}x{height})", path.display());
    CpuTexture::new(width, height, rgba.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_colors() {
        let palette = CpuTexture::from_colors(&[[255, 0, 0, 255], [0, 255, 0, 255]]).unwrap();
        assert_eq!(palette.width, 2);
        assert_eq!(palette.height, 1);
        assert_eq!(palette.bytes_per_row(), 8);
        assert_eq!(&palette.data[4..8], &[0, 255, 0, 255]);
        assert_eq!(palette.texcoord_for(1), 0.75);
    }

    #[test]
    fn test_rejects_bad_extent() {
        assert_eq!(CpuTexture::from_colors(&[]), Err(PaletteError::Empty));
        assert!(matches!(
            CpuTexture::new(2, 2, vec![0; 4]),
            Err(PaletteError::Decode(_))
        ));
    }

    #[cfg(feature = "palette-io")]
    #[test]
    fn test_load_missing_file() {
        let err = load_palette("definitely/not/here.png").unwrap_err();
        assert!(matches!(err, PaletteError::Io(_)));
    }
}
