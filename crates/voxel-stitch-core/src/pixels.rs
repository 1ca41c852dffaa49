use crate::error::{Result, StitchError};
use image::{DynamicImage, RgbaImage};

/// Decoded texture pixels, row-major with interleaved channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexturePixels {
    width: u32,
    height: u32,
    channels: u32,
    data: Vec<u8>,
}

impl TexturePixels {
    /// Wraps raw interleaved bytes. `data.len()` must equal `width * height * channels`.
    pub fn from_raw(width: u32, height: u32, channels: u32, data: Vec<u8>) -> Result<Self> {
        let expected = (width as usize) * (height as usize) * (channels as usize);
        if channels == 0 || data.len() != expected {
            return Err(StitchError::InvalidConfig(format!(
                "pixel buffer of {} bytes does not match {}x{}x{}",
                data.len(),
                width,
                height,
                channels
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn from_rgba(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            channels: 4,
            data: image.into_raw(),
        }
    }

    /// Converts any decoded image to RGBA8.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self::from_rgba(image.to_rgba8())
    }

    /// A `width x height` RGBA texture filled with one colour.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::from_rgba(RgbaImage::from_pixel(width, height, image::Rgba(rgba)))
    }

    /// Extent along (height, width, channels).
    pub fn shape(&self) -> (u32, u32, u32) {
        (self.height, self.width, self.channels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Byte at row `y`, column `x`, channel `c`. Panics when out of range.
    pub fn get(&self, y: u32, x: u32, c: u32) -> u8 {
        assert!(
            y < self.height && x < self.width && c < self.channels,
            "pixel ({y}, {x}, {c}) outside {}x{}x{}",
            self.height,
            self.width,
            self.channels
        );
        self.data[self.offset(y, x, c)]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, y: u32, x: u32, c: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * (self.channels as usize) + c as usize
    }
}
