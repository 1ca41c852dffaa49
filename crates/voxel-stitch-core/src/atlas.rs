use crate::config::StitchConfig;
use crate::error::{Result, StitchError};
use crate::model::{Rect, Slot};
use crate::pixels::TexturePixels;
use image::RgbaImage;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const CHANNELS: usize = 4;

/// Tile-major RGBA pixel store: `[row][col][y][x][channel]`.
///
/// Each tile occupies one contiguous byte range, so a tile can be borrowed for writing
/// on its own through [`AtlasBuffer::tile_mut`]. The buffer is never resized.
pub struct AtlasBuffer {
    tile_size: u32,
    tile_count: u32,
    data: Vec<u8>,
}

impl AtlasBuffer {
    /// Allocate a buffer for `cfg`, every byte set from `cfg.background`.
    pub fn new(cfg: &StitchConfig) -> Result<Self> {
        cfg.validate()?;
        let tile_size = cfg.tile_size;
        let tile_count = cfg.tile_count();
        let pixels = (cfg.atlas_size as usize) * (cfg.atlas_size as usize);
        let mut data = Vec::with_capacity(pixels * CHANNELS);
        for _ in 0..pixels {
            data.extend_from_slice(&cfg.background);
        }
        Ok(Self {
            tile_size,
            tile_count,
            data,
        })
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn tile_count(&self) -> u32 {
        self.tile_count
    }

    /// Atlas edge in pixels.
    pub fn atlas_size(&self) -> u32 {
        self.tile_size * self.tile_count
    }

    /// Dimensions in index order: (rows, cols, tile height, tile width, channels).
    pub fn shape(&self) -> [usize; 5] {
        let tc = self.tile_count as usize;
        let ts = self.tile_size as usize;
        [tc, tc, ts, ts, CHANNELS]
    }

    /// Byte at grid `row`/`col`, tile pixel `y`/`x`, channel `c`. Panics when out of range.
    pub fn get(&self, row: u32, col: u32, y: u32, x: u32, c: u32) -> u8 {
        assert!(
            row < self.tile_count && col < self.tile_count,
            "tile ({col}, {row}) outside {0}x{0} grid",
            self.tile_count
        );
        assert!(
            y < self.tile_size && x < self.tile_size && (c as usize) < CHANNELS,
            "pixel ({y}, {x}, {c}) outside {0}x{0} tile",
            self.tile_size
        );
        let ts = self.tile_size as usize;
        let tile = (row as usize) * (self.tile_count as usize) + col as usize;
        let idx = ((tile * ts + y as usize) * ts + x as usize) * CHANNELS + c as usize;
        self.data[idx]
    }

    /// Exclusive write access to one slot's pixels.
    pub fn tile_mut(&mut self, slot: Slot) -> Result<TileMut<'_>> {
        if slot.col >= self.tile_count || slot.row >= self.tile_count {
            return Err(StitchError::SlotOutOfRange {
                col: slot.col,
                row: slot.row,
                tile_count: self.tile_count,
            });
        }
        let len = self.tile_bytes();
        let start = slot.index(self.tile_count) * len;
        Ok(TileMut {
            slot,
            tile_size: self.tile_size,
            bytes: &mut self.data[start..start + len],
        })
    }

    /// Raw tile-major bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Flatten into a conventional row-major RGBA image of `atlas_size x atlas_size`.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let size = self.atlas_size();
        let row_bytes = (size as usize) * CHANNELS;
        let mut out = vec![0u8; row_bytes * size as usize];

        #[cfg(feature = "parallel")]
        out.par_chunks_mut(row_bytes)
            .enumerate()
            .for_each(|(py, dst)| self.fill_image_row(py, dst));
        #[cfg(not(feature = "parallel"))]
        out.chunks_mut(row_bytes)
            .enumerate()
            .for_each(|(py, dst)| self.fill_image_row(py, dst));

        // Length is exactly size * size * 4 by construction.
        RgbaImage::from_raw(size, size, out).unwrap_or_else(|| RgbaImage::new(size, size))
    }

    fn fill_image_row(&self, py: usize, dst: &mut [u8]) {
        let ts = self.tile_size as usize;
        let tc = self.tile_count as usize;
        let (row, y) = (py / ts, py % ts);
        let span = ts * CHANNELS;
        for col in 0..tc {
            let tile = row * tc + col;
            let src = (tile * ts + y) * span;
            dst[col * span..(col + 1) * span].copy_from_slice(&self.data[src..src + span]);
        }
    }

    fn tile_bytes(&self) -> usize {
        (self.tile_size as usize) * (self.tile_size as usize) * CHANNELS
    }
}

/// Mutable view of a single tile. Writes cannot reach any other slot.
pub struct TileMut<'a> {
    slot: Slot,
    tile_size: u32,
    bytes: &'a mut [u8],
}

impl TileMut<'_> {
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Copy `pixels` to the tile origin, channel by channel.
    ///
    /// Sources with fewer than four channels leave the remaining channels untouched.
    /// Nothing is written when the source exceeds the tile; the error names `name`.
    /// Returns the touched rectangle in flattened-atlas pixel coordinates.
    pub fn copy_from(&mut self, name: &str, pixels: &TexturePixels) -> Result<Rect> {
        let (h, w, channels) = pixels.shape();
        if h > self.tile_size || w > self.tile_size || channels as usize > CHANNELS {
            return Err(StitchError::TileTooLarge {
                name: name.to_string(),
                width: w,
                height: h,
                channels,
                tile_size: self.tile_size,
            });
        }
        let ts = self.tile_size as usize;
        for y in 0..h {
            for x in 0..w {
                let base = ((y as usize) * ts + x as usize) * CHANNELS;
                for c in 0..channels {
                    self.bytes[base + c as usize] = pixels.get(y, x, c);
                }
            }
        }
        let (ox, oy) = self.slot.origin(self.tile_size);
        Ok(Rect::new(ox, oy, w, h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> AtlasBuffer {
        let cfg = StitchConfig::builder()
            .atlas_size(8)
            .tile_size(4)
            .background([1, 2, 3, 4])
            .build();
        AtlasBuffer::new(&cfg).unwrap()
    }

    #[test]
    fn new_buffer_is_background_filled() {
        let atlas = small();
        assert_eq!(atlas.shape(), [2, 2, 4, 4, 4]);
        assert_eq!(atlas.get(1, 1, 3, 3, 0), 1);
        assert_eq!(atlas.get(0, 1, 2, 0, 3), 4);
    }

    #[test]
    fn rejects_slot_outside_grid() {
        let mut atlas = small();
        assert!(matches!(
            atlas.tile_mut(Slot::new(2, 0)),
            Err(StitchError::SlotOutOfRange { col: 2, row: 0, tile_count: 2 })
        ));
        assert!(matches!(
            atlas.tile_mut(Slot::new(0, 2)),
            Err(StitchError::SlotOutOfRange { col: 0, row: 2, .. })
        ));
    }

    #[test]
    fn oversized_source_writes_nothing() {
        let mut atlas = small();
        let big = TexturePixels::solid(5, 4, [9, 9, 9, 9]);
        let err = atlas.tile_mut(Slot::new(0, 0)).unwrap().copy_from("big", &big);
        assert!(matches!(err, Err(StitchError::TileTooLarge { width: 5, .. })));
        assert!(atlas.as_bytes().chunks(4).all(|px| px == [1, 2, 3, 4]));
    }

    #[test]
    fn flattened_image_places_tile_at_origin() {
        let mut atlas = small();
        let red = TexturePixels::solid(4, 4, [255, 0, 0, 255]);
        let rect = atlas
            .tile_mut(Slot::new(1, 0))
            .unwrap()
            .copy_from("red", &red)
            .unwrap();
        assert_eq!(rect, Rect::new(4, 0, 4, 4));
        let img = atlas.to_rgba_image();
        assert_eq!(img.dimensions(), (8, 8));
        assert_eq!(img.get_pixel(4, 0).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(7, 3).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(3, 0).0, [1, 2, 3, 4]);
        assert_eq!(img.get_pixel(4, 4).0, [1, 2, 3, 4]);
    }
}
