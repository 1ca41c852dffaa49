use serde::{Deserialize, Serialize};

/// A grid cell of the atlas, addressed by column and row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub col: u32,
    pub row: u32,
}

impl Slot {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
    /// Top-left pixel of this slot inside a flat atlas image.
    pub fn origin(&self, tile_size: u32) -> (u32, u32) {
        (self.col * tile_size, self.row * tile_size)
    }
    /// Row-major index of this slot (`row * tile_count + col`).
    pub fn index(&self, tile_count: u32) -> usize {
        (self.row as usize) * (tile_count as usize) + self.col as usize
    }
}

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

/// A texture name that was assigned a slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement {
    pub name: String,
    pub slot: Slot,
}

/// Normalised texture coordinates of a slot (0.0..=1.0 on both axes).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    /// Coordinates covering `slot` in a `tile_count x tile_count` grid.
    pub fn of_slot(slot: Slot, tile_count: u32) -> Self {
        let n = tile_count.max(1) as f32;
        Self {
            u0: slot.col as f32 / n,
            v0: slot.row as f32 / n,
            u1: (slot.col + 1) as f32 / n,
            v1: (slot.row + 1) as f32 / n,
        }
    }
}

/// Atlas-level metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    /// Schema version of the layout document; current: "1".
    pub schema_version: String,
    pub app: String,
    pub version: String,
    pub format: String,
    pub atlas_size: u32,
    pub tile_size: u32,
    pub tile_count: u32,
    /// Memory order of the raw buffer; the PNG export is always row-major.
    pub layout: String,
}

/// One placed tile in the exported layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileRecord {
    pub name: String,
    pub slot: Slot,
    /// Pixel rectangle of the slot within the flattened atlas image.
    pub frame: Rect,
    /// Whether the texture's pixels actually landed in the slot.
    pub loaded: bool,
}

/// Serializable view of every slot handed out so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasLayout {
    pub tiles: Vec<TileRecord>,
    pub meta: Meta,
}

impl AtlasLayout {
    /// Fraction of grid slots holding a loaded texture (0.0 to 1.0).
    pub fn occupancy(&self) -> f64 {
        let total = (self.meta.tile_count as u64) * (self.meta.tile_count as u64);
        if total == 0 {
            return 0.0;
        }
        let loaded = self.tiles.iter().filter(|t| t.loaded).count() as u64;
        loaded as f64 / total as f64
    }
}
