use thiserror::Error;

#[derive(Debug, Error)]
pub enum StitchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid atlas dimensions: atlas {atlas_size}px, tile {tile_size}px")]
    InvalidDimensions { atlas_size: u32, tile_size: u32 },
    #[error("Texture sheet full: {tile_count}x{tile_count} exceeded")]
    GridExhausted { tile_count: u32 },
    #[error("Slot ({col}, {row}) outside {tile_count}x{tile_count} grid")]
    SlotOutOfRange { col: u32, row: u32, tile_count: u32 },
    #[error("Texture not found in any pack: {0}")]
    TextureNotFound(String),
    #[error("Failed to load texture {name}: {reason}")]
    ImageFetch { name: String, reason: String },
    #[error("Timed out after {timeout_ms}ms loading texture {name}")]
    FetchTimeout { name: String, timeout_ms: u64 },
    #[error(
        "Texture {name} ({width}x{height}x{channels}) does not fit a {tile_size}x{tile_size} RGBA tile"
    )]
    TileTooLarge {
        name: String,
        width: u32,
        height: u32,
        channels: u32,
        tile_size: u32,
    },
}

pub type Result<T> = std::result::Result<T, StitchError>;
