//! Core library for stitching block textures into a fixed-grid atlas.
//!
//! - Allocator: hands out `tile_size` slots of an `atlas_size` square in row-major order
//! - Builder: `stitch` allocates a slot per texture name, loads every texture concurrently
//!   from an [`ImageSource`] and copies each into its slot, emitting progress events
//! - Sources: resource packs (directories or zips) and in-memory tables
//!
//! Quick example:
//! ```ignore
//! use voxel_stitch_core::prelude::*;
//! # async fn run() -> voxel_stitch_core::Result<()> {
//! let cfg = StitchConfig::builder().image_pack("packs/ProgrammerArt").build();
//! let source = PackImageSource::new(cfg.image_packs.clone());
//! let mut builder = AtlasBuilder::new(cfg, source)?;
//! let report = builder.stitch(["stone", "dirt", "grass_top"]).await?;
//! println!("loaded {}/{}", report.loaded, report.requested);
//! let png = builder.atlas().to_rgba_image();
//! # Ok(()) }
//! ```

pub mod allocator;
pub mod atlas;
pub mod builder;
pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod model;
pub mod pixels;
pub mod registry;
pub mod session;
pub mod source;

pub use allocator::*;
pub use atlas::*;
pub use builder::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use export::*;
pub use model::*;
pub use pixels::*;
pub use registry::*;
pub use session::*;
pub use source::*;

/// Convenience prelude for common types and functions.
/// Importing `voxel_stitch_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::allocator::SlotAllocator;
    pub use crate::atlas::{AtlasBuffer, TileMut};
    pub use crate::builder::{AtlasBuilder, FailedTexture, StitchReport};
    pub use crate::config::{CompletionPolicy, StitchConfig, StitchConfigBuilder};
    pub use crate::error::{Result, StitchError};
    pub use crate::events::{EventDispatcher, StitchEvent};
    pub use crate::model::{AtlasLayout, Placement, Rect, Slot, UvRect};
    pub use crate::pixels::TexturePixels;
    pub use crate::registry::{
        BlockEntry, BlockRegistry, Registry, TextureProperty, flatten_texture_names,
    };
    pub use crate::source::{ImageSource, MemoryImageSource, PackImageSource};
}
