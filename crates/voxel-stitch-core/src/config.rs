use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// When a stitch counts as complete.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Only successful copies count. A single failed fetch means `AllAdded` never fires
    /// for that stitch.
    LoadedOnly,
    /// Successful and failed fetches both count; `AllAdded` fires once every fetch settled.
    Settled,
}

impl FromStr for CompletionPolicy {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "loaded_only" | "loaded-only" | "loaded" => Ok(Self::LoadedOnly),
            "settled" => Ok(Self::Settled),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StitchConfig {
    /// Pixels per atlas edge.
    #[serde(default = "default_atlas_size")]
    pub atlas_size: u32,
    /// Pixels per tile edge. Must divide `atlas_size`.
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    /// Resource packs handed to the image source, highest priority first.
    #[serde(default)]
    pub image_packs: Vec<PathBuf>,
    #[serde(default = "default_completion")]
    pub completion: CompletionPolicy,
    /// Per-texture fetch timeout (milliseconds). None or 0 disables.
    #[serde(default)]
    pub fetch_timeout_ms: Option<u64>,
    /// Initial value of every atlas byte (RGBA), visible in unfilled slots.
    #[serde(default = "default_background")]
    pub background: [u8; 4],
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            atlas_size: default_atlas_size(),
            tile_size: default_tile_size(),
            image_packs: Vec::new(),
            completion: default_completion(),
            fetch_timeout_ms: None,
            background: default_background(),
        }
    }
}

impl StitchConfig {
    /// Validates the atlas geometry.
    ///
    /// Returns an error if either size is zero, the tile is larger than the atlas,
    /// or the atlas edge is not a whole number of tiles.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::StitchError;

        if self.atlas_size == 0 || self.tile_size == 0 || self.tile_size > self.atlas_size {
            return Err(StitchError::InvalidDimensions {
                atlas_size: self.atlas_size,
                tile_size: self.tile_size,
            });
        }

        if self.atlas_size % self.tile_size != 0 {
            return Err(StitchError::InvalidConfig(format!(
                "atlas_size ({}) is not a multiple of tile_size ({})",
                self.atlas_size, self.tile_size
            )));
        }

        Ok(())
    }

    /// Tiles per atlas edge.
    pub fn tile_count(&self) -> u32 {
        self.atlas_size / self.tile_size
    }

    /// Total number of slots in the grid.
    pub fn capacity(&self) -> u32 {
        self.tile_count() * self.tile_count()
    }

    /// Effective fetch timeout; `Some(0)` is treated as disabled.
    pub fn fetch_timeout(&self) -> Option<std::time::Duration> {
        self.fetch_timeout_ms
            .filter(|ms| *ms > 0)
            .map(std::time::Duration::from_millis)
    }
}

fn default_atlas_size() -> u32 {
    256
}
fn default_tile_size() -> u32 {
    16
}
fn default_completion() -> CompletionPolicy {
    CompletionPolicy::Settled
}
fn default_background() -> [u8; 4] {
    [80, 80, 80, 80]
}

/// Builder for `StitchConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct StitchConfigBuilder {
    cfg: StitchConfig,
}

impl StitchConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: StitchConfig::default(),
        }
    }
    pub fn atlas_size(mut self, v: u32) -> Self {
        self.cfg.atlas_size = v;
        self
    }
    pub fn tile_size(mut self, v: u32) -> Self {
        self.cfg.tile_size = v;
        self
    }
    pub fn image_pack(mut self, v: impl Into<PathBuf>) -> Self {
        self.cfg.image_packs.push(v.into());
        self
    }
    pub fn image_packs(mut self, v: Vec<PathBuf>) -> Self {
        self.cfg.image_packs = v;
        self
    }
    pub fn completion(mut self, v: CompletionPolicy) -> Self {
        self.cfg.completion = v;
        self
    }
    pub fn fetch_timeout_ms(mut self, v: Option<u64>) -> Self {
        self.cfg.fetch_timeout_ms = v;
        self
    }
    pub fn background(mut self, v: [u8; 4]) -> Self {
        self.cfg.background = v;
        self
    }
    pub fn build(self) -> StitchConfig {
        self.cfg
    }
}

impl StitchConfig {
    /// Create a fluent builder for `StitchConfig`.
    pub fn builder() -> StitchConfigBuilder {
        StitchConfigBuilder::new()
    }
}
