use crate::allocator::SlotAllocator;
use crate::atlas::AtlasBuffer;
use crate::config::StitchConfig;
use crate::error::{Result, StitchError};
use crate::events::{EventDispatcher, StitchEvent};
use crate::model::{AtlasLayout, Meta, Placement, Rect, Slot, TileRecord, UvRect};
use crate::pixels::TexturePixels;
use crate::registry::{Registry, TEXTURE_PROPERTY, flatten_texture_names};
use crate::session::LoadSession;
use crate::source::ImageSource;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, warn};

/// A texture whose slot was allocated but whose pixels never landed.
#[derive(Debug)]
pub struct FailedTexture {
    pub name: String,
    pub slot: Slot,
    pub error: StitchError,
}

/// Outcome of one [`AtlasBuilder::stitch`] call.
#[derive(Debug)]
pub struct StitchReport {
    pub requested: usize,
    pub loaded: usize,
    pub failed: Vec<FailedTexture>,
    /// Slot assignments of this stitch, in request order.
    pub placements: Vec<Placement>,
    /// Whether `AllAdded` was emitted for this stitch.
    pub complete: bool,
}

impl StitchReport {
    /// True when every requested texture landed.
    pub fn all_loaded(&self) -> bool {
        self.requested > 0 && self.loaded == self.requested
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.name.as_str()).collect()
    }
}

#[derive(Debug, Clone)]
struct PlacedTile {
    placement: Placement,
    loaded: bool,
}

/// Packs named textures into a fixed grid atlas.
///
/// The pixel buffer and the slot cursor live as long as the builder; every `stitch`
/// continues where the previous one stopped and never touches earlier tiles.
pub struct AtlasBuilder<S: ImageSource> {
    cfg: StitchConfig,
    atlas: AtlasBuffer,
    allocator: SlotAllocator,
    source: Arc<S>,
    events: EventDispatcher,
    tiles: Vec<PlacedTile>,
}

impl<S: ImageSource> AtlasBuilder<S> {
    pub fn new(cfg: StitchConfig, source: S) -> Result<Self> {
        Self::with_shared_source(cfg, Arc::new(source))
    }

    pub fn with_shared_source(cfg: StitchConfig, source: Arc<S>) -> Result<Self> {
        let atlas = AtlasBuffer::new(&cfg)?;
        let allocator = SlotAllocator::new(cfg.tile_count());
        Ok(Self {
            cfg,
            atlas,
            allocator,
            source,
            events: EventDispatcher::new(),
            tiles: Vec::new(),
        })
    }

    /// Receive `Added`, `LoadFailed` and `AllAdded` events from now on.
    pub fn subscribe(&mut self) -> UnboundedReceiver<StitchEvent> {
        self.events.subscribe()
    }

    /// Allocates one slot per name (in order), then loads all textures concurrently and
    /// copies each into its slot as it arrives.
    ///
    /// Notes:
    /// - Every slot is allocated before any fetch starts. On `GridExhausted` the names
    ///   that already got a slot are still fetched and copied, the rest are dropped, and
    ///   the error is returned once those fetches settle. `AllAdded` is not emitted.
    /// - A failed fetch is reported per texture and never affects the others.
    /// - Dropping the returned future aborts outstanding fetches.
    #[instrument(skip_all)]
    pub async fn stitch<I, N>(&mut self, names: I) -> Result<StitchReport>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut session = LoadSession::new(names.len(), self.cfg.completion);

        let mut pending = Vec::with_capacity(names.len());
        let mut exhausted = None;
        for name in names {
            match self.allocator.allocate() {
                Ok(slot) => pending.push(Placement { name, slot }),
                Err(e) => {
                    error!(name = %name, allocated = pending.len(), error = %e, "slot allocation failed");
                    exhausted = Some(e);
                    break;
                }
            }
        }

        let first = self.tiles.len();
        self.tiles.extend(pending.iter().map(|p| PlacedTile {
            placement: p.clone(),
            loaded: false,
        }));
        info!(
            requested = session.requested(),
            allocated = pending.len(),
            remaining = self.allocator.remaining(),
            "stitch started"
        );

        let mut report = StitchReport {
            requested: session.requested(),
            loaded: 0,
            failed: Vec::new(),
            placements: pending.clone(),
            complete: false,
        };
        self.load(&pending, first, &mut session, &mut report).await;

        report.loaded = session.loaded();
        report.complete = session.is_complete();
        if let Some(e) = exhausted {
            warn!(
                loaded = report.loaded,
                dropped = report.requested - pending.len(),
                "stitch aborted: grid exhausted"
            );
            return Err(e);
        }
        info!(
            loaded = report.loaded,
            failed = report.failed.len(),
            complete = report.complete,
            "stitch finished"
        );
        Ok(report)
    }

    async fn load(
        &mut self,
        pending: &[Placement],
        first: usize,
        session: &mut LoadSession,
        report: &mut StitchReport,
    ) {
        let timeout = self.cfg.fetch_timeout();
        let mut tasks = JoinSet::new();
        let mut in_flight = HashMap::with_capacity(pending.len());
        for (offset, placement) in pending.iter().enumerate() {
            let source = Arc::clone(&self.source);
            let name = placement.name.clone();
            let handle = tasks.spawn(async move {
                let fetched = fetch(source.as_ref(), &name, timeout).await;
                (offset, fetched)
            });
            in_flight.insert(handle.id(), offset);
        }

        while let Some(joined) = tasks.join_next().await {
            let (offset, fetched) = match joined {
                Ok(done) => done,
                Err(e) => {
                    let Some(offset) = in_flight.get(&e.id()).copied() else {
                        continue;
                    };
                    let name = pending[offset].name.clone();
                    (offset, Err(StitchError::ImageFetch { name, reason: e.to_string() }))
                }
            };
            let placement = &pending[offset];
            let completed = match fetched.and_then(|px| self.copy_tile(placement, &px)) {
                Ok(rect) => {
                    self.tiles[first + offset].loaded = true;
                    self.on_loaded(placement, rect, session)
                }
                Err(err) => self.on_load_error(placement, err, session, report),
            };
            if completed {
                self.events.emit(StitchEvent::AllAdded {
                    loaded: session.loaded(),
                    failed: session.failed(),
                });
            }
        }
    }

    /// Stitch every texture named by the registry's `texture` property, flattened in
    /// registration order.
    pub async fn stitch_registry<R>(&mut self, registry: &R) -> Result<StitchReport>
    where
        R: Registry + ?Sized,
    {
        let values = registry.list_texture_property_values(TEXTURE_PROPERTY);
        let names = flatten_texture_names(&values);
        debug!(blocks = values.len(), textures = names.len(), "collected registry textures");
        self.stitch(names).await
    }

    fn copy_tile(&mut self, placement: &Placement, pixels: &TexturePixels) -> Result<Rect> {
        self.atlas
            .tile_mut(placement.slot)?
            .copy_from(&placement.name, pixels)
    }

    fn on_loaded(&mut self, placement: &Placement, rect: Rect, session: &mut LoadSession) -> bool {
        debug!(
            name = %placement.name,
            col = placement.slot.col,
            row = placement.slot.row,
            w = rect.w,
            h = rect.h,
            "texture added"
        );
        self.events.emit(StitchEvent::Added {
            name: placement.name.clone(),
            slot: placement.slot,
        });
        session.record_loaded()
    }

    fn on_load_error(
        &mut self,
        placement: &Placement,
        err: StitchError,
        session: &mut LoadSession,
        report: &mut StitchReport,
    ) -> bool {
        if matches!(err, StitchError::TileTooLarge { .. }) {
            error!(name = %placement.name, error = %err, "texture rejected");
        } else {
            warn!(name = %placement.name, error = %err, "texture failed to load");
        }
        self.events.emit(StitchEvent::LoadFailed {
            name: placement.name.clone(),
            slot: placement.slot,
            error: err.to_string(),
        });
        report.failed.push(FailedTexture {
            name: placement.name.clone(),
            slot: placement.slot,
            error: err,
        });
        session.record_failed()
    }

    pub fn atlas(&self) -> &AtlasBuffer {
        &self.atlas
    }

    /// Every slot assignment made so far, across all stitches.
    pub fn placements(&self) -> Vec<Placement> {
        self.tiles.iter().map(|t| t.placement.clone()).collect()
    }

    /// Slot of the first loaded texture called `name`.
    pub fn slot_of(&self, name: &str) -> Option<Slot> {
        self.tiles
            .iter()
            .find(|t| t.loaded && t.placement.name == name)
            .map(|t| t.placement.slot)
    }

    pub fn remaining_slots(&self) -> u32 {
        self.allocator.remaining()
    }

    /// Normalised texture coordinates covering `slot`.
    pub fn uv_rect(&self, slot: Slot) -> UvRect {
        UvRect::of_slot(slot, self.cfg.tile_count())
    }

    /// Serializable snapshot of all slot assignments.
    pub fn layout(&self) -> AtlasLayout {
        let ts = self.cfg.tile_size;
        let tiles = self
            .tiles
            .iter()
            .map(|t| {
                let (x, y) = t.placement.slot.origin(ts);
                TileRecord {
                    name: t.placement.name.clone(),
                    slot: t.placement.slot,
                    frame: Rect::new(x, y, ts, ts),
                    loaded: t.loaded,
                }
            })
            .collect();
        let meta = Meta {
            schema_version: "1".into(),
            app: "voxel-stitch".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            format: "RGBA8888".into(),
            atlas_size: self.cfg.atlas_size,
            tile_size: ts,
            tile_count: self.cfg.tile_count(),
            layout: "row,col,y,x,channel".into(),
        };
        AtlasLayout { tiles, meta }
    }
}

async fn fetch<S: ImageSource + ?Sized>(
    source: &S,
    name: &str,
    timeout: Option<Duration>,
) -> Result<TexturePixels> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, source.fetch_image(name))
            .await
            .map_err(|_| StitchError::FetchTimeout {
                name: name.to_string(),
                timeout_ms: limit.as_millis() as u64,
            })?,
        None => source.fetch_image(name).await,
    }
}
