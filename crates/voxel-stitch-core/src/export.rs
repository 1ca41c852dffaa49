use crate::model::{AtlasLayout, UvRect};
use serde_json::{Value, json};

/// Serialize the whole layout as `{ tiles: [...], meta }`, one entry per allocated slot in
/// allocation order (duplicated names appear once per slot).
pub fn to_json_array(layout: &AtlasLayout) -> Value {
    let tiles = layout
        .tiles
        .iter()
        .map(|t| {
            json!({
                "name": t.name,
                "col": t.slot.col,
                "row": t.slot.row,
                "frame": {"x": t.frame.x, "y": t.frame.y, "w": t.frame.w, "h": t.frame.h},
                "loaded": t.loaded,
            })
        })
        .collect::<Vec<_>>();
    json!({"tiles": tiles, "meta": &layout.meta})
}

/// Loaded tiles keyed by texture name, with normalised UVs.
/// Shape: `{ frames: { name: { frame, slot, uv } }, meta }`. When a name was stitched more
/// than once the first slot wins; unloaded slots are left out.
pub fn to_json_hash(layout: &AtlasLayout) -> Value {
    let mut frames = serde_json::Map::new();
    for t in layout.tiles.iter().filter(|t| t.loaded) {
        if frames.contains_key(&t.name) {
            continue;
        }
        let uv = UvRect::of_slot(t.slot, layout.meta.tile_count);
        frames.insert(
            t.name.clone(),
            json!({
                "frame": {"x": t.frame.x, "y": t.frame.y, "w": t.frame.w, "h": t.frame.h},
                "slot": {"col": t.slot.col, "row": t.slot.row},
                "uv": uv,
            }),
        );
    }
    json!({ "frames": frames, "meta": &layout.meta })
}
