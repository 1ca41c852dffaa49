use voxel_stitch_core::prelude::*;

#[tokio::test]
async fn layout_json_lists_loaded_tiles() {
    let source = MemoryImageSource::new()
        .with_texture("a", TexturePixels::solid(16, 16, [1, 0, 0, 255]))
        .with_texture("b", TexturePixels::solid(16, 16, [2, 0, 0, 255]));
    let mut builder = AtlasBuilder::new(StitchConfig::default(), source).expect("builder");
    builder.stitch(["a", "gone", "b", "a"]).await.expect("stitch");

    let layout = builder.layout();
    assert_eq!(layout.tiles.len(), 4);
    assert_eq!(layout.meta.tile_count, 16);
    assert!((layout.occupancy() - 3.0 / 256.0).abs() < 1e-9);

    let ja = voxel_stitch_core::to_json_array(&layout);
    let tiles = ja["tiles"].as_array().expect("tiles");
    assert_eq!(tiles.len(), 4);
    assert_eq!(tiles[1]["name"], "gone");
    assert_eq!(tiles[1]["loaded"], false);
    assert_eq!(tiles[2]["frame"]["x"], 32);

    let jh = voxel_stitch_core::to_json_hash(&layout);
    let frames = jh["frames"].as_object().expect("frames");
    assert_eq!(frames.len(), 2);
    assert!(!frames.contains_key("gone"));
    assert_eq!(jh["frames"]["a"]["slot"]["col"], 0);
    assert_eq!(jh["frames"]["b"]["uv"]["u0"], 2.0 / 16.0);
    let uv = builder.uv_rect(Slot::new(2, 0));
    assert_eq!(jh["frames"]["b"]["uv"], serde_json::to_value(uv).expect("uv"));
    assert_eq!(jh["meta"]["app"], "voxel-stitch");
}

#[tokio::test]
async fn flattened_png_matches_tile_buffer() {
    let source = MemoryImageSource::new()
        .with_texture("a", TexturePixels::solid(16, 16, [10, 20, 30, 255]));
    let cfg = StitchConfig::builder().atlas_size(64).tile_size(16).build();
    let mut builder = AtlasBuilder::new(cfg, source).expect("builder");
    builder.stitch(["x", "a"]).await.expect("stitch");

    let img = builder.atlas().to_rgba_image();
    assert_eq!(img.dimensions(), (64, 64));
    assert_eq!(img.get_pixel(16, 0).0, [10, 20, 30, 255]);
    assert_eq!(img.get_pixel(31, 15).0, [10, 20, 30, 255]);
    assert_eq!(img.get_pixel(0, 0).0, [80, 80, 80, 80]);
    assert_eq!(img.get_pixel(16, 16).0, [80, 80, 80, 80]);
}
