use voxel_stitch_core::prelude::*;

const BG: u8 = 80;

#[test]
fn copy_touches_only_its_own_tile() {
    let cfg = StitchConfig::default();
    let mut atlas = AtlasBuffer::new(&cfg).expect("atlas");
    let mut data = Vec::with_capacity(16 * 16 * 4);
    for y in 0..16u8 {
        for x in 0..16u8 {
            data.extend_from_slice(&[y, x, 200, 255]);
        }
    }
    let pixels = TexturePixels::from_raw(16, 16, 4, data).expect("pixels");
    atlas
        .tile_mut(Slot::new(2, 3))
        .expect("slot in grid")
        .copy_from("gradient", &pixels)
        .expect("fits");

    let [rows, cols, th, tw, ch] = atlas.shape();
    for row in 0..rows as u32 {
        for col in 0..cols as u32 {
            for y in 0..th as u32 {
                for x in 0..tw as u32 {
                    for c in 0..ch as u32 {
                        let v = atlas.get(row, col, y, x, c);
                        if col == 2 && row == 3 {
                            assert_eq!(v, pixels.get(y, x, c));
                        } else {
                            assert_eq!(v, BG, "tile ({col}, {row}) was modified");
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn smaller_source_fills_tile_corner_only() {
    let cfg = StitchConfig::builder().atlas_size(32).tile_size(16).build();
    let mut atlas = AtlasBuffer::new(&cfg).expect("atlas");
    let small = TexturePixels::solid(4, 2, [1, 2, 3, 4]);
    let rect = atlas
        .tile_mut(Slot::new(1, 1))
        .unwrap()
        .copy_from("small", &small)
        .unwrap();
    assert_eq!(rect, Rect::new(16, 16, 4, 2));
    assert_eq!(atlas.get(1, 1, 1, 3, 2), 3);
    assert_eq!(atlas.get(1, 1, 2, 0, 0), BG);
    assert_eq!(atlas.get(1, 1, 0, 4, 0), BG);
}

#[test]
fn rgb_source_keeps_background_alpha() {
    let cfg = StitchConfig::builder().atlas_size(16).tile_size(16).build();
    let mut atlas = AtlasBuffer::new(&cfg).expect("atlas");
    let rgb = TexturePixels::from_raw(1, 1, 3, vec![10, 20, 30]).unwrap();
    atlas
        .tile_mut(Slot::new(0, 0))
        .unwrap()
        .copy_from("rgb", &rgb)
        .unwrap();
    assert_eq!(atlas.get(0, 0, 0, 0, 2), 30);
    assert_eq!(atlas.get(0, 0, 0, 0, 3), BG);
}
