use rand::Rng;
use voxel_stitch_core::prelude::*;

#[test]
fn default_geometry_is_sixteen_tiles_per_edge() {
    let cfg = StitchConfig::default();
    assert_eq!(cfg.atlas_size, 256);
    assert_eq!(cfg.tile_size, 16);
    assert_eq!(cfg.tile_count(), 16);
    assert_eq!(cfg.capacity(), 256);
}

#[test]
fn allocations_are_row_major_and_distinct() {
    let mut rng = rand::thread_rng();
    for _ in 0..20 {
        let tile_count = rng.gen_range(1..=8u32);
        let n = rng.gen_range(0..=tile_count * tile_count);
        let mut alloc = SlotAllocator::new(tile_count);
        let slots: Vec<Slot> = (0..n).map(|_| alloc.allocate().expect("slot")).collect();
        for (i, slot) in slots.iter().enumerate() {
            let i = i as u32;
            assert_eq!(*slot, Slot::new(i % tile_count, i / tile_count));
        }
        let mut sorted = slots.clone();
        sorted.sort_by_key(|s| (s.row, s.col));
        sorted.dedup();
        assert_eq!(sorted.len(), slots.len());
    }
}

#[test]
fn one_past_capacity_is_grid_exhausted() {
    let mut alloc = SlotAllocator::new(16);
    for _ in 0..256 {
        alloc.allocate().expect("within capacity");
    }
    assert_eq!(alloc.remaining(), 0);
    match alloc.allocate() {
        Err(StitchError::GridExhausted { tile_count }) => assert_eq!(tile_count, 16),
        other => panic!("expected GridExhausted, got {other:?}"),
    }
}

#[test]
fn config_rejects_fractional_tile_grid() {
    let cfg = StitchConfig::builder().atlas_size(100).tile_size(16).build();
    assert!(matches!(cfg.validate(), Err(StitchError::InvalidConfig(_))));
    let cfg = StitchConfig::builder().atlas_size(0).build();
    assert!(matches!(
        cfg.validate(),
        Err(StitchError::InvalidDimensions { atlas_size: 0, tile_size: 16 })
    ));
    let cfg = StitchConfig::builder().atlas_size(8).tile_size(16).build();
    assert!(cfg.validate().is_err());
}
