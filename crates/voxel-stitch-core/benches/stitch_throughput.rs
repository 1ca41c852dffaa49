use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use voxel_stitch_core::prelude::*;

fn generate_source(count: usize, tile: u32) -> (MemoryImageSource, Vec<String>) {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let mut source = MemoryImageSource::new();
    let names: Vec<String> = (0..count).map(|i| format!("tex_{}", i)).collect();
    for name in &names {
        let rgba = [rng.r#gen(), rng.r#gen(), rng.r#gen(), 255];
        source.insert(name.clone(), TexturePixels::solid(tile, tile, rgba));
    }
    (source, names)
}

fn bench_stitch(c: &mut Criterion) {
    let mut group = c.benchmark_group("stitch");
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");

    for (atlas_size, tile_size) in [(256u32, 16u32), (1024, 16), (2048, 32)] {
        let cfg = StitchConfig::builder()
            .atlas_size(atlas_size)
            .tile_size(tile_size)
            .build();
        let count = cfg.capacity() as usize;
        let (source, names) = generate_source(count, tile_size);
        let source = std::sync::Arc::new(source);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(
            BenchmarkId::new("full_grid", format!("{atlas_size}/{tile_size}")),
            &names,
            |b, names| {
                b.iter(|| {
                    rt.block_on(async {
                        let mut builder =
                            AtlasBuilder::with_shared_source(cfg.clone(), source.clone())
                                .expect("builder");
                        let report = builder.stitch(names.iter().cloned()).await.expect("stitch");
                        black_box(report.loaded)
                    })
                });
            },
        );
    }

    group.finish();
}

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");
    for atlas_size in [256u32, 1024, 2048] {
        let cfg = StitchConfig::builder().atlas_size(atlas_size).build();
        let atlas = AtlasBuffer::new(&cfg).expect("atlas");
        group.bench_function(BenchmarkId::new("to_rgba_image", atlas_size), |b| {
            b.iter(|| black_box(atlas.to_rgba_image()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_stitch, bench_flatten);
criterion_main!(benches);
