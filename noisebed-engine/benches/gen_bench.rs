//! Per-sample cost of each generator. The real-time path has to finish well
//! inside one device buffer, so these run each generator for one block.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use noisebed_engine::graph::Generator;
use noisebed_engine::{CampfireParams, NoiseGen, NoiseType};

const SR: f32 = 48_000.0;
const BLOCK: usize = 512;

fn bench_generators(c: &mut Criterion) {
    let params = CampfireParams::default();
    let mut group = c.benchmark_group("next_sample");
    for ty in [
        NoiseType::White,
        NoiseType::Pink,
        NoiseType::Brown,
        NoiseType::Rain,
        NoiseType::Campfire,
    ] {
        let mut gen = NoiseGen::seeded(42, ty, &params, SR);
        group.bench_function(ty.name(), |b| {
            b.iter(|| {
                let mut acc = 0.0f32;
                for _ in 0..BLOCK {
                    acc += gen.next();
                }
                black_box(acc)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generators);
criterion_main!(benches);
