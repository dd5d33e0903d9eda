//! Benchmarks for the full engine mixing a busy voice pool.
//!
//! These drive the renderer through a `ManualHost`, so they include
//! command draining, bus summing and clock updates.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use soundpad_dsp::{EngineConfig, Instrument, ManualHost, NoteOn, PerformanceEvent, Scheduler};

use crate::BLOCK_SIZES;

fn engine(voices: usize) -> (Scheduler<ManualHost>, ManualHost) {
    let host = ManualHost::new();
    let config = EngineConfig::default().with_max_voices(voices);
    let mut scheduler = Scheduler::new(config, host.clone());
    scheduler.ensure_started();

    let notes: Vec<PerformanceEvent> = (0..voices)
        .map(|i| {
            let instrument = if i % 2 == 0 { Instrument::Subtractive } else { Instrument::Fm };
            NoteOn::new(instrument, 48.0 + i as f32, 0.5, 3_600.0).into()
        })
        .collect();
    scheduler.schedule(&notes);

    (scheduler, host)
}

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/mix");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === LIGHT: 4 voices ===
        let (_light, host) = engine(4);
        group.bench_with_input(BenchmarkId::new("4_voices", size), &size, |b, _| {
            b.iter(|| {
                host.render(black_box(&mut buffer));
            })
        });

        // === FULL POOL: 24 voices ===
        let (_full, host) = engine(24);
        group.bench_with_input(BenchmarkId::new("24_voices", size), &size, |b, _| {
            b.iter(|| {
                host.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
