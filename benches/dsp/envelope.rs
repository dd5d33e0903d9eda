//! Benchmarks for ADSR envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use soundpad_dsp::dsp::envelope::{Envelope, EnvelopeParameters};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let held = vec![1.0f32; size];
        let open = vec![0.0f32; size];

        // Attack phase (ramping up)
        let params = EnvelopeParameters::new(0.1, 0.1, 0.7, 0.3);
        let mut env = Envelope::new();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&held), black_box(&mut buffer), &params, SAMPLE_RATE);
            })
        });

        // Sustain phase (holding steady)
        let params = EnvelopeParameters::new(0.001, 0.001, 0.7, 0.3);
        let mut env = Envelope::new();
        // Advance past attack/decay
        for _ in 0..200 {
            env.next(1.0, &params, SAMPLE_RATE);
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&held), black_box(&mut buffer), &params, SAMPLE_RATE);
            })
        });

        // Release phase (ramping down)
        let params = EnvelopeParameters::new(0.001, 0.001, 0.7, 10.0);
        let mut env = Envelope::new();
        for _ in 0..200 {
            env.next(1.0, &params, SAMPLE_RATE);
        }
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&open), black_box(&mut buffer), &params, SAMPLE_RATE);
            })
        });
    }

    group.finish();
}
