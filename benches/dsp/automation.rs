//! Benchmarks for parameter timeline evaluation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use soundpad_dsp::dsp::automation::ParamTimeline;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_automation(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/automation");
    let dt = 1.0 / SAMPLE_RATE as f64;

    // The fallback gain contour: set, two ramps, exponential release
    let mut gain = ParamTimeline::new(0.0);
    gain.set_value_at_time(0.0, 0.0)
        .linear_ramp_to_value_at_time(0.8, 0.005)
        .linear_ramp_to_value_at_time(0.56, 0.085)
        .set_target_at_time(0.0, 0.5, 0.15);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Inside the decay ramp
        group.bench_with_input(BenchmarkId::new("ramp", size), &size, |b, _| {
            b.iter(|| {
                for (i, out) in buffer.iter_mut().enumerate() {
                    *out = gain.value_at(black_box(0.01 + i as f64 * dt));
                }
            })
        });

        // Inside the exponential release
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                for (i, out) in buffer.iter_mut().enumerate() {
                    *out = gain.value_at(black_box(0.6 + i as f64 * dt));
                }
            })
        });
    }

    group.finish();
}
