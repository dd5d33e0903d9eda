//! Benchmarks for complete voice graphs.
//!
//! Each voice is built exactly as a triggered note would be, with a note
//! long enough that the benchmark never reaches its stop time.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use soundpad_dsp::{
    graph::{gain::GainMode, GraphNode, RenderCtx},
    io::{Instrument, NoteOn, SampleBuffer},
    voices::{FmVoice, SamplerVoice, SubtractiveVoice},
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    // Sustain portion of the contour
    let ctx = RenderCtx::new(SAMPLE_RATE, 0.5);
    let long = |instrument| NoteOn::new(instrument, 45.0, 0.8, 3_600.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === SUBTRACTIVE ===
        // saw → lowpass → envelope processor
        let mut subtractive =
            SubtractiveVoice::graph(&long(Instrument::Subtractive), 0.0, GainMode::Processor);
        group.bench_with_input(BenchmarkId::new("subtractive", size), &size, |b, _| {
            b.iter(|| {
                subtractive.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // Same graph on the automation fallback
        let mut fallback =
            SubtractiveVoice::graph(&long(Instrument::Subtractive), 0.0, GainMode::Automation);
        group.bench_with_input(BenchmarkId::new("subtractive_automation", size), &size, |b, _| {
            b.iter(|| {
                fallback.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // === FM ===
        // two sines per sample
        let mut fm = FmVoice::graph(&long(Instrument::Fm), 0.0, GainMode::Processor);
        group.bench_with_input(BenchmarkId::new("fm", size), &size, |b, _| {
            b.iter(|| {
                fm.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // === SAMPLER ===
        // buffer reads at a flat gain
        let mut sampler = SamplerVoice::new();
        sampler.set_buffer(SampleBuffer::new(vec![0.5; 48_000 * 60], SAMPLE_RATE));
        let mut playback = sampler.graph(&long(Instrument::Sampler), 0.0);
        group.bench_with_input(BenchmarkId::new("sampler", size), &size, |b, _| {
            b.iter(|| {
                playback.render_block(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}
