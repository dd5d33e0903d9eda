//! Benchmarks for low-level DSP primitives.

mod automation;
mod envelope;
mod filter;
mod oscillator;

pub use automation::bench_automation;
pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use oscillator::bench_oscillator;
