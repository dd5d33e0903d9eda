//! Real-world scenario benchmarks.
//!
//! These benchmarks model actual usage: single voice graphs as the
//! renderer sees them, and a full engine with a busy voice pool.

mod mix;
mod voices;

pub use mix::bench_mix;
pub use voices::bench_voices;
