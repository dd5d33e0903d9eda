//! Low-level DSP primitives used by the render graph.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice graphs. They stay focused on the signal math;
//! scheduling and voice lifetime live in `graph` and `engine`.

/// Absolute-time parameter automation (set, ramp, exponential approach).
pub mod automation;
/// Gated attack/decay/sustain/release state machine.
pub mod envelope;
/// State-variable low-pass filter.
pub mod filter;
/// Phase oscillators.
pub mod oscillator;

pub use envelope::{Envelope, EnvelopeParameters, EnvelopeState};
