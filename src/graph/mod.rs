//! Nodes that run in the rendering domain.
//!
//! A voice graph is built on the control side, moved into the renderer, and
//! rendered block by block until it reports itself inactive. Nothing in here
//! allocates once constructed.

/// Amplitude stage: envelope processor, automation fallback, or flat gain.
pub mod gain;
/// Metronome tone generator with absolute-time pulses.
pub mod metronome;
/// Core traits shared by all graph nodes.
pub mod node;
/// Source → gain graph with start/stop scheduling.
pub mod voice;

pub use node::{frequency, GraphNode, RenderCtx};
