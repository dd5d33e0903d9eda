//! Control-side engine: context, renderer, hosts, voice pool and scheduler.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod allocator;
pub mod context;
pub mod handle;
pub mod host;
pub mod renderer;
pub mod scheduler;

pub use allocator::VoicePool;
pub use context::{AudioContext, ContextState, NodeId, OutputBus, ProcessorModule};
pub use handle::VoiceHandle;
pub use host::{ManualHost, RenderHost};
pub use renderer::Renderer;
pub use scheduler::Scheduler;

/// Engine settings. Every field has a working default.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Voice pool capacity.
    pub max_voices: usize,
    /// How far ahead of the context clock an event may start.
    pub lookahead_ms: f64,
    /// Output bus gain.
    pub output_gain: f32,
    /// Initial tempo, clamped to 20..=300.
    pub bpm: f64,
    /// Try to load the envelope processor module. When false, voices
    /// always use the automation fallback.
    pub envelope_processor: bool,
    /// Slots in each direction of the control/render queues.
    ///
    /// Each note-on can take two slots (a steal's disconnect and the new
    /// connect). A batch that overflows the queue between render callbacks
    /// loses commands; the renderer then keeps at most `max_voices` graphs by
    /// retiring the oldest.
    pub command_queue_size: usize,
    /// Metronome tone in Hz.
    pub metronome_frequency: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            max_voices: 24,
            lookahead_ms: 100.0,
            output_gain: 0.9,
            bpm: 120.0,
            envelope_processor: true,
            command_queue_size: 1024,
            metronome_frequency: 1_000.0,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_max_voices(mut self, max_voices: usize) -> Self {
        self.max_voices = max_voices;
        self
    }

    pub fn with_lookahead_ms(mut self, lookahead_ms: f64) -> Self {
        self.lookahead_ms = lookahead_ms;
        self
    }

    pub fn with_output_gain(mut self, output_gain: f32) -> Self {
        self.output_gain = output_gain;
        self
    }

    pub fn with_bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    pub fn with_envelope_processor(mut self, enabled: bool) -> Self {
        self.envelope_processor = enabled;
        self
    }

    pub fn with_command_queue_size(mut self, size: usize) -> Self {
        self.command_queue_size = size;
        self
    }

    pub fn with_metronome_frequency(mut self, frequency: f32) -> Self {
        self.metronome_frequency = frequency;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_voices, 24);
        assert_eq!(config.lookahead_ms, 100.0);
        assert_eq!(config.output_gain, 0.9);
        assert!(config.envelope_processor);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_config_fills_in_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"max_voices": 8, "lookahead_ms": 50.0}"#).unwrap();
        assert_eq!(config.max_voices, 8);
        assert_eq!(config.lookahead_ms, 50.0);
        assert_eq!(config.sample_rate, 48_000.0);
    }
}
