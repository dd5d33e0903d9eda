//! Sampler voice.
//!
//! Plays a decoded buffer once from the start at rate 1.0, at a flat gain
//! equal to the note's velocity. Pitch is ignored. The note's duration cuts
//! playback short; a buffer shorter than the note simply runs out.
//!
//! Until a buffer is loaded, notes still produce a (silent) voice so they
//! take part in voice stealing like any other.

use std::sync::Arc;

use crate::{
    engine::{AudioContext, OutputBus, VoiceHandle},
    error::Result,
    graph::{
        gain::GainStage,
        voice::{Source, VoiceGraph},
    },
    io::{decode_wav, Instrument, NoteOn, SampleBuffer},
    voices::{connect_voice, SynthVoice},
};

pub struct SampleSource {
    buffer: Option<Arc<SampleBuffer>>,
    position: usize,
}

impl SampleSource {
    pub fn new(buffer: Option<Arc<SampleBuffer>>) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }
}

impl Source for SampleSource {
    #[inline]
    fn next_sample(&mut self, _sample_rate: f32) -> f32 {
        let Some(buffer) = self.buffer.as_ref() else {
            return 0.0;
        };
        match buffer.samples().get(self.position) {
            Some(&sample) => {
                self.position += 1;
                sample
            }
            None => 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SamplerVoice {
    buffer: Option<Arc<SampleBuffer>>,
}

impl SamplerVoice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode WAV bytes and make them the buffer for subsequent notes.
    ///
    /// On failure the previously loaded buffer (if any) is kept.
    pub fn load(&mut self, bytes: &[u8], sample_rate: f32) -> Result<()> {
        let buffer = decode_wav(bytes, sample_rate)?;
        self.set_buffer(buffer);
        Ok(())
    }

    pub fn set_buffer(&mut self, buffer: SampleBuffer) {
        self.buffer = Some(Arc::new(buffer));
    }

    pub fn buffer(&self) -> Option<&SampleBuffer> {
        self.buffer.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.buffer.is_some()
    }

    /// The graph a note would get, without connecting it.
    pub fn graph(&self, note: &NoteOn, when: f64) -> VoiceGraph<SampleSource> {
        VoiceGraph::new(
            SampleSource::new(self.buffer.clone()),
            GainStage::fixed(note.gain()),
            when,
            when + note.hold(),
        )
    }
}

impl SynthVoice for SamplerVoice {
    fn trigger(
        &self,
        ctx: &mut AudioContext,
        bus: &OutputBus,
        note: &NoteOn,
        when: f64,
    ) -> VoiceHandle {
        let graph = self.graph(note, when);
        connect_voice(ctx, bus, Instrument::Sampler, Box::new(graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphNode, RenderCtx};

    const SAMPLE_RATE: f32 = 48_000.0;

    fn ramp(frames: usize) -> SampleBuffer {
        SampleBuffer::new((0..frames).map(|i| i as f32 / frames as f32).collect(), SAMPLE_RATE)
    }

    #[test]
    fn unloaded_sampler_plays_silence() {
        let sampler = SamplerVoice::new();
        let note = NoteOn::new(Instrument::Sampler, 60.0, 1.0, 0.01);
        let mut graph = sampler.graph(&note, 0.0);

        let mut out = [1.0f32; 480];
        graph.render_block(&mut out, &RenderCtx::new(SAMPLE_RATE, 0.0));

        assert!(out.iter().all(|&s| s == 0.0));
        assert!(!sampler.is_loaded());
    }

    #[test]
    fn plays_buffer_scaled_by_velocity() {
        let mut sampler = SamplerVoice::new();
        sampler.set_buffer(ramp(100));
        let note = NoteOn::new(Instrument::Sampler, 10.0, 0.5, 1.0);
        let mut graph = sampler.graph(&note, 0.0);

        let mut out = [0.0f32; 200];
        graph.render_block(&mut out, &RenderCtx::new(SAMPLE_RATE, 0.0));

        assert_eq!(out[0], 0.0);
        assert!((out[50] - 0.25).abs() < 1e-6);
        assert!(out[100..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn duration_cuts_playback_short() {
        let mut sampler = SamplerVoice::new();
        sampler.set_buffer(SampleBuffer::new(vec![1.0; 4800], SAMPLE_RATE));
        let note = NoteOn::new(Instrument::Sampler, 60.0, 1.0, 0.005);
        let mut graph = sampler.graph(&note, 0.0);
        assert_eq!(graph.stop_time(), 0.005);

        let mut out = [0.0f32; 480];
        graph.render_block(&mut out, &RenderCtx::new(SAMPLE_RATE, 0.0));

        assert!(out[..240].iter().all(|&s| s == 1.0));
        assert!(out[240..].iter().all(|&s| s == 0.0));
        assert!(!graph.is_active());
    }

    #[test]
    fn failed_load_keeps_previous_buffer() {
        let mut sampler = SamplerVoice::new();
        sampler.set_buffer(ramp(10));

        assert!(sampler.load(b"RIFF nope", SAMPLE_RATE).is_err());
        assert_eq!(sampler.buffer().map(SampleBuffer::frames), Some(10));
    }
}
