//! Subtractive voice.
//!
//! A band-limited sawtooth through a gentle lowpass. The default voice:
//! any note whose instrument tag isn't recognized plays here.
//!
//! # How It Works
//!
//! 1. PolyBLEP sawtooth at the note's frequency
//! 2. State-variable lowpass at 12 kHz, Q 0.7, to take the fizz off the top
//! 3. Amplitude contour: 5ms attack, 80ms decay, 70% sustain, release of
//!    30% of the note length (at least 20ms)

use crate::{
    dsp::{envelope::EnvelopeParameters, filter::SVFilter, oscillator::OscillatorBlock},
    engine::{AudioContext, OutputBus, VoiceHandle},
    graph::{
        frequency,
        gain::{AmplitudeShape, GainMode, GainStage},
        voice::{Source, VoiceGraph},
    },
    io::{Instrument, NoteOn},
    voices::{connect_voice, release_time, SynthVoice, STOP_TAIL},
};

const ATTACK: f32 = 0.005;
const DECAY: f32 = 0.08;
const SUSTAIN: f32 = 0.7;
const FILTER_CUTOFF: f32 = 12_000.0;
const FILTER_Q: f32 = 0.7;

pub struct SubtractiveSource {
    osc: OscillatorBlock,
    filter: SVFilter,
    frequency: f32,
}

impl SubtractiveSource {
    pub fn new(pitch: f32) -> Self {
        Self {
            osc: OscillatorBlock::sawtooth(),
            filter: SVFilter::lowpass(FILTER_CUTOFF, FILTER_Q),
            frequency: frequency(pitch),
        }
    }
}

impl Source for SubtractiveSource {
    #[inline]
    fn next_sample(&mut self, sample_rate: f32) -> f32 {
        let raw = self.osc.next_sample(self.frequency, sample_rate);
        self.filter.process(raw, sample_rate)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SubtractiveVoice;

impl SubtractiveVoice {
    /// The graph a note would get, without connecting it.
    pub fn graph(note: &NoteOn, when: f64, mode: GainMode) -> VoiceGraph<SubtractiveSource> {
        let hold = note.hold();
        let release = release_time(hold);
        let shape = AmplitudeShape {
            params: EnvelopeParameters::new(ATTACK, DECAY, SUSTAIN, release as f32),
            velocity: note.gain(),
            when,
            duration: hold,
        };

        VoiceGraph::new(
            SubtractiveSource::new(note.pitch),
            GainStage::shaped(&shape, mode),
            when,
            when + hold + release + STOP_TAIL,
        )
    }
}

impl SynthVoice for SubtractiveVoice {
    fn trigger(
        &self,
        ctx: &mut AudioContext,
        bus: &OutputBus,
        note: &NoteOn,
        when: f64,
    ) -> VoiceHandle {
        let graph = Self::graph(note, when, ctx.gain_mode());
        connect_voice(ctx, bus, Instrument::Subtractive, Box::new(graph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphNode, RenderCtx};

    const SAMPLE_RATE: f32 = 48_000.0;

    fn render(graph: &mut VoiceGraph<SubtractiveSource>, seconds: f64) -> Vec<f32> {
        let mut out = vec![0.0; (seconds * SAMPLE_RATE as f64) as usize];
        for (i, block) in out.chunks_mut(512).enumerate() {
            let ctx = RenderCtx::new(SAMPLE_RATE, (i * 512) as f64 / SAMPLE_RATE as f64);
            graph.render_block(block, &ctx);
        }
        out
    }

    #[test]
    fn stop_time_covers_release_and_tail() {
        let note = NoteOn::new(Instrument::Subtractive, 60.0, 1.0, 1.0);
        let graph = SubtractiveVoice::graph(&note, 2.0, GainMode::Processor);
        assert_eq!(graph.start_time(), 2.0);
        assert!((graph.stop_time() - (2.0 + 1.0 + 0.3 + 0.05)).abs() < 1e-9);
    }

    #[test]
    fn negative_duration_is_held_for_zero() {
        let note = NoteOn::new(Instrument::Subtractive, 60.0, 1.0, -1.0);
        let graph = SubtractiveVoice::graph(&note, 0.0, GainMode::Automation);
        assert!((graph.stop_time() - (0.02 + 0.05)).abs() < 1e-9);
    }

    #[test]
    fn sounds_then_finishes() {
        let note = NoteOn::new(Instrument::Subtractive, 57.0, 0.8, 0.2);
        let mut graph = SubtractiveVoice::graph(&note, 0.0, GainMode::Processor);

        let out = render(&mut graph, 0.4);
        let peak = out[..9600].iter().fold(0.0f32, |m, s| m.max(s.abs()));

        assert!(peak > 0.1, "peak {peak}");
        assert!(peak <= 1.0);
        assert!(!graph.is_active());
    }

    #[test]
    fn zero_velocity_is_silent() {
        let note = NoteOn::new(Instrument::Subtractive, 60.0, 0.0, 0.1);
        let mut graph = SubtractiveVoice::graph(&note, 0.0, GainMode::Automation);
        let out = render(&mut graph, 0.1);
        assert!(out.iter().all(|&s| s == 0.0));
    }
}
