use crate::{
    dsp::oscillator::OscillatorBlock,
    graph::node::{GraphNode, RenderCtx},
};

/*
Metronome Tone
==============

A sine generator that is permanently wired into the output bus and muted.
Each tick schedules a short pulse at an absolute beat time:

  gain
  PEAK ┐ ╱‾╲
       │╱   ╲______
     0 └─────────────→ t
       at  +1ms  +30ms

Pulses are keyed by their start time. Scheduling a pulse for a boundary that
is already pending is a no-op, so a caller that ticks every animation frame
converges on one click per beat instead of stacking them.
*/

pub const PULSE_PEAK: f32 = 0.25;
pub const PULSE_ATTACK: f64 = 0.001;
pub const PULSE_LENGTH: f64 = 0.03;

/// Pending pulses beyond this are dropped oldest-first.
const MAX_PENDING_PULSES: usize = 8;

pub struct Metronome {
    osc: OscillatorBlock,
    frequency: f32,
    pulses: Vec<f64>,
}

impl Metronome {
    pub fn new(frequency: f32) -> Self {
        Self {
            osc: OscillatorBlock::sine(),
            frequency,
            pulses: Vec::with_capacity(MAX_PENDING_PULSES),
        }
    }

    /// Queue a pulse at absolute context time `at`.
    pub fn schedule_pulse(&mut self, at: f64, sample_rate: f32) {
        let half_frame = 0.5 / sample_rate as f64;
        if self.pulses.iter().any(|&p| (p - at).abs() < half_frame) {
            return;
        }
        if self.pulses.len() == MAX_PENDING_PULSES {
            self.pulses.remove(0);
        }
        self.pulses.push(at);
    }

    pub fn pending_pulses(&self) -> usize {
        self.pulses.len()
    }

    #[inline]
    fn gain_at(&self, t: f64) -> f32 {
        let mut gain = 0.0f32;
        for &start in &self.pulses {
            let dt = t - start;
            if dt < 0.0 || dt >= PULSE_LENGTH {
                continue;
            }
            let g = if dt < PULSE_ATTACK {
                dt / PULSE_ATTACK
            } else {
                1.0 - (dt - PULSE_ATTACK) / (PULSE_LENGTH - PULSE_ATTACK)
            };
            gain = gain.max(g as f32 * PULSE_PEAK);
        }
        gain
    }
}

impl GraphNode for Metronome {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for (i, sample) in out.iter_mut().enumerate() {
            let t = ctx.frame_time(i);
            let tone = self.osc.next_sample(self.frequency, ctx.sample_rate);
            *sample = tone * self.gain_at(t);
        }

        let end = ctx.end_time(out.len());
        self.pulses.retain(|&start| start + PULSE_LENGTH > end);
    }
}
