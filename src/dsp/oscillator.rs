use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Phase Oscillator
================

A normalized phase in [0, 1) advances by `frequency / sample_rate` every
sample. The waveform is a function of that phase.

  Sine       sin(2π·phase)
  Saw        2·phase - 1, with a PolyBLEP correction around the reset so the
             jump doesn't alias into the audible band

Frequency is passed per sample rather than stored, which is what lets the
FM voice drive its carrier with a modulator:

  carrier_freq(n) = base + modulator(n) * index
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorWaveform {
    Sine,
    Saw,
}

#[derive(Debug, Clone, Copy)]
pub struct OscillatorBlock {
    waveform: OscillatorWaveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorWaveform::Sine)
    }

    pub fn sawtooth() -> Self {
        Self::new(OscillatorWaveform::Saw)
    }

    /// Produce one sample at `frequency` and advance the phase.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let increment = frequency / sample_rate;
        let sample = match self.waveform {
            OscillatorWaveform::Sine => (TAU * self.phase).sin(),
            OscillatorWaveform::Saw => {
                2.0 * self.phase - 1.0 - poly_blep(self.phase, increment.abs())
            }
        };

        self.phase += increment;
        self.phase -= self.phase.floor();
        sample
    }

    /// Fill `out` at a constant frequency.
    pub fn render(&mut self, out: &mut [f32], frequency: f32, sample_rate: f32) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(frequency, sample_rate);
        }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }
}

/// Polynomial band-limited step residual, `dt` being the phase increment.
#[inline]
fn poly_blep(phase: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        0.0
    } else if phase < dt {
        let t = phase / dt;
        t + t - t * t - 1.0
    } else if phase > 1.0 - dt {
        let t = (phase - 1.0) / dt;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_matches_reference() {
        let sample_rate = 48_000.0;
        let mut osc = OscillatorBlock::sine();
        let mut buffer = vec![0.0f32; 64];
        osc.render(&mut buffer, 440.0, sample_rate);

        let n = 12;
        let expected = (TAU * 440.0 * n as f32 / sample_rate).sin();
        assert!((buffer[n] - expected).abs() < 1e-4);
    }

    #[test]
    fn saw_stays_bounded_and_rises() {
        let mut osc = OscillatorBlock::sawtooth();
        let mut buffer = vec![0.0f32; 480];
        osc.render(&mut buffer, 100.0, 48_000.0);

        assert!(buffer.iter().all(|s| s.abs() <= 1.1));
        // Mid-cycle the ramp climbs monotonically.
        assert!(buffer[100] < buffer[200] && buffer[200] < buffer[300]);
    }

    #[test]
    fn phase_wraps() {
        let mut osc = OscillatorBlock::sine();
        for _ in 0..1_000 {
            osc.next_sample(1_234.5, 48_000.0);
            assert!((0.0..1.0).contains(&osc.phase()));
        }
    }
}
