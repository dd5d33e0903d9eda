use std::f32::consts::PI;

/*
State-Variable Low-Pass
=======================

A topology-preserving (TPT) state-variable filter, as described by
Zavalishin / Simper. Two integrators carry the state; the low-pass output is
the second integrator.

  g = tan(π · cutoff / sample_rate)      prewarped integrator gain
  k = 1 / Q                              damping

Q = 0.707 is the Butterworth response (flat passband, no peak). The
subtractive voice runs at Q = 0.7, just under it, with the cutoff at 12 kHz
so the filter only rounds off the very top of the sawtooth.

Coefficients depend only on cutoff, Q and sample rate, so they are cached and
recomputed only when one of those changes.
*/

/// Keep the prewarp away from Nyquist, where tan() blows up.
const MAX_CUTOFF_RATIO: f32 = 0.49;

#[derive(Debug, Clone, Copy)]
pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    cutoff_hz: f32,
    q: f32,

    // Cached coefficients
    g: f32,
    k: f32,
    h: f32,
    coeff_rate: f32,
}

impl SVFilter {
    pub fn lowpass(cutoff_hz: f32, q: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz: cutoff_hz.max(1.0),
            q: q.max(0.01),
            g: 0.0,
            k: 0.0,
            h: 0.0,
            coeff_rate: 0.0,
        }
    }

    #[inline]
    fn update_coefficients(&mut self, sample_rate: f32) {
        let cutoff = self.cutoff_hz.min(sample_rate * MAX_CUTOFF_RATIO);
        self.g = (PI * cutoff / sample_rate).tan();
        self.k = 1.0 / self.q;
        self.h = 1.0 / (1.0 + self.g * (self.g + self.k));
        self.coeff_rate = sample_rate;
    }

    /// Filter one sample.
    #[inline]
    pub fn process(&mut self, input: f32, sample_rate: f32) -> f32 {
        if self.coeff_rate != sample_rate {
            self.update_coefficients(sample_rate);
        }

        let v3 = input - self.ic2eq;
        let v1 = self.h * (self.ic1eq + self.g * v3);
        let v2 = self.ic2eq + self.g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        v2
    }

    pub fn render(&mut self, buffer: &mut [f32], sample_rate: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample, sample_rate);
        }
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz.max(1.0);
        self.coeff_rate = 0.0;
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}
