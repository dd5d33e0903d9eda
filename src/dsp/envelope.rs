/*
Gated ADSR State Machine
========================

This module implements the sample-accurate amplitude envelope that runs on
the rendering domain, one instance per sounding voice.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0). The voice
              multiplies its signal by `velocity * level`.

  state       Which phase of the envelope we're in: Idle, Attack, Decay,
              Sustain, or Release.

  gate        A per-sample control signal. gate >= 0.5 means the note is
              held, anything lower means it was let go.

  step        How much `level` changes during one sample, derived from the
              stage time and the sample rate.


The Shape
---------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲___
    0.0 └─╱──────────────────────‾‾──→ Time
        Attack Decay  Sustain  Release
         (A)   (D)      (S)      (R)

Attack and decay are LINEAR ramps. Release is an EXPONENTIAL approach:
each sample removes `level / (release * sr)`, so `release` acts as a time
constant rather than a total length. Geometric decay never reaches zero in
floating point, so the machine treats anything below SILENCE_FLOOR
(-100 dB) as having arrived.


The State Machine
-----------------

    gate held                      gate released
    ─────────                      ─────────────
    Idle ──┐                       Attack ─┐
    Release┴─→ Attack              Decay  ─┼─→ Release ──(level=0)──→ Idle
               │ level=1           Sustain─┘
               ↓
             Decay
               │ level=S
               ↓
            Sustain

Attack is only ever entered from Idle or Release while the gate is held.
Unlike a retriggering envelope the level is NOT reset on attack: a note that
is re-gated during its release climbs from wherever it is.

Within a single sample the held-gate stages fall through in order, so a zero
attack time jumps to 1.0 and takes its first decay step in the same sample.


Real-time Notes
---------------

`Envelope` is a `Copy` value: a stage tag and an f32. `next()` does a handful
of float ops and never allocates, which is what lets it run inside the render
callback for every voice at every sample.
*/

/// Anything quieter than -100 dB counts as finished.
pub const SILENCE_FLOOR: f32 = 1.0e-5;

/// Gate values at or above this threshold mean "held".
pub const GATE_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Gate low, envelope inactive, level = 0
    Attack,  // Gate held, ramping up to 1.0
    Decay,   // Reached peak, ramping down to sustain level
    Sustain, // Holding at sustain level while gate is held
    Release, // Gate low, approaching 0
}

/// Stage times in seconds plus the sustain level.
///
/// Constant for the lifetime of one note; each instrument picks its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParameters {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl EnvelopeParameters {
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack: attack.max(0.0),
            decay: decay.max(0.0),
            sustain: sustain.clamp(0.0, 1.0),
            release: release.max(0.0),
        }
    }
}

impl Default for EnvelopeParameters {
    fn default() -> Self {
        Self::new(0.005, 0.05, 0.7, 0.1)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    state: EnvelopeState,
    level: f32,
}

impl Envelope {
    pub const fn new() -> Self {
        Self {
            state: EnvelopeState::Idle,
            level: 0.0,
        }
    }

    /// Advance by one sample and return the new level.
    #[inline]
    pub fn next(&mut self, gate: f32, params: &EnvelopeParameters, sample_rate: f32) -> f32 {
        if gate >= GATE_THRESHOLD {
            if matches!(self.state, EnvelopeState::Idle | EnvelopeState::Release) {
                self.state = EnvelopeState::Attack;
            }

            if self.state == EnvelopeState::Attack {
                let step = if params.attack > 0.0 {
                    1.0 / (params.attack * sample_rate)
                } else {
                    1.0
                };
                self.level += step;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.state = EnvelopeState::Decay;
                }
            }

            if self.state == EnvelopeState::Decay {
                let sustain = params.sustain.clamp(0.0, 1.0);
                let step = if params.decay > 0.0 {
                    (1.0 - sustain) / (params.decay * sample_rate)
                } else {
                    1.0
                };
                self.level -= step;
                if self.level <= sustain {
                    self.level = sustain;
                    self.state = EnvelopeState::Sustain;
                }
            }

            if self.state == EnvelopeState::Sustain {
                self.level = params.sustain.clamp(0.0, 1.0);
            }
        } else if self.state != EnvelopeState::Idle {
            self.state = EnvelopeState::Release;

            let step = if params.release > 0.0 {
                self.level / (params.release * sample_rate)
            } else {
                1.0
            };
            self.level -= step;
            if self.level <= SILENCE_FLOOR {
                self.level = 0.0;
                self.state = EnvelopeState::Idle;
            }
        }

        self.level
    }

    /// Render one level per gate sample.
    pub fn render(
        &mut self,
        gate: &[f32],
        out: &mut [f32],
        params: &EnvelopeParameters,
        sample_rate: f32,
    ) {
        for (o, &g) in out.iter_mut().zip(gate.iter()) {
            *o = self.next(g, params, sample_rate);
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Returns true while the envelope is producing output.
    pub fn is_active(&self) -> bool {
        self.state != EnvelopeState::Idle
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}
