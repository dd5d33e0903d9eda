use crate::dsp::{
    automation::ParamTimeline,
    envelope::{Envelope, EnvelopeParameters},
};

/*
Gain Stage
==========

Every voice ends in an amplitude stage. Which one it gets is decided when
the voice is triggered:

  Processor   the sample-accurate envelope state machine, fed by a gate
              timeline (1.0 at note start, 0.0 at note end) and scaled by
              velocity. Used whenever the envelope processor module loaded.

  Automation  a parameter timeline holding explicit linear ramps and an
              exponential release. The fallback when the processor module
              is unavailable. Audibly equivalent, not sample-identical.

  Fixed       a flat gain, for sources that have no envelope at all.

Both shaped variants describe the same contour:

  set 0 @ when → ramp to v @ when+a → ramp to s·v @ when+a+d
               → exponential approach to 0 from when+dur with time constant r
*/

/// Shortest gate, so a zero-length note still enters attack.
const MIN_GATE: f64 = 0.001;

/// Which gain driver a voice should build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GainMode {
    Processor,
    Automation,
}

/// An instrument's envelope contour for one note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmplitudeShape {
    pub params: EnvelopeParameters,
    pub velocity: f32,
    pub when: f64,
    pub duration: f64,
}

impl AmplitudeShape {
    /// Time at which the gate falls and the release starts.
    pub fn release_start(&self) -> f64 {
        self.when + self.duration.max(MIN_GATE)
    }

    fn automation(&self) -> ParamTimeline {
        let p = &self.params;
        let attack_end = self.when + p.attack as f64;
        let decay_end = attack_end + p.decay as f64;

        let mut gain = ParamTimeline::new(0.0);
        gain.cancel_scheduled_values(self.when)
            .set_value_at_time(0.0, self.when)
            .linear_ramp_to_value_at_time(self.velocity, attack_end)
            .linear_ramp_to_value_at_time(p.sustain * self.velocity, decay_end)
            .set_target_at_time(0.0, self.release_start(), p.release as f64);
        gain
    }

    fn gate(&self) -> ParamTimeline {
        let mut gate = ParamTimeline::new(0.0);
        gate.set_value_at_time(1.0, self.when)
            .set_value_at_time(0.0, self.release_start());
        gate
    }
}

/// Envelope processor plus the gate signal that drives it.
#[derive(Debug, Clone)]
pub struct EnvNode {
    env: Envelope,
    params: EnvelopeParameters,
    gate: ParamTimeline,
    velocity: f32,
}

impl EnvNode {
    pub fn new(shape: &AmplitudeShape) -> Self {
        Self {
            env: Envelope::new(),
            params: shape.params,
            gate: shape.gate(),
            velocity: shape.velocity,
        }
    }

    #[inline]
    fn next(&mut self, time: f64, sample_rate: f32) -> f32 {
        let gate = self.gate.value_at(time);
        self.velocity * self.env.next(gate, &self.params, sample_rate)
    }
}

#[derive(Debug, Clone)]
pub enum GainStage {
    Processor(EnvNode),
    Automation(ParamTimeline),
    Fixed(f32),
}

impl GainStage {
    pub fn shaped(shape: &AmplitudeShape, mode: GainMode) -> Self {
        match mode {
            GainMode::Processor => GainStage::Processor(EnvNode::new(shape)),
            GainMode::Automation => GainStage::Automation(shape.automation()),
        }
    }

    pub fn fixed(gain: f32) -> Self {
        GainStage::Fixed(gain)
    }

    /// Gain for the frame at context time `time`.
    ///
    /// The processor variant is stateful: call once per frame, in order.
    #[inline]
    pub fn next(&mut self, time: f64, sample_rate: f32) -> f32 {
        match self {
            GainStage::Processor(node) => node.next(time, sample_rate),
            GainStage::Automation(param) => param.value_at(time),
            GainStage::Fixed(gain) => *gain,
        }
    }
}
