/*
Parameter Automation
====================

A `ParamTimeline` is a list of value changes pinned to absolute context
time. The control domain builds it once (when a voice is triggered) and the
rendering domain only ever evaluates it, so evaluation is a pure read.

Event kinds
-----------

  SetValue      jump to `value` at `time`
  LinearRamp    straight line from the previous event's value and time,
                arriving at `value` exactly at `time`
  SetTarget     from `time` on, approach `target` exponentially:
                v(t) = target + (v0 - target) * e^(-(t - time) / tau)

Events are kept sorted by their time (the END time for ramps, the START
time for the others). Evaluating at `t` walks the list, carrying the
segment in effect, until it finds the first event that lies after `t`.

Example: the fallback amplitude envelope of a note at `when`

  set_value(0.0, when)
  linear_ramp(velocity, when + a)
  linear_ramp(sustain, when + a + d)
  set_target(0.0, when + duration, r)

      v ┐  ╱╲
        │ ╱  ╲_______
      s │╱           ╲_
      0 └──────────────‾‾‾──→
       when         when+dur
*/

/// Enough for an envelope plus a few gate edges.
pub const MAX_PARAM_EVENTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamEvent {
    SetValue { value: f32, time: f64 },
    LinearRamp { value: f32, time: f64 },
    SetTarget { target: f32, time: f64, tau: f64 },
}

impl ParamEvent {
    pub fn time(&self) -> f64 {
        match *self {
            ParamEvent::SetValue { time, .. }
            | ParamEvent::LinearRamp { time, .. }
            | ParamEvent::SetTarget { time, .. } => time,
        }
    }
}

/// The curve in effect between two events.
#[derive(Debug, Clone, Copy)]
enum Segment {
    Constant(f32),
    Approach {
        start: f64,
        from: f32,
        target: f32,
        tau: f64,
    },
}

impl Segment {
    #[inline]
    fn value_at(&self, t: f64) -> f32 {
        match *self {
            Segment::Constant(v) => v,
            Segment::Approach {
                start,
                from,
                target,
                tau,
            } => {
                if tau <= 0.0 {
                    return target;
                }
                let decay = (-(t - start) / tau).exp() as f32;
                target + (from - target) * decay
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParamTimeline {
    default: f32,
    events: Vec<ParamEvent>,
}

impl ParamTimeline {
    pub fn new(default: f32) -> Self {
        Self {
            default,
            events: Vec::with_capacity(MAX_PARAM_EVENTS),
        }
    }

    pub fn set_value_at_time(&mut self, value: f32, time: f64) -> &mut Self {
        self.insert(ParamEvent::SetValue { value, time })
    }

    pub fn linear_ramp_to_value_at_time(&mut self, value: f32, time: f64) -> &mut Self {
        self.insert(ParamEvent::LinearRamp { value, time })
    }

    /// `tau` is the time constant in seconds.
    pub fn set_target_at_time(&mut self, target: f32, time: f64, tau: f64) -> &mut Self {
        self.insert(ParamEvent::SetTarget { target, time, tau })
    }

    /// Drop every event at or after `time`.
    pub fn cancel_scheduled_values(&mut self, time: f64) -> &mut Self {
        self.events.retain(|e| e.time() < time);
        self
    }

    pub fn events(&self) -> &[ParamEvent] {
        &self.events
    }

    /// Value of the parameter at absolute time `t`.
    pub fn value_at(&self, t: f64) -> f32 {
        let mut segment = Segment::Constant(self.default);
        let mut prev_time = f64::NEG_INFINITY;

        for event in &self.events {
            match *event {
                ParamEvent::LinearRamp { value, time } => {
                    if t < time {
                        if !prev_time.is_finite() || time <= prev_time {
                            return segment.value_at(t);
                        }
                        let from = segment.value_at(prev_time);
                        let progress = ((t - prev_time) / (time - prev_time)) as f32;
                        return from + (value - from) * progress;
                    }
                    segment = Segment::Constant(value);
                    prev_time = time;
                }
                ParamEvent::SetValue { value, time } => {
                    if t < time {
                        return segment.value_at(t);
                    }
                    segment = Segment::Constant(value);
                    prev_time = time;
                }
                ParamEvent::SetTarget { target, time, tau } => {
                    if t < time {
                        return segment.value_at(t);
                    }
                    segment = Segment::Approach {
                        start: time,
                        from: segment.value_at(time),
                        target,
                        tau,
                    };
                    prev_time = time;
                }
            }
        }

        segment.value_at(t)
    }

    fn insert(&mut self, event: ParamEvent) -> &mut Self {
        // Equal times keep insertion order.
        let at = self
            .events
            .iter()
            .position(|e| e.time() > event.time())
            .unwrap_or(self.events.len());
        self.events.insert(at, event);
        self
    }
}
