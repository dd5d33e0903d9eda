use crate::graph::{
    gain::GainStage,
    node::{GraphNode, RenderCtx},
};

/// A per-sample signal generator at the head of a voice graph.
///
/// Sources only advance while their voice is inside its start/stop window.
pub trait Source: Send {
    fn next_sample(&mut self, sample_rate: f32) -> f32;
}

/// One note's graph: a source feeding a gain stage, gated by an absolute
/// start time and a hard stop time.
///
/// Before `start` the voice outputs silence without advancing its source;
/// from `stop` on it reports itself inactive and the renderer retires it.
pub struct VoiceGraph<S: Source> {
    source: S,
    gain: GainStage,
    start: f64,
    stop: f64,
    finished: bool,
}

impl<S: Source> VoiceGraph<S> {
    pub fn new(source: S, gain: GainStage, start: f64, stop: f64) -> Self {
        Self {
            source,
            gain,
            start,
            stop: stop.max(start),
            finished: false,
        }
    }

    pub fn start_time(&self) -> f64 {
        self.start
    }

    pub fn stop_time(&self) -> f64 {
        self.stop
    }
}

impl<S: Source> GraphNode for VoiceGraph<S> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for (i, sample) in out.iter_mut().enumerate() {
            let t = ctx.frame_time(i);
            if t < self.start {
                *sample = 0.0;
                continue;
            }
            if t >= self.stop {
                self.finished = true;
                *sample = 0.0;
                continue;
            }

            let gain = self.gain.next(t, ctx.sample_rate);
            *sample = self.source.next_sample(ctx.sample_rate) * gain;
        }
    }

    fn is_active(&self) -> bool {
        !self.finished
    }
}
