/// Convert a MIDI-style note number to frequency in Hz.
/// A4 = 440 Hz = note 69. Fractional notes are allowed.
#[inline]
pub fn frequency(pitch: f32) -> f32 {
    440.0 * 2.0_f32.powf((pitch - 69.0) / 12.0)
}

/// Context passed to graph nodes during rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - time: Context time of the first frame in the block, in seconds
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub time: f64,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, time: f64) -> Self {
        Self { sample_rate, time }
    }

    /// Context time of frame `index` within the block.
    #[inline]
    pub fn frame_time(&self, index: usize) -> f64 {
        self.time + index as f64 / self.sample_rate as f64
    }

    /// Context time just past the last frame of a block of `frames`.
    #[inline]
    pub fn end_time(&self, frames: usize) -> f64 {
        self.frame_time(frames)
    }
}

/// Core trait for nodes living in the rendering domain
///
/// `render_block` overwrites `out` with this node's contribution; the
/// renderer sums contributions onto the output bus.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Check if this node can still produce sound
    ///
    /// The renderer retires nodes once this turns false.
    fn is_active(&self) -> bool {
        true
    }
}
