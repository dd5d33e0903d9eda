/// Lowest tempo the clock accepts.
pub const MIN_BPM: f64 = 20.0;
/// Highest tempo the clock accepts.
pub const MAX_BPM: f64 = 300.0;

/// Transport tempo, clamped to [`MIN_BPM`, `MAX_BPM`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoClock {
    bpm: f64,
}

impl TempoClock {
    pub fn new(bpm: f64) -> Self {
        Self { bpm: clamp_bpm(bpm) }
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        self.bpm = clamp_bpm(bpm);
    }

    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.bpm
    }

    /// First beat boundary strictly after `t`, counting beats from time zero.
    pub fn next_beat_after(&self, t: f64) -> f64 {
        let spb = self.seconds_per_beat();
        ((t / spb).floor() + 1.0) * spb
    }
}

impl Default for TempoClock {
    fn default() -> Self {
        Self::new(120.0)
    }
}

// NaN maps to the default tempo.
fn clamp_bpm(bpm: f64) -> f64 {
    if bpm.is_nan() {
        return 120.0;
    }
    bpm.clamp(MIN_BPM, MAX_BPM)
}
