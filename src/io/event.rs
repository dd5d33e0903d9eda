#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which synthesis voice plays a note.
///
/// Parsing is lenient: any tag that isn't `fm` or `sampler` selects the
/// subtractive voice.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "String"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Instrument {
    #[default]
    Subtractive,
    Fm,
    Sampler,
}

impl Instrument {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "fm" => Instrument::Fm,
            "sampler" => Instrument::Sampler,
            _ => Instrument::Subtractive,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Instrument::Subtractive => "subtractive",
            Instrument::Fm => "fm",
            Instrument::Sampler => "sampler",
        }
    }
}

impl From<&str> for Instrument {
    fn from(tag: &str) -> Self {
        Instrument::from_tag(tag)
    }
}

impl From<String> for Instrument {
    fn from(tag: String) -> Self {
        Instrument::from_tag(&tag)
    }
}

impl From<Instrument> for String {
    fn from(instrument: Instrument) -> Self {
        instrument.tag().to_owned()
    }
}

/// Modulation destinations a `ParamMod` can address.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamTarget {
    Vibrato,
    FmDepth,
    Sustain,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteOn {
    /// Seconds from dispatch.
    pub time: f64,
    pub instrument: Instrument,
    /// MIDI-style note number; fractional values detune.
    pub pitch: f32,
    /// 0.0 - 1.0
    pub velocity: f32,
    /// Seconds the note is held before release.
    pub duration: f64,
}

impl NoteOn {
    pub fn new(instrument: Instrument, pitch: f32, velocity: f32, duration: f64) -> Self {
        Self {
            time: 0.0,
            instrument,
            pitch,
            velocity,
            duration,
        }
    }

    pub fn at(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    /// Velocity clamped to [0, 1].
    pub fn gain(&self) -> f32 {
        self.velocity.clamp(0.0, 1.0)
    }

    /// Duration with negative values treated as zero.
    pub fn hold(&self) -> f64 {
        self.duration.max(0.0)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteOff {
    pub time: f64,
    pub pitch: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamMod {
    pub time: f64,
    pub target: ParamTarget,
    /// 0.0 - 1.0
    pub value: f32,
}

/// A discrete instruction from the mapping layer.
///
/// `time` is relative to the moment the batch is handed to the scheduler.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "camelCase"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PerformanceEvent {
    NoteOn(NoteOn),
    NoteOff(NoteOff),
    ParamMod(ParamMod),
}

impl PerformanceEvent {
    pub fn time(&self) -> f64 {
        match self {
            PerformanceEvent::NoteOn(e) => e.time,
            PerformanceEvent::NoteOff(e) => e.time,
            PerformanceEvent::ParamMod(e) => e.time,
        }
    }
}

impl From<NoteOn> for PerformanceEvent {
    fn from(event: NoteOn) -> Self {
        PerformanceEvent::NoteOn(event)
    }
}

impl From<NoteOff> for PerformanceEvent {
    fn from(event: NoteOff) -> Self {
        PerformanceEvent::NoteOff(event)
    }
}

impl From<ParamMod> for PerformanceEvent {
    fn from(event: ParamMod) -> Self {
        PerformanceEvent::ParamMod(event)
    }
}
