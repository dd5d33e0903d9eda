//! The synthesis voices a note can be played on.
//!
//! Each voice turns one `NoteOn` into a graph, moves it into the rendering
//! domain, and returns a handle the pool can release later. Voices build a
//! graph per note; nothing is reused between notes.
//!
//! # Example
//!
//! ```ignore
//! use soundpad_dsp::{io::{Instrument, NoteOn}, voices::{FmVoice, SynthVoice}};
//!
//! let note = NoteOn::new(Instrument::Fm, 64.0, 0.8, 0.4);
//! let handle = FmVoice.trigger(&mut ctx, &bus, &note, ctx.current_time() + 0.05);
//! ```

use log::debug;

use crate::{
    engine::{AudioContext, OutputBus, VoiceHandle},
    graph::GraphNode,
    io::{Instrument, NoteOn},
};

mod fm;
mod sampler;
mod subtractive;

pub use fm::{FmSource, FmVoice};
pub use sampler::{SampleSource, SamplerVoice};
pub use subtractive::{SubtractiveSource, SubtractiveVoice};

/// Extra time after the release starts before a voice's graph is stopped.
pub const STOP_TAIL: f64 = 0.05;

/// A way of turning a note into sound.
pub trait SynthVoice {
    /// Build the note's graph starting at absolute context time `when` and
    /// connect it to `bus`.
    ///
    /// Never fails: if the graph cannot be connected the returned handle is
    /// detached and releasing it does nothing.
    fn trigger(&self, ctx: &mut AudioContext, bus: &OutputBus, note: &NoteOn, when: f64)
        -> VoiceHandle;
}

/// Release time for enveloped voices: 30% of the held duration, at least 20ms.
pub fn release_time(duration: f64) -> f64 {
    (duration * 0.3).max(0.02)
}

pub(crate) fn connect_voice(
    ctx: &mut AudioContext,
    bus: &OutputBus,
    instrument: Instrument,
    graph: Box<dyn GraphNode>,
) -> VoiceHandle {
    match ctx.connect(bus, graph) {
        Ok(id) => VoiceHandle::new(Some(id), instrument),
        Err(err) => {
            debug!("{} voice not connected: {err}", instrument.tag());
            VoiceHandle::detached(instrument)
        }
    }
}
