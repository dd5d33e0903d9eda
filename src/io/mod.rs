// Purpose - external interfaces, format conversions

pub mod decode;
pub mod event;

pub use decode::{decode_wav, SampleBuffer};
pub use event::{Instrument, NoteOff, NoteOn, ParamMod, ParamTarget, PerformanceEvent};
