pub mod dsp; // Sample-level building blocks
pub mod engine; // Context, renderer, voice pool, scheduler
pub mod error;
pub mod graph; // Nodes that run in the rendering domain
pub mod io; // Performance events, sample decoding
pub mod sequencing; // Tempo
pub mod voices;

pub use engine::{EngineConfig, ManualHost, RenderHost, Scheduler};
pub use error::{EngineError, Result};
pub use io::{Instrument, NoteOff, NoteOn, ParamMod, ParamTarget, PerformanceEvent};

pub const MAX_BLOCK_SIZE: usize = 2048;
