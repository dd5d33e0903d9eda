pub mod tempo;

pub use tempo::TempoClock;
