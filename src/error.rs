/// Result alias carrying [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures surfaced by the context, render hosts and sample loading.
///
/// The scheduler itself never hands these to callers: startup and teardown
/// failures degrade the engine quietly and are only logged.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The rendering context was closed by `dispose()`.
    #[error("audio context is closed")]
    ContextClosed,
    /// An operation needed a running context before `ensure_started()`.
    #[error("audio context has not been started")]
    NotStarted,
    /// The control-to-render command queue had no free slot.
    #[error("render command queue is full")]
    QueueFull,
    /// The render host refused an operation (device missing, stream error).
    #[error("render host error: {0}")]
    Host(String),
    /// A processor module could not be loaded into the rendering domain.
    #[error("processor module `{0}` is unavailable")]
    ModuleUnavailable(&'static str),
    /// The sample bytes were not decodable audio.
    #[error("failed to decode audio: {0}")]
    Decode(#[from] hound::Error),
    /// The sample rate converter rejected its setup.
    #[error("failed to set up resampler: {0}")]
    ResamplerSetup(#[from] rubato::ResamplerConstructionError),
    /// Sample rate conversion failed.
    #[error("failed to resample audio: {0}")]
    Resample(#[from] rubato::ResampleError),
    /// The decoded audio contained no frames.
    #[error("decoded audio contains no frames")]
    EmptyAudio,
}

impl EngineError {
    /// Wrap any host-side failure message.
    pub fn host<T: Into<String>>(msg: T) -> Self {
        Self::Host(msg.into())
    }
}
