use crate::{
    engine::context::{AudioContext, NodeId},
    error::Result,
    io::Instrument,
};

/// Control-side reference to a triggered voice.
///
/// Releasing disconnects the voice's graph from the bus immediately. A voice
/// whose graph already stopped on its own may be released too: the renderer
/// ignores disconnects for graphs it has retired.
#[derive(Debug)]
pub struct VoiceHandle {
    node: Option<NodeId>,
    instrument: Instrument,
    released: bool,
}

impl VoiceHandle {
    pub(crate) fn new(node: Option<NodeId>, instrument: Instrument) -> Self {
        Self {
            node,
            instrument,
            released: false,
        }
    }

    /// A handle whose graph never reached the renderer.
    pub(crate) fn detached(instrument: Instrument) -> Self {
        Self::new(None, instrument)
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Tear the voice down. Calling this more than once is a no-op.
    pub fn release(&mut self, ctx: &mut AudioContext) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        match self.node.take() {
            Some(id) => ctx.disconnect(id),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{engine::EngineConfig, error::EngineError};

    #[test]
    fn release_is_idempotent() {
        let (mut ctx, _renderer) = AudioContext::new(&EngineConfig::default());
        let mut handle = VoiceHandle::new(Some(7), Instrument::Fm);

        handle.release(&mut ctx).unwrap();
        handle.release(&mut ctx).unwrap();

        assert!(handle.is_released());
        assert_eq!(handle.node(), None);
    }

    #[test]
    fn release_after_close_reports_once() {
        let (mut ctx, _renderer) = AudioContext::new(&EngineConfig::default());
        ctx.close().unwrap();
        let mut handle = VoiceHandle::new(Some(3), Instrument::Subtractive);

        assert!(matches!(handle.release(&mut ctx), Err(EngineError::ContextClosed)));
        assert!(handle.release(&mut ctx).is_ok());
    }

    #[test]
    fn detached_handles_release_cleanly() {
        let (mut ctx, _renderer) = AudioContext::new(&EngineConfig::default());
        let mut handle = VoiceHandle::detached(Instrument::Sampler);
        assert!(handle.release(&mut ctx).is_ok());
    }
}
