use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    engine::{context::ProcessorModule, renderer::Renderer},
    error::{EngineError, Result},
};

/// Whatever drives a [`Renderer`]: an audio device callback, an offline
/// bounce, or a test harness.
pub trait RenderHost {
    /// Take ownership of a freshly built renderer, replacing any previous one.
    fn attach(&mut self, renderer: Renderer) -> Result<()>;

    /// Start (or restart) pulling audio. May be refused, e.g. before the
    /// platform allows output.
    fn resume(&mut self) -> Result<()> {
        Ok(())
    }

    /// Make a processor module available to graphs in the rendering domain.
    fn load_module(&mut self, _module: ProcessorModule) -> Result<()> {
        Ok(())
    }

    /// Stop pulling audio and drop the renderer.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<H: RenderHost + ?Sized> RenderHost for Box<H> {
    fn attach(&mut self, renderer: Renderer) -> Result<()> {
        (**self).attach(renderer)
    }

    fn resume(&mut self) -> Result<()> {
        (**self).resume()
    }

    fn load_module(&mut self, module: ProcessorModule) -> Result<()> {
        (**self).load_module(module)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

#[derive(Default)]
struct ManualState {
    renderer: Option<Renderer>,
    refuse_modules: bool,
    failing_resumes: u32,
    resume_attempts: u32,
}

/// A host that renders only when asked to.
///
/// Cloning shares the same renderer slot, so one clone can be handed to the
/// scheduler while another pulls audio from it. Used for offline bounces
/// and tests.
#[derive(Clone, Default)]
pub struct ManualHost {
    state: Arc<Mutex<ManualState>>,
}

impl ManualHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse every processor module, forcing the automation fallback.
    pub fn without_modules(self) -> Self {
        self.lock().refuse_modules = true;
        self
    }

    /// Refuse the next `count` resume attempts.
    pub fn failing_resumes(self, count: u32) -> Self {
        self.lock().failing_resumes = count;
        self
    }

    pub fn is_attached(&self) -> bool {
        self.lock().renderer.is_some()
    }

    pub fn resume_attempts(&self) -> u32 {
        self.lock().resume_attempts
    }

    pub fn sample_rate(&self) -> Option<f32> {
        self.lock().renderer.as_ref().map(Renderer::sample_rate)
    }

    /// Render mono output. Silent when no renderer is attached.
    pub fn render(&self, out: &mut [f32]) {
        match self.lock().renderer.as_mut() {
            Some(renderer) => renderer.render(out),
            None => out.fill(0.0),
        }
    }

    /// Render `frames` frames and return them.
    pub fn render_frames(&self, frames: usize) -> Vec<f32> {
        let mut out = vec![0.0; frames];
        self.render(&mut out);
        out
    }

    /// Render `seconds` of output at the attached renderer's rate.
    pub fn render_seconds(&self, seconds: f64) -> Vec<f32> {
        let rate = self.sample_rate().unwrap_or(0.0) as f64;
        self.render_frames((seconds * rate).round() as usize)
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl RenderHost for ManualHost {
    fn attach(&mut self, renderer: Renderer) -> Result<()> {
        self.lock().renderer = Some(renderer);
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        let mut state = self.lock();
        state.resume_attempts += 1;
        if state.failing_resumes > 0 {
            state.failing_resumes -= 1;
            return Err(EngineError::host("output not allowed yet"));
        }
        Ok(())
    }

    fn load_module(&mut self, module: ProcessorModule) -> Result<()> {
        if self.lock().refuse_modules {
            return Err(EngineError::ModuleUnavailable(module.name()));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.lock().renderer = None;
        Ok(())
    }
}
