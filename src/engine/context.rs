use std::sync::{
    atomic::{AtomicU64, AtomicU8, Ordering},
    Arc,
};

use log::debug;
use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    engine::{host::RenderHost, renderer::Renderer, EngineConfig},
    error::{EngineError, Result},
    graph::{gain::GainMode, metronome::Metronome, GraphNode},
};

/*
Audio Context
=============

The control-side half of the rendering context. Construction splits the
context in two:

  AudioContext  (control domain)          Renderer  (rendering domain)
  ──────────────────────────────          ───────────────────────────
  Producer<Command>  ─── commands ──────→ Consumer<Command>
  Consumer<retired>  ←── finished graphs ─ Producer<retired>
  Arc<SharedClock>   ←── frames, state ──→ Arc<SharedClock>

Graphs are built on the control side and moved across; they come back
through the retire queue once they stop or are disconnected, so their memory
is released outside the render callback. Time only moves when the renderer
renders, and only while the context is Running.
*/

/// Identifies a node (voice graph or bus) inside one context.
pub type NodeId = u64;

/// Processor modules that can be loaded into the rendering domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorModule {
    /// The sample-accurate ADSR state machine.
    Envelope,
}

impl ProcessorModule {
    pub fn name(self) -> &'static str {
        match self {
            ProcessorModule::Envelope => "adsr-envelope",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Suspended,
    Running,
    Closed,
}

impl ContextState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ContextState::Running,
            2 => ContextState::Closed,
            _ => ContextState::Suspended,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ContextState::Suspended => 0,
            ContextState::Running => 1,
            ContextState::Closed => 2,
        }
    }
}

/// Frame counter and run state shared by both halves of a context.
pub(crate) struct SharedClock {
    frames: AtomicU64,
    state: AtomicU8,
    sample_rate: f32,
}

impl SharedClock {
    fn new(sample_rate: f32) -> Self {
        Self {
            frames: AtomicU64::new(0),
            state: AtomicU8::new(ContextState::Suspended.as_u8()),
            sample_rate,
        }
    }

    #[inline]
    pub(crate) fn seconds(&self) -> f64 {
        self.frames.load(Ordering::Acquire) as f64 / self.sample_rate as f64
    }

    #[inline]
    pub(crate) fn advance(&self, frames: usize) {
        self.frames.fetch_add(frames as u64, Ordering::AcqRel);
    }

    #[inline]
    pub(crate) fn state(&self) -> ContextState {
        ContextState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: ContextState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }
}

/// Messages from the control domain to the renderer.
pub(crate) enum Command {
    ConnectBus {
        bus: NodeId,
        gain: f32,
    },
    DisconnectBus {
        bus: NodeId,
    },
    Connect {
        id: NodeId,
        bus: NodeId,
        node: Box<dyn GraphNode>,
    },
    Disconnect {
        id: NodeId,
    },
    ConnectMetronome {
        bus: NodeId,
        metronome: Box<Metronome>,
    },
    MetronomePulse {
        at: f64,
    },
    Close,
}

/// The shared sink every voice and the metronome add into.
#[derive(Debug)]
pub struct OutputBus {
    id: NodeId,
    gain: f32,
}

impl OutputBus {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }
}

pub struct AudioContext {
    sample_rate: f32,
    clock: Arc<SharedClock>,
    commands: Producer<Command>,
    retired: Consumer<Box<dyn GraphNode>>,
    next_id: NodeId,
    modules_enabled: bool,
    envelope_loaded: bool,
}

impl AudioContext {
    /// Build a suspended context and the renderer that belongs to it.
    pub fn new(config: &EngineConfig) -> (Self, Renderer) {
        let sample_rate = config.sample_rate;
        let queue_size = config.command_queue_size.max(16);
        let max_nodes = config.max_voices.max(1);

        let clock = Arc::new(SharedClock::new(sample_rate));
        let (command_tx, command_rx) = RingBuffer::<Command>::new(queue_size);
        let (retire_tx, retire_rx) = RingBuffer::<Box<dyn GraphNode>>::new(queue_size);

        let context = Self {
            sample_rate,
            clock: Arc::clone(&clock),
            commands: command_tx,
            retired: retire_rx,
            next_id: 1,
            modules_enabled: config.envelope_processor,
            envelope_loaded: false,
        };
        let renderer = Renderer::new(sample_rate, clock, command_rx, retire_tx, max_nodes);

        (context, renderer)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Context time in seconds: frames rendered so far over the sample rate.
    pub fn current_time(&self) -> f64 {
        self.clock.seconds()
    }

    pub fn state(&self) -> ContextState {
        self.clock.state()
    }

    pub fn resume(&mut self, host: &mut dyn RenderHost) -> Result<()> {
        match self.state() {
            ContextState::Closed => Err(EngineError::ContextClosed),
            ContextState::Running => Ok(()),
            ContextState::Suspended => {
                host.resume()?;
                self.clock.set_state(ContextState::Running);
                Ok(())
            }
        }
    }

    /// Load a processor module into the rendering domain.
    pub fn add_module(&mut self, host: &mut dyn RenderHost, module: ProcessorModule) -> Result<()> {
        if self.state() == ContextState::Closed {
            return Err(EngineError::ContextClosed);
        }
        if !self.modules_enabled {
            return Err(EngineError::ModuleUnavailable(module.name()));
        }
        host.load_module(module)?;
        match module {
            ProcessorModule::Envelope => self.envelope_loaded = true,
        }
        Ok(())
    }

    pub fn has_module(&self, module: ProcessorModule) -> bool {
        match module {
            ProcessorModule::Envelope => self.envelope_loaded,
        }
    }

    /// Gain driver new voices should build, given the loaded modules.
    pub fn gain_mode(&self) -> GainMode {
        if self.envelope_loaded {
            GainMode::Processor
        } else {
            GainMode::Automation
        }
    }

    pub fn create_output_bus(&mut self, gain: f32) -> Result<OutputBus> {
        let id = self.allocate_id();
        self.send(Command::ConnectBus { bus: id, gain })?;
        Ok(OutputBus { id, gain })
    }

    pub fn disconnect_bus(&mut self, bus: &OutputBus) -> Result<()> {
        self.send(Command::DisconnectBus { bus: bus.id })
    }

    /// Move a graph into the rendering domain, summed onto `bus`.
    pub fn connect(&mut self, bus: &OutputBus, node: Box<dyn GraphNode>) -> Result<NodeId> {
        let id = self.allocate_id();
        self.send(Command::Connect {
            id,
            bus: bus.id,
            node,
        })?;
        Ok(id)
    }

    pub fn disconnect(&mut self, id: NodeId) -> Result<()> {
        self.send(Command::Disconnect { id })
    }

    pub fn connect_metronome(&mut self, bus: &OutputBus, frequency: f32) -> Result<()> {
        self.send(Command::ConnectMetronome {
            bus: bus.id,
            metronome: Box::new(Metronome::new(frequency)),
        })
    }

    /// Schedule a metronome pulse at absolute context time `at`.
    pub fn schedule_metronome_pulse(&mut self, at: f64) -> Result<()> {
        self.send(Command::MetronomePulse { at })
    }

    /// Free graphs the renderer has finished with. Returns how many.
    pub fn collect_garbage(&mut self) -> usize {
        let mut freed = 0;
        while let Ok(node) = self.retired.pop() {
            drop(node);
            freed += 1;
        }
        freed
    }

    /// Tear down the rendering side. Further sends fail with `ContextClosed`.
    pub fn close(&mut self) -> Result<()> {
        if self.state() == ContextState::Closed {
            return Ok(());
        }
        let sent = self
            .commands
            .push(Command::Close)
            .map_err(|_| EngineError::QueueFull);
        self.clock.set_state(ContextState::Closed);
        sent
    }

    fn allocate_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn send(&mut self, command: Command) -> Result<()> {
        if self.state() == ContextState::Closed {
            return Err(EngineError::ContextClosed);
        }
        self.commands.push(command).map_err(|_| {
            debug!("render command queue full, dropping command");
            EngineError::QueueFull
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::host::ManualHost;

    #[test]
    fn starts_suspended_and_resumes() {
        let (mut ctx, renderer) = AudioContext::new(&EngineConfig::default());
        let mut host = ManualHost::new();
        host.attach(renderer).unwrap();

        assert_eq!(ctx.state(), ContextState::Suspended);
        ctx.resume(&mut host).unwrap();
        assert_eq!(ctx.state(), ContextState::Running);
    }

    #[test]
    fn time_only_moves_while_running() {
        let (mut ctx, renderer) = AudioContext::new(&EngineConfig::default());
        let mut host = ManualHost::new();
        host.attach(renderer).unwrap();

        host.render_frames(480);
        assert_eq!(ctx.current_time(), 0.0);

        ctx.resume(&mut host).unwrap();
        host.render_frames(480);
        assert!((ctx.current_time() - 0.01).abs() < 1e-9);
    }

    #[test]
    fn envelope_module_selects_gain_mode() {
        let (mut ctx, _renderer) = AudioContext::new(&EngineConfig::default());
        let mut host = ManualHost::new();
        assert_eq!(ctx.gain_mode(), GainMode::Automation);

        ctx.add_module(&mut host, ProcessorModule::Envelope).unwrap();
        assert!(ctx.has_module(ProcessorModule::Envelope));
        assert_eq!(ctx.gain_mode(), GainMode::Processor);
    }

    #[test]
    fn disabled_modules_fail_to_load() {
        let config = EngineConfig::default().with_envelope_processor(false);
        let (mut ctx, _renderer) = AudioContext::new(&config);
        let mut host = ManualHost::new();

        let err = ctx.add_module(&mut host, ProcessorModule::Envelope).unwrap_err();
        assert!(matches!(err, EngineError::ModuleUnavailable("adsr-envelope")));
        assert_eq!(ctx.gain_mode(), GainMode::Automation);
    }

    #[test]
    fn closed_context_rejects_commands() {
        let (mut ctx, _renderer) = AudioContext::new(&EngineConfig::default());
        ctx.close().unwrap();

        assert!(matches!(
            ctx.create_output_bus(1.0),
            Err(EngineError::ContextClosed)
        ));
        // Closing twice is fine.
        assert!(ctx.close().is_ok());
    }

    #[test]
    fn full_queue_reports_queue_full() {
        let config = EngineConfig::default().with_command_queue_size(16);
        let (mut ctx, _renderer) = AudioContext::new(&config);

        for _ in 0..16 {
            ctx.schedule_metronome_pulse(1.0).unwrap();
        }
        assert!(matches!(
            ctx.schedule_metronome_pulse(1.0),
            Err(EngineError::QueueFull)
        ));
    }
}
