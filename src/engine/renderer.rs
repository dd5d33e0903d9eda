use std::sync::Arc;

use rtrb::{Consumer, Producer};

use crate::{
    engine::context::{Command, ContextState, NodeId, SharedClock},
    graph::{metronome::Metronome, GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

struct Bus {
    id: NodeId,
    gain: f32,
}

struct ActiveNode {
    id: NodeId,
    node: Box<dyn GraphNode>,
}

/// The rendering-domain half of an [`AudioContext`](super::AudioContext).
///
/// Owned by a render host and driven from its callback. Never allocates,
/// locks or logs once constructed: connected graphs live in a list
/// preallocated to the voice capacity, and anything it lets go of is handed
/// back through the retire queue.
pub struct Renderer {
    sample_rate: f32,
    clock: Arc<SharedClock>,
    commands: Consumer<Command>,
    retired: Producer<Box<dyn GraphNode>>,
    bus: Option<Bus>,
    nodes: Vec<ActiveNode>,
    max_nodes: usize,
    metronome: Option<Box<Metronome>>,
    mix: Vec<f32>,
    scratch: Vec<f32>,
}

impl Renderer {
    pub(crate) fn new(
        sample_rate: f32,
        clock: Arc<SharedClock>,
        commands: Consumer<Command>,
        retired: Producer<Box<dyn GraphNode>>,
        max_nodes: usize,
    ) -> Self {
        Self {
            sample_rate,
            clock,
            commands,
            retired,
            bus: None,
            nodes: Vec::with_capacity(max_nodes),
            max_nodes,
            metronome: None,
            mix: vec![0.0; MAX_BLOCK_SIZE],
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Graphs currently connected to the bus.
    pub fn active_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Render mono output. Silent, with the clock held, unless the context
    /// is running.
    pub fn render(&mut self, out: &mut [f32]) {
        self.process_commands();
        if self.clock.state() != ContextState::Running {
            out.fill(0.0);
            return;
        }

        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let frames = chunk.len();
            self.render_chunk(frames);
            chunk.copy_from_slice(&self.mix[..frames]);
        }
    }

    /// Render into an interleaved device buffer, copying mono to every channel.
    pub fn render_interleaved(&mut self, data: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        self.process_commands();
        if self.clock.state() != ContextState::Running {
            data.fill(0.0);
            return;
        }

        for chunk in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
            let frames = chunk.len() / channels;
            self.render_chunk(frames);
            for (frame, &sample) in chunk.chunks_mut(channels).zip(&self.mix[..frames]) {
                frame.fill(sample);
            }
        }
    }

    fn render_chunk(&mut self, frames: usize) {
        let ctx = RenderCtx::new(self.sample_rate, self.clock.seconds());
        let mix = &mut self.mix[..frames];
        let scratch = &mut self.scratch[..frames];
        mix.fill(0.0);

        for active in self.nodes.iter_mut() {
            active.node.render_block(scratch, &ctx);
            for (m, s) in mix.iter_mut().zip(scratch.iter()) {
                *m += s;
            }
        }

        if let Some(metronome) = self.metronome.as_mut() {
            metronome.render_block(scratch, &ctx);
            for (m, s) in mix.iter_mut().zip(scratch.iter()) {
                *m += s;
            }
        }

        let gain = self.bus.as_ref().map_or(0.0, |bus| bus.gain);
        for m in mix.iter_mut() {
            *m *= gain;
        }

        self.clock.advance(frames);
        self.retire_finished();
    }

    fn process_commands(&mut self) {
        while let Ok(command) = self.commands.pop() {
            match command {
                Command::ConnectBus { bus, gain } => {
                    self.bus = Some(Bus { id: bus, gain });
                }
                Command::DisconnectBus { bus } => {
                    if self.is_bus(bus) {
                        self.bus = None;
                        self.retire_all();
                    }
                }
                Command::Connect { id, bus, node } => {
                    if !self.is_bus(bus) {
                        self.retire(node);
                    } else {
                        if self.nodes.len() >= self.max_nodes {
                            self.retire_oldest();
                        }
                        self.nodes.push(ActiveNode { id, node });
                    }
                }
                Command::Disconnect { id } => {
                    if let Some(index) = self.nodes.iter().position(|n| n.id == id) {
                        let active = self.nodes.swap_remove(index);
                        self.retire(active.node);
                    }
                }
                Command::ConnectMetronome { bus, metronome } => {
                    if self.is_bus(bus) {
                        if let Some(previous) = self.metronome.replace(metronome) {
                            self.retire(previous);
                        }
                    } else {
                        self.retire(metronome);
                    }
                }
                Command::MetronomePulse { at } => {
                    if let Some(metronome) = self.metronome.as_mut() {
                        metronome.schedule_pulse(at, self.sample_rate);
                    }
                }
                Command::Close => {
                    self.bus = None;
                    self.retire_all();
                }
            }
        }
    }

    fn is_bus(&self, id: NodeId) -> bool {
        self.bus.as_ref().is_some_and(|bus| bus.id == id)
    }

    fn retire_finished(&mut self) {
        let mut index = 0;
        while index < self.nodes.len() {
            if self.nodes[index].node.is_active() {
                index += 1;
            } else {
                let active = self.nodes.swap_remove(index);
                self.retire(active.node);
            }
        }
    }

    /// Make room for a new graph. Ids grow monotonically, so the smallest
    /// one was connected first.
    fn retire_oldest(&mut self) {
        let oldest = self
            .nodes
            .iter()
            .enumerate()
            .min_by_key(|(_, active)| active.id)
            .map(|(index, _)| index);
        if let Some(index) = oldest {
            let active = self.nodes.swap_remove(index);
            self.retire(active.node);
        }
    }

    fn retire_all(&mut self) {
        while let Some(active) = self.nodes.pop() {
            self.retire(active.node);
        }
        if let Some(metronome) = self.metronome.take() {
            self.retire(metronome);
        }
    }

    /// Hand a graph back to the control side. If the queue is full the
    /// graph is dropped here instead.
    fn retire(&mut self, node: Box<dyn GraphNode>) {
        let _ = self.retired.push(node);
    }
}
