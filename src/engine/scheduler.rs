use log::{debug, info, warn};

use crate::{
    engine::{
        allocator::VoicePool,
        context::{AudioContext, ContextState, OutputBus, ProcessorModule},
        host::RenderHost,
        EngineConfig,
    },
    error::{EngineError, Result},
    io::PerformanceEvent,
    sequencing::TempoClock,
};

/*
Look-Ahead Scheduler
====================

The entry point for the mapping layer. Every `schedule` call resolves event
offsets against the context clock:

  now                    now + lookahead
   │◄──────── horizon ─────────►│
   │   ●      ●          ●      │     ●   ← dropped, never re-queued
   │  when = now + max(0, time) │

Events inside the horizon go straight to the voice pool with their absolute
start time, so the renderer starts them sample-accurately regardless of when
the control side got around to scheduling them.

Startup is lazy and failure-tolerant. Nothing here returns an error to the
caller except sample loading: a refused resume is retried on the next
`ensure_started`, a missing envelope module degrades to automation, and
teardown never fails.
*/

pub struct Scheduler<H: RenderHost> {
    config: EngineConfig,
    host: H,
    tempo: TempoClock,
    context: Option<AudioContext>,
    bus: Option<OutputBus>,
    pool: Option<VoicePool>,
}

impl<H: RenderHost> Scheduler<H> {
    pub fn new(config: EngineConfig, host: H) -> Self {
        let tempo = TempoClock::new(config.bpm);
        Self {
            config,
            host,
            tempo,
            context: None,
            bus: None,
            pool: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Build the engine on first use and make sure the context is running.
    ///
    /// Safe to call as often as you like, e.g. on every user gesture.
    pub fn ensure_started(&mut self) {
        if self.context.is_none() {
            self.start();
        }

        let Some(ctx) = self.context.as_mut() else {
            return;
        };
        if ctx.state() != ContextState::Suspended {
            return;
        }
        match ctx.resume(&mut self.host) {
            Ok(()) => info!("audio context running at {} Hz", ctx.sample_rate()),
            Err(err) => debug!("resume refused, retrying on next start: {err}"),
        }
    }

    fn start(&mut self) {
        let (mut ctx, renderer) = AudioContext::new(&self.config);
        if let Err(err) = self.host.attach(renderer) {
            warn!("render host refused the renderer: {err}");
            return;
        }

        let bus = match ctx.create_output_bus(self.config.output_gain) {
            Ok(bus) => bus,
            Err(err) => {
                warn!("could not create output bus: {err}");
                return;
            }
        };

        match ctx.add_module(&mut self.host, ProcessorModule::Envelope) {
            Ok(()) => debug!("envelope processor loaded"),
            Err(err) => info!("envelope processor unavailable, using automation: {err}"),
        }

        if let Err(err) = ctx.connect_metronome(&bus, self.config.metronome_frequency) {
            debug!("metronome not connected: {err}");
        }

        debug!(
            "engine started: {} voices, {}ms look-ahead",
            self.config.max_voices, self.config.lookahead_ms
        );
        self.pool = Some(VoicePool::new(self.config.max_voices));
        self.bus = Some(bus);
        self.context = Some(ctx);
    }

    /// Dispatch a batch of events. Does nothing until started.
    pub fn schedule(&mut self, events: &[PerformanceEvent]) {
        let (Some(ctx), Some(bus), Some(pool)) =
            (self.context.as_mut(), self.bus.as_ref(), self.pool.as_mut())
        else {
            return;
        };

        ctx.collect_garbage();
        let now = ctx.current_time();
        let lookahead_ms = self.config.lookahead_ms;

        for event in events {
            let when = now + event.time().max(0.0);
            if (when - now) * 1000.0 <= lookahead_ms {
                pool.handle_event(ctx, bus, event, when);
            } else {
                let late_ms = (when - now) * 1000.0 - lookahead_ms;
                debug!("dropping event {late_ms:.1}ms past the horizon");
            }
        }
    }

    /// Schedule a click on the next beat boundary and return its time.
    ///
    /// Ticking again before that beat arrives schedules the same boundary,
    /// which the metronome collapses into a single click.
    pub fn tick_metronome(&mut self) -> Option<f64> {
        let ctx = self.context.as_mut()?;
        let next = self.tempo.next_beat_after(ctx.current_time());
        if let Err(err) = ctx.schedule_metronome_pulse(next) {
            debug!("metronome pulse dropped: {err}");
        }
        Some(next)
    }

    /// Tear everything down. Safe to call repeatedly; the next
    /// `ensure_started` builds a fresh engine.
    pub fn dispose(&mut self) {
        let pool = self.pool.take();
        let Some(mut ctx) = self.context.take() else {
            return;
        };

        if let Some(mut pool) = pool {
            pool.release_all(&mut ctx);
        }

        if let Some(bus) = self.bus.take() {
            if let Err(err) = ctx.disconnect_bus(&bus) {
                debug!("ignoring bus disconnect failure: {err}");
            }
        }
        if let Err(err) = ctx.close() {
            debug!("ignoring context close failure: {err}");
        }
        if let Err(err) = self.host.close() {
            debug!("ignoring host close failure: {err}");
        }
        ctx.collect_garbage();
        info!("engine disposed");
    }

    /// Decode WAV bytes into the sampler voice.
    pub fn load_sample(&mut self, bytes: &[u8]) -> Result<()> {
        let (Some(ctx), Some(pool)) = (self.context.as_ref(), self.pool.as_mut()) else {
            return Err(EngineError::NotStarted);
        };
        pool.sampler_mut().load(bytes, ctx.sample_rate())?;
        if let Some(buffer) = pool.sampler().buffer() {
            info!("loaded sample: {} frames ({:.2}s)", buffer.frames(), buffer.duration());
        }
        Ok(())
    }

    pub fn tempo(&self) -> &TempoClock {
        &self.tempo
    }

    pub fn tempo_mut(&mut self) -> &mut TempoClock {
        &mut self.tempo
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        self.tempo.set_bpm(bpm);
    }

    pub fn is_started(&self) -> bool {
        self.context.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.context
            .as_ref()
            .is_some_and(|ctx| ctx.state() == ContextState::Running)
    }

    pub fn envelope_processor_loaded(&self) -> bool {
        self.context
            .as_ref()
            .is_some_and(|ctx| ctx.has_module(ProcessorModule::Envelope))
    }

    /// Live voice handles in the pool.
    pub fn active_voices(&self) -> usize {
        self.pool.as_ref().map_or(0, VoicePool::active_count)
    }

    /// Context time in seconds, or 0 before start.
    pub fn current_time(&self) -> f64 {
        self.context.as_ref().map_or(0.0, AudioContext::current_time)
    }
}

impl<H: RenderHost> Drop for Scheduler<H> {
    fn drop(&mut self) {
        self.dispose();
    }
}
