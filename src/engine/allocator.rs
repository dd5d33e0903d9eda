use std::collections::VecDeque;

use log::debug;

use crate::{
    engine::{AudioContext, OutputBus, VoiceHandle},
    io::{Instrument, NoteOn, PerformanceEvent},
    voices::{FmVoice, SamplerVoice, SubtractiveVoice, SynthVoice},
};

/*
Voice Pool
==========

A bounded FIFO of live voice handles:

  front (oldest)                          back (newest)
  ┌──────┬──────┬──────┬─── ─ ─ ──┬──────┐
  │  h0  │  h1  │  h2  │          │  hN  │   len ≤ capacity
  └──────┴──────┴──────┴─── ─ ─ ──┴──────┘
     ↑ stolen first                   ↑ pushed by note_on

A note that would push the pool past capacity first releases handles from the
front until there is room. Handles stay in the queue until they are stolen,
even after their graph finished on its own, so eviction order is pure
insertion order. Teardown errors from stolen voices are ignored.
*/

pub struct VoicePool {
    capacity: usize,
    active: VecDeque<VoiceHandle>,
    subtractive: SubtractiveVoice,
    fm: FmVoice,
    sampler: SamplerVoice,
}

impl VoicePool {
    /// A pool holding at most `capacity` voices (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            active: VecDeque::with_capacity(capacity),
            subtractive: SubtractiveVoice,
            fm: FmVoice,
            sampler: SamplerVoice::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Live handles, oldest first.
    pub fn handles(&self) -> impl Iterator<Item = &VoiceHandle> {
        self.active.iter()
    }

    pub fn sampler(&self) -> &SamplerVoice {
        &self.sampler
    }

    pub fn sampler_mut(&mut self) -> &mut SamplerVoice {
        &mut self.sampler
    }

    /// Dispatch one event with its resolved absolute start time.
    ///
    /// Only note-ons make sound. Note-offs and parameter modulation are
    /// accepted and ignored: note length is fixed by `duration`.
    pub fn handle_event(
        &mut self,
        ctx: &mut AudioContext,
        bus: &OutputBus,
        event: &PerformanceEvent,
        when: f64,
    ) {
        match event {
            PerformanceEvent::NoteOn(note) => self.note_on(ctx, bus, note, when),
            PerformanceEvent::NoteOff(_) | PerformanceEvent::ParamMod(_) => {}
        }
    }

    pub fn note_on(&mut self, ctx: &mut AudioContext, bus: &OutputBus, note: &NoteOn, when: f64) {
        while self.active.len() >= self.capacity {
            let Some(mut stolen) = self.active.pop_front() else {
                break;
            };
            if let Err(err) = stolen.release(ctx) {
                debug!(
                    "ignoring teardown failure for stolen {} voice: {err}",
                    stolen.instrument().tag()
                );
            }
        }

        let handle = self.voice_for(note.instrument).trigger(ctx, bus, note, when);
        self.active.push_back(handle);
    }

    /// Release every live voice.
    pub fn release_all(&mut self, ctx: &mut AudioContext) {
        for mut handle in self.active.drain(..) {
            if let Err(err) = handle.release(ctx) {
                debug!("ignoring teardown failure for {} voice: {err}", handle.instrument().tag());
            }
        }
    }

    fn voice_for(&self, instrument: Instrument) -> &dyn SynthVoice {
        match instrument {
            Instrument::Subtractive => &self.subtractive,
            Instrument::Fm => &self.fm,
            Instrument::Sampler => &self.sampler,
        }
    }
}
