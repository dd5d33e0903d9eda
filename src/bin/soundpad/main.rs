//! soundpad - plays a short arpeggio with a metronome through the default
//! output device.
//!
//! Run with: cargo run --bin soundpad [-- path/to/sample.wav]

mod host;

use std::{
    thread,
    time::{Duration, Instant},
};

use color_eyre::eyre::{eyre, WrapErr};
use log::info;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use host::CpalHost;
use soundpad_dsp::{EngineConfig, Instrument, NoteOn, PerformanceEvent, Scheduler};

/// Seconds between control ticks, roughly an animation frame rate.
const TICK: f64 = 1.0 / 30.0;
const BARS: usize = 4;

struct Step {
    beat: f64,
    note: NoteOn,
}

fn arpeggio(seconds_per_beat: f64, with_sample: bool) -> Vec<Step> {
    let chords: [[f32; 3]; 4] = [
        [57.0, 60.0, 64.0],
        [53.0, 57.0, 60.0],
        [48.0, 52.0, 55.0],
        [55.0, 59.0, 62.0],
    ];
    let mut steps = Vec::new();

    for (bar, chord) in chords.iter().cycle().take(BARS).enumerate() {
        let start = (bar * 4) as f64;
        for (i, &pitch) in chord.iter().chain(chord.iter().rev()).enumerate() {
            let beat = start + i as f64 * 0.5;
            let instrument = if i % 2 == 0 { Instrument::Subtractive } else { Instrument::Fm };
            steps.push(Step {
                beat,
                note: NoteOn::new(instrument, pitch + 12.0, 0.6, seconds_per_beat * 0.45),
            });
        }
        if with_sample {
            steps.push(Step {
                beat: start,
                note: NoteOn::new(Instrument::Sampler, 60.0, 0.9, seconds_per_beat),
            });
        }
    }

    steps.sort_by(|a, b| a.beat.total_cmp(&b.beat));
    steps
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let host = CpalHost::new()?;
    let config = EngineConfig::default().with_sample_rate(host.sample_rate());
    let mut scheduler = Scheduler::new(config, host);

    scheduler.ensure_started();
    if !scheduler.is_started() {
        return Err(eyre!("audio engine failed to start"));
    }

    let with_sample = match std::env::args().nth(1) {
        Some(path) => {
            let bytes = std::fs::read(&path).wrap_err_with(|| format!("failed to read {path}"))?;
            scheduler
                .load_sample(&bytes)
                .wrap_err_with(|| format!("failed to load {path}"))?;
            true
        }
        None => false,
    };

    let spb = scheduler.tempo().seconds_per_beat();
    let lookahead = scheduler.config().lookahead_ms / 1000.0;
    let mut pending = arpeggio(spb, with_sample).into_iter().peekable();
    let origin = scheduler.current_time() + 0.1;
    let end = origin + (BARS * 4) as f64 * spb + 1.0;

    info!("playing {BARS} bars at {} bpm", scheduler.tempo().bpm());

    // Wall-clock bound in case the device never starts pulling audio.
    let deadline = Instant::now() + Duration::from_secs_f64(end + 2.0);
    while scheduler.current_time() < end && Instant::now() < deadline {
        scheduler.ensure_started();
        let now = scheduler.current_time();

        let mut batch: Vec<PerformanceEvent> = Vec::new();
        while let Some(step) = pending.next_if(|s| origin + s.beat * spb - now <= lookahead) {
            let offset = origin + step.beat * spb - now;
            batch.push(step.note.at(offset).into());
        }
        if !batch.is_empty() {
            scheduler.schedule(&batch);
        }
        scheduler.tick_metronome();

        thread::sleep(Duration::from_secs_f64(TICK));
    }

    info!("{} voices still held at the end", scheduler.active_voices());
    scheduler.dispose();
    Ok(())
}
