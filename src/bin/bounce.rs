//! bounce - render a JSON event batch offline and write it to a WAV file.
//!
//! Run with: cargo run --bin bounce -- events.json out.wav [seconds]
//!
//! The batch is scheduled once at time zero; events past the look-ahead
//! horizon are dropped exactly as they would be live. Without the `serde`
//! feature a built-in demo batch is rendered instead of reading JSON.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use hound::{SampleFormat, WavSpec, WavWriter};
use log::info;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use soundpad_dsp::{EngineConfig, ManualHost, PerformanceEvent, Scheduler};

const DEFAULT_SECONDS: f64 = 2.0;

#[cfg(feature = "serde")]
fn read_events(path: &str) -> EyreResult<Vec<PerformanceEvent>> {
    let text = std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {path}"))?;
    serde_json::from_str(&text).wrap_err_with(|| format!("failed to parse {path}"))
}

#[cfg(not(feature = "serde"))]
fn read_events(path: &str) -> EyreResult<Vec<PerformanceEvent>> {
    use soundpad_dsp::{Instrument, NoteOn};

    info!("built without serde, ignoring {path} and rendering the demo chord");
    Ok(vec![
        NoteOn::new(Instrument::Subtractive, 57.0, 0.7, 1.0).into(),
        NoteOn::new(Instrument::Fm, 64.0, 0.5, 1.0).at(0.05).into(),
        NoteOn::new(Instrument::Subtractive, 69.0, 0.4, 0.8).at(0.1).into(),
    ])
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let mut args = std::env::args().skip(1);
    let events_path = args
        .next()
        .ok_or_else(|| eyre!("usage: bounce <events.json> <out.wav> [seconds]"))?;
    let out_path = args.next().ok_or_else(|| eyre!("missing output path"))?;
    let seconds = match args.next() {
        Some(s) => s.parse::<f64>().wrap_err("seconds must be a number")?,
        None => DEFAULT_SECONDS,
    };

    let events = read_events(&events_path)?;
    let config = EngineConfig::default();
    let sample_rate = config.sample_rate;

    let host = ManualHost::new();
    let mut scheduler = Scheduler::new(config, host.clone());
    scheduler.ensure_started();
    if !scheduler.is_running() {
        return Err(eyre!("offline engine failed to start"));
    }

    scheduler.schedule(&events);
    info!("{} of {} events scheduled", scheduler.active_voices(), events.len());

    let rendered = host.render_seconds(seconds);
    scheduler.dispose();

    let spec = WavSpec {
        channels: 1,
        sample_rate: sample_rate as u32,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(&out_path, spec)
        .wrap_err_with(|| format!("failed to create {out_path}"))?;
    for sample in &rendered {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;

    let peak = rendered.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    info!("wrote {} frames to {out_path} (peak {peak:.3})", rendered.len());
    Ok(())
}
