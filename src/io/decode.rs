use std::io::Cursor;

use hound::{SampleFormat, WavReader};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::{EngineError, Result};

/// Decoded mono audio at the context sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: f32,
}

impl SampleBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: f32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn frames(&self) -> usize {
        self.samples.len()
    }

    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decode RIFF/WAVE bytes into a mono buffer at `target_rate`.
///
/// Channels are averaged down to mono and the result is resampled, so a
/// buffer always plays back at rate 1.0 in the context.
pub fn decode_wav(bytes: &[u8], target_rate: f32) -> Result<SampleBuffer> {
    let mut reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    let mono: Vec<f32> = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    if mono.is_empty() {
        return Err(EngineError::EmptyAudio);
    }

    let samples = resample(&mono, spec.sample_rate as f32, target_rate)?;
    Ok(SampleBuffer::new(samples, target_rate))
}

/// Band-limited sample rate conversion of a mono buffer.
///
/// The whole buffer goes through one windowed-sinc pass. The filter delay is
/// trimmed off the front, so the output lines up with the input and holds
/// `round(len * to / from)` frames.
pub fn resample(input: &[f32], from_rate: f32, to_rate: f32) -> Result<Vec<f32>> {
    if input.is_empty() || from_rate <= 0.0 || to_rate <= 0.0 || from_rate == to_rate {
        return Ok(input.to_vec());
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let out_len = (input.len() as f64 * ratio).round().max(1.0) as usize;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, input.len(), 1)?;
    let delay = resampler.output_delay();

    let mut out = resampler
        .process(&[input], None)?
        .into_iter()
        .next()
        .unwrap_or_default();

    // Flush the filter tail until the delayed output covers the whole buffer.
    while out.len() < delay + out_len {
        let tail = resampler.process_partial(None::<&[&[f32]]>, None)?;
        match tail.into_iter().next() {
            Some(chunk) if !chunk.is_empty() => out.extend(chunk),
            _ => break,
        }
    }

    out.drain(..delay.min(out.len()));
    out.resize(out_len, 0.0);
    Ok(out)
}
