//! cpal-backed render host

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info};

use soundpad_dsp::{
    engine::{Renderer, RenderHost},
    EngineError, Result,
};

/// Plays a renderer through the default output device.
///
/// The renderer is moved into the device callback on `attach`; the stream is
/// built paused and only starts pulling audio on `resume`.
pub struct CpalHost {
    device: cpal::Device,
    config: cpal::StreamConfig,
    stream: Option<cpal::Stream>,
}

impl CpalHost {
    pub fn new() -> EyreResult<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let supported = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(eyre!(
                "unsupported output sample format {:?}",
                supported.sample_format()
            ));
        }

        info!(
            "output: {} ({} Hz, {} channels)",
            device.name().unwrap_or_else(|_| "unknown device".into()),
            supported.sample_rate().0,
            supported.channels()
        );

        Ok(Self {
            device,
            config: supported.into(),
            stream: None,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate.0 as f32
    }
}

impl RenderHost for CpalHost {
    fn attach(&mut self, mut renderer: Renderer) -> Result<()> {
        let channels = self.config.channels as usize;
        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _| renderer.render_interleaved(data, channels),
                |err| error!("audio stream error: {err}"),
                None,
            )
            .map_err(|err| EngineError::host(err.to_string()))?;
        stream
            .pause()
            .map_err(|err| EngineError::host(err.to_string()))?;

        self.stream = Some(stream);
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| EngineError::host("no stream attached"))?;
        stream
            .play()
            .map_err(|err| EngineError::host(err.to_string()))
    }

    fn close(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            stream
                .pause()
                .map_err(|err| EngineError::host(err.to_string()))?;
        }
        Ok(())
    }
}
