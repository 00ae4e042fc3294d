// src/audio/cpal_backend.rs  —  cpal output stream around ToneSynthesizer
use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};
use super::{AudioOutput, Gate, ToneSynthesizer};

pub struct CpalAudio {
    gate:   Gate,
    stream: Stream,
}

// Stream is !Send on some platforms; wrap it
unsafe impl Send for CpalAudio {}

impl CpalAudio {
    pub fn new(cfg: &crate::config::AppConfig) -> Result<Self> {
        let host   = cpal::default_host();
        let device = host.default_output_device()
            .ok_or_else(|| anyhow!("No output device"))?;
        let default_config = device.default_output_config()?;
        let sample_format  = default_config.sample_format();

        // Ask for the configured rate and a fixed block size; the driver
        // rejects the stream if it cannot honour them, which is fatal here.
        let mut stream_config: cpal::StreamConfig = default_config.into();
        stream_config.sample_rate = cpal::SampleRate(cfg.sample_rate);
        stream_config.buffer_size = cpal::BufferSize::Fixed(cfg.block_size);

        log::info!(
            "[audio] {} Hz, {} ch, block {} frames, tone {} Hz",
            cfg.sample_rate, stream_config.channels, cfg.block_size, cfg.tone_hz
        );

        let gate  = Gate::new();
        let synth = ToneSynthesizer::new(gate.clone(), cfg.tone_hz, cfg.sample_rate, cfg.volume);

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, synth)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, synth)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, synth)?,
            _                 => return Err(anyhow!("Unsupported sample format")),
        };
        stream.play()?;
        Ok(Self { gate, stream })
    }
}

fn build_stream<S>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut synth: ToneSynthesizer,
) -> Result<Stream>
where S: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>
{
    let ch = config.channels as usize;
    let mut mono: Vec<f32> = Vec::new();
    let stream = device.build_output_stream(
        config,
        move |data: &mut [S], _: &cpal::OutputCallbackInfo| {
            // One render call per hardware block, mono replicated to every
            // channel of the frame.
            let frames = data.len() / ch;
            mono.resize(frames, 0.0);
            synth.render(&mut mono);
            for (frame, &v) in data.chunks_mut(ch).zip(mono.iter()) {
                let out = S::from_sample(v);
                for smp in frame.iter_mut() { *smp = out; }
            }
        },
        |e| log::error!("Audio error: {e}"),
        None,
    )?;
    Ok(stream)
}

impl AudioOutput for CpalAudio {
    fn gate(&self) -> Gate {
        self.gate.clone()
    }

    fn stop(&mut self) -> Result<()> {
        self.gate.set(false);
        self.stream.pause()?;
        Ok(())
    }
}
