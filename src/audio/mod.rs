// src/audio/mod.rs  —  Gate, AudioOutput trait, backend factory
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub mod synth;
pub use synth::ToneSynthesizer;

#[cfg(feature = "audio-cpal")]
mod cpal_backend;
#[cfg(feature = "audio-cpal")]
pub use cpal_backend::CpalAudio;

/// Sidetone on/off flag shared between the control loop (sole writer) and
/// the audio render path (sole reader).  A single atomic — the audio
/// callback must never take a lock per block.
#[derive(Clone, Default)]
pub struct Gate(Arc<AtomicBool>);

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, on: bool) {
        self.0.store(on, Ordering::Release);
    }

    pub fn is_on(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Platform-agnostic audio output interface
pub trait AudioOutput: Send {
    /// Handle to the gate flag this backend's synthesizer reads
    fn gate(&self) -> Gate;
    /// Stop the output stream (shutdown path; called before the paddle closes)
    fn stop(&mut self) -> Result<()>;
}

/// Null backend (no sound — for builds without the audio-cpal feature)
#[cfg(not(feature = "audio-cpal"))]
pub struct NullAudio {
    gate: Gate,
}

#[cfg(not(feature = "audio-cpal"))]
impl AudioOutput for NullAudio {
    fn gate(&self) -> Gate {
        self.gate.clone()
    }
    fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Factory.  A backend that fails to start is fatal — a keyer without a
/// sidetone is useless, so there is no silent fallback.
pub fn create_audio(cfg: &crate::config::AppConfig) -> Result<Box<dyn AudioOutput>> {
    #[cfg(feature = "audio-cpal")]
    {
        let a = CpalAudio::new(cfg)?;
        Ok(Box::new(a))
    }
    #[cfg(not(feature = "audio-cpal"))]
    {
        let _ = cfg;
        log::warn!("Built without audio-cpal — sidetone disabled");
        Ok(Box::new(NullAudio { gate: Gate::new() }))
    }
}
