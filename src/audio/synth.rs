// src/audio/synth.rs  —  phase-continuous sine sidetone
use super::Gate;

/// Gated sine generator.  The phase counter is a global sample index that
/// advances by the rendered frame count on every call, gate on or off, and
/// is never reset — the sine argument at sample n is always
/// 2π·f·n/sample_rate, so the tone resumes mid-cycle after a gap instead
/// of restarting at zero.
pub struct ToneSynthesizer {
    gate:        Gate,
    tone_hz:     f64,
    sample_rate: f64,
    volume:      f32,
    phase:       u64,
}

impl ToneSynthesizer {
    pub fn new(gate: Gate, tone_hz: u32, sample_rate: u32, volume: f32) -> Self {
        Self {
            gate,
            tone_hz: tone_hz as f64,
            sample_rate: sample_rate as f64,
            volume,
            phase: 0,
        }
    }

    /// Fill `out` with one block of mono samples and advance the phase
    /// counter by `out.len()`.  The gate is read once per call; a gated-off
    /// block is exact zeros.  On/off is instantaneous — no envelope.
    pub fn render(&mut self, out: &mut [f32]) {
        if self.gate.is_on() {
            let step = std::f64::consts::TAU * self.tone_hz / self.sample_rate;
            for (i, s) in out.iter_mut().enumerate() {
                let arg = step * (self.phase + i as u64) as f64;
                *s = arg.sin() as f32 * self.volume;
            }
        } else {
            out.fill(0.0);
        }
        self.phase += out.len() as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR:   u32 = 48_000;
    const FREQ: u32 = 600;

    fn expected(n: u64) -> f32 {
        let arg = std::f64::consts::TAU * FREQ as f64 / SR as f64 * n as f64;
        arg.sin() as f32 * 0.5
    }

    #[test]
    fn gated_off_renders_exact_zeros() {
        let gate = Gate::new();
        let mut synth = ToneSynthesizer::new(gate, FREQ, SR, 0.5);
        let mut buf = [1.0f32; 256];
        synth.render(&mut buf);
        assert!(buf.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn gated_on_matches_global_sine() {
        let gate = Gate::new();
        gate.set(true);
        let mut synth = ToneSynthesizer::new(gate, FREQ, SR, 0.5);
        let mut buf = [0.0f32; 256];
        synth.render(&mut buf);
        for (i, &s) in buf.iter().enumerate() {
            assert_eq!(s, expected(i as u64), "sample {i}");
        }
    }

    #[test]
    fn phase_continues_across_gate_transitions() {
        // on, off, on with odd block sizes — the third block must continue
        // the global sine at index 256 + 100, not restart at zero.
        let gate = Gate::new();
        let mut synth = ToneSynthesizer::new(gate.clone(), FREQ, SR, 0.5);

        gate.set(true);
        let mut a = [0.0f32; 256];
        synth.render(&mut a);

        gate.set(false);
        let mut b = [0.0f32; 100];
        synth.render(&mut b);
        assert!(b.iter().all(|&s| s == 0.0));

        gate.set(true);
        let mut c = [0.0f32; 64];
        synth.render(&mut c);
        for (i, &s) in c.iter().enumerate() {
            assert_eq!(s, expected(256 + 100 + i as u64), "sample {i}");
        }
    }

    #[test]
    fn phase_advances_while_silent() {
        let gate = Gate::new();
        let mut synth = ToneSynthesizer::new(gate.clone(), FREQ, SR, 0.5);

        // render a long stretch of silence first
        let mut quiet = [0.0f32; 512];
        for _ in 0..10 {
            synth.render(&mut quiet);
        }

        gate.set(true);
        let mut buf = [0.0f32; 8];
        synth.render(&mut buf);
        for (i, &s) in buf.iter().enumerate() {
            assert_eq!(s, expected(5120 + i as u64), "sample {i}");
        }
    }
}
