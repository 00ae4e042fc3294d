// src/keyer/mod.rs  —  PaddleInput trait + serial paddle factory
pub mod scheduler;
pub mod serial;

use anyhow::Result;

/// Instantaneous paddle contact levels.  Sampled and discarded — no history
/// is kept here; only the scheduler remembers anything between ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaddleState {
    pub dit: bool,
    pub dah: bool,
}

/// Paddle interface — returns the current contact levels, no debouncing.
/// A failed read means the device is gone; the caller treats it as fatal.
pub trait PaddleInput: Send {
    fn sample(&mut self) -> Result<PaddleState>;
    /// Human-readable input name
    fn name(&self) -> &str;
}

/// List serial ports (used by --list-ports)
pub fn list_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.iter().map(|p| {
            let detail = match &p.port_type {
                serialport::SerialPortType::UsbPort(info) => format!(
                    "USB VID:{:04x} PID:{:04x}{}",
                    info.vid, info.pid,
                    info.product.as_deref()
                        .map(|s| format!(" \"{}\"", s))
                        .unwrap_or_default()
                ),
                serialport::SerialPortType::BluetoothPort => "Bluetooth".into(),
                _ => "Serial".into(),
            };
            format!("{}  ({})", p.port_name, detail)
        }).collect(),
        Err(e) => vec![format!("Serial port enumeration failed: {e}")],
    }
}

/// Factory.  Straight mode only wires the CTS line; iambic uses CTS + DSR.
pub fn create_paddle(cfg: &crate::config::AppConfig) -> Result<Box<dyn PaddleInput>> {
    let single_lever = cfg.mode == crate::config::KeyerMode::Straight;
    if cfg.switch_paddle {
        log::info!("Paddle switched: DIT←→DAH");
    }
    let paddle = serial::SerialPaddle::open(&cfg.port, single_lever, cfg.switch_paddle)?;
    Ok(Box::new(paddle))
}
