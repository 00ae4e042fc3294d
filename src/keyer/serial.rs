// src/keyer/serial.rs  —  RS-232 control-line paddle
//
// The paddle contacts are wired to the port's CTS (dit) and DSR (dah)
// inputs; closing a contact pulls the line active.  No data is ever
// transferred — the baud rate below is irrelevant but serialport requires
// one to open the port.
//
// Linux:  port is typically /dev/ttyUSB0 or /dev/ttyS0
//         Permissions: add yourself to the `dialout` group, or:
//           sudo chmod a+rw /dev/ttyUSB0
// Windows: port is COM3, COM4, …  (check Device Manager)
// macOS:  /dev/cu.usbserial-*

use anyhow::{anyhow, Result};
use serialport::SerialPort;
use std::time::{Duration, Instant};
use super::{PaddleInput, PaddleState};

const BAUD_UNUSED: u32 = 9_600;

pub struct SerialPaddle {
    port:          Box<dyn SerialPort>,
    port_name:     String,
    /// Straight-key wiring: only CTS is read, DSR is reported released
    single_lever:  bool,
    switch_paddle: bool,
}

impl SerialPaddle {
    /// Open `port_path` (e.g. "/dev/ttyUSB0" or "COM3").
    pub fn open(port_path: &str, single_lever: bool, switch_paddle: bool) -> Result<Self> {
        if port_path.is_empty() {
            return Err(anyhow!(
                "No serial port configured.\n  \
                 Pass --port /dev/ttyUSB0 (Linux) or --port COM3 (Windows),\n  \
                 or set `port` in the config file.\n  \
                 Run `cw-keyer --list-ports` to see all serial ports."
            ));
        }

        let port = serialport::new(port_path, BAUD_UNUSED)
            .timeout(Duration::from_millis(50))
            .open()
            .map_err(|e| anyhow!(
                "Cannot open serial port '{}': {e}\n  \
                 Check that the device is plugged in and you have read/write permission.\n  \
                 Linux: sudo usermod -aG dialout $USER  (then re-login)",
                port_path
            ))?;

        log::info!(
            "[paddle] Opened {} ({})",
            port_path,
            if single_lever { "straight key on CTS" } else { "CTS = dit, DSR = dah" }
        );

        Ok(Self {
            port,
            port_name: port_path.to_string(),
            single_lever,
            switch_paddle,
        })
    }
}

impl PaddleInput for SerialPaddle {
    fn name(&self) -> &str {
        &self.port_name
    }

    fn sample(&mut self) -> Result<PaddleState> {
        let cts = self.port.read_clear_to_send()?;
        let dsr = if self.single_lever {
            false
        } else {
            self.port.read_data_set_ready()?
        };
        let (dit, dah) = if self.switch_paddle { (dsr, cts) } else { (cts, dsr) };
        Ok(PaddleState { dit, dah })
    }
}

// ── Interactive wiring check (--check-paddle) ─────────────────────────────────

/// Open the port and wait for the DIT contact, then the DAH contact, each
/// within `timeout`.  Returns Ok(true) when both lines respond.
pub fn check_paddle(cfg: &crate::config::AppConfig, timeout: Duration) -> Result<bool> {
    let mut paddle = SerialPaddle::open(&cfg.port, false, cfg.switch_paddle)?;

    println!("Port    : {}", paddle.name());
    println!("Wiring  : CTS = DIT, DSR = DAH  (close the contact to GND)");
    println!();

    let dit_ok = wait_for(&mut paddle, true, timeout)?;
    let dah_ok = wait_for(&mut paddle, false, timeout)?;

    println!();
    if dit_ok && dah_ok {
        println!("✓  Both paddles OK — wiring is working correctly.");
        Ok(true)
    } else {
        println!("✗  Paddle check failed.");
        Ok(false)
    }
}

fn wait_for(paddle: &mut SerialPaddle, want_dit: bool, timeout: Duration) -> Result<bool> {
    let (label, step) = if want_dit { ("DIT", "1/2") } else { ("DAH", "2/2") };
    println!("[ {step} ]  Press {label} paddle now …");

    // Wait for both contacts to be released before arming, so a paddle held
    // over from the previous step does not count twice.
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        let s = paddle.sample()?;
        if s == PaddleState::default() {
            break;
        }
        std::thread::sleep(Duration::from_millis(2));
    }

    while Instant::now() < deadline {
        let s = paddle.sample()?;
        if s.dit == want_dit && s.dah == !want_dit {
            println!("         ✓ {label} received");
            return Ok(true);
        }
        if s.dit == !want_dit && s.dah == want_dit {
            println!("         ✗ Got {} instead of {label} — try --switch-paddle",
                     if want_dit { "DAH" } else { "DIT" });
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    println!("         ✗ {label} timeout — no contact seen");
    Ok(false)
}
