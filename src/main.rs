// src/main.rs  —  cw-keyer  entry point
mod audio;
mod config;
mod keyer;
mod morse;

use anyhow::Result;
use clap::Parser;
use config::{AppConfig, Cli, KeyerMode};
use keyer::scheduler::ElementScheduler;
use keyer::PaddleInput;
use morse::Timing;
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // ── --print-config  ───────────────────────────────────────────────────────
    if cli.print_config {
        print!("{}", config::DEFAULT_CONFIG_TOML);
        return Ok(());
    }

    // ── --write-config  ───────────────────────────────────────────────────────
    if cli.write_config {
        let path = AppConfig::write_default_config(&cli)?;
        println!("Config written to: {}", path.display());
        println!("Edit it to set your serial port, WPM, tone, etc.");
        return Ok(());
    }

    // ── --list-ports  ─────────────────────────────────────────────────────────
    if cli.list_ports {
        let ports = keyer::list_ports();
        if ports.is_empty() {
            println!("No serial ports found.");
        } else {
            println!("Available serial ports:");
            for p in &ports { println!("  {p}"); }
        }
        return Ok(());
    }

    // ── --check-paddle  ───────────────────────────────────────────────────────
    if cli.check_paddle {
        let cfg = AppConfig::load(&cli)?;
        let ok = keyer::serial::check_paddle(&cfg, Duration::from_secs(10))?;
        std::process::exit(if ok { 0 } else { 1 });
    }

    // ── Load config ───────────────────────────────────────────────────────────
    let cfg = AppConfig::load(&cli)?;
    let timing = Timing::from_wpm(cfg.wpm);

    // ── Audio — sidetone stream starts now, silent until the gate opens ──────
    let mut audio = audio::create_audio(&cfg)?;

    // ── Paddle ────────────────────────────────────────────────────────────────
    let mut paddle = keyer::create_paddle(&cfg)?;

    match cfg.mode {
        KeyerMode::IambicA => println!(
            "cw-keyer running — Iambic A squeeze keying, {} WPM, {} Hz sidetone",
            cfg.wpm, cfg.tone_hz
        ),
        KeyerMode::Straight => println!(
            "cw-keyer running — straight key on CTS, {} Hz sidetone",
            cfg.tone_hz
        ),
    }
    println!("Press Esc, q or Ctrl+C to quit.");

    // ── Control loop ──────────────────────────────────────────────────────────
    // Raw mode so quit keys (including Ctrl+C) arrive as events and the
    // shutdown below always runs, in order, on every exit path.
    let mut sched = ElementScheduler::new(cfg.mode, timing, audio.gate());
    crossterm::terminal::enable_raw_mode()?;
    let result = control_loop(&mut sched, paddle.as_mut(), Duration::from_millis(cfg.tick_ms));
    let _ = crossterm::terminal::disable_raw_mode();

    // ── Cleanup: shutdown notice, then audio, then the paddle port ────────────
    println!("\n73 de cw-keyer!");
    if let Err(e) = audio.stop() {
        log::warn!("Audio stop failed: {e}");
    }
    drop(audio);
    drop(paddle);

    result
}

/// Poll the paddles at the configured tick until a quit key arrives.
/// Inside an element the scheduler blocks for the mark + space, so quit
/// keys and fresh paddle levels are both seen only between elements.
fn control_loop(
    sched:  &mut ElementScheduler,
    paddle: &mut dyn PaddleInput,
    tick:   Duration,
) -> Result<()> {
    use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

    loop {
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(k) = event::read()? {
                if k.kind == KeyEventKind::Release {
                    continue;
                }
                let quit = k.code == KeyCode::Esc
                    || matches!(k.code, KeyCode::Char('q') | KeyCode::Char('Q'))
                    || (k.code == KeyCode::Char('c')
                        && k.modifiers.contains(KeyModifiers::CONTROL));
                if quit {
                    return Ok(());
                }
            }
        }

        // false = nothing keyed this evaluation → sleep one tick and re-poll
        if !sched.poll_once(paddle)? {
            std::thread::sleep(tick);
        }
    }
}
