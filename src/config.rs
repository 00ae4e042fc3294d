// src/config.rs  —  Runtime configuration (CLI + TOML)
use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The example config is embedded directly in the binary at compile time.
/// Users can write it out with:  cw-keyer --write-config
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../config.toml.example");

// ── CLI ───────────────────────────────────────────────────────────────────────
#[derive(Parser, Debug)]
#[command(
    name    = "cw-keyer",
    about   = "Serial-paddle CW keyer  |  CTS = dit, DSR = dah",
    version,
)]
pub struct Cli {
    /// Config file path (default: ~/.config/cw-keyer/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Serial port carrying the paddle contacts (e.g. /dev/ttyUSB0, COM3)
    #[arg(long)]
    pub port: Option<String>,

    /// Keyer mode: iambic_a | straight
    #[arg(long)]
    pub mode: Option<KeyerMode>,

    /// Keying speed in WPM (dit = 1.2 / wpm seconds)
    #[arg(long)]
    pub wpm: Option<u8>,

    /// Sidetone frequency Hz
    #[arg(long)]
    pub tone: Option<u32>,

    /// Audio sample rate Hz
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Audio block size in frames
    #[arg(long)]
    pub block_size: Option<u32>,

    /// Sidetone amplitude 0.0–1.0
    #[arg(long)]
    pub volume: Option<f32>,

    /// Paddle polling interval in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// Swap DIT and DAH paddles
    #[arg(long, action)]
    pub switch_paddle: bool,

    /// List available serial ports and exit
    #[arg(long, action)]
    pub list_ports: bool,

    /// Test the paddle wiring: press DIT then DAH when prompted
    #[arg(long, action)]
    pub check_paddle: bool,

    /// Write the built-in default config.toml to the config path and exit.
    /// Use --config <PATH> to write to a custom location.
    #[arg(long, action)]
    pub write_config: bool,

    /// Print the built-in default config.toml to stdout and exit
    #[arg(long, action)]
    pub print_config: bool,
}

// ── Enums shared across CLI + TOML ────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum KeyerMode {
    /// Dual paddle, timed elements, squeeze alternation (no dot/dash memory)
    IambicA,
    /// Single lever on CTS — tone follows the contact directly, no timing
    Straight,
}

// ── TOML file structure ───────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    pub keyer: Option<KeyerCfg>,
    pub audio: Option<AudioCfg>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyerCfg {
    pub port:          Option<String>,
    pub mode:          Option<KeyerMode>,
    pub wpm:           Option<u8>,
    pub switch_paddle: Option<bool>,
    pub tick_ms:       Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioCfg {
    pub tone_hz:     Option<u32>,
    pub sample_rate: Option<u32>,
    pub block_size:  Option<u32>,
    pub volume:      Option<f32>,
}

// ── Resolved / merged config ──────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port:          String,
    pub mode:          KeyerMode,
    pub wpm:           u8,
    pub switch_paddle: bool,
    /// Paddle polling interval — bounds squeeze-release latency
    pub tick_ms:       u64,
    pub tone_hz:       u32,
    pub sample_rate:   u32,
    pub block_size:    u32,
    pub volume:        f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port:          String::new(),
            mode:          KeyerMode::IambicA,
            wpm:           20,
            switch_paddle: false,
            tick_ms:       5,
            tone_hz:       600,
            sample_rate:   48_000,
            block_size:    256,
            volume:        0.5,
        }
    }
}

// ── Config loader ─────────────────────────────────────────────────────────────
impl AppConfig {
    /// Write the embedded default config to disk.
    /// Returns the path it was written to.
    pub fn write_default_config(cli: &Cli) -> Result<PathBuf> {
        let path = cli.config.clone().unwrap_or_else(default_config_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Creating config directory {:?}", parent))?;
        }
        std::fs::write(&path, DEFAULT_CONFIG_TOML)
            .with_context(|| format!("Writing config to {:?}", path))?;
        Ok(path)
    }

    pub fn load(cli: &Cli) -> Result<Self> {
        let mut cfg = Self::default();

        // 1. Load TOML file
        let path = cli.config.clone().unwrap_or_else(default_config_path);
        if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Reading config {:?}", path))?;
            let fc: FileConfig = toml::from_str(&raw)
                .with_context(|| format!("Parsing config {:?}", path))?;
            cfg.apply_file(&fc);
        } else {
            eprintln!(
                "No config file found at {}\n  \
                 → Run `cw-keyer --write-config` to create one, then set your serial port.",
                path.display()
            );
        }

        // 2. Apply CLI overrides
        cfg.apply_cli(cli);
        Ok(cfg)
    }

    fn apply_file(&mut self, fc: &FileConfig) {
        if let Some(k) = &fc.keyer {
            if let Some(v) = &k.port         { self.port          = v.clone(); }
            if let Some(v) = k.mode          { self.mode          = v; }
            if let Some(v) = k.wpm           { self.wpm           = v; }
            if let Some(v) = k.switch_paddle { self.switch_paddle = v; }
            if let Some(v) = k.tick_ms       { self.tick_ms       = v; }
        }
        if let Some(a) = &fc.audio {
            if let Some(v) = a.tone_hz     { self.tone_hz     = v; }
            if let Some(v) = a.sample_rate { self.sample_rate = v; }
            if let Some(v) = a.block_size  { self.block_size  = v; }
            if let Some(v) = a.volume      { self.volume      = v; }
        }
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(v) = &cli.port       { self.port        = v.clone(); }
        if let Some(v) = cli.mode        { self.mode        = v; }
        if let Some(v) = cli.wpm         { self.wpm         = v; }
        if let Some(v) = cli.tone        { self.tone_hz     = v; }
        if let Some(v) = cli.sample_rate { self.sample_rate = v; }
        if let Some(v) = cli.block_size  { self.block_size  = v; }
        if let Some(v) = cli.volume      { self.volume      = v; }
        if let Some(v) = cli.tick_ms     { self.tick_ms     = v; }
        if cli.switch_paddle             { self.switch_paddle = true; }
    }
}

fn default_config_path() -> PathBuf {
    dirs_next().join("cw-keyer").join("config.toml")
}

fn dirs_next() -> PathBuf {
    if let Ok(v) = std::env::var("XDG_CONFIG_HOME") { return PathBuf::from(v); }
    if let Ok(v) = std::env::var("APPDATA")          { return PathBuf::from(v); }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_default();
    PathBuf::from(home).join(".config")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_config_merges_over_defaults() {
        let fc: FileConfig = toml::from_str(
            "[keyer]\nport = \"COM101\"\nmode = \"straight\"\nwpm = 25\n\
             [audio]\ntone_hz = 700\n"
        ).unwrap();
        let mut cfg = AppConfig::default();
        cfg.apply_file(&fc);
        assert_eq!(cfg.port, "COM101");
        assert_eq!(cfg.mode, KeyerMode::Straight);
        assert_eq!(cfg.wpm, 25);
        assert_eq!(cfg.tone_hz, 700);
        // untouched keys keep their defaults
        assert_eq!(cfg.sample_rate, 48_000);
        assert_eq!(cfg.block_size, 256);
    }

    #[test]
    fn embedded_example_parses() {
        let fc: FileConfig = toml::from_str(DEFAULT_CONFIG_TOML).unwrap();
        assert!(fc.keyer.is_some());
        assert!(fc.audio.is_some());
    }
}
