// src/morse.rs  —  WPM → element durations (PARIS standard), element kinds
use std::time::Duration;

/// All timing derived from a single dot length
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub dot:      Duration,  // 1 unit
    pub dash:     Duration,  // 3 units
    pub elem_gap: Duration,  // 1 unit  (between elements of the same char)
}

impl Timing {
    /// PARIS standard: dot = 1.2 s / wpm.
    /// dash is derived from dot by multiplication so dash == 3 × dot holds
    /// exactly for every speed.
    pub fn from_wpm(wpm: u8) -> Self {
        let dot = Duration::from_secs_f64(1.2 / wpm.max(1) as f64);
        Self {
            dot,
            dash:     dot * 3,
            elem_gap: dot,
        }
    }
}

/// One Morse element. Transient — produced by the scheduler, keyed, dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Dit,
    Dah,
}

impl ElementKind {
    pub fn duration(self, t: &Timing) -> Duration {
        match self {
            ElementKind::Dit => t.dot,
            ElementKind::Dah => t.dash,
        }
    }

    /// Console symbol printed as the element is sent
    pub fn symbol(self) -> char {
        match self {
            ElementKind::Dit => '·',
            ElementKind::Dah => '–',
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            ElementKind::Dit => ElementKind::Dah,
            ElementKind::Dah => ElementKind::Dit,
        }
    }
}
