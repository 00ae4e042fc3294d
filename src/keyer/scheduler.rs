// src/keyer/scheduler.rs  —  paddle state → timed elements
//
// One finite-state machine covers both variants.  Iambic A: the transition
// function below picks the next element from the freshly sampled paddle
// state; an element, once started, always completes its mark and the
// following one-dot space before the paddles are looked at again.  Straight
// mode is the degenerate two-state machine — the gate mirrors the contact
// at the polling cadence with no timing at all.

use anyhow::Result;
use std::io::Write;
use std::thread;

use crate::audio::Gate;
use crate::config::KeyerMode;
use crate::morse::{ElementKind, Timing};
use super::{PaddleInput, PaddleState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    SendDit,
    SendDah,
    /// Both paddles held; remembers the element just sent so the next one
    /// alternates
    Squeeze(ElementKind),
}

pub struct ElementScheduler {
    mode:   KeyerMode,
    timing: Timing,
    gate:   Gate,
    state:  State,
}

impl ElementScheduler {
    pub fn new(mode: KeyerMode, timing: Timing, gate: Gate) -> Self {
        Self { mode, timing, gate, state: State::Idle }
    }

    /// One top-level evaluation: sample the paddles and, in iambic mode,
    /// key a complete element (mark + inter-element space, blocking).
    /// Returns true when an element was sent; on false the caller sleeps
    /// one tick before re-polling.
    pub fn poll_once(&mut self, paddle: &mut dyn PaddleInput) -> Result<bool> {
        let p = paddle.sample()?;
        match self.mode {
            KeyerMode::Straight => {
                // Tone follows the contact directly, no element timing
                self.gate.set(p.dit);
                Ok(false)
            }
            KeyerMode::IambicA => match self.decide(p) {
                Some(kind) => {
                    self.send(kind);
                    Ok(true)
                }
                None => Ok(false),
            },
        }
    }

    /// The transition function, evaluated only between elements.
    ///
    /// Both paddles held enters the squeeze: a dit first, then strict
    /// alternation.  Releasing either paddle is honoured at the next check
    /// point — the in-flight element always finishes, but no opposite
    /// element is remembered (Iambic A, no dot/dash memory).
    fn decide(&mut self, p: PaddleState) -> Option<ElementKind> {
        let next = match (p.dit, p.dah) {
            (true, true) => {
                let kind = match self.state {
                    State::Squeeze(last) => last.opposite(),
                    _                    => ElementKind::Dit,
                };
                self.state = State::Squeeze(kind);
                Some(kind)
            }
            (true, false) => {
                self.state = State::SendDit;
                Some(ElementKind::Dit)
            }
            (false, true) => {
                self.state = State::SendDah;
                Some(ElementKind::Dah)
            }
            (false, false) => {
                self.state = State::Idle;
                None
            }
        };
        log::trace!("[scheduler] {:?} → {:?}", p, next);
        next
    }

    /// Key one element: symbol to the console, gate on for the mark, gate
    /// off for the one-dot space.  Blocking — elements are atomic.
    fn send(&mut self, kind: ElementKind) {
        print!("{}", kind.symbol());
        let _ = std::io::stdout().flush();

        self.gate.set(true);
        thread::sleep(kind.duration(&self.timing));
        self.gate.set(false);
        thread::sleep(self.timing.elem_gap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Scripted paddle: replays a fixed sequence of states, holding the
    /// last one forever.
    struct ScriptedPaddle {
        states: Vec<PaddleState>,
        pos:    usize,
    }

    impl ScriptedPaddle {
        fn new(states: Vec<PaddleState>) -> Self {
            Self { states, pos: 0 }
        }
    }

    impl PaddleInput for ScriptedPaddle {
        fn sample(&mut self) -> Result<PaddleState> {
            let s = self.states[self.pos.min(self.states.len() - 1)];
            self.pos += 1;
            Ok(s)
        }
        fn name(&self) -> &str { "scripted" }
    }

    fn zero_timing() -> Timing {
        Timing { dot: Duration::ZERO, dash: Duration::ZERO, elem_gap: Duration::ZERO }
    }

    fn sched(mode: KeyerMode) -> (ElementScheduler, Gate) {
        let gate = Gate::new();
        (ElementScheduler::new(mode, zero_timing(), gate.clone()), gate)
    }

    const BOTH:    PaddleState = PaddleState { dit: true,  dah: true  };
    const DIT:     PaddleState = PaddleState { dit: true,  dah: false };
    const DAH:     PaddleState = PaddleState { dit: false, dah: true  };
    const NEITHER: PaddleState = PaddleState { dit: false, dah: false };

    #[test]
    fn idle_stays_idle() {
        let (mut s, _) = sched(KeyerMode::IambicA);
        assert_eq!(s.decide(NEITHER), None);
        assert_eq!(s.decide(NEITHER), None);
    }

    #[test]
    fn single_paddle_repeats_its_element() {
        let (mut s, _) = sched(KeyerMode::IambicA);
        for _ in 0..5 {
            assert_eq!(s.decide(DIT), Some(ElementKind::Dit));
        }
        for _ in 0..5 {
            assert_eq!(s.decide(DAH), Some(ElementKind::Dah));
        }
    }

    #[test]
    fn squeeze_alternates_starting_with_dit() {
        let (mut s, _) = sched(KeyerMode::IambicA);
        let sent: Vec<_> = (0..6).map(|_| s.decide(BOTH).unwrap()).collect();
        assert_eq!(sent, [
            ElementKind::Dit, ElementKind::Dah,
            ElementKind::Dit, ElementKind::Dah,
            ElementKind::Dit, ElementKind::Dah,
        ]);
    }

    #[test]
    fn squeeze_after_dah_still_starts_with_dit() {
        let (mut s, _) = sched(KeyerMode::IambicA);
        assert_eq!(s.decide(DAH),  Some(ElementKind::Dah));
        assert_eq!(s.decide(BOTH), Some(ElementKind::Dit));
        assert_eq!(s.decide(BOTH), Some(ElementKind::Dah));
    }

    #[test]
    fn releasing_dah_exits_squeeze_with_no_pending_dah() {
        let (mut s, _) = sched(KeyerMode::IambicA);
        assert_eq!(s.decide(BOTH), Some(ElementKind::Dit));
        assert_eq!(s.decide(BOTH), Some(ElementKind::Dah));
        // dah released at the check point: keep sending dits only
        assert_eq!(s.decide(DIT), Some(ElementKind::Dit));
        assert_eq!(s.decide(DIT), Some(ElementKind::Dit));
        assert_eq!(s.decide(NEITHER), None);
    }

    #[test]
    fn squeeze_restarts_with_dit_after_release() {
        let (mut s, _) = sched(KeyerMode::IambicA);
        assert_eq!(s.decide(BOTH), Some(ElementKind::Dit));
        assert_eq!(s.decide(NEITHER), None);
        // a fresh squeeze alternates from the top again
        assert_eq!(s.decide(BOTH), Some(ElementKind::Dit));
        assert_eq!(s.decide(BOTH), Some(ElementKind::Dah));
    }

    #[test]
    fn iambic_poll_sends_element_and_leaves_gate_off() {
        let (mut s, gate) = sched(KeyerMode::IambicA);
        let mut paddle = ScriptedPaddle::new(vec![DIT]);
        assert!(s.poll_once(&mut paddle).unwrap());
        // mark and space have both elapsed (zero timing) — gate is down
        assert!(!gate.is_on());
    }

    #[test]
    fn straight_mode_mirrors_the_contact() {
        let (mut s, gate) = sched(KeyerMode::Straight);
        let mut paddle = ScriptedPaddle::new(vec![DIT, NEITHER, DIT, NEITHER]);

        assert!(!s.poll_once(&mut paddle).unwrap());
        assert!(gate.is_on());
        assert!(!s.poll_once(&mut paddle).unwrap());
        assert!(!gate.is_on());
        assert!(!s.poll_once(&mut paddle).unwrap());
        assert!(gate.is_on());
        assert!(!s.poll_once(&mut paddle).unwrap());
        assert!(!gate.is_on());
    }

    #[test]
    fn straight_mode_applies_no_element_timing() {
        // even a held contact never produces a timed element
        let (mut s, gate) = sched(KeyerMode::Straight);
        let mut paddle = ScriptedPaddle::new(vec![DIT]);
        for _ in 0..10 {
            assert!(!s.poll_once(&mut paddle).unwrap());
            assert!(gate.is_on());
        }
    }
}
