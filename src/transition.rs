//! Shared-element view transition state machine.
//!
//! Coordinates the card-to-detail animation across a client-side
//! navigation: the clicked list card's geometry is frozen, a visual clone
//! is overlaid while the list view unmounts, the destination view reports
//! its own card's geometry back (the measurement handshake), and the
//! overlay interpolates between the two rects before fading out over the
//! real content.
//!
//! ## Phase progression
//!
//! ```text
//! Idle → Preparing → Navigating → AnimatingIn → Settling → Idle
//! ```
//!
//! - `Preparing`: click accepted; overlay shown at the frozen source rect.
//!   Holds for a short prefetch delay before committing navigation.
//! - `Navigating`: navigation effect emitted; destination is mounting.
//! - `AnimatingIn`: target rect is known; overlay interpolates source →
//!   target for a fixed duration.
//! - `Settling`: real content fades in over the overlay, masking any pixel
//!   misalignment, then everything resets.
//!
//! ## Design
//!
//! The machine is an explicit automaton: every (phase × event) pair either
//! advances the phase and returns the side effects the UI layer must
//! perform ([`Effect`]), or does nothing. The machine never reads a clock —
//! callers pass `now` into every call and pump [`TransitionMachine::tick`]
//! from their timer, which makes every ordering guarantee unit-testable.
//!
//! Invariants the table enforces:
//!
//! - **Single flight**: a click while any transition is in flight is
//!   ignored; the in-flight target is untouched.
//! - **Buffered handshake**: the target rect may be reported before,
//!   during, or after the `Navigating` entry. It is stored and consumed
//!   whenever `AnimatingIn` is entered; it never blocks phase advancement.
//! - **No stuck overlay**: if the destination never reports its rect, the
//!   machine force-resets to `Idle` after a bounded timeout. Navigation
//!   failure or an early unmount resets immediately. Reset clears every
//!   deadline, so a stale timer callback from a previous transition can
//!   never apply.

use std::time::{Duration, Instant};

/// Screen-space geometry snapshot of a card element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Preparing,
    Navigating,
    AnimatingIn,
    Settling,
}

/// Side effects the UI layer must perform after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Overlay a clone of the clicked card at its frozen position.
    ShowOverlay { slug: String, rect: Rect },
    /// Push the destination route.
    BeginNavigation { slug: String },
    /// Interpolate the overlay between the two rects.
    AnimateOverlay { from: Rect, to: Rect },
    /// Fade the real destination content in over the overlay.
    RevealContent,
    /// Tear the overlay down; the transition is over (or abandoned).
    RemoveOverlay,
}

/// Phase durations. Defaults match the observed animation tuning.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    /// Hold in `Preparing` before committing navigation (prefetch window).
    pub prepare_delay: Duration,
    /// Overlay interpolation duration.
    pub animate_duration: Duration,
    /// Content fade-in duration.
    pub settle_duration: Duration,
    /// Bound on waiting for the destination's rect report.
    pub handshake_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            prepare_delay: Duration::from_millis(200),
            animate_duration: Duration::from_millis(500),
            settle_duration: Duration::from_millis(400),
            handshake_timeout: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug)]
pub struct TransitionMachine {
    timing: Timing,
    phase: Phase,
    source_rect: Option<Rect>,
    /// Buffered handshake signal; consumed on `AnimatingIn` entry.
    target_rect: Option<Rect>,
    target_slug: Option<String>,
    /// Next timer-driven advance, if the current phase has one.
    deadline: Option<Instant>,
}

impl TransitionMachine {
    pub fn new(timing: Timing) -> Self {
        TransitionMachine {
            timing,
            phase: Phase::Idle,
            source_rect: None,
            target_rect: None,
            target_slug: None,
            deadline: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn target_slug(&self) -> Option<&str> {
        self.target_slug.as_deref()
    }

    /// When the driver should next call [`tick`](Self::tick), if anything
    /// is pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// A card was clicked. Returns the effects to perform, or `None` if a
    /// transition is already in flight (the click is ignored).
    pub fn click(&mut self, now: Instant, slug: &str, rect: Rect) -> Option<Effect> {
        if self.phase != Phase::Idle {
            return None;
        }
        self.phase = Phase::Preparing;
        self.source_rect = Some(rect);
        self.target_slug = Some(slug.to_string());
        self.deadline = Some(now + self.timing.prepare_delay);
        Some(Effect::ShowOverlay {
            slug: slug.to_string(),
            rect,
        })
    }

    /// The destination view reports its card's measured geometry. Safe to
    /// call at any point while a transition is in flight; the value is
    /// buffered until `AnimatingIn` is entered. Call [`tick`](Self::tick)
    /// afterwards to let the machine consume it.
    pub fn report_target_rect(&mut self, rect: Rect) {
        if self.phase != Phase::Idle {
            self.target_rect = Some(rect);
        }
    }

    /// Advance every timer- or signal-driven step that is due at `now`.
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();
        loop {
            match self.phase {
                Phase::Preparing if self.due(now) => {
                    self.phase = Phase::Navigating;
                    self.deadline = Some(now + self.timing.handshake_timeout);
                    // target_slug is always set while in flight
                    if let Some(slug) = self.target_slug.clone() {
                        effects.push(Effect::BeginNavigation { slug });
                    }
                }
                Phase::Navigating if self.target_rect.is_some() => {
                    let (Some(from), Some(to)) = (self.source_rect, self.target_rect) else {
                        break;
                    };
                    self.phase = Phase::AnimatingIn;
                    self.deadline = Some(now + self.timing.animate_duration);
                    effects.push(Effect::AnimateOverlay { from, to });
                }
                Phase::Navigating if self.due(now) => {
                    // Handshake never arrived; a stuck overlay would block
                    // all interaction, so abandon the animation.
                    effects.push(self.reset());
                }
                Phase::AnimatingIn if self.due(now) => {
                    self.phase = Phase::Settling;
                    self.deadline = Some(now + self.timing.settle_duration);
                    effects.push(Effect::RevealContent);
                }
                Phase::Settling if self.due(now) => {
                    effects.push(self.reset());
                }
                _ => break,
            }
        }
        effects
    }

    /// The navigation itself failed; abandon the transition.
    pub fn navigation_failed(&mut self) -> Option<Effect> {
        self.abort()
    }

    /// The destination view unmounted before the transition finished.
    pub fn detail_unmounted(&mut self) -> Option<Effect> {
        self.abort()
    }

    fn abort(&mut self) -> Option<Effect> {
        if self.phase == Phase::Idle {
            return None;
        }
        Some(self.reset())
    }

    fn due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    fn reset(&mut self) -> Effect {
        self.phase = Phase::Idle;
        self.source_rect = None;
        self.target_rect = None;
        self.target_slug = None;
        self.deadline = None;
        Effect::RemoveOverlay
    }
}

impl Default for TransitionMachine {
    fn default() -> Self {
        TransitionMachine::new(Timing::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f64) -> Rect {
        Rect {
            x,
            y: 0.0,
            width: 320.0,
            height: 180.0,
        }
    }

    fn timing() -> Timing {
        Timing::default()
    }

    /// Drive a machine to the `Navigating` phase.
    fn navigating(machine: &mut TransitionMachine, t0: Instant) -> Instant {
        machine.click(t0, "post", rect(10.0)).unwrap();
        let now = t0 + timing().prepare_delay;
        let effects = machine.tick(now);
        assert_eq!(
            effects,
            vec![Effect::BeginNavigation {
                slug: "post".to_string()
            }]
        );
        now
    }

    #[test]
    fn click_shows_overlay_and_enters_preparing() {
        let mut machine = TransitionMachine::default();
        let t0 = Instant::now();
        let effect = machine.click(t0, "post", rect(10.0));
        assert_eq!(
            effect,
            Some(Effect::ShowOverlay {
                slug: "post".to_string(),
                rect: rect(10.0)
            })
        );
        assert_eq!(machine.phase(), Phase::Preparing);
    }

    #[test]
    fn second_click_is_ignored_while_in_flight() {
        let mut machine = TransitionMachine::default();
        let t0 = Instant::now();
        machine.click(t0, "first", rect(10.0)).unwrap();

        assert_eq!(machine.click(t0, "second", rect(20.0)), None);
        assert_eq!(machine.target_slug(), Some("first"));
    }

    #[test]
    fn happy_path_effect_sequence() {
        let mut machine = TransitionMachine::default();
        let t0 = Instant::now();
        let mut now = navigating(&mut machine, t0);

        machine.report_target_rect(rect(99.0));
        let effects = machine.tick(now);
        assert_eq!(
            effects,
            vec![Effect::AnimateOverlay {
                from: rect(10.0),
                to: rect(99.0)
            }]
        );
        assert_eq!(machine.phase(), Phase::AnimatingIn);

        now += timing().animate_duration;
        assert_eq!(machine.tick(now), vec![Effect::RevealContent]);
        assert_eq!(machine.phase(), Phase::Settling);

        now += timing().settle_duration;
        assert_eq!(machine.tick(now), vec![Effect::RemoveOverlay]);
        assert_eq!(machine.phase(), Phase::Idle);
        assert_eq!(machine.target_slug(), None);
    }

    #[test]
    fn target_rect_reported_early_is_buffered() {
        let mut machine = TransitionMachine::default();
        let t0 = Instant::now();
        machine.click(t0, "post", rect(10.0)).unwrap();

        // Handshake lands while still Preparing.
        machine.report_target_rect(rect(50.0));

        let now = t0 + timing().prepare_delay;
        let effects = machine.tick(now);
        // One tick crosses both steps: navigation commits, then the
        // buffered rect is consumed immediately.
        assert_eq!(
            effects,
            vec![
                Effect::BeginNavigation {
                    slug: "post".to_string()
                },
                Effect::AnimateOverlay {
                    from: rect(10.0),
                    to: rect(50.0)
                },
            ]
        );
        assert_eq!(machine.phase(), Phase::AnimatingIn);
    }

    #[test]
    fn missing_handshake_resets_within_timeout_bound() {
        let mut machine = TransitionMachine::default();
        let t0 = Instant::now();
        let now = navigating(&mut machine, t0);

        // Just before the timeout: still waiting.
        let almost = now + timing().handshake_timeout - Duration::from_millis(1);
        assert!(machine.tick(almost).is_empty());
        assert_eq!(machine.phase(), Phase::Navigating);

        // At the bound: forced reset, overlay removed.
        let at_bound = now + timing().handshake_timeout;
        assert_eq!(machine.tick(at_bound), vec![Effect::RemoveOverlay]);
        assert_eq!(machine.phase(), Phase::Idle);
    }

    #[test]
    fn rect_after_reset_is_discarded() {
        let mut machine = TransitionMachine::default();
        let t0 = Instant::now();
        let now = navigating(&mut machine, t0);

        machine.tick(now + timing().handshake_timeout);
        assert_eq!(machine.phase(), Phase::Idle);

        // A late report from the dead destination must not revive anything.
        machine.report_target_rect(rect(50.0));
        assert!(machine.tick(now + timing().handshake_timeout).is_empty());
        assert_eq!(machine.phase(), Phase::Idle);
    }

    #[test]
    fn navigation_failure_resets_from_any_phase() {
        let mut machine = TransitionMachine::default();
        let t0 = Instant::now();
        navigating(&mut machine, t0);

        assert_eq!(machine.navigation_failed(), Some(Effect::RemoveOverlay));
        assert_eq!(machine.phase(), Phase::Idle);
        assert_eq!(machine.navigation_failed(), None);
    }

    #[test]
    fn detail_unmount_mid_animation_resets() {
        let mut machine = TransitionMachine::default();
        let t0 = Instant::now();
        let now = navigating(&mut machine, t0);
        machine.report_target_rect(rect(99.0));
        machine.tick(now);
        assert_eq!(machine.phase(), Phase::AnimatingIn);

        assert_eq!(machine.detail_unmounted(), Some(Effect::RemoveOverlay));
        assert_eq!(machine.phase(), Phase::Idle);
    }

    #[test]
    fn stale_deadline_cannot_fire_into_a_new_transition() {
        let mut machine = TransitionMachine::default();
        let t0 = Instant::now();
        let now = navigating(&mut machine, t0);

        // Old transition dies; its handshake deadline dies with it.
        machine.navigation_failed();

        // New transition starts immediately.
        machine.click(now, "next", rect(1.0)).unwrap();
        assert_eq!(machine.phase(), Phase::Preparing);

        // A tick at the *old* handshake deadline must not reset the new
        // transition; only its own prepare delay may advance it.
        let old_deadline = now + timing().handshake_timeout;
        let effects = machine.tick(old_deadline);
        assert_eq!(
            effects,
            vec![Effect::BeginNavigation {
                slug: "next".to_string()
            }]
        );
        assert_eq!(machine.phase(), Phase::Navigating);
    }

    #[test]
    fn tick_in_idle_is_a_no_op() {
        let mut machine = TransitionMachine::default();
        assert!(machine.tick(Instant::now()).is_empty());
        assert_eq!(machine.phase(), Phase::Idle);
    }

    #[test]
    fn rect_arriving_during_navigating_advances_on_next_tick() {
        let mut machine = TransitionMachine::default();
        let t0 = Instant::now();
        let now = navigating(&mut machine, t0);

        // Rect lands halfway through the handshake window.
        let mid = now + Duration::from_millis(300);
        machine.report_target_rect(rect(77.0));
        let effects = machine.tick(mid);
        assert_eq!(
            effects,
            vec![Effect::AnimateOverlay {
                from: rect(10.0),
                to: rect(77.0)
            }]
        );
    }
}
