use arena_common::TeaserConfig;
use serde::{Deserialize, Serialize};

/// Lifecycle of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// Menu shown, waiting for the trigger.
    Idle,
    /// Countdown before play; the glyph scheduler is off.
    Teaser,
    /// Glyph scheduler running.
    Playing,
    /// Terminal until a rebuild.
    Won,
}

/// What caused a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    /// Rising edge of the pointing gesture.
    Gesture,
    /// Operator override: behaves like the gesture in the menu, ends the teaser early.
    Start,
    /// Dev shortcut straight into play.
    Skip,
    /// Teaser deadline reached.
    TeaserElapsed,
    /// A glyph was gazed at long enough.
    GlyphWon,
}

/// A recorded state change. The history is the audit trail of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: SessionState,
    pub to: SessionState,
    pub trigger: Trigger,
    /// Unscaled clock time of the change.
    pub at: f64,
}

/// A transition request the current state does not accept.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransitionError {
    #[error("{trigger:?} is not accepted while {state:?}")]
    NotAllowed {
        state: SessionState,
        trigger: Trigger,
    },
    #[error("session was torn down; rebuild to start again")]
    TornDown,
}

/// Result of polling the teaser.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countdown {
    /// Whole seconds left, rounded up, never below zero.
    pub remaining: u32,
    /// Set on the tick the deadline passes.
    pub transition: Option<Transition>,
}

/// The session state machine.
///
/// Pure with respect to time: every operation takes the current unscaled time.
/// Side effects (UI, scheduler) are applied by the caller from the returned
/// transitions.
#[derive(Debug, Clone)]
pub struct SessionMachine {
    state: SessionState,
    teaser_enabled: bool,
    teaser_seconds: f64,
    deadline: Option<f64>,
    history: Vec<Transition>,
}

impl SessionMachine {
    pub fn new(teaser: &TeaserConfig) -> Self {
        Self {
            state: SessionState::Idle,
            teaser_enabled: teaser.enabled,
            teaser_seconds: f64::from(teaser.seconds.max(1.0)),
            deadline: None,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Absolute end of the running teaser.
    pub fn teaser_deadline(&self) -> Option<f64> {
        self.deadline
    }

    pub fn teaser_seconds(&self) -> f64 {
        self.teaser_seconds
    }

    /// Every transition since the last reset, oldest first.
    pub fn history(&self) -> &[Transition] {
        &self.history
    }

    /// Drain and return the history.
    pub fn drain_history(&mut self) -> Vec<Transition> {
        std::mem::take(&mut self.history)
    }

    /// Gesture edge or `Start` override.
    ///
    /// Idle goes to Teaser (or straight to Playing with the teaser disabled).
    /// `Start` during the teaser cancels it into Playing.
    pub fn start(&mut self, now: f64, trigger: Trigger) -> Result<Transition, TransitionError> {
        match (self.state, trigger) {
            (SessionState::Idle, Trigger::Gesture | Trigger::Start) => {
                if self.teaser_enabled {
                    self.deadline = Some(now + self.teaser_seconds);
                    Ok(self.transition(SessionState::Teaser, trigger, now))
                } else {
                    Ok(self.transition(SessionState::Playing, trigger, now))
                }
            }
            (SessionState::Teaser, Trigger::Start) => {
                Ok(self.transition(SessionState::Playing, trigger, now))
            }
            (state, trigger) => Err(TransitionError::NotAllowed { state, trigger }),
        }
    }

    /// Dev shortcut: straight into play from the menu or the teaser.
    pub fn skip(&mut self, now: f64) -> Result<Transition, TransitionError> {
        match self.state {
            SessionState::Idle | SessionState::Teaser => {
                Ok(self.transition(SessionState::Playing, Trigger::Skip, now))
            }
            state => Err(TransitionError::NotAllowed {
                state,
                trigger: Trigger::Skip,
            }),
        }
    }

    /// Remaining whole seconds of the teaser at `now`, if one is running.
    pub fn remaining(&self, now: f64) -> Option<u32> {
        match (self.state, self.deadline) {
            (SessionState::Teaser, Some(deadline)) => Some((deadline - now).ceil().max(0.0) as u32),
            _ => None,
        }
    }

    /// Advance the teaser. Returns `None` outside the teaser.
    ///
    /// On the tick where `now` reaches the deadline the countdown reads 0 and the
    /// machine moves to Playing in the same call.
    pub fn poll(&mut self, now: f64) -> Option<Countdown> {
        let remaining = self.remaining(now)?;
        let deadline = self.deadline?;
        let transition = (now >= deadline)
            .then(|| self.transition(SessionState::Playing, Trigger::TeaserElapsed, now));
        Some(Countdown {
            remaining,
            transition,
        })
    }

    /// Relay of a glyph win.
    pub fn win(&mut self, now: f64) -> Result<Transition, TransitionError> {
        match self.state {
            SessionState::Playing => Ok(self.transition(SessionState::Won, Trigger::GlyphWon, now)),
            state => Err(TransitionError::NotAllowed {
                state,
                trigger: Trigger::GlyphWon,
            }),
        }
    }

    /// Back to a fresh Idle. Only a rebuild does this; it discards the history too.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.deadline = None;
        self.history.clear();
    }

    fn transition(&mut self, to: SessionState, trigger: Trigger, now: f64) -> Transition {
        let t = Transition {
            from: self.state,
            to,
            trigger,
            at: now,
        };
        tracing::info!(from = ?t.from, to = ?t.to, trigger = ?trigger, at = now, "session transition");
        self.state = to;
        if to != SessionState::Teaser {
            self.deadline = None;
        }
        self.history.push(t);
        t
    }
}
