use arena_common::{ArenaConfig, ConfigError, RoomLayout, SessionId, TargetId, ViewerPose};
use arena_glyph::{GlyphScheduler, VisualHost};
use arena_input::{Action, HandTracker, PointDetector};

use crate::clock::Clock;
use crate::menu;
use crate::session::{SessionMachine, SessionState, Transition, TransitionError, Trigger};
use crate::snapshot::{ArenaSnapshot, TargetInfo};
use crate::ui::{SessionUi, WaitReason};

/// Waiting diagnostics repeat at most this often while the reason is unchanged.
const WAIT_LOG_INTERVAL: f64 = 1.0;

/// What one [`Arena::tick`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// State after the tick.
    pub state: SessionState,
    pub transitions: Vec<Transition>,
    pub countdown: Option<u32>,
    pub spawned: Option<TargetId>,
    pub expired: Vec<TargetId>,
}

impl TickReport {
    fn new(state: SessionState) -> Self {
        Self {
            state,
            transitions: Vec::new(),
            countdown: None,
            spawned: None,
            expired: Vec::new(),
        }
    }
}

/// The session controller.
///
/// Owns the state machine, the glyph scheduler and the pointing detector, and
/// drives the injected collaborators: a clock, a hand tracker, a visual host for
/// glyphs and a UI sink. Nothing is looked up globally; the host calls
/// [`Arena::tick`] once per frame.
pub struct Arena<C: Clock, H: HandTracker, V: VisualHost, U: SessionUi> {
    config: ArenaConfig,
    layout: RoomLayout,
    clock: C,
    hands: H,
    visuals: V,
    ui: U,
    session: SessionId,
    machine: SessionMachine,
    scheduler: GlyphScheduler,
    detector: PointDetector,
    wait: Option<WaitReason>,
    wait_logged_at: Option<f64>,
    /// Clock reading of the previous tick; gaze timers advance by the difference.
    last_now: f64,
    torn_down: bool,
}

impl<C: Clock, H: HandTracker, V: VisualHost, U: SessionUi> Arena<C, H, V, U> {
    pub fn new(
        config: ArenaConfig,
        layout: RoomLayout,
        clock: C,
        hands: H,
        visuals: V,
        ui: U,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let machine = SessionMachine::new(&config.teaser);
        let scheduler = GlyphScheduler::new(&config.glyph, config.seed);
        let last_now = clock.now();
        let mut arena = Self {
            config,
            layout,
            clock,
            hands,
            visuals,
            ui,
            session: SessionId::new(),
            machine,
            scheduler,
            detector: PointDetector::new(),
            wait: None,
            wait_logged_at: None,
            last_now,
            torn_down: false,
        };
        tracing::info!(
            session = %arena.session,
            walls = layout.wall_count(),
            missing = ?layout.missing(),
            "arena created"
        );
        arena.ui.hide_win();
        arena.push_idle_menu();
        Ok(arena)
    }

    /// Advance one frame. Every timer, gaze included, reads the injected clock;
    /// the gaze step is the clock time elapsed since the previous tick.
    pub fn tick(&mut self, viewer: ViewerPose) -> TickReport {
        let _span = tracing::info_span!("arena_tick", session = %self.session).entered();
        let now = self.clock.now();
        let dt = (now - self.last_now).max(0.0) as f32;
        self.last_now = now;
        let mut report = TickReport::new(self.machine.state());
        if self.torn_down {
            return report;
        }

        match self.machine.state() {
            SessionState::Idle => self.tick_idle(now, &mut report),
            SessionState::Teaser => {
                if let Some(countdown) = self.machine.poll(now) {
                    report.countdown = Some(countdown.remaining);
                    let text = self.config.messages.teaser_text(countdown.remaining);
                    self.ui.show_teaser(countdown.remaining, &text);
                    if let Some(t) = countdown.transition {
                        self.enter(t, now);
                        report.transitions.push(t);
                    }
                }
            }
            SessionState::Playing => {
                let r = self.scheduler.tick(now, dt, viewer, &mut self.visuals);
                report.spawned = r.spawned;
                report.expired = r.expired;
                if r.won {
                    self.relay_win(now, &mut report);
                }
            }
            SessionState::Won => {}
        }

        report.state = self.machine.state();
        report
    }

    /// Apply an operator or developer command.
    pub fn apply(&mut self, action: Action) -> Result<Option<Transition>, TransitionError> {
        let now = self.clock.now();
        if self.torn_down && matches!(action, Action::Start | Action::Skip) {
            return Err(TransitionError::TornDown);
        }
        let t = match action {
            Action::Start => self.machine.start(now, Trigger::Start)?,
            Action::Skip => self.machine.skip(now)?,
            Action::Rebuild => {
                self.rebuild();
                return Ok(None);
            }
            Action::Noop => return Ok(None),
        };
        self.enter(t, now);
        Ok(Some(t))
    }

    /// External win relay (host-side gaze or scripted events). Forwards to the
    /// scheduler, which guarantees the session sees the win at most once.
    pub fn notify_target_won(&mut self) -> bool {
        if self.torn_down || self.machine.state() != SessionState::Playing {
            return false;
        }
        if !self.scheduler.notify_won(&mut self.visuals) {
            return false;
        }
        let now = self.clock.now();
        let mut report = TickReport::new(self.machine.state());
        self.relay_win(now, &mut report);
        !report.transitions.is_empty()
    }

    /// Discard all runtime state and return to a fresh menu on the current layout.
    pub fn rebuild(&mut self) {
        self.scheduler.stop_and_clear(&mut self.visuals);
        self.scheduler = GlyphScheduler::new(&self.config.glyph, self.config.seed);
        self.machine.reset();
        self.detector.reset();
        self.wait = None;
        self.wait_logged_at = None;
        self.torn_down = false;
        self.session = SessionId::new();
        tracing::info!(session = %self.session, "arena rebuilt");
        self.ui.hide_win();
        self.push_idle_menu();
    }

    /// Rebuild on a new room layout.
    pub fn rebuild_with(&mut self, layout: RoomLayout) {
        tracing::info!(walls = layout.wall_count(), missing = ?layout.missing(), "layout replaced");
        self.layout = layout;
        self.rebuild();
    }

    /// End the session: destroy every live visual and clear the UI. The state stays
    /// readable, but no tick, command or win relay acts until a rebuild.
    pub fn teardown(&mut self) {
        tracing::info!(session = %self.session, "arena teardown");
        self.torn_down = true;
        self.scheduler.stop_and_clear(&mut self.visuals);
        self.ui.clear_menu();
        self.ui.hide_win();
    }

    pub fn snapshot(&self) -> ArenaSnapshot {
        let now = self.clock.now();
        ArenaSnapshot {
            session: self.session,
            state: self.machine.state(),
            now,
            countdown: self.machine.remaining(now),
            wait: self.wait,
            pointing: self.detector.is_pointing(),
            live: self
                .scheduler
                .targets()
                .map(|t| TargetInfo {
                    id: t.id,
                    wall: t.wall,
                    position: t.pose.position,
                    deadline: t.deadline,
                    gaze_time: t.timer().gaze_time(),
                    looking: t.timer().is_looking(),
                    pulse_speed: t.pulse_speed,
                })
                .collect(),
            next_spawn: self
                .scheduler
                .is_active()
                .then(|| self.scheduler.next_spawn_at()),
            transitions: self.machine.history().len(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    pub fn session_id(&self) -> SessionId {
        self.session
    }

    pub fn wait_reason(&self) -> Option<WaitReason> {
        self.wait
    }

    pub fn machine(&self) -> &SessionMachine {
        &self.machine
    }

    pub fn scheduler(&self) -> &GlyphScheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn layout(&self) -> &RoomLayout {
        &self.layout
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn hands_mut(&mut self) -> &mut H {
        &mut self.hands
    }

    pub fn visuals(&self) -> &V {
        &self.visuals
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    fn tick_idle(&mut self, now: f64, report: &mut TickReport) {
        if !self.hands.is_bound() {
            self.set_wait(Some(WaitReason::NoHandTracking), now);
            self.detector.reset();
        } else {
            self.set_wait(None, now);
            if self.detector.update(&self.hands, &self.config.gesture) {
                match self.machine.start(now, Trigger::Gesture) {
                    Ok(t) => {
                        self.enter(t, now);
                        report.transitions.push(t);
                        return;
                    }
                    Err(err) => tracing::debug!(%err, "gesture ignored"),
                }
            }
        }
        self.push_idle_menu();
    }

    fn relay_win(&mut self, now: f64, report: &mut TickReport) {
        match self.machine.win(now) {
            Ok(t) => {
                self.enter(t, now);
                report.transitions.push(t);
            }
            Err(err) => tracing::warn!(%err, "win relay rejected"),
        }
    }

    /// Side effects of arriving in `t.to`.
    fn enter(&mut self, t: Transition, now: f64) {
        match t.to {
            SessionState::Idle => self.push_idle_menu(),
            SessionState::Teaser => {
                let remaining = self.machine.remaining(now).unwrap_or(0);
                let text = self.config.messages.teaser_text(remaining);
                self.ui.show_teaser(remaining, &text);
            }
            SessionState::Playing => {
                self.ui.clear_menu();
                self.ui.hide_win();
                if self.config.glyph.enabled {
                    self.scheduler.begin(now, self.layout, &mut self.visuals);
                } else {
                    tracing::info!("glyphs disabled, nothing to spawn");
                }
            }
            SessionState::Won => {
                self.scheduler.stop_and_clear(&mut self.visuals);
                self.ui.show_win(&self.config.messages.win);
            }
        }
    }

    fn set_wait(&mut self, wait: Option<WaitReason>, now: f64) {
        let changed = wait != self.wait;
        match wait {
            Some(reason) => {
                let due = self
                    .wait_logged_at
                    .is_none_or(|at| now - at >= WAIT_LOG_INTERVAL);
                if changed || due {
                    tracing::info!(%reason, "waiting to start");
                    self.wait_logged_at = Some(now);
                }
            }
            None if changed => {
                tracing::info!("hand tracking available");
                self.wait_logged_at = None;
            }
            None => {}
        }
        self.wait = wait;
    }

    fn push_idle_menu(&mut self) {
        let text = menu::idle_text(
            &self.config.messages,
            self.config.gesture.trigger,
            self.wait,
            self.detector.is_pointing(),
        );
        self.ui.show_idle_menu(&text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use arena_common::{TeaserConfig, Transform};
    use arena_glyph::VisualHandle;
    use arena_input::{HandPose, NoHandTracking, StaticHands};
    use glam::Vec3;
    use std::collections::BTreeSet;

    const DT: f32 = 1.0 / 64.0;

    #[derive(Default)]
    struct Visuals {
        next: u64,
        live: BTreeSet<VisualHandle>,
        destroyed: usize,
    }

    impl VisualHost for Visuals {
        fn spawn_visual(&mut self, _pose: &Transform) -> VisualHandle {
            self.next += 1;
            self.live.insert(VisualHandle(self.next));
            VisualHandle(self.next)
        }

        fn destroy_visual(&mut self, handle: VisualHandle) {
            assert!(self.live.remove(&handle));
            self.destroyed += 1;
        }
    }

    #[derive(Default)]
    struct Ui {
        idle: Vec<String>,
        teaser: Vec<u32>,
        cleared: usize,
        win: Option<String>,
    }

    impl SessionUi for Ui {
        fn show_idle_menu(&mut self, text: &str) {
            self.idle.push(text.to_string());
        }

        fn show_teaser(&mut self, remaining_secs: u32, _text: &str) {
            if self.teaser.last() != Some(&remaining_secs) {
                self.teaser.push(remaining_secs);
            }
        }

        fn clear_menu(&mut self) {
            self.cleared += 1;
        }

        fn show_win(&mut self, text: &str) {
            self.win = Some(text.to_string());
        }

        fn hide_win(&mut self) {
            self.win = None;
        }
    }

    fn config() -> ArenaConfig {
        ArenaConfig {
            seed: Some(17),
            ..ArenaConfig::default()
        }
    }

    fn room() -> RoomLayout {
        RoomLayout::build(Vec3::new(12.0, 3.2, 12.0), Vec3::ZERO)
    }

    fn arena_with<H: HandTracker>(
        config: ArenaConfig,
        hands: H,
    ) -> Arena<ManualClock, H, Visuals, Ui> {
        Arena::new(
            config,
            room(),
            ManualClock::new(0.0),
            hands,
            Visuals::default(),
            Ui::default(),
        )
        .unwrap()
    }

    fn step<H: HandTracker>(
        arena: &mut Arena<ManualClock, H, Visuals, Ui>,
        viewer: ViewerPose,
    ) -> TickReport {
        arena.clock_mut().advance(f64::from(DT));
        arena.tick(viewer)
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut bad = config();
        bad.teaser.seconds = 0.0;
        let result = Arena::new(
            bad,
            room(),
            ManualClock::new(0.0),
            StaticHands::default(),
            Visuals::default(),
            Ui::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn pointing_edge_runs_teaser_then_play() {
        let mut arena = arena_with(config(), StaticHands::default());
        arena.hands_mut().right = HandPose::open();
        for _ in 0..32 {
            step(&mut arena, ViewerPose::default());
        }
        assert_eq!(arena.state(), SessionState::Idle);

        arena.hands_mut().right = HandPose::pointing();
        let r = step(&mut arena, ViewerPose::default());
        assert_eq!(r.state, SessionState::Teaser);
        assert_eq!(arena.machine().teaser_deadline(), Some(10.515625));

        let mut played_at = Vec::new();
        for _ in 0..(12 * 64) {
            let r = step(&mut arena, ViewerPose::default());
            if r.transitions.iter().any(|t| t.to == SessionState::Playing) {
                played_at.push(arena.snapshot().now);
            }
        }
        assert_eq!(played_at, vec![10.515625]);

        let shown = &arena.ui().teaser;
        assert_eq!(shown.first(), Some(&10));
        assert_eq!(shown.last(), Some(&0));
        assert!(shown.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(arena.ui().cleared, 1);
        assert!(arena.scheduler().is_active());
    }

    #[test]
    fn held_gesture_does_not_restart() {
        let mut arena = arena_with(config(), StaticHands::default());
        arena.hands_mut().right = HandPose::pointing();
        let r = step(&mut arena, ViewerPose::default());
        assert_eq!(r.transitions.len(), 1);
        for _ in 0..64 {
            assert!(step(&mut arena, ViewerPose::default()).transitions.is_empty());
        }
        assert_eq!(arena.machine().history().len(), 1);
    }

    #[test]
    fn no_tracking_waits_with_a_reason() {
        let mut arena = arena_with(config(), NoHandTracking);
        for _ in 0..200 {
            step(&mut arena, ViewerPose::default());
        }
        assert_eq!(arena.state(), SessionState::Idle);
        assert_eq!(arena.wait_reason(), Some(WaitReason::NoHandTracking));
        assert_eq!(arena.snapshot().wait, Some(WaitReason::NoHandTracking));
        let last = arena.ui().idle.last().unwrap();
        assert!(last.contains("no hand tracking"), "{last}");

        let t = arena.apply(Action::Start).unwrap().unwrap();
        assert_eq!(t.to, SessionState::Teaser);
    }

    #[test]
    fn start_during_teaser_begins_play() {
        let mut arena = arena_with(config(), NoHandTracking);
        arena.apply(Action::Start).unwrap();
        step(&mut arena, ViewerPose::default());
        let t = arena.apply(Action::Start).unwrap().unwrap();
        assert_eq!((t.from, t.to), (SessionState::Teaser, SessionState::Playing));
        assert!(arena.scheduler().is_active());
    }

    #[test]
    fn disabled_teaser_skips_the_countdown() {
        let cfg = ArenaConfig {
            teaser: TeaserConfig {
                enabled: false,
                ..TeaserConfig::default()
            },
            ..config()
        };
        let mut arena = arena_with(cfg, StaticHands::default());
        arena.hands_mut().right = HandPose::pointing();
        let r = step(&mut arena, ViewerPose::default());
        assert_eq!(r.state, SessionState::Playing);
        assert!(arena.ui().teaser.is_empty());
    }

    #[test]
    fn gazing_at_a_glyph_wins_the_session() {
        let mut arena = arena_with(config(), StaticHands::default());
        arena.apply(Action::Skip).unwrap();

        let mut viewer = ViewerPose {
            position: Vec3::new(0.0, 1.6, 0.0),
            forward: Vec3::Y,
        };
        let mut wins = 0;
        for _ in 0..(10 * 64) {
            let r = step(&mut arena, viewer);
            if let Some(id) = r.spawned {
                let pos = arena.scheduler().get(id).unwrap().pose.position;
                viewer = ViewerPose::looking_at(viewer.position, pos);
            }
            wins += r
                .transitions
                .iter()
                .filter(|t| t.to == SessionState::Won)
                .count();
        }
        assert_eq!(wins, 1);
        assert_eq!(arena.state(), SessionState::Won);
        assert!(arena.visuals().live.is_empty());
        assert!(arena.ui().win.is_some());
        assert!(arena.snapshot().live.is_empty());
    }

    #[test]
    fn gaze_advances_by_clock_time_between_ticks() {
        let mut arena = arena_with(config(), StaticHands::default());
        arena.apply(Action::Skip).unwrap();

        let mut viewer = ViewerPose {
            position: Vec3::new(0.0, 1.6, 0.0),
            forward: Vec3::Y,
        };
        let mut won_at = None;
        for _ in 0..40 {
            arena.clock_mut().advance(0.25);
            let r = arena.tick(viewer);
            if let Some(id) = r.spawned {
                let pos = arena.scheduler().get(id).unwrap().pose.position;
                viewer = ViewerPose::looking_at(viewer.position, pos);
            }
            if r.state == SessionState::Won {
                won_at = Some(arena.snapshot().now);
                break;
            }
        }
        // spawned at 1.5, then twelve quarter-second steps of gaze
        assert_eq!(won_at, Some(4.5));
    }

    #[test]
    fn ticks_without_clock_progress_add_no_gaze() {
        let mut arena = arena_with(config(), StaticHands::default());
        arena.apply(Action::Skip).unwrap();
        arena.clock_mut().set(1.5);
        let id = arena.tick(ViewerPose::default()).spawned.unwrap();
        let pos = arena.scheduler().get(id).unwrap().pose.position;
        let viewer = ViewerPose::looking_at(Vec3::new(0.0, 1.6, 0.0), pos);

        for _ in 0..500 {
            arena.tick(viewer);
        }
        let snap = arena.snapshot();
        assert_eq!(snap.state, SessionState::Playing);
        assert!(snap.live[0].looking);
        assert_eq!(snap.live[0].gaze_time, 0.0);

        arena.clock_mut().advance(3.0);
        assert_eq!(arena.tick(viewer).state, SessionState::Won);
    }

    #[test]
    fn torn_down_session_ignores_wins_ticks_and_commands() {
        let mut arena = arena_with(config(), StaticHands::default());
        arena.apply(Action::Skip).unwrap();
        arena.clock_mut().set(1.5);
        arena.tick(ViewerPose::default());
        assert_eq!(arena.scheduler().live_count(), 1);

        arena.teardown();
        assert!(!arena.notify_target_won());
        assert_eq!(arena.state(), SessionState::Playing);
        assert!(arena.ui().win.is_none());

        arena.clock_mut().set(10.0);
        let r = arena.tick(ViewerPose::default());
        assert!(r.spawned.is_none());
        assert!(r.transitions.is_empty());
        assert!(arena.visuals().live.is_empty());
        assert_eq!(arena.apply(Action::Start), Err(TransitionError::TornDown));
        assert_eq!(arena.apply(Action::Skip), Err(TransitionError::TornDown));
        assert_eq!(arena.apply(Action::Noop), Ok(None));
        assert_eq!(arena.machine().history().len(), 1);

        arena.apply(Action::Rebuild).unwrap();
        assert_eq!(arena.state(), SessionState::Idle);
        assert!(arena.apply(Action::Skip).is_ok());
    }

    #[test]
    fn double_notify_forwards_once() {
        let mut arena = arena_with(config(), StaticHands::default());
        arena.apply(Action::Skip).unwrap();
        arena.clock_mut().set(1.5);
        arena.tick(ViewerPose::default());
        assert_eq!(arena.scheduler().live_count(), 1);

        assert!(arena.notify_target_won());
        assert!(!arena.notify_target_won());
        assert_eq!(arena.state(), SessionState::Won);
        assert_eq!(arena.visuals().destroyed, 1);
        assert_eq!(arena.machine().history().len(), 2);
    }

    #[test]
    fn notify_outside_play_is_ignored() {
        let mut arena = arena_with(config(), StaticHands::default());
        assert!(!arena.notify_target_won());
        assert_eq!(arena.state(), SessionState::Idle);
    }

    #[test]
    fn rebuild_returns_to_a_fresh_menu() {
        let mut arena = arena_with(config(), StaticHands::default());
        let first = arena.session_id();
        arena.apply(Action::Skip).unwrap();
        arena.clock_mut().set(1.5);
        arena.tick(ViewerPose::default());
        arena.notify_target_won();

        assert_eq!(arena.apply(Action::Rebuild).unwrap(), None);
        assert_eq!(arena.state(), SessionState::Idle);
        assert_ne!(arena.session_id(), first);
        assert!(arena.machine().history().is_empty());
        assert!(arena.ui().win.is_none());
        assert!(!arena.scheduler().is_active());
        assert!(arena.apply(Action::Skip).is_ok());
    }

    #[test]
    fn rebuild_with_swaps_the_layout() {
        let mut arena = arena_with(config(), StaticHands::default());
        arena.rebuild_with(room().without(arena_common::WallId::North));
        assert_eq!(arena.layout().wall_count(), 3);
    }

    #[test]
    fn teardown_destroys_live_glyphs() {
        let cfg = ArenaConfig {
            glyph: arena_common::GlyphConfig {
                one_at_a_time: false,
                ..arena_common::GlyphConfig::default()
            },
            ..config()
        };
        let mut arena = arena_with(cfg, StaticHands::default());
        arena.apply(Action::Skip).unwrap();
        arena.clock_mut().set(1.5);
        arena.tick(ViewerPose::default());
        arena.clock_mut().set(4.3);
        arena.tick(ViewerPose::default());
        assert_eq!(arena.visuals().live.len(), 2);

        arena.teardown();
        assert!(arena.visuals().live.is_empty());
        assert_eq!(arena.state(), SessionState::Playing);
    }

    #[test]
    fn disabled_glyphs_never_spawn() {
        let mut cfg = config();
        cfg.glyph.enabled = false;
        let mut arena = arena_with(cfg, StaticHands::default());
        arena.apply(Action::Skip).unwrap();
        for _ in 0..(10 * 64) {
            assert!(step(&mut arena, ViewerPose::default()).spawned.is_none());
        }
        assert_eq!(arena.state(), SessionState::Playing);
    }

    #[test]
    fn rejected_action_keeps_state() {
        let mut arena = arena_with(config(), StaticHands::default());
        arena.apply(Action::Skip).unwrap();
        assert!(arena.apply(Action::Skip).is_err());
        assert_eq!(arena.apply(Action::Noop).unwrap(), None);
        assert_eq!(arena.state(), SessionState::Playing);
    }

    #[test]
    fn snapshot_reports_countdown_and_targets() {
        let mut arena = arena_with(config(), NoHandTracking);
        arena.apply(Action::Start).unwrap();
        arena.clock_mut().set(2.5);
        assert_eq!(arena.snapshot().countdown, Some(8));

        arena.apply(Action::Skip).unwrap();
        arena.clock_mut().set(5.0);
        arena.tick(ViewerPose::default());
        let snap = arena.snapshot();
        assert_eq!(snap.state, SessionState::Playing);
        assert_eq!(snap.countdown, None);
        assert_eq!(snap.live.len(), 1);
        assert_eq!(snap.transitions, 2);
        assert!(snap.next_spawn.is_some());
    }
}
