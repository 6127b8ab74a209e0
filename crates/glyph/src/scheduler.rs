use std::collections::BTreeMap;

use arena_common::{GlyphConfig, RoomLayout, TargetId, Transform, ViewerPose, WallFrame, WallId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::gaze::{GazeState, GazeTimer};
use crate::host::{VisualHandle, VisualHost};
use crate::placement::spawn_pose;

/// Delay before re-checking when a spawn is blocked by the one-at-a-time rule.
/// Fixed; independent of the configured spawn interval.
pub const RETRY_DELAY: f64 = 0.25;

/// Random wall picks attempted before falling back to the first slot.
const WALL_PICK_TRIES: usize = 8;

/// Emission pulse speed range handed to the host for each glyph.
const PULSE_SPEED_RANGE: (f32, f32) = (1.6, 2.6);

/// One live glyph. Owned by the scheduler's live-set and nothing else.
#[derive(Debug, Clone)]
pub struct GlyphTarget {
    pub id: TargetId,
    pub wall: WallId,
    pub pose: Transform,
    pub spawned_at: f64,
    /// Absolute unscaled time at which the target expires.
    pub deadline: f64,
    pub visual: VisualHandle,
    pub pulse_speed: f32,
    timer: GazeTimer,
}

impl GlyphTarget {
    pub fn timer(&self) -> &GazeTimer {
        &self.timer
    }

    pub fn is_expired(&self, now: f64) -> bool {
        now >= self.deadline
    }
}

/// What happened during one scheduler tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulerReport {
    pub expired: Vec<TargetId>,
    pub spawned: Option<TargetId>,
    /// A due spawn was pushed back by [`RETRY_DELAY`].
    pub deferred: bool,
    /// A due spawn found no wall to use.
    pub skipped: bool,
    /// A gaze timer completed and the win must be forwarded to the session.
    pub won: bool,
}

/// Spawns glyphs on the room walls while the game is running and owns every
/// live target until it expires, is won, or the session is torn down.
///
/// Tick order: expired targets are destroyed first, then a due spawn is
/// evaluated, then surviving targets' gaze timers run. A target therefore can
/// never expire and win on the same tick.
pub struct GlyphScheduler<R: Rng = StdRng> {
    config: GlyphConfig,
    rng: R,
    layout: RoomLayout,
    live: BTreeMap<TargetId, GlyphTarget>,
    next_id: u64,
    next_spawn: f64,
    active: bool,
    won: bool,
}

impl GlyphScheduler<StdRng> {
    /// Scheduler with a seeded RNG, or an entropy-seeded one when `seed` is `None`.
    pub fn new(config: &GlyphConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> GlyphScheduler<R> {
    pub fn with_rng(config: &GlyphConfig, rng: R) -> Self {
        Self {
            config: config.sanitized(),
            rng,
            layout: RoomLayout::empty(glam::Vec3::ZERO),
            live: BTreeMap::new(),
            next_id: 0,
            next_spawn: f64::INFINITY,
            active: false,
            won: false,
        }
    }

    /// Start spawning on `layout`. Any leftovers from a previous run are destroyed.
    /// The first spawn is due half an interval from now.
    pub fn begin(&mut self, now: f64, layout: RoomLayout, host: &mut impl VisualHost) {
        self.clear_targets(host);
        self.layout = layout;
        self.won = false;
        self.active = true;
        self.next_spawn = now + f64::from(self.config.spawn_interval) * 0.5;
        tracing::info!(
            walls = layout.wall_count(),
            first_spawn = self.next_spawn,
            "glyph scheduler started"
        );
    }

    /// Stop spawning and destroy every live target before returning.
    pub fn stop_and_clear(&mut self, host: &mut impl VisualHost) {
        if self.active {
            tracing::info!(live = self.live.len(), "glyph scheduler stopped");
        }
        self.active = false;
        self.next_spawn = f64::INFINITY;
        self.clear_targets(host);
    }

    pub fn tick(
        &mut self,
        now: f64,
        dt: f32,
        viewer: ViewerPose,
        host: &mut impl VisualHost,
    ) -> SchedulerReport {
        let mut report = SchedulerReport::default();
        if !self.active {
            return report;
        }

        report.expired = self.remove_expired(now, host);

        if now >= self.next_spawn {
            if self.config.one_at_a_time && !self.live.is_empty() {
                self.next_spawn = now + RETRY_DELAY;
                report.deferred = true;
                tracing::trace!(retry_at = self.next_spawn, "spawn deferred, glyph still live");
            } else {
                match self.choose_wall() {
                    Some(wall) => report.spawned = Some(self.spawn_on(&wall, now, host)),
                    None => {
                        report.skipped = true;
                        tracing::warn!(
                            missing = ?self.layout.missing(),
                            "no wall available for glyph spawn, retrying next interval"
                        );
                    }
                }
                self.next_spawn = now + f64::from(self.config.spawn_interval);
            }
        }

        let mut winner = None;
        for (id, target) in self.live.iter_mut() {
            // glyphs spawned this tick start timing on the next one
            if Some(*id) == report.spawned {
                continue;
            }
            let state = target.timer.tick(viewer.position, viewer.forward, dt);
            tracing::trace!(%id, ?state, gaze = target.timer.gaze_time(), "gaze");
            if state == GazeState::Won {
                winner = Some(*id);
                break;
            }
        }

        if let Some(id) = winner {
            tracing::info!(%id, "glyph gazed down");
            report.won = self.notify_won(host);
        }

        report
    }

    /// Win relay. The first call stops spawning, destroys every live target and
    /// returns true so the caller forwards the win. Later calls do nothing.
    pub fn notify_won(&mut self, host: &mut impl VisualHost) -> bool {
        if self.won {
            return false;
        }
        self.won = true;
        self.stop_and_clear(host);
        true
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn has_won(&self) -> bool {
        self.won
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Live targets in spawn order.
    pub fn targets(&self) -> impl Iterator<Item = &GlyphTarget> {
        self.live.values()
    }

    pub fn get(&self, id: TargetId) -> Option<&GlyphTarget> {
        self.live.get(&id)
    }

    /// Absolute time of the next spawn attempt (infinite while stopped).
    pub fn next_spawn_at(&self) -> f64 {
        self.next_spawn
    }

    pub fn config(&self) -> &GlyphConfig {
        &self.config
    }

    fn remove_expired(&mut self, now: f64, host: &mut impl VisualHost) -> Vec<TargetId> {
        let expired: Vec<TargetId> = self
            .live
            .values()
            .filter(|t| t.is_expired(now))
            .map(|t| t.id)
            .collect();
        for id in &expired {
            if let Some(target) = self.live.remove(id) {
                tracing::debug!(%id, wall = ?target.wall, "glyph expired");
                host.destroy_visual(target.visual);
            }
        }
        expired
    }

    fn choose_wall(&mut self) -> Option<WallFrame> {
        let walls = &self.layout.walls;
        for _ in 0..WALL_PICK_TRIES {
            let pick = walls[self.rng.gen_range(0..walls.len())];
            if pick.is_some() {
                return pick;
            }
        }
        walls[0]
    }

    fn spawn_on(&mut self, wall: &WallFrame, now: f64, host: &mut impl VisualHost) -> TargetId {
        let pose = spawn_pose(wall, self.layout.anchor, &self.config, &mut self.rng);
        let pulse_speed = self.rng.gen_range(PULSE_SPEED_RANGE.0..=PULSE_SPEED_RANGE.1);
        let visual = host.spawn_visual(&pose);

        self.next_id += 1;
        let id = TargetId(self.next_id);
        let deadline = now + f64::from(self.config.lifetime);
        tracing::debug!(%id, wall = ?wall.id, position = %pose.position, deadline, "glyph spawned");

        self.live.insert(
            id,
            GlyphTarget {
                id,
                wall: wall.id,
                pose,
                spawned_at: now,
                deadline,
                visual,
                pulse_speed,
                timer: GazeTimer::new(
                    pose.position,
                    self.config.gaze_seconds,
                    self.config.max_angle_deg,
                ),
            },
        );
        id
    }

    fn clear_targets(&mut self, host: &mut impl VisualHost) {
        for (_, target) in std::mem::take(&mut self.live) {
            host.destroy_visual(target.visual);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::collections::BTreeSet;

    /// Step chosen to be exact in binary so absolute times don't drift.
    const DT: f32 = 1.0 / 64.0;

    #[derive(Default)]
    struct RecordingHost {
        next: u64,
        live: BTreeSet<VisualHandle>,
        spawned: usize,
        destroyed: usize,
    }

    impl VisualHost for RecordingHost {
        fn spawn_visual(&mut self, _pose: &Transform) -> VisualHandle {
            self.next += 1;
            self.spawned += 1;
            let h = VisualHandle(self.next);
            self.live.insert(h);
            h
        }

        fn destroy_visual(&mut self, handle: VisualHandle) {
            assert!(self.live.remove(&handle), "double destroy of {handle:?}");
            self.destroyed += 1;
        }
    }

    fn room() -> RoomLayout {
        RoomLayout::build(Vec3::new(12.0, 3.2, 12.0), Vec3::ZERO)
    }

    fn looking_away() -> ViewerPose {
        ViewerPose {
            position: Vec3::new(0.0, 1.6, 0.0),
            forward: Vec3::Y,
        }
    }

    fn scheduler(config: GlyphConfig) -> GlyphScheduler {
        GlyphScheduler::new(&config, Some(42))
    }

    #[test]
    fn idle_scheduler_does_nothing() {
        let mut s = scheduler(GlyphConfig::default());
        let mut host = RecordingHost::default();
        let r = s.tick(100.0, DT, looking_away(), &mut host);
        assert_eq!(r, SchedulerReport::default());
        assert_eq!(host.spawned, 0);
    }

    #[test]
    fn first_spawn_after_half_interval() {
        let mut s = scheduler(GlyphConfig::default());
        let mut host = RecordingHost::default();
        s.begin(0.0, room(), &mut host);
        assert_eq!(s.next_spawn_at(), 1.375);

        assert!(s.tick(1.0, DT, looking_away(), &mut host).spawned.is_none());
        let r = s.tick(1.375, DT, looking_away(), &mut host);
        assert!(r.spawned.is_some());
        assert_eq!(s.live_count(), 1);
        assert_eq!(s.next_spawn_at(), 1.375 + 2.75);
    }

    #[test]
    fn blocked_spawn_retries_every_quarter_second() {
        let config = GlyphConfig {
            spawn_interval: 2.75,
            lifetime: 5.0,
            one_at_a_time: true,
            ..GlyphConfig::default()
        };
        let mut s = scheduler(config);
        let mut host = RecordingHost::default();
        s.begin(0.0, room(), &mut host);

        let mut now = 0.0f64;
        let mut spawns = Vec::new();
        let mut deferrals = Vec::new();
        while spawns.len() < 2 {
            now += f64::from(DT);
            let r = s.tick(now, DT, looking_away(), &mut host);
            if r.spawned.is_some() {
                spawns.push(now);
            }
            if r.deferred {
                deferrals.push(now);
            }
            assert!(s.live_count() <= 1);
            assert!(now < 30.0, "second spawn never happened");
        }

        let first_deadline = spawns[0] + 5.0;
        assert!(spawns[1] >= first_deadline);
        // first deferral when the full interval elapsed while the glyph was still live
        assert!((deferrals[0] - (spawns[0] + 2.75)).abs() <= f64::from(DT));
        for pair in deferrals.windows(2) {
            let gap = pair[1] - pair[0];
            assert!((gap - RETRY_DELAY).abs() <= f64::from(DT), "gap {gap}");
        }
        // the second spawn lands on the first retry after the expiry
        assert!(spawns[1] - first_deadline <= RETRY_DELAY + f64::from(DT));
    }

    #[test]
    fn one_at_a_time_holds_under_random_timing() {
        let mut s = scheduler(GlyphConfig::default());
        let mut host = RecordingHost::default();
        let mut timing = StdRng::seed_from_u64(7);
        s.begin(0.0, room(), &mut host);

        let mut now = 0.0f64;
        for _ in 0..5_000 {
            let dt: f32 = timing.gen_range(0.001..0.2);
            now += f64::from(dt);
            s.tick(now, dt, looking_away(), &mut host);
            assert!(s.live_count() <= 1);
            assert_eq!(host.live.len(), s.live_count());
        }
        assert!(host.spawned > 10);
    }

    #[test]
    fn without_the_rule_targets_overlap() {
        let config = GlyphConfig {
            one_at_a_time: false,
            ..GlyphConfig::default()
        };
        let mut s = scheduler(config);
        let mut host = RecordingHost::default();
        s.begin(0.0, room(), &mut host);
        let mut max_live = 0;
        let mut now = 0.0;
        for _ in 0..1_000 {
            now += f64::from(DT);
            s.tick(now, DT, looking_away(), &mut host);
            max_live = max_live.max(s.live_count());
        }
        assert_eq!(max_live, 2);
    }

    #[test]
    fn expired_target_is_removed_and_never_wins() {
        // lifetime equal to the gaze requirement: expiry must win the race
        let config = GlyphConfig {
            lifetime: 1.0,
            gaze_seconds: 1.0,
            ..GlyphConfig::default()
        };
        let mut s = scheduler(config);
        let mut host = RecordingHost::default();
        s.begin(0.0, room(), &mut host);

        let mut now = 0.0f64;
        let mut viewer = looking_away();
        let mut removed_at = None;
        let mut target = None;
        for _ in 0..200 {
            now += f64::from(DT);
            let r = s.tick(now, DT, viewer, &mut host);
            assert!(!r.won, "expired glyph declared won");
            if let Some(id) = r.spawned {
                let pos = s.get(id).unwrap().pose.position;
                viewer = ViewerPose::looking_at(viewer.position, pos);
                target = Some((id, s.get(id).unwrap().deadline));
            }
            if let Some((id, deadline)) = target {
                if r.expired.contains(&id) {
                    removed_at = Some(now);
                    assert!(now >= deadline && now - deadline < f64::from(DT));
                    break;
                }
            }
        }
        assert!(removed_at.is_some());
        assert!(!s.has_won());
        assert_eq!(host.destroyed, 1);
    }

    #[test]
    fn sustained_gaze_wins_and_clears_everything() {
        let mut s = scheduler(GlyphConfig::default());
        let mut host = RecordingHost::default();
        s.begin(0.0, room(), &mut host);

        let mut now = 0.0f64;
        let mut viewer = looking_away();
        let mut wins = 0;
        for _ in 0..1_000 {
            now += f64::from(DT);
            let r = s.tick(now, DT, viewer, &mut host);
            if let Some(id) = r.spawned {
                viewer = ViewerPose::looking_at(viewer.position, s.get(id).unwrap().pose.position);
            }
            if r.won {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
        assert!(s.has_won());
        assert!(!s.is_active());
        assert_eq!(s.live_count(), 0);
        assert!(host.live.is_empty());
    }

    #[test]
    fn double_win_notification_forwards_once() {
        let mut s = scheduler(GlyphConfig::default());
        let mut host = RecordingHost::default();
        s.begin(0.0, room(), &mut host);
        s.tick(2.0, DT, looking_away(), &mut host);
        assert_eq!(s.live_count(), 1);

        assert!(s.notify_won(&mut host));
        assert!(!s.notify_won(&mut host));
        assert_eq!(host.destroyed, 1);
        assert!(s.tick(10.0, DT, looking_away(), &mut host).spawned.is_none());
    }

    #[test]
    fn missing_walls_skip_the_spawn() {
        let mut s = scheduler(GlyphConfig::default());
        let mut host = RecordingHost::default();
        s.begin(0.0, RoomLayout::empty(Vec3::ZERO), &mut host);
        let r = s.tick(2.0, DT, looking_away(), &mut host);
        assert!(r.skipped);
        assert_eq!(host.spawned, 0);
        assert_eq!(s.next_spawn_at(), 2.0 + 2.75);
    }

    #[test]
    fn null_wall_slots_are_retried() {
        let layout = room()
            .without(WallId::South)
            .without(WallId::East)
            .without(WallId::West);
        let config = GlyphConfig {
            one_at_a_time: false,
            ..GlyphConfig::default()
        };
        let mut s = scheduler(config);
        let mut host = RecordingHost::default();
        s.begin(0.0, layout, &mut host);
        let mut now = 0.0;
        for _ in 0..20 {
            now += 2.75;
            let r = s.tick(now, DT, looking_away(), &mut host);
            let id = r.spawned.expect("north wall always usable");
            assert_eq!(s.get(id).unwrap().wall, WallId::North);
        }
    }

    #[test]
    fn stop_and_clear_releases_all_visuals() {
        let config = GlyphConfig {
            one_at_a_time: false,
            ..GlyphConfig::default()
        };
        let mut s = scheduler(config);
        let mut host = RecordingHost::default();
        s.begin(0.0, room(), &mut host);
        s.tick(1.5, DT, looking_away(), &mut host);
        s.tick(4.3, DT, looking_away(), &mut host);
        assert_eq!(s.live_count(), 2);

        s.stop_and_clear(&mut host);
        assert_eq!(s.live_count(), 0);
        assert!(host.live.is_empty());
        assert!(!s.is_active());
    }

    #[test]
    fn begin_again_resets_the_win() {
        let mut s = scheduler(GlyphConfig::default());
        let mut host = RecordingHost::default();
        s.begin(0.0, room(), &mut host);
        assert!(s.notify_won(&mut host));
        s.begin(5.0, room(), &mut host);
        assert!(!s.has_won());
        assert!(s.is_active());
    }

    #[test]
    fn target_ids_increase() {
        let config = GlyphConfig {
            one_at_a_time: false,
            ..GlyphConfig::default()
        };
        let mut s = scheduler(config);
        let mut host = RecordingHost::default();
        s.begin(0.0, room(), &mut host);
        let a = s.tick(1.5, DT, looking_away(), &mut host).spawned.unwrap();
        let b = s.tick(4.5, DT, looking_away(), &mut host).spawned.unwrap();
        assert!(a < b);
        let order: Vec<TargetId> = s.targets().map(|t| t.id).collect();
        assert_eq!(order, vec![a, b]);
    }
}
