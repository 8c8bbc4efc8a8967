//! Session lifecycle controller
//!
//! Owns the simulation state and the collaborator ports, and runs the
//! `Idle -> Playing -> GameOver -> Resuming -> Playing` state machine.
//! The frame loop only advances while `Playing`; leaving that phase is
//! what cancels further ticking, so a torn-down session can never be
//! mutated by a stale frame.
//!
//! All persistence writes are fire-and-forget: failures are logged and
//! the next state-changing event triggers another write.

use rand::{Rng as _, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::feedback::{Feedback, FeedbackKind};
use crate::persistence::PlayerStore;
use crate::player::{Period, PlayerRecord};
use crate::reward::{RewardGate, RewardOutcome};
use crate::sim::{tick, FrameInput, GameEvent, SimState, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Playing,
    GameOver,
    Resuming,
}

/// One player's play session, from load to exit.
pub struct Session<S, F, G> {
    phase: SessionPhase,
    state: SimState,
    view: Viewport,
    user_id: String,
    record: PlayerRecord,
    /// Reward-gated continues used this session.
    continues_used: u8,
    /// Currency actually credited this session (post-clamp), the base for
    /// the double-claim bonus.
    session_earned: u32,
    rng: Pcg32,
    events: Vec<GameEvent>,
    store: S,
    feedback: F,
    reward: G,
}

impl<S: PlayerStore, F: Feedback, G: RewardGate> Session<S, F, G> {
    /// Load (or create) the player record, apply period rollover, and set
    /// up an idle session.
    pub fn new(
        user_id: impl Into<String>,
        view: Viewport,
        store: S,
        feedback: F,
        reward: G,
    ) -> Self {
        let user_id = user_id.into();
        let period = Period::current();
        let mut record = match store.load(&user_id) {
            Ok(Some(record)) => record,
            Ok(None) => PlayerRecord::new(period),
            Err(e) => {
                log::warn!("player record load failed, starting fresh: {e}");
                PlayerRecord::new(period)
            }
        };
        if record.apply_rollover(period) {
            log::info!("period rollover applied for {user_id}");
            if let Err(e) = store.save(&user_id, &record) {
                log::warn!("player record save failed: {e}");
            }
        }

        let mut state = SimState::new(view);
        state.daily_earnings = record.daily_earnings;

        Self {
            phase: SessionPhase::Idle,
            state,
            view,
            user_id,
            record,
            continues_used: 0,
            session_earned: 0,
            rng: Pcg32::seed_from_u64(rand::rng().random()),
            events: Vec::new(),
            store,
            feedback,
            reward,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn sim(&self) -> &SimState {
        &self.state
    }

    pub fn view(&self) -> Viewport {
        self.view
    }

    pub fn record(&self) -> &PlayerRecord {
        &self.record
    }

    pub fn continues_left(&self) -> u8 {
        MAX_CONTINUES - self.continues_used
    }

    pub fn session_earned(&self) -> u32 {
        self.session_earned
    }

    /// Idle -> Playing.
    pub fn start(&mut self) {
        if self.phase == SessionPhase::Idle {
            self.begin_run();
        }
    }

    /// GameOver -> Playing with a fresh run.
    pub fn restart(&mut self) {
        if self.phase == SessionPhase::GameOver {
            self.begin_run();
        }
    }

    fn begin_run(&mut self) {
        self.state = SimState::new(self.view);
        self.state.daily_earnings = self.record.daily_earnings;
        self.continues_used = 0;
        self.session_earned = 0;
        // Fresh, unseeded run: gameplay is not meant to be replayable.
        self.rng = Pcg32::seed_from_u64(rand::rng().random());
        self.phase = SessionPhase::Playing;
        log::info!("run started (daily earnings {})", self.record.daily_earnings);
    }

    /// Advance one frame. A no-op outside `Playing`, which is what makes
    /// teardown deterministic: flipping the phase cancels the loop.
    pub fn frame(&mut self, now_ms: f64, holding: bool) {
        if self.phase != SessionPhase::Playing {
            return;
        }
        let input = FrameInput { holding, now_ms };
        let mut events = std::mem::take(&mut self.events);
        let survived = tick(&mut self.state, &input, self.view, &mut self.rng, &mut events);
        for event in events.drain(..) {
            self.handle_event(event);
        }
        self.events = events;
        if !survived {
            self.end_game();
        }
    }

    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::ObstaclePassed { milestone, .. } => {
                self.feedback.emit(if milestone {
                    FeedbackKind::NotifySuccess
                } else {
                    FeedbackKind::ImpactLight
                });
            }
            GameEvent::DifficultyChanged { .. } => {}
            GameEvent::ItemCollected { value } => {
                let credited = self.credit(value);
                self.session_earned += credited;
                self.feedback.emit(FeedbackKind::NotifySuccess);
            }
            GameEvent::Died { cause } => {
                log::info!("run ended: {cause:?}, score {}", self.state.score);
                self.feedback.emit(FeedbackKind::NotifyError);
            }
        }
    }

    /// Capped currency accrual: partial credit near the daily cap, zero
    /// once exhausted. Returns the amount actually credited.
    fn credit(&mut self, value: u32) -> u32 {
        let allowed = DAILY_EARN_CAP.saturating_sub(self.record.daily_earnings);
        let credited = value.min(allowed);
        if credited > 0 {
            self.record.total_currency += credited as u64;
            self.record.daily_earnings += credited;
            // Mirror back into the sim so the spawn gate sees it.
            self.state.daily_earnings = self.record.daily_earnings;
            self.save_record();
        } else {
            log::debug!("daily cap reached, {value} not credited");
        }
        credited
    }

    fn end_game(&mut self) {
        self.phase = SessionPhase::GameOver;
        self.record.record_score(self.state.score);
        self.save_record();
    }

    /// GameOver -> Resuming, gated on the reward collaborator and a fixed
    /// budget of continues. An exhausted budget is refused without
    /// consulting the gate.
    pub fn continue_via_reward(&mut self) -> bool {
        if self.phase != SessionPhase::GameOver {
            return false;
        }
        if self.continues_used >= MAX_CONTINUES {
            log::info!("continue refused: budget exhausted");
            return false;
        }
        match self.reward.request() {
            RewardOutcome::Granted => {
                self.continues_used += 1;
                self.record.ad_watch_count += 1;
                self.save_record();
                self.phase = SessionPhase::Resuming;
                true
            }
            RewardOutcome::Declined => {
                log::info!("continue declined by reward gate");
                self.feedback.emit(FeedbackKind::NotifyWarning);
                false
            }
        }
    }

    /// Resuming -> Playing, once the host's countdown has run. Sanitizes
    /// the sim so the continued run cannot die instantly: player
    /// recentered and stilled, hold cleared, imminent obstacles removed,
    /// frame timing re-anchored.
    pub fn resume(&mut self) {
        if self.phase != SessionPhase::Resuming {
            return;
        }
        self.state.y = self.view.height / 2.0;
        self.state.velocity = 0.0;
        self.state.holding = false;
        self.state.obstacles.retain(|o| o.x > RESUME_CLEAR_X);
        self.state.last_frame_time = 0.0;
        self.phase = SessionPhase::Playing;
        self.feedback.emit(FeedbackKind::NotifySuccess);
        log::info!("run resumed ({} continues left)", self.continues_left());
    }

    /// GameOver -> Idle with the session's earnings credited a second
    /// time. The doubled amount goes through the same capped accrual
    /// path, so the daily cap still binds.
    pub fn claim_double(&mut self) -> bool {
        if self.phase != SessionPhase::GameOver {
            return false;
        }
        match self.reward.request() {
            RewardOutcome::Granted => {
                let credited = self.credit(self.session_earned);
                log::info!("double claim: +{credited}");
                self.feedback.emit(FeedbackKind::NotifySuccess);
                self.exit();
                true
            }
            RewardOutcome::Declined => {
                self.feedback.emit(FeedbackKind::NotifyWarning);
                false
            }
        }
    }

    /// Back to Idle with a clean sim.
    pub fn exit(&mut self) {
        self.state = SimState::new(self.view);
        self.state.daily_earnings = self.record.daily_earnings;
        self.phase = SessionPhase::Idle;
    }

    fn save_record(&mut self) {
        if let Err(e) = self.store.save(&self.user_id, &self.record) {
            log::warn!("player record save failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;

    use crate::persistence::MemoryStore;
    use crate::sim::{Item, ItemKind, Obstacle, Trend};

    use super::*;

    const VIEW: Viewport = Viewport {
        width: 420.0,
        height: 780.0,
    };

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<FeedbackKind>>>);

    impl Feedback for Recorder {
        fn emit(&self, kind: FeedbackKind) {
            self.0.borrow_mut().push(kind);
        }
    }

    struct Scripted {
        outcome: RewardOutcome,
        calls: u32,
    }

    impl Scripted {
        fn granting() -> Self {
            Self {
                outcome: RewardOutcome::Granted,
                calls: 0,
            }
        }

        fn declining() -> Self {
            Self {
                outcome: RewardOutcome::Declined,
                calls: 0,
            }
        }
    }

    impl RewardGate for Scripted {
        fn request(&mut self) -> RewardOutcome {
            self.calls += 1;
            self.outcome
        }
    }

    type TestSession = Session<MemoryStore, Recorder, Scripted>;

    fn session_with(record: Option<PlayerRecord>, reward: Scripted) -> (TestSession, Recorder) {
        let store = MemoryStore::new();
        if let Some(record) = record {
            store.save("tester", &record).unwrap();
        }
        let recorder = Recorder::default();
        let session = Session::new("tester", VIEW, store, recorder.clone(), reward);
        (session, recorder)
    }

    fn current_record(daily_earnings: u32) -> PlayerRecord {
        let mut record = PlayerRecord::new(Period::current());
        record.daily_earnings = daily_earnings;
        record
    }

    fn kill_player(session: &mut TestSession) {
        session.state.y = VIEW.floor_y() + 10.0;
        session.state.velocity = TERMINAL_VELOCITY;
        // Generator stays quiet so the frame is just the fall.
        session.state.last_obstacle_time = 1e12;
        session.frame(16.0, false);
    }

    fn obstacle_at(x: f32) -> Obstacle {
        Obstacle {
            x,
            y: 0.0,
            width: OBSTACLE_WIDTH,
            height: 100.0,
            passed: false,
            trend: Trend::Neutral,
        }
    }

    #[test]
    fn floor_death_transitions_and_records_bests() {
        let (mut session, recorder) = session_with(None, Scripted::granting());
        session.start();
        assert_eq!(session.phase(), SessionPhase::Playing);
        session.state.score = 250;

        kill_player(&mut session);

        assert_eq!(session.phase(), SessionPhase::GameOver);
        assert_eq!(session.record().best_score, 250);
        assert_eq!(session.record().daily_best, 250);
        assert_eq!(session.record().weekly_best, 250);
        assert!(recorder.0.borrow().contains(&FeedbackKind::NotifyError));

        // The write went through to the store.
        let stored = session.store.load("tester").unwrap().unwrap();
        assert_eq!(stored.best_score, 250);
    }

    #[test]
    fn frames_are_ignored_outside_playing() {
        let (mut session, _) = session_with(None, Scripted::granting());
        // Idle: nothing moves.
        session.frame(16.0, true);
        assert_eq!(session.sim().velocity, 0.0);

        session.start();
        kill_player(&mut session);
        let y = session.sim().y;
        // GameOver: a stale frame callback must not mutate state.
        session.frame(64.0, true);
        assert_eq!(session.sim().y, y);
    }

    #[test]
    fn accrual_clamps_at_daily_cap() {
        let (mut session, _) = session_with(Some(current_record(980)), Scripted::granting());
        session.start();
        assert_eq!(session.sim().daily_earnings, 980);
        session.state.last_obstacle_time = 1e12;

        // An item worth 50 at the player's center: only 20 fits.
        let player_center = Vec2::new(PLAYER_X, session.state.y + CANDLE_HEIGHT / 2.0);
        session.state.items.push(Item {
            pos: player_center,
            size: ITEM_SIZE,
            collected: false,
            kind: ItemKind::BigBonus,
            value: 50,
        });
        session.frame(16.0, true);

        assert_eq!(session.record().daily_earnings, DAILY_EARN_CAP);
        assert_eq!(session.record().total_currency, 20);
        assert_eq!(session.session_earned(), 20);
        assert_eq!(session.sim().daily_earnings, DAILY_EARN_CAP);

        // At the cap a further pickup credits nothing.
        let player_center = Vec2::new(PLAYER_X, session.state.y + CANDLE_HEIGHT / 2.0);
        session.state.items.push(Item {
            pos: player_center,
            size: ITEM_SIZE,
            collected: false,
            kind: ItemKind::BigBonus,
            value: 50,
        });
        session.frame(32.0, true);
        assert_eq!(session.record().total_currency, 20);
        assert_eq!(session.record().daily_earnings, DAILY_EARN_CAP);
    }

    #[test]
    fn continue_budget_is_three() {
        let (mut session, _) = session_with(None, Scripted::granting());
        session.start();

        for expected_left in [2u8, 1, 0] {
            kill_player(&mut session);
            assert!(session.continue_via_reward());
            assert_eq!(session.phase(), SessionPhase::Resuming);
            assert_eq!(session.continues_left(), expected_left);
            session.resume();
            assert_eq!(session.phase(), SessionPhase::Playing);
        }

        kill_player(&mut session);
        assert!(!session.continue_via_reward());
        assert_eq!(session.phase(), SessionPhase::GameOver);
        // The fourth attempt never reached the reward gate.
        assert_eq!(session.reward.calls, 3);
        assert_eq!(session.record().ad_watch_count, 3);
    }

    #[test]
    fn declined_reward_stays_in_game_over() {
        let (mut session, _) = session_with(None, Scripted::declining());
        session.start();
        kill_player(&mut session);
        assert!(!session.continue_via_reward());
        assert_eq!(session.phase(), SessionPhase::GameOver);
        assert_eq!(session.record().ad_watch_count, 0);
    }

    #[test]
    fn resume_sanitizes_the_sim() {
        let (mut session, _) = session_with(None, Scripted::granting());
        session.start();
        session.state.obstacles.push(obstacle_at(150.0));
        session.state.obstacles.push(obstacle_at(500.0));
        kill_player(&mut session);

        assert!(session.continue_via_reward());
        session.resume();

        assert_eq!(session.phase(), SessionPhase::Playing);
        assert_eq!(session.sim().y, VIEW.height / 2.0);
        assert_eq!(session.sim().velocity, 0.0);
        assert!(!session.sim().holding);
        // The imminent obstacle is gone, the distant one survives.
        assert_eq!(session.sim().obstacles.len(), 1);
        assert_eq!(session.sim().obstacles[0].x, 500.0);
        // Frame timing re-anchored: the next frame is an ideal 1x step.
        assert_eq!(session.sim().last_frame_time, 0.0);
        // Score survives a continue.
        assert!(session.sim().obstacles_passed == 0);
    }

    #[test]
    fn restart_resets_run_state() {
        let (mut session, _) = session_with(None, Scripted::granting());
        session.start();
        session.state.score = 90;
        session.state.obstacles_passed = 9;
        kill_player(&mut session);

        session.restart();
        assert_eq!(session.phase(), SessionPhase::Playing);
        assert_eq!(session.sim().score, 0);
        assert_eq!(session.sim().obstacles_passed, 0);
        assert_eq!(session.sim().difficulty, 1);
        assert_eq!(session.continues_left(), MAX_CONTINUES);
    }

    #[test]
    fn claim_double_respects_cap_and_exits() {
        let (mut session, _) = session_with(Some(current_record(900)), Scripted::granting());
        session.start();
        session.state.last_obstacle_time = 1e12;

        let player_center = Vec2::new(PLAYER_X, session.state.y + CANDLE_HEIGHT / 2.0);
        session.state.items.push(Item {
            pos: player_center,
            size: ITEM_SIZE,
            collected: false,
            kind: ItemKind::BigBonus,
            value: 80,
        });
        session.frame(16.0, true);
        assert_eq!(session.session_earned(), 80);
        assert_eq!(session.record().daily_earnings, 980);

        kill_player(&mut session);
        assert!(session.claim_double());
        // Only 20 of the doubled 80 fit under the cap.
        assert_eq!(session.record().daily_earnings, DAILY_EARN_CAP);
        assert_eq!(session.record().total_currency, 100);
        assert_eq!(session.phase(), SessionPhase::Idle);
    }
}
