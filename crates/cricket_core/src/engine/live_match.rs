//! Live Match Session
//!
//! The simulation loop. One `LiveMatchSession` owns every subsystem and the
//! match contexts, accepts commands from the front end and advances the
//! match on `tick(dt)`.
//!
//! Per tick:
//! 1. Due scheduled tasks fire (next automatic ball, run-out verdicts,
//!    innings break, field reset).
//! 2. Physics advances the ball. At the bat plane the shot is resolved and
//!    wides/no-balls are called; physics then carries on with the new flight.
//! 3. Fielders chase a struck ball; a catch ends the ball at once, a pick-up
//!    starts the race between the throw and the batters.
//! 4. The ball's result goes to the state machine, whose events update the
//!    scorecard and are published to every listener.
//!
//! Commands never panic and never half-apply: a rejected command returns
//! `Err(InvalidStateTransition)` and changes nothing.

use nalgebra::Vector3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::assets::{AssetCatalog, AssetKind, AssetRef};
use super::ball::{BallEvent, BallPhysicsEngine, BallState};
use super::bowler::{Bowler, BowlerMode};
use super::config::EngineConfig;
use super::delivery::{Delivery, DeliveryType};
use super::events::{EventBus, ListenerId, MatchEvent, MatchListener};
use super::fielding::{FielderRole, FieldingAI, FieldingEvent, RunRace};
use super::input::{InputAction, RunCommand};
use super::match_context::{chase_target, MatchContext, MatchMode, MatchOptions};
use super::match_state::{DeliveryResult, ExtraKind, MatchPhase, MatchResult, MatchStateMachine, Wicket};
use super::physics_constants::{ground_distance, pitch};
use super::scheduler::{ScheduledAction, SessionId, TaskQueue};
use super::scorecard::ScorecardTracker;
use super::shot::{BoundaryKind, ContactKind, ContactOutcome, ShotAttempt, ShotType};
use super::shot_resolver::ShotResolver;
use super::snapshot::MatchSnapshot;
use super::timestep::{MAX_FRAME_DT, SUBSTEP_DT};
use crate::error::{clamp_config, CoreError, Result};
use crate::models::DismissalType;

/// Fastest delivery accepted from a manual trigger (m/s)
const MAX_MANUAL_SPEED_MPS: f32 = 45.0;
const MIN_MANUAL_SPEED_MPS: f32 = 15.0;
const MAX_MANUAL_LINE_M: f32 = 2.0;

// ============================================
// LiveBall: the delivery in progress
// ============================================

#[derive(Debug, Clone)]
struct LiveBall {
    delivery: Delivery,
    no_ball: bool,
    wide: bool,
    contact: Option<ContactOutcome>,
    /// Session time the ball has been live (s)
    live_s: f32,
    /// `live_s` at contact
    contact_at_s: f32,
    race: Option<RunRace>,
    /// Net Advance/Retreat calls
    run_adjust: i8,
}

impl LiveBall {
    fn new(delivery: Delivery) -> Self {
        Self {
            delivery,
            no_ball: false,
            wide: false,
            contact: None,
            live_s: 0.0,
            contact_at_s: 0.0,
            race: None,
            run_adjust: 0,
        }
    }

    fn struck(&self) -> Option<&ContactOutcome> {
        self.contact.as_ref().filter(|c| c.kind == ContactKind::Struck)
    }

    /// Turn a result into its no-ball version: one penalty run, runs off
    /// the bat kept, only a run-out survives.
    fn called(&self, mut result: DeliveryResult) -> DeliveryResult {
        if !self.no_ball {
            return result;
        }
        result.extra = Some(ExtraKind::NoBall);
        if result.wicket.is_some_and(|w| w.dismissal != DismissalType::RunOut) {
            result.wicket = None;
        }
        result
    }

    /// Ball the batter never touched: wide, byes or a dot
    fn unplayed(&self, byes: u8) -> DeliveryResult {
        let result = if self.wide {
            DeliveryResult::extra(ExtraKind::Wide, byes)
        } else if byes > 0 {
            DeliveryResult::extra(ExtraKind::Bye, byes)
        } else {
            DeliveryResult::dot()
        };
        self.called(result)
    }
}

// ============================================
// LiveMatchSession
// ============================================

pub struct LiveMatchSession {
    config: EngineConfig,
    physics: BallPhysicsEngine,
    resolver: ShotResolver,
    bowler: Bowler,
    fielding: FieldingAI,
    state: MatchStateMachine,
    /// One per batting side; hot-seat multiplayer adds the second at the break
    contexts: Vec<MatchContext>,
    active: usize,
    options: MatchOptions,
    session: SessionId,
    running: bool,
    tasks: TaskQueue,
    /// Match time (s); frozen while paused
    clock_s: f64,
    rng: ChaCha8Rng,
    live: Option<LiveBall>,
    deliveries: u64,
    bus: EventBus,
    scorecard: ScorecardTracker,
    assets: AssetCatalog,
    /// Events not yet handed back by `tick`/`drain_events`
    outbox: Vec<MatchEvent>,
    /// Every event of the current match
    history: Vec<MatchEvent>,
}

impl std::fmt::Debug for LiveMatchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveMatchSession")
            .field("session", &self.session)
            .field("running", &self.running)
            .field("phase", &self.state.phase())
            .field("clock_ms", &self.clock_ms())
            .field("score", &self.context().score)
            .finish()
    }
}

impl LiveMatchSession {
    pub fn new(mut config: EngineConfig) -> Self {
        config.validate();
        let idle = MatchContext::idle(config.rules.default_overs);
        Self {
            physics: BallPhysicsEngine::new(config.physics.clone(), 0),
            resolver: ShotResolver::new(config.shots.clone()),
            bowler: Bowler::automatic(config.bowling.clone()),
            fielding: FieldingAI::new(config.fielding.clone()),
            state: MatchStateMachine::new(config.rules.clone()),
            contexts: vec![idle],
            active: 0,
            options: MatchOptions::default(),
            session: SessionId::default(),
            running: false,
            tasks: TaskQueue::new(),
            clock_s: 0.0,
            rng: ChaCha8Rng::seed_from_u64(0),
            live: None,
            deliveries: 0,
            bus: EventBus::new(),
            scorecard: ScorecardTracker::new(),
            assets: AssetCatalog::new(),
            outbox: Vec::new(),
            history: Vec::new(),
            config,
        }
    }

    // =========================================================================
    // Read-only views
    // =========================================================================

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn session_id(&self) -> SessionId {
        self.session
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn phase(&self) -> MatchPhase {
        self.state.phase()
    }

    pub fn clock_ms(&self) -> u64 {
        (self.clock_s * 1000.0) as u64
    }

    /// Context of the side batting now
    pub fn context(&self) -> &MatchContext {
        &self.contexts[self.active]
    }

    pub fn contexts(&self) -> &[MatchContext] {
        &self.contexts
    }

    pub fn ball(&self) -> &BallState {
        self.physics.state()
    }

    pub fn pending_shot(&self) -> Option<&ShotAttempt> {
        self.resolver.pending()
    }

    pub fn bowler_mode(&self) -> BowlerMode {
        self.bowler.mode()
    }

    pub fn fielding(&self) -> &FieldingAI {
        &self.fielding
    }

    pub fn scorecard(&self) -> &ScorecardTracker {
        &self.scorecard
    }

    pub fn result(&self) -> Option<&MatchResult> {
        self.scorecard.result.as_ref()
    }

    pub fn history(&self) -> &[MatchEvent] {
        &self.history
    }

    /// Deliveries started this match
    pub fn delivery_count(&self) -> u64 {
        self.deliveries
    }

    pub fn scheduled_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn assets_mut(&mut self) -> &mut AssetCatalog {
        &mut self.assets
    }

    pub fn model_for(&mut self, kind: AssetKind) -> AssetRef {
        self.assets.model_for(kind)
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        let ctx = self.context();
        MatchSnapshot {
            session: self.session,
            clock_ms: self.clock_ms(),
            running: self.running,
            phase: self.state.phase(),
            is_paused: ctx.is_paused,
            mode: ctx.mode,
            innings: ctx.current_innings,
            player: ctx.player.clone(),
            team: ctx.team.clone(),
            score: ctx.score,
            overs: ctx.score.overs_display(),
            target: ctx.target,
            overs_limit: ctx.overs_limit,
            striker: ctx.striker().clone(),
            non_striker: ctx.non_striker().clone(),
            batsmen: ctx.batsmen.clone(),
            ball: self.physics.state().clone(),
            bowler: self.bowler.mode(),
            fielders: self.fielding.fielders().to_vec(),
            result: self.scorecard.result.clone(),
        }
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    pub fn subscribe(&mut self, listener: Box<dyn MatchListener>) -> ListenerId {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Events emitted since the last call (commands emit too, not just ticks)
    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn emit(&mut self, event: MatchEvent) {
        self.scorecard.apply(&event);
        self.bus.publish(&event);
        self.history.push(event.clone());
        self.outbox.push(event);
    }

    fn reject(&self, command: &'static str, why: &str) -> CoreError {
        let err = CoreError::InvalidStateTransition { command, phase: format!("{:?} ({why})", self.state.phase()) };
        log::warn!("{err}");
        err
    }

    fn schedule_in(&mut self, delay_s: f32, action: ScheduledAction) {
        let due = self.clock_ms() + (delay_s.max(0.0) as f64 * 1000.0).round() as u64;
        self.tasks.schedule(self.session, due, action);
    }

    fn schedule_auto_delivery(&mut self, delay_s: f32) {
        if self.bowler.is_automatic()
            && self.state.phase() == MatchPhase::AwaitingDelivery
            && !self.tasks.contains(ScheduledAction::AutoDelivery)
        {
            self.schedule_in(delay_s, ScheduledAction::AutoDelivery);
        }
    }

    // =========================================================================
    // Match lifecycle
    // =========================================================================

    /// Start a new match. Anything in progress is torn down first and its
    /// scheduled tasks die with the old session id.
    pub fn start_match(&mut self, mode: MatchMode, options: MatchOptions) -> Result<()> {
        if self.running {
            self.teardown();
        }
        self.session = self.session.next();
        self.tasks.clear();
        self.clock_s = 0.0;
        self.rng = ChaCha8Rng::seed_from_u64(options.seed);
        self.physics.reseed(options.seed);
        self.physics.reset();
        self.fielding.reset_placement();
        self.resolver.begin_delivery();
        self.live = None;
        self.deliveries = 0;
        self.scorecard.clear();
        self.history.clear();
        self.outbox.clear();

        let overs = options.overs_limit(&self.config.rules);
        let (innings, target) = match mode {
            MatchMode::FreePlay | MatchMode::Multiplayer => (1, None),
            MatchMode::TargetChase => (2, Some(chase_target(&options, overs, &self.config.rules, &mut self.rng))),
        };
        let ctx = MatchContext::new(
            mode,
            self.session,
            options.player_names[0].clone(),
            options.team_names[0].clone(),
            &options.batting_orders[0],
            innings,
            overs,
            target,
        );

        self.contexts = vec![ctx];
        self.active = 0;
        let mode = if options.auto_bowler { BowlerMode::Automatic } else { BowlerMode::Manual };
        self.bowler = Bowler::new(self.config.bowling.clone(), mode);
        self.state = MatchStateMachine::new(self.config.rules.clone());
        self.options = options;
        self.running = true;

        log::info!("session {}: {:?} match, {} overs, seed {}", self.session, mode, overs, self.options.seed);
        let started = self.state.begin_innings(&self.contexts[0])?;
        self.emit(started);
        self.schedule_auto_delivery(self.config.rules.first_delivery_s);
        Ok(())
    }

    /// Deliberate teardown back to the menu state
    pub fn end_match(&mut self) -> Result<()> {
        if !self.running {
            return Err(self.reject("end_match", "no match in progress"));
        }
        log::info!("session {} ended at {}", self.session, self.context().score);
        self.teardown();
        Ok(())
    }

    fn teardown(&mut self) {
        self.session = self.session.next();
        self.tasks.clear();
        self.physics.reset();
        self.resolver.begin_delivery();
        self.live = None;
        self.state.end_match();
        self.contexts = vec![MatchContext::idle(self.config.rules.default_overs)];
        self.active = 0;
        self.fielding.reset_for_delivery();
        self.running = false;
    }

    fn begin_next_innings(&mut self) {
        if self.state.phase() != MatchPhase::InningsComplete || self.contexts.len() != 1 {
            return;
        }
        let first = &self.contexts[0];
        let target = first.score.total().max(1);
        let overs = first.overs_limit;
        let ctx = MatchContext::new(
            MatchMode::Multiplayer,
            self.session,
            self.options.player_names[1].clone(),
            self.options.team_names[1].clone(),
            &self.options.batting_orders[1],
            2,
            overs,
            Some(target),
        );
        self.contexts.push(ctx);
        self.active = 1;
        self.fielding.reset_for_delivery();

        match self.state.begin_innings(&self.contexts[1]) {
            Ok(event) => self.emit(event),
            Err(e) => log::warn!("second innings did not start: {e}"),
        }
        self.schedule_auto_delivery(self.config.rules.first_delivery_s);
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Bowl. `None` takes the next ball from the active bowler (the manual
    /// bowler's selection, or a stock straight ball if nothing is selected).
    pub fn start_delivery(&mut self, delivery: Option<Delivery>) -> Result<()> {
        if !self.running || self.context().is_paused {
            return Err(self.reject("start_delivery", "no match in progress or paused"));
        }
        self.state.begin_delivery(&self.contexts[self.active])?;

        let legal_balls = self.contexts[self.active].score.legal_balls;
        let delivery = match delivery {
            Some(d) => Self::sanitize_delivery(d),
            None => self
                .bowler
                .next_delivery(legal_balls, &mut self.rng)
                .unwrap_or_else(|| Delivery::nominal(DeliveryType::Straight)),
        };

        if let Err(e) = self.physics.start_delivery(&delivery) {
            self.state.cancel_delivery();
            return Err(e);
        }
        self.resolver.begin_delivery();
        self.fielding.reset_for_delivery();
        self.tasks.cancel(ScheduledAction::AutoDelivery);
        self.tasks.cancel(ScheduledAction::ResetField);
        self.live = Some(LiveBall::new(delivery));
        self.deliveries += 1;
        Ok(())
    }

    fn sanitize_delivery(mut d: Delivery) -> Delivery {
        if !d.speed.is_finite() || !d.target_line.is_finite() || !d.target_length.is_finite() {
            log::warn!("non-finite manual delivery, bowling a stock {}", d.delivery_type);
            return Delivery { overstep: d.overstep, ..Delivery::nominal(d.delivery_type) };
        }
        d.speed = clamp_config("delivery.speed", d.speed, MIN_MANUAL_SPEED_MPS, MAX_MANUAL_SPEED_MPS);
        d.target_line = clamp_config("delivery.target_line", d.target_line, -MAX_MANUAL_LINE_M, MAX_MANUAL_LINE_M);
        d.target_length =
            clamp_config("delivery.target_length", d.target_length, 0.0, pitch::BOWLING_CREASE_Z - 2.0);
        d
    }

    /// Batter's stroke for the ball in flight. Only the first counts.
    pub fn submit_shot(&mut self, shot_type: ShotType, power: f32) -> Result<()> {
        if self.state.phase() != MatchPhase::BallInFlight || self.context().is_paused {
            return Err(self.reject("submit_shot", "no ball to play"));
        }
        self.resolver.submit(shot_type, power, self.physics.state()).map(|_| ())
    }

    /// Call for one more run, or send the batters back
    pub fn run_command(&mut self, command: RunCommand) -> Result<()> {
        let max = self.config.rules.max_running_runs as i8;
        let running = self
            .live
            .as_ref()
            .and_then(|l| l.struck())
            .map(|c| c.boundary.is_none() && !c.is_caught)
            .unwrap_or(false);
        if !running || self.context().is_paused {
            return Err(self.reject("run_command", "batters are not running"));
        }
        if let Some(live) = self.live.as_mut() {
            live.run_adjust = match command {
                RunCommand::Advance => (live.run_adjust + 1).min(max),
                RunCommand::Retreat => (live.run_adjust - 1).max(-max),
            };
            log::debug!("{command:?}: run adjust now {}", live.run_adjust);
        }
        Ok(())
    }

    /// Manual bowling: choose the next delivery type
    pub fn select_delivery(&mut self, delivery_type: DeliveryType) -> Result<()> {
        if let Some(manual) = self.bowler.manual_mut() {
            manual.select(delivery_type);
            return Ok(());
        }
        Err(self.reject("select_delivery", "automatic bowler is on"))
    }

    /// Place a fielder by hand; kept across deliveries until reset
    pub fn set_fielder_position(&mut self, role: FielderRole, position: Vector3<f32>) -> Result<Vector3<f32>> {
        if matches!(self.state.phase(), MatchPhase::BallInFlight | MatchPhase::Resolving) {
            return Err(self.reject("set_fielder_position", "ball is live"));
        }
        self.fielding.set_fielder_position(role, position)
    }

    pub fn reset_field_placement(&mut self) -> Result<()> {
        if matches!(self.state.phase(), MatchPhase::BallInFlight | MatchPhase::Resolving) {
            return Err(self.reject("reset_field_placement", "ball is live"));
        }
        self.fielding.reset_placement();
        Ok(())
    }

    /// Hand bowling to the automatic bowler. With a ball live, the first
    /// automatic delivery waits for it to finish.
    pub fn enable_auto_bowler(&mut self) -> Result<()> {
        if !self.bowler.set_mode(BowlerMode::Automatic) {
            return Ok(());
        }
        log::info!("automatic bowling on");
        if self.running && !self.context().is_paused {
            self.schedule_auto_delivery(self.config.rules.between_balls_s);
        }
        Ok(())
    }

    pub fn disable_auto_bowler(&mut self) -> Result<()> {
        if !self.bowler.set_mode(BowlerMode::Manual) {
            return Ok(());
        }
        self.tasks.cancel(ScheduledAction::AutoDelivery);
        log::info!("automatic bowling off");
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        if !self.running || self.context().is_paused {
            return Err(self.reject("pause", "nothing to pause"));
        }
        self.contexts[self.active].is_paused = true;
        log::debug!("paused at {}ms", self.clock_ms());
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if !self.running || !self.context().is_paused {
            return Err(self.reject("resume", "not paused"));
        }
        self.contexts[self.active].is_paused = false;
        log::debug!("resumed at {}ms", self.clock_ms());
        Ok(())
    }

    /// Dispatch a mapped input
    pub fn handle_input(&mut self, action: InputAction) -> Result<()> {
        match action {
            InputAction::Shot(shot) => self.submit_shot(shot, 1.0),
            InputAction::Run(command) => self.run_command(command),
            InputAction::SelectDelivery(t) => self.select_delivery(t),
            InputAction::Bowl => self.start_delivery(None),
            InputAction::TogglePause if self.context().is_paused => self.resume(),
            InputAction::TogglePause => self.pause(),
        }
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advance the match by `dt` seconds and return the events it produced.
    /// Nothing moves while paused or without a match.
    pub fn tick(&mut self, dt: f32) -> Vec<MatchEvent> {
        if self.running && !self.context().is_paused {
            let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
            self.clock_s += dt as f64;
            self.run_due_tasks();
            if self.state.phase() == MatchPhase::BallInFlight && self.live.is_some() {
                self.advance_ball(dt);
            }
        }
        self.drain_events()
    }

    fn run_due_tasks(&mut self) {
        while let Some(task) = self.tasks.pop_due(self.clock_ms(), self.session) {
            match task.action {
                ScheduledAction::AutoDelivery => {
                    if self.bowler.is_automatic() {
                        if let Err(e) = self.start_delivery(None) {
                            log::debug!("automatic delivery skipped: {e}");
                        }
                    }
                }
                ScheduledAction::ApplyPendingResult => self.settle_run_race(),
                ScheduledAction::BeginNextInnings => self.begin_next_innings(),
                ScheduledAction::ResetField => self.fielding.reset_for_delivery(),
            }
        }
    }

    fn advance_ball(&mut self, dt: f32) {
        if let Some(live) = self.live.as_mut() {
            live.live_s += dt;
        }
        self.physics.tick(dt);
        loop {
            for event in self.physics.take_events() {
                self.on_ball_event(event);
                if self.state.phase() != MatchPhase::BallInFlight {
                    return;
                }
            }
            // Drain whatever the bat-plane stop left buffered
            if self.physics.state().is_moving && self.physics.pending_time() >= SUBSTEP_DT {
                self.physics.tick(0.0);
            } else {
                break;
            }
        }
        self.update_fielding(dt);
        if self.state.phase() == MatchPhase::BallInFlight {
            self.check_timeouts();
        }
    }

    fn on_ball_event(&mut self, event: BallEvent) {
        match event {
            BallEvent::Pitched { position, time_s } => {
                log::trace!("pitched at z={:.2} after {:.2}s", position.z, time_s);
            }
            BallEvent::CrossedBatPlane { position } => self.resolve_at_bat(position),
            BallEvent::HitStumps { .. } => self.on_stumps(true),
            BallEvent::PassedStumps { .. } => self.on_stumps(false),
            BallEvent::CrossedBoundary { on_the_full, .. } => self.on_boundary(on_the_full),
            BallEvent::Gathered { .. } => {}
            BallEvent::Stopped { .. } => {
                if !self.physics.state().has_been_hit {
                    // Died before reaching the keeper
                    if let Some(live) = &self.live {
                        let result = live.unplayed(0);
                        self.commit(result);
                    }
                }
            }
        }
    }

    // =========================================================================
    // Ball resolution
    // =========================================================================

    fn resolve_at_bat(&mut self, at: Vector3<f32>) {
        let Some(live) = self.live.as_mut() else { return };
        let rules = &self.config.rules;
        let played = self.resolver.pending().is_some();
        live.no_ball = live.delivery.overstep || at.y > rules.head_height_m;
        live.wide = !live.no_ball && !played && at.x.abs() > rules.wide_line_m;
        if live.no_ball {
            log::debug!("no-ball ({})", if live.delivery.overstep { "overstep" } else { "above head height" });
        }
        if live.wide {
            log::debug!("wide: {:.2}m outside off/leg", at.x.abs());
            return;
        }

        let fielders = self.fielding.positions();
        let outcome = self.resolver.resolve(self.physics.state(), self.physics.config(), &fielders, &mut self.rng);
        live.contact = Some(outcome);
        live.contact_at_s = live.live_s;

        match outcome.kind {
            ContactKind::Struck => {
                let Some(trajectory) = outcome.exit_trajectory else {
                    let result = live.called(DeliveryResult::dot());
                    self.commit(result);
                    return;
                };
                if let Err(e) = self.physics.apply_contact(&trajectory) {
                    log::warn!("contact not applied: {e}");
                }
                self.fielding.on_contact(
                    self.physics.state(),
                    self.physics.config(),
                    outcome.is_catchable,
                    outcome.boundary.is_none(),
                );
            }
            ContactKind::Blocked => {
                let result = live.called(DeliveryResult::dot());
                self.commit(result);
            }
            ContactKind::Padded => {
                let leg_bye = self.rng.gen::<f32>() < self.config.rules.leg_bye_chance;
                let result = if leg_bye { DeliveryResult::extra(ExtraKind::LegBye, 1) } else { DeliveryResult::dot() };
                let result = live.called(result);
                self.commit(result);
            }
            // Carries on to the stumps
            ContactKind::Missed => {}
        }
    }

    fn on_stumps(&mut self, hit: bool) {
        let Some(live) = self.live.as_ref() else { return };
        if live.struck().is_some() {
            return;
        }
        if hit {
            let result = live.called(DeliveryResult::wicket(Wicket::of_striker(DismissalType::Bowled)));
            self.commit(result);
            return;
        }

        let charged = !live.no_ball && live.contact.is_some_and(|c| c.leaves_crease());
        if charged && self.rng.gen::<f32>() < self.config.rules.stumping_chance {
            self.commit(DeliveryResult::wicket(Wicket::of_striker(DismissalType::Stumped)));
            return;
        }
        let byes = self.roll_byes();
        if let Some(live) = &self.live {
            let result = live.unplayed(byes);
            self.commit(result);
        }
    }

    /// Runs when the keeper is beaten: usually none, sometimes one, now and
    /// then four to the rope
    fn roll_byes(&mut self) -> u8 {
        let rules = &self.config.rules;
        if self.rng.gen::<f32>() >= rules.bye_chance {
            return 0;
        }
        if self.rng.gen::<f32>() < rules.bye_boundary_share {
            BoundaryKind::Four.runs()
        } else {
            1
        }
    }

    fn on_boundary(&mut self, on_the_full: bool) {
        let Some(contact) = self.live.as_ref().and_then(|l| l.struck()).copied() else { return };
        let kind = contact.boundary.unwrap_or(if on_the_full { BoundaryKind::Six } else { BoundaryKind::Four });
        self.award_boundary(kind);
    }

    fn award_boundary(&mut self, kind: BoundaryKind) {
        let Some(live) = self.live.as_ref() else { return };
        log::debug!("{:?} for {}", kind, self.context().striker().name);
        let result = live.called(DeliveryResult::boundary(kind));
        self.commit(result);
    }

    fn update_fielding(&mut self, dt: f32) {
        let Some(live) = self.live.as_ref() else { return };
        if live.struck().is_none() {
            return;
        }
        let no_ball = live.no_ball;
        let event = self.fielding.update(dt, self.physics.state(), self.physics.config(), &mut self.rng);
        match event {
            Some(FieldingEvent::Caught { fielder, reaction_s }) => {
                log::info!("caught by {fielder} (reaction {reaction_s:.2}s)");
                if let Some(c) = self.live.as_mut().and_then(|l| l.contact.as_mut()) {
                    c.is_caught = true;
                }
                let result = if no_ball {
                    DeliveryResult::extra(ExtraKind::NoBall, 0)
                } else {
                    DeliveryResult::wicket(Wicket::of_striker(DismissalType::Caught))
                };
                self.commit(result);
            }
            Some(FieldingEvent::Dropped { fielder, reaction_s }) => {
                log::info!("dropped by {fielder} (reaction {reaction_s:.2}s)");
            }
            Some(FieldingEvent::Fielded { fielder, position, after_s }) => {
                self.on_fielded(fielder.index(), position, after_s);
            }
            None => {}
        }
    }

    fn on_fielded(&mut self, fielder: usize, position: Vector3<f32>, after_s: f32) {
        self.physics.gather(fielder);
        let race = RunRace::new(&position, after_s, &self.config.fielding);
        if let Some(live) = self.live.as_mut() {
            live.race = Some(race);
        }
        if let Err(e) = self.state.begin_resolving() {
            log::warn!("{e}");
            return;
        }
        log::debug!("fielded after {after_s:.2}s, throw to {:?} at {:.2}s", race.throw_end, race.throw_arrival_s);
        self.schedule_in(race.throw_arrival_s - after_s, ScheduledAction::ApplyPendingResult);
    }

    /// The throw has arrived: count the runs and check for a run-out
    fn settle_run_race(&mut self) {
        let Some(live) = self.live.as_ref() else { return };
        let Some(race) = live.race else { return };
        let rules = &self.config.rules;
        let automatic = race.safe_runs(rules) as i8;
        let attempted = (automatic + live.run_adjust).clamp(0, rules.max_running_runs as i8) as u8;
        let settlement = race.settle(attempted, rules);

        let mut result = DeliveryResult::runs(settlement.completed);
        if let Some(run_out) = settlement.run_out {
            result.wicket = Some(Wicket { dismissal: DismissalType::RunOut, batter: run_out.runner, end: run_out.end });
        }
        let result = live.called(result);
        self.commit(result);
    }

    fn check_timeouts(&mut self) {
        let Some(live) = self.live.as_ref() else { return };
        let rules = &self.config.rules;
        match live.struck().copied() {
            Some(contact) => {
                let since = live.live_s - live.contact_at_s;
                if let Some(kind) = contact.boundary {
                    if since >= rules.boundary_settle_s {
                        self.award_boundary(kind);
                    }
                } else if since >= rules.max_live_ball_s {
                    log::debug!("ball called dead after {since:.1}s");
                    let at = self.physics.state().position;
                    let nearest = self
                        .fielding
                        .fielders()
                        .iter()
                        .enumerate()
                        .min_by(|a, b| {
                            ground_distance(&a.1.current_position, &at)
                                .total_cmp(&ground_distance(&b.1.current_position, &at))
                        })
                        .map(|(i, _)| i)
                        .unwrap_or(0);
                    self.on_fielded(nearest, at, since);
                }
            }
            None if live.live_s >= rules.max_live_ball_s => {
                let result = live.unplayed(0);
                self.commit(result);
            }
            None => {}
        }
    }

    /// Ball is dead: hand the result to the state machine and line up what
    /// happens next
    fn commit(&mut self, result: DeliveryResult) {
        self.physics.finish();
        self.live = None;
        if self.state.phase() == MatchPhase::BallInFlight {
            if let Err(e) = self.state.begin_resolving() {
                log::warn!("{e}");
            }
        }

        let ctx = &mut self.contexts[self.active];
        match self.state.apply_result(ctx, &result) {
            Ok(events) => {
                for event in events {
                    self.emit(event);
                }
            }
            Err(e) => log::warn!("result {result:?} not applied: {e}"),
        }

        let rules = &self.config.rules;
        let (between, break_s) = (rules.between_balls_s, rules.innings_break_s);
        self.schedule_in(between * 0.5, ScheduledAction::ResetField);
        match self.state.phase() {
            MatchPhase::AwaitingDelivery => self.schedule_auto_delivery(between),
            MatchPhase::InningsComplete => self.schedule_in(break_s, ScheduledAction::BeginNextInnings),
            MatchPhase::MatchComplete => {
                self.tasks.cancel(ScheduledAction::AutoDelivery);
            }
            MatchPhase::BallInFlight | MatchPhase::Resolving => {}
        }
    }
}
