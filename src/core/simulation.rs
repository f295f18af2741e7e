//! The simulation: Event roster → timed stream of utterances and scores.
//!
//! Wires together the phase scheduler, message pools, and scoreboard.
//! A host calls `tick()` on a fixed cadence while the simulation runs.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::config::{ConfigError, SimulationConfig};
use crate::core::phase::{self, Phase, PhaseError, PhaseScheduler};
use crate::core::pools::{MessagePools, PoolError};
use crate::core::scoreboard::{self, LeaderboardEntry, ScoreBoard};
use crate::schema::agent::{Agent, AgentId};
use crate::schema::event::Event;
use crate::schema::step::SimulationStep;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("phase error: {0}")]
    Phase(#[from] PhaseError),
    #[error("message pool error: {0}")]
    Pool(#[from] PoolError),
}

/// Whether ticks currently produce utterances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationState {
    Idle,
    Running,
}

/// A running (or paused) simulation over one event's roster.
///
/// The log and scoreboard are only written by `tick()` and `reset()`.
/// `tick()` takes `&mut self`, so at most one tick can be in flight.
pub struct Simulation<R: Rng = StdRng> {
    roster: Vec<Agent>,
    scheduler: PhaseScheduler,
    pools: MessagePools,
    config: SimulationConfig,
    log: Vec<SimulationStep>,
    scores: ScoreBoard,
    running: bool,
    active_agent: Option<AgentId>,
    rng: R,
}

/// Builder for constructing a `Simulation`.
pub struct SimulationBuilder {
    seed: u64,
    config_path: Option<String>,
    phases_path: Option<String>,
    pools_path: Option<String>,
    /// Directly provided config (for hosts that do not read files).
    config: Option<SimulationConfig>,
    /// Directly provided phases (for testing without files).
    phases: Option<Vec<Phase>>,
    /// Directly provided pools (for testing without files).
    pools: Option<MessagePools>,
}

impl Simulation<StdRng> {
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder {
            seed: 0,
            config_path: None,
            phases_path: None,
            pools_path: None,
            config: None,
            phases: None,
            pools: None,
        }
    }
}

impl<R: Rng> Simulation<R> {
    fn assemble(
        event: &Event,
        scheduler: PhaseScheduler,
        pools: MessagePools,
        config: SimulationConfig,
        mut rng: R,
    ) -> Self {
        let roster = event.agents().to_vec();
        let scores = ScoreBoard::seeded(&roster, config.score_init_range, &mut rng);
        tracing::info!(
            event = event.id.0,
            agents = roster.len(),
            phases = scheduler.phases().len(),
            "simulation ready"
        );
        Self {
            roster,
            scheduler,
            pools,
            config,
            log: Vec::new(),
            scores,
            running: false,
            active_agent: None,
            rng,
        }
    }

    /// Begin producing utterances. No effect if already running.
    pub fn start(&mut self) {
        if !self.running {
            tracing::info!("simulation started");
        }
        self.running = true;
    }

    /// Stop producing utterances. No effect if already paused.
    pub fn pause(&mut self) {
        if self.running {
            tracing::info!(exchanges = self.log.len(), "simulation paused");
        }
        self.running = false;
    }

    /// Flip between running and paused.
    pub fn toggle(&mut self) {
        if self.running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Discard the log, reseed every score, rewind to the first phase,
    /// and pause.
    pub fn reset(&mut self) {
        self.log.clear();
        self.scores = ScoreBoard::seeded(&self.roster, self.config.score_init_range, &mut self.rng);
        self.scheduler.reset();
        self.running = false;
        self.active_agent = None;
        tracing::info!("simulation reset");
    }

    /// Produce one utterance stamped with the current time.
    ///
    /// Returns `None` without touching any state when paused or when the
    /// roster is empty.
    pub fn tick(&mut self) -> Option<&SimulationStep> {
        self.tick_at(Utc::now())
    }

    /// Produce one utterance stamped with `timestamp`.
    pub fn tick_at(&mut self, timestamp: DateTime<Utc>) -> Option<&SimulationStep> {
        if !self.running {
            return None;
        }
        let Some(agent_id) = self.roster.choose(&mut self.rng).map(|a| a.id) else {
            tracing::debug!("empty roster, tick skipped");
            return None;
        };

        let phase_name = self.scheduler.current_phase().name.clone();
        let fallback = self.scheduler.first_phase().name.clone();
        let message = self
            .pools
            .choose(&phase_name, &fallback, &mut self.rng)?
            .to_string();
        let round_index = self.scheduler.current_phase_index() + 1;

        let (lo, hi) = self.config.score_delta;
        let delta = self.rng.gen_range(lo..=hi);
        let score = self.scores.apply(agent_id, delta, self.config.score_ceiling);

        tracing::debug!(
            agent = %agent_id,
            phase = %phase_name,
            round = round_index,
            delta,
            score,
            "utterance"
        );

        self.log.push(SimulationStep {
            agent_id,
            message,
            timestamp,
            round_index,
            phase_name,
        });
        self.active_agent = Some(agent_id);
        self.scheduler.record_exchange();
        self.log.last()
    }

    /// The roster ranked by descending score, ties in roster order.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry<'_>> {
        scoreboard::rank(&self.roster, &self.log, &self.scores)
    }

    pub fn log(&self) -> &[SimulationStep] {
        &self.log
    }

    /// Steps appended after the first `seen` entries. Empty if `seen` is
    /// past the end, e.g. after a reset.
    pub fn steps_since(&self, seen: usize) -> &[SimulationStep] {
        self.log.get(seen..).unwrap_or(&[])
    }

    pub fn exchange_count(&self) -> usize {
        self.log.len()
    }

    pub fn score(&self, id: AgentId) -> Option<i32> {
        self.scores.get(id)
    }

    pub fn scoreboard(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> SimulationState {
        if self.running {
            SimulationState::Running
        } else {
            SimulationState::Idle
        }
    }

    /// The agent that produced the most recent step.
    pub fn active_agent(&self) -> Option<&Agent> {
        let id = self.active_agent?;
        self.roster.iter().find(|a| a.id == id)
    }

    pub fn current_phase(&self) -> &Phase {
        self.scheduler.current_phase()
    }

    pub fn scheduler(&self) -> &PhaseScheduler {
        &self.scheduler
    }

    pub fn roster(&self) -> &[Agent] {
        &self.roster
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

impl SimulationBuilder {
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn config_file(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    pub fn phases_file(mut self, path: &str) -> Self {
        self.phases_path = Some(path.to_string());
        self
    }

    pub fn pools_file(mut self, path: &str) -> Self {
        self.pools_path = Some(path.to_string());
        self
    }

    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Provide phases directly (for testing without files).
    pub fn with_phases(mut self, phases: Vec<Phase>) -> Self {
        self.phases = Some(phases);
        self
    }

    /// Provide pools directly (for testing without files).
    pub fn with_pools(mut self, pools: MessagePools) -> Self {
        self.pools = Some(pools);
        self
    }

    /// Build a simulation driven by a `StdRng` seeded from `seed`.
    pub fn build(self, event: &Event) -> Result<Simulation<StdRng>, EngineError> {
        let rng = StdRng::seed_from_u64(self.seed);
        self.build_with_rng(event, rng)
    }

    /// Build a simulation driven by any random source.
    pub fn build_with_rng<R: Rng>(self, event: &Event, rng: R) -> Result<Simulation<R>, EngineError> {
        // Files override the directly provided values.
        let config = match self.config_path {
            Some(ref path) => SimulationConfig::load_from_ron(Path::new(path))?,
            None => self.config.unwrap_or_default(),
        };
        config.validate()?;

        let phases = match self.phases_path {
            Some(ref path) => phase::load_phases(Path::new(path))?,
            None => self.phases.unwrap_or_else(phase::debate_phases),
        };
        let scheduler = PhaseScheduler::new(phases, config.exchanges_per_phase)?;

        let mut pools = match self.pools {
            Some(pools) => pools,
            None => MessagePools::debate()?,
        };
        if let Some(ref path) = self.pools_path {
            pools.merge(MessagePools::load_from_ron(Path::new(path))?);
        }
        pools.ensure_fallback(&scheduler.first_phase().name)?;

        Ok(Simulation::assemble(event, scheduler, pools, config, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::agent::AgentLibrary;
    use crate::schema::event::EventId;
    use crate::schema::event_type::EventType;

    fn debate_event(count: usize) -> Event {
        let mut library = AgentLibrary::presets().unwrap();
        let names: Vec<String> = library.templates().iter().map(|t| t.name.clone()).collect();
        let mut event = Event::new(EventId(1), EventType::debate());
        for name in names.iter().take(count) {
            event.add_agent(library.instantiate(name).unwrap()).unwrap();
        }
        event
    }

    fn running(count: usize, seed: u64) -> Simulation {
        let mut sim = Simulation::builder()
            .seed(seed)
            .build(&debate_event(count))
            .unwrap();
        sim.start();
        sim
    }

    #[test]
    fn new_simulation_is_idle_with_seeded_scores() {
        let sim = Simulation::builder().seed(9).build(&debate_event(4)).unwrap();
        assert_eq!(sim.state(), SimulationState::Idle);
        assert!(sim.log().is_empty());
        for agent in sim.roster() {
            let score = sim.score(agent.id).unwrap();
            assert!((70..90).contains(&score));
        }
    }

    #[test]
    fn tick_while_paused_is_noop() {
        let mut sim = Simulation::builder().seed(1).build(&debate_event(2)).unwrap();
        assert!(sim.tick().is_none());
        assert_eq!(sim.exchange_count(), 0);
        assert_eq!(sim.scheduler().exchanges_since_last_advance(), 0);
    }

    #[test]
    fn empty_roster_tick_is_noop() {
        let mut sim = running(0, 5);
        for _ in 0..10 {
            assert!(sim.tick().is_none());
        }
        assert!(sim.log().is_empty());
        assert!(sim.leaderboard().is_empty());
        assert_eq!(sim.scheduler().current_phase_index(), 0);
    }

    #[test]
    fn tick_appends_step_for_roster_agent() {
        let mut sim = running(3, 11);
        let step = sim.tick().unwrap().clone();
        assert!(sim.roster().iter().any(|a| a.id == step.agent_id));
        assert_eq!(step.round_index, 1);
        assert_eq!(step.phase_name, "Opening Statements");
        assert_eq!(sim.active_agent().map(|a| a.id), Some(step.agent_id));
        let pool = MessagePools::debate().unwrap();
        assert!(pool
            .get("Opening Statements")
            .unwrap()
            .iter()
            .any(|m| *m == step.message));
    }

    #[test]
    fn eight_ticks_advance_one_phase() {
        let mut sim = running(3, 21);
        for _ in 0..8 {
            sim.tick().unwrap();
        }
        assert_eq!(sim.log().len(), 8);
        assert_eq!(sim.scheduler().current_phase_index(), 1);
        assert_eq!(sim.scheduler().exchanges_since_last_advance(), 0);
        assert!(sim.log().iter().all(|s| s.round_index == 1));
        let ninth = sim.tick().unwrap();
        assert_eq!(ninth.round_index, 2);
        assert_eq!(ninth.phase_name, "First Rebuttals");
    }

    #[test]
    fn score_changes_only_for_speaker() {
        let mut sim = running(3, 4);
        let before: Vec<i32> = sim.roster().iter().map(|a| sim.score(a.id).unwrap()).collect();
        let speaker = sim.tick().unwrap().agent_id;
        for (agent, old) in sim.roster().iter().zip(before) {
            let new = sim.score(agent.id).unwrap();
            if agent.id == speaker {
                assert!((-2..=3).contains(&(new - old)));
            } else {
                assert_eq!(new, old);
            }
        }
    }

    #[test]
    fn reset_clears_and_reseeds() {
        let mut sim = running(2, 33);
        for _ in 0..20 {
            sim.tick();
        }
        sim.reset();
        assert_eq!(sim.state(), SimulationState::Idle);
        assert!(sim.log().is_empty());
        assert!(sim.active_agent().is_none());
        assert_eq!(sim.scheduler().current_phase_index(), 0);
        for agent in sim.roster() {
            assert!((70..90).contains(&sim.score(agent.id).unwrap()));
        }
    }

    #[test]
    fn start_and_pause_are_idempotent() {
        let mut sim = Simulation::builder().build(&debate_event(2)).unwrap();
        sim.start();
        sim.start();
        assert_eq!(sim.state(), SimulationState::Running);
        sim.pause();
        sim.pause();
        assert_eq!(sim.state(), SimulationState::Idle);
        sim.toggle();
        assert!(sim.is_running());
    }

    #[test]
    fn same_seed_same_run() {
        let at = Utc::now();
        let mut a = running(4, 2026);
        let mut b = running(4, 2026);
        for _ in 0..30 {
            a.tick_at(at);
            b.tick_at(at);
        }
        assert_eq!(a.log(), b.log());
        for agent in a.roster() {
            assert_eq!(a.score(agent.id), b.score(agent.id));
        }
    }

    #[test]
    fn steps_since_returns_tail() {
        let mut sim = running(2, 8);
        for _ in 0..5 {
            sim.tick();
        }
        assert_eq!(sim.steps_since(3).len(), 2);
        assert_eq!(sim.steps_since(5).len(), 0);
        sim.reset();
        assert!(sim.steps_since(3).is_empty());
    }

    #[test]
    fn leaderboard_counts_match_log() {
        let mut sim = running(5, 77);
        for _ in 0..40 {
            sim.tick();
        }
        let board = sim.leaderboard();
        assert_eq!(board.len(), 5);
        let total: usize = board.iter().map(|e| e.message_count).sum();
        assert_eq!(total, sim.log().len());
        assert!(board.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn roster_is_a_snapshot() {
        let mut event = debate_event(2);
        let sim = Simulation::builder().build(&event).unwrap();
        let extra = AgentLibrary::presets().unwrap().templates()[5].with_id(AgentId(99));
        event.add_agent(extra).unwrap();
        assert_eq!(sim.roster().len(), 2);
    }

    #[test]
    fn builder_rejects_missing_fallback_pool() {
        let mut pools = MessagePools::new();
        pools.insert("Final Arguments", vec!["Done.".to_string()]);
        let result = Simulation::builder()
            .with_pools(pools)
            .build(&debate_event(2));
        assert!(matches!(
            result,
            Err(EngineError::Pool(PoolError::MissingFallback(_)))
        ));
    }

    #[test]
    fn builder_rejects_invalid_config() {
        let config = SimulationConfig {
            exchanges_per_phase: 0,
            ..Default::default()
        };
        let result = Simulation::builder()
            .with_config(config)
            .build(&debate_event(2));
        assert!(matches!(
            result,
            Err(EngineError::Config(ConfigError::ZeroExchangesPerPhase))
        ));
    }

    #[test]
    fn custom_delta_range_is_respected() {
        let config = SimulationConfig {
            score_delta: (5, 5),
            score_ceiling: 1000,
            ..Default::default()
        };
        let mut sim = Simulation::builder()
            .seed(3)
            .with_config(config)
            .build(&debate_event(1))
            .unwrap();
        let id = sim.roster()[0].id;
        let before = sim.score(id).unwrap();
        sim.start();
        for _ in 0..4 {
            sim.tick();
        }
        assert_eq!(sim.score(id).unwrap(), before + 20);
    }
}
