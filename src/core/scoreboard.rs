//! Per-agent scores and the derived leaderboard.
use rand::Rng;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::schema::agent::{Agent, AgentId};
use crate::schema::step::SimulationStep;

/// Mapping from agent to running score.
///
/// Scores are clamped from above only; a long losing streak can push a
/// score below zero.
#[derive(Debug, Clone, Default)]
pub struct ScoreBoard {
    scores: FxHashMap<AgentId, i32>,
}

impl ScoreBoard {
    /// Seed every agent with a score drawn uniformly from `[lo, hi)`.
    pub fn seeded<R: Rng + ?Sized>(agents: &[Agent], range: (i32, i32), rng: &mut R) -> Self {
        let (lo, hi) = range;
        let scores = agents
            .iter()
            .map(|agent| (agent.id, rng.gen_range(lo..hi)))
            .collect();
        Self { scores }
    }

    pub fn get(&self, id: AgentId) -> Option<i32> {
        self.scores.get(&id).copied()
    }

    /// Add `delta` to an agent's score and clamp to `ceiling`. Agents
    /// without a seeded score start from zero. Returns the new score.
    pub fn apply(&mut self, id: AgentId, delta: i32, ceiling: i32) -> i32 {
        let score = self.scores.entry(id).or_insert(0);
        *score = score.saturating_add(delta).min(ceiling);
        *score
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentId, i32)> + '_ {
        self.scores.iter().map(|(id, score)| (*id, *score))
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry<'a> {
    pub agent: &'a Agent,
    pub message_count: usize,
    pub score: i32,
}

/// Rank the roster by descending score.
///
/// Agents with equal scores keep roster order. An agent with no score
/// ranks as zero.
pub fn rank<'a>(
    roster: &'a [Agent],
    log: &[SimulationStep],
    scores: &ScoreBoard,
) -> Vec<LeaderboardEntry<'a>> {
    let mut counts: FxHashMap<AgentId, usize> = FxHashMap::default();
    for step in log {
        *counts.entry(step.agent_id).or_insert(0) += 1;
    }

    let mut entries: Vec<LeaderboardEntry<'a>> = roster
        .iter()
        .map(|agent| LeaderboardEntry {
            agent,
            message_count: counts.get(&agent.id).copied().unwrap_or(0),
            score: scores.get(agent.id).unwrap_or(0),
        })
        .collect();
    // sort_by is stable
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::agent::AgentLibrary;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn roster(n: usize) -> Vec<Agent> {
        let mut library = AgentLibrary::presets().unwrap();
        let template = library.templates()[0].clone();
        (0..n).map(|_| library.mint(&template)).collect()
    }

    fn step(id: u64) -> SimulationStep {
        SimulationStep {
            agent_id: AgentId(id),
            message: "x".to_string(),
            timestamp: Utc::now(),
            round_index: 1,
            phase_name: "Opening Statements".to_string(),
        }
    }

    #[test]
    fn seeded_scores_in_range() {
        let agents = roster(6);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let board = ScoreBoard::seeded(&agents, (70, 90), &mut rng);
            assert_eq!(board.len(), 6);
            for (_, score) in board.iter() {
                assert!((70..90).contains(&score));
            }
        }
    }

    #[test]
    fn apply_clamps_at_ceiling_only() {
        let mut board = ScoreBoard::default();
        board.apply(AgentId(1), 99, 100);
        assert_eq!(board.apply(AgentId(1), 3, 100), 100);
        assert_eq!(board.apply(AgentId(2), -2, 100), -2);
        assert_eq!(board.apply(AgentId(2), -2, 100), -4);
    }

    #[test]
    fn rank_sorts_descending_and_keeps_ties_in_roster_order() {
        let agents = roster(3);
        let mut board = ScoreBoard::default();
        board.apply(agents[0].id, 80, 100);
        board.apply(agents[1].id, 85, 100);
        board.apply(agents[2].id, 80, 100);
        let log = vec![step(1), step(3), step(3)];

        let ranked = rank(&agents, &log, &board);
        let ids: Vec<u64> = ranked.iter().map(|e| e.agent.id.0).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(ranked[1].message_count, 1);
        assert_eq!(ranked[2].message_count, 2);
        assert_eq!(ranked[0].message_count, 0);
    }

    #[test]
    fn unscored_agent_ranks_as_zero() {
        let agents = roster(2);
        let mut board = ScoreBoard::default();
        board.apply(agents[1].id, -5, 100);
        let ranked = rank(&agents, &[], &board);
        assert_eq!(ranked[0].agent.id, agents[0].id);
        assert_eq!(ranked[0].score, 0);
        assert_eq!(ranked[1].score, -5);
    }
}
