use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::agent::AgentId;

/// One generated utterance, attributed to an agent and stamped with the
/// phase it was produced in. `round_index` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStep {
    pub agent_id: AgentId,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub round_index: usize,
    pub phase_name: String,
}
