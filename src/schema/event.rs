use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::agent::{Agent, AgentId, AgentUpdate};
use super::event_type::EventType;

/// Newtype wrapper for event IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("agent {0} is already on the roster")]
    DuplicateAgent(AgentId),
    #[error("agent {0} is not on the roster")]
    UnknownAgent(AgentId),
    #[error("{event_type} needs at least {min} agents, roster has {count}")]
    TooFewAgents {
        event_type: String,
        min: usize,
        count: usize,
    },
    #[error("{event_type} allows at most {max} agents, roster has {count}")]
    TooManyAgents {
        event_type: String,
        max: usize,
        count: usize,
    },
    #[error("roster can only change while building (status: {0:?})")]
    RosterLocked(EventStatus),
    #[error("cannot move event from {from:?} to {to:?}")]
    InvalidTransition { from: EventStatus, to: EventStatus },
}

/// Lifecycle of an event. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Building,
    Running,
    Completed,
}

/// One instantiation of an event type with a concrete, ordered roster.
///
/// Roster order is join order and agent IDs are unique within it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    agents: Vec<Agent>,
    status: EventStatus,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn new(id: EventId, event_type: EventType) -> Self {
        Self {
            id,
            event_type,
            agents: Vec::new(),
            status: EventStatus::Building,
            created_at: Utc::now(),
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    pub fn status(&self) -> EventStatus {
        self.status
    }

    pub fn add_agent(&mut self, agent: Agent) -> Result<(), RosterError> {
        self.ensure_building()?;
        if self.agent(agent.id).is_some() {
            return Err(RosterError::DuplicateAgent(agent.id));
        }
        tracing::debug!(agent = %agent.id, name = %agent.name, "agent joined roster");
        self.agents.push(agent);
        Ok(())
    }

    pub fn remove_agent(&mut self, id: AgentId) -> Result<Agent, RosterError> {
        self.ensure_building()?;
        let index = self
            .agents
            .iter()
            .position(|a| a.id == id)
            .ok_or(RosterError::UnknownAgent(id))?;
        Ok(self.agents.remove(index))
    }

    pub fn update_agent(&mut self, id: AgentId, update: AgentUpdate) -> Result<(), RosterError> {
        self.ensure_building()?;
        let agent = self
            .agents
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(RosterError::UnknownAgent(id))?;
        update.apply(agent);
        Ok(())
    }

    /// Enough agents have joined to start.
    pub fn can_start(&self) -> bool {
        self.agents.len() >= self.event_type.min_agents
    }

    /// More agents have joined than the event type allows.
    pub fn overfull(&self) -> bool {
        self.agents.len() > self.event_type.max_agents
    }

    pub fn agents_needed(&self) -> usize {
        self.event_type.min_agents.saturating_sub(self.agents.len())
    }

    pub fn agents_over(&self) -> usize {
        self.agents.len().saturating_sub(self.event_type.max_agents)
    }

    pub fn validate_roster(&self) -> Result<(), RosterError> {
        let count = self.agents.len();
        if count < self.event_type.min_agents {
            return Err(RosterError::TooFewAgents {
                event_type: self.event_type.name.clone(),
                min: self.event_type.min_agents,
                count,
            });
        }
        if count > self.event_type.max_agents {
            return Err(RosterError::TooManyAgents {
                event_type: self.event_type.name.clone(),
                max: self.event_type.max_agents,
                count,
            });
        }
        Ok(())
    }

    /// Building → Running. The roster must fit the event type's bounds.
    pub fn start(&mut self) -> Result<(), RosterError> {
        self.transition(EventStatus::Building, EventStatus::Running)?;
        Ok(())
    }

    /// Running → Completed.
    pub fn complete(&mut self) -> Result<(), RosterError> {
        self.transition(EventStatus::Running, EventStatus::Completed)
    }

    fn transition(&mut self, from: EventStatus, to: EventStatus) -> Result<(), RosterError> {
        if self.status != from {
            return Err(RosterError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        if to == EventStatus::Running {
            self.validate_roster()?;
        }
        tracing::info!(event = self.id.0, ?from, ?to, "event status changed");
        self.status = to;
        Ok(())
    }

    fn ensure_building(&self) -> Result<(), RosterError> {
        if self.status == EventStatus::Building {
            Ok(())
        } else {
            Err(RosterError::RosterLocked(self.status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::agent::AgentLibrary;

    fn debate_with(count: usize) -> Event {
        let mut library = AgentLibrary::presets().unwrap();
        let mut event = Event::new(EventId(1), EventType::debate());
        let names: Vec<String> = library.templates().iter().map(|t| t.name.clone()).collect();
        for name in names.iter().cycle().take(count) {
            event.add_agent(library.instantiate(name).unwrap()).unwrap();
        }
        event
    }

    #[test]
    fn new_event_is_building_and_empty() {
        let event = Event::new(EventId(7), EventType::debate());
        assert_eq!(event.status(), EventStatus::Building);
        assert!(event.agents().is_empty());
        assert_eq!(event.agents_needed(), 2);
    }

    #[test]
    fn status_serializes_lowercase() {
        for (status, name) in [
            (EventStatus::Building, "building"),
            (EventStatus::Running, "running"),
            (EventStatus::Completed, "completed"),
        ] {
            assert_eq!(ron::to_string(&status).unwrap(), name);
            assert_eq!(ron::from_str::<EventStatus>(name).unwrap(), status);
        }
    }

    #[test]
    fn roster_keeps_join_order() {
        let event = debate_with(3);
        let ids: Vec<u64> = event.agents().iter().map(|a| a.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_agent_rejected() {
        let mut event = debate_with(2);
        let again = event.agents()[0].clone();
        assert_eq!(
            event.add_agent(again),
            Err(RosterError::DuplicateAgent(AgentId(1)))
        );
    }

    #[test]
    fn remove_and_update() {
        let mut event = debate_with(3);
        let removed = event.remove_agent(AgentId(2)).unwrap();
        assert_eq!(removed.id, AgentId(2));
        assert_eq!(event.agents().len(), 2);
        assert_eq!(
            event.remove_agent(AgentId(2)),
            Err(RosterError::UnknownAgent(AgentId(2)))
        );

        event
            .update_agent(
                AgentId(3),
                AgentUpdate {
                    guardrails: Some("Stay civil".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(event.agent(AgentId(3)).unwrap().guardrails, "Stay civil");
    }

    #[test]
    fn start_requires_min_agents() {
        let mut event = debate_with(1);
        assert!(!event.can_start());
        assert!(matches!(
            event.start(),
            Err(RosterError::TooFewAgents { min: 2, count: 1, .. })
        ));
        assert_eq!(event.status(), EventStatus::Building);
    }

    #[test]
    fn overfull_roster_cannot_start() {
        let mut event = debate_with(7);
        assert!(event.can_start());
        assert!(event.overfull());
        assert_eq!(event.agents_over(), 1);
        assert!(matches!(
            event.start(),
            Err(RosterError::TooManyAgents { max: 6, count: 7, .. })
        ));
    }

    #[test]
    fn lifecycle_moves_forward_only() {
        let mut event = debate_with(2);
        assert!(event.complete().is_err());
        event.start().unwrap();
        assert_eq!(event.status(), EventStatus::Running);
        assert!(event.start().is_err());
        event.complete().unwrap();
        assert_eq!(event.status(), EventStatus::Completed);
        assert!(matches!(
            event.start(),
            Err(RosterError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn roster_locked_after_start() {
        let mut event = debate_with(2);
        event.start().unwrap();
        assert_eq!(
            event.remove_agent(AgentId(1)),
            Err(RosterError::RosterLocked(EventStatus::Running))
        );
    }
}
