use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const EVENT_TYPES_RON: &str = include_str!("../../arena_data/debate/event_types.ron");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// A template for an event, with inclusive bounds on roster size.
///
/// `icon` and `color` are presentation hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventType {
    pub id: String,
    pub name: String,
    pub description: String,
    pub min_agents: usize,
    pub max_agents: usize,
    pub icon: String,
    pub color: String,
}

impl EventType {
    /// Returns true if a roster of `count` agents fits this template.
    pub fn admits(&self, count: usize) -> bool {
        (self.min_agents..=self.max_agents).contains(&count)
    }

    /// The built-in catalog: debate, hackathon, judge panel, team showdown.
    pub fn catalog() -> Result<Vec<EventType>, CatalogError> {
        Self::parse_catalog(EVENT_TYPES_RON)
    }

    pub fn parse_catalog(input: &str) -> Result<Vec<EventType>, CatalogError> {
        Ok(ron::from_str(input)?)
    }

    pub fn load_catalog(path: &Path) -> Result<Vec<EventType>, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_catalog(&contents)
    }

    /// The debate template, the only type the simulation ships phases for.
    pub fn debate() -> EventType {
        EventType {
            id: "debate".to_string(),
            name: "Debate".to_string(),
            description:
                "Structured argumentative discussion with opening statements, rebuttals, and scoring"
                    .to_string(),
            min_agents: 2,
            max_agents: 6,
            icon: "Users".to_string(),
            color: "from-blue-500 to-blue-600".to_string(),
        }
    }
}
