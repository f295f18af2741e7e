use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Newtype wrapper for agent IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u64);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent-{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("unknown communication style: {0}")]
    UnknownStyle(String),
    #[error("unknown memory mode: {0}")]
    UnknownMemory(String),
    #[error("no preset named '{0}'")]
    UnknownPreset(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// How an agent phrases its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommunicationStyle {
    ShortBlunt,
    VerboseDiplomatic,
    AnalyticalPrecise,
    CreativeExpressive,
}

impl CommunicationStyle {
    pub const ALL: [CommunicationStyle; 4] = [
        Self::ShortBlunt,
        Self::VerboseDiplomatic,
        Self::AnalyticalPrecise,
        Self::CreativeExpressive,
    ];

    /// Stable kebab-case identifier: "short-blunt", "verbose-diplomatic", ...
    pub fn slug(&self) -> &'static str {
        match self {
            Self::ShortBlunt => "short-blunt",
            Self::VerboseDiplomatic => "verbose-diplomatic",
            Self::AnalyticalPrecise => "analytical-precise",
            Self::CreativeExpressive => "creative-expressive",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ShortBlunt => "Short & Blunt",
            Self::VerboseDiplomatic => "Verbose & Diplomatic",
            Self::AnalyticalPrecise => "Analytical & Precise",
            Self::CreativeExpressive => "Creative & Expressive",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::ShortBlunt => "Direct and concise responses",
            Self::VerboseDiplomatic => "Detailed and tactful communication",
            Self::AnalyticalPrecise => "Data-driven and methodical",
            Self::CreativeExpressive => "Innovative and imaginative",
        }
    }
}

impl FromStr for CommunicationStyle {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|style| style.slug() == s)
            .ok_or_else(|| AgentError::UnknownStyle(s.to_string()))
    }
}

/// How much of the exchange an agent is meant to retain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryMode {
    ForgetsEachRound,
    #[serde(rename = "remembers-5-arguments")]
    RemembersFiveArguments,
    RemembersAll,
    Custom,
}

impl MemoryMode {
    pub const ALL: [MemoryMode; 4] = [
        Self::ForgetsEachRound,
        Self::RemembersFiveArguments,
        Self::RemembersAll,
        Self::Custom,
    ];

    /// Stable kebab-case identifier: "forgets-each-round", "remembers-5-arguments", ...
    pub fn slug(&self) -> &'static str {
        match self {
            Self::ForgetsEachRound => "forgets-each-round",
            Self::RemembersFiveArguments => "remembers-5-arguments",
            Self::RemembersAll => "remembers-all",
            Self::Custom => "custom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ForgetsEachRound => "Forgets Each Round",
            Self::RemembersFiveArguments => "Remembers 5 Arguments",
            Self::RemembersAll => "Perfect Memory",
            Self::Custom => "Custom Memory",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::ForgetsEachRound => "Fresh start every interaction",
            Self::RemembersFiveArguments => "Short-term contextual memory",
            Self::RemembersAll => "Recalls entire conversation history",
            Self::Custom => "Define specific memory rules",
        }
    }
}

impl FromStr for MemoryMode {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.slug() == s)
            .ok_or_else(|| AgentError::UnknownMemory(s.to_string()))
    }
}

/// A configured persona that can join an event roster.
///
/// `avatar` and `color` are presentation hints only; the simulation
/// never reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub perspective: String,
    pub communication_style: CommunicationStyle,
    pub guardrails: String,
    pub memory: MemoryMode,
    pub avatar: String,
    pub color: String,
}

/// An agent definition without an identity, as stored in the preset library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTemplate {
    pub name: String,
    pub perspective: String,
    pub communication_style: CommunicationStyle,
    pub guardrails: String,
    pub memory: MemoryMode,
    #[serde(default = "default_avatar")]
    pub avatar: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_avatar() -> String {
    "🤖".to_string()
}

fn default_color() -> String {
    "from-blue-500 to-blue-600".to_string()
}

impl AgentTemplate {
    /// Attach an identity to this template.
    pub fn with_id(&self, id: AgentId) -> Agent {
        Agent {
            id,
            name: self.name.clone(),
            perspective: self.perspective.clone(),
            communication_style: self.communication_style,
            guardrails: self.guardrails.clone(),
            memory: self.memory,
            avatar: self.avatar.clone(),
            color: self.color.clone(),
        }
    }
}

/// Partial update applied to an agent while its event is still being built.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentUpdate {
    pub name: Option<String>,
    pub perspective: Option<String>,
    pub communication_style: Option<CommunicationStyle>,
    pub guardrails: Option<String>,
    pub memory: Option<MemoryMode>,
    pub avatar: Option<String>,
    pub color: Option<String>,
}

impl AgentUpdate {
    pub fn apply(self, agent: &mut Agent) {
        if let Some(name) = self.name {
            agent.name = name;
        }
        if let Some(perspective) = self.perspective {
            agent.perspective = perspective;
        }
        if let Some(style) = self.communication_style {
            agent.communication_style = style;
        }
        if let Some(guardrails) = self.guardrails {
            agent.guardrails = guardrails;
        }
        if let Some(memory) = self.memory {
            agent.memory = memory;
        }
        if let Some(avatar) = self.avatar {
            agent.avatar = avatar;
        }
        if let Some(color) = self.color {
            agent.color = color;
        }
    }
}

const PRESETS_RON: &str = include_str!("../../arena_data/debate/agents.ron");

/// Library of agent templates that mints agents with fresh IDs.
#[derive(Debug, Clone, Default)]
pub struct AgentLibrary {
    templates: Vec<AgentTemplate>,
    next_id: u64,
}

impl AgentLibrary {
    pub fn new() -> Self {
        Self {
            templates: Vec::new(),
            next_id: 1,
        }
    }

    /// The six built-in debate personas.
    pub fn presets() -> Result<Self, AgentError> {
        let mut library = Self::new();
        library.parse_from_ron(PRESETS_RON)?;
        Ok(library)
    }

    /// Load templates from a RON file containing a list of agent templates.
    pub fn load_from_ron(&mut self, path: &Path) -> Result<(), AgentError> {
        let contents = std::fs::read_to_string(path)?;
        self.parse_from_ron(&contents)
    }

    /// Parse templates from a RON string and append them to the library.
    pub fn parse_from_ron(&mut self, input: &str) -> Result<(), AgentError> {
        let templates: Vec<AgentTemplate> = ron::from_str(input)?;
        self.templates.extend(templates);
        Ok(())
    }

    pub fn add_template(&mut self, template: AgentTemplate) {
        self.templates.push(template);
    }

    pub fn templates(&self) -> &[AgentTemplate] {
        &self.templates
    }

    pub fn template(&self, name: &str) -> Option<&AgentTemplate> {
        self.templates.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Mint an agent from any template. IDs are never reused by this library.
    pub fn mint(&mut self, template: &AgentTemplate) -> Agent {
        let id = AgentId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        template.with_id(id)
    }

    /// Mint an agent from the named preset.
    pub fn instantiate(&mut self, name: &str) -> Result<Agent, AgentError> {
        let template = self
            .template(name)
            .cloned()
            .ok_or_else(|| AgentError::UnknownPreset(name.to_string()))?;
        Ok(self.mint(&template))
    }
}
