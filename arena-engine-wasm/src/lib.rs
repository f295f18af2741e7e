//! WASM bindings for arena-engine: powers the browser debate arena.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use arena_engine::core::phase::PhaseProgress;
use arena_engine::core::simulation::Simulation;
use arena_engine::schema::agent::{Agent, AgentId, AgentLibrary};
use arena_engine::schema::event::{Event, EventId, EventStatus};
use arena_engine::schema::event_type::EventType;

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(Serialize)]
struct PhaseInfo<'a> {
    name: &'a str,
    description: &'a str,
    time_budget_secs: u32,
    progress: PhaseProgress,
}

#[derive(Serialize)]
struct RosterInfo<'a> {
    event_type: &'a EventType,
    agents: &'a [Agent],
    status: EventStatus,
    can_start: bool,
    overfull: bool,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

// ---------------------------------------------------------------------------
// ArenaDemo: the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct ArenaDemo {
    library: AgentLibrary,
    event: Event,
    simulation: Option<Simulation>,
    seed: u64,
}

#[wasm_bindgen]
impl ArenaDemo {
    /// Create a new debate roster. `seed` drives every random choice.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<ArenaDemo, JsError> {
        let library = AgentLibrary::presets()
            .map_err(|e| JsError::new(&format!("Preset parse error: {e}")))?;
        Ok(ArenaDemo {
            library,
            event: Event::new(EventId(1), EventType::debate()),
            simulation: None,
            seed,
        })
    }

    /// Return JSON array of agent presets.
    pub fn presets(&self) -> Result<String, JsError> {
        to_json(&self.library.templates())
    }

    /// Return JSON array of event templates.
    pub fn event_types() -> Result<String, JsError> {
        let catalog = EventType::catalog()
            .map_err(|e| JsError::new(&format!("Catalog parse error: {e}")))?;
        to_json(&catalog)
    }

    /// Add the named preset to the roster. Returns the new agent's id.
    pub fn add_agent(&mut self, preset: &str) -> Result<u64, JsError> {
        let agent = self
            .library
            .instantiate(preset)
            .map_err(|e| JsError::new(&e.to_string()))?;
        let id = agent.id.0;
        self.event
            .add_agent(agent)
            .map_err(|e| JsError::new(&e.to_string()))?;
        Ok(id)
    }

    pub fn remove_agent(&mut self, id: u64) -> Result<(), JsError> {
        self.event
            .remove_agent(AgentId(id))
            .map(|_| ())
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Return a JSON description of the roster and its bounds.
    pub fn roster(&self) -> Result<String, JsError> {
        to_json(&RosterInfo {
            event_type: &self.event.event_type,
            agents: self.event.agents(),
            status: self.event.status(),
            can_start: self.event.can_start(),
            overfull: self.event.overfull(),
        })
    }

    /// Lock the roster and build the simulation. The debate starts paused.
    pub fn begin(&mut self) -> Result<(), JsError> {
        let simulation = Simulation::builder()
            .seed(self.seed)
            .build(&self.event)
            .map_err(|e| JsError::new(&format!("Engine build error: {e}")))?;
        self.event.start().map_err(|e| JsError::new(&e.to_string()))?;
        self.simulation = Some(simulation);
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), JsError> {
        self.simulation_mut()?.start();
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), JsError> {
        self.simulation_mut()?.pause();
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<(), JsError> {
        self.simulation_mut()?.toggle();
        Ok(())
    }

    pub fn reset(&mut self) -> Result<(), JsError> {
        self.simulation_mut()?.reset();
        Ok(())
    }

    /// Mark the event completed and stop the debate.
    pub fn finish(&mut self) -> Result<(), JsError> {
        self.event.complete().map_err(|e| JsError::new(&e.to_string()))?;
        if let Some(simulation) = self.simulation.as_mut() {
            simulation.pause();
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.simulation.as_ref().is_some_and(|s| s.is_running())
    }

    /// Interval the host timer should use between `tick` calls.
    pub fn tick_interval_ms(&self) -> u64 {
        self.simulation
            .as_ref()
            .map(|s| s.config().tick_interval_ms)
            .unwrap_or(3000)
    }

    /// Advance one tick. Returns the new step as JSON, or `null` when paused.
    pub fn tick(&mut self) -> Result<String, JsError> {
        let step = self.simulation_mut()?.tick().cloned();
        to_json(&step)
    }

    /// Return JSON array of steps after the first `seen`.
    pub fn steps_since(&self, seen: usize) -> Result<String, JsError> {
        to_json(&self.simulation_ref()?.steps_since(seen))
    }

    /// Return the ranked leaderboard as JSON.
    pub fn leaderboard(&self) -> Result<String, JsError> {
        to_json(&self.simulation_ref()?.leaderboard())
    }

    /// Return the phase strip as JSON.
    pub fn phases(&self) -> Result<String, JsError> {
        let scheduler = self.simulation_ref()?.scheduler();
        let phases: Vec<PhaseInfo<'_>> = scheduler
            .phases()
            .iter()
            .enumerate()
            .map(|(index, phase)| PhaseInfo {
                name: &phase.name,
                description: &phase.description,
                time_budget_secs: phase.time_budget_secs,
                progress: scheduler.progress(index),
            })
            .collect();
        to_json(&phases)
    }
}

// Private helpers
impl ArenaDemo {
    fn simulation_ref(&self) -> Result<&Simulation, JsError> {
        self.simulation
            .as_ref()
            .ok_or_else(|| JsError::new("debate has not begun"))
    }

    fn simulation_mut(&mut self) -> Result<&mut Simulation, JsError> {
        self.simulation
            .as_mut()
            .ok_or_else(|| JsError::new("debate has not begun"))
    }
}
