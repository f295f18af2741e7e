/// Debate Night example: a four-agent debate from opening statements to final arguments.
///
/// Run with: cargo run --example debate_night

use arena_engine::core::simulation::Simulation;
use arena_engine::schema::agent::AgentLibrary;
use arena_engine::schema::event::{Event, EventId};
use arena_engine::schema::event_type::EventType;
use chrono::{Duration, Utc};

fn main() {
    // --- Pick the debate template ---
    let catalog = EventType::catalog().expect("Failed to load event type catalog");
    let debate = catalog
        .into_iter()
        .find(|t| t.id == "debate")
        .expect("Debate template missing from catalog");

    // --- Build the roster from presets ---
    let mut library = AgentLibrary::presets().expect("Failed to load agent presets");
    let mut event = Event::new(EventId(2026), debate);
    for name in [
        "Libertarian Economist",
        "EU Bureaucrat",
        "Skeptical Critic",
        "Pragmatic Mediator",
    ] {
        let agent = library.instantiate(name).expect("Unknown preset");
        event.add_agent(agent).expect("Roster rejected agent");
    }
    event.start().expect("Roster outside debate bounds");

    let mut sim = Simulation::builder()
        .seed(2026)
        .build(&event)
        .expect("Failed to build simulation");

    // --- Title ---
    println!("========================================");
    println!("   DEBATE NIGHT");
    println!("   {} agents, {} phases", event.agents().len(), sim.scheduler().phases().len());
    println!("========================================");
    println!();

    // Simulated clock: one tick per configured interval, no real sleeping.
    let interval = Duration::milliseconds(sim.config().tick_interval_ms as i64);
    let mut clock = Utc::now();
    let mut last_phase = String::new();

    sim.start();
    for _ in 0..36 {
        clock += interval;
        let Some(step) = sim.tick_at(clock) else {
            continue;
        };
        if step.phase_name != last_phase {
            last_phase = step.phase_name.clone();
            println!("--- Round {}: {} ---", step.round_index, step.phase_name);
        }
        let speaker = event
            .agent(step.agent_id)
            .map(|a| format!("{} {}", a.avatar, a.name))
            .unwrap_or_default();
        println!("[{}] {}", step.timestamp.format("%H:%M:%S"), speaker);
        println!("    {}", step.message);
    }
    sim.pause();
    event.complete().expect("Event was not running");

    // --- Final standings ---
    println!();
    println!("=== Final Standings ===");
    for (rank, entry) in sim.leaderboard().iter().enumerate() {
        println!(
            "  #{} {:<24} {:>4}  ({} arguments)",
            rank + 1,
            entry.agent.name,
            entry.score,
            entry.message_count
        );
    }
}
