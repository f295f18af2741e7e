/// Arena Preview: interactive shell for building a roster and watching a debate.
///
/// Usage: arena_preview [--config <path>] [--phases <path>] [--pools <path>]
///                      [--agents <path>] [--seed <n>]
///
/// Commands:
///   presets            list agent presets
///   add <preset>       add a preset agent to the roster
///   remove <id>        remove an agent from the roster
///   roster             show the roster and bounds
///   begin              lock the roster and build the simulation
///   tick [n]           run n ticks immediately (default 1)
///   run <n>            run n ticks at the configured tick interval
///   board              show the leaderboard
///   phase              show the phase strip
///   reset              clear the log and reseed scores
///   finish             mark the event completed
///   seed <n>           set RNG seed for the next `begin`
///   help               list commands
///   quit               exit

use arena_engine::core::phase::PhaseProgress;
use arena_engine::core::simulation::Simulation;
use arena_engine::schema::agent::{AgentId, AgentLibrary};
use arena_engine::schema::event::{Event, EventId, EventStatus};
use arena_engine::schema::event_type::EventType;
use arena_engine::schema::step::SimulationStep;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

struct Paths {
    config: Option<String>,
    phases: Option<String>,
    pools: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let mut paths = Paths {
        config: None,
        phases: None,
        pools: None,
    };
    let mut agents_path = None;
    let mut seed: u64 = 42;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                i += 1;
                paths.config = Some(args[i].clone());
            }
            "--phases" if i + 1 < args.len() => {
                i += 1;
                paths.phases = Some(args[i].clone());
            }
            "--pools" if i + 1 < args.len() => {
                i += 1;
                paths.pools = Some(args[i].clone());
            }
            "--agents" if i + 1 < args.len() => {
                i += 1;
                agents_path = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut library = match AgentLibrary::presets() {
        Ok(library) => library,
        Err(e) => {
            eprintln!("ERROR: Failed to load agent presets: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(ref path) = agents_path {
        if let Err(e) = library.load_from_ron(Path::new(path)) {
            eprintln!("ERROR: Failed to load agents from {}: {}", path, e);
            std::process::exit(1);
        }
    }

    println!("Loaded {} agent presets", library.templates().len());
    println!("Seed: {}", seed);
    println!("Type 'help' for commands.\n");

    let mut next_event_id: u64 = 1;
    let mut event = Event::new(EventId(next_event_id), EventType::debate());
    let mut sim: Option<Simulation> = None;
    let mut current_seed = seed;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("arena> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
            }
            "presets" => {
                for template in library.templates() {
                    println!(
                        "  {} {} [{} / {}]",
                        template.avatar,
                        template.name,
                        template.communication_style.label(),
                        template.memory.label()
                    );
                    println!("      {}", template.perspective);
                }
            }
            "add" => {
                if parts.len() < 2 {
                    println!("Usage: add <preset name>");
                    continue;
                }
                let name = parts[1..].join(" ");
                let agent = match library.instantiate(&name) {
                    Ok(agent) => agent,
                    Err(e) => {
                        println!("ERROR: {}", e);
                        continue;
                    }
                };
                let (id, label) = (agent.id, agent.name.clone());
                match event.add_agent(agent) {
                    Ok(()) => println!("Added {} as {}", label, id),
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "remove" => {
                let Some(id) = parts.get(1).and_then(|s| parse_agent_id(s)) else {
                    println!("Usage: remove <id>");
                    continue;
                };
                match event.remove_agent(id) {
                    Ok(agent) => println!("Removed {}", agent.name),
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "roster" => {
                print_roster(&event);
            }
            "begin" => {
                let mut built = match build_simulation(&paths, current_seed, &event) {
                    Ok(built) => built,
                    Err(e) => {
                        println!("ERROR: {}", e);
                        continue;
                    }
                };
                match event.start() {
                    Ok(()) => {
                        built.start();
                        println!(
                            "{} arena running with {} agents. Tick every {} ms.",
                            event.event_type.name,
                            built.roster().len(),
                            built.config().tick_interval_ms
                        );
                        sim = Some(built);
                    }
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "tick" | "run" => {
                let Some(ref mut running) = sim else {
                    println!("No simulation yet. Use 'begin' first.");
                    continue;
                };
                let count: usize = match parts.get(1).map(|s| s.parse()) {
                    None if cmd == "tick" => 1,
                    Some(Ok(n)) => n,
                    _ => {
                        println!("Usage: {} <n>", cmd);
                        continue;
                    }
                };
                running.start();
                let interval = running.config().tick_interval();
                let seen = running.exchange_count();
                for n in 0..count {
                    if cmd == "run" && n > 0 {
                        std::thread::sleep(interval);
                    }
                    if let Some(step) = running.tick() {
                        print_step(&event, step);
                    }
                }
                println!(
                    "-- {} new exchanges, {} total --",
                    running.steps_since(seen).len(),
                    running.exchange_count()
                );
            }
            "pause" => match sim {
                Some(ref mut running) => {
                    running.pause();
                    println!("Paused.");
                }
                None => println!("No simulation yet."),
            },
            "board" => {
                let Some(ref running) = sim else {
                    println!("No simulation yet.");
                    continue;
                };
                println!("\n=== Debate Leaderboard ===");
                for (rank, entry) in running.leaderboard().iter().enumerate() {
                    println!(
                        "  #{} {} {:<24} {:>4}  ({} arguments)",
                        rank + 1,
                        entry.agent.avatar,
                        entry.agent.name,
                        entry.score,
                        entry.message_count
                    );
                }
                println!();
            }
            "phase" => {
                let Some(ref running) = sim else {
                    println!("No simulation yet.");
                    continue;
                };
                let scheduler = running.scheduler();
                for (index, phase) in scheduler.phases().iter().enumerate() {
                    let marker = match scheduler.progress(index) {
                        PhaseProgress::Completed => "done",
                        PhaseProgress::Current => " >> ",
                        PhaseProgress::Upcoming => "    ",
                    };
                    println!(
                        "  [{}] {} ({}s): {}",
                        marker, phase.name, phase.time_budget_secs, phase.description
                    );
                }
                println!(
                    "  {} / {} exchanges toward next phase",
                    scheduler.exchanges_since_last_advance(),
                    scheduler.exchanges_per_phase()
                );
            }
            "reset" => match sim {
                Some(ref mut running) => {
                    running.reset();
                    println!("Debate reset. Scores reseeded.");
                }
                None => println!("No simulation yet."),
            },
            "finish" => match event.complete() {
                Ok(()) => {
                    if let Some(ref mut running) = sim {
                        running.pause();
                    }
                    println!("Event completed.");
                }
                Err(e) => println!("ERROR: {}", e),
            },
            "new" => {
                next_event_id += 1;
                event = Event::new(EventId(next_event_id), EventType::debate());
                sim = None;
                println!("New debate (event {}).", next_event_id);
            }
            "seed" => {
                if parts.len() < 2 {
                    println!("Current seed: {}", current_seed);
                    continue;
                }
                match parts[1].parse::<u64>() {
                    Ok(s) => {
                        current_seed = s;
                        println!("Seed set to {} (applies on next 'begin')", current_seed);
                    }
                    Err(_) => println!("Invalid seed: {}", parts[1]),
                }
            }
            _ => {
                println!("Unknown command: {}. Type 'help' for commands.", cmd);
            }
        }
    }
}

fn build_simulation(
    paths: &Paths,
    seed: u64,
    event: &Event,
) -> Result<Simulation, arena_engine::core::simulation::EngineError> {
    let mut builder = Simulation::builder().seed(seed);
    if let Some(ref path) = paths.config {
        builder = builder.config_file(path);
    }
    if let Some(ref path) = paths.phases {
        builder = builder.phases_file(path);
    }
    if let Some(ref path) = paths.pools {
        builder = builder.pools_file(path);
    }
    builder.build(event)
}

fn parse_agent_id(s: &str) -> Option<AgentId> {
    s.trim_start_matches("agent-").parse().ok().map(AgentId)
}

fn print_roster(event: &Event) {
    let ty = &event.event_type;
    println!(
        "{}: {} / {}-{} agents ({:?})",
        ty.name,
        event.agents().len(),
        ty.min_agents,
        ty.max_agents,
        event.status()
    );
    for agent in event.agents() {
        println!(
            "  {} {} {} [{}, {}]",
            agent.id,
            agent.avatar,
            agent.name,
            agent.communication_style.slug(),
            agent.memory.slug()
        );
    }
    if event.status() == EventStatus::Building {
        if !event.can_start() {
            println!("  Need {} more agent(s)", event.agents_needed());
        } else if event.overfull() {
            println!("  Too many agents! Remove {}", event.agents_over());
        } else {
            println!("  Ready. Type 'begin' to start.");
        }
    }
}

fn print_step(event: &Event, step: &SimulationStep) {
    let name = event
        .agent(step.agent_id)
        .map(|a| a.name.as_str())
        .unwrap_or("?");
    println!(
        "[{}] R{} {} | {}: {}",
        step.timestamp.format("%H:%M:%S"),
        step.round_index,
        step.phase_name,
        name,
        step.message
    );
}

fn print_usage() {
    println!("Usage: arena_preview [--config <path>] [--phases <path>] [--pools <path>] [--agents <path>] [--seed <n>]");
}

fn print_help() {
    println!("Commands:");
    println!("  presets        list agent presets");
    println!("  add <preset>   add a preset agent to the roster");
    println!("  remove <id>    remove an agent from the roster");
    println!("  roster         show the roster and bounds");
    println!("  begin          lock the roster and start the debate");
    println!("  tick [n]       run n ticks immediately");
    println!("  run <n>        run n ticks at the configured interval");
    println!("  pause          pause the debate");
    println!("  board          show the leaderboard");
    println!("  phase          show the phase strip");
    println!("  reset          clear the log and reseed scores");
    println!("  finish         mark the event completed");
    println!("  new            start a new debate roster");
    println!("  seed <n>       set RNG seed for the next 'begin'");
    println!("  quit           exit");
}
