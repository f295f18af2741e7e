/// Pool Linter: validates message pool coverage against a phase list.
///
/// Usage: pool_linter <pools_file_or_dir> [--phases <path>]

use arena_engine::core::phase::{self, Phase};
use arena_engine::core::pools::MessagePools;
use std::collections::HashSet;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: pool_linter <pools_file_or_dir> [--phases <path>]");
        process::exit(0);
    }

    let pools_arg = &args[1];
    let mut phases_path = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--phases" && i + 1 < args.len() {
            i += 1;
            phases_path = Some(args[i].clone());
        }
        i += 1;
    }

    let phases = match phases_path {
        Some(ref path) => match phase::load_phases(Path::new(path)) {
            Ok(phases) => phases,
            Err(e) => {
                eprintln!("ERROR: Failed to load phases: {}", e);
                process::exit(1);
            }
        },
        None => phase::debate_phases(),
    };

    let mut pools = MessagePools::new();
    let pools_path = Path::new(pools_arg);

    if pools_path.is_file() {
        match MessagePools::load_from_ron(pools_path) {
            Ok(loaded) => pools.merge(loaded),
            Err(e) => {
                eprintln!("ERROR: Failed to load pool file: {}", e);
                process::exit(1);
            }
        }
    } else if pools_path.is_dir() {
        load_pools_recursive(pools_path, &mut pools);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", pools_arg);
        process::exit(1);
    }

    println!(
        "Loaded {} pools against {} phases",
        pools.len(),
        phases.len()
    );

    let (errors, warnings) = lint_pools(&pools, &phases);

    println!("\n=== Pool Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn load_pools_recursive(dir: &Path, pools: &mut MessagePools) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                load_pools_recursive(&path, pools);
            } else if path.file_name().and_then(|s| s.to_str()) == Some("messages.ron") {
                match MessagePools::load_from_ron(&path) {
                    Ok(loaded) => {
                        println!("  Loaded: {}", path.display());
                        pools.merge(loaded);
                    }
                    Err(e) => {
                        eprintln!("  ERROR loading {}: {}", path.display(), e);
                    }
                }
            }
        }
    }
}

fn lint_pools(pools: &MessagePools, phases: &[Phase]) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Every other phase falls back to the first one, so it must have lines.
    if let Some(first) = phases.first() {
        if let Err(e) = pools.ensure_fallback(&first.name) {
            errors.push(e.to_string());
        }
    }

    for phase in phases.iter().skip(1) {
        if pools.get(&phase.name).is_none() {
            warnings.push(format!(
                "Phase '{}' has no messages and will reuse the '{}' pool",
                phase.name,
                phases[0].name
            ));
        }
    }

    let phase_names: HashSet<&str> = phases.iter().map(|p| p.name.as_str()).collect();
    let mut pool_names: Vec<&str> = pools.phase_names().collect();
    pool_names.sort_unstable();

    for name in pool_names {
        if !phase_names.contains(name) {
            warnings.push(format!("Pool '{}' does not match any phase and is never used", name));
        }

        let Some(messages) = pools.get(name) else {
            continue;
        };

        if messages.len() < 3 {
            warnings.push(format!(
                "Pool '{}' has only {} messages (minimum 3 recommended)",
                name,
                messages.len()
            ));
        }

        let mut seen = HashSet::new();
        for message in messages {
            if message.trim().is_empty() {
                errors.push(format!("Pool '{}' contains an empty message", name));
            } else if !seen.insert(message.as_str()) {
                warnings.push(format!("Pool '{}' repeats the message \"{}\"", name, message));
            }
        }
    }

    (errors, warnings)
}
