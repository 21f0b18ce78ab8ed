//! Graph Linter: validates a scene graph document.
//!
//! Usage: graph_linter <graph.json> [--config <editor.ron>]

use scene_graph::core::integrity::inspect;
use scene_graph::schema::scene::{Next, Scene};
use scene_graph::{EditorConfig, SceneStore};
use std::collections::HashSet;
use std::path::Path;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: graph_linter <graph.json> [--config <editor.ron>]");
        process::exit(0);
    }

    let graph_path = &args[1];
    let mut config_path = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--config" && i + 1 < args.len() {
            i += 1;
            config_path = Some(args[i].clone());
        }
        i += 1;
    }

    let config = match config_path {
        Some(ref path) => match EditorConfig::load_from_ron(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("ERROR: Failed to load config: {}", e);
                process::exit(1);
            }
        },
        None => EditorConfig::default(),
    };

    let text = match std::fs::read_to_string(graph_path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("ERROR: Failed to read '{}': {}", graph_path, e);
            process::exit(1);
        }
    };

    // Lint whatever parses; strict mode would refuse exactly what we want
    // to report on.
    let mut store = SceneStore::with_config(EditorConfig {
        import_policy: scene_graph::ImportPolicy::Permissive,
        ..config
    });
    if let Err(e) = store.import(&text) {
        eprintln!("ERROR: {}", e);
        process::exit(1);
    }

    println!("Loaded {} scenes", store.scenes().len());

    let (errors, warnings) = lint_graph(store.scenes());

    println!("\n=== Scene Graph Lint Report ===\n");

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

fn lint_graph(scenes: &[Scene]) -> (Vec<String>, Vec<String>) {
    let errors: Vec<String> = inspect(scenes).iter().map(|issue| issue.to_string()).collect();
    let mut warnings = Vec::new();

    // The first scene is the entry point; every other scene should be
    // reachable through some reference.
    let referenced: HashSet<&str> = scenes.iter().flat_map(|s| s.next.targets()).collect();
    for scene in scenes.iter().skip(1) {
        if !referenced.contains(scene.id.as_str()) {
            warnings.push(format!("Scene '{}' is never referenced", scene.id));
        }
    }

    for scene in scenes {
        if scene.dialogue.is_empty() {
            warnings.push(format!("Scene '{}' has no dialogue", scene.id));
        }
        if let Next::Choices(choices) = &scene.next {
            for (i, choice) in choices.iter().enumerate() {
                if choice.text.trim().is_empty() {
                    warnings.push(format!("Choice {} of scene '{}' has no text", i, scene.id));
                }
                if choice.target.is_empty() {
                    warnings.push(format!("Choice {} of scene '{}' has no target", i, scene.id));
                }
            }
        }
    }

    (errors, warnings)
}
