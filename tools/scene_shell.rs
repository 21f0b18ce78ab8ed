//! Scene Shell: interactive line editor for scene graphs.
//!
//! Usage: scene_shell [--config <editor.ron>] [--load <graph.json>]
//!
//! Type `help` at the prompt for the command list.

use scene_graph::core::summary::FlowLink;
use scene_graph::schema::character::{CharacterField, Emotion, Position};
use scene_graph::schema::dialogue::DialogueField;
use scene_graph::schema::scene::{ChoiceField, Next, SceneUpdate};
use scene_graph::{EditorConfig, SceneStore};
use std::io::{self, BufRead, Write};
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut config_path = None;
    let mut load_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                return;
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--load" if i + 1 < args.len() => {
                i += 1;
                load_path = Some(args[i].clone());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config = match config_path {
        Some(ref path) => match EditorConfig::load_from_ron(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("ERROR: Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => EditorConfig::default(),
    };

    let mut store = SceneStore::with_config(config);
    if let Some(ref path) = load_path {
        import_file(&mut store, path);
    }

    println!("{} scene(s) loaded", store.scenes().len());
    println!("Type 'help' for commands.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        match store.selection() {
            Some(id) => print!("scene[{}]> ", id),
            None => print!("scene> "),
        }
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
            "help" | "h" | "?" => print_help(),
            "ls" | "list" => print_summary(&store),
            "show" => print_current(&store),
            "add" => match store.add_scene(parts.get(1).copied()) {
                Ok(snap) => println!("Added scene '{}'", snap.selection().unwrap_or_default()),
                Err(e) => println!("ERROR: {}", e),
            },
            "rm" | "delete" => {
                let Some(id) = parts.get(1) else {
                    println!("Usage: delete <scene_id>");
                    continue;
                };
                let before = store.revision();
                store.delete_scene(id);
                if store.revision() == before {
                    println!("No scene '{}'", id);
                } else {
                    println!("Deleted scene '{}'", id);
                }
            }
            "rename" => {
                if parts.len() < 3 {
                    println!("Usage: rename <scene_id> <new_id>");
                    continue;
                }
                match store.rename_scene(parts[1], parts[2]) {
                    Ok(_) => println!("Renamed '{}' to '{}'", parts[1], parts[2]),
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "select" | "sel" => match parts.get(1) {
                Some(&"none") => {
                    store.select(None);
                }
                Some(id) => {
                    store.select(Some(*id));
                    if store.selection() != Some(*id) {
                        println!("No scene '{}'", id);
                    }
                }
                None => println!("Usage: select <scene_id|none>"),
            },
            "bg" => {
                let Some(id) = store.selection().map(str::to_string) else {
                    println!("No scene selected.");
                    continue;
                };
                store.update_scene(&id, SceneUpdate::new().background(rest(&parts, 1)));
            }
            "transition" => {
                let Some(id) = store.selection().map(str::to_string) else {
                    println!("No scene selected.");
                    continue;
                };
                match parts.get(1).and_then(|s| parse_flag(s)) {
                    Some(on) => {
                        store.update_scene(&id, SceneUpdate::new().transition(on));
                    }
                    None => println!("Usage: transition on|off"),
                }
            }
            "dialogue" | "d" => run_dialogue(&mut store, &parts),
            "char" | "c" => run_character(&mut store, &parts),
            "flow" => match parts.get(1).copied() {
                Some("single") => {
                    store.set_flow_mode(false);
                }
                Some("choices") => {
                    store.set_flow_mode(true);
                }
                _ => println!("Usage: flow single|choices"),
            },
            "goto" => {
                store.set_single_target(parts.get(1).copied().unwrap_or_default());
            }
            "choice" => run_choice(&mut store, &parts),
            "check" => {
                let issues = store.validate();
                if issues.is_empty() {
                    println!("No integrity issues.");
                }
                for issue in issues {
                    println!("ISSUE: {}", issue);
                }
            }
            "export" => match store.export() {
                Ok(text) => match parts.get(1) {
                    Some(path) => match std::fs::write(path, &text) {
                        Ok(()) => println!("Wrote {}", path),
                        Err(e) => println!("ERROR: {}", e),
                    },
                    None => println!("{}", text),
                },
                Err(e) => println!("ERROR: {}", e),
            },
            "import" => match parts.get(1) {
                Some(path) => import_file(&mut store, path),
                None => println!("Usage: import <path>"),
            },
            _ => println!("Unknown command '{}'. Type 'help' for commands.", cmd),
        }
    }
}

fn run_dialogue(store: &mut SceneStore, parts: &[&str]) {
    let sub = parts.get(1).copied().unwrap_or_default();
    if sub == "add" {
        store.add_dialogue();
        return;
    }
    let Some(index) = parts.get(2).and_then(|s| s.parse::<usize>().ok()) else {
        println!("Usage: dialogue add | dialogue text|speaker|wait|rm <index> [value]");
        return;
    };
    match sub {
        "text" => {
            store.update_dialogue(index, DialogueField::Text(rest(parts, 3)));
        }
        "speaker" => {
            store.update_dialogue(index, DialogueField::SpeakerName(rest(parts, 3)));
        }
        "wait" => match parts.get(3).and_then(|s| parse_flag(s)) {
            Some(on) => {
                store.update_dialogue(index, DialogueField::WaitForInput(on));
            }
            None => println!("Usage: dialogue wait <index> on|off"),
        },
        "rm" => {
            store.remove_dialogue(index);
        }
        _ => println!("Unknown dialogue command '{}'", sub),
    }
}

fn run_character(store: &mut SceneStore, parts: &[&str]) {
    let sub = parts.get(1).copied().unwrap_or_default();
    let Some(dialogue) = parts.get(2).and_then(|s| s.parse::<usize>().ok()) else {
        println!("Usage: char add <d> | char name|emotion|pos|visible|speaking|rm <d> <c> [value]");
        return;
    };
    if sub == "add" {
        store.add_character(dialogue);
        return;
    }
    let Some(index) = parts.get(3).and_then(|s| s.parse::<usize>().ok()) else {
        println!("Missing character index");
        return;
    };
    let value = parts.get(4).copied().unwrap_or_default();
    let field = match sub {
        "rm" => {
            store.remove_character(dialogue, index);
            return;
        }
        "name" => CharacterField::Name(rest(parts, 4)),
        "emotion" => match value.parse::<Emotion>() {
            Ok(emotion) => CharacterField::Emotion(emotion),
            Err(e) => {
                println!("ERROR: {} (expected one of {:?})", e, Emotion::ALL.map(|e| e.as_str()));
                return;
            }
        },
        "pos" => match value.parse::<Position>() {
            Ok(position) => CharacterField::Position(position),
            Err(e) => {
                println!("ERROR: {} (expected one of {:?})", e, Position::ALL.map(|p| p.as_str()));
                return;
            }
        },
        "visible" | "speaking" => match parse_flag(value) {
            Some(on) if sub == "visible" => CharacterField::Visible(on),
            Some(on) => CharacterField::IsSpeaking(on),
            None => {
                println!("Usage: char {} <d> <c> on|off", sub);
                return;
            }
        },
        _ => {
            println!("Unknown character command '{}'", sub);
            return;
        }
    };
    store.update_character(dialogue, index, field);
}

fn run_choice(store: &mut SceneStore, parts: &[&str]) {
    let sub = parts.get(1).copied().unwrap_or_default();
    if sub == "add" {
        store.add_choice();
        return;
    }
    let Some(index) = parts.get(2).and_then(|s| s.parse::<usize>().ok()) else {
        println!("Usage: choice add | choice text|target|rm <index> [value]");
        return;
    };
    match sub {
        "text" => {
            store.update_choice(index, ChoiceField::Text(rest(parts, 3)));
        }
        "target" => {
            store.update_choice(index, ChoiceField::Target(rest(parts, 3)));
        }
        "rm" => {
            store.remove_choice(index);
        }
        _ => println!("Unknown choice command '{}'", sub),
    }
}

fn import_file(store: &mut SceneStore, path: &str) {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            println!("ERROR: Failed to read '{}': {}", path, e);
            return;
        }
    };
    match store.import(&text) {
        Ok(snap) => println!("Imported {} scene(s) from {}", snap.len(), path),
        Err(e) => println!("ERROR: {}", e),
    }
}

fn rest(parts: &[&str], from: usize) -> String {
    parts.get(from..).map(|p| p.join(" ")).unwrap_or_default()
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn print_summary(store: &SceneStore) {
    let summary = store.flow_summary();
    if summary.is_empty() {
        println!("(no scenes)");
        return;
    }
    for scene in summary {
        let marker = if scene.selected { "*" } else { " " };
        let link = match scene.link {
            FlowLink::Next { target } => format!("-> {}", target),
            FlowLink::Choices { count } => format!("{} choices", count),
            FlowLink::Unconnected => "No connections".to_string(),
        };
        println!("{} {:<20} [{}] {}", marker, scene.id, link, scene.preview);
    }
}

fn print_current(store: &SceneStore) {
    let Some(scene) = store.current_scene() else {
        println!("No scene selected.");
        return;
    };
    println!("\n--- Scene '{}' ---", scene.id);
    println!("background: {:?}  transition: {}", scene.background, scene.transition);
    for (d, line) in scene.dialogue.iter().enumerate() {
        println!(
            "  [{}] {}: {:?}{}",
            d,
            if line.speaker_name.is_empty() { "(narration)" } else { line.speaker_name.as_str() },
            line.text,
            if line.wait_for_input { "" } else { "  (auto)" }
        );
        for (c, ch) in line.characters.iter().enumerate() {
            println!(
                "      ({}) {} {:?} {} {}{}{}",
                c,
                ch.id,
                ch.name,
                ch.emotion.as_str(),
                ch.position.as_str(),
                if ch.visible { "" } else { " hidden" },
                if ch.is_speaking { " speaking" } else { "" }
            );
        }
    }
    match &scene.next {
        Next::Single(target) if target.is_empty() => println!("next: (unset)"),
        Next::Single(target) => println!("next: -> {}", target),
        Next::Choices(choices) => {
            println!("next: choices");
            for (i, choice) in choices.iter().enumerate() {
                println!("  <{}> {:?} -> {}", i, choice.text, choice.target);
            }
        }
    }
    println!("--- End ---\n");
}

fn print_usage() {
    println!("Usage: scene_shell [--config <editor.ron>] [--load <graph.json>]");
}

fn print_help() {
    println!("Commands:");
    println!("  ls                              list scenes with their flow");
    println!("  show                            show the selected scene");
    println!("  add [id]                        add a scene and select it");
    println!("  delete <id>                     delete a scene, clearing references");
    println!("  rename <id> <new_id>            rename a scene, updating references");
    println!("  select <id|none>                change the selection");
    println!("  bg <text>                       set background");
    println!("  transition on|off               toggle transition effect");
    println!("  dialogue add                    append a dialogue line");
    println!("  dialogue text|speaker <i> <v>   edit a dialogue line");
    println!("  dialogue wait <i> on|off        wait for input after line");
    println!("  dialogue rm <i>                 remove a dialogue line");
    println!("  char add <d>                    add a character to line d");
    println!("  char name|emotion|pos <d> <c> <v>");
    println!("  char visible|speaking <d> <c> on|off");
    println!("  char rm <d> <c>                 remove a character");
    println!("  flow single|choices             switch flow mode (discards old flow)");
    println!("  goto <id>                       continue to a single scene");
    println!("  choice add                      append a choice");
    println!("  choice text|target <i> <v>      edit a choice");
    println!("  choice rm <i>                   remove a choice");
    println!("  check                           report integrity issues");
    println!("  export [path]                   print or write JSON");
    println!("  import <path>                   replace graph from JSON file");
    println!("  quit                            exit");
}
