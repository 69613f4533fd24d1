use quadmesh_editor_lib::command::{execute_command, CommandResponse, EditCommand};
use quadmesh_editor_lib::harness::TestHarness;
use quadmesh_editor_lib::mesh::primitives;
use quadmesh_editor_lib::state::EditorSettings;
use shared::EditScript;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quadmesh_editor=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(script) = parse_script_arg() else {
        eprintln!("usage: quadmesh-editor --script <path>");
        std::process::exit(2);
    };

    let responses = run_script(script, EditorSettings::load());
    match serde_json::to_string_pretty(&responses) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!("Failed to serialize responses: {e}");
            std::process::exit(1);
        }
    }
}

fn run_script(script: EditScript, settings: EditorSettings) -> Vec<CommandResponse> {
    let mesh = match (script.mesh, script.primitive) {
        (Some(mesh), _) => mesh,
        (None, Some(primitive)) => primitives::build(&primitive),
        (None, None) => {
            tracing::warn!("Script has neither mesh nor primitive, starting empty");
            Default::default()
        }
    };

    let errors = quadmesh_editor_lib::validation::MeshValidator::new(&mesh).structural_errors();
    if !errors.is_empty() {
        tracing::error!("Script mesh is invalid: {}", errors.join("; "));
        std::process::exit(1);
    }

    let mut harness = TestHarness::with_settings(mesh, settings);
    script
        .commands
        .into_iter()
        .enumerate()
        .map(|(i, value)| match serde_json::from_value::<EditCommand>(value) {
            Ok(cmd) => execute_command(&mut harness, cmd),
            Err(e) => {
                tracing::warn!("Skipping command {i}: {e}");
                CommandResponse {
                    success: false,
                    error: Some(format!("Invalid command JSON: {e}")),
                    data: None,
                }
            }
        })
        .collect()
}

fn parse_script_arg() -> Option<EditScript> {
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--script" && i + 1 < args.len() {
            let path = &args[i + 1];
            match std::fs::read_to_string(path) {
                Ok(json) => match EditScript::from_json(&json) {
                    Ok(script) => {
                        tracing::info!(
                            "Loaded script from {path} ({} commands)",
                            script.commands.len()
                        );
                        return Some(script);
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse script from {path}: {e}");
                    }
                },
                Err(e) => {
                    tracing::error!("Failed to read script file {path}: {e}");
                }
            }
            break;
        }
        i += 1;
    }
    None
}
