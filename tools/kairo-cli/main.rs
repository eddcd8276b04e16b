use clap::Parser;
use kairo::prelude::*;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

/// A typed dataflow engine CLI: load a workspace and run its processes
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the workspace JSON file
    workspace_path: Option<String>,

    /// The process to run
    #[arg(short, long)]
    process: Option<String>,

    /// Input values as name=value pairs
    #[arg(short = 'I', long, value_name = "NAME=VALUE")]
    input: Vec<String>,

    /// List processes and registered functions, then exit
    #[arg(short, long)]
    list: bool,

    /// Run in interactive mode to be prompted for inputs
    #[arg(short = 'i', long, help = "Run in interactive 'human' mode")]
    human: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let workspace_path = cli
        .workspace_path
        .clone()
        .unwrap_or_else(|| exit_with_error("Workspace path is required."));
    let record = WorkspaceRecord::from_file(&workspace_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to load workspace '{}': {}",
            workspace_path, e
        ))
    });
    let workspace = Workspace::from_record(record, FunctionRegistry::with_builtins())
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to build workspace: {}", e)));

    if cli.list {
        list_workspace(&workspace);
        return;
    }

    let process_id = cli.process.clone().unwrap_or_else(|| {
        exit_with_error("A process to run is required (use --process, or --list to see them).")
    });
    let process = workspace
        .process(&process_id)
        .unwrap_or_else(|| exit_with_error(&format!("No process '{}' in this workspace.", process_id)));

    let inputs = if cli.human {
        prompt_for_inputs(process)
    } else {
        parse_inputs(process, &cli.input)
    };

    let outputs = workspace
        .run(&process_id, &inputs)
        .unwrap_or_else(|e| exit_with_error(&format!("Run failed: {}", e)));

    println!("\nRun finished!");
    for (name, value) in &outputs {
        println!("  -> {} = {}", name, value);
    }
}

fn list_workspace(workspace: &Workspace) {
    println!("Processes:");
    for process in workspace.processes().values() {
        let inputs = signature(process.declared_inputs());
        let outputs = signature(process.declared_outputs());
        println!("  {} ({}) -> ({})", process.id(), inputs, outputs);
    }

    println!("\nRegistered functions:");
    let mut ids: Vec<&str> = workspace.registry().ids().collect();
    ids.sort_unstable();
    for id in ids {
        if let Some(function) = workspace.registry().get(id) {
            println!("  {} [{}]", id, function.symbol);
        }
    }
}

fn signature(slots: &IndexMap<String, IoType>) -> String {
    slots
        .iter()
        .map(|(name, io_type)| format!("{}: {}", name, io_type))
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_inputs(process: &Process, raw: &[String]) -> IoValues {
    let mut inputs = IoValues::new();
    for entry in raw {
        let Some((name, literal)) = entry.split_once('=') else {
            exit_with_error(&format!("Input '{}' is not of the form name=value.", entry));
        };
        let Some(io_type) = process.declared_inputs().get(name).copied() else {
            exit_with_error(&format!(
                "Process '{}' declares no input '{}'.",
                process.id(),
                name
            ));
        };
        let Some(value) = IoValue::parse(io_type, literal) else {
            exit_with_error(&format!("'{}' is not a valid {} literal.", literal, io_type));
        };
        inputs.insert(name.to_string(), value);
    }
    inputs
}

/// Prompts for every declared input of the process in turn.
fn prompt_for_inputs(process: &Process) -> IoValues {
    println!("--- Kairo Interactive Mode ---");

    let mut inputs = IoValues::new();
    for (name, io_type) in process.declared_inputs() {
        loop {
            let literal = prompt_for_input(&format!("Enter {} ({})", name, io_type), None);
            match IoValue::parse(*io_type, &literal) {
                Some(value) => {
                    inputs.insert(name.clone(), value);
                    break;
                }
                None => println!("'{}' is not a valid {} literal.", literal, io_type),
            }
        }
    }
    inputs
}

/// A helper function to prompt the user and read a line of input.
fn prompt_for_input(prompt_text: &str, default: Option<&str>) -> String {
    let mut line = String::new();
    let default_prompt = default.map_or("".to_string(), |d| format!(" [default: {}]", d));

    print!("> {}{}: ", prompt_text, default_prompt);
    io::stdout().flush().unwrap();

    io::stdin()
        .read_line(&mut line)
        .expect("Failed to read line");
    let trimmed = line.trim().to_string();

    if trimmed.is_empty() {
        default.unwrap_or("").to_string()
    } else {
        trimmed
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
