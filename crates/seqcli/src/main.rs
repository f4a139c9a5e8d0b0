// crates/seqcli/src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use seqcore::{ExecutionEvent, ExecutionStatus, NodeSpec, Procedure, UiMessage};
use seqruntime::{
    global_instruction_registry, global_variable_registry, load_procedure, Sequencer, TypeRegistry,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "seq")]
#[command(about = "Sequencer CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a procedure file
    Run {
        /// Path to procedure JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a procedure file
    Validate {
        /// Path to procedure JSON file
        file: PathBuf,
    },

    /// List registered instruction and variable types
    Nodes,

    /// Create a new example procedure
    Init {
        /// Output file path
        #[arg(short, long, default_value = "procedure.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    seqnodes::register_all();

    match cli.command {
        Commands::Run { file, verbose } => {
            // RUST_LOG wins over the verbose flag
            let default_level = if verbose { "debug" } else { "info" };
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new(default_level)),
                )
                .init();

            let status = run_procedure(file).await?;
            if !status.is_success() {
                std::process::exit(1);
            }
        }

        Commands::Validate { file } => {
            validate_procedure(file)?;
        }

        Commands::Nodes => {
            list_nodes();
        }

        Commands::Init { output } => {
            create_example_procedure(output)?;
        }
    }

    Ok(())
}

async fn run_procedure(file: PathBuf) -> Result<ExecutionStatus> {
    println!("🚀 Loading procedure from: {}", file.display());

    let procedure = load_procedure(&file)?;

    println!("📋 Procedure: {}", procedure.name);
    println!("   Variables: {}", procedure.variables.len());
    println!("   Instructions: {}", procedure.instructions.len());
    println!();

    let sequencer = Sequencer::new();
    let mut events = sequencer.subscribe_events();

    let event_task = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ExecutionEvent::ProcedureStarted { .. } => {
                    println!("▶️  Procedure started");
                }
                ExecutionEvent::InstructionStarted {
                    index,
                    instruction_type,
                    name,
                    ..
                } => match name {
                    Some(name) => println!("  ⚡ [{}] {} ({})", index, name, instruction_type),
                    None => println!("  ⚡ [{}] {}", index, instruction_type),
                },
                ExecutionEvent::InstructionCompleted {
                    index,
                    status,
                    duration_ms,
                    ..
                } => {
                    if status.is_success() {
                        println!("  ✅ [{}] completed in {}ms", index, duration_ms);
                    } else {
                        println!("  ❌ [{}] failed after {}ms", index, duration_ms);
                    }
                }
                ExecutionEvent::InstructionMessage { index, message, .. } => match message {
                    UiMessage::Info { message } => {
                        println!("     ℹ️  [{}] {}", index, message);
                    }
                    UiMessage::Failure { message } => {
                        println!("     ⚠️  [{}] {}", index, message);
                    }
                },
                ExecutionEvent::ProcedureCompleted {
                    status,
                    duration_ms,
                    ..
                } => {
                    if status.is_success() {
                        println!("✨ Procedure completed successfully in {}ms", duration_ms);
                    } else {
                        println!("💥 Procedure failed after {}ms", duration_ms);
                    }
                }
            }
        }
    });

    tracing::info!("Running procedure '{}'", procedure.name);
    let result = match sequencer.run(&procedure).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("Procedure '{}' did not run: {}", procedure.name, e);
            event_task.abort();
            return Err(e.into());
        }
    };

    // Wait for events to finish printing
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    event_task.abort();

    println!();
    println!("📊 Execution Summary:");
    println!("   Execution ID: {}", result.execution_id);
    println!(
        "   Executed: {}/{} instructions",
        result.executed_instructions, result.total_instructions
    );

    Ok(result.status)
}

fn validate_procedure(file: PathBuf) -> Result<()> {
    println!("🔍 Validating procedure: {}", file.display());

    let procedure = load_procedure(&file)?;
    if let Err(e) = Sequencer::new().validate(&procedure) {
        tracing::error!("Procedure '{}' is invalid: {}", procedure.name, e);
        return Err(e.into());
    }

    println!("✅ Procedure is valid:");
    println!("   Name: {}", procedure.name);
    println!("   Variables: {}", procedure.variables.len());
    println!("   Instructions: {}", procedure.instructions.len());

    Ok(())
}

fn list_nodes() {
    println!("📦 Instruction Types:");
    print_registry(global_instruction_registry());
    println!();
    println!("📦 Variable Types:");
    print_registry(global_variable_registry());
}

fn print_registry<T: ?Sized>(registry: &TypeRegistry<T>) {
    for type_name in registry.list_types() {
        if let Some(metadata) = registry.get_metadata(&type_name) {
            println!("  • {} ({})", type_name, metadata.category);
            println!("    {}", metadata.description);
        } else {
            println!("  • {}", type_name);
        }
    }
}

fn create_example_procedure(output: PathBuf) -> Result<()> {
    let mut procedure = Procedure::new("Example Channel Procedure");
    procedure.description =
        Some("Hosts a channel, writes a setpoint to it and logs the result".to_string());

    procedure
        .add_variable(
            NodeSpec::new("ServerVariable")
                .with_name("server")
                .with_attribute("channel", "EXAMPLE:SETPOINT")
                .with_attribute("type", r#"{"type":"float64"}"#)
                .with_attribute("value", "0"),
        )
        .add_variable(
            NodeSpec::new("Local")
                .with_name("setpoint")
                .with_attribute("type", r#"{"type":"float64"}"#)
                .with_attribute("value", "21.5"),
        )
        .add_instruction(
            NodeSpec::new("ChannelWrite")
                .with_name("Apply Setpoint")
                .with_attribute("channel", "EXAMPLE:SETPOINT")
                .with_attribute("varName", "setpoint")
                .with_attribute("timeout", "1.0"),
        )
        .add_instruction(
            NodeSpec::new("Log")
                .with_name("Show Server Value")
                .with_attribute("message", "Channel now holds")
                .with_attribute("inputVar", "server"),
        );

    let json = serde_json::to_string_pretty(&procedure)?;
    std::fs::write(&output, json)?;

    println!("✨ Created example procedure: {}", output.display());
    println!();
    println!("Run it with:");
    println!("  seq run --file {}", output.display());

    Ok(())
}
