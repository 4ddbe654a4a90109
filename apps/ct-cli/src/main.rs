mod error;

use clap::{Parser, Subcommand};
use ct_compile::{
    CompileOutput, SynthConfig, ValidationMode, Violation, compile_model, external_ids, sequence,
    validate,
};
use ct_project::LoadedTopology;
use error::{CliError, CliResult};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "ct-cli")]
#[command(about = "cxltopo CLI - CXL topology validation and QEMU command synthesis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a topology file against the connectivity rules
    Validate {
        /// Path to the topology file (YAML or JSON)
        topology_path: PathBuf,
        /// Also require every component to be attached
        #[arg(long)]
        synthesis: bool,
    },
    /// Print the emission order with external identifiers
    Order {
        /// Path to the topology file (YAML or JSON)
        topology_path: PathBuf,
    },
    /// Synthesize the emulator command line
    Compile {
        /// Path to the topology file (YAML or JSON)
        topology_path: PathBuf,
        /// Synthesis settings (YAML); defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Output file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            topology_path,
            synthesis,
        } => cmd_validate(&topology_path, synthesis),
        Commands::Order { topology_path } => cmd_order(&topology_path),
        Commands::Compile {
            topology_path,
            config,
            json,
            output,
        } => cmd_compile(&topology_path, config.as_deref(), json, output.as_deref()),
    }
}

fn load(path: &Path) -> CliResult<LoadedTopology> {
    let def = ct_project::load_any(path)?;
    let loaded = ct_project::build_model(&def)?;
    info!(name = %loaded.name, components = loaded.model.len(), "loaded topology");
    Ok(loaded)
}

fn cmd_validate(topology_path: &Path, synthesis: bool) -> CliResult<()> {
    println!("Validating topology: {}", topology_path.display());
    let loaded = load(topology_path)?;
    let mode = if synthesis {
        ValidationMode::Synthesis
    } else {
        ValidationMode::Editing
    };

    let violations = validate(&loaded.model.snapshot(), mode);
    if violations.is_empty() {
        println!("✓ Topology is valid");
        return Ok(());
    }
    print_violations(&loaded, &violations);
    Err(CliError::Violations {
        count: violations.len(),
    })
}

fn cmd_order(topology_path: &Path) -> CliResult<()> {
    let loaded = load(topology_path)?;
    let snapshot = loaded.model.snapshot();
    let order = sequence(&snapshot);

    for (i, (id, external)) in external_ids(&order, &snapshot).into_iter().enumerate() {
        let kind = snapshot
            .component(id)
            .map(|c| c.kind().as_str())
            .unwrap_or("?");
        println!(
            "  {:>3}. {:<24} {:<22} {}",
            i + 1,
            loaded.name_of(id).unwrap_or("-"),
            kind,
            external
        );
    }
    Ok(())
}

fn cmd_compile(
    topology_path: &Path,
    config_path: Option<&Path>,
    json: bool,
    output: Option<&Path>,
) -> CliResult<()> {
    let loaded = load(topology_path)?;
    let config = match config_path {
        Some(path) => ct_project::load_config(path)?,
        None => SynthConfig::default(),
    };

    let result = compile_model(&loaded.model, &config)?;
    let text = if json {
        serde_json::to_string_pretty(&result)?
    } else {
        match &result {
            CompileOutput::Command { command } => command.clone(),
            CompileOutput::Violations { violations } => {
                print_violations(&loaded, violations);
                return Err(CliError::Violations {
                    count: violations.len(),
                });
            }
        }
    };

    match output {
        Some(path) => std::fs::write(path, format!("{text}\n")).map_err(|source| {
            CliError::OutputWrite {
                path: path.to_path_buf(),
                source,
            }
        })?,
        None => println!("{text}"),
    }

    if result.is_ok() {
        Ok(())
    } else {
        Err(CliError::Violations {
            count: result.violations().len(),
        })
    }
}

fn print_violations(loaded: &LoadedTopology, violations: &[Violation]) {
    eprintln!("✗ {} violation(s):", violations.len());
    for v in violations {
        let name = loaded.name_of(v.component_id).unwrap_or("-");
        match v.connection_id {
            Some(conn) => eprintln!("  {} on '{}' (connection {})", v.kind, name, conn),
            None => eprintln!("  {} on '{}'", v.kind, name),
        }
    }
}
