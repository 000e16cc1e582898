//! EDAM toolchain CLI: compile models to Solidity and verify
//! role safety.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use edam_model::Edam;
use edam_verify::VerifyOptions;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// EDAM model compiler and verifier.
#[derive(Parser)]
#[command(name = "edam", version, about = "EDAM model compiler and verifier")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a model JSON file to Solidity contract source
    Generate {
        /// Path to the model JSON file
        model: PathBuf,
        /// Write the contract to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Check role safety across every execution path
    Verify {
        /// Path to the model JSON file
        model: PathBuf,
        /// Ceiling on enumerated paths
        #[arg(long, default_value_t = edam_verify::MAX_PATHS)]
        max_paths: usize,
        /// Render issues as a two-column table (text output only)
        #[arg(long)]
        table: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { model, out } => {
            cmd_generate(&model, out.as_deref(), cli.output, cli.quiet);
        }
        Commands::Verify {
            model,
            max_paths,
            table,
        } => {
            cmd_verify(&model, max_paths, table, cli.output, cli.quiet);
        }
    }
}

fn report_error(message: &str, output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Json => {
            let json = serde_json::json!({ "error": message });
            eprintln!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
        OutputFormat::Text => {
            if !quiet {
                eprintln!("error: {}", message);
            }
        }
    }
}

/// Read, parse, and validate a model file; any failure is fatal.
fn load_model(path: &Path, output: OutputFormat, quiet: bool) -> Edam {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            report_error(
                &format!("reading '{}': {}", path.display(), e),
                output,
                quiet,
            );
            process::exit(1);
        }
    };

    let value: serde_json::Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            report_error(
                &format!("parsing JSON in '{}': {}", path.display(), e),
                output,
                quiet,
            );
            process::exit(1);
        }
    };

    let edam = match Edam::from_json(&value) {
        Ok(m) => m,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    if let Err(e) = edam.validate() {
        report_error(&e.to_string(), output, quiet);
        process::exit(1);
    }
    edam
}

fn cmd_generate(model_path: &Path, out: Option<&Path>, output: OutputFormat, quiet: bool) {
    let edam = load_model(model_path, output, quiet);

    let source = match edam_codegen::generate_contract(&edam) {
        Ok(s) => s,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    match out {
        Some(path) => {
            if let Err(e) = std::fs::write(path, &source) {
                report_error(
                    &format!("writing '{}': {}", path.display(), e),
                    output,
                    quiet,
                );
                process::exit(1);
            }
            if !quiet {
                match output {
                    OutputFormat::Text => println!("wrote {}", path.display()),
                    OutputFormat::Json => {
                        let json = serde_json::json!({
                            "contract": edam.name,
                            "path": path.display().to_string(),
                        });
                        println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
                    }
                }
            }
        }
        None => match output {
            OutputFormat::Text => println!("{}", source),
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "contract": edam.name,
                    "source": source,
                });
                println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
            }
        },
    }
}

fn cmd_verify(model_path: &Path, max_paths: usize, table: bool, output: OutputFormat, quiet: bool) {
    let edam = load_model(model_path, output, quiet);

    let report = edam_verify::check(&edam, &VerifyOptions { max_paths });

    match output {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).unwrap_or_default()
            );
        }
        OutputFormat::Text => {
            if !quiet {
                if table {
                    print!("{}", report.render_table());
                } else {
                    print!("{}", report.render_text());
                }
            }
        }
    }

    if !report.ok {
        process::exit(1);
    }
}
