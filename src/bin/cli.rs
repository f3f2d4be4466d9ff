//! Command-line interface for the SBML exporter
//!
//! This binary exports model trees stored as JSON to SBML files and checks
//! them without writing anything.
//!
//! # Usage
//!
//! ```bash
//! # Export the model below /kinetics to out/kinetics.xml
//! chemsbml export --input model.json --path /kinetics --output out/kinetics.xml
//!
//! # Translate and validate, printing every diagnostic and validation result
//! chemsbml check --input model.json --path /kinetics
//! ```

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use chemsbml::prelude::*;
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::LevelFilter;

/// Main CLI configuration struct
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log per-entity details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Export a model to an SBML file
    Export {
        /// Path to the JSON file holding the model tree
        #[arg(short, long)]
        input: PathBuf,

        /// Path of the model root inside the tree
        #[arg(short, long, default_value = "/model")]
        path: String,

        /// Output file; its name up to the first '.' becomes the model id
        #[arg(short, long)]
        output: PathBuf,

        /// Width of the box stored coordinates are rescaled into
        #[arg(long, default_value_t = 1000.0)]
        scene_width: f64,

        /// Height of the box stored coordinates are rescaled into
        #[arg(long, default_value_t = 800.0)]
        scene_height: f64,
    },
    /// Translate and validate a model without writing it
    Check {
        /// Path to the JSON file holding the model tree
        #[arg(short, long)]
        input: PathBuf,

        /// Path of the model root inside the tree
        #[arg(short, long, default_value = "/model")]
        path: String,
    },
}

/// Main entry point for the CLI application
pub fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .parse_default_env()
        .init();

    let result = match &cli.command {
        Commands::Export {
            input,
            path,
            output,
            scene_width,
            scene_height,
        } => export(input, path, output, *scene_width, *scene_height),
        Commands::Check { input, path } => check(input, path),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{} {}", "Error:".bold().red(), message);
            ExitCode::FAILURE
        }
    }
}

fn export(
    input: &Path,
    path: &str,
    output: &Path,
    scene_width: f64,
    scene_height: f64,
) -> Result<(), String> {
    let tree = load_model(input).map_err(|e| e.to_string())?;
    let options = ExportOptionsBuilder::default()
        .scene_width(scene_width)
        .scene_height(scene_height)
        .build()
        .map_err(|e| e.to_string())?;

    match write_sbml(&tree, path, output, &options) {
        Ok(outcome) => {
            print_diagnostics(&outcome.diagnostics);
            println!(
                "{} {}",
                "Written".bold().green(),
                outcome.path.display()
            );
            Ok(())
        }
        Err(SBMLError::ValidationFailed(report)) => {
            for result in report.errors.iter() {
                println!("{result}");
            }
            Err(format!(
                "document failed validation with {} error(s)",
                report.error_count()
            ))
        }
        Err(error) => Err(error.to_string()),
    }
}

fn check(input: &Path, path: &str) -> Result<(), String> {
    let tree = load_model(input).map_err(|e| e.to_string())?;
    let model_id = path
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("model");
    let translation =
        to_sbml(&tree, path, model_id, &ExportOptions::default()).map_err(|e| e.to_string())?;
    print_diagnostics(&translation.diagnostics);

    let report = translation.validate().map_err(|e| e.to_string())?;
    for result in report.errors.iter() {
        println!("{result}");
    }

    if report.is_valid {
        println!("{}", "Document is consistent".bold().green());
        Ok(())
    } else {
        Err(format!(
            "document failed validation with {} error(s)",
            report.error_count()
        ))
    }
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let severity = match diagnostic.severity {
            DiagnosticSeverity::Skipped => "Skipped".bold().yellow(),
            DiagnosticSeverity::Advisory => "Advisory".bold().blue(),
        };
        println!(
            "[{}] {}:\n\t└── {}",
            diagnostic.entity.bold(),
            severity,
            diagnostic.message
        );
    }
}
