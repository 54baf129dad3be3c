use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

mod driver;

use driver::{Driver, DriverError, ProofOutcome};

// ─── CLI argument parsing ───────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "fitch")]
#[command(about = "Checks Fitch-style natural deduction proofs in propositional logic")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every proof in a file
    Check {
        /// Path to the .fitch source file
        file: PathBuf,

        /// Emit a JSON report instead of human-readable output
        #[arg(long)]
        json: bool,
    },
}

// ─── Output types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct JsonProof {
    goal: String,
    lines: Vec<String>,
}

#[derive(Debug, Serialize)]
struct JsonReport {
    proofs: Vec<JsonProof>,
    error: Option<String>,
}

// ─── Check command ──────────────────────────────────────────────────────────

fn cmd_check(file: &PathBuf, json: bool) -> ExitCode {
    let mut driver = Driver::new();
    let result = driver.check_file(file);
    let succeeded = result.is_ok();

    if json {
        print_json_report(result);
    } else {
        match result {
            Ok(outcomes) => print_human_report(&outcomes),
            Err(e) => eprintln!("{}", e),
        }
    }

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_human_report(outcomes: &[ProofOutcome]) {
    for (index, outcome) in outcomes.iter().enumerate() {
        if index > 0 {
            println!();
        }
        println!("Proof of {} successful", outcome.goal.render());
        for line in &outcome.lines {
            println!("{}", line);
        }
    }
}

fn print_json_report(result: Result<Vec<ProofOutcome>, DriverError>) {
    let report = match result {
        Ok(outcomes) => JsonReport {
            proofs: outcomes
                .into_iter()
                .map(|outcome| JsonProof {
                    goal: outcome.goal.render(),
                    lines: outcome.lines,
                })
                .collect(),
            error: None,
        },
        Err(e) => JsonReport {
            proofs: Vec::new(),
            error: Some(e.to_string()),
        },
    };
    match serde_json::to_string_pretty(&report) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("failed to serialize report: {}", e),
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Commands::Check { file, json } => cmd_check(&file, json),
    }
}
