//! dent-docs CLI - render prescriptions and invoices from JSON

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::info;
use serde::{Deserialize, Serialize};

use dent_docs::stock::{issue_bill, InMemoryStock, StockOutcome};
use dent_docs::{
    bill_from_json, prescription_from_json, render_bill, render_prescription, EngineConfig,
    Resources,
};

#[derive(Parser)]
#[command(name = "dent-docs")]
#[command(version)]
#[command(about = "Render dental prescriptions and invoices to PDF", long_about = None)]
struct Cli {
    /// Engine configuration (fonts, template, letterhead, binding)
    #[arg(long, global = true, value_name = "FILE", env = "DENT_DOCS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a prescription over the clinic template
    #[command(alias = "rx")]
    Prescription {
        /// Prescription request as JSON
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (named after the patient if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render an invoice
    Bill {
        /// Bill request as JSON
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (named after the patient and date if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Medicine stock as JSON, deducted before rendering and written back
        #[arg(long, value_name = "FILE")]
        stock: Option<PathBuf>,

        /// Accept stock shortfalls without asking
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Serialize, Deserialize)]
struct StockEntry {
    name: String,
    quantity: u32,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = load_resources(cli.config.as_deref()).and_then(|resources| match cli.command {
        Commands::Prescription { input, output } => {
            cmd_prescription(&input, output.as_deref(), resources)
        }
        Commands::Bill {
            input,
            output,
            stock,
            yes,
        } => cmd_bill(&input, output.as_deref(), stock.as_deref(), yes, resources),
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn load_resources(config: Option<&Path>) -> Result<&'static Resources, Box<dyn std::error::Error>> {
    let resources = match config {
        Some(path) => Resources::load(&EngineConfig::from_disk(path)?)?,
        None => Resources::builtin(),
    };
    Ok(Resources::install(resources))
}

fn cmd_prescription(
    input: &Path,
    output: Option<&Path>,
    resources: &Resources,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = prescription_from_json(&fs::read_to_string(input)?)?;
    let pdf = render_prescription(&request, resources)?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(request.suggested_filename()));
    fs::write(&output, pdf)?;
    println!("{}", output.display());
    Ok(())
}

fn cmd_bill(
    input: &Path,
    output: Option<&Path>,
    stock: Option<&Path>,
    yes: bool,
    resources: &Resources,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = bill_from_json(&fs::read_to_string(input)?)?;

    let pdf = match stock {
        Some(stock_path) => {
            let entries: Vec<StockEntry> = serde_json::from_str(&fs::read_to_string(stock_path)?)?;
            let mut ledger = entries
                .into_iter()
                .fold(InMemoryStock::new(), |ledger, entry| {
                    ledger.with_medicine(entry.name, entry.quantity)
                });

            let issued = issue_bill(&request, &mut ledger, resources, |short| yes || confirm(short))?;
            let Some(pdf) = issued else {
                println!("Invoice not generated");
                return Ok(());
            };

            let remaining: Vec<StockEntry> = ledger
                .medicines()
                .map(|(name, quantity)| StockEntry {
                    name: name.to_string(),
                    quantity,
                })
                .collect();
            fs::write(stock_path, serde_json::to_string_pretty(&remaining)?)?;
            info!("stock written back to {}", stock_path.display());
            pdf
        }
        None => render_bill(&request, resources)?,
    };

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(request.suggested_filename()));
    fs::write(&output, pdf)?;
    println!("{}", output.display());
    Ok(())
}

fn confirm(short: &[StockOutcome]) -> bool {
    eprintln!("Stock warnings:");
    for outcome in short {
        eprintln!("  {}: {}", outcome.name, outcome.message());
    }
    eprint!("Generate the invoice anyway? [y/N] ");
    let _ = io::stderr().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}
