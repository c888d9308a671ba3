//! tablepipe CLI - Apply transformation pipelines to CSV files
//!
//! # Main Commands
//!
//! ```bash
//! tablepipe serve                                  # Start HTTP server (port 5001)
//! tablepipe transform input.csv -p pipeline.json   # Run a pipeline locally
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! tablepipe parse input.csv        # Just parse CSV to JSON records
//! tablepipe operations             # Show built-in transformations
//! ```

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tablepipe::{execute, parse_file, PipelineConfig, TransformationRegistry};

const DEFAULT_PORT: u16 = 5001;

#[derive(Parser)]
#[command(name = "tablepipe")]
#[command(about = "Apply configurable transformation pipelines to CSV data", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CSV file and output its records as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a transformation pipeline over a CSV file
    Transform {
        /// Input CSV file
        input: PathBuf,

        /// Pipeline JSON file: {"steps": [{"type": ..., "config": {...}}]}
        #[arg(short, long)]
        pipeline: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show every built-in transformation with its config schema
    Operations,

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: PORT env var, else 5001)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tablepipe::logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Transform {
            input,
            pipeline,
            output,
        } => cmd_transform(&input, &pipeline, output.as_deref()),

        Commands::Operations => cmd_operations(),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let parsed = parse_file(input)?;

    eprintln!("   Encoding: {}", parsed.encoding);
    eprintln!(
        "   Delimiter: '{}' (auto-detected)",
        format_delimiter(parsed.delimiter)
    );
    eprintln!("   Columns: {}", parsed.table.columns().join(", "));
    eprintln!("✅ Parsed {} records", parsed.table.shape().0);

    let json = serde_json::to_string_pretty(&parsed.table.records())?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_transform(
    input: &Path,
    pipeline_path: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let raw = fs::read_to_string(pipeline_path)?;
    let config = PipelineConfig::from_json(&raw)?;

    let parsed = parse_file(input)?;
    eprintln!("   Encoding: {}", parsed.encoding);
    eprintln!("   Delimiter: '{}'", format_delimiter(parsed.delimiter));
    eprintln!("   Columns: {}", parsed.table.columns().join(", "));

    let registry = TransformationRegistry::with_defaults();
    let result = execute(&registry, &parsed.table, &config.steps)?;

    eprintln!(
        "\n⚙️  Shape: {:?} -> {:?}",
        result.original_shape, result.transformed_shape
    );

    let json = serde_json::to_string_pretty(&result)?;
    write_output(&json, output)?;

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_operations() -> Result<(), Box<dyn std::error::Error>> {
    let registry = TransformationRegistry::with_defaults();
    for descriptor in registry.list() {
        let state = if descriptor.enabled { "enabled" } else { "disabled" };
        println!("📄 {} ({})", descriptor.name, state);
        println!(
            "{}",
            serde_json::to_string_pretty(&descriptor.config_schema)?
        );
        println!();
    }
    Ok(())
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let port = match port {
        Some(port) => port,
        None => match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| format!("Invalid PORT '{}': {}", raw, e))?,
            Err(_) => DEFAULT_PORT,
        },
    };

    tablepipe::server::start_server(port).await?;
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
