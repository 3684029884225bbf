//! Fuelprice CLI - Normalize and enrich weekly fuel price tables
//!
//! # Main Commands
//!
//! ```bash
//! fuelprice transform prices.csv             # Fuel transform, JSON to stdout
//! fuelprice transform prices.csv -f csv      # Same, as CSV
//! fuelprice clean data.csv --ops ops.json    # Run cleaning operations only
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! fuelprice parse prices.csv        # Just load the file to JSON records
//! fuelprice operations              # Show available cleaning operations
//! fuelprice example-config          # Show a default options file
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use fuelprice::logs::{self, LogLevel};
use fuelprice::{
    parse_file_auto, run_file, table_to_csv, CleanOp, PipelineOptions, PipelineOutput,
    PipelineResult, Table,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fuelprice")]
#[command(about = "Normalize and enrich weekly fuel price tables", long_about = None)]
struct Cli {
    /// Only print errors to stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: load → fuel transform → cleaning operations
    Transform {
        /// Input CSV or JSON file
        input: PathBuf,

        /// Pipeline options file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Cleaning operations file (JSON array), appended to the config's
        #[arg(long)]
        clean: Option<PathBuf>,

        /// Rolling average window, overrides the config
        #[arg(short, long)]
        window: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run cleaning operations without the fuel transform
    Clean {
        /// Input CSV or JSON file
        input: PathBuf,

        /// Cleaning operations file (JSON array)
        #[arg(long)]
        ops: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load a CSV or JSON file and output JSON records
    Parse {
        /// Input file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show available cleaning operations
    Operations,

    /// Show a default pipeline options file
    ExampleConfig,
}

fn main() {
    let cli = Cli::parse();

    logs::init(if cli.quiet { LogLevel::Error } else { LogLevel::Info });

    let result = match cli.command {
        Commands::Transform {
            input,
            config,
            clean,
            window,
            format,
            output,
        } => cmd_transform(
            &input,
            config.as_deref(),
            clean.as_deref(),
            window,
            format,
            output.as_deref(),
        ),

        Commands::Clean {
            input,
            ops,
            format,
            output,
        } => cmd_clean(&input, &ops, format, output.as_deref()),

        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Operations => cmd_operations(),

        Commands::ExampleConfig => cmd_example_config(),
    };

    if let Err(e) = result {
        logs::log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn cmd_transform(
    input: &Path,
    config: Option<&Path>,
    clean: Option<&Path>,
    window: Option<usize>,
    format: OutputFormat,
    output: Option<&Path>,
) -> PipelineResult<()> {
    let mut options = match config {
        Some(path) => PipelineOptions::from_file(path)?,
        None => PipelineOptions::default(),
    };
    if let Some(path) = clean {
        options.clean.extend(load_ops(path)?);
    }
    if let Some(window) = window {
        options.fuel.rolling_window = window;
        options.fuel.validate()?;
    }

    let result = run_file(input, &options)?;
    finish(&result, format, output)
}

fn cmd_clean(
    input: &Path,
    ops: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> PipelineResult<()> {
    let options = PipelineOptions {
        skip_fuel_transform: true,
        clean: load_ops(ops)?,
        ..PipelineOptions::default()
    };

    let result = run_file(input, &options)?;
    finish(&result, format, output)
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> PipelineResult<()> {
    logs::log_info(format!("Parsing: {}", input.display()));

    let result = parse_file_auto(input)?;
    logs::log_info_indent(format!("Encoding: {}", result.encoding), 1);
    if let Some(delimiter) = result.delimiter {
        logs::log_info_indent(
            format!("Delimiter: '{}'", fuelprice::transform::format_delimiter(delimiter)),
            1,
        );
    }
    logs::log_info_indent(format!("Columns: {}", result.headers.join(", ")), 1);
    logs::log_success(format!("Parsed {} records", result.records.len()));

    let json = serde_json::to_string_pretty(&result.records)?;
    write_output(&json, output)
}

fn cmd_operations() -> PipelineResult<()> {
    println!("{}", fuelprice::operations_description());
    Ok(())
}

fn cmd_example_config() -> PipelineResult<()> {
    let json = serde_json::to_string_pretty(&PipelineOptions::default())?;
    println!("{}", json);
    Ok(())
}

fn load_ops(path: &Path) -> PipelineResult<Vec<CleanOp>> {
    Ok(fuelprice::config::load_json(path)?)
}

fn finish(
    result: &PipelineOutput,
    format: OutputFormat,
    output: Option<&Path>,
) -> PipelineResult<()> {
    logs::log_success(result.summary());
    let content = render(&result.table, format)?;
    write_output(&content, output)
}

fn render(table: &Table, format: OutputFormat) -> PipelineResult<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&table.to_records())?,
        OutputFormat::Csv => table_to_csv(table, ',')?,
    })
}

fn write_output(content: &str, path: Option<&Path>) -> PipelineResult<()> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            logs::log_success(format!("Output written to: {}", p.display()));
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
