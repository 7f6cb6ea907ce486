use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use opmatrix_core::{oracle, MatrixConfig, OperatorMatrix};
use opmatrix_emit::{EmitterConfig, OutputFormat};
use std::path::{Path, PathBuf};
use std::time::Instant;

mod logging;
mod replay;

use logging::{init_logging, LogFormat, LogLevel};

#[derive(Parser)]
#[command(name = "opmatrix")]
#[command(about = "Generate and check operator matrices for fixed-width integer types")]
#[command(version = "0.1.0")]
#[command(author = "Gianluca Brigandi <gbrigand@gmail.com>")]
struct Cli {
    #[arg(long, value_enum, global = true, default_value = "warn")]
    log_level: LogLevel,

    #[arg(long, value_enum, global = true, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the native functions, registration script and regression scenarios.
    Generate {
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Emitter settings as JSON.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Operator classes to enumerate, as JSON.
        #[arg(long)]
        matrix_config: Option<PathBuf>,

        /// Append the expected outcome to every scenario line.
        #[arg(long)]
        annotate: bool,

        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the definitions of the matrix.
    List {
        #[arg(long, value_enum, default_value = "text")]
        format: ListFormat,

        #[arg(long)]
        operator: Option<String>,

        #[arg(long = "type")]
        type_name: Option<String>,

        #[arg(long)]
        matrix_config: Option<PathBuf>,
    },

    /// Check that registration scripts declare every operator consistently.
    Validate {
        input: PathBuf,

        #[arg(long)]
        matrix_config: Option<PathBuf>,

        #[arg(short, long)]
        verbose: bool,
    },

    /// Replay a scenario script through the evaluator.
    Check {
        script: PathBuf,

        #[arg(long)]
        matrix_config: Option<PathBuf>,

        #[arg(short, long)]
        verbose: bool,
    },

    /// Compare every definition with exact arithmetic over boundary operands.
    Verify {
        #[arg(long)]
        matrix_config: Option<PathBuf>,

        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ListFormat {
    Text,
    Markdown,
    Json,
}

impl From<ListFormat> for OutputFormat {
    fn from(format: ListFormat) -> Self {
        match format {
            ListFormat::Text => OutputFormat::Text,
            ListFormat::Markdown => OutputFormat::Markdown,
            ListFormat::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.log_format);

    match cli.command {
        Commands::Generate {
            output,
            config,
            matrix_config,
            annotate,
            verbose,
        } => cmd_generate(output, config, matrix_config, annotate, verbose),
        Commands::List {
            format,
            operator,
            type_name,
            matrix_config,
        } => cmd_list(format, operator, type_name, matrix_config),
        Commands::Validate {
            input,
            matrix_config,
            verbose,
        } => cmd_validate(input, matrix_config, verbose),
        Commands::Check {
            script,
            matrix_config,
            verbose,
        } => cmd_check(script, matrix_config, verbose),
        Commands::Verify {
            matrix_config,
            verbose,
        } => cmd_verify(matrix_config, verbose),
    }
}

fn load_matrix(path: Option<&Path>) -> Result<OperatorMatrix> {
    let config = match path {
        Some(path) => MatrixConfig::from_file(path)
            .with_context(|| format!("failed to load matrix config {}", path.display()))?,
        None => MatrixConfig::default(),
    };
    Ok(OperatorMatrix::with_config(config))
}

fn cmd_generate(
    output: PathBuf,
    config: Option<PathBuf>,
    matrix_config: Option<PathBuf>,
    annotate: bool,
    verbose: bool,
) -> Result<()> {
    let mut emitter_config = match &config {
        Some(path) => EmitterConfig::from_file(path)?,
        None => EmitterConfig::default(),
    };
    if annotate {
        emitter_config.annotate_expected = true;
    }
    let matrix = load_matrix(matrix_config.as_deref())?;

    if verbose {
        println!("{}", " opmatrix generate".bright_blue().bold());
        println!("{}", "=".repeat(50).bright_blue());
        println!(" Output: {}", output.display());
        println!(" Module: {}", emitter_config.module_name);
        if emitter_config.annotate_expected {
            println!(" Scenarios: annotated");
        }
        println!();
    }

    let start = Instant::now();
    let artifacts = opmatrix_emit::generate(&matrix, &emitter_config)?;
    let manifest = artifacts.write_to(&output)?;

    println!(
        " {} Generated {} operators",
        "SUCCESS:".bright_green().bold(),
        manifest.definitions
    );
    if verbose {
        for entry in &manifest.artifacts {
            println!(
                "   {} ({} bytes, sha256 {})",
                entry.path, entry.bytes, entry.sha256
            );
        }
        println!("   Time: {:.3}s", start.elapsed().as_secs_f64());
    }
    Ok(())
}

fn cmd_list(
    format: ListFormat,
    operator: Option<String>,
    type_name: Option<String>,
    matrix_config: Option<PathBuf>,
) -> Result<()> {
    let matrix = load_matrix(matrix_config.as_deref())?;
    let operator = operator
        .map(|symbol| symbol.parse::<opmatrix_core::Operator>())
        .transpose()?;
    let ty = type_name
        .map(|name| name.parse::<opmatrix_core::IntegerType>())
        .transpose()?;

    let definitions: Vec<_> = matrix
        .definitions()?
        .into_iter()
        .filter(|def| operator.map_or(true, |op| def.operator == op))
        .filter(|def| ty.map_or(true, |ty| def.argument_types().contains(&ty)))
        .collect();

    let formatter = OutputFormat::from(format).formatter();
    print!("{}", formatter.format_definitions(&definitions)?);
    Ok(())
}

fn cmd_validate(input: PathBuf, matrix_config: Option<PathBuf>, verbose: bool) -> Result<()> {
    let table = load_matrix(matrix_config.as_deref())?.table()?;
    let scripts = opmatrix_parser::find_scripts(&input);
    if scripts.is_empty() {
        anyhow::bail!("no .sql scripts found under {}", input.display());
    }

    if verbose {
        println!("{}", " Validating registration".bright_cyan().bold());
        println!("{}", "=".repeat(50).bright_cyan());
    }

    let mut failed = false;
    for script in &scripts {
        let statements = opmatrix_parser::parse_script_file(script)
            .with_context(|| format!("failed to parse {}", script.display()))?;
        let report = replay::validate_registration(&statements, &table);
        if report.operators == 0 && report.functions == 0 {
            if verbose {
                println!(" {} {}", "SKIP".yellow(), script.display());
            }
            continue;
        }

        if report.issues.is_empty() {
            println!(
                " {} {} ({} functions, {} operators)",
                "VALID".bright_green().bold(),
                script.display(),
                report.functions,
                report.operators
            );
        } else {
            failed = true;
            println!(" {} {}", "INVALID".bright_red().bold(), script.display());
            for issue in &report.issues {
                println!("   line {}: {}", issue.line, issue.message);
            }
        }
    }

    if failed {
        anyhow::bail!("Validation failed");
    }
    Ok(())
}

fn cmd_check(script: PathBuf, matrix_config: Option<PathBuf>, verbose: bool) -> Result<()> {
    let table = load_matrix(matrix_config.as_deref())?.table()?;
    let statements = opmatrix_parser::parse_script_file(&script)
        .with_context(|| format!("failed to parse {}", script.display()))?;
    let report = replay::replay(&statements, &table);

    if verbose {
        println!(" Script: {}", script.display());
        println!(" Probes: {}", report.probes);
        println!(" Annotated: {}", report.compared);
    }

    if report.failures.is_empty() {
        println!(
            " {} {} of {} probes match",
            "PASS".bright_green().bold(),
            report.compared,
            report.probes
        );
        return Ok(());
    }

    println!("{}", " FAIL".bright_red().bold());
    for failure in &report.failures {
        println!("   line {}: {}", failure.line, failure.message);
    }
    anyhow::bail!("{} probe(s) failed", report.failures.len())
}

fn cmd_verify(matrix_config: Option<PathBuf>, verbose: bool) -> Result<()> {
    let definitions = load_matrix(matrix_config.as_deref())?.definitions()?;

    let mut mismatches = 0;
    for def in &definitions {
        let found = oracle::verify(def);
        if verbose || !found.is_empty() {
            let status = if found.is_empty() {
                "ok".green()
            } else {
                "MISMATCH".bright_red().bold()
            };
            println!(" {} {}", status, def);
        }
        for mismatch in found.iter().take(5) {
            let operands = match mismatch.left {
                Some(left) => format!("{} {} {}", left, def.operator, mismatch.right),
                None => format!("{} {}", def.operator, mismatch.right),
            };
            println!(
                "   {}: evaluated {}, exact {}",
                operands, mismatch.evaluated, mismatch.expected
            );
        }
        mismatches += found.len();
    }

    if mismatches > 0 {
        anyhow::bail!("{} mismatch(es) against exact arithmetic", mismatches);
    }
    println!(
        " {} {} definitions agree with exact arithmetic",
        "SUCCESS:".bright_green().bold(),
        definitions.len()
    );
    Ok(())
}
