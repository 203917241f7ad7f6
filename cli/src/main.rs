use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use modelpack_spec_gen::check::check;
use modelpack_spec_gen::registry::spec_document;
use modelpack_spec_gen::writer::pretty_json;
use modelpack_spec_gen::{Category, GeneratorConfig, pipeline};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_CONFIG: &str = "spec-gen.yml";

/// CLI-specific category enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliCategory {
    Envs,
    Ops,
    Variants,
}

impl From<CliCategory> for Category {
    fn from(category: CliCategory) -> Self {
        match category {
            CliCategory::Envs => Self::Envs,
            CliCategory::Ops => Self::Ops,
            CliCategory::Variants => Self::Variants,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "spec-gen")]
#[command(about = "Generate and distribute model package spec schemas")]
#[command(version)]
struct Cli {
    /// Log every written file.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write schema files, the embedded module and the propagated definitions.
    Generate(ConfigArgs),
    /// Report artifacts that differ from what `generate` would write.
    Check(ConfigArgs),
    /// Print the combined document, or one registered schema, to stdout.
    Print(PrintArgs),
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// Path to the generator config.
    #[arg(long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,
}

#[derive(Debug, Args)]
struct PrintArgs {
    /// Registration category of the schema to print.
    #[arg(long, requires = "key")]
    category: Option<CliCategory>,
    /// Registration key of the schema to print (e.g. ONNX_v1).
    #[arg(long, requires = "category")]
    key: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Check(args) => run_check(args),
        Command::Print(args) => run_print(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Logs to stderr; `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: &Path) -> Result<GeneratorConfig, String> {
    GeneratorConfig::load(path)
        .map_err(|err| format!("failed to load config '{}': {err}", path.display()))
}

fn run_generate(args: ConfigArgs) -> Result<(), String> {
    let config = load_config(&args.config)?;
    let report = pipeline::run(&config).map_err(|err| err.to_string())?;

    println!(
        "Generated spec {}: {} schema files ({} pruned), module {}, {} definitions propagated ({} copied, {} skipped)",
        report.version,
        report.schema_files.written.len(),
        report.schema_files.pruned.len(),
        report.module.display(),
        report.propagation.with_banner,
        report.propagation.copied,
        report.propagation.skipped,
    );
    Ok(())
}

fn run_check(args: ConfigArgs) -> Result<(), String> {
    let config = load_config(&args.config)?;
    let report = check(&config).map_err(|err| err.to_string())?;

    if report.is_clean() {
        println!("All {} artifacts up to date", report.checked);
        return Ok(());
    }

    for drift in &report.drifts {
        match &drift.actual_sha256 {
            None => println!("missing  {}", drift.path.display()),
            Some(actual) => println!(
                "changed  {} (expected {}, found {})",
                drift.path.display(),
                short(&drift.expected_sha256),
                short(actual),
            ),
        }
    }
    Err(format!(
        "{} of {} artifacts out of date; run `spec-gen generate`",
        report.drifts.len(),
        report.checked
    ))
}

fn run_print(args: PrintArgs) -> Result<(), String> {
    let doc = spec_document().map_err(|err| err.to_string())?;

    let rendered = match (args.category, args.key) {
        (Some(category), Some(key)) => {
            let category = Category::from(category);
            let schema = doc
                .get(category, &key)
                .ok_or_else(|| format!("no {category} registration named '{key}'"))?;
            pretty_json(schema)
        }
        _ => pretty_json(&doc),
    }
    .map_err(|err| err.to_string())?;

    println!("{rendered}");
    Ok(())
}

fn short(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}
