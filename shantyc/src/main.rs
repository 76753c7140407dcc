use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use shanty_typeck::{type_check, DiagnosticBag, RenderConfig, ResolvedUnit, TypeRegistry};
use std::collections::BTreeMap;
use std::fs;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shantyc")]
#[command(about = "Type check a resolved Shanty compilation unit", long_about = None)]
#[command(version)]
struct Cli {
    /// Resolved unit (program plus symbol table) as JSON
    unit: PathBuf,

    /// Source text the unit was parsed from, for excerpts in diagnostics
    #[arg(long)]
    source: Option<PathBuf>,

    /// When to color diagnostics
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Source lines shown around each labelled line
    #[arg(long, default_value_t = 1)]
    context_lines: usize,

    /// Write the node type table as JSON to this file when checking passes
    #[arg(long, value_name = "FILE")]
    emit_types: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn enabled(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal(),
        }
    }
}

fn setup_logger() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("shanty_typeck=warn,shantyc=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    setup_logger();
    let cli = Cli::parse();
    let colors = cli.color.enabled();
    colored::control::set_override(colors);

    match run(&cli, colors) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

/// Checks the unit named on the command line. `Ok(false)` means the program
/// is ill-typed; `Err` means it could not be checked at all.
fn run(cli: &Cli, colors: bool) -> Result<bool> {
    let input = fs::read_to_string(&cli.unit)
        .with_context(|| format!("failed to read {}", cli.unit.display()))?;
    let source = cli
        .source
        .as_ref()
        .map(|path| fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display())))
        .transpose()?;
    let unit = ResolvedUnit::from_json(&input)
        .with_context(|| format!("{} is not a resolved unit", cli.unit.display()))?;

    info!(unit = %cli.unit.display(), symbols = unit.symbols.len(), "checking");
    let mut registry = TypeRegistry::new();
    let (program, symbols) = unit.resolve(&mut registry);
    let analysis = type_check(&program, &symbols, &mut registry)?;

    let filename = cli.source.as_ref().unwrap_or(&cli.unit).display().to_string();
    let bag: DiagnosticBag = analysis
        .diagnostics()
        .iter()
        .map(|d| d.to_diagnostic().with_filename(filename.clone()))
        .collect();
    let config = RenderConfig {
        colors,
        context_lines: cli.context_lines,
        ..RenderConfig::default()
    };
    eprint!("{}", bag.render(source.as_deref(), config));

    if !analysis.passed() {
        return Ok(false);
    }
    if let Some(path) = &cli.emit_types {
        let types: BTreeMap<u32, String> = analysis
            .table()
            .iter()
            .map(|(node, ty)| (node.0, registry.display(ty).to_string()))
            .collect();
        fs::write(path, serde_json::to_string_pretty(&types)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), nodes = types.len(), "wrote type table");
    }
    Ok(true)
}
