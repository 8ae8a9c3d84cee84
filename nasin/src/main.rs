use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use nasin::{Config, Emit, Format};
use nasin_source::Source;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nasin")]
#[command(about = "Parse and lower nasin source files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log pipeline events at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the AST or IR of a file
    Show {
        target: ShowTarget,
        file: PathBuf,
        /// Print JSON instead of source-like text
        #[arg(long)]
        json: bool,
        /// Module name, defaults to the file stem
        #[arg(long)]
        name: Option<String>,
    },
    /// Parse and lower a file without printing anything
    Check {
        file: PathBuf,
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ShowTarget {
    Ast,
    Ir,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            eprintln!("{}: {:#}", style("error").red().bold(), err);
            process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the file failed to compile. The diagnostic is already printed.
fn run(command: Commands) -> Result<bool> {
    let (file, config) = match command {
        Commands::Show {
            target,
            file,
            json,
            name,
        } => {
            let config = Config {
                emit: match target {
                    ShowTarget::Ast => Emit::Ast,
                    ShowTarget::Ir => Emit::Ir,
                },
                format: if json { Format::Json } else { Format::Text },
                module_name: name,
            };
            (file, config)
        }
        Commands::Check { file, name } => {
            let config = Config {
                emit: Emit::None,
                format: Format::Text,
                module_name: name,
            };
            (file, config)
        }
    };

    let content = fs::read_to_string(&file)
        .with_context(|| format!("could not read `{}`", file.display()))?;
    let source = Source::named(module_name(&file), file.display(), &content);
    debug!(path = %source.path, stem = %source.name, "read source");

    let artifacts = match nasin::compile(&source, &config) {
        Ok(artifacts) => artifacts,
        Err(err) => {
            eprintln!("{}", source.report(&err));
            return Ok(false);
        }
    };
    if let Some(output) = nasin::render(&artifacts, &config).context("could not serialize output")? {
        println!("{}", output);
    }
    Ok(true)
}

fn module_name(file: &Path) -> String {
    file.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "main".to_string())
}
