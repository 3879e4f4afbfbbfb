use anyhow::Context;
use clap::{Parser, Subcommand};
use fdm_extractor::cli;
use fdm_extractor::config::Config;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fdm-extractor")]
#[command(about = "Consolidate FDM tax-assessment workbooks into one Results + Summary workbook")]
#[command(long_about = "FDM Extractor - consolidate FDM tax-assessment forms

Reads each FDM workbook (.xlsx / .xlsm), extracts the catalog fields from the
'Sheet Home', 'C.1', 'C.2', 'D' and 'FDM' sheets, and writes one workbook:

  Results  - one row per file; derived figures are live formulas
  Summary  - BIT / NDT scenario parameters and sector totals

A field that cannot be located is marked in the output; the file is still
included. A file that cannot be read is reported and skipped.

EXAMPLES:
  fdm-extractor extract forms/                     # every workbook in forms/
  fdm-extractor extract a.xlsx b.xlsm -o out/      # explicit files
  fdm-extractor extract forms/ --report run.json   # JSON batch report
  fdm-extractor catalog                            # list extracted fields")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract FDM workbooks and write the consolidated workbook
    Extract {
        /// Input workbooks or directories containing them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory for the output workbook
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// YAML configuration file
        #[arg(short, long, env = "FDM_EXTRACTOR_CONFIG")]
        config: Option<PathBuf>,

        /// Write a JSON batch report to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Show missing fields and debug logs
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the field catalog and the formula of every derived column
    Catalog {
        /// YAML configuration file
        #[arg(short, long, env = "FDM_EXTRACTOR_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Write the default configuration to a YAML file
    InitConfig {
        /// Destination path
        #[arg(default_value = "fdm-extractor.yaml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "fdm_extractor=debug"
    } else {
        "fdm_extractor=warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            inputs,
            output_dir,
            config,
            report,
            verbose,
        } => {
            init_tracing(verbose);
            let config = load_config(config.as_deref())?;
            cli::extract(inputs, output_dir, &config, report, verbose)?;
        }

        Commands::Catalog { config } => {
            init_tracing(false);
            let config = load_config(config.as_deref())?;
            cli::catalog(&config)?;
        }

        Commands::InitConfig { path, force } => {
            init_tracing(false);
            cli::init_config(path, force)?;
        }
    }

    Ok(())
}
