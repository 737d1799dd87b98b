use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use iamtagger::config::{Config, CONFIG_FILE_NAME};
use iamtagger::error::TaggerError;
use iamtagger::output::{self, OutputFormat};
use iamtagger::report::ReportKind;
use iamtagger::{RunOptions, Tagger};

#[derive(Parser)]
#[command(
    name = "iam-tagger",
    about = "Tag cloud IAM permissions and score their risk",
    version,
    author
)]
struct Cli {
    /// Config file path
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Permission catalog JSON (overrides the configured path)
    #[arg(long, global = true, env = "IAM_TAGGER_CATALOG")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tag matrix for every permission
    All(TableArgs),

    /// Tag matrix for MUTATING or SIDE_EFFECT permissions
    Mutating(TableArgs),

    /// Write every known service with an UNDEFINED criticality
    #[command(name = "create_service_score_file", alias = "create-service-score-file")]
    CreateServiceScoreFile {
        /// Where to write the service list
        output_file: PathBuf,
    },

    /// Score every permission and write the result as CSV
    #[command(name = "score_all_permissions", alias = "score-all-permissions")]
    ScoreAllPermissions {
        /// `service,LEVEL` file (UNDEFINED, LOW, MEDIUM, HIGH)
        service_score_file: PathBuf,
        /// Where to write the scored CSV
        output_file: PathBuf,
    },

    /// Generate a starter .iam-tagger.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct TableArgs {
    /// Write CSV to this file instead of printing a table
    #[arg(long, value_name = "FILE", conflicts_with_all = ["format", "output"])]
    csv: Option<PathBuf>,

    /// Output format (console, csv, json)
    #[arg(long, short = 'f', default_value = "console")]
    format: String,

    /// Write output to file instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let options = RunOptions {
        config_path: cli.config,
        catalog_override: cli.catalog,
    };

    let result = match cli.command {
        Commands::All(args) => cmd_table(&options, ReportKind::All, args),
        Commands::Mutating(args) => cmd_table(&options, ReportKind::Mutating, args),
        Commands::CreateServiceScoreFile { output_file } => {
            cmd_create_service_score_file(&options, output_file)
        }
        Commands::ScoreAllPermissions {
            service_score_file,
            output_file,
        } => cmd_score_all_permissions(&options, service_score_file, output_file),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn cmd_table(options: &RunOptions, kind: ReportKind, args: TableArgs) -> Result<i32, TaggerError> {
    let (format, destination) = match args.csv {
        Some(path) => (OutputFormat::Csv, Some(path)),
        None => {
            let format = OutputFormat::from_str_lenient(&args.format).unwrap_or_else(|| {
                eprintln!("Warning: unknown format '{}', using console", args.format);
                OutputFormat::Console
            });
            (format, args.output)
        }
    };

    let tagger = Tagger::load(options)?;
    let report = tagger.report(kind)?;
    let rendered = iamtagger::render_report(&report, format)?;

    match destination {
        Some(path) => {
            output::write_to(&path, &rendered)?;
            println!("Wrote {} rows to {}", report.len(), path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(0)
}

fn cmd_create_service_score_file(
    options: &RunOptions,
    output_file: PathBuf,
) -> Result<i32, TaggerError> {
    let tagger = Tagger::load(options)?;
    tagger.create_service_score_file(&output_file)?;
    println!("Successfully wrote file: {}", output_file.display());
    Ok(0)
}

fn cmd_score_all_permissions(
    options: &RunOptions,
    service_score_file: PathBuf,
    output_file: PathBuf,
) -> Result<i32, TaggerError> {
    let tagger = Tagger::load(options)?;
    let report = tagger.scored_report(&service_score_file)?;
    let rendered = iamtagger::render_report(&report, OutputFormat::Csv)?;
    output::write_to(&output_file, &rendered)?;

    let unknown: usize = report.unscored_services.values().sum();
    eprintln!(
        "Scored {} permissions ({} UNKNOWN across {} unrated services)",
        report.len(),
        unknown,
        report.unscored_services.len()
    );
    println!("Successfully wrote file: {}", output_file.display());
    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, TaggerError> {
    let path = PathBuf::from(CONFIG_FILE_NAME);

    if path.exists() && !force {
        eprintln!("{} already exists. Use --force to overwrite.", CONFIG_FILE_NAME);
        return Ok(1);
    }

    output::write_to(&path, Config::starter_toml())?;
    println!("Created {}", CONFIG_FILE_NAME);

    Ok(0)
}
