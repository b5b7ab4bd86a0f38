use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use permshift::commands::{self, ApplyOutcome, ExecutionMode, OutputFormat, ShowFormat};
use permshift::config;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, default_value = "permshift.yaml", global = true)]
    config_file: String,

    /// Enable verbose output (info level)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress all non-essential output (error level only)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug output (debug level)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
struct ShowArgs {
    /// Only this table (`schema.table` or a bare name in the default schema)
    #[arg(long)]
    table: Option<String>,

    /// Only this role
    #[arg(long)]
    role: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: ShowFormat,

    #[command(flatten)]
    metadata_args: config::MetadataArgs,
}

#[derive(Parser, Debug)]
struct CompileArgs {
    /// Change request file
    request: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "summary")]
    format: OutputFormat,

    /// Write the migration to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    metadata_args: config::MetadataArgs,
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Change request file
    request: PathBuf,

    /// Show the migration without applying it
    #[arg(long, group = "mode")]
    dry_run: bool,

    /// Apply without a confirmation prompt
    #[arg(long, short = 'y', group = "mode")]
    yes: bool,

    #[command(flatten)]
    metadata_args: config::MetadataArgs,

    #[command(flatten)]
    migration_args: config::MigrationArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// List the permissions in the metadata snapshot
    Show(ShowArgs),
    /// Compile a change request into a migration without applying it
    Compile(CompileArgs),
    /// Compile a change request and apply it to the metadata snapshot
    Apply(ApplyArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    initialize_logging(&cli);

    run_main(cli).await
}

fn initialize_logging(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn" // default level
    };

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level)
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

async fn run_main(cli: Cli) -> Result<()> {
    let (file_config, root_dir) = config::load_config(&cli.config_file)?;

    match &cli.command {
        Commands::Show(args) => {
            let cli_config = config::ConfigInput {
                metadata: Some(args.metadata_args.clone().into()),
                migrations: None,
            };
            let config = config::ConfigBuilder::new()
                .with_file(file_config)
                .with_cli_args(cli_config)
                .resolve()?;

            commands::cmd_show(
                &config,
                &root_dir,
                args.table.as_deref(),
                args.role.as_deref(),
                args.format,
            )
        }
        Commands::Compile(args) => {
            let cli_config = config::ConfigInput {
                metadata: Some(args.metadata_args.clone().into()),
                migrations: None,
            };
            let config = config::ConfigBuilder::new()
                .with_file(file_config)
                .with_cli_args(cli_config)
                .resolve()?;

            info!("Compiling {}", args.request.display());
            commands::cmd_compile(
                &config,
                &root_dir,
                &args.request,
                args.format,
                args.output.as_deref(),
            )
        }
        Commands::Apply(args) => {
            let cli_config = config::ConfigInput {
                metadata: Some(args.metadata_args.clone().into()),
                migrations: Some(args.migration_args.clone().into()),
            };
            let config = config::ConfigBuilder::new()
                .with_file(file_config)
                .with_cli_args(cli_config)
                .resolve()?;

            use std::io::IsTerminal;

            let execution_mode = if args.dry_run {
                ExecutionMode::DryRun
            } else if args.yes {
                ExecutionMode::Force
            } else if std::io::stdin().is_terminal() {
                ExecutionMode::Interactive
            } else {
                ExecutionMode::RequireApproval
            };

            info!("Applying {}", args.request.display());
            match commands::cmd_apply(&config, &root_dir, &args.request, execution_mode).await? {
                ApplyOutcome::Cancelled => std::process::exit(2),
                _ => Ok(()),
            }
        }
    }
}
