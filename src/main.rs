//! ktf CLI - Kubernetes testing framework cluster toolkit

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ktf")]
#[command(author, version, about = "Kubernetes testing framework cluster toolkit", long_about = None)]
struct Cli {
    /// Verbose output (can be used multiple times: -v, -vv, -vvv)
    /// -v: INFO, -vv: DEBUG, -vvv: TRACE
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the target cluster
    Cluster {
        #[command(subcommand)]
        command: ClusterCommands,
    },

    /// Collect cluster diagnostics
    Diagnostics {
        #[command(subcommand)]
        command: DiagnosticsCommands,
    },

    /// Check cluster connectivity
    Check {
        /// Path to kubeconfig file
        #[arg(short, long, env = "KUBECONFIG")]
        kubeconfig: Option<String>,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum ClusterCommands {
    /// Show cluster name, type, server version and node count
    Info {
        /// Path to kubeconfig file
        #[arg(short, long, env = "KUBECONFIG")]
        kubeconfig: Option<String>,
    },

    /// Print the server's semantic version
    Version {
        /// Path to kubeconfig file
        #[arg(short, long, env = "KUBECONFIG")]
        kubeconfig: Option<String>,
    },
}

#[derive(Subcommand)]
enum DiagnosticsCommands {
    /// Dump diagnostics to a fresh directory and print its path
    Dump {
        /// Identification string written to meta.txt
        #[arg(short, long, default_value = "manual")]
        meta: String,

        /// Path to kubeconfig file
        #[arg(short, long, env = "KUBECONFIG")]
        kubeconfig: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity level
    let log_level = match cli.verbose {
        0 => "warn",  // Default: only warnings and errors
        1 => "info",  // -v: info level
        2 => "debug", // -vv: debug level
        _ => "trace", // -vvv: trace level
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Cluster { command } => handle_cluster_command(command).await,
        Commands::Diagnostics { command } => handle_diagnostics_command(command).await,
        Commands::Check { kubeconfig } => {
            ktf::commands::check::check(kubeconfig.map(PathBuf::from)).await
        }
        Commands::Completion { shell } => handle_completion_command(shell),
        Commands::Version => handle_version_command(),
    }
}

async fn handle_cluster_command(command: ClusterCommands) -> Result<()> {
    match command {
        ClusterCommands::Info { kubeconfig } => {
            ktf::commands::cluster::info(kubeconfig.map(PathBuf::from)).await
        }
        ClusterCommands::Version { kubeconfig } => {
            ktf::commands::cluster::version(kubeconfig.map(PathBuf::from)).await
        }
    }
}

async fn handle_diagnostics_command(command: DiagnosticsCommands) -> Result<()> {
    match command {
        DiagnosticsCommands::Dump { meta, kubeconfig } => {
            ktf::commands::diagnostics::dump(meta, kubeconfig.map(PathBuf::from)).await
        }
    }
}

fn handle_completion_command(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "ktf", &mut io::stdout());
    Ok(())
}

fn handle_version_command() -> Result<()> {
    println!("ktf {}", env!("CARGO_PKG_VERSION"));
    println!("Kubernetes testing framework cluster toolkit");
    Ok(())
}
