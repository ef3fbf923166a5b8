use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "latchkey",
    about = "Latchkey — access-management backend composition",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose the deployment and emit the manifest as JSON.
    Synth {
        /// Path to the deploy config.
        #[arg(short, long, default_value = "latchkey.toml")]
        config: PathBuf,
        /// Write the manifest here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compose the deployment and report success or the first error.
    Validate {
        #[arg(short, long, default_value = "latchkey.toml")]
        config: PathBuf,
    },
    /// Print the aggregated deployment outputs.
    Outputs {
        #[arg(short, long, default_value = "latchkey.toml")]
        config: PathBuf,
        /// Output format: text or json.
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Scaffold a latchkey.toml in the given directory.
    Init {
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
        /// Deployment name.
        #[arg(long, default_value = "latchkey")]
        name: String,
        #[arg(long, default_value = "us-east-1")]
        region: String,
        #[arg(long, default_value = "111122223333")]
        account: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("latchkey=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Synth { config, output } => commands::synth::synth(&config, output.as_deref()),
        Commands::Validate { config } => commands::synth::validate(&config),
        Commands::Outputs { config, format } => commands::outputs::outputs(&config, &format),
        Commands::Init {
            path,
            name,
            region,
            account,
        } => commands::init::init(&path, &name, &region, &account),
    }
}
