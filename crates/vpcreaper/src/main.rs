mod commands;
mod logging;
mod settings;

use clap::{Parser, Subcommand};
use logging::LogTarget;

#[derive(Parser)]
#[command(name = "vpc-reaper")]
#[command(about = "Tear down an AWS VPC and everything inside it", long_about = None)]
struct Cli {
    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Where log lines go
    #[arg(long, global = true, value_enum, default_value_t = LogTarget::Stderr)]
    log_target: LogTarget,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete a VPC and every resource in it
    Delete {
        /// Id of the VPC to tear down
        vpc_id: String,
        /// Describe everything, change nothing
        #[arg(long)]
        dry_run: bool,
        /// Also release elastic addresses bound to the VPC's interfaces
        #[arg(long)]
        release_addresses: bool,
        /// AWS region (overrides the settings file)
        #[arg(long, env = "AWS_REGION")]
        region: Option<String>,
        /// Print the teardown report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the teardown steps in execution order
    Plan {
        /// Include the address release step
        #[arg(long)]
        release_addresses: bool,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_target)?;

    match cli.command {
        Commands::Delete {
            vpc_id,
            dry_run,
            release_addresses,
            region,
            json,
        } => {
            commands::delete::handle(commands::delete::DeleteArgs {
                vpc_id,
                dry_run,
                release_addresses,
                region,
                json,
            })
            .await?;
        }
        Commands::Plan { release_addresses } => {
            commands::plan::handle(release_addresses)?;
        }
        Commands::Version => {
            println!("vpc-reaper {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
