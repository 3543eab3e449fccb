use clap::Parser;
use tracing::error;

use finsight::api::{AppState, Cli, Command, run_command, run_http_server};
use finsight::core::AllocationSet;
use finsight::logging::init_tracing;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Command::Serve {
            host,
            port,
            allocations,
        } => {
            let allocations = match AllocationSet::new(allocations) {
                Ok(set) => set,
                Err(e) => {
                    eprintln!("Invalid --allocation values: {e}");
                    std::process::exit(1);
                }
            };
            if let Err(e) = run_http_server(host, port, AppState::new(allocations)).await {
                error!(error = %e, "server error");
                std::process::exit(1);
            }
        }
        command => match run_command(&command) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
    }
}
