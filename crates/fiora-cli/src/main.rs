//! Fiora CLI — SAP Fiori automation backend.
//!
//! `fiora server` starts the HTTP backend; `fiora test-connection`
//! verifies the CUA credentials without starting a server. Running with
//! no subcommand starts the server with defaults.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "fiora",
    version,
    about = "Fiora — SAP Fiori automation backend"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Fiora HTTP backend server
    Server {
        /// Host to bind to
        #[arg(long, env = "FIORA_HOST", default_value = "0.0.0.0")]
        host: String,
        /// Port to listen on
        #[arg(long, env = "FIORA_PORT", default_value_t = 8000)]
        port: u16,
    },

    /// Test connectivity to the CUA cloud service
    TestConnection,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Server { host, port }) => commands::server::run(host, port).await,
        Some(Commands::TestConnection) => commands::test_connection::run().await,
        None => commands::server::run("0.0.0.0".to_string(), 8000).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
