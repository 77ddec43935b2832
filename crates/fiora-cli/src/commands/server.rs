//! `fiora server` — Start the Fiora HTTP backend server.

pub async fn run(host: String, port: u16) -> Result<(), String> {
    let config = fiora_server::ServerConfig {
        host: host.clone(),
        port,
    };

    println!("Starting Fiora server on {}:{}...", host, port);

    let addr = fiora_server::start_server(config).await?;
    println!("Fiora server listening on http://{}", addr);

    // Keep the process running until interrupted
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for Ctrl+C: {}", e))?;

    println!("\nShutting down...");
    Ok(())
}
