//! `fiora test-connection` — verify CUA credentials with a create/destroy
//! round trip.

use fiora_core::cua::CuaClient;
use fiora_core::AppConfig;

pub async fn run() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fiora_core=info".into()),
        )
        .init();

    let config = AppConfig::from_env();
    if config.cua.api_key.is_empty() {
        return Err("CUA_API_KEY not configured".to_string());
    }

    let client = CuaClient::new(&config.cua);
    println!("Connecting to {}...", config.cua.base_url);

    let agent_id = client
        .create_agent()
        .await
        .map_err(|e| format!("CUA connection failed: {}", e))?;

    if let Err(e) = client.destroy_agent(&agent_id).await {
        eprintln!("Warning: test agent destroy failed: {}", e);
    }

    println!("CUA connection successful (agent {})", agent_id);
    Ok(())
}
