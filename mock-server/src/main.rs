use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let app_key = std::env::var("JMESSAGE_APP_KEY").unwrap_or_else(|_| "test-app-key".to_string());
    let master_secret =
        std::env::var("JMESSAGE_MASTER_SECRET").unwrap_or_else(|_| "test-master-secret".to_string());

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, %app_key, "mock user API listening");
    mock_server::run(listener, &app_key, &master_secret).await
}
