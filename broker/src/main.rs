use titanic_broker::serve;
use titanic_core::config::AppConfig;
use titanic_core::endpoint::strip_scheme;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load();
    config.init_tracing();

    tracing::info!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let addr = strip_scheme(&config.endpoint);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "broker listening");

    serve(listener).await?;
    Ok(())
}
