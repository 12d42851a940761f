use tokio::sync::{mpsc, watch};
use titanic_core::config::AppConfig;

const UUID_CHANNEL_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load();
    config.init_tracing();

    tracing::info!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let store = titanic::Store::new(&config.dir);
    store.ensure_dir().await?;
    let queue = titanic::Queue::new(store.queue_path());

    let (uuid_tx, uuid_rx) = mpsc::channel(UUID_CHANNEL_CAPACITY);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let request_task = tokio::spawn(titanic::endpoints::request::run(
        config.endpoint.clone(),
        store.clone(),
        uuid_tx,
    ));
    let reply_task = tokio::spawn(titanic::endpoints::reply::run(
        config.endpoint.clone(),
        store.clone(),
    ));
    let close_task = tokio::spawn(titanic::endpoints::close::run(
        config.endpoint.clone(),
        store.clone(),
    ));
    let dispatcher = titanic::Dispatcher::new(store, queue, config.endpoint.clone(), uuid_rx);
    let dispatcher_task = tokio::spawn(dispatcher.run(shutdown_rx));

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received, notifying endpoints");

    let _ = shutdown_tx.send(true);
    titanic::shutdown::notify_endpoints(&config.endpoint).await;

    let (request_res, reply_res, close_res, dispatcher_res) =
        tokio::join!(request_task, reply_task, close_task, dispatcher_task);
    request_res??;
    reply_res??;
    close_res??;
    dispatcher_res??;

    tracing::info!("shutdown complete");
    Ok(())
}
