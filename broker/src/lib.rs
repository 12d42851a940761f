pub mod actor;
pub mod error;
pub mod registry;
pub mod session;

pub use error::Error;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Command channel capacity. The actor drains this continuously; a small
/// bound just keeps a burst of new connections from allocating unbounded
/// memory ahead of the actor catching up.
const COMMAND_CHANNEL_CAPACITY: usize = 256;

/// Accept connections on `listener` forever, handing each off to its own
/// task, all of them talking to one actor task that owns the registry.
///
/// Returns only if the listener itself fails; used directly by `main`
/// and by integration tests that bind an ephemeral port.
pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    tokio::spawn(actor::run(cmd_rx));

    loop {
        let (stream, peer) = listener.accept().await?;
        let cmd_tx = cmd_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = session::handle_connection(stream, cmd_tx).await {
                tracing::debug!(%peer, error = %e, "connection ended with an error");
            }
        });
    }
}
