//! The background loop that drains the queue: one new-UUID channel, one
//! 1-second scan tick, one delivery attempt per still-pending record.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use titanic_core::BrokerClient;

use crate::error::{Error, Result};
use crate::queue::Queue;
use crate::store::Store;

const TICK: Duration = Duration::from_secs(1);

pub struct Dispatcher {
    store: Store,
    queue: Queue,
    endpoint: String,
    uuid_rx: mpsc::Receiver<String>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(store: Store, queue: Queue, endpoint: String, uuid_rx: mpsc::Receiver<String>) -> Self {
        Self { store, queue, endpoint, uuid_rx }
    }

    /// Run until `shutdown` fires. Consumes `self`, since the loop owns
    /// every resource it touches for its whole lifetime.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let Self { store, queue, endpoint, mut uuid_rx } = self;

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                recv = timeout(TICK, uuid_rx.recv()) => {
                    if let Ok(Some(uuid)) = recv {
                        queue.append(&uuid).await?;
                    }
                    // a closed channel or an elapsed tick both just fall
                    // through to the scan below.
                }
            }

            queue
                .scan_pending(|uuid| service_success(&store, &endpoint, uuid))
                .await?;
        }
        Ok(())
    }
}

/// One delivery attempt for `uuid` (§4.6.1). Resolves `Ok(true)` if the
/// entry should be marked done: either a reply was persisted, or the
/// client already closed the request out from under us. Resolves
/// `Ok(false)` for transient failures worth retrying next tick. A
/// request file with no target-service frame can never be delivered, so
/// that case is an `Err` instead of an endless retry.
async fn service_success(store: &Store, endpoint: &str, uuid: String) -> Result<bool> {
    let req_path = store.request_path(&uuid);
    if !store.exists(&req_path).await {
        return Ok(true);
    }

    let Ok(mut msg) = store.load_message(&req_path).await else {
        return Ok(false);
    };
    let Some(service_frame) = msg.pop_front() else {
        return Err(Error::MissingServiceFrame);
    };
    let service = String::from_utf8_lossy(&service_frame).into_owned();

    let client = BrokerClient::new(endpoint);
    match client.mgmt_lookup(&service).await {
        Ok(true) => {}
        _ => return Ok(false),
    }

    match client.request(&service, msg).await {
        Ok(reply) => Ok(store
            .save_message(&store.reply_path(&uuid), &reply)
            .await
            .is_ok()),
        Err(_) => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use titanic_core::message::Message;
    use titanic_core::utils::testing::temp_dir;
    use test_log::test;

    #[test(tokio::test)]
    async fn missing_request_file_counts_as_delivered() {
        let store = Store::new(temp_dir());
        let delivered = service_success(&store, "tcp://127.0.0.1:1", "DEADBEEFDEADBEEFDEADBEEFDEADBEEF".into())
            .await
            .unwrap();
        assert!(delivered);
    }

    #[test(tokio::test)]
    async fn unreachable_broker_is_not_delivered() {
        let store = Store::new(temp_dir());
        store.ensure_dir().await.unwrap();
        let uuid = "DEADBEEFDEADBEEFDEADBEEFDEADBEEF";
        store
            .save_message(&store.request_path(uuid), &Message::from_strs(["echo", "hi"]))
            .await
            .unwrap();

        // port 1 is reserved and nothing listens there
        let delivered = service_success(&store, "tcp://127.0.0.1:1", uuid.to_string()).await.unwrap();
        assert!(!delivered);
        assert!(store.exists(&store.request_path(uuid)).await);
    }

    #[test(tokio::test)]
    async fn request_with_no_service_frame_is_rejected() {
        let store = Store::new(temp_dir());
        store.ensure_dir().await.unwrap();
        let uuid = "DEADBEEFDEADBEEFDEADBEEFDEADBEEF";
        store
            .save_message(&store.request_path(uuid), &Message::new())
            .await
            .unwrap();

        let result = service_success(&store, "tcp://127.0.0.1:1", uuid.to_string()).await;
        assert!(matches!(result, Err(Error::MissingServiceFrame)));
    }
}
