//! `titanic.request`: persist the inbound message under a fresh UUID and
//! hand the UUID to the dispatcher.

use tokio::sync::mpsc;
use titanic_core::message::{status, Message, SHUTDOWN};
use titanic_core::uuid::new_uuid;
use titanic_core::BrokerWorker;

use super::REQUEST_SERVICE;
use crate::error::Result;
use crate::store::Store;

pub async fn run(endpoint: String, store: Store, uuid_tx: mpsc::Sender<String>) -> Result<()> {
    let mut worker = BrokerWorker::connect(&endpoint, REQUEST_SERVICE).await?;

    loop {
        let Some(msg) = worker.recv().await? else {
            break;
        };
        let Some(first) = msg.first() else {
            worker.send(Message::single(status::UNKNOWN)).await?;
            continue;
        };
        if Message::frame_is(first, SHUTDOWN) {
            break;
        }

        let uuid = new_uuid();
        store.ensure_dir().await?;
        let req_path = store.request_path(&uuid);

        match store.save_message(&req_path, &msg).await {
            Ok(()) => {
                let _ = uuid_tx.send(uuid.clone()).await;
                worker
                    .send(Message::from_strs([status::OK, uuid.as_str()]))
                    .await?;
            }
            Err(e) => {
                worker
                    .send(Message::from_strs([status::ERROR, &e.to_string()]))
                    .await?;
            }
        }
    }
    Ok(())
}
