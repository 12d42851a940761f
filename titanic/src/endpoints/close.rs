//! `titanic.close`: delete a UUID's request and reply files. Safe to call
//! any number of times on the same UUID.

use titanic_core::message::{status, Message, SHUTDOWN};
use titanic_core::BrokerWorker;

use super::CLOSE_SERVICE;
use crate::error::Result;
use crate::store::Store;

pub async fn run(endpoint: String, store: Store) -> Result<()> {
    let mut worker = BrokerWorker::connect(&endpoint, CLOSE_SERVICE).await?;

    loop {
        let Some(mut msg) = worker.recv().await? else {
            break;
        };
        let Some(first) = msg.first() else {
            worker.send(Message::single(status::UNKNOWN)).await?;
            continue;
        };
        if Message::frame_is(first, SHUTDOWN) {
            break;
        }

        let uuid_frame = msg.pop_front().expect("checked non-empty above");
        let uuid = String::from_utf8_lossy(&uuid_frame).into_owned();

        store.delete(&store.request_path(&uuid)).await?;
        store.delete(&store.reply_path(&uuid)).await?;
        worker.send(Message::single(status::OK)).await?;
    }
    Ok(())
}
