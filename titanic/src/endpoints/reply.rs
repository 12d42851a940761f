//! `titanic.reply`: report whether a UUID's request has been fulfilled.

use titanic_core::message::{status, Message, SHUTDOWN};
use titanic_core::BrokerWorker;

use super::REPLY_SERVICE;
use crate::error::Result;
use crate::store::Store;

pub async fn run(endpoint: String, store: Store) -> Result<()> {
    let mut worker = BrokerWorker::connect(&endpoint, REPLY_SERVICE).await?;

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

        let rep_path = store.reply_path(&uuid);
        let reply = if store.exists(&rep_path).await {
            let mut reply = store.load_message(&rep_path).await?;
            reply.push_front(status::OK);
            reply
        } else if store.exists(&store.request_path(&uuid)).await {
            Message::single(status::PENDING)
        } else {
            Message::single(status::UNKNOWN)
        };
        worker.send(reply).await?;
    }
    Ok(())
}
