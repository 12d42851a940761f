//! Illustrative document-store worker: registers as `docstore` and serves
//! `put`/`get`/`delete` on an in-memory string store. Exercises the core
//! end to end as the target service a Titanic request ultimately reaches.

mod store;

use std::sync::Arc;

use clap::Parser;
use titanic_core::message::{status, Message};
use titanic_core::BrokerWorker;

use store::DocStore;

const SERVICE: &str = "docstore";

#[derive(Parser)]
struct Args {
    #[arg(long, env = "TITANIC_ENDPOINT", default_value = "tcp://127.0.0.1:5555")]
    endpoint: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).compact().init();
    let args = Args::parse();

    let store = Arc::new(DocStore::new());
    let mut worker = BrokerWorker::connect(&args.endpoint, SERVICE).await?;
    tracing::info!(service = SERVICE, "registered with broker");

    while let Some(request) = worker.recv().await? {
        let reply = handle(&store, request);
        worker.send(reply).await?;
    }
    Ok(())
}

fn handle(store: &DocStore, mut request: Message) -> Message {
    let Some(op) = request.pop_front() else {
        return Message::single(status::UNKNOWN);
    };

    if Message::frame_is(&op, "put") {
        let (Some(key), Some(value)) = (request.pop_front(), request.pop_front()) else {
            return Message::single(status::UNKNOWN);
        };
        store.put(to_string(&key), to_string(&value));
        Message::single(status::OK)
    } else if Message::frame_is(&op, "get") {
        let Some(key) = request.pop_front() else {
            return Message::single(status::UNKNOWN);
        };
        match store.get(&to_string(&key)) {
            Some(value) => Message::from_strs([status::OK, value.as_str()]),
            None => Message::single(status::NOT_FOUND),
        }
    } else if Message::frame_is(&op, "delete") {
        let Some(key) = request.pop_front() else {
            return Message::single(status::UNKNOWN);
        };
        if store.delete(&to_string(&key)) {
            Message::single(status::OK)
        } else {
            Message::single(status::NOT_FOUND)
        }
    } else {
        Message::single(status::UNKNOWN)
    }
}

fn to_string(frame: &titanic_core::Frame) -> String {
    String::from_utf8_lossy(frame).into_owned()
}
