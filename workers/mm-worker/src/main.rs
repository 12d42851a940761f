//! Illustrative Material Management front-end: registers as `mm` and
//! translates CRUD verbs (`create`/`read`/`update`/`delete` on a SKU)
//! into `docstore` operations over its own broker client. The MM->DB
//! chain this sits in front of is external to the Titanic core; the
//! core only ever sees `mm` as an opaque named service.

use clap::Parser;
use titanic_core::message::{status, Message};
use titanic_core::{BrokerClient, BrokerWorker};

const SERVICE: &str = "mm";
const DOCSTORE_SERVICE: &str = "docstore";

#[derive(Parser)]
struct Args {
    #[arg(long, env = "TITANIC_ENDPOINT", default_value = "tcp://127.0.0.1:5555")]
    endpoint: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).compact().init();
    let args = Args::parse();

    let docstore = BrokerClient::new(&args.endpoint);
    let mut worker = BrokerWorker::connect(&args.endpoint, SERVICE).await?;
    tracing::info!(service = SERVICE, "registered with broker");

    while let Some(request) = worker.recv().await? {
        let reply = handle(&docstore, request).await;
        worker.send(reply).await?;
    }
    Ok(())
}

/// Translate one `mm` request into a `docstore` call and relay its reply.
async fn handle(docstore: &BrokerClient, mut request: Message) -> Message {
    let Some(op) = request.pop_front() else {
        return Message::single(status::UNKNOWN);
    };
    let Some(sku) = request.pop_front() else {
        return Message::single(status::UNKNOWN);
    };

    let forwarded = if Message::frame_is(&op, "create") || Message::frame_is(&op, "update") {
        let Some(value) = request.pop_front() else {
            return Message::single(status::UNKNOWN);
        };
        let mut payload = Message::from_strs(["put"]);
        payload.push_back(sku);
        payload.push_back(value);
        docstore.request(DOCSTORE_SERVICE, payload).await
    } else if Message::frame_is(&op, "read") {
        let mut payload = Message::from_strs(["get"]);
        payload.push_back(sku);
        docstore.request(DOCSTORE_SERVICE, payload).await
    } else if Message::frame_is(&op, "delete") {
        let mut payload = Message::from_strs(["delete"]);
        payload.push_back(sku);
        docstore.request(DOCSTORE_SERVICE, payload).await
    } else {
        return Message::single(status::UNKNOWN);
    };

    forwarded.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "docstore call failed");
        Message::single(status::ERROR)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_operation_is_rejected_without_calling_docstore() {
        let docstore = BrokerClient::new("tcp://127.0.0.1:1");
        let reply = handle(&docstore, Message::from_strs(["frobnicate", "sku-1"])).await;
        assert_eq!(reply, Message::single(status::UNKNOWN));
    }

    #[tokio::test]
    async fn missing_value_on_create_is_rejected_without_calling_docstore() {
        let docstore = BrokerClient::new("tcp://127.0.0.1:1");
        let reply = handle(&docstore, Message::from_strs(["create", "sku-1"])).await;
        assert_eq!(reply, Message::single(status::UNKNOWN));
    }
}
