//! End-to-end scenarios (see the testable-properties scenarios A-F):
//! a real broker, real Titanic endpoints and a real dispatcher, all
//! spun up in-process on ephemeral TCP ports and driven by a plain
//! `BrokerClient` the way an external caller would.

use std::path::PathBuf;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use titanic::{Dispatcher, Queue, Store};
use titanic_core::message::{status, Message};
use titanic_core::utils::testing::temp_dir;
use titanic_core::{BrokerClient, BrokerWorker};
use test_log::test;

struct Titanic {
    endpoint: String,
    request: JoinHandle<titanic::error::Result<()>>,
    reply: JoinHandle<titanic::error::Result<()>>,
    close: JoinHandle<titanic::error::Result<()>>,
    dispatcher: JoinHandle<titanic::error::Result<()>>,
}

impl Titanic {
    async fn spawn(dir: PathBuf) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(titanic_broker::serve(listener));
        let endpoint = format!("tcp://{addr}");

        let store = Store::new(dir);
        let queue = Queue::new(store.queue_path());
        let (uuid_tx, uuid_rx) = mpsc::channel(64);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        let request = tokio::spawn(titanic::endpoints::request::run(
            endpoint.clone(),
            store.clone(),
            uuid_tx,
        ));
        let reply = tokio::spawn(titanic::endpoints::reply::run(endpoint.clone(), store.clone()));
        let close = tokio::spawn(titanic::endpoints::close::run(endpoint.clone(), store.clone()));
        let dispatcher = tokio::spawn(Dispatcher::new(store, queue, endpoint.clone(), uuid_rx).run(shutdown_rx));

        // Let the four workers finish registering with the broker before
        // the test starts issuing requests against it.
        tokio::time::sleep(Duration::from_millis(50)).await;

        Self { endpoint, request, reply, close, dispatcher }
    }

    fn client(&self) -> BrokerClient {
        BrokerClient::new(&self.endpoint)
    }

    /// Simulate a process kill: abort every task without running the
    /// shutdown protocol. On-disk state (queue, `.req`, `.rep`) survives.
    fn kill(self) {
        self.request.abort();
        self.reply.abort();
        self.close.abort();
        self.dispatcher.abort();
    }
}

async fn spawn_echo_worker(endpoint: &str, service: &str) {
    let mut worker = BrokerWorker::connect(endpoint, service).await.unwrap();
    tokio::spawn(async move {
        while let Ok(Some(msg)) = worker.recv().await {
            let _ = worker.send(msg).await;
        }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
}

fn uuid_of(reply: &Message) -> String {
    assert!(Message::frame_is(&reply.frames()[0], status::OK));
    String::from_utf8(reply.frames()[1].to_vec()).unwrap()
}

#[test(tokio::test)]
async fn scenario_a_happy_path_with_echo_service() {
    let titanic = Titanic::spawn(temp_dir()).await;
    spawn_echo_worker(&titanic.endpoint, "echo").await;
    let client = titanic.client();

    let reply = client
        .request("titanic.request", Message::from_strs(["echo", "hello", "world"]))
        .await
        .unwrap();
    let uuid = uuid_of(&reply);
    assert_eq!(uuid.len(), 32);
    assert!(uuid.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_lowercase()));

    let fulfilled = poll_until_fulfilled(&client, &uuid).await;
    assert_eq!(fulfilled, Message::from_strs(["200", "hello", "world"]));

    let closed = client
        .request("titanic.close", Message::single(uuid.clone()))
        .await
        .unwrap();
    assert_eq!(closed, Message::from_strs(["200"]));
}

#[test(tokio::test)]
async fn scenario_b_service_unavailable_then_available() {
    let titanic = Titanic::spawn(temp_dir()).await;
    let client = titanic.client();

    let reply = client
        .request("titanic.request", Message::from_strs(["slowstart", "ping"]))
        .await
        .unwrap();
    let uuid = uuid_of(&reply);

    tokio::time::sleep(Duration::from_millis(1_200)).await;
    let pending = client
        .request("titanic.reply", Message::single(uuid.clone()))
        .await
        .unwrap();
    assert_eq!(pending, Message::from_strs(["300"]));

    spawn_echo_worker(&titanic.endpoint, "slowstart").await;

    let fulfilled = poll_until_fulfilled(&client, &uuid).await;
    assert_eq!(fulfilled, Message::from_strs(["200", "ping"]));
}

#[test(tokio::test)]
async fn scenario_c_unknown_uuid() {
    let titanic = Titanic::spawn(temp_dir()).await;
    let client = titanic.client();

    let unknown = "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF";
    let reply = client
        .request("titanic.reply", Message::single(unknown))
        .await
        .unwrap();
    assert_eq!(reply, Message::from_strs(["400"]));

    let closed = client
        .request("titanic.close", Message::single(unknown))
        .await
        .unwrap();
    assert_eq!(closed, Message::from_strs(["200"]));
}

#[test(tokio::test)]
async fn scenario_d_repeated_close_is_idempotent() {
    let titanic = Titanic::spawn(temp_dir()).await;
    spawn_echo_worker(&titanic.endpoint, "echo").await;
    let client = titanic.client();

    let reply = client
        .request("titanic.request", Message::from_strs(["echo", "x"]))
        .await
        .unwrap();
    let uuid = uuid_of(&reply);
    poll_until_fulfilled(&client, &uuid).await;

    for _ in 0..3 {
        let closed = client
            .request("titanic.close", Message::single(uuid.clone()))
            .await
            .unwrap();
        assert_eq!(closed, Message::from_strs(["200"]));
    }

    let reply = client
        .request("titanic.reply", Message::single(uuid.clone()))
        .await
        .unwrap();
    assert_eq!(reply, Message::from_strs(["400"]));
}

#[test(tokio::test)]
async fn scenario_e_crash_recovery_resumes_delivery() {
    let dir = temp_dir();
    let titanic = Titanic::spawn(dir.clone()).await;
    let client = titanic.client();

    let mut uuids = Vec::new();
    for i in 0..10 {
        let reply = client
            .request("titanic.request", Message::from_strs(["ghost", &format!("job-{i}")]))
            .await
            .unwrap();
        uuids.push(uuid_of(&reply));
    }
    // give the dispatcher a couple of ticks to enqueue and fail to
    // deliver these (no "ghost" worker exists yet)
    tokio::time::sleep(Duration::from_millis(1_200)).await;

    titanic.kill();

    let restarted = Titanic::spawn(dir).await;
    spawn_echo_worker(&restarted.endpoint, "ghost").await;
    let client = restarted.client();

    for uuid in uuids {
        let fulfilled = poll_until_fulfilled(&client, &uuid).await;
        assert!(Message::frame_is(&fulfilled.frames()[0], status::OK));
    }
}

#[test(tokio::test)]
async fn scenario_f_shutdown_sentinel_terminates_request_endpoint() {
    let titanic = Titanic::spawn(temp_dir()).await;
    let client = titanic.client();

    // The endpoint exits without replying, so the broker reports the
    // connection closing as "no worker available" for this call.
    let reply = client
        .request("titanic.request", Message::single("shutdown"))
        .await
        .unwrap();
    assert_eq!(reply, Message::from_strs(["404"]));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!client.mgmt_lookup("titanic.request").await.unwrap());
}

/// Poll `titanic.reply` until the UUID is fulfilled (`200`), for at most
/// a handful of dispatcher ticks.
async fn poll_until_fulfilled(client: &BrokerClient, uuid: &str) -> Message {
    for _ in 0..15 {
        let reply = client
            .request("titanic.reply", Message::single(uuid.to_string()))
            .await
            .unwrap();
        if Message::frame_is(&reply.frames()[0], status::OK) {
            return reply;
        }
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    panic!("uuid {uuid} was never fulfilled");
}
