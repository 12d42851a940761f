//! The broker's single state-owning task: drains [`Command`]s from every
//! connection task and is the only place [`Registry`] is ever touched.

use tokio::sync::{mpsc, oneshot};
use titanic_core::message::Message;

use crate::registry::{Command, Registry, TakeResult, WorkerJob};

pub async fn run(mut commands: mpsc::Receiver<Command>) {
    let mut registry = Registry::default();

    while let Some(cmd) = commands.recv().await {
        match cmd {
            Command::RegisterWorker { service, job_tx, ack } => {
                let id = registry.register_worker(service, job_tx);
                let _ = ack.send(id);
            }
            Command::WorkerIdle { worker_id } => registry.mark_idle(worker_id),
            Command::WorkerGone { worker_id } => registry.remove_worker(worker_id),
            Command::MgmtLookup { service, respond_to } => {
                let _ = respond_to.send(registry.has_worker(&service));
            }
            Command::Request {
                service,
                payload,
                respond_to,
            } => {
                // A service nobody has ever registered for never has an idle
                // worker to wait for, so fail fast rather than holding the
                // connection open for a worker that will never arrive.
                if !registry.has_worker(&service) {
                    let _ = respond_to.send(None);
                    continue;
                }
                match registry.take_idle_or_wait(&service) {
                    TakeResult::Idle(job_tx) => {
                        tokio::spawn(dispatch(job_tx, payload, respond_to));
                    }
                    TakeResult::Waiting(waiter) => {
                        tokio::spawn(wait_then_dispatch(waiter, payload, respond_to));
                    }
                }
            }
        }
    }
}

async fn dispatch(
    job_tx: mpsc::Sender<WorkerJob>,
    payload: Message,
    respond_to: oneshot::Sender<Option<Message>>,
) {
    let (reply_tx, reply_rx) = oneshot::channel();
    if job_tx.send(WorkerJob { payload, reply_to: reply_tx }).await.is_err() {
        let _ = respond_to.send(None);
        return;
    }
    let reply = reply_rx.await.unwrap_or(None);
    let _ = respond_to.send(reply);
}

/// Holds the request open until a worker already known to the service
/// comes idle. Unbounded: a busy-but-present worker is worth waiting
/// for, and the client's own receive timeout is what governs retry, not
/// a broker-side guess at how long "busy" should be tolerated.
async fn wait_then_dispatch(
    waiter: oneshot::Receiver<mpsc::Sender<WorkerJob>>,
    payload: Message,
    respond_to: oneshot::Sender<Option<Message>>,
) {
    match waiter.await {
        Ok(job_tx) => dispatch(job_tx, payload, respond_to).await,
        Err(_) => {
            let _ = respond_to.send(None);
        }
    }
}
