//! Broker actor state: which workers are registered and idle per
//! service, and the command channel connection tasks use to talk to it.
//!
//! Single task owns all mutable state; every connection is handled by
//! its own tokio task that only ever reaches the registry through
//! [`Command`] — the channel-actor shape this corpus's reference broker
//! daemon uses, so the registry itself never needs a lock.

use std::collections::{HashMap, VecDeque};

use tokio::sync::{mpsc, oneshot};
use titanic_core::message::Message;

pub type WorkerId = u64;

/// One job handed from the broker to a registered worker connection task.
pub struct WorkerJob {
    pub payload: Message,
    pub reply_to: oneshot::Sender<Option<Message>>,
}

pub enum Command {
    /// A worker connection has finished its handshake; register it as
    /// idle for `service`.
    RegisterWorker {
        service: String,
        job_tx: mpsc::Sender<WorkerJob>,
        ack: oneshot::Sender<WorkerId>,
    },
    /// A worker just finished a job (or just registered) and is ready
    /// for the next one.
    WorkerIdle { worker_id: WorkerId },
    /// A worker connection task has exited; drop it from the registry.
    WorkerGone { worker_id: WorkerId },
    /// A client wants to invoke `service`. Replies `None` immediately if
    /// nobody has ever registered for `service`; otherwise holds until a
    /// worker comes idle.
    Request {
        service: String,
        payload: Message,
        respond_to: oneshot::Sender<Option<Message>>,
    },
    /// A client wants to know if `service` has any registered worker,
    /// idle or busy.
    MgmtLookup {
        service: String,
        respond_to: oneshot::Sender<bool>,
    },
}

struct Worker {
    service: String,
    job_tx: mpsc::Sender<WorkerJob>,
}

#[derive(Default)]
pub struct Registry {
    next_id: WorkerId,
    workers: HashMap<WorkerId, Worker>,
    idle: HashMap<String, VecDeque<WorkerId>>,
    /// services with at least one worker that has ever registered, idle or not
    known: HashMap<String, usize>,
    /// requests parked waiting for a worker to come idle, one queue per service
    waiting: HashMap<String, VecDeque<oneshot::Sender<mpsc::Sender<WorkerJob>>>>,
}

impl Registry {
    pub fn register_worker(&mut self, service: String, job_tx: mpsc::Sender<WorkerJob>) -> WorkerId {
        let id = self.next_id;
        self.next_id += 1;
        *self.known.entry(service.clone()).or_default() += 1;
        self.workers.insert(id, Worker { service, job_tx });
        id
    }

    pub fn mark_idle(&mut self, worker_id: WorkerId) {
        let Some(worker) = self.workers.get(&worker_id) else {
            return;
        };
        // A waiter whose request already timed out drops its receiver; keep
        // popping until one actually accepts the worker, or the queue empties.
        while let Some(waiter) = self
            .waiting
            .get_mut(&worker.service)
            .and_then(VecDeque::pop_front)
        {
            if waiter.send(worker.job_tx.clone()).is_ok() {
                return;
            }
        }
        self.idle
            .entry(worker.service.clone())
            .or_default()
            .push_back(worker_id);
    }

    pub fn remove_worker(&mut self, worker_id: WorkerId) {
        if let Some(worker) = self.workers.remove(&worker_id) {
            if let Some(count) = self.known.get_mut(&worker.service) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.known.remove(&worker.service);
                }
            }
            if let Some(queue) = self.idle.get_mut(&worker.service) {
                queue.retain(|id| *id != worker_id);
            }
        }
    }

    pub fn has_worker(&self, service: &str) -> bool {
        self.known.contains_key(service)
    }

    /// Pop an idle worker's job sender for `service`, or park a waiter
    /// that resolves with one the next time a worker becomes idle.
    pub fn take_idle_or_wait(&mut self, service: &str) -> TakeResult {
        if let Some(job_tx) = self
            .idle
            .get_mut(service)
            .and_then(VecDeque::pop_front)
            .and_then(|id| self.workers.get(&id).map(|w| w.job_tx.clone()))
        {
            return TakeResult::Idle(job_tx);
        }
        let (tx, rx) = oneshot::channel();
        self.waiting.entry(service.to_string()).or_default().push_back(tx);
        TakeResult::Waiting(rx)
    }

    pub fn job_sender(&self, worker_id: WorkerId) -> Option<mpsc::Sender<WorkerJob>> {
        self.workers.get(&worker_id).map(|w| w.job_tx.clone())
    }
}

pub enum TakeResult {
    Idle(mpsc::Sender<WorkerJob>),
    Waiting(oneshot::Receiver<mpsc::Sender<WorkerJob>>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn unknown_service_has_no_worker() {
        let registry = Registry::default();
        assert!(!registry.has_worker("echo"));
    }

    #[test]
    fn register_then_remove_clears_known() {
        let mut registry = Registry::default();
        let (tx, _rx) = mpsc::channel(1);
        let id = registry.register_worker("echo".into(), tx);
        assert!(registry.has_worker("echo"));
        registry.remove_worker(id);
        assert!(!registry.has_worker("echo"));
    }

    #[test]
    fn idle_worker_is_taken_immediately() {
        let mut registry = Registry::default();
        let (tx, _rx) = mpsc::channel(1);
        let id = registry.register_worker("echo".into(), tx);
        registry.mark_idle(id);
        match registry.take_idle_or_wait("echo") {
            TakeResult::Idle(_job_tx) => {}
            TakeResult::Waiting(_) => panic!("expected an idle worker"),
        }
    }

    #[test(tokio::test)]
    async fn waiter_resolves_once_worker_goes_idle() {
        let mut registry = Registry::default();
        let rx = match registry.take_idle_or_wait("echo") {
            TakeResult::Waiting(rx) => rx,
            TakeResult::Idle(_) => panic!("no worker registered yet"),
        };
        let (tx, _job_rx) = mpsc::channel(1);
        let id = registry.register_worker("echo".into(), tx);
        registry.mark_idle(id);
        assert!(rx.await.is_ok());
    }
}
