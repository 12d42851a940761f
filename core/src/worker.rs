//! The worker half of the broker client/worker library consumed by
//! every service in this workspace (the three Titanic endpoints, the
//! sample MM/docstore workers, and any test echo service).
//!
//! A worker is a single long-lived TCP connection: register once, then
//! alternate `recv()`/`send()` one job at a time. Because only one job
//! is ever in flight on a given connection, there is no need for the
//! separate reply-envelope type the external interface describes in the
//! abstract — `&mut self` already pins down which client is waiting.

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use crate::endpoint::strip_scheme;
use crate::error::{Communication, Error};
use crate::message::Message;
use crate::protocol::TAG_WORKER_REGISTER;
use crate::wire::MessageCodec;

/// A registered worker session for one named service.
pub struct BrokerWorker {
    framed: Framed<TcpStream, MessageCodec>,
    service: String,
}

impl BrokerWorker {
    /// Connect to the broker and register under `service_name`.
    pub async fn connect(endpoint: &str, service_name: &str) -> Result<Self, Error> {
        let stream = TcpStream::connect(strip_scheme(endpoint))
            .await
            .map_err(Communication::Io)?;
        let mut framed = Framed::new(stream, MessageCodec::new());

        framed
            .send(Message::from_strs([TAG_WORKER_REGISTER, service_name]))
            .await?;
        // The broker acks registration with a single OK frame before the
        // first job can arrive, so a dead/rejecting broker is observed here
        // rather than silently on the first `recv()`.
        match framed.next().await {
            Some(Ok(_ack)) => Ok(Self {
                framed,
                service: service_name.to_string(),
            }),
            Some(Err(e)) => Err(e),
            None => Err(Communication::ConnectionClosed.into()),
        }
    }

    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Wait for the next job. Returns `Ok(None)` if the broker closed the
    /// connection (e.g. broker shutdown) rather than sending a job.
    pub async fn recv(&mut self) -> Result<Option<Message>, Error> {
        match self.framed.next().await {
            Some(result) => result.map(Some),
            None => Ok(None),
        }
    }

    /// Send the reply to the job most recently returned by [`recv`](Self::recv).
    pub async fn send(&mut self, reply: Message) -> Result<(), Error> {
        self.framed.send(reply).await
    }
}
