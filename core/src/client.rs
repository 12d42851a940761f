//! The client half of the broker client/worker library: a short-lived
//! connection used to make one request or one management lookup,
//! bounded by an explicit receive timeout.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;

use crate::endpoint::strip_scheme;
use crate::error::{Communication, Error};
use crate::message::{status, Message};
use crate::protocol::{TAG_MGMT_LOOKUP, TAG_REQUEST};
use crate::wire::MessageCodec;

/// Default receive timeout (§4.6.1: "a short-lived broker client with a
/// 1-second receive timeout").
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

pub struct BrokerClient {
    endpoint: String,
    timeout: Duration,
}

impl BrokerClient {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn set_timeout(&mut self, d: Duration) {
        self.timeout = d;
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send `payload` to `service` and wait for its reply, bounded by
    /// [`timeout`](Self::timeout). The returned message is exactly what
    /// the target service sent back, with no status frame prepended.
    pub async fn request(&self, service: &str, payload: Message) -> Result<Message, Error> {
        let mut msg = Message::from_strs([TAG_REQUEST, service]);
        msg.0.extend(payload.into_frames());
        self.call(msg).await
    }

    /// Ask the broker's management interface whether `service` currently
    /// has at least one registered worker.
    pub async fn mgmt_lookup(&self, service: &str) -> Result<bool, Error> {
        let reply = self
            .call(Message::from_strs([TAG_MGMT_LOOKUP, service]))
            .await?;
        Ok(reply
            .first()
            .is_some_and(|f| Message::frame_is(f, status::OK)))
    }

    async fn call(&self, msg: Message) -> Result<Message, Error> {
        let fut = async {
            let stream = TcpStream::connect(strip_scheme(&self.endpoint))
                .await
                .map_err(Communication::Io)?;
            let mut framed = Framed::new(stream, MessageCodec::new());
            framed.send(msg).await?;
            match framed.next().await {
                Some(result) => result,
                None => Err(Communication::ConnectionClosed.into()),
            }
        };

        timeout(self.timeout, fut)
            .await
            .map_err(|_| Communication::Timeout.into())
            .and_then(|r| r)
    }
}
