//! The shutdown coordinator (§4.7): once the process is asked to stop, it
//! sends the in-band `shutdown` sentinel to each endpoint in turn so their
//! blocking broker `recv()` calls return and the loops exit cleanly.

use titanic_core::message::{Message, SHUTDOWN};
use titanic_core::BrokerClient;

use crate::endpoints::{CLOSE_SERVICE, REPLY_SERVICE, REQUEST_SERVICE};

/// Notify all three endpoints. A reply timeout is tolerated (§9.5): the
/// endpoint may already have exited from the same signal that triggered
/// this call, in which case nothing is left to answer.
pub async fn notify_endpoints(endpoint: &str) {
    for service in [REQUEST_SERVICE, REPLY_SERVICE, CLOSE_SERVICE] {
        let client = BrokerClient::new(endpoint);
        match client.request(service, Message::single(SHUTDOWN)).await {
            Ok(_) => tracing::debug!(service, "endpoint acknowledged shutdown"),
            Err(e) => tracing::debug!(
                service,
                error = %e,
                "shutdown notice unanswered; endpoint may have already exited"
            ),
        }
    }
}
