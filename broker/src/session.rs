//! Per-connection handling. Every TCP connection gets its own task; the
//! first frame decides whether it is a worker registering for a service
//! or a client making a `REQUEST`/`MGMT` call, after which the task only
//! ever touches broker state through a [`Command`].

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_util::codec::Framed;
use titanic_core::message::{status, Message};
use titanic_core::protocol::{TAG_MGMT_LOOKUP, TAG_REQUEST, TAG_WORKER_REGISTER};
use titanic_core::wire::MessageCodec;

use crate::error::Error;
use crate::registry::{Command, WorkerJob};

pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<Command>,
) -> Result<(), Error> {
    let mut framed = Framed::new(stream, MessageCodec::new());

    let mut msg = match framed.next().await {
        Some(result) => result?,
        None => return Ok(()),
    };
    let tag = msg.pop_front().ok_or(Error::EmptyHandshake)?;

    if Message::frame_is(&tag, TAG_WORKER_REGISTER) {
        serve_worker(msg, framed, cmd_tx).await
    } else if Message::frame_is(&tag, TAG_REQUEST) {
        serve_request(msg, framed, cmd_tx).await
    } else if Message::frame_is(&tag, TAG_MGMT_LOOKUP) {
        serve_mgmt_lookup(msg, framed, cmd_tx).await
    } else {
        Err(Error::UnknownTag(String::from_utf8_lossy(&tag).into_owned()))
    }
}

async fn serve_worker(
    mut handshake: Message,
    mut framed: Framed<TcpStream, MessageCodec>,
    cmd_tx: mpsc::Sender<Command>,
) -> Result<(), Error> {
    let service_frame = handshake.pop_front().ok_or(Error::EmptyHandshake)?;
    let service = String::from_utf8_lossy(&service_frame).into_owned();

    let (job_tx, mut job_rx) = mpsc::channel::<WorkerJob>(1);
    let (ack_tx, ack_rx) = oneshot::channel();
    cmd_tx
        .send(Command::RegisterWorker {
            service: service.clone(),
            job_tx,
            ack: ack_tx,
        })
        .await
        .map_err(|_| Error::EmptyHandshake)?;
    let worker_id = ack_rx.await.map_err(|_| Error::EmptyHandshake)?;

    framed.send(Message::single(status::OK)).await?;
    tracing::info!(service, worker_id, "worker registered");

    loop {
        tokio::select! {
            job = job_rx.recv() => {
                let Some(WorkerJob { payload, reply_to }) = job else {
                    break;
                };
                if framed.send(payload).await.is_err() {
                    let _ = reply_to.send(None);
                    break;
                }
                match framed.next().await {
                    Some(Ok(reply)) => {
                        let _ = reply_to.send(Some(reply));
                        let _ = cmd_tx.send(Command::WorkerIdle { worker_id }).await;
                    }
                    _ => {
                        let _ = reply_to.send(None);
                        break;
                    }
                }
            }
            closed = framed.next() => {
                // Anything read while idle means the worker hung up or broke protocol.
                let _ = closed;
                break;
            }
        }
    }

    let _ = cmd_tx.send(Command::WorkerGone { worker_id }).await;
    tracing::info!(service, worker_id, "worker disconnected");
    Ok(())
}

async fn serve_request(
    mut request: Message,
    mut framed: Framed<TcpStream, MessageCodec>,
    cmd_tx: mpsc::Sender<Command>,
) -> Result<(), Error> {
    let service_frame = request.pop_front().ok_or(Error::EmptyHandshake)?;
    let service = String::from_utf8_lossy(&service_frame).into_owned();

    let (respond_to, respond_rx) = oneshot::channel();
    cmd_tx
        .send(Command::Request {
            service,
            payload: request,
            respond_to,
        })
        .await
        .map_err(|_| Error::EmptyHandshake)?;

    let reply = match respond_rx.await {
        Ok(Some(reply)) => reply,
        _ => Message::single(status::NOT_FOUND),
    };
    framed.send(reply).await?;
    Ok(())
}

async fn serve_mgmt_lookup(
    mut lookup: Message,
    mut framed: Framed<TcpStream, MessageCodec>,
    cmd_tx: mpsc::Sender<Command>,
) -> Result<(), Error> {
    let service_frame = lookup.pop_front().ok_or(Error::EmptyHandshake)?;
    let service = String::from_utf8_lossy(&service_frame).into_owned();

    let (respond_to, respond_rx) = oneshot::channel();
    cmd_tx
        .send(Command::MgmtLookup { service, respond_to })
        .await
        .map_err(|_| Error::EmptyHandshake)?;

    let has_worker = respond_rx.await.unwrap_or(false);
    let status = if has_worker { status::OK } else { status::NOT_FOUND };
    framed.send(Message::single(status)).await?;
    Ok(())
}
