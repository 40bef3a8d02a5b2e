// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Client for the seeker state hub over Unix sockets (CBOR-framed), plus the
//! `GameTransport` port the sync controller is written against.
//!
//! One background task owns the read half of the socket. Responses are routed
//! to the request with the same sequence number; `state_stream` pushes go to
//! the single open subscription. When the socket closes every pending request
//! fails with [`TransportError::Closed`] and the subscription ends.
//!
//! The reader never waits on the subscriber. Pushes land in a latest-value
//! slot and a forwarder task feeds the subscription from it, so a consumer
//! that falls behind skips stale snapshots instead of stalling responses.

use seeker_session_proto::{
    wire::{decode_message, encode_message, packet_len, HEADER_BYTES},
    DispatchAckPayload, DispatchPayload, GamePayload, Message, SigninPayload, StatePayload,
    WorldSnapshot,
};
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

pub mod port;

pub use port::{GameTransport, StateEvent, StateSubscription, TransportError};

/// Snapshots the forwarder may queue ahead of the consumer.
const SUBSCRIPTION_DEPTH: usize = 64;

type Pending = HashMap<u64, oneshot::Sender<Message>>;
type LatestState = watch::Sender<Option<StateEvent>>;

struct Shared {
    writer: tokio::sync::Mutex<OwnedWriteHalf>,
    pending: Mutex<Option<Pending>>,
    subscription: Mutex<Option<LatestState>>,
    next_seq: AtomicU64,
}

/// Async client over a Unix socket. Cheap to clone; clones share the socket.
#[derive(Clone)]
pub struct SessionClient {
    shared: Arc<Shared>,
}

impl SessionClient {
    /// Connect to the hub at the given Unix socket path.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let stream = UnixStream::connect(path).await?;
        Ok(Self::from_stream(stream))
    }

    /// Wrap an already connected stream and start the reader task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn from_stream(stream: UnixStream) -> Self {
        let (reader, writer) = stream.into_split();
        let shared = Arc::new(Shared {
            writer: tokio::sync::Mutex::new(writer),
            pending: Mutex::new(Some(HashMap::new())),
            subscription: Mutex::new(None),
            next_seq: AtomicU64::new(1),
        });
        tokio::spawn(read_loop(reader, Arc::clone(&shared)));
        Self { shared }
    }

    async fn send(&self, msg: &Message, seq: u64) -> Result<(), TransportError> {
        let pkt = encode_message(msg, seq)?;
        let mut writer = self.shared.writer.lock().await;
        writer.write_all(&pkt).await?;
        Ok(())
    }

    /// Send `msg` and wait for the response carrying the same sequence number.
    pub async fn request(&self, msg: Message) -> Result<Message, TransportError> {
        let seq = self.shared.next_seq.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.shared.pending.lock().map_err(|_| TransportError::Closed)?;
            pending
                .as_mut()
                .ok_or(TransportError::Closed)?
                .insert(seq, tx);
        }
        if let Err(err) = self.send(&msg, seq).await {
            if let Ok(mut pending) = self.shared.pending.lock() {
                if let Some(p) = pending.as_mut() {
                    p.remove(&seq);
                }
            }
            return Err(err);
        }
        match rx.await.map_err(|_| TransportError::Closed)? {
            Message::Error(e) => Err(TransportError::Remote {
                code: e.code,
                name: e.name,
                message: e.message,
            }),
            other => Ok(other),
        }
    }
}

impl GameTransport for SessionClient {
    async fn fetch_state(&self, game_id: &str) -> Result<Option<WorldSnapshot>, TransportError> {
        let msg = Message::QueryState(GamePayload {
            game_id: game_id.to_string(),
        });
        match self.request(msg).await? {
            Message::State(payload) => validate(&payload),
            other => Err(TransportError::Unexpected(other.op_name())),
        }
    }

    async fn subscribe_state(&self, game_id: &str) -> Result<StateSubscription, TransportError> {
        let (latest, slot) = watch::channel(None);
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_DEPTH);
        tokio::spawn(forward_state(slot, tx));
        {
            let mut sub = self
                .shared
                .subscription
                .lock()
                .map_err(|_| TransportError::Closed)?;
            if sub.replace(latest).is_some() {
                debug!("replacing existing state subscription");
            }
        }
        let seq = self.shared.next_seq.fetch_add(1, Ordering::Relaxed);
        let msg = Message::SubscribeState(GamePayload {
            game_id: game_id.to_string(),
        });
        self.send(&msg, seq).await?;
        Ok(rx)
    }

    async fn signin(&self, request: SigninPayload) -> Result<bool, TransportError> {
        match self.request(Message::Signin(request)).await? {
            Message::SigninAck(ack) => Ok(ack.accepted),
            other => Err(TransportError::Unexpected(other.op_name())),
        }
    }

    async fn dispatch(&self, request: DispatchPayload) -> Result<DispatchAckPayload, TransportError> {
        match self.request(Message::Dispatch(request)).await? {
            Message::DispatchAck(ack) => Ok(ack),
            other => Err(TransportError::Unexpected(other.op_name())),
        }
    }
}

fn validate(payload: &StatePayload) -> Result<Option<WorldSnapshot>, TransportError> {
    payload
        .state
        .as_ref()
        .map(WorldSnapshot::try_from)
        .transpose()
        .map_err(TransportError::from)
}

/// Read one packet. Returns Ok(None) when the stream is closed before any bytes are read.
/// Reads until a full frame header is buffered so short reads cannot desynchronize framing.
async fn read_packet<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<Vec<u8>>, TransportError> {
    let mut header = [0u8; HEADER_BYTES];
    let mut read = 0usize;
    while read < header.len() {
        let n = reader.read(&mut header[read..]).await?;
        if n == 0 {
            if read == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("truncated frame header: read {read} of {} bytes", header.len()),
            )
            .into());
        }
        read += n;
    }
    let total = packet_len(&header)?;
    let mut packet = vec![0u8; total];
    packet[..HEADER_BYTES].copy_from_slice(&header);
    reader.read_exact(&mut packet[HEADER_BYTES..]).await?;
    Ok(Some(packet))
}

async fn read_loop(mut reader: OwnedReadHalf, shared: Arc<Shared>) {
    loop {
        let packet = match read_packet(&mut reader).await {
            Ok(Some(packet)) => packet,
            Ok(None) => break,
            Err(err) => {
                warn!(?err, "hub read failed");
                break;
            }
        };
        let (msg, seq) = match decode_message(&packet) {
            Ok((msg, seq, _)) => (msg, seq),
            Err(err) => {
                warn!(?err, "failed to decode packet");
                break;
            }
        };
        route(msg, seq, &shared);
    }

    // Fail everything still waiting and end the subscription.
    if let Ok(mut pending) = shared.pending.lock() {
        pending.take();
    }
    if let Ok(mut sub) = shared.subscription.lock() {
        sub.take();
    }
}

/// Feed the subscription from the latest-value slot until either side closes.
async fn forward_state(mut slot: watch::Receiver<Option<StateEvent>>, out: mpsc::Sender<StateEvent>) {
    while slot.changed().await.is_ok() {
        let event = slot.borrow_and_update().clone();
        if let Some(event) = event {
            if out.send(event).await.is_err() {
                debug!("state subscriber went away");
                return;
            }
        }
    }
}

fn route(msg: Message, seq: u64, shared: &Shared) {
    if let Message::StateStream(payload) = msg {
        let Ok(sub) = shared.subscription.lock() else {
            return;
        };
        match sub.as_ref() {
            Some(latest) => {
                latest.send_replace(Some(validate(&payload)));
            }
            None => debug!("state push without a subscription"),
        }
        return;
    }
    let waiter = shared
        .pending
        .lock()
        .ok()
        .and_then(|mut p| p.as_mut().and_then(|p| p.remove(&seq)));
    match waiter {
        Some(tx) => {
            let _ = tx.send(msg);
        }
        None => debug!(seq, op = msg.op_name(), "response without a pending request"),
    }
}
