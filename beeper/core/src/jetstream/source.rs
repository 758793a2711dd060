//! Event Source
//!
//! One subscription session against the event stream. A session connects,
//! reads frames until the remote end closes, errors, or the owner cancels,
//! and hands each matching commit to the registered [`EventHandler`].
//!
//! Sessions never retry on their own; see [`super::reconnect`] for that.
//! Events are dispatched strictly in arrival order and the handler is
//! awaited before the next frame is read.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, info, warn};

use super::event::JetstreamEvent;
use super::filter::WantedCollections;
use crate::cursor::StreamCursor;

/// Public Jetstream instance used when no endpoint is configured
pub const DEFAULT_ENDPOINT: &str = "wss://jetstream.atproto.tools/subscribe";

/// Errors that end a session and warrant a reconnect
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("protocol error: {0}")]
    Protocol(String),
}

/// How a session ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Remote end closed the stream; reconnecting is appropriate
    Closed,
    /// The owner asked us to stop; do not reconnect
    Cancelled,
}

/// Receives the collection name of every matching commit
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle_commit(&self, collection: &str);
}

/// Something that can run one subscription session
#[async_trait]
pub trait EventSource: Send {
    /// Read from `cursor.resume_point()` until the session ends.
    ///
    /// Every decoded event is recorded with [`StreamCursor::observe`].
    async fn run_session(
        &mut self,
        cursor: &mut StreamCursor,
        handler: &dyn EventHandler,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<SessionEnd, StreamError>;
}

/// Outcome of dispatching one text frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Handler was invoked
    Delivered,
    /// Valid event without a commit payload
    NoCommit,
    /// Commit for a collection outside the allow-list
    Filtered,
    /// Frame did not decode
    Malformed,
}

/// Decode one frame and deliver it if it is a watched commit
pub async fn dispatch_frame(
    text: &str,
    wanted: &WantedCollections,
    cursor: &mut StreamCursor,
    handler: &dyn EventHandler,
) -> Dispatch {
    let event = match JetstreamEvent::from_json(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Skipping undecodable event frame");
            return Dispatch::Malformed;
        }
    };

    cursor.observe(event.time_us);

    let Some(collection) = event.collection() else {
        return Dispatch::NoCommit;
    };

    if !wanted.matches(collection) {
        debug!(collection, "Dropping commit outside watched collections");
        return Dispatch::Filtered;
    }

    handler.handle_commit(collection).await;
    Dispatch::Delivered
}

/// Resolves once the shutdown flag is set or its sender is gone
pub async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// Non-blocking check of the shutdown flag
pub fn is_cancelled(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow() || shutdown.has_changed().is_err()
}

/// Jetstream subscription over a websocket
#[derive(Debug, Clone)]
pub struct WebSocketSource {
    endpoint: String,
    collections: WantedCollections,
    dids: Vec<String>,
}

impl WebSocketSource {
    pub fn new(endpoint: impl Into<String>, collections: WantedCollections) -> Self {
        Self {
            endpoint: endpoint.into(),
            collections,
            dids: Vec::new(),
        }
    }

    /// Restrict the subscription to these authors (empty = everyone)
    pub fn with_dids(mut self, dids: Vec<String>) -> Self {
        self.dids = dids;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn collections(&self) -> &WantedCollections {
        &self.collections
    }

    /// Subscription URL with filters and the resume cursor in the query
    pub fn subscribe_url(&self, cursor_us: i64) -> String {
        let mut url = self.endpoint.clone();
        let mut sep = if url.contains('?') { '&' } else { '?' };

        for collection in self.collections.entries() {
            url.push(sep);
            url.push_str("wantedCollections=");
            url.push_str(collection);
            sep = '&';
        }
        for did in &self.dids {
            url.push(sep);
            url.push_str("wantedDids=");
            url.push_str(did);
            sep = '&';
        }
        url.push(sep);
        url.push_str(&format!("cursor={cursor_us}"));
        url
    }
}

#[async_trait]
impl EventSource for WebSocketSource {
    async fn run_session(
        &mut self,
        cursor: &mut StreamCursor,
        handler: &dyn EventHandler,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<SessionEnd, StreamError> {
        if is_cancelled(shutdown) {
            return Ok(SessionEnd::Cancelled);
        }

        let url = self.subscribe_url(cursor.resume_point());
        info!(endpoint = %self.endpoint, cursor = cursor.resume_point(), "Connecting to event stream");

        let stream = tokio::select! {
            result = tokio_tungstenite::connect_async(url.as_str()) => {
                let (stream, _response) = result.map_err(|e| StreamError::Connect {
                    url: self.endpoint.clone(),
                    source: e,
                })?;
                stream
            }
            _ = cancelled(shutdown) => return Ok(SessionEnd::Cancelled),
        };

        info!(endpoint = %self.endpoint, "Event stream connected");
        let (mut write, mut read) = stream.split();

        loop {
            tokio::select! {
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        dispatch_frame(&text, &self.collections, cursor, handler).await;
                    }
                    Some(Ok(Message::Binary(data))) => {
                        debug!(len = data.len(), "Ignoring binary frame");
                    }
                    Some(Ok(Message::Ping(data))) => {
                        write.send(Message::Pong(data)).await?;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        info!(frame = ?frame, "Server closed event stream");
                        return Ok(SessionEnd::Closed);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => {
                        info!("Event stream ended");
                        return Ok(SessionEnd::Closed);
                    }
                },
                _ = cancelled(shutdown) => {
                    debug!("Shutdown signal received in session");
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(SessionEnd::Cancelled);
                }
            }
        }
    }
}
