//! Jetstream Consumer
//!
//! Subscription to a Jetstream event feed: wire model, collection filter,
//! the websocket session, and the loop that keeps it connected.
//!
//! ```text
//!   ReconnectLoop ──▶ EventSource::run_session ──▶ dispatch_frame ──▶ EventHandler
//!        ▲                    │
//!        └── error / close ───┘
//! ```

pub mod event;
pub mod filter;
pub mod reconnect;
pub mod source;

pub use event::{Commit, CommitOperation, EventKind, JetstreamEvent};
pub use filter::{WantedCollections, DEFAULT_COLLECTIONS};
pub use reconnect::{Backoff, LoopStats, ReconnectLoop, ReconnectPolicy};
pub use source::{
    cancelled, dispatch_frame, is_cancelled, Dispatch, EventHandler, EventSource, SessionEnd,
    StreamError, WebSocketSource, DEFAULT_ENDPOINT,
};
