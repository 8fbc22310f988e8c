// obs-websocket
//
// Client for the OBS WebSocket v5 protocol: hello/identify handshake with
// challenge authentication, id-matched requests, and a fan-out event stream.

mod auth;
mod client;
mod config;
mod error;
mod events;
mod protocol;
mod requests;
mod retry;

pub use auth::auth_string;
pub use client::ObsClient;
pub use config::ObsConfig;
pub use error::{ObsWebsocketError, Result};
pub use events::ObsEvent;
pub use requests::{MediaAction, ObsRequest};
pub use retry::{RetryConfig, RetryPolicy};

pub use async_broadcast::{Receiver as EventReceiver, RecvError as EventRecvError};
