//! # Tactile OSC
//!
//! Remote transmission for `tactile-core` widgets: a JSON message
//! envelope in the OSC address/parameters convention, a transport trait
//! the host's WebSocket (or any other duplex channel) plugs into, and an
//! inbound router that dispatches messages to per-address handlers or to
//! live widgets by their registered key.
//!
//! The wire itself stays outside this crate: implement [`Transport`]
//! over whatever socket the host owns, wrap it in a [`Connection`], and
//! hand the connection to the panel's event dispatch as the remote
//! sender.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod message;
pub mod router;
pub mod transport;

pub use message::Message;
pub use router::{RouteOutcome, Router, RouterError};
pub use transport::{Connection, Transport, TransportError, TransportState};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
