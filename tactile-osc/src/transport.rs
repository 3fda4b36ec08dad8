//! The transport seam and the outbound connection wrapper.
//!
//! The actual socket lives with the host: it implements [`Transport`]
//! over whatever duplex channel it owns and reports its readiness
//! through [`TransportState`]. Sending while the transport is anything
//! but open is a synchronous error; nothing is queued and nothing is
//! retried.

use thiserror::Error;

use tactile_core::{RemoteSender, TransmitError};

use crate::message::Message;

/// Readiness of the underlying channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    /// Still connecting; sends fail.
    Connecting,
    /// Ready; sends go through.
    Open,
    /// Closed or failed; sends fail.
    Closed,
}

/// Errors raised by the transport layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport is not open.
    #[error("transport is not connected")]
    NotConnected,

    /// Message encoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The underlying channel rejected the send.
    #[error("send failed: {0}")]
    Send(String),
}

/// A duplex text channel supplied by the host.
pub trait Transport {
    /// Current readiness of the channel.
    fn state(&self) -> TransportState;

    /// Send one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Send`] when the channel rejects the
    /// frame.
    fn send_text(&mut self, text: &str) -> Result<(), TransportError>;
}

/// Outbound connection: encodes messages and enforces the open-state
/// requirement.
///
/// Implements [`RemoteSender`] so a panel can pass it straight into
/// widget event dispatch.
#[derive(Debug)]
pub struct Connection<T> {
    transport: T,
    interface_name: String,
}

impl<T: Transport> Connection<T> {
    /// Wrap a transport for the named interface.
    #[must_use]
    pub fn new(transport: T, interface_name: impl Into<String>) -> Self {
        Self {
            transport,
            interface_name: interface_name.into(),
        }
    }

    /// Readiness of the wrapped transport.
    #[must_use]
    pub fn state(&self) -> TransportState {
        self.transport.state()
    }

    /// The interface name used in the registration handshake.
    #[must_use]
    pub fn interface_name(&self) -> &str {
        &self.interface_name
    }

    /// Borrow the wrapped transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Send the registration handshake. Call once when the transport
    /// reports open.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotConnected`] when the transport is
    /// not open, or an encoding/send error.
    pub fn register(&mut self) -> Result<(), TransportError> {
        let message = Message::register(self.interface_name.clone());
        self.send_message(&message)
    }

    /// Send one value message.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotConnected`] when the transport is
    /// not open, or an encoding/send error.
    pub fn send_osc(&mut self, address: &str, parameters: &[f64]) -> Result<(), TransportError> {
        let message = Message::osc(address, parameters.to_vec());
        self.send_message(&message)
    }

    fn send_message(&mut self, message: &Message) -> Result<(), TransportError> {
        if self.transport.state() != TransportState::Open {
            return Err(TransportError::NotConnected);
        }
        let text = message.to_json()?;
        self.transport.send_text(&text)
    }
}

impl<T: Transport> RemoteSender for Connection<T> {
    fn send_osc(&mut self, address: &str, parameters: &[f64]) -> Result<(), TransmitError> {
        Connection::send_osc(self, address, parameters).map_err(|e| match e {
            TransportError::NotConnected => TransmitError::NotConnected,
            other => TransmitError::Send(other.to_string()),
        })
    }
}
