//! The JSON message envelope.
//!
//! Two message kinds travel the wire, both JSON objects tagged by
//! `type`:
//!
//! - `{"type": "osc", "address": "/fader", "parameters": [50.0]}`
//! - `{"type": "meta", "interfaceName": "mixer", "key": "register"}`
//!
//! The `meta` registration is sent once when a connection opens so the
//! remote process can associate the socket with a named interface.

use serde::{Deserialize, Serialize};

/// The meta key announcing an interface registration.
pub const REGISTER_KEY: &str = "register";

/// One wire message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    /// A value message: an OSC-style address plus numeric parameters.
    Osc {
        /// Destination/source address, e.g. `/fader`.
        address: String,
        /// Numeric parameters; multi-element widgets lead with the
        /// element index.
        parameters: Vec<f64>,
    },
    /// A control message about the connection itself.
    Meta {
        /// The interface announcing itself.
        #[serde(rename = "interfaceName")]
        interface_name: String,
        /// The meta operation, e.g. [`REGISTER_KEY`].
        key: String,
    },
}

impl Message {
    /// Build a value message.
    #[must_use]
    pub fn osc(address: impl Into<String>, parameters: Vec<f64>) -> Self {
        Self::Osc {
            address: address.into(),
            parameters,
        }
    }

    /// Build the registration handshake for `interface_name`.
    #[must_use]
    pub fn register(interface_name: impl Into<String>) -> Self {
        Self::Meta {
            interface_name: interface_name.into(),
            key: REGISTER_KEY.to_string(),
        }
    }

    /// Serialize to the wire encoding.
    ///
    /// # Errors
    ///
    /// Returns a serialization error from `serde_json`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from the wire encoding.
    ///
    /// # Errors
    ///
    /// Returns a deserialization error from `serde_json`.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
