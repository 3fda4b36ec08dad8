//! The widget value-output pipeline.
//!
//! Every widget owns a [`Pipeline`]: the raw, unit-normalized value its
//! interaction state machine produces is filtered, committed as the
//! public value, transmitted to the configured [`Target`], and
//! change-detected against the previously committed raw value. Observers
//! are notified at most once per distinct committed value; the boolean
//! returned from [`Pipeline::output`] tells the caller whether a redraw
//! is warranted. Drawing itself is never triggered from here.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::{scale, FilterChain};

/// A committed widget value: a scalar for one-axis widgets, a pair for
/// two-axis widgets (joystick, XY pad).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A single-axis value.
    Scalar(f64),
    /// A two-axis value, `[x, y]`.
    Pair([f64; 2]),
}

impl Value {
    /// Apply a scalar function to every component.
    #[must_use]
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        match self {
            Self::Scalar(v) => Self::Scalar(f(v)),
            Self::Pair([x, y]) => Self::Pair([f(x), f(y)]),
        }
    }

    /// Append this value's components to a parameter list.
    pub fn push_params(self, params: &mut Vec<f64>) {
        match self {
            Self::Scalar(v) => params.push(v),
            Self::Pair([x, y]) => params.extend([x, y]),
        }
    }

    /// The scalar component, if this is a scalar value.
    #[must_use]
    pub fn as_scalar(self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(v),
            Self::Pair(_) => None,
        }
    }

    /// The pair components, if this is a two-axis value.
    #[must_use]
    pub fn as_pair(self) -> Option<[f64; 2]> {
        match self {
            Self::Pair(p) => Some(p),
            Self::Scalar(_) => None,
        }
    }
}

/// Notification payload for a committed value change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeEvent {
    /// Sub-element index for multi-element widgets, `None` for
    /// single-value widgets.
    pub index: Option<usize>,
    /// The newly committed public value.
    pub value: Value,
    /// The public value committed before this call (`None` on the first
    /// emission).
    pub previous: Option<Value>,
}

/// Observer callback invoked once per distinct committed value.
pub type ChangeCallback = Box<dyn FnMut(&ChangeEvent)>;

/// One addressable slot in a [`LocalTarget`].
pub enum Slot {
    /// A plain value cell; transmission assigns to it.
    Value(Value),
    /// A handler; transmission invokes it with the value.
    Handler(Box<dyn FnMut(&Value)>),
}

impl std::fmt::Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

/// A keyed slot map standing in for a local object/function target.
///
/// Transmission to a key that has no slot is silently skipped; not every
/// target needs to support every key.
#[derive(Debug, Default)]
pub struct LocalTarget {
    slots: HashMap<String, Slot>,
}

impl LocalTarget {
    /// Create an empty target.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a value cell under `key`.
    pub fn set_value(&mut self, key: impl Into<String>, value: Value) {
        self.slots.insert(key.into(), Slot::Value(value));
    }

    /// Install a handler under `key`.
    pub fn set_handler(&mut self, key: impl Into<String>, handler: Box<dyn FnMut(&Value)>) {
        self.slots.insert(key.into(), Slot::Handler(handler));
    }

    /// Read the value cell under `key`, if present.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<Value> {
        match self.slots.get(key) {
            Some(Slot::Value(v)) => Some(*v),
            _ => None,
        }
    }

    fn deliver(&mut self, key: &str, value: Value) {
        match self.slots.get_mut(key) {
            Some(Slot::Handler(handler)) => handler(&value),
            Some(Slot::Value(cell)) => *cell = value,
            None => {
                tracing::debug!(key = %key, "local target has no slot for key, skipping");
            }
        }
    }
}

/// Shared handle to a [`LocalTarget`], so the host can observe delivered
/// values after the fact.
pub type SharedLocalTarget = Arc<RwLock<LocalTarget>>;

/// Destination for committed values.
#[derive(Debug, Clone)]
pub enum Target {
    /// Forward `(address, parameters)` through the remote sender supplied
    /// in the event context. Requires the transport to be connected.
    Remote,
    /// Deliver into a local slot map.
    Local(SharedLocalTarget),
}

impl Target {
    /// Convenience constructor for a fresh shared local target.
    #[must_use]
    pub fn local() -> (Self, SharedLocalTarget) {
        let shared = Arc::new(RwLock::new(LocalTarget::new()));
        (Self::Local(Arc::clone(&shared)), shared)
    }
}

/// Errors raised while transmitting a committed value.
#[derive(Debug, Error)]
pub enum TransmitError {
    /// The widget has a remote target but no remote sender was supplied,
    /// or the underlying transport is not open.
    #[error("transport is not connected")]
    NotConnected,

    /// The widget has a remote target but no address configured.
    #[error("no address configured for remote target")]
    MissingAddress,

    /// The underlying transport failed to send.
    #[error("transport send failed: {0}")]
    Send(String),
}

/// Outbound side of a remote connection, supplied per event dispatch.
///
/// `tactile-osc` implements this for its connection type; tests implement
/// it with a recording stub.
pub trait RemoteSender {
    /// Send one OSC-style `(address, parameters)` message.
    ///
    /// # Errors
    ///
    /// Returns [`TransmitError::NotConnected`] when the transport is not
    /// open, or [`TransmitError::Send`] when the underlying send fails.
    fn send_osc(&mut self, address: &str, parameters: &[f64]) -> Result<(), TransmitError>;
}

/// Per-widget output pipeline state.
///
/// Slots are indexed so multi-element widgets (slider banks, button
/// grids, keyboards) can commit per-element values through one pipeline;
/// single-value widgets use the unindexed entry points.
pub struct Pipeline {
    min: f64,
    max: f64,
    chain: FilterChain,
    key: Option<String>,
    target: Option<Target>,
    on_change: Option<ChangeCallback>,
    /// Committed public values per slot.
    public: HashMap<usize, Value>,
    /// Raw values as of the last `on_change` firing per slot.
    previous_raw: HashMap<usize, Value>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("min", &self.min)
            .field("max", &self.max)
            .field("key", &self.key)
            .field("target", &self.target)
            .field("slots", &self.public.len())
            .finish()
    }
}

impl Pipeline {
    /// Assemble a pipeline.
    ///
    /// When `scale_output` is set and the bounds differ from the unit
    /// range, a `scale(0, 1, min, max)` pre-filter is installed ahead of
    /// the user chain.
    #[must_use]
    pub fn new(
        min: f64,
        max: f64,
        scale_output: bool,
        mut chain: FilterChain,
        key: Option<String>,
        target: Option<Target>,
        on_change: Option<ChangeCallback>,
    ) -> Self {
        #[allow(clippy::float_cmp)]
        let needs_scale = scale_output && (min != 0.0 || max != 1.0);
        if needs_scale {
            chain.push_pre(scale(0.0, 1.0, min, max));
        }
        Self {
            min,
            max,
            chain,
            key,
            target,
            on_change,
            public: HashMap::new(),
            previous_raw: HashMap::new(),
        }
    }

    /// Lower output bound.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper output bound.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// The key/address values are published under.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Replace the change observer.
    pub fn set_on_change(&mut self, callback: Option<ChangeCallback>) {
        self.on_change = callback;
    }

    /// Replace the transmission target.
    pub fn set_target(&mut self, target: Option<Target>) {
        self.target = target;
    }

    /// The committed public value of a single-value widget.
    #[must_use]
    pub fn public_value(&self) -> Option<Value> {
        self.public_at(None)
    }

    /// The committed public value of slot `index`.
    #[must_use]
    pub fn public_at(&self, index: Option<usize>) -> Option<Value> {
        self.public.get(&index.unwrap_or(0)).copied()
    }

    /// Run the pipeline for a single-value widget.
    ///
    /// # Errors
    ///
    /// Propagates [`TransmitError`] from a failed remote transmission.
    pub fn output(
        &mut self,
        raw: Value,
        remote: Option<&mut (dyn RemoteSender + '_)>,
    ) -> Result<bool, TransmitError> {
        self.output_at(None, raw, remote)
    }

    /// Run the pipeline for one slot of a multi-element widget.
    ///
    /// In strict order: filter the raw value (element-wise for pairs),
    /// commit it as the slot's public value, transmit it if a target is
    /// configured (on every call, changed or not), then change-detect
    /// against the slot's previous raw value. A `None` previous always
    /// counts as changed, so the first emission fires.
    ///
    /// Returns `Ok(true)` iff a change was detected.
    ///
    /// # Errors
    ///
    /// Propagates [`TransmitError`] from a failed remote transmission.
    pub fn output_at(
        &mut self,
        index: Option<usize>,
        raw: Value,
        remote: Option<&mut (dyn RemoteSender + '_)>,
    ) -> Result<bool, TransmitError> {
        let slot = index.unwrap_or(0);

        let filtered = raw.map(|v| self.chain.apply(v));
        let last_public = self.public.insert(slot, filtered);

        if self.target.is_some() {
            self.transmit(index, filtered, remote)?;
        }

        let changed = self.previous_raw.get(&slot) != Some(&raw);
        if changed {
            if let Some(on_change) = self.on_change.as_mut() {
                on_change(&ChangeEvent {
                    index,
                    value: filtered,
                    previous: last_public,
                });
            }
            self.previous_raw.insert(slot, raw);
        }
        Ok(changed)
    }

    fn transmit(
        &mut self,
        index: Option<usize>,
        value: Value,
        remote: Option<&mut (dyn RemoteSender + '_)>,
    ) -> Result<(), TransmitError> {
        match self.target.as_ref() {
            Some(Target::Remote) => {
                let address = self.key.as_deref().ok_or(TransmitError::MissingAddress)?;
                let sender = remote.ok_or(TransmitError::NotConnected)?;
                let mut params = Vec::with_capacity(3);
                if let Some(i) = index {
                    #[allow(clippy::cast_precision_loss)]
                    params.push(i as f64);
                }
                value.push_params(&mut params);
                sender.send_osc(address, &params)
            }
            Some(Target::Local(shared)) => {
                let Some(key) = self.key.as_deref() else {
                    tracing::debug!("local target configured without a key, skipping");
                    return Ok(());
                };
                match shared.write() {
                    Ok(mut target) => target.deliver(key, value),
                    Err(e) => {
                        tracing::error!("local target lock poisoned, skipping delivery: {e}");
                    }
                }
                Ok(())
            }
            None => Ok(()),
        }
    }
}
