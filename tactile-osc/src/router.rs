//! Inbound message routing.
//!
//! An inbound `osc` message resolves in order: an explicitly registered
//! per-address handler, then a live widget whose key matches the address
//! (delivered through its external-value entry point), then the optional
//! default handler, otherwise it is dropped with a debug trace. A drop
//! is never an error.

use std::collections::HashMap;

use thiserror::Error;

use tactile_core::{Panel, Registry, RemoteSender, WidgetError, WidgetId};

use crate::message::Message;

/// Callback for one explicitly handled address.
pub type AddressHandler = Box<dyn FnMut(&[f64])>;

/// Fallback invoked with `(address, parameters)` when nothing else
/// matched.
pub type DefaultHandler = Box<dyn FnMut(&str, &[f64])>;

/// Where an inbound message ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A registered per-address handler consumed it.
    Handler,
    /// A widget matched by key consumed it.
    Widget(WidgetId),
    /// The default handler consumed it.
    Default,
    /// Nothing matched; the message was dropped.
    Dropped,
}

/// Errors raised while routing an inbound message.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The payload was not a valid wire message.
    #[error("invalid message: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The receiving widget failed (e.g. its own re-transmission).
    #[error(transparent)]
    Widget(#[from] WidgetError),
}

/// Dispatches inbound messages to handlers and widgets.
#[derive(Default)]
pub struct Router {
    handlers: HashMap<String, AddressHandler>,
    default_handler: Option<DefaultHandler>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("handlers", &self.handlers.len())
            .field("has_default", &self.default_handler.is_some())
            .finish()
    }
}

impl Router {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one address, replacing any previous one.
    pub fn on(&mut self, address: impl Into<String>, handler: AddressHandler) {
        self.handlers.insert(address.into(), handler);
    }

    /// Remove the handler for `address`.
    pub fn off(&mut self, address: &str) -> bool {
        self.handlers.remove(address).is_some()
    }

    /// Install the fallback for otherwise-unmatched messages.
    pub fn set_default_handler(&mut self, handler: Option<DefaultHandler>) {
        self.default_handler = handler;
    }

    /// Parse and route one inbound frame.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Serialization`] for an invalid payload and
    /// propagates widget failures from external-value delivery.
    pub fn route_json(
        &mut self,
        text: &str,
        registry: &Registry,
        panel: &mut Panel,
        remote: Option<&mut dyn RemoteSender>,
    ) -> Result<RouteOutcome, RouterError> {
        let message = Message::from_json(text)?;
        self.route(&message, registry, panel, remote)
    }

    /// Route one parsed message.
    ///
    /// # Errors
    ///
    /// Propagates widget failures from external-value delivery.
    pub fn route(
        &mut self,
        message: &Message,
        registry: &Registry,
        panel: &mut Panel,
        remote: Option<&mut dyn RemoteSender>,
    ) -> Result<RouteOutcome, RouterError> {
        match message {
            Message::Osc {
                address,
                parameters,
            } => {
                if let Some(handler) = self.handlers.get_mut(address) {
                    handler(parameters);
                    return Ok(RouteOutcome::Handler);
                }
                if let Some(id) = registry.lookup(address) {
                    panel.apply_external(id, parameters, remote)?;
                    return Ok(RouteOutcome::Widget(id));
                }
                if let Some(default) = self.default_handler.as_mut() {
                    default(address, parameters);
                    return Ok(RouteOutcome::Default);
                }
                tracing::debug!(address = %address, "no route for inbound message, dropping");
                Ok(RouteOutcome::Dropped)
            }
            Message::Meta { key, .. } => {
                tracing::debug!(key = %key, "ignoring inbound meta message");
                Ok(RouteOutcome::Dropped)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tactile_core::widgets::{Orientation, Slider};
    use tactile_core::{Value, WidgetOptions};

    fn panel_with_fader() -> (Panel, Registry, WidgetId) {
        let mut panel = Panel::new(200.0, 50.0);
        let mut registry = Registry::new();
        let slider = Slider::new(
            Orientation::Horizontal,
            WidgetOptions {
                min: 0.0,
                max: 100.0,
                key: Some("/fader".to_string()),
                ..WidgetOptions::default()
            },
        );
        let id = panel.add(Box::new(slider), &mut registry).unwrap();
        (panel, registry, id)
    }

    #[test]
    fn explicit_handler_wins_over_widget_key() {
        let (mut panel, registry, _) = panel_with_fader();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);

        let mut router = Router::new();
        router.on(
            "/fader",
            Box::new(move |params| sink.lock().unwrap().extend_from_slice(params)),
        );

        let outcome = router
            .route_json(
                r#"{"type":"osc","address":"/fader","parameters":[0.25]}"#,
                &registry,
                &mut panel,
                None,
            )
            .unwrap();
        assert_eq!(outcome, RouteOutcome::Handler);
        assert_eq!(*received.lock().unwrap(), vec![0.25]);
    }

    #[test]
    fn widget_key_fallback_sets_value() {
        let (mut panel, registry, id) = panel_with_fader();
        let mut router = Router::new();

        let outcome = router
            .route_json(
                r#"{"type":"osc","address":"/fader","parameters":[0.5]}"#,
                &registry,
                &mut panel,
                None,
            )
            .unwrap();
        assert_eq!(outcome, RouteOutcome::Widget(id));

        let widget = panel.widget(id).unwrap();
        assert_eq!(
            widget.core().pipeline.public_value(),
            Some(Value::Scalar(50.0))
        );
    }

    #[test]
    fn default_handler_catches_unmatched_addresses() {
        let (mut panel, registry, _) = panel_with_fader();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);

        let mut router = Router::new();
        router.set_default_handler(Some(Box::new(move |address: &str, params: &[f64]| {
            sink.lock().unwrap().push((address.to_string(), params.to_vec()));
        })));

        let outcome = router
            .route_json(
                r#"{"type":"osc","address":"/unknown","parameters":[1.0]}"#,
                &registry,
                &mut panel,
                None,
            )
            .unwrap();
        assert_eq!(outcome, RouteOutcome::Default);
        assert_eq!(
            *received.lock().unwrap(),
            vec![("/unknown".to_string(), vec![1.0])]
        );
    }

    #[test]
    fn unmatched_without_default_is_dropped_silently() {
        let (mut panel, registry, _) = panel_with_fader();
        let mut router = Router::new();
        let outcome = router
            .route_json(
                r#"{"type":"osc","address":"/unknown","parameters":[]}"#,
                &registry,
                &mut panel,
                None,
            )
            .unwrap();
        assert_eq!(outcome, RouteOutcome::Dropped);
    }

    #[test]
    fn invalid_payload_is_an_error() {
        let (mut panel, registry, _) = panel_with_fader();
        let mut router = Router::new();
        let result = router.route_json("not json", &registry, &mut panel, None);
        assert!(matches!(result, Err(RouterError::Serialization(_))));
    }

    #[test]
    fn off_removes_handler_and_restores_widget_route() {
        let (mut panel, registry, id) = panel_with_fader();
        let mut router = Router::new();
        router.on("/fader", Box::new(|_| {}));
        assert!(router.off("/fader"));
        assert!(!router.off("/fader"));

        let outcome = router
            .route_json(
                r#"{"type":"osc","address":"/fader","parameters":[1.0]}"#,
                &registry,
                &mut panel,
                None,
            )
            .unwrap();
        assert_eq!(outcome, RouteOutcome::Widget(id));
    }
}
